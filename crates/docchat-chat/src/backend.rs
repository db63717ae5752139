//! Inference backend abstraction.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ChatError;

/// A hosted text-generation service.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Identifiers of every model the backend can serve.
    async fn list_models(&self) -> Result<Vec<String>, ChatError>;

    /// Generate a reply to `prompt` with `model`.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ChatError>;
}

/// In-memory backend for tests.
///
/// Echoes prompts back (or returns a configured error) and records every
/// `generate` call.
#[derive(Debug, Default)]
pub struct MockBackend {
    models: Vec<String>,
    failure: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<(String, String)>>,
}

impl MockBackend {
    pub fn new(models: &[&str]) -> Self {
        Self {
            models: models.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }

    /// A backend whose `generate` always fails with `message`.
    pub fn failing(models: &[&str], message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(models)
        }
    }

    /// Number of `generate` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(model, prompt)` pairs seen by `generate`, oldest first.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn list_models(&self) -> Result<Vec<String>, ChatError> {
        Ok(self.models.clone())
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push((model.to_string(), prompt.to_string()));
        }
        match &self.failure {
            Some(message) => Err(ChatError::Http(message.clone())),
            None => Ok(format!("echo: {}", prompt)),
        }
    }
}
