//! Conversation gateway: user message in, reply string out.
//!
//! Backend failures are folded into the reply text (`"Error: ..."`) so that
//! they show up in the transcript instead of failing the HTTP request.

use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::InferenceBackend;
use crate::error::ChatError;

/// Reply returned for an empty message; the backend is not contacted.
pub const EMPTY_MESSAGE_REPLY: &str = "Please type something!";

/// Pick the model to use for the lifetime of the process.
///
/// Order: `preferred` if the backend lists it, otherwise the first listed
/// model. An empty list is an error.
pub async fn resolve_model(
    backend: &dyn InferenceBackend,
    preferred: &str,
) -> Result<String, ChatError> {
    let models = backend.list_models().await?;

    if models.iter().any(|m| m == preferred) {
        info!(model = preferred, "Using preferred model");
        return Ok(preferred.to_string());
    }

    let first = models.into_iter().next().ok_or(ChatError::NoModels)?;
    warn!(
        preferred,
        fallback = %first,
        "Preferred model not offered by backend, falling back to first listed model"
    );
    Ok(first)
}

/// Options controlling how document context is attached to prompts.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub attach_file_context: bool,
    pub max_context_chars: usize,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            attach_file_context: true,
            max_context_chars: 30_000,
        }
    }
}

/// Forwards messages to the selected model.
#[derive(Clone)]
pub struct ChatGateway {
    backend: Arc<dyn InferenceBackend>,
    model: String,
    options: GatewayOptions,
}

impl ChatGateway {
    pub fn new(backend: Arc<dyn InferenceBackend>, model: String, options: GatewayOptions) -> Self {
        Self {
            backend,
            model,
            options,
        }
    }

    /// Model identifier fixed at startup.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the prompt for `message`, prefixed by `file_text` when present.
    pub fn build_prompt(&self, message: &str, file_text: Option<&str>) -> String {
        let context = file_text
            .filter(|_| self.options.attach_file_context)
            .map(str::trim)
            .filter(|t| !t.is_empty());

        match context {
            Some(text) => {
                let excerpt: String = text.chars().take(self.options.max_context_chars).collect();
                format!(
                    "Use the following document as context when answering.\n\n\
                     --- document ---\n{}\n--- end of document ---\n\n{}",
                    excerpt, message
                )
            }
            None => message.to_string(),
        }
    }

    /// Reply to `message`. Never fails: errors become `"Error: <cause>"`.
    pub async fn reply(&self, message: &str, file_text: Option<&str>) -> String {
        if message.is_empty() {
            return EMPTY_MESSAGE_REPLY.to_string();
        }

        let prompt = self.build_prompt(message, file_text);
        match self.backend.generate(&self.model, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, model = %self.model, "Inference request failed");
                format!("Error: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;

    fn gateway(backend: Arc<MockBackend>) -> ChatGateway {
        ChatGateway::new(backend, "models/a".to_string(), GatewayOptions::default())
    }

    #[tokio::test]
    async fn test_resolve_prefers_default() {
        let backend = MockBackend::new(&["models/x", "models/gemini-1.5-flash-001"]);
        let model = resolve_model(&backend, "models/gemini-1.5-flash-001")
            .await
            .unwrap();
        assert_eq!(model, "models/gemini-1.5-flash-001");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_first() {
        let backend = MockBackend::new(&["models/x", "models/y"]);
        let model = resolve_model(&backend, "models/missing").await.unwrap();
        assert_eq!(model, "models/x");
    }

    #[tokio::test]
    async fn test_resolve_empty_list_is_error() {
        let backend = MockBackend::new(&[]);
        let err = resolve_model(&backend, "models/any").await.unwrap_err();
        assert!(matches!(err, ChatError::NoModels));
    }

    #[tokio::test]
    async fn test_empty_message_short_circuits() {
        let backend = Arc::new(MockBackend::new(&["models/a"]));
        let reply = gateway(Arc::clone(&backend)).reply("", None).await;
        assert_eq!(reply, EMPTY_MESSAGE_REPLY);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_reply_passes_through() {
        let backend = Arc::new(MockBackend::new(&["models/a"]));
        let reply = gateway(Arc::clone(&backend)).reply("hi", None).await;
        assert_eq!(reply, "echo: hi");
        assert_eq!(backend.prompts()[0].0, "models/a");
    }

    #[tokio::test]
    async fn test_backend_error_becomes_reply() {
        let backend = Arc::new(MockBackend::failing(&["models/a"], "quota exceeded"));
        let reply = gateway(backend).reply("hi", None).await;
        assert_eq!(reply, "Error: quota exceeded");
    }

    #[test]
    fn test_prompt_includes_document_context() {
        let gw = gateway(Arc::new(MockBackend::new(&[])));
        let prompt = gw.build_prompt("summarise", Some("Quarterly revenue rose."));
        assert!(prompt.contains("Quarterly revenue rose."));
        assert!(prompt.ends_with("summarise"));
    }

    #[test]
    fn test_prompt_without_context() {
        let gw = gateway(Arc::new(MockBackend::new(&[])));
        assert_eq!(gw.build_prompt("hi", None), "hi");
        assert_eq!(gw.build_prompt("hi", Some("   ")), "hi");
    }

    #[test]
    fn test_context_disabled_and_truncated() {
        let backend = Arc::new(MockBackend::new(&[]));
        let disabled = ChatGateway::new(
            Arc::clone(&backend) as Arc<dyn InferenceBackend>,
            "m".to_string(),
            GatewayOptions {
                attach_file_context: false,
                max_context_chars: 10,
            },
        );
        assert_eq!(disabled.build_prompt("q", Some("doc")), "q");

        let truncated = ChatGateway::new(
            backend,
            "m".to_string(),
            GatewayOptions {
                attach_file_context: true,
                max_context_chars: 3,
            },
        );
        let prompt = truncated.build_prompt("q", Some("abcdef"));
        assert!(prompt.contains("\nabc\n"));
        assert!(!prompt.contains("abcd"));
    }
}
