//! Application state shared across all route handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use docchat_chat::ChatGateway;
use docchat_core::config::DocChatConfig;
use docchat_extract::DocumentExtractor;

use crate::auth::{CredentialVerifier, StaticCredentials};
use crate::session::SessionStore;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks. The
/// configuration is fixed once the server starts.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<DocChatConfig>,
    /// Server-side session table.
    pub sessions: Arc<SessionStore>,
    /// Model gateway with the model chosen at startup.
    pub gateway: Arc<ChatGateway>,
    /// Upload-to-text converter.
    pub extractor: Arc<DocumentExtractor>,
    /// Login check.
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Directory for per-request upload temp files.
    pub upload_dir: PathBuf,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState; credentials come from `config.auth`.
    pub fn new(config: DocChatConfig, gateway: ChatGateway, extractor: DocumentExtractor) -> Self {
        let ttl = Duration::from_secs(u64::from(config.session.ttl_minutes) * 60);
        let sessions = SessionStore::new(ttl, config.chat.max_history);
        let verifier = StaticCredentials::from(&config.auth);
        let upload_dir = PathBuf::from(&config.upload.dir);

        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            gateway: Arc::new(gateway),
            extractor: Arc::new(extractor),
            verifier: Arc::new(verifier),
            upload_dir,
            start_time: Instant::now(),
        }
    }

    /// Replace the credential verifier.
    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifier = verifier;
        self
    }
}
