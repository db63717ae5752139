//! Error types for the conversation gateway.

use docchat_core::error::DocChatError;

/// Errors from the inference backend and model selection.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("{0}")]
    Http(String),
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },
    #[error("invalid response from inference backend: {0}")]
    InvalidResponse(String),
    #[error("no models available from inference backend")]
    NoModels,
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Http(err.to_string())
    }
}

impl From<ChatError> for DocChatError {
    fn from(err: ChatError) -> Self {
        DocChatError::Inference(err.to_string())
    }
}
