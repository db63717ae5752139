//! Conversation gateway for DocChat.
//!
//! Wraps a hosted inference backend behind the `InferenceBackend` trait,
//! resolves the model to use once at startup, and turns user messages into
//! reply strings.

pub mod backend;
pub mod error;
pub mod gateway;
pub mod gemini;

pub use backend::{InferenceBackend, MockBackend};
pub use error::ChatError;
pub use gateway::{resolve_model, ChatGateway, GatewayOptions, EMPTY_MESSAGE_REPLY};
pub use gemini::GeminiBackend;
