//! DocChat API crate - axum HTTP server, sessions, pages and route handlers.
//!
//! Serves the login/signup pages, the chat page and its scripts, and the
//! JSON endpoints for chatting, document upload and history.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod routes;
pub mod session;
pub mod state;

pub use auth::{CredentialVerifier, StaticCredentials};
pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use session::{Session, SessionStore};
pub use state::AppState;
