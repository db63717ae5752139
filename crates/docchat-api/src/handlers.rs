//! Route handler functions for all endpoints.
//!
//! Handlers pull the caller's [`Session`] from request extensions (inserted by
//! the session middleware), delegate to the services in [`AppState`] and
//! return HTML, redirects or JSON.

use axum::extract::rejection::FormRejection;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Form, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use docchat_core::types::ChatExchange;
use docchat_extract::extension_of;

use crate::error::ApiError;
use crate::pages;
use crate::session::Session;
use crate::state::AppState;

/// Error banner shown on a failed login.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Message returned when the upload part carries no filename.
pub const NO_FILE_UPLOADED: &str = "No file uploaded";

/// Longest extension carried onto the temp file name.
const MAX_SUFFIX_LEN: usize = 10;

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Body of `POST /upload`: `{"status":"success"}` or
/// `{"status":"error","message":...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UploadResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
    pub uptime_secs: u64,
    pub active_sessions: usize,
}

// =============================================================================
// Pages and authentication
// =============================================================================

/// GET / - chat page, or a redirect to `/login` without a username.
pub async fn index(Extension(session): Extension<Session>) -> Result<Response, ApiError> {
    match session.username() {
        Some(username) => Ok(pages::index(&username)?.into_response()),
        None => Ok(Redirect::to("/login").into_response()),
    }
}

/// GET /login
pub async fn login_form() -> Result<Response, ApiError> {
    Ok(pages::login(None)?.into_response())
}

/// POST /login - check credentials; re-render the form on failure.
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, ApiError> {
    if state.verifier.verify(&form.username, &form.password) {
        info!(username = %form.username, "User logged in");
        session.set_username(form.username);
        return Ok(Redirect::to("/").into_response());
    }

    warn!(username = %form.username, "Rejected login attempt");
    Ok(pages::login(Some(INVALID_CREDENTIALS))?.into_response())
}

/// GET /signup
pub async fn signup_form() -> Result<Response, ApiError> {
    Ok(pages::signup()?.into_response())
}

/// POST /signup - any username is accepted and logged in immediately.
pub async fn signup(
    Extension(session): Extension<Session>,
    Form(form): Form<CredentialsForm>,
) -> Redirect {
    info!(username = %form.username, "User signed up");
    session.set_username(form.username);
    Redirect::to("/")
}

/// GET /logout - forget the username. Safe to repeat.
pub async fn logout(Extension(session): Extension<Session>) -> Redirect {
    session.clear_username();
    Redirect::to("/login")
}

// =============================================================================
// Chat and documents
// =============================================================================

/// POST /chat - forward `message` to the model.
///
/// A body that is not a form, or lacks `message`, is treated as an empty
/// message.
pub async fn chat(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    form: Result<Form<ChatForm>, FormRejection>,
) -> Json<ChatReply> {
    let message = match form {
        Ok(Form(form)) => form.message.unwrap_or_default(),
        Err(e) => {
            debug!(error = %e, "Unreadable chat form, treating as empty message");
            String::new()
        }
    };

    let file_text = session.file_text();
    let reply = state.gateway.reply(&message, file_text.as_deref()).await;

    if state.config.chat.record_history && !message.is_empty() {
        session.push_exchange(ChatExchange::new(message, reply.clone()));
    }

    Json(ChatReply { reply })
}

/// POST /upload - extract the `file` part and store its text in the session.
pub async fn upload(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Ok(Json(UploadResponse::error(NO_FILE_UPLOADED)));
        }

        let data = field.bytes().await?;
        let response = store_upload(&state, &session, &filename, &data).await?;
        return Ok(Json(response));
    }

    Err(ApiError::BadRequest(
        "Multipart field 'file' is required".to_string(),
    ))
}

/// Write `data` to a per-request temp file, extract it, and record the text.
/// The temp file is removed when this function returns.
async fn store_upload(
    state: &AppState,
    session: &Session,
    filename: &str,
    data: &[u8],
) -> Result<UploadResponse, ApiError> {
    let extension = extension_of(filename);
    let upload_id = Uuid::new_v4();

    let suffix = temp_suffix(&extension);
    let temp = tempfile::Builder::new()
        .prefix(&format!("{}-", upload_id))
        .suffix(&suffix)
        .tempfile_in(&state.upload_dir)?;
    tokio::fs::write(temp.path(), data).await?;

    info!(%upload_id, filename, bytes = data.len(), "Received upload");

    let result = state.extractor.extract(temp.path(), &extension).await;
    if let Err(e) = temp.close() {
        warn!(%upload_id, error = %e, "Failed to remove upload temp file");
    }

    match result {
        Ok(text) => {
            debug!(%upload_id, chars = text.chars().count(), "Extracted upload text");
            session.set_file_text(text);
            Ok(UploadResponse::success())
        }
        Err(e) => {
            warn!(%upload_id, filename, error = %e, "Extraction failed");
            Ok(UploadResponse::error(e.to_string()))
        }
    }
}

/// Suffix for the upload temp file. Client extensions may contain path
/// separators, so only short alphanumeric ones are kept.
fn temp_suffix(extension: &str) -> String {
    if !extension.is_empty()
        && extension.len() <= MAX_SUFFIX_LEN
        && extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        format!(".{}", extension)
    } else {
        String::new()
    }
}

/// GET /get_history
pub async fn get_history(Extension(session): Extension<Session>) -> Json<Vec<ChatExchange>> {
    Json(session.history())
}

/// GET /clear_history - 204 with an empty body.
pub async fn clear_history(Extension(session): Extension<Session>) -> StatusCode {
    session.clear_history();
    StatusCode::NO_CONTENT
}

// =============================================================================
// Health and static assets
// =============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    state.sessions.purge_expired();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.gateway.model().to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_sessions: state.sessions.len(),
    })
}

/// GET /static/js/main.js
pub async fn main_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        pages::MAIN_JS,
    )
}

/// GET /static/js/darkmode.js
pub async fn darkmode_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        pages::DARKMODE_JS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use docchat_chat::{ChatGateway, GatewayOptions, MockBackend};
    use docchat_core::config::DocChatConfig;
    use docchat_extract::{DocumentExtractor, MockOcrService};
    use tower::ServiceExt;

    fn make_state(dir: &tempfile::TempDir) -> AppState {
        let mut config = DocChatConfig::default();
        config.upload.dir = dir.path().to_string_lossy().into_owned();
        let gateway = ChatGateway::new(
            Arc::new(MockBackend::new(&["models/test"])),
            "models/test".to_string(),
            GatewayOptions::default(),
        );
        let extractor = DocumentExtractor::new(Arc::new(MockOcrService::new()));
        AppState::new(config, gateway, extractor)
    }

    fn make_app(dir: &tempfile::TempDir) -> axum::Router {
        crate::create_router(make_state(dir))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let resp = make_app(&dir)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.model, "models/test");
        assert_eq!(health.active_sessions, 0);
    }

    #[tokio::test]
    async fn test_static_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let app = make_app(&dir);
        for path in ["/static/js/main.js", "/static/js/darkmode.js"] {
            let resp = app
                .clone()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            let content_type = resp.headers()[header::CONTENT_TYPE].to_str().unwrap();
            assert!(content_type.starts_with("application/javascript"));
        }
    }

    #[tokio::test]
    async fn test_login_form_renders() {
        let dir = tempfile::tempdir().unwrap();
        let resp = make_app(&dir)
            .oneshot(Request::get("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
        let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("name=\"password\""));
    }

    #[test]
    fn test_temp_suffix() {
        assert_eq!(temp_suffix("pdf"), ".pdf");
        assert_eq!(temp_suffix("xlsx"), ".xlsx");
        assert_eq!(temp_suffix(""), "");
        assert_eq!(temp_suffix("v1/draft"), "");
        assert_eq!(temp_suffix("..\\evil"), "");
        assert_eq!(temp_suffix("averyveryverylongext"), "");
    }

    #[test]
    fn test_upload_response_shape() {
        let ok = serde_json::to_value(UploadResponse::success()).unwrap();
        assert_eq!(ok, serde_json::json!({"status": "success"}));

        let err = serde_json::to_value(UploadResponse::error("bad pdf")).unwrap();
        assert_eq!(
            err,
            serde_json::json!({"status": "error", "message": "bad pdf"})
        );
    }
}
