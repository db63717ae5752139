//! Router setup with all routes and middleware.
//!
//! Configures the axum Router with request tracing, compression, the upload
//! body limit and session resolution.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use docchat_core::config::DocChatConfig;
use docchat_core::error::DocChatError;

use crate::handlers;
use crate::session::session_middleware;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
///
/// Every route runs behind the session middleware; access control for `/`
/// is done by the handler itself.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.upload.max_bytes;

    let session_routes = Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/signup", get(handlers::signup_form).post(handlers::signup))
        .route("/logout", get(handlers::logout))
        .route("/chat", post(handlers::chat))
        .route("/upload", post(handlers::upload))
        .route("/get_history", get(handlers::get_history))
        .route("/clear_history", get(handlers::clear_history))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    // Routes that never touch a session.
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/static/js/main.js", get(handlers::main_js))
        .route("/static/js/darkmode.js", get(handlers::darkmode_js));

    public_routes
        .merge(session_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to the configured host and port and serve until shutdown.
pub async fn start_server(config: &DocChatConfig, state: AppState) -> Result<(), DocChatError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let router = create_router(state);

    tracing::info!("Starting DocChat server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DocChatError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DocChatError::Api(format!("Server error: {}", e)))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
