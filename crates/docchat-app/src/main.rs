//! DocChat server binary - composition root.
//!
//! 1. Load `.env`, CLI flags and the TOML configuration
//! 2. Connect to Gemini and pick the model for this process
//! 3. Build the document extractor (tesseract OCR for images)
//! 4. Start the session sweeper and the axum HTTP server

mod cli;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;

use docchat_api::routes;
use docchat_api::state::AppState;
use docchat_chat::{resolve_model, ChatGateway, GatewayOptions, GeminiBackend};
use docchat_core::config::DocChatConfig;
use docchat_core::error::DocChatError;
use docchat_extract::{DocumentExtractor, OcrConfig, TesseractOcrService};

use cli::CliArgs;

/// How often idle sessions are swept from memory.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

fn read_api_key() -> Result<SecretString, DocChatError> {
    match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => Ok(SecretString::from(key)),
        _ => Err(DocChatError::Config(
            "GEMINI_API_KEY is not set (export it or add it to .env)".to_string(),
        )),
    }
}

/// Periodically drop expired sessions.
async fn session_sweeper(state: AppState) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        let removed = state.sessions.purge_expired();
        if removed > 0 {
            tracing::debug!(removed, remaining = state.sessions.len(), "Expired sessions purged");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();
    let args = CliArgs::parse();

    // The subscriber needs the log level before the config is loaded for real.
    let config_file = args.resolve_config_path();
    let log_level = args
        .resolve_log_level()
        .or_else(|| DocChatConfig::peek_log_level(&config_file))
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    tracing::info!("Starting DocChat v{}", env!("CARGO_PKG_VERSION"));
    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "Environment loaded from .env");
    }

    let mut config = DocChatConfig::load_or_default(&config_file);

    config.server.port = args.resolve_port(config.server.port);
    config.server.host = args.resolve_host(&config.server.host);
    if let Some(dir) = args.resolve_upload_dir() {
        config.upload.dir = dir;
    }

    // Uploads.
    let upload_dir = PathBuf::from(&config.upload.dir);
    if let Err(e) = std::fs::create_dir_all(&upload_dir) {
        tracing::error!(path = %upload_dir.display(), error = %e, "Failed to create upload directory");
        return Err(e.into());
    }
    tracing::info!(path = %upload_dir.display(), "Upload directory ready");

    // Model backend.
    let api_key = read_api_key()?;
    let timeout = config.chat.request_timeout_secs.map(Duration::from_secs);
    let backend = GeminiBackend::new(&config.chat.api_base_url, api_key, timeout)?;

    let model = match resolve_model(&backend, &config.chat.default_model).await {
        Ok(model) => model,
        Err(e) => {
            tracing::error!(error = %e, "Could not select a model");
            return Err(e.into());
        }
    };
    tracing::info!(model = %model, "Model selected");

    let gateway = ChatGateway::new(
        Arc::new(backend),
        model,
        GatewayOptions {
            attach_file_context: config.chat.attach_file_context,
            max_context_chars: config.chat.max_context_chars,
        },
    );

    // Extraction.
    let ocr = TesseractOcrService::new(OcrConfig::from(&config.ocr));
    tracing::info!(command = %ocr.config().command, language = %ocr.config().language, "OCR configured");
    let extractor = DocumentExtractor::new(Arc::new(ocr));

    let state = AppState::new(config.clone(), gateway, extractor);

    let sweeper_state = state.clone();
    tokio::spawn(async move {
        session_sweeper(sweeper_state).await;
    });

    routes::start_server(&config, state).await?;

    Ok(())
}
