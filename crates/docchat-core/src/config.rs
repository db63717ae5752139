use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DocChatError, Result};

/// Model identifier preferred at startup when the backend offers it.
pub const DEFAULT_MODEL: &str = "models/gemini-1.5-flash-001";

/// Top-level configuration for the DocChat server.
///
/// Loaded from `~/.docchat/config.toml` by default. Every section falls back
/// to its defaults when omitted, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocChatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub ocr: OcrSettings,
}

impl DocChatConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DocChatConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed. A missing file is the normal
    /// first-run case and is not reported as a problem.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(DocChatError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Read only `[general] log_level` from `path`, without logging.
    ///
    /// Used before the tracing subscriber exists; returns `None` if the file
    /// is missing or unparsable.
    pub fn peek_log_level(path: &Path) -> Option<String> {
        let content = std::fs::read_to_string(path).ok()?;
        let config: DocChatConfig = toml::from_str(&content).ok()?;
        Some(config.general.log_level)
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| DocChatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Upload handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Working directory for in-flight uploads.
    pub dir: String,
    /// Maximum request body size accepted on `/upload`, in bytes.
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
            max_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Session store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle time after which a session is evicted.
    pub ttl_minutes: u32,
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 60,
            cookie_name: "docchat_session".to_string(),
        }
    }
}

/// Conversation gateway and inference backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Base URL of the Gemini REST API.
    pub api_base_url: String,
    /// Preferred model identifier; the first listed model is used if absent.
    pub default_model: String,
    /// Prepend the session's extracted document text to each prompt.
    pub attach_file_context: bool,
    /// Maximum characters of document text sent with a prompt.
    pub max_context_chars: usize,
    /// Append each exchange to the session history.
    pub record_history: bool,
    /// Number of most recent exchanges kept per session.
    pub max_history: usize,
    /// Per-request timeout for backend calls. `None` waits indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            attach_file_context: true,
            max_context_chars: 30_000,
            record_history: true,
            max_history: 50,
            request_timeout_secs: None,
        }
    }
}

/// Static credential pair accepted by `/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "test".to_string(),
            password: "123".to_string(),
        }
    }
}

/// OCR engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Path or name of the tesseract executable.
    pub tesseract_cmd: String,
    /// Tesseract language code (e.g. "eng").
    pub language: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".to_string(),
            language: "eng".to_string(),
        }
    }
}
