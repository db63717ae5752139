//! CLI argument definitions for the DocChat server.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// DocChat - chat with an LLM about the documents you upload.
#[derive(Parser, Debug)]
#[command(name = "docchat", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// HTTP server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Address to bind to.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// Directory for temporary upload files.
    #[arg(short = 'u', long = "upload-dir")]
    pub upload_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > DOCCHAT_CONFIG env var > platform default (~/.docchat/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("DOCCHAT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the HTTP server port.
    ///
    /// Priority: --port flag > DOCCHAT_PORT env var > config file value > 5000.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("DOCCHAT_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        if config_port != 0 {
            return config_port;
        }
        5000
    }

    /// Resolve the bind address. Priority: --host flag > config file value.
    pub fn resolve_host(&self, config_host: &str) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| config_host.to_string())
    }

    /// Resolve the upload directory.
    ///
    /// Returns `None` if not overridden (use config value).
    pub fn resolve_upload_dir(&self) -> Option<String> {
        self.upload_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Resolve the log level. Returns `None` if not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".docchat").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".docchat").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = CliArgs::parse_from([
            "docchat",
            "--port",
            "8080",
            "--host",
            "0.0.0.0",
            "--upload-dir",
            "/tmp/up",
            "-l",
            "debug",
        ]);
        assert_eq!(args.resolve_port(5000), 8080);
        assert_eq!(args.resolve_host("127.0.0.1"), "0.0.0.0");
        assert_eq!(args.resolve_upload_dir().as_deref(), Some("/tmp/up"));
        assert_eq!(args.resolve_log_level().as_deref(), Some("debug"));
    }

    #[test]
    fn test_explicit_config_path() {
        let args = CliArgs::parse_from(["docchat", "-c", "/etc/docchat.toml"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/etc/docchat.toml"));
    }

    #[test]
    fn test_defaults_fall_through_to_config() {
        let args = CliArgs::parse_from(["docchat"]);
        assert_eq!(args.resolve_host("127.0.0.1"), "127.0.0.1");
        assert_eq!(args.resolve_upload_dir(), None);
        assert_eq!(args.resolve_log_level(), None);
    }
}
