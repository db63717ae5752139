use thiserror::Error;

/// Top-level error type for DocChat.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for DocChatError` so that `?` works across
/// crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocChatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for DocChatError {
    fn from(err: toml::de::Error) -> Self {
        DocChatError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DocChatError {
    fn from(err: toml::ser::Error) -> Self {
        DocChatError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for DocChatError {
    fn from(err: serde_json::Error) -> Self {
        DocChatError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for DocChat operations.
pub type Result<T> = std::result::Result<T, DocChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(DocChatError, &str)> = vec![
            (
                DocChatError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                DocChatError::Extraction("corrupt pdf".to_string()),
                "Extraction error: corrupt pdf",
            ),
            (
                DocChatError::Inference("quota exceeded".to_string()),
                "Inference error: quota exceeded",
            ),
            (
                DocChatError::Api("bind failed".to_string()),
                "API error: bind failed",
            ),
            (
                DocChatError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: DocChatError = io_err.into();
        assert!(matches!(err, DocChatError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: DocChatError = err.unwrap_err().into();
        assert!(matches!(err, DocChatError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: DocChatError = err.unwrap_err().into();
        assert!(matches!(err, DocChatError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
