//! Credential verification for `/login`.

use docchat_core::config::AuthConfig;

/// Decides whether a username/password pair identifies a user.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Accepts exactly one configured username/password pair.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl From<&AuthConfig> for StaticCredentials {
    fn from(config: &AuthConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_credentials() {
        let verifier = StaticCredentials::from(&AuthConfig::default());
        assert!(verifier.verify("test", "123"));
        assert!(!verifier.verify("test", "1234"));
        assert!(!verifier.verify("Test", "123"));
        assert!(!verifier.verify("", ""));
    }

    #[test]
    fn test_custom_credentials() {
        let verifier = StaticCredentials::new("alice", "wonderland");
        assert!(verifier.verify("alice", "wonderland"));
        assert!(!verifier.verify("test", "123"));
    }
}
