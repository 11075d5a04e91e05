//! Secrets configuration loaded from environment variables only.
//!
//! API keys are never stored in the TOML settings file.

use std::env;

/// Secrets loaded exclusively from environment variables.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// Gemini API key (env: GEMINI_API_KEY)
    pub gemini_api_key: Option<String>,
}

/// Errors that can occur when resolving secrets
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("Missing required secret: {0}")]
    MissingSecret(String),
}

impl Secrets {
    /// Load secrets from environment variables.
    ///
    /// This function also loads .env file if present (for development),
    /// but production should rely on actual environment variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self::from_env_inner()
    }

    /// Internal method to load from environment without loading .env
    pub(crate) fn from_env_inner() -> Self {
        Self {
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
        }
    }

    /// Get the Gemini API key or fail with the variable name.
    pub fn require_gemini_api_key(&self) -> Result<&str, SecretsError> {
        self.gemini_api_key
            .as_deref()
            .ok_or_else(|| SecretsError::MissingSecret("GEMINI_API_KEY".to_string()))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_MUTEX;

    #[test]
    fn test_secrets_from_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { env::set_var("GEMINI_API_KEY", "gm-test") }

        let secrets = Secrets::from_env_inner();
        assert_eq!(secrets.gemini_api_key, Some("gm-test".to_string()));
        assert_eq!(secrets.require_gemini_api_key().unwrap(), "gm-test");

        unsafe { env::remove_var("GEMINI_API_KEY") }
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { env::set_var("GEMINI_API_KEY", "   ") }

        let secrets = Secrets::from_env_inner();
        assert!(secrets.gemini_api_key.is_none());
        assert!(matches!(
            secrets.require_gemini_api_key(),
            Err(SecretsError::MissingSecret(name)) if name == "GEMINI_API_KEY"
        ));

        unsafe { env::remove_var("GEMINI_API_KEY") }
    }
}
