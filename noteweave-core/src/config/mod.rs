//! Configuration management for noteweave.
//!
//! Secrets come from environment variables, everything else from a TOML
//! settings file.
//!
//! # Configuration Sources
//!
//! ## Secrets (Environment Variables)
//! - `GEMINI_API_KEY` - Google Gemini API key (AI helpers are disabled without it)
//!
//! ## Settings (TOML File)
//! Located at `~/.config/noteweave/config.toml`:
//! ```toml
//! [gateway]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [editor]
//! font_size = 14
//!
//! [ai]
//! enabled = true
//! model = "gemini-pro"
//! ```

pub mod knowledge;
mod secrets;
mod settings;

pub use knowledge::KnowledgeSettings;
pub use secrets::{Secrets, SecretsError};
pub use settings::{
    AiSettings, AppearanceSettings, EditorSettings, GatewaySettings, KnowledgeFileSettings,
    LoggingSettings, Settings, SettingsError, SyncSettings, Theme,
};

#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Combined configuration containing both secrets and settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from TOML configuration file
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Secrets error: {0}")]
    Secrets(#[from] SecretsError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// This loads:
    /// 1. Secrets from environment variables
    /// 2. Settings from TOML file (creating defaults if needed)
    pub fn load() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env();
        let settings = Settings::load()?;

        Ok(Self { secrets, settings })
    }

    /// Whether AI helpers can run: enabled in settings and a key is present.
    pub fn ai_available(&self) -> bool {
        self.settings.ai.enabled && self.secrets.gemini_api_key.is_some()
    }

    /// Get the Gemini API key (if configured).
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.secrets.gemini_api_key.as_deref()
    }

    /// Resolved settings for the knowledge engine.
    pub fn knowledge_settings(&self) -> KnowledgeSettings {
        KnowledgeSettings::from(&self.settings.knowledge)
    }

    /// Get the HTTP bind address.
    pub fn bind_addr(&self) -> String {
        self.settings.bind_addr()
    }
}

/// Load .env file if it exists (for development convenience).
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}
