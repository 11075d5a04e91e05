//! Settings configuration loaded from TOML files.
//!
//! This module handles non-sensitive configuration stored in TOML format
//! in the XDG config directory (~/.config/noteweave/config.toml).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default TOML configuration file content
const DEFAULT_CONFIG_TOML: &str = r#"# noteweave configuration file
# Located at: ~/.config/noteweave/config.toml
#
# This file contains non-sensitive configuration.
# Secrets (API keys) are loaded from environment variables:
#   - GEMINI_API_KEY

[gateway]
host = "127.0.0.1"
port = 3000

[logging]
level = "info"
# dump_queries = true

[appearance]
# light, dark or system
theme = "system"

[editor]
auto_save = true
auto_save_interval_seconds = 5
font_size = 14
spell_check = true

[ai]
enabled = true
model = "gemini-pro"
temperature = 0.7
top_k = 40
top_p = 0.95
max_output_tokens = 1024
# base_url = "https://generativelanguage.googleapis.com/v1beta"

[sync]
enabled = true

[knowledge]
# db_path = "/path/to/notes.sqlite3"
seed_welcome_notes = true
related_limit = 5
"#;

/// Settings loaded from TOML configuration file.
///
/// These are non-sensitive configuration values that can be safely
/// stored in files and version controlled (excluding secrets).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Gateway server configuration
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Appearance preferences
    #[serde(default)]
    pub appearance: AppearanceSettings,

    /// Editor preferences
    #[serde(default)]
    pub editor: EditorSettings,

    /// AI helper configuration
    #[serde(default)]
    pub ai: AiSettings,

    /// Sync preferences
    #[serde(default)]
    pub sync: SyncSettings,

    /// Note store and graph configuration
    #[serde(default)]
    pub knowledge: KnowledgeFileSettings,
}

/// Gateway server settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GatewaySettings {
    /// Host to bind to
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log raw LLM request/response JSON at debug level
    #[serde(default)]
    pub dump_queries: bool,
}

/// Color theme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Appearance settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppearanceSettings {
    #[serde(default)]
    pub theme: Theme,
}

/// Editor settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EditorSettings {
    /// Automatically save changes to notes
    #[serde(default = "default_true")]
    pub auto_save: bool,

    /// Seconds between automatic saves (1-60)
    #[serde(default = "default_auto_save_interval")]
    pub auto_save_interval_seconds: u32,

    /// Editor font size in px (8-36)
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Highlight spelling errors in the editor
    #[serde(default = "default_true")]
    pub spell_check: bool,
}

/// AI helper settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AiSettings {
    /// Enable AI-powered features
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Gemini model identifier
    #[serde(default = "default_ai_model")]
    pub model: String,

    /// Override the Gemini API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_ai_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Sync settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SyncSettings {
    /// Synchronize notes across devices
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Note store settings as written in the TOML file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct KnowledgeFileSettings {
    /// Optional override for the notes database path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,

    /// Insert the welcome notes into an empty store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_welcome_notes: Option<bool>,

    /// Default number of related notes returned per query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_limit: Option<usize>,
}

// Default value functions

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_auto_save_interval() -> u32 {
    5
}

fn default_font_size() -> u32 {
    14
}

fn default_ai_model() -> String {
    "gemini-pro".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_k() -> u32 {
    40
}

fn default_top_p() -> f32 {
    0.95
}

fn default_max_output_tokens() -> u32 {
    1024
}

fn default_ai_timeout_seconds() -> u64 {
    60
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dump_queries: false,
        }
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            auto_save: true,
            auto_save_interval_seconds: default_auto_save_interval(),
            font_size: default_font_size(),
            spell_check: true,
        }
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_ai_model(),
            base_url: None,
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
            timeout_seconds: default_ai_timeout_seconds(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

impl Settings {
    /// Load settings from the TOML configuration file.
    ///
    /// If the config file doesn't exist, creates it with default values.
    /// The file is located at `~/.config/noteweave/config.toml`.
    pub fn load() -> Result<Self, SettingsError> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load settings from a specific file path, creating it when missing.
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::info!("Creating default configuration at {:?}", path);
            Self::create_default_config(path)?;
        }

        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        Ok(settings)
    }

    /// Serialize settings to TOML content.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the editor and AI helpers cannot work with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let editor = &self.editor;
        if !(1..=60).contains(&editor.auto_save_interval_seconds) {
            return Err(SettingsError::Invalid(format!(
                "editor.auto_save_interval_seconds must be between 1 and 60 (got {})",
                editor.auto_save_interval_seconds
            )));
        }
        if !(8..=36).contains(&editor.font_size) {
            return Err(SettingsError::Invalid(format!(
                "editor.font_size must be between 8 and 36 (got {})",
                editor.font_size
            )));
        }

        let ai = &self.ai;
        if ai.model.trim().is_empty() {
            return Err(SettingsError::Invalid("ai.model cannot be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&ai.temperature) {
            return Err(SettingsError::Invalid(format!(
                "ai.temperature must be between 0 and 2 (got {})",
                ai.temperature
            )));
        }
        if !(0.0..=1.0).contains(&ai.top_p) {
            return Err(SettingsError::Invalid(format!(
                "ai.top_p must be between 0 and 1 (got {})",
                ai.top_p
            )));
        }
        if ai.max_output_tokens == 0 {
            return Err(SettingsError::Invalid(
                "ai.max_output_tokens must be positive".to_string(),
            ));
        }

        if self.knowledge.related_limit == Some(0) {
            return Err(SettingsError::Invalid(
                "knowledge.related_limit must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the configuration file path.
    ///
    /// Uses XDG config directory: `~/.config/noteweave/config.toml`
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(override_dir) = std::env::var("NOTEWEAVE_CONFIG_DIR") {
            let dir = PathBuf::from(override_dir);
            return Ok(dir.join("config.toml"));
        }

        let config_dir = dirs::config_dir()
            .ok_or(SettingsError::ConfigDirNotFound)?
            .join("noteweave");

        Ok(config_dir.join("config.toml"))
    }

    /// Create the default configuration file.
    fn create_default_config(path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, DEFAULT_CONFIG_TOML)?;

        Ok(())
    }

    /// Save settings to the default configuration file path.
    pub fn save(&self) -> Result<(), SettingsError> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save settings to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the HTTP bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.gateway.host, self.gateway.port)
    }

    /// Get the base URL clients use to reach the gateway.
    pub fn gateway_url(&self) -> String {
        format!("http://{}:{}", self.gateway.host, self.gateway.port)
    }
}
