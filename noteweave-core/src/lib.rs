pub mod config;
pub mod message;

// Config re-exports
pub use config::{
    AiSettings,
    AppearanceSettings,
    Config,
    ConfigError,
    EditorSettings,
    GatewaySettings,
    KnowledgeSettings,
    Secrets,
    SecretsError,
    Settings,
    SettingsError,
    Theme,
    load_dotenv,
};

// Message re-exports
pub use message::{
    AiAction,
    AiRequest,
    AiResponse,
    DeleteResponse,
    ErrorResponse,
    HealthResponse,
};
