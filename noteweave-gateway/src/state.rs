use std::path::PathBuf;
use std::sync::Arc;

use noteweave_core::{Settings, SettingsError};
use noteweave_knowledge::KnowledgeEngine;
use tokio::sync::{RwLock, broadcast};
use tracing::{info, warn};

use crate::assistant::{Assistant, AssistantError, ProviderAssistant};
use crate::providers::gemini::GeminiClient;

/// Log entry for broadcasting events to listeners
#[derive(Debug, Clone)]
pub enum LogEntry {
    /// HTTP request handled
    HttpRequest {
        method: String,
        path: String,
        status: u16,
    },
    /// Note created, updated or deleted
    NoteChanged { change: String, note_id: String },
    /// AI action answered
    AiAction { action: String, model: String },
    /// General info message
    Info { message: String },
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use chrono::Utc;
        let timestamp = Utc::now().format("%H:%M:%S");

        match self {
            LogEntry::HttpRequest {
                method,
                path,
                status,
            } => write!(f, "[{}] [HTTP] {} {} {}", timestamp, method, path, status),
            LogEntry::NoteChanged { change, note_id } => {
                write!(f, "[{}] [NOTE] {} {}", timestamp, change, note_id)
            }
            LogEntry::AiAction { action, model } => {
                write!(f, "[{}] [AI] {} via {}", timestamp, action, model)
            }
            LogEntry::Info { message } => write!(f, "[{}] [INFO] {}", timestamp, message),
        }
    }
}

/// Shared application state
pub struct AppState {
    /// Notes and their link graph
    pub engine: KnowledgeEngine,
    /// Gemini API key, kept to rebuild the assistant when AI settings change
    api_key: Option<String>,
    assistant: RwLock<Option<Arc<dyn Assistant>>>,
    settings: RwLock<Settings>,
    /// Where `PUT /settings` persists; `None` keeps changes in memory
    settings_path: Option<PathBuf>,
    /// Log broadcast channel
    log_tx: broadcast::Sender<LogEntry>,
}

impl AppState {
    pub fn new(engine: KnowledgeEngine, settings: Settings) -> Self {
        let (log_tx, _) = broadcast::channel(100);
        Self {
            engine,
            api_key: None,
            assistant: RwLock::new(None),
            settings: RwLock::new(settings),
            settings_path: None,
            log_tx,
        }
    }

    /// Enable Gemini-backed AI helpers with `api_key`.
    pub fn with_gemini_key(mut self, api_key: impl Into<String>) -> Result<Self, AssistantError> {
        let api_key = api_key.into();
        let assistant = build_gemini_assistant(&api_key, self.settings.get_mut())?;
        self.assistant = RwLock::new(Some(assistant));
        self.api_key = Some(api_key);
        Ok(self)
    }

    /// Use a ready-made assistant.
    pub fn with_assistant(mut self, assistant: Arc<dyn Assistant>) -> Self {
        self.assistant = RwLock::new(Some(assistant));
        self
    }

    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Validate, persist and apply new settings.
    pub async fn replace_settings(&self, settings: Settings) -> Result<Settings, SettingsError> {
        settings.validate()?;
        if let Some(path) = &self.settings_path {
            settings.save_to_path(path)?;
        }

        let mut current = self.settings.write().await;
        if current.ai != settings.ai
            && let Some(api_key) = &self.api_key
        {
            match build_gemini_assistant(api_key, &settings) {
                Ok(assistant) => *self.assistant.write().await = Some(assistant),
                Err(e) => warn!("Keeping previous AI client: {}", e),
            }
        }
        *current = settings.clone();
        info!("Settings updated");
        Ok(settings)
    }

    /// The assistant, if AI is configured and enabled.
    pub async fn assistant(&self) -> Result<Arc<dyn Assistant>, AssistantError> {
        if !self.settings.read().await.ai.enabled {
            return Err(AssistantError::Disabled);
        }
        self.assistant
            .read()
            .await
            .clone()
            .ok_or(AssistantError::Disabled)
    }

    pub async fn ai_available(&self) -> bool {
        self.assistant().await.is_ok()
    }

    /// Get a receiver for log entries
    pub fn subscribe_logs(&self) -> broadcast::Receiver<LogEntry> {
        self.log_tx.subscribe()
    }

    /// Broadcast a log entry
    pub fn log(&self, entry: LogEntry) {
        let _ = self.log_tx.send(entry);
    }
}

fn build_gemini_assistant(
    api_key: &str,
    settings: &Settings,
) -> Result<Arc<dyn Assistant>, AssistantError> {
    let client = GeminiClient::from_settings(api_key, &settings.ai)?
        .with_dump_queries(settings.logging.dump_queries);
    info!("Gemini client created with model: {}", settings.ai.model);
    Ok(Arc::new(ProviderAssistant::new(Box::new(client))))
}

#[cfg(test)]
mod tests {
    use noteweave_knowledge::KnowledgeSettings;
    use noteweave_knowledge::storage::KnowledgeStore;

    use super::*;

    async fn state() -> AppState {
        let store = KnowledgeStore::open_in_memory().await.unwrap();
        let settings = KnowledgeSettings {
            seed_welcome_notes: false,
            ..Default::default()
        };
        let engine = KnowledgeEngine::from_store(settings, store).await.unwrap();
        AppState::new(engine, Settings::default())
    }

    #[test]
    fn test_log_entry_display() {
        let entry = LogEntry::NoteChanged {
            change: "created".to_string(),
            note_id: "n-1".to_string(),
        };
        let s = format!("{}", entry);
        assert!(s.contains("[NOTE]"));
        assert!(s.contains("created n-1"));
    }

    #[tokio::test]
    async fn test_ai_requires_key_and_flag() {
        let state = state().await;
        assert!(!state.ai_available().await);

        let state = state.with_gemini_key("gm-test").unwrap();
        assert!(state.ai_available().await);

        let mut settings = state.settings().await;
        settings.ai.enabled = false;
        state.replace_settings(settings).await.unwrap();
        assert!(matches!(
            state.assistant().await,
            Err(AssistantError::Disabled)
        ));
    }

    #[tokio::test]
    async fn test_replace_settings_validates_and_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let state = state().await.with_settings_path(&path);
        let mut logs = state.subscribe_logs();

        let mut settings = state.settings().await;
        settings.editor.font_size = 99;
        assert!(state.replace_settings(settings).await.is_err());
        assert!(!path.exists());

        let mut settings = state.settings().await;
        settings.editor.font_size = 18;
        state.replace_settings(settings).await.unwrap();
        assert_eq!(state.settings().await.editor.font_size, 18);
        assert_eq!(Settings::load_from_path(&path).unwrap().editor.font_size, 18);

        state.log(LogEntry::Info {
            message: "hello".to_string(),
        });
        assert!(matches!(logs.recv().await.unwrap(), LogEntry::Info { .. }));
    }
}
