pub mod assistant;
pub mod providers;
pub mod server;
pub mod state;

pub use assistant::{Assistant, AssistantError, ProviderAssistant, run_action};
pub use providers::provider::{Provider, ProviderError, ProviderResponse, ProviderUsage};
pub use state::{AppState, LogEntry};
