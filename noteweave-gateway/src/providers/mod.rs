pub mod gemini;
pub mod provider;

pub use provider::{Provider, ProviderError, ProviderResponse, ProviderUsage};
