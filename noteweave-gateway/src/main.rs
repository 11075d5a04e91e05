use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use noteweave_gateway::server;
use noteweave_gateway::state::AppState;
use noteweave_knowledge::KnowledgeEngine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    noteweave_core::load_dotenv();

    // Load configuration before tracing so the configured level can apply
    let config = noteweave_core::Config::load()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.settings.logging.level.as_str().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Configuration loaded (model: {}, ai enabled: {})",
        config.settings.ai.model, config.settings.ai.enabled
    );

    let engine = KnowledgeEngine::open(config.knowledge_settings()).await?;
    info!("Note store opened");

    let settings_path = noteweave_core::Settings::config_path()?;
    let mut state =
        AppState::new(engine, config.settings.clone()).with_settings_path(settings_path);

    match config.gemini_api_key() {
        Some(api_key) => {
            state = state.with_gemini_key(api_key)?;
        }
        None => {
            warn!("GEMINI_API_KEY not set; AI helpers are unavailable");
        }
    }

    let state = Arc::new(state);
    let mut logs = state.subscribe_logs();
    tokio::spawn(async move {
        loop {
            match logs.recv().await {
                Ok(entry) => tracing::debug!("{}", entry),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    });

    server::run(state, &config.bind_addr()).await?;
    Ok(())
}
