//! Live tests for the Gemini provider (requires --features live-tests).

#[cfg(feature = "live-tests")]
use noteweave_core::AiAction;
#[cfg(feature = "live-tests")]
use noteweave_gateway::assistant::{ProviderAssistant, run_action};
#[cfg(feature = "live-tests")]
use noteweave_gateway::providers::Provider;
#[cfg(feature = "live-tests")]
use noteweave_gateway::providers::gemini::GeminiClient;

#[cfg(feature = "live-tests")]
fn load_gemini_client() -> Option<GeminiClient> {
    noteweave_core::load_dotenv();

    let api_key = match std::env::var("GEMINI_API_KEY") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            eprintln!("GEMINI_API_KEY not set; skipping Gemini live test.");
            return None;
        }
    };

    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());
    Some(GeminiClient::new(api_key, model).expect("client"))
}

#[cfg(feature = "live-tests")]
#[tokio::test]
async fn test_gemini_generates_text() {
    let Some(client) = load_gemini_client() else {
        return;
    };

    let response = client
        .generate("Reply with the single word: pong")
        .await
        .expect("Gemini request failed");
    assert!(response.text.to_lowercase().contains("pong"));
}

#[cfg(feature = "live-tests")]
#[tokio::test]
async fn test_gemini_suggests_tags() {
    let Some(client) = load_gemini_client() else {
        return;
    };
    let assistant = ProviderAssistant::new(Box::new(client));

    let response = run_action(
        &assistant,
        AiAction::SuggestTags,
        "Sourdough starter feeding schedule, hydration ratios and baking temperatures.",
    )
    .await
    .expect("Gemini request failed");
    assert!(!response.tags.is_empty(), "no tags in {:?}", response.result);
}
