//! AI writing helpers built on a text generation provider.

use noteweave_core::{AiAction, AiResponse};
use tracing::info;

use crate::providers::{Provider, ProviderError};

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("AI features are disabled or no API key is configured")]
    Disabled,
    #[error("Invalid action specified: {0}")]
    UnknownAction(String),
    #[error("AI provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Prompt sent to the model for `action` applied to `content`.
pub fn render_prompt(action: AiAction, content: &str) -> String {
    match action {
        AiAction::Summarize => format!(
            "Please provide a concise summary of the following note content in 3-5 bullet points:\n\n{content}"
        ),
        AiAction::SuggestTags => format!(
            "Based on the following note content, suggest 3-5 relevant tags (single words or short phrases) that would be useful for categorizing this note. Return only the tags separated by commas without any explanation:\n\n{content}"
        ),
        AiAction::GenerateContent => content.to_string(),
        AiAction::FindConnections => format!(
            "Analyze the following note and identify 2-3 key concepts or topics that might be related to other notes. Focus on extracting main themes that could be linked to other content:\n\n{content}"
        ),
        AiAction::GrammarCheck => format!(
            "Please correct any grammar or spelling issues in the following text, and return only the corrected text without explanations:\n\n{content}"
        ),
        AiAction::SmartSearch => format!(
            "You are a search assistant looking through notes. The user is searching for \"{content}\". Extract 3-5 key search terms or concepts related to this query that would help find relevant notes."
        ),
    }
}

/// Split a comma separated tag reply into clean, unique tags.
pub fn parse_tags(reply: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for raw in reply.split([',', '\n']) {
        let tag = strip_list_marker(raw)
            .trim_matches(|c: char| c == '#' || c == '"' || c == '\'' || c == '*' || c == '.')
            .trim()
            .to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Pull search terms out of a free-form reply (lists or comma separated).
pub fn parse_terms(reply: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for line in reply.lines() {
        let line = strip_list_marker(line);
        // "Key terms: a, b" keeps the list; a bare "Here are some terms:" is dropped.
        let line = match line.split_once(':') {
            Some((_, rest)) if !rest.trim().is_empty() => rest,
            Some(_) => continue,
            None => line,
        };
        for raw in line.split(',') {
            let term = raw
                .trim()
                .trim_matches(|c: char| c == '"' || c == '*' || c == '.')
                .trim();
            if !term.is_empty() && !terms.iter().any(|t| t.eq_ignore_ascii_case(term)) {
                terms.push(term.to_string());
            }
        }
    }
    terms
}

/// Remove a leading bullet ("-", "*", "•") or number ("1.", "2)").
fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix(['-', '*', '•'])
        .map(str::trim_start)
        .unwrap_or(line);
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(['.', ')']) {
            return rest.trim_start();
        }
    }
    line
}

/// AI helper capabilities, one method per action.
///
/// Implementors provide `complete`; the actions render their prompt and
/// return the raw reply.
#[async_trait::async_trait]
pub trait Assistant: Send + Sync {
    /// Model answering the prompts
    fn model(&self) -> &str;

    /// Send a fully rendered prompt.
    async fn complete(&self, prompt: &str) -> Result<String, AssistantError>;

    async fn summarize(&self, content: &str) -> Result<String, AssistantError> {
        self.complete(&render_prompt(AiAction::Summarize, content))
            .await
    }

    async fn suggest_tags(&self, content: &str) -> Result<String, AssistantError> {
        self.complete(&render_prompt(AiAction::SuggestTags, content))
            .await
    }

    async fn generate_content(&self, content: &str) -> Result<String, AssistantError> {
        self.complete(&render_prompt(AiAction::GenerateContent, content))
            .await
    }

    async fn find_connections(&self, content: &str) -> Result<String, AssistantError> {
        self.complete(&render_prompt(AiAction::FindConnections, content))
            .await
    }

    async fn grammar_check(&self, content: &str) -> Result<String, AssistantError> {
        self.complete(&render_prompt(AiAction::GrammarCheck, content))
            .await
    }

    async fn smart_search(&self, query: &str) -> Result<String, AssistantError> {
        self.complete(&render_prompt(AiAction::SmartSearch, query))
            .await
    }
}

/// Run `action` and parse the reply where the action has structure.
///
/// `matches` is left empty; resolving search terms against notes is up to
/// the caller.
pub async fn run_action(
    assistant: &dyn Assistant,
    action: AiAction,
    content: &str,
) -> Result<AiResponse, AssistantError> {
    let mut response = AiResponse::default();
    match action {
        AiAction::Summarize => response.result = assistant.summarize(content).await?,
        AiAction::SuggestTags => {
            response.result = assistant.suggest_tags(content).await?;
            response.tags = parse_tags(&response.result);
        }
        AiAction::GenerateContent => response.result = assistant.generate_content(content).await?,
        AiAction::FindConnections => response.result = assistant.find_connections(content).await?,
        AiAction::GrammarCheck => response.result = assistant.grammar_check(content).await?,
        AiAction::SmartSearch => {
            response.result = assistant.smart_search(content).await?;
            response.terms = parse_terms(&response.result);
        }
    }
    info!(action = %action, model = assistant.model(), "AI action completed");
    Ok(response)
}

/// Assistant backed by a [`Provider`].
pub struct ProviderAssistant {
    provider: Box<dyn Provider>,
}

impl ProviderAssistant {
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl Assistant for ProviderAssistant {
    fn model(&self) -> &str {
        self.provider.model()
    }

    async fn complete(&self, prompt: &str) -> Result<String, AssistantError> {
        let response = self.provider.generate(prompt).await?;
        Ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Echoes a canned reply and records the prompts it received.
    struct Scripted {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl Assistant for Scripted {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, prompt: &str) -> Result<String, AssistantError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_generate_content_passes_prompt_through() {
        assert_eq!(
            render_prompt(AiAction::GenerateContent, "Write a haiku"),
            "Write a haiku"
        );
    }

    #[test]
    fn test_smart_search_prompt_quotes_query() {
        insta::assert_snapshot!(
            render_prompt(AiAction::SmartSearch, "rust lifetimes"),
            @r#"You are a search assistant looking through notes. The user is searching for "rust lifetimes". Extract 3-5 key search terms or concepts related to this query that would help find relevant notes."#
        );
    }

    #[test]
    fn test_content_follows_instructions() {
        for action in [
            AiAction::Summarize,
            AiAction::SuggestTags,
            AiAction::FindConnections,
            AiAction::GrammarCheck,
        ] {
            let prompt = render_prompt(action, "NOTE BODY");
            assert!(prompt.ends_with("\n\nNOTE BODY"), "{action}: {prompt}");
        }
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags("Rust, #async, \"Tokio\", rust , , web dev."),
            vec!["rust", "async", "tokio", "web dev"]
        );
        assert_eq!(parse_tags("1. ideas\n2. travel"), vec!["ideas", "travel"]);
        assert!(parse_tags("  ").is_empty());
    }

    #[test]
    fn test_parse_terms() {
        let reply = "Here are some terms:\n\n1. **Ownership**\n2. Borrow checker\n- lifetimes\n* Ownership";
        assert_eq!(
            parse_terms(reply),
            vec!["Ownership", "Borrow checker", "lifetimes"]
        );
        assert_eq!(
            parse_terms("Key terms: travel, packing, itinerary"),
            vec!["travel", "packing", "itinerary"]
        );
    }

    #[tokio::test]
    async fn test_run_action_parses_structured_replies() {
        let assistant = Scripted::new("notes, markdown");
        let response = run_action(&assistant, AiAction::SuggestTags, "body")
            .await
            .unwrap();
        assert_eq!(response.result, "notes, markdown");
        assert_eq!(response.tags, vec!["notes", "markdown"]);
        assert!(response.terms.is_empty());

        let response = run_action(&assistant, AiAction::Summarize, "body")
            .await
            .unwrap();
        assert!(response.tags.is_empty());

        let prompts = assistant.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].starts_with("Please provide a concise summary"));
    }
}
