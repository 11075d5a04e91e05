//! Wire types shared by the gateway and its clients.

use serde::{Deserialize, Serialize};

/// AI helper actions exposed through the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AiAction {
    Summarize,
    SuggestTags,
    GenerateContent,
    FindConnections,
    GrammarCheck,
    SmartSearch,
}

impl AiAction {
    pub const ALL: [AiAction; 6] = [
        AiAction::Summarize,
        AiAction::SuggestTags,
        AiAction::GenerateContent,
        AiAction::FindConnections,
        AiAction::GrammarCheck,
        AiAction::SmartSearch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AiAction::Summarize => "summarize",
            AiAction::SuggestTags => "suggest-tags",
            AiAction::GenerateContent => "generate-content",
            AiAction::FindConnections => "find-connections",
            AiAction::GrammarCheck => "grammar-check",
            AiAction::SmartSearch => "smart-search",
        }
    }
}

impl std::fmt::Display for AiAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AiAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "summarize" => Ok(AiAction::Summarize),
            "suggest-tags" | "suggest_tags" => Ok(AiAction::SuggestTags),
            "generate-content" | "generate_content" | "generate" => Ok(AiAction::GenerateContent),
            "find-connections" | "find_connections" => Ok(AiAction::FindConnections),
            "grammar-check" | "grammar_check" => Ok(AiAction::GrammarCheck),
            "smart-search" | "smart_search" => Ok(AiAction::SmartSearch),
            _ => Err(format!("Unknown AI action: {}", s)),
        }
    }
}

/// Request body for `POST /ai`.
///
/// `action` stays a plain string so unknown names can be answered with a
/// client error instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiRequest {
    pub action: String,
    #[serde(default)]
    pub content: String,
}

/// Response body for `POST /ai`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiResponse {
    /// Raw text returned by the model
    pub result: String,
    /// Parsed tags (suggest-tags only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Parsed search terms (smart-search only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<String>,
    /// Ids of notes matching the search terms (smart-search only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ai_available: bool,
}

/// Response body for `DELETE /notes/{id}`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_roundtrip() {
        for action in AiAction::ALL {
            assert_eq!(action.as_str().parse::<AiAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_action_aliases() {
        assert_eq!("Generate".parse::<AiAction>().unwrap(), AiAction::GenerateContent);
        assert_eq!("suggest_tags".parse::<AiAction>().unwrap(), AiAction::SuggestTags);
        assert!("translate".parse::<AiAction>().is_err());
    }

    #[test]
    fn test_action_serde_uses_kebab_case() {
        let json = serde_json::to_string(&AiAction::GrammarCheck).unwrap();
        assert_eq!(json, "\"grammar-check\"");
    }

    #[test]
    fn test_ai_response_skips_empty_lists() {
        let response = AiResponse {
            result: "ok".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({ "result": "ok" }));
    }
}
