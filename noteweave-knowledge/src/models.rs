use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to notes created or saved without one.
pub const DEFAULT_TITLE: &str = "Untitled";

/// A markdown note.
///
/// `id` never changes once assigned. `tags` keeps display order and holds no
/// duplicates (exact, case-sensitive comparison).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Create a note with a fresh id.
    pub fn new(title: &str, content: impl Into<String>, tags: Vec<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), title, content, tags)
    }

    /// Create a note with a caller-chosen id.
    pub fn with_id(
        id: impl Into<String>,
        title: &str,
        content: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: normalize_title(title),
            content: content.into(),
            tags: normalize_tags(tags),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Apply a partial update and refresh `updated_at`.
    pub fn apply(&mut self, update: NoteUpdateRequest) {
        if let Some(title) = update.title {
            self.title = normalize_title(&title);
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(tags) = update.tags {
            self.tags = normalize_tags(tags);
        }
        // Wall clock may step backwards.
        self.updated_at = Utc::now().max(self.updated_at);
    }
}

/// Title shown for a note: trimmed, or "Untitled" when blank.
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Trim tags, drop empty ones and keep the first occurrence of duplicates.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || !seen.insert(tag.to_string()) {
            continue;
        }
        result.push(tag.to_string());
    }
    result
}

/// Input for creating a note. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteCreateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NoteCreateRequest {
    pub fn into_note(self) -> Note {
        Note::new(
            self.title.as_deref().unwrap_or_default(),
            self.content.unwrap_or_default(),
            self.tags.unwrap_or_default(),
        )
    }
}

/// Partial update of a note; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteUpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_defaults_to_untitled() {
        assert_eq!(normalize_title(""), "Untitled");
        assert_eq!(normalize_title("   "), "Untitled");
        assert_eq!(normalize_title("  Ideas "), "Ideas");
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated_in_order() {
        let tags = normalize_tags(["rust", " notes", "", "rust", "Rust", "notes "]);
        assert_eq!(tags, vec!["rust", "notes", "Rust"]);
    }

    #[test]
    fn create_request_fills_defaults() {
        let note = NoteCreateRequest::default().into_note();
        assert_eq!(note.title, "Untitled");
        assert!(note.content.is_empty());
        assert!(note.tags.is_empty());
        assert!(Uuid::parse_str(&note.id).is_ok());
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn apply_updates_only_given_fields() {
        let mut note = Note::with_id("n1", "Draft", "body", vec!["a".to_string()]);
        let before = note.updated_at;

        note.apply(NoteUpdateRequest {
            tags: Some(vec!["b".to_string(), "b".to_string()]),
            ..Default::default()
        });

        assert_eq!(note.id, "n1");
        assert_eq!(note.title, "Draft");
        assert_eq!(note.content, "body");
        assert_eq!(note.tags, vec!["b"]);
        assert!(note.updated_at >= before);
    }

    #[test]
    fn apply_blank_title_resets_to_default() {
        let mut note = Note::with_id("n1", "Draft", "", vec![]);
        note.apply(NoteUpdateRequest {
            title: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(note.title, DEFAULT_TITLE);
    }
}
