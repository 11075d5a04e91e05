//! Turning menu input into note and settings changes.

use noteweave_core::Settings;
use noteweave_knowledge::NoteUpdateRequest;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum SettingChangeError {
    #[error("Unknown setting: {0}")]
    UnknownKey(String),
    #[error("Invalid value: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Set the dotted `key` (e.g. `editor.font_size`) to `raw`.
///
/// `raw` is read as JSON when it parses, otherwise as a plain string, so
/// `18`, `true` and `dark` all work without quoting.
pub fn apply_setting(
    settings: &Settings,
    key: &str,
    raw: &str,
) -> Result<Settings, SettingChangeError> {
    let unknown = || SettingChangeError::UnknownKey(key.to_string());
    let (sections, field) = match key.rsplit_once('.') {
        Some((sections, field)) => (Some(sections), field),
        None => (None, key),
    };
    if field.is_empty() {
        return Err(unknown());
    }

    let mut value = serde_json::to_value(settings)?;
    let mut slot = &mut value;
    if let Some(sections) = sections {
        for section in sections.split('.') {
            slot = slot.get_mut(section).ok_or_else(unknown)?;
        }
    }
    let table = slot.as_object_mut().ok_or_else(unknown)?;
    let raw = raw.trim();
    let parsed = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    table.insert(field.to_string(), parsed);

    let updated: Settings = serde_json::from_value(value)?;

    // Unknown fields deserialize silently; make sure the key survived.
    let pointer = format!("/{}", key.replace('.', "/"));
    if serde_json::to_value(&updated)?.pointer(&pointer).is_none() {
        return Err(unknown());
    }
    Ok(updated)
}

/// Build a partial update from menu answers. Blank answers keep the
/// current value; a lone `-` for tags clears them.
pub fn note_update(title: &str, tags: &str, content: Option<String>) -> NoteUpdateRequest {
    let title = title.trim();
    let tags = tags.trim();
    NoteUpdateRequest {
        title: (!title.is_empty()).then(|| title.to_string()),
        tags: match tags {
            "" => None,
            "-" => Some(Vec::new()),
            tags => Some(tags.split(',').map(str::to_string).collect()),
        },
        content,
    }
}
