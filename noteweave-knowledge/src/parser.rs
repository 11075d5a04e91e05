use std::sync::LazyLock;

use regex::Regex;

static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]*)\|([^\]]*)\]\]").expect("regex"));

/// An in-content `[[display text|target-id]]` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMarker {
    pub display: String,
    pub target: String,
}

/// Scan content for reference markers, in order of appearance.
///
/// Markers without a `|target` segment or with a blank target are skipped.
/// Target ids are trimmed; the display text is kept as written.
pub fn extract_references(content: &str) -> Vec<ReferenceMarker> {
    REFERENCE_PATTERN
        .captures_iter(content)
        .filter_map(|cap| {
            let target = cap.get(2)?.as_str().trim();
            if target.is_empty() {
                return None;
            }
            Some(ReferenceMarker {
                display: cap.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
                target: target.to_string(),
            })
        })
        .collect()
}

/// Render a marker pointing at `target_id`.
pub fn reference_marker(display: &str, target_id: &str) -> String {
    format!("[[{}|{}]]", display, target_id)
}
