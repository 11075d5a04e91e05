use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::Note;

/// Notes whose title or content contains `query`, ignoring case.
///
/// A blank query matches everything. Input order is preserved.
pub fn search_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return notes.iter().collect();
    }
    notes
        .iter()
        .filter(|note| {
            note.title.to_lowercase().contains(&needle)
                || note.content.to_lowercase().contains(&needle)
        })
        .collect()
}

/// A note matched by one or more search terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermMatch {
    pub id: String,
    pub title: String,
    /// Terms found in the note, in the order given.
    pub matched: Vec<String>,
}

/// Match notes against several terms, best coverage first.
///
/// Terms are compared case-insensitively against title, content and tags.
/// Notes matching no term are left out; ties keep input order.
pub fn search_terms(notes: &[Note], terms: &[String]) -> Vec<TermMatch> {
    let needles: Vec<(String, &String)> = terms
        .iter()
        .map(|term| (term.trim().to_lowercase(), term))
        .filter(|(needle, _)| !needle.is_empty())
        .collect();

    let mut matches: Vec<TermMatch> = notes
        .iter()
        .filter_map(|note| {
            let title = note.title.to_lowercase();
            let content = note.content.to_lowercase();
            let tags: Vec<String> = note.tags.iter().map(|t| t.to_lowercase()).collect();
            let matched: Vec<String> = needles
                .iter()
                .filter(|(needle, _)| {
                    title.contains(needle)
                        || content.contains(needle)
                        || tags.iter().any(|tag| tag.contains(needle))
                })
                .map(|(_, term)| term.trim().to_string())
                .collect();
            (!matched.is_empty()).then(|| TermMatch {
                id: note.id.clone(),
                title: note.title.clone(),
                matched,
            })
        })
        .collect();

    matches.sort_by(|a, b| b.matched.len().cmp(&a.matched.len()));
    matches
}

/// Every distinct tag across `notes`, sorted.
pub fn all_tags(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .flat_map(|note| note.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
