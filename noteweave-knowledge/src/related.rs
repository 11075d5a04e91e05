use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::graph::{Link, LinkBasis};
use crate::models::Note;

/// A note connected to some focus note, with the combined link weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedNote {
    pub id: String,
    pub title: String,
    pub weight: u32,
    pub bases: Vec<LinkBasis>,
}

/// Rank the notes linked to `note_id`, strongest first.
///
/// Links count in both directions. Ties break on title, then id. Yields at
/// most `limit` entries.
pub fn related_notes(
    note_id: &str,
    notes: &[Note],
    links: &[Link],
    limit: usize,
) -> impl Iterator<Item = RelatedNote> + use<> {
    let titles: HashMap<&str, &str> = notes
        .iter()
        .map(|note| (note.id.as_str(), note.title.as_str()))
        .collect();

    let mut by_id: HashMap<&str, RelatedNote> = HashMap::new();
    for link in links {
        let Some(other) = link.other_end(note_id) else {
            continue;
        };
        if other == note_id {
            continue;
        }
        let Some(title) = titles.get(other) else {
            continue;
        };
        let entry = by_id.entry(other).or_insert_with(|| RelatedNote {
            id: other.to_string(),
            title: title.to_string(),
            weight: 0,
            bases: Vec::new(),
        });
        entry.weight += link.weight;
        if !entry.bases.contains(&link.basis) {
            entry.bases.push(link.basis);
            entry.bases.sort();
        }
    }

    let mut related: Vec<RelatedNote> = by_id.into_values().collect();
    related.sort_by(|a, b| {
        b.weight
            .cmp(&a.weight)
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.id.cmp(&b.id))
    });
    related.into_iter().take(limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::extract_links;

    fn note(id: &str, title: &str, content: &str, tags: &[&str]) -> Note {
        Note::with_id(id, title, content, tags.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn ranks_by_weight_then_title() {
        let notes = vec![
            note("focus", "Focus", "[[b|b]] [[b|b]]", &["x", "y"]),
            note("a", "Alpha", "", &["x"]),
            note("b", "Beta", "", &[]),
            note("c", "Gamma", "[[focus|focus]]", &[]),
            note("d", "Delta", "", &["x", "y"]),
        ];
        let links = extract_links(&notes);
        let related: Vec<RelatedNote> = related_notes("focus", &notes, &links, 10).collect();

        let order: Vec<(&str, u32)> = related.iter().map(|r| (r.id.as_str(), r.weight)).collect();
        assert_eq!(order, vec![("b", 2), ("d", 2), ("a", 1), ("c", 1)]);
    }

    #[test]
    fn counts_incoming_references() {
        let notes = vec![note("1", "One", "", &[]), note("2", "Two", "[[one|1]]", &[])];
        let links = extract_links(&notes);
        let related: Vec<RelatedNote> = related_notes("1", &notes, &links, 5).collect();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].id, "2");
        assert_eq!(related[0].bases, vec![LinkBasis::Reference]);
    }

    #[test]
    fn respects_limit_and_unknown_focus() {
        let notes = vec![
            note("1", "One", "", &["t"]),
            note("2", "Two", "", &["t"]),
            note("3", "Three", "", &["t"]),
        ];
        let links = extract_links(&notes);
        assert_eq!(related_notes("1", &notes, &links, 1).count(), 1);
        assert_eq!(related_notes("1", &notes, &links, 0).count(), 0);
        assert_eq!(related_notes("missing", &notes, &links, 5).count(), 0);
    }
}
