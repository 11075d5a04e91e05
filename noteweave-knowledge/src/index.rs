//! Incremental link index.
//!
//! Maintains the same links `extract_links` would produce over the indexed
//! notes, without rescanning the whole collection on each change. Notes keep
//! the position of their first insertion, so re-upserting a note does not
//! flip the direction of its shared-tag links.

use std::collections::{HashMap, HashSet};

use crate::graph::Link;
use crate::models::Note;
use crate::parser::extract_references;

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    note: Note,
    /// Marker targets in order of appearance, resolved or not.
    targets: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    entries: HashMap<String, Entry>,
    next_seq: u64,
    by_tag: HashMap<String, HashSet<String>>,
    /// target id -> ids of notes whose content names it.
    referrers: HashMap<String, HashSet<String>>,
    /// Symmetric shared tag counts.
    shared: HashMap<String, HashMap<String, u32>>,
}

impl LinkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `notes` in order.
    pub fn from_notes<'a>(notes: impl IntoIterator<Item = &'a Note>) -> Self {
        let mut index = Self::new();
        for note in notes {
            index.upsert(note.clone());
        }
        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Indexed notes in insertion order.
    pub fn notes(&self) -> Vec<&Note> {
        self.ordered_entries()
            .into_iter()
            .map(|entry| &entry.note)
            .collect()
    }

    /// Add a note or replace the indexed version of it.
    pub fn upsert(&mut self, note: Note) {
        let seq = match self.detach(&note.id) {
            Some(previous) => previous.seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            }
        };

        let targets: Vec<String> = extract_references(&note.content)
            .into_iter()
            .map(|marker| marker.target)
            .collect();
        for target in &targets {
            self.referrers
                .entry(target.clone())
                .or_default()
                .insert(note.id.clone());
        }

        let tags: HashSet<&str> = note.tags.iter().map(String::as_str).collect();
        for tag in tags {
            let members = self.by_tag.entry(tag.to_string()).or_default();
            for other in members.iter() {
                if *other == note.id {
                    continue;
                }
                *self
                    .shared
                    .entry(note.id.clone())
                    .or_default()
                    .entry(other.clone())
                    .or_insert(0) += 1;
                *self
                    .shared
                    .entry(other.clone())
                    .or_default()
                    .entry(note.id.clone())
                    .or_insert(0) += 1;
            }
            members.insert(note.id.clone());
        }

        self.entries.insert(
            note.id.clone(),
            Entry {
                seq,
                note,
                targets,
            },
        );
    }

    /// Drop a note and every link touching it. Returns the removed note.
    pub fn remove(&mut self, id: &str) -> Option<Note> {
        self.detach(id).map(|entry| entry.note)
    }

    /// Every link, ordered as `extract_links` orders them over `notes()`.
    pub fn links(&self) -> Vec<Link> {
        let notes = self.ordered_entries();
        let mut links = Vec::new();

        for entry in &notes {
            links.extend(self.reference_links(entry));
        }

        for entry in &notes {
            let Some(peers) = self.shared.get(&entry.note.id) else {
                continue;
            };
            let mut later: Vec<(&Entry, u32)> = peers
                .iter()
                .filter_map(|(peer, count)| {
                    let other = self.entries.get(peer)?;
                    (other.seq > entry.seq).then_some((other, *count))
                })
                .collect();
            later.sort_by_key(|(other, _)| other.seq);
            for (other, count) in later {
                links.push(Link::shared_tag(&entry.note.id, &other.note.id, count));
            }
        }

        links
    }

    /// Links with `id` at either end.
    pub fn links_for(&self, id: &str) -> Vec<Link> {
        let Some(focus) = self.entries.get(id) else {
            return Vec::new();
        };
        let mut links = self.reference_links(focus);

        if let Some(sources) = self.referrers.get(id) {
            let mut sources: Vec<&Entry> = sources
                .iter()
                .filter(|source| source.as_str() != id)
                .filter_map(|source| self.entries.get(source))
                .collect();
            sources.sort_by_key(|entry| entry.seq);
            for source in sources {
                for target in source.targets.iter().filter(|t| t.as_str() == id) {
                    links.push(Link::reference(&source.note.id, target));
                }
            }
        }

        if let Some(peers) = self.shared.get(id) {
            let mut peers: Vec<(&Entry, u32)> = peers
                .iter()
                .filter_map(|(peer, count)| Some((self.entries.get(peer)?, *count)))
                .collect();
            peers.sort_by_key(|(other, _)| other.seq);
            for (other, count) in peers {
                if focus.seq < other.seq {
                    links.push(Link::shared_tag(id, &other.note.id, count));
                } else {
                    links.push(Link::shared_tag(&other.note.id, id, count));
                }
            }
        }

        links
    }

    fn ordered_entries(&self) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries
    }

    fn reference_links(&self, entry: &Entry) -> Vec<Link> {
        entry
            .targets
            .iter()
            .filter(|target| **target != entry.note.id && self.entries.contains_key(*target))
            .map(|target| Link::reference(&entry.note.id, target))
            .collect()
    }

    /// Unhook a note from every side table.
    fn detach(&mut self, id: &str) -> Option<Entry> {
        let entry = self.entries.remove(id)?;

        for target in &entry.targets {
            if let Some(sources) = self.referrers.get_mut(target) {
                sources.remove(id);
                if sources.is_empty() {
                    self.referrers.remove(target);
                }
            }
        }

        for tag in &entry.note.tags {
            if let Some(members) = self.by_tag.get_mut(tag) {
                members.remove(id);
                if members.is_empty() {
                    self.by_tag.remove(tag);
                }
            }
        }

        if let Some(peers) = self.shared.remove(id) {
            for peer in peers.keys() {
                if let Some(back) = self.shared.get_mut(peer) {
                    back.remove(id);
                    if back.is_empty() {
                        self.shared.remove(peer);
                    }
                }
            }
        }

        Some(entry)
    }
}
