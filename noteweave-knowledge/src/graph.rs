//! Relationship extraction and the aggregated graph view.
//!
//! Links are derived from a snapshot of the note collection on every call and
//! are never persisted.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::Note;
use crate::parser::extract_references;

/// Rule that produced a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkBasis {
    /// Explicit `[[display|target-id]]` marker in the source content.
    Reference,
    /// Both notes carry at least one identical tag. Undirected.
    SharedTag,
}

impl LinkBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::SharedTag => "shared-tag",
        }
    }
}

impl std::fmt::Display for LinkBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A derived relationship between two notes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub basis: LinkBasis,
    /// 1 for references, shared tag count for shared-tag links.
    pub weight: u32,
}

impl Link {
    pub fn reference(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            basis: LinkBasis::Reference,
            weight: 1,
        }
    }

    pub fn shared_tag(source: &str, target: &str, weight: u32) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            basis: LinkBasis::SharedTag,
            weight,
        }
    }

    /// Whether `id` is either endpoint.
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    /// The endpoint opposite `id`, if `id` is an endpoint.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}

/// Derive every link between the given notes.
///
/// Reference markers resolve on the target id only. Each marker occurrence
/// yields its own link; self references and unknown ids are skipped.
/// Shared-tag links are emitted once per unordered pair, sourced at the note
/// that comes first in `notes`.
///
/// Never fails: degenerate input yields an empty list.
pub fn extract_links(notes: &[Note]) -> Vec<Link> {
    let ids: HashSet<&str> = notes.iter().map(|note| note.id.as_str()).collect();
    let mut links = Vec::new();

    for note in notes {
        for marker in extract_references(&note.content) {
            if marker.target == note.id || !ids.contains(marker.target.as_str()) {
                continue;
            }
            links.push(Link::reference(&note.id, &marker.target));
        }
    }

    let tag_sets: Vec<HashSet<&str>> = notes
        .iter()
        .map(|note| note.tags.iter().map(String::as_str).collect())
        .collect();

    for (i, a) in notes.iter().enumerate() {
        if tag_sets[i].is_empty() {
            continue;
        }
        for (j, b) in notes.iter().enumerate().skip(i + 1) {
            if a.id == b.id {
                continue;
            }
            let shared = tag_sets[i].intersection(&tag_sets[j]).count() as u32;
            if shared > 0 {
                links.push(Link::shared_tag(&a.id, &b.id, shared));
            }
        }
    }

    links
}

/// Number of tags two notes have in common.
pub fn shared_tag_count(a: &Note, b: &Note) -> u32 {
    let a_tags: HashSet<&str> = a.tags.iter().map(String::as_str).collect();
    let b_tags: HashSet<&str> = b.tags.iter().map(String::as_str).collect();
    a_tags.intersection(&b_tags).count() as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub title: String,
    /// Links touching this note, parallel links counted separately.
    pub connections: usize,
}

/// One visual edge per note pair, parallel links merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    /// Sum of the merged link weights.
    pub weight: u32,
    pub bases: Vec<LinkBasis>,
}

/// Nodes and merged edges ready for drawing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphView {
    /// Extract links from `notes` and aggregate them.
    pub fn from_notes(notes: &[Note]) -> Self {
        let links = extract_links(notes);
        Self::build(notes, &links)
    }

    /// Aggregate `links` over `notes`.
    ///
    /// Nodes are ordered by connection count (most connected first, ties in
    /// input order). Edges follow first appearance; an edge's source is the
    /// pair member listed first in `notes`. Links naming notes outside
    /// `notes` are ignored.
    pub fn build(notes: &[Note], links: &[Link]) -> Self {
        let position: HashMap<&str, usize> = notes
            .iter()
            .enumerate()
            .map(|(i, note)| (note.id.as_str(), i))
            .collect();

        let mut connections = vec![0usize; notes.len()];
        let mut edge_slots: HashMap<(usize, usize), usize> = HashMap::new();
        let mut edges: Vec<GraphEdge> = Vec::new();

        for link in links {
            let (Some(&s), Some(&t)) = (
                position.get(link.source.as_str()),
                position.get(link.target.as_str()),
            ) else {
                continue;
            };
            if s == t {
                continue;
            }
            connections[s] += 1;
            connections[t] += 1;

            let key = (s.min(t), s.max(t));
            let slot = *edge_slots.entry(key).or_insert_with(|| {
                edges.push(GraphEdge {
                    source: notes[key.0].id.clone(),
                    target: notes[key.1].id.clone(),
                    weight: 0,
                    bases: Vec::new(),
                });
                edges.len() - 1
            });
            let edge = &mut edges[slot];
            edge.weight += link.weight;
            if !edge.bases.contains(&link.basis) {
                edge.bases.push(link.basis);
                edge.bases.sort();
            }
        }

        let mut nodes: Vec<GraphNode> = notes
            .iter()
            .zip(connections)
            .map(|(note, connections)| GraphNode {
                id: note.id.clone(),
                title: note.title.clone(),
                connections,
            })
            .collect();
        nodes.sort_by(|a, b| b.connections.cmp(&a.connections));

        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Notes with no links at all.
    pub fn isolated(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|node| node.connections == 0)
    }
}
