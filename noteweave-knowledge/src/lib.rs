//! Notes and the relationships between them for noteweave.

pub mod engine;
pub mod errors;
pub mod graph;
pub mod index;
pub mod models;
pub mod parser;
pub mod paths;
pub mod related;
pub mod search;
pub mod seed;
pub mod storage;

pub use engine::KnowledgeEngine;
pub use errors::{KnowledgeError, KnowledgeResult};
pub use graph::{GraphEdge, GraphNode, GraphView, Link, LinkBasis, extract_links};
pub use index::LinkIndex;
pub use models::{Note, NoteCreateRequest, NoteUpdateRequest};
pub use noteweave_core::config::KnowledgeSettings;
pub use related::RelatedNote;
pub use search::TermMatch;
