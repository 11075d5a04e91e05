use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::{Mutex, RwLock};

use crate::KnowledgeSettings;
use crate::errors::{KnowledgeError, KnowledgeResult};
use crate::graph::{GraphView, Link};
use crate::index::LinkIndex;
use crate::models::{Note, NoteCreateRequest, NoteUpdateRequest};
use crate::paths::knowledge_db_path;
use crate::related::{RelatedNote, related_notes};
use crate::search::{TermMatch, all_tags, search_notes, search_terms};
use crate::storage::{self, KnowledgeStore};

pub(crate) mod notes;

/// Note collection plus its derived link graph.
///
/// Links are kept in a [`LinkIndex`] ordered by creation, so shared-tag
/// edges point from the older note to the newer one. The index is rebuilt
/// from the store on open; writes made through the engine keep it current.
#[derive(Debug, Clone)]
pub struct KnowledgeEngine {
    settings: KnowledgeSettings,
    store: KnowledgeStore,
    pub(crate) index: Arc<RwLock<LinkIndex>>,
    /// Serializes mutations across the store and the index.
    pub(crate) writes: Arc<Mutex<()>>,
}

impl KnowledgeEngine {
    /// Open the database named by `settings`, seeding it if configured.
    pub async fn open(settings: KnowledgeSettings) -> KnowledgeResult<Self> {
        let path = knowledge_db_path(&settings)?;
        let store = KnowledgeStore::open(&path).await?;
        Self::from_store(settings, store).await
    }

    pub async fn from_store(
        settings: KnowledgeSettings,
        store: KnowledgeStore,
    ) -> KnowledgeResult<Self> {
        let engine = Self {
            settings,
            store,
            index: Arc::new(RwLock::new(LinkIndex::new())),
            writes: Arc::new(Mutex::new(())),
        };
        if engine.settings.seed_welcome_notes {
            notes::seed_if_empty(&engine).await?;
        }
        engine.reload_index().await?;
        Ok(engine)
    }

    /// Access the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        self.store.pool()
    }

    pub fn settings(&self) -> &KnowledgeSettings {
        &self.settings
    }

    /// Rebuild the link index from the store.
    pub async fn reload_index(&self) -> KnowledgeResult<()> {
        let notes = storage::list_notes(self.pool()).await?;
        let index = LinkIndex::from_notes(notes.iter().rev());
        *self.index.write().await = index;
        Ok(())
    }

    /// All notes, newest first.
    pub async fn list_notes(&self) -> KnowledgeResult<Vec<Note>> {
        storage::list_notes(self.pool()).await
    }

    pub async fn get_note(&self, id: &str) -> KnowledgeResult<Option<Note>> {
        storage::get_note(self.pool(), id).await
    }

    pub async fn create_note(&self, request: NoteCreateRequest) -> KnowledgeResult<Note> {
        notes::note_create(self, request).await
    }

    /// Apply a partial update. Fails with `UnknownNote` for a missing id.
    pub async fn update_note(&self, id: &str, request: NoteUpdateRequest) -> KnowledgeResult<Note> {
        notes::note_update(self, id, request).await
    }

    /// Returns whether a note with `id` existed.
    pub async fn delete_note(&self, id: &str) -> KnowledgeResult<bool> {
        notes::note_delete(self, id).await
    }

    /// Every derived link.
    pub async fn links(&self) -> Vec<Link> {
        self.index.read().await.links()
    }

    pub async fn graph(&self) -> GraphView {
        let index = self.index.read().await;
        let notes: Vec<Note> = index.notes().into_iter().cloned().collect();
        GraphView::build(&notes, &index.links())
    }

    /// Notes linked to `id`, strongest first. `limit` falls back to the
    /// configured default.
    pub async fn related(&self, id: &str, limit: Option<usize>) -> KnowledgeResult<Vec<RelatedNote>> {
        let index = self.index.read().await;
        if !index.contains(id) {
            return Err(KnowledgeError::UnknownNote(id.to_string()));
        }
        let links = index.links_for(id);
        let peers: Vec<Note> = index
            .notes()
            .into_iter()
            .filter(|note| links.iter().any(|link| link.touches(&note.id)))
            .cloned()
            .collect();
        let limit = limit.unwrap_or(self.settings.related_limit);
        Ok(related_notes(id, &peers, &links, limit).collect())
    }

    /// Case-insensitive title/content filter, newest first.
    pub async fn search(&self, query: &str) -> KnowledgeResult<Vec<Note>> {
        let notes = self.list_notes().await?;
        Ok(search_notes(&notes, query).into_iter().cloned().collect())
    }

    pub async fn search_terms(&self, terms: &[String]) -> KnowledgeResult<Vec<TermMatch>> {
        let notes = self.list_notes().await?;
        Ok(search_terms(&notes, terms))
    }

    /// Distinct tags, sorted.
    pub async fn tags(&self) -> KnowledgeResult<Vec<String>> {
        let notes = self.list_notes().await?;
        Ok(all_tags(&notes))
    }
}
