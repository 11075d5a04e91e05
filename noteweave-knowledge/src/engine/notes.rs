use tracing::{debug, info};

use crate::errors::{KnowledgeError, KnowledgeResult};
use crate::models::{Note, NoteCreateRequest, NoteUpdateRequest};
use crate::seed::welcome_notes;
use crate::storage::{count_notes, delete_note, get_note, update_note, upsert_note};

use super::KnowledgeEngine;

pub(crate) async fn note_create(
    engine: &KnowledgeEngine,
    request: NoteCreateRequest,
) -> KnowledgeResult<Note> {
    let note = request.into_note();
    let _writes = engine.writes.lock().await;
    upsert_note(engine.pool(), &note).await?;
    engine.index.write().await.upsert(note.clone());
    debug!(note_id = %note.id, title = %note.title, "note created");
    Ok(note)
}

pub(crate) async fn note_update(
    engine: &KnowledgeEngine,
    id: &str,
    request: NoteUpdateRequest,
) -> KnowledgeResult<Note> {
    // Held across read, write and reindex so concurrent edits and deletes
    // apply one after another.
    let _writes = engine.writes.lock().await;
    let mut note = get_note(engine.pool(), id)
        .await?
        .ok_or_else(|| KnowledgeError::UnknownNote(id.to_string()))?;
    note.apply(request);

    if !update_note(engine.pool(), &note).await? {
        return Err(KnowledgeError::UnknownNote(id.to_string()));
    }
    engine.index.write().await.upsert(note.clone());
    debug!(note_id = %note.id, "note updated");
    Ok(note)
}

pub(crate) async fn note_delete(engine: &KnowledgeEngine, id: &str) -> KnowledgeResult<bool> {
    let _writes = engine.writes.lock().await;
    let deleted = delete_note(engine.pool(), id).await?;
    engine.index.write().await.remove(id);
    if deleted {
        debug!(note_id = %id, "note deleted");
    }
    Ok(deleted)
}

/// Insert the welcome notes when the store holds nothing yet.
pub(crate) async fn seed_if_empty(engine: &KnowledgeEngine) -> KnowledgeResult<usize> {
    let _writes = engine.writes.lock().await;
    if count_notes(engine.pool()).await? > 0 {
        return Ok(0);
    }

    let notes = welcome_notes();
    for note in &notes {
        upsert_note(engine.pool(), note).await?;
    }
    info!(count = notes.len(), "seeded welcome notes");
    Ok(notes.len())
}
