use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};

use crate::errors::{KnowledgeError, KnowledgeResult};
use crate::models::Note;

#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    pool: SqlitePool,
}

impl KnowledgeStore {
    pub async fn open(db_path: &Path) -> KnowledgeResult<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA synchronous = NORMAL")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect_with(options)
            .await?;

        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database on a single connection.
    pub async fn open_in_memory() -> KnowledgeResult<Self> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn run_migrations(pool: &SqlitePool) -> KnowledgeResult<()> {
    sqlx::migrate!("./migrations/knowledge").run(pool).await?;
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct NoteRow {
    id: String,
    title: String,
    content: String,
    created_at: String,
    updated_at: String,
}

impl NoteRow {
    fn into_note(self, tags: Vec<String>) -> KnowledgeResult<Note> {
        Ok(Note {
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            title: self.title,
            content: self.content,
            tags,
        })
    }
}

/// Fixed-width RFC 3339 so stored timestamps sort as text.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> KnowledgeResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| KnowledgeError::InvalidTimestamp(raw.to_string()))
}

/// All notes, newest first.
pub async fn list_notes(pool: &SqlitePool) -> KnowledgeResult<Vec<Note>> {
    let rows: Vec<NoteRow> = sqlx::query_as(
        "SELECT id, title, content, created_at, updated_at FROM notes
         ORDER BY created_at DESC, rowid DESC",
    )
    .fetch_all(pool)
    .await?;

    let tag_rows: Vec<(String, String)> =
        sqlx::query_as("SELECT note_id, tag FROM note_tags ORDER BY note_id, position")
            .fetch_all(pool)
            .await?;
    let mut tags: HashMap<String, Vec<String>> = HashMap::new();
    for (note_id, tag) in tag_rows {
        tags.entry(note_id).or_default().push(tag);
    }

    rows.into_iter()
        .map(|row| {
            let note_tags = tags.remove(&row.id).unwrap_or_default();
            row.into_note(note_tags)
        })
        .collect()
}

pub async fn get_note(pool: &SqlitePool, id: &str) -> KnowledgeResult<Option<Note>> {
    let row: Option<NoteRow> = sqlx::query_as(
        "SELECT id, title, content, created_at, updated_at FROM notes WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let tags: Vec<(String,)> =
        sqlx::query_as("SELECT tag FROM note_tags WHERE note_id = ? ORDER BY position")
            .bind(id)
            .fetch_all(pool)
            .await?;
    let tags = tags.into_iter().map(|(tag,)| tag).collect();
    row.into_note(tags).map(Some)
}

/// Insert or fully overwrite a note and its tags.
pub async fn upsert_note(pool: &SqlitePool, note: &Note) -> KnowledgeResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"INSERT INTO notes (id, title, content, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title=excluded.title,
            content=excluded.content,
            updated_at=excluded.updated_at"#,
    )
    .bind(&note.id)
    .bind(&note.title)
    .bind(&note.content)
    .bind(format_timestamp(&note.created_at))
    .bind(format_timestamp(&note.updated_at))
    .execute(&mut *tx)
    .await?;

    replace_tags(&mut *tx, &note.id, &note.tags).await?;
    tx.commit().await?;
    Ok(())
}

/// Overwrite an existing note and its tags. Returns `false` when no note
/// with that id exists; nothing is written in that case.
pub async fn update_note(pool: &SqlitePool, note: &Note) -> KnowledgeResult<bool> {
    let mut tx = pool.begin().await?;

    let result =
        sqlx::query("UPDATE notes SET title = ?, content = ?, updated_at = ? WHERE id = ?")
            .bind(&note.title)
            .bind(&note.content)
            .bind(format_timestamp(&note.updated_at))
            .bind(&note.id)
            .execute(&mut *tx)
            .await?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }

    replace_tags(&mut *tx, &note.id, &note.tags).await?;
    tx.commit().await?;
    Ok(true)
}

async fn replace_tags(
    conn: &mut SqliteConnection,
    note_id: &str,
    tags: &[String],
) -> KnowledgeResult<()> {
    sqlx::query("DELETE FROM note_tags WHERE note_id = ?")
        .bind(note_id)
        .execute(&mut *conn)
        .await?;

    for (position, tag) in tags.iter().enumerate() {
        sqlx::query("INSERT OR IGNORE INTO note_tags (note_id, tag, position) VALUES (?, ?, ?)")
            .bind(note_id)
            .bind(tag)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Returns whether a note was removed.
pub async fn delete_note(pool: &SqlitePool, id: &str) -> KnowledgeResult<bool> {
    let result = sqlx::query("DELETE FROM notes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_notes(pool: &SqlitePool) -> KnowledgeResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notes")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
