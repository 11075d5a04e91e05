#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("missing data directory")]
    MissingDataDir,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("invalid timestamp in store: {0}")]
    InvalidTimestamp(String),
    #[error("unknown note: {0}")]
    UnknownNote(String),
}

pub type KnowledgeResult<T> = Result<T, KnowledgeError>;
