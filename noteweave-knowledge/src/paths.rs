use std::path::PathBuf;

use crate::KnowledgeSettings;
use crate::errors::{KnowledgeError, KnowledgeResult};

pub const DB_FILE_NAME: &str = "notes.sqlite3";

pub fn data_root() -> KnowledgeResult<PathBuf> {
    if let Ok(override_dir) = std::env::var("NOTEWEAVE_DATA_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let dir = dirs::data_dir().ok_or(KnowledgeError::MissingDataDir)?;
    Ok(dir.join("noteweave"))
}

pub fn knowledge_db_path(settings: &KnowledgeSettings) -> KnowledgeResult<PathBuf> {
    if let Some(path) = &settings.db_path_override {
        return Ok(path.clone());
    }
    if let Some(root) = &settings.data_root_override {
        return Ok(root.join(DB_FILE_NAME));
    }
    Ok(data_root()?.join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins_over_data_root() {
        let settings = KnowledgeSettings {
            db_path_override: Some(PathBuf::from("/tmp/a.sqlite3")),
            data_root_override: Some(PathBuf::from("/tmp/root")),
            ..Default::default()
        };
        assert_eq!(
            knowledge_db_path(&settings).unwrap(),
            PathBuf::from("/tmp/a.sqlite3")
        );
    }

    #[test]
    fn data_root_override_gets_default_file_name() {
        let settings = KnowledgeSettings {
            data_root_override: Some(PathBuf::from("/tmp/root")),
            ..Default::default()
        };
        assert_eq!(
            knowledge_db_path(&settings).unwrap(),
            PathBuf::from("/tmp/root/notes.sqlite3")
        );
    }
}
