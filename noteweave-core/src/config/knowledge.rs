//! Knowledge system configuration types.
//!
//! These types define the resolved (non-optional) settings used by
//! `noteweave-knowledge`. They are created from the user-facing
//! `KnowledgeFileSettings` TOML struct via `From`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::settings::KnowledgeFileSettings;

/// Resolved knowledge engine settings (all values filled with defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSettings {
    /// Explicit database file location
    #[serde(default)]
    pub db_path_override: Option<PathBuf>,
    /// Override the root data directory for the database.
    /// Primarily for testing.
    #[serde(default)]
    pub data_root_override: Option<PathBuf>,
    #[serde(default = "default_seed_welcome_notes")]
    pub seed_welcome_notes: bool,
    #[serde(default = "default_related_limit")]
    pub related_limit: usize,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            db_path_override: None,
            data_root_override: None,
            seed_welcome_notes: default_seed_welcome_notes(),
            related_limit: default_related_limit(),
        }
    }
}

fn default_seed_welcome_notes() -> bool {
    true
}

fn default_related_limit() -> usize {
    5
}

impl From<&KnowledgeFileSettings> for KnowledgeSettings {
    fn from(value: &KnowledgeFileSettings) -> Self {
        let mut settings = KnowledgeSettings::default();
        if let Some(path) = &value.db_path {
            settings.db_path_override = Some(PathBuf::from(path));
        }
        if let Some(seed) = value.seed_welcome_notes {
            settings.seed_welcome_notes = seed;
        }
        if let Some(limit) = value.related_limit {
            settings.related_limit = limit;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_defaults() {
        let resolved = KnowledgeSettings::from(&KnowledgeFileSettings::default());
        assert!(resolved.db_path_override.is_none());
        assert!(resolved.seed_welcome_notes);
        assert_eq!(resolved.related_limit, 5);
    }

    #[test]
    fn test_applies_overrides() {
        let file = KnowledgeFileSettings {
            db_path: Some("/tmp/nw.sqlite3".to_string()),
            seed_welcome_notes: Some(false),
            related_limit: Some(12),
        };
        let resolved = KnowledgeSettings::from(&file);
        assert_eq!(resolved.db_path_override, Some(PathBuf::from("/tmp/nw.sqlite3")));
        assert!(!resolved.seed_welcome_notes);
        assert_eq!(resolved.related_limit, 12);
    }
}
