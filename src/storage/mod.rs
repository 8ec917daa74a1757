pub mod database;
pub mod history_cache;
pub mod kv_store;

pub use history_cache::{CachedHistory, HistoryCache};
pub use kv_store::{KeyValueStore, KvDatabase};

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::common::Theme;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("storage quota exceeded ({needed} of {limit} bytes)")]
    QuotaExceeded { needed: usize, limit: usize },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Ensure the directory holding the database file exists
pub fn ensure_data_dir(db_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Stored theme, light when unset or unreadable.
pub fn load_theme(store: &impl KeyValueStore) -> Theme {
    match store.get(THEME_KEY) {
        Ok(Some(raw)) => Theme::parse(&raw).unwrap_or_default(),
        Ok(None) => Theme::default(),
        Err(err) => {
            log::warn!("Failed to read theme: {err}");
            Theme::default()
        }
    }
}

pub fn save_theme(store: &impl KeyValueStore, theme: Theme) {
    if let Err(err) = store.set(THEME_KEY, theme.as_str()) {
        log::warn!("Failed to persist theme: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_defaults_to_light_and_persists_plain_string() {
        let store = KvDatabase::in_memory().unwrap();
        assert_eq!(load_theme(&store), Theme::Light);

        save_theme(&store, Theme::Dark);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(load_theme(&store), Theme::Dark);

        store.set(THEME_KEY, "neon").unwrap();
        assert_eq!(load_theme(&store), Theme::Light);
    }

    #[test]
    fn data_dir_is_created_for_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data").join("widget.db");
        ensure_data_dir(&db_path).unwrap();
        assert!(dir.path().join("data").is_dir());
    }
}
