use rusqlite::{OptionalExtension, Result as SqlResult, params};
use std::path::Path;

use super::StoreError;
use super::database::Database;

/// String key-value substrate the widget persists into.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// SQLite-backed key-value store with an optional total size quota.
pub struct KvDatabase {
    db: Database,
    quota_bytes: Option<usize>,
}

impl KvDatabase {
    /// Open (or create) the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        let store = Self {
            db: Database::open(path)?,
            quota_bytes: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> SqlResult<Self> {
        let store = Self {
            db: Database::in_memory()?,
            quota_bytes: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Reject writes that would push the stored keys and values past `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    fn init_schema(&self) -> SqlResult<()> {
        self.db.connection().execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            )",
            [],
        )?;
        Ok(())
    }

    /// Bytes used by every key except `key`.
    fn used_bytes_excluding(&self, key: &str) -> SqlResult<usize> {
        let used: i64 = self.db.connection().query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
             FROM kv WHERE key != ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(used.max(0) as usize)
    }
}

impl KeyValueStore for KvDatabase {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .db
            .connection()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(limit) = self.quota_bytes {
            let needed = self.used_bytes_excluding(key)? + key.len() + value.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded { needed, limit });
            }
        }
        self.db.connection().execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now'))",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.db
            .connection()
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = KvDatabase::in_memory().unwrap();
        assert_eq!(store.get("theme").unwrap(), None);

        store.set("theme", "dark").unwrap();
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));

        store.remove("theme").unwrap();
        assert_eq!(store.get("theme").unwrap(), None);
    }

    #[test]
    fn quota_counts_keys_and_values_but_not_the_overwritten_entry() {
        let store = KvDatabase::in_memory().unwrap().with_quota(12);
        store.set("a", "12345").unwrap();
        store.set("b", "12345").unwrap();
        // Replacing "b" frees its old bytes first.
        store.set("b", "54321").unwrap();

        let err = store.set("c", "x").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { needed: 14, limit: 12 }));
        assert_eq!(store.get("c").unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widget.db");
        {
            let store = KvDatabase::open(&path).unwrap();
            store.set("theme", "dark").unwrap();
        }
        let store = KvDatabase::open(&path).unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }
}
