//! SQLite-backed key-value store
//!
//! Handles database initialization and the single `kv` table that holds each
//! JSON document (review schedule, wrong answers, category stats, clock offset).

use super::KeyValueStore;
use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        init_database(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_database(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lists stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(keys)
    }
}

/// Creates the key-value table
fn init_database(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        (),
    )?;
    Ok(())
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get("wrong-answers").unwrap(), None);

        store.set("wrong-answers", "[]").unwrap();
        store.set("wrong-answers", "[1]").unwrap();
        assert_eq!(store.get("wrong-answers").unwrap().as_deref(), Some("[1]"));

        store.remove("wrong-answers").unwrap();
        assert_eq!(store.get("wrong-answers").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("review.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("review-schedule", "{}").unwrap();
            store.set("category-stats", "{}").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("review-schedule").unwrap().as_deref(), Some("{}"));
        assert_eq!(
            store.keys().unwrap(),
            vec!["category-stats".to_string(), "review-schedule".to_string()]
        );
    }
}
