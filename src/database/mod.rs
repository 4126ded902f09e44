//! Key-value persistence boundary.
//!
//! Every logical piece of learner state is one JSON document under one key.
//! The services only ever go through [`load_json`] and [`save_json`], which
//! absorb failures into [`Diagnostics`].

pub mod db;
pub mod memory;

pub use db::SqliteStore;
pub use memory::MemoryStore;

use crate::diagnostics::{Diagnostics, PersistenceOp};
use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const REVIEW_SCHEDULE_KEY: &str = "review-schedule";
pub const WRONG_ANSWERS_KEY: &str = "wrong-answers";
pub const CATEGORY_STATS_KEY: &str = "category-stats";
pub const CLOCK_OFFSET_KEY: &str = "clock-offset-days";

/// Synchronous string store. Last writer wins per key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Reads and parses `key`, falling back to `T::default()` when the value is
/// absent, unreadable or corrupt.
pub fn load_json<T>(store: &dyn KeyValueStore, key: &str, diagnostics: &Diagnostics) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            diagnostics.report(key, PersistenceOp::Read, e.to_string());
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            diagnostics.report(key, PersistenceOp::Parse, e.to_string());
            T::default()
        }
    }
}

/// Serializes and writes `value` under `key`. Returns whether it was stored.
pub fn save_json<T>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
    diagnostics: &Diagnostics,
) -> bool
where
    T: Serialize + ?Sized,
{
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            diagnostics.report(key, PersistenceOp::Serialize, e.to_string());
            return false;
        }
    };

    match store.set(key, &raw) {
        Ok(()) => true,
        Err(e) => {
            diagnostics.report(key, PersistenceOp::Write, e.to_string());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_load_missing_key_is_default_without_issue() {
        let store = MemoryStore::new();
        let diagnostics = Diagnostics::new();

        let value: BTreeMap<String, u32> = load_json(&store, "nothing", &diagnostics);
        assert!(value.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_load_corrupt_json_reports_parse_issue() {
        let store = MemoryStore::new();
        store.set("wrong-answers", "{ not json").unwrap();
        let diagnostics = Diagnostics::new();

        let value: Vec<u32> = load_json(&store, "wrong-answers", &diagnostics);
        assert!(value.is_empty());

        let issues = diagnostics.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].op, PersistenceOp::Parse);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let diagnostics = Diagnostics::new();

        let mut value = BTreeMap::new();
        value.insert("q1".to_string(), 3u32);
        assert!(save_json(&store, "counts", &value, &diagnostics));

        let loaded: BTreeMap<String, u32> = load_json(&store, "counts", &diagnostics);
        assert_eq!(loaded.get("q1"), Some(&3));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let store = MemoryStore::read_only();
        let diagnostics = Diagnostics::new();

        assert!(!save_json(&store, "counts", &vec![1, 2, 3], &diagnostics));
        assert_eq!(diagnostics.issues()[0].op, PersistenceOp::Write);
    }
}
