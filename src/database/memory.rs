//! In-memory key-value store, mostly for tests and throwaway sessions.

use super::KeyValueStore;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write, for exercising failure paths.
    pub fn read_only() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            read_only: true,
        }
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "store is read-only",
            )));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        let mut values = self.values.lock().map_err(|_| Error::LockPoisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        let mut values = self.values.lock().map_err(|_| Error::LockPoisoned)?;
        values.remove(key);
        Ok(())
    }
}
