//! JSON-file implementation of `KvStore`.
//!
//! The whole key space is one JSON object on disk.  Reads are served from
//! memory; every mutation rewrites the file through a sibling temp file and
//! a rename, so a crash mid-write leaves the previous version intact.  Meant
//! for the operator CLI and local development, not for concurrent processes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use tracing::debug;

use sprout_contracts::error::StoreError;
use sprout_core::{scan::ScanRequest, traits::KvStore};

use crate::memory::scan_map;

pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| StoreError::Codec {
                    reason: format!("'{}' is not a JSON object of entries: {}", path.display(), e),
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "opened json file store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, Value>>, StoreError> {
        self.entries.lock().map_err(|e| StoreError::Unavailable {
            reason: format!("file store lock poisoned: {}", e),
        })
    }

    fn persist(&self, entries: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(entries).map_err(|e| StoreError::Codec {
            reason: format!("failed to encode store: {}", e),
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = self.lock()?;
        let previous = entries.insert(key.to_string(), value);
        if let Err(e) = self.persist(&entries) {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn scan(&self, request: &ScanRequest) -> Result<Vec<(String, Value)>, StoreError> {
        let entries = self.lock()?;
        Ok(scan_map(&entries, request))
    }

    fn delete_many(&self, keys: &[String]) -> Result<(), StoreError> {
        let mut entries = self.lock()?;
        let mut next = entries.clone();
        for key in keys {
            next.remove(key);
        }
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io {
        reason: format!("'{}': {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.set("activity_log:1", json!({ "n": 1 })).unwrap();
            store.set("activity_log:2", json!({ "n": 2 })).unwrap();
            store.delete_many(&["activity_log:1".to_string()]).unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("activity_log:1").unwrap(), None);
        assert_eq!(store.get("activity_log:2").unwrap(), Some(json!({ "n": 2 })));

        let rows = store.scan(&ScanRequest::prefix("activity_log:")).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("absent.json")).unwrap();
        assert!(store.scan(&ScanRequest::prefix("")).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_object_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        match JsonFileStore::open(&path) {
            Err(StoreError::Codec { reason }) => assert!(reason.contains("not a JSON object")),
            other => panic!("expected Codec error, got {:?}", other.map(|_| ())),
        }
    }
}
