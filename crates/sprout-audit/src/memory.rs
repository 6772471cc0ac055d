//! In-memory implementation of `KvStore`.
//!
//! `InMemoryStore` is the reference implementation of the `KvStore` trait.
//! It keeps every pair in a `BTreeMap` protected by a `Mutex`, so key order
//! is native and range scans are exact.  Clones share the same map.
//!
//! It also carries failure hooks so tests can exercise the store-error paths
//! of the writer and the sweeper.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use sprout_contracts::error::StoreError;
use sprout_core::{
    scan::{ScanOrder, ScanRequest},
    traits::KvStore,
};

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryState {
    entries: BTreeMap<String, Value>,

    /// When true, every `set` fails with `StoreError::Unavailable`.
    fail_sets: bool,

    /// 1-based indices of `set` calls that must fail.
    failing_set_calls: BTreeSet<usize>,

    /// Number of `set` calls seen so far.
    set_calls: usize,

    /// 1-based indices of `delete_many` calls that must fail.
    failing_deletes: BTreeSet<usize>,

    /// Number of `delete_many` calls seen so far.
    delete_calls: usize,
}

// ── Public store ──────────────────────────────────────────────────────────────

/// A process-local `KvStore` backed by a sorted map.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored, across all prefixes.
    pub fn len(&self) -> usize {
        self.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every stored key in ascending order.
    pub fn keys(&self) -> Vec<String> {
        self.lock()
            .map(|s| s.entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Make subsequent `set` calls fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        if let Ok(mut state) = self.lock() {
            state.fail_sets = fail;
        }
    }

    /// Make the `n`-th `set` call (1-based, counted from creation) fail.
    pub fn fail_set_call(&self, n: usize) {
        if let Ok(mut state) = self.lock() {
            state.failing_set_calls.insert(n);
        }
    }

    /// Make the `n`-th `delete_many` call (1-based, counted from creation)
    /// fail without deleting anything.
    pub fn fail_delete_call(&self, n: usize) {
        if let Ok(mut state) = self.lock() {
            state.failing_deletes.insert(n);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|e| StoreError::Unavailable {
            reason: format!("memory store lock poisoned: {}", e),
        })
    }
}

impl KvStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.set_calls += 1;
        let call = state.set_calls;
        if state.fail_sets || state.failing_set_calls.contains(&call) {
            return Err(StoreError::Unavailable {
                reason: format!("injected write failure for key '{}'", key),
            });
        }
        state.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn scan(&self, request: &ScanRequest) -> Result<Vec<(String, Value)>, StoreError> {
        let state = self.lock()?;
        Ok(scan_map(&state.entries, request))
    }

    fn delete_many(&self, keys: &[String]) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.delete_calls += 1;
        let call = state.delete_calls;
        if state.failing_deletes.contains(&call) {
            return Err(StoreError::Unavailable {
                reason: format!("injected failure on delete call {}", call),
            });
        }
        for key in keys {
            state.entries.remove(key);
        }
        Ok(())
    }
}

/// Apply `request` to a sorted map.  Shared with `JsonFileStore`.
pub(crate) fn scan_map(map: &BTreeMap<String, Value>, request: &ScanRequest) -> Vec<(String, Value)> {
    let mut rows: Vec<(String, Value)> = map
        .range::<str, _>((Bound::Included(request.prefix.as_str()), Bound::Unbounded))
        .take_while(|(key, _)| key.starts_with(&request.prefix))
        .filter(|(key, _)| request.contains(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if request.order == ScanOrder::Descending {
        rows.reverse();
    }
    if let Some(limit) = request.limit {
        rows.truncate(limit);
    }
    rows
}
