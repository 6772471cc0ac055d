//! Seam traits between the audit log and its collaborators.
//!
//! - `KvStore`    : the flat key-value substrate the log is persisted in
//! - `Clock`      : the source of write and cutoff timestamps
//! - `RequestView`: read-only view of an inbound request, implemented by
//!   the routing layer
//!
//! Every component takes these as injected handles; there is no process-wide
//! store or clock.

use chrono::{DateTime, Utc};
use serde_json::Value;

use sprout_contracts::error::StoreError;

use crate::scan::ScanRequest;

/// A flat key-value store with atomic per-key writes and ordered range scans.
///
/// Implementations must fail rather than hang on connectivity problems.
/// Scans are snapshots; an entry written concurrently may or may not appear.
pub trait KvStore: Send + Sync {
    /// Read one key.  A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Insert or replace the value at `key`.
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Return every `(key, value)` pair whose key starts with
    /// `request.prefix` and lies within the request's bounds, in the
    /// requested order, truncated to `request.limit` if set.
    fn scan(&self, request: &ScanRequest) -> Result<Vec<(String, Value)>, StoreError>;

    /// Delete a batch of keys.  Missing keys are ignored.
    ///
    /// Either the whole batch is removed or an error is returned; callers
    /// treat an error as "nothing in this batch was deleted".
    fn delete_many(&self, keys: &[String]) -> Result<(), StoreError>;
}

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Read-only view of an inbound request, as far as the audit log needs it.
pub trait RequestView {
    /// Header value by name.  Implementations match names case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    /// Host part of the raw connection's peer address, if known.
    fn remote_addr(&self) -> Option<&str>;

    /// Request path, e.g. `/sessions/complete`.
    fn path(&self) -> &str;

    /// HTTP method, e.g. `POST`.
    fn method(&self) -> &str;
}
