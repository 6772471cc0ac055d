//! Error types for the Sprout audit subsystem.
//!
//! Every fallible audit operation returns `AuditResult<T>`.  Store
//! implementations return the narrower `StoreError`, which converts into
//! `AuditError::Store` with `?`.

use thiserror::Error;

/// The unified error type for the audit log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The entry was rejected at the write boundary before touching the store.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// The backing key-value store call failed.
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Failure reported by a `KvStore` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached (connectivity, timeout).
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The store refused the request (quota, constraint violation).
    #[error("store rejected request: {reason}")]
    Rejected { reason: String },

    /// A value could not be encoded or decoded.
    #[error("store codec error: {reason}")]
    Codec { reason: String },

    /// Local I/O failed (file-backed stores).
    #[error("store i/o error: {reason}")]
    Io { reason: String },
}

/// Convenience alias used throughout the Sprout crates.
pub type AuditResult<T> = Result<T, AuditError>;
