//! The log writer: validates, stamps and persists new entries.
//!
//! A write is one `KvStore::set` of the full entry under its encoded key.
//! With secondary indexing enabled the same value is also written under its
//! category-index and action-index keys, after the primary write.

use std::sync::Arc;

use chrono::{DateTime, Datelike, SubsecRound, Utc};
use tracing::{error, info};
use uuid::Uuid;

use sprout_contracts::{
    entry::{ActivityLogEntry, NewEntry},
    error::{AuditError, AuditResult, StoreError},
};
use sprout_core::traits::{Clock, KvStore};

use crate::key::{KeyEncoder, KeySpace};

pub struct LogWriter {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    keys: KeyEncoder,
    indexed: bool,
}

impl LogWriter {
    pub fn new(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        keys: KeyEncoder,
        indexed: bool,
    ) -> Self {
        Self {
            store,
            clock,
            keys,
            indexed,
        }
    }

    /// Persist `entry` and return its generated id.
    ///
    /// # Errors
    ///
    /// `AuditError::Validation` if the entry is malformed or the clock is
    /// outside the storable range (nothing is written).  `AuditError::Store`
    /// if the store rejects the primary or an index write; keys already
    /// written for the entry are deleted again before returning.
    pub fn write(&self, entry: NewEntry) -> AuditResult<String> {
        validate(&entry)?;

        // Keys carry microseconds; truncating keeps stored timestamps and
        // key order in agreement.
        let timestamp = self.clock.now().trunc_subsecs(6);
        check_key_range(timestamp)?;
        let id = generate_id(timestamp);
        let entry = ActivityLogEntry::from_new(id.clone(), timestamp, entry);

        let value = serde_json::to_value(&entry).map_err(|e| StoreError::Codec {
            reason: format!("failed to encode entry {}: {}", id, e),
        })?;

        let key = self.keys.entry_key(KeySpace::Primary, timestamp, &id);
        if let Err(e) = self.store.set(&key, value.clone()) {
            error!(key = %key, error = %e, "failed to persist activity log entry");
            return Err(e.into());
        }

        if self.indexed {
            let mut written = vec![key];
            for space in KeyEncoder::index_spaces(&entry) {
                let index_key = self.keys.entry_key(space, timestamp, &id);
                if let Err(e) = self.store.set(&index_key, value.clone()) {
                    error!(key = %index_key, error = %e, "failed to persist index copy");
                    self.roll_back(&written);
                    return Err(e.into());
                }
                written.push(index_key);
            }
        }

        info!(
            category = %entry.category,
            action = %entry.action,
            user = entry.actor.user_id.as_deref().unwrap_or("anonymous"),
            method = %entry.origin.method,
            endpoint = %entry.origin.endpoint,
            status = entry.result.status_code,
            "activity logged"
        );

        Ok(id)
    }

    /// Remove the keys of a partially written entry so that indexed and
    /// scanned queries keep agreeing.
    fn roll_back(&self, keys: &[String]) {
        if let Err(e) = self.store.delete_many(keys) {
            error!(
                keys = keys.len(),
                error = %e,
                "failed to roll back partially written activity log entry"
            );
        }
    }
}

/// `log_<unix-millis>_<uuid>`: readable creation time plus 122 random bits.
fn generate_id(timestamp: DateTime<Utc>) -> String {
    format!("log_{}_{}", timestamp.timestamp_millis(), Uuid::new_v4().simple())
}

/// Keys sort chronologically only while the year renders as four digits.
fn check_key_range(timestamp: DateTime<Utc>) -> AuditResult<()> {
    if (0..=9999).contains(&timestamp.year()) {
        Ok(())
    } else {
        Err(AuditError::Validation {
            reason: format!(
                "timestamp {} is outside the storable range (years 0000-9999)",
                timestamp
            ),
        })
    }
}

/// Write-boundary checks.  `category` is closed by its type.
pub(crate) fn validate(entry: &NewEntry) -> AuditResult<()> {
    entry.action.validate()?;

    if !(100..=599).contains(&entry.result.status_code) {
        return Err(AuditError::Validation {
            reason: format!(
                "status code {} is not a valid HTTP status",
                entry.result.status_code
            ),
        });
    }

    if entry.origin.method.trim().is_empty() {
        return Err(AuditError::Validation {
            reason: "origin method must not be empty".to_string(),
        });
    }

    Ok(())
}
