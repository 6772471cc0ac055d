//! The retention sweeper.
//!
//! A sweep computes `cutoff = now - older_than_days`, collects every primary
//! key stamped strictly before the cutoff, and deletes them in sequential
//! fixed-size batches.  A failed batch is logged and skipped; the sweep goes
//! on with the next one and only counts what was actually removed.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use sprout_contracts::{entry::ActivityLogEntry, error::AuditResult};
use sprout_core::{
    scan::ScanRequest,
    traits::{Clock, KvStore},
};

use crate::key::{KeyEncoder, KeySpace};

/// What one sweep did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// `None` when the cutoff falls before the earliest representable instant.
    pub cutoff: Option<DateTime<Utc>>,
    /// Entries found older than the cutoff.
    pub stale: usize,
    /// Entries removed.
    pub deleted: usize,
    pub failed_batches: usize,
    pub failed_keys: usize,
}

pub struct RetentionSweeper {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    keys: KeyEncoder,
    batch_size: usize,
    indexed: bool,
}

impl RetentionSweeper {
    pub fn new(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        keys: KeyEncoder,
        batch_size: usize,
        indexed: bool,
    ) -> Self {
        Self {
            store,
            clock,
            keys,
            batch_size: batch_size.max(1),
            indexed,
        }
    }

    /// Delete entries older than `older_than_days` days.
    ///
    /// # Errors
    ///
    /// Only the discovery scan can fail the sweep.  Batch failures are
    /// reported in `SweepReport::failed_batches`.
    pub fn sweep(&self, older_than_days: u32) -> AuditResult<SweepReport> {
        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(Duration::days(i64::from(older_than_days)));

        let mut report = SweepReport {
            cutoff,
            stale: 0,
            deleted: 0,
            failed_batches: 0,
            failed_keys: 0,
        };
        let Some(cutoff) = cutoff else {
            return Ok(report);
        };

        let request = ScanRequest::prefix(self.keys.scan_prefix(KeySpace::Primary))
            .ending_before(self.keys.cutoff(KeySpace::Primary, cutoff));
        let stale = self.store.scan(&request)?;
        report.stale = stale.len();

        let mut retained = HashSet::new();
        for (index, batch) in stale.chunks(self.batch_size).enumerate() {
            let keys: Vec<String> = batch.iter().map(|(key, _)| key.clone()).collect();
            match self.store.delete_many(&keys) {
                Ok(()) => report.deleted += keys.len(),
                Err(e) => {
                    warn!(
                        batch = index,
                        keys = keys.len(),
                        error = %e,
                        "failed to delete activity log batch"
                    );
                    report.failed_batches += 1;
                    report.failed_keys += keys.len();
                    retained.extend(batch.iter().filter_map(|(_, value)| entry_id(value)));
                }
            }
        }

        if self.indexed {
            self.sweep_index(cutoff, &retained);
        }

        info!(
            cutoff = %cutoff,
            deleted = report.deleted,
            failed_batches = report.failed_batches,
            "cleaned up old activity logs"
        );

        Ok(report)
    }

    /// Remove index copies stamped before `cutoff`, except copies of
    /// entries whose primary delete failed.  Copies left behind by an
    /// earlier failed pass are picked up here too.  Failures are only logged.
    fn sweep_index(&self, cutoff: DateTime<Utc>, retained: &HashSet<String>) {
        let request = ScanRequest::prefix(self.keys.index_root_prefix());
        let rows = match self.store.scan(&request) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "failed to scan secondary index for cleanup");
                return;
            }
        };

        let mut stale = Vec::new();
        for (key, value) in rows {
            match serde_json::from_value::<ActivityLogEntry>(value) {
                Ok(entry) if entry.timestamp < cutoff && !retained.contains(&entry.id) => {
                    stale.push(key)
                }
                Ok(_) => {}
                Err(e) => warn!(key = %key, error = %e, "skipping undecodable index copy"),
            }
        }

        for batch in stale.chunks(self.batch_size) {
            if let Err(e) = self.store.delete_many(batch) {
                warn!(keys = batch.len(), error = %e, "failed to delete index copies");
            }
        }
    }
}

fn entry_id(value: &Value) -> Option<String> {
    value.get("id").and_then(Value::as_str).map(str::to_string)
}
