//! `ActivityLog`: the audit subsystem as one injected handle.
//!
//! Owns a writer, a query engine and a sweeper that all share the same
//! store, clock and key layout.  Limits left as `None` fall back to the
//! configured defaults.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::error;

use sprout_config::{AuditConfig, WriteMode};
use sprout_contracts::{
    action::Action,
    category::Category,
    entry::{ActivityLogEntry, NewEntry},
    error::{AuditError, AuditResult},
    query::{ActivityStats, LogFilter, StatsQuery},
};
use sprout_core::{
    clock::SystemClock,
    traits::{Clock, KvStore},
};

use crate::{
    key::KeyEncoder,
    query::QueryEngine,
    retention::{RetentionSweeper, SweepReport},
    stats::StatsAggregator,
    writer::LogWriter,
};

pub struct ActivityLog {
    writer: LogWriter,
    engine: QueryEngine,
    sweeper: RetentionSweeper,
    config: AuditConfig,
}

impl ActivityLog {
    /// Build the subsystem over `store`, stamping entries with `clock`.
    ///
    /// Returns `AuditError::Config` if `config` fails validation.
    pub fn new(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        config: AuditConfig,
    ) -> AuditResult<Self> {
        config.validate()?;
        Ok(Self::build(store, clock, config))
    }

    /// Default configuration and the system clock.
    pub fn with_store(store: Arc<dyn KvStore>) -> Self {
        Self::build(store, Arc::new(SystemClock), AuditConfig::default())
    }

    fn build(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, config: AuditConfig) -> Self {
        let keys = KeyEncoder::new(config.store.key_prefix.clone());
        let indexed = config.index.secondary;

        Self {
            writer: LogWriter::new(store.clone(), clock.clone(), keys.clone(), indexed),
            engine: QueryEngine::new(store.clone(), keys.clone(), indexed),
            sweeper: RetentionSweeper::new(
                store,
                clock,
                keys,
                config.retention.batch_size,
                indexed,
            ),
            config,
        }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    // ── Writes ────────────────────────────────────────────────────────────

    /// Persist `entry` and return its id.  Always strict: any failure is
    /// returned to the caller.
    pub fn write(&self, entry: NewEntry) -> AuditResult<String> {
        self.writer.write(entry)
    }

    /// Persist `entry` under the configured `WriteMode`.
    ///
    /// In `BestEffort` mode a store failure is logged and reported as
    /// `Ok(None)`, so the audited operation is never aborted by its own
    /// audit trail.  In `Strict` mode the failure is returned.  A malformed
    /// entry is a caller bug and returns `AuditError::Validation` in either
    /// mode.
    pub fn record(&self, entry: NewEntry) -> AuditResult<Option<String>> {
        let category = entry.category;
        let action = entry.action.clone();
        match self.writer.write(entry) {
            Ok(id) => Ok(Some(id)),
            Err(e @ AuditError::Store(_)) if self.config.write.mode == WriteMode::BestEffort => {
                error!(
                    category = %category,
                    action = %action,
                    error = %e,
                    "activity log write failed; continuing without audit record"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn query_by_user(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> AuditResult<Vec<ActivityLogEntry>> {
        self.engine.by_user(user_id, self.default_limit(limit))
    }

    pub fn query_by_category(
        &self,
        category: Category,
        limit: Option<usize>,
    ) -> AuditResult<Vec<ActivityLogEntry>> {
        self.engine.by_category(category, self.default_limit(limit))
    }

    pub fn query_by_action(
        &self,
        action: &Action,
        limit: Option<usize>,
    ) -> AuditResult<Vec<ActivityLogEntry>> {
        self.engine.by_action(action, self.default_limit(limit))
    }

    pub fn query_by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: Option<usize>,
    ) -> AuditResult<Vec<ActivityLogEntry>> {
        let limit = limit.unwrap_or(self.config.query.time_range_limit);
        self.engine.by_time_range(start, end, limit)
    }

    pub fn search(
        &self,
        filter: &LogFilter,
        limit: Option<usize>,
    ) -> AuditResult<Vec<ActivityLogEntry>> {
        self.engine.search(filter, self.default_limit(limit))
    }

    pub fn recent(&self, limit: Option<usize>) -> AuditResult<Vec<ActivityLogEntry>> {
        self.engine.recent(self.default_limit(limit))
    }

    pub fn stats(&self, query: &StatsQuery) -> AuditResult<ActivityStats> {
        StatsAggregator::new(&self.engine, self.config.query.recent_sample).compute(query)
    }

    // ── Retention ─────────────────────────────────────────────────────────

    /// Delete entries older than `older_than_days` and return how many were
    /// removed.  Entries in failed batches are not counted.
    pub fn cleanup(&self, older_than_days: u32) -> AuditResult<usize> {
        Ok(self.sweeper.sweep(older_than_days)?.deleted)
    }

    /// Like `cleanup`, with the full report.
    pub fn sweep(&self, older_than_days: u32) -> AuditResult<SweepReport> {
        self.sweeper.sweep(older_than_days)
    }

    fn default_limit(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.config.query.default_limit)
    }
}
