//! The query engine.
//!
//! Every retrieval shape reduces to one primitive, `retrieve`:
//!
//! 1. Pick the key space: the primary log, or (with secondary indexing) the
//!    action or category index when the filter names one.
//! 2. Turn `start`/`end` into key bounds so the store's range scan does the
//!    time filtering.
//! 3. Scan newest-first and decode.
//! 4. Apply the remaining predicates in memory.
//! 5. Stop at `limit` matches.  Truncation happens after filtering, never
//!    against the raw scan, unless no in-memory predicate remains.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use sprout_contracts::{
    action::Action,
    category::Category,
    entry::ActivityLogEntry,
    error::AuditResult,
    query::LogFilter,
};
use sprout_core::traits::KvStore;

use crate::key::{IndexKind, KeyEncoder, KeySpace};

pub struct QueryEngine {
    store: Arc<dyn KvStore>,
    keys: KeyEncoder,
    indexed: bool,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn KvStore>, keys: KeyEncoder, indexed: bool) -> Self {
        Self {
            store,
            keys,
            indexed,
        }
    }

    /// Entries matching every predicate of `filter`, newest first, at most
    /// `limit` of them (`None` means all).
    pub fn retrieve(
        &self,
        filter: &LogFilter,
        limit: Option<usize>,
    ) -> AuditResult<Vec<ActivityLogEntry>> {
        if limit == Some(0) {
            return Ok(Vec::new());
        }
        if let (Some(start), Some(end)) = (filter.start, filter.end) {
            if start > end {
                return Ok(Vec::new());
            }
        }

        let space = self.space_for(filter);
        let mut request = self.keys.time_scan(space, filter.start, filter.end).descending();
        let pushdown = space == KeySpace::Primary && filter.is_time_only();

        let mut entries = Vec::new();
        loop {
            // With the limit pushed into the store, a skipped row would cost
            // a slot, so short pages are refilled below the last key seen.
            let page = match limit {
                Some(limit) if pushdown => Some(limit - entries.len()),
                _ => None,
            };
            if let Some(page) = page {
                request = request.limit(page);
            }

            let rows = self.store.scan(&request)?;
            debug!(
                prefix = %request.prefix,
                rows = rows.len(),
                pushdown,
                "activity log scan"
            );
            let exhausted = page.map_or(true, |page| rows.len() < page);
            let last_key = rows.last().map(|(key, _)| key.clone());

            for (key, value) in rows {
                let entry: ActivityLogEntry = match serde_json::from_value(value) {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(key = %key, error = %e, "skipping undecodable activity log entry");
                        continue;
                    }
                };
                if !filter.matches(&entry) {
                    continue;
                }
                entries.push(entry);
                if limit.is_some_and(|limit| entries.len() >= limit) {
                    return Ok(entries);
                }
            }

            match last_key {
                Some(key) if !exhausted => request = request.ending_before(key),
                _ => return Ok(entries),
            }
        }
    }

    pub fn by_user(&self, user_id: &str, limit: usize) -> AuditResult<Vec<ActivityLogEntry>> {
        self.retrieve(&LogFilter::user(user_id), Some(limit))
    }

    pub fn by_category(
        &self,
        category: Category,
        limit: usize,
    ) -> AuditResult<Vec<ActivityLogEntry>> {
        self.retrieve(&LogFilter::category(category), Some(limit))
    }

    pub fn by_action(&self, action: &Action, limit: usize) -> AuditResult<Vec<ActivityLogEntry>> {
        self.retrieve(&LogFilter::action(action.clone()), Some(limit))
    }

    /// Entries stamped within `[start, end]`.  Answered by the key-range
    /// scan alone.
    pub fn by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> AuditResult<Vec<ActivityLogEntry>> {
        self.retrieve(&LogFilter::between(start, end), Some(limit))
    }

    pub fn search(&self, filter: &LogFilter, limit: usize) -> AuditResult<Vec<ActivityLogEntry>> {
        self.retrieve(filter, Some(limit))
    }

    pub fn recent(&self, limit: usize) -> AuditResult<Vec<ActivityLogEntry>> {
        self.retrieve(&LogFilter::default(), Some(limit))
    }

    fn space_for<'f>(&self, filter: &'f LogFilter) -> KeySpace<'f> {
        if !self.indexed {
            return KeySpace::Primary;
        }
        // Action index first, then category.
        if let Some(action) = &filter.action {
            return KeySpace::Index(IndexKind::Action, action.as_str());
        }
        if let Some(category) = filter.category {
            return KeySpace::Index(IndexKind::Category, category.as_str());
        }
        KeySpace::Primary
    }
}
