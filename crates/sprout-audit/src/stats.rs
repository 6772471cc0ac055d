//! Statistics over a filtered slice of the log.

use sprout_contracts::{
    entry::ActivityLogEntry,
    error::AuditResult,
    query::{ActivityStats, LogFilter, StatsQuery},
};

use crate::query::QueryEngine;

/// Runs the query primitive without a limit and reduces the result.
pub struct StatsAggregator<'a> {
    engine: &'a QueryEngine,
    recent_sample: usize,
}

impl<'a> StatsAggregator<'a> {
    pub fn new(engine: &'a QueryEngine, recent_sample: usize) -> Self {
        Self {
            engine,
            recent_sample,
        }
    }

    pub fn compute(&self, query: &StatsQuery) -> AuditResult<ActivityStats> {
        let entries = self.engine.retrieve(&LogFilter::from(query), None)?;
        Ok(reduce(entries, self.recent_sample))
    }
}

/// One pass over `entries` (newest first).
///
/// `total_logs == sum(by_category) == by_status.success + by_status.failure`
/// holds by construction: every entry bumps exactly one counter of each.
pub fn reduce(entries: Vec<ActivityLogEntry>, recent_sample: usize) -> ActivityStats {
    let mut stats = ActivityStats {
        total_logs: entries.len(),
        ..ActivityStats::default()
    };

    for entry in &entries {
        *stats.by_category.entry(entry.category).or_insert(0) += 1;
        *stats
            .by_action
            .entry(entry.action.as_str().to_string())
            .or_insert(0) += 1;
        if entry.result.success {
            stats.by_status.success += 1;
        } else {
            stats.by_status.failure += 1;
        }
    }

    stats.recent_activity = entries.into_iter().take(recent_sample).collect();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slice_has_no_keys() {
        let stats = reduce(Vec::new(), 10);
        assert_eq!(stats.total_logs, 0);
        assert!(stats.by_category.is_empty());
        assert!(stats.by_action.is_empty());
        assert_eq!(stats.by_status.total(), 0);
        assert!(stats.recent_activity.is_empty());
    }
}
