//! Storage-key layout.
//!
//! Every entry is stored under `<base>:<timestamp>:<id>` where `<base>` is
//! the configured prefix for the primary log, or
//! `<prefix>_idx:<kind>:<value>` for a secondary-index copy.
//!
//! The timestamp component is RFC 3339 UTC with fixed-width microseconds
//! (`2026-03-01T12:00:00.000000Z`), so byte order of keys equals
//! chronological order of entries within one base.  Nothing ever parses a
//! key back; readers take fields from the stored value.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};

use sprout_contracts::entry::ActivityLogEntry;
use sprout_core::scan::ScanRequest;

/// Appended to an end-of-range key so every id at that timestamp sorts
/// below it.  `~` is above every character used in timestamps and ids.
pub const RANGE_SENTINEL: char = '~';

/// Secondary indexes the writer can maintain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Category,
    Action,
}

impl IndexKind {
    fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Category => "category",
            IndexKind::Action => "action",
        }
    }
}

/// Which run of keys an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySpace<'a> {
    /// The primary, time-ordered log.
    Primary,
    /// Copies of entries whose `kind` field equals the given value.
    Index(IndexKind, &'a str),
}

/// Derives ordered storage keys from timestamps and ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEncoder {
    prefix: String,
}

impl KeyEncoder {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Fixed-width, lexicographically sortable rendering of `ts`.
    pub fn format_timestamp(ts: DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// The key an entry with `timestamp` and `id` is stored under.
    pub fn entry_key(&self, space: KeySpace<'_>, timestamp: DateTime<Utc>, id: &str) -> String {
        format!(
            "{}:{}:{}",
            self.base(space),
            Self::format_timestamp(timestamp),
            id
        )
    }

    /// `<base>:`; every key in `space` starts with this.
    pub fn scan_prefix(&self, space: KeySpace<'_>) -> String {
        format!("{}:", self.base(space))
    }

    /// `<prefix>_idx:`; every secondary-index key starts with this.
    pub fn index_root_prefix(&self) -> String {
        format!("{}_idx:", self.prefix)
    }

    /// Inclusive lower bound: sorts before every key stamped `ts` or later.
    pub fn lower_bound(&self, space: KeySpace<'_>, ts: DateTime<Utc>) -> String {
        format!("{}:{}", self.base(space), Self::format_timestamp(ts))
    }

    /// Inclusive upper bound: sorts after every key stamped `ts` or earlier.
    pub fn upper_bound(&self, space: KeySpace<'_>, ts: DateTime<Utc>) -> String {
        format!(
            "{}:{}{}",
            self.base(space),
            Self::format_timestamp(ts),
            RANGE_SENTINEL
        )
    }

    /// Exclusive upper bound selecting keys stamped strictly before `ts`.
    ///
    /// Keys only carry microseconds.  When `ts` has a sub-microsecond part,
    /// an entry stamped in the same microsecond is still older than `ts`,
    /// so the bound is rounded up to the next microsecond.
    pub fn cutoff(&self, space: KeySpace<'_>, ts: DateTime<Utc>) -> String {
        let floor = ts.trunc_subsecs(6);
        let bound = if floor < ts {
            floor
                .checked_add_signed(Duration::microseconds(1))
                .unwrap_or(floor)
        } else {
            floor
        };
        self.lower_bound(space, bound)
    }

    /// Scan over `space`, narrowed to `[start, end]` when given.  Ascending,
    /// no limit.
    pub fn time_scan(
        &self,
        space: KeySpace<'_>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> ScanRequest {
        let mut request = ScanRequest::prefix(self.scan_prefix(space));
        if let Some(start) = start {
            request = request.starting_at(self.lower_bound(space, start));
        }
        if let Some(end) = end {
            request = request.ending_at(self.upper_bound(space, end));
        }
        request
    }

    /// The index spaces an entry is copied into.
    pub fn index_spaces(entry: &ActivityLogEntry) -> [KeySpace<'_>; 2] {
        [
            KeySpace::Index(IndexKind::Category, entry.category.as_str()),
            KeySpace::Index(IndexKind::Action, entry.action.as_str()),
        ]
    }

    fn base(&self, space: KeySpace<'_>) -> String {
        match space {
            KeySpace::Primary => self.prefix.clone(),
            KeySpace::Index(kind, value) => {
                format!("{}_idx:{}:{}", self.prefix, kind.as_str(), value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn encoder() -> KeyEncoder {
        KeyEncoder::new("activity_log")
    }

    #[test]
    fn entry_key_layout() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            encoder().entry_key(KeySpace::Primary, ts, "log_1_a"),
            "activity_log:2026-03-01T12:00:00.000000Z:log_1_a"
        );
        assert_eq!(
            encoder().entry_key(KeySpace::Index(IndexKind::Category, "plant"), ts, "log_1_a"),
            "activity_log_idx:category:plant:2026-03-01T12:00:00.000000Z:log_1_a"
        );
    }

    #[test]
    fn key_order_follows_time_order() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 59, 59).unwrap();
        let instants = [
            t0,
            t0 + Duration::microseconds(1),
            t0 + Duration::milliseconds(1),
            t0 + Duration::seconds(1),
            t0 + Duration::days(400),
        ];
        let keys: Vec<String> = instants
            .iter()
            .map(|ts| encoder().entry_key(KeySpace::Primary, *ts, "log_zzz"))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn bounds_bracket_every_id_at_the_instant() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let e = encoder();
        let key = e.entry_key(KeySpace::Primary, ts, "log_1772366400000_ffffffff");

        assert!(e.lower_bound(KeySpace::Primary, ts) < key);
        assert!(e.upper_bound(KeySpace::Primary, ts) > key);
        assert!(e.cutoff(KeySpace::Primary, ts) < key, "an entry at the cutoff is not older than it");

        let request = e.time_scan(KeySpace::Primary, Some(ts), Some(ts));
        assert!(request.contains(&key));
    }

    #[test]
    fn cutoff_rounds_up_sub_microsecond_instants() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let e = encoder();
        let same_micro = e.entry_key(KeySpace::Primary, t0, "log_1772366400000_ffffffff");

        let cutoff = e.cutoff(KeySpace::Primary, t0 + Duration::nanoseconds(500));
        assert_eq!(cutoff, "activity_log:2026-03-01T12:00:00.000001Z");
        assert!(same_micro < cutoff, "stamped 500ns before the cutoff instant");

        let next_micro = e.entry_key(KeySpace::Primary, t0 + Duration::microseconds(1), "log_0");
        assert!(next_micro > cutoff);
    }

    #[test]
    fn primary_prefix_excludes_index_keys() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let e = encoder();
        let index_key = e.entry_key(KeySpace::Index(IndexKind::Action, "user.login"), ts, "log_1");
        assert!(!index_key.starts_with(&e.scan_prefix(KeySpace::Primary)));
    }
}
