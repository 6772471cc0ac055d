//! # sprout-core
//!
//! The seams the audit log is built against.
//!
//! This crate provides:
//! - The three collaborator traits (`KvStore`, `Clock`, `RequestView`)
//! - `ScanRequest`, the one read primitive every store must support
//! - `SystemClock` and `ManualClock`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sprout_core::{scan::ScanRequest, traits::KvStore};
//!
//! let rows = store.scan(&ScanRequest::prefix("activity_log:").descending().limit(10))?;
//! ```

pub mod clock;
pub mod scan;
pub mod traits;

pub use clock::{ManualClock, SystemClock};
pub use scan::{ScanOrder, ScanRequest};
pub use traits::{Clock, KvStore, RequestView};

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    #[test]
    fn scan_contains_requires_prefix() {
        let req = ScanRequest::prefix("activity_log:");
        assert!(req.contains("activity_log:2026"));
        assert!(!req.contains("profile:u-1"));
        assert!(!req.contains("activity_log"));
    }

    #[test]
    fn scan_contains_respects_inclusive_and_exclusive_bounds() {
        let req = ScanRequest::prefix("k:")
            .starting_at("k:b")
            .ending_before("k:d");
        assert!(!req.contains("k:a"));
        assert!(req.contains("k:b"));
        assert!(req.contains("k:c~"));
        assert!(!req.contains("k:d"));

        let req = ScanRequest::prefix("k:").ending_at("k:d");
        assert!(req.contains("k:d"));
        assert!(!req.contains("k:d:0"));
    }

    #[test]
    fn scan_builder_sets_order_and_limit() {
        let req = ScanRequest::prefix("k:").descending().limit(5);
        assert_eq!(req.order, ScanOrder::Descending);
        assert_eq!(req.limit, Some(5));
    }

    #[test]
    fn manual_clock_moves_only_when_told() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), start + Duration::seconds(90));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
