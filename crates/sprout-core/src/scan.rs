//! Range-scan requests understood by every `KvStore`.

use std::ops::Bound;

/// Key order of scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    Ascending,
    Descending,
}

/// A prefix scan, optionally narrowed by key bounds and truncated.
///
/// Bounds compare whole keys lexicographically (byte order).  A key is
/// returned only if it starts with `prefix` *and* lies within both bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub prefix: String,
    pub lower: Bound<String>,
    pub upper: Bound<String>,
    pub order: ScanOrder,
    pub limit: Option<usize>,
}

impl ScanRequest {
    /// Every key under `prefix`, ascending, unbounded.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
            order: ScanOrder::Ascending,
            limit: None,
        }
    }

    /// Restrict to keys `>= key`.
    pub fn starting_at(mut self, key: impl Into<String>) -> Self {
        self.lower = Bound::Included(key.into());
        self
    }

    /// Restrict to keys `<= key`.
    pub fn ending_at(mut self, key: impl Into<String>) -> Self {
        self.upper = Bound::Included(key.into());
        self
    }

    /// Restrict to keys `< key`.
    pub fn ending_before(mut self, key: impl Into<String>) -> Self {
        self.upper = Bound::Excluded(key.into());
        self
    }

    pub fn descending(mut self) -> Self {
        self.order = ScanOrder::Descending;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True if `key` satisfies the prefix and both bounds.
    ///
    /// Stores that cannot push bounds down natively use this to filter.
    pub fn contains(&self, key: &str) -> bool {
        if !key.starts_with(&self.prefix) {
            return false;
        }
        let above_lower = match &self.lower {
            Bound::Included(lo) => key >= lo.as_str(),
            Bound::Excluded(lo) => key > lo.as_str(),
            Bound::Unbounded => true,
        };
        let below_upper = match &self.upper {
            Bound::Included(hi) => key <= hi.as_str(),
            Bound::Excluded(hi) => key < hi.as_str(),
            Bound::Unbounded => true,
        };
        above_lower && below_upper
    }
}
