//! Query filters and aggregate shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{action::Action, category::Category, entry::ActivityLogEntry};

/// A conjunctive predicate set over entries.
///
/// Every `Some` field must match; `None` fields impose no constraint.
/// `start` and `end` are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub user_id: Option<String>,
    pub category: Option<Category>,
    pub action: Option<Action>,
    #[serde(rename = "startTime")]
    pub start: Option<DateTime<Utc>>,
    #[serde(rename = "endTime")]
    pub end: Option<DateTime<Utc>>,
    pub success: Option<bool>,
    pub ip_address: Option<String>,
}

impl LogFilter {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn action(action: Action) -> Self {
        Self {
            action: Some(action),
            ..Self::default()
        }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    /// True if `entry` satisfies every provided predicate.
    pub fn matches(&self, entry: &ActivityLogEntry) -> bool {
        if let Some(user_id) = &self.user_id {
            if entry.actor.user_id.as_deref() != Some(user_id.as_str()) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if entry.category != category {
                return false;
            }
        }
        if let Some(action) = &self.action {
            if &entry.action != action {
                return false;
            }
        }
        if let Some(start) = self.start {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if entry.timestamp > end {
                return false;
            }
        }
        if let Some(success) = self.success {
            if entry.result.success != success {
                return false;
            }
        }
        if let Some(ip) = &self.ip_address {
            if &entry.origin.ip_address != ip {
                return false;
            }
        }
        true
    }

    /// True if only the time bounds are set, so a key-range scan alone
    /// answers the query.
    pub fn is_time_only(&self) -> bool {
        self.user_id.is_none()
            && self.category.is_none()
            && self.action.is_none()
            && self.success.is_none()
            && self.ip_address.is_none()
    }
}

/// Input to the statistics aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub user_id: Option<String>,
    #[serde(rename = "startTime")]
    pub start: Option<DateTime<Utc>>,
    #[serde(rename = "endTime")]
    pub end: Option<DateTime<Utc>>,
}

impl From<&StatsQuery> for LogFilter {
    fn from(q: &StatsQuery) -> Self {
        LogFilter {
            user_id: q.user_id.clone(),
            start: q.start,
            end: q.end,
            ..LogFilter::default()
        }
    }
}

/// Success/failure partition of a result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub success: usize,
    pub failure: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.success + self.failure
    }
}

/// Aggregate view over a filtered set of entries.
///
/// `by_category` and `by_action` only contain keys that occur at least once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub total_logs: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub by_action: BTreeMap<String, usize>,
    pub by_status: StatusCounts,
    /// Newest entries of the filtered set, newest first.
    pub recent_activity: Vec<ActivityLogEntry>,
}
