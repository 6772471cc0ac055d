//! Configuration schema.
//!
//! An `AuditConfig` is deserialized from TOML.  Every section and every key
//! has a default, so an empty document is a valid configuration.

use serde::{Deserialize, Serialize};

/// What `ActivityLog::record` does when an audit write fails.
///
/// Expressed as kebab-case in TOML:
/// ```toml
/// mode = "best-effort"
/// mode = "strict"
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteMode {
    /// Log the failure and let the audited operation continue.
    #[default]
    BestEffort,
    /// Surface the failure so the caller can abort.
    Strict,
}

/// Where entries live in the key space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Prefix shared by every entry key.  Must not contain `:` or `~`.
    pub key_prefix: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            key_prefix: "activity_log".to_string(),
        }
    }
}

/// Default result limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Limit for user/category/action queries, `search` and `recent`.
    pub default_limit: usize,
    /// Limit for time-range queries.
    pub time_range_limit: usize,
    /// Number of entries in `ActivityStats::recent_activity`.
    pub recent_sample: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_limit: 100,
            time_range_limit: 500,
            recent_sample: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionSettings {
    /// Keys per `delete_many` call.
    pub batch_size: usize,
    /// Age used by the CLI when `--older-than-days` is omitted.
    pub default_days: u32,
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            batch_size: 100,
            default_days: 90,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteSettings {
    pub mode: WriteMode,
}

/// Secondary-index maintenance.
///
/// When `secondary = true`, every entry is also written under a category
/// key and an action key so those queries become range scans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub secondary: bool,
}

/// The top-level structure deserialized from a TOML config file.
///
/// Example:
/// ```toml
/// [store]
/// key_prefix = "activity_log"
///
/// [retention]
/// batch_size = 100
///
/// [write]
/// mode = "strict"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub store: StoreSettings,
    pub query: QuerySettings,
    pub retention: RetentionSettings,
    pub write: WriteSettings,
    pub index: IndexSettings,
}
