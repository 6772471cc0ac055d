//! # sprout-config
//!
//! TOML configuration for the Sprout activity audit log.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use sprout_config::AuditConfig;
//!
//! let config = AuditConfig::from_file(Path::new("sprout-audit.toml"))?;
//! // Pass `config` to `sprout_audit::ActivityLog::new(...)`.
//! ```
//!
//! Every key is optional; `AuditConfig::default()` is the configuration the
//! backend runs with when no file is given.

pub mod loader;
pub mod settings;

pub use settings::{
    AuditConfig, IndexSettings, QuerySettings, RetentionSettings, StoreSettings, WriteMode,
    WriteSettings,
};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use sprout_contracts::error::AuditError;

    use crate::{AuditConfig, WriteMode};

    /// An empty document yields the built-in defaults.
    #[test]
    fn test_empty_document_is_default() {
        let config = AuditConfig::from_toml_str("").unwrap();
        assert_eq!(config, AuditConfig::default());
        assert_eq!(config.store.key_prefix, "activity_log");
        assert_eq!(config.query.default_limit, 100);
        assert_eq!(config.query.time_range_limit, 500);
        assert_eq!(config.query.recent_sample, 10);
        assert_eq!(config.retention.batch_size, 100);
        assert_eq!(config.write.mode, WriteMode::BestEffort);
        assert!(!config.index.secondary);
    }

    /// Sections may be partially specified; missing keys keep their defaults.
    #[test]
    fn test_partial_sections() {
        let toml = r#"
            [retention]
            batch_size = 25

            [write]
            mode = "strict"

            [index]
            secondary = true
        "#;

        let config = AuditConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.retention.batch_size, 25);
        assert_eq!(config.retention.default_days, 90);
        assert_eq!(config.write.mode, WriteMode::Strict);
        assert!(config.index.secondary);
        assert_eq!(config.query.default_limit, 100);
    }

    #[test]
    fn test_unknown_write_mode_is_rejected() {
        let toml = r#"
            [write]
            mode = "fire-and-forget"
        "#;

        match AuditConfig::from_toml_str(toml) {
            Err(AuditError::Config { reason }) => {
                assert!(reason.contains("failed to parse audit config TOML"), "got: {reason}");
            }
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_prefix_with_separator_is_rejected() {
        let toml = r#"
            [store]
            key_prefix = "activity:log"
        "#;

        match AuditConfig::from_toml_str(toml) {
            Err(AuditError::Config { reason }) => assert!(reason.contains("must not contain")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let toml = r#"
            [retention]
            batch_size = 0
        "#;

        match AuditConfig::from_toml_str(toml) {
            Err(AuditError::Config { reason }) => assert!(reason.contains("batch_size")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_toml() {
        let result = AuditConfig::from_toml_str("this is not valid toml ][[[");
        assert!(matches!(result, Err(AuditError::Config { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = AuditConfig::from_file(std::path::Path::new("/nonexistent/sprout-audit.toml"));
        match result {
            Err(AuditError::Config { reason }) => assert!(reason.contains("failed to read config file")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }
}
