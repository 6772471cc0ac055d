//! Loading and validating `AuditConfig`.
//!
//! Parsing is done by `toml` + serde; `validate` then rejects values that
//! deserialize fine but would break the key scheme or the sweeper.

use std::path::Path;

use tracing::debug;

use sprout_contracts::error::{AuditError, AuditResult};

use crate::settings::AuditConfig;

impl AuditConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `AuditError::Config` if the TOML is malformed, does not match
    /// the `AuditConfig` schema, or fails validation.
    pub fn from_toml_str(s: &str) -> AuditResult<Self> {
        let config: AuditConfig = toml::from_str(s).map_err(|e| AuditError::Config {
            reason: format!("failed to parse audit config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as audit configuration.
    pub fn from_file(path: &Path) -> AuditResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AuditError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        debug!(path = %path.display(), "loading audit config");
        Self::from_toml_str(&contents)
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> AuditResult<()> {
        let prefix = &self.store.key_prefix;
        if prefix.is_empty() {
            return Err(config_error("store.key_prefix must not be empty"));
        }
        if prefix.contains(':') || prefix.contains('~') {
            return Err(config_error(format!(
                "store.key_prefix '{}' must not contain ':' or '~'",
                prefix
            )));
        }
        if self.retention.batch_size == 0 {
            return Err(config_error("retention.batch_size must be greater than zero"));
        }
        if self.query.recent_sample == 0 {
            return Err(config_error("query.recent_sample must be greater than zero"));
        }
        Ok(())
    }
}

fn config_error(reason: impl Into<String>) -> AuditError {
    AuditError::Config {
        reason: reason.into(),
    }
}
