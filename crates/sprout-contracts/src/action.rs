//! The curated action taxonomy.
//!
//! Actions are `<namespace>.<name>` strings.  The constants below are the
//! names the backend emits today; other names are accepted as long as they
//! have the same shape, so the taxonomy can grow without a release of this
//! crate, but free text is rejected.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, AuditResult};

/// A specific event name, e.g. `session.complete`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(Cow<'static, str>);

impl Action {
    // Auth
    pub const SIGNUP: Action = Action::known("user.signup");
    pub const LOGIN: Action = Action::known("user.login");
    pub const LOGOUT: Action = Action::known("user.logout");
    pub const TOKEN_REFRESH: Action = Action::known("user.token_refresh");

    // Sessions
    pub const SESSION_START: Action = Action::known("session.start");
    pub const SESSION_COMPLETE: Action = Action::known("session.complete");
    pub const SESSION_FAIL: Action = Action::known("session.fail");
    pub const SESSION_LIST: Action = Action::known("session.list");

    // Profile
    pub const PROFILE_VIEW: Action = Action::known("profile.view");
    pub const PROFILE_UPDATE: Action = Action::known("profile.update");

    // Plants
    pub const PLANT_UNLOCK: Action = Action::known("plant.unlock");
    pub const PLANT_SELECT: Action = Action::known("plant.select");

    // Whitelist
    pub const WHITELIST_ADD: Action = Action::known("whitelist.add");
    pub const WHITELIST_REMOVE: Action = Action::known("whitelist.remove");
    pub const WHITELIST_UPDATE: Action = Action::known("whitelist.update");

    // System
    pub const HEALTH_CHECK: Action = Action::known("system.health");
    pub const MIGRATION: Action = Action::known("system.migration");

    // Admin
    pub const LOGS_VIEW: Action = Action::known("admin.logs_view");
    pub const LOGS_EXPORT: Action = Action::known("admin.logs_export");

    /// Every predefined action.
    pub const TAXONOMY: [Action; 19] = [
        Action::SIGNUP,
        Action::LOGIN,
        Action::LOGOUT,
        Action::TOKEN_REFRESH,
        Action::SESSION_START,
        Action::SESSION_COMPLETE,
        Action::SESSION_FAIL,
        Action::SESSION_LIST,
        Action::PROFILE_VIEW,
        Action::PROFILE_UPDATE,
        Action::PLANT_UNLOCK,
        Action::PLANT_SELECT,
        Action::WHITELIST_ADD,
        Action::WHITELIST_REMOVE,
        Action::WHITELIST_UPDATE,
        Action::HEALTH_CHECK,
        Action::MIGRATION,
        Action::LOGS_VIEW,
        Action::LOGS_EXPORT,
    ];

    const fn known(name: &'static str) -> Self {
        Action(Cow::Borrowed(name))
    }

    /// Parse and validate an action name.
    ///
    /// Returns `AuditError::Validation` unless `name` is two segments joined
    /// by a single `.`, each starting with a lowercase ASCII letter and
    /// containing only lowercase letters, digits and `_`.
    pub fn parse(name: &str) -> AuditResult<Self> {
        let action = Action(Cow::Owned(name.to_string()));
        action.validate()?;
        Ok(action)
    }

    /// Check the `<namespace>.<name>` shape.
    ///
    /// Deserialized actions skip `parse`, so the writer calls this again at
    /// the write boundary.
    pub fn validate(&self) -> AuditResult<()> {
        let mut segments = self.0.split('.');
        let well_formed = match (segments.next(), segments.next(), segments.next()) {
            (Some(ns), Some(name), None) => is_segment(ns) && is_segment(name),
            _ => false,
        };

        if well_formed {
            Ok(())
        } else {
            Err(AuditError::Validation {
                reason: format!(
                    "action '{}' is not of the form '<namespace>.<name>'",
                    self.0
                ),
            })
        }
    }

    /// True if this action is one of the predefined taxonomy constants.
    pub fn is_predefined(&self) -> bool {
        Action::TAXONOMY.iter().any(|a| a == self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_segment(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
