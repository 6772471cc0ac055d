//! The closed set of activity categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuditError;

/// Coarse event class.  The set is closed: adding a category is a schema
/// change, not a runtime decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Signup, login, logout, token refresh.
    Auth,
    /// Focus sessions.
    Session,
    /// Profile reads and updates.
    Profile,
    /// Plant unlocks and selections.
    Plant,
    /// Whitelisted-app changes.
    Whitelist,
    /// Health checks, migrations.
    System,
    /// Operator actions such as viewing or exporting logs.
    Admin,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 7] = [
        Category::Auth,
        Category::Session,
        Category::Profile,
        Category::Plant,
        Category::Whitelist,
        Category::System,
        Category::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Auth => "auth",
            Category::Session => "session",
            Category::Profile => "profile",
            Category::Plant => "plant",
            Category::Whitelist => "whitelist",
            Category::System => "system",
            Category::Admin => "admin",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AuditError::Validation {
                reason: format!("unknown category '{}'", s),
            })
    }
}
