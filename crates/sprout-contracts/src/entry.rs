//! Activity log entries.
//!
//! `NewEntry` is what a request handler assembles; the writer turns it into
//! an `ActivityLogEntry` by assigning `id` and `timestamp`.  Entries are
//! immutable once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{action::Action, category::Category, details::Details};

/// Who acted.  All fields are `None` for unauthenticated requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated actor known only by id.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none() && self.user_email.is_none() && self.user_name.is_none()
    }
}

/// Where the request came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    pub ip_address: String,
    pub user_agent: String,
    pub endpoint: String,
    pub method: String,
}

impl Origin {
    /// Origin for events not triggered by an inbound request (e.g. scheduled sweeps).
    pub fn internal(endpoint: impl Into<String>) -> Self {
        Self {
            ip_address: "unknown".to_string(),
            user_agent: "unknown".to_string(),
            endpoint: endpoint.into(),
            method: "INTERNAL".to_string(),
        }
    }
}

/// How the audited operation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub status_code: u16,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Outcome {
    pub fn ok(status_code: u16) -> Self {
        Self {
            status_code,
            success: true,
            error_message: None,
        }
    }

    pub fn failed(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            success: false,
            error_message: Some(message.into()),
        }
    }
}

/// Everything a caller supplies to the writer.  `id` and `timestamp` are
/// assigned at write time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub category: Category,
    pub action: Action,
    pub actor: Actor,
    pub origin: Origin,
    pub details: Details,
    pub result: Outcome,
    /// Elapsed milliseconds for the originating operation.
    pub duration: Option<u64>,
}

impl NewEntry {
    /// Start an entry with an anonymous actor, empty details and no duration.
    pub fn new(category: Category, action: Action, origin: Origin, result: Outcome) -> Self {
        Self {
            category,
            action,
            actor: Actor::anonymous(),
            origin,
            details: Details::new(),
            result,
            duration: None,
        }
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = actor;
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<crate::details::DetailValue>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_duration(mut self, millis: u64) -> Self {
        self.duration = Some(millis);
        self
    }
}

/// One immutable audit record, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub actor: Actor,
    pub origin: Origin,
    pub action: Action,
    pub category: Category,
    #[serde(default)]
    pub details: Details,
    pub result: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl ActivityLogEntry {
    /// Assemble the stored form of `entry`.
    pub fn from_new(id: String, timestamp: DateTime<Utc>, entry: NewEntry) -> Self {
        Self {
            id,
            timestamp,
            actor: entry.actor,
            origin: entry.origin,
            action: entry.action,
            category: entry.category,
            details: entry.details,
            result: entry.result,
            duration: entry.duration,
        }
    }
}
