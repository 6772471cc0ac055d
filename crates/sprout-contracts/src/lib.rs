//! # sprout-contracts
//!
//! Shared types and error contracts for the Sprout activity audit log.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions, the action taxonomy and error types.

pub mod action;
pub mod category;
pub mod details;
pub mod entry;
pub mod error;
pub mod query;

pub use action::Action;
pub use category::Category;
pub use details::{DetailValue, Details};
pub use entry::{ActivityLogEntry, Actor, NewEntry, Origin, Outcome};
pub use error::{AuditError, AuditResult, StoreError};
pub use query::{ActivityStats, LogFilter, StatsQuery, StatusCounts};

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    use super::*;

    fn origin() -> Origin {
        Origin {
            ip_address: "203.0.113.7".to_string(),
            user_agent: "sprout-ios/2.1".to_string(),
            endpoint: "/sessions".to_string(),
            method: "POST".to_string(),
        }
    }

    fn entry(user: Option<&str>, category: Category, action: Action, success: bool) -> ActivityLogEntry {
        let result = if success {
            Outcome::ok(200)
        } else {
            Outcome::failed(500, "boom")
        };
        let new = NewEntry::new(category, action, origin(), result);
        let new = match user {
            Some(u) => new.with_actor(Actor::user(u)),
            None => new,
        };
        ActivityLogEntry::from_new(
            "log_1_abc".to_string(),
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            new,
        )
    }

    // ── Action taxonomy ──────────────────────────────────────────────────────

    #[test]
    fn predefined_actions_are_well_formed() {
        for action in Action::TAXONOMY.iter() {
            assert!(action.validate().is_ok(), "{action} should validate");
            assert!(action.is_predefined());
        }
    }

    #[test]
    fn action_parse_accepts_new_curated_names() {
        let action = Action::parse("plant.water").unwrap();
        assert_eq!(action.as_str(), "plant.water");
        assert!(!action.is_predefined());
    }

    #[test]
    fn action_parse_rejects_free_text() {
        for bad in ["", "login", "User.Login", "user.", ".login", "user.login.extra", "user login", "user.9lives"] {
            match Action::parse(bad) {
                Err(AuditError::Validation { reason }) => assert!(reason.contains("<namespace>.<name>")),
                other => panic!("expected Validation for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn parsed_action_equals_constant() {
        assert_eq!(Action::parse("session.complete").unwrap(), Action::SESSION_COMPLETE);
    }

    // ── Category ─────────────────────────────────────────────────────────────

    #[test]
    fn category_from_str_covers_closed_set() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("billing".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Category::Whitelist).unwrap(), json!("whitelist"));
    }

    // ── Entry wire shape ─────────────────────────────────────────────────────

    #[test]
    fn entry_serializes_camel_case_nested_shape() {
        let e = entry(Some("u-1"), Category::Session, Action::SESSION_COMPLETE, true);
        let value = serde_json::to_value(&e).unwrap();

        assert_eq!(value["actor"]["userId"], json!("u-1"));
        assert_eq!(value["actor"]["userEmail"], json!(null));
        assert_eq!(value["origin"]["ipAddress"], json!("203.0.113.7"));
        assert_eq!(value["result"]["statusCode"], json!(200));
        assert_eq!(value["action"], json!("session.complete"));
        assert_eq!(value["category"], json!("session"));
        assert!(value.get("duration").is_none(), "absent duration is omitted");
    }

    #[test]
    fn details_keep_integer_and_float_apart() {
        let raw = json!({ "minutes": 25, "ratio": 0.5, "tags": ["deep", true], "plant": { "id": "3" }, "none": null });
        let details: Details = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(details["minutes"], DetailValue::Integer(25));
        assert_eq!(details["ratio"], DetailValue::Float(0.5));
        assert_eq!(details["none"], DetailValue::Null);
        assert!(matches!(details["plant"], DetailValue::Map(_)));
        assert_eq!(serde_json::to_value(&details).unwrap(), raw);
    }

    #[test]
    fn anonymous_actor_is_all_null() {
        let actor = Actor::anonymous();
        assert!(actor.is_anonymous());
        assert!(!Actor::user("u-1").is_anonymous());
    }

    // ── LogFilter ────────────────────────────────────────────────────────────

    #[test]
    fn empty_filter_matches_everything() {
        let e = entry(None, Category::Auth, Action::LOGIN, false);
        assert!(LogFilter::default().matches(&e));
        assert!(LogFilter::default().is_time_only());
    }

    #[test]
    fn filter_fields_are_conjunctive() {
        let e = entry(Some("u-1"), Category::Session, Action::SESSION_FAIL, false);

        let mut filter = LogFilter::user("u-1");
        filter.category = Some(Category::Session);
        filter.success = Some(false);
        assert!(filter.matches(&e));

        filter.ip_address = Some("198.51.100.1".to_string());
        assert!(!filter.matches(&e), "one mismatching predicate rejects the entry");
    }

    #[test]
    fn user_filter_does_not_match_anonymous_entries() {
        let e = entry(None, Category::Auth, Action::SIGNUP, true);
        assert!(!LogFilter::user("u-1").matches(&e));
    }

    #[test]
    fn time_bounds_are_inclusive() {
        let e = entry(None, Category::System, Action::HEALTH_CHECK, true);
        let t = e.timestamp;

        assert!(LogFilter::between(t, t).matches(&e));
        assert!(!LogFilter::between(t + Duration::seconds(1), t + Duration::seconds(2)).matches(&e));
        assert!(LogFilter::between(t, t).is_time_only());
    }

    // ── Error display ────────────────────────────────────────────────────────

    #[test]
    fn store_error_converts_into_audit_error() {
        let err: AuditError = StoreError::Unavailable {
            reason: "connection reset".to_string(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("store operation failed"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn validation_error_display() {
        let err = AuditError::Validation {
            reason: "status code 42 out of range".to_string(),
        };
        assert!(err.to_string().contains("validation failed"));
    }
}
