//! Command-line access to the Sprout activity audit log.
//!
//! Operates on a JSON-file store so entries survive between invocations.
//! Every command prints its result as JSON on stdout.
//!
//! Usage:
//!   sprout-audit write --category session --action session.complete --user u-1
//!   sprout-audit recent --limit 20
//!   sprout-audit search --category auth --success false
//!   sprout-audit stats --user u-1
//!   sprout-audit cleanup --older-than-days 90
//!   sprout-audit scenario

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sprout_audit::{extract_client_info, ActivityLog, InMemoryStore, JsonFileStore, RequestParts};
use sprout_config::AuditConfig;
use sprout_contracts::{
    Action, Actor, AuditError, AuditResult, Category, DetailValue, LogFilter, NewEntry, Outcome,
    StatsQuery,
};
use sprout_core::{ManualClock, SystemClock};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Sprout activity audit log.
///
/// Records, queries, summarizes and prunes the activity trail of the Sprout
/// focus-timer backend.
#[derive(Parser)]
#[command(
    name = "sprout-audit",
    about = "Sprout activity audit log",
    long_about = "Records, queries, summarizes and prunes Sprout activity log entries\n\
                  held in a local JSON store."
)]
struct Cli {
    /// JSON file holding the log.  Created on first write.
    #[arg(long, global = true, default_value = "sprout-audit.json")]
    store: PathBuf,

    /// TOML configuration file.  Built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record one entry.
    Write {
        #[arg(long, value_parser = parse_category)]
        category: Category,
        /// Dotted action name, e.g. `session.complete`.
        #[arg(long, value_parser = parse_action)]
        action: Action,
        /// Acting user id.  Omit for an anonymous entry.
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value_t = 200)]
        status: u16,
        /// Error message for failed outcomes.
        #[arg(long)]
        error: Option<String>,
        /// Client address to record.
        #[arg(long)]
        ip: Option<String>,
        #[arg(long, default_value = "/cli")]
        endpoint: String,
        #[arg(long, default_value = "INTERNAL")]
        method: String,
        /// Processing time in milliseconds.
        #[arg(long)]
        duration: Option<u64>,
        /// Extra context as `key=value`; repeatable.
        #[arg(long = "detail", value_parser = parse_detail)]
        details: Vec<(String, DetailValue)>,
    },
    /// Newest entries first.
    Recent {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Entries matching every given filter, newest first.
    Search {
        #[arg(long)]
        user: Option<String>,
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
        #[arg(long, value_parser = parse_action)]
        action: Option<Action>,
        /// Inclusive RFC 3339 lower bound.
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        /// Inclusive RFC 3339 upper bound.
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        #[arg(long)]
        success: Option<bool>,
        #[arg(long)]
        ip: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Aggregate counts over the matching entries.
    Stats {
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long)]
        end: Option<DateTime<Utc>>,
    },
    /// Delete entries older than the retention window.
    Cleanup {
        /// Defaults to `retention.default_days` from the config.
        #[arg(long)]
        older_than_days: Option<u32>,
    },
    /// Replay the three-entry walkthrough against a throwaway in-memory log.
    Scenario,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=info to see every write and sweep.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("sprout-audit: failed to render output: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("sprout-audit: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Command dispatch ──────────────────────────────────────────────────────────

fn run(cli: Cli) -> AuditResult<Value> {
    if let Command::Scenario = cli.command {
        return run_scenario();
    }

    let config = match &cli.config {
        Some(path) => AuditConfig::from_file(path)?,
        None => AuditConfig::default(),
    };
    let default_days = config.retention.default_days;

    debug!(store = %cli.store.display(), "opening activity log store");
    let store = JsonFileStore::open(&cli.store)?;
    let log = ActivityLog::new(Arc::new(store), Arc::new(SystemClock), config)?;

    match cli.command {
        Command::Write {
            category,
            action,
            user,
            status,
            error,
            ip,
            endpoint,
            method,
            duration,
            details,
        } => {
            let mut request = RequestParts::new(method, endpoint)
                .with_header("user-agent", concat!("sprout-audit/", env!("CARGO_PKG_VERSION")));
            if let Some(ip) = ip {
                request = request.with_remote_addr(ip);
            }

            let result = match error {
                Some(message) => Outcome::failed(status, message),
                None if status < 400 => Outcome::ok(status),
                None => Outcome::failed(status, format!("status {}", status)),
            };

            let mut entry = NewEntry::new(category, action, extract_client_info(&request), result)
                .with_actor(user.map_or_else(Actor::anonymous, Actor::user));
            entry.details.extend(details);
            if let Some(millis) = duration {
                entry = entry.with_duration(millis);
            }

            let id = log.write(entry)?;
            Ok(json!({ "id": id }))
        }
        Command::Recent { limit } => Ok(json!(log.recent(limit)?)),
        Command::Search {
            user,
            category,
            action,
            start,
            end,
            success,
            ip,
            limit,
        } => {
            let filter = LogFilter {
                user_id: user,
                category,
                action,
                start,
                end,
                success,
                ip_address: ip,
            };
            Ok(json!(log.search(&filter, limit)?))
        }
        Command::Stats { user, start, end } => {
            let query = StatsQuery {
                user_id: user,
                start,
                end,
            };
            Ok(json!(log.stats(&query)?))
        }
        Command::Cleanup { older_than_days } => {
            Ok(json!(log.sweep(older_than_days.unwrap_or(default_days))?))
        }
        Command::Scenario => run_scenario(),
    }
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// Three entries one second apart (auth ok, session ok, session failed),
/// then stats, a category query, `recent(2)` and two full cleanups.
fn run_scenario() -> AuditResult<Value> {
    let t0 = Utc
        .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .ok_or_else(|| AuditError::Validation {
            reason: "scenario start instant is ambiguous".to_string(),
        })?;
    let clock = Arc::new(ManualClock::new(t0));
    let log = ActivityLog::new(
        Arc::new(InMemoryStore::new()),
        clock.clone(),
        AuditConfig::default(),
    )?;

    let request = RequestParts::new("POST", "/make-server/sessions")
        .with_header("x-forwarded-for", "203.0.113.7")
        .with_header("user-agent", "sprout-web/1.0");
    let origin = extract_client_info(&request);
    let steps = [
        (Category::Auth, Action::LOGIN, Outcome::ok(200)),
        (Category::Session, Action::SESSION_COMPLETE, Outcome::ok(200)),
        (
            Category::Session,
            Action::SESSION_FAIL,
            Outcome::failed(500, "session store unavailable"),
        ),
    ];

    let mut ids = Vec::new();
    for (i, (category, action, result)) in steps.into_iter().enumerate() {
        if i > 0 {
            clock.advance(Duration::seconds(1));
        }
        let entry = NewEntry::new(category, action, origin.clone(), result)
            .with_actor(Actor::user("u-scenario"));
        ids.push(log.write(entry)?);
    }

    let stats = log.stats(&StatsQuery::default())?;
    let sessions = log.query_by_category(Category::Session, None)?;
    let recent = log.recent(Some(2))?;

    clock.advance(Duration::seconds(1));
    let first_cleanup = log.cleanup(0)?;
    let second_cleanup = log.cleanup(0)?;

    Ok(json!({
        "written": ids,
        "stats": stats,
        "sessionEntries": sessions,
        "recent": recent,
        "cleanup": [first_cleanup, second_cleanup],
    }))
}

// ── Argument parsers ──────────────────────────────────────────────────────────

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse().map_err(|e: AuditError| e.to_string())
}

fn parse_action(s: &str) -> Result<Action, String> {
    Action::parse(s).map_err(|e| e.to_string())
}

/// `key=value`.  Values that read as an integer, float or boolean are stored
/// as such; anything else is text.
fn parse_detail(s: &str) -> Result<(String, DetailValue), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty detail key in '{}'", s));
    }

    let value = if let Ok(n) = raw.parse::<i64>() {
        DetailValue::Integer(n)
    } else if let Ok(f) = raw.parse::<f64>() {
        DetailValue::Float(f)
    } else if let Ok(b) = raw.parse::<bool>() {
        DetailValue::Bool(b)
    } else {
        DetailValue::Text(raw.to_string())
    };
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_values_are_typed() {
        assert_eq!(
            parse_detail("plantId=3").unwrap(),
            ("plantId".to_string(), DetailValue::Integer(3))
        );
        assert_eq!(parse_detail("ratio=0.5").unwrap().1, DetailValue::Float(0.5));
        assert_eq!(parse_detail("streak=true").unwrap().1, DetailValue::Bool(true));
        assert_eq!(
            parse_detail("reason=a=b").unwrap().1,
            DetailValue::Text("a=b".to_string())
        );
        assert!(parse_detail("novalue").is_err());
        assert!(parse_detail("=1").is_err());
    }

    #[test]
    fn scenario_matches_walkthrough() {
        let output = run_scenario().unwrap();
        assert_eq!(output["stats"]["totalLogs"], 3);
        assert_eq!(output["stats"]["byCategory"]["session"], 2);
        assert_eq!(output["sessionEntries"].as_array().unwrap().len(), 2);
        assert_eq!(output["recent"][0]["id"], output["written"][2]);
        assert_eq!(output["cleanup"], json!([3, 0]));
    }

    #[test]
    fn cli_parses_search_flags() {
        let cli = Cli::try_parse_from([
            "sprout-audit",
            "--store",
            "/tmp/log.json",
            "search",
            "--category",
            "auth",
            "--success",
            "false",
            "--start",
            "2026-03-01T00:00:00Z",
        ])
        .unwrap();
        match cli.command {
            Command::Search {
                category, success, start, ..
            } => {
                assert_eq!(category, Some(Category::Auth));
                assert_eq!(success, Some(false));
                assert!(start.is_some());
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn write_with_invalid_status_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("log.json");
        let args = |status: &str| {
            Cli::try_parse_from([
                "sprout-audit",
                "--store",
                store.to_str().unwrap(),
                "write",
                "--category",
                "auth",
                "--action",
                "user.login",
                "--status",
                status,
            ])
            .unwrap()
        };

        assert!(matches!(run(args("42")), Err(AuditError::Validation { .. })));

        let written = run(args("200")).unwrap();
        assert!(written["id"].as_str().unwrap().starts_with("log_"));
    }

    #[test]
    fn cli_rejects_malformed_action() {
        assert!(Cli::try_parse_from([
            "sprout-audit",
            "write",
            "--category",
            "auth",
            "--action",
            "Login",
        ])
        .is_err());
    }
}
