//! # sprout-audit
//!
//! The Sprout activity audit log: a time-ordered event store laid over a
//! flat key-value substrate.
//!
//! ## Overview
//!
//! Every backend request handler records who acted, from where, doing
//! what, with what outcome and how long it took.  Entries are stored under
//! `<prefix>:<timestamp>:<id>`, so the store's lexicographic key order is
//! the log's chronological order and every time-bounded read is a range
//! scan.  On top of that sit a filtering query engine, a statistics
//! aggregator and a batched retention sweeper.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sprout_audit::{extract_client_info, ActivityLog, InMemoryStore};
//! use sprout_contracts::{Action, Category, NewEntry, Outcome};
//!
//! let log = ActivityLog::with_store(Arc::new(InMemoryStore::new()));
//! let origin = extract_client_info(&request);
//! log.record(NewEntry::new(Category::Session, Action::SESSION_COMPLETE, origin, Outcome::ok(200)))?;
//!
//! let stats = log.stats(&Default::default())?;
//! ```

pub mod context;
pub mod file;
pub mod key;
pub mod log;
pub mod memory;
pub mod query;
pub mod retention;
pub mod stats;
pub mod writer;

pub use context::{extract_client_info, RequestParts};
pub use file::JsonFileStore;
pub use key::KeyEncoder;
pub use log::ActivityLog;
pub use memory::InMemoryStore;
pub use query::QueryEngine;
pub use retention::{RetentionSweeper, SweepReport};
pub use stats::StatsAggregator;
pub use writer::LogWriter;

// ── Tests ─────────────────────────────────────────────────────────────────────
