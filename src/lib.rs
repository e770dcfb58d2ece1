#![warn(missing_docs)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Simple counters cannot overflow
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # readtrack - Observed File Tracking
//!
//! readtrack keeps an in-process record of which files an agent has read, the
//! snapshot it saw for each, and whether that snapshot still matches the disk.
//! It answers "have I seen this file?" and "is my copy stale?" without
//! re-reading content on every query.
//!
//! ## Architecture
//!
//! - [`freshness`]: snapshot capture and the fresh/stale comparison policy
//! - [`tracking`]: the bounded registry, entry lifecycle and eviction
//! - [`query`]: read-only filters, summaries and diffs over the registry
//! - [`fs`]: the filesystem seam ([`fs::FileSystem`]) and its `std::fs` backend
//! - [`config`]: TOML configuration
//!
//! ## Example Usage
//!
//! ```no_run
//! use readtrack::FileTracker;
//! use readtrack::config::Config;
//!
//! # fn main() -> anyhow::Result<()> {
//! let tracker = FileTracker::from_config(&Config::default())?;
//!
//! tracker.capture_and_register("/etc/hosts")?;
//! if tracker.is_stale("/etc/hosts") {
//!     tracker.refresh("/etc/hosts");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! No filesystem watching happens: divergence is detected only when asked, and
//! nothing is persisted across restarts.

/// Command implementations for the `readtrack` binary.
pub mod commands;

/// Configuration parsing and validation.
pub mod config;

/// Diff rendering between snapshots and live files.
pub mod diff;

/// Error types shared by the evaluator and the registry.
pub mod error;

/// Snapshot capture and freshness comparison.
pub mod freshness;

/// Filesystem access primitives.
pub mod fs;

/// Content digests.
pub mod hash;

/// Terminal formatting for the binary.
pub mod output;

/// Read-only query façade over the registry.
pub mod query;

/// The bounded registry of tracked files.
pub mod tracking;

pub use error::{AccessReason, FileAccessError, TrackerError};
pub use freshness::{FreshnessEvaluator, FreshnessResult, Snapshot, SnapshotContent};
pub use query::{FileStateQuery, TrackingSummary};
pub use tracking::{FileStatus, FileTracker, StatusCounts, TrackedFile};

/// Current version of the readtrack crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
