//! Diff rendering between a stored snapshot and the live file.
//!
//! - Line-by-line unified diffs with context
//! - Binary content detection
//! - Optional colorized output

/// Binary content detection
pub mod binary;
/// Unified diff generation for text content
pub mod unified;

pub use binary::is_binary;
pub use unified::{DiffStats, UnifiedDiffConfig, generate_binary_diff_message, generate_unified_diff};
