use super::{CliContext, expand_paths};
use crate::freshness::{FreshnessEvaluator, SnapshotContent};
use crate::fs::OsFileSystem;
use crate::output;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

/// Captures and prints a snapshot of each path without tracking it.
///
/// # Errors
///
/// Returns an error if no path could be captured.
pub fn execute(ctx: &CliContext, paths: &[PathBuf]) -> Result<()> {
    let tracking = &ctx.config.tracking;
    let evaluator = FreshnessEvaluator::new(
        Arc::new(OsFileSystem::new(ctx.config.performance.mmap_threshold)),
        tracking.use_content_hash,
        tracking.hash_algorithm,
    );

    let paths = expand_paths(paths);
    let mut captured = 0usize;

    for path in &paths {
        match evaluator.capture(path) {
            Ok(snapshot) => {
                captured += 1;
                let content = match snapshot.content() {
                    SnapshotContent::Raw(_) => "raw".to_string(),
                    SnapshotContent::Digest(digest) => digest.to_string(),
                };
                println!("{}", path.display().to_string().bold());
                println!("  size     {}", output::format_size(snapshot.size()));
                println!("  modified {}", output::format_mtime(snapshot.modified()));
                println!("  content  {}", content.dimmed());
            }
            Err(err) => output::warning(&err.to_string()),
        }
    }

    if captured == 0 && !paths.is_empty() {
        anyhow::bail!("No file could be captured");
    }
    Ok(())
}
