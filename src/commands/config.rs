use super::CliContext;
use crate::output;
use anyhow::Result;
use colored::Colorize;

/// Execute config command to get/set configuration values
///
/// # Errors
///
/// Returns an error if:
/// - The key is unknown or the value is invalid
/// - Failed to save configuration
pub fn execute(ctx: &mut CliContext, key: Option<&str>, value: Option<&str>, init: bool) -> Result<()> {
    if init {
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Wrote {}", ctx.config_path.display()));
        return Ok(());
    }

    let Some(key) = key else {
        show_all_config(ctx);
        return Ok(());
    };

    if let Some(value) = value {
        ctx.config.set(key, value)?;
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Set {key} = {value}"));
    } else if let Some(value) = ctx.config.get(key) {
        println!("{value}");
    } else {
        anyhow::bail!("Unknown configuration key: {key}");
    }

    Ok(())
}

fn show_all_config(ctx: &CliContext) {
    let config = &ctx.config;

    println!("{}", "[tracking]".bold());
    println!("  use_content_hash = {}", config.tracking.use_content_hash);
    println!("  max_tracked_files = {}", config.tracking.max_tracked_files);
    println!("  track_all_files = {}", config.tracking.track_all_files);
    println!("  hash_algorithm = {}", config.tracking.hash_algorithm);

    println!("\n{}", "[diff]".bold());
    println!("  generate_diffs = {}", config.diff.generate_diffs);
    println!("  context_lines = {}", config.diff.context_lines);

    println!("\n{}", "[performance]".bold());
    println!("  mmap_threshold = {}", config.performance.mmap_threshold);
}
