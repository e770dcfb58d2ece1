use colored::Colorize;
use similar::{Algorithm, ChangeTag, TextDiff};
use std::io::{self, Write};
use tracing::{Level, debug, span};

/// Configuration for unified diff generation
#[derive(Debug, Clone, Copy)]
pub struct UnifiedDiffConfig {
    /// Number of context lines around changes (typically 3)
    pub context_lines: usize,
    /// Diff algorithm to use (Myers, Patience)
    pub algorithm: Algorithm,
    /// Whether to colorize the output
    pub colorize: bool,
}

impl Default for UnifiedDiffConfig {
    fn default() -> Self {
        Self {
            context_lines: 3,
            algorithm: Algorithm::Myers,
            colorize: false,
        }
    }
}

/// Line counts of a rendered diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    /// Added lines
    pub insertions: usize,
    /// Removed lines
    pub deletions: usize,
}

impl DiffStats {
    /// Whether the diff had no changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.insertions == 0 && self.deletions == 0
    }
}

/// Generate a unified diff between two text contents.
///
/// Produces Git-style output: `---`/`+++` headers carrying `old_label` and
/// `new_label`, `@@` hunk headers, then context, deletion (`-`, red) and
/// insertion (`+`, green) lines.
///
/// # Errors
///
/// Returns an error if writing to the output writer fails.
pub fn generate_unified_diff(
    old_content: &str,
    new_content: &str,
    old_label: &str,
    new_label: &str,
    config: &UnifiedDiffConfig,
    writer: &mut dyn Write,
) -> io::Result<DiffStats> {
    let span = span!(
        Level::DEBUG,
        "diff_generation",
        path = %new_label,
        algorithm = ?config.algorithm,
        context = config.context_lines
    );
    let _guard = span.enter();

    let diff = TextDiff::configure()
        .algorithm(config.algorithm)
        .diff_lines(old_content, new_content);

    let old_header = format!("--- {old_label}");
    let new_header = format!("+++ {new_label}");

    if config.colorize {
        writeln!(writer, "{}", old_header.red())?;
        writeln!(writer, "{}", new_header.green())?;
    } else {
        writeln!(writer, "{old_header}")?;
        writeln!(writer, "{new_header}")?;
    }

    let mut stats = DiffStats::default();

    for hunk in diff
        .unified_diff()
        .context_radius(config.context_lines)
        .iter_hunks()
    {
        let hunk_header = hunk.header().to_string();
        if config.colorize {
            writeln!(writer, "{}", hunk_header.cyan())?;
        } else {
            writeln!(writer, "{hunk_header}")?;
        }

        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => {
                    stats.deletions += 1;
                    let line = format!("-{change}");
                    if config.colorize {
                        line.red().to_string()
                    } else {
                        line
                    }
                }
                ChangeTag::Insert => {
                    stats.insertions += 1;
                    let line = format!("+{change}");
                    if config.colorize {
                        line.green().to_string()
                    } else {
                        line
                    }
                }
                ChangeTag::Equal => format!(" {change}"),
            };

            write!(writer, "{line}")?;

            // Last line of a file without trailing newline
            if change.missing_newline() {
                writeln!(writer)?;
            }
        }
    }

    debug!(
        insertions = stats.insertions,
        deletions = stats.deletions,
        "Diff generation complete"
    );

    Ok(stats)
}

/// Write a "Binary files differ" line.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn generate_binary_diff_message(
    old_label: &str,
    new_label: &str,
    writer: &mut dyn Write,
) -> io::Result<()> {
    writeln!(writer, "Binary files {old_label} and {new_label} differ")
}
