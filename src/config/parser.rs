use super::Config;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

/// Keys recognised in each section of the config file.
const KNOWN_FIELDS: &[(&str, &[&str])] = &[
    (
        "tracking",
        &[
            "use_content_hash",
            "max_tracked_files",
            "track_all_files",
            "hash_algorithm",
        ],
    ),
    ("diff", &["generate_diffs", "context_lines"]),
    ("performance", &["mmap_threshold"]),
];

/// Reads and parses a config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or fails
/// validation.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
}

/// Parses config TOML, warning about keys it does not know.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config_str(content: &str) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content).context("Failed to parse TOML config")?;
    for field in unknown_fields(&raw) {
        warn!(field = %field, "Unknown configuration field ignored");
    }

    let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;

    // Validation errors are returned as is, without wrapping
    validate_config(&config)?;
    Ok(config)
}

/// Range checks that serde cannot express.
///
/// # Errors
///
/// Returns an error if `max_tracked_files` or `mmap_threshold` is zero.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.tracking.max_tracked_files == 0 {
        anyhow::bail!("max_tracked_files must be at least 1");
    }

    if config.performance.mmap_threshold == 0 {
        anyhow::bail!("mmap_threshold must be at least 1 byte");
    }

    Ok(())
}

/// Dotted paths of every key not listed in [`KNOWN_FIELDS`].
fn unknown_fields(raw: &toml::Value) -> Vec<String> {
    let Some(table) = raw.as_table() else {
        return Vec::new();
    };

    let mut unknown = Vec::new();
    for (section, value) in table {
        let Some(known) = KNOWN_FIELDS
            .iter()
            .find(|(name, _)| *name == section.as_str())
            .map(|(_, keys)| *keys)
        else {
            unknown.push(section.clone());
            continue;
        };

        if let Some(inner) = value.as_table() {
            unknown.extend(
                inner
                    .keys()
                    .filter(|key| !known.contains(&key.as_str()))
                    .map(|key| format!("{section}.{key}")),
            );
        }
    }
    unknown
}
