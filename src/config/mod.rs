/// Config file parsing and validation
pub mod parser;

use crate::hash::HashAlgorithm;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default configuration file path relative to the home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/readtrack/config.toml";

/// Top-level `config.toml` contents.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// `[tracking]` section
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// `[diff]` section
    #[serde(default)]
    pub diff: DiffConfig,

    /// `[performance]` section
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Options consumed by the tracker and the freshness evaluator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackingConfig {
    /// Compare content digests instead of mtime and size
    #[serde(default)]
    pub use_content_hash: bool,
    /// Capacity bound; exceeding it evicts the oldest-read entry
    #[serde(default = "default_max_tracked_files")]
    pub max_tracked_files: usize,
    /// Gates `auto_track`
    #[serde(default)]
    pub track_all_files: bool,
    /// Digest used in content-hash mode
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
}

/// Options consumed by the query façade only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffConfig {
    /// Render diffs for stale files
    #[serde(default = "default_generate_diffs")]
    pub generate_diffs: bool,
    /// Unchanged lines shown around each hunk
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

/// Filesystem tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PerformanceConfig {
    /// Files at or above this size are memory mapped when hashed
    #[serde(default = "default_mmap_threshold")]
    pub mmap_threshold: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            use_content_hash: false,
            max_tracked_files: default_max_tracked_files(),
            track_all_files: false,
            hash_algorithm: HashAlgorithm::default(),
        }
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            generate_diffs: default_generate_diffs(),
            context_lines: default_context_lines(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            mmap_threshold: default_mmap_threshold(),
        }
    }
}

impl Config {
    /// Default location, `~/.config/readtrack/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from a file, falling back to defaults when it is absent
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot read or parse the configuration file
    /// - Configuration file contains invalid TOML or invalid values
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        parser::parse_config_file(path)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create config file: {}", path.display()))?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Get a configuration value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let (section, name) = key.split_once('.')?;

        match (section, name) {
            ("tracking", "use_content_hash") => Some(self.tracking.use_content_hash.to_string()),
            ("tracking", "max_tracked_files") => Some(self.tracking.max_tracked_files.to_string()),
            ("tracking", "track_all_files") => Some(self.tracking.track_all_files.to_string()),
            ("tracking", "hash_algorithm") => Some(self.tracking.hash_algorithm.to_string()),
            ("diff", "generate_diffs") => Some(self.diff.generate_diffs.to_string()),
            ("diff", "context_lines") => Some(self.diff.context_lines.to_string()),
            ("performance", "mmap_threshold") => Some(self.performance.mmap_threshold.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown
    /// - The value is invalid for the key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, name) = key
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("Invalid configuration key: {key}"))?;

        match (section, name) {
            ("tracking", "use_content_hash") => {
                self.tracking.use_content_hash = parse_bool(value)?;
            }
            ("tracking", "max_tracked_files") => {
                let max: usize = value
                    .parse()
                    .with_context(|| format!("Invalid number: {value}"))?;
                if max == 0 {
                    anyhow::bail!("max_tracked_files must be at least 1");
                }
                self.tracking.max_tracked_files = max;
            }
            ("tracking", "track_all_files") => {
                self.tracking.track_all_files = parse_bool(value)?;
            }
            ("tracking", "hash_algorithm") => {
                self.tracking.hash_algorithm = match value {
                    "sha256" => HashAlgorithm::Sha256,
                    "xxh3" => HashAlgorithm::Xxh3,
                    _ => anyhow::bail!("Unknown hash algorithm: {value} (expected sha256 or xxh3)"),
                };
            }
            ("diff", "generate_diffs") => self.diff.generate_diffs = parse_bool(value)?,
            ("diff", "context_lines") => {
                self.diff.context_lines = value
                    .parse()
                    .with_context(|| format!("Invalid number: {value}"))?;
            }
            ("performance", "mmap_threshold") => {
                let threshold: usize = value
                    .parse()
                    .with_context(|| format!("Invalid number: {value}"))?;
                if threshold == 0 {
                    anyhow::bail!("mmap_threshold must be at least 1");
                }
                self.performance.mmap_threshold = threshold;
            }
            _ => return Err(anyhow::anyhow!("Unknown configuration key: {key}")),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    value
        .parse()
        .with_context(|| format!("Invalid boolean: {value}"))
}

// Default functions for serde
const fn default_max_tracked_files() -> usize {
    1000
}

const fn default_generate_diffs() -> bool {
    true
}

const fn default_context_lines() -> usize {
    3
}

const fn default_mmap_threshold() -> usize {
    crate::fs::DEFAULT_MMAP_THRESHOLD
}
