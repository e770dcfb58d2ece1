/// `readtrack capture`
pub mod capture;
/// `readtrack check`
pub mod check;
/// `readtrack config`
pub mod config;

use crate::config::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Configuration the binary runs with, and where it came from.
#[derive(Debug, Clone)]
pub struct CliContext {
    /// Where the configuration was loaded from and is saved to
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: Config,
}

impl CliContext {
    /// Loads the configuration from `config_path`, or from
    /// `READTRACK_CONFIG_PATH`, or from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the file
    /// exists but cannot be parsed.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => match std::env::var_os("READTRACK_CONFIG_PATH") {
                Some(path) => PathBuf::from(path),
                None => Config::default_path()?,
            },
        };

        let config = Config::load(&config_path)
            .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

        Ok(Self {
            config_path,
            config,
        })
    }
}

/// Expands directories into the regular files beneath them.
///
/// Plain paths are passed through untouched, even if they do not exist, so the
/// tracker can report them.
#[must_use]
pub fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut expanded = Vec::new();
    for path in paths {
        if path.is_dir() {
            expanded.extend(walk_files(path));
        } else {
            expanded.push(path.clone());
        }
    }
    expanded
}

fn walk_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
}
