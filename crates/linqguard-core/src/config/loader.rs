//! Configuration file discovery and loading

use super::linqguard_config::LinqGuardConfig;
use crate::error::LinqGuardError;
use crate::result::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// File names searched in each directory, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &["linqguard.toml", ".linqguardrc.toml", "linqguard.json"];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover config file by traversing upward from start_path
    ///
    /// Looks for each name in [`CONFIG_FILE_NAMES`] starting from the given
    /// directory and moving up the directory tree until a config is found or
    /// the filesystem root is reached.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| LinqGuardError::config_error(format!("Invalid path: {e}")))?;
        if current.is_file()
            && let Some(parent) = current.parent()
        {
            current = parent.to_path_buf();
        }

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    ///
    /// `.json` files are read as JSON, everything else as TOML.
    pub fn load_from_file(path: &Path) -> Result<LinqGuardConfig> {
        let content = fs::read_to_string(path).map_err(|e| {
            LinqGuardError::config_error(format!(
                "Cannot read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let config: LinqGuardConfig = if is_json {
            serde_json::from_str(&content).map_err(|e| {
                LinqGuardError::config_error(format!("Invalid JSON in '{}': {}", path.display(), e))
            })?
        } else {
            toml::from_str(&content).map_err(|e| {
                LinqGuardError::config_error(format!("Invalid TOML in '{}': {}", path.display(), e))
            })?
        };
        config.validate()?;

        tracing::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Load config from path or auto-discover
    ///
    /// An explicit path must exist. Without one, the search starts at
    /// `start_dir` (or the current directory) and falls back to the defaults
    /// when nothing is found.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<LinqGuardConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(LinqGuardError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(LinqGuardConfig::default())
            }
        }
    }
}
