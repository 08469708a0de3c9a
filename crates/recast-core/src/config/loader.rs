//! Configuration file discovery and loading

use super::recast_config::RecastConfiguration;
use crate::{RecastError, Result};
use std::path::{Path, PathBuf};

/// File names searched in each directory, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[".recastrc.json", "recast.jsonc", "recast.json"];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover config file by traversing upward from start_path
    ///
    /// Each directory is searched for the names in [`CONFIG_FILE_NAMES`]
    /// before moving to its parent. Stops at the filesystem root.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| RecastError::config_error(format!("Invalid path: {e}")))?;

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
    /// JSON and JSONC (comments, trailing commas) are both accepted.
    pub fn load_from_file(path: &Path) -> Result<RecastConfiguration> {
        let content =
            std::fs::read_to_string(path).map_err(|e| RecastError::io_error(path, e))?;
        let config = Self::parse(&content).map_err(|e| {
            RecastError::config_error(format!(
                "Failed to load config from '{}': {}",
                path.display(),
                e
            ))
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a configuration document
    pub fn parse(content: &str) -> Result<RecastConfiguration> {
        let config: RecastConfiguration = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from path or auto-discover
    ///
    /// Without a custom path, discovery starts at `start_dir` (or the current
    /// directory). When nothing is found the defaults are returned.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<RecastConfiguration> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(RecastError::config_error(format!(
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
                Ok(RecastConfiguration::default())
            }
        }
    }

    /// JSON schema of the configuration document
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(RecastConfiguration))
            .unwrap_or(serde_json::Value::Null)
    }
}
