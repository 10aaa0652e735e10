//! Optional TOML config file

use crate::types::SyncError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Defaults read from a `--config` file
///
/// Every key is optional. Unknown keys are rejected so typos surface as
/// configuration errors instead of being ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub exclude_folder_names: Vec<String>,
    pub exclude_file_ext: Vec<String>,
    pub one_direction_sync: Option<bool>,
    pub delete_orphans: Option<bool>,
    pub prefer_source: Option<bool>,
    pub dry_run: Option<bool>,
    pub max_workers: Option<usize>,
    pub summary: Option<bool>,
    pub skip_conflicts: Option<bool>,
}

impl ConfigFile {
    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let content = fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content).map_err(|e| match e {
            SyncError::Config(msg) => {
                SyncError::Config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Parse config file contents
    pub fn parse(content: &str) -> Result<Self, SyncError> {
        toml::from_str(content)
            .map_err(|e| SyncError::Config(format!("Invalid config file: {}", e)))
    }
}
