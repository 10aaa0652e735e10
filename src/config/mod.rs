//! Configuration management

mod cli;
mod file;

pub use cli::Cli;
pub use file::ConfigFile;

use crate::scanner::ScanFilter;
use crate::types::SyncError;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Configuration for one sync run
///
/// Passed explicitly into every phase; nothing reads global state.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Source directory
    pub source: PathBuf,

    /// Target directory
    pub target: PathBuf,

    /// Folder base names pruned from both trees
    pub exclude_folder_names: BTreeSet<String>,

    /// File extensions excluded from both trees (case-insensitive)
    pub exclude_file_ext: BTreeSet<String>,

    /// Only propagate source → target
    pub one_direction_sync: bool,

    /// Remove target-only paths (requires `one_direction_sync`)
    pub delete_orphans: bool,

    /// Source wins when the target copy is newer
    pub prefer_source: bool,

    /// Simulate without touching the filesystem
    pub dry_run: bool,

    /// Execution pool size
    pub max_workers: usize,

    /// Print the decision table before executing
    pub summary: bool,

    /// Keep going when ambiguous conflicts are found
    pub skip_conflicts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            target: PathBuf::new(),
            exclude_folder_names: BTreeSet::new(),
            exclude_file_ext: BTreeSet::new(),
            one_direction_sync: false,
            delete_orphans: false,
            prefer_source: false,
            dry_run: false,
            max_workers: default_workers(),
            summary: false,
            skip_conflicts: false,
        }
    }
}

impl Config {
    /// Config for a source/target pair with every option at its default
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    /// Validate configuration
    ///
    /// Runs before any scanning; a failure here means nothing was touched.
    pub fn validate(&self) -> Result<(), SyncError> {
        if !self.source.is_dir() {
            return Err(SyncError::Config(format!(
                "Source folder path {} does not exist",
                self.source.display()
            )));
        }

        if !self.target.is_dir() {
            return Err(SyncError::Config(format!(
                "Target folder path {} does not exist",
                self.target.display()
            )));
        }

        if self.source == self.target {
            return Err(SyncError::Config(
                "Source and target cannot be the same".to_string(),
            ));
        }

        if self.delete_orphans && !self.one_direction_sync {
            return Err(SyncError::Config(
                "--delete-orphans can be used only in combination with --one-direction-sync"
                    .to_string(),
            ));
        }

        if self.max_workers == 0 {
            return Err(SyncError::Config(
                "--max-workers must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Worker count for the execution phase
    ///
    /// Dry runs use a single worker so the simulated actions print in order.
    pub fn execution_workers(&self) -> usize {
        if self.dry_run {
            1
        } else {
            self.max_workers.max(1)
        }
    }

    /// Exclusion filter shared by both tree scans
    pub fn scan_filter(&self) -> ScanFilter {
        ScanFilter::new(
            self.exclude_folder_names.iter().cloned(),
            self.exclude_file_ext.iter().cloned(),
        )
    }

    /// Fold values from a config file under this config
    ///
    /// Lists are unioned and flags OR-ed. The file's `max_workers` only
    /// applies when `cli_workers` is `None`.
    pub fn apply_file(&mut self, file: ConfigFile, cli_workers: Option<usize>) {
        self.exclude_folder_names.extend(file.exclude_folder_names);
        self.exclude_file_ext.extend(file.exclude_file_ext);
        self.one_direction_sync |= file.one_direction_sync.unwrap_or(false);
        self.delete_orphans |= file.delete_orphans.unwrap_or(false);
        self.prefer_source |= file.prefer_source.unwrap_or(false);
        self.dry_run |= file.dry_run.unwrap_or(false);
        self.summary |= file.summary.unwrap_or(false);
        self.skip_conflicts |= file.skip_conflicts.unwrap_or(false);
        if cli_workers.is_none() {
            if let Some(workers) = file.max_workers {
                self.max_workers = workers;
            }
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = SyncError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let mut config = Config {
            source: cli.source,
            target: cli.target,
            exclude_folder_names: cli.exclude_folder_names.into_iter().collect(),
            exclude_file_ext: cli.exclude_file_ext.into_iter().collect(),
            one_direction_sync: cli.one_direction_sync,
            delete_orphans: cli.delete_orphans,
            prefer_source: cli.prefer_source,
            dry_run: cli.dry_run,
            max_workers: cli.max_workers.unwrap_or_else(default_workers),
            summary: cli.summary,
            skip_conflicts: cli.skip_conflicts,
        };

        if let Some(path) = &cli.config {
            let file = ConfigFile::load(path)?;
            config.apply_file(file, cli.max_workers);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Default pool size: available CPU parallelism, 4 if unknown
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
