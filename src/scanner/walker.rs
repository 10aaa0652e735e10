//! Directory walker with folder-name and extension exclusion

use crate::executor::WorkerPool;
use crate::types::SyncError;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Exclusion rules applied to both trees
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFilter {
    excluded_folder_names: BTreeSet<String>,
    /// Lowercased, without a leading dot
    excluded_extensions: BTreeSet<String>,
}

impl ScanFilter {
    /// Build a filter; extensions may be given with or without a leading dot
    pub fn new<F, E>(folder_names: F, extensions: E) -> Self
    where
        F: IntoIterator<Item = String>,
        E: IntoIterator<Item = String>,
    {
        Self {
            excluded_folder_names: folder_names.into_iter().collect(),
            excluded_extensions: extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// True when a folder with this base name must be pruned
    pub fn is_excluded_folder(&self, name: &OsStr) -> bool {
        name.to_str()
            .is_some_and(|name| self.excluded_folder_names.contains(name))
    }

    /// True when the file name ends with an excluded extension (any case)
    pub fn is_excluded_file(&self, name: &OsStr) -> bool {
        if self.excluded_extensions.is_empty() {
            return false;
        }
        let name = name.to_string_lossy().to_lowercase();
        self.excluded_extensions.iter().any(|ext| {
            name.len() > ext.len()
                && name.ends_with(ext.as_str())
                && name[..name.len() - ext.len()].ends_with('.')
        })
    }
}

/// Folders and files found under one root
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    pub root: PathBuf,
    /// Absolute folder paths, root included
    pub folders: Vec<PathBuf>,
    /// Absolute file paths
    pub files: Vec<PathBuf>,
    pub scan_duration: Duration,
}

/// Scan a directory tree
///
/// Walks `root` recursively without `.gitignore`-style filtering and
/// without following links. Excluded folders are pruned before descent, so
/// nothing below them is visited. Symlinks and special files are skipped.
///
/// # Errors
/// * The root itself cannot be read → `SyncError`
/// * Unreadable entries deeper in the tree are logged and skipped
pub fn scan_tree(root: &Path, filter: &ScanFilter) -> Result<ScanResult, SyncError> {
    let start_time = Instant::now();

    // Surface an inaccessible root as an error instead of an empty tree.
    fs::read_dir(root).map_err(|e| SyncError::from_io(root, e))?;

    let mut result = ScanResult {
        root: root.to_path_buf(),
        ..Default::default()
    };

    let prune = filter.clone();
    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            entry.depth() == 0 || !is_dir || !prune.is_excluded_folder(entry.file_name())
        })
        .build();

    for item in walker {
        let entry = match item {
            Ok(entry) => entry,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let Some(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            result.folders.push(entry.into_path());
        } else if file_type.is_file() {
            if filter.is_excluded_file(entry.file_name()) {
                debug!(path = %entry.path().display(), "excluded by extension");
                continue;
            }
            result.files.push(entry.into_path());
        } else {
            debug!(path = %entry.path().display(), "skipping symlink or special file");
        }
    }

    result.scan_duration = start_time.elapsed();
    debug!(
        root = %root.display(),
        folders = result.folders.len(),
        files = result.files.len(),
        elapsed_ms = result.scan_duration.as_millis() as u64,
        "scan finished"
    );
    Ok(result)
}

/// Scan source and target concurrently on a two-worker pool
pub fn scan_both(
    source: &Path,
    target: &Path,
    filter: &ScanFilter,
) -> Result<(ScanResult, ScanResult), SyncError> {
    let pool = WorkerPool::new(2)?;
    let filter = filter.clone();
    let mut results = pool
        .run(
            vec![source.to_path_buf(), target.to_path_buf()],
            move |root| scan_tree(&root, &filter),
            |_| {},
        )?
        .into_iter();

    match (results.next(), results.next()) {
        (Some(source), Some(target)) => Ok((source?, target?)),
        _ => Err(SyncError::Internal(
            "scan pool returned fewer than two results".to_string(),
        )),
    }
}
