//! File metadata collection (size and modification time)

use crate::executor::{PoolEvent, WorkerPool};
use crate::types::{PathEntry, SyncError};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Progress callback: (files stat-ed so far, bytes seen so far)
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Size and modification time of one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub mtime: SystemTime,
}

/// Read size and modification time without following a final symlink
///
/// A file that vanished since the scan fails with `SyncError::NotFound`.
pub fn stat_file(path: &Path) -> Result<FileStat, SyncError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| SyncError::from_io(path, e))?;
    let mtime = metadata
        .modified()
        .map_err(|e| SyncError::from_io(path, e))?;

    Ok(FileStat {
        size: metadata.len(),
        mtime,
    })
}

/// Result of stat-ing every file of one tree
#[derive(Debug, Default)]
pub struct MetadataReport {
    /// Observed file entries
    pub entries: Vec<PathEntry>,

    /// Files whose metadata could not be read
    pub failures: Vec<(PathBuf, SyncError)>,
}

impl MetadataReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Stat every file on a pool of `workers` workers
///
/// A failing file is recorded in `failures` and does not stop the others.
pub fn collect_metadata(
    files: Vec<PathBuf>,
    workers: usize,
    on_progress: Option<&ProgressCallback>,
) -> Result<MetadataReport, SyncError> {
    let pool = WorkerPool::new(workers)?;
    let mut files_done = 0u64;
    let mut bytes_seen = 0u64;

    let results = pool.run(
        files,
        |path| {
            let stat = stat_file(&path);
            (path, stat)
        },
        |event| {
            if let PoolEvent::Finished {
                result: (_, stat), ..
            } = event
            {
                files_done += 1;
                if let Ok(stat) = stat {
                    bytes_seen += stat.size;
                }
                if let Some(callback) = on_progress {
                    callback(files_done, bytes_seen);
                }
            }
        },
    )?;

    let mut report = MetadataReport::default();
    for (path, stat) in results {
        match stat {
            Ok(stat) => {
                debug!(path = %path.display(), size = stat.size, "stat");
                report
                    .entries
                    .push(PathEntry::file(path, stat.size, stat.mtime));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read file metadata");
                report.failures.push((path, e));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_stat_file_reads_size_and_mtime() {
        let temp = TempDir::new().expect("create tempdir");
        let path = temp.path().join("a.txt");
        fs::write(&path, b"hello").expect("write file");
        filetime::set_file_mtime(&path, FileTime::from_unix_time(1_700_000_000, 0))
            .expect("set mtime");

        let stat = stat_file(&path).expect("stat succeeds");

        assert_eq!(stat.size, 5);
        assert_eq!(
            FileTime::from_system_time(stat.mtime),
            FileTime::from_unix_time(1_700_000_000, 0)
        );
    }

    #[test]
    fn test_stat_missing_file_is_not_found() {
        let temp = TempDir::new().expect("create tempdir");
        let err = stat_file(&temp.path().join("gone.txt")).unwrap_err();
        assert!(matches!(err, SyncError::NotFound { .. }));
    }

    #[test]
    fn test_collect_metadata_keeps_going_after_failure() {
        let temp = TempDir::new().expect("create tempdir");
        let present = temp.path().join("present.txt");
        let missing = temp.path().join("missing.txt");
        fs::write(&present, b"abc").expect("write file");

        let report = collect_metadata(vec![present.clone(), missing.clone()], 2, None)
            .expect("collect succeeds");

        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].path, present);
        assert_eq!(report.entries[0].size, Some(3));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, missing);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_collect_metadata_reports_progress() {
        let temp = TempDir::new().expect("create tempdir");
        let mut files = Vec::new();
        for i in 0..5 {
            let path = temp.path().join(format!("f{i}.bin"));
            fs::write(&path, vec![0u8; 10]).expect("write file");
            files.push(path);
        }

        let last_files = Arc::new(AtomicU64::new(0));
        let last_bytes = Arc::new(AtomicU64::new(0));
        let files_clone = Arc::clone(&last_files);
        let bytes_clone = Arc::clone(&last_bytes);
        let callback: ProgressCallback = Box::new(move |files, bytes| {
            files_clone.store(files, Ordering::SeqCst);
            bytes_clone.store(bytes, Ordering::SeqCst);
        });

        let report = collect_metadata(files, 3, Some(&callback)).expect("collect succeeds");

        assert!(report.is_complete());
        assert_eq!(report.entries.len(), 5);
        assert_eq!(last_files.load(Ordering::SeqCst), 5);
        assert_eq!(last_bytes.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn test_collect_metadata_empty_input() {
        let report = collect_metadata(Vec::new(), 4, None).expect("collect succeeds");
        assert!(report.entries.is_empty());
        assert!(report.is_complete());
    }
}
