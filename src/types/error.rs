//! Error types for twinsync

use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for twinsync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or missing root directory
    #[error("Configuration error: {0}")]
    Config(String),

    /// Same modification time but different size on both sides
    #[error(
        "Ambiguous conflict: {relpath} has the same modification time on both sides \
         but different sizes ({source_size} != {target_size}); one of them might be corrupted"
    )]
    AmbiguousConflict {
        relpath: String,
        source_size: u64,
        target_size: u64,
    },

    /// Run stopped before execution because conflicts were found
    #[error("{count} ambiguous conflict(s) left unresolved, first: {first}")]
    UnresolvedConflicts { count: usize, first: String },

    /// File vanished between scan and use
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    /// Permission denied for specific path
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// No space left while writing a path
    #[error("Disk full while writing {path}")]
    DiskFull { path: PathBuf },

    /// Some execution tasks failed
    #[error("Sync finished with {failed} of {total} task(s) failed")]
    Incomplete { failed: usize, total: usize },

    /// Internal invariant violation (worker pool failure, panicking task)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Attach a path to a raw IO error, classifying the common kinds
    pub fn from_io(path: &Path, error: IoError) -> Self {
        if error.kind() == ErrorKind::NotFound {
            SyncError::NotFound {
                path: path.to_path_buf(),
            }
        } else if error.kind() == ErrorKind::PermissionDenied {
            SyncError::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else if matches!(error.kind(), ErrorKind::StorageFull)
            || matches!(error.raw_os_error(), Some(28 | 122))
        {
            SyncError::DiskFull {
                path: path.to_path_buf(),
            }
        } else {
            SyncError::Io(error)
        }
    }

    /// Check if this error is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, SyncError::Config(_))
    }

    /// Check if this error is an ambiguous-conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            SyncError::AmbiguousConflict { .. } | SyncError::UnresolvedConflicts { .. }
        )
    }

    /// Check if this error is a filesystem failure scoped to one file
    pub fn is_io_failure(&self) -> bool {
        matches!(
            self,
            SyncError::Io(_)
                | SyncError::NotFound { .. }
                | SyncError::PermissionDenied { .. }
                | SyncError::DiskFull { .. }
        )
    }
}
