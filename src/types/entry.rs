//! PathEntry - A single file or folder observed on one side of the sync

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Kind of filesystem entry tracked by the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Folder,
}

impl EntryKind {
    /// Short lowercase label used in logs and dry-run output
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Folder => "folder",
        }
    }
}

/// A file or folder on one side of the sync
///
/// `size` and `mtime` are only populated for files whose metadata was
/// actually read. Folders and synthesized placeholders carry neither.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEntry {
    /// File or folder
    pub kind: EntryKind,

    /// Absolute path (root joined with the relative path)
    pub path: PathBuf,

    /// File size in bytes
    pub size: Option<u64>,

    /// Last modification time
    pub mtime: Option<SystemTime>,
}

impl PathEntry {
    /// Create an observed file entry
    pub fn file(path: PathBuf, size: u64, mtime: SystemTime) -> Self {
        Self {
            kind: EntryKind::File,
            path,
            size: Some(size),
            mtime: Some(mtime),
        }
    }

    /// Create a folder entry
    pub fn folder(path: PathBuf) -> Self {
        Self {
            kind: EntryKind::Folder,
            path,
            size: None,
            mtime: None,
        }
    }

    /// Create a placeholder for the side where `relpath` does not exist yet
    ///
    /// The placeholder only exists to carry the destination path of a copy
    /// or remove.
    pub fn placeholder(kind: EntryKind, root: &Path, relpath: &str) -> Self {
        Self {
            kind,
            path: join_relpath(root, relpath),
            size: None,
            mtime: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// True when size/mtime were observed on disk
    pub fn is_observed(&self) -> bool {
        self.size.is_some() && self.mtime.is_some()
    }
}

/// Join a `/`-separated relative path onto a root
pub fn join_relpath(root: &Path, relpath: &str) -> PathBuf {
    relpath
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}
