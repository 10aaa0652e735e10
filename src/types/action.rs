//! Action and Decision - What the resolver decided for one relative path

use super::{EntryKind, PathEntry};
use std::fmt;
use std::path::Path;

/// Sync action determined by the direction resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Source wins: write the source entry onto the target side
    CopySourceToTarget,

    /// Target wins: write the target entry onto the source side
    CopyTargetToSource,

    /// Target-only entry removed (one-direction sync with orphan deletion)
    RemoveTarget,
}

impl Action {
    /// Fixed-width label used by the summary table and logs
    pub fn label(self) -> &'static str {
        match self {
            Action::CopySourceToTarget => "SOURCE --> TARGET",
            Action::CopyTargetToSource => "TARGET --> SOURCE",
            Action::RemoveTarget => "REMOVE_ON_TARGET",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One resolved sync decision
///
/// The side that did not exist carries a placeholder entry whose path is
/// the destination of the copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub relpath: String,
    pub action: Action,
    pub source: PathEntry,
    pub target: PathEntry,
}

impl Decision {
    pub fn new(relpath: impl Into<String>, action: Action, source: PathEntry, target: PathEntry) -> Self {
        Self {
            relpath: relpath.into(),
            action,
            source,
            target,
        }
    }

    /// Kind of the entry being acted on (taken from the observed side)
    pub fn kind(&self) -> EntryKind {
        match self.action {
            Action::CopySourceToTarget => self.source.kind,
            Action::CopyTargetToSource | Action::RemoveTarget => self.target.kind,
        }
    }

    /// `(from, to)` for copies, `None` for removals
    pub fn copy_paths(&self) -> Option<(&Path, &Path)> {
        match self.action {
            Action::CopySourceToTarget => Some((&self.source.path, &self.target.path)),
            Action::CopyTargetToSource => Some((&self.target.path, &self.source.path)),
            Action::RemoveTarget => None,
        }
    }

    /// Bytes that a copy of this decision would move
    pub fn transfer_size(&self) -> u64 {
        match self.action {
            Action::CopySourceToTarget => self.source.size.unwrap_or(0),
            Action::CopyTargetToSource => self.target.size.unwrap_or(0),
            Action::RemoveTarget => 0,
        }
    }
}
