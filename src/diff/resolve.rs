//! Direction resolver: one decision (or none) per indexed relative path

use super::compare::compare_files;
use crate::types::{Action, Decision, EntryKind, EntryPair, PathEntry, SyncError, TreeIndex};
use crate::Config;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Same modification time, different size: left untouched on both sides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub relpath: String,
    pub source_size: u64,
    pub target_size: u64,
}

impl Conflict {
    pub fn to_error(&self) -> SyncError {
        SyncError::AmbiguousConflict {
            relpath: self.relpath.clone(),
            source_size: self.source_size,
            target_size: self.target_size,
        }
    }
}

/// Everything the resolver found in one pass over the index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// relpath → decision, in relpath order
    pub decisions: BTreeMap<String, Decision>,
    pub conflicts: Vec<Conflict>,
}

impl Resolution {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Number of decisions per action
    pub fn count(&self, action: Action) -> usize {
        self.decisions
            .values()
            .filter(|decision| decision.action == action)
            .count()
    }

    /// Decisions in relpath order, ready for execution
    pub fn into_decisions(self) -> Vec<Decision> {
        self.decisions.into_values().collect()
    }

    /// Error describing the conflicts, if any
    pub fn conflict_error(&self) -> Option<SyncError> {
        let first = self.conflicts.first()?;
        Some(SyncError::UnresolvedConflicts {
            count: self.conflicts.len(),
            first: first.relpath.clone(),
        })
    }
}

/// Decide what to do with one relative path
///
/// # Rules
/// * Source missing: copy back to source, unless one-direction sync is on;
///   then remove from target only with `delete_orphans`, otherwise nothing
/// * Target missing: always copy source to target
/// * Both files: see [`compare_files`]
/// * Both present and either one a folder: nothing
///
/// # Errors
/// `SyncError::AmbiguousConflict` for two files with the same modification
/// time and different sizes.
pub fn resolve_entry(
    relpath: &str,
    pair: &EntryPair,
    config: &Config,
) -> Result<Option<Decision>, SyncError> {
    match pair {
        EntryPair::TargetOnly(target) => {
            let action = if !config.one_direction_sync {
                Action::CopyTargetToSource
            } else if config.delete_orphans {
                Action::RemoveTarget
            } else {
                return Ok(None);
            };
            let source = PathEntry::placeholder(target.kind, &config.source, relpath);
            Ok(Some(Decision::new(relpath, action, source, target.clone())))
        }

        EntryPair::SourceOnly(source) => {
            let target = PathEntry::placeholder(source.kind, &config.target, relpath);
            Ok(Some(Decision::new(
                relpath,
                Action::CopySourceToTarget,
                source.clone(),
                target,
            )))
        }

        EntryPair::Both { source, target } => match (source.kind, target.kind) {
            (EntryKind::File, EntryKind::File) => {
                let action = compare_files(relpath, source, target, config)?;
                Ok(action.map(|action| {
                    Decision::new(relpath, action, source.clone(), target.clone())
                }))
            }
            (EntryKind::Folder, EntryKind::Folder) => Ok(None),
            (source_kind, target_kind) => {
                warn!(
                    relpath,
                    source = source_kind.label(),
                    target = target_kind.label(),
                    "entry kind differs between source and target, leaving it untouched"
                );
                Ok(None)
            }
        },
    }
}

/// Resolve every entry of the index
///
/// Conflicts are collected instead of stopping the pass; the caller decides
/// whether they abort the run.
///
/// # Errors
/// Only internal invariant violations (an unobserved file on both sides).
pub fn resolve(index: &TreeIndex, config: &Config) -> Result<Resolution, SyncError> {
    let mut resolution = Resolution::default();

    for (relpath, pair) in index.iter() {
        match resolve_entry(relpath, pair, config) {
            Ok(Some(decision)) => {
                debug!(relpath = %relpath, action = %decision.action, "decision");
                resolution.decisions.insert(relpath.clone(), decision);
            }
            Ok(None) => {}
            Err(SyncError::AmbiguousConflict {
                relpath,
                source_size,
                target_size,
            }) => {
                warn!(
                    relpath = %relpath,
                    source_size,
                    target_size,
                    "same modification time but different size, one side might be corrupted"
                );
                resolution.conflicts.push(Conflict {
                    relpath,
                    source_size,
                    target_size,
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(resolution)
}
