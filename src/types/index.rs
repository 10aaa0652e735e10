//! TreeIndex - Both trees joined by relative path

use super::PathEntry;
use std::collections::BTreeMap;

/// What exists at one relative path
///
/// At least one side is always present.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryPair {
    SourceOnly(PathEntry),
    TargetOnly(PathEntry),
    Both { source: PathEntry, target: PathEntry },
}

impl EntryPair {
    pub fn source(&self) -> Option<&PathEntry> {
        match self {
            EntryPair::SourceOnly(source) | EntryPair::Both { source, .. } => Some(source),
            EntryPair::TargetOnly(_) => None,
        }
    }

    pub fn target(&self) -> Option<&PathEntry> {
        match self {
            EntryPair::TargetOnly(target) | EntryPair::Both { target, .. } => Some(target),
            EntryPair::SourceOnly(_) => None,
        }
    }
}

/// Map: relpath → entries on each side
///
/// Keys are `/`-separated paths relative to the respective roots. Ordered
/// so that resolution and dry-run output are deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeIndex {
    entries: BTreeMap<String, EntryPair>,
}

impl TreeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a source entry
    ///
    /// Source entries are inserted before any target entry, so an existing
    /// key is only replaced by a later source entry for the same path.
    pub fn insert_source(&mut self, relpath: String, entry: PathEntry) {
        let pair = match self.entries.remove(&relpath) {
            Some(EntryPair::TargetOnly(target)) | Some(EntryPair::Both { target, .. }) => {
                EntryPair::Both {
                    source: entry,
                    target,
                }
            }
            Some(EntryPair::SourceOnly(_)) | None => EntryPair::SourceOnly(entry),
        };
        self.entries.insert(relpath, pair);
    }

    /// Overlay a target entry, keeping any source entry already at that key
    pub fn insert_target(&mut self, relpath: String, entry: PathEntry) {
        let pair = match self.entries.remove(&relpath) {
            Some(EntryPair::SourceOnly(source)) | Some(EntryPair::Both { source, .. }) => {
                EntryPair::Both {
                    source,
                    target: entry,
                }
            }
            Some(EntryPair::TargetOnly(_)) | None => EntryPair::TargetOnly(entry),
        };
        self.entries.insert(relpath, pair);
    }

    /// Drop a relpath so that neither side is acted on
    pub fn discard(&mut self, relpath: &str) -> Option<EntryPair> {
        self.entries.remove(relpath)
    }

    pub fn get(&self, relpath: &str) -> Option<&EntryPair> {
        self.entries.get(relpath)
    }

    pub fn contains(&self, relpath: &str) -> bool {
        self.entries.contains_key(relpath)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in relpath order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &EntryPair)> {
        self.entries.iter()
    }

    pub fn relpaths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}
