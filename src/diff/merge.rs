//! Merge both scanned trees into one index keyed by relative path

use crate::types::{PathEntry, TreeIndex};
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// One scanned and stat-ed side of the sync
#[derive(Debug, Clone, Default)]
pub struct TreeSide {
    pub root: PathBuf,
    /// Absolute folder paths (the root may be among them)
    pub folders: Vec<PathBuf>,
    /// Observed file entries
    pub files: Vec<PathEntry>,
}

impl TreeSide {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

/// Build the index: all source entries first, then target entries overlaid
///
/// The roots themselves are not indexed. Entries that do not live under
/// their side's root are logged and skipped.
pub fn merge_trees(source: &TreeSide, target: &TreeSide) -> TreeIndex {
    let mut index = TreeIndex::new();

    for (relpath, entry) in side_entries(source) {
        index.insert_source(relpath, entry);
    }
    for (relpath, entry) in side_entries(target) {
        index.insert_target(relpath, entry);
    }

    index
}

fn side_entries(side: &TreeSide) -> impl Iterator<Item = (String, PathEntry)> + '_ {
    let folders = side
        .folders
        .iter()
        .map(|path| PathEntry::folder(path.clone()));
    let files = side.files.iter().cloned();

    folders.chain(files).filter_map(move |entry| {
        let relpath = relative_path(&side.root, &entry.path)?;
        if relpath.is_empty() {
            return None;
        }
        Some((relpath, entry))
    })
}

/// `path` relative to `root`, `/`-separated
///
/// `None` when `path` is not under `root` or is not valid UTF-8.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let Ok(stripped) = path.strip_prefix(root) else {
        warn!(path = %path.display(), root = %root.display(), "path is outside its root, skipping");
        return None;
    };

    let mut parts = Vec::new();
    for component in stripped.components() {
        match component {
            Component::Normal(part) => match part.to_str() {
                Some(part) => parts.push(part),
                None => {
                    warn!(path = %path.display(), "path is not valid UTF-8, skipping");
                    return None;
                }
            },
            Component::CurDir => {}
            _ => {
                warn!(path = %path.display(), "unexpected path component, skipping");
                return None;
            }
        }
    }

    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntryKind, EntryPair};
    use std::time::{Duration, UNIX_EPOCH};

    fn file(path: PathBuf, size: u64) -> PathEntry {
        PathEntry::file(path, size, UNIX_EPOCH + Duration::from_secs(10))
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = Path::new("/data/src");
        let path = root.join("a").join("b").join("c.txt");
        assert_eq!(relative_path(root, &path).as_deref(), Some("a/b/c.txt"));
    }

    #[test]
    fn test_relative_path_of_root_is_empty() {
        let root = Path::new("/data/src");
        assert_eq!(relative_path(root, root).as_deref(), Some(""));
    }

    #[test]
    fn test_relative_path_outside_root() {
        assert_eq!(relative_path(Path::new("/data/src"), Path::new("/other/x")), None);
    }

    #[test]
    fn test_merge_pairs_by_relpath() {
        let src_root = PathBuf::from("/src");
        let dst_root = PathBuf::from("/dst");

        let source = TreeSide {
            root: src_root.clone(),
            folders: vec![src_root.clone(), src_root.join("docs")],
            files: vec![
                file(src_root.join("docs").join("a.txt"), 1),
                file(src_root.join("only_src.txt"), 2),
            ],
        };
        let target = TreeSide {
            root: dst_root.clone(),
            folders: vec![dst_root.clone(), dst_root.join("docs"), dst_root.join("extra")],
            files: vec![file(dst_root.join("docs").join("a.txt"), 3)],
        };

        let index = merge_trees(&source, &target);

        let keys: Vec<_> = index.relpaths().cloned().collect();
        assert_eq!(keys, vec!["docs", "docs/a.txt", "extra", "only_src.txt"]);

        match index.get("docs/a.txt") {
            Some(EntryPair::Both { source, target }) => {
                assert_eq!(source.size, Some(1));
                assert_eq!(target.size, Some(3));
            }
            other => panic!("expected both sides, got {other:?}"),
        }
        assert!(matches!(index.get("extra"), Some(EntryPair::TargetOnly(e)) if e.kind == EntryKind::Folder));
        assert!(matches!(index.get("only_src.txt"), Some(EntryPair::SourceOnly(_))));
        assert!(!index.contains(""));
    }

    #[test]
    fn test_empty_folders_are_indexed() {
        let src_root = PathBuf::from("/src");
        let source = TreeSide {
            root: src_root.clone(),
            folders: vec![src_root.clone(), src_root.join("empty")],
            files: Vec::new(),
        };

        let index = merge_trees(&source, &TreeSide::new("/dst"));

        assert_eq!(index.len(), 1);
        assert!(matches!(index.get("empty"), Some(EntryPair::SourceOnly(e)) if e.is_folder()));
    }
}
