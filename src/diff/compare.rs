//! File comparison logic

use crate::types::{Action, PathEntry, SyncError};
use crate::Config;
use std::cmp::Ordering;

/// Compare two observed files and determine which side should win
///
/// Metadata-only comparison, no content is read:
///
/// 1. Same mtime and same size → in sync, `None`
/// 2. Source older → target wins, unless `prefer_source` is set
/// 3. Source newer → source wins
/// 4. Same mtime, different size → `SyncError::AmbiguousConflict`; one of
///    the two copies may be corrupted and neither is overwritten
///
/// # Errors
/// Besides the conflict, fails with `SyncError::Internal` when either entry
/// was never observed on disk.
pub fn compare_files(
    relpath: &str,
    source: &PathEntry,
    target: &PathEntry,
    config: &Config,
) -> Result<Option<Action>, SyncError> {
    let (Some(source_size), Some(source_mtime)) = (source.size, source.mtime) else {
        return Err(unobserved(relpath, "source"));
    };
    let (Some(target_size), Some(target_mtime)) = (target.size, target.mtime) else {
        return Err(unobserved(relpath, "target"));
    };

    match source_mtime.cmp(&target_mtime) {
        Ordering::Less if config.prefer_source => Ok(Some(Action::CopySourceToTarget)),
        Ordering::Less => Ok(Some(Action::CopyTargetToSource)),
        Ordering::Greater => Ok(Some(Action::CopySourceToTarget)),
        Ordering::Equal if source_size == target_size => Ok(None),
        Ordering::Equal => Err(SyncError::AmbiguousConflict {
            relpath: relpath.to_string(),
            source_size,
            target_size,
        }),
    }
}

fn unobserved(relpath: &str, side: &str) -> SyncError {
    SyncError::Internal(format!(
        "{} file {} has no recorded size or modification time",
        side, relpath
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn file(path: &str, size: u64, mtime: SystemTime) -> PathEntry {
        PathEntry::file(PathBuf::from(path), size, mtime)
    }

    #[test]
    fn test_identical_metadata_is_in_sync() {
        let config = Config::default();
        let src = file("/src/a", 100, at(1_000));
        let dst = file("/dst/a", 100, at(1_000));

        assert_eq!(compare_files("a", &src, &dst, &config).expect("compare"), None);
    }

    #[test]
    fn test_newer_source_wins() {
        let config = Config::default();
        let src = file("/src/a", 100, at(2_000));
        let dst = file("/dst/a", 100, at(1_000));

        assert_eq!(
            compare_files("a", &src, &dst, &config).expect("compare"),
            Some(Action::CopySourceToTarget)
        );
    }

    #[test]
    fn test_newer_target_wins_by_default() {
        let config = Config::default();
        let src = file("/src/a", 100, at(1_000));
        let dst = file("/dst/a", 50, at(2_000));

        assert_eq!(
            compare_files("a", &src, &dst, &config).expect("compare"),
            Some(Action::CopyTargetToSource)
        );
    }

    #[test]
    fn test_prefer_source_overrides_newer_target() {
        let config = Config {
            prefer_source: true,
            ..Config::default()
        };
        let src = file("/src/a", 100, at(1_000));
        let dst = file("/dst/a", 100, at(2_000));

        assert_eq!(
            compare_files("a", &src, &dst, &config).expect("compare"),
            Some(Action::CopySourceToTarget)
        );
    }

    #[test]
    fn test_same_mtime_different_size_is_conflict() {
        let config = Config {
            prefer_source: true,
            ..Config::default()
        };
        let src = file("/src/a", 100, at(1_000));
        let dst = file("/dst/a", 99, at(1_000));

        match compare_files("a", &src, &dst, &config) {
            Err(SyncError::AmbiguousConflict {
                relpath,
                source_size,
                target_size,
            }) => {
                assert_eq!(relpath, "a");
                assert_eq!(source_size, 100);
                assert_eq!(target_size, 99);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_unobserved_entry_is_internal_error() {
        let config = Config::default();
        let src = PathEntry::folder(PathBuf::from("/src/a"));
        let dst = file("/dst/a", 1, at(1));

        assert!(matches!(
            compare_files("a", &src, &dst, &config),
            Err(SyncError::Internal(_))
        ));
    }
}
