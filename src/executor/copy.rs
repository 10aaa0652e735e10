//! Atomic file copy and directory primitives

use crate::types::SyncError;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Copy a file atomically using the write-then-rename strategy
///
/// 1. Create the destination's parent chain (tolerates concurrent creation)
/// 2. Stream bytes into a sibling `.twinsync-part` file and sync it
/// 3. Copy permission bits and modification time onto the part file
/// 4. Rename the part file over the destination
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(SyncError)` - The source vanished, permission denied, disk full, ...
///
/// # Example
/// ```no_run
/// use twinsync::executor::copy_file_atomic;
/// use std::path::Path;
///
/// let bytes = copy_file_atomic(Path::new("source.txt"), Path::new("dest.txt"))?;
/// # Ok::<(), twinsync::SyncError>(())
/// ```
pub fn copy_file_atomic(src: &Path, dest: &Path) -> Result<u64, SyncError> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }

    let part_path = part_path_for(dest);

    let result = write_part(src, &part_path).and_then(|bytes| {
        fs::rename(&part_path, dest).map_err(|e| SyncError::from_io(dest, e))?;
        Ok(bytes)
    });

    if result.is_err() {
        // Leave no half-written part file behind; the destination is untouched.
        let _ = fs::remove_file(&part_path);
    }

    result
}

fn write_part(src: &Path, part_path: &Path) -> Result<u64, SyncError> {
    let mut src_file = File::open(src).map_err(|e| SyncError::from_io(src, e))?;
    let src_metadata = src_file
        .metadata()
        .map_err(|e| SyncError::from_io(src, e))?;

    let mut part_file = File::create(part_path).map_err(|e| SyncError::from_io(part_path, e))?;
    let total_bytes =
        io::copy(&mut src_file, &mut part_file).map_err(|e| SyncError::from_io(part_path, e))?;

    part_file
        .sync_all()
        .map_err(|e| SyncError::from_io(part_path, e))?;

    // Drop the file handle before rename (required on Windows)
    drop(part_file);

    let mtime = src_metadata
        .modified()
        .map_err(|e| SyncError::from_io(src, e))?;
    filetime::set_file_mtime(part_path, filetime::FileTime::from_system_time(mtime))
        .map_err(|e| SyncError::from_io(part_path, e))?;

    // Permissions last: a read-only source must not block the mtime update.
    fs::set_permissions(part_path, src_metadata.permissions())
        .map_err(|e| SyncError::from_io(part_path, e))?;

    Ok(total_bytes)
}

/// Create a directory and all missing ancestors
///
/// Succeeds when the directory already exists, including when another
/// worker created it concurrently.
pub fn ensure_dir(path: &Path) -> Result<(), SyncError> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(SyncError::from_io(path, e)),
    }
}

/// Remove a directory tree, ignoring every error
pub fn remove_dir_best_effort(path: &Path) {
    if let Err(e) = fs::remove_dir_all(path) {
        tracing::debug!(path = %path.display(), error = %e, "ignored folder removal error");
    }
}

/// Remove one file; a file that is already gone counts as removed
pub fn remove_file(path: &Path) -> Result<(), SyncError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SyncError::from_io(path, e)),
    }
}

fn part_path_for(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".twinsync-part");
    dest.with_file_name(name)
}
