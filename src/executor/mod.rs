//! Executor module for replica mutations
//!
//! Thin wrappers over `std::fs` that map IO errors onto `SyncError` with the
//! offending path attached.

pub mod copy;

use crate::types::{EntryKind, SyncError};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub use copy::copy_file_preserving;

/// Kind of whatever currently sits at `path`, without following links
///
/// Anything that is not a directory (regular files, symbolic links, special
/// files) reports as `EntryKind::File` since it is removed the same way.
pub fn probe(path: &Path) -> Result<Option<EntryKind>, SyncError> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(Some(EntryKind::Directory)),
        Ok(_) => Ok(Some(EntryKind::File)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SyncError::from_io(path, e)),
    }
}

/// Create a directory (and any missing parents)
pub fn create_dir(path: &Path) -> Result<(), SyncError> {
    fs::create_dir_all(path).map_err(|e| SyncError::from_io(path, e))
}

/// Remove a single file; `NotFound` counts as success
pub fn remove_file(path: &Path) -> Result<(), SyncError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SyncError::from_io(path, e)),
    }
}

/// Remove a directory and everything beneath it; `NotFound` counts as success
pub fn remove_dir(path: &Path) -> Result<(), SyncError> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SyncError::from_io(path, e)),
    }
}

/// Remove any filesystem entry at `path`
///
/// Directories are removed recursively; files and symlinks are removed as files.
pub fn remove_entry(path: &Path) -> Result<(), SyncError> {
    match probe(path)? {
        Some(EntryKind::Directory) => remove_dir(path),
        Some(EntryKind::File) => remove_file(path),
        None => Ok(()),
    }
}
