//! File comparison logic

use crate::hash::fingerprint;
use crate::types::{SyncError, TreeEntry};
use std::fs;
use std::path::Path;

/// Check whether the replica file already holds the source file's content
///
/// 1. **Not a regular file**: a symbolic link (dangling or not) or special
///    file in the replica never matches and is never opened
/// 2. **Size mismatch**: lengths differ, content cannot match
/// 3. **Fingerprint**: both files are read in full and their digests compared
///
/// Modification times are never consulted; two files with equal digests are
/// equal regardless of metadata.
pub fn files_match(
    source: &TreeEntry,
    source_path: &Path,
    replica_path: &Path,
) -> Result<bool, SyncError> {
    let replica_metadata =
        fs::symlink_metadata(replica_path).map_err(|e| SyncError::from_io(replica_path, e))?;

    if !replica_metadata.file_type().is_file() {
        return Ok(false);
    }

    if replica_metadata.len() != source.size {
        return Ok(false);
    }

    Ok(fingerprint(source_path)? == fingerprint(replica_path)?)
}
