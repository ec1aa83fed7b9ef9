//! Metadata-preserving atomic file copy

use crate::types::SyncError;
use filetime::FileTime;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

const PART_SUFFIX: &str = ".mirrorsync-part";

/// Copy a file using the write-then-rename strategy
///
/// 1. Stream `src` into a hidden `.<name>.mirrorsync-part` sibling of `dest`
/// 2. Flush and sync to disk
/// 3. Copy access/modification times and permissions from `src`
/// 4. Rename over `dest`
///
/// `src` is followed if it is a symbolic link. The part file is removed if any
/// step fails; one left behind by a killed process is an ordinary orphan in the
/// replica and is pruned on the next pass.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(SyncError)` - IO error naming the path that failed
pub fn copy_file_preserving(src: &Path, dest: &Path) -> Result<u64, SyncError> {
    let part_path = part_path_for(dest);

    match write_part(src, &part_path) {
        Ok(bytes) => match fs::rename(&part_path, dest) {
            Ok(()) => Ok(bytes),
            Err(e) => {
                discard_part(&part_path);
                Err(SyncError::from_io(dest, e))
            }
        },
        Err(err) => {
            discard_part(&part_path);
            Err(err)
        }
    }
}

fn write_part(src: &Path, part_path: &Path) -> Result<u64, SyncError> {
    let mut src_file = File::open(src).map_err(|e| SyncError::from_io(src, e))?;
    let mut part_file = File::create(part_path).map_err(|e| SyncError::from_io(part_path, e))?;

    let mut buffer = vec![0u8; 128 * 1024];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = match src_file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(SyncError::from_io(src, e)),
        };

        part_file
            .write_all(&buffer[..bytes_read])
            .map_err(|e| SyncError::from_io(part_path, e))?;
        total_bytes += bytes_read as u64;
    }

    part_file
        .sync_all()
        .map_err(|e| SyncError::from_io(part_path, e))?;

    // Drop the file handle before touching metadata and renaming (required on Windows)
    drop(part_file);

    let src_metadata = fs::metadata(src).map_err(|e| SyncError::from_io(src, e))?;

    // Times before permissions: a read-only part file cannot have its times set on Windows.
    let atime = FileTime::from_last_access_time(&src_metadata);
    let mtime = FileTime::from_last_modification_time(&src_metadata);
    filetime::set_file_times(part_path, atime, mtime)
        .map_err(|e| SyncError::from_io(part_path, e))?;

    fs::set_permissions(part_path, src_metadata.permissions())
        .map_err(|e| SyncError::from_io(part_path, e))?;

    Ok(total_bytes)
}

/// Temporary sibling used while a copy is in flight
pub fn part_path_for(dest: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(dest.file_name().unwrap_or_default());
    name.push(PART_SUFFIX);
    dest.with_file_name(name)
}

fn discard_part(part_path: &Path) {
    if let Err(e) = fs::remove_file(part_path) {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!("could not remove {}: {}", part_path.display(), e);
        }
    }
}
