//! Pass 1: propagate source entries into the replica

use super::{files_match, Pass};
use crate::executor;
use crate::types::{CopyReason, EntryKind, SyncError, SyncEvent, Tree, TreeEntry};

/// Walk `source` top-down and bring each entry into the replica
///
/// Directories are visited before their contents, so a file's parent exists
/// in the replica by the time the file is copied.
pub(super) fn run(pass: &mut Pass<'_>, source: &Tree) -> Result<(), SyncError> {
    for entry in source.iter() {
        if pass.is_fenced(&entry.path) {
            continue;
        }

        if entry.is_special {
            skip_special(pass, entry);
            continue;
        }

        match entry.kind {
            EntryKind::Directory => propagate_dir(pass, entry)?,
            EntryKind::File => propagate_file(pass, entry)?,
        }
    }
    Ok(())
}

fn skip_special(pass: &Pass<'_>, entry: &TreeEntry) {
    let source_path = pass.source_path(&entry.path);
    if entry.is_symlink {
        tracing::warn!("skipping broken symbolic link: {}", source_path.display());
    } else {
        tracing::debug!("skipping special file: {}", source_path.display());
    }
}

fn propagate_dir(pass: &mut Pass<'_>, entry: &TreeEntry) -> Result<(), SyncError> {
    let replica_path = pass.replica_path(&entry.path);

    let existing = match pass.attempt(&entry.path, executor::probe(&replica_path))? {
        Some(existing) => existing,
        None => return Ok(()),
    };

    match existing {
        Some(EntryKind::Directory) => return Ok(()),
        Some(EntryKind::File) => {
            if !pass.resolve_mismatch(&entry.path, EntryKind::Directory, EntryKind::File)? {
                return Ok(());
            }
        }
        None => {}
    }

    if pass
        .attempt(&entry.path, executor::create_dir(&replica_path))?
        .is_some()
    {
        pass.emit(SyncEvent::DirectoryCreated { path: replica_path });
    }
    Ok(())
}

fn propagate_file(pass: &mut Pass<'_>, entry: &TreeEntry) -> Result<(), SyncError> {
    let source_path = pass.source_path(&entry.path);
    let replica_path = pass.replica_path(&entry.path);

    let existing = match pass.attempt(&entry.path, executor::probe(&replica_path))? {
        Some(existing) => existing,
        None => return Ok(()),
    };

    let reason = match existing {
        None => CopyReason::Missing,
        Some(EntryKind::File) => {
            let same = files_match(entry, &source_path, &replica_path);
            match pass.attempt(&entry.path, same)? {
                None => return Ok(()),
                Some(true) => {
                    pass.emit(SyncEvent::FileUnchanged { path: replica_path });
                    return Ok(());
                }
                Some(false) => CopyReason::Changed,
            }
        }
        Some(EntryKind::Directory) => {
            if !pass.resolve_mismatch(&entry.path, EntryKind::File, EntryKind::Directory)? {
                return Ok(());
            }
            CopyReason::Missing
        }
    };

    let copied = executor::copy_file_preserving(&source_path, &replica_path);
    if let Some(bytes) = pass.attempt(&entry.path, copied)? {
        pass.emit(SyncEvent::FileCopied {
            source: source_path,
            replica: replica_path,
            bytes,
            reason,
        });
    }
    Ok(())
}
