//! Pass 2: remove replica entries that no longer exist in the source

use super::Pass;
use crate::executor;
use crate::types::{EntryKind, SyncError, SyncEvent, Tree, TreeEntry};

/// Walk the post-pass-1 `replica` top-down and delete orphans
///
/// An orphaned directory is removed in one recursive delete and its
/// descendants are not visited. Source entries that are never mirrored (broken
/// links, special files) do not protect the replica path.
pub(super) fn run(pass: &mut Pass<'_>, source: &Tree, replica: &Tree) -> Result<(), SyncError> {
    for entry in replica.iter() {
        if pass.is_fenced(&entry.path) {
            continue;
        }

        match source.mirrored_kind(&entry.path) {
            None => remove_orphan(pass, entry)?,
            Some(kind) if kind == entry.kind => {}
            Some(kind) => {
                // Only reachable when pass 1 left the mismatch in place or the
                // trees changed underneath us; pass 1 owns the reporting.
                tracing::debug!(
                    "leaving {} in place: source is a {}, replica is a {}",
                    pass.replica_path(&entry.path).display(),
                    kind,
                    entry.kind
                );
                pass.fence(&entry.path);
            }
        }
    }
    Ok(())
}

fn remove_orphan(pass: &mut Pass<'_>, entry: &TreeEntry) -> Result<(), SyncError> {
    let replica_path = pass.replica_path(&entry.path);
    let removed = pass.attempt(&entry.path, executor::remove_entry(&replica_path))?;

    if removed.is_none() {
        return Ok(());
    }

    // A link to a directory is unlinked, never followed.
    if entry.kind == EntryKind::Directory && !entry.is_symlink {
        pass.emit(SyncEvent::DirectoryRemoved { path: replica_path });
        pass.fence(&entry.path);
    } else {
        pass.emit(SyncEvent::FileRemoved { path: replica_path });
    }
    Ok(())
}
