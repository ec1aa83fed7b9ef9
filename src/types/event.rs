//! SyncEvent - Actions reported by the reconciler

use super::EntryKind;
use std::fmt;
use std::path::PathBuf;
use tracing::Level;

/// Why a file was copied into the replica
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyReason {
    /// Nothing existed at the replica path
    Missing,
    /// Replica file had different content
    Changed,
}

/// Something the reconciler did (or declined to do) to the replica
///
/// Paths are the configured tree root joined with the entry's relative path.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    DirectoryCreated {
        path: PathBuf,
    },
    FileCopied {
        source: PathBuf,
        replica: PathBuf,
        bytes: u64,
        reason: CopyReason,
    },
    FileUnchanged {
        path: PathBuf,
    },
    FileRemoved {
        path: PathBuf,
    },
    DirectoryRemoved {
        path: PathBuf,
    },
    /// Replica entry had the wrong kind and was removed before recreating
    KindReplaced {
        path: PathBuf,
        was: EntryKind,
        now: EntryKind,
    },
    /// Replica entry had the wrong kind and was left alone
    MismatchSkipped {
        path: PathBuf,
        source_kind: EntryKind,
        replica_kind: EntryKind,
    },
    /// A per-entry operation failed and the pass continued
    EntryFailed {
        path: PathBuf,
        error: String,
    },
}

impl SyncEvent {
    /// Level this event is logged at
    pub fn level(&self) -> Level {
        match self {
            SyncEvent::FileUnchanged { .. } => Level::DEBUG,
            SyncEvent::KindReplaced { .. } | SyncEvent::MismatchSkipped { .. } => Level::WARN,
            SyncEvent::EntryFailed { .. } => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncEvent::DirectoryCreated { path } => {
                write!(f, "created directory: {}", path.display())
            }
            SyncEvent::FileCopied {
                source, replica, ..
            } => write!(
                f,
                "copied file: {} to {}",
                source.display(),
                replica.display()
            ),
            SyncEvent::FileUnchanged { path } => write!(f, "unchanged file: {}", path.display()),
            SyncEvent::FileRemoved { path } => write!(f, "removed file: {}", path.display()),
            SyncEvent::DirectoryRemoved { path } => {
                write!(f, "removed directory: {}", path.display())
            }
            SyncEvent::KindReplaced { path, was, now } => write!(
                f,
                "replaced {} with {}: {}",
                was,
                now,
                path.display()
            ),
            SyncEvent::MismatchSkipped {
                path,
                source_kind,
                replica_kind,
            } => write!(
                f,
                "skipped {} (source is a {}, replica is a {})",
                path.display(),
                source_kind,
                replica_kind
            ),
            SyncEvent::EntryFailed { path, error } => {
                write!(f, "failed on {}: {}", path.display(), error)
            }
        }
    }
}
