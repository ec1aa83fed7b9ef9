//! Tree reconciler - makes the replica a mirror of the source
//!
//! One call to [`reconcile`] is one cycle:
//!
//! 1. **Propagate**: walk the source top-down, creating missing directories
//!    and copying files that are missing or whose content differs.
//! 2. **Prune**: walk the replica as it stands after pass 1 and remove every
//!    entry whose relative path does not exist in the source. Orphaned
//!    directories are removed with one recursive delete.
//!
//! The cycle is stateless and idempotent: a second call without source changes
//! performs no copies or deletes.

mod compare;
mod propagate;
mod prune;

pub use compare::files_match;

use crate::config::Config;
use crate::executor;
use crate::scanner::scan_tree;
use crate::types::{EntryKind, ErrorPolicy, MismatchPolicy, SyncError, SyncEvent};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Optional callback used to receive reconciliation events.
pub type ReconcileCallback = dyn Fn(&SyncEvent) + Send + Sync;

/// Counters for one reconciliation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub dirs_created: usize,
    pub files_copied: usize,
    /// Files present on both sides with identical content
    pub files_unchanged: usize,
    pub files_removed: usize,
    pub dirs_removed: usize,
    /// Replica entries of the wrong kind that were removed and recreated
    pub kinds_replaced: usize,
    /// Replica entries of the wrong kind that were left alone
    pub mismatches_skipped: usize,
    /// Per-entry failures (only with `ErrorPolicy::Continue`)
    pub failed: usize,
    pub bytes_copied: u64,
}

impl ReconcileStats {
    /// Number of mutations applied to the replica
    pub fn changes(&self) -> usize {
        self.dirs_created
            + self.files_copied
            + self.files_removed
            + self.dirs_removed
            + self.kinds_replaced
    }
}

/// Run one reconciliation cycle from `config.source` onto `config.replica`
///
/// Every mutation is reported through `on_event` as it happens.
///
/// # Errors
/// With `ErrorPolicy::Abort` the first failure aborts the cycle, leaving the
/// replica partially updated; the next cycle resumes from that state. With
/// `ErrorPolicy::Continue` only failures to scan either tree are returned.
pub fn reconcile(
    config: &Config,
    on_event: Option<&ReconcileCallback>,
) -> Result<ReconcileStats, SyncError> {
    let mut pass = Pass::new(config, on_event);

    pass.prepare_replica_root()?;

    let source = scan_tree(&config.source, config)?;
    propagate::run(&mut pass, &source)?;

    // Scanned only now so pruning sees what pass 1 produced.
    let replica = scan_tree(&config.replica, config)?;
    prune::run(&mut pass, &source, &replica)?;

    Ok(pass.stats)
}

/// Shared state threaded through both passes of one cycle
pub(crate) struct Pass<'a> {
    config: &'a Config,
    on_event: Option<&'a ReconcileCallback>,
    stats: ReconcileStats,
    /// Relative paths whose subtrees are not visited again this cycle
    fenced: HashSet<PathBuf>,
}

impl<'a> Pass<'a> {
    fn new(config: &'a Config, on_event: Option<&'a ReconcileCallback>) -> Self {
        Self {
            config,
            on_event,
            stats: ReconcileStats::default(),
            fenced: HashSet::new(),
        }
    }

    fn prepare_replica_root(&mut self) -> Result<(), SyncError> {
        let root = &self.config.replica;
        if root.is_dir() {
            return Ok(());
        }
        if fs::symlink_metadata(root).is_ok() {
            return Err(SyncError::Validation(format!(
                "Replica path exists but is not a directory: {}",
                root.display()
            )));
        }

        executor::create_dir(root)?;
        self.emit(SyncEvent::DirectoryCreated { path: root.clone() });
        Ok(())
    }

    fn source_path(&self, relative: &Path) -> PathBuf {
        self.config.source.join(relative)
    }

    fn replica_path(&self, relative: &Path) -> PathBuf {
        self.config.replica.join(relative)
    }

    fn emit(&mut self, event: SyncEvent) {
        match &event {
            SyncEvent::DirectoryCreated { .. } => self.stats.dirs_created += 1,
            SyncEvent::FileCopied { bytes, .. } => {
                self.stats.files_copied += 1;
                self.stats.bytes_copied += bytes;
            }
            SyncEvent::FileUnchanged { .. } => self.stats.files_unchanged += 1,
            SyncEvent::FileRemoved { .. } => self.stats.files_removed += 1,
            SyncEvent::DirectoryRemoved { .. } => self.stats.dirs_removed += 1,
            SyncEvent::KindReplaced { .. } => self.stats.kinds_replaced += 1,
            SyncEvent::MismatchSkipped { .. } => self.stats.mismatches_skipped += 1,
            SyncEvent::EntryFailed { .. } => self.stats.failed += 1,
        }

        if let Some(callback) = self.on_event {
            callback(&event);
        }
    }

    /// Keep both passes out of everything at and below `relative`
    fn fence(&mut self, relative: &Path) {
        self.fenced.insert(relative.to_path_buf());
    }

    fn is_fenced(&self, relative: &Path) -> bool {
        relative
            .ancestors()
            .any(|ancestor| self.fenced.contains(ancestor))
    }

    /// Apply the error policy to the outcome of a per-entry operation
    ///
    /// Returns `Ok(None)` when the failure was logged and the pass should move
    /// on; the entry's subtree is fenced off in that case.
    fn attempt<T>(
        &mut self,
        relative: &Path,
        result: Result<T, SyncError>,
    ) -> Result<Option<T>, SyncError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => match self.config.error_policy {
                ErrorPolicy::Abort => Err(err),
                ErrorPolicy::Continue => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.replica_path(relative));
                    self.emit(SyncEvent::EntryFailed {
                        path,
                        error: err.to_string(),
                    });
                    self.fence(relative);
                    Ok(None)
                }
            },
        }
    }

    /// Settle a path that is a `replica_kind` in the replica but not in the source
    ///
    /// Returns `true` when the replica path is now free for the source entry.
    fn resolve_mismatch(
        &mut self,
        relative: &Path,
        source_kind: EntryKind,
        replica_kind: EntryKind,
    ) -> Result<bool, SyncError> {
        let replica_path = self.replica_path(relative);

        match self.config.mismatch_policy {
            MismatchPolicy::Replace => {
                let removed = self.attempt(relative, executor::remove_entry(&replica_path))?;
                if removed.is_none() {
                    return Ok(false);
                }
                self.emit(SyncEvent::KindReplaced {
                    path: replica_path,
                    was: replica_kind,
                    now: source_kind,
                });
                Ok(true)
            }
            MismatchPolicy::Skip => {
                self.emit(SyncEvent::MismatchSkipped {
                    path: replica_path,
                    source_kind,
                    replica_kind,
                });
                self.fence(relative);
                Ok(false)
            }
            MismatchPolicy::Fail => Err(SyncError::PathAmbiguity { path: replica_path }),
        }
    }
}
