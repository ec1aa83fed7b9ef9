//! Main sync command: reconcile, wait, repeat

use crate::reconcile::{reconcile, ReconcileStats};
use crate::scheduler::Wait;
use crate::types::{ErrorPolicy, SyncError, SyncEvent};
use crate::Config;
use std::time::Duration;
use tracing::Level;

/// What a finished run loop did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles that ran to completion
    pub cycles: usize,
    /// Cycles that failed and were skipped over (`ErrorPolicy::Continue` only)
    pub failed_cycles: usize,
    /// Totals across all completed cycles
    pub totals: ReconcileStats,
}

/// Run synchronization cycles until `wait` says stop
///
/// Each cycle logs `starting synchronization`, every replica mutation, and
/// `synchronization complete. sleeping for N second(s)` before waiting.
/// With `config.once` set, a single cycle runs and the loop returns without
/// waiting.
///
/// # Errors
/// With `ErrorPolicy::Abort`, the first failed cycle is logged and returned.
pub fn run(config: &Config, wait: &dyn Wait) -> Result<RunSummary, SyncError> {
    let mut summary = RunSummary::default();

    loop {
        tracing::info!("starting synchronization");

        match reconcile(config, Some(&log_event)) {
            Ok(stats) => {
                tracing::debug!(
                    "cycle finished: {} change(s), {} unchanged, {} failed",
                    stats.changes(),
                    stats.files_unchanged,
                    stats.failed
                );
                summary.cycles += 1;
                accumulate(&mut summary.totals, &stats);
            }
            Err(err) => {
                tracing::error!("synchronization failed: {}", err);
                match config.error_policy {
                    ErrorPolicy::Abort => return Err(err),
                    ErrorPolicy::Continue => summary.failed_cycles += 1,
                }
            }
        }

        if config.once {
            tracing::info!("synchronization complete");
            return Ok(summary);
        }

        tracing::info!(
            "synchronization complete. sleeping for {}",
            describe_interval(config.interval)
        );

        if !wait.wait(config.interval) {
            tracing::info!("stop requested, exiting");
            return Ok(summary);
        }
    }
}

/// Route a reconciler event to the active logger at the event's level
pub fn log_event(event: &SyncEvent) {
    let level = event.level();
    if level == Level::ERROR {
        tracing::error!("{}", event);
    } else if level == Level::WARN {
        tracing::warn!("{}", event);
    } else if level == Level::INFO {
        tracing::info!("{}", event);
    } else if level == Level::DEBUG {
        tracing::debug!("{}", event);
    } else {
        tracing::trace!("{}", event);
    }
}

fn describe_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    if secs == 1 {
        "1 second".to_string()
    } else {
        format!("{} seconds", secs)
    }
}

fn accumulate(totals: &mut ReconcileStats, stats: &ReconcileStats) {
    totals.dirs_created += stats.dirs_created;
    totals.files_copied += stats.files_copied;
    totals.files_unchanged += stats.files_unchanged;
    totals.files_removed += stats.files_removed;
    totals.dirs_removed += stats.dirs_removed;
    totals.kinds_replaced += stats.kinds_replaced;
    totals.mismatches_skipped += stats.mismatches_skipped;
    totals.failed += stats.failed;
    totals.bytes_copied += stats.bytes_copied;
}
