//! Reconciliation policies

use clap::ValueEnum;

/// What to do when a per-entry operation fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// First failure aborts the pass
    #[default]
    Abort,

    /// Log the failure, skip the entry (and anything beneath it), keep going
    Continue,
}

/// What to do when the same relative path is a file in one tree and a
/// directory in the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MismatchPolicy {
    /// Remove the replica entry and recreate it with the source's kind
    #[default]
    Replace,

    /// Leave the replica entry (and its subtree) untouched
    Skip,

    /// Abort the pass with a path ambiguity error
    Fail,
}
