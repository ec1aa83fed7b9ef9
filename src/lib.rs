//! # mirrorsync - One-way Directory Mirroring
//!
//! Periodically makes a replica directory an exact mirror of a source
//! directory: missing entries are created, changed files are re-copied with
//! their timestamps, and anything not in the source is deleted.
//!
//! File equality is decided by a 128-bit content fingerprint, so unchanged
//! files are never rewritten.

// Module declarations
pub mod commands;
pub mod config;
pub mod executor;
pub mod hash;
pub mod logging;
pub mod reconcile;
pub mod scanner;
pub mod scheduler;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use hash::{fingerprint, Fingerprint};
pub use logging::Logger;
pub use reconcile::{reconcile, ReconcileStats};
pub use types::{EntryKind, ErrorPolicy, MismatchPolicy, SyncError, SyncEvent, Tree, TreeEntry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
