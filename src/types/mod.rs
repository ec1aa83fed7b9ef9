//! Core type definitions for mirrorsync

mod entry;
mod error;
mod event;
mod policy;
mod tree;

pub use entry::{EntryKind, TreeEntry};
pub use error::SyncError;
pub use event::{CopyReason, SyncEvent};
pub use policy::{ErrorPolicy, MismatchPolicy};
pub use tree::Tree;
