//! TreeEntry - Represents a single node in a scanned tree

use std::fmt;
use std::path::PathBuf;

/// Kind of filesystem node tracked by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => f.write_str("file"),
            EntryKind::Directory => f.write_str("directory"),
        }
    }
}

/// Represents a file or directory in a scanned tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEntry {
    /// Relative path from the tree root
    pub path: PathBuf,

    pub kind: EntryKind,

    /// Size in bytes (0 for directories and special entries)
    pub size: u64,

    /// Entry was reached through a symbolic link
    pub is_symlink: bool,

    /// Neither a regular file nor a directory once links are resolved
    /// (broken symbolic link, FIFO, socket, device node)
    ///
    /// Special entries are never copied. They are removed like files.
    pub is_special: bool,
}

impl TreeEntry {
    /// Create a new file entry
    pub fn file(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            kind: EntryKind::File,
            size,
            is_symlink: false,
            is_special: false,
        }
    }

    /// Create a new directory entry
    pub fn directory(path: PathBuf) -> Self {
        Self {
            path,
            kind: EntryKind::Directory,
            size: 0,
            is_symlink: false,
            is_special: false,
        }
    }

    /// Create an entry for something that can be removed but not mirrored
    pub fn special(path: PathBuf) -> Self {
        Self {
            path,
            kind: EntryKind::File,
            size: 0,
            is_symlink: false,
            is_special: true,
        }
    }

    /// Mark this entry as reached through a symbolic link
    pub fn via_symlink(mut self) -> Self {
        self.is_symlink = true;
        self
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}
