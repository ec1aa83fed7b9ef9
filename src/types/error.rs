//! Error types for mirrorsync

use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for mirrorsync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO error tied to a specific filesystem entry
    #[error("IO error at {path}: {source}")]
    Entry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Permission denied for specific path
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Disk full while writing a path
    #[error("Disk full while writing {path}")]
    DiskFull { path: PathBuf },

    /// Directory walk failed (missing root, unreadable directory)
    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// Same relative path is a file in one tree and a directory in the other
    #[error("Path is a file in one tree and a directory in the other: {path}")]
    PathAmbiguity { path: PathBuf },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error (logic checks)
    #[error("Validation error: {0}")]
    Validation(String),
}

impl SyncError {
    /// Map an IO error raised while touching `path` onto the matching variant.
    pub fn from_io(path: &Path, error: IoError) -> Self {
        if matches!(error.kind(), ErrorKind::PermissionDenied) {
            SyncError::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else if matches!(error.kind(), ErrorKind::StorageFull)
            || matches!(error.raw_os_error(), Some(28 | 122))
        {
            SyncError::DiskFull {
                path: path.to_path_buf(),
            }
        } else {
            SyncError::Entry {
                path: path.to_path_buf(),
                source: error,
            }
        }
    }

    /// Path the error refers to, when there is one
    pub fn path(&self) -> Option<&Path> {
        match self {
            SyncError::Entry { path, .. }
            | SyncError::PermissionDenied { path }
            | SyncError::DiskFull { path }
            | SyncError::Walk { path, .. }
            | SyncError::PathAmbiguity { path } => Some(path),
            SyncError::Io(_) | SyncError::Config(_) | SyncError::Validation(_) => None,
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, SyncError::Validation(_) | SyncError::Config(_))
    }

    /// Check if this error is related to permissions
    pub fn is_permission_error(&self) -> bool {
        matches!(self, SyncError::PermissionDenied { .. })
    }

    /// Check if this error is related to disk space
    pub fn is_disk_space_error(&self) -> bool {
        matches!(self, SyncError::DiskFull { .. })
    }
}
