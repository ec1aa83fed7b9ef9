//! Configuration management

use crate::types::{ErrorPolicy, MismatchPolicy, SyncError};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(
    name = "mirrorsync",
    version,
    about = "Periodically mirror a source directory onto a replica directory"
)]
pub struct Cli {
    /// Source directory (read only)
    pub source: PathBuf,

    /// Replica directory (created if missing)
    pub replica: PathBuf,

    /// Seconds to wait between synchronization cycles
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// File that receives log lines (appended to)
    pub log_file: PathBuf,

    /// Gitignore-style pattern to leave out of both trees (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Log per-entry failures and continue instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    /// Handling of paths that are a file on one side and a directory on the other
    #[arg(long, value_enum, default_value_t = MismatchPolicy::Replace)]
    pub on_kind_mismatch: MismatchPolicy,

    /// Minimum level written to stdout and the log file
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,

    /// Run a single synchronization cycle and exit
    #[arg(long)]
    pub once: bool,
}

/// Runtime configuration for mirrorsync
#[derive(Debug, Clone)]
pub struct Config {
    /// Source directory
    pub source: PathBuf,

    /// Replica directory
    pub replica: PathBuf,

    /// Wait between cycles
    pub interval: Duration,

    pub log_file: PathBuf,

    /// Exclude patterns (globs)
    pub exclude_patterns: Vec<String>,

    pub error_policy: ErrorPolicy,

    pub mismatch_policy: MismatchPolicy,

    pub log_level: LevelFilter,

    /// Stop after one cycle
    pub once: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            replica: PathBuf::new(),
            interval: Duration::from_secs(60),
            log_file: PathBuf::from("mirrorsync.log"),
            exclude_patterns: Vec::new(),
            error_policy: ErrorPolicy::Abort,
            mismatch_policy: MismatchPolicy::Replace,
            log_level: LevelFilter::INFO,
            once: false,
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = SyncError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let config = Config {
            source: cli.source,
            replica: cli.replica,
            interval: Duration::from_secs(cli.interval),
            log_file: cli.log_file,
            exclude_patterns: cli.exclude,
            error_policy: if cli.keep_going {
                ErrorPolicy::Continue
            } else {
                ErrorPolicy::Abort
            },
            mismatch_policy: cli.on_kind_mismatch,
            log_level: cli.log_level,
            once: cli.once,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), SyncError> {
        if !self.source.is_dir() {
            return Err(SyncError::Config(format!(
                "Source path does not exist or is not a directory: {:?}",
                self.source
            )));
        }

        if self.interval.is_zero() {
            return Err(SyncError::Config(
                "Interval must be at least one second".to_string(),
            ));
        }

        let source = self
            .source
            .canonicalize()
            .map_err(|e| SyncError::from_io(&self.source, e))?;
        let replica = resolve_path(&self.replica);

        if source == replica {
            return Err(SyncError::Config(
                "Source and replica cannot be the same".to_string(),
            ));
        }

        if replica.starts_with(&source) {
            return Err(SyncError::Config(format!(
                "Replica {:?} is inside source {:?}",
                self.replica, self.source
            )));
        }

        if source.starts_with(&replica) {
            return Err(SyncError::Config(format!(
                "Source {:?} is inside replica {:?}",
                self.source, self.replica
            )));
        }

        if self.replica.exists() && !self.replica.is_dir() {
            return Err(SyncError::Config(format!(
                "Replica path exists but is not a directory: {:?}",
                self.replica
            )));
        }

        Ok(())
    }
}

/// Canonical form of a path that may not exist yet
///
/// Canonicalizes the deepest existing ancestor and re-appends the rest.
fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    let mut missing = Vec::new();
    let mut current = path;
    while let Some(parent) = current.parent() {
        if let Some(name) = current.file_name() {
            missing.push(name.to_os_string());
        }
        if let Ok(mut resolved) = parent.canonicalize() {
            resolved.extend(missing.iter().rev());
            return resolved;
        }
        current = parent;
    }

    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
