//! Logging
//!
//! A [`Logger`] owns a `tracing` dispatcher and is built once by the binary.
//! Work that should be logged runs inside [`Logger::in_scope`]; nothing is
//! installed as a process-wide global subscriber.
//!
//! Every line has the shape `<timestamp> - <LEVEL> - <message>`, for example
//! `2024-05-01 09:30:12,042 - INFO - copied file: src/a.txt to replica/a.txt`.

use crate::types::SyncError;
use chrono::Local;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::fmt::format::{DefaultFields, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Registry};

/// Environment variable that overrides the configured level with filter directives
pub const LOG_ENV: &str = "MIRRORSYNC_LOG";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Event formatter producing `<timestamp> - <LEVEL> - <message>`
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} - {} - ",
            Local::now().format(TIMESTAMP_FORMAT),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

type LineLayer<S, W> = tracing_subscriber::fmt::Layer<S, DefaultFields, LineFormat, W>;

fn line_layer<S, W>(writer: W) -> LineLayer<S, W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .event_format(LineFormat)
}

fn level_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy()
}

/// Explicit logging context shared by the driver and the reconciler
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Log to stdout and append to `log_file`
    ///
    /// Missing parent directories of `log_file` are created.
    pub fn to_stdout_and_file(log_file: &Path, level: LevelFilter) -> Result<Self, SyncError> {
        if let Some(parent) = log_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    SyncError::Config(format!(
                        "Failed to create log directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .map_err(|e| {
                SyncError::Config(format!(
                    "Failed to open log file {}: {}",
                    log_file.display(),
                    e
                ))
            })?;

        let subscriber = Registry::default()
            .with(level_filter(level))
            .with(line_layer(std::io::stdout))
            .with(line_layer(Mutex::new(file)));

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
        })
    }

    /// Log to a single writer (used for capturing output)
    pub fn with_writer<W>(writer: W, level: LevelFilter) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let subscriber = Registry::default()
            .with(level_filter(level))
            .with(line_layer(writer));

        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Run `f` with this logger as the active dispatcher on the current thread
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}
