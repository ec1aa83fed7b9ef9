//! End-to-end run loop integration tests.
//!
//! The loop is driven by scripted `Wait` implementations so cycles run back to
//! back, and log output is captured through `Logger::with_writer`.

use mirrorsync::commands::sync::run;
use mirrorsync::scheduler::{CancelToken, Wait};
use mirrorsync::{Config, ErrorPolicy, Logger};
use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::level_filters::LevelFilter;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("lock capture").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn messages(&self) -> Vec<String> {
        let bytes = self.0.lock().expect("lock capture").clone();
        String::from_utf8(bytes)
            .expect("utf8 log output")
            .lines()
            .map(|line| {
                line.splitn(3, " - ")
                    .skip(1)
                    .collect::<Vec<_>>()
                    .join(" - ")
            })
            .collect()
    }
}

fn capture_logger() -> (Logger, Capture) {
    let capture = Capture::default();
    let writer = capture.clone();
    (
        Logger::with_writer(move || writer.clone(), LevelFilter::INFO),
        capture,
    )
}

/// Allows a fixed number of waits, running `between` before each one returns
struct ScriptedWait<'a> {
    allowed: usize,
    calls: Cell<usize>,
    intervals: RefCell<Vec<Duration>>,
    between: Box<dyn Fn(usize) + 'a>,
}

impl<'a> ScriptedWait<'a> {
    fn new(allowed: usize) -> Self {
        Self::with_hook(allowed, |_| {})
    }

    fn with_hook(allowed: usize, between: impl Fn(usize) + 'a) -> Self {
        Self {
            allowed,
            calls: Cell::new(0),
            intervals: RefCell::new(Vec::new()),
            between: Box::new(between),
        }
    }
}

impl Wait for ScriptedWait<'_> {
    fn wait(&self, interval: Duration) -> bool {
        let call = self.calls.get();
        self.calls.set(call + 1);
        self.intervals.borrow_mut().push(interval);
        if call >= self.allowed {
            return false;
        }
        (self.between)(call);
        true
    }
}

fn dirs() -> (TempDir, PathBuf, PathBuf) {
    let root = TempDir::new().expect("create tempdir");
    let source = root.path().join("source");
    let replica = root.path().join("replica");
    fs::create_dir(&source).expect("create source");
    (root, source, replica)
}

fn config_for(source: &Path, replica: &Path) -> Config {
    Config {
        source: source.to_path_buf(),
        replica: replica.to_path_buf(),
        interval: Duration::from_secs(1),
        ..Config::default()
    }
}

#[test]
fn test_each_cycle_logs_start_and_sleep() {
    let (_root, source, replica) = dirs();
    fs::write(source.join("a.txt"), b"hello").unwrap();

    let (logger, capture) = capture_logger();
    let wait = ScriptedWait::new(1);
    let summary = logger
        .in_scope(|| run(&config_for(&source, &replica), &wait))
        .expect("run should succeed");

    assert_eq!(summary.cycles, 2);
    assert_eq!(summary.totals.files_copied, 1);
    assert_eq!(summary.totals.files_unchanged, 1);
    assert_eq!(*wait.intervals.borrow(), vec![Duration::from_secs(1); 2]);

    let messages = capture.messages();
    let starts = messages
        .iter()
        .filter(|m| *m == "INFO - starting synchronization")
        .count();
    let sleeps = messages
        .iter()
        .filter(|m| *m == "INFO - synchronization complete. sleeping for 1 second")
        .count();
    assert_eq!(starts, 2);
    assert_eq!(sleeps, 2);
    assert_eq!(
        messages.last().map(String::as_str),
        Some("INFO - stop requested, exiting")
    );
}

#[test]
fn test_mutations_are_logged_between_start_and_complete() {
    let (_root, source, replica) = dirs();
    fs::create_dir(source.join("d")).unwrap();
    fs::write(source.join("d/b.txt"), b"world").unwrap();

    let (logger, capture) = capture_logger();
    let config = Config {
        once: true,
        ..config_for(&source, &replica)
    };
    logger.in_scope(|| run(&config, &ScriptedWait::new(0))).unwrap();

    let messages = capture.messages();
    let expected = vec![
        "INFO - starting synchronization".to_string(),
        format!("INFO - created directory: {}", replica.display()),
        format!("INFO - created directory: {}", replica.join("d").display()),
        format!(
            "INFO - copied file: {} to {}",
            source.join("d/b.txt").display(),
            replica.join("d/b.txt").display()
        ),
        "INFO - synchronization complete".to_string(),
    ];
    assert_eq!(messages, expected);
}

#[test]
fn test_once_runs_a_single_cycle_without_waiting() {
    let (_root, source, replica) = dirs();
    fs::write(source.join("a.txt"), b"a").unwrap();

    let config = Config {
        once: true,
        ..config_for(&source, &replica)
    };
    let wait = ScriptedWait::new(10);
    let summary = run(&config, &wait).unwrap();

    assert_eq!(summary.cycles, 1);
    assert_eq!(wait.calls.get(), 0);
    assert!(replica.join("a.txt").exists());
}

#[test]
fn test_source_changes_between_cycles_are_picked_up() {
    let (_root, source, replica) = dirs();
    fs::write(source.join("a.txt"), b"v1").unwrap();
    fs::write(source.join("b.txt"), b"b").unwrap();

    let src = source.clone();
    let wait = ScriptedWait::with_hook(2, move |call| match call {
        0 => fs::write(src.join("a.txt"), b"version two").unwrap(),
        1 => fs::remove_file(src.join("b.txt")).unwrap(),
        _ => {}
    });

    let summary = run(&config_for(&source, &replica), &wait).unwrap();

    assert_eq!(summary.cycles, 3);
    assert_eq!(fs::read(replica.join("a.txt")).unwrap(), b"version two");
    assert!(!replica.join("b.txt").exists());
    assert_eq!(summary.totals.files_copied, 3);
    assert_eq!(summary.totals.files_removed, 1);
}

#[test]
fn test_abort_policy_stops_on_first_failed_cycle() {
    let (_root, source, replica) = dirs();
    fs::write(&replica, b"replica is a file").unwrap();

    let (logger, capture) = capture_logger();
    let wait = ScriptedWait::new(5);
    let result = logger.in_scope(|| run(&config_for(&source, &replica), &wait));

    let err = result.expect_err("abort policy returns the cycle error");
    assert!(err.is_validation_error());
    assert_eq!(wait.calls.get(), 0);
    assert!(capture
        .messages()
        .iter()
        .any(|m| m.starts_with("ERROR - synchronization failed:")));
}

#[test]
fn test_continue_policy_keeps_looping_after_failed_cycle() {
    let (_root, source, replica) = dirs();
    fs::write(&replica, b"replica is a file").unwrap();

    let rep = replica.clone();
    let wait = ScriptedWait::with_hook(2, move |call| {
        if call == 0 {
            fs::remove_file(&rep).unwrap();
        }
    });

    let config = Config {
        error_policy: ErrorPolicy::Continue,
        ..config_for(&source, &replica)
    };
    let summary = run(&config, &wait).unwrap();

    assert_eq!(summary.failed_cycles, 1);
    assert_eq!(summary.cycles, 2);
    assert!(replica.is_dir());
}

#[test]
fn test_cancel_token_interrupts_sleep() {
    let (_root, source, replica) = dirs();
    let config = Config {
        interval: Duration::from_secs(3600),
        ..config_for(&source, &replica)
    };

    let token = CancelToken::new();
    let canceller = token.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        canceller.cancel();
    });

    let start = Instant::now();
    let summary = run(&config, &token).unwrap();
    handle.join().unwrap();

    assert_eq!(summary.cycles, 1);
    assert!(start.elapsed() < Duration::from_secs(60));
}
