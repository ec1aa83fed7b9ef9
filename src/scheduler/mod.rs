//! Waiting between reconciliation cycles
//!
//! The driver loop only ever blocks inside [`Wait::wait`], so replacing the
//! implementation is enough to drive cycles from a test or to stop the loop
//! from another thread.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Blocks between cycles
pub trait Wait {
    /// Wait up to `interval`
    ///
    /// Returns `false` if the loop should stop instead of running another cycle.
    fn wait(&self, interval: Duration) -> bool;
}

/// Cancellation flag that doubles as an interruptible sleep
///
/// Clones share the same flag; calling [`CancelToken::cancel`] on any clone
/// wakes a thread blocked in [`Wait::wait`] immediately.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake any waiter
    pub fn cancel(&self) {
        let (flag, signal) = &*self.inner;
        if let Ok(mut cancelled) = flag.lock() {
            *cancelled = true;
        }
        signal.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (flag, _) = &*self.inner;
        flag.lock().map(|cancelled| *cancelled).unwrap_or(true)
    }
}

impl Wait for CancelToken {
    fn wait(&self, interval: Duration) -> bool {
        let (flag, signal) = &*self.inner;
        let guard = match flag.lock() {
            Ok(guard) => guard,
            Err(_) => return false,
        };

        // wait_timeout_while absorbs spurious wakeups
        match signal.wait_timeout_while(guard, interval, |cancelled| !*cancelled) {
            Ok((cancelled, _)) => !*cancelled,
            Err(_) => false,
        }
    }
}
