//! Trailing debounce for change notifications.
//!
//! The editor runs on a single cooperative thread with no timers of its own,
//! so the debouncer is polled: mutations call [`Debouncer::schedule`] and
//! the host calls [`Debouncer::poll`] (typically once per animation frame).
//! Time comes from an injectable [`Clock`] so tests and WASM hosts can
//! supply their own.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Delay between the last mutation and the change callback.
pub const CHANGE_DEBOUNCE: Duration = Duration::from_millis(50);

/// Monotonic time since an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// `Instant`-backed clock for native hosts.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<Duration>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }

    pub fn set(&self, now: Duration) {
        self.0.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.0.get()
    }
}

/// Coalesces bursts of [`schedule`](Debouncer::schedule) calls into one
/// firing, `delay` after the last call.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Duration>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(CHANGE_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re)start the delay from `now`.
    pub fn schedule(&mut self, now: Duration) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// `true` exactly once per burst, when the delay has elapsed.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Fire now if anything is pending.
    pub fn take(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
