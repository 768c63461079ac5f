//! Debouncing with an injectable clock.
//!
//! A [`Debouncer`] holds at most one pending value. Scheduling a new value
//! cancels the previous one and restarts the delay; the host calls
//! [`Debouncer::poll`] from its event loop to collect a value once due.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Time source for debouncing.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }
}

/// Shared cancellation flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

struct Pending<T> {
    value: T,
    due: Instant,
    token: CancellationToken,
}

/// Trailing-edge debouncer.
pub struct Debouncer<T> {
    delay: Duration,
    clock: Rc<dyn Clock>,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration, clock: Rc<dyn Clock>) -> Self {
        Self {
            delay,
            clock,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending value and restart the delay.
    ///
    /// The returned token cancels this schedule; a later `schedule` or
    /// `cancel` also cancels it.
    pub fn schedule(&mut self, value: T) -> CancellationToken {
        if let Some(previous) = self.pending.take() {
            previous.token.cancel();
        }
        let token = CancellationToken::new();
        self.pending = Some(Pending {
            value,
            due: self.clock.now() + self.delay,
            token: token.clone(),
        });
        token
    }

    /// Take the pending value if its delay has elapsed and it was not cancelled.
    pub fn poll(&mut self) -> Option<T> {
        let pending = self.pending.as_ref()?;
        if pending.token.is_cancelled() {
            self.pending = None;
            return None;
        }
        if self.clock.now() < pending.due {
            return None;
        }
        self.pending.take().map(|pending| pending.value)
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.token.is_cancelled())
    }
}

impl<T> fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}
