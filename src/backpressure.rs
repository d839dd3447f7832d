//! Pacing helpers for the blocking I/O loops.
//!
//! Two small pieces keep the chunk loops honest:
//!
//! - [`IdlePacer`] sleeps briefly after a zero-progress write instead of
//!   busy-spinning while the peer drains its buffer.
//! - [`Deadline`] is the wall-clock budget for a whole multi-chunk
//!   operation, checked before every chunk. It backs up the socket-level
//!   read/write timeout: whichever fires first aborts the operation.

use std::thread;
use std::time::{Duration, Instant};

/// Default pause after a zero-progress write.
pub const DEFAULT_IDLE_SLEEP: Duration = Duration::from_micros(2_000);

/// Sleeps for a fixed interval when a write makes no progress.
#[derive(Debug, Clone, Copy)]
pub struct IdlePacer {
    interval: Duration,
}

impl IdlePacer {
    /// Create a pacer with the given sleep interval.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Pause the current thread for one interval.
    pub fn pause(&self) {
        thread::sleep(self.interval);
    }
}

impl Default for IdlePacer {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_SLEEP)
    }
}

/// Wall-clock deadline for a multi-chunk operation.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// Deadline expiring `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(timeout),
        }
    }

    /// A deadline that never expires.
    pub fn unbounded() -> Self {
        Self { at: None }
    }

    /// Whether the deadline has passed.
    pub fn expired(&self) -> bool {
        match self.at {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }
}
