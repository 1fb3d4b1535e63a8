//! Backoff schedule, blocking sleeper, and cooperative cancellation.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use crate::traits::Sleeper;

/// Pure exponential backoff: `unit × base^attempt`, no jitter, no cap.
///
/// With the defaults (base 2, unit 1 s) the delays after attempts 1, 2, 3
/// are 2 s, 4 s, 8 s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base: u32,
    pub unit: Duration,
}

impl Backoff {
    pub fn new(base: u32, unit: Duration) -> Self {
        Self { base, unit }
    }

    /// Delay to wait after the given 1-based failed attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = self.base.saturating_pow(attempt);
        self.unit.saturating_mul(factor)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: 2,
            unit: Duration::from_secs(1),
        }
    }
}

/// Process-wide cancellation flag.
///
/// Set once by the interrupt handler; read by the batch driver between items
/// and attempts, and by `ThreadSleeper` while it waits.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// The shared atomic, for registering with a signal handler.
    pub fn handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

/// A `Sleeper` that blocks the current thread, waking early on cancellation.
#[derive(Debug, Clone)]
pub struct ThreadSleeper {
    cancel: CancelFlag,
    slice: Duration,
}

impl ThreadSleeper {
    pub fn new(cancel: CancelFlag) -> Self {
        Self {
            cancel,
            slice: Duration::from_millis(100),
        }
    }
}

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while !self.cancel.is_cancelled() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(self.slice.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backoff_doubles_from_two_seconds() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(1), Duration::from_secs(2));
        assert_eq!(backoff.delay(2), Duration::from_secs(4));
        assert_eq!(backoff.delay(3), Duration::from_secs(8));
    }

    #[test]
    fn backoff_scales_with_unit() {
        let backoff = Backoff::new(3, Duration::from_millis(10));
        assert_eq!(backoff.delay(2), Duration::from_millis(90));
    }

    #[test]
    fn huge_attempt_numbers_saturate_instead_of_overflowing() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(200), Duration::from_secs(u64::from(u32::MAX)));
    }

    #[test]
    fn cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
        assert!(flag.handle().load(Ordering::SeqCst));
    }

    #[test]
    fn cancelled_sleeper_returns_immediately() {
        let flag = CancelFlag::new();
        flag.cancel();
        let sleeper = ThreadSleeper::new(flag);

        let started = Instant::now();
        sleeper.sleep(Duration::from_secs(30));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn sleeper_waits_for_short_durations() {
        let sleeper = ThreadSleeper::new(CancelFlag::new());
        let started = Instant::now();
        sleeper.sleep(Duration::from_millis(20));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
