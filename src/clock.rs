//! Injectable delays for the control loop.
//!
//! The loop paces itself by sleeping between task calls. Routing those sleeps
//! through [`Sleeper`] lets tests run thousands of iterations instantly with
//! [`NoopSleeper`] or [`VirtualClock`].

use std::time::Duration;

/// Blocking delay between control-loop iterations.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Real wall-clock delay via `std::thread::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Returns immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSleeper;

impl Sleeper for NoopSleeper {
    fn sleep(&mut self, _duration: Duration) {}
}

/// Records requested sleeps instead of blocking.
#[derive(Clone, Debug, Default)]
pub struct VirtualClock {
    elapsed: Duration,
    sleeps: u64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time the loop asked to sleep.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of sleep calls.
    pub fn sleeps(&self) -> u64 {
        self.sleeps
    }
}

impl Sleeper for VirtualClock {
    fn sleep(&mut self, duration: Duration) {
        self.elapsed += duration;
        self.sleeps += 1;
    }
}

impl<S: Sleeper + ?Sized> Sleeper for &mut S {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Seconds as a `Duration`; negative or non-finite values become zero.
pub(crate) fn secs(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
}
