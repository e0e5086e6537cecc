//! Core types for the two-state control loop.
//!
//! - `Phase`: operating vs backing off
//! - `TaskOutcome` / `Task`: what the caller's task reports and how it is called
//! - `Pending`: a reward held back while the loop backs off
//! - `LoopState`: everything the loop mutates between iterations
//! - `RunStats`: summary returned from a full run

use crate::error::{LightError, Result};

/// The two states of the control loop.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Phase {
    /// The bandit picks parameters and rewards are credited immediately.
    #[default]
    Operating,
    /// Low-load probes run until the failure fraction recovers.
    Backoff,
}

/// Success and failure counts reported by one task call.
///
/// Counts are floats so tasks may report fractional or averaged work.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct TaskOutcome {
    pub successes: f64,
    pub failures: f64,
}

impl TaskOutcome {
    pub fn new(successes: f64, failures: f64) -> Self {
        Self {
            successes,
            failures,
        }
    }

    /// `failures / (successes + failures)`.
    ///
    /// Fails with [`LightError::NoTasksReported`] when both counts are zero.
    pub fn failure_fraction(&self) -> Result<f64> {
        let total = self.successes + self.failures;
        if total == 0.0 {
            return Err(LightError::NoTasksReported);
        }
        Ok(self.failures / total)
    }
}

impl From<(f64, f64)> for TaskOutcome {
    fn from((successes, failures): (f64, f64)) -> Self {
        Self::new(successes, failures)
    }
}

impl From<(u64, u64)> for TaskOutcome {
    fn from((successes, failures): (u64, u64)) -> Self {
        Self::new(successes as f64, failures as f64)
    }
}

impl From<(u32, u32)> for TaskOutcome {
    fn from((successes, failures): (u32, u32)) -> Self {
        Self::new(f64::from(successes), f64::from(failures))
    }
}

impl From<(usize, usize)> for TaskOutcome {
    fn from((successes, failures): (usize, usize)) -> Self {
        Self::new(successes as f64, failures as f64)
    }
}

/// A blocking task driven by the control loop.
///
/// Implemented for any `FnMut(&A) -> O` where `O: Into<TaskOutcome>`, so plain
/// closures returning `(successes, failures)` tuples work directly.
pub trait Task<A> {
    fn run(&mut self, params: &A) -> TaskOutcome;
}

impl<A, F, O> Task<A> for F
where
    F: FnMut(&A) -> O,
    O: Into<TaskOutcome>,
{
    fn run(&mut self, params: &A) -> TaskOutcome {
        self(params).into()
    }
}

/// Reward held back while backing off.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Pending {
    /// Arm whose operating call tripped the failure threshold
    pub arm_index: usize,
    /// Successes of that call, credited once the loop recovers
    pub successes: f64,
}

/// Mutable state of one control-loop run.
#[derive(Clone, Debug, Default)]
pub struct LoopState {
    /// Current phase
    pub phase: Phase,
    /// Deferred reward, set while backing off
    pub pending: Option<Pending>,
    /// Seconds waited since the last reward was credited
    pub accumulated_wait: f64,
    /// Probe calls made in the current backoff
    pub backoff_steps: u64,
}

impl LoopState {
    /// Fresh state: operating, nothing pending, no wait accumulated.
    pub fn new() -> Self {
        Self::default()
    }
}

/// What happened during one iteration.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum StepEvent {
    /// An operating call stayed under the threshold and was rewarded.
    Rewarded { arm_index: usize, reward: f64 },
    /// An operating call tripped the threshold; its reward is pending.
    EnteredBackoff { arm_index: usize },
    /// A probe still failed too often.
    StillBackingOff,
    /// A probe recovered and the pending arm was rewarded.
    Recovered { arm_index: usize, reward: f64 },
    /// A probe recovered but nothing was pending.
    Resumed,
}

/// Summary of a completed run.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RunStats {
    pub operating_steps: u64,
    pub backoff_steps: u64,
    pub backoffs_entered: u64,
    pub immediate_rewards: u64,
    pub deferred_rewards: u64,
}

impl RunStats {
    pub(crate) fn record(&mut self, event: &StepEvent) {
        match event {
            StepEvent::Rewarded { .. } => {
                self.operating_steps += 1;
                self.immediate_rewards += 1;
            }
            StepEvent::EnteredBackoff { .. } => {
                self.operating_steps += 1;
                self.backoffs_entered += 1;
            }
            StepEvent::StillBackingOff => self.backoff_steps += 1,
            StepEvent::Recovered { .. } => {
                self.backoff_steps += 1;
                self.deferred_rewards += 1;
            }
            StepEvent::Resumed => self.backoff_steps += 1,
        }
    }

    /// Total iterations run.
    pub fn steps(&self) -> u64 {
        self.operating_steps + self.backoff_steps
    }
}
