//! Two-state adaptive control loop.
//!
//! The loop alternates between two phases:
//!
//! - **Operating**: the bandit picks an arm, the task runs with the arm's
//!   parameters, and the arm is rewarded for the successes it produced per
//!   second of accumulated wait.
//! - **Backoff**: entered when a call's failure fraction reaches the
//!   threshold. The task runs with the low-load `waiting_args` and a longer
//!   wait until a probe comes in under the threshold. The arm that caused the
//!   backoff is then credited with its own successes over the whole wait.
//!
//! [`ControlLoop::run`] drives a full budget of iterations.
//! [`ControlLoop::step`] runs one iteration against an explicit [`LoopState`].

mod runner;
mod types;

pub use runner::ControlLoop;
pub use types::{LoopState, Pending, Phase, RunStats, StepEvent, Task, TaskOutcome};
