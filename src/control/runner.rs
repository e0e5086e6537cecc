//! The OPERATING/BACKOFF control loop.

use std::fmt;

use tracing::{debug, info, warn};

use crate::bandit::Bandit;
use crate::clock::{secs, Sleeper, ThreadSleeper};
use crate::config::LoopConfig;
use crate::error::{LightError, Result};
use crate::metrics::LoopMetrics;

use super::types::{LoopState, Pending, Phase, RunStats, StepEvent, Task};

/// Drives a task with parameters chosen by a bandit, backing off when the
/// task's failure fraction crosses the threshold.
///
/// While operating, every call is rewarded with
/// `successes / accumulated_wait * reward_factor`. A call that fails too often
/// is not rewarded immediately: its successes are held as pending and the loop
/// switches to low-load probes with `waiting_args`. When a probe recovers, the
/// pending arm is credited with all the wait time spent in between, which
/// penalizes arms that push the task into backoff.
///
/// Rewards are not checked for finiteness. With a `default_wait_time` of zero
/// an operating reward is `inf`, and it is `NaN` when nothing succeeded over
/// a zero wait. [`Ucb1`](crate::Ucb1) rejects such rewards with an error; the
/// other policies fold them into their estimates.
///
/// # Example
///
/// ```
/// use lightrl::{ControlLoop, EpsilonGreedy, LoopConfig, NoopSleeper};
///
/// let config = LoopConfig::new()
///     .with_waiting_args(1u32)
///     .with_max_steps(50)
///     .with_wait_times(0.1, 0.1);
/// let mut control = ControlLoop::with_sleeper(config, NoopSleeper);
/// let mut bandit = EpsilonGreedy::with_seed(vec![1u32, 5, 10], 0.1, 7)?;
///
/// let stats = control.run(&mut bandit, &mut |n: &u32| {
///     if *n > 5 { (0u32, *n) } else { (*n, 0u32) }
/// })?;
/// assert_eq!(stats.steps(), 50);
/// # Ok::<(), lightrl::LightError>(())
/// ```
pub struct ControlLoop<A, S = ThreadSleeper> {
    config: LoopConfig<A>,
    sleeper: S,
    metrics: LoopMetrics,
}

impl<A> ControlLoop<A, ThreadSleeper> {
    /// Create a loop that sleeps on the current thread between calls.
    pub fn new(config: LoopConfig<A>) -> Self {
        Self::with_sleeper(config, ThreadSleeper)
    }
}

impl<A, S: Sleeper> ControlLoop<A, S> {
    /// Create a loop with a custom delay source.
    pub fn with_sleeper(config: LoopConfig<A>, sleeper: S) -> Self {
        Self::from_parts(config, sleeper, LoopMetrics::new())
    }

    pub(crate) fn from_parts(config: LoopConfig<A>, sleeper: S, metrics: LoopMetrics) -> Self {
        Self {
            config,
            sleeper,
            metrics,
        }
    }

    pub fn config(&self) -> &LoopConfig<A> {
        &self.config
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn sleeper_mut(&mut self) -> &mut S {
        &mut self.sleeper
    }

    /// Metrics updated by every iteration.
    pub fn metrics(&self) -> &LoopMetrics {
        &self.metrics
    }

    /// Build a bandit from the configured policy and seed.
    pub fn build_bandit(&self, arms: Vec<A>) -> Result<Box<dyn Bandit<Arm = A>>>
    where
        A: fmt::Debug + 'static,
    {
        self.config.policy.build(arms, self.config.seed)
    }

    /// Run `max_steps` iterations, mutating `bandit` in place.
    ///
    /// # Errors
    ///
    /// - [`LightError::MissingWaitingArgs`] before the first iteration if no
    ///   probe parameters are configured
    /// - [`LightError::NoTasksReported`] if the task reports no work
    /// - any error returned by the bandit's `update`
    pub fn run<B, T>(&mut self, bandit: &mut B, task: &mut T) -> Result<RunStats>
    where
        A: fmt::Debug,
        B: Bandit<Arm = A> + ?Sized,
        T: Task<A> + ?Sized,
    {
        if self.config.waiting_args.is_none() {
            return Err(LightError::MissingWaitingArgs);
        }

        info!(
            arms = ?bandit.arms(),
            max_steps = self.config.max_steps,
            failure_threshold = self.config.failure_threshold,
            default_wait_time = self.config.default_wait_time,
            extra_wait_time = self.config.extra_wait_time,
            "starting control loop"
        );

        let mut state = LoopState::new();
        let mut stats = RunStats::default();

        for iteration in 0..self.config.max_steps {
            if self.config.verbose {
                bandit.report();
            }
            debug!(iteration, phase = ?state.phase, "control loop iteration");
            let event = self.step(&mut state, bandit, task)?;
            stats.record(&event);
        }

        if self.config.verbose {
            bandit.report();
        }

        info!(
            operating_steps = stats.operating_steps,
            backoff_steps = stats.backoff_steps,
            backoffs_entered = stats.backoffs_entered,
            immediate_rewards = stats.immediate_rewards,
            deferred_rewards = stats.deferred_rewards,
            ended_in = ?state.phase,
            "control loop finished"
        );

        Ok(stats)
    }

    /// Run a single iteration against an explicit state.
    ///
    /// # Errors
    ///
    /// Same as [`ControlLoop::run`], except that missing `waiting_args` is
    /// only reported when a backoff probe actually needs them.
    pub fn step<B, T>(
        &mut self,
        state: &mut LoopState,
        bandit: &mut B,
        task: &mut T,
    ) -> Result<StepEvent>
    where
        A: fmt::Debug,
        B: Bandit<Arm = A> + ?Sized,
        T: Task<A> + ?Sized,
    {
        match state.phase {
            Phase::Operating => self.operate(state, bandit, task),
            Phase::Backoff => self.probe(state, bandit, task),
        }
    }

    fn operate<B, T>(
        &mut self,
        state: &mut LoopState,
        bandit: &mut B,
        task: &mut T,
    ) -> Result<StepEvent>
    where
        A: fmt::Debug,
        B: Bandit<Arm = A> + ?Sized,
        T: Task<A> + ?Sized,
    {
        let arm_index = bandit.select_arm();
        let outcome = task.run(&bandit.arms()[arm_index]);
        let failure_fraction = outcome.failure_fraction()?;
        self.metrics
            .record_step(Phase::Operating, outcome.successes, outcome.failures);

        let wait_time = self.config.default_wait_time;
        self.wait(state, wait_time);

        debug!(
            arm_index,
            arm = ?bandit.arms()[arm_index],
            successes = outcome.successes,
            failures = outcome.failures,
            failure_fraction,
            "operating call finished"
        );

        if failure_fraction >= self.config.failure_threshold {
            state.pending = Some(Pending {
                arm_index,
                successes: outcome.successes,
            });
            state.phase = Phase::Backoff;
            state.backoff_steps = 0;
            self.metrics.set_phase(Phase::Backoff);
            info!(
                arm_index,
                failure_fraction,
                threshold = self.config.failure_threshold,
                "failure threshold reached, backing off"
            );
            return Ok(StepEvent::EnteredBackoff { arm_index });
        }

        let reward = self.credit(state, bandit, arm_index, outcome.successes)?;
        self.metrics.record_reward(reward, false);
        Ok(StepEvent::Rewarded { arm_index, reward })
    }

    fn probe<B, T>(
        &mut self,
        state: &mut LoopState,
        bandit: &mut B,
        task: &mut T,
    ) -> Result<StepEvent>
    where
        A: fmt::Debug,
        B: Bandit<Arm = A> + ?Sized,
        T: Task<A> + ?Sized,
    {
        let waiting_args = self
            .config
            .waiting_args
            .as_ref()
            .ok_or(LightError::MissingWaitingArgs)?;
        let outcome = task.run(waiting_args);
        let failure_fraction = outcome.failure_fraction()?;
        self.metrics
            .record_step(Phase::Backoff, outcome.successes, outcome.failures);
        state.backoff_steps += 1;

        let wait_time = self.config.backoff_wait_time();
        self.wait(state, wait_time);

        debug!(
            backoff_steps = state.backoff_steps,
            successes = outcome.successes,
            failures = outcome.failures,
            failure_fraction,
            "backoff probe finished"
        );

        if failure_fraction >= self.config.failure_threshold {
            return Ok(StepEvent::StillBackingOff);
        }

        state.phase = Phase::Operating;
        self.metrics.set_phase(Phase::Operating);

        let Some(pending) = state.pending.take() else {
            warn!(
                backoff_steps = state.backoff_steps,
                "recovered from backoff with no pending reward"
            );
            return Ok(StepEvent::Resumed);
        };

        let reward = self.credit(state, bandit, pending.arm_index, pending.successes)?;
        self.metrics.record_reward(reward, true);
        info!(
            arm_index = pending.arm_index,
            backoff_steps = state.backoff_steps,
            reward,
            "recovered from backoff"
        );
        Ok(StepEvent::Recovered {
            arm_index: pending.arm_index,
            reward,
        })
    }

    fn wait(&mut self, state: &mut LoopState, seconds: f64) {
        self.sleeper.sleep(secs(seconds));
        state.accumulated_wait += seconds;
        self.metrics.set_accumulated_wait(state.accumulated_wait);
    }

    /// Reward `arm_index` for `successes` over the accumulated wait, then
    /// start a new wait window.
    fn credit<B>(
        &mut self,
        state: &mut LoopState,
        bandit: &mut B,
        arm_index: usize,
        successes: f64,
    ) -> Result<f64>
    where
        B: Bandit<Arm = A> + ?Sized,
    {
        // Not clamped: a short accumulated wait produces a large reward.
        let reward = successes / state.accumulated_wait * self.config.reward_factor;
        bandit.update(arm_index, reward)?;
        state.accumulated_wait = 0.0;
        self.metrics.set_accumulated_wait(0.0);
        Ok(reward)
    }
}

impl<A: fmt::Debug, S: fmt::Debug> fmt::Debug for ControlLoop<A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlLoop")
            .field("config", &self.config)
            .field("sleeper", &self.sleeper)
            .field("metrics", &self.metrics)
            .finish()
    }
}
