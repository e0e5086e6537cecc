//! Epsilon-greedy with an exponentially decaying exploration rate.

use std::fmt;

use rand::rngs::SmallRng;
use rand::Rng;

use super::{rng_from, ArmTable, Bandit};
use crate::error::Result;

/// Epsilon decays from `initial_epsilon` toward `limit_epsilon`.
///
/// The excess over the floor halves every `half_decay_steps` selections:
///
/// ```text
/// epsilon(step) = limit + (initial - limit) * 0.5^(step / half_decay_steps)
/// ```
#[derive(Clone, Debug)]
pub struct EpsilonDecreasing<A> {
    table: ArmTable<A>,
    initial_epsilon: f64,
    limit_epsilon: f64,
    half_decay_steps: u64,
    epsilon: f64,
    step: u64,
    rng: SmallRng,
}

impl<A> EpsilonDecreasing<A> {
    pub const DEFAULT_INITIAL_EPSILON: f64 = 1.0;
    pub const DEFAULT_LIMIT_EPSILON: f64 = 0.1;
    pub const DEFAULT_HALF_DECAY_STEPS: u64 = 100;

    pub fn new(
        arms: Vec<A>,
        initial_epsilon: f64,
        limit_epsilon: f64,
        half_decay_steps: u64,
    ) -> Result<Self> {
        Self::with_rng(
            arms,
            initial_epsilon,
            limit_epsilon,
            half_decay_steps,
            rng_from(None),
        )
    }

    pub fn with_seed(
        arms: Vec<A>,
        initial_epsilon: f64,
        limit_epsilon: f64,
        half_decay_steps: u64,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(
            arms,
            initial_epsilon,
            limit_epsilon,
            half_decay_steps,
            rng_from(Some(seed)),
        )
    }

    pub(crate) fn with_rng(
        arms: Vec<A>,
        initial_epsilon: f64,
        limit_epsilon: f64,
        half_decay_steps: u64,
        rng: SmallRng,
    ) -> Result<Self> {
        Ok(Self {
            table: ArmTable::new(arms)?,
            initial_epsilon,
            limit_epsilon,
            half_decay_steps,
            epsilon: initial_epsilon,
            step: 0,
            rng,
        })
    }

    /// Exploration probability used by the most recent selection.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Number of selections made so far.
    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn initial_epsilon(&self) -> f64 {
        self.initial_epsilon
    }

    pub fn limit_epsilon(&self) -> f64 {
        self.limit_epsilon
    }

    pub fn half_decay_steps(&self) -> u64 {
        self.half_decay_steps
    }

    /// Exploration probability after `step` selections.
    pub fn epsilon_at(&self, step: u64) -> f64 {
        let decay = 0.5_f64.powf(step as f64 / self.half_decay_steps as f64);
        self.limit_epsilon + (self.initial_epsilon - self.limit_epsilon) * decay
    }
}

impl<A: fmt::Debug> Bandit for EpsilonDecreasing<A> {
    type Arm = A;

    fn table(&self) -> &ArmTable<A> {
        &self.table
    }

    fn select_arm(&mut self) -> usize {
        self.step += 1;
        self.epsilon = self.epsilon_at(self.step);

        if self.rng.gen::<f64>() < self.epsilon {
            return self.table.explore(&mut self.rng);
        }
        self.table.exploit(&mut self.rng)
    }

    fn update(&mut self, arm_index: usize, reward: f64) -> Result<()> {
        self.table.record(arm_index, reward);
        Ok(())
    }
}

impl<A: fmt::Debug> fmt::Display for EpsilonDecreasing<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.table.fmt_named("EpsilonDecreasing", f)
    }
}
