//! Epsilon-greedy selection.

use std::fmt;

use rand::rngs::SmallRng;
use rand::Rng;

use super::{rng_from, ArmTable, Bandit};
use crate::error::Result;

/// Explores with a fixed probability, otherwise picks the best estimate.
#[derive(Clone, Debug)]
pub struct EpsilonGreedy<A> {
    table: ArmTable<A>,
    epsilon: f64,
    rng: SmallRng,
}

impl<A> EpsilonGreedy<A> {
    /// Default exploration probability.
    pub const DEFAULT_EPSILON: f64 = 0.1;

    /// Create an entropy-seeded bandit.
    pub fn new(arms: Vec<A>, epsilon: f64) -> Result<Self> {
        Self::with_rng(arms, epsilon, rng_from(None))
    }

    /// Create a bandit with a fixed seed (reproducible selections).
    pub fn with_seed(arms: Vec<A>, epsilon: f64, seed: u64) -> Result<Self> {
        Self::with_rng(arms, epsilon, rng_from(Some(seed)))
    }

    pub(crate) fn with_rng(arms: Vec<A>, epsilon: f64, rng: SmallRng) -> Result<Self> {
        Ok(Self {
            table: ArmTable::new(arms)?,
            epsilon,
            rng,
        })
    }

    /// Probability of choosing a uniformly random arm.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl<A: fmt::Debug> Bandit for EpsilonGreedy<A> {
    type Arm = A;

    fn table(&self) -> &ArmTable<A> {
        &self.table
    }

    fn select_arm(&mut self) -> usize {
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

impl<A: fmt::Debug> fmt::Display for EpsilonGreedy<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.table.fmt_named("EpsilonGreedy", f)
    }
}
