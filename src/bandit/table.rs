//! Shared per-arm bookkeeping used by every selection policy.
//!
//! An [`ArmTable`] owns the arms together with two parallel vectors:
//! - `q_values`: running mean reward per arm (starts at 0.0)
//! - `counts`: number of rewards folded into that mean (starts at 0)
//!
//! Policies differ only in how they pick an index; the estimator and the
//! greedy tie-break live here so every policy applies them identically.

use std::fmt;
use std::io;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{LightError, Result};

/// Arms plus their value estimates.
#[derive(Clone, Debug)]
pub struct ArmTable<A> {
    arms: Vec<A>,
    q_values: Vec<f64>,
    counts: Vec<u64>,
}

impl<A> ArmTable<A> {
    /// Create a table with every estimate at zero.
    ///
    /// Fails with [`LightError::NoArms`] when `arms` is empty.
    pub fn new(arms: Vec<A>) -> Result<Self> {
        if arms.is_empty() {
            return Err(LightError::NoArms);
        }
        let n = arms.len();
        Ok(Self {
            arms,
            q_values: vec![0.0; n],
            counts: vec![0; n],
        })
    }

    /// Number of arms.
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    /// Always false: construction rejects empty arm lists.
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    pub fn arms(&self) -> &[A] {
        &self.arms
    }

    pub fn q_values(&self) -> &[f64] {
        &self.q_values
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Fold one reward into the running mean of `arm_index`.
    ///
    /// `new_q = ((n - 1) * old_q + reward) / n` with `n` the post-increment count.
    pub fn record(&mut self, arm_index: usize, reward: f64) {
        self.counts[arm_index] += 1;
        let n = self.counts[arm_index] as f64;
        let old_q = self.q_values[arm_index];
        self.q_values[arm_index] = ((n - 1.0) * old_q + reward) / n;
    }

    /// Replace the estimate of one arm outright (windowed policies).
    pub(crate) fn overwrite(&mut self, arm_index: usize, count: u64, q_value: f64) {
        self.counts[arm_index] = count;
        self.q_values[arm_index] = q_value;
    }

    /// Indices of every arm sharing the maximum estimate, in order.
    pub fn best_arms(&self) -> Vec<usize> {
        let max_q = self
            .q_values
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        self.q_values
            .iter()
            .enumerate()
            .filter(|(_, &q)| q == max_q)
            .map(|(i, _)| i)
            .collect()
    }

    /// Uniformly random arm index.
    pub fn explore<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..self.arms.len())
    }

    /// Greedy choice, uniformly random among ties.
    pub fn exploit<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self.best_arms().choose(rng) {
            Some(&i) => i,
            // every estimate is NaN
            None => self.explore(rng),
        }
    }
}

impl<A: fmt::Debug> ArmTable<A> {
    /// Write the per-arm summary printed by `Bandit::report`, one
    /// `num_tasks={arm:?}` line per arm.
    pub fn write_report(&self, out: &mut dyn io::Write) -> io::Result<()> {
        writeln!(out, "Q-values per arm:")?;
        for ((arm, q), count) in self.arms.iter().zip(&self.q_values).zip(&self.counts) {
            writeln!(out, "  num_tasks={arm:?}: avg_reward={q:.5}, count={count}")?;
        }
        Ok(())
    }

    /// `Name(arms=[...])`, shared by the policies' `Display` impls.
    pub(crate) fn fmt_named(&self, name: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{name}(arms={:?})", self.arms)
    }
}
