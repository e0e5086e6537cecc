//! Greedy selection over a bounded reward window per arm.

use std::collections::VecDeque;
use std::fmt;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use super::{rng_from, ArmTable, Bandit};
use crate::error::Result;

/// Greedy bandit that only remembers the last `history_length` rewards per arm.
///
/// Until every arm has a full window, selection is uniform among the arms
/// whose windows are still short. Afterwards the arm with the best windowed
/// mean wins, ties broken at random. Because old rewards fall out of the
/// window, estimates follow drifting reward distributions.
///
/// `counts()` reports the window length, not the number of updates.
#[derive(Clone, Debug)]
pub struct GreedyWithHistory<A> {
    table: ArmTable<A>,
    history_length: usize,
    history: Vec<VecDeque<f64>>,
    rng: SmallRng,
}

impl<A> GreedyWithHistory<A> {
    pub const DEFAULT_HISTORY_LENGTH: usize = 100;

    /// A `history_length` of zero is treated as one.
    pub fn new(arms: Vec<A>, history_length: usize) -> Result<Self> {
        Self::with_rng(arms, history_length, rng_from(None))
    }

    pub fn with_seed(arms: Vec<A>, history_length: usize, seed: u64) -> Result<Self> {
        Self::with_rng(arms, history_length, rng_from(Some(seed)))
    }

    pub(crate) fn with_rng(arms: Vec<A>, history_length: usize, rng: SmallRng) -> Result<Self> {
        let table = ArmTable::new(arms)?;
        let history_length = history_length.max(1);
        // Windows grow on demand, never preallocated to history_length
        let history = (0..table.len()).map(|_| VecDeque::new()).collect();
        Ok(Self {
            table,
            history_length,
            history,
            rng,
        })
    }

    pub fn history_length(&self) -> usize {
        self.history_length
    }

    /// Retained rewards for one arm, oldest first.
    pub fn history(&self, arm_index: usize) -> &VecDeque<f64> {
        &self.history[arm_index]
    }

    fn underfilled(&self) -> Vec<usize> {
        self.history
            .iter()
            .enumerate()
            .filter(|(_, window)| window.len() < self.history_length)
            .map(|(i, _)| i)
            .collect()
    }
}

impl<A: fmt::Debug> Bandit for GreedyWithHistory<A> {
    type Arm = A;

    fn table(&self) -> &ArmTable<A> {
        &self.table
    }

    fn select_arm(&mut self) -> usize {
        let underfilled = self.underfilled();
        if let Some(&arm) = underfilled.choose(&mut self.rng) {
            return arm;
        }
        self.table.exploit(&mut self.rng)
    }

    fn update(&mut self, arm_index: usize, reward: f64) -> Result<()> {
        let window = &mut self.history[arm_index];
        if window.len() >= self.history_length {
            window.pop_front();
        }
        window.push_back(reward);

        let count = window.len();
        let mean = window.iter().sum::<f64>() / count as f64;
        self.table.overwrite(arm_index, count as u64, mean);
        Ok(())
    }
}

impl<A: fmt::Debug> fmt::Display for GreedyWithHistory<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.table.fmt_named("GreedyWithHistory", f)
    }
}
