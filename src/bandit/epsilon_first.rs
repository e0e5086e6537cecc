//! Epsilon-first selection: pure exploration budget, then epsilon-greedy.

use std::fmt;

use rand::rngs::SmallRng;
use rand::Rng;

use super::{rng_from, ArmTable, Bandit};
use crate::error::Result;

/// Explores while `step < exploration_steps`, then behaves like epsilon-greedy.
///
/// `step` only advances when the bandit exploits. A bandit that starts inside
/// its exploration budget therefore never leaves it; callers that want a
/// finite budget should use [`EpsilonDecreasing`](super::EpsilonDecreasing)
/// or start with `exploration_steps = 0`.
#[derive(Clone, Debug)]
pub struct EpsilonFirst<A> {
    table: ArmTable<A>,
    exploration_steps: u64,
    epsilon: f64,
    step: u64,
    rng: SmallRng,
}

impl<A> EpsilonFirst<A> {
    pub const DEFAULT_EXPLORATION_STEPS: u64 = 100;
    pub const DEFAULT_EPSILON: f64 = 0.1;

    pub fn new(arms: Vec<A>, exploration_steps: u64, epsilon: f64) -> Result<Self> {
        Self::with_rng(arms, exploration_steps, epsilon, rng_from(None))
    }

    pub fn with_seed(
        arms: Vec<A>,
        exploration_steps: u64,
        epsilon: f64,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(arms, exploration_steps, epsilon, rng_from(Some(seed)))
    }

    pub(crate) fn with_rng(
        arms: Vec<A>,
        exploration_steps: u64,
        epsilon: f64,
        rng: SmallRng,
    ) -> Result<Self> {
        Ok(Self {
            table: ArmTable::new(arms)?,
            exploration_steps,
            epsilon,
            step: 0,
            rng,
        })
    }

    pub fn exploration_steps(&self) -> u64 {
        self.exploration_steps
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Number of exploit selections made so far.
    pub fn step(&self) -> u64 {
        self.step
    }
}

impl<A: fmt::Debug> Bandit for EpsilonFirst<A> {
    type Arm = A;

    fn table(&self) -> &ArmTable<A> {
        &self.table
    }

    fn select_arm(&mut self) -> usize {
        // No random draw is consumed while inside the budget.
        if self.step < self.exploration_steps || self.rng.gen::<f64>() < self.epsilon {
            return self.table.explore(&mut self.rng);
        }
        let arm = self.table.exploit(&mut self.rng);
        self.step += 1;
        arm
    }

    fn update(&mut self, arm_index: usize, reward: f64) -> Result<()> {
        self.table.record(arm_index, reward);
        Ok(())
    }
}

impl<A: fmt::Debug> fmt::Display for EpsilonFirst<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.table.fmt_named("EpsilonFirst", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_does_not_advance_inside_budget() {
        let mut bandit = EpsilonFirst::with_seed(vec![1, 2, 3], 5, 0.0, 1).unwrap();
        bandit.update(2, 1.0).unwrap();
        let mut seen = [false; 3];
        for _ in 0..300 {
            seen[bandit.select_arm()] = true;
        }
        // Exploration calls never count toward the budget, so the bandit is
        // still exploring uniformly after far more calls than the budget.
        assert_eq!(bandit.step(), 0);
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn test_zero_budget_exploits_and_counts_steps() {
        let mut bandit = EpsilonFirst::with_seed(vec![1, 2, 3], 0, 0.0, 1).unwrap();
        bandit.update(1, 0.7).unwrap();
        for _ in 0..10 {
            assert_eq!(bandit.select_arm(), 1);
        }
        assert_eq!(bandit.step(), 10);
    }

    #[test]
    fn test_epsilon_exploration_does_not_advance_step() {
        let mut bandit = EpsilonFirst::with_seed(vec![1, 2], 0, 1.0, 8).unwrap();
        for _ in 0..20 {
            bandit.select_arm();
        }
        assert_eq!(bandit.step(), 0);
    }

    #[test]
    fn test_selection_in_range() {
        let mut bandit = EpsilonFirst::with_seed(vec![1, 2, 3, 4], 2, 0.3, 17).unwrap();
        for i in 0..200 {
            let arm = bandit.select_arm();
            assert!(arm < 4);
            bandit.update(arm, (i % 7) as f64).unwrap();
        }
    }

    #[test]
    fn test_defaults_and_display() {
        let bandit = EpsilonFirst::new(
            vec![5, 6],
            EpsilonFirst::<i32>::DEFAULT_EXPLORATION_STEPS,
            EpsilonFirst::<i32>::DEFAULT_EPSILON,
        )
        .unwrap();
        assert_eq!(bandit.exploration_steps(), 100);
        assert!((bandit.epsilon() - 0.1).abs() < f64::EPSILON);
        assert_eq!(bandit.to_string(), "EpsilonFirst(arms=[5, 6])");
    }
}
