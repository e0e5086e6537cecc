//! UCB1 upper-confidence-bound selection.

use std::fmt;

use super::{ArmTable, Bandit};
use crate::error::{LightError, Result};

/// Deterministic UCB1 policy.
///
/// Every arm is tried once (in order) before scoring. After that the arm
/// maximising
///
/// ```text
/// ucb_i = q_i + sqrt(2 * ln(total_count) / count_i)
/// ```
///
/// is chosen, first maximum winning. The bound assumes rewards in `[0, 1]`,
/// so [`Bandit::update`] rejects anything outside that range.
#[derive(Clone, Debug)]
pub struct Ucb1<A> {
    table: ArmTable<A>,
    total_count: u64,
}

impl<A> Ucb1<A> {
    pub fn new(arms: Vec<A>) -> Result<Self> {
        Ok(Self {
            table: ArmTable::new(arms)?,
            total_count: 0,
        })
    }

    /// Sum of all per-arm counts.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Upper confidence bound of every arm.
    ///
    /// Only meaningful once every arm has a non-zero count.
    pub fn upper_bounds(&self) -> Vec<f64> {
        let ln_total = (self.total_count as f64).ln();
        self.table
            .q_values()
            .iter()
            .zip(self.table.counts())
            .map(|(&q, &n)| q + (2.0 * ln_total / n as f64).sqrt())
            .collect()
    }
}

impl<A: fmt::Debug> Bandit for Ucb1<A> {
    type Arm = A;

    fn table(&self) -> &ArmTable<A> {
        &self.table
    }

    fn select_arm(&mut self) -> usize {
        if let Some(untried) = self.table.counts().iter().position(|&n| n == 0) {
            return untried;
        }

        let mut best = 0;
        let mut best_ucb = f64::NEG_INFINITY;
        for (i, ucb) in self.upper_bounds().into_iter().enumerate() {
            if ucb > best_ucb {
                best = i;
                best_ucb = ucb;
            }
        }
        best
    }

    fn update(&mut self, arm_index: usize, reward: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&reward) {
            return Err(LightError::RewardOutOfRange { reward });
        }
        self.total_count += 1;
        self.table.record(arm_index, reward);
        Ok(())
    }
}

impl<A: fmt::Debug> fmt::Display for Ucb1<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.table.fmt_named("Ucb1", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warm_start_in_order() {
        let mut bandit = Ucb1::new(vec![1, 2, 3]).unwrap();
        assert_eq!(bandit.select_arm(), 0);
        // Selecting does not count as trying
        assert_eq!(bandit.select_arm(), 0);

        bandit.update(0, 1.0).unwrap();
        assert_eq!(bandit.select_arm(), 1);
        bandit.update(1, 0.0).unwrap();
        assert_eq!(bandit.select_arm(), 2);
    }

    #[test]
    fn test_warm_start_finds_later_gap() {
        let mut bandit = Ucb1::new(vec![1, 2, 3]).unwrap();
        bandit.update(0, 0.1).unwrap();
        bandit.update(2, 0.1).unwrap();
        assert_eq!(bandit.select_arm(), 1);
    }

    #[test]
    fn test_argmax_of_upper_bounds() {
        let mut bandit = Ucb1::new(vec![1, 2, 3]).unwrap();
        bandit.update(0, 0.9).unwrap();
        bandit.update(0, 0.9).unwrap();
        bandit.update(0, 0.9).unwrap();
        bandit.update(1, 0.2).unwrap();
        bandit.update(2, 0.5).unwrap();

        let bounds = bandit.upper_bounds();
        let ln_total = 5.0_f64.ln();
        assert!((bounds[0] - (0.9 + (2.0 * ln_total / 3.0).sqrt())).abs() < 1e-12);
        assert!((bounds[2] - (0.5 + (2.0 * ln_total).sqrt())).abs() < 1e-12);

        // Arm 2: 0.5 + 1.794 beats arm 0: 0.9 + 1.036 and arm 1: 0.2 + 1.794
        assert_eq!(bandit.select_arm(), 2);
    }

    #[test]
    fn test_first_max_wins_ties() {
        let mut bandit = Ucb1::new(vec![1, 2, 3]).unwrap();
        for arm in 0..3 {
            bandit.update(arm, 0.5).unwrap();
        }
        for _ in 0..10 {
            assert_eq!(bandit.select_arm(), 0);
        }
    }

    #[test]
    fn test_rejects_out_of_range_reward() {
        let mut bandit = Ucb1::new(vec![1, 2, 3]).unwrap();
        let err = bandit.update(0, 1.5).unwrap_err();
        assert!(matches!(err, LightError::RewardOutOfRange { reward } if reward == 1.5));
        assert_eq!(bandit.counts()[0], 0);
        assert_eq!(bandit.q_values()[0], 0.0);
        assert_eq!(bandit.total_count(), 0);

        assert!(bandit.update(0, -0.01).is_err());
        assert!(bandit.update(0, f64::NAN).is_err());
        assert!(bandit.update(0, f64::INFINITY).is_err());
        assert_eq!(bandit.total_count(), 0);
    }

    #[test]
    fn test_accepts_bounds_inclusive() {
        let mut bandit = Ucb1::new(vec![1, 2]).unwrap();
        bandit.update(0, 0.0).unwrap();
        bandit.update(1, 1.0).unwrap();
        assert_eq!(bandit.total_count(), 2);
        assert_eq!(bandit.counts(), &[1, 1]);
    }

    #[test]
    fn test_total_count_tracks_counts() {
        let mut bandit = Ucb1::new(vec![1, 2, 3, 4]).unwrap();
        for i in 0..40 {
            let arm = bandit.select_arm();
            bandit.update(arm, (i % 3) as f64 / 2.0).unwrap();
        }
        assert_eq!(bandit.total_count(), bandit.counts().iter().sum::<u64>());
        assert_eq!(bandit.total_count(), 40);
    }

    #[test]
    fn test_display() {
        let bandit = Ucb1::new(vec!["a", "b"]).unwrap();
        assert_eq!(bandit.to_string(), r#"Ucb1(arms=["a", "b"])"#);
    }
}
