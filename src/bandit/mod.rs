//! Multi-armed bandit policies.
//!
//! Every policy implements the [`Bandit`] trait on top of a shared
//! [`ArmTable`] (arms, mean-reward estimates, selection counts). Policies only
//! differ in `select_arm`, and for two of them in `update`:
//!
//! | Policy | Selection | Update |
//! |--------|-----------|--------|
//! | [`EpsilonGreedy`] | explore with probability `epsilon` | incremental mean |
//! | [`EpsilonFirst`] | explore for an initial budget, then epsilon-greedy | incremental mean |
//! | [`EpsilonDecreasing`] | epsilon decays toward a floor with a half-life | incremental mean |
//! | [`Ucb1`] | warm start, then upper confidence bound | mean, rewards must be in [0, 1] |
//! | [`GreedyWithHistory`] | fill every window, then greedy | mean of a bounded window |
//!
//! Each bandit owns its random source. Use the `with_seed` constructors for
//! reproducible selections in tests.
//!
//! # Example
//!
//! ```
//! use lightrl::bandit::{Bandit, EpsilonGreedy};
//!
//! let mut bandit = EpsilonGreedy::with_seed(vec![10, 25, 50], 0.1, 42)?;
//! let arm = bandit.select_arm();
//! bandit.update(arm, 0.5)?;
//! assert_eq!(bandit.counts()[arm], 1);
//! # Ok::<(), lightrl::LightError>(())
//! ```

mod epsilon_decreasing;
mod epsilon_first;
mod epsilon_greedy;
mod history;
mod policy;
mod table;
mod ucb1;

use std::fmt;
use std::io;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::warn;

use crate::error::Result;

pub use epsilon_decreasing::EpsilonDecreasing;
pub use epsilon_first::EpsilonFirst;
pub use epsilon_greedy::EpsilonGreedy;
pub use history::GreedyWithHistory;
pub use policy::PolicyConfig;
pub use table::ArmTable;
pub use ucb1::Ucb1;

/// Common interface for the selection policies.
///
/// The control loop is generic over this trait, and `Box<dyn Bandit<Arm = A>>`
/// also implements it so config-driven policies plug in the same way.
pub trait Bandit {
    /// Parameters associated with each arm, handed to the task unchanged.
    type Arm: fmt::Debug;

    /// Shared bookkeeping for this bandit.
    fn table(&self) -> &ArmTable<Self::Arm>;

    /// Choose the next arm. Always returns an index into [`Bandit::arms`].
    fn select_arm(&mut self) -> usize;

    /// Incorporate one observed reward for `arm_index`.
    ///
    /// Indexing past the arm list panics; policies with bounded rewards
    /// return an error instead of updating.
    fn update(&mut self, arm_index: usize, reward: f64) -> Result<()>;

    fn arms(&self) -> &[Self::Arm] {
        self.table().arms()
    }

    fn q_values(&self) -> &[f64] {
        self.table().q_values()
    }

    fn counts(&self) -> &[u64] {
        self.table().counts()
    }

    /// Write the per-arm estimates to `out`.
    fn write_report(&self, out: &mut dyn io::Write) -> io::Result<()> {
        self.table().write_report(out)
    }

    /// Print the per-arm estimates and counts to stdout.
    ///
    /// Arms are rendered with `Debug`, so string arms appear quoted
    /// (`num_tasks="a"`) while integers and tuples print as written.
    fn report(&self) {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        if let Err(e) = self.write_report(&mut lock) {
            warn!(%e, "failed to write bandit report");
        }
    }
}

impl<B: Bandit + ?Sized> Bandit for Box<B> {
    type Arm = B::Arm;

    fn table(&self) -> &ArmTable<Self::Arm> {
        (**self).table()
    }

    fn select_arm(&mut self) -> usize {
        (**self).select_arm()
    }

    fn update(&mut self, arm_index: usize, reward: f64) -> Result<()> {
        (**self).update(arm_index, reward)
    }
}

impl<B: Bandit + ?Sized> Bandit for &mut B {
    type Arm = B::Arm;

    fn table(&self) -> &ArmTable<Self::Arm> {
        (**self).table()
    }

    fn select_arm(&mut self) -> usize {
        (**self).select_arm()
    }

    fn update(&mut self, arm_index: usize, reward: f64) -> Result<()> {
        (**self).update(arm_index, reward)
    }
}

/// Seeded RNG when a seed is given, entropy-seeded otherwise.
pub(crate) fn rng_from(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}
