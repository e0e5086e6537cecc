//! Serializable policy selection.
//!
//! [`PolicyConfig`] names one of the five policies together with its
//! parameters, so the bandit can be chosen from a config file:
//!
//! ```toml
//! [policy]
//! kind = "epsilon_decreasing"
//! initial_epsilon = 1.0
//! limit_epsilon = 0.1
//! half_decay_steps = 100
//! ```
//!
//! Omitted parameters fall back to the policy's defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    rng_from, Bandit, EpsilonDecreasing, EpsilonFirst, EpsilonGreedy, GreedyWithHistory, Ucb1,
};
use crate::error::Result;

/// Which selection policy to build, and how.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    /// Default: 0.1
    EpsilonGreedy {
        #[serde(default = "default_epsilon")]
        epsilon: f64,
    },
    /// Defaults: 100 exploration steps, epsilon 0.1
    EpsilonFirst {
        #[serde(default = "default_exploration_steps")]
        exploration_steps: u64,
        #[serde(default = "default_epsilon")]
        epsilon: f64,
    },
    /// Defaults: 1.0 decaying to 0.1 with a half-life of 100 selections
    EpsilonDecreasing {
        #[serde(default = "default_initial_epsilon")]
        initial_epsilon: f64,
        #[serde(default = "default_limit_epsilon")]
        limit_epsilon: f64,
        #[serde(default = "default_half_decay_steps")]
        half_decay_steps: u64,
    },
    Ucb1,
    /// Default: 100 rewards per arm
    GreedyWithHistory {
        #[serde(default = "default_history_length")]
        history_length: usize,
    },
}

fn default_epsilon() -> f64 {
    EpsilonGreedy::<()>::DEFAULT_EPSILON
}

fn default_exploration_steps() -> u64 {
    EpsilonFirst::<()>::DEFAULT_EXPLORATION_STEPS
}

fn default_initial_epsilon() -> f64 {
    EpsilonDecreasing::<()>::DEFAULT_INITIAL_EPSILON
}

fn default_limit_epsilon() -> f64 {
    EpsilonDecreasing::<()>::DEFAULT_LIMIT_EPSILON
}

fn default_half_decay_steps() -> u64 {
    EpsilonDecreasing::<()>::DEFAULT_HALF_DECAY_STEPS
}

fn default_history_length() -> usize {
    GreedyWithHistory::<()>::DEFAULT_HISTORY_LENGTH
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::epsilon_greedy()
    }
}

impl PolicyConfig {
    pub fn epsilon_greedy() -> Self {
        Self::EpsilonGreedy {
            epsilon: default_epsilon(),
        }
    }

    pub fn epsilon_first() -> Self {
        Self::EpsilonFirst {
            exploration_steps: default_exploration_steps(),
            epsilon: default_epsilon(),
        }
    }

    pub fn epsilon_decreasing() -> Self {
        Self::EpsilonDecreasing {
            initial_epsilon: default_initial_epsilon(),
            limit_epsilon: default_limit_epsilon(),
            half_decay_steps: default_half_decay_steps(),
        }
    }

    pub fn ucb1() -> Self {
        Self::Ucb1
    }

    pub fn greedy_with_history() -> Self {
        Self::GreedyWithHistory {
            history_length: default_history_length(),
        }
    }

    /// Short policy name, matching the serialized `kind`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::EpsilonGreedy { .. } => "epsilon_greedy",
            Self::EpsilonFirst { .. } => "epsilon_first",
            Self::EpsilonDecreasing { .. } => "epsilon_decreasing",
            Self::Ucb1 => "ucb1",
            Self::GreedyWithHistory { .. } => "greedy_with_history",
        }
    }

    /// Build the configured policy over `arms`.
    ///
    /// With a `seed` the bandit's selections are reproducible; without one it
    /// is seeded from entropy. UCB1 is deterministic and ignores the seed.
    pub fn build<A>(&self, arms: Vec<A>, seed: Option<u64>) -> Result<Box<dyn Bandit<Arm = A>>>
    where
        A: fmt::Debug + 'static,
    {
        let rng = rng_from(seed);
        let bandit: Box<dyn Bandit<Arm = A>> = match *self {
            Self::EpsilonGreedy { epsilon } => {
                Box::new(EpsilonGreedy::with_rng(arms, epsilon, rng)?)
            }
            Self::EpsilonFirst {
                exploration_steps,
                epsilon,
            } => Box::new(EpsilonFirst::with_rng(arms, exploration_steps, epsilon, rng)?),
            Self::EpsilonDecreasing {
                initial_epsilon,
                limit_epsilon,
                half_decay_steps,
            } => Box::new(EpsilonDecreasing::with_rng(
                arms,
                initial_epsilon,
                limit_epsilon,
                half_decay_steps,
                rng,
            )?),
            Self::Ucb1 => Box::new(Ucb1::new(arms)?),
            Self::GreedyWithHistory { history_length } => {
                Box::new(GreedyWithHistory::with_rng(arms, history_length, rng)?)
            }
        };
        Ok(bandit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LightError;

    #[test]
    fn test_default_is_epsilon_greedy() {
        assert_eq!(
            PolicyConfig::default(),
            PolicyConfig::EpsilonGreedy { epsilon: 0.1 }
        );
    }

    #[test]
    fn test_named_defaults() {
        assert_eq!(
            PolicyConfig::epsilon_first(),
            PolicyConfig::EpsilonFirst {
                exploration_steps: 100,
                epsilon: 0.1
            }
        );
        assert_eq!(
            PolicyConfig::epsilon_decreasing(),
            PolicyConfig::EpsilonDecreasing {
                initial_epsilon: 1.0,
                limit_epsilon: 0.1,
                half_decay_steps: 100
            }
        );
        assert_eq!(
            PolicyConfig::greedy_with_history(),
            PolicyConfig::GreedyWithHistory {
                history_length: 100
            }
        );
    }

    #[test]
    fn test_build_every_policy() {
        let configs = [
            PolicyConfig::epsilon_greedy(),
            PolicyConfig::epsilon_first(),
            PolicyConfig::epsilon_decreasing(),
            PolicyConfig::ucb1(),
            PolicyConfig::greedy_with_history(),
        ];
        for config in configs {
            let mut bandit = config.build(vec![10u32, 20, 30], Some(1)).unwrap();
            let arm = bandit.select_arm();
            assert!(arm < 3, "{}: arm {arm}", config.name());
            bandit.update(arm, 0.5).unwrap();
            assert_eq!(bandit.counts()[arm], 1, "{}", config.name());
        }
    }

    #[test]
    fn test_build_ucb1_validates_rewards() {
        let mut bandit = PolicyConfig::ucb1().build(vec![1u32, 2], None).unwrap();
        assert!(matches!(
            bandit.update(0, 2.0),
            Err(LightError::RewardOutOfRange { .. })
        ));
    }

    #[test]
    fn test_build_rejects_empty_arms() {
        let result = PolicyConfig::default().build(Vec::<u32>::new(), None);
        assert!(matches!(result, Err(LightError::NoArms)));
    }

    #[test]
    fn test_seeded_builds_agree() {
        let config = PolicyConfig::EpsilonGreedy { epsilon: 0.5 };
        let mut a = config.build(vec![1u32, 2, 3, 4], Some(5)).unwrap();
        let mut b = config.build(vec![1u32, 2, 3, 4], Some(5)).unwrap();
        for _ in 0..30 {
            assert_eq!(a.select_arm(), b.select_arm());
        }
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: PolicyConfig = toml::from_str(r#"kind = "epsilon_decreasing""#).unwrap();
        assert_eq!(config, PolicyConfig::epsilon_decreasing());

        let config: PolicyConfig =
            toml::from_str("kind = \"greedy_with_history\"\nhistory_length = 8").unwrap();
        assert_eq!(config, PolicyConfig::GreedyWithHistory { history_length: 8 });

        let config: PolicyConfig = serde_json::from_str(r#"{"kind":"ucb1"}"#).unwrap();
        assert_eq!(config, PolicyConfig::Ucb1);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = PolicyConfig::EpsilonFirst {
            exploration_steps: 7,
            epsilon: 0.25,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""kind":"epsilon_first""#));
        let parsed: PolicyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
