//! Configuration types for the control loop.

use serde::{Deserialize, Serialize};

use crate::bandit::PolicyConfig;

/// Configuration for the two-state control loop.
///
/// `A` is the arm parameter type; `waiting_args` uses the same type because
/// backoff probes call the same task the bandit's arms are fed to.
///
/// This struct can be deserialized from TOML, YAML, JSON, or environment
/// variables using figment (see [`LoopBuilder`](crate::LoopBuilder)).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoopConfig<A> {
    /// Failure fraction at or above which the loop backs off (default: 0.1)
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: f64,

    /// Seconds to wait after every task call (default: 5.0)
    #[serde(default = "default_wait_time")]
    pub default_wait_time: f64,

    /// Additional seconds to wait after each backoff probe (default: 10.0)
    #[serde(default = "default_extra_wait_time")]
    pub extra_wait_time: f64,

    /// Low-load task parameters used while backing off. Required to run.
    pub waiting_args: Option<A>,

    /// Number of loop iterations (default: 500)
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,

    /// Print the bandit report every iteration (default: false)
    #[serde(default)]
    pub verbose: bool,

    /// Scale applied to `successes / accumulated_wait` (default: 1e-6)
    #[serde(default = "default_reward_factor")]
    pub reward_factor: f64,

    /// Seed for config-built bandits. None seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Policy for config-built bandits (default: epsilon-greedy, 0.1)
    #[serde(default)]
    pub policy: PolicyConfig,
}

fn default_failure_threshold() -> f64 {
    0.1
}

fn default_wait_time() -> f64 {
    5.0
}

fn default_extra_wait_time() -> f64 {
    10.0
}

fn default_max_steps() -> u64 {
    500
}

fn default_reward_factor() -> f64 {
    1e-6
}

impl<A> Default for LoopConfig<A> {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            default_wait_time: default_wait_time(),
            extra_wait_time: default_extra_wait_time(),
            waiting_args: None,
            max_steps: default_max_steps(),
            verbose: false,
            reward_factor: default_reward_factor(),
            seed: None,
            policy: PolicyConfig::default(),
        }
    }
}

impl<A> LoopConfig<A> {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds waited after a backoff probe.
    pub fn backoff_wait_time(&self) -> f64 {
        self.default_wait_time + self.extra_wait_time
    }

    /// Builder method to set the backoff probe parameters.
    pub fn with_waiting_args(mut self, waiting_args: A) -> Self {
        self.waiting_args = Some(waiting_args);
        self
    }

    /// Builder method to set the failure threshold.
    pub fn with_failure_threshold(mut self, failure_threshold: f64) -> Self {
        self.failure_threshold = failure_threshold;
        self
    }

    /// Builder method to set both wait times (seconds).
    pub fn with_wait_times(mut self, default_wait_time: f64, extra_wait_time: f64) -> Self {
        self.default_wait_time = default_wait_time;
        self.extra_wait_time = extra_wait_time;
        self
    }

    /// Builder method to set the iteration budget.
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Builder method to enable per-iteration reports.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Builder method to set the reward scale.
    pub fn with_reward_factor(mut self, reward_factor: f64) -> Self {
        self.reward_factor = reward_factor;
        self
    }

    /// Builder method to set the bandit seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method to set the bandit policy.
    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoopConfig::<u32>::default();
        assert!((config.failure_threshold - 0.1).abs() < f64::EPSILON);
        assert!((config.default_wait_time - 5.0).abs() < f64::EPSILON);
        assert!((config.extra_wait_time - 10.0).abs() < f64::EPSILON);
        assert!(config.waiting_args.is_none());
        assert_eq!(config.max_steps, 500);
        assert!(!config.verbose);
        assert!((config.reward_factor - 1e-6).abs() < f64::EPSILON);
        assert!(config.seed.is_none());
        assert_eq!(config.policy, PolicyConfig::default());
    }

    #[test]
    fn test_backoff_wait_time() {
        let config = LoopConfig::<u32>::new().with_wait_times(0.1, 0.25);
        assert!((config.backoff_wait_time() - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_builder_methods() {
        let config = LoopConfig::new()
            .with_waiting_args(10u32)
            .with_failure_threshold(0.2)
            .with_max_steps(42)
            .verbose(true)
            .with_reward_factor(1e-3)
            .with_seed(7)
            .with_policy(PolicyConfig::ucb1());

        assert_eq!(config.waiting_args, Some(10));
        assert!((config.failure_threshold - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.max_steps, 42);
        assert!(config.verbose);
        assert!((config.reward_factor - 1e-3).abs() < f64::EPSILON);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.policy, PolicyConfig::Ucb1);
    }

    #[test]
    fn test_deserialize_config() {
        let toml = r#"
            failure_threshold = 0.1
            default_wait_time = 0.1
            extra_wait_time = 0.1
            waiting_args = 10
            max_steps = 1000
            verbose = true

            [policy]
            kind = "epsilon_decreasing"
            half_decay_steps = 60
        "#;

        let config: LoopConfig<u32> = toml::from_str(toml).unwrap();
        assert!((config.default_wait_time - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.waiting_args, Some(10));
        assert_eq!(config.max_steps, 1000);
        assert!(config.verbose);
        assert!((config.reward_factor - 1e-6).abs() < f64::EPSILON);
        assert_eq!(
            config.policy,
            PolicyConfig::EpsilonDecreasing {
                initial_epsilon: 1.0,
                limit_epsilon: 0.1,
                half_decay_steps: 60
            }
        );
    }

    #[test]
    fn test_deserialize_tuple_waiting_args() {
        let config: LoopConfig<(u32, u32)> =
            serde_json::from_str(r#"{"waiting_args": [5, 1]}"#).unwrap();
        assert_eq!(config.waiting_args, Some((5, 1)));
        assert_eq!(config.max_steps, 500);
    }
}
