//! Error types for lightrl.

use thiserror::Error;

/// Errors that can occur when building bandits or running the control loop.
#[derive(Debug, Error)]
pub enum LightError {
    /// A bandit needs at least one arm to choose from.
    #[error("bandit requires at least one arm")]
    NoArms,

    /// UCB1 confidence bounds assume rewards in [0, 1].
    #[error("reward {reward} is outside [0, 1]")]
    RewardOutOfRange { reward: f64 },

    /// The control loop cannot probe during backoff without parameters.
    #[error("waiting_args must be provided")]
    MissingWaitingArgs,

    /// The task reported zero successes and zero failures.
    #[error("task reported no completed tasks (0 successes, 0 failures)")]
    NoTasksReported,

    /// Error extracting configuration from figment.
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

/// Result type alias for lightrl operations.
pub type Result<T> = std::result::Result<T, LightError>;
