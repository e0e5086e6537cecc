//! # lightrl
//!
//! **Learning how hard to push**
//!
//! Multi-armed bandit policies and a two-state control loop for tuning a
//! control parameter (typically a batch size) against a task that starts
//! failing when pushed too hard, such as a rate-limited API.
//!
//! ## Features
//!
//! - **Five Policies**: epsilon-greedy, epsilon-first, epsilon-decreasing, UCB1,
//!   and greedy over a bounded reward history, all behind the [`Bandit`] trait
//! - **Backoff Control Loop**: [`ControlLoop`] rewards throughput, backs off on
//!   failures, and charges the wait to the arm that caused it
//! - **Deterministic Testing**: seedable bandits and injectable [`Sleeper`]s
//! - **Flexible Configuration**: Configure via files (TOML/YAML/JSON), environment variables, or code
//! - **CLI Integration**: Built-in clap support for command-line overrides
//! - **Metrics**: Prometheus counters for phases, rewards, and task outcomes
//!
//! ## Quick Start
//!
//! ```ignore
//! use lightrl::{Bandit, EpsilonDecreasing, LoopBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut control = LoopBuilder::<u32>::new()
//!         .waiting_args(1)
//!         .failure_threshold(0.1)
//!         .max_steps(200)
//!         .build()?;
//!
//!     let mut bandit = EpsilonDecreasing::new(vec![10, 25, 50, 100], 1.0, 0.1, 60)?;
//!
//!     let stats = control.run(&mut bandit, &mut |batch: &u32| {
//!         // Issue `batch` requests, count what came back
//!         send_batch(*batch)
//!     })?;
//!
//!     println!("{stats:?}");
//!     bandit.report();
//!     Ok(())
//! }
//! ```
//!
//! ## Choosing the Policy from Configuration
//!
//! ```ignore
//! use lightrl::{LoopBuilder, PolicyConfig};
//!
//! let mut control = LoopBuilder::<u32>::new()
//!     .waiting_args(1)
//!     .policy(PolicyConfig::ucb1())
//!     .seed(42)
//!     .build()?;
//!
//! let mut bandit = control.build_bandit(vec![10, 25, 50])?;
//! control.run(&mut bandit, &mut task)?;
//! ```
//!
//! ## Configuration
//!
//! Configuration sources are merged in order (later sources override earlier):
//!
//! 1. Default values
//! 2. Config files (via `.file()`)
//! 3. Environment variables (via `.env_prefix()`)
//! 4. Programmatic overrides
//! 5. CLI arguments (via `.with_cli_args()`)
//!
//! ### Config File Example (TOML)
//!
//! ```toml
//! failure_threshold = 0.1
//! default_wait_time = 5.0
//! extra_wait_time = 10.0
//! waiting_args = 1
//! max_steps = 500
//! reward_factor = 1e-6
//!
//! [policy]
//! kind = "epsilon_greedy"
//! epsilon = 0.1
//! ```
//!
//! ### Environment Variables
//!
//! With `.env_prefix("LIGHTRL")`:
//! - `LIGHTRL_FAILURE_THRESHOLD=0.2`
//! - `LIGHTRL_WAITING_ARGS=1`
//! - `LIGHTRL_MAX_STEPS=1000`
//! - `LIGHTRL_POLICY__KIND=ucb1`
//!
//! ### CLI Arguments
//!
//! ```ignore
//! use clap::Parser;
//! use lightrl::{LoopArgs, LoopBuilder};
//!
//! #[derive(Parser)]
//! struct MyArgs {
//!     #[command(flatten)]
//!     lightrl: LoopArgs,
//! }
//!
//! let args = MyArgs::parse();
//! let control = LoopBuilder::<u32>::new()
//!     .file("config.toml")
//!     .env_prefix("LIGHTRL")
//!     .with_cli_args(&args.lightrl)
//!     .build()?;
//! ```
//!
//! ## Logging
//!
//! The loop logs through `tracing`: one `debug` event per iteration, `info`
//! events at start, end, and on every phase change. Install a subscriber to
//! see them.

pub mod bandit;
pub mod builder;
pub mod clock;
pub mod config;
pub mod control;
pub mod error;
pub mod metrics;

pub use bandit::{
    ArmTable, Bandit, EpsilonDecreasing, EpsilonFirst, EpsilonGreedy, GreedyWithHistory,
    PolicyConfig, Ucb1,
};
pub use builder::{LoopArgs, LoopBuilder};
pub use clock::{NoopSleeper, Sleeper, ThreadSleeper, VirtualClock};
pub use config::LoopConfig;
pub use control::{ControlLoop, LoopState, Phase, RunStats, StepEvent, Task, TaskOutcome};
pub use error::{LightError, Result};
pub use metrics::LoopMetrics;
