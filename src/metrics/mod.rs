//! Metrics for control-loop observability.
//!
//! Metrics are always collected (atomic counters and gauges) and can
//! optionally be registered with a Prometheus registry for scraping.
//!
//! # Available Metrics
//!
//! ## Gauges (current values)
//!
//! - `lightrl_phase` - 0 while operating, 1 while backing off
//! - `lightrl_accumulated_wait_seconds` - Wait time not yet attributed to a reward
//! - `lightrl_last_reward` - Most recent reward given to the bandit
//!
//! ## Counters (cumulative)
//!
//! - `lightrl_operating_steps` - Iterations spent operating
//! - `lightrl_backoff_steps` - Iterations spent backing off (probe calls)
//! - `lightrl_backoffs_entered` - Transitions into backoff
//! - `lightrl_immediate_rewards` - Rewards credited right after an operating call
//! - `lightrl_deferred_rewards` - Rewards credited on recovery from backoff
//! - `lightrl_task_successes` - Successful tasks reported by the task function
//! - `lightrl_task_failures` - Failed tasks reported by the task function
//!
//! # Example
//!
//! ```ignore
//! use prometheus::Registry;
//! use lightrl::LoopBuilder;
//!
//! let registry = Registry::new();
//! let mut control = LoopBuilder::<u32>::new()
//!     .waiting_args(10)
//!     .prometheus_registry(registry.clone())
//!     .build()?;
//!
//! // Later: expose metrics via HTTP
//! use prometheus::TextEncoder;
//! let encoder = TextEncoder::new();
//! let mut buffer = String::new();
//! encoder.encode_utf8(&registry.gather(), &mut buffer)?;
//! ```

mod prometheus;

pub use self::prometheus::LoopMetrics;
