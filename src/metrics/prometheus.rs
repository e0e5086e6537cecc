//! Prometheus metrics for the control loop.
//!
//! Counters work standalone without a Registry - registration is only
//! needed for exposition (scraping). Metric names use a `{prefix}_` prefix
//! (default: "lightrl").

use prometheus::{Counter, Gauge, IntCounter, IntGauge, Opts, Registry};

use crate::control::Phase;

/// Prometheus metrics for one control loop.
///
/// Clones share the same underlying counters.
#[derive(Clone)]
pub struct LoopMetrics {
    // === Gauges (current values) ===
    /// 0 while operating, 1 while backing off
    pub phase: IntGauge,

    /// Wait time (seconds) accumulated since the last reward
    pub accumulated_wait_seconds: Gauge,

    /// Most recent reward given to the bandit
    pub last_reward: Gauge,

    // === Counters (cumulative) ===
    /// Iterations spent in the operating phase
    pub operating_steps: IntCounter,

    /// Iterations spent in the backoff phase
    pub backoff_steps: IntCounter,

    /// Transitions from operating into backoff
    pub backoffs_entered: IntCounter,

    /// Rewards credited right after an operating call
    pub immediate_rewards: IntCounter,

    /// Rewards credited to the pending arm on recovery
    pub deferred_rewards: IntCounter,

    /// Successful tasks reported by the task function
    pub task_successes: Counter,

    /// Failed tasks reported by the task function
    pub task_failures: Counter,
}

impl Default for LoopMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopMetrics {
    /// Create metrics with default prefix "lightrl".
    pub fn new() -> Self {
        Self::with_prefix("lightrl")
    }

    /// Create metrics with a custom prefix.
    ///
    /// Hyphens and other characters that are invalid in Prometheus metric
    /// names are replaced with underscores.
    pub fn with_prefix(prefix: &str) -> Self {
        // Valid chars: [a-zA-Z_:] for first char, [a-zA-Z0-9_:] for rest
        let prefix: String = prefix
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let valid = if i == 0 {
                    c.is_ascii_alphabetic() || c == '_' || c == ':'
                } else {
                    c.is_ascii_alphanumeric() || c == '_' || c == ':'
                };
                if valid {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        let opts = |name: &str, help: &str| Opts::new(format!("{prefix}_{name}"), help);

        Self {
            phase: IntGauge::with_opts(opts("phase", "0 while operating, 1 while backing off"))
                .expect("metric creation should not fail"),

            accumulated_wait_seconds: Gauge::with_opts(opts(
                "accumulated_wait_seconds",
                "Wait time not yet attributed to a reward",
            ))
            .expect("metric creation should not fail"),

            last_reward: Gauge::with_opts(opts(
                "last_reward",
                "Most recent reward given to the bandit",
            ))
            .expect("metric creation should not fail"),

            operating_steps: IntCounter::with_opts(opts(
                "operating_steps",
                "Iterations spent operating",
            ))
            .expect("metric creation should not fail"),

            backoff_steps: IntCounter::with_opts(opts(
                "backoff_steps",
                "Iterations spent backing off",
            ))
            .expect("metric creation should not fail"),

            backoffs_entered: IntCounter::with_opts(opts(
                "backoffs_entered",
                "Transitions into backoff",
            ))
            .expect("metric creation should not fail"),

            immediate_rewards: IntCounter::with_opts(opts(
                "immediate_rewards",
                "Rewards credited right after an operating call",
            ))
            .expect("metric creation should not fail"),

            deferred_rewards: IntCounter::with_opts(opts(
                "deferred_rewards",
                "Rewards credited on recovery from backoff",
            ))
            .expect("metric creation should not fail"),

            task_successes: Counter::with_opts(opts(
                "task_successes",
                "Successful tasks reported by the task function",
            ))
            .expect("metric creation should not fail"),

            task_failures: Counter::with_opts(opts(
                "task_failures",
                "Failed tasks reported by the task function",
            ))
            .expect("metric creation should not fail"),
        }
    }

    /// Register all metrics with a Registry for exposition.
    ///
    /// # Errors
    ///
    /// Returns an error if any metric fails to register (e.g., duplicate names).
    pub fn register(&self, registry: &Registry) -> Result<(), prometheus::Error> {
        registry.register(Box::new(self.phase.clone()))?;
        registry.register(Box::new(self.accumulated_wait_seconds.clone()))?;
        registry.register(Box::new(self.last_reward.clone()))?;
        registry.register(Box::new(self.operating_steps.clone()))?;
        registry.register(Box::new(self.backoff_steps.clone()))?;
        registry.register(Box::new(self.backoffs_entered.clone()))?;
        registry.register(Box::new(self.immediate_rewards.clone()))?;
        registry.register(Box::new(self.deferred_rewards.clone()))?;
        registry.register(Box::new(self.task_successes.clone()))?;
        registry.register(Box::new(self.task_failures.clone()))?;
        Ok(())
    }

    /// Record one iteration in `phase` and the task counts it observed.
    #[inline]
    pub fn record_step(&self, phase: Phase, successes: f64, failures: f64) {
        match phase {
            Phase::Operating => self.operating_steps.inc(),
            Phase::Backoff => self.backoff_steps.inc(),
        }
        // Counters panic on negative increments
        self.task_successes.inc_by(successes.max(0.0));
        self.task_failures.inc_by(failures.max(0.0));
    }

    /// Record a phase transition.
    #[inline]
    pub fn set_phase(&self, phase: Phase) {
        if phase == Phase::Backoff {
            self.backoffs_entered.inc();
        }
        self.phase.set(phase as i64);
    }

    /// Record a reward given to the bandit.
    #[inline]
    pub fn record_reward(&self, reward: f64, deferred: bool) {
        if deferred {
            self.deferred_rewards.inc();
        } else {
            self.immediate_rewards.inc();
        }
        self.last_reward.set(reward);
    }

    /// Update the accumulated wait gauge.
    #[inline]
    pub fn set_accumulated_wait(&self, seconds: f64) {
        self.accumulated_wait_seconds.set(seconds);
    }
}

impl std::fmt::Debug for LoopMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopMetrics")
            .field("phase", &self.phase.get())
            .field("operating_steps", &self.operating_steps.get())
            .field("backoff_steps", &self.backoff_steps.get())
            .field("backoffs_entered", &self.backoffs_entered.get())
            .field("immediate_rewards", &self.immediate_rewards.get())
            .field("deferred_rewards", &self.deferred_rewards.get())
            .finish()
    }
}
