//! Builder pattern for constructing control loops.
//!
//! The builder supports multiple configuration sources using figment:
//! - Default values
//! - Config files (TOML, YAML, JSON)
//! - Environment variables
//! - Programmatic overrides
//! - CLI arguments via clap

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use prometheus::Registry;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::bandit::PolicyConfig;
use crate::clock::{Sleeper, ThreadSleeper};
use crate::config::LoopConfig;
use crate::control::ControlLoop;
use crate::error::Result;
use crate::metrics::LoopMetrics;

/// Builder for constructing a [`ControlLoop`].
///
/// Configuration sources are merged in the following order (later sources override earlier):
/// 1. Default values
/// 2. Config files (in order added)
/// 3. Environment variables
/// 4. Programmatic overrides
///
/// `A` is the arm parameter type. It must round-trip through serde so that
/// `waiting_args` can come from any source.
///
/// # Examples
///
/// ```ignore
/// use lightrl::LoopBuilder;
///
/// let mut control = LoopBuilder::<u32>::new()
///     .file("lightrl.toml")
///     .env_prefix("LIGHTRL")
///     .waiting_args(10)
///     .max_steps(1000)
///     .build()?;
/// ```
pub struct LoopBuilder<A> {
    figment: Figment,
    prometheus_registry: Option<Registry>,
    metrics_prefix: Option<String>,
    _arm: PhantomData<fn() -> A>,
}

impl<A> Default for LoopBuilder<A>
where
    A: Serialize + DeserializeOwned,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for LoopBuilder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopBuilder")
            .field("figment", &self.figment)
            .field(
                "prometheus_registry",
                &self.prometheus_registry.as_ref().map(|_| "<Registry>"),
            )
            .field("metrics_prefix", &self.metrics_prefix)
            .finish()
    }
}

impl<A> LoopBuilder<A>
where
    A: Serialize + DeserializeOwned,
{
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            figment: Figment::from(Serialized::defaults(LoopConfig::<A>::default())),
            prometheus_registry: None,
            metrics_prefix: None,
            _arm: PhantomData,
        }
    }

    /// Add a configuration file.
    ///
    /// Supports TOML, YAML, and JSON formats (detected by extension).
    /// Files are merged in the order they are added.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let builder = LoopBuilder::<u32>::new()
    ///     .file("lightrl.toml")
    ///     .file("lightrl.local.toml"); // Overrides values from lightrl.toml
    /// ```
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref();
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        self.figment = match extension.to_lowercase().as_str() {
            "toml" => self.figment.merge(Toml::file(path)),
            "yaml" | "yml" => self.figment.merge(Yaml::file(path)),
            "json" => self.figment.merge(Json::file(path)),
            _ => {
                // Default to TOML
                self.figment.merge(Toml::file(path))
            }
        };
        self
    }

    /// Add environment variables with a prefix.
    ///
    /// Environment variables are expected in the format `{PREFIX}_{KEY}`,
    /// e.g. `LIGHTRL_MAX_STEPS`. Nested keys are separated by a double
    /// underscore: `LIGHTRL_POLICY__KIND=ucb1`.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Will read MYAPP_FAILURE_THRESHOLD, MYAPP_WAITING_ARGS, etc.
    /// let builder = LoopBuilder::<u32>::new().env_prefix("MYAPP");
    /// ```
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        let prefix = format!("{}_", prefix.trim_end_matches('_'));
        self.figment = self.figment.merge(Env::prefixed(&prefix).split("__"));
        self
    }

    /// Set the failure fraction at which the loop backs off.
    pub fn failure_threshold(mut self, threshold: f64) -> Self {
        self.figment = self
            .figment
            .merge(Serialized::default("failure_threshold", threshold));
        self
    }

    /// Set the wait after every task call, in seconds.
    pub fn default_wait_time(mut self, seconds: f64) -> Self {
        self.figment = self
            .figment
            .merge(Serialized::default("default_wait_time", seconds));
        self
    }

    /// Set the additional wait after each backoff probe, in seconds.
    pub fn extra_wait_time(mut self, seconds: f64) -> Self {
        self.figment = self
            .figment
            .merge(Serialized::default("extra_wait_time", seconds));
        self
    }

    /// Set the low-load parameters used while backing off.
    pub fn waiting_args(mut self, args: A) -> Self {
        self.figment = self
            .figment
            .merge(Serialized::default("waiting_args", args));
        self
    }

    /// Set the number of loop iterations.
    pub fn max_steps(mut self, steps: u64) -> Self {
        self.figment = self.figment.merge(Serialized::default("max_steps", steps));
        self
    }

    /// Print the bandit report before every iteration and after the last.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.figment = self.figment.merge(Serialized::default("verbose", verbose));
        self
    }

    /// Set the reward scale.
    pub fn reward_factor(mut self, factor: f64) -> Self {
        self.figment = self
            .figment
            .merge(Serialized::default("reward_factor", factor));
        self
    }

    /// Seed the bandit built by [`ControlLoop::build_bandit`].
    pub fn seed(mut self, seed: u64) -> Self {
        self.figment = self.figment.merge(Serialized::default("seed", seed));
        self
    }

    /// Set the policy built by [`ControlLoop::build_bandit`].
    ///
    /// # Example
    ///
    /// ```ignore
    /// use lightrl::{LoopBuilder, PolicyConfig};
    ///
    /// let control = LoopBuilder::<u32>::new()
    ///     .waiting_args(1)
    ///     .policy(PolicyConfig::ucb1())
    ///     .build()?;
    /// let bandit = control.build_bandit(vec![10, 25, 50])?;
    /// ```
    pub fn policy(mut self, policy: PolicyConfig) -> Self {
        self.figment = self.figment.merge(Serialized::default("policy", policy));
        self
    }

    /// Provide an external Prometheus registry for metrics exposition.
    ///
    /// When a registry is provided, the loop's metrics will be registered
    /// and available for Prometheus scraping.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use prometheus::Registry;
    ///
    /// let registry = Registry::new();
    /// let control = LoopBuilder::<u32>::new()
    ///     .waiting_args(1)
    ///     .prometheus_registry(registry.clone())
    ///     .build()?;
    ///
    /// // Later: expose via HTTP endpoint
    /// let encoder = prometheus::TextEncoder::new();
    /// let metric_families = registry.gather();
    /// // encoder.encode(&metric_families, &mut buffer)?;
    /// ```
    pub fn prometheus_registry(mut self, registry: Registry) -> Self {
        self.prometheus_registry = Some(registry);
        self
    }

    /// Set the metric name prefix (default: "lightrl").
    ///
    /// Needed when several loops share one registry.
    pub fn metrics_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.metrics_prefix = Some(prefix.into());
        self
    }

    /// Apply CLI argument overrides.
    ///
    /// This method applies any non-None values from the `LoopArgs` struct.
    /// `--lightrl-verbose` can only switch verbose output on.
    pub fn with_cli_args(mut self, args: &LoopArgs) -> Self {
        if let Some(threshold) = args.lightrl_failure_threshold {
            self = self.failure_threshold(threshold);
        }
        if let Some(seconds) = args.lightrl_default_wait_time {
            self = self.default_wait_time(seconds);
        }
        if let Some(seconds) = args.lightrl_extra_wait_time {
            self = self.extra_wait_time(seconds);
        }
        if let Some(steps) = args.lightrl_max_steps {
            self = self.max_steps(steps);
        }
        if let Some(factor) = args.lightrl_reward_factor {
            self = self.reward_factor(factor);
        }
        if let Some(seed) = args.lightrl_seed {
            self = self.seed(seed);
        }
        if args.lightrl_verbose {
            self = self.verbose(true);
        }
        self
    }

    /// Extract the merged configuration without building a loop.
    ///
    /// # Errors
    ///
    /// Returns an error if any source fails to parse or a value has the
    /// wrong type.
    pub fn config(&self) -> Result<LoopConfig<A>> {
        Ok(self.figment.extract().map_err(Box::new)?)
    }

    /// Build a loop that sleeps on the current thread.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration extraction fails.
    pub fn build(self) -> Result<ControlLoop<A, ThreadSleeper>> {
        self.build_with_sleeper(ThreadSleeper)
    }

    /// Build a loop with a custom delay source.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration extraction fails.
    pub fn build_with_sleeper<S: Sleeper>(self, sleeper: S) -> Result<ControlLoop<A, S>> {
        let config = self.config()?;

        let metrics = match self.metrics_prefix {
            Some(ref prefix) => LoopMetrics::with_prefix(prefix),
            None => LoopMetrics::new(),
        };

        // Register with provided registry if available
        if let Some(ref registry) = self.prometheus_registry {
            if let Err(e) = metrics.register(registry) {
                warn!(%e, "failed to register prometheus metrics");
            }
        }

        Ok(ControlLoop::from_parts(config, sleeper, metrics))
    }
}

/// CLI arguments for control-loop configuration.
///
/// Use with clap's `Parser` derive macro. These arguments can be applied
/// to a `LoopBuilder` using `with_cli_args`. `waiting_args` and the policy
/// have no flags because their shape depends on the application.
///
/// # Examples
///
/// ```ignore
/// use clap::Parser;
/// use lightrl::{LoopArgs, LoopBuilder};
///
/// #[derive(Parser)]
/// struct MyArgs {
///     #[command(flatten)]
///     lightrl: LoopArgs,
///     // ... other args
/// }
///
/// let args = MyArgs::parse();
/// let control = LoopBuilder::<u32>::new()
///     .waiting_args(1)
///     .with_cli_args(&args.lightrl)
///     .build()?;
/// ```
#[derive(Debug, Default, Clone, clap::Args)]
pub struct LoopArgs {
    /// Failure fraction at which the loop backs off
    #[arg(long)]
    pub lightrl_failure_threshold: Option<f64>,

    /// Seconds to wait after every task call
    #[arg(long)]
    pub lightrl_default_wait_time: Option<f64>,

    /// Additional seconds to wait after each backoff probe
    #[arg(long)]
    pub lightrl_extra_wait_time: Option<f64>,

    /// Number of loop iterations
    #[arg(long)]
    pub lightrl_max_steps: Option<u64>,

    /// Reward scale
    #[arg(long)]
    pub lightrl_reward_factor: Option<f64>,

    /// Bandit seed
    #[arg(long)]
    pub lightrl_seed: Option<u64>,

    /// Print the bandit report every iteration
    #[arg(long)]
    pub lightrl_verbose: bool,
}
