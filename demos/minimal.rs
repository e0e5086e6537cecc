//! Smallest end-to-end run: a task whose failure rate grows with load.
//!
//! A call with `n` tasks fails roughly `0.05 + n / 200` of them, with a little
//! noise, so only the smallest batches stay under the 10% threshold.
//!
//! Rewards only depend on the configured waits, so the loop runs with a
//! virtual clock and finishes instantly.
//!
//! Run with: cargo run --example minimal

use lightrl::{ControlLoop, EpsilonDecreasing, LoopConfig, VirtualClock};
use rand::Rng;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let task_counts: Vec<u32> = (10..=200).step_by(10).collect();
    let half_decay_steps = task_counts.len() as u64 * 5;
    let mut bandit = EpsilonDecreasing::new(task_counts, 1.0, 0.1, half_decay_steps)?;
    println!("{bandit}");

    let config = LoopConfig::new()
        .with_failure_threshold(0.1)
        .with_wait_times(0.1, 0.1)
        .with_waiting_args(10)
        .with_max_steps(1000)
        .verbose(true)
        .with_reward_factor(1e-6);
    let mut control = ControlLoop::with_sleeper(config, VirtualClock::new());

    let mut rng = rand::thread_rng();
    let stats = control.run(&mut bandit, &mut |&n: &u32| {
        let n = f64::from(n);
        let p = 0.05 + n / 200.0 + rng.gen_range(-0.04..0.04);
        let failed = n * p.clamp(0.0, 1.0);
        (n - failed, failed)
    })?;

    println!("{stats:?}");
    println!(
        "simulated wait: {:.1}s over {} sleeps",
        control.sleeper().elapsed().as_secs_f64(),
        control.sleeper().sleeps()
    );
    Ok(())
}
