//! Tune a batch size against a simulated rate-limited API.
//!
//! The API accepts 200 requests per sliding one-second window. Going over the
//! limit blocks every request for a further second. The bandit learns which
//! batch size gets the most requests through per second of waiting.
//!
//! Run with: cargo run --example simulated_api -- --lightrl-max-steps 200
//!
//! Set `RUST_LOG=lightrl=debug` to see every iteration.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use clap::Parser;
use lightrl::{EpsilonDecreasing, LoopArgs, LoopBuilder};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    #[command(flatten)]
    lightrl: LoopArgs,

    /// Optional config file (TOML, YAML, or JSON)
    #[arg(long)]
    config: Option<String>,
}

struct SimulatedApi {
    requests: VecDeque<Instant>,
    window: Duration,
    request_limit: usize,
    block_duration: Duration,
    blocked_until: Option<Instant>,
}

impl SimulatedApi {
    fn new() -> Self {
        Self {
            requests: VecDeque::new(),
            window: Duration::from_secs(1),
            request_limit: 200,
            block_duration: Duration::from_secs(1),
            blocked_until: None,
        }
    }

    /// Returns true if the request was accepted.
    fn request(&mut self) -> bool {
        let now = Instant::now();

        while let Some(&oldest) = self.requests.front() {
            if now.duration_since(oldest) <= self.window {
                break;
            }
            self.requests.pop_front();
        }

        if self.blocked_until.is_some_and(|until| now < until) {
            return false;
        }

        if self.requests.len() > self.request_limit {
            self.blocked_until = Some(now + self.block_duration);
            return false;
        }

        self.requests.push_back(now);
        true
    }

    fn send_batch(&mut self, size: u32) -> (u32, u32) {
        let mut ok = 0;
        let mut failed = 0;
        for _ in 0..size {
            if self.request() {
                ok += 1;
            } else {
                failed += 1;
            }
            std::thread::sleep(Duration::from_micros(100));
        }
        (ok, failed)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut builder = LoopBuilder::<u32>::new()
        .failure_threshold(0.1)
        .default_wait_time(0.1)
        .extra_wait_time(0.1)
        .waiting_args(10)
        .max_steps(1000)
        .verbose(true)
        .reward_factor(1e-6);
    if let Some(ref path) = args.config {
        builder = builder.file(path);
    }
    let mut control = builder
        .env_prefix("LIGHTRL")
        .with_cli_args(&args.lightrl)
        .build()?;

    let batch_sizes = vec![10, 25, 50, 100, 150, 200, 250, 300, 350, 400, 450, 500];
    let mut bandit = EpsilonDecreasing::new(batch_sizes, 1.0, 0.1, 100)?;

    let mut api = SimulatedApi::new();
    let stats = control.run(&mut bandit, &mut |size: &u32| api.send_batch(*size))?;

    println!("{stats:?}");
    println!("{bandit}");
    Ok(())
}
