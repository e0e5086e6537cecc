//! Integration tests for the control loop driving real bandits.

use std::time::Duration;

use lightrl::{
    Bandit, ControlLoop, EpsilonFirst, EpsilonGreedy, GreedyWithHistory, LightError, LoopBuilder,
    LoopConfig, LoopState, NoopSleeper, Phase, PolicyConfig, StepEvent, TaskOutcome, Ucb1,
    VirtualClock,
};

/// Endpoint that accepts up to `capacity` requests per call and rejects the rest.
struct RateLimited {
    capacity: u32,
    calls: Vec<u32>,
}

impl RateLimited {
    fn new(capacity: u32) -> Self {
        Self {
            capacity,
            calls: Vec::new(),
        }
    }

    fn send(&mut self, batch: u32) -> TaskOutcome {
        self.calls.push(batch);
        let ok = batch.min(self.capacity);
        TaskOutcome::new(f64::from(ok), f64::from(batch - ok))
    }
}

fn fast_config() -> LoopConfig<u32> {
    LoopConfig::new()
        .with_waiting_args(1)
        .with_failure_threshold(0.1)
        .with_wait_times(0.1, 0.1)
        .with_reward_factor(1.0)
}

#[test]
fn test_report_after_updates() {
    let mut bandit = EpsilonGreedy::with_seed(vec![1, 2, 3], 0.1, 0).unwrap();
    bandit.update(0, 1.0).unwrap();
    bandit.update(0, 0.5).unwrap();
    bandit.update(1, 0.5).unwrap();

    let mut out = Vec::new();
    bandit.write_report(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Q-values per arm:\n\
         \x20 num_tasks=1: avg_reward=0.75000, count=2\n\
         \x20 num_tasks=2: avg_reward=0.50000, count=1\n\
         \x20 num_tasks=3: avg_reward=0.00000, count=0\n"
    );
}

#[test]
fn test_ucb1_rejects_large_reward() {
    let mut bandit = Ucb1::new(vec![1, 2, 3]).unwrap();
    let err = bandit.update(0, 1.5).unwrap_err();
    assert!(matches!(err, LightError::RewardOutOfRange { .. }));
    assert_eq!(bandit.counts()[0], 0);
    assert_eq!(bandit.q_values()[0], 0.0);
}

#[test]
fn test_half_failures_trigger_backoff_without_credit() {
    let mut control = ControlLoop::with_sleeper(fast_config(), NoopSleeper);
    let mut bandit = EpsilonGreedy::with_seed(vec![10u32, 20, 40], 0.1, 1).unwrap();
    let mut state = LoopState::new();

    let event = control
        .step(&mut state, &mut bandit, &mut |_: &u32| (5u32, 5u32))
        .unwrap();

    assert!(matches!(event, StepEvent::EnteredBackoff { .. }));
    assert_eq!(state.phase, Phase::Backoff);
    assert_eq!(bandit.counts(), &[0, 0, 0]);
    assert_eq!(bandit.q_values(), &[0.0, 0.0, 0.0]);
}

#[test]
fn test_clean_probe_credits_pending_arm_and_resumes() {
    let mut control = ControlLoop::with_sleeper(fast_config(), NoopSleeper);
    let mut bandit = EpsilonGreedy::with_seed(vec![40u32], 0.0, 1).unwrap();
    let mut state = LoopState::new();
    let mut endpoint = RateLimited::new(10);
    let mut task = |batch: &u32| endpoint.send(*batch);

    // Operating call overshoots: 40 requests, 10 accepted
    let event = control.step(&mut state, &mut bandit, &mut task).unwrap();
    assert_eq!(event, StepEvent::EnteredBackoff { arm_index: 0 });

    // Probe with waiting_args comes back clean on the same iteration
    let event = control.step(&mut state, &mut bandit, &mut task).unwrap();
    let StepEvent::Recovered { arm_index, reward } = event else {
        panic!("expected recovery, got {event:?}");
    };
    assert_eq!(arm_index, 0);
    // 10 successes over 0.1s operating + 0.2s probing
    assert!((reward - 10.0 / 0.3).abs() < 1e-9);
    assert_eq!(state.phase, Phase::Operating);
    assert_eq!(bandit.counts(), &[1]);
    assert_eq!(endpoint.calls, vec![40, 1]);
}

#[test]
fn test_backoff_penalizes_overshooting_arm() {
    let config = fast_config().with_max_steps(400);
    let mut control = ControlLoop::with_sleeper(config, VirtualClock::new());
    let mut bandit = EpsilonFirst::with_seed(vec![5u32, 10, 50], 30, 0.1, 3).unwrap();
    let mut endpoint = RateLimited::new(10);

    let stats = control
        .run(&mut bandit, &mut |batch: &u32| endpoint.send(*batch))
        .unwrap();

    assert_eq!(stats.steps(), 400);
    assert!(stats.backoffs_entered > 0);
    assert_eq!(
        stats.immediate_rewards + stats.deferred_rewards,
        bandit.counts().iter().sum::<u64>()
    );

    // 10 per call at capacity beats 5 per call, and 50 always backs off
    let q = bandit.q_values();
    assert!(q[1] > q[0], "q={q:?}");
    assert!(q[1] > q[2], "q={q:?}");
}

#[test]
fn test_history_policy_adapts_to_capacity_drop() {
    let config = fast_config().with_max_steps(600);
    let mut control = ControlLoop::with_sleeper(config, NoopSleeper);
    let mut bandit = GreedyWithHistory::with_seed(vec![5u32, 20], 10, 8).unwrap();
    let mut calls = 0;

    control
        .run(&mut bandit, &mut |batch: &u32| {
            calls += 1;
            // Capacity drops from 20 to 5 halfway through
            let capacity = if calls < 300 { 20 } else { 5 };
            let ok = (*batch).min(capacity);
            (ok, *batch - ok)
        })
        .unwrap();

    assert!(bandit.history(1).len() <= 10);
    assert!(bandit.q_values()[0] > bandit.q_values()[1]);
}

#[test]
fn test_virtual_clock_matches_configured_waits() {
    let config = fast_config().with_max_steps(4).with_wait_times(1.0, 4.0);
    let mut control = ControlLoop::with_sleeper(config, VirtualClock::new());
    let mut bandit = EpsilonGreedy::with_seed(vec![10u32], 0.0, 2).unwrap();
    let mut calls = 0;

    // operate (fail) -> probe (fail) -> probe (ok) -> operate (ok)
    let stats = control
        .run(&mut bandit, &mut |_: &u32| {
            calls += 1;
            match calls {
                1 | 2 => (1u32, 9u32),
                _ => (10, 0),
            }
        })
        .unwrap();

    assert_eq!(stats.operating_steps, 2);
    assert_eq!(stats.backoff_steps, 2);
    assert_eq!(stats.deferred_rewards, 1);
    assert_eq!(stats.immediate_rewards, 1);
    assert_eq!(control.sleeper().elapsed(), Duration::from_secs(1 + 5 + 5 + 1));

    // Deferred: 1 success over 11s. Immediate: 10 successes over 1s.
    let expected = (1.0 / 11.0 + 10.0) / 2.0;
    assert!((bandit.q_values()[0] - expected).abs() < 1e-9);
}

#[test]
fn test_config_driven_loop() {
    let mut control = LoopBuilder::<u32>::new()
        .waiting_args(1)
        .default_wait_time(0.1)
        .extra_wait_time(0.1)
        .max_steps(50)
        .seed(21)
        .policy(PolicyConfig::epsilon_decreasing())
        .build_with_sleeper(NoopSleeper)
        .unwrap();

    let mut bandit = control.build_bandit(vec![2, 4, 8]).unwrap();
    let stats = control
        .run(&mut bandit, &mut |batch: &u32| (*batch, 0u32))
        .unwrap();

    assert_eq!(stats.steps(), 50);
    assert_eq!(stats.backoffs_entered, 0);
    assert_eq!(bandit.counts().iter().sum::<u64>(), 50);
    assert_eq!(control.metrics().immediate_rewards.get(), 50);
}

#[test]
fn test_tuple_arms() {
    let config = LoopConfig::new()
        .with_waiting_args((1u32, 1u32))
        .with_wait_times(0.1, 0.1)
        .with_max_steps(20);
    let mut control = ControlLoop::with_sleeper(config, NoopSleeper);
    let mut bandit = Ucb1::new(vec![(4u32, 1u32), (8, 2)]).unwrap();

    let stats = control
        .run(&mut bandit, &mut |&(batch, workers): &(u32, u32)| {
            (batch * workers, 0u32)
        })
        .unwrap();

    assert_eq!(stats.steps(), 20);
    assert_eq!(bandit.counts().iter().sum::<u64>(), 20);
}
