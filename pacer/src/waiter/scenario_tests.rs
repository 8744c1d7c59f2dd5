//! End-to-end pacing scenarios against real, scaled and stepped clocks.

use super::*;
use crate::cancellation::{CancelableAction, CancellationToken};
use crate::clock::{RealTimeClock, ScalableClock, SteppableClock};
use crate::diagnostics::{CollectingDiagnosticSink, SleepDiagnostic};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

fn real_clock() -> Arc<dyn Clock> {
    Arc::new(RealTimeClock::new())
}

fn collecting_action() -> (CancelableAction, Arc<CollectingDiagnosticSink>) {
    let sink = Arc::new(CollectingDiagnosticSink::new());
    let action = CancelableAction::new(CancellationToken::shared()).with_diagnostics(sink.clone());
    (action, sink)
}

#[test]
fn test_cadence_converges_to_period() {
    let (action, sink) = collecting_action();
    let mut waiter = Waiter::new(real_clock(), 0.02).unwrap();
    let start = Instant::now();

    for _ in 0..5 {
        assert!(waiter.sleep(&action));
    }

    let elapsed = start.elapsed().as_secs_f64();
    assert!(elapsed >= 0.095, "elapsed {elapsed}");
    assert!(elapsed < 0.2, "elapsed {elapsed}");
    assert_eq!(sink.missed_count(), 0);
}

#[test]
fn test_cadence_absorbs_iteration_work() {
    let clock = Arc::new(SteppableClock::default());
    let mut waiter = Waiter::new(clock.clone(), 0.03).unwrap();

    for _ in 0..4 {
        clock.step_by(0.01);
        // Work inside the budget shortens the sleep instead of stretching the period.
        assert!((waiter.remaining() - 0.02).abs() < 1e-9);
        waiter.reset_sleep();
    }

    let (action, _sink) = collecting_action();
    let mut waiter = Waiter::new(real_clock(), 0.03).unwrap();
    let start = Instant::now();

    for _ in 0..4 {
        std::thread::sleep(Duration::from_millis(10));
        assert!(waiter.sleep(&action));
    }

    let elapsed = start.elapsed().as_secs_f64();
    assert!(elapsed >= 0.115, "elapsed {elapsed}");
    assert!(elapsed < 0.5, "elapsed {elapsed}");
}

#[test]
fn test_preempted_sleep_returns_immediately() {
    let (action, sink) = collecting_action();
    let mut waiter = Waiter::new(real_clock(), 5.0).unwrap();
    action.token().cancel("shutdown");

    let start = Instant::now();
    assert!(!waiter.sleep(&action));
    assert!(start.elapsed() < Duration::from_millis(500));
    assert_eq!(sink.preempted_count(), 1);
}

#[test]
fn test_overrun_does_not_block() {
    let clock = Arc::new(SteppableClock::default());
    let (action, sink) = collecting_action();
    let mut waiter = Waiter::new(clock.clone(), 0.01).unwrap();

    clock.step_by(0.03);
    let start = Instant::now();

    assert!(waiter.sleep(&action));
    // Any block at all would have been for the full 10ms period or more.
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(sink.missed_count(), 1);
    match sink.diagnostics()[0] {
        SleepDiagnostic::MissedDeadline { overrun_ms } => {
            assert!((overrun_ms - 20.0).abs() < 1e-6, "{overrun_ms}");
        }
        SleepDiagnostic::Preempted => panic!("expected a missed deadline"),
    }
    assert_eq!(waiter.loop_start(), clock.now_nanos());
}

#[test]
fn test_overrun_reflects_cancellation_state() {
    let clock = Arc::new(SteppableClock::default());
    let (action, sink) = collecting_action();
    let mut waiter = Waiter::new(clock.clone(), 0.1).unwrap();

    clock.step_by(0.5);
    assert!(waiter.sleep(&action));

    action.token().cancel("stop");
    clock.step_by(0.5);
    assert!(!waiter.sleep(&action));
    // Cancellation is checked first, so the second call is a preemption.
    assert_eq!(sink.missed_count(), 1);
    assert_eq!(sink.preempted_count(), 1);
}

#[test]
fn test_reset_sleep_restores_full_budget() {
    let clock = Arc::new(SteppableClock::default());
    let mut waiter = Waiter::new(clock.clone(), 0.25).unwrap();

    clock.step_by(0.1);
    assert!(waiter.remaining() < 0.25);

    waiter.reset_sleep();
    assert_eq!(waiter.remaining(), 0.25);
}

#[test]
fn test_timeout_threshold() {
    let clock = Arc::new(SteppableClock::default());
    let mut waiter = Waiter::with_timeout(clock.clone(), 0.1, 1.0).unwrap();

    assert!(!waiter.is_timeout());
    clock.set_time(TimePoint::from_nanos(999_999_999));
    assert!(!waiter.is_timeout());
    clock.set_time(TimePoint::from_nanos(1_000_000_000));
    assert!(waiter.is_timeout());
    clock.set_time(TimePoint::from_nanos(5_000_000_000));
    assert!(waiter.is_timeout());

    waiter.reset_timeout();
    assert!(!waiter.is_timeout());
    clock.step_by(1.0);
    assert!(waiter.is_timeout());
}

#[test]
fn test_scaled_clock_halves_wall_sleep() {
    let clock: Arc<dyn Clock> = Arc::new(ScalableClock::new(2.0).unwrap());
    let (action, _sink) = collecting_action();
    let mut waiter = Waiter::new(clock, 0.2).unwrap();

    let start = Instant::now();
    assert!(waiter.sleep(&action));

    let elapsed = start.elapsed().as_secs_f64();
    assert!(elapsed >= 0.095, "elapsed {elapsed}");
    assert!(elapsed < 0.18, "elapsed {elapsed}");
}

#[test]
fn test_four_cycles_exceed_timeout() {
    let (action, _sink) = collecting_action();
    let mut waiter = Waiter::with_timeout(real_clock(), 0.1, 0.35).unwrap();
    assert!(!waiter.is_timeout());

    for _ in 0..4 {
        assert!(waiter.sleep(&action));
    }

    assert!(waiter.is_timeout());
}

#[test]
fn test_cancelled_sleep_still_advances_anchor() {
    let clock = Arc::new(SteppableClock::default());
    let (action, _sink) = collecting_action();
    let mut waiter = Waiter::new(clock.clone(), 0.01).unwrap();

    for _ in 0..2 {
        clock.step();
        assert!(waiter.sleep(&action));
    }

    action.token().cancel("mid-loop");
    let after_cancel = clock.step_by(0.3);

    assert!(!waiter.sleep(&action));
    assert_eq!(waiter.loop_start(), after_cancel);
}

#[test]
fn test_loop_stops_within_one_period_of_cancel() {
    let token = CancellationToken::shared();
    let completions = Arc::new(AtomicUsize::new(0));
    let iterations = Arc::new(AtomicUsize::new(0));

    let completions_clone = completions.clone();
    let action = CancelableAction::new(token.clone())
        .with_completion(move || {
            completions_clone.fetch_add(1, Ordering::SeqCst);
        })
        .with_diagnostics(Arc::new(CollectingDiagnosticSink::new()));

    let worker_iterations = iterations.clone();
    let worker = std::thread::spawn(move || {
        let _guard = action.completion_guard();
        let mut waiter = Waiter::new(Arc::new(RealTimeClock::new()), 0.02).unwrap();
        while waiter.sleep(&action) {
            worker_iterations.fetch_add(1, Ordering::SeqCst);
        }
    });

    std::thread::sleep(Duration::from_millis(70));
    let cancelled_at = Instant::now();
    token.cancel("controller shutdown");
    worker.join().unwrap();

    assert!(cancelled_at.elapsed() < Duration::from_millis(200));
    assert!(iterations.load(Ordering::SeqCst) >= 1);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[test]
fn test_timeout_polled_from_another_thread() {
    let (action, _sink) = collecting_action();
    let mut waiter = Waiter::with_timeout(real_clock(), 0.01, 0.05).unwrap();
    let monitor = waiter.timeout_monitor();
    let token = Arc::clone(action.shared_token());

    let watchdog = std::thread::spawn(move || {
        while !monitor.is_timeout() {
            std::thread::sleep(Duration::from_millis(1));
        }
        token.cancel("timed out");
    });

    let mut cycles = 0;
    while waiter.sleep(&action) {
        cycles += 1;
        assert!(cycles < 1000, "loop never observed the timeout");
    }
    watchdog.join().unwrap();

    assert!(waiter.is_timeout());
    assert_eq!(action.token().reason(), Some("timed out".to_string()));
}

#[tokio::test]
async fn test_async_sleep_paces_and_stops() {
    let (action, sink) = collecting_action();
    let mut waiter = Waiter::new(real_clock(), 0.02).unwrap();
    let start = tokio::time::Instant::now();

    assert!(waiter.sleep_async(&action).await);
    assert!(waiter.sleep_async(&action).await);
    assert!(start.elapsed() >= Duration::from_millis(38));

    action.token().cancel("stop");
    let before = waiter.loop_start();
    assert!(!waiter.sleep_async(&action).await);
    assert!(waiter.loop_start() >= before);
    assert_eq!(sink.preempted_count(), 1);
}

#[test]
fn test_waiter_accepts_trait_objects() {
    let (action, _sink) = collecting_action();
    let dynamic: &dyn Cancelable = &action;
    let clock = Arc::new(SteppableClock::default());
    let mut waiter = Waiter::new(clock.clone(), 0.0).unwrap();

    assert!(waiter.sleep(dynamic));
}
