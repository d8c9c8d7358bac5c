use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use trip_aggregator::breaker::{
    BreakerConfig, BreakerState, CircuitBreaker, GuardedResult, MockClock, NoopObserver,
};
use trip_aggregator::error::AggregatorError;

fn test_config() -> BreakerConfig {
    BreakerConfig {
        failure_window: 4,
        failure_threshold_percent: 50,
        recovery_time_ms: 30_000,
        half_open_max_probes: 2,
        call_timeout_ms: 100,
    }
}

fn breaker_with_clock(clock: Arc<MockClock>) -> CircuitBreaker {
    CircuitBreaker::new("weather", test_config())
        .with_clock(clock)
        .with_observer(Arc::new(NoopObserver))
}

async fn succeed(breaker: &CircuitBreaker) -> GuardedResult<u32> {
    breaker.execute("Weather service", async { Ok(1u32) }).await
}

async fn fail(breaker: &CircuitBreaker) -> GuardedResult<u32> {
    breaker
        .execute("Weather service", async {
            Err(AggregatorError::upstream("Weather service", "boom"))
        })
        .await
}

#[tokio::test]
async fn test_starts_closed() {
    let breaker = breaker_with_clock(Arc::new(MockClock::new(0)));
    assert_eq!(breaker.state().await, BreakerState::Closed);
    assert_eq!(succeed(&breaker).await, GuardedResult::Ok(1));
}

#[tokio::test]
async fn test_opens_when_failure_rate_reaches_threshold() {
    let breaker = breaker_with_clock(Arc::new(MockClock::new(0)));

    // 0/2 failures, then 1/3 (33%), still closed
    succeed(&breaker).await;
    succeed(&breaker).await;
    fail(&breaker).await;
    assert_eq!(breaker.state().await, BreakerState::Closed);

    // 2/4 failures is exactly the 50% threshold
    fail(&breaker).await;
    assert_eq!(breaker.state().await, BreakerState::Open);
}

#[tokio::test]
async fn test_cold_start_single_failure_opens() {
    // With an empty history one failure is a 100% rate, so the very
    // first failure trips the circuit
    let breaker = breaker_with_clock(Arc::new(MockClock::new(0)));
    fail(&breaker).await;
    assert_eq!(breaker.state().await, BreakerState::Open);
}

#[tokio::test]
async fn test_open_serves_fallback_without_calling() {
    let clock = Arc::new(MockClock::new(0));
    let breaker = breaker_with_clock(clock.clone());
    fail(&breaker).await;

    clock.advance(29_999);
    let ran = AtomicBool::new(false);
    let result: GuardedResult<u32> = breaker
        .execute("Weather service", async {
            ran.store(true, Ordering::SeqCst);
            Ok(7)
        })
        .await;

    assert!(result.is_degraded());
    assert!(!ran.load(Ordering::SeqCst));
    assert_eq!(breaker.state().await, BreakerState::Open);
}

#[tokio::test]
async fn test_recovery_elapse_admits_first_probe() {
    let clock = Arc::new(MockClock::new(0));
    let breaker = breaker_with_clock(clock.clone());
    fail(&breaker).await;

    // Elapsed equal to the recovery time is enough
    clock.advance(30_000);
    let ran = AtomicBool::new(false);
    let result: GuardedResult<u32> = breaker
        .execute("Weather service", async {
            ran.store(true, Ordering::SeqCst);
            Ok(7)
        })
        .await;

    assert_eq!(result, GuardedResult::Ok(7));
    assert!(ran.load(Ordering::SeqCst));
    assert_eq!(breaker.state().await, BreakerState::HalfOpen);
}

#[tokio::test]
async fn test_half_open_single_failure_reopens() {
    let clock = Arc::new(MockClock::new(0));
    let breaker = breaker_with_clock(clock.clone());
    fail(&breaker).await;

    clock.advance(30_000);
    succeed(&breaker).await;
    assert_eq!(breaker.state().await, BreakerState::HalfOpen);

    fail(&breaker).await;
    let snapshot = breaker.snapshot().await;
    assert_eq!(snapshot.state, BreakerState::Open);
    assert_eq!(snapshot.half_open_probe_count, 0);
    assert_eq!(snapshot.last_failure_time, Some(30_000));
}

#[tokio::test]
async fn test_all_probes_succeeding_closes_and_clears_history() {
    let clock = Arc::new(MockClock::new(0));
    let breaker = breaker_with_clock(clock.clone());
    fail(&breaker).await;

    clock.advance(30_000);
    succeed(&breaker).await;
    succeed(&breaker).await;

    let snapshot = breaker.snapshot().await;
    assert_eq!(snapshot.state, BreakerState::Closed);
    assert_eq!(snapshot.failure_count, 0);
    assert_eq!(snapshot.half_open_probe_count, 0);
}

#[tokio::test]
async fn test_reopened_breaker_waits_full_recovery_again() {
    let clock = Arc::new(MockClock::new(0));
    let breaker = breaker_with_clock(clock.clone());
    fail(&breaker).await;

    // Probe fails at t=30s, so recovery restarts from there
    clock.advance(30_000);
    fail(&breaker).await;
    assert_eq!(breaker.state().await, BreakerState::Open);

    clock.advance(29_999);
    let result: GuardedResult<u32> = succeed(&breaker).await;
    assert!(result.is_degraded());

    clock.advance(1);
    assert_eq!(succeed(&breaker).await, GuardedResult::Ok(1));
}

#[tokio::test]
async fn test_window_eviction_keeps_rate_current() {
    let clock = Arc::new(MockClock::new(0));
    let breaker = breaker_with_clock(clock.clone());

    // Fill the 4-slot window with successes, then a single failure is
    // only 25% and must not trip the circuit
    for _ in 0..4 {
        succeed(&breaker).await;
    }
    fail(&breaker).await;
    assert_eq!(breaker.state().await, BreakerState::Closed);
    assert_eq!(breaker.snapshot().await.failure_count, 1);
}

#[tokio::test]
async fn test_timeout_counts_as_failure() {
    let breaker = breaker_with_clock(Arc::new(MockClock::new(0)));
    let result: GuardedResult<u32> = breaker
        .execute("Weather service", async {
            tokio::time::sleep(Duration::from_millis(1_000)).await;
            Ok(7)
        })
        .await;

    assert!(result.is_degraded());
    assert_eq!(breaker.state().await, BreakerState::Open);
}

#[tokio::test]
async fn test_fallback_payload_wire_shape() {
    let breaker = breaker_with_clock(Arc::new(MockClock::new(0)));
    let result: GuardedResult<u32> = fail(&breaker).await;

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(
        value,
        serde_json::json!({ "summary": "unavailable", "degraded": true })
    );
}

#[tokio::test]
async fn test_concurrent_calls_settle_consistently() {
    let clock = Arc::new(MockClock::new(0));
    let breaker = Arc::new(breaker_with_clock(clock));
    let successes = Arc::new(AtomicU32::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let breaker = breaker.clone();
        let successes = successes.clone();
        handles.push(tokio::spawn(async move {
            if let GuardedResult::Ok(_) = breaker.execute("Weather service", async { Ok(1u32) }).await
            {
                successes.fetch_add(1, Ordering::SeqCst);
            }
        }));
    }
    for joined in futures::future::join_all(handles).await {
        joined.unwrap();
    }

    assert_eq!(successes.load(Ordering::SeqCst), 8);
    assert_eq!(breaker.state().await, BreakerState::Closed);
    // Window capacity is 4, so at most 4 outcomes are retained
    assert!(breaker.snapshot().await.failure_count == 0);
}
