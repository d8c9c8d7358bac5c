use crate::breaker::types::{BreakerEvent, BreakerState};
use crate::metrics;
use tracing::{info, warn};

/// Sink for circuit breaker lifecycle events.
///
/// The state machine itself stays pure; the async wrapper forwards every
/// transition and served fallback here after releasing its lock.
pub trait BreakerObserver: Send + Sync + std::fmt::Debug {
    fn on_event(&self, breaker: &str, event: BreakerEvent);
}

/// Default observer: structured logs plus Prometheus metrics
#[derive(Debug, Default)]
pub struct TracingObserver;

impl BreakerObserver for TracingObserver {
    fn on_event(&self, breaker: &str, event: BreakerEvent) {
        match event {
            BreakerEvent::Transition { from, to } => {
                match to {
                    BreakerState::Open => {
                        warn!(breaker = %breaker, from = %from, to = %to, "Circuit breaker opened")
                    }
                    BreakerState::HalfOpen => {
                        info!(breaker = %breaker, from = %from, to = %to, "Circuit breaker half-open, admitting probes")
                    }
                    BreakerState::Closed => {
                        info!(breaker = %breaker, from = %from, to = %to, "Circuit breaker closed")
                    }
                }
                metrics::record_breaker_transition(breaker, &from.to_string(), &to.to_string());
                metrics::record_breaker_state(breaker, state_code(to));
            }
            BreakerEvent::FallbackServed { reason } => {
                warn!(breaker = %breaker, reason = reason.as_str(), "Serving fallback payload");
                metrics::record_breaker_fallback(breaker, reason.as_str());
            }
        }
    }
}

/// Gauge encoding: 0 = Closed, 1 = Open, 2 = HalfOpen
fn state_code(state: BreakerState) -> u8 {
    match state {
        BreakerState::Closed => 0,
        BreakerState::Open => 1,
        BreakerState::HalfOpen => 2,
    }
}

/// Observer that drops every event, for tests that only exercise state
#[derive(Debug, Default)]
pub struct NoopObserver;

impl BreakerObserver for NoopObserver {
    fn on_event(&self, _breaker: &str, _event: BreakerEvent) {}
}
