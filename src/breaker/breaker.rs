use crate::breaker::clock::{Clock, SystemClock};
use crate::breaker::machine::{Admission, BreakerMachine};
use crate::breaker::observer::{BreakerObserver, TracingObserver};
use crate::breaker::types::{
    BreakerConfig, BreakerEvent, BreakerSnapshot, BreakerState, FallbackReason, GuardedResult,
    Transition,
};
use crate::error::Result;
use crate::timeout;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// Async circuit breaker protecting one upstream dependency.
///
/// Wraps the pure [`BreakerMachine`] behind a lock that is acquired only
/// for the admission check and the outcome recording, never across the
/// guarded call itself. Time comes from an injected [`Clock`] and every
/// transition or served fallback is forwarded to the [`BreakerObserver`]
/// after the lock is released.
///
/// `execute` never returns an error: a rejected or failed call yields the
/// degraded fallback payload so callers always have a response to serve.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    machine: RwLock<BreakerMachine>,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn BreakerObserver>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            name: name.into(),
            machine: RwLock::new(BreakerMachine::new(config)),
            clock: Arc::new(SystemClock),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the wall clock, used by tests to drive recovery manually
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn BreakerObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn state(&self) -> BreakerState {
        self.machine.read().await.state()
    }

    pub async fn snapshot(&self) -> BreakerSnapshot {
        self.machine.read().await.snapshot()
    }

    /// Run `operation` under the breaker's protection.
    ///
    /// The call is bounded by the configured call timeout, and a timeout
    /// is recorded as a failure like any other error. When the breaker
    /// rejects the call or the call fails, the degraded fallback payload
    /// is returned in place of a result.
    pub async fn execute<T, F>(&self, label: &str, operation: F) -> GuardedResult<T>
    where
        F: Future<Output = Result<T>>,
    {
        let now = self.clock.now_millis();
        let (admission, transition, call_timeout) = {
            let mut machine = self.machine.write().await;
            let (admission, transition) = machine.admit(now);
            (admission, transition, machine.config().call_timeout())
        };
        self.emit_transition(transition);

        if let Admission::FastFail(reason) = admission {
            self.observer
                .on_event(&self.name, BreakerEvent::FallbackServed { reason });
            return GuardedResult::degraded();
        }

        let outcome = timeout::with_deadline(operation, call_timeout, label).await;

        let now = self.clock.now_millis();
        let transition = {
            let mut machine = self.machine.write().await;
            machine.record(outcome.is_ok(), now)
        };
        self.emit_transition(transition);

        match outcome {
            Ok(value) => GuardedResult::Ok(value),
            Err(error) => {
                warn!(breaker = %self.name, label = %label, error = %error, "Guarded call failed");
                self.observer.on_event(
                    &self.name,
                    BreakerEvent::FallbackServed {
                        reason: FallbackReason::CallFailed,
                    },
                );
                GuardedResult::degraded()
            }
        }
    }

    fn emit_transition(&self, transition: Option<Transition>) {
        if let Some(Transition { from, to }) = transition {
            self.observer
                .on_event(&self.name, BreakerEvent::Transition { from, to });
        }
    }
}
