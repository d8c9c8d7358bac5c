use crate::breaker::types::{
    BreakerConfig, BreakerSnapshot, BreakerState, FallbackReason, Transition,
};
use crate::breaker::window::OutcomeWindow;

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The call may execute
    Proceed,
    /// The call must be answered with the fallback payload instead
    FastFail(FallbackReason),
}

/// Pure circuit breaker state machine.
///
/// Holds no clock and performs no I/O: callers pass the current time in
/// epoch milliseconds to [`admit`](Self::admit) and
/// [`record`](Self::record), and both return the transition they caused,
/// if any. All methods are O(1).
#[derive(Debug)]
pub struct BreakerMachine {
    config: BreakerConfig,
    state: BreakerState,
    window: OutcomeWindow,
    last_failure_ms: Option<u64>,
    probe_count: u32,
}

impl BreakerMachine {
    pub fn new(config: BreakerConfig) -> Self {
        let window = OutcomeWindow::new(config.failure_window);
        Self {
            config,
            state: BreakerState::Closed,
            window,
            last_failure_ms: None,
            probe_count: 0,
        }
    }

    pub fn state(&self) -> BreakerState {
        self.state
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        BreakerSnapshot {
            state: self.state,
            failure_count: self.window.failures(),
            last_failure_time: self.last_failure_ms,
            half_open_probe_count: self.probe_count,
        }
    }

    /// Decide whether a call may execute at time `now_ms`.
    ///
    /// An OPEN breaker whose recovery time has elapsed moves to HALF_OPEN
    /// and admits the call as the first probe. A HALF_OPEN breaker that has
    /// already spent its probe budget re-opens and fast-fails the call.
    pub fn admit(&mut self, now_ms: u64) -> (Admission, Option<Transition>) {
        match self.state {
            BreakerState::Closed => (Admission::Proceed, None),
            BreakerState::Open => {
                if self.recovery_elapsed(now_ms) {
                    let transition = self.transition_to_half_open();
                    (Admission::Proceed, Some(transition))
                } else {
                    (Admission::FastFail(FallbackReason::CircuitOpen), None)
                }
            }
            BreakerState::HalfOpen => {
                if self.probe_count >= self.config.half_open_max_probes {
                    let transition = self.transition_to_open(now_ms);
                    (
                        Admission::FastFail(FallbackReason::ProbeBudgetExhausted),
                        Some(transition),
                    )
                } else {
                    (Admission::Proceed, None)
                }
            }
        }
    }

    /// Record the outcome of an admitted call at time `now_ms`.
    ///
    /// The outcome always enters the window first. A failure in HALF_OPEN
    /// re-opens immediately; a failure in CLOSED opens once the window
    /// failure rate reaches the threshold. Probes are counted on success
    /// only, and the window is cleared when the breaker closes.
    pub fn record(&mut self, success: bool, now_ms: u64) -> Option<Transition> {
        self.window.push(success);

        if success {
            if self.state == BreakerState::HalfOpen {
                self.probe_count += 1;
                if self.probe_count >= self.config.half_open_max_probes {
                    return Some(self.transition_to_closed());
                }
            }
            None
        } else {
            match self.state {
                BreakerState::HalfOpen => Some(self.transition_to_open(now_ms)),
                BreakerState::Closed if self.threshold_reached() => {
                    Some(self.transition_to_open(now_ms))
                }
                _ => None,
            }
        }
    }

    fn recovery_elapsed(&self, now_ms: u64) -> bool {
        match self.last_failure_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.config.recovery_time_ms,
            None => true,
        }
    }

    fn threshold_reached(&self) -> bool {
        self.window.failure_rate() >= self.config.failure_threshold_percent as f64
    }

    fn transition_to_open(&mut self, now_ms: u64) -> Transition {
        let from = self.state;
        self.state = BreakerState::Open;
        self.last_failure_ms = Some(now_ms);
        self.probe_count = 0;
        Transition {
            from,
            to: BreakerState::Open,
        }
    }

    fn transition_to_half_open(&mut self) -> Transition {
        let from = self.state;
        self.state = BreakerState::HalfOpen;
        self.probe_count = 0;
        Transition {
            from,
            to: BreakerState::HalfOpen,
        }
    }

    fn transition_to_closed(&mut self) -> Transition {
        let from = self.state;
        self.state = BreakerState::Closed;
        self.probe_count = 0;
        self.window.clear();
        Transition {
            from,
            to: BreakerState::Closed,
        }
    }
}
