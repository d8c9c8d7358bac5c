use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakerState {
    /// Circuit is closed, calls flow normally
    Closed,
    /// Circuit is open, calls fast-fail to the fallback
    Open,
    /// Circuit is half-open, admitting a limited number of probe calls
    HalfOpen,
}

impl std::fmt::Display for BreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakerState::Closed => write!(f, "CLOSED"),
            BreakerState::Open => write!(f, "OPEN"),
            BreakerState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Number of call outcomes to track in the sliding window
    #[serde(default = "default_failure_window")]
    pub failure_window: usize,

    /// Percentage of failures in the window that opens the circuit
    #[serde(default = "default_failure_threshold_percent")]
    pub failure_threshold_percent: u32,

    /// Cooldown in the open state before probing resumes, in milliseconds
    #[serde(default = "default_recovery_time_ms")]
    pub recovery_time_ms: u64,

    /// Number of successful probes required to close a half-open circuit
    #[serde(default = "default_half_open_max_probes")]
    pub half_open_max_probes: u32,

    /// Timeout for each guarded call, in milliseconds
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

fn default_failure_window() -> usize {
    20
}

fn default_failure_threshold_percent() -> u32 {
    50
}

fn default_recovery_time_ms() -> u64 {
    30_000
}

fn default_half_open_max_probes() -> u32 {
    5
}

fn default_call_timeout_ms() -> u64 {
    3_000
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_window: default_failure_window(),
            failure_threshold_percent: default_failure_threshold_percent(),
            recovery_time_ms: default_recovery_time_ms(),
            half_open_max_probes: default_half_open_max_probes(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

impl BreakerConfig {
    pub fn recovery_time(&self) -> Duration {
        Duration::from_millis(self.recovery_time_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

/// Read-only view of the breaker for observability endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerSnapshot {
    /// Current circuit state
    pub state: BreakerState,
    /// Failures currently held in the outcome window
    pub failure_count: usize,
    /// Epoch milliseconds of the most recent transition into OPEN
    pub last_failure_time: Option<u64>,
    /// Probes admitted and succeeded since the last entry into HALF_OPEN
    pub half_open_probe_count: u32,
}

/// The fixed payload served in place of an unavailable dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPayload {
    pub summary: String,
    pub degraded: bool,
}

impl FallbackPayload {
    pub fn unavailable() -> Self {
        Self {
            summary: "unavailable".to_string(),
            degraded: true,
        }
    }
}

impl Default for FallbackPayload {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// Outcome of a breaker-guarded call: the dependency's real payload, or the
/// fixed fallback. Serializes untagged, so the wire shape is whichever arm
/// is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GuardedResult<T> {
    Ok(T),
    Degraded(FallbackPayload),
}

impl<T> GuardedResult<T> {
    pub fn degraded() -> Self {
        GuardedResult::Degraded(FallbackPayload::unavailable())
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, GuardedResult::Degraded(_))
    }
}

/// State change produced by the breaker machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: BreakerState,
    pub to: BreakerState,
}

/// Why a guarded call was answered with the fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Circuit is open and the cooldown has not elapsed
    CircuitOpen,
    /// Half-open probe budget already spent when the call arrived
    ProbeBudgetExhausted,
    /// The call was admitted but failed or timed out
    CallFailed,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::CircuitOpen => "circuit_open",
            FallbackReason::ProbeBudgetExhausted => "probe_budget_exhausted",
            FallbackReason::CallFailed => "call_failed",
        }
    }
}

/// Structured breaker events delivered to the injected observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerEvent {
    /// The state machine moved between states
    Transition { from: BreakerState, to: BreakerState },
    /// A call was answered with the fallback payload
    FallbackServed { reason: FallbackReason },
}
