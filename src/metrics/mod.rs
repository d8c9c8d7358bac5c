use crate::error::{AggregatorError, Result};
use axum::{
    body::Body,
    extract::State,
    http::{Response, StatusCode},
    response::IntoResponse,
};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Metrics service for collecting and exposing Prometheus metrics
#[derive(Clone)]
pub struct MetricsService {
    handle: Arc<PrometheusHandle>,
}

impl MetricsService {
    /// Create a new metrics service
    pub fn new() -> Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            AggregatorError::Internal(format!("Failed to install metrics recorder: {}", e))
        })?;

        Self::register_metrics();

        info!("Metrics service initialized successfully");

        Ok(Self {
            handle: Arc::new(handle),
        })
    }

    /// Register all metrics with descriptions
    fn register_metrics() {
        // Request metrics
        describe_counter!(
            "trips_requests_total",
            "Total number of trip search requests received"
        );
        describe_histogram!(
            "trips_request_duration_seconds",
            "Trip search request latencies in seconds"
        );
        describe_counter!(
            "trips_requests_errors_total",
            "Total number of trip search requests that resulted in errors"
        );
        describe_counter!(
            "trips_degraded_responses_total",
            "Total number of composite responses served with missing slots"
        );

        // Circuit breaker metrics
        describe_gauge!(
            "trips_breaker_state",
            "Circuit breaker state (0 = closed, 1 = open, 2 = half-open)"
        );
        describe_counter!(
            "trips_breaker_transitions_total",
            "Total number of circuit breaker state transitions"
        );
        describe_counter!(
            "trips_breaker_fallbacks_total",
            "Total number of guarded calls answered with the fallback payload"
        );

        debug!("All metrics registered with descriptions");
    }

    /// Get the Prometheus metrics handle
    pub fn handle(&self) -> Arc<PrometheusHandle> {
        self.handle.clone()
    }

    /// Render metrics in Prometheus format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Metrics endpoint handler
pub async fn metrics_handler(State(service): State<MetricsService>) -> impl IntoResponse {
    let metrics = service.render();
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(Body::from(metrics))
        .unwrap()
}

/// Record a completed pattern request
pub fn record_request(pattern: &str, status: u16, duration: f64) {
    let labels = [
        ("pattern", pattern.to_string()),
        ("status", status.to_string()),
    ];

    counter!("trips_requests_total", &labels).increment(1);
    histogram!("trips_request_duration_seconds", &labels).record(duration);

    if status >= 400 {
        counter!("trips_requests_errors_total", &labels).increment(1);
    }
}

/// Record a composite response that was served with one or more slots missing
pub fn record_degraded(pattern: &str) {
    let labels = [("pattern", pattern.to_string())];
    counter!("trips_degraded_responses_total", &labels).increment(1);
}

/// Record circuit breaker state
/// State: 0 = Closed, 1 = Open, 2 = HalfOpen
pub fn record_breaker_state(breaker: &str, state: u8) {
    let labels = [("breaker", breaker.to_string())];
    gauge!("trips_breaker_state", &labels).set(state as f64);
}

/// Record a circuit breaker state transition
pub fn record_breaker_transition(breaker: &str, from_state: &str, to_state: &str) {
    let labels = [
        ("breaker", breaker.to_string()),
        ("from", from_state.to_string()),
        ("to", to_state.to_string()),
    ];
    counter!("trips_breaker_transitions_total", &labels).increment(1);
}

/// Record a guarded call that was answered with the fallback payload
pub fn record_breaker_fallback(breaker: &str, reason: &str) {
    let labels = [
        ("breaker", breaker.to_string()),
        ("reason", reason.to_string()),
    ];
    counter!("trips_breaker_fallbacks_total", &labels).increment(1);
}

/// Timer for measuring pattern request duration
pub struct Timer {
    start: Instant,
    pattern: String,
}

impl Timer {
    /// Start a new timer for a pattern request
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            pattern: pattern.into(),
        }
    }

    /// Record the elapsed time with the given status code
    pub fn record(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();
        record_request(&self.pattern, status, duration);
    }

    /// Get the elapsed time in seconds
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// In-memory usage counters for the versioned search entry points.
///
/// Chained and branching lookups are deliberately not counted; only the
/// v1/v2 search family feeds the usage report.
#[derive(Debug, Default)]
pub struct UsageCounters {
    v1: AtomicU64,
    v2: AtomicU64,
}

impl UsageCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_v1(&self) {
        self.v1.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_v2(&self) {
        self.v2.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        let v1 = self.v1.load(Ordering::Relaxed);
        let v2 = self.v2.load(Ordering::Relaxed);
        UsageSnapshot {
            total_requests: v1 + v2,
            v1_requests: v1,
            v2_requests: v2,
        }
    }
}

/// Point-in-time usage report served by the metrics endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub total_requests: u64,
    pub v1_requests: u64,
    pub v2_requests: u64,
}
