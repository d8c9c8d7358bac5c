use crate::aggregator::Aggregator;
use crate::metrics::{metrics_handler, MetricsService, Timer};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state behind every trip endpoint
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    /// Absent in tests that run without a Prometheus recorder
    pub metrics: Option<MetricsService>,
}

/// Query parameters common to all trip searches; axum rejects requests
/// missing any of them with a 400 before a handler runs
#[derive(Debug, Clone, Deserialize)]
pub struct TripQuery {
    pub origin: String,
    pub destination: String,
    pub date: String,
}

/// Build the HTTP application
pub fn router(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    let mut app = Router::new()
        .route("/trips/v1/search", get(v1_search))
        .route("/trips/v2/search", get(v2_search))
        .route("/trips/v1/cheapest-route", get(cheapest_route))
        .route("/trips/v1/contextual", get(contextual))
        .route("/trips/metrics", get(usage))
        .route("/trips/breaker-state", get(breaker_state))
        .route("/health", get(health))
        .with_state(state);

    if let Some(metrics) = metrics {
        app = app.route("/metrics", get(metrics_handler).with_state(metrics));
    }

    app.layer(TraceLayer::new_for_http())
}

async fn v1_search(
    State(state): State<AppState>,
    Query(query): Query<TripQuery>,
) -> impl IntoResponse {
    let timer = Timer::new("v1_search");
    let trips = state
        .aggregator
        .independent_search(&query.origin, &query.destination, &query.date)
        .await;
    timer.record(200);
    Json(trips)
}

async fn v2_search(
    State(state): State<AppState>,
    Query(query): Query<TripQuery>,
) -> impl IntoResponse {
    let timer = Timer::new("v2_search");
    let trips = state
        .aggregator
        .strict_search(&query.origin, &query.destination, &query.date)
        .await;
    timer.record(200);
    Json(trips)
}

async fn cheapest_route(
    State(state): State<AppState>,
    Query(query): Query<TripQuery>,
) -> impl IntoResponse {
    let timer = Timer::new("cheapest_route");
    let trip = state
        .aggregator
        .cheapest_route(&query.origin, &query.destination, &query.date)
        .await;
    timer.record(200);
    Json(trip)
}

async fn contextual(
    State(state): State<AppState>,
    Query(query): Query<TripQuery>,
) -> impl IntoResponse {
    let timer = Timer::new("contextual");
    let trips = state
        .aggregator
        .contextual_search(&query.origin, &query.destination, &query.date)
        .await;
    timer.record(200);
    Json(trips)
}

async fn usage(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.usage())
}

async fn breaker_state(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.breaker_snapshot().await)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
