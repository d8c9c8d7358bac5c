pub mod aggregator;
pub mod api;
pub mod breaker;
pub mod config;
pub mod error;
pub mod metrics;
pub mod timeout;
pub mod upstream;

use crate::aggregator::Aggregator;
use crate::api::AppState;
use crate::breaker::CircuitBreaker;
use crate::config::AggregatorConfig;
use crate::error::Result;
use crate::metrics::MetricsService;
use crate::upstream::{HttpEventService, HttpFlightService, HttpHotelService, HttpWeatherService};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Initialize the aggregator server
pub async fn init_aggregator(config: AggregatorConfig) -> Result<()> {
    // Validate configuration
    config.validate()?;

    info!("Starting Trip Aggregator");
    info!(
        "Server listening on {}:{}",
        config.server.host, config.server.port
    );

    // Install the Prometheus recorder before anything records
    let metrics = MetricsService::new()?;

    // One shared HTTP client for every upstream
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| {
            crate::error::AggregatorError::Internal(format!("Failed to build HTTP client: {}", e))
        })?;

    let aggregator = Aggregator::new(
        Arc::new(HttpFlightService::new(
            client.clone(),
            config.upstreams.flights.clone(),
        )),
        Arc::new(HttpHotelService::new(
            client.clone(),
            config.upstreams.hotels.clone(),
        )),
        Arc::new(HttpEventService::new(
            client.clone(),
            config.upstreams.events.clone(),
        )),
        Arc::new(HttpWeatherService::new(
            client,
            config.upstreams.weather.clone(),
        )),
        config.timeouts.clone(),
        CircuitBreaker::new("weather", config.breaker.clone()),
    );

    let state = AppState {
        aggregator: Arc::new(aggregator),
        metrics: Some(metrics),
    };

    // Create Axum app
    let app = api::router(state);

    // Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| crate::error::AggregatorError::Io(e))?;

    info!("Aggregator ready to accept connections");

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::AggregatorError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}

/// Initialize tracing/logging
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trip_aggregator=debug,tower_http=debug".into()),
        )
        .with_target(false)
        .compact()
        .init();
}
