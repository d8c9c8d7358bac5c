use std::env;
use std::process;
use trip_aggregator::{config::AggregatorConfig, init_aggregator, init_tracing};

#[tokio::main]
async fn main() {
    // Initialize tracing
    init_tracing();

    // Get config file path from command line or use default
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "config/aggregator.yaml".to_string());

    // Load configuration
    let config = match AggregatorConfig::from_file(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", config_path, e);
            eprintln!("Usage: trip-aggregator [config_file]");
            process::exit(1);
        }
    };

    // Start the aggregator
    if let Err(e) = init_aggregator(config).await {
        eprintln!("Aggregator error: {}", e);
        process::exit(1);
    }
}
