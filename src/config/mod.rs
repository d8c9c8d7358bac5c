use crate::breaker::BreakerConfig;
use crate::error::{AggregatorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main aggregator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream service base URLs
    #[serde(default)]
    pub upstreams: UpstreamsConfig,
    /// Per-pattern call budgets
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    /// Weather circuit breaker tuning
    #[serde(default)]
    pub breaker: BreakerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Base URLs of the upstream search services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamsConfig {
    #[serde(default = "default_flights_url")]
    pub flights: String,
    #[serde(default = "default_hotels_url")]
    pub hotels: String,
    #[serde(default = "default_weather_url")]
    pub weather: String,
    #[serde(default = "default_events_url")]
    pub events: String,
}

/// Timeout budget per orchestration pattern, in milliseconds.
///
/// Each outbound call inside a pattern gets the full budget; chained stages
/// do not share one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_scatter_ms")]
    pub scatter_ms: u64,
    #[serde(default = "default_strict_ms")]
    pub strict_ms: u64,
    #[serde(default = "default_chain_ms")]
    pub chain_ms: u64,
    #[serde(default = "default_branch_ms")]
    pub branch_ms: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_flights_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_hotels_url() -> String {
    "http://localhost:3002".to_string()
}

fn default_weather_url() -> String {
    "http://localhost:3003".to_string()
}

fn default_events_url() -> String {
    "http://localhost:3004".to_string()
}

fn default_scatter_ms() -> u64 {
    1000
}

fn default_strict_ms() -> u64 {
    2000
}

fn default_chain_ms() -> u64 {
    2000
}

fn default_branch_ms() -> u64 {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UpstreamsConfig {
    fn default() -> Self {
        Self {
            flights: default_flights_url(),
            hotels: default_hotels_url(),
            weather: default_weather_url(),
            events: default_events_url(),
        }
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            scatter_ms: default_scatter_ms(),
            strict_ms: default_strict_ms(),
            chain_ms: default_chain_ms(),
            branch_ms: default_branch_ms(),
        }
    }
}

impl TimeoutsConfig {
    pub fn scatter(&self) -> Duration {
        Duration::from_millis(self.scatter_ms)
    }

    pub fn strict(&self) -> Duration {
        Duration::from_millis(self.strict_ms)
    }

    pub fn chain(&self) -> Duration {
        Duration::from_millis(self.chain_ms)
    }

    pub fn branch(&self) -> Duration {
        Duration::from_millis(self.branch_ms)
    }
}

impl AggregatorConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AggregatorError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| AggregatorError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("flights", &self.upstreams.flights),
            ("hotels", &self.upstreams.hotels),
            ("weather", &self.upstreams.weather),
            ("events", &self.upstreams.events),
        ] {
            if url.is_empty() {
                return Err(AggregatorError::Config(format!(
                    "Upstream URL cannot be empty for service: {}",
                    name
                )));
            }

            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AggregatorError::Config(format!(
                    "Upstream URL must start with http:// or https:// for service: {}",
                    name
                )));
            }
        }

        for (name, budget) in [
            ("scatter_ms", self.timeouts.scatter_ms),
            ("strict_ms", self.timeouts.strict_ms),
            ("chain_ms", self.timeouts.chain_ms),
            ("branch_ms", self.timeouts.branch_ms),
        ] {
            if budget == 0 {
                return Err(AggregatorError::Config(format!(
                    "Timeout budget must be > 0 for {}",
                    name
                )));
            }
        }

        if self.breaker.failure_window == 0 {
            return Err(AggregatorError::Config(
                "Breaker failure window must be > 0".to_string(),
            ));
        }
        if self.breaker.failure_threshold_percent > 100 {
            return Err(AggregatorError::Config(
                "Breaker failure threshold must be a percentage between 0 and 100".to_string(),
            ));
        }
        if self.breaker.half_open_max_probes == 0 {
            return Err(AggregatorError::Config(
                "Breaker half-open probe budget must be > 0".to_string(),
            ));
        }
        if self.breaker.call_timeout_ms == 0 {
            return Err(AggregatorError::Config(
                "Breaker call timeout must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
