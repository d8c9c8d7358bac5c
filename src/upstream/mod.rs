pub mod http;

pub use http::{HttpEventService, HttpFlightService, HttpHotelService, HttpWeatherService};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Call labels used in timeout and upstream failure messages
pub const FLIGHT_LABEL: &str = "Flight service";
pub const HOTEL_LABEL: &str = "Hotel service";
pub const EVENT_LABEL: &str = "Event service";
pub const WEATHER_LABEL: &str = "Weather service";

/// A flight offer as returned by the flight search upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub price: f64,
    /// Arrival time as a "HH:MM" wall clock string
    pub arrival_time: String,
}

/// A hotel offer as returned by the hotel search upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: String,
    pub late_check_in_available: bool,
}

#[async_trait]
pub trait FlightService: Send + Sync {
    async fn search(&self, origin: &str, destination: &str, date: &str) -> Result<Vec<Flight>>;
}

#[async_trait]
pub trait HotelService: Send + Sync {
    /// The late check-in preference is forwarded upstream only when present
    async fn search(&self, destination: &str, late_check_in: Option<bool>) -> Result<Vec<Hotel>>;
}

#[async_trait]
pub trait EventService: Send + Sync {
    async fn search(&self, destination: &str) -> Result<Vec<Value>>;
}

/// Weather lookups are only ever made through the circuit breaker
#[async_trait]
pub trait WeatherService: Send + Sync {
    async fn search(&self, destination: &str) -> Result<Value>;
}
