use crate::error::{AggregatorError, Result};
use crate::upstream::{
    EventService, Flight, FlightService, Hotel, HotelService, WeatherService, EVENT_LABEL,
    FLIGHT_LABEL, HOTEL_LABEL, WEATHER_LABEL,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Issue a GET and decode the JSON body, folding transport, status and
/// decode failures into an upstream error carrying the call label.
async fn get_json<T>(client: &Client, url: &str, query: &[(&str, String)], label: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    debug!(url = %url, label = %label, "Calling upstream");

    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| AggregatorError::upstream(label, e.to_string()))?
        .error_for_status()
        .map_err(|e| AggregatorError::upstream(label, e.to_string()))?;

    response
        .json::<T>()
        .await
        .map_err(|e| AggregatorError::upstream(label, e.to_string()))
}

/// Flight search client over HTTP
#[derive(Debug, Clone)]
pub struct HttpFlightService {
    client: Client,
    base_url: String,
}

impl HttpFlightService {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl FlightService for HttpFlightService {
    async fn search(&self, origin: &str, destination: &str, date: &str) -> Result<Vec<Flight>> {
        let url = format!("{}/flights/search", self.base_url);
        let query = [
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("date", date.to_string()),
        ];
        get_json(&self.client, &url, &query, FLIGHT_LABEL).await
    }
}

/// Hotel search client over HTTP
#[derive(Debug, Clone)]
pub struct HttpHotelService {
    client: Client,
    base_url: String,
}

impl HttpHotelService {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl HotelService for HttpHotelService {
    async fn search(&self, destination: &str, late_check_in: Option<bool>) -> Result<Vec<Hotel>> {
        let url = format!("{}/hotels/search", self.base_url);
        let mut query = vec![("destination", destination.to_string())];
        if let Some(flag) = late_check_in {
            query.push(("lateCheckIn", flag.to_string()));
        }
        get_json(&self.client, &url, &query, HOTEL_LABEL).await
    }
}

/// Local events client over HTTP
#[derive(Debug, Clone)]
pub struct HttpEventService {
    client: Client,
    base_url: String,
}

impl HttpEventService {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl EventService for HttpEventService {
    async fn search(&self, destination: &str) -> Result<Vec<Value>> {
        let url = format!("{}/events/search", self.base_url);
        let query = [("destination", destination.to_string())];
        get_json(&self.client, &url, &query, EVENT_LABEL).await
    }
}

/// Weather forecast client over HTTP
#[derive(Debug, Clone)]
pub struct HttpWeatherService {
    client: Client,
    base_url: String,
}

impl HttpWeatherService {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl WeatherService for HttpWeatherService {
    async fn search(&self, destination: &str) -> Result<Value> {
        let url = format!("{}/weather", self.base_url);
        let query = [("destination", destination.to_string())];
        get_json(&self.client, &url, &query, WEATHER_LABEL).await
    }
}
