use crate::breaker::GuardedResult;
use crate::upstream::{Flight, Hotel};
use serde::Serialize;
use serde_json::Value;

/// Composite for the v1 scatter-gather search.
///
/// Each slot that failed is null and flips `degraded`; the search itself
/// never fails as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndependentTrips {
    pub flights: Option<Vec<Flight>>,
    pub hotels: Option<Vec<Hotel>>,
    pub degraded: bool,
}

/// Composite for the v2 strict search: both required calls must succeed,
/// weather rides along through the circuit breaker and can only degrade
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StrictTrips {
    Complete {
        flights: Vec<Flight>,
        hotels: Vec<Hotel>,
        weather: GuardedResult<Value>,
    },
    Failed {
        error: String,
    },
}

/// Composite for the chained cheapest-route lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChainedTrip {
    /// Cheapest flight paired with a hotel
    Matched { flight: Flight, hotel: Hotel },
    /// Flights found but no hotel; the hotel slot stays null
    FlightOnly {
        flight: Flight,
        hotel: Option<Hotel>,
        note: String,
    },
    /// The flight search returned nothing to chain from
    NoFlights { error: String },
    /// A stage failed outright
    Failed { error: String },
}

/// Composite for the branching contextual search.
///
/// The events key is absent entirely when the destination is inland, and
/// null when the lookup was scheduled but failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextualTrips {
    pub flights: Option<Vec<Flight>>,
    pub hotels: Option<Vec<Hotel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Option<Vec<Value>>>,
}
