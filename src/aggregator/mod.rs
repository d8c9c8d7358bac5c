pub mod types;

pub use types::{ChainedTrip, ContextualTrips, IndependentTrips, StrictTrips};

use crate::breaker::{BreakerSnapshot, CircuitBreaker};
use crate::config::TimeoutsConfig;
use crate::error::Result;
use crate::metrics::{self, UsageCounters, UsageSnapshot};
use crate::timeout;
use crate::upstream::{
    EventService, Flight, FlightService, Hotel, HotelService, WeatherService, EVENT_LABEL,
    FLIGHT_LABEL, HOTEL_LABEL, WEATHER_LABEL,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Destination codes that get the additional local events lookup
pub const COASTAL_DESTINATIONS: [&str; 4] = ["CMB", "BKK", "HKT", "USA"];

/// Whether a destination code is in the coastal set
pub fn is_coastal(destination: &str) -> bool {
    COASTAL_DESTINATIONS.contains(&destination)
}

/// Pick the cheapest flight; ties keep the first occurrence in input order
pub fn cheapest_flight(flights: &[Flight]) -> Option<&Flight> {
    let mut cheapest = flights.first()?;
    for flight in flights {
        if flight.price < cheapest.price {
            cheapest = flight;
        }
    }
    Some(cheapest)
}

/// Whether an arrival at `arrival_time` ("HH:MM") needs a late check-in.
/// Arrivals at 18:00 or later do; an unparseable hour does not.
pub fn needs_late_check_in(arrival_time: &str) -> bool {
    arrival_time
        .split(':')
        .next()
        .and_then(|hour| hour.parse::<u32>().ok())
        .map(|hour| hour >= 18)
        .unwrap_or(false)
}

/// Pick the first hotel offering late check-in, or the first hotel overall
pub fn pick_hotel(hotels: &[Hotel]) -> Option<&Hotel> {
    hotels
        .iter()
        .find(|hotel| hotel.late_check_in_available)
        .or_else(|| hotels.first())
}

/// Fold one settled upstream outcome into its composite slot
fn settle<T>(slot: &str, outcome: Result<T>) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(slot = %slot, error = %error, "Upstream call failed");
            None
        }
    }
}

/// Trip search aggregator.
///
/// Fans requests out to the flight, hotel, event and weather upstreams
/// using four orchestration patterns: scatter-gather (v1), strict join
/// (v2), sequential chaining (cheapest route) and conditional branching
/// (contextual). Every outbound call is deadline-bounded, and the weather
/// upstream is reached exclusively through its circuit breaker.
pub struct Aggregator {
    flights: Arc<dyn FlightService>,
    hotels: Arc<dyn HotelService>,
    events: Arc<dyn EventService>,
    weather: Arc<dyn WeatherService>,
    timeouts: TimeoutsConfig,
    weather_breaker: CircuitBreaker,
    usage: UsageCounters,
}

impl Aggregator {
    pub fn new(
        flights: Arc<dyn FlightService>,
        hotels: Arc<dyn HotelService>,
        events: Arc<dyn EventService>,
        weather: Arc<dyn WeatherService>,
        timeouts: TimeoutsConfig,
        weather_breaker: CircuitBreaker,
    ) -> Self {
        Self {
            flights,
            hotels,
            events,
            weather,
            timeouts,
            weather_breaker,
            usage: UsageCounters::new(),
        }
    }

    /// Scatter-gather search: flights and hotels in parallel, every
    /// outcome kept. A failed slot is null and flips the degraded flag;
    /// the search never fails as a whole.
    pub async fn independent_search(
        &self,
        origin: &str,
        destination: &str,
        date: &str,
    ) -> IndependentTrips {
        self.usage.record_v1();
        info!(origin = %origin, destination = %destination, date = %date, "Scatter-gather search started");

        let budget = self.timeouts.scatter();
        let flights_call = timeout::with_deadline(
            self.flights.search(origin, destination, date),
            budget,
            FLIGHT_LABEL,
        );
        let hotels_call =
            timeout::with_deadline(self.hotels.search(destination, None), budget, HOTEL_LABEL);

        let (flights, hotels) = tokio::join!(flights_call, hotels_call);

        let flights = settle("flights", flights);
        let hotels = settle("hotels", hotels);
        let degraded = flights.is_none() || hotels.is_none();

        if degraded {
            metrics::record_degraded("v1_search");
        }

        debug!(degraded, "Scatter-gather search completed");
        IndependentTrips {
            flights,
            hotels,
            degraded,
        }
    }

    /// Strict v2 search: flights and hotels are jointly required and the
    /// first failure wins. Weather is looked up only after both succeed,
    /// and only through the circuit breaker, so it can degrade but never
    /// fail the search.
    pub async fn strict_search(
        &self,
        origin: &str,
        destination: &str,
        date: &str,
    ) -> StrictTrips {
        self.usage.record_v2();
        info!(origin = %origin, destination = %destination, date = %date, "Strict search started");

        let budget = self.timeouts.strict();
        let flights_call = timeout::with_deadline(
            self.flights.search(origin, destination, date),
            budget,
            FLIGHT_LABEL,
        );
        let hotels_call =
            timeout::with_deadline(self.hotels.search(destination, None), budget, HOTEL_LABEL);

        let (flights, hotels) = match tokio::try_join!(flights_call, hotels_call) {
            Ok(pair) => pair,
            Err(error) => {
                warn!(error = %error, "Strict search failed");
                return StrictTrips::Failed {
                    error: "Trip search failed".to_string(),
                };
            }
        };

        let weather = self
            .weather_breaker
            .execute(WEATHER_LABEL, self.weather.search(destination))
            .await;

        info!("Strict search completed");
        StrictTrips::Complete {
            flights,
            hotels,
            weather,
        }
    }

    /// Chained cheapest-route lookup: fetch flights, select the cheapest,
    /// derive the late check-in flag from its arrival time, then fetch
    /// hotels with that flag. Each stage has its own deadline budget.
    pub async fn cheapest_route(
        &self,
        origin: &str,
        destination: &str,
        date: &str,
    ) -> ChainedTrip {
        info!(origin = %origin, destination = %destination, date = %date, "Cheapest-route lookup started");

        let budget = self.timeouts.chain();
        let flights = match timeout::with_deadline(
            self.flights.search(origin, destination, date),
            budget,
            FLIGHT_LABEL,
        )
        .await
        {
            Ok(flights) => flights,
            Err(error) => {
                warn!(error = %error, "Cheapest-route flight stage failed");
                return ChainedTrip::Failed {
                    error: "Trip chaining failed".to_string(),
                };
            }
        };

        let flight = match cheapest_flight(&flights) {
            Some(flight) => flight.clone(),
            None => {
                info!("No flights available for the requested route");
                return ChainedTrip::NoFlights {
                    error: "No flights available".to_string(),
                };
            }
        };

        let late_check_in = needs_late_check_in(&flight.arrival_time);
        debug!(flight = %flight.id, arrival = %flight.arrival_time, late_check_in, "Cheapest flight selected");

        let hotels = match timeout::with_deadline(
            self.hotels.search(destination, Some(late_check_in)),
            budget,
            HOTEL_LABEL,
        )
        .await
        {
            Ok(hotels) => hotels,
            Err(error) => {
                warn!(error = %error, "Cheapest-route hotel stage failed");
                return ChainedTrip::Failed {
                    error: "Trip chaining failed".to_string(),
                };
            }
        };

        match pick_hotel(&hotels) {
            Some(hotel) => ChainedTrip::Matched {
                flight,
                hotel: hotel.clone(),
            },
            None => ChainedTrip::FlightOnly {
                flight,
                hotel: None,
                note: "No hotels found".to_string(),
            },
        }
    }

    /// Branching contextual search: flights and hotels always, plus a
    /// local events lookup when the destination is coastal. The branch
    /// decision is taken once, before anything is dispatched; every
    /// scheduled call then settles independently.
    pub async fn contextual_search(
        &self,
        origin: &str,
        destination: &str,
        date: &str,
    ) -> ContextualTrips {
        let coastal = is_coastal(destination);
        info!(destination = %destination, coastal, "Contextual search started");

        let budget = self.timeouts.branch();
        let flights_call = timeout::with_deadline(
            self.flights.search(origin, destination, date),
            budget,
            FLIGHT_LABEL,
        );
        let hotels_call =
            timeout::with_deadline(self.hotels.search(destination, None), budget, HOTEL_LABEL);

        let (flights, hotels, events) = if coastal {
            let events_call =
                timeout::with_deadline(self.events.search(destination), budget, EVENT_LABEL);
            let (flights, hotels, events) = tokio::join!(flights_call, hotels_call, events_call);
            (flights, hotels, Some(events))
        } else {
            let (flights, hotels) = tokio::join!(flights_call, hotels_call);
            (flights, hotels, None)
        };

        debug!("Contextual search completed");
        ContextualTrips {
            flights: settle("flights", flights),
            hotels: settle("hotels", hotels),
            events: events.map(|outcome| settle("events", outcome)),
        }
    }

    /// Usage counters for the versioned search entry points
    pub fn usage(&self) -> UsageSnapshot {
        self.usage.snapshot()
    }

    /// Read-only view of the weather breaker
    pub async fn breaker_snapshot(&self) -> BreakerSnapshot {
        self.weather_breaker.snapshot().await
    }
}
