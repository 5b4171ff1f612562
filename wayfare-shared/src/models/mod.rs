pub mod amenity;
pub mod flight;
pub mod hotel;

use serde::{Deserialize, Serialize};

use self::flight::FlightResult;
use self::hotel::HotelResult;

/// A search result picked by the user, carried across the navigation
/// boundary through the selection store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum SelectedResult {
    Flight(FlightResult),
    Hotel(HotelResult),
}

impl SelectedResult {
    pub fn id(&self) -> &str {
        match self {
            SelectedResult::Flight(flight) => &flight.id,
            SelectedResult::Hotel(hotel) => &hotel.id,
        }
    }

    /// Price in the reference currency: the fare for flights, one night for hotels.
    pub fn price(&self) -> f64 {
        match self {
            SelectedResult::Flight(flight) => flight.price,
            SelectedResult::Hotel(hotel) => hotel.price_per_night,
        }
    }

    pub fn as_flight(&self) -> Option<&FlightResult> {
        match self {
            SelectedResult::Flight(flight) => Some(flight),
            SelectedResult::Hotel(_) => None,
        }
    }
}
