use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

/// One flight option as returned by search. Schedules are date-agnostic:
/// the departure date comes from the search criteria.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightResult {
    pub id: String,
    pub airline: String,
    pub flight_number: String,
    /// IATA airport code
    pub from: String,
    pub to: String,
    pub depart_time: NaiveTime,
    pub arrive_time: NaiveTime,
    pub duration_minutes: u32,
    pub stops: u8,
    /// Fare in the reference currency
    pub price: f64,
    pub cabin: CabinClass,
    pub seats_left: u32,
}

impl FlightResult {
    pub fn is_direct(&self) -> bool {
        self.stops == 0
    }
}
