pub mod codec;
pub mod flight;
pub mod hotel;
pub mod params;

pub use flight::{FlightCriteria, FlightFilters, FlightSort, TripType};
pub use hotel::{HotelCriteria, HotelFilters, HotelSort};
pub use params::{FilterDomain, FilterParamStore, FilterValue, Navigator, RecordingNavigator};
