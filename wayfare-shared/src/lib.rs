pub mod models;
pub mod pii;

pub use models::amenity::{Amenity, ParseAmenityError};
pub use models::flight::{CabinClass, FlightResult};
pub use models::hotel::HotelResult;
pub use models::SelectedResult;
pub use pii::Masked;
