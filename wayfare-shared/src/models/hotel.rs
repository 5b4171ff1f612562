use serde::{Deserialize, Serialize};

use super::amenity::Amenity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelResult {
    pub id: String,
    pub name: String,
    pub city: String,
    /// ISO 3166-1 alpha-2
    pub country: String,
    pub star_rating: u8,
    pub review_score: f64,
    /// Nightly rate in the reference currency
    pub price_per_night: f64,
    pub amenities: Vec<Amenity>,
    pub property_type: String,
}

impl HotelResult {
    pub fn has_amenities(&self, wanted: &[Amenity]) -> bool {
        wanted.iter().all(|amenity| self.amenities.contains(amenity))
    }
}
