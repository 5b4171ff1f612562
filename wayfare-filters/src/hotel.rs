use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;
use wayfare_core::QueryParams;
use wayfare_shared::Amenity;

use crate::codec::{self, wire_enum};
use crate::params::FilterDomain;

pub const DEFAULT_GUESTS: u32 = 2;
pub const DEFAULT_ROOMS: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HotelSort {
    #[default]
    Recommended,
    PriceAsc,
    PriceDesc,
    Rating,
    Stars,
}

wire_enum!(HotelSort, "hotel sort", {
    Recommended => "recommended",
    PriceAsc => "price-asc",
    PriceDesc => "price-desc",
    Rating => "rating",
    Stars => "stars",
});

/// Typed view of the hotel search query string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelCriteria {
    pub location: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: u32,
    pub rooms: u32,
    pub sort: HotelSort,
    pub amenities: Vec<Amenity>,
    pub star_rating: Option<u8>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub property_type: Option<String>,
}

impl Default for HotelCriteria {
    fn default() -> Self {
        Self {
            location: String::new(),
            check_in: None,
            check_out: None,
            guests: DEFAULT_GUESTS,
            rooms: DEFAULT_ROOMS,
            sort: HotelSort::default(),
            amenities: Vec::new(),
            star_rating: None,
            price_min: None,
            price_max: None,
            property_type: None,
        }
    }
}

impl HotelCriteria {
    pub fn from_query(params: &QueryParams) -> Self {
        let check_in = codec::read_date(params, "checkIn");
        let mut check_out = codec::read_date(params, "checkOut");
        if let (Some(arrive), Some(leave)) = (check_in, check_out) {
            if leave <= arrive {
                warn!("Dropping checkOut {} not after checkIn {}", leave, arrive);
                check_out = None;
            }
        }

        let star_rating = codec::read_parsed::<u8>(params, "starRating").map(|stars| stars.clamp(1, 5));

        let mut price_min = codec::read_parsed::<f64>(params, "priceMin").filter(|p| p.is_finite());
        let mut price_max = codec::read_parsed::<f64>(params, "priceMax").filter(|p| p.is_finite());
        if let (Some(min), Some(max)) = (price_min, price_max) {
            if min > max {
                price_min = Some(max);
                price_max = Some(min);
            }
        }

        let mut seen = HashSet::new();
        let mut amenities: Vec<Amenity> = codec::read_list(params, "amenities");
        amenities.retain(|amenity| seen.insert(*amenity));

        Self {
            location: codec::read_text(params, "location"),
            check_in,
            check_out,
            guests: codec::read_count(params, "guests", DEFAULT_GUESTS),
            rooms: codec::read_count(params, "rooms", DEFAULT_ROOMS),
            sort: codec::read_or_default(params, "sort"),
            amenities,
            star_rating,
            price_min,
            price_max,
            property_type: codec::read_optional_text(params, "propertyType"),
        }
    }

    /// Essential fields are always written; optional ones only when set.
    pub fn to_query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if !self.location.is_empty() {
            params.set("location", self.location.as_str());
        }
        codec::write_date(&mut params, "checkIn", self.check_in);
        codec::write_date(&mut params, "checkOut", self.check_out);
        params.set("guests", self.guests.to_string());
        params.set("rooms", self.rooms.to_string());
        if self.sort != HotelSort::default() {
            params.set("sort", self.sort.as_str());
        }
        codec::write_list(&mut params, "amenities", &self.amenities);
        if let Some(stars) = self.star_rating {
            params.set("starRating", stars.to_string());
        }
        if let Some(min) = self.price_min {
            params.set("priceMin", min.to_string());
        }
        if let Some(max) = self.price_max {
            params.set("priceMax", max.to_string());
        }
        if let Some(property_type) = &self.property_type {
            params.set("propertyType", property_type.as_str());
        }
        params
    }

    /// Nights between check-in and check-out, at least one.
    pub fn nights(&self) -> u32 {
        match (self.check_in, self.check_out) {
            (Some(arrive), Some(leave)) => (leave - arrive).num_days().max(1) as u32,
            _ => 1,
        }
    }
}

/// Hotel search namespace.
pub struct HotelFilters;

impl FilterDomain for HotelFilters {
    type Criteria = HotelCriteria;

    const NAME: &'static str = "hotels";
    const ESSENTIAL_KEYS: &'static [&'static str] =
        &["location", "checkIn", "checkOut", "guests", "rooms"];

    fn essential_defaults(params: &QueryParams) -> Vec<(&'static str, String)> {
        let mut defaults = Vec::new();
        let next_day = codec::read_date(params, "checkIn").and_then(|date| date.checked_add_days(Days::new(1)));
        if let Some(check_out) = next_day {
            defaults.push(("checkOut", check_out.format(codec::DATE_FORMAT).to_string()));
        }
        defaults.push(("guests", DEFAULT_GUESTS.to_string()));
        defaults.push(("rooms", DEFAULT_ROOMS.to_string()));
        defaults
    }

    fn decode(params: &QueryParams) -> HotelCriteria {
        HotelCriteria::from_query(params)
    }
}
