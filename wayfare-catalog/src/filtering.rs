use std::cmp::Ordering;
use wayfare_filters::{FlightCriteria, FlightSort, HotelCriteria, HotelSort};
use wayfare_shared::{FlightResult, HotelResult};

/// City codes that stand for several airports.
const METRO_AREAS: &[(&str, &[&str])] = &[
    ("TYO", &["NRT", "HND"]),
    ("PAR", &["CDG", "ORY"]),
    ("LON", &["LHR", "LGW"]),
    ("NYC", &["JFK", "EWR", "LGA"]),
];

fn matches_place(code: &str, wanted: &str) -> bool {
    if wanted.is_empty() || code.eq_ignore_ascii_case(wanted) {
        return true;
    }
    METRO_AREAS
        .iter()
        .find(|(metro, _)| metro.eq_ignore_ascii_case(wanted))
        .map(|(_, airports)| airports.iter().any(|airport| airport.eq_ignore_ascii_case(code)))
        .unwrap_or(false)
}

pub fn filter_hotels(hotels: &[HotelResult], criteria: &HotelCriteria) -> Vec<HotelResult> {
    let location = criteria.location.trim().to_lowercase();
    hotels
        .iter()
        .filter(|hotel| {
            location.is_empty()
                || hotel.city.to_lowercase() == location
                || hotel.country.eq_ignore_ascii_case(&location)
        })
        .filter(|hotel| hotel.has_amenities(&criteria.amenities))
        .filter(|hotel| criteria.star_rating.map_or(true, |stars| hotel.star_rating >= stars))
        .filter(|hotel| criteria.price_min.map_or(true, |min| hotel.price_per_night >= min))
        .filter(|hotel| criteria.price_max.map_or(true, |max| hotel.price_per_night <= max))
        .filter(|hotel| {
            criteria
                .property_type
                .as_deref()
                .map_or(true, |kind| hotel.property_type.eq_ignore_ascii_case(kind))
        })
        .cloned()
        .collect()
}

/// Stable sort; `Recommended` keeps the incoming order.
pub fn sort_hotels(hotels: &mut [HotelResult], sort: HotelSort) {
    match sort {
        HotelSort::Recommended => {}
        HotelSort::PriceAsc => hotels.sort_by(|a, b| total_cmp(a.price_per_night, b.price_per_night)),
        HotelSort::PriceDesc => hotels.sort_by(|a, b| total_cmp(b.price_per_night, a.price_per_night)),
        HotelSort::Rating => hotels.sort_by(|a, b| total_cmp(b.review_score, a.review_score)),
        HotelSort::Stars => hotels.sort_by(|a, b| b.star_rating.cmp(&a.star_rating)),
    }
}

pub fn filter_flights(flights: &[FlightResult], criteria: &FlightCriteria) -> Vec<FlightResult> {
    flights
        .iter()
        .filter(|flight| matches_place(&flight.from, &criteria.from))
        .filter(|flight| matches_place(&flight.to, &criteria.to))
        .filter(|flight| criteria.max_stops.map_or(true, |stops| flight.stops <= stops))
        .filter(|flight| {
            criteria.airlines.is_empty()
                || criteria.airlines.iter().any(|code| code.eq_ignore_ascii_case(&flight.airline))
        })
        .filter(|flight| criteria.max_price.map_or(true, |max| flight.price <= max))
        .filter(|flight| flight.seats_left >= criteria.adults)
        .cloned()
        .collect()
}

/// Stable sort; `Best` keeps the incoming order.
pub fn sort_flights(flights: &mut [FlightResult], sort: FlightSort) {
    match sort {
        FlightSort::Best => {}
        FlightSort::Cheapest => flights.sort_by(|a, b| total_cmp(a.price, b.price)),
        FlightSort::Fastest => flights.sort_by_key(|flight| flight.duration_minutes),
        FlightSort::Earliest => flights.sort_by_key(|flight| flight.depart_time),
    }
}

fn total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}
