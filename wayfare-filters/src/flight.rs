use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use wayfare_core::QueryParams;

use crate::codec::{self, wire_enum};
use crate::params::FilterDomain;

pub const DEFAULT_ADULTS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

wire_enum!(TripType, "trip type", {
    OneWay => "one-way",
    RoundTrip => "round-trip",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlightSort {
    #[default]
    Best,
    Cheapest,
    Fastest,
    Earliest,
}

wire_enum!(FlightSort, "flight sort", {
    Best => "best",
    Cheapest => "cheapest",
    Fastest => "fastest",
    Earliest => "earliest",
});

/// Typed view of the flight search query string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightCriteria {
    /// Airport or city code
    pub from: String,
    pub to: String,
    pub depart: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub trip_type: TripType,
    pub sort_by: FlightSort,
    pub max_stops: Option<u8>,
    pub airlines: Vec<String>,
    pub max_price: Option<f64>,
}

impl Default for FlightCriteria {
    fn default() -> Self {
        Self {
            from: String::new(),
            to: String::new(),
            depart: None,
            return_date: None,
            adults: DEFAULT_ADULTS,
            trip_type: TripType::OneWay,
            sort_by: FlightSort::default(),
            max_stops: None,
            airlines: Vec::new(),
            max_price: None,
        }
    }
}

impl FlightCriteria {
    pub fn from_query(params: &QueryParams) -> Self {
        let depart = codec::read_date(params, "depart");
        let mut return_date = codec::read_date(params, "return");

        // Without an explicit trip type the presence of a return date decides.
        let trip_type = codec::read_parsed::<TripType>(params, "type").unwrap_or(if return_date.is_some() {
            TripType::RoundTrip
        } else {
            TripType::OneWay
        });

        if trip_type == TripType::OneWay {
            return_date = None;
        }
        if let (Some(out), Some(back)) = (depart, return_date) {
            if back < out {
                warn!("Dropping return {} before depart {}", back, out);
                return_date = None;
            }
        }

        Self {
            from: codec::read_text(params, "from").to_ascii_uppercase(),
            to: codec::read_text(params, "to").to_ascii_uppercase(),
            depart,
            return_date,
            adults: codec::read_count(params, "adults", DEFAULT_ADULTS),
            trip_type,
            sort_by: codec::read_or_default(params, "sortBy"),
            max_stops: codec::read_parsed(params, "maxStops"),
            airlines: codec::read_list::<String>(params, "airlines")
                .into_iter()
                .map(|code| code.to_ascii_uppercase())
                .collect(),
            max_price: codec::read_parsed::<f64>(params, "maxPrice").filter(|p| p.is_finite() && *p >= 0.0),
        }
    }

    pub fn to_query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if !self.from.is_empty() {
            params.set("from", self.from.as_str());
        }
        if !self.to.is_empty() {
            params.set("to", self.to.as_str());
        }
        codec::write_date(&mut params, "depart", self.depart);
        if self.trip_type == TripType::RoundTrip {
            codec::write_date(&mut params, "return", self.return_date);
        }
        params.set("adults", self.adults.to_string());
        params.set("type", self.trip_type.as_str());
        if self.sort_by != FlightSort::default() {
            params.set("sortBy", self.sort_by.as_str());
        }
        if let Some(stops) = self.max_stops {
            params.set("maxStops", stops.to_string());
        }
        codec::write_list(&mut params, "airlines", &self.airlines);
        if let Some(price) = self.max_price {
            params.set("maxPrice", price.to_string());
        }
        params
    }
}

/// Flight search namespace.
pub struct FlightFilters;

impl FilterDomain for FlightFilters {
    type Criteria = FlightCriteria;

    const NAME: &'static str = "flights";
    const ESSENTIAL_KEYS: &'static [&'static str] = &["from", "to", "depart", "return", "adults"];

    fn essential_defaults(_params: &QueryParams) -> Vec<(&'static str, String)> {
        vec![("adults", DEFAULT_ADULTS.to_string())]
    }

    fn decode(params: &QueryParams) -> FlightCriteria {
        FlightCriteria::from_query(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{FilterParamStore, FilterValue, RecordingNavigator};

    #[test]
    fn test_decode_round_trip_query() {
        let params = QueryParams::parse(
            "from=nrt&to=cdg&depart=2025-05-01&return=2025-05-10&adults=2&sortBy=cheapest&maxStops=1&airlines=af%2Cjl",
        );
        let criteria = FlightCriteria::from_query(&params);

        assert_eq!(criteria.from, "NRT");
        assert_eq!(criteria.to, "CDG");
        assert_eq!(criteria.trip_type, TripType::RoundTrip);
        assert_eq!(criteria.return_date, NaiveDate::from_ymd_opt(2025, 5, 10));
        assert_eq!(criteria.adults, 2);
        assert_eq!(criteria.sort_by, FlightSort::Cheapest);
        assert_eq!(criteria.max_stops, Some(1));
        assert_eq!(criteria.airlines, vec!["AF".to_string(), "JL".to_string()]);
    }

    #[test]
    fn test_one_way_drops_return() {
        let params = QueryParams::parse("from=HND&to=SIN&depart=2025-05-01&return=2025-05-10&type=one-way");
        let criteria = FlightCriteria::from_query(&params);
        assert_eq!(criteria.trip_type, TripType::OneWay);
        assert_eq!(criteria.return_date, None);
        assert!(!criteria.to_query().contains_key("return"));
    }

    #[test]
    fn test_return_before_depart_is_dropped() {
        let params = QueryParams::parse("depart=2025-05-10&return=2025-05-01&type=round-trip&adults=0");
        let criteria = FlightCriteria::from_query(&params);
        assert_eq!(criteria.return_date, None);
        assert_eq!(criteria.adults, 1);
    }

    #[test]
    fn test_reset_all_keeps_route_dates_and_pax() {
        let mut filters: FilterParamStore<FlightFilters, RecordingNavigator> = FilterParamStore::new(
            "/en/flights/search",
            QueryParams::parse("from=NRT&to=CDG&depart=2025-05-01&sortBy=fastest&maxStops=0"),
            RecordingNavigator::default(),
        );
        filters.update_filter("airlines", vec!["AF", "JL"]);
        filters.reset_all_filters();

        assert_eq!(
            filters.params().to_query_string(),
            "from=NRT&to=CDG&depart=2025-05-01&adults=1"
        );
        assert_eq!(filters.get_filter_value("sortBy", "best"), FilterValue::Text("best".to_string()));
        assert_eq!(
            filters.navigator().current(),
            Some("/en/flights/search?from=NRT&to=CDG&depart=2025-05-01&tab=flights&adults=1")
        );
        assert_eq!(filters.criteria().sort_by, FlightSort::Best);
    }
}
