use serde::de::DeserializeOwned;
use wayfare_shared::{FlightResult, HotelResult};

const FLIGHTS_JSON: &str = include_str!("../data/flights.json");
const HOTELS_JSON: &str = include_str!("../data/hotels.json");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to parse {name} dataset: {source}")]
    InvalidDataset {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Static search inventory. Prices are in the reference currency.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub flights: Vec<FlightResult>,
    pub hotels: Vec<HotelResult>,
}

impl Dataset {
    /// The inventory bundled with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(FLIGHTS_JSON, HOTELS_JSON)
    }

    pub fn from_json(flights: &str, hotels: &str) -> Result<Self, CatalogError> {
        Ok(Self {
            flights: parse("flights", flights)?,
            hotels: parse("hotels", hotels)?,
        })
    }
}

fn parse<T: DeserializeOwned>(name: &'static str, json: &str) -> Result<Vec<T>, CatalogError> {
    serde_json::from_str(json).map_err(|source| CatalogError::InvalidDataset { name, source })
}
