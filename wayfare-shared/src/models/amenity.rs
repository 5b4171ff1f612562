use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hotel amenities. Every variant maps to exactly one icon, so adding an
/// amenity without an icon does not compile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Amenity {
    Wifi,
    Pool,
    Parking,
    Breakfast,
    Gym,
    Spa,
    AirConditioning,
    PetFriendly,
    Restaurant,
    Bar,
}

impl Amenity {
    pub const ALL: [Amenity; 10] = [
        Amenity::Wifi,
        Amenity::Pool,
        Amenity::Parking,
        Amenity::Breakfast,
        Amenity::Gym,
        Amenity::Spa,
        Amenity::AirConditioning,
        Amenity::PetFriendly,
        Amenity::Restaurant,
        Amenity::Bar,
    ];

    /// Wire name used in query strings and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Amenity::Wifi => "wifi",
            Amenity::Pool => "pool",
            Amenity::Parking => "parking",
            Amenity::Breakfast => "breakfast",
            Amenity::Gym => "gym",
            Amenity::Spa => "spa",
            Amenity::AirConditioning => "air-conditioning",
            Amenity::PetFriendly => "pet-friendly",
            Amenity::Restaurant => "restaurant",
            Amenity::Bar => "bar",
        }
    }

    /// Icon name rendered next to the amenity.
    pub fn icon(&self) -> &'static str {
        match self {
            Amenity::Wifi => "wifi",
            Amenity::Pool => "waves",
            Amenity::Parking => "car",
            Amenity::Breakfast => "coffee",
            Amenity::Gym => "dumbbell",
            Amenity::Spa => "sparkles",
            Amenity::AirConditioning => "snowflake",
            Amenity::PetFriendly => "paw-print",
            Amenity::Restaurant => "utensils",
            Amenity::Bar => "wine",
        }
    }
}

impl fmt::Display for Amenity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown amenity: {0}")]
pub struct ParseAmenityError(pub String);

impl FromStr for Amenity {
    type Err = ParseAmenityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Amenity::ALL
            .into_iter()
            .find(|amenity| amenity.as_str() == needle)
            .ok_or_else(|| ParseAmenityError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_parse_back() {
        for amenity in Amenity::ALL {
            assert_eq!(amenity.as_str().parse::<Amenity>().unwrap(), amenity);
            assert_eq!(
                serde_json::to_string(&amenity).unwrap(),
                format!("\"{}\"", amenity.as_str())
            );
        }
    }

    #[test]
    fn test_unknown_amenity_is_rejected() {
        assert_eq!(
            "jacuzzi".parse::<Amenity>(),
            Err(ParseAmenityError("jacuzzi".to_string()))
        );
        assert_eq!(" WiFi ".parse::<Amenity>().unwrap(), Amenity::Wifi);
    }

    #[test]
    fn test_icons_are_distinct() {
        let mut icons: Vec<_> = Amenity::ALL.iter().map(|a| a.icon()).collect();
        icons.sort();
        icons.dedup();
        assert_eq!(icons.len(), Amenity::ALL.len());
    }
}
