use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;
use wayfare_filters::{FlightCriteria, HotelCriteria};
use wayfare_shared::SelectedResult;

/// Search criteria that were active when a result was picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", content = "criteria", rename_all = "snake_case")]
pub enum SelectionCriteria {
    Hotels(HotelCriteria),
    Flights(FlightCriteria),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub id: Uuid,
    pub result: SelectedResult,
    pub criteria: SelectionCriteria,
    pub created_at: DateTime<Utc>,
}

/// Hands a picked result from the results page to the detail and checkout
/// pages under an opaque id.
#[derive(Debug, Default)]
pub struct SelectionStore {
    entries: HashMap<Uuid, SelectionEntry>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, result: SelectedResult, criteria: SelectionCriteria) -> Uuid {
        let id = Uuid::new_v4();
        debug!(%id, result_id = result.id(), "Selection stored");
        self.entries.insert(
            id,
            SelectionEntry {
                id,
                result,
                criteria,
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<&SelectionEntry> {
        self.entries.get(id)
    }

    /// Remove and return a selection.
    pub fn take(&mut self, id: &Uuid) -> Option<SelectionEntry> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafts::{CheckoutDraftStore, CheckoutError};
    use chrono::NaiveTime;
    use wayfare_core::{CurrencyCode, CurrencyConverter};
    use wayfare_shared::{CabinClass, FlightResult, HotelResult};

    fn flight() -> FlightResult {
        FlightResult {
            id: "FL-001".to_string(),
            airline: "Air France".to_string(),
            flight_number: "AF275".to_string(),
            from: "NRT".to_string(),
            to: "CDG".to_string(),
            depart_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            arrive_time: NaiveTime::from_hms_opt(17, 5, 0).unwrap(),
            duration_minutes: 855,
            stops: 0,
            price: 152000.0,
            cabin: CabinClass::Economy,
            seats_left: 9,
        }
    }

    fn hotel() -> HotelResult {
        HotelResult {
            id: "PAR-01".to_string(),
            name: "Hôtel Lumière".to_string(),
            city: "Paris".to_string(),
            country: "FR".to_string(),
            star_rating: 4,
            review_score: 8.7,
            price_per_night: 28000.0,
            amenities: vec![],
            property_type: "hotel".to_string(),
        }
    }

    #[test]
    fn test_create_get_take() {
        let mut store = SelectionStore::new();
        let criteria = SelectionCriteria::Hotels(HotelCriteria {
            location: "Paris".to_string(),
            ..Default::default()
        });
        let id = store.create(SelectedResult::Hotel(hotel()), criteria.clone());

        let entry = store.get(&id).unwrap();
        assert_eq!(entry.result.id(), "PAR-01");
        assert_eq!(entry.criteria, criteria);

        assert!(store.take(&id).is_some());
        assert!(store.take(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = SelectionStore::new();
        let criteria = SelectionCriteria::Flights(FlightCriteria::default());
        let a = store.create(SelectedResult::Flight(flight()), criteria.clone());
        let b = store.create(SelectedResult::Flight(flight()), criteria);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_flight_selection_starts_a_draft() {
        let mut selections = SelectionStore::new();
        let mut drafts = CheckoutDraftStore::default();
        let converter = CurrencyConverter::default();

        let id = selections.create(
            SelectedResult::Flight(flight()),
            SelectionCriteria::Flights(FlightCriteria::default()),
        );
        let entry = selections.get(&id).unwrap();
        assert!(drafts.init_from_selection(entry, &converter).unwrap());
        assert!(!drafts.init_from_selection(entry, &converter).unwrap());

        let draft = drafts.get(&id).unwrap();
        assert_eq!(draft.pricing.base_fare.amount, 152000.0);
        assert_eq!(draft.pricing.base_fare.currency, CurrencyCode::JPY);
    }

    #[test]
    fn test_hotel_selection_cannot_start_a_draft() {
        let mut selections = SelectionStore::new();
        let mut drafts = CheckoutDraftStore::default();
        let id = selections.create(
            SelectedResult::Hotel(hotel()),
            SelectionCriteria::Hotels(HotelCriteria::default()),
        );
        let result = drafts.init_from_selection(selections.get(&id).unwrap(), &CurrencyConverter::default());
        assert!(matches!(result, Err(CheckoutError::NotAFlight)));
    }
}
