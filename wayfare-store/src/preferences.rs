use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use wayfare_filters::{FlightSort, HotelSort};

use crate::client_storage::{self, ClientStorage, StorageError, PREFERENCES_KEY};

pub const PREFERENCES_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Grid,
    Map,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    pub view_mode: ViewMode,
    pub hotel_sort: HotelSort,
    pub flight_sort: FlightSort,
}

/// Partial update; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesPatch {
    pub view_mode: Option<ViewMode>,
    pub hotel_sort: Option<HotelSort>,
    pub flight_sort: Option<FlightSort>,
}

impl UiPreferences {
    pub fn apply(&mut self, patch: PreferencesPatch) {
        if let Some(view_mode) = patch.view_mode {
            self.view_mode = view_mode;
        }
        if let Some(hotel_sort) = patch.hotel_sort {
            self.hotel_sort = hotel_sort;
        }
        if let Some(flight_sort) = patch.flight_sort {
            self.flight_sort = flight_sort;
        }
    }
}

/// UI preferences backed by durable client storage.
pub struct PreferencesStore {
    storage: Arc<dyn ClientStorage>,
    current: UiPreferences,
}

impl PreferencesStore {
    /// Unreadable stored preferences fall back to defaults.
    pub fn load(storage: Arc<dyn ClientStorage>) -> Self {
        let current = match client_storage::load(storage.as_ref(), PREFERENCES_KEY, PREFERENCES_VERSION) {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring stored preferences: {}", e);
                UiPreferences::default()
            }
        };
        Self { storage, current }
    }

    pub fn get(&self) -> &UiPreferences {
        &self.current
    }

    pub fn update(&mut self, patch: PreferencesPatch) -> Result<&UiPreferences, StorageError> {
        self.current.apply(patch);
        client_storage::save(
            self.storage.as_ref(),
            PREFERENCES_KEY,
            PREFERENCES_VERSION,
            &self.current,
        )?;
        Ok(&self.current)
    }
}
