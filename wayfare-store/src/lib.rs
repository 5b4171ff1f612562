pub mod app_config;
pub mod client_storage;
pub mod preferences;

pub use client_storage::{ClientStorage, FileStorage, MemoryStorage, Persisted, StorageError};
pub use preferences::{PreferencesPatch, PreferencesStore, UiPreferences, ViewMode};
