use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Key of the persisted checkout drafts.
pub const DRAFTS_KEY: &str = "wayfare-checkout-drafts";
/// Key of the persisted UI preferences.
pub const PREFERENCES_KEY: &str = "wayfare-ui-preferences";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Storage I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored value for {key} is not valid: {source}")]
    Serde {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable key/value storage for client state that must survive reloads.
pub trait ClientStorage: Send + Sync {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Versioned envelope around every stored value. There are no migrations:
/// a stored version that differs from the current one is read as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persisted<T> {
    pub version: u32,
    pub state: T,
}

pub fn load<T: DeserializeOwned>(
    storage: &dyn ClientStorage,
    key: &str,
    version: u32,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = storage.get_raw(key)? else {
        return Ok(None);
    };
    let envelope: Persisted<T> = serde_json::from_str(&raw).map_err(|source| StorageError::Serde {
        key: key.to_string(),
        source,
    })?;
    if envelope.version != version {
        warn!(
            key,
            stored = envelope.version,
            current = version,
            "Stored schema version differs, reading without migration"
        );
    }
    Ok(Some(envelope.state))
}

pub fn save<T: Serialize>(
    storage: &dyn ClientStorage,
    key: &str,
    version: u32,
    state: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(&Persisted { version, state }).map_err(|source| StorageError::Serde {
        key: key.to_string(),
        source,
    })?;
    storage.set_raw(key, &raw)
}

/// Process-local storage; everything is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStorage for MemoryStorage {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        debug!(dir = %dir.display(), "Opened file storage");
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl ClientStorage for FileStorage {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("json.tmp");
        let io_error = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        // Write then rename so a crash never leaves a half-written file.
        fs::write(&staging, value).map_err(io_error)?;
        fs::rename(&staging, &path).map_err(io_error)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_memory_round_trip() {
        let storage = MemoryStorage::new();
        let sample = Sample {
            name: "grid".to_string(),
            count: 2,
        };
        save(&storage, PREFERENCES_KEY, 1, &sample).unwrap();
        assert_eq!(load::<Sample>(&storage, PREFERENCES_KEY, 1).unwrap(), Some(sample));

        storage.remove(PREFERENCES_KEY).unwrap();
        assert_eq!(load::<Sample>(&storage, PREFERENCES_KEY, 1).unwrap(), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = FileStorage::open(dir.path()).unwrap();
            storage.set_raw(DRAFTS_KEY, r#"{"version":1,"state":[]}"#).unwrap();
        }
        let storage = FileStorage::open(dir.path()).unwrap();
        assert_eq!(load::<Vec<u32>>(&storage, DRAFTS_KEY, 1).unwrap(), Some(vec![]));
        assert!(dir.path().join("wayfare-checkout-drafts.json").exists());

        storage.remove(DRAFTS_KEY).unwrap();
        storage.remove(DRAFTS_KEY).unwrap();
        assert_eq!(storage.get_raw(DRAFTS_KEY).unwrap(), None);
    }

    #[test]
    fn test_other_version_is_still_read() {
        let storage = MemoryStorage::new();
        storage
            .set_raw(PREFERENCES_KEY, r#"{"version":7,"state":{"name":"map","count":1}}"#)
            .unwrap();
        let loaded = load::<Sample>(&storage, PREFERENCES_KEY, 1).unwrap();
        assert_eq!(loaded.map(|s| s.name), Some("map".to_string()));
    }

    #[test]
    fn test_corrupt_value_and_bad_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set_raw(PREFERENCES_KEY, "{oops").unwrap();
        assert!(matches!(
            load::<Sample>(&storage, PREFERENCES_KEY, 1),
            Err(StorageError::Serde { .. })
        ));
        assert!(matches!(
            storage.get_raw("../etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
