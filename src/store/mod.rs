//! Typed persistence over a key-value backend.
//!
//! One logical collection per record kind, each a JSON array under its own key.
//! `load` never fails: a missing key or a value that no longer deserializes
//! yields the caller's default. `save` failures are logged and dropped. There is
//! no versioning; a shape change is not reconciled against stored data.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

/// Prefix shared by every key this application writes.
pub const KEY_PREFIX: &str = "farmstead_";

pub const ANIMALS_KEY: &str = "farmstead_animals";
pub const USERS_KEY: &str = "farmstead_users";
pub const TASKS_KEY: &str = "farmstead_tasks";
pub const FEED_KEY: &str = "farmstead_feed";
pub const HEALTH_KEY: &str = "farmstead_health";
pub const FINANCE_KEY: &str = "farmstead_finance";

/// The six collection keys, in load order.
pub const COLLECTION_KEYS: [&str; 6] = [
    ANIMALS_KEY,
    USERS_KEY,
    TASKS_KEY,
    FEED_KEY,
    HEALTH_KEY,
    FINANCE_KEY,
];

/// Raw string storage. No transactions.
pub trait KvBackend: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Store adapter used by `FarmState`.
pub struct PersistentStore {
    backend: Box<dyn KvBackend>,
}

impl PersistentStore {
    pub fn new(backend: impl KvBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Ephemeral store, nothing survives the process.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    /// Whether anything is stored under `key`.
    ///
    /// A backend error is returned rather than read as absent, so callers
    /// never mistake an unreadable collection for a missing one.
    pub fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.backend.get(key)?.is_some())
    }

    /// Deserialize the value under `key`, or return `default` unmodified.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                log::warn!("Failed to read '{}' from store: {}. Using default.", key, e);
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Stored value for '{}' is corrupt: {}. Using default.", key, e);
                default
            }
        }
    }

    /// Serialize `value` and overwrite whatever is under `key`.
    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        if let Err(e) = self.try_save(key, value) {
            log::error!("Failed to save '{}': {}", key, e);
        }
    }

    fn try_save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, &json)
    }

    /// Remove every key this application manages. Factory reset only.
    pub fn clear(&mut self) {
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                log::error!("Failed to list store keys for reset: {}", e);
                return;
            }
        };

        let mut removed = 0usize;
        for key in keys.iter().filter(|k| k.starts_with(KEY_PREFIX)) {
            match self.backend.remove(key) {
                Ok(()) => removed += 1,
                Err(e) => log::error!("Failed to remove '{}': {}", key, e),
            }
        }
        log::info!("Store cleared ({} keys removed)", removed);
    }
}
