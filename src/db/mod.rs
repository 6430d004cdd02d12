pub mod memory;
pub mod sqlite;

use crate::error::StorageResult;
use crate::models::ConsoleSettings;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persisted string state shared by the history store and the console.
///
/// Writes are whole-value replacements; there is no cross-process coordination, the last
/// writer wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

pub const ACTIVE_QUERY_KEY: &str = "active-query";
pub const SETTINGS_KEY: &str = "console-settings";

/// Load console settings, returns default if none are stored or they no longer parse
pub fn load_settings(store: &dyn KeyValueStore) -> StorageResult<ConsoleSettings> {
    match store.get(SETTINGS_KEY)? {
        Some(json) => match serde_json::from_str(&json) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                log::warn!("Stored console settings are invalid, using defaults: {}", e);
                Ok(ConsoleSettings::default())
            }
        },
        None => Ok(ConsoleSettings::default()),
    }
}

pub fn save_settings(store: &dyn KeyValueStore, settings: &ConsoleSettings) -> StorageResult<()> {
    let json = serde_json::to_string(settings)?;
    store.set(SETTINGS_KEY, &json)
}

pub fn load_active_query(store: &dyn KeyValueStore) -> StorageResult<Option<String>> {
    store.get(ACTIVE_QUERY_KEY)
}

pub fn save_active_query(store: &dyn KeyValueStore, query: &str) -> StorageResult<()> {
    store.set(ACTIVE_QUERY_KEY, query)
}
