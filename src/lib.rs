//! Client-side core of the blog admin's analytics query console: query dispatch,
//! persistent query history, chart projections and the console state machine.

pub mod api;
pub mod cache_key;
pub mod chart;
pub mod commands;
pub mod db;
pub mod error;
pub mod history;
pub mod models;
pub mod state;

use std::path::Path;
use std::sync::Arc;

pub use error::{ConsoleError, ConsoleResult, StorageError};
pub use state::{AppState, ConsoleView};

use db::{KeyValueStore, MemoryStore, SqliteStore};

/// Install the `env_logger` backend for the `log` facade. `RUST_LOG` overrides the
/// default `info` level. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Open the console with its state stored under `data_dir`.
///
/// If the database cannot be opened the console still starts, keeping everything in
/// memory for this session.
pub fn open_console(data_dir: &Path) -> AppState {
    let store: Arc<dyn KeyValueStore> = match SqliteStore::open(data_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::warn!("Failed to open console storage, state will not persist: {}", e);
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store);
    commands::migrate_legacy_history(&state);
    state
}
