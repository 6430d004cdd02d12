use crate::db;
use crate::error::ConsoleResult;
use crate::models::ConsoleSettings;
use crate::state::AppState;

pub fn load_settings(state: &AppState) -> ConsoleSettings {
    state.settings()
}

/// Apply new settings and persist them. The new settings are in effect for the session
/// even if persisting fails.
pub fn save_settings(state: &AppState, settings: ConsoleSettings) -> ConsoleResult<()> {
    let result = db::save_settings(state.store.as_ref(), &settings);
    state.apply_settings(settings);

    result.map_err(|e| {
        log::warn!("Failed to persist console settings: {}", e);
        e.into()
    })
}
