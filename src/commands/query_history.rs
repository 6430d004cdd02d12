use crate::history::HISTORY_LIMIT;
use crate::models::{PreviousQueryEntry, QueryResult};
use crate::state::{AppState, ConsoleView};

/// Load query history entries with optional filtering
pub fn load_query_history(
    state: &AppState,
    search: Option<&str>,
    limit: Option<usize>,
    offset: Option<usize>,
) -> Vec<PreviousQueryEntry> {
    let history = state.history();
    let entries = history
        .search(search.unwrap_or_default())
        .into_iter()
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(HISTORY_LIMIT))
        .cloned()
        .collect();
    entries
}

/// Delete a single history entry by its exact query text
pub fn delete_query_history_entry(state: &AppState, query: &str) -> bool {
    state.history().remove(query)
}

/// Clear all query history
pub fn clear_query_history(state: &AppState) {
    state.history().clear();
}

/// Import the legacy saved-queries blob, at most once per session
pub fn migrate_legacy_history(state: &AppState) -> usize {
    state.history().migrate_legacy()
}

/// Result recorded when the query first ran
pub fn get_query_history_result(state: &AppState, query: &str) -> Option<QueryResult> {
    state
        .history()
        .find(query)
        .and_then(|entry| entry.query_result.clone())
}

/// Put a history entry's query into the draft without running it
pub fn load_history_entry(state: &AppState, query: &str) -> Option<ConsoleView> {
    let text = state.history().find(query)?.query.clone();
    state.console().draft = text;
    Some(state.view())
}
