use crate::cache_key::{CacheKey, MAIN_NAMESPACE};
use crate::db;
use crate::state::{AppState, ConsoleView, Outcome};

/// Replace the draft text. The active query is left alone.
pub fn set_draft(state: &AppState, text: String) -> ConsoleView {
    state.console().draft = text;
    state.view()
}

/// Current console state for rendering
pub fn console_view(state: &AppState) -> ConsoleView {
    state.view()
}

/// Submit whatever is in the draft
pub async fn submit_draft(state: &AppState) -> ConsoleView {
    let draft = state.console().draft.clone();
    submit_query(state, draft).await
}

/// Make `query` the active query, run it and record it in history.
///
/// Faults never escape: they end up in the view's banner and the console stays usable.
pub async fn submit_query(state: &AppState, query: String) -> ConsoleView {
    if query.trim().is_empty() {
        return state.view();
    }

    let key = CacheKey::main(query.clone());
    activate(state, &key, None);

    let dispatcher = state.dispatcher();
    let outcome = Outcome::from(dispatcher.execute(&query).await);
    settle(state, &key, outcome);

    state.view()
}

/// Run `query` together with a previous-period variant. Both requests are in flight at
/// once; only the main query is recorded in history. A blank variant runs `query` alone.
pub async fn submit_with_comparison(
    state: &AppState,
    query: String,
    previous_query: String,
) -> ConsoleView {
    if query.trim().is_empty() {
        return state.view();
    }
    if previous_query.trim().is_empty() {
        return submit_query(state, query).await;
    }

    let key = CacheKey::main(query.clone());
    let previous_key = CacheKey::previous(previous_query.clone());
    activate(state, &key, Some(&previous_key));

    let dispatcher = state.dispatcher();
    let (main, previous) = futures::join!(
        dispatcher.execute(&query),
        dispatcher.execute(&previous_query)
    );

    settle(state, &previous_key, Outcome::from(previous));
    settle(state, &key, Outcome::from(main));

    state.view()
}

fn activate(state: &AppState, key: &CacheKey, comparison: Option<&CacheKey>) {
    {
        let mut console = state.console();
        console.active = Some(key.clone());
        console.comparison = comparison.cloned();
        console.begin(key);
        if let Some(comparison) = comparison {
            console.begin(comparison);
        }
    }

    if let Err(e) = db::save_active_query(state.store.as_ref(), key.query()) {
        log::warn!("Failed to persist the active query: {}", e);
    }
}

/// Store an outcome under its key and record successful main queries in history.
/// Outcomes for keys that are no longer active are discarded.
fn settle(state: &AppState, key: &CacheKey, outcome: Outcome) {
    match &outcome {
        Outcome::Result(result) if !result.is_error() => {
            if key.namespace() == Some(MAIN_NAMESPACE) {
                state.history().record(key.query(), Some(result.clone()));
            }
        }
        Outcome::Result(result) => {
            log::info!(
                "Query rejected by server: {}",
                result.error.as_deref().unwrap_or_default()
            );
        }
        Outcome::Fault { message, .. } => {
            log::error!("Query request failed: {}", message);
        }
    }

    let mut console = state.console();
    if console.active.as_ref() != Some(key) && console.comparison.as_ref() != Some(key) {
        log::debug!("Late response for superseded query, discarded: {}", key);
    }
    console.finish(key, outcome);
}
