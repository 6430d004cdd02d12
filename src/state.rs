use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::{HttpTransport, QueryDispatcher, Transport, UnavailableTransport};
use crate::cache_key::CacheKey;
use crate::chart;
use crate::db::{self, KeyValueStore};
use crate::error::ConsoleError;
use crate::history::HistoryStore;
use crate::models::{ChartKind, ChartView, ConsoleSettings, QueryResult};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConsolePhase {
    /// Nothing has been submitted
    Idle,
    /// The active query has a request in flight
    Submitting,
    /// The active query has a result or a fault
    Settled,
}

/// How a dispatched query ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The server produced a result, possibly carrying a query-level error
    Result(QueryResult),
    /// The request failed before a result could be produced
    Fault { status: Option<u16>, message: String },
}

impl From<Result<QueryResult, ConsoleError>> for Outcome {
    fn from(result: Result<QueryResult, ConsoleError>) -> Self {
        match result {
            Ok(result) => Outcome::Result(result),
            Err(e) => Outcome::Fault {
                status: e.status(),
                message: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Server fault (5xx)
    Critical,
    /// Other request or network failure
    Warning,
    /// The server rejected the query itself
    Notice,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Banner {
    pub severity: Severity,
    pub message: String,
}

impl Banner {
    fn for_outcome(outcome: &Outcome) -> Option<Banner> {
        match outcome {
            Outcome::Result(result) => result.error.as_ref().map(|message| Banner {
                severity: Severity::Notice,
                message: message.clone(),
            }),
            Outcome::Fault { status, message } => Some(Banner {
                severity: match status {
                    Some(status) if *status >= 500 => Severity::Critical,
                    _ => Severity::Warning,
                },
                message: message.clone(),
            }),
        }
    }
}

/// Everything the host needs to render the console, derived from `ConsoleState`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleView {
    pub phase: ConsolePhase,
    pub active_query: Option<String>,
    pub draft: String,
    pub result: Option<QueryResult>,
    pub comparison: Option<QueryResult>,
    pub banner: Option<Banner>,
    pub chartable: bool,
    pub chart_kind: ChartKind,
    pub chart: Option<ChartView>,
}

/// Draft text, active query and the outcomes of every dispatched query, by key
#[derive(Debug, Default)]
pub struct ConsoleState {
    pub draft: String,
    pub active: Option<CacheKey>,
    pub comparison: Option<CacheKey>,
    pub chart_kind: ChartKind,
    in_flight: HashMap<CacheKey, usize>,
    outcomes: HashMap<CacheKey, Outcome>,
}

impl ConsoleState {
    pub fn new(active_query: Option<String>, chart_kind: ChartKind) -> Self {
        Self {
            draft: active_query.clone().unwrap_or_default(),
            active: active_query.map(CacheKey::main),
            chart_kind,
            ..Self::default()
        }
    }

    pub fn begin(&mut self, key: &CacheKey) {
        *self.in_flight.entry(key.clone()).or_insert(0) += 1;
    }

    /// Store the outcome under its key. Later completions for the same key replace
    /// earlier ones. Only the active and comparison outcomes are kept once settled.
    pub fn finish(&mut self, key: &CacheKey, outcome: Outcome) {
        if let Some(count) = self.in_flight.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                self.in_flight.remove(key);
            }
        }
        self.outcomes.insert(key.clone(), outcome);
        self.prune();
    }

    /// Drop outcomes that can no longer be displayed
    fn prune(&mut self) {
        let active = self.active.as_ref();
        let comparison = self.comparison.as_ref();
        let in_flight = &self.in_flight;
        self.outcomes.retain(|key, _| {
            Some(key) == active || Some(key) == comparison || in_flight.contains_key(key)
        });
    }

    pub fn is_in_flight(&self, key: &CacheKey) -> bool {
        self.in_flight.contains_key(key)
    }

    pub fn outcome(&self, key: &CacheKey) -> Option<&Outcome> {
        self.outcomes.get(key)
    }

    pub fn phase(&self) -> ConsolePhase {
        match &self.active {
            None => ConsolePhase::Idle,
            Some(key) if self.is_in_flight(key) => ConsolePhase::Submitting,
            Some(key) if self.outcomes.contains_key(key) => ConsolePhase::Settled,
            // restored from storage but not yet run in this session
            Some(_) => ConsolePhase::Idle,
        }
    }

    /// Result currently on display, if the active query has settled with one
    pub fn displayed_result(&self) -> Option<&QueryResult> {
        if self.phase() != ConsolePhase::Settled {
            return None;
        }
        match self.active.as_ref().and_then(|key| self.outcomes.get(key)) {
            Some(Outcome::Result(result)) => Some(result),
            _ => None,
        }
    }

    pub fn view(&self, palette: &[String]) -> ConsoleView {
        let phase = self.phase();
        let settled = match (&self.active, phase) {
            (Some(key), ConsolePhase::Settled) => self.outcomes.get(key),
            _ => None,
        };

        let result = match settled {
            Some(Outcome::Result(result)) => Some(result.clone()),
            _ => None,
        };
        let comparison = self
            .comparison
            .as_ref()
            .filter(|key| !self.is_in_flight(key))
            .and_then(|key| match self.outcomes.get(key) {
                Some(Outcome::Result(result)) => Some(result.clone()),
                _ => None,
            });

        let chartable = result
            .as_ref()
            .map(|r| chart::is_chartable(&r.rows))
            .unwrap_or(false);
        let chart = result
            .as_ref()
            .and_then(|r| chart::project(r, self.chart_kind, palette));

        ConsoleView {
            phase,
            active_query: self.active.as_ref().map(|key| key.query().to_string()),
            draft: self.draft.clone(),
            result,
            comparison,
            banner: settled.and_then(Banner::for_outcome),
            chartable,
            chart_kind: self.chart_kind,
            chart,
        }
    }
}

/// Shared console state handed to every command
pub struct AppState {
    /// Persistent key-value storage for history, active query and settings
    pub store: Arc<dyn KeyValueStore>,

    /// Query history, loaded once and written through on change
    pub history: Mutex<HistoryStore>,

    /// Draft, active query and per-key outcomes
    pub console: Mutex<ConsoleState>,

    settings: Mutex<ConsoleSettings>,
    dispatcher: Mutex<QueryDispatcher>,
    transport_override: Option<Arc<dyn Transport>>,
}

impl AppState {
    /// Console talking to the real API through `reqwest`
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::build(store, None)
    }

    /// Console sending its requests through the given transport
    pub fn with_transport(store: Arc<dyn KeyValueStore>, transport: Arc<dyn Transport>) -> Self {
        Self::build(store, Some(transport))
    }

    fn build(store: Arc<dyn KeyValueStore>, transport_override: Option<Arc<dyn Transport>>) -> Self {
        let settings = db::load_settings(store.as_ref()).unwrap_or_else(|e| {
            log::warn!("Failed to load console settings, using defaults: {}", e);
            ConsoleSettings::default()
        });
        let active_query = db::load_active_query(store.as_ref()).unwrap_or_else(|e| {
            log::warn!("Failed to restore the active query: {}", e);
            None
        });

        let dispatcher = build_dispatcher(&settings, transport_override.as_ref());
        let history = HistoryStore::load(store.clone());
        let console = ConsoleState::new(active_query, settings.default_chart);

        log::info!(
            "Query console ready against {} ({} history entries)",
            dispatcher.api_base(),
            history.len()
        );

        Self {
            store,
            history: Mutex::new(history),
            console: Mutex::new(console),
            settings: Mutex::new(settings),
            dispatcher: Mutex::new(dispatcher),
            transport_override,
        }
    }

    pub fn console(&self) -> MutexGuard<'_, ConsoleState> {
        lock(&self.console)
    }

    pub fn history(&self) -> MutexGuard<'_, HistoryStore> {
        lock(&self.history)
    }

    pub fn settings(&self) -> ConsoleSettings {
        lock(&self.settings).clone()
    }

    /// Replace the settings in memory and point the dispatcher at the new API
    pub fn apply_settings(&self, settings: ConsoleSettings) {
        *lock(&self.dispatcher) = build_dispatcher(&settings, self.transport_override.as_ref());
        *lock(&self.settings) = settings;
    }

    /// Snapshot of the dispatcher, so no lock is held while a request is awaited
    pub fn dispatcher(&self) -> QueryDispatcher {
        lock(&self.dispatcher).clone()
    }

    /// Render the current console state
    pub fn view(&self) -> ConsoleView {
        let palette = lock(&self.settings).chart_palette.clone();
        self.console().view(&palette)
    }
}

fn build_dispatcher(
    settings: &ConsoleSettings,
    transport_override: Option<&Arc<dyn Transport>>,
) -> QueryDispatcher {
    let transport: Arc<dyn Transport> = match transport_override {
        Some(transport) => transport.clone(),
        None => match HttpTransport::new(settings.api_token.clone()) {
            Ok(transport) => Arc::new(transport),
            Err(e) => {
                log::error!("HTTP transport unavailable, queries will fail: {}", e);
                Arc::new(UnavailableTransport::new(e.to_string()))
            }
        },
    };
    QueryDispatcher::new(&settings.api_base, transport)
}

/// A panic while a guard was held leaves plain data behind; keep using it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
