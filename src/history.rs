use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::db::KeyValueStore;
use crate::error::StorageResult;
use crate::models::{PreviousQueryEntry, QueryResult};

pub const HISTORY_KEY: &str = "previous-queries";
pub const LEGACY_KEY: &str = "saved-queries";
pub const HISTORY_LIMIT: usize = 50;

const LEGACY_SEPARATOR: &str = "\n\n";

/// Trim and collapse whitespace runs to a single space.
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Bounded, most-recent-first history of executed queries.
///
/// The entry list lives in memory and is written through to the key-value store after
/// every change. If the store fails, the failure is logged and the history keeps working
/// in memory until the end of the session.
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<PreviousQueryEntry>,
    persistent: bool,
    legacy_checked: bool,
}

impl HistoryStore {
    /// Load the persisted history. A value that no longer parses starts an empty history
    /// and is replaced by the next write; a failing store keeps the history in memory.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let (entries, persistent) = match read_entries(store.as_ref()) {
            Ok(entries) => (entries, true),
            Err(e) => {
                log::warn!("Query history unavailable, keeping it in memory only: {}", e);
                (Vec::new(), false)
            }
        };

        Self {
            store,
            entries,
            persistent,
            legacy_checked: false,
        }
    }

    pub fn list(&self) -> &[PreviousQueryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether writes still reach the backing store.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Entries whose query contains `text`, ignoring case. Empty text matches everything.
    pub fn search(&self, text: &str) -> Vec<&PreviousQueryEntry> {
        let needle = text.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|entry| needle.is_empty() || entry.query.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn find(&self, query: &str) -> Option<&PreviousQueryEntry> {
        let normalized = normalize_query(query);
        self.entries
            .iter()
            .find(|entry| normalize_query(&entry.query) == normalized)
    }

    /// Record an executed query. Returns `false` if an equivalent query was already
    /// recorded; the earlier entry and its result are kept as they were.
    pub fn record(&mut self, query: &str, result: Option<QueryResult>) -> bool {
        self.record_at(query, result, Utc::now())
    }

    pub fn record_at(
        &mut self,
        query: &str,
        result: Option<QueryResult>,
        now: DateTime<Utc>,
    ) -> bool {
        let normalized = normalize_query(query);
        if normalized.is_empty() || self.find(&normalized).is_some() {
            return false;
        }

        self.entries.insert(
            0,
            PreviousQueryEntry {
                query: normalized,
                created: now,
                query_result: result,
            },
        );
        self.entries.truncate(HISTORY_LIMIT);
        self.persist();
        true
    }

    /// Remove the entry with exactly this query text.
    pub fn remove(&mut self, query: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.query != query);

        if self.entries.len() == before {
            log::warn!("Asked to remove a history entry that does not exist");
            return false;
        }

        self.persist();
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    /// Convert the legacy blank-line separated `saved-queries` blob into entries.
    ///
    /// Runs at most once per store and only into an empty history. Returns the number of
    /// entries created.
    pub fn migrate_legacy(&mut self) -> usize {
        self.migrate_legacy_at(Utc::now())
    }

    pub fn migrate_legacy_at(&mut self, now: DateTime<Utc>) -> usize {
        if self.legacy_checked {
            return 0;
        }
        self.legacy_checked = true;

        if !self.entries.is_empty() {
            log::debug!("History already populated, skipping legacy migration");
            return 0;
        }

        let blob = match self.store.get(LEGACY_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return 0,
            Err(e) => {
                log::warn!("Failed to read legacy saved queries: {}", e);
                return 0;
            }
        };

        let mut migrated: Vec<PreviousQueryEntry> = Vec::new();
        let blob = blob.replace("\r\n", "\n");
        for query in blob.split(LEGACY_SEPARATOR).map(normalize_query) {
            if query.is_empty() || migrated.iter().any(|entry| entry.query == query) {
                continue;
            }
            if migrated.len() == HISTORY_LIMIT {
                break;
            }
            let created = now - Duration::seconds(migrated.len() as i64);
            migrated.push(PreviousQueryEntry {
                query,
                created,
                query_result: None,
            });
        }

        let count = migrated.len();
        self.entries = migrated;
        self.persist();

        if self.persistent {
            if let Err(e) = self.store.remove(LEGACY_KEY) {
                log::warn!("Failed to clear legacy saved queries: {}", e);
            }
        }

        log::info!("Migrated {} legacy saved queries into history", count);
        count
    }

    fn persist(&mut self) {
        if !self.persistent {
            return;
        }
        if let Err(e) = write_entries(self.store.as_ref(), &self.entries) {
            log::warn!(
                "Failed to persist query history, keeping it in memory for this session: {}",
                e
            );
            self.persistent = false;
        }
    }
}

fn read_entries(store: &dyn KeyValueStore) -> StorageResult<Vec<PreviousQueryEntry>> {
    match store.get(HISTORY_KEY)? {
        Some(json) => match serde_json::from_str(&json) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                log::warn!("Stored query history is invalid, starting empty: {}", e);
                Ok(Vec::new())
            }
        },
        None => Ok(Vec::new()),
    }
}

fn write_entries(store: &dyn KeyValueStore, entries: &[PreviousQueryEntry]) -> StorageResult<()> {
    let json = serde_json::to_string(entries)?;
    store.set(HISTORY_KEY, &json)
}
