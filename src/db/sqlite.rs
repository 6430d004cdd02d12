use rusqlite::{Connection, OptionalExtension, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

use super::KeyValueStore;
use crate::error::{StorageError, StorageResult};

/// Open (creating if needed) the console database in the given data directory
pub fn init_database(data_dir: &Path) -> SqliteResult<Connection> {
    std::fs::create_dir_all(data_dir).ok();
    let db_path = data_dir.join("quarry.db");

    let conn = Connection::open(&db_path)?;
    create_tables(&conn)?;

    Ok(conn)
}

/// In-memory database with the same schema, for tests and throwaway sessions
pub fn init_in_memory() -> SqliteResult<Connection> {
    let conn = Connection::open_in_memory()?;
    create_tables(&conn)?;
    Ok(conn)
}

fn create_tables(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        r#"
        -- Console state: active query, history, legacy saved queries, settings
        CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )
}

/// Read a value by key
pub fn get_value(conn: &Connection, key: &str) -> SqliteResult<Option<String>> {
    conn.query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
        row.get(0)
    })
    .optional()
}

/// Insert or replace a value
pub fn set_value(conn: &Connection, key: &str, value: &str) -> SqliteResult<()> {
    conn.execute(
        r#"
        INSERT INTO kv_store (key, value, updated_at)
        VALUES (?1, ?2, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = CURRENT_TIMESTAMP
        "#,
        (key, value),
    )?;
    Ok(())
}

/// Delete a value, returns whether a row was removed
pub fn delete_value(conn: &Connection, key: &str) -> SqliteResult<bool> {
    let rows_affected = conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
    Ok(rows_affected > 0)
}

/// Key-value store backed by a single SQLite connection
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        Ok(Self::new(init_database(data_dir)?))
    }

    pub fn in_memory() -> StorageResult<Self> {
        Ok(Self::new(init_in_memory()?))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(get_value(&conn, key)?)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(set_value(&conn, key, value)?)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        delete_value(&conn, key)?;
        Ok(())
    }
}
