use thiserror::Error;

/// Failures of the persisted key-value state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to encode stored value: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Errors surfaced by the console. Query-level SQL errors are not represented here:
/// they arrive as `QueryResult::error`.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The server answered with a status the console cannot turn into a result.
    #[error("Request failed with status {status}: {url}")]
    RequestFailure { status: u16, url: String },

    /// The request never produced a status (connection refused, DNS, TLS, ...).
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Invalid response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("No result to export")]
    NothingToExport,

    #[error("Export failed: {0}")]
    Export(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConsoleError {
    /// HTTP status carried by the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ConsoleError::RequestFailure { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
