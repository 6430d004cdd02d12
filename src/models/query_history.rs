use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::QueryResult;

/// One slot of the persisted query history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousQueryEntry {
    pub query: String,
    pub created: DateTime<Utc>, // ISO 8601
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_result: Option<QueryResult>,
}
