use serde::Deserialize;
use std::sync::Arc;

use super::{HttpResponse, Transport};
use crate::error::{ConsoleError, ConsoleResult};
use crate::models::QueryResult;

/// Body of a 400 response for a query the server refused to run
#[derive(Debug, Deserialize)]
struct QueryErrorBody {
    error: Option<String>,
}

/// Sends analytics queries to the API and normalizes the answers.
///
/// One request per call, no retries and no caching. Calls share nothing, so any number
/// may be in flight at once.
#[derive(Clone)]
pub struct QueryDispatcher {
    api_base: String,
    transport: Arc<dyn Transport>,
}

impl QueryDispatcher {
    pub fn new(api_base: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn query_url(&self, query: &str) -> String {
        format!(
            "{}/analytics/query?query={}",
            self.api_base,
            urlencoding::encode(query)
        )
    }

    /// Execute a query on the server.
    ///
    /// A 400 carrying an `error` message comes back as `Ok` with `QueryResult::error`
    /// set. Other non-success statuses are `ConsoleError::RequestFailure`.
    pub async fn execute(&self, query: &str) -> ConsoleResult<QueryResult> {
        let url = self.query_url(query);
        log::debug!("Dispatching analytics query ({} bytes)", query.len());

        let response = self.transport.get(&url).await?;
        let result = normalize_response(&url, response)?;

        log::debug!(
            "Query settled: {} rows in {:.3}s{}",
            result.meta.count_rows,
            result.meta.took_seconds,
            if result.is_error() { " (reported error)" } else { "" }
        );
        Ok(result)
    }
}

fn normalize_response(url: &str, response: HttpResponse) -> ConsoleResult<QueryResult> {
    if response.is_success() {
        return serde_json::from_str(&response.body).map_err(|source| ConsoleError::Decode {
            url: url.to_string(),
            source,
        });
    }

    if response.status == 400 {
        if let Ok(QueryErrorBody { error: Some(message) }) =
            serde_json::from_str::<QueryErrorBody>(&response.body)
        {
            return Ok(QueryResult::failed(message));
        }
    }

    Err(ConsoleError::RequestFailure {
        status: response.status,
        url: url.to_string(),
    })
}
