#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use quarry_lib::api::{HttpResponse, Transport};
use quarry_lib::db::KeyValueStore;
use quarry_lib::error::{ConsoleError, ConsoleResult, StorageError, StorageResult};

pub fn init() {
    quarry_lib::init_logging();
}

#[derive(Clone)]
enum Reply {
    Status(u16, String),
    Down,
}

/// Transport answering from canned replies keyed by query text. Unknown queries succeed
/// with a single row echoing the query.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<HashMap<String, Reply>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    urls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, query: &str, status: u16, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(query.to_string(), Reply::Status(status, body.to_string()));
    }

    pub fn fail_network(&self, query: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(query.to_string(), Reply::Down);
    }

    /// Requests for `query` wait until the returned handle is notified
    pub fn hold(&self, query: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(query.to_string(), gate.clone());
        gate
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.urls().iter().map(|url| query_param(url)).collect()
    }
}

pub fn query_param(url: &str) -> String {
    let encoded = url.split_once("query=").map(|(_, q)| q).unwrap_or_default();
    urlencoding::decode(encoded).unwrap().into_owned()
}

/// Success body with one row, `query` before `n`. Built by hand because `json!` would
/// sort the keys.
pub fn echo_body(query: &str) -> String {
    format!(
        r#"{{"rows":[{{"query":{},"n":1}}],"meta":{{"took_seconds":0.01,"count_rows":1,"maxed_rows":false}},"error":null}}"#,
        serde_json::to_string(query).unwrap()
    )
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> ConsoleResult<HttpResponse> {
        self.urls.lock().unwrap().push(url.to_string());
        let query = query_param(url);

        let gate = self.gates.lock().unwrap().get(&query).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let reply = self.replies.lock().unwrap().get(&query).cloned();
        match reply {
            Some(Reply::Status(status, body)) => Ok(HttpResponse { status, body }),
            Some(Reply::Down) => Err(ConsoleError::Transport {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
            None => Ok(HttpResponse {
                status: 200,
                body: echo_body(&query),
            }),
        }
    }
}

/// Store that reads nothing and refuses every write
pub struct FullStore;

impl KeyValueStore for FullStore {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("quota exceeded".to_string()))
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("quota exceeded".to_string()))
    }
}
