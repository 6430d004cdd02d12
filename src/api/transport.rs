use async_trait::async_trait;
use reqwest::Client;

use crate::error::{ConsoleError, ConsoleResult};

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP GET the dispatcher needs. An `Err` means no status was received.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> ConsoleResult<HttpResponse>;
}

/// `reqwest`-backed transport used against the real API
pub struct HttpTransport {
    client: Client,
    api_token: Option<String>,
}

impl HttpTransport {
    /// Fails when the TLS backend cannot be initialised.
    pub fn new(api_token: Option<String>) -> ConsoleResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("quarry/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConsoleError::Transport {
                url: String::new(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, api_token })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> ConsoleResult<HttpResponse> {
        let mut request = self.client.get(url);
        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| ConsoleError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ConsoleError::Transport {
            url: url.to_string(),
            message: format!("failed to read body: {}", e),
        })?;

        Ok(HttpResponse { status, body })
    }
}

/// Stands in for the HTTP transport when it could not be built. Every request fails
/// with the original reason, so the console reports it instead of going down.
pub struct UnavailableTransport {
    reason: String,
}

impl UnavailableTransport {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Transport for UnavailableTransport {
    async fn get(&self, url: &str) -> ConsoleResult<HttpResponse> {
        Err(ConsoleError::Transport {
            url: url.to_string(),
            message: self.reason.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_builds() {
        assert!(HttpTransport::new(None).is_ok());
        assert!(HttpTransport::new(Some("secret".to_string())).is_ok());
    }

    #[tokio::test]
    async fn test_unavailable_transport_reports_reason() {
        let transport = UnavailableTransport::new("no TLS backend");
        let err = transport.get("http://localhost/api/query").await.unwrap_err();

        assert!(err.status().is_none());
        assert!(err.to_string().contains("no TLS backend"));
    }
}
