//! Cluster backend access.
//!
//! The console backend exposes three JSON endpoints per adapter:
//!
//! ```text
//! GET /api/connected/{adapter}              {"node1": true, "node2": false}
//! GET /api/statistics/{adapter}?nodes=a,b   {"a": {...}, "b": null}
//! GET /api/details/{adapter}/{node}         {"name": "a", "host": ..., ...}
//! ```

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::{ConnectivityReport, StatisticsReport};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_connect() {
            BackendError::Connection(err.to_string())
        } else {
            BackendError::Http(err.to_string())
        }
    }
}

/// Source of node connectivity, statistics and details.
#[async_trait]
pub trait ClusterBackend: Send + Sync + Debug {
    async fn fetch_connected(&self) -> Result<ConnectivityReport, BackendError>;

    async fn fetch_statistics(&self, nodes: &[String]) -> Result<StatisticsReport, BackendError>;

    async fn fetch_details(&self, node: &str) -> Result<Value, BackendError>;
}

/// Backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
    adapter: String,
}

impl HttpBackend {
    /// Create a new builder for configuring the backend.
    pub fn builder() -> HttpBackendBuilder {
        HttpBackendBuilder::default()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/api/{}/{}", self.endpoint, resource, urlencoded(&self.adapter))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(BackendError::Http(format!(
                "API returned status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ClusterBackend for HttpBackend {
    async fn fetch_connected(&self) -> Result<ConnectivityReport, BackendError> {
        self.get_json(&self.url("connected"), &[]).await
    }

    async fn fetch_statistics(&self, nodes: &[String]) -> Result<StatisticsReport, BackendError> {
        self.get_json(&self.url("statistics"), &[("nodes", nodes.join(","))])
            .await
    }

    async fn fetch_details(&self, node: &str) -> Result<Value, BackendError> {
        let url = format!("{}/{}", self.url("details"), urlencoded(node));
        self.get_json(&url, &[]).await
    }
}

/// Builder for HttpBackend.
#[derive(Debug, Default)]
pub struct HttpBackendBuilder {
    endpoint: Option<String>,
    adapter: Option<String>,
    timeout: Option<Duration>,
}

impl HttpBackendBuilder {
    /// Set the backend base URL (e.g., "http://localhost:1887").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the adapter whose nodes are queried (default: "mixnet").
    pub fn adapter(mut self, adapter: impl Into<String>) -> Self {
        self.adapter = Some(adapter.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the backend.
    pub fn build(self) -> Result<HttpBackend, BackendError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Http(format!("Failed to build HTTP client: {e}")))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:1887".to_string());

        Ok(HttpBackend {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            adapter: self.adapter.unwrap_or_else(|| "mixnet".to_string()),
        })
    }
}

// URL encode a path segment
fn urlencoded(s: &str) -> String {
    s.replace('%', "%25").replace('/', "%2F").replace(' ', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let backend = HttpBackend::builder().build().unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:1887");
        assert_eq!(backend.adapter(), "mixnet");
    }

    #[test]
    fn test_builder_custom() {
        let backend = HttpBackend::builder()
            .endpoint("http://cluster.local:8080/")
            .adapter("boards")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        assert_eq!(backend.endpoint(), "http://cluster.local:8080");
        assert_eq!(backend.adapter(), "boards");
    }

    #[test]
    fn test_urls() {
        let backend = HttpBackend::builder()
            .endpoint("http://host:1")
            .adapter("mix net")
            .build()
            .unwrap();
        assert_eq!(backend.url("connected"), "http://host:1/api/connected/mix%20net");
        assert_eq!(backend.url("statistics"), "http://host:1/api/statistics/mix%20net");
    }

    #[test]
    fn test_urlencoded() {
        assert_eq!(urlencoded("a/b"), "a%2Fb");
        assert_eq!(urlencoded("100%"), "100%25");
        assert_eq!(urlencoded("node1"), "node1");
    }

    #[tokio::test]
    async fn test_unreachable_backend_reports_error() {
        let backend = HttpBackend::builder()
            .endpoint("http://127.0.0.1:1")
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap();
        assert!(backend.fetch_connected().await.is_err());
    }
}
