//! In-memory catalog client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use stac_common::{CatalogClient, DashboardError, DashboardResult};

/// Serves catalog documents from a URL → JSON map.
///
/// Unknown URLs fail like an HTTP 404. Failures and per-URL delays can be
/// injected, and every request is recorded.
#[derive(Clone, Default)]
pub struct InMemoryCatalogClient {
    documents: HashMap<String, Value>,
    failures: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl InMemoryCatalogClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` at `url`.
    pub fn with_document(mut self, url: impl Into<String>, document: Value) -> Self {
        self.documents.insert(url.into(), document);
        self
    }

    /// Make requests for `url` fail with `message`.
    pub fn with_failure(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(url.into(), message.into());
        self
    }

    /// Delay responses for `url`.
    pub fn with_delay(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    /// URLs requested so far, in request order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|requested| requested.as_str() == url)
            .count()
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalogClient {
    async fn fetch_json(&self, url: &str) -> DashboardResult<Value> {
        self.requests.lock().await.push(url.to_string());

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(message) = self.failures.get(url) {
            return Err(DashboardError::catalog_fetch(url, message.clone()));
        }
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| DashboardError::catalog_fetch(url, "404 Not Found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serves_documents_and_failures() {
        let client = InMemoryCatalogClient::new()
            .with_document("mem://root.json", json!({"id": "root"}))
            .with_failure("mem://bad.json", "connection reset");

        tokio_test::block_on(async {
            assert_eq!(
                client.fetch_json("mem://root.json").await.unwrap(),
                json!({"id": "root"})
            );

            let err = client.fetch_json("mem://bad.json").await.unwrap_err();
            assert!(err.to_string().contains("connection reset"));

            let err = client.fetch_json("mem://missing.json").await.unwrap_err();
            assert_eq!(err.kind(), "catalog_fetch");

            assert_eq!(client.requests().await.len(), 3);
            assert_eq!(client.request_count("mem://root.json").await, 1);
        });
    }
}
