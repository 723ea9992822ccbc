//! HTTP catalog client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, instrument};

use stac_common::{CatalogClient, DashboardError, DashboardResult};

use crate::config::DashboardConfig;

/// Fetches catalog documents over HTTP(S), or from disk for `file://` URLs.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: Client,
}

impl HttpCatalogClient {
    /// Create a client using the configured request timeout.
    pub fn new(config: &DashboardConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(config.max_concurrent_fetches)
            .build()?;

        Ok(Self { client })
    }

    async fn fetch_file(&self, url: &str, path: &str) -> DashboardResult<Value> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DashboardError::catalog_fetch(url, e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| DashboardError::catalog_fetch(url, e.to_string()))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    #[instrument(skip(self, url), fields(url = %url))]
    async fn fetch_json(&self, url: &str) -> DashboardResult<Value> {
        if let Some(path) = url.strip_prefix("file://") {
            return self.fetch_file(url, path).await;
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DashboardError::catalog_fetch(url, e.to_string()))?;

        let document = response
            .json::<Value>()
            .await
            .map_err(|e| DashboardError::catalog_fetch(url, format!("invalid JSON: {}", e)))?;

        debug!("Fetched catalog document");
        Ok(document)
    }
}

/// Resolve a link `href` against the URL of the document containing it.
///
/// Absolute hrefs are returned unchanged; if the base is not a URL the href
/// is returned as-is.
pub fn resolve_href(base: &str, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}
