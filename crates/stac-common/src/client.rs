//! Catalog client seam.

use async_trait::async_trait;
use serde_json::Value;

use crate::catalog::CatalogNode;
use crate::error::{DashboardError, DashboardResult};

/// Fetches catalog documents by URL.
///
/// Implementations report network and decode failures as
/// [`DashboardError::CatalogFetch`].
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch the raw JSON document at `url`.
    async fn fetch_json(&self, url: &str) -> DashboardResult<Value>;

    /// Fetch and parse a catalog document.
    async fn fetch_node(&self, url: &str) -> DashboardResult<CatalogNode> {
        let value = self.fetch_json(url).await?;
        CatalogNode::from_value(value).map_err(|e| DashboardError::catalog_fetch(url, e.to_string()))
    }
}
