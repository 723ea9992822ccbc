//! Catalog loader: fetch the root catalog and its children and normalize
//! each child into a [`Dataset`].

use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use stac_common::{
    CatalogClient, CatalogNode, Dataset, DashboardError, DashboardResult, SummaryDescriptor, Theme,
};

use crate::client::resolve_href;

/// Outcome of a catalog load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogLoadReport {
    /// Themes registered from the root, in catalog order.
    pub themes: Vec<Theme>,
    /// Ids of datasets registered.
    pub loaded: Vec<String>,
    /// `(child url, error message)` for every child that could not be registered.
    pub failed: Vec<(String, String)>,
}

/// Normalize raw summaries into descriptors, in source order.
///
/// Entries that are not non-empty arrays carry no selectable value and are skipped.
pub fn normalize_summaries(raw: &IndexMap<String, Value>) -> Vec<SummaryDescriptor> {
    raw.iter()
        .filter_map(|(id, value)| {
            let descriptor = SummaryDescriptor::from_raw(id.as_str(), value);
            if descriptor.is_none() {
                debug!(summary = %id, "Skipping non-selectable summary");
            }
            descriptor
        })
        .collect()
}

/// Convert a fetched child document into a dataset.
///
/// Link and asset hrefs are resolved against `document_url`.
pub fn normalize_dataset(node: CatalogNode, document_url: &str) -> DashboardResult<Dataset> {
    let context = format!("dataset {}", node.id);

    let raw_summaries = node
        .summaries
        .as_ref()
        .ok_or_else(|| DashboardError::schema_field(&context, "summaries"))?;
    let summaries = normalize_summaries(raw_summaries);

    let links = node
        .links
        .into_iter()
        .map(|mut link| {
            link.href = resolve_href(document_url, &link.href);
            link
        })
        .collect();

    let assets = node
        .assets
        .into_iter()
        .map(|(key, mut asset)| {
            asset.href = resolve_href(document_url, &asset.href);
            (key, asset)
        })
        .collect();

    let dataset = Dataset {
        name: node.title.unwrap_or_else(|| node.id.clone()),
        id: node.id,
        description: node.description,
        links,
        assets,
        cube_variables: node.cube_variables,
        cube_dimensions: node.cube_dimensions,
        summaries,
        properties: node.properties,
        visible: false,
    };

    if let Some(plot_dimension) = dataset.plot_series_dimension() {
        if !dataset.cube_dimensions.contains_key(plot_dimension) {
            return Err(DashboardError::schema_field(
                context,
                format!("cube:dimensions.{}", plot_dimension),
            ));
        }
    }

    Ok(dataset)
}

/// Fetches catalog documents through a [`CatalogClient`].
#[derive(Clone)]
pub struct CatalogLoader {
    client: Arc<dyn CatalogClient>,
    max_concurrent_fetches: usize,
}

impl CatalogLoader {
    pub fn new(client: Arc<dyn CatalogClient>, max_concurrent_fetches: usize) -> Self {
        Self {
            client,
            max_concurrent_fetches: max_concurrent_fetches.max(1),
        }
    }

    pub fn client(&self) -> &Arc<dyn CatalogClient> {
        &self.client
    }

    /// Fetch the root catalog.
    #[instrument(skip(self))]
    pub async fn fetch_root(&self, root_url: &str) -> DashboardResult<CatalogNode> {
        self.client.fetch_node(root_url).await
    }

    /// Resolved URLs of the root's child links, in link order.
    pub fn child_urls(root: &CatalogNode, root_url: &str) -> Vec<String> {
        root.child_links()
            .map(|link| resolve_href(root_url, &link.href))
            .collect()
    }

    /// Fetch and normalize one child document.
    pub async fn fetch_dataset(&self, url: &str) -> DashboardResult<Dataset> {
        let node = self.client.fetch_node(url).await?;
        normalize_dataset(node, url)
    }

    /// Fetch every child concurrently. Results arrive in completion order,
    /// each paired with its URL; one failure does not affect the others.
    pub fn datasets(
        &self,
        urls: Vec<String>,
    ) -> impl Stream<Item = (String, DashboardResult<Dataset>)> + '_ {
        stream::iter(urls)
            .map(move |url| async move {
                let result = self.fetch_dataset(&url).await;
                (url, result)
            })
            .buffer_unordered(self.max_concurrent_fetches)
    }
}
