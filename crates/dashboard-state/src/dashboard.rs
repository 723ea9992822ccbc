//! The dashboard state object that wires loader, registry, layers and
//! point-series extraction together.
//!
//! Lock order is always `inflight` → `registry` → `layers`.

use std::sync::Arc;

use futures::future::join_all;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use array_store::{ArrayStore, ZarrArrayStore};
use stac_common::{
    CatalogClient, Dataset, DashboardError, DashboardResult, MapboxLayer, PointSeriesResult,
    SelectedPointData, Theme,
};

use crate::client::HttpCatalogClient;
use crate::config::DashboardConfig;
use crate::inflight::{InFlightLoads, LoadKind, LoadTicket};
use crate::layers::{build_layer, resolve_item_link, ActiveLayerSet};
use crate::loader::{CatalogLoadReport, CatalogLoader};
use crate::metrics::{self, Outcome};
use crate::point_series::extract_point_series;
use crate::reclassify;
use crate::registry::{ActiveDatasetIdsInput, DatasetRegistry, LoadStatus};

/// Owned dashboard state. Cloning shares the same state.
#[derive(Clone)]
pub struct Dashboard {
    config: Arc<DashboardConfig>,
    loader: CatalogLoader,
    arrays: Arc<dyn ArrayStore>,
    inflight: Arc<Mutex<InFlightLoads>>,
    registry: Arc<RwLock<DatasetRegistry>>,
    layers: Arc<RwLock<ActiveLayerSet>>,
}

impl Dashboard {
    pub fn new(
        config: DashboardConfig,
        client: Arc<dyn CatalogClient>,
        arrays: Arc<dyn ArrayStore>,
    ) -> Self {
        let loader = CatalogLoader::new(client, config.max_concurrent_fetches);
        let registry = DatasetRegistry::new(config.dedupe_themes);
        Self {
            config: Arc::new(config),
            loader,
            arrays,
            inflight: Arc::new(Mutex::new(InFlightLoads::new())),
            registry: Arc::new(RwLock::new(registry)),
            layers: Arc::new(RwLock::new(ActiveLayerSet::new())),
        }
    }

    /// Dashboard backed by the HTTP catalog client and the Zarr array store.
    pub fn from_config(config: DashboardConfig) -> DashboardResult<Self> {
        let client = HttpCatalogClient::new(&config)
            .map_err(|e| DashboardError::catalog_fetch(&config.catalog_url, e.to_string()))?;
        Ok(Self::new(
            config,
            Arc::new(client),
            Arc::new(ZarrArrayStore::new()),
        ))
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    // === Getters ===

    pub async fn themes(&self) -> Vec<Theme> {
        self.registry.read().await.themes().to_vec()
    }

    pub async fn available_datasets(&self) -> Vec<Dataset> {
        self.registry
            .read()
            .await
            .available_datasets()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn dataset(&self, id: &str) -> Option<Dataset> {
        self.registry.read().await.dataset(id).cloned()
    }

    pub async fn active_dataset_ids(&self) -> Vec<String> {
        self.registry.read().await.active_dataset_ids().to_vec()
    }

    pub async fn active_layers(&self) -> Vec<MapboxLayer> {
        self.layers.read().await.layers().to_vec()
    }

    pub async fn selected_point_data(&self) -> SelectedPointData {
        self.registry.read().await.selected_point_data().clone()
    }

    pub async fn load_status(&self, kind: LoadKind, dataset_id: &str) -> Option<LoadStatus> {
        self.registry
            .read()
            .await
            .load_status(kind, dataset_id)
            .cloned()
    }

    // === Catalog ===

    /// Load the configured root catalog.
    pub async fn load(&self) -> DashboardResult<CatalogLoadReport> {
        let url = self.config.catalog_url.clone();
        self.load_catalog(&url).await
    }

    /// Fetch the root catalog, register its themes, then fetch and register
    /// every child concurrently.
    ///
    /// Only a root failure is returned as an error; child failures are
    /// logged and listed in the report. Datasets that are already selected
    /// are made visible and their layer and point series loaded.
    #[instrument(skip(self, root_url), fields(url = %root_url))]
    pub async fn load_catalog(&self, root_url: &str) -> DashboardResult<CatalogLoadReport> {
        let root = self.loader.fetch_root(root_url).await;
        metrics::record_catalog_fetch(Outcome::of(&root));
        let root = root?;

        let mut report = CatalogLoadReport::default();
        {
            let mut registry = self.registry.write().await;
            for keyword in root.keywords() {
                let theme = Theme::new(keyword);
                if registry.add_theme(theme.clone()) {
                    report.themes.push(theme);
                }
            }
        }

        let urls = CatalogLoader::child_urls(&root, root_url);
        info!(children = urls.len(), themes = report.themes.len(), "Fetched root catalog");

        let mut cascades = Vec::new();
        let mut children = self.loader.datasets(urls);
        while let Some((url, result)) = children.next().await {
            metrics::record_catalog_fetch(Outcome::of(&result));
            match result {
                Ok(mut dataset) => {
                    let id = dataset.id.clone();
                    let active = {
                        let mut registry = self.registry.write().await;
                        dataset.visible = registry.is_active(&id);
                        let active = dataset.visible;
                        registry.add_dataset(dataset);
                        active
                    };
                    metrics::record_dataset_registered();
                    debug!(dataset_id = %id, active, "Registered dataset");

                    if active {
                        let this = self.clone();
                        let cascade_id = id.clone();
                        cascades.push(tokio::spawn(async move {
                            this.load_dataset_views(&cascade_id).await
                        }));
                    }
                    report.loaded.push(id);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Skipping catalog child");
                    report.failed.push((url, e.to_string()));
                }
            }
        }

        for handle in cascades {
            if let Err(e) = handle.await {
                warn!(error = %e, "Dataset load task failed");
            }
        }

        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "Catalog load complete"
        );
        Ok(report)
    }

    // === Selection ===

    /// Replace the selection from a list or comma-joined string.
    ///
    /// Deselected datasets are hidden, their loads cancelled and their layer
    /// and point data dropped. Newly selected registered datasets are shown
    /// and loaded.
    #[instrument(skip(self, input))]
    pub async fn store_active_dataset_ids(&self, input: impl Into<ActiveDatasetIdsInput>) {
        let ids = input.into().into_ids();

        let (deselected, activated) = {
            let mut registry = self.registry.write().await;
            let previous = registry.active_dataset_ids().to_vec();
            registry.set_active_dataset_ids(ids.clone());

            let deselected: Vec<String> = previous
                .iter()
                .filter(|id| !ids.contains(id))
                .cloned()
                .collect();
            let activated: Vec<String> = ids
                .iter()
                .filter(|id| !previous.contains(id) && registry.dataset(id).is_some())
                .cloned()
                .collect();
            for id in &activated {
                registry.set_visible(id, true).ok();
            }
            (deselected, activated)
        };

        for id in &deselected {
            self.deactivate(id).await;
        }

        debug!(active = ?ids, activated = ?activated, deselected = ?deselected, "Selection changed");
        join_all(activated.iter().map(|id| self.load_dataset_views(id))).await;
    }

    pub async fn clear_active_dataset_ids(&self) {
        self.store_active_dataset_ids(Vec::<String>::new()).await;
    }

    async fn deactivate(&self, dataset_id: &str) {
        let cancelled = self.inflight.lock().await.cancel_dataset(dataset_id);
        {
            let mut registry = self.registry.write().await;
            registry.set_visible(dataset_id, false).ok();
            registry.remove_dataset_point_data(dataset_id);
            registry.clear_load_status(dataset_id);
        }
        self.layers.write().await.remove_for_dataset(dataset_id);
        debug!(dataset_id = %dataset_id, cancelled, "Deactivated dataset");
    }

    /// Load layer and point series of one dataset. Failures are recorded in
    /// the load status.
    async fn load_dataset_views(&self, dataset_id: &str) {
        let _ = tokio::join!(
            self.load_layer_for(dataset_id),
            self.load_point_series_for(dataset_id)
        );
    }

    /// Change a summary choice. An active dataset gets the layer of the item
    /// matching the new choice.
    pub async fn set_summary_choice(
        &self,
        dataset_id: &str,
        summary_id: &str,
        value: Value,
    ) -> DashboardResult<()> {
        let active = {
            let mut registry = self.registry.write().await;
            registry.set_summary_choice(dataset_id, summary_id, value)?;
            registry.is_active(dataset_id)
        };
        if active {
            self.load_layer_for(dataset_id).await?;
        }
        Ok(())
    }

    // === Layers ===

    /// Resolve the item matching the dataset's summary choices, fetch it and
    /// add its layer.
    #[instrument(skip(self))]
    pub async fn load_layer_for(&self, dataset_id: &str) -> DashboardResult<MapboxLayer> {
        // The ticket is issued before the snapshot is read, so a load that
        // saw older summary choices can never hold the newest ticket.
        let ticket = self.begin(LoadKind::Layer, dataset_id).await;
        let dataset = match self.dataset(dataset_id).await {
            Some(dataset) => dataset,
            None => {
                self.abandon(&ticket).await;
                return Err(DashboardError::DatasetNotFound(dataset_id.to_string()));
            }
        };

        let result = self.fetch_layer(&dataset, ticket.cancel_token()).await;

        let mut inflight = self.inflight.lock().await;
        if !inflight.finish(&ticket) {
            debug!("Discarding stale layer load");
            metrics::record_layer_load(Outcome::Stale);
            return Err(DashboardError::Cancelled(dataset_id.to_string()));
        }

        let mut registry = self.registry.write().await;
        let result = match result {
            Ok(layer) => self
                .layers
                .write()
                .await
                .add_for_dataset(dataset_id, layer.clone())
                .map(|_| layer),
            Err(e) => Err(e),
        };
        metrics::record_layer_load(Outcome::of(&result));
        match result {
            Ok(layer) => {
                registry.set_load_status(LoadKind::Layer, dataset_id, LoadStatus::Ready);
                debug!(layer_id = %layer.id, "Layer loaded");
                Ok(layer)
            }
            Err(e) => {
                warn!(error = %e, "Layer load failed");
                registry.set_load_status(LoadKind::Layer, dataset_id, LoadStatus::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn fetch_layer(
        &self,
        dataset: &Dataset,
        cancel: &CancellationToken,
    ) -> DashboardResult<MapboxLayer> {
        let url = resolve_item_link(dataset)?.href.clone();
        let item = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(DashboardError::Cancelled(dataset.id.clone()));
            }
            item = self.loader.client().fetch_node(&url) => item?,
        };
        build_layer(dataset, &item, &url)
    }

    /// Recolor the dataset's active layer from its stored bounds.
    #[instrument(skip(self))]
    pub async fn reclassify(&self, dataset_id: &str) -> DashboardResult<MapboxLayer> {
        let result = match self.dataset(dataset_id).await {
            Some(dataset) => reclassify::reclassify(&mut *self.layers.write().await, &dataset),
            None => Err(DashboardError::DatasetNotFound(dataset_id.to_string())),
        };
        metrics::record_reclassify(Outcome::of(&result));
        if let Err(e) = &result {
            warn!(error = %e, "Reclassify failed");
        }
        result
    }

    /// Store new bounds, then reclassify. Invalid bounds change nothing.
    pub async fn reclassify_with_bounds(
        &self,
        dataset_id: &str,
        min: f64,
        max: f64,
    ) -> DashboardResult<MapboxLayer> {
        let stored = self
            .registry
            .write()
            .await
            .set_dataset_bounds(dataset_id, min, max);
        if let Err(e) = stored {
            metrics::record_reclassify(Outcome::Error);
            return Err(e);
        }
        self.reclassify(dataset_id).await
    }

    // === Point series ===

    /// Select a station and reload point series for every active dataset.
    #[instrument(skip(self))]
    pub async fn select_location(&self, index: u64) {
        let ids: Vec<String> = {
            let mut registry = self.registry.write().await;
            registry.select_location(index);
            registry
                .active_dataset_ids()
                .iter()
                .filter(|id| registry.dataset(id).is_some())
                .cloned()
                .collect()
        };
        join_all(ids.iter().map(|id| self.load_point_series_for(id))).await;
    }

    /// Extract and store the point series of a dataset at the selected
    /// location. An unregistered dataset is a no-op returning `None`.
    #[instrument(skip(self))]
    pub async fn load_point_series_for(
        &self,
        dataset_id: &str,
    ) -> DashboardResult<Option<PointSeriesResult>> {
        if self.dataset(dataset_id).await.is_none() {
            debug!("Dataset not registered, nothing to load");
            return Ok(None);
        }

        // Ticket first, then the snapshot: a newer location or summary choice
        // either lands before this read or supersedes this ticket.
        let ticket = self.begin(LoadKind::PointSeries, dataset_id).await;
        let snapshot = {
            let registry = self.registry.read().await;
            registry
                .dataset(dataset_id)
                .map(|dataset| (dataset.clone(), registry.selected_location()))
        };
        let Some((dataset, location)) = snapshot else {
            self.abandon(&ticket).await;
            return Ok(None);
        };

        let result = extract_point_series(
            self.arrays.as_ref(),
            &dataset,
            &self.config.station_dimension,
            location,
            ticket.cancel_token(),
        )
        .await;

        let mut inflight = self.inflight.lock().await;
        if !inflight.finish(&ticket) {
            debug!("Discarding stale point series load");
            metrics::record_point_series_load(Outcome::Stale);
            return Err(DashboardError::Cancelled(dataset_id.to_string()));
        }

        let mut registry = self.registry.write().await;
        metrics::record_point_series_load(Outcome::of(&result));
        match result {
            Ok(series) => {
                registry.add_dataset_point_data(series.clone());
                registry.set_load_status(LoadKind::PointSeries, dataset_id, LoadStatus::Ready);
                debug!(series = series.series.len(), "Point series loaded");
                Ok(Some(series))
            }
            Err(e) => {
                warn!(error = %e, "Point series load failed");
                registry.set_load_status(
                    LoadKind::PointSeries,
                    dataset_id,
                    LoadStatus::Failed(e.to_string()),
                );
                Err(e)
            }
        }
    }

    async fn begin(&self, kind: LoadKind, dataset_id: &str) -> LoadTicket {
        let mut inflight = self.inflight.lock().await;
        let ticket = inflight.start(kind, dataset_id);
        self.registry
            .write()
            .await
            .set_load_status(kind, dataset_id, LoadStatus::Loading);
        ticket
    }

    /// Drop a ticket whose dataset disappeared before the load started.
    async fn abandon(&self, ticket: &LoadTicket) {
        let mut inflight = self.inflight.lock().await;
        if inflight.finish(ticket) {
            self.registry
                .write()
                .await
                .clear_load_status_for(ticket.kind(), ticket.dataset_id());
        }
    }
}
