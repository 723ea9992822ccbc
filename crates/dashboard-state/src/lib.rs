//! Client-side state of the geospatial dashboard.
//!
//! ```text
//! CatalogLoader ──► DatasetRegistry ◄── store_active_dataset_ids
//!                        │
//!          ┌─────────────┴──────────────┐
//!          ▼                            ▼
//!   load_layer_for               load_point_series_for
//!   (ActiveLayerSet)             (SelectedPointData)
//!          ▲
//!      reclassify
//! ```
//!
//! [`Dashboard`] owns all state. Per-dataset loads are tracked in
//! [`InFlightLoads`] so that a newer selection always wins over a slower,
//! older load.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod inflight;
pub mod layers;
pub mod loader;
pub mod metrics;
pub mod point_series;
pub mod reclassify;
pub mod registry;

pub use client::{resolve_href, HttpCatalogClient};
pub use config::{ConfigError, DashboardConfig};
pub use dashboard::Dashboard;
pub use inflight::{InFlightLoads, LoadKind, LoadTicket};
pub use layers::{build_layer, resolve_item_link, ActiveLayerSet};
pub use loader::{normalize_dataset, normalize_summaries, CatalogLoadReport, CatalogLoader};
pub use point_series::{build_index_slice, extract_point_series, shape_series};
pub use registry::{ActiveDatasetIdsInput, DatasetRegistry, LoadStatus};
