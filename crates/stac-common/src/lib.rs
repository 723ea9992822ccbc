//! Common types shared by the dashboard crates: catalog documents, the
//! normalized dataset model, map layer descriptors and chart series.

pub mod catalog;
pub mod client;
pub mod dataset;
pub mod error;
pub mod layer;
pub mod series;

pub use catalog::{
    value_label, Asset, CatalogNode, CubeDimension, CubeVariable, DimensionKind, Link,
};
pub use client::CatalogClient;
pub use dataset::{ColorBounds, Dataset, SummaryDescriptor, Theme, DATA_ASSET};
pub use error::{DashboardError, DashboardResult};
pub use layer::{interpolate_ramp, LayerPaint, LayerSource, MapboxLayer};
pub use series::{ChartSeries, PointSeriesResult, SelectedPointData, XAxis, YAxis};
