//! Error types for dashboard state operations.

use thiserror::Error;

/// Result type alias using DashboardError.
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Errors surfaced by catalog loading, layer management and series extraction.
///
/// Every variant is recoverable: callers record it against the dataset or
/// action that produced it and carry on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    // === Catalog Errors ===
    #[error("failed to fetch catalog document {url}: {message}")]
    CatalogFetch { url: String, message: String },

    #[error("missing or malformed field '{field}' in {context}")]
    SchemaField { context: String, field: String },

    // === Layer Errors ===
    #[error("layer resolution failed: {0}")]
    LayerResolution(String),

    #[error("invalid color bounds: {0}")]
    InvalidBounds(String),

    // === Series Errors ===
    #[error("series/label count mismatch: {series} series but {labels} labels")]
    SliceShape { series: usize, labels: usize },

    #[error("array store error: {0}")]
    ArrayStore(String),

    // === Selection Errors ===
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("value {value} is not allowed for summary '{summary}' of dataset {dataset}")]
    InvalidSelection {
        dataset: String,
        summary: String,
        value: String,
    },

    #[error("load cancelled: {0}")]
    Cancelled(String),
}

impl DashboardError {
    /// Create a CatalogFetch error.
    pub fn catalog_fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CatalogFetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a SchemaField error.
    pub fn schema_field(context: impl Into<String>, field: impl Into<String>) -> Self {
        Self::SchemaField {
            context: context.into(),
            field: field.into(),
        }
    }

    /// Create a LayerResolution error.
    pub fn layer_resolution(msg: impl Into<String>) -> Self {
        Self::LayerResolution(msg.into())
    }

    /// Create an InvalidBounds error.
    pub fn invalid_bounds(msg: impl Into<String>) -> Self {
        Self::InvalidBounds(msg.into())
    }

    /// Short machine-readable kind, used as a metrics label and in UI failure states.
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::CatalogFetch { .. } => "catalog_fetch",
            DashboardError::SchemaField { .. } => "schema_field",
            DashboardError::LayerResolution(_) => "layer_resolution",
            DashboardError::InvalidBounds(_) => "invalid_bounds",
            DashboardError::SliceShape { .. } => "slice_shape",
            DashboardError::ArrayStore(_) => "array_store",
            DashboardError::DatasetNotFound(_) => "dataset_not_found",
            DashboardError::InvalidSelection { .. } => "invalid_selection",
            DashboardError::Cancelled(_) => "cancelled",
        }
    }

    /// Whether this error came from a superseded load rather than a real failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DashboardError::Cancelled(_))
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::schema_field("catalog document", err.to_string())
    }
}
