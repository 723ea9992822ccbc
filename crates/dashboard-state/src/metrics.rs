//! Counters emitted by dashboard operations.
//!
//! The library only records through the `metrics` facade; installing a
//! recorder is up to the embedding binary.

use metrics::counter;

use stac_common::{DashboardError, DashboardResult};

/// Outcome label attached to every counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Error,
    Stale,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Error => "error",
            Outcome::Stale => "stale",
        }
    }

    pub fn of<T>(result: &DashboardResult<T>) -> Self {
        match result {
            Ok(_) => Outcome::Ok,
            Err(DashboardError::Cancelled(_)) => Outcome::Stale,
            Err(_) => Outcome::Error,
        }
    }
}

/// Record a catalog document fetch (root or child).
pub fn record_catalog_fetch(outcome: Outcome) {
    counter!("catalog_fetch_total", "outcome" => outcome.as_str()).increment(1);
}

/// Record a dataset registered from a child document.
pub fn record_dataset_registered() {
    counter!("datasets_registered_total").increment(1);
}

/// Record a settled layer load.
pub fn record_layer_load(outcome: Outcome) {
    counter!("layer_loads_total", "outcome" => outcome.as_str()).increment(1);
}

/// Record a settled point-series load.
pub fn record_point_series_load(outcome: Outcome) {
    counter!("point_series_loads_total", "outcome" => outcome.as_str()).increment(1);
}

/// Record a reclassification attempt.
pub fn record_reclassify(outcome: Outcome) {
    counter!("reclassify_total", "outcome" => outcome.as_str()).increment(1);
}
