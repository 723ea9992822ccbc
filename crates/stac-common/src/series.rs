//! Chart series extracted for the selected location.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::DimensionKind;

/// One line of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,

    #[serde(rename = "type")]
    pub series_type: String,

    pub data: Vec<f64>,
}

impl ChartSeries {
    pub fn line(name: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            series_type: "line".to_string(),
            data,
        }
    }
}

/// X axis of a point-series chart: a cube dimension and its coordinate values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XAxis {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: DimensionKind,

    pub data: Vec<Value>,
}

/// Y axis of a point-series chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YAxis {
    pub unit: String,
}

/// Chartable series for one dataset at the selected location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointSeriesResult {
    pub id: String,
    pub name: String,
    pub series: Vec<ChartSeries>,
    pub x_axis: XAxis,
    pub y_axis: YAxis,
}

/// Point data for the selected location, keyed by dataset id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedPointData {
    /// Index of the selected station along the station dimension.
    pub location: Option<u64>,

    pub results: IndexMap<String, PointSeriesResult>,
}

impl SelectedPointData {
    /// Replace all results wholesale, keeping the location selection.
    pub fn replace(&mut self, results: IndexMap<String, PointSeriesResult>) {
        self.results = results;
    }

    /// Insert or replace the result for one dataset.
    pub fn merge(&mut self, result: PointSeriesResult) {
        self.results.insert(result.id.clone(), result);
    }

    pub fn remove(&mut self, dataset_id: &str) -> Option<PointSeriesResult> {
        self.results.shift_remove(dataset_id)
    }

    pub fn get(&self, dataset_id: &str) -> Option<&PointSeriesResult> {
        self.results.get(dataset_id)
    }
}
