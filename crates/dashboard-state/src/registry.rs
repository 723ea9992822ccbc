//! Dataset registry: the canonical collection of datasets, themes and
//! selection state.
//!
//! All mutations are small synchronous transitions. The registry is owned by
//! the [`Dashboard`](crate::Dashboard) behind a lock; nothing here performs I/O.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use stac_common::{
    ColorBounds, Dataset, DashboardError, DashboardResult, PointSeriesResult, SelectedPointData,
    Theme,
};

use crate::inflight::LoadKind;

/// Progress of a per-dataset load, readable by the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Selection input: either a list of ids or a comma-joined route parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveDatasetIdsInput {
    List(Vec<String>),
    Joined(String),
}

impl ActiveDatasetIdsInput {
    /// Normalize to an ordered id list. Blank entries are dropped and
    /// repeated ids keep their first position.
    pub fn into_ids(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            ActiveDatasetIdsInput::List(ids) => ids,
            ActiveDatasetIdsInput::Joined(joined) => {
                joined.split(',').map(str::to_string).collect()
            }
        };

        let mut ids: Vec<String> = Vec::with_capacity(raw.len());
        for id in raw {
            let id = id.trim();
            if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
                ids.push(id.to_string());
            }
        }
        ids
    }
}

impl From<Vec<String>> for ActiveDatasetIdsInput {
    fn from(ids: Vec<String>) -> Self {
        ActiveDatasetIdsInput::List(ids)
    }
}

impl From<Vec<&str>> for ActiveDatasetIdsInput {
    fn from(ids: Vec<&str>) -> Self {
        ActiveDatasetIdsInput::List(ids.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ActiveDatasetIdsInput {
    fn from(ids: &[&str]) -> Self {
        ActiveDatasetIdsInput::List(ids.iter().map(|s| s.to_string()).collect())
    }
}

impl From<String> for ActiveDatasetIdsInput {
    fn from(joined: String) -> Self {
        ActiveDatasetIdsInput::Joined(joined)
    }
}

impl From<&str> for ActiveDatasetIdsInput {
    fn from(joined: &str) -> Self {
        ActiveDatasetIdsInput::Joined(joined.to_string())
    }
}

/// In-memory state of the dashboard's catalog and selection.
#[derive(Debug, Clone, Default)]
pub struct DatasetRegistry {
    datasets: IndexMap<String, Dataset>,
    themes: Vec<Theme>,
    active_dataset_ids: Vec<String>,
    selected_point_data: SelectedPointData,
    load_status: HashMap<(LoadKind, String), LoadStatus>,
    dedupe_themes: bool,
}

impl DatasetRegistry {
    pub fn new(dedupe_themes: bool) -> Self {
        Self {
            dedupe_themes,
            ..Default::default()
        }
    }

    // === Datasets ===

    /// Insert a dataset, replacing any previous entry with the same id.
    ///
    /// A replaced entry keeps its position in the listing.
    pub fn add_dataset(&mut self, dataset: Dataset) -> Option<Dataset> {
        self.datasets.insert(dataset.id.clone(), dataset)
    }

    pub fn dataset(&self, id: &str) -> Option<&Dataset> {
        self.datasets.get(id)
    }

    /// Datasets in registration order.
    pub fn available_datasets(&self) -> Vec<&Dataset> {
        self.datasets.values().collect()
    }

    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }

    fn dataset_mut(&mut self, id: &str) -> DashboardResult<&mut Dataset> {
        self.datasets
            .get_mut(id)
            .ok_or_else(|| DashboardError::DatasetNotFound(id.to_string()))
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> DashboardResult<()> {
        self.dataset_mut(id)?.visible = visible;
        Ok(())
    }

    /// Change a summary's chosen value; the value must be one of its allowed values.
    pub fn set_summary_choice(
        &mut self,
        dataset_id: &str,
        summary_id: &str,
        value: Value,
    ) -> DashboardResult<()> {
        self.dataset_mut(dataset_id)?
            .choose_summary_value(summary_id, value)
    }

    /// Validate and store new color bounds. Invalid bounds leave the dataset untouched.
    pub fn set_dataset_bounds(
        &mut self,
        dataset_id: &str,
        min: f64,
        max: f64,
    ) -> DashboardResult<ColorBounds> {
        let bounds = ColorBounds::new(min, max)?;
        self.dataset_mut(dataset_id)?.set_bounds(bounds);
        Ok(bounds)
    }

    // === Themes ===

    /// Register a theme. Returns `false` when deduplication dropped it.
    pub fn add_theme(&mut self, theme: Theme) -> bool {
        if self.dedupe_themes && self.themes.contains(&theme) {
            return false;
        }
        self.themes.push(theme);
        true
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    // === Selection ===

    /// Replace the active dataset ids wholesale.
    pub fn set_active_dataset_ids(&mut self, ids: Vec<String>) {
        self.active_dataset_ids = ids;
    }

    /// Normalize a list or comma-joined string, then replace the active ids.
    pub fn store_active_dataset_ids(&mut self, input: impl Into<ActiveDatasetIdsInput>) {
        let ids = input.into().into_ids();
        self.set_active_dataset_ids(ids);
    }

    pub fn clear_active_dataset_ids(&mut self) {
        self.active_dataset_ids.clear();
    }

    pub fn active_dataset_ids(&self) -> &[String] {
        &self.active_dataset_ids
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active_dataset_ids.iter().any(|active| active == id)
    }

    // === Point data ===

    /// Replace all point results wholesale. The selected location is kept.
    pub fn set_selected_point_data(&mut self, results: IndexMap<String, PointSeriesResult>) {
        self.selected_point_data.replace(results);
    }

    /// Insert or replace the point result of one dataset.
    pub fn add_dataset_point_data(&mut self, entry: PointSeriesResult) {
        self.selected_point_data.merge(entry);
    }

    pub fn remove_dataset_point_data(&mut self, dataset_id: &str) -> Option<PointSeriesResult> {
        self.selected_point_data.remove(dataset_id)
    }

    /// Select a station index. Existing results are kept until reloaded.
    pub fn select_location(&mut self, index: u64) {
        self.selected_point_data.location = Some(index);
    }

    pub fn selected_location(&self) -> Option<u64> {
        self.selected_point_data.location
    }

    pub fn selected_point_data(&self) -> &SelectedPointData {
        &self.selected_point_data
    }

    // === Load status ===

    pub fn set_load_status(&mut self, kind: LoadKind, dataset_id: &str, status: LoadStatus) {
        self.load_status
            .insert((kind, dataset_id.to_string()), status);
    }

    pub fn load_status(&self, kind: LoadKind, dataset_id: &str) -> Option<&LoadStatus> {
        self.load_status.get(&(kind, dataset_id.to_string()))
    }

    pub fn clear_load_status_for(&mut self, kind: LoadKind, dataset_id: &str) {
        self.load_status.remove(&(kind, dataset_id.to_string()));
    }

    pub fn clear_load_status(&mut self, dataset_id: &str) {
        for kind in LoadKind::ALL {
            self.load_status.remove(&(kind, dataset_id.to_string()));
        }
    }
}
