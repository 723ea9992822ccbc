//! Layer manager: the ordered set of active map layers and the conversion of
//! catalog items into layer descriptors.

use std::collections::HashMap;

use stac_common::{
    interpolate_ramp, CatalogNode, Dataset, DashboardError, DashboardResult, LayerPaint,
    LayerSource, Link, MapboxLayer,
};
use stac_common::layer::{DEFAULT_PAINT_ATTRIBUTE, DEFAULT_RAMP_COLORS, DEFAULT_RAMP_STOPS};

use crate::client::resolve_href;

/// Item property naming the feature attribute that drives the color ramp.
pub const PAINT_ATTRIBUTE_PROPERTY: &str = "paint_attribute";

/// Item asset keys checked, in order, for the layer's GeoJSON source.
const GEOJSON_ASSETS: [&str; 2] = ["data", "geojson"];

/// Ordered set of active layers, unique by layer id.
///
/// Layers loaded for a dataset are also recorded in a dataset id to layer id
/// index, so each dataset has at most one layer.
#[derive(Debug, Clone, Default)]
pub struct ActiveLayerSet {
    layers: Vec<MapboxLayer>,
    by_dataset: HashMap<String, String>,
}

impl ActiveLayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer unless one with the same id exists. The existing entry
    /// is never overwritten. Returns whether the layer was added.
    pub fn add(&mut self, layer: MapboxLayer) -> bool {
        if self.contains(&layer.id) {
            return false;
        }
        self.layers.push(layer);
        true
    }

    /// Add a layer on behalf of a dataset.
    ///
    /// A previous layer of the same dataset with a different id is removed
    /// first; adding an id that is already present stays a no-op. A layer id
    /// owned by another dataset is refused with `LayerResolution` and the set
    /// is left unchanged.
    pub fn add_for_dataset(&mut self, dataset_id: &str, layer: MapboxLayer) -> DashboardResult<bool> {
        if let Some(owner) = self.owner_of(&layer.id) {
            if owner != dataset_id {
                return Err(DashboardError::layer_resolution(format!(
                    "layer {} already belongs to dataset {}",
                    layer.id, owner
                )));
            }
        }

        if let Some(previous) = self.by_dataset.get(dataset_id).cloned() {
            if previous != layer.id {
                self.remove(&previous);
            }
        }

        let layer_id = layer.id.clone();
        let added = self.add(layer);
        self.by_dataset.insert(dataset_id.to_string(), layer_id);
        Ok(added)
    }

    /// Remove the layer with the given id. Unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Option<MapboxLayer> {
        let position = self.layers.iter().position(|l| l.id == id)?;
        self.by_dataset.retain(|_, layer_id| layer_id != id);
        Some(self.layers.remove(position))
    }

    /// Remove the layer associated with a dataset, if any.
    pub fn remove_for_dataset(&mut self, dataset_id: &str) -> Option<MapboxLayer> {
        let layer_id = self.by_dataset.remove(dataset_id)?;
        self.remove(&layer_id)
    }

    pub fn layer_id_for(&self, dataset_id: &str) -> Option<&str> {
        self.by_dataset.get(dataset_id).map(String::as_str)
    }

    pub fn layer_for(&self, dataset_id: &str) -> Option<&MapboxLayer> {
        self.layer_id_for(dataset_id).and_then(|id| self.get(id))
    }

    /// Dataset the layer was added for, if any.
    pub fn owner_of(&self, layer_id: &str) -> Option<&str> {
        self.by_dataset
            .iter()
            .find(|(_, id)| id.as_str() == layer_id)
            .map(|(dataset_id, _)| dataset_id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&MapboxLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    /// Layers not owned by any dataset whose id contains `needle`.
    pub fn find_unowned_containing(&self, needle: &str) -> Vec<&MapboxLayer> {
        self.layers
            .iter()
            .filter(|l| l.id.contains(needle) && self.owner_of(&l.id).is_none())
            .collect()
    }

    pub fn layers(&self) -> &[MapboxLayer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Pick the item link matching the dataset's current summary choices.
///
/// Links carrying inline properties are matched against every chosen value
/// they share a key with; without a match the first item link is used.
pub fn resolve_item_link(dataset: &Dataset) -> DashboardResult<&Link> {
    let items: Vec<&Link> = dataset.links.iter().filter(|l| l.is_item()).collect();
    let first = items.first().copied().ok_or_else(|| {
        DashboardError::schema_field(format!("dataset {}", dataset.id), "links[rel=item]")
    })?;

    let matching = items.iter().copied().find(|link| {
        link.properties.as_ref().map_or(false, |props| {
            dataset.summaries.iter().all(|summary| {
                props
                    .get(&summary.id)
                    .map_or(true, |value| value == &summary.chosen_value)
            })
        })
    });

    Ok(matching.unwrap_or(first))
}

/// Build the circle layer for a fetched catalog item.
///
/// `item_url` is the URL the item was fetched from; relative asset hrefs are
/// resolved against it.
pub fn build_layer(dataset: &Dataset, item: &CatalogNode, item_url: &str) -> DashboardResult<MapboxLayer> {
    let source = GEOJSON_ASSETS
        .iter()
        .find_map(|key| item.assets.get(*key))
        .map(|asset| LayerSource::geojson_url(resolve_href(item_url, &asset.href)))
        .or_else(|| item.geometry.clone().map(LayerSource::geojson_inline))
        .ok_or_else(|| {
            DashboardError::schema_field(format!("item {}", item.id), "assets.data|geometry")
        })?;

    let attribute = item
        .properties
        .get(PAINT_ATTRIBUTE_PROPERTY)
        .and_then(|v| v.as_str())
        .unwrap_or(DEFAULT_PAINT_ATTRIBUTE);

    let stops = match dataset.bounds() {
        Ok(bounds) => [bounds.min, bounds.mid(), bounds.max],
        Err(e) => {
            tracing::debug!(dataset_id = %dataset.id, error = %e, "Using default ramp stops");
            DEFAULT_RAMP_STOPS
        }
    };

    Ok(MapboxLayer::circle(
        item.id.clone(),
        source,
        LayerPaint::new(interpolate_ramp(attribute, stops, DEFAULT_RAMP_COLORS)),
    ))
}
