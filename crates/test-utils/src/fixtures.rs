//! A sample STAC catalog for dashboard tests.
//!
//! ```text
//! catalog.json                      keywords: Flooding, Coastal, Flooding
//! ├── waterlevel/collection.json    cube [stations=4, scenarios=2, time=3], unit m
//! │   ├── items/rcp45.json          geojson asset
//! │   └── items/rcp85.json          geojson asset
//! ├── discharge/collection.json     no cube; item with inline geometry
//! │   └── items/points.json
//! └── broken/collection.json        not served (fails like a 404)
//! ```

use serde_json::{json, Value};

use crate::arrays::InMemoryArrayStore;
use crate::catalog::InMemoryCatalogClient;
use crate::generators::create_station_cube;

pub const BASE_URL: &str = "https://stac.example.com";
pub const ROOT_URL: &str = "https://stac.example.com/catalog.json";
pub const WATERLEVEL_URL: &str = "https://stac.example.com/waterlevel/collection.json";
pub const WATERLEVEL_RCP45_URL: &str = "https://stac.example.com/waterlevel/items/rcp45.json";
pub const WATERLEVEL_RCP85_URL: &str = "https://stac.example.com/waterlevel/items/rcp85.json";
pub const WATERLEVEL_ZARR: &str = "https://stac.example.com/waterlevel/waterlevel.zarr";
pub const DISCHARGE_URL: &str = "https://stac.example.com/discharge/collection.json";
pub const DISCHARGE_POINTS_URL: &str = "https://stac.example.com/discharge/items/points.json";
pub const BROKEN_URL: &str = "https://stac.example.com/broken/collection.json";

pub const STATIONS: usize = 4;
pub const SCENARIOS: usize = 2;
pub const TIMES: usize = 3;

pub fn root_catalog() -> Value {
    json!({
        "type": "Catalog",
        "id": "climate-dashboard",
        "description": "Coastal hazard datasets",
        "links": [
            {"rel": "self", "href": ROOT_URL},
            {"rel": "child", "href": "./waterlevel/collection.json"},
            {"rel": "child", "href": "./discharge/collection.json"},
            {"rel": "child", "href": "./broken/collection.json"}
        ],
        "summaries": {"keywords": ["Flooding", "Coastal", "Flooding"]}
    })
}

pub fn waterlevel_collection() -> Value {
    json!({
        "type": "Collection",
        "id": "waterlevel",
        "title": "Extreme water level",
        "links": [
            {"rel": "parent", "href": "../catalog.json"},
            {"rel": "item", "href": "./items/rcp45.json", "properties": {"scenario": "rcp45"}},
            {"rel": "item", "href": "./items/rcp85.json", "properties": {"scenario": "rcp85"}}
        ],
        "summaries": {
            "scenario": ["rcp45", "rcp85"],
            "deltares:stations": {"minimum": 0, "maximum": 3}
        },
        "assets": {
            "data": {"href": "./waterlevel.zarr", "type": "application/vnd+zarr", "roles": ["data"]}
        },
        "cube:variables": {
            "waterlevel": {"dimensions": ["stations", "scenarios", "time"], "unit": "m", "type": "data"}
        },
        "cube:dimensions": {
            "stations": {"type": "spatial", "values": [0, 1, 2, 3]},
            "scenarios": {"type": "scenario", "values": ["rcp45", "rcp85"]},
            "time": {"type": "temporal", "values": ["2030", "2050", "2100"]}
        },
        "properties": {
            "deltares:min": 0,
            "deltares:max": 4,
            "deltares:plotSeries": "scenarios"
        }
    })
}

pub fn waterlevel_item(scenario: &str) -> Value {
    json!({
        "type": "Feature",
        "id": format!("waterlevel-{}", scenario),
        "properties": {"scenario": scenario, "paint_attribute": "waterlevel"},
        "assets": {
            "data": {"href": format!("./{}.geojson", scenario), "type": "application/geo+json"}
        }
    })
}

pub fn discharge_collection() -> Value {
    json!({
        "type": "Collection",
        "id": "discharge",
        "links": [{"rel": "item", "href": "./items/points.json"}],
        "summaries": {"season": ["winter", "summer"]}
    })
}

pub fn discharge_points_item() -> Value {
    json!({
        "type": "Feature",
        "id": "discharge-points",
        "geometry": {"type": "MultiPoint", "coordinates": [[4.3, 52.1], [4.5, 52.0]]},
        "properties": {}
    })
}

/// Catalog client serving every sample document except the broken child.
pub fn sample_catalog() -> InMemoryCatalogClient {
    InMemoryCatalogClient::new()
        .with_document(ROOT_URL, root_catalog())
        .with_document(WATERLEVEL_URL, waterlevel_collection())
        .with_document(WATERLEVEL_RCP45_URL, waterlevel_item("rcp45"))
        .with_document(WATERLEVEL_RCP85_URL, waterlevel_item("rcp85"))
        .with_document(DISCHARGE_URL, discharge_collection())
        .with_document(DISCHARGE_POINTS_URL, discharge_points_item())
}

/// Array store holding the waterlevel cube.
pub fn sample_arrays() -> InMemoryArrayStore {
    InMemoryArrayStore::new().with_array(
        WATERLEVEL_ZARR,
        "waterlevel",
        vec![STATIONS as u64, SCENARIOS as u64, TIMES as u64],
        create_station_cube(STATIONS, SCENARIOS, TIMES),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use stac_common::{CatalogClient, CatalogNode};

    #[test]
    fn test_sample_documents_parse() {
        for doc in [
            root_catalog(),
            waterlevel_collection(),
            waterlevel_item("rcp45"),
            discharge_collection(),
            discharge_points_item(),
        ] {
            assert!(CatalogNode::from_value(doc).is_ok());
        }
    }

    #[test]
    fn test_broken_child_is_not_served() {
        let client = sample_catalog();
        assert!(tokio_test::block_on(client.fetch_json(BROKEN_URL)).is_err());
        assert!(tokio_test::block_on(client.fetch_json(ROOT_URL)).is_ok());
    }
}
