//! Point-series extraction against a Zarr store written to disk.

use array_store::{CancellationToken, ZarrArrayStore};
use dashboard_state::{extract_point_series, normalize_dataset};
use serde_json::json;
use stac_common::{CatalogNode, DashboardError};
use test_utils::{assert_series_approx_eq, expected_station_rows, write_station_cube};

fn collection(locator: &str) -> CatalogNode {
    CatalogNode::from_value(json!({
        "id": "waterlevel",
        "title": "Water level",
        "summaries": {},
        "assets": {"data": {"href": locator}},
        "cube:variables": {
            "waterlevel": {"dimensions": ["stations", "scenarios", "time"], "unit": "m"}
        },
        "cube:dimensions": {
            "stations": {"type": "spatial", "values": [0, 1, 2]},
            "scenarios": {"type": "scenario", "values": ["low", "high"]},
            "time": {"type": "temporal", "values": [2030, 2050, 2100, 2150]}
        },
        "properties": {"plotSeries": "scenarios"}
    }))
    .unwrap()
}

#[tokio::test]
async fn test_extract_from_zarr_store() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = write_station_cube(temp_dir.path(), "waterlevel", 3, 2, 4)
        .expect("Failed to write Zarr");
    let locator = format!("file://{}", root.display());

    let dataset = normalize_dataset(collection(&locator), "file:///catalog/collection.json")
        .unwrap();
    assert_eq!(dataset.data_asset().unwrap().href, locator);

    let result = extract_point_series(
        &ZarrArrayStore::new(),
        &dataset,
        "stations",
        Some(1),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(result.series.len(), 2);
    assert_eq!(result.series[0].name, "low");
    assert_eq!(result.series[1].name, "high");
    let expected = expected_station_rows(1, 2, 4);
    assert_series_approx_eq!(result.series[0].data, expected[0], 1e-6);
    assert_series_approx_eq!(result.series[1].data, expected[1], 1e-6);
    assert_eq!(result.x_axis.name, "time");
    assert_eq!(result.y_axis.unit, "m");
}

#[tokio::test]
async fn test_missing_store_is_array_store_error() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let locator = temp_dir.path().join("absent.zarr").display().to_string();
    let dataset = normalize_dataset(collection(&locator), "file:///catalog/collection.json")
        .unwrap();

    let err = extract_point_series(
        &ZarrArrayStore::new(),
        &dataset,
        "stations",
        None,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DashboardError::ArrayStore(_)));
}
