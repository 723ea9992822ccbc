//! Selection, layer, reclassify and point-series flows on a loaded catalog.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use dashboard_state::{Dashboard, DashboardConfig, LoadKind, LoadStatus};
use stac_common::{DashboardError, DimensionKind, LayerSource};
use test_utils::fixtures::{self, ROOT_URL, WATERLEVEL_RCP45_URL, WATERLEVEL_ZARR};
use test_utils::{
    expected_station_rows, sample_arrays, sample_catalog, InMemoryArrayStore,
    InMemoryCatalogClient,
};

async fn loaded_with(client: InMemoryCatalogClient, arrays: InMemoryArrayStore) -> Dashboard {
    let dashboard = Dashboard::new(DashboardConfig::default(), Arc::new(client), Arc::new(arrays));
    dashboard.load_catalog(ROOT_URL).await.unwrap();
    dashboard
}

async fn loaded() -> Dashboard {
    loaded_with(sample_catalog(), sample_arrays()).await
}

#[tokio::test]
async fn test_selection_from_string_and_list_agree() {
    let a = loaded().await;
    a.store_active_dataset_ids("waterlevel,discharge").await;

    let b = loaded().await;
    b.store_active_dataset_ids(vec!["waterlevel", "discharge"]).await;

    assert_eq!(a.active_dataset_ids().await, vec!["waterlevel", "discharge"]);
    assert_eq!(a.active_dataset_ids().await, b.active_dataset_ids().await);

    let ids = |layers: Vec<stac_common::MapboxLayer>| {
        let mut ids: Vec<String> = layers.into_iter().map(|l| l.id).collect();
        ids.sort();
        ids
    };
    assert_eq!(ids(a.active_layers().await), ids(b.active_layers().await));
}

#[tokio::test]
async fn test_selecting_datasets_loads_layers_and_series() {
    let dashboard = loaded().await;
    dashboard
        .store_active_dataset_ids("waterlevel,discharge")
        .await;

    assert!(dashboard.dataset("waterlevel").await.unwrap().visible);
    assert!(dashboard.dataset("discharge").await.unwrap().visible);

    let layers = dashboard.active_layers().await;
    assert_eq!(layers.len(), 2);

    let waterlevel = layers.iter().find(|l| l.id == "waterlevel-rcp45").unwrap();
    assert_eq!(
        waterlevel.source,
        LayerSource::geojson_url("https://stac.example.com/waterlevel/items/rcp45.geojson")
    );
    let expr = &waterlevel.paint.circle_color;
    assert_eq!(expr[2], json!(["get", "waterlevel"]));
    assert_eq!(expr[3], json!(0.0));
    assert_eq!(expr[5], json!(2.0));
    assert_eq!(expr[7], json!(4.0));

    let discharge = layers.iter().find(|l| l.id == "discharge-points").unwrap();
    assert!(matches!(&discharge.source, LayerSource::Geojson { data } if data.is_object()));

    // discharge has no cube metadata: the failure is recorded, not fatal.
    assert!(matches!(
        dashboard.load_status(LoadKind::PointSeries, "discharge").await,
        Some(LoadStatus::Failed(_))
    ));
    let points = dashboard.selected_point_data().await;
    assert!(points.get("waterlevel").is_some());
    assert!(points.get("discharge").is_none());
}

#[tokio::test]
async fn test_repeated_layer_load_keeps_one_layer() {
    let dashboard = loaded().await;
    dashboard.store_active_dataset_ids("waterlevel").await;

    dashboard.load_layer_for("waterlevel").await.unwrap();
    dashboard.load_layer_for("waterlevel").await.unwrap();

    let layers = dashboard.active_layers().await;
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].id, "waterlevel-rcp45");
}

#[tokio::test]
async fn test_deselect_drops_layer_and_point_data() {
    let dashboard = loaded().await;
    dashboard
        .store_active_dataset_ids("waterlevel,discharge")
        .await;
    dashboard.store_active_dataset_ids("discharge").await;

    assert!(!dashboard.dataset("waterlevel").await.unwrap().visible);
    let layers = dashboard.active_layers().await;
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].id, "discharge-points");
    assert!(dashboard
        .selected_point_data()
        .await
        .get("waterlevel")
        .is_none());
    assert!(dashboard
        .load_status(LoadKind::Layer, "waterlevel")
        .await
        .is_none());

    dashboard.clear_active_dataset_ids().await;
    assert!(dashboard.active_dataset_ids().await.is_empty());
    assert!(dashboard.active_layers().await.is_empty());
}

#[tokio::test]
async fn test_reclassify_with_bounds() {
    let dashboard = loaded().await;
    dashboard.store_active_dataset_ids("waterlevel").await;

    let layer = dashboard
        .reclassify_with_bounds("waterlevel", 0.0, 10.0)
        .await
        .unwrap();
    let expr = &layer.paint.circle_color;
    assert_eq!(expr[3], json!(0.0));
    assert_eq!(expr[5], json!(5.0));
    assert_eq!(expr[7], json!(10.0));
    assert_eq!(expr[4], json!("#2166ac"));
    assert_eq!(expr[6], json!("#f7f7f7"));
    assert_eq!(expr[8], json!("#b2182b"));

    let active = dashboard.active_layers().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0], layer);
}

#[tokio::test]
async fn test_reclassify_rejects_invalid_bounds() {
    let dashboard = loaded().await;
    dashboard.store_active_dataset_ids("waterlevel").await;
    let before = dashboard.active_layers().await;

    let err = dashboard
        .reclassify_with_bounds("waterlevel", f64::NAN, 10.0)
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::InvalidBounds(_)));

    let err = dashboard
        .reclassify_with_bounds("waterlevel", 5.0, 5.0)
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::InvalidBounds(_)));

    assert_eq!(dashboard.active_layers().await, before);
}

#[tokio::test]
async fn test_reclassify_without_active_layer() {
    let dashboard = loaded().await;
    let err = dashboard.reclassify("waterlevel").await.unwrap_err();
    assert!(matches!(err, DashboardError::LayerResolution(_)));

    let err = dashboard.reclassify("unknown").await.unwrap_err();
    assert!(matches!(err, DashboardError::DatasetNotFound(_)));
}

#[tokio::test]
async fn test_summary_choice_swaps_layer() {
    let dashboard = loaded().await;
    dashboard.store_active_dataset_ids("waterlevel").await;

    dashboard
        .set_summary_choice("waterlevel", "scenario", json!("rcp85"))
        .await
        .unwrap();
    let layers = dashboard.active_layers().await;
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].id, "waterlevel-rcp85");

    let err = dashboard
        .set_summary_choice("waterlevel", "scenario", json!("ssp5"))
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::InvalidSelection { .. }));
    assert_eq!(
        dashboard.dataset("waterlevel").await.unwrap().summaries[0].chosen_value,
        json!("rcp85")
    );
}

#[tokio::test]
async fn test_select_location_reloads_series() {
    let dashboard = loaded().await;
    dashboard.store_active_dataset_ids("waterlevel").await;
    dashboard.select_location(2).await;

    let points = dashboard.selected_point_data().await;
    assert_eq!(points.location, Some(2));

    let result = points.get("waterlevel").unwrap();
    assert_eq!(result.name, "Extreme water level");
    let names: Vec<_> = result.series.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["rcp45", "rcp85"]);
    assert!(result.series.iter().all(|s| s.series_type == "line"));

    let rows: Vec<Vec<f64>> = result.series.iter().map(|s| s.data.clone()).collect();
    assert_eq!(rows, expected_station_rows(2, fixtures::SCENARIOS, fixtures::TIMES));

    assert_eq!(result.x_axis.name, "time");
    assert_eq!(result.x_axis.kind, DimensionKind::Temporal);
    assert_eq!(result.x_axis.data, vec![json!("2030"), json!("2050"), json!("2100")]);
    assert_eq!(result.y_axis.unit, "m");
}

#[tokio::test]
async fn test_out_of_range_location_is_recorded() {
    let dashboard = loaded().await;
    dashboard.store_active_dataset_ids("waterlevel").await;
    dashboard.select_location(9).await;

    assert!(matches!(
        dashboard.load_status(LoadKind::PointSeries, "waterlevel").await,
        Some(LoadStatus::Failed(_))
    ));
    // The previous result stays until a load succeeds.
    let points = dashboard.selected_point_data().await;
    assert_eq!(
        points.get("waterlevel").unwrap().series[0].data,
        vec![0.0, 1.0, 2.0]
    );
}

#[tokio::test]
async fn test_unregistered_dataset_point_series_is_noop() {
    let dashboard = loaded().await;
    assert_eq!(dashboard.load_point_series_for("unknown").await, Ok(None));
}

#[tokio::test]
async fn test_newer_summary_choice_wins_over_slow_layer_load() {
    let client = sample_catalog().with_delay(WATERLEVEL_RCP45_URL, Duration::from_millis(500));
    let dashboard = loaded_with(client, sample_arrays()).await;

    let selecting = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move { dashboard.store_active_dataset_ids("waterlevel").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    dashboard
        .set_summary_choice("waterlevel", "scenario", json!("rcp85"))
        .await
        .unwrap();
    selecting.await.unwrap();

    let layers = dashboard.active_layers().await;
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].id, "waterlevel-rcp85");
    assert_eq!(
        dashboard.load_status(LoadKind::Layer, "waterlevel").await,
        Some(LoadStatus::Ready)
    );
}

#[tokio::test]
async fn test_latest_location_wins_over_slow_read() {
    let arrays = sample_arrays().with_read_delay(
        WATERLEVEL_ZARR,
        "waterlevel",
        Duration::from_millis(200),
    );
    let dashboard = loaded_with(sample_catalog(), arrays).await;
    dashboard.store_active_dataset_ids("waterlevel").await;

    let first = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move { dashboard.select_location(1).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    dashboard.select_location(3).await;
    first.await.unwrap();

    let points = dashboard.selected_point_data().await;
    assert_eq!(points.location, Some(3));
    let rows: Vec<Vec<f64>> = points
        .get("waterlevel")
        .unwrap()
        .series
        .iter()
        .map(|s| s.data.clone())
        .collect();
    assert_eq!(rows, expected_station_rows(3, fixtures::SCENARIOS, fixtures::TIMES));
}

#[tokio::test]
async fn test_deselect_cancels_pending_layer_load() {
    let client = sample_catalog().with_delay(WATERLEVEL_RCP45_URL, Duration::from_millis(500));
    let dashboard = loaded_with(client, sample_arrays()).await;

    let selecting = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move { dashboard.store_active_dataset_ids("waterlevel").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    dashboard.clear_active_dataset_ids().await;
    selecting.await.unwrap();

    assert!(dashboard.active_layers().await.is_empty());
    assert!(dashboard.selected_point_data().await.results.is_empty());
    assert!(!dashboard.dataset("waterlevel").await.unwrap().visible);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_locations_commit_series_of_stored_location() {
    let dashboard = loaded().await;
    dashboard.store_active_dataset_ids("waterlevel").await;

    for _ in 0..50 {
        let handles: Vec<_> = (0..fixtures::STATIONS as u64)
            .map(|station| {
                let dashboard = dashboard.clone();
                tokio::spawn(async move { dashboard.select_location(station).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let points = dashboard.selected_point_data().await;
        let location = points.location.unwrap();
        let rows: Vec<Vec<f64>> = points
            .get("waterlevel")
            .unwrap()
            .series
            .iter()
            .map(|s| s.data.clone())
            .collect();
        assert_eq!(
            rows,
            expected_station_rows(location as usize, fixtures::SCENARIOS, fixtures::TIMES)
        );
        assert_eq!(
            dashboard.load_status(LoadKind::PointSeries, "waterlevel").await,
            Some(LoadStatus::Ready)
        );
    }
}
