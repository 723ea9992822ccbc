//! Reclassification: rewrite the stops of a layer's color ramp from new bounds.
//!
//! The `circle-color` expression has a fixed shape:
//!
//! ```text
//! index: 0              1           2             3    4   5    6   7     8
//!        "interpolate", ["linear"], ["get", attr], low, C0, mid, C1, high, C2
//! ```
//!
//! Only the stops at 3, 5 and 7 are rewritten. Everything else, colors
//! included, is left as found.

use serde_json::{json, Value};

use stac_common::{ColorBounds, Dataset, DashboardError, DashboardResult, MapboxLayer};

use crate::layers::ActiveLayerSet;

pub const EXPRESSION_LEN: usize = 9;
pub const LOW_STOP: usize = 3;
pub const MID_STOP: usize = 5;
pub const HIGH_STOP: usize = 7;

const INTERPOLATE: &str = "interpolate";

/// Check that an expression has the interpolate shape before touching it.
pub fn validate_expression(expr: &[Value]) -> DashboardResult<()> {
    if expr.len() != EXPRESSION_LEN {
        return Err(DashboardError::layer_resolution(format!(
            "circle-color has {} entries, expected {}",
            expr.len(),
            EXPRESSION_LEN
        )));
    }
    if expr[0].as_str() != Some(INTERPOLATE) {
        return Err(DashboardError::layer_resolution(format!(
            "circle-color starts with {}, expected \"{}\"",
            expr[0], INTERPOLATE
        )));
    }
    if !expr[1].is_array() || !expr[2].is_array() {
        return Err(DashboardError::layer_resolution(
            "circle-color interpolation type and input must be expressions",
        ));
    }
    for index in [LOW_STOP, MID_STOP, HIGH_STOP] {
        if !expr[index].is_number() {
            return Err(DashboardError::layer_resolution(format!(
                "circle-color stop at index {} is not numeric: {}",
                index, expr[index]
            )));
        }
    }
    Ok(())
}

/// Write `min`, the midpoint and `max` into the three stop positions.
pub fn rewrite_stops(expr: &mut [Value], bounds: ColorBounds) -> DashboardResult<()> {
    validate_expression(expr)?;
    for (index, value) in [
        (LOW_STOP, bounds.min),
        (MID_STOP, bounds.mid()),
        (HIGH_STOP, bounds.max),
    ] {
        expr[index] = stop_like(&expr[index], value);
    }
    Ok(())
}

/// Encode `value` the way the replaced stop was encoded: integer stops stay
/// integers while the new value is whole.
fn stop_like(previous: &Value, value: f64) -> Value {
    let whole = value.fract() == 0.0 && value.abs() < i64::MAX as f64;
    if whole && (previous.is_i64() || previous.is_u64()) {
        json!(value as i64)
    } else {
        json!(value)
    }
}

/// Copy of `layer` with its ramp stops rewritten.
pub fn reclassify_layer(layer: &MapboxLayer, bounds: ColorBounds) -> DashboardResult<MapboxLayer> {
    let mut rewritten = layer.clone();
    rewrite_stops(&mut rewritten.paint.circle_color, bounds)?;
    Ok(rewritten)
}

/// Id of the active layer belonging to a dataset.
///
/// Uses the dataset index of the layer set; layers added without a dataset
/// association are found by a unique id substring match. Layers owned by
/// another dataset never match.
pub fn locate_layer(layers: &ActiveLayerSet, dataset_id: &str) -> DashboardResult<String> {
    if let Some(id) = layers.layer_id_for(dataset_id) {
        return Ok(id.to_string());
    }

    let matches = layers.find_unowned_containing(dataset_id);
    match matches.as_slice() {
        [layer] => Ok(layer.id.clone()),
        [] => Err(DashboardError::layer_resolution(format!(
            "no active layer for dataset {}",
            dataset_id
        ))),
        many => Err(DashboardError::layer_resolution(format!(
            "{} active layers match dataset {}",
            many.len(),
            dataset_id
        ))),
    }
}

/// Recolor the active layer of `dataset` from its `min`/`max` properties.
///
/// The layer is replaced by remove + add under the same id, so it moves to
/// the end of the set. On any error the set is left unchanged.
pub fn reclassify(layers: &mut ActiveLayerSet, dataset: &Dataset) -> DashboardResult<MapboxLayer> {
    let bounds = dataset.bounds()?;
    let layer_id = locate_layer(layers, &dataset.id)?;
    let current = layers
        .get(&layer_id)
        .ok_or_else(|| DashboardError::layer_resolution(format!("layer {} vanished", layer_id)))?;

    let rewritten = reclassify_layer(current, bounds)?;
    layers.remove(&layer_id);
    layers.add_for_dataset(&dataset.id, rewritten.clone())?;

    tracing::debug!(
        dataset_id = %dataset.id,
        layer_id = %layer_id,
        min = bounds.min,
        max = bounds.max,
        "Reclassified layer"
    );
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use stac_common::{LayerPaint, LayerSource};

    const C0: &str = "#000000";
    const C1: &str = "#777777";
    const C2: &str = "#ffffff";

    fn expression() -> Vec<Value> {
        vec![
            json!("interpolate"),
            json!(["linear"]),
            json!(["get", "x"]),
            json!(-1.0),
            json!(C0),
            json!(0.0),
            json!(C1),
            json!(1.0),
            json!(C2),
        ]
    }

    fn layer(id: &str) -> MapboxLayer {
        MapboxLayer::circle(
            id,
            LayerSource::geojson_url("https://example.com/points.geojson"),
            LayerPaint::new(expression()),
        )
    }

    fn dataset(id: &str, properties: Value) -> Dataset {
        Dataset {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            links: vec![],
            assets: IndexMap::new(),
            cube_variables: IndexMap::new(),
            cube_dimensions: IndexMap::new(),
            summaries: vec![],
            properties: properties.as_object().cloned().unwrap_or_default(),
            visible: true,
        }
    }

    #[test]
    fn test_rewrite_unit_bounds_is_identity() {
        let mut expr = expression();
        rewrite_stops(&mut expr, ColorBounds::new(-1.0, 1.0).unwrap()).unwrap();
        assert_eq!(expr, expression());
    }

    fn stops(expr: &[Value]) -> [Option<f64>; 3] {
        [expr[LOW_STOP].as_f64(), expr[MID_STOP].as_f64(), expr[HIGH_STOP].as_f64()]
    }

    #[test]
    fn test_rewrite_integer_stops() {
        let original = vec![
            json!("interpolate"),
            json!(["linear"]),
            json!(["get", "x"]),
            json!(-1),
            json!(C0),
            json!(0),
            json!(C1),
            json!(1),
            json!(C2),
        ];

        let mut expr = original.clone();
        rewrite_stops(&mut expr, ColorBounds::new(-1.0, 1.0).unwrap()).unwrap();
        assert_eq!(expr, original);

        rewrite_stops(&mut expr, ColorBounds::new(0.0, 10.0).unwrap()).unwrap();
        assert_eq!(stops(&expr), [Some(0.0), Some(5.0), Some(10.0)]);
        assert_eq!(expr[MID_STOP], json!(5));
        for index in [0, 1, 2, 4, 6, 8] {
            assert_eq!(expr[index], original[index]);
        }

        rewrite_stops(&mut expr, ColorBounds::new(0.0, 1.0).unwrap()).unwrap();
        assert_eq!(stops(&expr), [Some(0.0), Some(0.5), Some(1.0)]);
    }

    #[test]
    fn test_rewrite_only_touches_stops() {
        let mut expr = expression();
        rewrite_stops(&mut expr, ColorBounds::new(0.0, 10.0).unwrap()).unwrap();

        assert_eq!(expr[LOW_STOP], json!(0.0));
        assert_eq!(expr[MID_STOP], json!(5.0));
        assert_eq!(expr[HIGH_STOP], json!(10.0));
        for index in [0, 1, 2, 4, 6, 8] {
            assert_eq!(expr[index], expression()[index]);
        }
    }

    #[test]
    fn test_malformed_expressions_are_rejected() {
        let bounds = ColorBounds::new(0.0, 1.0).unwrap();

        let mut short = expression();
        short.pop();
        assert!(rewrite_stops(&mut short, bounds).is_err());

        let mut step = expression();
        step[0] = json!("step");
        assert!(rewrite_stops(&mut step, bounds).is_err());

        let mut text_stop = expression();
        text_stop[MID_STOP] = json!("mid");
        let before = text_stop.clone();
        let err = rewrite_stops(&mut text_stop, bounds).unwrap_err();
        assert!(matches!(err, DashboardError::LayerResolution(_)));
        assert_eq!(text_stop, before);
    }

    #[test]
    fn test_reclassify_replaces_layer() {
        let mut layers = ActiveLayerSet::new();
        layers.add_for_dataset("waterlevel", layer("waterlevel-rcp45")).unwrap();
        layers.add(layer("discharge-rcp45"));

        let ds = dataset("waterlevel", json!({"min": 0, "max": 10}));
        let rewritten = reclassify(&mut layers, &ds).unwrap();

        assert_eq!(rewritten.id, "waterlevel-rcp45");
        assert_eq!(layers.len(), 2);
        assert_eq!(layers.layers()[1].id, "waterlevel-rcp45");
        assert_eq!(
            layers.get("waterlevel-rcp45").unwrap().paint.circle_color[MID_STOP],
            json!(5.0)
        );
        assert_eq!(layers.layer_id_for("waterlevel"), Some("waterlevel-rcp45"));
    }

    #[test]
    fn test_reclassify_falls_back_to_unique_substring() {
        let mut layers = ActiveLayerSet::new();
        layers.add(layer("waterlevel-rcp45"));

        let ds = dataset("waterlevel", json!({"min": 2, "max": 4}));
        reclassify(&mut layers, &ds).unwrap();
        assert_eq!(
            layers.get("waterlevel-rcp45").unwrap().paint.circle_color[LOW_STOP],
            json!(2.0)
        );
    }

    #[test]
    fn test_reclassify_ambiguous_or_missing_layer() {
        let ds = dataset("waterlevel", json!({"min": 0, "max": 1}));

        let mut none = ActiveLayerSet::new();
        none.add(layer("discharge"));
        assert!(matches!(
            reclassify(&mut none, &ds),
            Err(DashboardError::LayerResolution(_))
        ));

        let mut two = ActiveLayerSet::new();
        two.add(layer("waterlevel-rcp45"));
        two.add(layer("waterlevel-rcp85"));
        assert!(matches!(
            reclassify(&mut two, &ds),
            Err(DashboardError::LayerResolution(_))
        ));
        assert_eq!(two.len(), 2);
    }

    #[test]
    fn test_reclassify_ignores_layers_owned_by_other_datasets() {
        let mut layers = ActiveLayerSet::new();
        layers.add_for_dataset("waterlevel", layer("waterlevel-rcp45")).unwrap();

        let water = dataset("water", json!({"min": 0, "max": 10}));
        assert!(matches!(
            reclassify(&mut layers, &water),
            Err(DashboardError::LayerResolution(_))
        ));

        assert_eq!(layers.layer_id_for("waterlevel"), Some("waterlevel-rcp45"));
        assert!(layers.layer_id_for("water").is_none());
        assert_eq!(layers.get("waterlevel-rcp45").unwrap().paint.circle_color, expression());

        assert!(layers.remove_for_dataset("waterlevel").is_some());
        assert!(layers.is_empty());
    }

    #[test]
    fn test_reclassify_invalid_bounds_leaves_layer_unchanged() {
        let mut layers = ActiveLayerSet::new();
        layers.add_for_dataset("waterlevel", layer("waterlevel-rcp45")).unwrap();

        let ds = dataset("waterlevel", json!({"min": "low", "max": 1}));
        assert!(matches!(
            reclassify(&mut layers, &ds),
            Err(DashboardError::InvalidBounds(_))
        ));
        assert_eq!(layers.get("waterlevel-rcp45").unwrap().paint.circle_color, expression());
    }
}
