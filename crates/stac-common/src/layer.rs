//! Mapbox GL layer descriptors consumed by the map widget.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Colors of the default three-stop diverging ramp (low, mid, high).
pub const DEFAULT_RAMP_COLORS: [&str; 3] = ["#2166ac", "#f7f7f7", "#b2182b"];

/// Stops used when a dataset has no usable bounds.
pub const DEFAULT_RAMP_STOPS: [f64; 3] = [-1.0, 0.0, 1.0];

/// Feature attribute read by the default ramp when an item names none.
pub const DEFAULT_PAINT_ATTRIBUTE: &str = "value";

/// Source of a layer's features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerSource {
    /// GeoJSON source; `data` is either a URL string or an inline GeoJSON object.
    Geojson { data: Value },
}

impl LayerSource {
    pub fn geojson_url(url: impl Into<String>) -> Self {
        LayerSource::Geojson {
            data: Value::String(url.into()),
        }
    }

    pub fn geojson_inline(geometry: Value) -> Self {
        LayerSource::Geojson { data: geometry }
    }
}

/// Paint properties of a circle layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerPaint {
    /// Color expression; positionally significant, see the reclassifier.
    #[serde(rename = "circle-color")]
    pub circle_color: Vec<Value>,

    #[serde(rename = "circle-radius", default = "default_circle_radius")]
    pub circle_radius: f64,

    #[serde(rename = "circle-stroke-width", default = "default_stroke_width")]
    pub circle_stroke_width: f64,
}

fn default_circle_radius() -> f64 {
    5.0
}

fn default_stroke_width() -> f64 {
    0.5
}

impl LayerPaint {
    pub fn new(circle_color: Vec<Value>) -> Self {
        Self {
            circle_color,
            circle_radius: default_circle_radius(),
            circle_stroke_width: default_stroke_width(),
        }
    }
}

/// A renderable map layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapboxLayer {
    pub id: String,

    #[serde(rename = "type")]
    pub layer_type: String,

    pub source: LayerSource,

    pub paint: LayerPaint,
}

impl MapboxLayer {
    /// Create a circle layer.
    pub fn circle(id: impl Into<String>, source: LayerSource, paint: LayerPaint) -> Self {
        Self {
            id: id.into(),
            layer_type: "circle".to_string(),
            source,
            paint,
        }
    }
}

/// Build `["interpolate", ["linear"], ["get", attr], s0, c0, s1, c1, s2, c2]`.
pub fn interpolate_ramp(attribute: &str, stops: [f64; 3], colors: [&str; 3]) -> Vec<Value> {
    vec![
        json!("interpolate"),
        json!(["linear"]),
        json!(["get", attribute]),
        json!(stops[0]),
        json!(colors[0]),
        json!(stops[1]),
        json!(colors[1]),
        json!(stops[2]),
        json!(colors[2]),
    ]
}
