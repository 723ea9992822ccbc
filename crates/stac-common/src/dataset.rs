//! Normalized dataset model held by the registry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::{value_label, Asset, CubeDimension, CubeVariable, Link};
use crate::error::{DashboardError, DashboardResult};

/// Asset key of the array store backing a dataset.
pub const DATA_ASSET: &str = "data";

/// Vendor prefix under which dataset properties may also appear.
const PROPERTY_PREFIX: &str = "deltares:";

/// A theme keyword surfaced from the root catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme(pub String);

impl Theme {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized summary: a catalog field's allowed values and the current choice.
///
/// `chosen_value` is always one of `allowed_values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDescriptor {
    pub id: String,
    pub allowed_values: Vec<Value>,
    pub chosen_value: Value,
}

impl SummaryDescriptor {
    /// Normalize a raw summary entry.
    ///
    /// Returns `None` for nested metadata objects and empty arrays, which
    /// cannot carry a chosen value.
    pub fn from_raw(id: impl Into<String>, raw: &Value) -> Option<Self> {
        let values = raw.as_array()?;
        let first = values.first()?.clone();
        Some(Self {
            id: id.into(),
            allowed_values: values.clone(),
            chosen_value: first,
        })
    }

    pub fn allows(&self, value: &Value) -> bool {
        self.allowed_values.iter().any(|v| v == value)
    }
}

/// Numeric bounds used to place the color-ramp stops of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorBounds {
    pub min: f64,
    pub max: f64,
}

impl ColorBounds {
    /// Validate and create bounds. Both must be finite and `min < max`.
    pub fn new(min: f64, max: f64) -> DashboardResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(DashboardError::invalid_bounds(format!(
                "bounds must be finite numbers (min={}, max={})",
                min, max
            )));
        }
        if min >= max {
            return Err(DashboardError::invalid_bounds(format!(
                "min ({}) must be less than max ({})",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// Parse bounds from JSON numbers or numeric strings.
    pub fn from_values(min: Option<&Value>, max: Option<&Value>) -> DashboardResult<Self> {
        let min = parse_bound("min", min)?;
        let max = parse_bound("max", max)?;
        Self::new(min, max)
    }

    pub fn mid(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

fn parse_bound(name: &str, value: Option<&Value>) -> DashboardResult<f64> {
    match value {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| DashboardError::invalid_bounds(format!("{} is not representable", name))),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| {
            DashboardError::invalid_bounds(format!("{} is not numeric: {:?}", name, s))
        }),
        Some(other) => Err(DashboardError::invalid_bounds(format!(
            "{} is not numeric: {}",
            name, other
        ))),
        None => Err(DashboardError::invalid_bounds(format!("{} is missing", name))),
    }
}

/// A dataset registered from a child catalog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Links of the source document, kept for item resolution.
    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(default)]
    pub assets: IndexMap<String, Asset>,

    #[serde(default)]
    pub cube_variables: IndexMap<String, CubeVariable>,

    #[serde(default)]
    pub cube_dimensions: IndexMap<String, CubeDimension>,

    #[serde(default)]
    pub summaries: Vec<SummaryDescriptor>,

    #[serde(default)]
    pub properties: Map<String, Value>,

    #[serde(default)]
    pub visible: bool,
}

impl Dataset {
    /// The asset holding the array store locator.
    pub fn data_asset(&self) -> Option<&Asset> {
        self.assets.get(DATA_ASSET)
    }

    /// The primary variable: first entry of `cube_variables`.
    pub fn primary_variable(&self) -> Option<(&str, &CubeVariable)> {
        self.cube_variables
            .iter()
            .next()
            .map(|(name, var)| (name.as_str(), var))
    }

    /// Look up a property by name, also accepting the vendor-prefixed key.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties
            .get(key)
            .or_else(|| self.properties.get(&format!("{}{}", PROPERTY_PREFIX, key)))
    }

    /// Name of the dimension whose values label the chart series.
    pub fn plot_series_dimension(&self) -> Option<&str> {
        self.property("plotSeries").and_then(|v| v.as_str())
    }

    /// Validated color bounds from the `min`/`max` properties.
    pub fn bounds(&self) -> DashboardResult<ColorBounds> {
        ColorBounds::from_values(self.property("min"), self.property("max"))
    }

    /// Store new bounds under the plain `min`/`max` keys.
    pub fn set_bounds(&mut self, bounds: ColorBounds) {
        self.properties.remove(&format!("{}min", PROPERTY_PREFIX));
        self.properties.remove(&format!("{}max", PROPERTY_PREFIX));
        self.properties.insert("min".to_string(), Value::from(bounds.min));
        self.properties.insert("max".to_string(), Value::from(bounds.max));
    }

    pub fn summary(&self, id: &str) -> Option<&SummaryDescriptor> {
        self.summaries.iter().find(|s| s.id == id)
    }

    /// Change the chosen value of a summary, keeping it within the allowed values.
    pub fn choose_summary_value(&mut self, summary_id: &str, value: Value) -> DashboardResult<()> {
        let dataset_id = self.id.clone();
        let summary = self
            .summaries
            .iter_mut()
            .find(|s| s.id == summary_id)
            .ok_or_else(|| {
                DashboardError::schema_field(format!("dataset {}", dataset_id), summary_id)
            })?;

        if !summary.allows(&value) {
            return Err(DashboardError::InvalidSelection {
                dataset: dataset_id,
                summary: summary_id.to_string(),
                value: value_label(&value),
            });
        }
        summary.chosen_value = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset_with_properties(properties: Value) -> Dataset {
        Dataset {
            id: "ds".to_string(),
            name: "ds".to_string(),
            description: None,
            links: vec![],
            assets: IndexMap::new(),
            cube_variables: IndexMap::new(),
            cube_dimensions: IndexMap::new(),
            summaries: vec![SummaryDescriptor::from_raw("color", &json!(["red", "blue"])).unwrap()],
            properties: properties.as_object().cloned().unwrap_or_default(),
            visible: false,
        }
    }

    #[test]
    fn test_summary_from_raw() {
        let s = SummaryDescriptor::from_raw("color", &json!(["red", "blue"])).unwrap();
        assert_eq!(s.id, "color");
        assert_eq!(s.allowed_values, vec![json!("red"), json!("blue")]);
        assert_eq!(s.chosen_value, json!("red"));

        assert!(SummaryDescriptor::from_raw("empty", &json!([])).is_none());
        assert!(SummaryDescriptor::from_raw("nested", &json!({"minimum": 0})).is_none());
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let s = SummaryDescriptor::from_raw("color", &json!(["red"])).unwrap();
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(
            v,
            json!({"id": "color", "allowedValues": ["red"], "chosenValue": "red"})
        );
    }

    #[test]
    fn test_bounds_parsing() {
        let ds = dataset_with_properties(json!({"min": "-1.5", "max": 3}));
        let b = ds.bounds().unwrap();
        assert_eq!(b.min, -1.5);
        assert_eq!(b.max, 3.0);
        assert_eq!(b.mid(), 0.75);

        let prefixed = dataset_with_properties(json!({"deltares:min": 0, "deltares:max": 10}));
        assert_eq!(prefixed.bounds().unwrap(), ColorBounds { min: 0.0, max: 10.0 });
    }

    #[test]
    fn test_bounds_rejects_invalid() {
        let missing = dataset_with_properties(json!({"max": 3}));
        assert!(matches!(missing.bounds(), Err(DashboardError::InvalidBounds(_))));

        let text = dataset_with_properties(json!({"min": "low", "max": 3}));
        assert!(matches!(text.bounds(), Err(DashboardError::InvalidBounds(_))));

        let nan = dataset_with_properties(json!({"min": "NaN", "max": 3}));
        assert!(matches!(nan.bounds(), Err(DashboardError::InvalidBounds(_))));

        assert!(ColorBounds::new(5.0, 5.0).is_err());
        assert!(ColorBounds::new(f64::NEG_INFINITY, 5.0).is_err());
    }

    #[test]
    fn test_set_bounds_replaces_prefixed_keys() {
        let mut ds = dataset_with_properties(json!({"deltares:min": 0, "deltares:max": 10}));
        ds.set_bounds(ColorBounds::new(-2.0, 2.0).unwrap());
        assert!(ds.properties.get("deltares:min").is_none());
        assert_eq!(ds.bounds().unwrap(), ColorBounds { min: -2.0, max: 2.0 });
    }

    #[test]
    fn test_choose_summary_value() {
        let mut ds = dataset_with_properties(json!({}));
        ds.choose_summary_value("color", json!("blue")).unwrap();
        assert_eq!(ds.summary("color").unwrap().chosen_value, json!("blue"));

        let err = ds.choose_summary_value("color", json!("green")).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidSelection { .. }));
        assert_eq!(ds.summary("color").unwrap().chosen_value, json!("blue"));

        let err = ds.choose_summary_value("shape", json!("x")).unwrap_err();
        assert!(matches!(err, DashboardError::SchemaField { .. }));
    }

    #[test]
    fn test_plot_series_dimension() {
        let ds = dataset_with_properties(json!({"deltares:plotSeries": "scenarios"}));
        assert_eq!(ds.plot_series_dimension(), Some("scenarios"));
    }
}
