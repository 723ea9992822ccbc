//! STAC catalog documents with the datacube extension.
//!
//! Root catalogs, child collections and items all deserialize into
//! [`CatalogNode`]. Object key order is preserved because several lookups
//! are positional (first cube variable, third cube dimension, summary order).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Relation kind of links pointing at child catalogs.
pub const REL_CHILD: &str = "child";

/// Relation kind of links pointing at items.
pub const REL_ITEM: &str = "item";

/// Summary field holding the root catalog's theme keywords.
pub const KEYWORDS_SUMMARY: &str = "keywords";

/// A link to a related document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    /// Relationship type (e.g., "child", "item", "self").
    pub rel: String,

    /// Target URL, possibly relative to the containing document.
    pub href: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Item properties carried inline on the link, used to pick the item
    /// matching the current summary choices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

impl Link {
    /// Create a new link with required fields.
    pub fn new(href: impl Into<String>, rel: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            title: None,
            properties: None,
        }
    }

    /// Attach inline properties (builder pattern).
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn is_child(&self) -> bool {
        self.rel == REL_CHILD
    }

    pub fn is_item(&self) -> bool {
        self.rel == REL_ITEM
    }
}

/// An asset attached to a collection or item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub href: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl Asset {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            media_type: None,
            roles: Vec::new(),
        }
    }
}

/// A variable of a data cube (`cube:variables` entry).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CubeVariable {
    /// Ordered dimension names, matching the array's axes.
    #[serde(default)]
    pub dimensions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Type tag of a cube dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DimensionKind {
    Temporal,
    Spatial,
    Other(String),
}

impl From<String> for DimensionKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "temporal" => DimensionKind::Temporal,
            "spatial" => DimensionKind::Spatial,
            _ => DimensionKind::Other(s),
        }
    }
}

impl From<DimensionKind> for String {
    fn from(kind: DimensionKind) -> Self {
        match kind {
            DimensionKind::Temporal => "temporal".to_string(),
            DimensionKind::Spatial => "spatial".to_string(),
            DimensionKind::Other(s) => s,
        }
    }
}

impl Default for DimensionKind {
    fn default() -> Self {
        DimensionKind::Other(String::new())
    }
}

/// A dimension of a data cube (`cube:dimensions` entry).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CubeDimension {
    #[serde(rename = "type", default)]
    pub kind: DimensionKind,

    /// Ordered coordinate values along this dimension.
    #[serde(default)]
    pub values: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CubeDimension {
    /// Coordinate values rendered as display labels.
    pub fn labels(&self) -> Vec<String> {
        self.values.iter().map(value_label).collect()
    }
}

/// Render a JSON scalar as a display label (strings without quotes).
pub fn value_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A parsed catalog document: root catalog, child collection or item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogNode {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub links: Vec<Link>,

    /// Raw summaries: field name to allowed values or nested metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summaries: Option<IndexMap<String, Value>>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub assets: IndexMap<String, Asset>,

    #[serde(rename = "cube:variables", default, skip_serializing_if = "IndexMap::is_empty")]
    pub cube_variables: IndexMap<String, CubeVariable>,

    #[serde(rename = "cube:dimensions", default, skip_serializing_if = "IndexMap::is_empty")]
    pub cube_dimensions: IndexMap<String, CubeDimension>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,

    /// GeoJSON geometry, present on items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
}

impl CatalogNode {
    /// Parse a document from a JSON value.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Links with relation "child".
    pub fn child_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|l| l.is_child())
    }

    /// Links with relation "item".
    pub fn item_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|l| l.is_item())
    }

    /// Theme keywords from the `keywords` summary. Non-string entries are ignored.
    pub fn keywords(&self) -> Vec<String> {
        self.summaries
            .as_ref()
            .and_then(|s| s.get(KEYWORDS_SUMMARY))
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
