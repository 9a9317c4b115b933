//! Clicked-feature types for the info panel

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar attribute value of a map feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Text(s) => f.write_str(s),
            FeatureValue::Number(n) => write!(f, "{n}"),
            FeatureValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        FeatureValue::Text(s.to_string())
    }
}

impl From<f64> for FeatureValue {
    fn from(n: f64) -> Self {
        FeatureValue::Number(n)
    }
}

/// A feature picked out of a selectable layer by a click.
///
/// Properties are ordered so the panel renders them stably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedFeature {
    pub id: String,
    pub layer: String,
    pub properties: BTreeMap<String, FeatureValue>,
}

impl SelectedFeature {
    pub fn new(id: impl Into<String>, layer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            layer: layer.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}
