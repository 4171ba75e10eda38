//! Map feature types exchanged with the rendering surface.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute bag of a vector-tile feature.
pub type Properties = serde_json::Map<String, Value>;

/// Promoted feature id. Vector tiles carry either integers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Int(i64),
    Text(String),
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Address of a feature for feature-state updates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRef {
    pub id: FeatureId,
    pub source: String,
    pub source_layer: Option<String>,
}

impl FeatureRef {
    /// Identity is (source, id); the source layer is informational.
    pub fn same_feature(&self, other: &FeatureRef) -> bool {
        self.source == other.source && self.id == other.id
    }
}

/// A feature as reported by a pointer event or a rendered-feature query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapFeature {
    pub id: Option<FeatureId>,
    pub source: String,
    pub source_layer: Option<String>,
    /// Style layer the feature was hit on.
    pub layer_id: String,
    pub properties: Properties,
}

impl MapFeature {
    /// Feature-state address, when the feature has a promoted id.
    pub fn feature_ref(&self) -> Option<FeatureRef> {
        self.id.clone().map(|id| FeatureRef {
            id,
            source: self.source.clone(),
            source_layer: self.source_layer.clone(),
        })
    }
}

/// Pixel position of a pointer event on the map canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Read an attribute as a code string. Numbers are accepted because some
/// layers store codes numerically; empty strings and nulls are not codes.
pub fn property_code(props: &Properties, key: &str) -> Option<String> {
    match props.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn feature_ids_accept_numbers_and_strings() {
        let a: FeatureId = serde_json::from_value(json!(17)).unwrap();
        let b: FeatureId = serde_json::from_value(json!("P12")).unwrap();
        assert_eq!(a, FeatureId::Int(17));
        assert_eq!(b.to_string(), "P12");
    }

    #[test]
    fn identity_ignores_source_layer() {
        let a = FeatureRef { id: FeatureId::Int(1), source: "s".into(), source_layer: Some("x".into()) };
        let b = FeatureRef { source_layer: None, ..a.clone() };
        assert!(a.same_feature(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn property_code_reads_strings_and_numbers() {
        let props = json!({"a": " A1 ", "b": 42, "c": "", "d": null});
        let props = props.as_object().unwrap();
        assert_eq!(property_code(props, "a").as_deref(), Some("A1"));
        assert_eq!(property_code(props, "b").as_deref(), Some("42"));
        assert_eq!(property_code(props, "c"), None);
        assert_eq!(property_code(props, "d"), None);
        assert_eq!(property_code(props, "missing"), None);
    }
}
