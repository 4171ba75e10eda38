//! Attribute filters in the map's legacy filter syntax.

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::feature::{property_code, Properties};
use crate::NO_MATCH;

/// Predicate over a feature attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    /// `["==", key, value]`
    Equals { key: String, value: String },
    /// `["in", key, v1, v2, ...]`
    OneOf { key: String, values: Vec<String> },
}

impl FilterExpr {
    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals { key: key.into(), value: value.into() }
    }

    pub fn one_of<I, S>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Filter that keeps no feature: membership in the sentinel code only.
    pub fn exclude_all(key: impl Into<String>) -> Self {
        Self::one_of(key, [NO_MATCH])
    }

    /// True for the sentinel exclusion (or an empty membership list).
    pub fn matches_nothing(&self) -> bool {
        match self {
            Self::Equals { .. } => false,
            Self::OneOf { values, .. } => values.iter().all(|v| v == NO_MATCH),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Equals { key, .. } | Self::OneOf { key, .. } => key,
        }
    }

    /// Evaluate against a feature's attributes. Codes compare as text, so a
    /// numeric attribute `42` matches the value `"42"`.
    pub fn matches(&self, props: &Properties) -> bool {
        let Some(code) = property_code(props, self.key()) else {
            return false;
        };
        match self {
            Self::Equals { value, .. } => code == *value,
            Self::OneOf { values, .. } => values.iter().any(|v| *v == code),
        }
    }
}

impl Serialize for FilterExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Equals { key, value } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element("==")?;
                seq.serialize_element(key)?;
                seq.serialize_element(value)?;
                seq.end()
            }
            Self::OneOf { key, values } => {
                let mut seq = serializer.serialize_seq(Some(2 + values.len()))?;
                seq.serialize_element("in")?;
                seq.serialize_element(key)?;
                for v in values {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_to_legacy_filter_arrays() {
        assert_eq!(
            serde_json::to_value(FilterExpr::equals("CODIGO", "P12")).unwrap(),
            json!(["==", "CODIGO", "P12"])
        );
        assert_eq!(
            serde_json::to_value(FilterExpr::exclude_all("Codrnap")).unwrap(),
            json!(["in", "Codrnap", "NO_MATCH"])
        );
    }

    #[test]
    fn evaluates_against_properties() {
        let props = json!({"Codrnap": 42, "Name": "SP1-004"});
        let props = props.as_object().unwrap();
        assert!(FilterExpr::one_of("Codrnap", ["7", "42"]).matches(props));
        assert!(FilterExpr::equals("Name", "SP1-004").matches(props));
        assert!(!FilterExpr::equals("CODIGO", "P1").matches(props), "missing key never matches");
        assert!(!FilterExpr::exclude_all("Name").matches(props));
    }

    #[test]
    fn sentinel_is_recognised() {
        assert!(FilterExpr::exclude_all("Name").matches_nothing());
        assert!(!FilterExpr::one_of("Name", ["SP1"]).matches_nothing());
    }
}
