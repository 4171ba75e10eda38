//! Ordered lookup strategies for turning an AP/SP code into a feature.
//!
//! Tiers run in order and the first hit wins. Attribute matches always come
//! before the point query, which may return a different feature that merely
//! overlaps the click.

use serde::Serialize;
use tracing::trace;

use crate::feature::{property_code, Properties, ScreenPoint};
use crate::filter::FilterExpr;
use crate::layers::LayerGroup;
use crate::text::digit_runs;

use super::options::LookupFields;
use super::source::FeatureSource;

/// Everything a strategy may look at.
pub struct CodeQuery<'a> {
    pub code: &'a str,
    /// Layer group the code belongs to (protected areas or priority sites).
    pub group: LayerGroup,
    pub fields: &'a LookupFields,
    pub features: &'a dyn FeatureSource,
    pub point: Option<ScreenPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    ExactAttribute,
    NumericAttribute,
    RenderedAtPoint,
}

pub type Strategy = fn(&CodeQuery<'_>) -> Option<Properties>;

pub const STRATEGIES: [(Tier, Strategy); 3] = [
    (Tier::ExactAttribute, exact_attribute),
    (Tier::NumericAttribute, numeric_attribute),
    (Tier::RenderedAtPoint, rendered_at_point),
];

/// Loaded feature whose identifier field equals the code, trying each known
/// source layer name in order.
pub fn exact_attribute(q: &CodeQuery<'_>) -> Option<Properties> {
    let filter = FilterExpr::equals(q.fields.id_field.as_str(), q.code);
    q.fields.source_layers.iter().find_map(|layer| {
        q.features
            .query_source_features(q.group.source_id(), layer, Some(&filter))
            .into_iter()
            .find(|props| filter.matches(props))
    })
}

/// Loaded feature whose alternate identifier fields hold the same numbers
/// as the code, run by run ("SP1-004" matches `1-4` but not `10-04`).
pub fn numeric_attribute(q: &CodeQuery<'_>) -> Option<Properties> {
    let wanted = digit_runs(q.code)?;
    q.fields.source_layers.iter().find_map(|layer| {
        q.features
            .query_source_features(q.group.source_id(), layer, None)
            .into_iter()
            .find(|props| {
                q.fields.alternate_id_fields.iter().any(|field| {
                    property_code(props, field).and_then(|v| digit_runs(&v)).as_ref() == Some(&wanted)
                })
            })
    })
}

/// Topmost feature of the group's fill layer under the click point.
pub fn rendered_at_point(q: &CodeQuery<'_>) -> Option<Properties> {
    let point = q.point?;
    q.features
        .query_rendered_features(point, &[q.group.fill_layer()])
        .into_iter()
        .next()
}

/// Run the tiers in order and report which one matched.
pub fn first_match(q: &CodeQuery<'_>) -> Option<(Tier, Properties)> {
    STRATEGIES.iter().find_map(|(tier, strategy)| {
        let hit = strategy(q)?;
        trace!(code = q.code, ?tier, "resolved cross-layer code");
        Some((*tier, hit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::MapFeature;
    use crate::resolver::source::StaticFeatureSource;
    use serde_json::json;

    fn feature(source: &str, source_layer: &str, props: serde_json::Value) -> MapFeature {
        MapFeature {
            source: source.into(),
            source_layer: Some(source_layer.into()),
            layer_id: format!("{source}-fill"),
            properties: props.as_object().cloned().unwrap_or_default(),
            ..MapFeature::default()
        }
    }

    fn query<'a>(
        code: &'a str,
        fields: &'a LookupFields,
        features: &'a StaticFeatureSource,
        point: Option<ScreenPoint>,
    ) -> CodeQuery<'a> {
        CodeQuery { code, group: LayerGroup::ProtectedAreas, fields, features, point }
    }

    #[test]
    fn exact_tier_tries_alternate_source_layers() {
        let fields = LookupFields::for_group(LayerGroup::ProtectedAreas);
        let features = StaticFeatureSource {
            loaded: vec![feature("areas_protegidas", "areas_protegidas", json!({"Codrnap": "123", "NOMBRE": "PN Alerce"}))],
            ..Default::default()
        };
        let hit = exact_attribute(&query("123", &fields, &features, None)).unwrap();
        assert_eq!(hit["NOMBRE"], "PN Alerce");
        assert!(exact_attribute(&query("124", &fields, &features, None)).is_none());
    }

    #[test]
    fn numeric_tier_matches_alternate_identifier_fields() {
        let fields = LookupFields::for_group(LayerGroup::ProtectedAreas);
        let features = StaticFeatureSource {
            loaded: vec![feature("areas_protegidas", "Areas_Protegidas", json!({"COD_RNAP": 123, "NOMBRE": "RN Malleco"}))],
            ..Default::default()
        };
        let q = query("AP-0123", &fields, &features, None);
        assert!(exact_attribute(&q).is_none());
        assert_eq!(numeric_attribute(&q).unwrap()["NOMBRE"], "RN Malleco");
        assert!(numeric_attribute(&query("sin digitos", &fields, &features, None)).is_none());
    }

    #[test]
    fn numeric_tier_keeps_digit_runs_apart_and_skips_primary_field() {
        let fields = LookupFields::for_group(LayerGroup::PrioritySites);
        let features = StaticFeatureSource {
            loaded: vec![
                feature("sitios_prioritarios", "sitios_prior_integrados", json!({"Name": "SP10-04", "NOMBRE": "Wrong site"})),
                feature("sitios_prioritarios", "sitios_prior_integrados", json!({"Name": "X", "COD_SP": "SP100-4", "NOMBRE": "Also wrong"})),
            ],
            ..Default::default()
        };
        let q = CodeQuery {
            code: "SP1-004",
            group: LayerGroup::PrioritySites,
            fields: &fields,
            features: &features,
            point: None,
        };
        assert!(first_match(&q).is_none());

        let q = CodeQuery { code: "SP-100-0004", ..q };
        assert_eq!(numeric_attribute(&q).unwrap()["NOMBRE"], "Also wrong");
    }

    #[test]
    fn rendered_tier_needs_a_point() {
        let fields = LookupFields::for_group(LayerGroup::ProtectedAreas);
        let features = StaticFeatureSource {
            rendered: vec![feature("areas_protegidas", "Areas_Protegidas", json!({"NOMBRE": "Overlapping"}))],
            ..Default::default()
        };
        assert!(rendered_at_point(&query("9", &fields, &features, None)).is_none());
        let point = Some(ScreenPoint { x: 10.0, y: 20.0 });
        assert_eq!(rendered_at_point(&query("9", &fields, &features, point)).unwrap()["NOMBRE"], "Overlapping");
    }

    #[test]
    fn attribute_match_wins_over_point_query() {
        let fields = LookupFields::for_group(LayerGroup::ProtectedAreas);
        let features = StaticFeatureSource {
            loaded: vec![feature("areas_protegidas", "Areas_Protegidas", json!({"Codrnap": "7", "NOMBRE": "Exact"}))],
            rendered: vec![feature("areas_protegidas", "Areas_Protegidas", json!({"NOMBRE": "Overlapping"}))],
        };
        let point = Some(ScreenPoint { x: 0.0, y: 0.0 });
        let (tier, hit) = first_match(&query("7", &fields, &features, point)).unwrap();
        assert_eq!(tier, Tier::ExactAttribute);
        assert_eq!(hit["NOMBRE"], "Exact");

        let (tier, _) = first_match(&query("8", &fields, &features, point)).unwrap();
        assert_eq!(tier, Tier::RenderedAtPoint);
    }
}
