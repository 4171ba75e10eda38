//! Feature attribute resolver: raw feature attributes → popup fields.
//!
//! Resolution is a pure function of its inputs. The raw attributes are never
//! modified; a new ordered field list is built instead.

mod options;
mod source;
pub mod strategy;

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use crate::feature::{property_code, MapFeature, Properties, ScreenPoint};
use crate::formations::FormationLookup;
use crate::layers::LayerGroup;
use crate::text::{is_url, locale_cmp, parse_number};

pub use options::{LookupFields, ResolverOptions};
pub use source::{FeatureSource, NoFeatures, StaticFeatureSource};
pub use strategy::{CodeQuery, Tier};

pub const ECOSYSTEM_LABEL: &str = "Ecosistema";
pub const PROTECTED_AREA_LABEL: &str = "Área Protegida";
pub const PRIORITY_SITE_LABEL: &str = "Sitio Prioritario";

/// Labels that always lead the field list, in this order.
const PINNED: [&str; 3] = [ECOSYSTEM_LABEL, PROTECTED_AREA_LABEL, PRIORITY_SITE_LABEL];

/// Title for features on layers outside the catalog.
const GENERIC_TITLE: &str = "Detalle";

/// Display form of one attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum FieldValue {
    Text(String),
    /// Rendered as a clickable reference.
    Link(String),
    /// No associated feature; carries the label to show.
    NoMatch(String),
}

impl FieldValue {
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(s) | Self::Link(s) | Self::NoMatch(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledField {
    pub label: String,
    pub value: FieldValue,
}

/// Popup content for a clicked feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureLabel {
    pub title: String,
    /// Ecosystem code, when the feature belongs to an ecosystem layer.
    pub ecosystem_id: Option<String>,
    pub fields: Vec<LabeledField>,
}

impl FeatureLabel {
    pub fn field(&self, label: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.label == label).map(|f| &f.value)
    }
}

/// Lookups available while resolving.
pub struct ResolveContext<'a> {
    pub formations: &'a FormationLookup,
    pub features: &'a dyn FeatureSource,
    /// Click position, for the rendered-feature fallback.
    pub point: Option<ScreenPoint>,
    pub options: &'a ResolverOptions,
}

/// How a cross-layer code ended up being displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeResolution {
    /// Sentinel code: no associated feature, nothing was queried.
    NoMatch,
    Found { tier: Tier, name: String },
    /// Every tier failed; the raw code is shown.
    Unresolved(String),
}

/// Resolve an AP or SP code to a display name.
pub fn resolve_code(code: &str, group: LayerGroup, ctx: &ResolveContext<'_>) -> CodeResolution {
    let options = ctx.options;
    if options.is_sentinel(code) {
        return CodeResolution::NoMatch;
    }
    let Some(fields) = options.lookup_fields(group) else {
        return CodeResolution::Unresolved(code.to_string());
    };
    let query = CodeQuery {
        code,
        group,
        fields,
        features: ctx.features,
        point: ctx.point,
    };
    match strategy::first_match(&query) {
        Some((tier, props)) => CodeResolution::Found {
            tier,
            name: display_name(&props, &options.name_fields).unwrap_or_else(|| code.to_string()),
        },
        None => CodeResolution::Unresolved(code.to_string()),
    }
}

/// First non-empty name attribute.
fn display_name(props: &Properties, name_fields: &[String]) -> Option<String> {
    name_fields.iter().find_map(|f| property_code(props, f))
}

fn cross_field(label: &str, code: &str, group: LayerGroup, ctx: &ResolveContext<'_>) -> LabeledField {
    let value = match resolve_code(code, group, ctx) {
        CodeResolution::NoMatch => FieldValue::NoMatch(ctx.options.no_match_label.clone()),
        CodeResolution::Found { name, .. } => FieldValue::Text(name),
        CodeResolution::Unresolved(raw) => FieldValue::Text(raw),
    };
    LabeledField { label: label.to_string(), value }
}

/// Render one raw attribute. `None` for nulls, which are not shown.
pub fn render_value(key: &str, value: &Value, options: &ResolverOptions) -> Option<FieldValue> {
    let fmt = &options.number_format;
    Some(match value {
        Value::Null => return None,
        Value::Number(n) => match n.as_f64() {
            Some(v) => FieldValue::Text(fmt.format(v)),
            None => FieldValue::Text(n.to_string()),
        },
        Value::String(s) if is_url(s) => FieldValue::Link(s.trim().to_string()),
        Value::String(s) => match parse_number(s) {
            Some(v) if options.numeric_fields.iter().any(|f| f == key) => FieldValue::Text(fmt.format(v)),
            _ => FieldValue::Text(s.clone()),
        },
        Value::Bool(b) => FieldValue::Text(b.to_string()),
        other => FieldValue::Text(other.to_string()),
    })
}

/// Pinned labels first in fixed order, then the rest by name.
fn field_order(a: &LabeledField, b: &LabeledField) -> Ordering {
    let pa = PINNED.iter().position(|p| *p == a.label);
    let pb = PINNED.iter().position(|p| *p == b.label);
    match (pa, pb) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => locale_cmp(&a.label, &b.label),
    }
}

fn build_label(raw: &Properties, kind: Option<LayerGroup>, ctx: &ResolveContext<'_>) -> FeatureLabel {
    let options = ctx.options;
    let mut fields = Vec::with_capacity(raw.len() + PINNED.len());
    let mut consumed: Vec<&str> = Vec::new();

    if kind == Some(LayerGroup::Integrated) {
        let eco_field = LayerGroup::Integrated.code_field();
        let ap_field = options.protected_areas.id_field.as_str();
        let sp_field = options.priority_sites.id_field.as_str();
        consumed.extend([eco_field, ap_field, sp_field]);
        consumed.extend(PINNED);

        if let Some(code) = property_code(raw, eco_field) {
            fields.push(LabeledField {
                label: ECOSYSTEM_LABEL.to_string(),
                value: FieldValue::Text(ctx.formations.display_name(&code)),
            });
        }
        if let Some(code) = property_code(raw, ap_field) {
            fields.push(cross_field(PROTECTED_AREA_LABEL, &code, LayerGroup::ProtectedAreas, ctx));
        }
        if let Some(code) = property_code(raw, sp_field) {
            fields.push(cross_field(PRIORITY_SITE_LABEL, &code, LayerGroup::PrioritySites, ctx));
        }
    }

    for (key, value) in raw {
        if consumed.contains(&key.as_str()) {
            continue;
        }
        if let Some(value) = render_value(key, value, options) {
            fields.push(LabeledField { label: key.clone(), value });
        }
    }
    fields.sort_by(field_order);

    FeatureLabel {
        title: kind.map_or(GENERIC_TITLE, LayerGroup::title).to_string(),
        ecosystem_id: kind
            .filter(|k| k.is_ecosystem())
            .and_then(|_| property_code(raw, LayerGroup::Formations.code_field())),
        fields,
    }
}

/// Resolve a feature's raw attributes for a known layer group.
pub fn resolve_feature_label(raw: &Properties, kind: LayerGroup, ctx: &ResolveContext<'_>) -> FeatureLabel {
    build_label(raw, Some(kind), ctx)
}

/// Resolve a clicked feature, deriving its group from the style layer hit.
pub fn resolve_click(feature: &MapFeature, ctx: &ResolveContext<'_>) -> FeatureLabel {
    build_label(&feature.properties, LayerGroup::from_layer_id(&feature.layer_id), ctx)
}
