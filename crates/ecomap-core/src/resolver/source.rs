use serde::Deserialize;

use crate::feature::{MapFeature, Properties, ScreenPoint};
use crate::filter::FilterExpr;

/// Read access to features the map has already loaded or drawn.
///
/// The resolver never parses tiles itself; it asks the host through this
/// trait and treats every answer as possibly empty.
pub trait FeatureSource {
    /// Features of `source_layer` in `source` that are loaded in the current
    /// viewport, restricted by `filter` when given.
    fn query_source_features(
        &self,
        source: &str,
        source_layer: &str,
        filter: Option<&FilterExpr>,
    ) -> Vec<Properties>;

    /// Features drawn at `point` on the given style layers, topmost first.
    fn query_rendered_features(&self, point: ScreenPoint, layer_ids: &[&str]) -> Vec<Properties>;
}

/// Source with nothing loaded, e.g. when resolving outside a live map.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeatures;

impl FeatureSource for NoFeatures {
    fn query_source_features(&self, _: &str, _: &str, _: Option<&FilterExpr>) -> Vec<Properties> {
        Vec::new()
    }

    fn query_rendered_features(&self, _: ScreenPoint, _: &[&str]) -> Vec<Properties> {
        Vec::new()
    }
}

/// In-memory snapshot of loaded and rendered features.
///
/// `rendered` stands for whatever is under the pointer; the point itself is
/// not interpreted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StaticFeatureSource {
    pub loaded: Vec<MapFeature>,
    pub rendered: Vec<MapFeature>,
}

impl FeatureSource for StaticFeatureSource {
    fn query_source_features(
        &self,
        source: &str,
        source_layer: &str,
        filter: Option<&FilterExpr>,
    ) -> Vec<Properties> {
        self.loaded
            .iter()
            .filter(|f| f.source == source && f.source_layer.as_deref() == Some(source_layer))
            .filter(|f| filter.map_or(true, |expr| expr.matches(&f.properties)))
            .map(|f| f.properties.clone())
            .collect()
    }

    fn query_rendered_features(&self, _point: ScreenPoint, layer_ids: &[&str]) -> Vec<Properties> {
        self.rendered
            .iter()
            .filter(|f| layer_ids.iter().any(|l| *l == f.layer_id))
            .map(|f| f.properties.clone())
            .collect()
    }
}
