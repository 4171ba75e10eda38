use serde::Serialize;
use tracing::debug;

use crate::bounds::{BoundingBox, BoundsIndex};
use crate::commands::{FitOptions, MapCommand};
use crate::layers::LayerGroup;
use crate::relations::RelationIndex;
use crate::search::resolve_exact;
use crate::stats::StatisticsStore;

use super::FilterExpr;

/// Complete filter state for the map.
///
/// Every group gets an explicit value (`None` = unfiltered), so applying a
/// plan never depends on filters left over from an earlier plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPlan {
    /// Applied to both the formations and the integrated ecosystem layers.
    pub ecosystem: Option<FilterExpr>,
    pub protected_areas: Option<FilterExpr>,
    pub priority_sites: Option<FilterExpr>,
    /// Viewport to fly to, when the matched ecosystem has known bounds.
    pub fit_bounds: Option<BoundingBox>,
    /// Code of the ecosystem the search term resolved to.
    pub matched_ecosystem: Option<String>,
}

impl FilterPlan {
    /// Everything visible, no viewport change.
    pub fn clear() -> Self {
        Self {
            ecosystem: None,
            protected_areas: None,
            priority_sites: None,
            fit_bounds: None,
            matched_ecosystem: None,
        }
    }

    pub fn is_clear(&self) -> bool {
        *self == Self::clear()
    }

    pub fn filter_for(&self, group: LayerGroup) -> Option<&FilterExpr> {
        match group {
            LayerGroup::Formations | LayerGroup::Integrated => self.ecosystem.as_ref(),
            LayerGroup::ProtectedAreas => self.protected_areas.as_ref(),
            LayerGroup::PrioritySites => self.priority_sites.as_ref(),
        }
    }

    /// Expand into map commands: the viewport fit (if any), then one
    /// `SetFilter` per style layer of every group.
    pub fn commands(&self, fit: FitOptions) -> Vec<MapCommand> {
        let mut out = Vec::with_capacity(9);
        if let Some(bounds) = self.fit_bounds {
            out.push(MapCommand::FitBounds { bounds, options: fit });
        }
        for group in LayerGroup::ALL {
            let filter = self.filter_for(group);
            for layer_id in group.style_layers() {
                out.push(MapCommand::SetFilter {
                    layer_id: layer_id.to_string(),
                    filter: filter.cloned(),
                });
            }
        }
        out
    }
}

/// Membership filter over `codes`, or the sentinel exclusion when the list is
/// empty. An ecosystem without related features must hide the layer, not
/// leave it unfiltered.
fn related_filter(group: LayerGroup, codes: &[String]) -> FilterExpr {
    if codes.is_empty() {
        FilterExpr::exclude_all(group.code_field())
    } else {
        FilterExpr::one_of(group.code_field(), codes.iter().cloned())
    }
}

/// Derive the filter plan for a search term.
///
/// - empty term: [`FilterPlan::clear`];
/// - term naming an ecosystem (case-insensitive exact match): ecosystem layers
///   restricted to its code, AP/SP layers restricted to its related codes,
///   viewport fit to its bounds when known;
/// - any other term: ecosystem layers untouched, AP/SP layers excluded, the
///   same outcome as an ecosystem with no related features.
///
/// Stores that have not loaded yet are simply empty.
pub fn compute_filters(
    search_term: &str,
    stats: &StatisticsStore,
    relations: &RelationIndex,
    bounds: &BoundsIndex,
) -> FilterPlan {
    if search_term.is_empty() {
        debug!("clearing map filters");
        return FilterPlan::clear();
    }

    let Some(eco) = resolve_exact(stats.records(), search_term) else {
        debug!(term = search_term, "search term matches no ecosystem");
        return FilterPlan {
            protected_areas: Some(FilterExpr::exclude_all(LayerGroup::ProtectedAreas.code_field())),
            priority_sites: Some(FilterExpr::exclude_all(LayerGroup::PrioritySites.code_field())),
            ..FilterPlan::clear()
        };
    };

    debug!(id = %eco.id, name = %eco.name, "filtering map to ecosystem");
    FilterPlan {
        ecosystem: Some(FilterExpr::equals(LayerGroup::Formations.code_field(), eco.id.clone())),
        protected_areas: Some(related_filter(LayerGroup::ProtectedAreas, relations.aps_for(&eco.id))),
        priority_sites: Some(related_filter(LayerGroup::PrioritySites, relations.sps_for(&eco.id))),
        fit_bounds: bounds.get(&eco.id).copied(),
        matched_ecosystem: Some(eco.id.clone()),
    }
}
