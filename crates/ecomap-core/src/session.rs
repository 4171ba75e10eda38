//! Dashboard session: the single scope owning data and interaction state.
//!
//! Every user transition returns the map commands the host should apply.
//! View models are recomputed from the current state on request, so they
//! never go stale when datasets arrive late or out of order.

use tracing::{debug, warn};

use crate::aggregate::{
    coverage_slices, gap_chart_rows, global_aggregate, national_benchmark, per_ecosystem_breakdown,
    ChartRow, CoverageAggregate, CoverageSlice, EcosystemBreakdown, NationalBenchmark,
};
use crate::analysis::{threshold_report, ThresholdMode, ThresholdReport};
use crate::commands::MapCommand;
use crate::config::DashboardConfig;
use crate::datasets::{Dataset, Datasets};
use crate::error::DataResult;
use crate::feature::{MapFeature, ScreenPoint};
use crate::filter::{compute_filters, FilterPlan};
use crate::formations::FormationRecord;
use crate::hover::{HoverTracker, HoverTransition};
use crate::layers::{LayerGroup, LayerToggles};
use crate::resolver::{resolve_click, FeatureLabel, FeatureSource, ResolveContext};
use crate::search::{filter_subset, resolve_exact, search_term_for_code};
use crate::stats::EcosystemStat;

#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    data: Datasets,
    search_term: String,
    /// Ecosystem picked by clicking the map.
    selected: Option<String>,
    threshold: f64,
    toggles: LayerToggles,
    hover: HoverTracker,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            threshold: config.default_threshold,
            config,
            data: Datasets::new(),
            search_term: String::new(),
            selected: None,
            toggles: LayerToggles::default(),
            hover: HoverTracker::new(),
        }
    }

    /// Session over already-loaded datasets.
    pub fn with_datasets(config: DashboardConfig, data: Datasets) -> Self {
        Self { data, ..Self::new(config) }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn datasets(&self) -> &Datasets {
        &self.data
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn selected_ecosystem(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn toggles(&self) -> &LayerToggles {
        &self.toggles
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    /// Everything needed to bring a fresh map in line with the session.
    pub fn initial_commands(&self) -> Vec<MapCommand> {
        let mut out = self.toggles.commands();
        out.extend(self.filter_commands());
        out
    }

    fn filter_commands(&self) -> Vec<MapCommand> {
        self.filter_plan().commands(self.config.fit)
    }

    /// Load one dataset. Datasets feeding the filters re-emit the filter
    /// commands, since a late load can change the plan for the current term.
    pub fn load_dataset(&mut self, dataset: Dataset, json: &str) -> DataResult<Vec<MapCommand>> {
        if let Err(e) = self.data.load(dataset, json) {
            warn!(%dataset, error = %e, "dataset load failed, keeping previous contents");
            return Err(e);
        }
        Ok(match dataset {
            Dataset::Statistics | Dataset::Relations | Dataset::Bounds => self.filter_commands(),
            Dataset::Formations => Vec::new(),
        })
    }

    pub fn set_search_term(&mut self, term: &str) -> Vec<MapCommand> {
        if term == self.search_term {
            return Vec::new();
        }
        debug!(term, "search term changed");
        self.search_term = term.to_string();
        self.filter_commands()
    }

    pub fn clear_search(&mut self) -> Vec<MapCommand> {
        self.set_search_term("")
    }

    /// Catalog pick: search for the ecosystem with `code`. Unknown codes are
    /// ignored.
    pub fn pick_formation_code(&mut self, code: &str) -> Vec<MapCommand> {
        let Some(name) = search_term_for_code(self.data.stats.records(), code) else {
            debug!(code, "picked code has no statistics record");
            return Vec::new();
        };
        let name = name.to_string();
        self.set_search_term(&name)
    }

    /// Selection from a map click. Does not touch the filters.
    pub fn select_ecosystem(&mut self, id: Option<&str>) {
        self.selected = id.map(str::to_string);
    }

    /// Clamped to 0–100. Thresholds only affect view models, not the map.
    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = if threshold.is_nan() { 0.0 } else { threshold.clamp(0.0, 100.0) };
    }

    pub fn set_layer_visible(&mut self, group: LayerGroup, visible: bool) -> Vec<MapCommand> {
        self.toggles.set(group, visible);
        self.toggles.commands_for(group)
    }

    pub fn toggle_layer(&mut self, group: LayerGroup) -> Vec<MapCommand> {
        self.toggles.toggle(group);
        self.toggles.commands_for(group)
    }

    pub fn pointer_move(&mut self, hit: Option<&MapFeature>) -> Vec<MapCommand> {
        self.hover
            .pointer_move(hit)
            .into_iter()
            .map(HoverTransition::into_command)
            .collect()
    }

    pub fn pointer_leave(&mut self) -> Vec<MapCommand> {
        self.hover
            .pointer_leave()
            .into_iter()
            .map(HoverTransition::into_command)
            .collect()
    }

    /// Resolve a clicked feature for the popup. Clicks on ecosystem layers
    /// also select that ecosystem.
    pub fn click(
        &mut self,
        feature: &MapFeature,
        features: &dyn FeatureSource,
        point: Option<ScreenPoint>,
    ) -> FeatureLabel {
        let label = self.label_for(feature, features, point);
        if let Some(id) = &label.ecosystem_id {
            self.selected = Some(id.clone());
        }
        label
    }

    /// Same as [`Dashboard::click`] without changing the selection.
    pub fn label_for(
        &self,
        feature: &MapFeature,
        features: &dyn FeatureSource,
        point: Option<ScreenPoint>,
    ) -> FeatureLabel {
        let ctx = ResolveContext {
            formations: &self.data.formations,
            features,
            point,
            options: &self.config.resolver,
        };
        resolve_click(feature, &ctx)
    }

    // ── View models ──────────────────────────────────────────────────────────

    pub fn filter_plan(&self) -> FilterPlan {
        compute_filters(&self.search_term, &self.data.stats, &self.data.relations, &self.data.bounds)
    }

    /// Records the statistics view shows for the current term.
    pub fn filtered_stats(&self) -> Vec<&EcosystemStat> {
        filter_subset(self.data.stats.records(), &self.search_term)
    }

    pub fn global_aggregate(&self) -> CoverageAggregate {
        global_aggregate(self.filtered_stats())
    }

    /// Always over the full store, whatever the search term.
    pub fn national_benchmark(&self) -> NationalBenchmark {
        national_benchmark(self.data.stats.records())
    }

    /// Ecosystem in focus: the exact search match, else the clicked one.
    pub fn selected_stat(&self) -> Option<&EcosystemStat> {
        let records = self.data.stats.records();
        resolve_exact(records, &self.search_term)
            .or_else(|| self.selected.as_deref().and_then(|id| self.data.stats.get(id)))
    }

    pub fn selected_breakdown(&self) -> Option<EcosystemBreakdown> {
        self.selected_stat().map(|s| per_ecosystem_breakdown(s, self.threshold))
    }

    pub fn coverage_slices(&self) -> Option<[CoverageSlice; 3]> {
        self.selected_stat().map(coverage_slices)
    }

    pub fn chart_rows(&self) -> Vec<ChartRow> {
        gap_chart_rows(self.filtered_stats())
    }

    /// Threshold analysis over the whole dataset at the session threshold.
    pub fn analyze(&self, mode: ThresholdMode) -> ThresholdReport {
        threshold_report(mode, self.data.stats.records(), &self.data.relations, self.threshold)
    }

    pub fn formation_catalog(&self) -> &[FormationRecord] {
        self.data.formations.catalog()
    }
}
