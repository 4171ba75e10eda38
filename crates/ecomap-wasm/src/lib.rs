//! Browser bindings for the dashboard engine.
//!
//! One [`EcomapDashboard`] is constructed per page and owns the session.
//! Inputs arrive as JSON text or plain JS objects; every transition returns
//! the map commands as a JS array for the host to apply to its map.

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use anyhow::{anyhow, Context};
use ecomap_core::analysis::ThresholdMode;
use ecomap_core::feature::{MapFeature, Properties, ScreenPoint};
use ecomap_core::resolver::FeatureSource;
use ecomap_core::{Dashboard, DashboardConfig, Dataset, FilterExpr, LayerGroup};
use js_sys::{Function, Promise};
use serde::Serialize;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Style layer ids the host should register click handlers on, topmost
/// first.
#[wasm_bindgen(js_name = "clickableLayers")]
pub fn clickable_layers() -> Result<JsValue, JsValue> {
    to_js(&LayerGroup::clickable_layers())
}

/// Style layer ids whose features feed `pointerMove`.
#[wasm_bindgen(js_name = "hoverableLayers")]
pub fn hoverable_layers() -> Result<JsValue, JsValue> {
    to_js(&LayerGroup::hoverable_layers())
}

fn js_err(e: impl Display) -> JsValue {
    JsValue::from_str(&format!("{e:#}"))
}

/// Plain JS objects and arrays, never `Map`s.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_err)
}

fn parse_dataset(name: &str) -> anyhow::Result<Dataset> {
    Ok(name.parse::<Dataset>()?)
}

fn parse_group(key: &str) -> anyhow::Result<LayerGroup> {
    LayerGroup::from_source_id(key).ok_or_else(|| anyhow!("unknown layer `{key}`"))
}

fn parse_feature(value: JsValue) -> anyhow::Result<Option<MapFeature>> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(value)
        .map(Some)
        .map_err(|e| anyhow!("{e}"))
        .context("invalid feature")
}

fn parse_point(value: JsValue) -> anyhow::Result<Option<ScreenPoint>> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(value)
        .map(Some)
        .map_err(|e| anyhow!("{e}"))
        .context("invalid point")
}

// ── Feature queries through JS callbacks ─────────────────────────────────────

/// Feature lookups answered by the host map.
///
/// `query_source(source, sourceLayer, filter)` and
/// `query_rendered(point, layerIds)` must return arrays of property objects.
/// A callback that throws or returns something else counts as no features.
struct JsFeatureSource {
    query_source: Function,
    query_rendered: Function,
}

impl JsFeatureSource {
    fn properties(result: Result<JsValue, JsValue>, what: &str) -> Vec<Properties> {
        let value = match result {
            Ok(v) => v,
            Err(e) => {
                warn!(what, error = ?e, "feature query threw");
                return Vec::new();
            }
        };
        serde_wasm_bindgen::from_value(value).unwrap_or_else(|e| {
            warn!(what, error = %e, "feature query returned unexpected shape");
            Vec::new()
        })
    }
}

impl FeatureSource for JsFeatureSource {
    fn query_source_features(
        &self,
        source: &str,
        source_layer: &str,
        filter: Option<&FilterExpr>,
    ) -> Vec<Properties> {
        let filter = match filter.map(to_js).transpose() {
            Ok(f) => f.unwrap_or(JsValue::NULL),
            Err(_) => JsValue::NULL,
        };
        let result = self.query_source.call3(
            &JsValue::NULL,
            &JsValue::from_str(source),
            &JsValue::from_str(source_layer),
            &filter,
        );
        Self::properties(result, "querySourceFeatures")
    }

    fn query_rendered_features(&self, point: ScreenPoint, layer_ids: &[&str]) -> Vec<Properties> {
        let (Ok(point), Ok(layers)) = (to_js(&point), to_js(layer_ids)) else {
            return Vec::new();
        };
        let result = self.query_rendered.call2(&JsValue::NULL, &point, &layers);
        Self::properties(result, "queryRenderedFeatures")
    }
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

#[wasm_bindgen]
pub struct EcomapDashboard {
    inner: Rc<RefCell<Dashboard>>,
}

#[wasm_bindgen]
impl EcomapDashboard {
    /// `config_json` is an optional partial configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<EcomapDashboard, JsValue> {
        let config = match config_json {
            Some(json) => DashboardConfig::from_json_str(&json).map_err(js_err)?,
            None => DashboardConfig::default(),
        };
        Ok(Self { inner: Rc::new(RefCell::new(Dashboard::new(config))) })
    }

    #[wasm_bindgen(js_name = "initialCommands")]
    pub fn initial_commands(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow().initial_commands())
    }

    /// Load a dataset from JSON text already fetched by the host.
    #[wasm_bindgen(js_name = "loadDataset")]
    pub fn load_dataset(&self, name: &str, json: &str) -> Result<JsValue, JsValue> {
        let dataset = parse_dataset(name).map_err(js_err)?;
        let commands = self.inner.borrow_mut().load_dataset(dataset, json).map_err(js_err)?;
        to_js(&commands)
    }

    /// Load a dataset from a promise of its JSON text (e.g. `response.text()`).
    /// Resolves to the map commands; rejects with the load error.
    #[wasm_bindgen(js_name = "loadDatasetAsync")]
    pub fn load_dataset_async(&self, name: String, text: Promise) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let dataset = parse_dataset(&name).map_err(js_err)?;
            let value = JsFuture::from(text).await?;
            let json = value
                .as_string()
                .ok_or_else(|| js_err(format!("{dataset} payload is not text")))?;
            let commands = inner.borrow_mut().load_dataset(dataset, &json).map_err(js_err)?;
            to_js(&commands)
        })
    }

    #[wasm_bindgen(js_name = "setSearchTerm")]
    pub fn set_search_term(&self, term: &str) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow_mut().set_search_term(term))
    }

    #[wasm_bindgen(js_name = "clearSearch")]
    pub fn clear_search(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow_mut().clear_search())
    }

    #[wasm_bindgen(js_name = "pickFormationCode")]
    pub fn pick_formation_code(&self, code: &str) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow_mut().pick_formation_code(code))
    }

    #[wasm_bindgen(js_name = "selectEcosystem")]
    pub fn select_ecosystem(&self, id: Option<String>) {
        self.inner.borrow_mut().select_ecosystem(id.as_deref());
    }

    #[wasm_bindgen(js_name = "setThreshold")]
    pub fn set_threshold(&self, threshold: f64) {
        self.inner.borrow_mut().set_threshold(threshold);
    }

    #[wasm_bindgen(getter)]
    pub fn threshold(&self) -> f64 {
        self.inner.borrow().threshold()
    }

    #[wasm_bindgen(getter, js_name = "searchTerm")]
    pub fn search_term(&self) -> String {
        self.inner.borrow().search_term().to_string()
    }

    /// `layer` is the toggle key, e.g. `"areas_protegidas"`.
    #[wasm_bindgen(js_name = "toggleLayer")]
    pub fn toggle_layer(&self, layer: &str) -> Result<JsValue, JsValue> {
        let group = parse_group(layer).map_err(js_err)?;
        to_js(&self.inner.borrow_mut().toggle_layer(group))
    }

    #[wasm_bindgen(js_name = "setLayerVisible")]
    pub fn set_layer_visible(&self, layer: &str, visible: bool) -> Result<JsValue, JsValue> {
        let group = parse_group(layer).map_err(js_err)?;
        to_js(&self.inner.borrow_mut().set_layer_visible(group, visible))
    }

    /// `feature` is the topmost feature under the pointer on one of
    /// `hoverableLayers()`, or null/undefined.
    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(&self, feature: JsValue) -> Result<JsValue, JsValue> {
        let feature = parse_feature(feature).map_err(js_err)?;
        to_js(&self.inner.borrow_mut().pointer_move(feature.as_ref()))
    }

    #[wasm_bindgen(js_name = "pointerLeave")]
    pub fn pointer_leave(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow_mut().pointer_leave())
    }

    /// Resolve a clicked feature into popup fields. The two callbacks give
    /// access to the map's loaded and rendered features.
    pub fn click(
        &self,
        feature: JsValue,
        point: JsValue,
        query_source: Function,
        query_rendered: Function,
    ) -> Result<JsValue, JsValue> {
        let feature = parse_feature(feature)
            .and_then(|f| f.ok_or_else(|| anyhow!("click without a feature")))
            .map_err(js_err)?;
        let point = parse_point(point).map_err(js_err)?;
        let source = JsFeatureSource { query_source, query_rendered };
        let label = self.inner.borrow_mut().click(&feature, &source, point);
        to_js(&label)
    }

    // ── View models ──────────────────────────────────────────────────────────

    #[wasm_bindgen(js_name = "filterPlan")]
    pub fn filter_plan(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow().filter_plan())
    }

    #[wasm_bindgen(js_name = "filteredStats")]
    pub fn filtered_stats(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow().filtered_stats())
    }

    #[wasm_bindgen(js_name = "globalAggregate")]
    pub fn global_aggregate(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow().global_aggregate())
    }

    #[wasm_bindgen(js_name = "nationalBenchmark")]
    pub fn national_benchmark(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow().national_benchmark())
    }

    #[wasm_bindgen(js_name = "selectedBreakdown")]
    pub fn selected_breakdown(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow().selected_breakdown())
    }

    #[wasm_bindgen(js_name = "chartRows")]
    pub fn chart_rows(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow().chart_rows())
    }

    #[wasm_bindgen(js_name = "coverageSlices")]
    pub fn coverage_slices(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow().coverage_slices())
    }

    /// `mode` is `"OVER"` or `"UNDER"`.
    pub fn analyze(&self, mode: &str) -> Result<JsValue, JsValue> {
        let mode: ThresholdMode = mode.parse().map_err(js_err)?;
        to_js(&self.inner.borrow().analyze(mode))
    }

    #[wasm_bindgen(js_name = "formationCatalog")]
    pub fn formation_catalog(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.borrow().formation_catalog())
    }
}
