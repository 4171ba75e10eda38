//! Façade checks run in a JS host: `wasm-pack test --node crates/ecomap-wasm`.
#![cfg(target_arch = "wasm32")]

use ecomap_wasm::{clickable_layers, EcomapDashboard};
use js_sys::{Array, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

const STATISTICS: &str = r#"[
    {"id": "P12", "name": "Bosque laurifolio", "total_has": 1000, "protected_has": 400,
     "sp_net_has": 0, "pct_protected": 40, "pct_sp_Contribution": 0, "pct_total_potential": 40}
]"#;

fn kind(command: &JsValue) -> String {
    Reflect::get(command, &JsValue::from_str("command"))
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

#[wasm_bindgen_test]
fn search_returns_one_filter_per_style_layer() {
    let dash = EcomapDashboard::new(None).unwrap();
    let loaded = Array::from(&dash.load_dataset("statistics", STATISTICS).unwrap());
    assert_eq!(loaded.length(), 8);

    let commands = Array::from(&dash.set_search_term("bosque laurifolio").unwrap());
    assert_eq!(commands.length(), 8, "no bounds loaded, so no viewport fit");
    assert!(commands.iter().all(|c| kind(&c) == "setFilter"));
    assert_eq!(dash.search_term(), "bosque laurifolio");
}

#[wasm_bindgen_test]
fn unknown_dataset_is_rejected() {
    let dash = EcomapDashboard::new(None).unwrap();
    assert!(dash.load_dataset("tiles", "[]").is_err());
}

#[wasm_bindgen_test]
fn click_layers_list_the_ecosystems_first() {
    let layers = Array::from(&clickable_layers().unwrap());
    assert_eq!(layers.length(), 4);
    assert_eq!(layers.get(0).as_string().as_deref(), Some("ecosistemas-integrados-fill"));
}
