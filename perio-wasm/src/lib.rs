//! Framework-neutral WASM <-> JavaScript bridge for periodontal charting.
//!
//! Every function takes and returns plain JS objects in the canonical chart
//! shape, so any front end can keep the chart in its own state store.

use chrono::NaiveDate;
use perio_core::{
    render_grid, summarize, Chart, ChartConfig, ChartKey, ChartUpdate, DepthBand,
    MeasurementStore, MissingToothPolicy, PerioError, SelectionCursor, ToggleField, ToothNumber,
};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsChartConfig {
    #[serde(default)]
    missing_teeth: Option<MissingToothPolicy>,
    #[serde(default)]
    max_probing_depth: Option<u8>,
}

impl From<JsChartConfig> for ChartConfig {
    fn from(cfg: JsChartConfig) -> Self {
        let mut base = ChartConfig::default();
        if let Some(policy) = cfg.missing_teeth {
            base.missing_teeth = policy;
        }
        if let Some(limit) = cfg.max_probing_depth {
            base.max_probing_depth = Some(limit);
        }
        base
    }
}

#[derive(Serialize)]
struct DepthClassification {
    band: DepthBand,
    css_class: &'static str,
    label: &'static str,
}

/// Blank chart for a new exam. `exam_date` is `YYYY-MM-DD`.
#[wasm_bindgen]
pub fn new_chart(patient_id: &str, exam_date: &str) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let date = NaiveDate::parse_from_str(exam_date, "%Y-%m-%d")
        .map_err(|err| JsValue::from_str(&format!("Invalid exam date {exam_date:?}: {err}")))?;
    let key = ChartKey::new(patient_id, date).map_err(to_js_error)?;
    serialize(&Chart::new(key))
}

/// Reads a stored chart, accepting legacy shapes.
#[wasm_bindgen]
pub fn parse_chart(chart_json: &str, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let cfg = read_config(config)?;
    let chart = perio_json::parse_chart_str(chart_json, &cfg).map_err(to_js_error)?;
    serialize(&chart)
}

/// Applies one typed update (`{field, value}`) to a tooth and returns the new chart.
#[wasm_bindgen]
pub fn apply_update(
    chart: JsValue,
    tooth: u8,
    update: JsValue,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    let mut store = read_store(chart, config)?;
    let tooth = ToothNumber::new(tooth).map_err(to_js_error)?;
    let update: ChartUpdate = from_value(update)
        .map_err(|err| JsValue::from_str(&format!("Cannot read update: {err}")))?;
    store.set_field(tooth, update).map_err(to_js_error)?;
    serialize(store.chart())
}

/// Flips `bleedingOnProbing`, `plaque` or `implant`.
#[wasm_bindgen]
pub fn toggle_field(chart: JsValue, tooth: u8, field: &str) -> Result<JsValue, JsValue> {
    let mut store = read_store(chart, None)?;
    let tooth = ToothNumber::new(tooth).map_err(to_js_error)?;
    let field: ToggleField = serde_json::from_value(serde_json::Value::String(field.to_string()))
        .map_err(|_| JsValue::from_str(&format!("Field {field:?} cannot be toggled")))?;
    store.toggle(tooth, field);
    serialize(store.chart())
}

/// Next cursor position after a probing-depth commit.
#[wasm_bindgen]
pub fn advance_cursor(cursor: JsValue) -> Result<JsValue, JsValue> {
    let mut cursor = read_cursor(cursor)?;
    cursor.advance();
    serialize(&cursor)
}

#[wasm_bindgen]
pub fn render_chart_grid(chart: JsValue, cursor: Option<JsValue>) -> Result<JsValue, JsValue> {
    let chart = read_chart(chart)?;
    let cursor = match cursor {
        Some(value) if !value.is_undefined() && !value.is_null() => read_cursor(value)?,
        _ => SelectionCursor::default(),
    };
    serialize(&render_grid(&chart, &cursor))
}

#[wasm_bindgen]
pub fn summarize_chart(chart: JsValue) -> Result<JsValue, JsValue> {
    let chart = read_chart(chart)?;
    serialize(&summarize(&chart))
}

#[wasm_bindgen]
pub fn classify_depth(depth: Option<u8>) -> Result<JsValue, JsValue> {
    let band = DepthBand::classify(depth);
    serialize(&DepthClassification {
        band,
        css_class: band.css_class(),
        label: band.label(),
    })
}

fn install_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn read_config(config: Option<JsValue>) -> Result<ChartConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsChartConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Cannot read config: {err}")))?;
            Ok(ChartConfig::from(cfg))
        }
        _ => Ok(ChartConfig::default()),
    }
}

fn read_chart(chart: JsValue) -> Result<Chart, JsValue> {
    install_panic_hook();
    from_value(chart).map_err(|err| JsValue::from_str(&format!("Cannot read chart: {err}")))
}

fn read_store(chart: JsValue, config: Option<JsValue>) -> Result<MeasurementStore, JsValue> {
    let chart = read_chart(chart)?;
    Ok(MeasurementStore::load(chart, read_config(config)?))
}

fn read_cursor(cursor: JsValue) -> Result<SelectionCursor, JsValue> {
    from_value(cursor).map_err(|err| JsValue::from_str(&format!("Cannot read cursor: {err}")))
}

fn serialize<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|err| JsValue::from_str(&format!("Cannot serialize result: {err}")))
}

fn to_js_error(err: PerioError) -> JsValue {
    JsValue::from_str(&format!("Perio chart error: {err}"))
}
