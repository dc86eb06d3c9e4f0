//! JSON reader and writer for periodontal charts, plus a file-backed
//! record service.
//!
//! The writer always emits the canonical shape: `teeth` is an array of 32
//! records in tooth order. The reader also accepts what older clients
//! stored: teeth keyed by number (`{"1": {...}}`), arrays with explicit
//! `tooth` numbers, numbers sent as strings, and charts missing some teeth.

use chrono::{DateTime, NaiveDate};
use perio_core::{
    Chart, ChartConfig, FurcationGrade, MissingToothPolicy, PerioError, ProbingDepth, SiteDepths,
    ToothChart, ToothMeasurement, ToothNumber, TOOTH_COUNT,
};
use serde_json::{Map, Value};

mod gateway;

pub use gateway::JsonFileGateway;

/// Read a chart from a JSON string.
pub fn parse_chart_str(chart_json: &str, config: &ChartConfig) -> Result<Chart, PerioError> {
    let value: Value =
        serde_json::from_str(chart_json).map_err(|err| PerioError::Parse(err.to_string()))?;
    parse_chart_value(&value, config)
}

/// Read a chart from a `serde_json::Value`. A saved envelope
/// (`{"savedAt": ..., "chart": {...}}`) is unwrapped first.
pub fn parse_chart_value(value: &Value, config: &ChartConfig) -> Result<Chart, PerioError> {
    let root = value
        .as_object()
        .ok_or_else(|| PerioError::Parse("chart must be a JSON object".to_string()))?;

    if !root.contains_key("teeth") {
        if let Some(inner) = root.get("chart") {
            return parse_chart_value(inner, config);
        }
    }

    let patient_id = string_field(root, &["patientId", "patient_id"])
        .ok_or_else(|| PerioError::Parse("missing patientId".to_string()))?;
    let exam_date = string_field(root, &["examDate", "exam_date", "date"])
        .ok_or_else(|| PerioError::Parse("missing examDate".to_string()))
        .and_then(|raw| parse_exam_date(&raw))?;
    let notes = string_field(root, &["notes"]).unwrap_or_default();

    let entries = match root.get("teeth") {
        Some(teeth) => parse_teeth(teeth)?,
        None => Vec::new(),
    };
    let (teeth, missing) = ToothChart::from_entries(entries);

    if !missing.is_empty() {
        let numbers: Vec<u8> = missing.iter().map(|tooth| tooth.get()).collect();
        match config.missing_teeth {
            MissingToothPolicy::Reject => {
                return Err(PerioError::MissingTeeth { missing: numbers })
            }
            MissingToothPolicy::Backfill => {
                tracing::warn!(
                    patient_id = %patient_id,
                    missing = ?numbers,
                    "chart is missing teeth; filled with blank records"
                );
            }
        }
    }

    Ok(Chart {
        patient_id,
        exam_date,
        teeth,
        notes,
    })
}

/// Canonical JSON form of a chart.
pub fn chart_to_value(chart: &Chart) -> Result<Value, PerioError> {
    serde_json::to_value(chart).map_err(|err| PerioError::Encode(err.to_string()))
}

pub fn chart_to_string_pretty(chart: &Chart) -> Result<String, PerioError> {
    serde_json::to_string_pretty(chart).map_err(|err| PerioError::Encode(err.to_string()))
}

fn parse_exam_date(raw: &str) -> Result<NaiveDate, PerioError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| PerioError::Parse(format!("examDate {raw:?} is not a date")))
}

fn parse_teeth(teeth: &Value) -> Result<Vec<(ToothNumber, ToothMeasurement)>, PerioError> {
    let mut entries: Vec<(ToothNumber, ToothMeasurement)> = Vec::with_capacity(TOOTH_COUNT);

    match teeth {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if item.is_null() {
                    continue;
                }
                let tooth = match explicit_tooth_number(item)? {
                    Some(tooth) => tooth,
                    None => tooth_from_index(index)?,
                };
                push_unique(&mut entries, tooth, parse_measurement(tooth, item)?)?;
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                if item.is_null() {
                    continue;
                }
                let number: u8 = key.trim().parse().map_err(|_| {
                    PerioError::Parse(format!("teeth key {key:?} is not a tooth number"))
                })?;
                let tooth = ToothNumber::new(number)
                    .map_err(|err| PerioError::Parse(err.to_string()))?;
                push_unique(&mut entries, tooth, parse_measurement(tooth, item)?)?;
            }
        }
        Value::Null => {}
        _ => return Err(PerioError::Parse("teeth must be an array or object".to_string())),
    }

    Ok(entries)
}

fn push_unique(
    entries: &mut Vec<(ToothNumber, ToothMeasurement)>,
    tooth: ToothNumber,
    record: ToothMeasurement,
) -> Result<(), PerioError> {
    if entries.iter().any(|(existing, _)| *existing == tooth) {
        return Err(PerioError::Parse(format!("tooth {tooth} appears more than once")));
    }
    entries.push((tooth, record));
    Ok(())
}

fn explicit_tooth_number(item: &Value) -> Result<Option<ToothNumber>, PerioError> {
    let object = item
        .as_object()
        .ok_or_else(|| PerioError::Parse("tooth record must be an object".to_string()))?;
    let Some(raw) = lookup(object, &["tooth", "toothNumber"]) else {
        return Ok(None);
    };
    let number = match read_integer(raw) {
        Ok(Some(number)) => number,
        Ok(None) => return Ok(None),
        Err(reason) => return Err(PerioError::Parse(format!("tooth number {reason}"))),
    };
    u8::try_from(number)
        .ok()
        .and_then(|n| ToothNumber::new(n).ok())
        .map(Some)
        .ok_or_else(|| PerioError::Parse(format!("tooth number {number} is outside 1..=32")))
}

fn tooth_from_index(index: usize) -> Result<ToothNumber, PerioError> {
    u8::try_from(index + 1)
        .ok()
        .and_then(|number| ToothNumber::new(number).ok())
        .ok_or_else(|| {
            PerioError::Parse(format!("teeth array has more than {TOOTH_COUNT} entries"))
        })
}

fn parse_measurement(tooth: ToothNumber, item: &Value) -> Result<ToothMeasurement, PerioError> {
    let object = item
        .as_object()
        .ok_or_else(|| PerioError::Parse(format!("tooth {tooth}: record must be an object")))?;
    let field_error =
        |field: &str, reason: String| PerioError::Parse(format!("tooth {tooth}: {field} {reason}"));

    let mobility =
        integer_field::<u8>(object, &["mobility"]).map_err(|r| field_error("mobility", r))?;
    let gingival_margin = integer_field::<i8>(object, &["gingivalMargin", "gingival_margin"])
        .map_err(|r| field_error("gingivalMargin", r))?;
    let furcation = integer_field::<u8>(object, &["furcation"])
        .map_err(|r| field_error("furcation", r))?
        .map(FurcationGrade::try_from)
        .transpose()
        .map_err(|_| field_error("furcation", "must be 1, 2 or 3".to_string()))?;

    let implant = bool_field(object, &["implant"]).map_err(|r| field_error("implant", r))?;
    let bleeding_on_probing =
        bool_field(object, &["bleedingOnProbing", "bleeding_on_probing", "bleeding"])
            .map_err(|r| field_error("bleedingOnProbing", r))?;
    let plaque = bool_field(object, &["plaque"]).map_err(|r| field_error("plaque", r))?;

    let probing_depth = match lookup(object, &["probingDepth", "probing_depth"]) {
        None | Some(Value::Null) => ProbingDepth::default(),
        Some(Value::Object(depths)) => ProbingDepth {
            buccal: parse_site_depths(depths.get("buccal"))
                .map_err(|r| field_error("probingDepth.buccal", r))?,
            lingual: parse_site_depths(depths.get("lingual"))
                .map_err(|r| field_error("probingDepth.lingual", r))?,
        },
        Some(_) => return Err(field_error("probingDepth", "must be an object".to_string())),
    };

    Ok(ToothMeasurement {
        mobility,
        implant,
        furcation,
        bleeding_on_probing,
        plaque,
        gingival_margin,
        probing_depth,
    })
}

fn parse_site_depths(value: Option<&Value>) -> Result<SiteDepths, String> {
    let object = match value {
        None | Some(Value::Null) => return Ok(SiteDepths::default()),
        Some(Value::Object(object)) => object,
        Some(_) => return Err("must be an object".to_string()),
    };
    let depth = |key: &str| {
        integer_field::<u8>(object, &[key]).map_err(|reason| format!("{key}: {reason}"))
    };
    Ok(SiteDepths {
        mesial: depth("mesial")?,
        mid: depth("mid")?,
        distal: depth("distal")?,
    })
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

fn string_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match lookup(object, keys)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn integer_field<T: TryFrom<i64>>(
    object: &Map<String, Value>,
    keys: &[&str],
) -> Result<Option<T>, String> {
    let Some(value) = lookup(object, keys) else {
        return Ok(None);
    };
    match read_integer(value)? {
        None => Ok(None),
        Some(number) => T::try_from(number)
            .map(Some)
            .map_err(|_| format!("value {number} is out of range")),
    }
}

/// Integers may arrive as JSON numbers or as strings typed into a form;
/// null and empty strings mean "not recorded".
fn read_integer(value: &Value) -> Result<Option<i64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(Some(int));
            }
            match number.as_f64() {
                Some(float) if float.fract() == 0.0 && float.abs() < i64::MAX as f64 => {
                    Ok(Some(float as i64))
                }
                _ => Err(format!("{number} is not a whole number")),
            }
        }
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<i64>()
                .map(Some)
                .map_err(|_| format!("{text:?} is not a whole number"))
        }
        other => Err(format!("{other} is not a whole number")),
    }
}

fn bool_field(object: &Map<String, Value>, keys: &[&str]) -> Result<bool, String> {
    match lookup(object, keys) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(format!("{number} is not a boolean")),
        },
        Some(Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" | "" => Ok(false),
            _ => Err(format!("{text:?} is not a boolean")),
        },
        Some(other) => Err(format!("{other} is not a boolean")),
    }
}
