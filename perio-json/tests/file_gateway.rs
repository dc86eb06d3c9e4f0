use std::fs;

use chrono::NaiveDate;
use perio_core::{
    Chart, ChartConfig, ChartGateway, ChartKey, ChartSession, ChartUpdate, MissingToothPolicy,
    PerioError, Position, Surface, ToggleField, ToothNumber,
};
use perio_json::JsonFileGateway;
use serde_json::Value;
use tempfile::tempdir;

fn key(day: u32) -> ChartKey {
    ChartKey::new("PT-300", NaiveDate::from_ymd_opt(2024, 7, day).unwrap()).unwrap()
}

#[test]
fn saved_chart_reloads_identically() {
    let dir = tempdir().unwrap();
    let mut gateway = JsonFileGateway::new(dir.path(), ChartConfig::default());
    let eight = ToothNumber::new(8).unwrap();

    let mut session = ChartSession::new_chart(key(2), ChartConfig::default());
    session.toggle(eight, ToggleField::BleedingOnProbing);
    session
        .set_field(
            eight,
            ChartUpdate::ProbingDepth {
                surface: Surface::Buccal,
                position: Position::Mid,
                depth: Some(7),
            },
        )
        .unwrap();
    let receipt = session.save_with(&mut gateway).unwrap();
    assert_eq!(receipt.key, key(2));

    let loaded = gateway.load(&key(2)).unwrap();
    assert_eq!(&loaded, session.chart());

    let path = gateway.chart_path(&key(2)).unwrap();
    assert!(path.ends_with("PT-300/2024-07-02.json"));
    assert!(!path.with_extension("json.tmp").exists());

    let mut raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    normalize_dynamic_fields(&mut raw);
    assert_eq!(raw["savedAt"], "__DYNAMIC_TIMESTAMP__");
    assert_eq!(raw["chart"]["teeth"][7]["probingDepth"]["buccal"]["mid"], 7);
}

#[test]
fn missing_chart_is_not_found() {
    let dir = tempdir().unwrap();
    let gateway = JsonFileGateway::new(dir.path(), ChartConfig::default());
    assert!(matches!(gateway.load(&key(9)), Err(PerioError::NotFound { .. })));
    assert!(gateway.list("PT-300").unwrap().is_empty());
}

#[test]
fn failed_replace_leaves_no_temp_file() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("PT-300").join("2024-07-02.json");
    fs::create_dir_all(&target).unwrap();

    let mut gateway = JsonFileGateway::new(dir.path(), ChartConfig::default());
    let result = gateway.save(&Chart::new(key(2)));

    assert!(
        matches!(result, Err(PerioError::Io { operation: "replace", .. })),
        "unexpected result {result:?}"
    );
    assert!(!dir.path().join("PT-300").join("2024-07-02.json.tmp").exists());
    assert!(target.is_dir());
}

#[test]
fn list_returns_exam_dates_in_order() {
    let dir = tempdir().unwrap();
    let mut gateway = JsonFileGateway::new(dir.path(), ChartConfig::default());
    for day in [15, 3, 28] {
        ChartSession::new_chart(key(day), ChartConfig::default())
            .save_with(&mut gateway)
            .unwrap();
    }
    fs::write(dir.path().join("PT-300").join("notes.txt"), "not a chart").unwrap();

    assert_eq!(gateway.list("PT-300").unwrap(), vec![key(3), key(15), key(28)]);
}

#[test]
fn sparse_file_follows_missing_tooth_policy() {
    let dir = tempdir().unwrap();
    let patient_dir = dir.path().join("PT-300");
    fs::create_dir_all(&patient_dir).unwrap();
    fs::write(
        patient_dir.join("2024-07-05.json"),
        r#"{"patientId":"PT-300","examDate":"2024-07-05","teeth":{"1":{"plaque":true}}}"#,
    )
    .unwrap();

    let lenient = JsonFileGateway::new(dir.path(), ChartConfig::default());
    let chart = lenient.load(&key(5)).unwrap();
    assert!(chart.tooth(ToothNumber::FIRST).plaque);

    let strict = JsonFileGateway::new(
        dir.path(),
        ChartConfig {
            missing_teeth: MissingToothPolicy::Reject,
            ..ChartConfig::default()
        },
    );
    assert!(matches!(strict.load(&key(5)), Err(PerioError::MissingTeeth { .. })));
}

#[test]
fn path_like_patient_ids_are_refused() {
    let dir = tempdir().unwrap();
    let gateway = JsonFileGateway::new(dir.path(), ChartConfig::default());
    assert!(matches!(gateway.list("../other"), Err(PerioError::InvalidKey(_))));
}

fn normalize_dynamic_fields(value: &mut Value) {
    if let Some(obj) = value.as_object_mut() {
        if obj.contains_key("savedAt") {
            obj.insert(
                "savedAt".to_string(),
                Value::String("__DYNAMIC_TIMESTAMP__".to_string()),
            );
        }
    }
}
