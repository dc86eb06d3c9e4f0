use std::fs;

use perio_core::{ChartConfig, DepthBand, FurcationGlyph, SelectionCursor, ToothNumber};
use perio_json::{chart_to_value, parse_chart_str};
use serde_json::Value;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn legacy_chart_matches_golden() {
    let legacy = fs::read_to_string(fixture_path("legacy_chart.json"))
        .expect("failed to read legacy chart fixture");

    let chart = parse_chart_str(&legacy, &ChartConfig::default()).expect("failed to parse chart");
    let actual = chart_to_value(&chart).expect("failed to encode chart");

    let expected = fs::read_to_string(fixture_path("legacy_chart_canonical.json"))
        .expect("failed to read golden chart");
    let expected_value: Value = serde_json::from_str(&expected).expect("golden is not valid JSON");

    assert_eq!(actual, expected_value);
}

#[test]
fn legacy_chart_renders_expected_bands() {
    let legacy = fs::read_to_string(fixture_path("legacy_chart.json"))
        .expect("failed to read legacy chart fixture");
    let chart = parse_chart_str(&legacy, &ChartConfig::default()).expect("failed to parse chart");
    let grid = perio_core::render_grid(&chart, &SelectionCursor::default());

    let three = ToothNumber::new(3).unwrap();
    let bands: Vec<DepthBand> = grid
        .upper
        .rows
        .iter()
        .filter(|row| row.surface.is_some())
        .flat_map(|row| row.columns.iter())
        .filter(|column| column.tooth == three)
        .flat_map(|column| column.cells.iter())
        .filter_map(|cell| match cell.value {
            perio_core::CellValue::Depth { band, .. } => Some(band),
            _ => None,
        })
        .collect();

    // Buccal distal, mid, mesial then lingual distal, mid, mesial.
    assert_eq!(
        bands,
        vec![
            DepthBand::Moderate,
            DepthBand::Healthy,
            DepthBand::Moderate,
            DepthBand::Severe,
            DepthBand::Neutral,
            DepthBand::Healthy,
        ]
    );

    let thirty = ToothNumber::new(30).unwrap();
    let furcation = grid
        .lower
        .rows
        .iter()
        .find(|row| row.kind == perio_core::MeasurementKind::Furcation)
        .and_then(|row| row.columns.iter().find(|column| column.tooth == thirty))
        .map(|column| column.cells[0].value);
    assert!(matches!(
        furcation,
        Some(perio_core::CellValue::Furcation {
            glyph: FurcationGlyph::Filled,
            ..
        })
    ));
}
