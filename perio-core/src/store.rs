//! In-memory store holding the chart being edited.

use crate::chart::{Chart, ChartKey};
use crate::measurement::{ChartUpdate, ToggleField, ToothMeasurement};
use crate::tooth::ToothNumber;
use crate::{ChartConfig, PerioError};

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementStore {
    chart: Chart,
    config: ChartConfig,
}

impl MeasurementStore {
    /// Starts a blank chart: every tooth present, every field unrecorded.
    pub fn initialize(key: ChartKey, config: ChartConfig) -> Self {
        Self {
            chart: Chart::new(key),
            config,
        }
    }

    /// Wraps a previously persisted chart. The chart type always carries 32
    /// teeth; gaps in legacy records are resolved by the reader before this.
    pub fn load(chart: Chart, config: ChartConfig) -> Self {
        tracing::debug!(chart = %chart.key(), "loaded chart into store");
        Self { chart, config }
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Hands the chart back, for saving or exporting.
    pub fn into_chart(self) -> Chart {
        self.chart
    }

    pub fn tooth(&self, tooth: ToothNumber) -> &ToothMeasurement {
        self.chart.tooth(tooth)
    }

    /// Sets one field of one tooth. Values are taken as entered; the only
    /// check is the optional probing-depth ceiling from [`ChartConfig`].
    pub fn set_field(&mut self, tooth: ToothNumber, update: ChartUpdate) -> Result<(), PerioError> {
        if let (ChartUpdate::ProbingDepth { depth: Some(value), .. }, Some(limit)) =
            (update, self.config.max_probing_depth)
        {
            if value > limit {
                return Err(PerioError::OutOfRange { value, limit });
            }
        }

        self.chart.teeth.get_mut(tooth).apply(update);
        tracing::debug!(%tooth, ?update, "set field");
        Ok(())
    }

    /// Flips a boolean field and returns its new value.
    pub fn toggle(&mut self, tooth: ToothNumber, field: ToggleField) -> bool {
        let value = self.chart.teeth.get_mut(tooth).toggle(field);
        tracing::debug!(%tooth, ?field, value, "toggled field");
        value
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.chart.notes = notes.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::FurcationGrade;
    use crate::tooth::{Position, Surface};
    use chrono::NaiveDate;

    fn key() -> ChartKey {
        ChartKey::new("P-42", NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()).unwrap()
    }

    fn tooth(n: u8) -> ToothNumber {
        ToothNumber::new(n).unwrap()
    }

    #[test]
    fn initialize_leaves_every_tooth_blank() {
        let store = MeasurementStore::initialize(key(), ChartConfig::default());
        for (number, record) in store.chart().teeth.iter() {
            assert!(record.is_blank(), "tooth {number} should start blank");
            assert_eq!(record.mobility, None);
            assert_eq!(record.furcation, None);
            assert_eq!(record.gingival_margin, None);
            assert!(!record.bleeding_on_probing && !record.plaque && !record.implant);
        }
        assert!(store.chart().notes.is_empty());
    }

    #[test]
    fn loaded_chart_comes_back_unchanged() {
        let mut chart = Chart::new(key());
        chart.notes = "bleeding on flossing".to_string();
        chart.teeth.get_mut(tooth(30)).apply(ChartUpdate::Furcation(Some(FurcationGrade::Two)));
        chart.teeth.get_mut(tooth(3)).apply(ChartUpdate::ProbingDepth {
            surface: Surface::Lingual,
            position: Position::Mesial,
            depth: Some(7),
        });

        let store = MeasurementStore::load(chart.clone(), ChartConfig::default());
        assert_eq!(store.into_chart(), chart);
    }

    #[test]
    fn set_field_is_idempotent() {
        let update = ChartUpdate::ProbingDepth {
            surface: Surface::Buccal,
            position: Position::Mesial,
            depth: Some(4),
        };
        let mut once = MeasurementStore::initialize(key(), ChartConfig::default());
        once.set_field(tooth(5), update).unwrap();
        let mut twice = once.clone();
        twice.set_field(tooth(5), update).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn accepts_unusual_values_by_default() {
        let mut store = MeasurementStore::initialize(key(), ChartConfig::default());
        store
            .set_field(
                tooth(2),
                ChartUpdate::ProbingDepth {
                    surface: Surface::Lingual,
                    position: Position::Mid,
                    depth: Some(200),
                },
            )
            .unwrap();
        store.set_field(tooth(2), ChartUpdate::Mobility(Some(9))).unwrap();
        store.set_field(tooth(2), ChartUpdate::GingivalMargin(Some(-12))).unwrap();

        let record = store.tooth(tooth(2));
        assert_eq!(record.probing_depth.lingual.mid, Some(200));
        assert_eq!(record.mobility, Some(9));
        assert_eq!(record.gingival_margin, Some(-12));
    }

    #[test]
    fn configured_depth_ceiling_rejects_without_mutating() {
        let config = ChartConfig {
            max_probing_depth: Some(15),
            ..ChartConfig::default()
        };
        let mut store = MeasurementStore::initialize(key(), config);
        let result = store.set_field(
            tooth(30),
            ChartUpdate::ProbingDepth {
                surface: Surface::Buccal,
                position: Position::Distal,
                depth: Some(16),
            },
        );

        assert!(matches!(result, Err(PerioError::OutOfRange { value: 16, limit: 15 })));
        assert!(store.tooth(tooth(30)).is_blank());
    }

    #[test]
    fn edits_on_different_teeth_are_independent() {
        let mut a = MeasurementStore::initialize(key(), ChartConfig::default());
        let mut b = a.clone();

        a.set_field(tooth(5), ChartUpdate::Mobility(Some(2))).unwrap();
        a.toggle(tooth(9), ToggleField::BleedingOnProbing);

        b.toggle(tooth(9), ToggleField::BleedingOnProbing);
        b.set_field(tooth(5), ChartUpdate::Mobility(Some(2))).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn toggle_and_clear() {
        let mut store = MeasurementStore::initialize(key(), ChartConfig::default());
        assert!(store.toggle(tooth(19), ToggleField::Implant));
        store
            .set_field(tooth(19), ChartUpdate::Furcation(Some(FurcationGrade::Three)))
            .unwrap();
        store.set_field(tooth(19), ChartUpdate::Furcation(None)).unwrap();

        assert!(store.tooth(tooth(19)).implant);
        assert_eq!(store.tooth(tooth(19)).furcation, None);
    }
}
