//! Per-tooth measurement record and the typed updates that mutate it.

use serde::{Deserialize, Serialize};

use crate::tooth::{Position, Surface};
use crate::PerioError;

/// Furcation involvement grade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum FurcationGrade {
    One,
    Two,
    Three,
}

impl FurcationGrade {
    pub fn value(self) -> u8 {
        match self {
            FurcationGrade::One => 1,
            FurcationGrade::Two => 2,
            FurcationGrade::Three => 3,
        }
    }
}

impl TryFrom<u8> for FurcationGrade {
    type Error = PerioError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FurcationGrade::One),
            2 => Ok(FurcationGrade::Two),
            3 => Ok(FurcationGrade::Three),
            other => Err(PerioError::Parse(format!(
                "furcation grade must be 1, 2 or 3, received {other}"
            ))),
        }
    }
}

impl From<FurcationGrade> for u8 {
    fn from(grade: FurcationGrade) -> Self {
        grade.value()
    }
}

/// Depths in millimetres at the three positions of one surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SiteDepths {
    pub mesial: Option<u8>,
    pub mid: Option<u8>,
    pub distal: Option<u8>,
}

impl SiteDepths {
    pub fn get(&self, position: Position) -> Option<u8> {
        match position {
            Position::Mesial => self.mesial,
            Position::Mid => self.mid,
            Position::Distal => self.distal,
        }
    }

    pub fn slot_mut(&mut self, position: Position) -> &mut Option<u8> {
        match position {
            Position::Mesial => &mut self.mesial,
            Position::Mid => &mut self.mid,
            Position::Distal => &mut self.distal,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, Option<u8>)> {
        [
            (Position::Distal, self.distal),
            (Position::Mid, self.mid),
            (Position::Mesial, self.mesial),
        ]
        .into_iter()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProbingDepth {
    pub buccal: SiteDepths,
    pub lingual: SiteDepths,
}

impl ProbingDepth {
    pub fn surface(&self, surface: Surface) -> &SiteDepths {
        match surface {
            Surface::Buccal => &self.buccal,
            Surface::Lingual => &self.lingual,
        }
    }

    pub fn surface_mut(&mut self, surface: Surface) -> &mut SiteDepths {
        match surface {
            Surface::Buccal => &mut self.buccal,
            Surface::Lingual => &mut self.lingual,
        }
    }

    pub fn get(&self, surface: Surface, position: Position) -> Option<u8> {
        self.surface(surface).get(position)
    }

    /// All six sites, buccal first.
    pub fn sites(&self) -> impl Iterator<Item = (Surface, Position, Option<u8>)> + '_ {
        [Surface::Buccal, Surface::Lingual]
            .into_iter()
            .flat_map(move |surface| {
                self.surface(surface)
                    .iter()
                    .map(move |(position, depth)| (surface, position, depth))
            })
    }
}

/// Everything recorded for one tooth during an exam.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToothMeasurement {
    pub mobility: Option<u8>,
    pub implant: bool,
    pub furcation: Option<FurcationGrade>,
    pub bleeding_on_probing: bool,
    pub plaque: bool,
    pub gingival_margin: Option<i8>,
    pub probing_depth: ProbingDepth,
}

impl ToothMeasurement {
    /// Applies a single field update in place.
    pub fn apply(&mut self, update: ChartUpdate) {
        match update {
            ChartUpdate::Mobility(value) => self.mobility = value,
            ChartUpdate::Implant(value) => self.implant = value,
            ChartUpdate::Furcation(value) => self.furcation = value,
            ChartUpdate::BleedingOnProbing(value) => self.bleeding_on_probing = value,
            ChartUpdate::Plaque(value) => self.plaque = value,
            ChartUpdate::GingivalMargin(value) => self.gingival_margin = value,
            ChartUpdate::ProbingDepth {
                surface,
                position,
                depth,
            } => *self.probing_depth.surface_mut(surface).slot_mut(position) = depth,
        }
    }

    pub fn toggle(&mut self, field: ToggleField) -> bool {
        let flag = match field {
            ToggleField::BleedingOnProbing => &mut self.bleeding_on_probing,
            ToggleField::Plaque => &mut self.plaque,
            ToggleField::Implant => &mut self.implant,
        };
        *flag = !*flag;
        *flag
    }

    pub fn flag(&self, field: ToggleField) -> bool {
        match field {
            ToggleField::BleedingOnProbing => self.bleeding_on_probing,
            ToggleField::Plaque => self.plaque,
            ToggleField::Implant => self.implant,
        }
    }

    /// True while nothing has been recorded for the tooth.
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

/// One typed edit of a single measurement field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum ChartUpdate {
    Mobility(Option<u8>),
    Implant(bool),
    Furcation(Option<FurcationGrade>),
    BleedingOnProbing(bool),
    Plaque(bool),
    GingivalMargin(Option<i8>),
    ProbingDepth {
        surface: Surface,
        position: Position,
        depth: Option<u8>,
    },
}

impl ChartUpdate {
    pub fn kind(&self) -> MeasurementKind {
        match self {
            ChartUpdate::Mobility(_) => MeasurementKind::Mobility,
            ChartUpdate::Implant(_) => MeasurementKind::Implant,
            ChartUpdate::Furcation(_) => MeasurementKind::Furcation,
            ChartUpdate::BleedingOnProbing(_) => MeasurementKind::BleedingOnProbing,
            ChartUpdate::Plaque(_) => MeasurementKind::Plaque,
            ChartUpdate::GingivalMargin(_) => MeasurementKind::GingivalMargin,
            ChartUpdate::ProbingDepth { .. } => MeasurementKind::ProbingDepth,
        }
    }
}

/// Boolean fields that flip on a single click.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ToggleField {
    BleedingOnProbing,
    Plaque,
    Implant,
}

impl ToggleField {
    pub fn kind(self) -> MeasurementKind {
        match self {
            ToggleField::BleedingOnProbing => MeasurementKind::BleedingOnProbing,
            ToggleField::Plaque => MeasurementKind::Plaque,
            ToggleField::Implant => MeasurementKind::Implant,
        }
    }
}

/// Measurement types shown as grid rows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum MeasurementKind {
    Mobility,
    Implant,
    Furcation,
    BleedingOnProbing,
    Plaque,
    GingivalMargin,
    ProbingDepth,
}

impl MeasurementKind {
    pub fn label(self) -> &'static str {
        match self {
            MeasurementKind::Mobility => "Mobility",
            MeasurementKind::Implant => "Implant",
            MeasurementKind::Furcation => "Furcation",
            MeasurementKind::BleedingOnProbing => "Bleeding",
            MeasurementKind::Plaque => "Plaque",
            MeasurementKind::GingivalMargin => "Gingival margin",
            MeasurementKind::ProbingDepth => "Probing depth",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probing_update_touches_only_its_site() {
        let mut tooth = ToothMeasurement::default();
        tooth.apply(ChartUpdate::ProbingDepth {
            surface: Surface::Lingual,
            position: Position::Mesial,
            depth: Some(5),
        });

        assert_eq!(tooth.probing_depth.lingual.mesial, Some(5));
        assert_eq!(tooth.probing_depth.buccal, SiteDepths::default());
        assert_eq!(tooth.probing_depth.sites().filter(|(_, _, d)| d.is_some()).count(), 1);
    }

    #[test]
    fn toggle_flips_and_reports_new_state() {
        let mut tooth = ToothMeasurement::default();
        assert!(tooth.toggle(ToggleField::Plaque));
        assert!(!tooth.toggle(ToggleField::Plaque));
        assert!(tooth.is_blank());
    }

    #[test]
    fn wire_names_are_camel_case() {
        let mut tooth = ToothMeasurement::default();
        tooth.bleeding_on_probing = true;
        tooth.furcation = Some(FurcationGrade::Two);
        let value = serde_json::to_value(&tooth).unwrap();

        assert_eq!(value["bleedingOnProbing"], true);
        assert_eq!(value["furcation"], 2);
        assert!(value["probingDepth"]["buccal"]["mesial"].is_null());
        assert!(value["gingivalMargin"].is_null());
    }

    #[test]
    fn update_is_tagged_by_field() {
        let update: ChartUpdate =
            serde_json::from_str(r#"{"field":"gingivalMargin","value":-2}"#).unwrap();
        assert_eq!(update, ChartUpdate::GingivalMargin(Some(-2)));

        let depth: ChartUpdate = serde_json::from_str(
            r#"{"field":"probingDepth","value":{"surface":"buccal","position":"mid","depth":7}}"#,
        )
        .unwrap();
        assert_eq!(depth.kind(), MeasurementKind::ProbingDepth);
    }

    #[test]
    fn furcation_grade_outside_range_is_rejected() {
        assert!(serde_json::from_str::<FurcationGrade>("4").is_err());
        assert!(serde_json::from_str::<FurcationGrade>("0").is_err());
    }
}
