//! The persisted chart aggregate.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::measurement::ToothMeasurement;
use crate::tooth::{ToothNumber, TOOTH_COUNT};
use crate::PerioError;

/// Identity of a chart in the record service: one chart per patient per exam date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct ChartKey {
    pub patient_id: String,
    pub exam_date: NaiveDate,
}

impl ChartKey {
    pub fn new(patient_id: impl Into<String>, exam_date: NaiveDate) -> Result<Self, PerioError> {
        let patient_id = patient_id.into();
        validate_patient_id(&patient_id)?;
        Ok(Self {
            patient_id,
            exam_date,
        })
    }
}

impl fmt::Display for ChartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.patient_id, self.exam_date)
    }
}

/// Patient ids double as storage keys, so they must be non-empty and
/// must not contain path syntax.
pub fn validate_patient_id(patient_id: &str) -> Result<(), PerioError> {
    let trimmed = patient_id.trim();
    if trimmed.is_empty() {
        return Err(PerioError::InvalidKey("patient id is empty".to_string()));
    }
    if trimmed != patient_id {
        return Err(PerioError::InvalidKey(format!(
            "patient id {patient_id:?} has surrounding whitespace"
        )));
    }
    if patient_id == "." || patient_id == ".." || patient_id.contains(['/', '\\', '\0']) {
        return Err(PerioError::InvalidKey(format!(
            "patient id {patient_id:?} contains path characters"
        )));
    }
    Ok(())
}

/// Exactly one measurement record per tooth 1..=32.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ToothChart([ToothMeasurement; TOOTH_COUNT]);

impl ToothChart {
    pub fn get(&self, tooth: ToothNumber) -> &ToothMeasurement {
        &self.0[tooth.index()]
    }

    pub fn get_mut(&mut self, tooth: ToothNumber) -> &mut ToothMeasurement {
        &mut self.0[tooth.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ToothNumber, &ToothMeasurement)> {
        ToothNumber::all().zip(self.0.iter())
    }

    /// Builds a full chart from possibly sparse entries. Teeth without an
    /// entry get a blank record; their numbers are returned so the caller
    /// can decide whether the gap is acceptable.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (ToothNumber, ToothMeasurement)>,
    ) -> (Self, Vec<ToothNumber>) {
        let mut teeth = Self::default();
        let mut seen = [false; TOOTH_COUNT];
        for (tooth, measurement) in entries {
            seen[tooth.index()] = true;
            *teeth.get_mut(tooth) = measurement;
        }
        let missing = ToothNumber::all().filter(|tooth| !seen[tooth.index()]).collect();
        (teeth, missing)
    }
}

/// A periodontal exam for one patient: 32 tooth records plus free-text notes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub patient_id: String,
    pub exam_date: NaiveDate,
    pub teeth: ToothChart,
    #[serde(default)]
    pub notes: String,
}

impl Chart {
    /// A fresh chart with every field unrecorded.
    pub fn new(key: ChartKey) -> Self {
        Self {
            patient_id: key.patient_id,
            exam_date: key.exam_date,
            teeth: ToothChart::default(),
            notes: String::new(),
        }
    }

    pub fn key(&self) -> ChartKey {
        ChartKey {
            patient_id: self.patient_id.clone(),
            exam_date: self.exam_date,
        }
    }

    pub fn tooth(&self, tooth: ToothNumber) -> &ToothMeasurement {
        self.teeth.get(tooth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    #[test]
    fn patient_id_must_be_a_plain_name() {
        assert!(ChartKey::new("P-1001", date()).is_ok());
        assert!(matches!(ChartKey::new("", date()), Err(PerioError::InvalidKey(_))));
        assert!(matches!(ChartKey::new("../etc", date()), Err(PerioError::InvalidKey(_))));
        assert!(matches!(ChartKey::new(" P1", date()), Err(PerioError::InvalidKey(_))));
    }

    #[test]
    fn sparse_entries_report_missing_teeth() {
        let three = ToothNumber::new(3).unwrap();
        let mut record = ToothMeasurement::default();
        record.plaque = true;

        let (teeth, missing) = ToothChart::from_entries([(three, record.clone())]);
        assert_eq!(teeth.get(three), &record);
        assert_eq!(missing.len(), TOOTH_COUNT - 1);
        assert!(!missing.contains(&three));
    }

    #[test]
    fn serializes_thirty_two_teeth() {
        let chart = Chart::new(ChartKey::new("P-1", date()).unwrap());
        let value = serde_json::to_value(&chart).unwrap();
        assert_eq!(value["teeth"].as_array().map(Vec::len), Some(TOOTH_COUNT));
        assert_eq!(value["examDate"], "2024-03-14");
        assert_eq!(value["patientId"], "P-1");
    }
}
