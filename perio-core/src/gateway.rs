//! Boundary to the record service that stores charts.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::{validate_patient_id, Chart, ChartKey};
use crate::PerioError;

/// Acknowledgement of a completed save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub key: ChartKey,
    pub saved_at: DateTime<Utc>,
}

/// A record service that persists whole charts. Each save replaces the
/// stored chart for its key in one step.
pub trait ChartGateway {
    fn save(&mut self, chart: &Chart) -> Result<SaveReceipt, PerioError>;

    /// Returns [`PerioError::NotFound`] when no chart exists for the key.
    fn load(&self, key: &ChartKey) -> Result<Chart, PerioError>;

    /// Keys of all charts recorded for a patient, oldest exam first.
    fn list(&self, patient_id: &str) -> Result<Vec<ChartKey>, PerioError>;
}

/// In-process record service for demos and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    charts: BTreeMap<ChartKey, Chart>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

impl ChartGateway for MemoryGateway {
    fn save(&mut self, chart: &Chart) -> Result<SaveReceipt, PerioError> {
        let key = chart.key();
        validate_patient_id(&key.patient_id)?;
        self.charts.insert(key.clone(), chart.clone());
        tracing::info!(chart = %key, "saved chart in memory");
        Ok(SaveReceipt {
            key,
            saved_at: Utc::now(),
        })
    }

    fn load(&self, key: &ChartKey) -> Result<Chart, PerioError> {
        self.charts
            .get(key)
            .cloned()
            .ok_or_else(|| PerioError::NotFound {
                patient_id: key.patient_id.clone(),
                exam_date: key.exam_date,
            })
    }

    fn list(&self, patient_id: &str) -> Result<Vec<ChartKey>, PerioError> {
        Ok(self
            .charts
            .keys()
            .filter(|key| key.patient_id == patient_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn key(patient: &str, day: u32) -> ChartKey {
        ChartKey::new(patient, NaiveDate::from_ymd_opt(2024, 2, day).unwrap()).unwrap()
    }

    #[test]
    fn load_of_unknown_chart_is_not_found() {
        let gateway = MemoryGateway::new();
        let result = gateway.load(&key("P-1", 1));
        assert!(matches!(result, Err(PerioError::NotFound { .. })));
    }

    #[test]
    fn save_replaces_and_list_is_ordered() {
        let mut gateway = MemoryGateway::new();
        let mut chart = Chart::new(key("P-1", 20));
        gateway.save(&chart).unwrap();
        chart.notes = "recall in 3 months".to_string();
        let receipt = gateway.save(&chart).unwrap();
        gateway.save(&Chart::new(key("P-1", 3))).unwrap();
        gateway.save(&Chart::new(key("P-2", 3))).unwrap();

        assert_eq!(receipt.key, key("P-1", 20));
        assert_eq!(gateway.len(), 3);
        assert_eq!(gateway.load(&key("P-1", 20)).unwrap().notes, "recall in 3 months");
        assert_eq!(gateway.list("P-1").unwrap(), vec![key("P-1", 3), key("P-1", 20)]);
    }
}
