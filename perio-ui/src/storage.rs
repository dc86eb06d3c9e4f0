//! Chart record service kept in the browser's `localStorage`.

use perio_core::ChartKey;

const KEY_PREFIX: &str = "perio-chart";

/// Storage key for one chart: `perio-chart:<patient_id>:<exam_date>`.
pub fn storage_key(key: &ChartKey) -> String {
    format!("{KEY_PREFIX}:{}:{}", key.patient_id, key.exam_date)
}

/// Inverse of [`storage_key`] for a given patient; other entries yield `None`.
pub fn parse_storage_key(patient_id: &str, raw: &str) -> Option<ChartKey> {
    let rest = raw.strip_prefix(KEY_PREFIX)?.strip_prefix(':')?;
    let date = rest.strip_prefix(patient_id)?.strip_prefix(':')?;
    let exam_date = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    ChartKey::new(patient_id, exam_date).ok()
}

#[cfg(target_arch = "wasm32")]
pub use browser::LocalStorageGateway;

#[cfg(target_arch = "wasm32")]
mod browser {
    use chrono::Utc;
    use perio_core::{Chart, ChartConfig, ChartGateway, ChartKey, PerioError, SaveReceipt};
    use web_sys::Storage;

    use super::{parse_storage_key, storage_key};

    pub struct LocalStorageGateway {
        storage: Storage,
        config: ChartConfig,
    }

    impl LocalStorageGateway {
        pub fn from_window(config: ChartConfig) -> Result<Self, PerioError> {
            let storage = web_sys::window()
                .ok_or_else(|| PerioError::Storage("no window".to_string()))?
                .local_storage()
                .map_err(|err| PerioError::Storage(format!("localStorage unavailable: {err:?}")))?
                .ok_or_else(|| PerioError::Storage("localStorage unavailable".to_string()))?;
            Ok(Self { storage, config })
        }
    }

    impl ChartGateway for LocalStorageGateway {
        fn save(&mut self, chart: &Chart) -> Result<SaveReceipt, PerioError> {
            let key = chart.key();
            let text = perio_json::chart_to_string_pretty(chart)?;
            self.storage
                .set_item(&storage_key(&key), &text)
                .map_err(|err| PerioError::Storage(format!("write failed: {err:?}")))?;
            tracing::info!(chart = %key, "saved chart to localStorage");
            Ok(SaveReceipt {
                key,
                saved_at: Utc::now(),
            })
        }

        fn load(&self, key: &ChartKey) -> Result<Chart, PerioError> {
            let text = self
                .storage
                .get_item(&storage_key(key))
                .map_err(|err| PerioError::Storage(format!("read failed: {err:?}")))?
                .ok_or_else(|| PerioError::NotFound {
                    patient_id: key.patient_id.clone(),
                    exam_date: key.exam_date,
                })?;
            perio_json::parse_chart_str(&text, &self.config)
        }

        fn list(&self, patient_id: &str) -> Result<Vec<ChartKey>, PerioError> {
            let length = self
                .storage
                .length()
                .map_err(|err| PerioError::Storage(format!("list failed: {err:?}")))?;
            let mut keys: Vec<ChartKey> = (0..length)
                .filter_map(|index| self.storage.key(index).ok().flatten())
                .filter_map(|raw| parse_storage_key(patient_id, &raw))
                .collect();
            keys.sort();
            Ok(keys)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn storage_keys_round_trip_per_patient() {
        let key = ChartKey::new("PT-9", NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()).unwrap();
        let raw = storage_key(&key);
        assert_eq!(raw, "perio-chart:PT-9:2025-01-31");
        assert_eq!(parse_storage_key("PT-9", &raw), Some(key));
        assert_eq!(parse_storage_key("PT-90", &raw), None);
        assert_eq!(parse_storage_key("PT", &raw), None);
        assert_eq!(parse_storage_key("PT-9", "theme"), None);
    }
}
