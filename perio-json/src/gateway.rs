//! Record service backed by a directory of JSON files.
//!
//! Layout: `<root>/<patient_id>/<exam_date>.json`, each file holding
//! `{"savedAt": "...", "chart": {...}}`.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use perio_core::chart::validate_patient_id;
use perio_core::{Chart, ChartConfig, ChartGateway, ChartKey, PerioError, SaveReceipt};
use serde::Serialize;

use crate::parse_chart_value;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedChart<'a> {
    saved_at: DateTime<Utc>,
    chart: &'a Chart,
}

#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    root: PathBuf,
    config: ChartConfig,
}

impl JsonFileGateway {
    pub fn new(root: impl Into<PathBuf>, config: ChartConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds the chart for a key.
    pub fn chart_path(&self, key: &ChartKey) -> Result<PathBuf, PerioError> {
        Ok(self.patient_dir(&key.patient_id)?.join(format!("{}.json", key.exam_date)))
    }

    fn patient_dir(&self, patient_id: &str) -> Result<PathBuf, PerioError> {
        validate_patient_id(patient_id)?;
        Ok(self.root.join(patient_id))
    }
}

/// Writes `bytes` to `temp_path`, flushes it to disk, then moves it over
/// `path` so readers never see a half-written chart.
fn write_then_replace(temp_path: &Path, path: &Path, bytes: &[u8]) -> Result<(), PerioError> {
    let io_error = |operation: &'static str, path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| PerioError::Io {
            operation,
            path,
            source,
        }
    };

    let mut file = File::create(temp_path).map_err(io_error("create", temp_path))?;
    file.write_all(bytes).map_err(io_error("write", temp_path))?;
    file.sync_all().map_err(io_error("sync", temp_path))?;
    drop(file);
    fs::rename(temp_path, path).map_err(io_error("replace", path))
}

impl ChartGateway for JsonFileGateway {
    /// Writes to a temp file first and renames it over the target, so a
    /// crash never leaves a half-written chart behind.
    fn save(&mut self, chart: &Chart) -> Result<SaveReceipt, PerioError> {
        let key = chart.key();
        let path = self.chart_path(&key)?;
        let saved_at = Utc::now();

        let bytes = serde_json::to_vec_pretty(&SavedChart { saved_at, chart })
            .map_err(|err| PerioError::Encode(err.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| PerioError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let temp_path = path.with_extension("json.tmp");
        if let Err(err) = write_then_replace(&temp_path, &path, &bytes) {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                if cleanup.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %temp_path.display(), error = %cleanup, "could not remove temporary chart file");
                }
            }
            return Err(err);
        }

        tracing::info!(chart = %key, path = %path.display(), "saved chart");
        Ok(SaveReceipt { key, saved_at })
    }

    fn load(&self, key: &ChartKey) -> Result<Chart, PerioError> {
        let path = self.chart_path(key)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(PerioError::NotFound {
                    patient_id: key.patient_id.clone(),
                    exam_date: key.exam_date,
                })
            }
            Err(source) => {
                return Err(PerioError::Io {
                    operation: "read",
                    path,
                    source,
                })
            }
        };

        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|err| PerioError::Parse(format!("{}: {err}", path.display())))?;
        let chart = parse_chart_value(&value, &self.config)?;

        if chart.key() != *key {
            return Err(PerioError::Parse(format!(
                "{} holds chart {} instead of {key}",
                path.display(),
                chart.key()
            )));
        }

        tracing::info!(chart = %key, path = %path.display(), "loaded chart");
        Ok(chart)
    }

    fn list(&self, patient_id: &str) -> Result<Vec<ChartKey>, PerioError> {
        let dir = self.patient_dir(patient_id)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PerioError::Io {
                    operation: "list",
                    path: dir,
                    source,
                })
            }
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PerioError::Io {
                operation: "list",
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(exam_date) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok())
            else {
                tracing::debug!(path = %path.display(), "skipping file that is not a chart");
                continue;
            };
            keys.push(ChartKey {
                patient_id: patient_id.to_string(),
                exam_date,
            });
        }
        keys.sort();
        Ok(keys)
    }
}
