use std::path::PathBuf;

use chrono::NaiveDate;

/// Errors raised while editing, loading or saving a periodontal chart.
#[derive(Debug, thiserror::Error)]
pub enum PerioError {
    #[error("tooth number {0} is outside 1..=32")]
    InvalidTooth(u8),
    #[error("invalid chart key: {0}")]
    InvalidKey(String),
    #[error("no chart recorded for patient {patient_id} on {exam_date}")]
    NotFound {
        patient_id: String,
        exam_date: NaiveDate,
    },
    #[error("chart is missing teeth {missing:?}")]
    MissingTeeth { missing: Vec<u8> },
    #[error("probing depth {value}mm exceeds the configured limit of {limit}mm")]
    OutOfRange { value: u8, limit: u8 },
    #[error("a save is already in progress")]
    SaveInProgress,
    #[error("could not read chart data: {0}")]
    Parse(String),
    #[error("could not encode chart data: {0}")]
    Encode(String),
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("record service error: {0}")]
    Storage(String),
}

impl PerioError {
    /// True for failures that a retry of the same request could fix.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Storage(_) | Self::SaveInProgress)
    }
}
