//! Editing session: the context object a chart view owns while it is open.

use serde::{Deserialize, Serialize};

use crate::chart::{Chart, ChartKey};
use crate::cursor::SelectionCursor;
use crate::gateway::{ChartGateway, SaveReceipt};
use crate::grid::{render_grid, PerioGrid};
use crate::measurement::{ChartUpdate, MeasurementKind, ToggleField};
use crate::store::MeasurementStore;
use crate::summary::{summarize, ChartSummary};
use crate::tooth::{Position, Surface, ToothNumber};
use crate::{ChartConfig, PerioError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SaveStatus {
    Idle,
    Pending,
    Saved { receipt: SaveReceipt },
    Failed { message: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Non-blocking message for the user (toast).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ChartSession {
    store: MeasurementStore,
    cursor: SelectionCursor,
    save_status: SaveStatus,
    revision: u64,
    saved_revision: u64,
    pending_revision: Option<u64>,
    notices: Vec<Notice>,
}

impl ChartSession {
    /// Starts charting a new exam.
    pub fn new_chart(key: ChartKey, config: ChartConfig) -> Self {
        Self::with_store(MeasurementStore::initialize(key, config))
    }

    /// Opens an existing exam. A failed load is returned as-is so the view
    /// can block and offer a retry; it never turns into an empty chart.
    pub fn open<G: ChartGateway + ?Sized>(
        gateway: &G,
        key: &ChartKey,
        config: ChartConfig,
    ) -> Result<Self, PerioError> {
        let chart = gateway.load(key).map_err(|err| {
            tracing::warn!(chart = %key, error = %err, "failed to open chart");
            err
        })?;
        Ok(Self::from_chart(chart, config))
    }

    pub fn from_chart(chart: Chart, config: ChartConfig) -> Self {
        Self::with_store(MeasurementStore::load(chart, config))
    }

    fn with_store(store: MeasurementStore) -> Self {
        Self {
            store,
            cursor: SelectionCursor::default(),
            save_status: SaveStatus::Idle,
            revision: 0,
            saved_revision: 0,
            pending_revision: None,
            notices: Vec::new(),
        }
    }

    pub fn chart(&self) -> &Chart {
        self.store.chart()
    }

    pub fn store(&self) -> &MeasurementStore {
        &self.store
    }

    pub fn cursor(&self) -> &SelectionCursor {
        &self.cursor
    }

    pub fn grid(&self) -> PerioGrid {
        render_grid(self.store.chart(), &self.cursor)
    }

    pub fn summary(&self) -> ChartSummary {
        summarize(self.store.chart())
    }

    /// Unsaved edits exist.
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    pub fn is_save_pending(&self) -> bool {
        self.pending_revision.is_some()
    }

    pub fn set_field(&mut self, tooth: ToothNumber, update: ChartUpdate) -> Result<(), PerioError> {
        self.store.set_field(tooth, update)?;
        self.revision += 1;
        Ok(())
    }

    pub fn toggle(&mut self, tooth: ToothNumber, field: ToggleField) -> bool {
        self.revision += 1;
        self.store.toggle(tooth, field)
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.store.set_notes(notes);
        self.revision += 1;
    }

    pub fn select_site(&mut self, tooth: ToothNumber, surface: Surface, position: Position) {
        self.cursor.select_site(tooth, surface, position);
    }

    pub fn select(&mut self, tooth: ToothNumber, kind: MeasurementKind) {
        self.cursor.select(tooth, kind);
    }

    pub fn clear_selection(&mut self) {
        self.cursor.clear();
    }

    /// Records a depth at the cursor's probing site and moves on to the
    /// next site. Returns `false` when the cursor is not on a probing site.
    pub fn commit_depth(&mut self, depth: Option<u8>) -> Result<bool, PerioError> {
        let Some(site) = self.cursor.probing_site() else {
            return Ok(false);
        };
        self.set_field(
            site.tooth,
            ChartUpdate::ProbingDepth {
                surface: site.surface,
                position: site.position,
                depth,
            },
        )?;
        self.cursor.advance();
        Ok(true)
    }

    /// Marks a save as pending and hands out the chart to send. Only one
    /// save may be in flight.
    pub fn begin_save(&mut self) -> Result<Chart, PerioError> {
        if self.pending_revision.is_some() {
            return Err(PerioError::SaveInProgress);
        }
        self.pending_revision = Some(self.revision);
        self.save_status = SaveStatus::Pending;
        Ok(self.store.chart().clone())
    }

    /// Records the outcome of the pending save. The chart in memory is
    /// never touched, so a failed save can simply be retried.
    pub fn finish_save(&mut self, result: &Result<SaveReceipt, PerioError>) {
        let Some(revision) = self.pending_revision.take() else {
            return;
        };
        match result {
            Ok(receipt) => {
                self.saved_revision = revision;
                self.notices.push(Notice {
                    level: NoticeLevel::Info,
                    message: format!("Chart saved for {}", receipt.key),
                });
                self.save_status = SaveStatus::Saved {
                    receipt: receipt.clone(),
                };
            }
            Err(err) => {
                tracing::warn!(chart = %self.store.chart().key(), error = %err, "save failed");
                let message = format!("Chart could not be saved: {err}");
                self.notices.push(Notice {
                    level: NoticeLevel::Error,
                    message: message.clone(),
                });
                self.save_status = SaveStatus::Failed { message };
            }
        }
    }

    /// Saves through a gateway in one call.
    pub fn save_with<G: ChartGateway + ?Sized>(
        &mut self,
        gateway: &mut G,
    ) -> Result<SaveReceipt, PerioError> {
        let chart = self.begin_save()?;
        let result = gateway.save(&chart);
        self.finish_save(&result);
        result
    }

    /// Drains queued notices for display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
