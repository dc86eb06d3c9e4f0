//! Core logic for periodontal charting: the per-tooth measurement store,
//! the probing cursor with auto-advance, and the colour-banded grid view.

use serde::{Deserialize, Serialize};

pub mod chart;
pub mod cursor;
pub mod error;
pub mod gateway;
pub mod grid;
pub mod measurement;
pub mod session;
pub mod store;
pub mod summary;
pub mod tooth;

pub use chart::{Chart, ChartKey, ToothChart};
pub use cursor::{ProbingSite, SelectionCursor};
pub use error::PerioError;
pub use gateway::{ChartGateway, MemoryGateway, SaveReceipt};
pub use grid::{
    render_grid, ArchGrid, CellValue, DepthBand, FurcationGlyph, GridCell, GridColumn, GridRow,
    PerioGrid,
};
pub use measurement::{
    ChartUpdate, FurcationGrade, MeasurementKind, ProbingDepth, SiteDepths, ToggleField,
    ToothMeasurement,
};
pub use session::{ChartSession, Notice, NoticeLevel, SaveStatus};
pub use store::MeasurementStore;
pub use summary::{summarize, ChartSummary};
pub use tooth::{Arch, Position, Quadrant, Surface, ToothNumber, TOOTH_COUNT};

/// What to do with a stored chart that lacks some tooth entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingToothPolicy {
    /// Fill the gaps with blank records and log which teeth were added.
    #[default]
    Backfill,
    /// Refuse the chart.
    Reject,
}

/// Settings for loading and editing charts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartConfig {
    pub missing_teeth: MissingToothPolicy,
    /// Upper limit for probing depths in mm. `None` accepts any value.
    pub max_probing_depth: Option<u8>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            missing_teeth: MissingToothPolicy::Backfill,
            max_probing_depth: None,
        }
    }
}
