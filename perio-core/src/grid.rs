//! Projection of a chart and cursor into the two-arch display grid.
//!
//! The grid is a plain value: renderers (the Yew view, the CLI table) only
//! lay it out. Rows are measurement types, columns are teeth. The upper arch
//! reads 1 → 16 from the viewer's left; the lower arch reads 32 → 17 so that
//! each lower tooth sits beneath its upper antagonist.

use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::cursor::SelectionCursor;
use crate::measurement::{FurcationGrade, MeasurementKind, ToothMeasurement};
use crate::tooth::{Arch, Position, Surface, ToothNumber};

/// Clinical colour band of a probing depth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DepthBand {
    Neutral,
    Healthy,
    Moderate,
    Severe,
}

impl DepthBand {
    /// ≤3 mm healthy, 4–5 mm moderate, ≥6 mm severe. Values are never
    /// rejected here; very large depths simply stay in the severe band.
    pub fn classify(depth: Option<u8>) -> DepthBand {
        match depth {
            None => DepthBand::Neutral,
            Some(0..=3) => DepthBand::Healthy,
            Some(4..=5) => DepthBand::Moderate,
            Some(_) => DepthBand::Severe,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            DepthBand::Neutral => "depth-neutral",
            DepthBand::Healthy => "depth-healthy",
            DepthBand::Moderate => "depth-moderate",
            DepthBand::Severe => "depth-severe",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DepthBand::Neutral => "Not recorded",
            DepthBand::Healthy => "Healthy (≤3 mm)",
            DepthBand::Moderate => "Moderate (4–5 mm)",
            DepthBand::Severe => "Severe (≥6 mm)",
        }
    }

    /// Suffix used by text renderers.
    pub fn marker(self) -> &'static str {
        match self {
            DepthBand::Neutral | DepthBand::Healthy => "",
            DepthBand::Moderate => "*",
            DepthBand::Severe => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FurcationGlyph {
    Blank,
    Open,
    Half,
    Filled,
}

impl FurcationGlyph {
    pub fn from_grade(grade: Option<FurcationGrade>) -> Self {
        match grade {
            None => FurcationGlyph::Blank,
            Some(FurcationGrade::One) => FurcationGlyph::Open,
            Some(FurcationGrade::Two) => FurcationGlyph::Half,
            Some(FurcationGrade::Three) => FurcationGlyph::Filled,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            FurcationGlyph::Blank => "",
            FurcationGlyph::Open => "○",
            FurcationGlyph::Half => "◐",
            FurcationGlyph::Filled => "●",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellValue {
    Depth { depth: Option<u8>, band: DepthBand },
    Furcation { grade: Option<u8>, glyph: FurcationGlyph },
    Number { value: Option<i16> },
    Flag { active: bool },
}

impl CellValue {
    /// Short text for table renderers; empty when nothing is recorded.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Depth { depth, band } => depth
                .map(|value| format!("{value}{}", band.marker()))
                .unwrap_or_default(),
            CellValue::Furcation { glyph, .. } => glyph.symbol().to_string(),
            CellValue::Number { value } => value.map(|v| v.to_string()).unwrap_or_default(),
            CellValue::Flag { active } => String::from(if *active { "+" } else { "" }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridCell {
    pub surface: Option<Surface>,
    pub position: Option<Position>,
    pub value: CellValue,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridColumn {
    pub tooth: ToothNumber,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridRow {
    pub kind: MeasurementKind,
    pub surface: Option<Surface>,
    pub label: String,
    pub columns: Vec<GridColumn>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchGrid {
    pub arch: Arch,
    pub teeth: Vec<ToothNumber>,
    pub rows: Vec<GridRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PerioGrid {
    pub upper: ArchGrid,
    pub lower: ArchGrid,
}

impl PerioGrid {
    pub fn arches(&self) -> [&ArchGrid; 2] {
        [&self.upper, &self.lower]
    }

    /// The highlighted cell, if the cursor points at one.
    pub fn selected_cell(&self) -> Option<(ToothNumber, &GridRow, &GridCell)> {
        self.arches().into_iter().find_map(|arch| {
            arch.rows.iter().find_map(|row| {
                row.columns.iter().find_map(|column| {
                    column
                        .cells
                        .iter()
                        .find(|cell| cell.selected)
                        .map(|cell| (column.tooth, row, cell))
                })
            })
        })
    }

    /// The cell showing a given probing site.
    pub fn depth_cell(
        &self,
        tooth: ToothNumber,
        surface: Surface,
        position: Position,
    ) -> Option<&GridCell> {
        let arch = match tooth.arch() {
            Arch::Upper => &self.upper,
            Arch::Lower => &self.lower,
        };
        arch.rows
            .iter()
            .filter(|row| row.kind == MeasurementKind::ProbingDepth && row.surface == Some(surface))
            .flat_map(|row| row.columns.iter())
            .filter(|column| column.tooth == tooth)
            .flat_map(|column| column.cells.iter())
            .find(|cell| cell.position == Some(position))
    }
}

/// Teeth of one arch in display order.
pub fn column_order(arch: Arch) -> Vec<ToothNumber> {
    let teeth = ToothNumber::all().filter(|tooth| tooth.arch() == arch);
    match arch {
        Arch::Upper => teeth.collect(),
        Arch::Lower => teeth.rev().collect(),
    }
}

/// Probing positions of a tooth in viewer's left-to-right order. Distal
/// faces away from the midline, so it sits on the outer side.
pub fn site_order(tooth: ToothNumber) -> [Position; 3] {
    if tooth.quadrant().is_patient_right() {
        [Position::Distal, Position::Mid, Position::Mesial]
    } else {
        [Position::Mesial, Position::Mid, Position::Distal]
    }
}

const SCALAR_ROWS: [MeasurementKind; 6] = [
    MeasurementKind::Mobility,
    MeasurementKind::Implant,
    MeasurementKind::Furcation,
    MeasurementKind::BleedingOnProbing,
    MeasurementKind::Plaque,
    MeasurementKind::GingivalMargin,
];

pub fn render_grid(chart: &Chart, cursor: &SelectionCursor) -> PerioGrid {
    PerioGrid {
        upper: render_arch(chart, cursor, Arch::Upper),
        lower: render_arch(chart, cursor, Arch::Lower),
    }
}

fn render_arch(chart: &Chart, cursor: &SelectionCursor, arch: Arch) -> ArchGrid {
    let teeth = column_order(arch);
    let mut rows: Vec<GridRow> = SCALAR_ROWS
        .iter()
        .map(|&kind| GridRow {
            kind,
            surface: None,
            label: kind.label().to_string(),
            columns: teeth
                .iter()
                .map(|&tooth| GridColumn {
                    tooth,
                    cells: vec![scalar_cell(chart.tooth(tooth), tooth, kind, cursor)],
                })
                .collect(),
        })
        .collect();

    for surface in [Surface::Buccal, Surface::Lingual] {
        rows.push(GridRow {
            kind: MeasurementKind::ProbingDepth,
            surface: Some(surface),
            label: format!("PD {}", surface.label()),
            columns: teeth
                .iter()
                .map(|&tooth| GridColumn {
                    tooth,
                    cells: depth_cells(chart.tooth(tooth), tooth, surface, cursor),
                })
                .collect(),
        });
    }

    ArchGrid { arch, teeth, rows }
}

fn scalar_cell(
    record: &ToothMeasurement,
    tooth: ToothNumber,
    kind: MeasurementKind,
    cursor: &SelectionCursor,
) -> GridCell {
    let value = match kind {
        MeasurementKind::Mobility => CellValue::Number {
            value: record.mobility.map(i16::from),
        },
        MeasurementKind::GingivalMargin => CellValue::Number {
            value: record.gingival_margin.map(i16::from),
        },
        MeasurementKind::Furcation => CellValue::Furcation {
            grade: record.furcation.map(FurcationGrade::value),
            glyph: FurcationGlyph::from_grade(record.furcation),
        },
        MeasurementKind::Implant => CellValue::Flag {
            active: record.implant,
        },
        MeasurementKind::BleedingOnProbing => CellValue::Flag {
            active: record.bleeding_on_probing,
        },
        MeasurementKind::Plaque => CellValue::Flag {
            active: record.plaque,
        },
        // Collapsed to one cell, probing depth shows the deepest site.
        MeasurementKind::ProbingDepth => {
            let depth = record
                .probing_depth
                .sites()
                .filter_map(|(_, _, depth)| depth)
                .max();
            CellValue::Depth {
                depth,
                band: DepthBand::classify(depth),
            }
        }
    };

    GridCell {
        surface: None,
        position: None,
        value,
        selected: cursor.is_selected(tooth, kind, None, None),
    }
}

fn depth_cells(
    record: &ToothMeasurement,
    tooth: ToothNumber,
    surface: Surface,
    cursor: &SelectionCursor,
) -> Vec<GridCell> {
    site_order(tooth)
        .into_iter()
        .map(|position| {
            let depth = record.probing_depth.get(surface, position);
            GridCell {
                surface: Some(surface),
                position: Some(position),
                value: CellValue::Depth {
                    depth,
                    band: DepthBand::classify(depth),
                },
                selected: cursor.is_selected(
                    tooth,
                    MeasurementKind::ProbingDepth,
                    Some(surface),
                    Some(position),
                ),
            }
        })
        .collect()
}
