//! Plain-text layout of the chart grid and summary.

use std::fmt::{self, Write};

use perio_core::{ArchGrid, ChartSummary, GridColumn, PerioGrid};

const LABEL_WIDTH: usize = 16;
const CELL_WIDTH: usize = 3;
const COLUMN_WIDTH: usize = CELL_WIDTH * 3 + 2;

pub fn render_grid_text(grid: &PerioGrid) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for arch in grid.arches() {
        render_arch(&mut out, arch)?;
        out.push('\n');
    }
    out.push_str("Depth markers: * 4-5 mm, ! 6 mm or more. Furcation: ○ I, ◐ II, ● III.\n");
    Ok(out)
}

fn render_arch(out: &mut impl Write, arch: &ArchGrid) -> fmt::Result {
    writeln!(out, "{}", arch.arch.label())?;
    write!(out, "{:<LABEL_WIDTH$}", "")?;
    for tooth in &arch.teeth {
        write!(out, "|{:^COLUMN_WIDTH$}", tooth.get())?;
    }
    writeln!(out, "|")?;

    for row in &arch.rows {
        write!(out, "{:<LABEL_WIDTH$}", row.label)?;
        for column in &row.columns {
            write!(out, "|{:^COLUMN_WIDTH$}", column_text(column))?;
        }
        writeln!(out, "|")?;
    }
    Ok(())
}

fn column_text(column: &GridColumn) -> String {
    if column.cells.len() == 1 {
        return column.cells[0].value.display_text();
    }
    column
        .cells
        .iter()
        .map(|cell| {
            let text = cell.value.display_text();
            if text.is_empty() {
                format!("{:^CELL_WIDTH$}", "·")
            } else {
                format!("{text:^CELL_WIDTH$}")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_summary_text(summary: &ChartSummary) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Sites recorded:   {}/192", summary.recorded_sites)?;
    match summary.mean_probing_depth {
        Some(mean) => writeln!(out, "Mean depth:       {mean:.1} mm")?,
        None => writeln!(out, "Mean depth:       --")?,
    }
    writeln!(
        out,
        "Sites by band:    {} healthy, {} moderate, {} severe",
        summary.bands.healthy, summary.bands.moderate, summary.bands.severe
    )?;
    if let Some(deepest) = &summary.deepest {
        writeln!(
            out,
            "Deepest site:     {} mm at tooth {} {} {}",
            deepest.depth,
            deepest.site.tooth,
            deepest.site.surface.label().to_lowercase(),
            deepest.site.position.label()
        )?;
    }
    writeln!(out, "Bleeding:         {:.1}% of teeth", summary.bleeding_percent)?;
    writeln!(out, "Plaque:           {:.1}% of teeth", summary.plaque_percent)?;
    writeln!(out, "Implants:         {}", summary.implants)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use perio_core::{
        render_grid, summarize, Chart, ChartKey, ChartUpdate, Position, SelectionCursor, Surface,
        ToothNumber,
    };

    fn chart_with_pocket() -> Chart {
        let key = ChartKey::new("P-1", NaiveDate::from_ymd_opt(2024, 2, 2).unwrap()).unwrap();
        let mut chart = Chart::new(key);
        chart
            .teeth
            .get_mut(ToothNumber::new(14).unwrap())
            .apply(ChartUpdate::ProbingDepth {
                surface: Surface::Buccal,
                position: Position::Mid,
                depth: Some(8),
            });
        chart
    }

    #[test]
    fn grid_text_lists_both_arches_and_marks_severe_depths() {
        let grid = render_grid(&chart_with_pocket(), &SelectionCursor::default());
        let text = render_grid_text(&grid).unwrap();
        assert!(text.starts_with("Upper arch\n"));
        assert!(text.contains("Lower arch\n"));
        assert!(text.contains("8!"));

        let lines: Vec<&str> = text.lines().collect();
        let header_width = lines[1].chars().count();
        assert!(lines[2..10].iter().all(|line| line.chars().count() == header_width));
    }

    #[test]
    fn summary_text_reports_deepest_site() {
        let text = render_summary_text(&summarize(&chart_with_pocket())).unwrap();
        assert!(text.contains("Sites recorded:   1/192"));
        assert!(text.contains("8 mm at tooth 14 buccal mid"));
    }

    struct FullBuffer;

    impl Write for FullBuffer {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn arch_rendering_reports_writer_errors() {
        let grid = render_grid(&chart_with_pocket(), &SelectionCursor::default());
        assert_eq!(render_arch(&mut FullBuffer, &grid.upper), Err(fmt::Error));
    }
}
