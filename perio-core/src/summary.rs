//! Whole-mouth indices shown next to the grid.

use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::cursor::ProbingSite;
use crate::grid::DepthBand;
use crate::tooth::TOOTH_COUNT;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BandCounts {
    pub healthy: usize,
    pub moderate: usize,
    pub severe: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeepestSite {
    pub site: ProbingSite,
    pub depth: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ChartSummary {
    /// Probing sites with a recorded depth, out of 192.
    pub recorded_sites: usize,
    /// Mean of recorded depths in mm, rounded to one decimal.
    pub mean_probing_depth: Option<f64>,
    pub bands: BandCounts,
    pub deepest: Option<DeepestSite>,
    /// Share of teeth flagged for bleeding on probing, 0–100.
    pub bleeding_percent: f64,
    /// Share of teeth flagged for plaque, 0–100.
    pub plaque_percent: f64,
    pub implants: usize,
}

pub fn summarize(chart: &Chart) -> ChartSummary {
    let mut summary = ChartSummary::default();
    let mut depth_total: u64 = 0;
    let mut bleeding = 0usize;
    let mut plaque = 0usize;

    for (tooth, record) in chart.teeth.iter() {
        bleeding += usize::from(record.bleeding_on_probing);
        plaque += usize::from(record.plaque);
        summary.implants += usize::from(record.implant);

        for (surface, position, depth) in record.probing_depth.sites() {
            let Some(depth) = depth else {
                continue;
            };
            summary.recorded_sites += 1;
            depth_total += u64::from(depth);
            match DepthBand::classify(Some(depth)) {
                DepthBand::Healthy => summary.bands.healthy += 1,
                DepthBand::Moderate => summary.bands.moderate += 1,
                DepthBand::Severe => summary.bands.severe += 1,
                DepthBand::Neutral => {}
            }
            if summary.deepest.as_ref().map_or(true, |d| depth > d.depth) {
                summary.deepest = Some(DeepestSite {
                    site: ProbingSite::new(tooth, surface, position),
                    depth,
                });
            }
        }
    }

    if summary.recorded_sites > 0 {
        let mean = depth_total as f64 / summary.recorded_sites as f64;
        summary.mean_probing_depth = Some(round_one_decimal(mean));
    }
    summary.bleeding_percent = percent_of_teeth(bleeding);
    summary.plaque_percent = percent_of_teeth(plaque);
    summary
}

fn percent_of_teeth(count: usize) -> f64 {
    round_one_decimal(count as f64 * 100.0 / TOOTH_COUNT as f64)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKey;
    use crate::measurement::ChartUpdate;
    use crate::tooth::{Position, Surface, ToothNumber};
    use chrono::NaiveDate;

    fn chart() -> Chart {
        Chart::new(ChartKey::new("P-3", NaiveDate::from_ymd_opt(2023, 11, 30).unwrap()).unwrap())
    }

    fn depth(chart: &mut Chart, tooth: u8, surface: Surface, position: Position, mm: u8) {
        chart
            .teeth
            .get_mut(ToothNumber::new(tooth).unwrap())
            .apply(ChartUpdate::ProbingDepth {
                surface,
                position,
                depth: Some(mm),
            });
    }

    #[test]
    fn empty_chart_has_no_depth_statistics() {
        let summary = summarize(&chart());
        assert_eq!(summary.recorded_sites, 0);
        assert_eq!(summary.mean_probing_depth, None);
        assert!(summary.deepest.is_none());
        assert_eq!(summary.bleeding_percent, 0.0);
    }

    #[test]
    fn counts_bands_and_finds_deepest_site() {
        let mut chart = chart();
        depth(&mut chart, 3, Surface::Buccal, Position::Distal, 3);
        depth(&mut chart, 3, Surface::Buccal, Position::Mid, 4);
        depth(&mut chart, 14, Surface::Lingual, Position::Mesial, 7);
        for tooth in 1..=8 {
            chart.teeth.get_mut(ToothNumber::new(tooth).unwrap()).bleeding_on_probing = true;
        }

        let summary = summarize(&chart);
        assert_eq!(summary.recorded_sites, 3);
        assert_eq!(summary.mean_probing_depth, Some(4.7));
        assert_eq!(
            summary.bands,
            BandCounts {
                healthy: 1,
                moderate: 1,
                severe: 1
            }
        );
        let deepest = summary.deepest.unwrap();
        assert_eq!(deepest.depth, 7);
        assert_eq!(deepest.site.tooth.get(), 14);
        assert_eq!(summary.bleeding_percent, 25.0);
    }
}
