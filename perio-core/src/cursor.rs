//! Tracks the site being charted and walks the probing sequence.

use serde::{Deserialize, Serialize};

use crate::measurement::MeasurementKind;
use crate::tooth::{Position, Surface, ToothNumber};

/// Where the clinician is in the chart. An all-`None` cursor is inert.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SelectionCursor {
    pub tooth: Option<ToothNumber>,
    pub measurement: Option<MeasurementKind>,
    pub surface: Option<Surface>,
    pub position: Option<Position>,
}

/// A fully specified probing site.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ProbingSite {
    pub tooth: ToothNumber,
    pub surface: Surface,
    pub position: Position,
}

impl ProbingSite {
    pub fn new(tooth: ToothNumber, surface: Surface, position: Position) -> Self {
        Self {
            tooth,
            surface,
            position,
        }
    }

    /// The site probed after this one. Each surface runs distal, mid,
    /// mesial; buccal precedes lingual; then the next tooth.
    pub fn successor(self) -> Option<ProbingSite> {
        let next = match (self.surface, self.position) {
            (surface, Position::Distal) => Self::new(self.tooth, surface, Position::Mid),
            (surface, Position::Mid) => Self::new(self.tooth, surface, Position::Mesial),
            (Surface::Buccal, Position::Mesial) => {
                Self::new(self.tooth, Surface::Lingual, Position::Distal)
            }
            (Surface::Lingual, Position::Mesial) => {
                Self::new(self.tooth.next()?, Surface::Buccal, Position::Distal)
            }
        };
        Some(next)
    }
}

impl SelectionCursor {
    pub fn at_site(site: ProbingSite) -> Self {
        Self {
            tooth: Some(site.tooth),
            measurement: Some(MeasurementKind::ProbingDepth),
            surface: Some(site.surface),
            position: Some(site.position),
        }
    }

    pub fn select_site(&mut self, tooth: ToothNumber, surface: Surface, position: Position) {
        *self = Self::at_site(ProbingSite::new(tooth, surface, position));
    }

    /// Direct selection for measurement types that do not auto-advance.
    /// Selecting probing depth this way starts at the buccal distal site.
    pub fn select(&mut self, tooth: ToothNumber, kind: MeasurementKind) {
        if kind == MeasurementKind::ProbingDepth {
            self.select_site(tooth, Surface::Buccal, Position::Distal);
            return;
        }
        *self = Self {
            tooth: Some(tooth),
            measurement: Some(kind),
            surface: None,
            position: None,
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_inert(&self) -> bool {
        self.tooth.is_none()
    }

    /// The probing site under the cursor, if it points at one.
    pub fn probing_site(&self) -> Option<ProbingSite> {
        match (self.tooth, self.measurement, self.surface, self.position) {
            (Some(tooth), Some(MeasurementKind::ProbingDepth), Some(surface), Some(position)) => {
                Some(ProbingSite::new(tooth, surface, position))
            }
            _ => None,
        }
    }

    /// Moves to the next probing site after a value was committed. Past the
    /// last site of tooth 32 the cursor goes inert. Other measurement types
    /// keep their selection.
    pub fn advance(&mut self) {
        let Some(site) = self.probing_site() else {
            return;
        };
        match site.successor() {
            Some(next) => {
                tracing::trace!(from = ?site, to = ?next, "cursor advanced");
                *self = Self::at_site(next);
            }
            None => {
                tracing::trace!(from = ?site, "probing sequence complete");
                self.clear();
            }
        }
    }

    pub fn is_selected(
        &self,
        tooth: ToothNumber,
        kind: MeasurementKind,
        surface: Option<Surface>,
        position: Option<Position>,
    ) -> bool {
        self.tooth == Some(tooth)
            && self.measurement == Some(kind)
            && self.surface == surface
            && self.position == position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tooth(n: u8) -> ToothNumber {
        ToothNumber::new(n).unwrap()
    }

    fn site_of(cursor: &SelectionCursor) -> (u8, Surface, Position) {
        let site = cursor.probing_site().expect("cursor should be on a probing site");
        (site.tooth.get(), site.surface, site.position)
    }

    #[test]
    fn walks_one_tooth_then_moves_to_the_next() {
        use Position::{Distal, Mesial, Mid};
        use Surface::{Buccal, Lingual};

        let mut cursor = SelectionCursor::default();
        cursor.select_site(tooth(1), Buccal, Distal);

        let expected = [
            (1, Buccal, Distal),
            (1, Buccal, Mid),
            (1, Buccal, Mesial),
            (1, Lingual, Distal),
            (1, Lingual, Mid),
            (1, Lingual, Mesial),
            (2, Buccal, Distal),
        ];
        for (step, want) in expected.iter().enumerate() {
            assert_eq!(&site_of(&cursor), want, "step {step}");
            cursor.advance();
        }
    }

    #[test]
    fn crosses_from_upper_to_lower_arch() {
        let mut cursor = SelectionCursor::default();
        cursor.select_site(tooth(16), Surface::Lingual, Position::Mesial);
        cursor.advance();
        assert_eq!(site_of(&cursor), (17, Surface::Buccal, Position::Distal));
    }

    #[test]
    fn goes_inert_after_last_site_without_wrapping() {
        let mut cursor = SelectionCursor::default();
        cursor.select_site(tooth(32), Surface::Lingual, Position::Mesial);
        cursor.advance();
        assert!(cursor.is_inert());
        assert_eq!(cursor.probing_site(), None);

        cursor.advance();
        assert!(cursor.is_inert());
    }

    #[test]
    fn other_measurements_do_not_advance() {
        let mut cursor = SelectionCursor::default();
        cursor.select(tooth(7), MeasurementKind::Mobility);
        let before = cursor;
        cursor.advance();
        assert_eq!(cursor, before);
        assert!(cursor.is_selected(tooth(7), MeasurementKind::Mobility, None, None));
    }

    #[test]
    fn selecting_probing_depth_starts_at_buccal_distal() {
        let mut cursor = SelectionCursor::default();
        cursor.select(tooth(20), MeasurementKind::ProbingDepth);
        assert_eq!(site_of(&cursor), (20, Surface::Buccal, Position::Distal));
    }

    #[test]
    fn full_mouth_sequence_has_192_sites() {
        let mut cursor = SelectionCursor::at_site(ProbingSite::new(
            ToothNumber::FIRST,
            Surface::Buccal,
            Position::Distal,
        ));
        let mut visited = 0;
        while !cursor.is_inert() {
            visited += 1;
            cursor.advance();
        }
        assert_eq!(visited, 32 * 6);
    }
}
