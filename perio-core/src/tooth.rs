//! Universal tooth numbering and probing-site vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PerioError;

/// Number of permanent teeth in a full chart.
pub const TOOTH_COUNT: usize = 32;

/// A tooth in universal numbering (1 = upper right third molar,
/// 16 = upper left third molar, 17 = lower left third molar,
/// 32 = lower right third molar).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct ToothNumber(u8);

impl ToothNumber {
    pub const FIRST: ToothNumber = ToothNumber(1);
    pub const LAST: ToothNumber = ToothNumber(32);

    pub fn new(number: u8) -> Result<Self, PerioError> {
        if (1..=TOOTH_COUNT as u8).contains(&number) {
            Ok(Self(number))
        } else {
            Err(PerioError::InvalidTooth(number))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based slot in a 32-entry chart.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// All teeth in charting order.
    pub fn all() -> impl DoubleEndedIterator<Item = ToothNumber> {
        (1..=TOOTH_COUNT as u8).map(ToothNumber)
    }

    /// Next tooth in the probing sequence. The upper arch ends at 16 and
    /// continues at 17 on the lower arch; 32 has no successor.
    pub fn next(self) -> Option<ToothNumber> {
        if self == Self::LAST {
            None
        } else {
            Some(ToothNumber(self.0 + 1))
        }
    }

    pub fn arch(self) -> Arch {
        if self.0 <= 16 {
            Arch::Upper
        } else {
            Arch::Lower
        }
    }

    pub fn quadrant(self) -> Quadrant {
        match self.0 {
            1..=8 => Quadrant::UpperRight,
            9..=16 => Quadrant::UpperLeft,
            17..=24 => Quadrant::LowerLeft,
            _ => Quadrant::LowerRight,
        }
    }
}

impl TryFrom<u8> for ToothNumber {
    type Error = PerioError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ToothNumber> for u8 {
    fn from(tooth: ToothNumber) -> Self {
        tooth.0
    }
}

impl fmt::Display for ToothNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    Upper,
    Lower,
}

impl Arch {
    pub fn label(self) -> &'static str {
        match self {
            Arch::Upper => "Upper arch",
            Arch::Lower => "Lower arch",
        }
    }
}

/// Quadrants from the patient's point of view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
}

impl Quadrant {
    /// Whether the quadrant lies on the patient's right, i.e. the viewer's left.
    pub fn is_patient_right(self) -> bool {
        matches!(self, Quadrant::UpperRight | Quadrant::LowerRight)
    }
}

/// Probed surface of a tooth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Buccal,
    Lingual,
}

impl Surface {
    pub fn label(self) -> &'static str {
        match self {
            Surface::Buccal => "Buccal",
            Surface::Lingual => "Lingual",
        }
    }
}

/// Probing position along a surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Distal,
    Mid,
    Mesial,
}

impl Position {
    pub fn label(self) -> &'static str {
        match self {
            Position::Distal => "distal",
            Position::Mid => "mid",
            Position::Mesial => "mesial",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_numbers_outside_the_permanent_dentition() {
        assert!(matches!(ToothNumber::new(0), Err(PerioError::InvalidTooth(0))));
        assert!(matches!(ToothNumber::new(33), Err(PerioError::InvalidTooth(33))));
        assert_eq!(ToothNumber::new(32).unwrap().index(), 31);
    }

    #[test]
    fn sequence_crosses_arches_and_stops_at_last_tooth() {
        let sixteen = ToothNumber::new(16).unwrap();
        assert_eq!(sixteen.next().map(ToothNumber::get), Some(17));
        assert_eq!(sixteen.arch(), Arch::Upper);
        assert_eq!(sixteen.next().unwrap().arch(), Arch::Lower);
        assert_eq!(ToothNumber::LAST.next(), None);
        assert_eq!(ToothNumber::all().count(), TOOTH_COUNT);
    }

    #[test]
    fn quadrants_follow_universal_numbering() {
        let quadrant = |n| ToothNumber::new(n).unwrap().quadrant();
        assert_eq!(quadrant(8), Quadrant::UpperRight);
        assert_eq!(quadrant(9), Quadrant::UpperLeft);
        assert_eq!(quadrant(24), Quadrant::LowerLeft);
        assert_eq!(quadrant(25), Quadrant::LowerRight);
    }

    #[test]
    fn deserializes_from_plain_integer() {
        let tooth: ToothNumber = serde_json::from_str("12").unwrap();
        assert_eq!(tooth.get(), 12);
        assert!(serde_json::from_str::<ToothNumber>("40").is_err());
    }
}
