//! Turns text typed into the entry box into an edit at the cursor.

use perio_core::{ChartSession, ChartUpdate, FurcationGrade, MeasurementKind, SelectionCursor};

/// Result of pressing Enter in the entry box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The value was written; probing entries have also advanced the cursor.
    Recorded,
    /// Nothing is selected that takes a typed value.
    NoTarget,
}

/// Applies `text` to whatever the cursor points at. Empty text clears the
/// field. Flags are toggled by clicking and never take typed input.
pub fn commit_entry(session: &mut ChartSession, text: &str) -> Result<EntryOutcome, String> {
    let cursor = *session.cursor();
    let (Some(tooth), Some(kind)) = (cursor.tooth, cursor.measurement) else {
        return Ok(EntryOutcome::NoTarget);
    };
    let text = text.trim();

    let update = match kind {
        MeasurementKind::ProbingDepth => {
            let depth = parse_number::<u8>(text, "Probing depth")?;
            return session
                .commit_depth(depth)
                .map(|written| {
                    if written {
                        EntryOutcome::Recorded
                    } else {
                        EntryOutcome::NoTarget
                    }
                })
                .map_err(|err| err.to_string());
        }
        MeasurementKind::Mobility => ChartUpdate::Mobility(parse_number(text, "Mobility")?),
        MeasurementKind::GingivalMargin => {
            ChartUpdate::GingivalMargin(parse_number(text, "Gingival margin")?)
        }
        MeasurementKind::Furcation => {
            let grade = parse_number::<u8>(text, "Furcation")?
                .map(FurcationGrade::try_from)
                .transpose()
                .map_err(|_| "Furcation must be 1, 2 or 3".to_string())?;
            ChartUpdate::Furcation(grade)
        }
        MeasurementKind::BleedingOnProbing | MeasurementKind::Plaque | MeasurementKind::Implant => {
            return Ok(EntryOutcome::NoTarget);
        }
    };

    session
        .set_field(tooth, update)
        .map(|()| EntryOutcome::Recorded)
        .map_err(|err| err.to_string())
}

/// Prompt shown next to the entry box.
pub fn describe_cursor(cursor: &SelectionCursor) -> String {
    match (cursor.tooth, cursor.measurement) {
        (None, _) | (_, None) => "Select a site to record".to_string(),
        (Some(tooth), Some(MeasurementKind::ProbingDepth)) => match cursor.probing_site() {
            Some(site) => format!(
                "Tooth {tooth} · {} {}",
                site.surface.label(),
                site.position.label()
            ),
            None => format!("Tooth {tooth} · probing depth"),
        },
        (Some(tooth), Some(kind)) => format!("Tooth {tooth} · {}", kind.label().to_lowercase()),
    }
}

fn parse_number<T: std::str::FromStr>(text: &str, label: &str) -> Result<Option<T>, String> {
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<T>()
        .map(Some)
        .map_err(|_| format!("{label}: {text:?} is not a valid value"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use perio_core::{ChartConfig, ChartKey, Position, Surface, ToothNumber};

    fn session() -> ChartSession {
        let key = ChartKey::new("P-12", NaiveDate::from_ymd_opt(2024, 8, 8).unwrap()).unwrap();
        ChartSession::new_chart(key, ChartConfig::default())
    }

    fn tooth(n: u8) -> ToothNumber {
        ToothNumber::new(n).unwrap()
    }

    #[test]
    fn depth_entry_advances_cursor() {
        let mut session = session();
        session.select_site(tooth(4), Surface::Buccal, Position::Distal);

        assert_eq!(commit_entry(&mut session, "5"), Ok(EntryOutcome::Recorded));
        assert_eq!(commit_entry(&mut session, " 3 "), Ok(EntryOutcome::Recorded));

        let buccal = session.chart().tooth(tooth(4)).probing_depth.buccal;
        assert_eq!((buccal.distal, buccal.mid), (Some(5), Some(3)));
        assert_eq!(session.cursor().position, Some(Position::Mesial));
    }

    #[test]
    fn empty_entry_clears_and_still_advances() {
        let mut session = session();
        session.select_site(tooth(4), Surface::Buccal, Position::Distal);
        commit_entry(&mut session, "").unwrap();
        assert_eq!(session.chart().tooth(tooth(4)).probing_depth.buccal.distal, None);
        assert_eq!(session.cursor().position, Some(Position::Mid));
    }

    #[test]
    fn scalar_entries_do_not_move_the_cursor() {
        let mut session = session();
        session.select(tooth(30), MeasurementKind::GingivalMargin);
        commit_entry(&mut session, "-2").unwrap();
        session.select(tooth(30), MeasurementKind::Furcation);
        commit_entry(&mut session, "2").unwrap();

        let record = session.chart().tooth(tooth(30));
        assert_eq!(record.gingival_margin, Some(-2));
        assert_eq!(record.furcation, Some(FurcationGrade::Two));
        assert_eq!(session.cursor().tooth, Some(tooth(30)));
    }

    #[test]
    fn invalid_text_is_reported() {
        let mut session = session();
        session.select(tooth(2), MeasurementKind::Furcation);
        assert!(commit_entry(&mut session, "4").is_err());
        session.select_site(tooth(2), Surface::Lingual, Position::Mid);
        assert!(commit_entry(&mut session, "deep").is_err());
        assert!(session.chart().tooth(tooth(2)).is_blank());
    }

    #[test]
    fn prompt_names_the_site() {
        let mut session = session();
        assert_eq!(describe_cursor(session.cursor()), "Select a site to record");
        session.select_site(tooth(9), Surface::Lingual, Position::Mesial);
        assert_eq!(describe_cursor(session.cursor()), "Tooth 9 · Lingual mesial");
        session.select(tooth(9), MeasurementKind::GingivalMargin);
        assert_eq!(describe_cursor(session.cursor()), "Tooth 9 · gingival margin");
    }

    #[test]
    fn nothing_selected_means_no_target() {
        let mut session = session();
        assert_eq!(commit_entry(&mut session, "3"), Ok(EntryOutcome::NoTarget));
        session.select(tooth(2), MeasurementKind::Plaque);
        assert_eq!(commit_entry(&mut session, "1"), Ok(EntryOutcome::NoTarget));
    }
}
