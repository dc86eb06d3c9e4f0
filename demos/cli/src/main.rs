use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use perio_core::{
    ChartConfig, ChartGateway, ChartKey, ChartSession, ChartUpdate, FurcationGrade,
    MissingToothPolicy, PerioError, Position, Surface, ToggleField, ToothNumber,
};
use perio_json::{chart_to_string_pretty, JsonFileGateway};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(
    name = "perio-cli",
    about = "Record and review periodontal charts stored as JSON files."
)]
struct Args {
    /// Directory that holds one sub-directory of charts per patient.
    #[arg(long, env = "PERIO_STORE_DIR", default_value = "charts", global = true)]
    store_dir: PathBuf,

    /// Refuse charts that do not list all 32 teeth instead of filling them in.
    #[arg(long, global = true)]
    reject_sparse: bool,

    /// Largest probing depth accepted, in millimetres.
    #[arg(long, global = true)]
    max_depth: Option<u8>,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Debug)]
struct ChartArgs {
    #[arg(short, long)]
    patient: String,

    /// Exam date, YYYY-MM-DD.
    #[arg(short = 'd', long)]
    date: NaiveDate,
}

impl ChartArgs {
    fn key(&self) -> anyhow::Result<ChartKey> {
        ChartKey::new(&self.patient, self.date)
            .with_context(|| format!("invalid patient id {:?}", self.patient))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a blank chart for an exam.
    New {
        #[command(flatten)]
        chart: ChartArgs,
        /// Overwrite an existing chart for the same exam.
        #[arg(long)]
        force: bool,
    },
    /// Print the chart as a grid.
    Show {
        #[command(flatten)]
        chart: ChartArgs,
    },
    /// Set or clear one measurement on a tooth.
    Set {
        #[command(flatten)]
        chart: ChartArgs,
        #[arg(short, long)]
        tooth: u8,
        #[command(subcommand)]
        field: FieldArg,
    },
    /// Flip bleeding, plaque or implant on a tooth.
    Toggle {
        #[command(flatten)]
        chart: ChartArgs,
        #[arg(short, long)]
        tooth: u8,
        #[arg(value_enum)]
        flag: FlagArg,
    },
    /// Enter probing depths site by site, starting at the given site.
    /// Use `-` to leave a site unrecorded.
    Probe {
        #[command(flatten)]
        chart: ChartArgs,
        #[arg(short, long)]
        tooth: u8,
        #[arg(long, value_enum, default_value = "buccal")]
        surface: SurfaceArg,
        #[arg(long, value_enum, default_value = "distal")]
        position: PositionArg,
        #[arg(required = true, allow_hyphen_values = true)]
        depths: Vec<String>,
    },
    /// Replace the clinical notes.
    Notes {
        #[command(flatten)]
        chart: ChartArgs,
        text: String,
    },
    /// Print summary statistics.
    Summary {
        #[command(flatten)]
        chart: ChartArgs,
        /// Print the statistics as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the chart as canonical JSON.
    Export {
        #[command(flatten)]
        chart: ChartArgs,
    },
    /// List the exam dates charted for a patient.
    List {
        #[arg(short, long)]
        patient: String,
    },
}

/// Omitting the value clears the field.
#[derive(Subcommand, Debug)]
enum FieldArg {
    Mobility {
        value: Option<u8>,
    },
    Furcation {
        grade: Option<u8>,
    },
    Margin {
        #[arg(allow_hyphen_values = true)]
        value: Option<i8>,
    },
    Depth {
        #[arg(value_enum)]
        surface: SurfaceArg,
        #[arg(value_enum)]
        position: PositionArg,
        value: Option<u8>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FlagArg {
    Bleeding,
    Plaque,
    Implant,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SurfaceArg {
    Buccal,
    Lingual,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PositionArg {
    Distal,
    Mid,
    Mesial,
}

impl From<FlagArg> for ToggleField {
    fn from(flag: FlagArg) -> Self {
        match flag {
            FlagArg::Bleeding => ToggleField::BleedingOnProbing,
            FlagArg::Plaque => ToggleField::Plaque,
            FlagArg::Implant => ToggleField::Implant,
        }
    }
}

impl From<SurfaceArg> for Surface {
    fn from(surface: SurfaceArg) -> Self {
        match surface {
            SurfaceArg::Buccal => Surface::Buccal,
            SurfaceArg::Lingual => Surface::Lingual,
        }
    }
}

impl From<PositionArg> for Position {
    fn from(position: PositionArg) -> Self {
        match position {
            PositionArg::Distal => Position::Distal,
            PositionArg::Mid => Position::Mid,
            PositionArg::Mesial => Position::Mesial,
        }
    }
}

impl FieldArg {
    fn into_update(self) -> anyhow::Result<ChartUpdate> {
        Ok(match self {
            FieldArg::Mobility { value } => ChartUpdate::Mobility(value),
            FieldArg::Furcation { grade } => ChartUpdate::Furcation(
                grade
                    .map(FurcationGrade::try_from)
                    .transpose()
                    .context("furcation grade must be 1, 2 or 3")?,
            ),
            FieldArg::Margin { value } => ChartUpdate::GingivalMargin(value),
            FieldArg::Depth {
                surface,
                position,
                value,
            } => ChartUpdate::ProbingDepth {
                surface: surface.into(),
                position: position.into(),
                depth: value,
            },
        })
    }
}

fn tooth(number: u8) -> anyhow::Result<ToothNumber> {
    ToothNumber::new(number).with_context(|| format!("no tooth numbered {number}"))
}

fn open(
    gateway: &JsonFileGateway,
    chart: &ChartArgs,
    config: &ChartConfig,
) -> anyhow::Result<ChartSession> {
    let key = chart.key()?;
    ChartSession::open(gateway, &key, config.clone())
        .with_context(|| format!("could not open chart {key}"))
}

/// Refuses to overwrite an existing chart unless `force` is set. A forced
/// create never reads the old file, so a corrupt chart can be replaced.
fn ensure_creatable(gateway: &JsonFileGateway, key: &ChartKey, force: bool) -> anyhow::Result<()> {
    if force {
        return Ok(());
    }
    match gateway.load(key) {
        Ok(_) => bail!("chart {key} already exists; pass --force to replace it"),
        Err(PerioError::NotFound { .. }) => Ok(()),
        Err(err) => Err(err).with_context(|| format!("could not check for chart {key}")),
    }
}

fn save(session: &mut ChartSession, gateway: &mut JsonFileGateway) -> anyhow::Result<()> {
    let key = session.chart().key();
    let receipt = session
        .save_with(gateway)
        .with_context(|| format!("could not save chart {key}"))?;
    println!("Saved {} at {}", receipt.key, receipt.saved_at.to_rfc3339());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ChartConfig {
        missing_teeth: if args.reject_sparse {
            MissingToothPolicy::Reject
        } else {
            MissingToothPolicy::Backfill
        },
        max_probing_depth: args.max_depth,
    };
    let mut gateway = JsonFileGateway::new(&args.store_dir, config.clone());
    tracing::debug!(store = %gateway.root().display(), ?config, "using chart store");

    match args.command {
        Command::New { chart, force } => {
            let key = chart.key()?;
            ensure_creatable(&gateway, &key, force)?;
            let mut session = ChartSession::new_chart(key, config);
            save(&mut session, &mut gateway)?;
        }
        Command::Show { chart } => {
            let session = open(&gateway, &chart, &config)?;
            let record = session.chart();
            println!("Patient {} · exam {}\n", record.patient_id, record.exam_date);
            print!("{}", render::render_grid_text(&session.grid())?);
            if !record.notes.is_empty() {
                println!("\nNotes: {}", record.notes);
            }
        }
        Command::Set {
            chart,
            tooth: number,
            field,
        } => {
            let mut session = open(&gateway, &chart, &config)?;
            let update = field.into_update()?;
            session
                .set_field(tooth(number)?, update)
                .with_context(|| format!("could not update tooth {number}"))?;
            save(&mut session, &mut gateway)?;
        }
        Command::Toggle {
            chart,
            tooth: number,
            flag,
        } => {
            let mut session = open(&gateway, &chart, &config)?;
            let field = ToggleField::from(flag);
            let now_set = session.toggle(tooth(number)?, field);
            println!(
                "Tooth {number} {}: {}",
                field.kind().label().to_lowercase(),
                if now_set { "yes" } else { "no" }
            );
            save(&mut session, &mut gateway)?;
        }
        Command::Probe {
            chart,
            tooth: number,
            surface,
            position,
            depths,
        } => {
            let mut session = open(&gateway, &chart, &config)?;
            session.select_site(tooth(number)?, surface.into(), position.into());

            for (index, raw) in depths.iter().enumerate() {
                let depth = match raw.trim() {
                    "-" | "" => None,
                    text => Some(
                        text.parse::<u8>()
                            .with_context(|| format!("{text:?} is not a probing depth"))?,
                    ),
                };
                let site = session.cursor().probing_site();
                if !session.commit_depth(depth)? {
                    tracing::warn!(
                        ignored = depths.len() - index,
                        "probing sequence ended at tooth 32; remaining values ignored"
                    );
                    break;
                }
                if let Some(site) = site {
                    tracing::debug!(
                        tooth = site.tooth.get(),
                        surface = site.surface.label(),
                        position = site.position.label(),
                        ?depth,
                        "recorded depth"
                    );
                }
            }

            match session.cursor().probing_site() {
                Some(next) => println!(
                    "Next site: tooth {} {} {}",
                    next.tooth,
                    next.surface.label().to_lowercase(),
                    next.position.label()
                ),
                None => println!("Probing sequence complete"),
            }
            save(&mut session, &mut gateway)?;
        }
        Command::Notes { chart, text } => {
            let mut session = open(&gateway, &chart, &config)?;
            session.set_notes(text);
            save(&mut session, &mut gateway)?;
        }
        Command::Summary { chart, json } => {
            let session = open(&gateway, &chart, &config)?;
            let summary = session.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", render::render_summary_text(&summary)?);
            }
        }
        Command::Export { chart } => {
            let session = open(&gateway, &chart, &config)?;
            println!("{}", chart_to_string_pretty(session.chart())?);
        }
        Command::List { patient } => {
            let keys = gateway
                .list(&patient)
                .with_context(|| format!("could not list charts for {patient}"))?;
            if keys.is_empty() {
                println!("No charts for {patient}");
            }
            for key in keys {
                println!("{}", key.exam_date);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use perio_core::Chart;
    use tempfile::tempdir;

    fn key() -> ChartKey {
        ChartKey::new("PT-8", NaiveDate::from_ymd_opt(2024, 9, 3).unwrap()).unwrap()
    }

    #[test]
    fn new_chart_is_allowed_when_none_exists() {
        let dir = tempdir().unwrap();
        let gateway = JsonFileGateway::new(dir.path(), ChartConfig::default());
        assert!(ensure_creatable(&gateway, &key(), false).is_ok());
    }

    #[test]
    fn existing_chart_needs_force() {
        let dir = tempdir().unwrap();
        let mut gateway = JsonFileGateway::new(dir.path(), ChartConfig::default());
        gateway.save(&Chart::new(key())).unwrap();

        let err = ensure_creatable(&gateway, &key(), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(ensure_creatable(&gateway, &key(), true).is_ok());
    }

    #[test]
    fn forced_create_replaces_a_corrupt_chart() {
        let dir = tempdir().unwrap();
        let mut gateway = JsonFileGateway::new(dir.path(), ChartConfig::default());
        let patient_dir = dir.path().join("PT-8");
        std::fs::create_dir_all(&patient_dir).unwrap();
        std::fs::write(patient_dir.join("2024-09-03.json"), "{ not json").unwrap();

        assert!(ensure_creatable(&gateway, &key(), false).is_err());
        ensure_creatable(&gateway, &key(), true).unwrap();

        let mut session = ChartSession::new_chart(key(), ChartConfig::default());
        session.save_with(&mut gateway).unwrap();
        assert_eq!(gateway.load(&key()).unwrap(), Chart::new(key()));
    }
}
