//! View state of the chart component, kept free of browser types so the
//! load and save flow can be tested on the host.

use perio_core::{
    Chart, ChartConfig, ChartKey, ChartSession, MeasurementKind, Notice, NoticeLevel, PerioError,
    Position, SaveReceipt, Surface, ToggleField, ToothNumber,
};

use crate::entry::commit_entry;

/// What the component was asked to show.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSource {
    /// A chart the host page already holds.
    Chart(Chart),
    /// A stored exam to open from the record service.
    Stored(ChartKey),
}

#[derive(Debug, Clone)]
pub enum ChartLoad {
    Loading(ChartKey),
    Ready(ChartSession),
    /// Opening failed. The chart stays blocked until a retry succeeds or
    /// the user starts a new chart for a missing exam.
    Failed {
        key: ChartKey,
        message: String,
        missing: bool,
        retryable: bool,
        earlier: Vec<ChartKey>,
    },
}

pub enum ViewAction {
    Opened {
        key: ChartKey,
        result: Result<ChartSession, PerioError>,
        earlier: Vec<ChartKey>,
    },
    Retry,
    OpenExam(ChartKey),
    StartNew,
    SelectSite(ToothNumber, Surface, Position),
    Select(ToothNumber, MeasurementKind),
    Toggle(ToothNumber, ToggleField),
    Enter(String),
    ClearSelection,
    SetNotes(String),
    BeginSave,
    FinishSave(Result<SaveReceipt, PerioError>),
    DismissNotices,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    pub chart: ChartLoad,
    pub config: ChartConfig,
    pub notices: Vec<Notice>,
    /// Snapshot handed out by `BeginSave`, waiting to be written.
    pub outgoing: Option<Chart>,
    /// Bumped whenever a new open is requested.
    pub load_attempt: u32,
    /// Bumped whenever a save is started.
    pub save_attempt: u32,
}

impl ViewState {
    pub fn new(source: ChartSource, config: ChartConfig) -> Self {
        let chart = match source {
            ChartSource::Chart(chart) => {
                ChartLoad::Ready(ChartSession::from_chart(chart, config.clone()))
            }
            ChartSource::Stored(key) => ChartLoad::Loading(key),
        };
        Self {
            chart,
            config,
            notices: Vec::new(),
            outgoing: None,
            load_attempt: 0,
            save_attempt: 0,
        }
    }

    pub fn session(&self) -> Option<&ChartSession> {
        match &self.chart {
            ChartLoad::Ready(session) => Some(session),
            _ => None,
        }
    }

    /// Key the component should open next, if it is waiting on a load.
    pub fn pending_load(&self) -> Option<&ChartKey> {
        match &self.chart {
            ChartLoad::Loading(key) => Some(key),
            _ => None,
        }
    }

    pub fn save_disabled(&self) -> bool {
        self.session().map_or(true, ChartSession::is_save_pending)
    }

    pub fn apply(mut self, action: ViewAction) -> Self {
        match action {
            ViewAction::Opened {
                key,
                result,
                earlier,
            } => {
                if self.pending_load() != Some(&key) {
                    return self;
                }
                self.chart = match result {
                    Ok(session) => ChartLoad::Ready(session),
                    Err(err) => ChartLoad::Failed {
                        message: err.to_string(),
                        missing: matches!(err, PerioError::NotFound { .. }),
                        retryable: err.is_retryable(),
                        key,
                        earlier,
                    },
                };
            }
            ViewAction::Retry => {
                if let ChartLoad::Failed { key, .. } = &self.chart {
                    self.chart = ChartLoad::Loading(key.clone());
                    self.load_attempt += 1;
                }
            }
            ViewAction::OpenExam(key) => {
                if self.session().map_or(false, ChartSession::is_dirty) {
                    self.notify(NoticeLevel::Error, "Save or discard the current chart first");
                    return self;
                }
                self.chart = ChartLoad::Loading(key);
                self.outgoing = None;
                self.load_attempt += 1;
            }
            ViewAction::StartNew => {
                if let ChartLoad::Failed {
                    key, missing: true, ..
                } = &self.chart
                {
                    self.chart = ChartLoad::Ready(ChartSession::new_chart(
                        key.clone(),
                        self.config.clone(),
                    ));
                }
            }
            ViewAction::DismissNotices => self.notices.clear(),
            ViewAction::Enter(text) => {
                if let ChartLoad::Ready(session) = &mut self.chart {
                    if let Err(message) = commit_entry(session, &text) {
                        self.notify(NoticeLevel::Error, message);
                    }
                }
            }
            ViewAction::BeginSave => {
                if let ChartLoad::Ready(session) = &mut self.chart {
                    match session.begin_save() {
                        Ok(chart) => {
                            self.outgoing = Some(chart);
                            self.save_attempt += 1;
                        }
                        Err(err) => self.notify(NoticeLevel::Error, err.to_string()),
                    }
                }
            }
            ViewAction::FinishSave(result) => {
                self.outgoing = None;
                if let ChartLoad::Ready(session) = &mut self.chart {
                    session.finish_save(&result);
                }
            }
            edit => {
                if let ChartLoad::Ready(session) = &mut self.chart {
                    apply_edit(session, edit);
                }
            }
        }

        if let ChartLoad::Ready(session) = &mut self.chart {
            let drained = session.take_notices();
            self.notices.extend(drained);
        }
        self
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }
}

fn apply_edit(session: &mut ChartSession, action: ViewAction) {
    match action {
        ViewAction::SelectSite(tooth, surface, position) => {
            session.select_site(tooth, surface, position)
        }
        ViewAction::Select(tooth, kind) => session.select(tooth, kind),
        ViewAction::Toggle(tooth, field) => {
            session.toggle(tooth, field);
        }
        ViewAction::ClearSelection => session.clear_selection(),
        ViewAction::SetNotes(notes) => session.set_notes(notes),
        _ => {}
    }
}
