//! Periodontal chart view for the WebAssembly target.

pub mod entry;
pub mod state;
pub mod storage;
pub mod styles;

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use std::rc::Rc;

    use chrono::NaiveDate;
    use perio_core::{
        ArchGrid, CellValue, Chart, ChartConfig, ChartGateway, ChartKey, ChartSession,
        ChartSummary, GridCell, GridRow, MeasurementKind, Notice, NoticeLevel, PerioError,
        ToggleField, ToothNumber,
    };
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::prelude::*;
    use web_sys::{console, Document, Element, HtmlInputElement, HtmlTextAreaElement, Window};
    use yew::events::{InputEvent, KeyboardEvent};
    use yew::platform::spawn_local;
    use yew::prelude::*;
    use yew::TargetCast;

    use crate::entry::describe_cursor;
    use crate::state::{ChartLoad, ChartSource, ViewAction, ViewState};
    use crate::storage::LocalStorageGateway;
    use crate::styles;

    impl Reducible for ViewState {
        type Action = ViewAction;

        fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
            Rc::new((*self).clone().apply(action))
        }
    }

    #[derive(Properties, PartialEq)]
    pub struct PerioChartViewProps {
        pub source: ChartSource,
        #[prop_or_default]
        pub config: ChartConfig,
    }

    /// Reads the pending exam from browser storage and reports the outcome.
    /// A missing exam also lists the patient's earlier exams.
    fn open_stored(state: &UseReducerHandle<ViewState>, key: ChartKey) {
        let config = state.config.clone();
        let (result, earlier) = match LocalStorageGateway::from_window(config.clone()) {
            Ok(gateway) => {
                let result = ChartSession::open(&gateway, &key, config);
                let earlier = match &result {
                    Err(PerioError::NotFound { .. }) => gateway
                        .list(&key.patient_id)
                        .unwrap_or_else(|err| {
                            tracing::warn!(patient = %key.patient_id, error = %err, "could not list exams");
                            Vec::new()
                        }),
                    _ => Vec::new(),
                };
                (result, earlier)
            }
            Err(err) => (Err(err), Vec::new()),
        };
        state.dispatch(ViewAction::Opened {
            key,
            result,
            earlier,
        });
    }

    #[function_component(PerioChartView)]
    fn perio_chart_view(props: &PerioChartViewProps) -> Html {
        use_effect_with((), |_| {
            if let Some(document) = web_sys::window().and_then(|window| window.document()) {
                if let Err(err) =
                    styles::install_stylesheet(&document, styles::STYLE_ID, styles::DEFAULT_STYLES)
                {
                    console::error_1(&err);
                }
            }
            || ()
        });

        let state = {
            let source = props.source.clone();
            let config = props.config.clone();
            use_reducer(move || ViewState::new(source, config))
        };
        let draft = use_state(String::new);

        {
            let deps = (state.load_attempt, state.pending_load().cloned());
            let state = state.clone();
            use_effect_with(deps, move |(_, pending)| {
                if let Some(key) = pending.clone() {
                    open_stored(&state, key);
                }
                || ()
            });
        }

        // Runs after the render that shows the save as pending.
        {
            let state = state.clone();
            use_effect_with(state.save_attempt, move |_| {
                if let Some(chart) = state.outgoing.clone() {
                    let config = state.config.clone();
                    spawn_local(async move {
                        let result = LocalStorageGateway::from_window(config)
                            .and_then(|mut gateway| gateway.save(&chart));
                        state.dispatch(ViewAction::FinishSave(result));
                    });
                }
                || ()
            });
        }

        let session = match &state.chart {
            ChartLoad::Ready(session) => session,
            ChartLoad::Loading(key) => return render_loading(key),
            ChartLoad::Failed {
                key,
                message,
                missing,
                earlier,
                ..
            } => return render_failed(key, message, *missing, earlier, &state),
        };
        let chart = session.chart();
        let grid = session.grid();
        let summary = session.summary();

        let on_draft = {
            let draft = draft.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                draft.set(input.value());
            })
        };

        let on_entry_key = {
            let draft = draft.clone();
            let state = state.clone();
            Callback::from(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    "Enter" => {
                        event.prevent_default();
                        state.dispatch(ViewAction::Enter((*draft).clone()));
                        draft.set(String::new());
                    }
                    "Escape" => state.dispatch(ViewAction::ClearSelection),
                    _ => {}
                }
            })
        };

        let on_notes = {
            let state = state.clone();
            Callback::from(move |event: InputEvent| {
                let area: HtmlTextAreaElement = event.target_unchecked_into();
                state.dispatch(ViewAction::SetNotes(area.value()));
            })
        };

        let on_save = {
            let state = state.clone();
            Callback::from(move |_| state.dispatch(ViewAction::BeginSave))
        };

        let on_dismiss = {
            let state = state.clone();
            Callback::from(move |_| state.dispatch(ViewAction::DismissNotices))
        };

        html! {
            <div class="perio-root">
                <header class="perio-header">
                    <div>
                        <h2>{"Periodontal chart"}</h2>
                        <p>{ format!("Patient {} · exam {}", chart.patient_id, chart.exam_date) }</p>
                    </div>
                    <div class="perio-actions">
                        { session.is_dirty().then(|| html! { <span class="perio-dirty">{"Unsaved changes"}</span> }).unwrap_or_default() }
                        <button type="button" onclick={on_save} disabled={state.save_disabled()}>
                            { if session.is_save_pending() { "Saving…" } else { "Save" } }
                        </button>
                    </div>
                </header>
                { render_notices(&state.notices, on_dismiss) }
                <div class="perio-entry">
                    <label for="perio-entry-input">{ describe_cursor(session.cursor()) }</label>
                    <input
                        id="perio-entry-input"
                        type="text"
                        inputmode="numeric"
                        value={(*draft).clone()}
                        oninput={on_draft}
                        onkeydown={on_entry_key}
                        aria-label="Value for the selected site"
                    />
                </div>
                { render_arch(&grid.upper, &state) }
                { render_arch(&grid.lower, &state) }
                { render_legend() }
                { render_summary(&summary) }
                <section class="perio-notes">
                    <textarea
                        placeholder="Clinical notes"
                        value={chart.notes.clone()}
                        oninput={on_notes}
                    />
                </section>
            </div>
        }
    }

    fn render_loading(key: &ChartKey) -> Html {
        html! {
            <div class="perio-root">
                <div class="perio-blocked" data-state="loading" role="status">
                    { format!("Opening chart for {key}…") }
                </div>
            </div>
        }
    }

    fn render_failed(
        key: &ChartKey,
        message: &str,
        missing: bool,
        earlier: &[ChartKey],
        state: &UseReducerHandle<ViewState>,
    ) -> Html {
        let on_retry = {
            let state = state.clone();
            Callback::from(move |_: MouseEvent| state.dispatch(ViewAction::Retry))
        };
        let start_new = missing.then(|| {
            let state = state.clone();
            let onclick = Callback::from(move |_: MouseEvent| state.dispatch(ViewAction::StartNew));
            html! { <button type="button" {onclick}>{"Start new chart"}</button> }
        });
        let earlier_exams = (!earlier.is_empty()).then(|| {
            html! {
                <ul>
                    {
                        for earlier.iter().map(|exam| {
                            let state = state.clone();
                            let target = exam.clone();
                            let onclick = Callback::from(move |_: MouseEvent| {
                                state.dispatch(ViewAction::OpenExam(target.clone()))
                            });
                            html! {
                                <li><button type="button" {onclick}>{ format!("Open exam {}", exam.exam_date) }</button></li>
                            }
                        })
                    }
                </ul>
            }
        });

        html! {
            <div class="perio-root">
                <div class="perio-blocked" data-state="failed" role="alert">
                    <strong>{ format!("Chart {key} could not be opened") }</strong>
                    <span>{ message.to_string() }</span>
                    <div class="perio-actions">
                        <button type="button" onclick={on_retry}>{"Retry"}</button>
                        { start_new.unwrap_or_default() }
                    </div>
                    { earlier_exams.unwrap_or_default() }
                </div>
            </div>
        }
    }

    fn render_notices(notices: &[Notice], on_dismiss: Callback<MouseEvent>) -> Html {
        if notices.is_empty() {
            return Html::default();
        }
        html! {
            <div class="perio-notices" role="status">
                {
                    for notices.iter().map(|notice| {
                        let level = match notice.level {
                            NoticeLevel::Info => "info",
                            NoticeLevel::Error => "error",
                        };
                        html! { <div class="perio-notice" data-level={level}>{ notice.message.clone() }</div> }
                    })
                }
                <button type="button" onclick={on_dismiss}>{"Dismiss"}</button>
            </div>
        }
    }

    fn render_arch(arch: &ArchGrid, state: &UseReducerHandle<ViewState>) -> Html {
        html! {
            <section class="perio-arch">
                <h3>{ arch.arch.label() }</h3>
                <table class="perio-grid">
                    <thead>
                        <tr>
                            <th class="perio-row-label"></th>
                            { for arch.teeth.iter().map(|tooth| html! { <th colspan="3">{ tooth.get() }</th> }) }
                        </tr>
                    </thead>
                    <tbody>
                        { for arch.rows.iter().map(|row| render_row(row, state)) }
                    </tbody>
                </table>
            </section>
        }
    }

    fn render_row(row: &GridRow, state: &UseReducerHandle<ViewState>) -> Html {
        html! {
            <tr>
                <th class="perio-row-label" scope="row">{ row.label.clone() }</th>
                {
                    for row.columns.iter().flat_map(|column| {
                        let colspan = if column.cells.len() == 1 { "3" } else { "1" };
                        column.cells.iter().map(move |cell| render_cell(row.kind, column.tooth, cell, colspan, state))
                    })
                }
            </tr>
        }
    }

    fn render_cell(
        kind: MeasurementKind,
        tooth: ToothNumber,
        cell: &GridCell,
        colspan: &'static str,
        state: &UseReducerHandle<ViewState>,
    ) -> Html {
        let action_for_click = {
            let surface = cell.surface;
            let position = cell.position;
            move || match (kind, surface, position) {
                (MeasurementKind::ProbingDepth, Some(surface), Some(position)) => {
                    ViewAction::SelectSite(tooth, surface, position)
                }
                (MeasurementKind::BleedingOnProbing, _, _) => {
                    ViewAction::Toggle(tooth, ToggleField::BleedingOnProbing)
                }
                (MeasurementKind::Plaque, _, _) => ViewAction::Toggle(tooth, ToggleField::Plaque),
                (MeasurementKind::Implant, _, _) => ViewAction::Toggle(tooth, ToggleField::Implant),
                (kind, _, _) => ViewAction::Select(tooth, kind),
            }
        };
        let onclick = {
            let state = state.clone();
            Callback::from(move |_: MouseEvent| state.dispatch(action_for_click()))
        };

        let tone = match cell.value {
            CellValue::Depth { band, .. } => Some(band.css_class()),
            CellValue::Flag { active: true } => Some("flag-active"),
            _ => None,
        };

        html! {
            <td
                class={classes!("perio-cell", tone, cell.selected.then_some("is-selected"))}
                colspan={colspan}
                onclick={onclick}
            >
                { cell.value.display_text() }
            </td>
        }
    }

    fn render_legend() -> Html {
        use perio_core::DepthBand;
        html! {
            <div class="perio-legend">
                {
                    for [DepthBand::Healthy, DepthBand::Moderate, DepthBand::Severe].into_iter().map(|band| html! {
                        <span class={classes!("perio-cell", band.css_class())}>{ band.label() }</span>
                    })
                }
                <span>{"Furcation: ○ I · ◐ II · ● III"}</span>
            </div>
        }
    }

    fn render_summary(summary: &ChartSummary) -> Html {
        let mut stats = vec![
            format!("Sites recorded: {}/192", summary.recorded_sites),
            format!("BOP: {:.1}%", summary.bleeding_percent),
            format!("Plaque: {:.1}%", summary.plaque_percent),
            format!(
                "Sites 4–5 mm: {} · ≥6 mm: {}",
                summary.bands.moderate, summary.bands.severe
            ),
        ];
        if let Some(mean) = summary.mean_probing_depth {
            stats.push(format!("Mean PD: {mean:.1} mm"));
        }
        if let Some(deepest) = &summary.deepest {
            stats.push(format!(
                "Deepest: {} mm (#{} {} {})",
                deepest.depth,
                deepest.site.tooth,
                deepest.site.surface.label(),
                deepest.site.position.label()
            ));
        }
        html! {
            <div class="perio-summary">
                { for stats.into_iter().map(|text| html! { <span class="perio-stat">{ text }</span> }) }
            </div>
        }
    }

    fn mount(selector: &str, source: ChartSource) -> Result<(), JsValue> {
        let window: Window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Cannot access document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Invalid selector: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("No element matches the selector"))?;

        yew::Renderer::<PerioChartView>::with_root_and_props(
            target,
            PerioChartViewProps {
                source,
                config: ChartConfig::default(),
            },
        )
        .render();
        Ok(())
    }

    /// Shows a chart object supplied by the host page.
    #[wasm_bindgen]
    pub fn mount_perio_chart(selector: &str, chart: JsValue) -> Result<(), JsValue> {
        let chart: Chart = from_value(chart)?;
        mount(selector, ChartSource::Chart(chart))
    }

    /// Opens a stored exam, blocking the view until it loads.
    #[wasm_bindgen]
    pub fn mount_stored_chart(
        selector: &str,
        patient_id: &str,
        exam_date: &str,
    ) -> Result<(), JsValue> {
        let exam_date = NaiveDate::parse_from_str(exam_date, "%Y-%m-%d")
            .map_err(|err| JsValue::from_str(&format!("Invalid exam date {exam_date:?}: {err}")))?;
        let key = ChartKey::new(patient_id, exam_date)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        mount(selector, ChartSource::Stored(key))
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::{mount_perio_chart, mount_stored_chart};

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_perio_chart(_: &str, _: wasm_bindgen::JsValue) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "perio-ui only supports the wasm32 target",
    ))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_stored_chart(_: &str, _: &str, _: &str) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "perio-ui only supports the wasm32 target",
    ))
}
