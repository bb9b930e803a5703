use chart::ChartCanvas;
use ecosimcore::measurement::{mock_snapshot, MeasurementSnapshot, MeasurementStore};
use ecosimcore::progress::ProgressDriver;
use ecosimcore::projection::{ChartKind, ChartView, SourceSlice};
use ecosimcore::telemetry::MetricsRecorder;
use ecosimcore::transcript::{ExchangeId, HttpAssistant, Role, Transcript};
use ecosimcore::{CoreResult, ProgressConfig};
use iced::{
    time,
    widget::{
        button, canvas::Canvas, column, progress_bar, row, scrollable, text, text_input, Column,
        Container,
    },
    Alignment, Element, Length, Subscription, Task, Theme,
};
use log::{info, warn};
use std::{env, sync::Arc, time::Duration};

mod chart;

const SNAPSHOT_POLL: Duration = Duration::from_secs(5);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    // An out-of-range progress target stops the program before any window opens.
    let settings = Settings::from_env()?;
    iced::application(
        move || Visualizer::boot(settings.clone()),
        Visualizer::update,
        Visualizer::view,
    )
    .title(application_title)
    .subscription(application_subscription)
    .theme(application_theme)
    .run()?;
    Ok(())
}

fn application_title(_: &Visualizer) -> String {
    "EcoSim Visualizer".into()
}

fn application_subscription(state: &Visualizer) -> Subscription<Message> {
    let poll = time::every(SNAPSHOT_POLL).map(|_| Message::PollSnapshot);
    // The progress timer only lives while the simulation page is shown.
    if state.page == Page::Simulation && !state.progress.is_complete() {
        Subscription::batch(vec![
            poll,
            time::every(state.settings.progress.period()).map(|_| Message::Tick),
        ])
    } else {
        poll
    }
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

/// Startup settings read from `ECOSIM_*` environment variables.
#[derive(Debug, Clone)]
struct Settings {
    bridge_url: String,
    progress: ProgressConfig,
    driver: ProgressDriver,
}

impl Settings {
    fn from_env() -> CoreResult<Self> {
        let bridge_url = env::var("ECOSIM_BRIDGE_URL")
            .unwrap_or_else(|_| HttpAssistant::DEFAULT_BASE_URL.to_string());
        let target = read_number(
            "ECOSIM_PROGRESS_TARGET",
            i64::from(ProgressConfig::DEFAULT_TARGET),
        );
        let tick_ms = read_number("ECOSIM_TICK_MS", ProgressConfig::DEFAULT_TICK_MS as i64);
        Self::new(bridge_url, target, tick_ms)
    }

    fn new(bridge_url: String, target: i64, tick_ms: i64) -> CoreResult<Self> {
        let driver = ProgressDriver::new(i32::try_from(target).unwrap_or(i32::MAX))?;
        let progress = ProgressConfig {
            target: driver.state().target,
            tick_ms: u64::try_from(tick_ms).unwrap_or(ProgressConfig::DEFAULT_TICK_MS),
        };
        Ok(Self {
            bridge_url,
            progress,
            driver,
        })
    }
}

fn read_number(key: &str, default: i64) -> i64 {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring unparsable {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Overview,
    Simulation,
}

struct Visualizer {
    settings: Settings,
    page: Page,
    store: MeasurementStore,
    chart: ChartView,
    metrics: Arc<MetricsRecorder>,
    progress: ProgressDriver,
    transcript: Transcript,
    draft: String,
    assistant: HttpAssistant,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    ShowPage(Page),
    SliceSelected(SourceSlice),
    KindSelected(ChartKind),
    PollSnapshot,
    SnapshotFetched(Result<MeasurementSnapshot, String>),
    DraftChanged(String),
    SendDraft,
    ReplyReceived(ExchangeId, Result<String, String>),
}

impl Visualizer {
    fn boot(settings: Settings) -> (Self, Task<Message>) {
        let metrics = Arc::new(MetricsRecorder::new());
        let store = MeasurementStore::new(mock_snapshot());
        let chart = ChartView::new(&store, metrics.clone());
        let snapshot_url = snapshot_url(&settings.bridge_url);
        let state = Visualizer {
            page: Page::Simulation,
            progress: settings.driver.clone(),
            assistant: HttpAssistant::new(&settings.bridge_url),
            settings,
            store,
            chart,
            metrics,
            transcript: Transcript::with_greeting(),
            draft: String::new(),
            status: "Showing built-in sample data".into(),
            history: Vec::new(),
        };
        (
            state,
            Task::perform(fetch_snapshot(snapshot_url), Message::SnapshotFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                state.progress.tick();
                Task::none()
            }
            Message::ShowPage(page) => {
                if page == Page::Simulation && state.page != Page::Simulation {
                    // Coming back restarts the loading animation.
                    state.progress = state.settings.driver.clone();
                }
                state.page = page;
                Task::none()
            }
            Message::SliceSelected(slice) => {
                state.chart.select_slice(&state.store, slice);
                Task::none()
            }
            Message::KindSelected(kind) => {
                state.chart.select_kind(&state.store, kind);
                Task::none()
            }
            Message::PollSnapshot => Task::perform(
                fetch_snapshot(snapshot_url(&state.settings.bridge_url)),
                Message::SnapshotFetched,
            ),
            Message::SnapshotFetched(Ok(snapshot)) => {
                if *state.store.current() != snapshot {
                    let revision = state.store.replace_snapshot(snapshot);
                    state.chart.refresh(&state.store);
                    state.status = format!("Snapshot revision {} from the simulator", revision);
                    state.push_history(state.status.clone());
                }
                Task::none()
            }
            Message::SnapshotFetched(Err(err)) => {
                state.status = format!("Simulator unreachable, keeping current data: {err}");
                Task::none()
            }
            Message::DraftChanged(value) => {
                state.draft = value;
                Task::none()
            }
            Message::SendDraft => {
                if state.draft.trim().is_empty() {
                    return Task::none();
                }
                let text = std::mem::take(&mut state.draft);
                let id = state.transcript.begin_exchange(text.clone());
                let assistant = state.assistant.clone();
                Task::perform(
                    async move {
                        assistant
                            .send_message(text)
                            .await
                            .map_err(|err| err.to_string())
                    },
                    move |result| Message::ReplyReceived(id, result),
                )
            }
            Message::ReplyReceived(id, Ok(reply)) => {
                if state.transcript.complete_exchange(id, reply) {
                    state.metrics.record_exchange_completed();
                    info!("assistant replied to exchange {}", id);
                } else {
                    state.metrics.record_reply_discarded();
                }
                Task::none()
            }
            Message::ReplyReceived(id, Err(err)) => {
                // Failed exchanges leave the transcript untouched.
                state.metrics.record_exchange_failed();
                warn!("assistant exchange {} failed: {}", id, err);
                state.push_history(format!("Message {} not delivered", id));
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let navigation = row![
            button("Overview")
                .on_press(Message::ShowPage(Page::Overview))
                .padding(8),
            button("Simulation")
                .on_press(Message::ShowPage(Page::Simulation))
                .padding(8),
        ]
        .spacing(8);

        let main_column = match state.page {
            Page::Overview => state.overview(),
            Page::Simulation => state.simulation(),
        };

        let layout = row![
            column![navigation, main_column]
                .spacing(12)
                .width(Length::Fill),
            state.conversation(),
        ]
        .spacing(20)
        .align_y(Alignment::Start)
        .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn overview(&self) -> Column<'_, Message> {
        let snapshot = self.store.current();
        column![
            text("EcoSim").size(30),
            text("Explore how species and their environment change over time.").size(16),
            text(format!(
                "{} species, {} environmental factors, {} periods loaded",
                snapshot.species_populations.len(),
                snapshot.environmental_factors.len(),
                snapshot.time_series.len()
            ))
            .size(14),
            text(&self.status).size(12),
        ]
        .spacing(10)
        .padding(16)
    }

    fn simulation(&self) -> Column<'_, Message> {
        let selection = self.chart.selection();
        let dataset = self.chart.dataset();

        let tabs = SourceSlice::ALL
            .into_iter()
            .fold(row![].spacing(6), |tabs, slice| {
                let label = if slice == selection.source_slice {
                    format!("[{}]", slice.title())
                } else {
                    slice.title().to_string()
                };
                tabs.push(button(text(label)).on_press(Message::SliceSelected(slice)))
            });

        let kinds = [ChartKind::Bar, ChartKind::Line, ChartKind::Pie]
            .into_iter()
            .fold(row![].spacing(6), |kinds, kind| {
                let label = if kind == selection.chart_kind {
                    format!("[{}]", kind.as_str())
                } else {
                    kind.as_str().to_string()
                };
                kinds.push(button(text(label)).on_press(Message::KindSelected(kind)))
            });

        let progress = self.progress.state();
        let loading = if progress.is_complete() {
            text(format!("Simulation ready ({}%)", progress.current)).size(14)
        } else {
            text(format!("Loading simulation... {}%", progress.current)).size(14)
        };

        let legend = if selection.chart_kind == ChartKind::Pie {
            dataset
                .proportions()
                .into_iter()
                .fold(Column::new().spacing(2), |col, (label, percent)| {
                    col.push(text(legend_line(&label, percent)).size(12))
                })
        } else {
            dataset
                .points
                .iter()
                .fold(Column::new().spacing(2), |col, point| {
                    let detail = point
                        .extra
                        .as_ref()
                        .map(|extra| {
                            extra
                                .iter()
                                .map(|(key, value)| format!(" | {} {:.2}", key, value))
                                .collect::<String>()
                        })
                        .unwrap_or_default();
                    col.push(text(format!("{}: {}{}", point.label, point.value, detail)).size(12))
                })
        };

        let history_list = if self.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            self.history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        column![
            text(selection.source_slice.title()).size(26),
            tabs,
            kinds,
            progress_bar(0.0..=1.0, progress.fraction()),
            loading,
            Canvas::new(ChartCanvas::new(dataset.clone()))
                .width(Length::Fill)
                .height(Length::Fixed(320.0)),
            Container::new(scrollable(legend).height(Length::Fixed(110.0))).padding(6),
            text(&self.status).size(12),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(80.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
    }

    fn conversation(&self) -> Column<'_, Message> {
        let entries = self
            .transcript
            .entries()
            .iter()
            .fold(Column::new().spacing(6), |col, entry| {
                let speaker = match entry.role {
                    Role::User => "You",
                    Role::System | Role::Assistant => "EcoSim",
                };
                col.push(text(format!("{}: {}", speaker, entry.text)).size(13))
            });

        column![
            text("Assistant").size(22),
            Container::new(scrollable(entries).height(Length::Fixed(420.0))).padding(6),
            row![
                text_input("Ask about the simulation", &self.draft)
                    .on_input(Message::DraftChanged)
                    .on_submit(Message::SendDraft)
                    .padding(6),
                button("Send").on_press(Message::SendDraft).padding(8),
            ]
            .spacing(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(340.0))
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

fn legend_line(label: &str, percent: f64) -> String {
    format!("{}: {:.1}%", label, percent)
}

fn snapshot_url(bridge_url: &str) -> String {
    format!("{}/snapshot", bridge_url.trim_end_matches('/'))
}

async fn fetch_snapshot(url: String) -> Result<MeasurementSnapshot, String> {
    let response = reqwest::get(&url).await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("{} answered {}", url, response.status()));
    }
    response
        .json::<MeasurementSnapshot>()
        .await
        .map_err(|e| e.to_string())
}
