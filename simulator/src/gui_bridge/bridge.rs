use crate::generator::profile::{build_snapshot_from_config, GeneratorConfig};
use crate::gui_bridge::model::{DatasetQuery, MessageLog};
use crate::gui_bridge::responder;
use crate::session::runner::Runner;
use anyhow::Context;
use ecosimcore::measurement::MeasurementSnapshot;
use ecosimcore::progress::ProgressState;
use ecosimcore::projection::{ChartKind, SourceSlice, VisualizationSelection};
use ecosimcore::transcript::{AssistantReply, LastMessage, MessageResponse};
use ecosimcore::CoreResult;
use log::{info, warn};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use warp::{
    http::StatusCode,
    reply::{Json, WithStatus},
    Filter,
};

const BODY_LIMIT: u64 = 1024 * 256;

type Response = WithStatus<Json>;

fn respond<T: Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status)
}

/// Bridge that serves the session's snapshot, datasets, progress and
/// assistant replies over HTTP.
#[derive(Clone)]
pub struct GuiBridge {
    runner: Runner,
    messages: Arc<RwLock<MessageLog>>,
    progress: watch::Receiver<ProgressState>,
}

impl GuiBridge {
    pub fn new(runner: Runner, progress: watch::Receiver<ProgressState>) -> Self {
        Self {
            runner,
            messages: Arc::new(RwLock::new(MessageLog::default())),
            progress,
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let bridge = self.clone();
        let bridge_filter = warp::any().map(move || bridge.clone());

        let get_snapshot = warp::path!("snapshot")
            .and(warp::get())
            .and(bridge_filter.clone())
            .map(|bridge: GuiBridge| respond(&*bridge.runner.snapshot(), StatusCode::OK));

        let post_snapshot = warp::path!("snapshot")
            .and(warp::post())
            .and(warp::body::content_length_limit(BODY_LIMIT))
            .and(warp::body::json())
            .and(bridge_filter.clone())
            .map(|snapshot: MeasurementSnapshot, bridge: GuiBridge| {
                let revision = bridge.publish(snapshot);
                respond(&json!({"status": "ok", "revision": revision}), StatusCode::OK)
            });

        let dataset_route = warp::path!("dataset")
            .and(warp::get())
            .and(warp::query::<DatasetQuery>())
            .and(bridge_filter.clone())
            .map(|query: DatasetQuery, bridge: GuiBridge| match parse_selection(&query) {
                Ok(selection) => respond(&bridge.runner.project(selection), StatusCode::OK),
                Err(err) => respond(
                    &json!({"error": err.to_string()}),
                    StatusCode::BAD_REQUEST,
                ),
            });

        let generator_route = warp::path!("ingest-config")
            .and(warp::post())
            .and(warp::body::content_length_limit(BODY_LIMIT))
            .and(warp::body::json())
            .and(bridge_filter.clone())
            .map(|config: GeneratorConfig, bridge: GuiBridge| {
                match build_snapshot_from_config(&config) {
                    Ok(snapshot) => {
                        let species = snapshot.species_populations.len();
                        let revision = bridge.publish(snapshot);
                        if let Some(name) = config.scenario.as_ref() {
                            info!("[GUI] Scenario {} -> {} species", name, species);
                        }
                        respond(
                            &json!({
                                "status": "ok",
                                "revision": revision,
                                "species": species,
                                "description": config.description.clone().unwrap_or_default()
                            }),
                            StatusCode::OK,
                        )
                    }
                    Err(err) => {
                        warn!("ingest-config error: {:#}", err);
                        respond(
                            &json!({"error": format!("{:#}", err)}),
                            StatusCode::BAD_REQUEST,
                        )
                    }
                }
            });

        let progress_route = warp::path!("progress")
            .and(warp::get())
            .and(bridge_filter.clone())
            .map(|bridge: GuiBridge| {
                let state = *bridge.progress.borrow();
                respond(&state, StatusCode::OK)
            });

        let message_route = warp::path!("api" / "messages")
            .and(warp::post())
            .and(warp::body::content_length_limit(BODY_LIMIT))
            .and(warp::body::json())
            .and(bridge_filter.clone())
            .map(|body: serde_json::Value, bridge: GuiBridge| bridge.answer(&body));

        let last_message_route = warp::path!("api" / "messages" / "last")
            .and(warp::get())
            .and(bridge_filter)
            .map(|bridge: GuiBridge| {
                let messages = bridge
                    .messages
                    .read()
                    .unwrap_or_else(PoisonError::into_inner);
                let body = match messages.last() {
                    Some((index, text)) => json!({"text": text, "index": index}),
                    None => json!({"message": "No messages stored yet"}),
                };
                respond(&body, StatusCode::OK)
            });

        get_snapshot
            .or(post_snapshot)
            .or(dataset_route)
            .or(generator_route)
            .or(progress_route)
            .or(message_route)
            .or(last_message_route)
    }

    /// Binds the HTTP endpoint; the returned future serves until dropped.
    pub fn bind(
        &self,
        address: SocketAddr,
    ) -> anyhow::Result<(SocketAddr, impl Future<Output = ()> + 'static)> {
        warp::serve(self.routes())
            .try_bind_ephemeral(address)
            .with_context(|| format!("binding GUI bridge on {}", address))
    }

    pub fn publish(&self, snapshot: MeasurementSnapshot) -> u64 {
        let revision = self.runner.replace(snapshot);
        let current = self.runner.snapshot();
        info!(
            "[GUI] snapshot revision {}: {} species, {} factors, {} periods",
            revision,
            current.species_populations.len(),
            current.environmental_factors.len(),
            current.time_series.len()
        );
        revision
    }

    pub fn publish_status(&self, message: &str) {
        info!("[GUI] {}", message);
    }

    fn answer(&self, body: &serde_json::Value) -> Response {
        let Some(message) = body.get("message").and_then(|value| value.as_str()) else {
            return respond(
                &json!({"error": "No message provided"}),
                StatusCode::BAD_REQUEST,
            );
        };

        let text = responder::reply(&self.runner.snapshot(), message);
        let index = self
            .messages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .record(message.to_string(), text.clone());

        respond(
            &MessageResponse {
                status: "success".into(),
                last_message: Some(LastMessage {
                    text: message.to_string(),
                    index,
                }),
                ai_response: Some(AssistantReply {
                    text,
                    is_system: true,
                }),
            },
            StatusCode::OK,
        )
    }
}

fn parse_selection(query: &DatasetQuery) -> CoreResult<VisualizationSelection> {
    let source_slice = match query.slice.as_deref() {
        Some(slice) => slice.parse::<SourceSlice>()?,
        None => SourceSlice::default(),
    };
    let chart_kind = match query.kind.as_deref() {
        Some(kind) => kind.parse::<ChartKind>()?,
        None => ChartKind::default(),
    };
    Ok(VisualizationSelection::new(source_slice, chart_kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecosimcore::measurement::mock_snapshot;
    use ecosimcore::projection::ChartDataset;

    fn bridge() -> GuiBridge {
        let (_sender, receiver) = watch::channel(ProgressState {
            current: 10,
            target: 75,
        });
        GuiBridge::new(Runner::new(mock_snapshot()), receiver)
    }

    #[tokio::test]
    async fn dataset_route_projects_time_series() {
        let gui = bridge();
        let response = warp::test::request()
            .method("GET")
            .path("/dataset?slice=timeSeries&kind=line")
            .reply(&gui.routes())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let dataset: ChartDataset = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(dataset.selection.chart_kind, ChartKind::Line);
        assert_eq!(dataset.labels().first(), Some(&"2020"));
    }

    #[tokio::test]
    async fn dataset_route_defaults_and_rejects_unknown_kinds() {
        let gui = bridge();
        let response = warp::test::request()
            .path("/dataset")
            .reply(&gui.routes())
            .await;
        let dataset: ChartDataset = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(dataset.selection, VisualizationSelection::default());
        assert_eq!(dataset.len(), 5);

        let response = warp::test::request()
            .path("/dataset?kind=scatter")
            .reply(&gui.routes())
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn posted_snapshot_replaces_the_store() {
        let gui = bridge();
        let response = warp::test::request()
            .method("POST")
            .path("/snapshot")
            .header("content-type", "application/json")
            .body(r#"{"speciesData": {"Fox": 10, "Bear": 5}}"#)
            .reply(&gui.routes())
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = warp::test::request()
            .path("/dataset?slice=species&kind=bar")
            .reply(&gui.routes())
            .await;
        let dataset: ChartDataset = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(dataset.labels(), vec!["Fox", "Bear"]);
        assert_eq!(dataset.values(), vec![10.0, 5.0]);
    }

    #[tokio::test]
    async fn ingest_config_installs_generated_snapshot() {
        let gui = bridge();
        let response = warp::test::request()
            .method("POST")
            .path("/ingest-config")
            .json(&json!({"species": ["Otters"], "years": 2, "seed": 4}))
            .reply(&gui.routes())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot = gui.runner.snapshot();
        assert_eq!(snapshot.species_populations.len(), 1);
        assert_eq!(snapshot.time_series.len(), 2);
    }

    #[tokio::test]
    async fn progress_route_reports_current_state() {
        let gui = bridge();
        let response = warp::test::request()
            .path("/progress")
            .reply(&gui.routes())
            .await;
        let state: ProgressState = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(state, ProgressState { current: 10, target: 75 });
    }

    #[tokio::test]
    async fn message_route_replies_and_remembers() {
        let gui = bridge();
        let response = warp::test::request()
            .method("POST")
            .path("/api/messages")
            .json(&json!({"message": "How many deer?"}))
            .reply(&gui.routes())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: MessageResponse = serde_json::from_slice(response.body()).unwrap();
        let reply = body.ai_response.unwrap();
        assert_eq!(reply.text, "The Deer population currently stands at 850.");
        assert!(reply.is_system);
        assert_eq!(body.last_message.unwrap().index, 0);

        let response = warp::test::request()
            .path("/api/messages/last")
            .reply(&gui.routes())
            .await;
        let last: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(last["index"], 1);
        assert_eq!(last["text"], reply.text);
    }

    #[tokio::test]
    async fn message_route_requires_a_message() {
        let gui = bridge();
        let response = warp::test::request()
            .method("POST")
            .path("/api/messages")
            .json(&json!({"text": "hello"}))
            .reply(&gui.routes())
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
