use anyhow::Context;
use clap::Parser;
use ecosimcore::measurement::{mock_snapshot, MeasurementSnapshot};
use ecosimcore::progress::ProgressTask;
use ecosimcore::telemetry::MetricsRecorder;
use ecosimcore::transcript::{HttpAssistant, Transcript, TranscriptClient};
use generator::profile::{build_snapshot, build_snapshot_from_config};
use gui_bridge::bridge::GuiBridge;
use log::{info, warn};
use session::config::SessionConfig;
use session::runner::Runner;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

mod generator;
mod gui_bridge;
mod session;

#[derive(Parser)]
#[command(author, version, about = "EcoSim visualization session driver")]
struct Args {
    /// Project every slice once and emit a summary report
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a session config from YAML
    #[arg(long)]
    session: Option<PathBuf>,
    /// Load the measurement snapshot from a JSON file
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Generate a seeded synthetic snapshot instead of the built-in mock
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 75, allow_negative_numbers = true)]
    progress_target: i32,
    #[arg(long, default_value_t = 20)]
    tick_ms: u64,
    /// Keep the HTTP bridge alive for the visualizer
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Message for the assistant; repeat to run several exchanges at once
    #[arg(long = "ask")]
    ask: Vec<String>,
    #[arg(long, default_value = HttpAssistant::DEFAULT_BASE_URL)]
    assistant_url: String,
}

fn initial_snapshot(args: &Args, session: &SessionConfig) -> anyhow::Result<MeasurementSnapshot> {
    if let Some(path) = args.snapshot.as_ref().or(session.snapshot.as_ref()) {
        return MeasurementSnapshot::load(path)
            .with_context(|| format!("loading snapshot {}", path.display()));
    }
    if let Some(seed) = args.seed {
        return build_snapshot(seed).context("generating seeded snapshot");
    }
    if let Some(generator) = session.generator.as_ref() {
        return build_snapshot_from_config(generator).context("generating session snapshot");
    }
    Ok(mock_snapshot())
}

async fn run_exchanges(messages: &[String], assistant_url: &str, metrics: Arc<MetricsRecorder>) {
    let client = TranscriptClient::new(
        Transcript::with_greeting(),
        HttpAssistant::new(assistant_url),
        metrics.clone(),
    );
    let handles: Vec<_> = messages
        .iter()
        .filter_map(|message| client.send(message))
        .collect();
    for handle in handles {
        if let Err(err) = handle.await {
            warn!("assistant exchange task ended abnormally: {}", err);
        }
    }

    for entry in client.entries() {
        println!("[{}] {}", entry.role.as_str(), entry.text);
    }
    let stats = metrics.snapshot();
    println!(
        "Exchanges -> completed {}, failed {}",
        stats.exchanges_completed, stats.exchanges_failed
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let session = if let Some(path) = &args.session {
        SessionConfig::load(path)?
    } else {
        SessionConfig::from_args(args.progress_target, args.tick_ms, None)
    };
    let progress_config = session
        .to_progress_config()
        .context("validating progress settings")?;

    let runner = Runner::new(initial_snapshot(&args, &session)?);

    if args.offline {
        let report = runner.execute();

        println!(
            "Offline run -> revision {}, datasets {}, coerced values {}",
            report.revision,
            report.datasets.len(),
            report.coerced_values
        );

        let mut lines = String::new();
        for dataset in &report.datasets {
            let line = format!(
                "{} points={} total={} labels={:?}",
                dataset.selection,
                dataset.len(),
                dataset.total(),
                dataset.labels()
            );
            println!("  {}", line);
            lines.push_str(&line);
            lines.push('\n');
        }

        let report_path = PathBuf::from("tools/data/offline_projection.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)?;
        file.write_all(lines.as_bytes())?;
    }

    if args.serve || !args.ask.is_empty() {
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the session")?;
        runtime.block_on(async {
            let mut bridge_parts = None;
            if args.serve {
                let driver = progress_config.build_driver()?;
                let progress = ProgressTask::spawn(driver, progress_config.period());
                let bridge = GuiBridge::new(runner.clone(), progress.subscribe());
                let (address, server) = bridge.bind(session.bind)?;
                let server = tokio::spawn(server);
                bridge.publish_status(&format!(
                    "HTTP bridge running on {} (Ctrl+C to stop)...",
                    address
                ));
                bridge_parts = Some((progress, server));
            }

            if !args.ask.is_empty() {
                run_exchanges(&args.ask, &args.assistant_url, runner.metrics()).await;
            }

            if let Some((mut progress, server)) = bridge_parts {
                signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
                progress.cancel();
                info!("progress timer stopped at {:?}", progress.state());
                server.abort();
            }
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
