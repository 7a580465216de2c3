mod commands;
mod console;
mod relay;
mod replay;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use receptionist_core::audio::{self, MediaConstraints};
use receptionist_core::{assistant, CallController, Mode, UiCommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use console::ConsolePresenter;
use relay::RelaySdk;
use replay::ReplaySdk;
use settings::Settings;

#[derive(Parser, Debug)]
#[clap(name = "receptionist")]
#[clap(about = "Operator console for the Equity Insurance AI receptionist", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the assistant configuration sent at call start
    Config {
        #[clap(long)]
        mode: Option<Mode>,
    },
    /// Run a call against a recorded event stream
    Replay {
        file: PathBuf,
        #[clap(long)]
        mode: Option<Mode>,
        /// Request the end of the call after this many seconds
        #[clap(long)]
        stop_after: Option<u64>,
        /// Delay between replayed events
        #[clap(long, default_value_t = 50)]
        pace_ms: u64,
        /// Never answer stop with call-end, exercising the stop timeout
        #[clap(long)]
        silent_stop: bool,
        /// Print every view as a JSON line
        #[clap(long)]
        json: bool,
    },
    /// Drive the browser widget through the relay server
    Relay {
        #[clap(long)]
        mode: Option<Mode>,
        #[clap(long)]
        json: bool,
    },
    /// Normalize microphone capture constraints given as JSON
    Constraints { json: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "receptionist=info,receptionist_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env().context("loading settings")?;

    match cli.command {
        Command::Config { mode } => {
            let mode = mode.unwrap_or(settings.mode);
            let config = assistant::build(mode, &settings.webhook_base);
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Constraints { json } => {
            let parsed: MediaConstraints =
                serde_json::from_str(&json).context("constraints must be a JSON object")?;
            println!("{}", serde_json::to_string(&audio::normalize_capture(parsed))?);
        }
        Command::Replay {
            file,
            mode,
            stop_after,
            pace_ms,
            silent_stop,
            json,
        } => {
            let recording = replay::load_recording(&file).await?;
            run_replay(
                &settings,
                recording,
                mode.unwrap_or(settings.mode),
                stop_after.map(Duration::from_secs),
                Duration::from_millis(pace_ms),
                silent_stop,
                json,
            )
            .await?;
        }
        Command::Relay { mode, json } => {
            run_relay(&settings, mode.unwrap_or(settings.mode), json).await?;
        }
    }
    Ok(())
}

async fn run_replay(
    settings: &Settings,
    recording: Vec<protocol::VoiceEvent>,
    mode: Mode,
    stop_after: Option<Duration>,
    pace: Duration,
    silent_stop: bool,
    json: bool,
) -> Result<()> {
    info!(events = recording.len(), %mode, "replaying recording");
    let (event_tx, event_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(16);

    let mut sdk = ReplaySdk::new(recording, event_tx, pace);
    if silent_stop {
        sdk = sdk.silent_on_stop();
    }
    let sdk = Arc::new(sdk);

    let controller = CallController::new(sdk.clone(), ConsolePresenter::new(json), settings.resolver())
        .with_stop_timeout(settings.stop_timeout)
        .with_mode(mode);
    let handle = tokio::spawn(controller.run(event_rx, cmd_rx));

    cmd_tx.send(UiCommand::Start(Some(mode))).await?;
    match stop_after {
        Some(after) => {
            tokio::select! {
                _ = sdk.finished() => {}
                _ = tokio::time::sleep(after) => {
                    cmd_tx.send(UiCommand::Stop).await?;
                    sdk.finished().await;
                }
            }
        }
        None => sdk.finished().await,
    }

    // Let the stop deadline or late events land before shutting down.
    tokio::time::sleep(settings.stop_timeout + pace * 2).await;
    cmd_tx.send(UiCommand::Shutdown).await?;
    let session = handle.await.context("controller task")?;

    if !json {
        println!("{}", console::summary(&session));
    }
    Ok(())
}

async fn run_relay(settings: &Settings, mode: Mode, json: bool) -> Result<()> {
    let relay_cfg = settings
        .relay
        .clone()
        .context("RELAY_SESSION_ID and RELAY_TOKEN must be set for relay mode")?;
    if settings.vapi_public_key.is_none() {
        warn!("VAPI_PUBLIC_KEY is not set; the widget will not be able to start calls");
    }

    let (event_tx, event_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let sdk = Arc::new(RelaySdk::connect(relay_cfg, event_tx));

    let controller = CallController::new(sdk, ConsolePresenter::new(json), settings.resolver())
        .with_stop_timeout(settings.stop_timeout)
        .with_mode(mode);
    let handle = tokio::spawn(controller.run(event_rx, cmd_rx));

    eprintln!("{}", commands::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match commands::parse_command(&line) {
            Ok(Some(cmd)) => {
                let quit = cmd == UiCommand::Shutdown;
                if cmd_tx.send(cmd).await.is_err() || quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("{:#}\n{}", e, commands::HELP),
        }
    }
    let _ = cmd_tx.send(UiCommand::Shutdown).await;

    let session = handle.await.context("controller task")?;
    if !json {
        println!("{}", console::summary(&session));
    }
    Ok(())
}
