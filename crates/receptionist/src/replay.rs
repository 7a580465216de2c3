//! Voice SDK stand-in that plays back a recorded event stream.
//!
//! Recordings are JSON lines, one `VoiceEvent` per line as the widget
//! forwards them. Blank lines and lines starting with `#` are skipped.

use anyhow::{Context, Result};
use async_trait::async_trait;
use protocol::{decode_event, SdkError, StartTarget, VoiceEvent};
use receptionist_core::ports::VoiceSdkPort;
use serde_json::json;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info};

pub fn parse_recording(text: &str) -> Result<Vec<VoiceEvent>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(n, line)| decode_event(line).with_context(|| format!("line {}", n + 1)))
        .collect()
}

pub async fn load_recording(path: &Path) -> Result<Vec<VoiceEvent>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    parse_recording(&text).with_context(|| format!("parsing {}", path.display()))
}

pub struct ReplaySdk {
    recording: Vec<VoiceEvent>,
    events: mpsc::Sender<VoiceEvent>,
    pace: Duration,
    /// Whether `stop` is answered with a `call-end` event.
    acknowledge_stop: bool,
    stopped: Arc<AtomicBool>,
    done: Arc<Notify>,
}

impl ReplaySdk {
    pub fn new(recording: Vec<VoiceEvent>, events: mpsc::Sender<VoiceEvent>, pace: Duration) -> Self {
        Self {
            recording,
            events,
            pace,
            acknowledge_stop: true,
            stopped: Arc::new(AtomicBool::new(false)),
            done: Arc::new(Notify::new()),
        }
    }

    /// Simulate an SDK that never reports the end of a stopped call.
    pub fn silent_on_stop(mut self) -> Self {
        self.acknowledge_stop = false;
        self
    }

    /// Resolves once playback has finished or was cut short by `stop`.
    pub async fn finished(&self) {
        self.done.notified().await
    }
}

#[async_trait]
impl VoiceSdkPort for ReplaySdk {
    async fn start(&self, target: StartTarget) -> Result<(), SdkError> {
        if self.recording.is_empty() {
            return Err(SdkError(json!({
                "type": "start-method-error",
                "error": { "message": "recording has no events" }
            })));
        }
        match &target {
            StartTarget::AssistantId(id) => info!(assistant_id = %id, "replay start"),
            StartTarget::Assistant(cfg) => info!(assistant = %cfg.name, tools = cfg.model.tools.len(), "replay start"),
        }

        let events = self.recording.clone();
        let tx = self.events.clone();
        let pace = self.pace;
        let stopped = self.stopped.clone();
        let done = self.done.clone();
        tokio::spawn(async move {
            for event in events {
                if stopped.load(Ordering::SeqCst) {
                    debug!("playback cut short by stop");
                    break;
                }
                tokio::time::sleep(pace).await;
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            done.notify_one();
        });
        Ok(())
    }

    async fn stop(&self) -> Result<(), SdkError> {
        self.stopped.store(true, Ordering::SeqCst);
        if self.acknowledge_stop {
            let tx = self.events.clone();
            let pace = self.pace;
            tokio::spawn(async move {
                tokio::time::sleep(pace).await;
                let _ = tx.send(VoiceEvent::CallEnd).await;
            });
        }
        Ok(())
    }

    async fn set_muted(&self, muted: bool) -> Result<(), SdkError> {
        debug!(muted, "replay mute");
        Ok(())
    }
}
