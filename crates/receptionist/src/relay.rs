//! Voice SDK reached through the relay server.
//!
//! The browser widget hosting the SDK joins the same relay session. It
//! forwards every SDK callback to us as a `frame` and executes the commands we
//! send back the same way.

use anyhow::Result;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use protocol::{RelayEnvelope, SdkCommand, SdkError, StartTarget, VoiceEvent};
use receptionist_core::ports::VoiceSdkPort;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::settings::RelayConfig;

const ROLE: &str = "console";

pub struct RelaySdk {
    out: broadcast::Sender<String>,
}

impl RelaySdk {
    /// Spawns the connection task; SDK events are delivered on `events`.
    pub fn connect(config: RelayConfig, events: mpsc::Sender<VoiceEvent>) -> Self {
        let (out, _) = broadcast::channel(200);
        let out_for_task = out.clone();
        tokio::spawn(async move { connection_loop(config, events, out_for_task).await });
        Self { out }
    }

    fn send(&self, cmd: SdkCommand) -> Result<(), SdkError> {
        let frame = RelayEnvelope::command(&cmd)
            .and_then(|env| env.to_text())
            .map_err(|e| local_error(&e.to_string()))?;
        self.out
            .send(frame)
            .map(|_| ())
            .map_err(|_| local_error("relay is not connected"))
    }
}

/// Shape a local failure like an SDK start error so the classifier treats it as fatal.
fn local_error(message: &str) -> SdkError {
    SdkError(json!({ "type": "start-method-error", "error": { "message": message } }))
}

#[async_trait]
impl VoiceSdkPort for RelaySdk {
    async fn start(&self, target: StartTarget) -> Result<(), SdkError> {
        self.send(SdkCommand::start(target))
    }

    async fn stop(&self) -> Result<(), SdkError> {
        self.send(SdkCommand::Stop)
    }

    async fn set_muted(&self, muted: bool) -> Result<(), SdkError> {
        self.send(SdkCommand::SetMuted { muted })
    }
}

async fn connection_loop(
    cfg: RelayConfig,
    events: mpsc::Sender<VoiceEvent>,
    out: broadcast::Sender<String>,
) {
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        info!(attempt, url = %cfg.ws, "connecting to relay");
        match connect_async(cfg.ws.as_str()).await {
            Ok((ws_stream, _)) => 'session: {
                let (write, mut read) = ws_stream.split();
                let write = Arc::new(Mutex::new(write));

                let hello = match RelayEnvelope::hello(&cfg.sid, &cfg.tok, ROLE).to_text() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "could not encode hello");
                        return;
                    }
                };
                if let Err(e) = write.lock().await.send(Message::Text(hello)).await {
                    warn!(error = %e, "relay hello failed");
                    break 'session;
                }
                attempt = 0;

                let hb_secs = cfg.hb_secs.max(5);
                let write_for_hb = write.clone();
                let hb_task = tokio::spawn(async move {
                    let hb = r#"{"type":"hb"}"#.to_string();
                    loop {
                        tokio::time::sleep(Duration::from_secs(hb_secs)).await;
                        let mut guard = write_for_hb.lock().await;
                        if guard.send(Message::Text(hb.clone())).await.is_err() {
                            break;
                        }
                    }
                });

                let write_for_out = write.clone();
                let mut out_rx = out.subscribe();
                let send_task = tokio::spawn(async move {
                    loop {
                        match out_rx.recv().await {
                            Ok(frame) => {
                                let mut guard = write_for_out.lock().await;
                                if guard.send(Message::Text(frame)).await.is_err() {
                                    break;
                                }
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                            Err(broadcast::error::RecvError::Lagged(n)) => {
                                warn!(skipped = n, "outbound commands dropped");
                            }
                        }
                    }
                });

                let killed = read_loop(&mut read, &events).await;
                hb_task.abort();
                send_task.abort();
                if killed || events.is_closed() {
                    return;
                }
            }
            Err(e) => warn!(error = %e, "relay connect failed"),
        }
        let delay = backoff(attempt);
        info!(delay_secs = delay.as_secs(), "reconnecting to relay");
        tokio::time::sleep(delay).await;
    }
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(std::cmp::min(30, 1u64 << std::cmp::min(5, attempt)))
}

/// Returns true when the relay ended the session for good.
async fn read_loop<S>(read: &mut S, events: &mpsc::Sender<VoiceEvent>) -> bool
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => match RelayEnvelope::from_text(&text) {
                Ok(env) => match env {
                    RelayEnvelope::HelloAck => info!("relay session joined"),
                    RelayEnvelope::PeerJoined { role } => {
                        info!(role = role.as_deref().unwrap_or("peer"), "peer joined")
                    }
                    RelayEnvelope::PeerLeft { role } => {
                        warn!(role = role.as_deref().unwrap_or("peer"), "peer left")
                    }
                    RelayEnvelope::SessionKilled => {
                        warn!("relay session killed");
                        return true;
                    }
                    RelayEnvelope::Frame { .. } => match env.event() {
                        Some(Ok(event)) => {
                            if events.send(event).await.is_err() {
                                return true;
                            }
                        }
                        Some(Err(e)) => debug!(error = %e, "ignoring non-event frame"),
                        None => {}
                    },
                    other => debug!(?other, "relay message"),
                },
                Err(e) => debug!(error = %e, "unparseable relay message"),
            },
            Ok(Message::Close(_)) => {
                info!("relay closed the connection");
                break;
            }
            Err(e) => {
                warn!(error = %e, "relay socket error");
                break;
            }
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commands_fail_without_connection() {
        let (out, _) = broadcast::channel(4);
        let sdk = RelaySdk { out };
        let err = sdk.stop().await.unwrap_err();
        assert_eq!(err.kind(), Some("start-method-error"));
        assert_eq!(err.message(), "relay is not connected");
    }

    #[test]
    fn backoff_is_never_zero_and_caps_at_thirty() {
        assert_eq!(backoff(0), Duration::from_secs(1));
        assert_eq!(backoff(1), Duration::from_secs(2));
        assert_eq!(backoff(4), Duration::from_secs(16));
        assert_eq!(backoff(9), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn commands_are_framed() {
        let (out, mut rx) = broadcast::channel(4);
        let sdk = RelaySdk { out };
        sdk.set_muted(true).await.unwrap();
        let frame = rx.recv().await.unwrap();
        let env = RelayEnvelope::from_text(&frame).unwrap();
        assert_eq!(
            env,
            RelayEnvelope::Frame {
                frame: r#"{"command":"set-muted","muted":true}"#.into()
            }
        );
    }
}
