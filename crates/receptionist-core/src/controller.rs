//! Async driver around the reducer.
//!
//! One cooperative loop owns the session. SDK events, operator commands,
//! start completions, the one-second tick and the stop deadline are all
//! funnelled through `reduce` in arrival order; the resulting effects are
//! executed against the SDK port and the new view is handed to the presenter.

use chrono::{DateTime, Utc};
use protocol::{SdkError, VoiceEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::assistant::{Mode, TargetResolver};
use crate::ports::{PresenterPort, VoiceSdkPort};
use crate::reducer::{reduce, CallSession, Effect, Input, Transition};
use crate::session::{CallState, LogLevel};
use crate::view::CallView;

pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Start(Option<Mode>),
    Stop,
    /// Start when idle, stop when live.
    ToggleCall,
    ToggleMute,
    SetMode(Mode),
    ClearTranscript,
    Reset,
    Shutdown,
}

pub struct CallController<S: VoiceSdkPort + 'static, P: PresenterPort> {
    sdk: Arc<S>,
    presenter: P,
    resolver: TargetResolver,
    stop_timeout: Duration,
    session: CallSession,
    log_cursor: u64,
    last_view: Option<CallView>,
    stop_deadline: Option<Instant>,
    epoch: (Instant, DateTime<Utc>),
}

impl<S: VoiceSdkPort + 'static, P: PresenterPort> CallController<S, P> {
    pub fn new(sdk: Arc<S>, presenter: P, resolver: TargetResolver) -> Self {
        Self {
            sdk,
            presenter,
            resolver,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            session: CallSession::default(),
            log_cursor: 0,
            last_view: None,
            stop_deadline: None,
            epoch: (Instant::now(), Utc::now()),
        }
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.session.mode = mode;
        self
    }

    pub fn session(&self) -> &CallSession {
        &self.session
    }

    /// Runs until `Shutdown` or the command channel closes; returns the final session.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<VoiceEvent>,
        mut commands: mpsc::Receiver<UiCommand>,
    ) -> CallSession {
        let (settled_tx, mut settled_rx) = mpsc::channel::<Result<(), SdkError>>(4);
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut events_open = true;

        self.publish().await;

        loop {
            let deadline = self.stop_deadline;
            tokio::select! {
                ev = events.recv(), if events_open => match ev {
                    Some(ev) => self.apply(Input::Sdk(ev), &settled_tx).await,
                    None => {
                        debug!("event stream closed");
                        events_open = false;
                    }
                },
                cmd = commands.recv() => match cmd {
                    None | Some(UiCommand::Shutdown) => break,
                    Some(cmd) => {
                        if let Some(input) = self.command_input(cmd) {
                            self.apply(input, &settled_tx).await;
                        }
                    }
                },
                Some(settled) = settled_rx.recv() => {
                    if let Err(err) = settled {
                        self.apply(Input::StartFailed(err), &settled_tx).await;
                    }
                }
                _ = ticker.tick() => self.apply(Input::Tick, &settled_tx).await,
                _ = sleep_until(deadline) => {
                    self.stop_deadline = None;
                    self.apply(Input::StopTimeoutElapsed, &settled_tx).await;
                }
            }
        }

        info!(session_id = %self.session.id, state = %self.session.state, "controller stopped");
        self.session
    }

    fn command_input(&self, cmd: UiCommand) -> Option<Input> {
        let input = match cmd {
            UiCommand::Start(mode) => Input::StartCall { mode },
            UiCommand::Stop => Input::StopCall,
            UiCommand::ToggleCall => match self.session.state {
                CallState::Active => Input::StopCall,
                CallState::Connecting => return None,
                _ => Input::StartCall { mode: None },
            },
            UiCommand::ToggleMute => Input::ToggleMute,
            UiCommand::SetMode(mode) => Input::SetMode(mode),
            UiCommand::ClearTranscript => Input::ClearTranscript,
            UiCommand::Reset => Input::Reset,
            UiCommand::Shutdown => return None,
        };
        Some(input)
    }

    async fn apply(&mut self, input: Input, settled: &mpsc::Sender<Result<(), SdkError>>) {
        let now = self.now();
        let Transition { session, effects } = reduce(std::mem::take(&mut self.session), input, now);
        self.session = session;
        for effect in effects {
            self.execute(effect, settled).await;
        }
        self.publish().await;
    }

    async fn execute(&mut self, effect: Effect, settled: &mpsc::Sender<Result<(), SdkError>>) {
        let session_id = self.session.id;
        match effect {
            Effect::Start { mode } => {
                let target = self.resolver.resolve(mode);
                info!(%session_id, %mode, "requesting call start");
                let sdk = Arc::clone(&self.sdk);
                let settled = settled.clone();
                // Event delivery must continue while the start request is pending.
                tokio::spawn(async move {
                    let result = sdk.start(target).await;
                    let _ = settled.send(result).await;
                });
            }
            Effect::Stop => {
                if let Err(e) = self.sdk.stop().await {
                    warn!(%session_id, error = %e.message(), "stop request failed");
                }
            }
            Effect::SetMuted(muted) => {
                if let Err(e) = self.sdk.set_muted(muted).await {
                    warn!(%session_id, muted, error = %e.message(), "mute request failed");
                }
            }
            Effect::ArmStopTimeout => {
                self.stop_deadline = Some(Instant::now() + self.stop_timeout);
            }
            Effect::CancelStopTimeout => self.stop_deadline = None,
        }
    }

    async fn publish(&mut self) {
        let view = CallView::project(&self.session, self.log_cursor);
        self.log_cursor = self.session.log.next_seq();

        let session_id = self.session.id;
        for line in &view.new_log {
            let tag = line.tag.as_deref().unwrap_or("-");
            match line.level {
                LogLevel::Info => info!(%session_id, tag, "{}", line.text),
                LogLevel::Warn => warn!(%session_id, tag, "{}", line.text),
                LogLevel::Error => error!(%session_id, tag, "{}", line.text),
            }
        }

        if self.last_view.as_ref() == Some(&view) {
            return;
        }
        if let Err(e) = self.presenter.render(&view).await {
            warn!(%session_id, error = %e, "presenter failed");
        }
        self.last_view = Some(view);
    }

    /// Wall clock derived from the runtime clock, so paused time drives the timer too.
    fn now(&self) -> DateTime<Utc> {
        let (origin, wall) = self.epoch;
        let elapsed = chrono::Duration::from_std(origin.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        wall + elapsed
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
