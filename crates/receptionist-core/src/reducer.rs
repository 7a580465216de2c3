//! Call session reducer.
//!
//! `reduce` maps the current [`CallSession`] and one [`Input`] to the next
//! session plus the side effects the controller must perform. It never talks
//! to the SDK itself, so every transition can be exercised without a runtime.

use chrono::{DateTime, Utc};
use protocol::{FunctionCall, SdkError, ServerMessage, TranscriptType, VoiceEvent};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::assistant::Mode;
use crate::classifier::{
    self, ClassifiedError, DisqualifierVerdict, ErrorClass, LeadVerdict, ToolAction,
};
use crate::session::{
    BadgeCategory, BadgeState, Badges, CallState, CollectedFields, DiagnosticLog, LogLevel,
    SessionStateMachine, Stage, Transcript,
};

/// Who the operator should see as talking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Speaker {
    #[default]
    Idle,
    Assistant,
    Listening,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSession {
    /// Regenerated for every started call; correlates log output.
    pub id: Uuid,
    pub state: CallState,
    pub muted: bool,
    pub mode: Mode,
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_secs: u64,
    pub timer_running: bool,
    pub stop_pending: bool,
    pub speaker: Speaker,
    pub mic_level: f32,
    pub stage: Stage,
    pub stage_history: Vec<Stage>,
    pub transcript: Transcript,
    pub fields: CollectedFields,
    pub badges: Badges,
    pub log: DiagnosticLog,
}

impl CallSession {
    pub fn new(mode: Mode) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: CallState::Idle,
            muted: false,
            mode,
            started_at: None,
            elapsed_secs: 0,
            timer_running: false,
            stop_pending: false,
            speaker: Speaker::Idle,
            mic_level: 0.0,
            stage: Stage::Idle,
            stage_history: Vec::new(),
            transcript: Transcript::new(),
            fields: CollectedFields::new(),
            badges: Badges::default(),
            log: DiagnosticLog::default(),
        }
    }
}

impl Default for CallSession {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// `None` keeps the session's current mode.
    StartCall { mode: Option<Mode> },
    StartFailed(SdkError),
    StopCall,
    StopTimeoutElapsed,
    ToggleMute,
    SetMode(Mode),
    ClearTranscript,
    Reset,
    Tick,
    Sdk(VoiceEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Start { mode: Mode },
    Stop,
    SetMuted(bool),
    ArmStopTimeout,
    CancelStopTimeout,
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub session: CallSession,
    pub effects: Vec<Effect>,
}

pub fn reduce(session: CallSession, input: Input, now: DateTime<Utc>) -> Transition {
    let mut step = Step {
        s: session,
        now,
        effects: Vec::new(),
    };
    step.apply(input);
    Transition {
        session: step.s,
        effects: step.effects,
    }
}

struct Step {
    s: CallSession,
    now: DateTime<Utc>,
    effects: Vec<Effect>,
}

impl Step {
    fn apply(&mut self, input: Input) {
        match input {
            Input::StartCall { mode } => self.start_call(mode),
            Input::StartFailed(err) => self.start_failed(&err),
            Input::StopCall => self.stop_call(),
            Input::StopTimeoutElapsed => self.stop_timeout(),
            Input::ToggleMute => self.toggle_mute(),
            Input::SetMode(mode) => self.set_mode(mode),
            Input::ClearTranscript => self.s.transcript.clear(),
            Input::Reset => {
                if self.go(CallState::Idle) {
                    self.s.speaker = Speaker::Idle;
                    self.s.mic_level = 0.0;
                }
            }
            Input::Tick => self.tick(),
            Input::Sdk(event) => self.on_event(event),
        }
    }

    // --- operator commands ---

    fn start_call(&mut self, mode: Option<Mode>) {
        if !self.s.state.is_startable() {
            debug!(state = %self.s.state, "start ignored, call already in progress");
            return;
        }
        let mode = mode.unwrap_or(self.s.mode);
        if !self.go(CallState::Connecting) {
            return;
        }
        let s = &mut self.s;
        s.id = Uuid::new_v4();
        s.mode = mode;
        s.muted = false;
        s.started_at = None;
        s.elapsed_secs = 0;
        s.timer_running = false;
        s.stop_pending = false;
        s.speaker = Speaker::Idle;
        s.mic_level = 0.0;
        s.stage = Stage::Idle;
        s.stage_history.clear();
        s.transcript.clear();
        s.fields.clear();
        s.badges.clear();
        self.info(None, format!("Starting {} call...", mode));
        self.effects.push(Effect::Start { mode });
    }

    fn start_failed(&mut self, err: &SdkError) {
        let reason = err.message();
        if self.go(CallState::Error { reason: reason.clone() }) {
            self.s.timer_running = false;
            self.push(LogLevel::Error, Some("FATAL"), format!("Failed to start call: {}", reason));
        } else {
            self.push(LogLevel::Warn, None, format!("Late start failure ignored: {}", reason));
        }
    }

    fn stop_call(&mut self) {
        if !self.s.state.is_active() || self.s.stop_pending {
            return;
        }
        self.s.stop_pending = true;
        self.info(None, "Ending call...");
        self.effects.push(Effect::Stop);
        self.effects.push(Effect::ArmStopTimeout);
    }

    fn stop_timeout(&mut self) {
        if self.s.state.is_active() && self.s.stop_pending {
            self.push(LogLevel::Warn, None, "Force-ending call (event timeout).");
            self.finish(false);
        }
    }

    fn toggle_mute(&mut self) {
        if !self.s.state.is_active() {
            return;
        }
        self.s.muted = !self.s.muted;
        let muted = self.s.muted;
        self.effects.push(Effect::SetMuted(muted));
        self.info(None, if muted { "Microphone muted." } else { "Microphone unmuted." });
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.s.state.is_in_progress() {
            self.push(LogLevel::Warn, None, "Mode can't change during a call.");
            return;
        }
        if self.s.mode != mode {
            self.s.mode = mode;
            self.info(None, format!("Mode set to {}.", mode));
        }
    }

    fn tick(&mut self) {
        if !self.s.timer_running {
            return;
        }
        if let Some(started) = self.s.started_at {
            self.s.elapsed_secs = (self.now - started).num_seconds().max(0) as u64;
        }
    }

    // --- SDK events ---

    fn on_event(&mut self, event: VoiceEvent) {
        match event {
            VoiceEvent::CallStart => match self.s.state {
                CallState::Active => {}
                CallState::Idle | CallState::Connecting => self.activate(),
                _ => self.push(LogLevel::Warn, None, "Ignoring call-start with no pending call."),
            },
            VoiceEvent::CallEnd => self.on_call_end(),
            VoiceEvent::SpeechStart => {
                self.implicit_activate();
                if self.s.state.is_active() {
                    self.s.speaker = Speaker::Assistant;
                }
            }
            VoiceEvent::SpeechEnd => {
                if self.s.state.is_active() {
                    self.s.speaker = Speaker::Listening;
                }
            }
            VoiceEvent::VolumeLevel(level) => {
                self.s.mic_level = if level.is_finite() { level.clamp(0.0, 1.0) } else { 0.0 };
            }
            VoiceEvent::Message(msg) => {
                self.implicit_activate();
                if self.s.state.is_in_progress() {
                    self.on_message(msg);
                } else {
                    self.push(LogLevel::Warn, None, "Ignoring message for ended call.");
                }
            }
            VoiceEvent::Error(err) => self.on_error(classifier::classify_error(&err), &err),
        }
    }

    fn on_call_end(&mut self) {
        match self.s.state {
            CallState::Ended { confirmed: true } => {}
            CallState::Ended { confirmed: false } => {
                if self.go(CallState::Ended { confirmed: true }) {
                    self.info(None, "Call end confirmed by SDK.");
                }
            }
            _ => {
                self.info(None, "Call terminated.");
                self.finish(true);
            }
        }
    }

    fn on_message(&mut self, msg: ServerMessage) {
        match &msg {
            ServerMessage::Transcript {
                role,
                transcript_type,
                transcript,
            } => match transcript_type {
                TranscriptType::Partial => self.s.transcript.partial(*role, transcript.as_str()),
                TranscriptType::Final => self.s.transcript.finalize(*role, transcript.as_str()),
            },
            ServerMessage::FunctionCall { function_call } => self.on_call(function_call),
            ServerMessage::ToolCalls { tool_calls } => {
                for call in tool_calls {
                    match &call.function {
                        Some(function) => self.on_call(function),
                        None => self.push(LogLevel::Warn, None, "Tool call without a function."),
                    }
                }
            }
            ServerMessage::ToolCallsResult { .. } | ServerMessage::FunctionCallResult { .. } => {
                if let Some((_, text)) = msg.result_text() {
                    self.on_result(&text);
                }
            }
            ServerMessage::Other => {}
        }
    }

    fn on_call(&mut self, call: &FunctionCall) {
        let classified = classifier::classify_call(call);
        if !classified.arguments_ok {
            self.push(
                LogLevel::Warn,
                None,
                format!("Unreadable arguments for {}, treating as empty.", call.name),
            );
        }
        match classified.action {
            ToolAction::SaveField { name: Some(name), value } => {
                self.info(Some("SAVE"), format!("{} = \"{}\"", name, value));
                self.s.fields.upsert(name, value);
                self.set_stage(Stage::Collecting);
            }
            ToolAction::SaveField { name: None, .. } => {
                self.push(LogLevel::Warn, Some("SAVE"), "save_field called without field_name.");
                self.set_stage(Stage::Collecting);
            }
            ToolAction::CheckDisqualifier => {
                self.s.badges.set(BadgeCategory::Disqualifier, BadgeState::Checking, "Evaluating...");
                self.info(Some("RULE CHECK"), "Checking disqualifiers...");
                self.set_stage(Stage::Evaluating);
            }
            ToolAction::CheckHotLead => {
                self.s.badges.set(BadgeCategory::HotLead, BadgeState::Checking, "Evaluating...");
                self.info(Some("RULE CHECK"), "Checking hot lead criteria...");
                self.set_stage(Stage::Evaluating);
            }
            ToolAction::RouteExistingCustomer => {
                self.s.badges.set(BadgeCategory::CallType, BadgeState::Info, "Existing Customer");
                self.info(Some("ROUTE"), "Existing customer, creating service ticket.");
                self.set_stage(Stage::Routing);
            }
            ToolAction::RouteClaim => {
                self.s.badges.set(BadgeCategory::CallType, BadgeState::Urgent, "Claim Filed");
                self.info(Some("ROUTE"), "Claim reported, notifying claims team.");
                self.set_stage(Stage::Routing);
            }
            ToolAction::Unknown(name) => self.info(None, format!("Function: {}", name)),
        }
    }

    fn on_result(&mut self, text: &str) {
        let verdict = classifier::classify_result(text);
        if verdict.is_empty() {
            self.info(Some("RESULT"), text.to_string());
            return;
        }

        match verdict.disqualifier {
            Some(DisqualifierVerdict::Qualified) => {
                self.s.badges.set(BadgeCategory::Disqualifier, BadgeState::Pass, "Qualified");
                self.info(Some("RESULT"), "Caller qualifies.");
                self.advance_stage(Stage::Evaluating);
            }
            Some(DisqualifierVerdict::Disqualified) => {
                self.s.badges.set(BadgeCategory::Disqualifier, BadgeState::Fail, "Disqualified");
                self.info(Some("RESULT"), "Caller disqualified.");
                self.advance_stage(Stage::Evaluating);
            }
            None => {}
        }

        match verdict.lead {
            Some(LeadVerdict::Hot) => {
                self.s.badges.set(BadgeCategory::HotLead, BadgeState::Hot, "HOT LEAD - Transfer");
                self.info(Some("RESULT"), "Hot lead, transfer to an agent.");
                self.advance_stage(Stage::Routing);
            }
            Some(LeadVerdict::Standard) => {
                self.s.badges.set(BadgeCategory::HotLead, BadgeState::Pass, "Standard Lead");
                self.info(Some("RESULT"), "Standard lead.");
                self.advance_stage(Stage::Evaluating);
            }
            None => {}
        }

        if verdict.workflow_complete {
            self.info(Some("RESULT"), text.to_string());
            self.advance_stage(Stage::Complete);
        }
    }

    fn on_error(&mut self, c: ClassifiedError, err: &SdkError) {
        match c.class {
            ErrorClass::Benign => {
                self.info(Some("AUDIO"), format!("Audio processing warning ignored: {}", c.message));
            }
            ErrorClass::Ejection => match self.s.state {
                CallState::Active => {
                    self.push(LogLevel::Warn, Some("EJECTED"), c.message.clone());
                    self.finish(true);
                }
                CallState::Connecting => {
                    self.push(LogLevel::Error, Some("EJECTED"), c.message.clone());
                    self.fail(c.message);
                }
                _ => self.info(Some("EJECTED"), c.message),
            },
            ErrorClass::FatalStart => {
                let text = match (c.status, err.kind()) {
                    (Some(status), _) => format!("{} (status {})", c.message, status),
                    (None, Some(kind)) => format!("{} ({})", c.message, kind),
                    (None, None) => c.message.clone(),
                };
                self.push(LogLevel::Error, Some("FATAL"), text);
                if matches!(self.s.state, CallState::Connecting) {
                    self.fail(c.message);
                }
            }
            ErrorClass::Unclassified => {
                self.push(LogLevel::Warn, None, format!("Warning: {}", c.message));
            }
        }
    }

    // --- state helpers ---

    fn implicit_activate(&mut self) {
        if matches!(self.s.state, CallState::Connecting) {
            self.activate();
        }
    }

    fn activate(&mut self) {
        if !self.go(CallState::Active) {
            return;
        }
        let s = &mut self.s;
        s.started_at = Some(self.now);
        s.elapsed_secs = 0;
        s.timer_running = true;
        s.muted = false;
        s.speaker = Speaker::Idle;
        s.stage_history.clear();
        self.effects.push(Effect::SetMuted(false));
        self.set_stage(Stage::Idle);
        self.info(None, "Call connection established.");
    }

    fn finish(&mut self, confirmed: bool) {
        if !self.go(CallState::Ended { confirmed }) {
            return;
        }
        let s = &mut self.s;
        s.timer_running = false;
        s.stop_pending = false;
        s.speaker = Speaker::Idle;
        s.mic_level = 0.0;
        s.transcript.discard_scratch();
        self.set_stage(Stage::Complete);
        self.effects.push(Effect::CancelStopTimeout);
    }

    fn fail(&mut self, reason: String) {
        if self.go(CallState::Error { reason }) {
            self.s.timer_running = false;
            self.s.speaker = Speaker::Idle;
            self.s.mic_level = 0.0;
        }
    }

    fn set_stage(&mut self, stage: Stage) {
        self.s.stage = stage;
        if self.s.stage_history.last() != Some(&stage) {
            self.s.stage_history.push(stage);
        }
    }

    /// Moves the stage forward only; results never rewind progress.
    fn advance_stage(&mut self, stage: Stage) {
        self.set_stage(self.s.stage.max(stage));
    }

    fn go(&mut self, to: CallState) -> bool {
        let mut sm = SessionStateMachine::from_state(std::mem::replace(&mut self.s.state, CallState::Idle));
        let moved = match sm.transition_to(to) {
            Ok(()) => true,
            Err(e) => {
                debug!(session_id = %self.s.id, error = %e, "transition refused");
                false
            }
        };
        self.s.state = sm.into_state();
        moved
    }

    fn info(&mut self, tag: Option<&str>, text: impl Into<String>) {
        self.push(LogLevel::Info, tag, text);
    }

    fn push(&mut self, level: LogLevel, tag: Option<&str>, text: impl Into<String>) {
        self.s.log.push(self.now, level, tag, text);
    }
}
