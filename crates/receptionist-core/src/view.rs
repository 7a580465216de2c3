//! Render-ready projection of a [`CallSession`].

use serde::Serialize;
use uuid::Uuid;

use crate::assistant::Mode;
use crate::reducer::{CallSession, Speaker};
use crate::session::{
    CallState, CollectedField, LogLine, Stage, StageMark, StatusBadge, TranscriptEntry,
    EXPECTED_FIELD_COUNT,
};

/// Mic level above which the meter reports voice activity.
pub const VOICE_DETECTED_THRESHOLD: f32 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonView {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallView {
    pub session_id: Uuid,
    pub mode: Mode,
    pub state: CallState,
    pub call_button: ButtonView,
    pub mute_button: ButtonView,
    pub status_text: &'static str,
    pub connection: &'static str,
    pub timer: String,
    pub fields: Vec<CollectedField>,
    pub field_count: String,
    pub stages: [(Stage, StageMark); 5],
    pub badges: Vec<StatusBadge>,
    pub mic_width_pct: f32,
    pub voice_detected: bool,
    pub transcript: Vec<TranscriptEntry>,
    pub partial: Option<TranscriptEntry>,
    /// Diagnostic lines with `seq >= log_since`.
    pub new_log: Vec<LogLine>,
}

impl CallView {
    pub fn project(session: &CallSession, log_since: u64) -> Self {
        let state = &session.state;
        let call_button = match state {
            CallState::Connecting => ButtonView { label: "Connecting...", enabled: false },
            CallState::Active => ButtonView { label: "End Call", enabled: !session.stop_pending },
            _ => ButtonView { label: "Start Call", enabled: true },
        };
        let mute_button = ButtonView {
            label: if session.muted { "Unmute" } else { "Mute" },
            enabled: state.is_active(),
        };
        let status_text = match state {
            CallState::Idle => "Ready",
            CallState::Connecting => "Connecting...",
            CallState::Active => "Live Call",
            CallState::Ended { .. } => "Call Ended",
            CallState::Error { .. } => "Connection Failed",
        };
        let connection = match (state, session.speaker) {
            (CallState::Connecting, _) => "Connecting",
            (CallState::Active, Speaker::Assistant) => "AI Speaking",
            (CallState::Active, Speaker::Listening) => "Listening",
            (CallState::Active, Speaker::Idle) => "Connected",
            _ => "Disconnected",
        };
        let level = session.mic_level;

        CallView {
            session_id: session.id,
            mode: session.mode,
            state: state.clone(),
            call_button,
            mute_button,
            status_text,
            connection,
            timer: format_timer(session.elapsed_secs),
            fields: session.fields.iter().cloned().collect(),
            field_count: format!("{} / {}", session.fields.len(), EXPECTED_FIELD_COUNT),
            stages: session.stage.marks(),
            badges: session.badges.iter().cloned().collect(),
            mic_width_pct: (level * 200.0).min(100.0),
            voice_detected: level > VOICE_DETECTED_THRESHOLD,
            transcript: session.transcript.entries().to_vec(),
            partial: session.transcript.scratch().cloned(),
            new_log: session.log.since(log_since),
        }
    }
}

/// `mm:ss`; minutes keep counting past an hour.
pub fn format_timer(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::{reduce, Input};
    use chrono::Utc;
    use protocol::VoiceEvent;

    #[test]
    fn timer_formatting() {
        assert_eq!(format_timer(0), "00:00");
        assert_eq!(format_timer(75), "01:15");
        assert_eq!(format_timer(3725), "62:05");
    }

    #[test]
    fn idle_view() {
        let view = CallView::project(&CallSession::default(), 0);
        assert_eq!(view.status_text, "Ready");
        assert_eq!(view.connection, "Disconnected");
        assert_eq!(view.call_button, ButtonView { label: "Start Call", enabled: true });
        assert!(!view.mute_button.enabled);
        assert_eq!(view.field_count, "0 / 8");
    }

    #[test]
    fn live_view_with_speech_and_meter() {
        let now = Utc::now();
        let mut s = CallSession::default();
        for input in [
            Input::StartCall { mode: None },
            Input::Sdk(VoiceEvent::CallStart),
            Input::Sdk(VoiceEvent::SpeechStart),
            Input::Sdk(VoiceEvent::VolumeLevel(0.25)),
        ] {
            s = reduce(s, input, now).session;
        }
        let view = CallView::project(&s, 0);
        assert_eq!(view.status_text, "Live Call");
        assert_eq!(view.connection, "AI Speaking");
        assert!(view.mute_button.enabled);
        assert_eq!(view.mic_width_pct, 50.0);
        assert!(view.voice_detected);
        assert_eq!(view.stages[0].1, StageMark::Current);

        s = reduce(s, Input::Sdk(VoiceEvent::VolumeLevel(0.9)), now).session;
        s = reduce(s, Input::Sdk(VoiceEvent::SpeechEnd), now).session;
        let view = CallView::project(&s, s.log.next_seq());
        assert_eq!(view.mic_width_pct, 100.0);
        assert_eq!(view.connection, "Listening");
        assert!(view.new_log.is_empty());
    }
}
