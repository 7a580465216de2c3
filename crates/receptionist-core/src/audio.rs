//! Microphone capture constraints.
//!
//! The SDK's noise filter crashes on capture rates above 48 kHz, so every
//! audio request is capped there before the browser sees it, with echo
//! cancellation, noise suppression and auto gain on unless the caller said
//! otherwise.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const MAX_CAPTURE_SAMPLE_RATE: u32 = 48_000;

/// Substrings identifying failures of the SDK's noise filter.
pub const NOISE_FILTER_MARKERS: &[&str] = &["Krisp", "krisp", "SAMPLE_RATE"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioRequest>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AudioRequest {
    Enabled(bool),
    Detailed(AudioTrackConstraints),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioTrackConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo_cancellation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_suppression: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_gain_control: Option<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

fn capped_sample_rate() -> Value {
    json!({ "ideal": MAX_CAPTURE_SAMPLE_RATE, "max": MAX_CAPTURE_SAMPLE_RATE })
}

/// Rewrites a capture request. Requests without audio pass through untouched.
pub fn normalize_capture(mut constraints: MediaConstraints) -> MediaConstraints {
    let track = match constraints.audio.take() {
        None => return constraints,
        Some(AudioRequest::Enabled(false)) => {
            constraints.audio = Some(AudioRequest::Enabled(false));
            return constraints;
        }
        Some(AudioRequest::Enabled(true)) => AudioTrackConstraints::default(),
        Some(AudioRequest::Detailed(track)) => track,
    };

    let on = || Some(Value::Bool(true));
    constraints.audio = Some(AudioRequest::Detailed(AudioTrackConstraints {
        sample_rate: Some(capped_sample_rate()),
        echo_cancellation: track.echo_cancellation.or_else(on),
        noise_suppression: track.noise_suppression.or_else(on),
        auto_gain_control: track.auto_gain_control.or_else(on),
        other: track.other,
    }));
    constraints
}

/// Unhandled rejections raised by the noise filter are swallowed.
pub fn is_suppressed_rejection(reason: &str) -> bool {
    NOISE_FILTER_MARKERS.iter().any(|m| reason.contains(m))
}
