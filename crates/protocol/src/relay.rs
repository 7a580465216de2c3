//! Envelope spoken with the relay server. SDK events and commands travel as
//! JSON strings inside `frame` messages.

use serde::{Deserialize, Serialize};

use crate::{decode_event, encode_command, ProtocolError, SdkCommand, VoiceEvent};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RelayEnvelope {
    Hello {
        s: String,
        t: String,
        r: String,
    },
    HelloAck,
    Hb,
    Frame {
        frame: String,
    },
    PeerJoined {
        #[serde(default)]
        role: Option<String>,
    },
    PeerLeft {
        #[serde(default)]
        role: Option<String>,
    },
    SessionKilled,
    #[serde(other)]
    Unknown,
}

impl RelayEnvelope {
    pub fn hello(session_id: &str, token: &str, role: &str) -> Self {
        RelayEnvelope::Hello {
            s: session_id.to_string(),
            t: token.to_string(),
            r: role.to_string(),
        }
    }

    pub fn command(cmd: &SdkCommand) -> Result<Self, ProtocolError> {
        Ok(RelayEnvelope::Frame {
            frame: encode_command(cmd)?,
        })
    }

    /// The SDK event carried by a `frame`, if this is one.
    pub fn event(&self) -> Option<Result<VoiceEvent, ProtocolError>> {
        match self {
            RelayEnvelope::Frame { frame } => Some(decode_event(frame)),
            _ => None,
        }
    }

    pub fn to_text(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_text(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}
