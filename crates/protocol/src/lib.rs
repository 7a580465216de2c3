use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod assistant;
pub mod relay;

pub use assistant::AssistantConfig;
pub use relay::RelayEnvelope;

/// Protocol version (bumped when breaking changes are introduced)
pub const VERSION: u8 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Event emitted by the hosted voice SDK.
///
/// The browser widget forwards every SDK callback as `{"event": <name>, "data": <payload>}`,
/// keeping the SDK payload untouched under `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum VoiceEvent {
    #[serde(alias = "call-started")]
    CallStart,
    #[serde(alias = "call-ended")]
    CallEnd,
    SpeechStart,
    SpeechEnd,
    VolumeLevel(f32),
    Message(ServerMessage),
    Error(SdkError),
}

/// Sub-tagged payload of a `message` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    Transcript {
        role: Role,
        #[serde(rename = "transcriptType")]
        transcript_type: TranscriptType,
        transcript: String,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    ToolCalls {
        #[serde(default, rename = "toolCalls", alias = "toolCallList")]
        tool_calls: Vec<ToolCall>,
    },
    ToolCallsResult {
        #[serde(rename = "toolCallResult")]
        tool_call_result: ToolCallResult,
    },
    /// Single-result shape; the SDK has used both names over time.
    #[serde(alias = "tool-call-result")]
    FunctionCallResult {
        #[serde(default, rename = "toolCallId", skip_serializing_if = "Option::is_none")]
        tool_call_id: Option<String>,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        result: Value,
        #[serde(default, rename = "functionCallResult", skip_serializing_if = "Option::is_none")]
        function_call_result: Option<ResultBody>,
    },
    /// Status updates, conversation snapshots and anything newer than this client.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptType {
    Partial,
    Final,
}

/// A named remote function invocation. `arguments` arrives either as a JSON
/// object or as a string holding JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default, alias = "parameters")]
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBody {
    #[serde(default)]
    pub result: Value,
}

impl FunctionCall {
    /// Decoded arguments. Unparseable string arguments yield `None`.
    pub fn parsed_arguments(&self) -> Option<serde_json::Map<String, Value>> {
        match &self.arguments {
            Value::Null => Some(serde_json::Map::new()),
            Value::Object(map) => Some(map.clone()),
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            },
            _ => None,
        }
    }
}

impl ServerMessage {
    /// Free-text result carried by either result shape, empty when absent.
    pub fn result_text(&self) -> Option<(Option<&str>, String)> {
        match self {
            ServerMessage::ToolCallsResult { tool_call_result } => Some((
                tool_call_result.id.as_deref(),
                value_text(&tool_call_result.result),
            )),
            ServerMessage::FunctionCallResult { tool_call_id, result, function_call_result } => {
                let text = if result.is_null() {
                    function_call_result
                        .as_ref()
                        .map(|body| value_text(&body.result))
                        .unwrap_or_default()
                } else {
                    value_text(result)
                };
                Some((tool_call_id.as_deref(), text))
            }
            _ => None,
        }
    }
}

/// Raw SDK error payload. Shapes vary by failure site, so the value is kept
/// whole and read through accessors that walk the nested `error` chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SdkError(pub Value);

impl SdkError {
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn action(&self) -> Option<&str> {
        self.0.get("error").and_then(|e| e.get("action")).and_then(Value::as_str)
    }

    /// `error.statusCode`, falling back to the top-level `statusCode`.
    pub fn status_code(&self) -> Option<u16> {
        let nested = self.0.get("error").and_then(|e| e.get("statusCode"));
        nested
            .and_then(as_status)
            .or_else(|| self.0.get("statusCode").and_then(as_status))
    }

    /// Human-readable reason from the innermost populated `error` level,
    /// falling back to the top-level `message`.
    pub fn message(&self) -> String {
        let inner = [
            self.0.get("error").and_then(|e| e.get("error")),
            self.0.get("error"),
        ]
        .into_iter()
        .flatten()
        .find(|v| truthy(v))
        .unwrap_or(&self.0);

        match inner {
            Value::String(s) => s.clone(),
            other => match other.get("message") {
                Some(Value::String(s)) => s.clone(),
                Some(msg @ Value::Object(_)) => msg.to_string(),
                _ => match self.0.get("message") {
                    Some(top) if truthy(top) => value_text(top),
                    _ => other.to_string(),
                },
            },
        }
    }
}

impl From<Value> for SdkError {
    fn from(value: Value) -> Self {
        SdkError(value)
    }
}

fn as_status(v: &Value) -> Option<u16> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Imperative command sent to the voice SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum SdkCommand {
    Start {
        #[serde(skip_serializing_if = "Option::is_none")]
        v: Option<u8>,
        #[serde(flatten)]
        target: StartTarget,
    },
    Stop,
    SetMuted { muted: bool },
}

/// What the SDK should start: a pre-provisioned assistant, or an inline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StartTarget {
    AssistantId(String),
    Assistant(Box<AssistantConfig>),
}

impl SdkCommand {
    pub fn start(target: StartTarget) -> Self {
        SdkCommand::Start { v: Some(VERSION), target }
    }
}

pub fn decode_event(text: &str) -> Result<VoiceEvent, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

pub fn encode_command(cmd: &SdkCommand) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(cmd)?)
}
