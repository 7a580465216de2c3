//! Inline assistant configuration as the voice SDK expects it at call start.
//!
//! Field names follow the SDK's camelCase JSON. Tool parameter schemas are kept
//! as raw JSON Schema values: they are contracts owned by the workflow backend
//! and are passed through without local validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    pub name: String,
    pub first_message: String,
    pub model: ModelConfig,
    pub voice: VoiceConfig,
    pub transcriber: TranscriberConfig,
    pub start_speaking_plan: StartSpeakingPlan,
    pub stop_speaking_plan: StopSpeakingPlan,
    pub silence_timeout_seconds: u32,
    pub max_duration_seconds: u32,
    pub end_call_function_enabled: bool,
    /// Receives the end-of-call report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<PromptMessage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub provider: String,
    pub voice_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub stability: f32,
    pub similarity_boost: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriberConfig {
    pub provider: String,
    pub model: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSpeakingPlan {
    pub wait_seconds: f32,
    pub smart_endpointing_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopSpeakingPlan {
    pub num_words: u32,
    pub voice_seconds: f32,
    pub backoff_seconds: f32,
}

/// A remotely invocable function exposed to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSpec,
    pub server: ToolServer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolServer {
    pub url: String,
}

impl AssistantConfig {
    pub fn tool(&self, name: &str) -> Option<&ToolSchema> {
        self.model.tools.iter().find(|t| t.function.name == name)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.model.tools.iter().map(|t| t.function.name.as_str()).collect()
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.model
            .messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.as_str())
    }
}
