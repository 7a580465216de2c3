//! Per-call assistant configuration.
//!
//! [`build`] is a pure function of the call mode and the workflow base URL.
//! A fresh [`AssistantConfig`] is produced for every call and handed to the
//! SDK unchanged; nothing mutates it afterwards.

pub mod prompts;
pub mod tools;

use protocol::assistant::{
    AssistantConfig, ModelConfig, PromptMessage, StartSpeakingPlan, StopSpeakingPlan,
    TranscriberConfig, VoiceConfig,
};
use protocol::StartTarget;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

pub const LLM_PROVIDER: &str = "openai";
pub const LLM_MODEL: &str = "gpt-4o";
pub const LLM_TEMPERATURE: f32 = 0.3;

pub const VOICE_PROVIDER: &str = "11labs";
pub const VOICE_ID: &str = "EXAVITQu4vr4xnSDxMaL";
pub const VOICE_MODEL: &str = "eleven_turbo_v2_5";

pub const TRANSCRIBER_PROVIDER: &str = "deepgram";
pub const TRANSCRIBER_MODEL: &str = "nova-2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Business,
    AfterHours,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Business => "business",
            Mode::AfterHours => "after-hours",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "business" | "biz" | "business-hours" => Ok(Mode::Business),
            "after-hours" | "afterhours" | "after_hours" | "ah" => Ok(Mode::AfterHours),
            other => Err(CoreError::UnknownMode(other.to_string())),
        }
    }
}

/// Turn-taking thresholds shared by both modes.
struct Timing {
    wait_seconds: f32,
    num_words: u32,
    voice_seconds: f32,
    backoff_seconds: f32,
    silence_timeout_seconds: u32,
    max_duration_seconds: u32,
}

fn timing(mode: Mode) -> Timing {
    match mode {
        Mode::Business => Timing {
            wait_seconds: 0.4,
            num_words: 2,
            voice_seconds: 0.2,
            backoff_seconds: 1.0,
            silence_timeout_seconds: 30,
            max_duration_seconds: 1200,
        },
        // Message-taking calls are short.
        Mode::AfterHours => Timing {
            wait_seconds: 0.4,
            num_words: 2,
            voice_seconds: 0.2,
            backoff_seconds: 1.0,
            silence_timeout_seconds: 20,
            max_duration_seconds: 600,
        },
    }
}

pub fn build(mode: Mode, webhook_base: &str) -> AssistantConfig {
    let (name, first_message, system_prompt, tool_schemas) = match mode {
        Mode::Business => (
            "Equity Insurance Receptionist",
            prompts::BUSINESS_FIRST_MESSAGE,
            prompts::BUSINESS_SYSTEM_PROMPT,
            vec![
                tools::save_field(webhook_base, tools::BUSINESS_FIELDS),
                tools::check_disqualifier(webhook_base),
                tools::check_hot_lead(webhook_base),
                tools::route_existing_customer(webhook_base),
                tools::route_claim(webhook_base),
            ],
        ),
        Mode::AfterHours => (
            "Equity Insurance After Hours",
            prompts::AFTER_HOURS_FIRST_MESSAGE,
            prompts::AFTER_HOURS_SYSTEM_PROMPT,
            vec![
                tools::save_field(webhook_base, tools::AFTER_HOURS_FIELDS),
                tools::route_claim(webhook_base),
            ],
        ),
    };
    let t = timing(mode);

    AssistantConfig {
        name: name.to_string(),
        first_message: first_message.to_string(),
        model: ModelConfig {
            provider: LLM_PROVIDER.to_string(),
            model: LLM_MODEL.to_string(),
            temperature: LLM_TEMPERATURE,
            messages: vec![PromptMessage {
                role: "system".to_string(),
                content: system_prompt.to_string(),
            }],
            tools: tool_schemas,
        },
        voice: VoiceConfig {
            provider: VOICE_PROVIDER.to_string(),
            voice_id: VOICE_ID.to_string(),
            model: Some(VOICE_MODEL.to_string()),
            stability: 0.5,
            similarity_boost: 0.75,
        },
        transcriber: TranscriberConfig {
            provider: TRANSCRIBER_PROVIDER.to_string(),
            model: TRANSCRIBER_MODEL.to_string(),
            language: "en".to_string(),
        },
        start_speaking_plan: StartSpeakingPlan {
            wait_seconds: t.wait_seconds,
            smart_endpointing_enabled: true,
        },
        stop_speaking_plan: StopSpeakingPlan {
            num_words: t.num_words,
            voice_seconds: t.voice_seconds,
            backoff_seconds: t.backoff_seconds,
        },
        silence_timeout_seconds: t.silence_timeout_seconds,
        max_duration_seconds: t.max_duration_seconds,
        end_call_function_enabled: true,
        server_url: Some(tools::endpoint(webhook_base, tools::CALL_ENDED_PATH)),
    }
}

/// Decides what a `start` request carries for a mode: the provisioned
/// assistant id when one is configured, otherwise a freshly built inline
/// configuration.
#[derive(Debug, Clone, Default)]
pub struct TargetResolver {
    webhook_base: String,
    business_id: Option<String>,
    after_hours_id: Option<String>,
}

impl TargetResolver {
    pub fn new(webhook_base: impl Into<String>) -> Self {
        Self {
            webhook_base: webhook_base.into(),
            business_id: None,
            after_hours_id: None,
        }
    }

    pub fn with_assistant_id(mut self, mode: Mode, id: impl Into<String>) -> Self {
        let id = Some(id.into()).filter(|s: &String| !s.trim().is_empty());
        match mode {
            Mode::Business => self.business_id = id,
            Mode::AfterHours => self.after_hours_id = id,
        }
        self
    }

    pub fn webhook_base(&self) -> &str {
        &self.webhook_base
    }

    pub fn resolve(&self, mode: Mode) -> StartTarget {
        let id = match mode {
            Mode::Business => &self.business_id,
            Mode::AfterHours => &self.after_hours_id,
        };
        match id {
            Some(id) => StartTarget::AssistantId(id.clone()),
            None => StartTarget::Assistant(Box::new(build(mode, &self.webhook_base))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://n8n.example.com/webhook/";

    #[test]
    fn business_exposes_full_toolset() {
        let cfg = build(Mode::Business, BASE);
        assert_eq!(
            cfg.tool_names(),
            [
                "save_field",
                "check_disqualifier",
                "check_hot_lead",
                "route_existing_customer",
                "route_claim"
            ]
        );
        assert_eq!(
            cfg.tool("check_hot_lead").unwrap().server.url,
            "https://n8n.example.com/webhook/vapi-check-hotlead"
        );
        assert_eq!(
            cfg.server_url.as_deref(),
            Some("https://n8n.example.com/webhook/vapi-call-ended")
        );
        assert!(cfg.first_message.contains("Equity Insurance"));
        assert!(cfg.system_prompt().unwrap().contains("IMPORTANT RULES"));
        assert_eq!(cfg.model.model, "gpt-4o");
        assert_eq!(cfg.voice.voice_id, VOICE_ID);
    }

    #[test]
    fn after_hours_is_restricted() {
        let cfg = build(Mode::AfterHours, BASE);
        assert_eq!(cfg.tool_names(), ["save_field", "route_claim"]);
        let fields = &cfg.tool("save_field").unwrap().function.parameters["properties"]["field_name"]["enum"];
        assert_eq!(fields, &serde_json::json!(["caller_name", "caller_phone", "reason_for_calling"]));
        assert!(cfg.system_prompt().unwrap().contains("9 AM to 5 PM"));
    }

    #[test]
    fn configs_are_rebuilt_identically() {
        assert_eq!(build(Mode::Business, BASE), build(Mode::Business, BASE));
    }

    #[test]
    fn serializes_in_sdk_casing() {
        let v = serde_json::to_value(build(Mode::Business, BASE)).unwrap();
        assert!(v.get("firstMessage").is_some());
        assert!(v["voice"].get("voiceId").is_some());
        assert!(v["stopSpeakingPlan"].get("numWords").is_some());
        assert_eq!(v["model"]["tools"][0]["type"], "function");
    }

    #[test]
    fn resolver_prefers_provisioned_ids() {
        let resolver = TargetResolver::new(BASE).with_assistant_id(Mode::Business, "bbf67fe2");
        assert_eq!(resolver.resolve(Mode::Business), StartTarget::AssistantId("bbf67fe2".into()));
        assert!(matches!(resolver.resolve(Mode::AfterHours), StartTarget::Assistant(_)));

        let blank = TargetResolver::new(BASE).with_assistant_id(Mode::Business, "  ");
        assert!(matches!(blank.resolve(Mode::Business), StartTarget::Assistant(_)));
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("after-hours".parse::<Mode>().unwrap(), Mode::AfterHours);
        assert_eq!("Business".parse::<Mode>().unwrap(), Mode::Business);
        assert!("weekend".parse::<Mode>().is_err());
    }
}
