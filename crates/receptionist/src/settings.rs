use anyhow::{Context, Result};
use receptionist_core::{Mode, TargetResolver, DEFAULT_STOP_TIMEOUT};
use std::time::Duration;

pub const DEFAULT_WEBHOOK_BASE: &str = "http://localhost:5678/webhook";

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub ws: String,
    pub sid: String,
    pub tok: String,
    pub hb_secs: u64,
}

#[derive(Clone, Debug)]
pub struct Settings {
    /// Needed by the browser widget; the console only checks it is present.
    pub vapi_public_key: Option<String>,
    pub assistant_id_business: Option<String>,
    pub assistant_id_after_hours: Option<String>,
    pub webhook_base: String,
    pub mode: Mode,
    pub stop_timeout: Duration,
    pub relay: Option<RelayConfig>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mode = match var("RECEPTIONIST_MODE") {
            Some(raw) => raw.parse().context("RECEPTIONIST_MODE")?,
            None => Mode::default(),
        };
        let stop_timeout = match var("RECEPTIONIST_STOP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("RECEPTIONIST_STOP_TIMEOUT_SECS={} is not a number", raw))?,
            ),
            None => DEFAULT_STOP_TIMEOUT,
        };

        let relay = match (var("RELAY_SESSION_ID"), var("RELAY_TOKEN")) {
            (Some(sid), Some(tok)) => Some(RelayConfig {
                ws: var("RELAY_WS_URL").unwrap_or_else(|| "ws://127.0.0.1:3001/ws".to_string()),
                sid,
                tok,
                hb_secs: var("RELAY_HB_SECS").and_then(|s| s.parse().ok()).unwrap_or(20),
            }),
            _ => None,
        };

        Ok(Self {
            vapi_public_key: var("VAPI_PUBLIC_KEY"),
            assistant_id_business: var("VAPI_ASSISTANT_ID_BUSINESS"),
            assistant_id_after_hours: var("VAPI_ASSISTANT_ID_AFTERHOURS"),
            webhook_base: var("N8N_WEBHOOK_BASE").unwrap_or_else(|| DEFAULT_WEBHOOK_BASE.to_string()),
            mode,
            stop_timeout,
            relay,
        })
    }

    pub fn resolver(&self) -> TargetResolver {
        let mut resolver = TargetResolver::new(self.webhook_base.clone());
        if let Some(id) = &self.assistant_id_business {
            resolver = resolver.with_assistant_id(Mode::Business, id.clone());
        }
        if let Some(id) = &self.assistant_id_after_hours {
            resolver = resolver.with_assistant_id(Mode::AfterHours, id.clone());
        }
        resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::StartTarget;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.webhook_base, DEFAULT_WEBHOOK_BASE);
        assert_eq!(s.mode, Mode::Business);
        assert_eq!(s.stop_timeout, Duration::from_secs(3));
        assert!(s.relay.is_none());
        assert!(matches!(s.resolver().resolve(Mode::Business), StartTarget::Assistant(_)));
    }

    #[test]
    fn reads_ids_mode_and_relay() {
        let s = settings(&[
            ("RECEPTIONIST_MODE", "after-hours"),
            ("VAPI_ASSISTANT_ID_AFTERHOURS", "ah-1"),
            ("VAPI_ASSISTANT_ID_BUSINESS", "  "),
            ("RELAY_SESSION_ID", "s1"),
            ("RELAY_TOKEN", "t1"),
            ("RELAY_HB_SECS", "7"),
        ])
        .unwrap();
        assert_eq!(s.mode, Mode::AfterHours);
        assert_eq!(s.resolver().resolve(Mode::AfterHours), StartTarget::AssistantId("ah-1".into()));
        assert!(s.assistant_id_business.is_none());
        let relay = s.relay.unwrap();
        assert_eq!(relay.hb_secs, 7);
        assert_eq!(relay.ws, "ws://127.0.0.1:3001/ws");
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(settings(&[("RECEPTIONIST_MODE", "weekend")]).is_err());
        assert!(settings(&[("RECEPTIONIST_STOP_TIMEOUT_SECS", "soon")]).is_err());
    }
}
