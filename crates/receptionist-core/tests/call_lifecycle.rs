use chrono::{DateTime, Duration, Utc};
use protocol::{FunctionCall, SdkError, ServerMessage, ToolCall, ToolCallResult, VoiceEvent};
use receptionist_core::session::{BadgeCategory, BadgeState, CallState, Stage};
use receptionist_core::{reduce, CallSession, Effect, Input, Mode};
use serde_json::json;

struct Harness {
    session: CallSession,
    effects: Vec<Effect>,
    now: DateTime<Utc>,
}

impl Harness {
    fn new(mode: Mode) -> Self {
        Self {
            session: CallSession::new(mode),
            effects: Vec::new(),
            now: Utc::now(),
        }
    }

    fn feed(&mut self, input: Input) -> &mut Self {
        let t = reduce(std::mem::take(&mut self.session), input, self.now);
        self.session = t.session;
        self.effects.extend(t.effects);
        self
    }

    fn advance(&mut self, secs: i64) -> &mut Self {
        self.now += Duration::seconds(secs);
        self.feed(Input::Tick)
    }

    fn event(&mut self, ev: VoiceEvent) -> &mut Self {
        self.feed(Input::Sdk(ev))
    }

    fn result(&mut self, text: &str) -> &mut Self {
        self.event(VoiceEvent::Message(ServerMessage::ToolCallsResult {
            tool_call_result: ToolCallResult {
                id: None,
                result: json!(text),
            },
        }))
    }

    fn call(&mut self, name: &str, arguments: serde_json::Value) -> &mut Self {
        self.event(VoiceEvent::Message(ServerMessage::FunctionCall {
            function_call: FunctionCall {
                name: name.to_string(),
                arguments,
            },
        }))
    }

    fn starts(&self) -> usize {
        self.effects
            .iter()
            .filter(|e| matches!(e, Effect::Start { .. }))
            .count()
    }
}

#[test]
fn test_business_intake_scenario() {
    let mut h = Harness::new(Mode::Business);
    h.feed(Input::StartCall { mode: None })
        .event(VoiceEvent::CallStart)
        .call("save_field", json!({"field_name": "caller_name", "field_value": "Jane"}))
        .result("caller qualifies, not disqualified")
        .result("hot lead, high value, transfer")
        .event(VoiceEvent::CallEnd);

    let s = &h.session;
    assert_eq!(s.state, CallState::Ended { confirmed: true });
    assert_eq!(s.fields.get("caller_name"), Some("Jane"));
    assert_eq!(s.badges.state(BadgeCategory::Disqualifier), Some(BadgeState::Pass));
    assert_eq!(s.badges.state(BadgeCategory::HotLead), Some(BadgeState::Hot));
    assert_eq!(
        s.stage_history,
        vec![
            Stage::Idle,
            Stage::Collecting,
            Stage::Evaluating,
            Stage::Routing,
            Stage::Complete
        ]
    );
    assert!(!s.timer_running);
}

#[test]
fn test_duplicate_start_is_noop() {
    let mut h = Harness::new(Mode::Business);
    h.feed(Input::StartCall { mode: None })
        .feed(Input::StartCall { mode: None });
    assert_eq!(h.starts(), 1);
    assert_eq!(h.session.state, CallState::Connecting);

    h.event(VoiceEvent::CallStart)
        .feed(Input::StartCall { mode: Some(Mode::AfterHours) });
    assert_eq!(h.starts(), 1);
    assert_eq!(h.session.state, CallState::Active);
    assert_eq!(h.session.mode, Mode::Business);
}

#[test]
fn test_noise_filter_errors_never_change_state() {
    let krisp = |msg: &str| VoiceEvent::Error(SdkError(json!({"error": {"message": msg}})));

    let mut h = Harness::new(Mode::Business);
    h.feed(Input::StartCall { mode: None });
    h.event(krisp("Krisp init failed"));
    assert_eq!(h.session.state, CallState::Connecting);

    h.event(VoiceEvent::CallStart);
    h.event(krisp("unsupported SAMPLE_RATE for mic processor"));
    assert_eq!(h.session.state, CallState::Active);

    h.event(VoiceEvent::CallEnd);
    h.event(krisp("krisp teardown"));
    assert_eq!(h.session.state, CallState::Ended { confirmed: true });

    let mut idle = Harness::new(Mode::Business);
    idle.event(krisp("Krisp model not loaded"));
    assert_eq!(idle.session.state, CallState::Idle);

    let mut failed = Harness::new(Mode::Business);
    failed
        .feed(Input::StartCall { mode: None })
        .feed(Input::StartFailed(SdkError(json!({"error": {"message": "Invalid key"}}))))
        .event(krisp("krisp processor error"));
    assert_eq!(failed.session.state, CallState::Error { reason: "Invalid key".into() });

    for (session, expected) in [(&h.session, 3), (&idle.session, 1), (&failed.session, 1)] {
        let audio = session
            .log
            .lines()
            .iter()
            .filter(|l| l.tag.as_deref() == Some("AUDIO"))
            .count();
        assert_eq!(audio, expected);
    }
}

#[test]
fn test_elapsed_time_resets_on_next_start() {
    let mut h = Harness::new(Mode::Business);
    h.feed(Input::StartCall { mode: None })
        .event(VoiceEvent::CallStart)
        .advance(42)
        .event(VoiceEvent::CallEnd)
        .advance(10);
    assert_eq!(h.session.elapsed_secs, 42);
    assert!(!h.session.timer_running);

    h.feed(Input::StartCall { mode: None }).advance(5);
    assert_eq!(h.session.state, CallState::Connecting);
    assert_eq!(h.session.elapsed_secs, 0);
    assert!(!h.session.timer_running);

    h.event(VoiceEvent::CallStart).advance(3);
    assert!(h.session.timer_running);
    assert_eq!(h.session.elapsed_secs, 3);
}

#[test]
fn test_results_never_rewind_stage() {
    let mut h = Harness::new(Mode::Business);
    h.feed(Input::StartCall { mode: None })
        .event(VoiceEvent::CallStart)
        .call("route_claim", json!({"claim_type": "auto"}))
        .result("Caller qualifies");
    assert_eq!(h.session.stage, Stage::Routing);
    assert_eq!(h.session.badges.state(BadgeCategory::Disqualifier), Some(BadgeState::Pass));

    h.result("Ticket created").result("Standard lead");
    assert_eq!(h.session.stage, Stage::Complete);
    assert_eq!(h.session.badges.state(BadgeCategory::HotLead), Some(BadgeState::Pass));
    assert_eq!(
        h.session.stage_history,
        vec![Stage::Idle, Stage::Routing, Stage::Complete]
    );
}

#[test]
fn test_late_messages_do_not_touch_ended_call() {
    let mut h = Harness::new(Mode::Business);
    h.feed(Input::StartCall { mode: None })
        .event(VoiceEvent::CallStart)
        .call("save_field", json!({"field_name": "caller_name", "field_value": "Jane"}))
        .feed(Input::StopCall)
        .feed(Input::StopTimeoutElapsed);
    assert_eq!(h.session.state, CallState::Ended { confirmed: false });
    assert_eq!(h.session.stage, Stage::Complete);
    let history = h.session.stage_history.clone();

    h.call("save_field", json!({"field_name": "caller_name", "field_value": "Late"}))
        .result("hot lead transfer");

    let s = &h.session;
    assert_eq!(s.fields.get("caller_name"), Some("Jane"));
    assert_eq!(s.stage, Stage::Complete);
    assert_eq!(s.stage_history, history);
    assert_eq!(s.badges.state(BadgeCategory::HotLead), None);
    assert_eq!(s.log.count_matching("Ignoring message for ended call"), 2);

    h.event(VoiceEvent::CallEnd);
    assert_eq!(h.session.state, CallState::Ended { confirmed: true });
}

#[test]
fn test_disqualifier_precedence() {
    let mut h = Harness::new(Mode::Business);
    h.feed(Input::StartCall { mode: None }).event(VoiceEvent::CallStart);

    h.result("Not disqualified, proceed");
    assert_eq!(h.session.badges.state(BadgeCategory::Disqualifier), Some(BadgeState::Pass));

    h.result("Caller is disqualified: 3 claims in 2022");
    assert_eq!(h.session.badges.state(BadgeCategory::Disqualifier), Some(BadgeState::Fail));
    assert_eq!(
        h.session.badges.get(BadgeCategory::Disqualifier).map(|b| b.label.as_str()),
        Some("Disqualified")
    );
}

#[test]
fn test_tool_calls_list_routes_and_marks_badges() {
    let mut h = Harness::new(Mode::Business);
    h.feed(Input::StartCall { mode: None }).event(VoiceEvent::CallStart);

    h.event(VoiceEvent::Message(ServerMessage::ToolCalls {
        tool_calls: vec![
            ToolCall {
                id: Some("a".into()),
                function: Some(FunctionCall {
                    name: "check_hot_lead".into(),
                    arguments: json!({"policy_type": "property", "estimated_value": 3500000}),
                }),
            },
            ToolCall {
                id: Some("b".into()),
                function: Some(FunctionCall {
                    name: "route_claim".into(),
                    arguments: json!("{}"),
                }),
            },
            ToolCall {
                id: Some("c".into()),
                function: Some(FunctionCall {
                    name: "lookup_weather".into(),
                    arguments: json!({}),
                }),
            },
        ],
    }));

    let s = &h.session;
    assert_eq!(s.badges.state(BadgeCategory::HotLead), Some(BadgeState::Checking));
    assert_eq!(s.badges.state(BadgeCategory::CallType), Some(BadgeState::Urgent));
    assert_eq!(s.stage, Stage::Routing);
    assert!(s.log.contains("Function: lookup_weather"));
    assert_eq!(s.state, CallState::Active);
}

#[test]
fn test_completion_result_and_existing_customer() {
    let mut h = Harness::new(Mode::Business);
    h.feed(Input::StartCall { mode: None })
        .event(VoiceEvent::CallStart)
        .call("route_existing_customer", json!({"caller_name": "Mike"}))
        .result("Ticket created, account manager notified");

    let s = &h.session;
    assert_eq!(
        s.badges.get(BadgeCategory::CallType).map(|b| b.label.as_str()),
        Some("Existing Customer")
    );
    assert_eq!(s.stage, Stage::Complete);
}

#[test]
fn test_ejection_before_active_is_an_error() {
    let mut h = Harness::new(Mode::AfterHours);
    h.feed(Input::StartCall { mode: None });
    h.event(VoiceEvent::Error(SdkError(json!({"error": {"message": "Participant ejected"}}))));
    assert_eq!(
        h.session.state,
        CallState::Error {
            reason: "Participant ejected".into()
        }
    );
    assert!(h.session.state.is_startable());
}

#[test]
fn test_unclassified_error_is_a_warning_only() {
    let mut h = Harness::new(Mode::Business);
    h.feed(Input::StartCall { mode: None }).event(VoiceEvent::CallStart);
    h.event(VoiceEvent::Error(SdkError(json!({"message": "network quality degraded"}))));
    assert_eq!(h.session.state, CallState::Active);
    assert!(h.session.log.contains("Warning: network quality degraded"));
}
