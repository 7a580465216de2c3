use protocol::{SdkCommand, SdkError, StartTarget, VoiceEvent};
use receptionist_core::mocks::{ChannelPresenter, RecordingSdk};
use receptionist_core::session::CallState;
use receptionist_core::{CallController, CallView, Mode, TargetResolver, UiCommand};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

struct Rig {
    sdk: Arc<RecordingSdk>,
    events: mpsc::Sender<VoiceEvent>,
    commands: mpsc::Sender<UiCommand>,
    views: mpsc::Receiver<CallView>,
    seen_log: Vec<String>,
    handle: tokio::task::JoinHandle<receptionist_core::CallSession>,
}

impl Rig {
    fn spawn(sdk: RecordingSdk, resolver: TargetResolver) -> Self {
        let sdk = Arc::new(sdk);
        let (view_tx, views) = mpsc::channel(256);
        let (events, event_rx) = mpsc::channel(64);
        let (commands, command_rx) = mpsc::channel(16);
        let controller = CallController::new(Arc::clone(&sdk), ChannelPresenter(view_tx), resolver)
            .with_stop_timeout(Duration::from_secs(3))
            .with_mode(Mode::Business);
        let handle = tokio::spawn(controller.run(event_rx, command_rx));
        Self {
            sdk,
            events,
            commands,
            views,
            seen_log: Vec::new(),
            handle,
        }
    }

    async fn until(&mut self, pred: impl Fn(&CallView) -> bool) -> CallView {
        loop {
            let view = self.views.recv().await.expect("controller exited");
            self.seen_log.extend(view.new_log.iter().map(|l| l.text.clone()));
            if pred(&view) {
                return view;
            }
        }
    }

    async fn command(&self, cmd: UiCommand) {
        self.commands.send(cmd).await.unwrap();
    }

    async fn event(&self, ev: VoiceEvent) {
        self.events.send(ev).await.unwrap();
    }

    async fn shutdown(self) -> (Arc<RecordingSdk>, Vec<String>, receptionist_core::CallSession) {
        let Rig { sdk, commands, mut views, mut seen_log, handle, .. } = self;
        commands.send(UiCommand::Shutdown).await.unwrap();
        let drain = tokio::spawn(async move {
            while let Some(view) = views.recv().await {
                seen_log.extend(view.new_log.iter().map(|l| l.text.clone()));
            }
            seen_log
        });
        let session = handle.await.unwrap();
        let seen_log = drain.await.unwrap();
        (sdk, seen_log, session)
    }
}

#[tokio::test(start_paused = true)]
async fn test_stop_timeout_forces_end_once() {
    let mut rig = Rig::spawn(RecordingSdk::new(), TargetResolver::new("http://localhost:5678/webhook"));

    rig.command(UiCommand::ToggleCall).await;
    rig.until(|v| v.state == CallState::Connecting).await;
    rig.event(VoiceEvent::CallStart).await;
    let live = rig.until(|v| v.state == CallState::Active).await;
    assert_eq!(live.status_text, "Live Call");

    // The SDK never reports call-end; the deadline has to fire.
    rig.command(UiCommand::Stop).await;
    rig.command(UiCommand::Stop).await;
    let ended = rig
        .until(|v| v.state == CallState::Ended { confirmed: false })
        .await;
    assert_eq!(ended.status_text, "Call Ended");

    // A late call-end only confirms.
    rig.event(VoiceEvent::CallEnd).await;
    rig.until(|v| v.state == CallState::Ended { confirmed: true }).await;

    // Nothing else may fire after the deadline.
    tokio::time::sleep(Duration::from_secs(10)).await;

    let (sdk, seen_log, session) = rig.shutdown().await;
    assert_eq!(session.state, CallState::Ended { confirmed: true });
    assert_eq!(session.log.count_matching("Force-ending call"), 1);
    assert_eq!(seen_log.iter().filter(|l| l.contains("Force-ending call")).count(), 1);
    assert_eq!(sdk.count(|c| matches!(c, SdkCommand::Stop)), 1);
    assert_eq!(sdk.count(|c| matches!(c, SdkCommand::Start { .. })), 1);
    assert_eq!(sdk.count(|c| *c == SdkCommand::SetMuted { muted: false }), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sdk_end_before_deadline_cancels_timeout() {
    let mut rig = Rig::spawn(RecordingSdk::new(), TargetResolver::new("http://localhost:5678/webhook"));

    rig.command(UiCommand::Start(None)).await;
    rig.until(|v| v.state == CallState::Connecting).await;
    rig.event(VoiceEvent::CallStart).await;
    rig.until(|v| v.state == CallState::Active).await;

    rig.command(UiCommand::Stop).await;
    rig.event(VoiceEvent::CallEnd).await;
    rig.until(|v| v.state == CallState::Ended { confirmed: true }).await;

    tokio::time::sleep(Duration::from_secs(5)).await;
    let (_, seen_log, session) = rig.shutdown().await;
    assert_eq!(session.state, CallState::Ended { confirmed: true });
    assert!(!seen_log.iter().any(|l| l.contains("Force-ending")));
}

#[tokio::test]
async fn test_start_rejection_surfaces_reason() {
    let err = SdkError(json!({"error": {"error": {"message": {"code": "bad-key"}}}}));
    let mut rig = Rig::spawn(
        RecordingSdk::rejecting_start(err),
        TargetResolver::new("http://localhost:5678/webhook"),
    );

    rig.command(UiCommand::Start(Some(Mode::AfterHours))).await;
    let failed = rig
        .until(|v| matches!(v.state, CallState::Error { .. }))
        .await;
    assert_eq!(failed.status_text, "Connection Failed");
    assert_eq!(
        failed.state,
        CallState::Error {
            reason: r#"{"code":"bad-key"}"#.into()
        }
    );
    assert_eq!(failed.mode, Mode::AfterHours);

    let (sdk, _, _) = rig.shutdown().await;
    let commands = sdk.commands();
    let Some(SdkCommand::Start { target, .. }) = commands.first() else {
        panic!("expected a start command");
    };
    assert!(matches!(target, StartTarget::Assistant(cfg) if cfg.tool_names() == ["save_field", "route_claim"]));
}

#[tokio::test]
async fn test_provisioned_assistant_id_is_sent() {
    let resolver = TargetResolver::new("http://localhost:5678/webhook")
        .with_assistant_id(Mode::Business, "asst-business-1");
    let mut rig = Rig::spawn(RecordingSdk::new(), resolver);

    rig.command(UiCommand::Start(None)).await;
    rig.until(|v| v.state == CallState::Connecting).await;
    rig.event(VoiceEvent::CallStart).await;
    rig.until(|v| v.state == CallState::Active).await;

    let (sdk, _, _) = rig.shutdown().await;
    assert!(sdk.commands().contains(&SdkCommand::Start {
        v: Some(protocol::VERSION),
        target: StartTarget::AssistantId("asst-business-1".into()),
    }));
}
