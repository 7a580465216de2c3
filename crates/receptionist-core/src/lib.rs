pub mod assistant;
pub mod audio;
pub mod classifier;
pub mod controller;
pub mod error;
pub mod ports;
pub mod reducer;
pub mod session;
pub mod view;

pub use assistant::{Mode, TargetResolver};
pub use controller::{CallController, UiCommand, DEFAULT_STOP_TIMEOUT};
pub use error::CoreError;
pub use reducer::{reduce, CallSession, Effect, Input, Speaker, Transition};
pub use session::CallState;
pub use view::CallView;

// Simple in-crate mocks for demo/testing
pub mod mocks {
    use crate::ports::{PresenterPort, VoiceSdkPort};
    use crate::view::CallView;
    use anyhow::Result;
    use async_trait::async_trait;
    use protocol::{SdkCommand, SdkError, StartTarget};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Records every command; optionally rejects `start`.
    #[derive(Default)]
    pub struct RecordingSdk {
        commands: Mutex<Vec<SdkCommand>>,
        start_error: Mutex<Option<SdkError>>,
    }

    impl RecordingSdk {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn rejecting_start(err: SdkError) -> Self {
            Self {
                commands: Mutex::new(Vec::new()),
                start_error: Mutex::new(Some(err)),
            }
        }

        pub fn commands(&self) -> Vec<SdkCommand> {
            self.commands.lock().unwrap().clone()
        }

        pub fn count(&self, pred: impl Fn(&SdkCommand) -> bool) -> usize {
            self.commands.lock().unwrap().iter().filter(|c| pred(c)).count()
        }

        fn record(&self, cmd: SdkCommand) {
            self.commands.lock().unwrap().push(cmd);
        }
    }

    #[async_trait]
    impl VoiceSdkPort for RecordingSdk {
        async fn start(&self, target: StartTarget) -> Result<(), SdkError> {
            self.record(SdkCommand::start(target));
            match self.start_error.lock().unwrap().clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        async fn stop(&self) -> Result<(), SdkError> {
            self.record(SdkCommand::Stop);
            Ok(())
        }

        async fn set_muted(&self, muted: bool) -> Result<(), SdkError> {
            self.record(SdkCommand::SetMuted { muted });
            Ok(())
        }
    }

    #[derive(Clone)]
    pub struct ChannelPresenter(pub mpsc::Sender<CallView>);

    #[async_trait]
    impl PresenterPort for ChannelPresenter {
        async fn render(&self, view: &CallView) -> Result<()> {
            self.0.send(view.clone()).await.map_err(|e| anyhow::anyhow!(e.to_string()))
        }
    }
}
