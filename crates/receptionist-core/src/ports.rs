use anyhow::Result;
use async_trait::async_trait;
use protocol::{SdkError, StartTarget};

use crate::view::CallView;

/// Imperative side of the hosted voice SDK. Events flow back separately as a
/// stream of `protocol::VoiceEvent`.
#[async_trait]
pub trait VoiceSdkPort: Send + Sync {
    async fn start(&self, target: StartTarget) -> Result<(), SdkError>;
    async fn stop(&self) -> Result<(), SdkError>;
    async fn set_muted(&self, muted: bool) -> Result<(), SdkError>;
}

#[async_trait]
pub trait PresenterPort: Send + Sync {
    async fn render(&self, view: &CallView) -> Result<()>;
}
