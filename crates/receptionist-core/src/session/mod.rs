pub mod badges;
pub mod fields;
pub mod log;
pub mod stage;
pub mod state;
pub mod transcript;

pub use badges::{BadgeCategory, BadgeState, Badges, StatusBadge};
pub use fields::{CollectedField, CollectedFields, EXPECTED_FIELD_COUNT};
pub use log::{DiagnosticLog, LogLevel, LogLine, LOG_CAPACITY};
pub use stage::{Stage, StageMark, STAGE_ORDER};
pub use state::{CallState, SessionStateMachine};
pub use transcript::{Transcript, TranscriptEntry};
