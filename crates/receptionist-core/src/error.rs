use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid call state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("unknown call mode: {0}")]
    UnknownMode(String),
}
