use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallState {
    Idle,
    Connecting,
    Active,
    /// `confirmed` is false when the local stop timeout forced the end and the
    /// SDK has not (yet) reported the call as over.
    Ended { confirmed: bool },
    Error { reason: String },
}

impl CallState {
    pub fn is_active(&self) -> bool {
        matches!(self, CallState::Active)
    }

    /// A new call may be started from here.
    pub fn is_startable(&self) -> bool {
        matches!(self, CallState::Idle | CallState::Ended { .. } | CallState::Error { .. })
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, CallState::Connecting | CallState::Active)
    }

    fn name(&self) -> &'static str {
        match self {
            CallState::Idle => "Idle",
            CallState::Connecting => "Connecting",
            CallState::Active => "Active",
            CallState::Ended { .. } => "Ended",
            CallState::Error { .. } => "Error",
        }
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallState::Ended { confirmed: false } => write!(f, "Ended (assumed)"),
            CallState::Error { reason } => write!(f, "Error: {}", reason),
            other => write!(f, "{}", other.name()),
        }
    }
}

pub struct SessionStateMachine {
    current_state: CallState,
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self {
            current_state: CallState::Idle,
        }
    }

    pub fn from_state(state: CallState) -> Self {
        Self { current_state: state }
    }

    pub fn current_state(&self) -> &CallState {
        &self.current_state
    }

    pub fn into_state(self) -> CallState {
        self.current_state
    }

    pub fn can_transition_to(&self, new_state: &CallState) -> bool {
        use CallState::*;
        match (&self.current_state, new_state) {
            (Idle | Ended { .. } | Error { .. }, Connecting) => true,
            (Idle | Connecting, Active) => true,
            (Connecting, Error { .. }) => true,
            (Ended { confirmed: false }, Ended { confirmed: true }) => true,
            (Ended { .. }, Ended { .. }) => false,
            (_, Ended { .. }) => true,
            (Ended { .. } | Error { .. }, Idle) => true,
            _ => false,
        }
    }

    pub fn transition_to(&mut self, new_state: CallState) -> Result<(), CoreError> {
        if self.can_transition_to(&new_state) {
            self.current_state = new_state;
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            })
        }
    }

    pub fn connect(&mut self) -> Result<(), CoreError> {
        self.transition_to(CallState::Connecting)
    }

    pub fn activate(&mut self) -> Result<(), CoreError> {
        self.transition_to(CallState::Active)
    }

    pub fn end(&mut self, confirmed: bool) -> Result<(), CoreError> {
        self.transition_to(CallState::Ended { confirmed })
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), CoreError> {
        self.transition_to(CallState::Error { reason: reason.into() })
    }

    pub fn reset(&mut self) -> Result<(), CoreError> {
        self.transition_to(CallState::Idle)
    }
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
