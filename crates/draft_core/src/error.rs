use shared::domain::DocumentKeyError;
use thiserror::Error;

use crate::session::{Action, SessionState};

#[derive(Debug, Error)]
pub enum DraftError {
    /// Non-success status. The body is surfaced verbatim.
    #[error("{body}")]
    Remote { status: u16, body: String },
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

/// An action the session refused before touching any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("{action} is not allowed while the session is {state}")]
    NotAllowed { action: Action, state: SessionState },
    #[error("{action} is disabled for this panel")]
    CapabilityDisabled { action: Action },
    #[error("session is busy with {in_flight}")]
    Busy { in_flight: Action },
    #[error("session is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum MountError {
    #[error("cannot mount draft panel: {0}")]
    DocumentKey(#[from] DocumentKeyError),
}
