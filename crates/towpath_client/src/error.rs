//! Client error taxonomy
//!
//! Three classes matter to callers: no session (don't even try), rejected
//! credentials (treat as logged out), and transient transport/server trouble
//! (leave state alone, the next tick may succeed).

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No token in the session store; the request was never sent.
    #[error("not authenticated")]
    NoSession,

    /// The backend rejected the token (401). Callers treat this as
    /// "no session": clear markers, stop polling.
    #[error("authentication rejected")]
    Unauthorized,

    /// Non-success response other than 401.
    #[error("api error {status}: {detail}")]
    Api { status: u16, detail: String },

    /// Network-level failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Whether retrying later without any state change is the right move.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Api { status, .. } => *status >= 500,
            ClientError::NoSession | ClientError::Unauthorized => false,
        }
    }
}

/// FastAPI-style error payload: `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}
