//! Identities and Sessions
//!
//! An `Identity` is the sender handle reported by the messaging platform.
//! A `Session` pairs an identity with its conversation state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sender handle as reported by the platform (e.g. a Telegram username).
///
/// Compared by exact string match; no case folding or `@` stripping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(handle: &str) -> Self {
        Self::new(handle)
    }
}

impl From<String> for Identity {
    fn from(handle: String) -> Self {
        Self(handle)
    }
}

/// Conversation state of a session.
///
/// Only `Waiting` exists today; the dispatcher still matches on it so new
/// states slot in without restructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Idle, waiting for the next command
    #[default]
    Waiting,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Waiting => write!(f, "waiting"),
        }
    }
}

/// Per-identity conversation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub state: SessionState,
}

impl Session {
    /// Create a session in the initial `Waiting` state.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            state: SessionState::Waiting,
        }
    }
}
