//! Script Relay Core
//!
//! Domain types shared by the relay service. This crate performs no I/O and
//! depends on nothing in the workspace.
//!
//! ## Module Organization
//!
//! - `session` - Sender identities and per-identity session state
//! - `messaging` - Reply targets, keyboards, options and chat actions
//! - `execution` - Queued execution requests and dispatch outcomes

pub mod execution;
pub mod messaging;
pub mod session;

// ── Sessions ───────────────────────────────────────────────────────────
pub use session::{Identity, Session, SessionState};

// ── Messaging ──────────────────────────────────────────────────────────
pub use messaging::{
    ChatAction, ChatTarget, ReplyKeyboard, ReplyOptions, COMMAND_EXECUTE, COMMAND_SHOW_CODE,
};

// ── Execution ──────────────────────────────────────────────────────────
pub use execution::{DispatchOutcome, ExecutionRequest};
