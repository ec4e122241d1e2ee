//! Execution Requests and Dispatch Outcomes

use crate::messaging::{ChatTarget, ReplyOptions};

/// One queued `/execute` invocation waiting for the shared resource.
///
/// Immutable once built; consumed exactly once by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub recipient: ChatTarget,
    pub reply_options: ReplyOptions,
}

impl ExecutionRequest {
    pub fn new(recipient: ChatTarget, reply_options: ReplyOptions) -> Self {
        Self {
            recipient,
            reply_options,
        }
    }
}

/// What the caller should do with an inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Send this text back immediately
    ReplyWith(String),
    /// Push this request onto the execution queue
    Enqueue(ExecutionRequest),
    /// Do nothing (unauthorized sender or missing session)
    Drop,
}

impl DispatchOutcome {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchOutcome::ReplyWith(_) => "reply",
            DispatchOutcome::Enqueue(_) => "enqueue",
            DispatchOutcome::Drop => "drop",
        }
    }
}
