//! Command Dispatcher
//!
//! Turns one (sender, text) pair into a `DispatchOutcome`. Performs no
//! network I/O: the caller sends replies and pushes requests. The caller
//! must hold the session registry lock and pass the locked map in.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, warn};

use script_relay_core::{
    ChatTarget, DispatchOutcome, ExecutionRequest, Identity, ReplyOptions, SessionState,
};

use super::allow_list::AllowList;
use super::command_router::{CommandRouter, RemoteCommand};
use super::response_mapper::ResponseMapper;
use super::session_registry::SessionMap;
use super::types::MESSAGE_DEFAULT;

/// Decides how to answer each inbound command.
pub struct CommandDispatcher {
    allow_list: Arc<AllowList>,
    script_path: PathBuf,
}

impl CommandDispatcher {
    pub fn new(allow_list: Arc<AllowList>, script_path: impl AsRef<Path>) -> Self {
        Self {
            allow_list,
            script_path: script_path.as_ref().to_path_buf(),
        }
    }

    /// Dispatch one command.
    ///
    /// Unknown senders and senders without a session are dropped silently
    /// (logged only).
    pub async fn dispatch(
        &self,
        sessions: &mut SessionMap,
        identity: &Identity,
        chat: ChatTarget,
        text: &str,
    ) -> DispatchOutcome {
        if !self.allow_list.is_available(identity) {
            warn!(identity = %identity, "Id not allowed");
            return DispatchOutcome::Drop;
        }

        let Some(session) = sessions.get_mut(identity) else {
            error!(identity = %identity, "Session does not exist for allowed id");
            return DispatchOutcome::Drop;
        };

        match session.state {
            SessionState::Waiting => {
                let command = CommandRouter::parse(text);
                debug!(
                    identity = %identity,
                    command = CommandRouter::command_type_name(&command),
                    "Dispatching command"
                );
                match command {
                    RemoteCommand::Start => DispatchOutcome::ReplyWith(MESSAGE_DEFAULT.to_string()),
                    RemoteCommand::Execute => DispatchOutcome::Enqueue(ExecutionRequest::new(
                        chat,
                        ReplyOptions::standard(),
                    )),
                    RemoteCommand::ShowCode => DispatchOutcome::ReplyWith(self.read_code().await),
                    RemoteCommand::Unknown { text } => {
                        DispatchOutcome::ReplyWith(ResponseMapper::format_unknown_command(&text))
                    }
                }
            }
        }
    }

    /// Script source, or an `Error: ...` line when it cannot be read.
    async fn read_code(&self) -> String {
        match tokio::fs::read(&self.script_path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!(path = %self.script_path.display(), "Failed to read script: {}", e);
                ResponseMapper::format_read_error(&e)
            }
        }
    }
}
