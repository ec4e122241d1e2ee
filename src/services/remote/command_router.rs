//! Command Router
//!
//! Classifies incoming text into a `RemoteCommand` by leading prefix.

use script_relay_core::{COMMAND_EXECUTE, COMMAND_SHOW_CODE};

use super::types::COMMAND_START;

/// Command parsed from a user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    /// /start - Show the greeting prompt
    Start,
    /// /execute - Run the script
    Execute,
    /// /showcode - Show the script source
    ShowCode,
    /// Anything else, including empty text
    Unknown { text: String },
}

/// Stateless command parser for remote messages.
pub struct CommandRouter;

impl CommandRouter {
    /// Parse message text into a RemoteCommand.
    ///
    /// Matching is a case-sensitive prefix test on the raw text, so
    /// `/start now` and `/executefoo` match while ` /start` does not.
    pub fn parse(text: &str) -> RemoteCommand {
        if text.starts_with(COMMAND_START) {
            RemoteCommand::Start
        } else if text.starts_with(COMMAND_EXECUTE) {
            RemoteCommand::Execute
        } else if text.starts_with(COMMAND_SHOW_CODE) {
            RemoteCommand::ShowCode
        } else {
            RemoteCommand::Unknown {
                text: text.to_string(),
            }
        }
    }

    /// Command type name for logging.
    pub fn command_type_name(command: &RemoteCommand) -> &'static str {
        match command {
            RemoteCommand::Start => "Start",
            RemoteCommand::Execute => "Execute",
            RemoteCommand::ShowCode => "ShowCode",
            RemoteCommand::Unknown { .. } => "Unknown",
        }
    }
}
