//! Messaging Types
//!
//! Platform-neutral descriptions of where a reply goes and what it carries
//! besides its body. Adapters translate these into platform requests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Command that queues a script run.
pub const COMMAND_EXECUTE: &str = "/execute";

/// Command that returns the script source.
pub const COMMAND_SHOW_CODE: &str = "/showcode";

/// Chat a reply is addressed to (Telegram chat id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatTarget(pub i64);

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reply keyboard: rows of button labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
    /// Ask the client to shrink the keyboard to fit its buttons
    pub resize: bool,
}

impl ReplyKeyboard {
    /// The command keyboard re-attached to every reply.
    pub fn standard() -> Self {
        Self {
            rows: vec![
                vec![COMMAND_EXECUTE.to_string()],
                vec![COMMAND_SHOW_CODE.to_string()],
            ],
            resize: true,
        }
    }
}

/// Options sent along with a reply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReplyOptions {
    pub keyboard: Option<ReplyKeyboard>,
}

impl ReplyOptions {
    /// Options carrying the standard command keyboard.
    pub fn standard() -> Self {
        Self {
            keyboard: Some(ReplyKeyboard::standard()),
        }
    }
}

/// Transient activity indicator shown to the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatAction {
    Typing,
    UploadPhoto,
    UploadVideo,
}

impl fmt::Display for ChatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatAction::Typing => write!(f, "typing"),
            ChatAction::UploadPhoto => write!(f, "upload_photo"),
            ChatAction::UploadVideo => write!(f, "upload_video"),
        }
    }
}
