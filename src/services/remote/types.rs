//! Remote Relay Types
//!
//! Inbound update shape, adapter configuration, user-visible message texts
//! and error types for the relay.

use serde::{Deserialize, Serialize};

use script_relay_core::{ChatTarget, Identity};

// ---------------------------------------------------------------------------
// Commands & Messages
// ---------------------------------------------------------------------------

/// Command that greets the sender
pub const COMMAND_START: &str = "/start";

/// Greeting sent in reply to /start
pub const MESSAGE_DEFAULT: &str = "Input your command:";

/// Reply to anything that is not a command
pub const MESSAGE_UNKNOWN_COMMAND: &str = "Unknown command.";

/// Maximum number of queued execution requests
pub const EXECUTION_QUEUE_CAPACITY: usize = 4;

// ---------------------------------------------------------------------------
// Adapter Configuration
// ---------------------------------------------------------------------------

/// Telegram-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramAdapterConfig {
    #[serde(skip_serializing, default)]
    pub bot_token: Option<String>,
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

fn default_max_message_length() -> usize {
    4000
}

impl Default for TelegramAdapterConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            max_message_length: default_max_message_length(),
        }
    }
}

/// Identity of the bot account, as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotInfo {
    pub username: String,
    pub first_name: String,
}

// ---------------------------------------------------------------------------
// Message Types
// ---------------------------------------------------------------------------

/// Incoming message from the remote platform
#[derive(Debug, Clone)]
pub struct IncomingUpdate {
    pub chat: ChatTarget,
    /// Sender handle; `None` when the sender has no username
    pub sender: Option<Identity>,
    /// Human-readable sender name, for logs only
    pub sender_name: String,
    /// Message text; `None` for non-text messages
    pub text: Option<String>,
    pub received_at: chrono::DateTime<chrono::Utc>,
}

impl IncomingUpdate {
    /// Build a text update received now.
    pub fn text(chat: ChatTarget, sender: Option<Identity>, text: impl Into<String>) -> Self {
        let sender_name = sender.as_ref().map(|s| s.to_string()).unwrap_or_default();
        Self {
            chat,
            sender,
            sender_name,
            text: Some(text.into()),
            received_at: chrono::Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error Types
// ---------------------------------------------------------------------------

/// Remote relay error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    #[error("Failed to send message: {0}")]
    SendFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Startup failed: {0}")]
    StartupFailed(String),

    #[error("Execution queue is closed")]
    QueueClosed,
}

impl RemoteError {
    /// Error text without the category prefix.
    pub fn detail(&self) -> String {
        match self {
            RemoteError::SendFailed(detail)
            | RemoteError::ConfigError(detail)
            | RemoteError::StartupFailed(detail) => detail.clone(),
            other => other.to_string(),
        }
    }
}
