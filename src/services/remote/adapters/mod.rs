//! Remote Adapters
//!
//! Trait definition for messaging platform adapters.
//! Each adapter implements platform-specific update receiving and sending.

pub mod telegram;

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use script_relay_core::{ChatAction, ChatTarget, ReplyOptions};

use super::types::{BotInfo, IncomingUpdate, RemoteError};

/// Remote adapter trait for platform-specific message handling.
///
/// Adapters are responsible for:
/// - Verifying the bot credential and clearing webhooks at startup
/// - Receiving updates (long-polling) and forwarding them in receipt order
/// - Sending text, photo and video replies with reply options attached
/// - Sending activity indicators
#[async_trait]
pub trait RemoteAdapter: Send + Sync {
    /// Fetch the bot's own account info (verifies the credential).
    async fn bot_info(&self) -> Result<BotInfo, RemoteError>;

    /// Remove any webhook so polling can receive updates.
    async fn delete_webhook(&self) -> Result<(), RemoteError>;

    /// Start receiving updates.
    ///
    /// Updates are forwarded through `update_tx`. The adapter spawns its
    /// own task for the polling loop.
    async fn start(
        &self,
        poll_interval: Duration,
        update_tx: mpsc::Sender<IncomingUpdate>,
    ) -> Result<(), RemoteError>;

    /// Stop receiving updates.
    async fn stop(&self) -> Result<(), RemoteError>;

    /// Send a text reply.
    ///
    /// Must handle platform message length limits.
    async fn send_text(
        &self,
        target: ChatTarget,
        text: &str,
        options: &ReplyOptions,
    ) -> Result<(), RemoteError>;

    /// Upload an image as a photo.
    async fn send_photo(
        &self,
        target: ChatTarget,
        bytes: Vec<u8>,
        mime: &str,
        options: &ReplyOptions,
    ) -> Result<(), RemoteError>;

    /// Upload a video.
    async fn send_video(
        &self,
        target: ChatTarget,
        bytes: Vec<u8>,
        mime: &str,
        options: &ReplyOptions,
    ) -> Result<(), RemoteError>;

    /// Show an activity indicator such as "typing...".
    async fn send_action(&self, target: ChatTarget, action: ChatAction)
        -> Result<(), RemoteError>;
}
