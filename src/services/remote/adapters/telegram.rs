//! Telegram Adapter
//!
//! Telegram Bot adapter using teloxide for long-polling update reception.
//! Implements the RemoteAdapter trait with reply keyboards, in-memory media
//! uploads, and message splitting for Telegram's 4096 character limit.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use script_relay_core::{ChatAction, ChatTarget, ReplyOptions};

use super::RemoteAdapter;
use crate::services::remote::types::{BotInfo, IncomingUpdate, RemoteError, TelegramAdapterConfig};

/// Telegram Bot adapter using teloxide with long-polling.
pub struct TelegramAdapter {
    pub(crate) config: TelegramAdapterConfig,
    pub(crate) bot: teloxide::Bot,
    pub(crate) cancel_token: CancellationToken,
}

impl TelegramAdapter {
    /// Create a new Telegram adapter.
    pub fn new(config: TelegramAdapterConfig) -> Result<Self, RemoteError> {
        let bot_token = config
            .bot_token
            .as_ref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| RemoteError::ConfigError("Bot token is required".to_string()))?;

        let bot = teloxide::Bot::new(bot_token);

        Ok(Self {
            config,
            bot,
            cancel_token: CancellationToken::new(),
        })
    }
}

/// Split long messages at line boundaries to respect platform limits.
///
/// Lines longer than `max_len` bytes are cut at the nearest UTF-8 character
/// boundary.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if current.len() + line.len() + 1 > max_len {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            if line.len() > max_len {
                chunks.extend(split_line(line, max_len));
                continue;
            }
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn split_line(line: &str, max_len: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;
    while start < line.len() {
        let mut end = std::cmp::min(start + max_len, line.len());
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            // max_len smaller than one character: emit the character whole
            end = start + 1;
            while !line.is_char_boundary(end) {
                end += 1;
            }
        }
        pieces.push(line[start..end].to_string());
        start = end;
    }
    pieces
}

/// Render reply options as a Telegram reply keyboard.
fn keyboard_markup(options: &ReplyOptions) -> Option<teloxide::types::KeyboardMarkup> {
    use teloxide::types::{KeyboardButton, KeyboardMarkup};

    options.keyboard.as_ref().map(|keyboard| {
        let rows: Vec<Vec<KeyboardButton>> = keyboard
            .rows
            .iter()
            .map(|row| row.iter().map(KeyboardButton::new).collect())
            .collect();
        let markup = KeyboardMarkup::new(rows);
        if keyboard.resize {
            markup.resize_keyboard()
        } else {
            markup
        }
    })
}

/// Upload file name derived from the sniffed MIME type.
fn upload_file_name(mime: &str) -> String {
    let extension = match mime {
        "image/jpeg" => "jpg",
        "image/x-icon" => "ico",
        other => other.rsplit('/').next().unwrap_or("bin"),
    };
    format!("output.{}", extension)
}

#[async_trait]
impl RemoteAdapter for TelegramAdapter {
    async fn bot_info(&self) -> Result<BotInfo, RemoteError> {
        use teloxide::prelude::*;

        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| RemoteError::ConfigError(e.to_string()))?;
        Ok(BotInfo {
            username: me.user.username.clone().unwrap_or_default(),
            first_name: me.user.first_name.clone(),
        })
    }

    async fn delete_webhook(&self) -> Result<(), RemoteError> {
        use teloxide::prelude::*;

        self.bot
            .delete_webhook()
            .await
            .map_err(|e| RemoteError::SendFailed(e.to_string()))?;
        Ok(())
    }

    async fn start(
        &self,
        poll_interval: Duration,
        update_tx: mpsc::Sender<IncomingUpdate>,
    ) -> Result<(), RemoteError> {
        use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
        use teloxide::error_handlers::LoggingErrorHandler;
        use teloxide::types::{Message, Update};
        use teloxide::update_listeners::Polling;

        let bot = self.bot.clone();
        let cancel = self.cancel_token.clone();

        tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |msg: Message| {
                let tx = update_tx.clone();
                async move {
                    let sender = msg.from.as_ref();
                    let incoming = IncomingUpdate {
                        chat: ChatTarget(msg.chat.id.0),
                        sender: sender.and_then(|u| u.username.clone()).map(Into::into),
                        sender_name: sender.map(|u| u.first_name.clone()).unwrap_or_default(),
                        text: msg.text().map(str::to_string),
                        received_at: chrono::Utc::now(),
                    };
                    if tx.send(incoming).await.is_err() {
                        tracing::warn!("Update channel closed, dropping update");
                    }
                    Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
                }
            });

            let listener = Polling::builder(bot.clone()).timeout(poll_interval).build();

            let mut dispatcher = Dispatcher::builder(bot, handler).build();

            // Get shutdown token for graceful termination
            let shutdown_token = dispatcher.shutdown_token();

            let cancel_clone = cancel.clone();
            tokio::spawn(async move {
                cancel_clone.cancelled().await;
                let _ = shutdown_token.shutdown();
            });

            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("Error while receiving update"),
                )
                .await;
        });

        Ok(())
    }

    async fn stop(&self) -> Result<(), RemoteError> {
        self.cancel_token.cancel();
        Ok(())
    }

    async fn send_text(
        &self,
        target: ChatTarget,
        text: &str,
        options: &ReplyOptions,
    ) -> Result<(), RemoteError> {
        use teloxide::payloads::SendMessageSetters;
        use teloxide::prelude::*;

        for chunk in split_message(text, self.config.max_message_length) {
            let mut request = self.bot.send_message(ChatId(target.0), chunk);
            if let Some(markup) = keyboard_markup(options) {
                request = request.reply_markup(markup);
            }
            request
                .await
                .map_err(|e| RemoteError::SendFailed(e.to_string()))?;
        }
        Ok(())
    }

    async fn send_photo(
        &self,
        target: ChatTarget,
        bytes: Vec<u8>,
        mime: &str,
        options: &ReplyOptions,
    ) -> Result<(), RemoteError> {
        use teloxide::payloads::SendPhotoSetters;
        use teloxide::prelude::*;
        use teloxide::types::InputFile;

        let file = InputFile::memory(bytes).file_name(upload_file_name(mime));
        let mut request = self.bot.send_photo(ChatId(target.0), file);
        if let Some(markup) = keyboard_markup(options) {
            request = request.reply_markup(markup);
        }
        request
            .await
            .map_err(|e| RemoteError::SendFailed(e.to_string()))?;
        Ok(())
    }

    async fn send_video(
        &self,
        target: ChatTarget,
        bytes: Vec<u8>,
        mime: &str,
        options: &ReplyOptions,
    ) -> Result<(), RemoteError> {
        use teloxide::payloads::SendVideoSetters;
        use teloxide::prelude::*;
        use teloxide::types::InputFile;

        let file = InputFile::memory(bytes).file_name(upload_file_name(mime));
        let mut request = self.bot.send_video(ChatId(target.0), file);
        if let Some(markup) = keyboard_markup(options) {
            request = request.reply_markup(markup);
        }
        request
            .await
            .map_err(|e| RemoteError::SendFailed(e.to_string()))?;
        Ok(())
    }

    async fn send_action(
        &self,
        target: ChatTarget,
        action: ChatAction,
    ) -> Result<(), RemoteError> {
        use teloxide::prelude::*;
        use teloxide::types::ChatAction as TelegramChatAction;

        let action = match action {
            ChatAction::Typing => TelegramChatAction::Typing,
            ChatAction::UploadPhoto => TelegramChatAction::UploadPhoto,
            ChatAction::UploadVideo => TelegramChatAction::UploadVideo,
        };
        self.bot
            .send_chat_action(ChatId(target.0), action)
            .await
            .map_err(|e| RemoteError::SendFailed(e.to_string()))?;
        Ok(())
    }
}
