//! Execution Worker
//!
//! Drains the execution queue one request at a time. Each request runs the
//! script and delivers its output while holding the resource lock, so the
//! camera behind the script is never driven by two runs at once, however
//! many workers share the lock.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use script_relay_core::{ChatAction, ChatTarget, ExecutionRequest};

use super::adapters::RemoteAdapter;
use super::execution_queue::QueueReceiver;
use super::response_mapper::{ResponseKind, ResponseMapper};
use super::script_runner::ScriptRunner;

/// Lock serializing access to the script's physical resource.
pub type ResourceLock = Arc<Mutex<()>>;

/// What reached the recipient for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Photo,
    Video,
    Text,
    /// The script failed and its error text was sent
    ScriptError,
    /// A media upload failed and the failure text was sent instead
    MediaFallback,
    /// Every send attempt failed
    Undelivered,
}

/// Single consumer of the execution queue.
pub struct ExecutionWorker {
    adapter: Arc<dyn RemoteAdapter>,
    runner: ScriptRunner,
    resource_lock: ResourceLock,
    cancel: CancellationToken,
}

impl ExecutionWorker {
    pub fn new(
        adapter: Arc<dyn RemoteAdapter>,
        runner: ScriptRunner,
        resource_lock: ResourceLock,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            adapter,
            runner,
            resource_lock,
            cancel,
        }
    }

    /// Pop and process requests until the queue closes or the token fires.
    ///
    /// A request that has been popped is always processed to completion
    /// (unless its script is killed by cancellation).
    pub async fn run(self, mut queue: QueueReceiver) {
        loop {
            let request = tokio::select! {
                request = queue.pop() => request,
                _ = self.cancel.cancelled() => None,
            };
            let Some(request) = request else {
                break;
            };
            let delivery = self.process(request).await;
            debug!(?delivery, "Execution request finished");
        }
        info!("Execution worker stopped");
    }

    /// Run the script for one request and deliver the result.
    pub async fn process(&self, request: ExecutionRequest) -> Delivery {
        let _resource = self.resource_lock.lock().await;
        let target = request.recipient;
        let options = &request.reply_options;

        self.signal(target, ChatAction::Typing).await;

        let output = match self.runner.run(&self.cancel).await {
            Ok(output) => output,
            Err(failure) => {
                let message = ResponseMapper::format_script_error(&failure.error, &failure.output);
                error!(chat_id = %target, "{}", message);
                return match self.adapter.send_text(target, &message, options).await {
                    Ok(()) => Delivery::ScriptError,
                    Err(e) => {
                        error!(chat_id = %target, "Failed to send error message: {}", e);
                        Delivery::Undelivered
                    }
                };
            }
        };

        let kind = ResponseMapper::classify(&output);
        info!(chat_id = %target, bytes = output.len(), mime = kind.mime(), "Script finished");

        let sent = match kind {
            ResponseKind::Image(mime) => {
                self.signal(target, ChatAction::UploadPhoto).await;
                self.adapter.send_photo(target, output, mime, options).await
            }
            ResponseKind::Video(mime) => {
                self.signal(target, ChatAction::UploadVideo).await;
                self.adapter.send_video(target, output, mime, options).await
            }
            ResponseKind::Text => {
                let text = ResponseMapper::format_text_output(&output);
                return match self.adapter.send_text(target, &text, options).await {
                    Ok(()) => Delivery::Text,
                    Err(e) => {
                        error!(chat_id = %target, "Failed to send message: {}", e);
                        Delivery::Undelivered
                    }
                };
            }
        };

        match sent {
            Ok(()) if matches!(kind, ResponseKind::Image(_)) => Delivery::Photo,
            Ok(()) => Delivery::Video,
            Err(e) => {
                let message = ResponseMapper::format_media_failure(kind, &e.detail());
                warn!(chat_id = %target, "{}", message);
                match self.adapter.send_text(target, &message, options).await {
                    Ok(()) => Delivery::MediaFallback,
                    Err(e) => {
                        error!(chat_id = %target, "Failed to send error message: {}", e);
                        Delivery::Undelivered
                    }
                }
            }
        }
    }

    /// Best-effort activity indicator.
    async fn signal(&self, target: ChatTarget, action: ChatAction) {
        if let Err(e) = self.adapter.send_action(target, action).await {
            debug!(chat_id = %target, %action, "Failed to send chat action: {}", e);
        }
    }
}
