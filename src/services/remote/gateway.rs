//! Relay Gateway
//!
//! Owns the relay components, performs the startup checks, spawns the
//! execution worker and processes inbound updates in receipt order.

use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use script_relay_core::{ChatAction, DispatchOutcome, ReplyOptions};

use super::adapters::RemoteAdapter;
use super::allow_list::AllowList;
use super::dispatcher::CommandDispatcher;
use super::execution_queue::{execution_queue, QueueReceiver, QueueSender};
use super::script_runner::ScriptRunner;
use super::session_registry::SessionRegistry;
use super::types::{IncomingUpdate, RemoteError, EXECUTION_QUEUE_CAPACITY};
use super::worker::{ExecutionWorker, ResourceLock};
use crate::models::settings::BotConfig;

/// Capacity of the adapter → gateway update channel.
const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// Relay gateway managing startup, the worker and update handling.
pub struct RelayGateway {
    pub(crate) config: BotConfig,
    pub(crate) adapter: Arc<dyn RemoteAdapter>,
    pub(crate) registry: Arc<SessionRegistry>,
    pub(crate) dispatcher: CommandDispatcher,
    pub(crate) queue: QueueSender,
    /// Taken by the first `spawn_worker` call
    pub(crate) queue_receiver: StdMutex<Option<QueueReceiver>>,
    pub(crate) resource_lock: ResourceLock,
    pub(crate) cancel_token: CancellationToken,
}

impl RelayGateway {
    /// Build every component from the configuration.
    pub fn new(config: BotConfig, adapter: Arc<dyn RemoteAdapter>) -> Self {
        let allow_list = Arc::new(AllowList::new(config.allowed_ids.iter().cloned()));
        if allow_list.is_empty() {
            warn!("allowed_ids is empty; every sender will be ignored");
        }
        let registry = Arc::new(SessionRegistry::from_allow_list(&allow_list));
        let dispatcher = CommandDispatcher::new(allow_list, &config.script_path);
        let (queue, receiver) = execution_queue(EXECUTION_QUEUE_CAPACITY);

        Self {
            config,
            adapter,
            registry,
            dispatcher,
            queue,
            queue_receiver: StdMutex::new(Some(receiver)),
            resource_lock: Arc::new(Mutex::new(())),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Token that stops the gateway and its worker when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Requests waiting in the execution queue.
    pub fn pending_executions(&self) -> usize {
        self.queue.pending()
    }

    /// Spawn the execution worker. Only the first call spawns anything.
    pub fn spawn_worker(&self) -> Option<JoinHandle<()>> {
        let receiver = self
            .queue_receiver
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())?;

        let worker = ExecutionWorker::new(
            self.adapter.clone(),
            ScriptRunner::new(&self.config.script_path),
            self.resource_lock.clone(),
            self.cancel_token.clone(),
        );
        Some(tokio::spawn(worker.run(receiver)))
    }

    /// Run the relay until the cancel token fires.
    ///
    /// Fails without starting anything if the bot credential cannot be
    /// verified or the webhook cannot be removed.
    pub async fn run(&self) -> Result<(), RemoteError> {
        let me = self.adapter.bot_info().await.map_err(|e| {
            RemoteError::StartupFailed(format!("Failed to get info of the bot: {}", e.detail()))
        })?;
        info!("Launching bot: @{} ({})", me.username, me.first_name);

        // Polling does not work while a webhook is set
        self.adapter.delete_webhook().await.map_err(|e| {
            RemoteError::StartupFailed(format!("Failed to delete webhook: {}", e.detail()))
        })?;

        let worker = self.spawn_worker();

        let (tx, mut rx) = mpsc::channel::<IncomingUpdate>(UPDATE_CHANNEL_CAPACITY);
        if let Err(e) = self
            .adapter
            .start(self.config.effective_monitor_interval(), tx)
            .await
        {
            error!("Failed to start adapter: {}", e);
            self.cancel_token.cancel();
            Self::join_worker(worker).await;
            return Err(e);
        }

        loop {
            tokio::select! {
                update = rx.recv() => match update {
                    Some(update) => {
                        self.handle_update(update).await;
                    }
                    None => {
                        warn!("Update stream closed");
                        break;
                    }
                },
                _ = self.cancel_token.cancelled() => {
                    break;
                }
            }
        }

        info!("Stopping relay gateway");
        self.cancel_token.cancel();
        if let Err(e) = self.adapter.stop().await {
            warn!("Failed to stop adapter: {}", e);
        }
        Self::join_worker(worker).await;
        Ok(())
    }

    async fn join_worker(worker: Option<JoinHandle<()>>) {
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!("Execution worker panicked: {}", e);
            }
        }
    }

    /// Handle an incoming update.
    ///
    /// The registry lock is held from the dispatch decision until the reply
    /// has been sent or the request queued. Returns true when a reply was
    /// sent or a request was queued.
    pub async fn handle_update(&self, update: IncomingUpdate) -> bool {
        let Some(identity) = update.sender.as_ref() else {
            warn!(name = %update.sender_name, "Not allowed (no user name)");
            return false;
        };

        let text = update.text.as_deref().unwrap_or_default();

        let mut sessions = self.registry.lock().await;
        let outcome = self
            .dispatcher
            .dispatch(&mut sessions, identity, update.chat, text)
            .await;
        debug!(identity = %identity, outcome = outcome.kind(), "Dispatched update");

        let handled = match outcome {
            DispatchOutcome::Drop => false,
            DispatchOutcome::ReplyWith(message) => {
                if let Err(e) = self.adapter.send_action(update.chat, ChatAction::Typing).await {
                    debug!(chat_id = %update.chat, "Failed to send typing indicator: {}", e);
                }
                match self
                    .adapter
                    .send_text(update.chat, &message, &ReplyOptions::standard())
                    .await
                {
                    Ok(()) => true,
                    Err(e) => {
                        error!(chat_id = %update.chat, "Failed to send message: {}", e);
                        false
                    }
                }
            }
            DispatchOutcome::Enqueue(request) => match self.queue.push(request).await {
                Ok(()) => {
                    info!(identity = %identity, pending = self.queue.pending(), "Queued execution request");
                    true
                }
                Err(e) => {
                    error!(identity = %identity, "Failed to queue execution request: {}", e);
                    false
                }
            },
        };
        drop(sessions);

        handled
    }
}
