//! Execution Queue
//!
//! Bounded FIFO between dispatch and the worker. `push` waits while the queue
//! is full, which stalls update handling until the worker catches up.

use tokio::sync::mpsc;

use script_relay_core::ExecutionRequest;

use super::types::RemoteError;

/// Create a queue holding at most `capacity` pending requests.
pub fn execution_queue(capacity: usize) -> (QueueSender, QueueReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (QueueSender { tx }, QueueReceiver { rx })
}

/// Producer half, cloned into every dispatch path.
#[derive(Debug, Clone)]
pub struct QueueSender {
    tx: mpsc::Sender<ExecutionRequest>,
}

impl QueueSender {
    /// Enqueue a request, waiting for a free slot.
    pub async fn push(&self, request: ExecutionRequest) -> Result<(), RemoteError> {
        self.tx
            .send(request)
            .await
            .map_err(|_| RemoteError::QueueClosed)
    }

    /// Number of requests waiting to be popped.
    pub fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// Consumer half, owned by the single worker.
#[derive(Debug)]
pub struct QueueReceiver {
    rx: mpsc::Receiver<ExecutionRequest>,
}

impl QueueReceiver {
    /// Wait for the next request; `None` once every sender is gone.
    pub async fn pop(&mut self) -> Option<ExecutionRequest> {
        self.rx.recv().await
    }
}
