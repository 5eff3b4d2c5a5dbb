//! Single-batch, closable, multi-consumer URL queue.
//!
//! The producer side ([`WorkQueue`]) is held by the batch orchestrator; each
//! worker holds a clone of the consumer side ([`QueueConsumer`]). Closing the
//! queue is the only termination signal workers observe: once closed and
//! drained, [`QueueConsumer::next`] returns `None`.

use async_channel::{Receiver, Sender};

use crate::error::AppError;

/// Producer handle of the work queue.
#[derive(Debug)]
pub struct WorkQueue {
    tx: Sender<String>,
}

/// Consumer handle of the work queue. Cheap to clone, one per worker.
#[derive(Debug, Clone)]
pub struct QueueConsumer {
    rx: Receiver<String>,
}

impl WorkQueue {
    /// Create a queue holding at most `capacity` pending URLs.
    ///
    /// `push` waits while the queue is full, so the producer never runs
    /// further ahead of the workers than `capacity` items.
    pub fn bounded(capacity: usize) -> (Self, QueueConsumer) {
        let (tx, rx) = async_channel::bounded(capacity.max(1));
        (Self { tx }, QueueConsumer { rx })
    }

    /// Enqueue one URL, waiting for room if the queue is full.
    ///
    /// Fails with [`AppError::QueueClosed`] if the queue was closed or every
    /// consumer is gone.
    pub async fn push(&self, url: String) -> Result<(), AppError> {
        self.tx.send(url).await.map_err(|_| AppError::QueueClosed)
    }

    /// Close the queue. Items already enqueued can still be consumed.
    ///
    /// Returns `false` if it was already closed.
    pub fn close(&self) -> bool {
        self.tx.close()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Number of URLs waiting to be consumed.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

impl QueueConsumer {
    /// Take the next URL, waiting while the queue is empty but open.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn next(&self) -> Option<String> {
        self.rx.recv().await.ok()
    }
}
