//! Message queue between the read pump and the dispatch loop.
//!
//! A bounded FIFO by default. The pump is the only producer; dropping
//! its [`QueuePusher`] is what closes the queue, after which the
//! dispatch loop drains what is buffered and returns.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use slircx_proto::Message;

/// Policy applied when a message arrives and the queue is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum Backpressure {
    /// Wait for space. This stalls the read pump, which throttles the
    /// server but can trip the idle deadline and force a reconnect
    /// under sustained handler slowness.
    #[default]
    Block,
    /// Drop the newly arrived message.
    DropNewest,
    /// Never block or drop; the queue grows without bound.
    Unbounded,
}

/// Create a queue with the given capacity and overflow policy.
pub(crate) fn channel(capacity: usize, policy: Backpressure) -> (QueuePusher, QueueReceiver) {
    if policy == Backpressure::Unbounded {
        let (tx, rx) = mpsc::unbounded_channel();
        return (QueuePusher::Unbounded(tx), QueueReceiver::Unbounded(rx));
    }
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        QueuePusher::Bounded { tx, policy },
        QueueReceiver::Bounded(rx),
    )
}

/// Producer side, held by the read pump.
pub(crate) enum QueuePusher {
    Bounded {
        tx: mpsc::Sender<Message>,
        policy: Backpressure,
    },
    Unbounded(mpsc::UnboundedSender<Message>),
}

impl QueuePusher {
    /// Enqueue one message per the overflow policy. Returns false once
    /// the consumer side is gone.
    pub(crate) async fn push(&self, message: Message) -> bool {
        match self {
            Self::Bounded {
                tx,
                policy: Backpressure::DropNewest,
            } => match tx.try_send(message) {
                Ok(()) => true,
                Err(TrySendError::Full(message)) => {
                    debug!(raw = %message, "queue full, dropping message");
                    true
                }
                Err(TrySendError::Closed(_)) => false,
            },
            Self::Bounded { tx, .. } => tx.send(message).await.is_ok(),
            Self::Unbounded(tx) => tx.send(message).is_ok(),
        }
    }
}

/// Consumer side, drained by the dispatch loop.
pub(crate) enum QueueReceiver {
    Bounded(mpsc::Receiver<Message>),
    Unbounded(mpsc::UnboundedReceiver<Message>),
}

impl QueueReceiver {
    /// Next message, or `None` once the queue is closed and drained.
    pub(crate) async fn recv(&mut self) -> Option<Message> {
        match self {
            Self::Bounded(rx) => rx.recv().await,
            Self::Unbounded(rx) => rx.recv().await,
        }
    }
}
