//! Write capability handed to handlers.

use std::sync::Arc;

use futures_util::SinkExt;
use tokio::sync::Mutex;
use tracing::debug;

use slircx_proto::{Message, MessageWriter};

use crate::error::{ClientError, Result};

/// Slot holding the write half of the current transport.
///
/// A fresh slot is published on every (re)connect and the old one is
/// emptied, so senders obtained before the swap fail cleanly instead of
/// writing into a dead socket.
pub(crate) type WriterSlot = Mutex<Option<MessageWriter>>;

/// Cheap-to-clone handle for writing messages to the server.
///
/// A sender is bound to the transport that was live when it was
/// obtained. After a reconnect it is stale: [`send`](Sender::send)
/// returns [`ClientError::NotConnected`] and a fresh handle must be
/// fetched from the client.
#[derive(Clone)]
pub struct Sender {
    slot: Arc<WriterSlot>,
}

impl Sender {
    pub(crate) fn new(slot: Arc<WriterSlot>) -> Self {
        Self { slot }
    }

    /// Encode and write one message, flushing it to the socket.
    ///
    /// No buffering, no retry. An error means the message did not go
    /// out; handlers may ignore it, since the read pump detects a dead
    /// transport on its own.
    pub async fn send(&self, message: &Message) -> Result<()> {
        let mut guard = self.slot.lock().await;
        let Some(writer) = guard.as_mut() else {
            return Err(ClientError::NotConnected);
        };
        debug!(raw = %message, "sending message");
        writer.send(message).await?;
        Ok(())
    }
}
