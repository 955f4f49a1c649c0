//! Message handlers and the registry that routes to them.
//!
//! Handlers come in two shapes: a reusable type implementing
//! [`Handler`], or a plain async closure registered through
//! [`Client::register_fn`](crate::Client::register_fn). The dispatch
//! loop treats both uniformly.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use thiserror::Error;

use slircx_proto::Message;

use crate::error::ClientError;
use crate::sender::Sender;

/// Errors that can occur inside a message handler.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HandlerError {
    /// A reply could not be written to the server.
    #[error("send failed: {0}")]
    Send(#[from] ClientError),
    /// Handler-specific failure, reported by message.
    #[error("{0}")]
    Other(String),
}

/// Result type for message handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Trait implemented by message handlers.
///
/// The sender passed in is the one live at dispatch time, so replies
/// reach the current transport even after a reconnect.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle one inbound message.
    async fn handle(&self, sender: Sender, message: Message) -> HandlerResult;
}

/// Adapter turning an async closure into a [`Handler`].
pub(crate) struct FnHandler {
    func: Box<dyn Fn(Sender, Message) -> BoxFuture<'static, HandlerResult> + Send + Sync>,
}

impl FnHandler {
    pub(crate) fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(Sender, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self {
            func: Box::new(move |sender, message| func(sender, message).boxed()),
        }
    }
}

#[async_trait]
impl Handler for FnHandler {
    async fn handle(&self, sender: Sender, message: Message) -> HandlerResult {
        (self.func)(sender, message).await
    }
}

/// Registry of handlers keyed by uppercased command.
#[derive(Default)]
pub(crate) struct Registry {
    handlers: HashMap<String, Vec<Arc<dyn Handler>>>,
}

impl Registry {
    /// Append a handler for `command`. Handlers for one command run in
    /// registration order.
    pub(crate) fn insert(&mut self, command: &str, handler: Arc<dyn Handler>) {
        self.handlers
            .entry(command.to_ascii_uppercase())
            .or_default()
            .push(handler);
    }

    /// Handlers registered for an uppercased command key, if any.
    pub(crate) fn get(&self, command: &str) -> Option<&[Arc<dyn Handler>]> {
        self.handlers.get(command).map(Vec::as_slice)
    }
}
