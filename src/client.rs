//! Connection manager and dispatch loop.

use std::future::Future;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use slircx_proto::{Message, MessageWriter};

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::handler::{FnHandler, Handler, HandlerResult, Registry};
use crate::pump;
use crate::queue::{self, QueueReceiver};
use crate::sender::{Sender, WriterSlot};
use crate::state::ConnectionState;

/// State shared between the client, its senders, and the pump task.
pub(crate) struct Core {
    pub(crate) config: Config,
    state: RwLock<ConnectionState>,
    /// Failed reconnect attempts since the last successful connect.
    pub(crate) tries: AtomicU32,
    /// Slot serving the current transport; swapped on every (re)connect.
    slot: RwLock<Arc<WriterSlot>>,
    last_error: Mutex<Option<ClientError>>,
}

impl Core {
    fn new(config: Config) -> Self {
        Self {
            config,
            state: RwLock::new(ConnectionState::Disconnected),
            tries: AtomicU32::new(0),
            slot: RwLock::new(Arc::new(WriterSlot::new(None))),
            last_error: Mutex::new(None),
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    /// Slot bound to the current transport.
    pub(crate) fn current_slot(&self) -> Arc<WriterSlot> {
        Arc::clone(&self.slot.read())
    }

    /// Swap in a fresh slot holding `writer`. Senders bound to the old
    /// slot keep it alive but now target a replaced transport.
    pub(crate) fn publish_writer(&self, writer: MessageWriter) {
        *self.slot.write() = Arc::new(WriterSlot::new(Some(writer)));
    }

    /// Drop the current writer, closing our half of the transport and
    /// failing any sender still bound to it.
    pub(crate) async fn close_writer(&self) {
        let slot = self.current_slot();
        slot.lock().await.take();
    }

    pub(crate) fn set_last_error(&self, error: ClientError) {
        *self.last_error.lock() = Some(error);
    }

    fn take_last_error(&self) -> Option<ClientError> {
        self.last_error.lock().take()
    }
}

/// An IRC client: connection lifecycle, handler registry, and the
/// dispatch loop.
///
/// The expected shape of a program is: build a [`Config`], register
/// handlers, [`connect`](Client::connect), then block on
/// [`run`](Client::run) until the connection winds down.
pub struct Client {
    core: Arc<Core>,
    registry: Registry,
    /// Permits for in-flight handler tasks.
    limiter: Arc<Semaphore>,
    receiver: Option<QueueReceiver>,
    pump: Option<JoinHandle<()>>,
}

impl Client {
    /// Create a disconnected client from `config`.
    pub fn new(config: Config) -> Self {
        let limiter = Arc::new(Semaphore::new(config.handler_concurrency.max(1)));
        Self {
            core: Arc::new(Core::new(config)),
            registry: Registry::default(),
            limiter,
            receiver: None,
            pump: None,
        }
    }

    /// Register a handler for `command`. Handlers for the same command
    /// are issued in registration order. Command keys are matched
    /// case-insensitively.
    pub fn register<H>(&mut self, command: &str, handler: H)
    where
        H: Handler + 'static,
    {
        self.registry.insert(command, Arc::new(handler));
    }

    /// Register an async closure as a handler for `command`.
    pub fn register_fn<F, Fut>(&mut self, command: &str, func: F)
    where
        F: Fn(Sender, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.insert(command, Arc::new(FnHandler::new(func)));
    }

    /// Dial the server, send the registration handshake, and start the
    /// read pump.
    ///
    /// A dial or handshake failure is returned as is; nothing is
    /// retried here and nothing is kept from the failed attempt. On
    /// success any previous connection is replaced and senders obtained
    /// before the call are stale.
    pub async fn connect(&mut self) -> Result<()> {
        self.core.set_state(ConnectionState::Connecting);
        let reader = match pump::establish(&self.core).await {
            Ok(reader) => reader,
            Err(error) => {
                self.core.set_state(ConnectionState::Disconnected);
                return Err(error);
            }
        };
        if let Some(old) = self.pump.take() {
            old.abort();
        }
        let (pusher, receiver) =
            queue::channel(self.core.config.queue_capacity, self.core.config.backpressure);
        self.receiver = Some(receiver);
        self.pump = Some(tokio::spawn(pump::run_pump(
            Arc::clone(&self.core),
            reader,
            pusher,
        )));
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.core.state()
    }

    /// Write handle bound to the current transport.
    pub fn sender(&self) -> Sender {
        Sender::new(self.core.current_slot())
    }

    /// Drain the queue, dispatching every message to its handlers.
    ///
    /// Blocks until the queue closes. Returns `Ok(())` on planned
    /// shutdown (reconnect disabled and the transport dropped) and
    /// [`ClientError::TooManyReconnects`] when the reconnect budget ran
    /// out. Either way, messages already queued are dispatched first.
    pub async fn run(&mut self) -> Result<()> {
        let Some(mut receiver) = self.receiver.take() else {
            return Err(ClientError::NotConnected);
        };
        while let Some(message) = receiver.recv().await {
            self.dispatch(message).await;
        }
        match self.core.take_last_error() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Fan one message out to the handlers registered for its command.
    ///
    /// Each handler runs on its own task under the concurrency limit;
    /// issuance order is registration order, completion order is not
    /// specified. Messages with no registered handler are dropped.
    async fn dispatch(&self, message: Message) {
        let key = message.command.to_ascii_uppercase();
        let Some(handlers) = self.registry.get(&key) else {
            debug!(command = %key, "no handler registered");
            return;
        };
        let sender = self.sender();
        for handler in handlers {
            let Ok(permit) = Arc::clone(&self.limiter).acquire_owned().await else {
                return;
            };
            let handler = Arc::clone(handler);
            let sender = sender.clone();
            let message = message.clone();
            tokio::spawn(async move {
                let _permit = permit;
                if let Err(error) = handler.handle(sender, message).await {
                    warn!(%error, "handler failed");
                }
            });
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}
