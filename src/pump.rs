//! Read pump and reconnect engine.
//!
//! One pump task runs per client. Each iteration reads a message under
//! the idle deadline and pushes it onto the queue; any read failure
//! lands in the reconnect path, which either restores the connection
//! with exponential backoff or winds the client down. The queue closes
//! when the pump exits and drops its pusher.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use slircx_proto::{Message, MessageReader, Transport};

use crate::client::Core;
use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::queue::QueuePusher;
use crate::state::ConnectionState;

/// Base delay for reconnect backoff; attempt n sleeps base × 2^n.
const BACKOFF_BASE_MS: u64 = 200;

/// Cap on the backoff exponent so the delay tops out at a few hours.
const BACKOFF_MAX_SHIFT: u32 = 16;

/// Registration sequence sent after every (re)connect: `PASS` when a
/// password is configured, then `NICK`, then `USER`. Servers validate
/// this order, so it is fixed.
pub(crate) fn handshake(config: &Config) -> Vec<Message> {
    let mut messages = Vec::with_capacity(3);
    if let Some(password) = config.password.as_deref().filter(|p| !p.is_empty()) {
        messages.push(Message::pass(password));
    }
    messages.push(Message::nick(&config.nick));
    messages.push(Message::user(&config.user, &config.user));
    messages
}

/// Dial, handshake, and publish a fresh writer. On success the retry
/// counter resets and the returned reader is ready for the pump. On
/// failure nothing is kept from the attempt.
pub(crate) async fn establish(core: &Core) -> Result<MessageReader> {
    let config = &core.config;
    let transport = match &config.tls {
        Some(tls) => Transport::tls(&config.addr, config.tls_domain(), Arc::clone(tls)).await?,
        None => Transport::tcp(&config.addr).await?,
    };
    let (reader, mut writer) = transport.split();
    for message in handshake(config) {
        debug!(raw = %message, "sending handshake");
        writer.send(&message).await?;
    }
    core.publish_writer(writer);
    core.tries.store(0, Ordering::Relaxed);
    core.set_state(ConnectionState::Connected);
    info!(addr = %config.addr, "connected");
    Ok(reader)
}

/// Pump messages from the transport into the queue until the transport
/// dies for good or the consumer goes away.
pub(crate) async fn run_pump(core: Arc<Core>, mut reader: MessageReader, pusher: QueuePusher) {
    loop {
        match timeout(core.config.read_timeout, reader.next()).await {
            Ok(Some(Ok(message))) => {
                debug!(raw = %message, "message received");
                if !pusher.push(message).await {
                    return;
                }
                continue;
            }
            Ok(Some(Err(error))) => warn!(%error, "read failed"),
            Ok(None) => info!("server closed the connection"),
            Err(_) => warn!(
                secs = core.config.read_timeout.as_secs(),
                "idle deadline exceeded"
            ),
        }
        match reestablish(&core).await {
            Some(next) => reader = next,
            None => return,
        }
    }
}

/// Reconnect with exponential backoff. `None` means the pump should
/// stop: reconnecting is disabled, or every attempt failed.
async fn reestablish(core: &Core) -> Option<MessageReader> {
    if core.config.max_retries == 0 {
        info!("reconnect disabled, shutting down");
        core.close_writer().await;
        core.set_state(ConnectionState::Terminated);
        return None;
    }
    core.set_state(ConnectionState::Reconnecting);
    core.close_writer().await;
    loop {
        info!(addr = %core.config.addr, "reconnecting");
        match establish(core).await {
            Ok(reader) => return Some(reader),
            Err(error) => {
                let attempt = core.tries.fetch_add(1, Ordering::Relaxed) + 1;
                if attempt >= core.config.max_retries {
                    error!(%error, attempts = attempt, "giving up on reconnecting");
                    core.set_last_error(ClientError::TooManyReconnects { attempts: attempt });
                    core.set_state(ConnectionState::Terminated);
                    return None;
                }
                let delay = backoff_delay(attempt);
                warn!(%error, attempt, ?delay, "reconnect attempt failed");
                sleep(delay).await;
            }
        }
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(BACKOFF_BASE_MS << attempt.min(BACKOFF_MAX_SHIFT))
}
