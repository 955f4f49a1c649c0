//! Client configuration.

use std::sync::Arc;
use std::time::Duration;

use tokio_rustls::rustls::ClientConfig;

use crate::queue::Backpressure;

/// Default capacity of the bounded message queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Default cap on concurrently running handler tasks.
pub const DEFAULT_HANDLER_CONCURRENCY: usize = 32;

/// Default idle read deadline. A connection silent this long is
/// presumed dead.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection settings for a [`Client`](crate::Client).
///
/// [`Config::new`] fills in the defaults; the `with_*` builders
/// override them.
///
/// ```
/// use slircx::Config;
///
/// let config = Config::new("irc.libera.chat:6667", "guest")
///     .with_user("guest-bot")
///     .with_max_retries(5);
/// assert_eq!(config.nick, "guest");
/// assert_eq!(config.user, "guest-bot");
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    /// Server address as `host:port`.
    pub addr: String,
    /// Nickname requested at registration, reused verbatim on every
    /// reconnect.
    pub nick: String,
    /// Username for the `USER` line. Defaults to the nickname.
    pub user: String,
    /// Connection password, sent as `PASS` before registration when
    /// set and non-empty.
    pub password: Option<String>,
    /// TLS settings. When set, the connection performs a TLS handshake
    /// before any protocol bytes are exchanged; the certificate is
    /// verified against the host part of `addr`.
    pub tls: Option<Arc<ClientConfig>>,
    /// Reconnect attempts allowed after a lost transport. Zero means a
    /// disconnect is an intentional shutdown.
    pub max_retries: u32,
    /// Idle read deadline per read.
    pub read_timeout: Duration,
    /// Capacity of the message queue between the read pump and the
    /// dispatch loop.
    pub queue_capacity: usize,
    /// What to do when a message arrives and the queue is full.
    pub backpressure: Backpressure,
    /// Cap on handler tasks running at once.
    pub handler_concurrency: usize,
}

impl Config {
    /// Configuration for `addr` with nickname `nick` and everything
    /// else defaulted.
    pub fn new(addr: impl Into<String>, nick: impl Into<String>) -> Self {
        let nick = nick.into();
        Self {
            addr: addr.into(),
            user: nick.clone(),
            nick,
            password: None,
            tls: None,
            max_retries: 0,
            read_timeout: DEFAULT_READ_TIMEOUT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            backpressure: Backpressure::default(),
            handler_concurrency: DEFAULT_HANDLER_CONCURRENCY,
        }
    }

    /// Set the `USER` line username.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the connection password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Connect over TLS with the given client configuration.
    pub fn with_tls(mut self, tls: Arc<ClientConfig>) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Set the reconnect attempt budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the idle read deadline.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Set the message queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the queue overflow policy.
    pub fn with_backpressure(mut self, backpressure: Backpressure) -> Self {
        self.backpressure = backpressure;
        self
    }

    /// Set the cap on concurrently running handler tasks.
    pub fn with_handler_concurrency(mut self, limit: usize) -> Self {
        self.handler_concurrency = limit;
        self
    }

    /// Host part of `addr`, used as the TLS server name.
    pub(crate) fn tls_domain(&self) -> &str {
        let host = match self.addr.rsplit_once(':') {
            Some((host, _port)) => host,
            None => &self.addr,
        };
        host.trim_start_matches('[').trim_end_matches(']')
    }
}
