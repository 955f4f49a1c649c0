//! # slircx
//!
//! A small asynchronous IRC client library: connect, register handlers
//! for the commands you care about, then run the dispatch loop while
//! the client keeps the connection alive with exponential backoff.
//!
//! ## Quick Start
//!
//! ```no_run
//! use slircx::{Client, Config, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("irc.libera.chat:6667", "slircx-bot").with_max_retries(5);
//!     let mut client = Client::new(config);
//!
//!     client.register_fn("PING", |sender, message| async move {
//!         let token = message.trailing.clone().unwrap_or_default();
//!         sender.send(&Message::pong(token)).await?;
//!         Ok(())
//!     });
//!     client.register_fn("001", |sender, _message| async move {
//!         sender.send(&Message::join("#rust")).await?;
//!         Ok(())
//!     });
//!
//!     client.connect().await?;
//!     client.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Lifecycle
//!
//! [`Client::connect`] dials, sends the fixed `PASS`/`NICK`/`USER`
//! registration sequence, and starts a background read pump.
//! [`Client::run`] drains decoded messages from a bounded queue and
//! fans each one out to its handlers. When the transport drops, the
//! pump reconnects with exponential backoff up to
//! [`Config::max_retries`]; once the budget is spent, queued messages
//! are still dispatched and `run` returns the terminal error. With a
//! budget of zero a disconnect is treated as a planned shutdown and
//! `run` returns `Ok(())`.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod handler;
mod pump;
pub mod queue;
pub mod sender;
pub mod state;

pub use self::client::Client;
pub use self::config::Config;
pub use self::error::{ClientError, Result};
pub use self::handler::{Handler, HandlerError, HandlerResult};
pub use self::queue::Backpressure;
pub use self::sender::Sender;
pub use self::state::ConnectionState;

pub use slircx_proto::{Message, Prefix, ProtocolError};
