//! # slircx-proto
//!
//! Message types, line codec, and transports for the IRC client protocol.
//!
//! ## Features
//!
//! - IRC message parsing with prefixes, commands, and parameters
//! - Convenient message construction for the common client commands
//! - Newline-delimited framing with length limits and outbound
//!   sanitization
//! - Optional Tokio integration with plain TCP and TLS transports

#![deny(clippy::all)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Creating Messages
//!
//! ```rust
//! use slircx_proto::Message;
//!
//! let privmsg = Message::privmsg("#rust", "Hello, world!");
//! assert_eq!(privmsg.to_string(), "PRIVMSG #rust :Hello, world!");
//! ```
//!
//! ### Parsing Messages
//!
//! ```rust
//! use slircx_proto::Message;
//!
//! let msg: Message = ":dan!d@localhost PRIVMSG #test :hi".parse().unwrap();
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.trailing.as_deref(), Some("hi"));
//! ```

#[cfg(feature = "tokio")]
pub mod codec;
pub mod error;
pub mod message;
#[cfg(feature = "tokio")]
pub mod transport;

#[cfg(feature = "tokio")]
pub use self::codec::{IrcCodec, MAX_LINE_LEN};
pub use self::error::ProtocolError;
pub use self::message::{Message, Prefix};
#[cfg(feature = "tokio")]
pub use self::transport::{
    MessageReader, MessageWriter, Transport, TransportReadHalf, TransportWriteHalf,
};
