//! Error types for framing, parsing, and transport establishment.

use std::io;

use thiserror::Error;

/// Convenience result type defaulting to [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors produced while framing, parsing, or establishing transports.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// Underlying I/O failure on the byte stream.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A line ran past the codec's length limit before any terminator.
    #[error("line of {actual} bytes exceeds the {limit} byte limit")]
    LineTooLong {
        /// Observed length in bytes, terminator included.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Inbound bytes were not valid UTF-8.
    #[error("line is not valid utf-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 {
        /// Length of the valid prefix, per [`std::str::Utf8Error`].
        valid_up_to: usize,
    },

    /// A complete line did not parse as a protocol message.
    #[error("malformed message: {0}")]
    InvalidMessage(String),

    /// The host part of an address is not usable as a TLS server name.
    #[error("invalid tls server name: {0}")]
    InvalidServerName(String),
}
