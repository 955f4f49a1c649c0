//! Client error types.

use thiserror::Error;

use slircx_proto::ProtocolError;

/// Convenience result type defaulting to [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Errors surfaced by the client.
///
/// Recoverable wire conditions (decode errors, idle timeouts) are
/// absorbed by the reconnect path and never appear here; what callers
/// see is a failed explicit connect, an exhausted reconnect budget, or
/// a stale write handle.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Dial, framing, or parse failure on the wire.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Every reconnect attempt failed.
    #[error("gave up after {attempts} reconnect attempts")]
    TooManyReconnects {
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// No live transport is bound to this handle.
    #[error("not connected")]
    NotConnected,
}
