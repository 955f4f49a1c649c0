//! Connection lifecycle states.

use std::fmt;

/// Lifecycle phase of a client connection.
///
/// `Terminated` is reached two ways: reconnecting is disabled and the
/// transport dropped (planned shutdown), or every reconnect attempt
/// failed. [`Client::run`](crate::Client::run) distinguishes the two by
/// its return value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No transport has been opened yet.
    #[default]
    Disconnected,
    /// A dial and handshake are in progress.
    Connecting,
    /// A live transport is feeding the read pump.
    Connected,
    /// The transport was lost and reconnect attempts are running.
    Reconnecting,
    /// The client has shut down and will not reconnect.
    Terminated,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
