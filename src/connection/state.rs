//! Connection lifecycle.

/// Lifecycle state of one connection.
///
/// There is no closing handshake: a connection is open until the transport
/// ends or a protocol error stops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ConnectionState {
    /// Upgrade request not yet answered.
    #[default]
    Connecting,
    /// Upgraded; frames flow in both directions.
    Open,
    /// Transport ended or the stream failed.
    Closed,
}

impl ConnectionState {
    /// Sending is allowed only while open.
    #[must_use]
    #[inline]
    pub const fn can_send(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// Receiving is allowed only while open.
    #[must_use]
    #[inline]
    pub const fn can_receive(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Open => write!(f, "Open"),
            ConnectionState::Closed => write!(f, "Closed"),
        }
    }
}
