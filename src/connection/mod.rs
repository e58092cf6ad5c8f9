//! Connection management.
//!
//! ## Connection Lifecycle
//!
//! 1. **Connecting** - Upgrade request read, response not yet written
//! 2. **Open** - Text frames flow in both directions
//! 3. **Closed** - Transport ended or a protocol error stopped the stream
//!
//! Decoded messages are handed to a [`MessageHandler`]; whatever it returns
//! is encoded and written back on the same stream.

mod role;
mod state;

pub use role::Role;
pub use state::ConnectionState;

use crate::error::Result;

#[cfg(feature = "async-tokio")]
#[allow(clippy::module_inception)]
mod connection;

#[cfg(feature = "async-tokio")]
pub use connection::{Connection, read_request_head};

/// Application callback for decoded text messages.
pub trait MessageHandler {
    /// Handle one message; `Some(reply)` is sent back to the peer.
    ///
    /// # Errors
    ///
    /// An error stops the connection that delivered the message.
    fn on_message(&mut self, text: String) -> Result<Option<String>>;
}
