//! # wsraw - minimal server-side WebSocket engine
//!
//! `wsraw` speaks the WebSocket wire protocol directly over a raw byte
//! stream: it answers the HTTP Upgrade handshake, then exchanges single,
//! unfragmented text frames.
//!
//! ## Scope
//!
//! - Payload lengths up to 65535 bytes (7-bit and 16-bit encodings only)
//! - Server frames are sent unmasked; client frames are unmasked on receipt
//! - No fragmentation, control frames or extensions
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wsraw::{Config, Connection, JsonEcho};
//!
//! let (stream, _) = listener.accept().await?;
//! let mut conn = Connection::accept(stream, Config::server()).await?;
//! conn.serve(&mut JsonEcho::new()).await?;
//! ```
//!
//! The protocol engine in [`protocol`] is usable without any runtime:
//!
//! ```
//! use wsraw::protocol::{derive_accept, encode};
//!
//! assert_eq!(derive_accept("dGhlIHNhbXBsZSBub25jZQ=="), "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
//! assert_eq!(&encode(b"ok").unwrap()[..], &[0x81, 0x02, b'o', b'k']);
//! ```

pub mod config;
pub mod connection;
pub mod echo;
pub mod error;
pub mod protocol;

#[cfg(feature = "async-tokio")]
pub mod codec;

pub use config::{Config, Limits};
#[cfg(feature = "async-tokio")]
pub use connection::{Connection, read_request_head};
pub use connection::{ConnectionState, MessageHandler, Role};
pub use echo::JsonEcho;
pub use error::{Error, Result};
pub use protocol::{Frame, FrameDecoder, OpCode, WS_GUID, build_response, derive_accept, encode};

#[cfg(feature = "async-tokio")]
pub use codec::WebSocketCodec;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn test_public_types_are_send() {
        assert_send::<Error>();
        assert_send::<Config>();
        assert_send::<Frame>();
        assert_send::<FrameDecoder>();
        assert_send::<JsonEcho>();
        assert_send::<ConnectionState>();
        assert_send::<Role>();
    }

    #[test]
    fn test_public_types_are_sync() {
        assert_sync::<Error>();
        assert_sync::<Config>();
        assert_sync::<Frame>();
        assert_sync::<FrameDecoder>();
        assert_sync::<ConnectionState>();
        assert_sync::<Role>();
    }
}
