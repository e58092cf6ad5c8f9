//! Frame-level reading and writing over async streams.

#[cfg(feature = "async-tokio")]
mod framed;

#[cfg(feature = "async-tokio")]
pub use framed::WebSocketCodec;
