//! Error types for the WebSocket engine.
//!
//! Every condition is raised synchronously by the operation that detects it
//! and handed back to the caller; the engine never retries or resynchronises.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handshaking, encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Outgoing payload does not fit the 7-bit or 16-bit length encoding.
    #[error("Oversized payload: {size} bytes (max: {max})")]
    OversizedPayload {
        /// Actual payload size.
        size: usize,
        /// Largest encodable payload size.
        max: usize,
    },

    /// Incoming frame announced the 64-bit extended length form.
    ///
    /// The decoder that raised this stays poisoned: the stream cannot be
    /// resynchronised.
    #[error("Unsupported frame size: 64-bit payload lengths are not handled")]
    UnsupportedFrameSize,

    /// Unmasked client frame.
    #[error("Client frame must be masked")]
    UnmaskedClientFrame,

    /// Masked server frame.
    #[error("Server frame must not be masked")]
    MaskedServerFrame,

    /// Payload is not valid UTF-8 text.
    #[error("Invalid UTF-8 in text frame")]
    InvalidUtf8,

    /// Malformed or incomplete upgrade request.
    #[error("Invalid handshake: {0}")]
    InvalidHandshake(String),

    /// Upgrade request head exceeds the configured maximum.
    #[error("Handshake too large: {size} bytes (max: {max})")]
    HandshakeTooLarge {
        /// Bytes received so far.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Transport reached end of stream.
    #[error("Connection closed")]
    ConnectionClosed,

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// Message handler rejected a message.
    #[error("Handler error: {0}")]
    Handler(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(_: std::string::FromUtf8Error) -> Self {
        Error::InvalidUtf8
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Handler(err.to_string())
    }
}
