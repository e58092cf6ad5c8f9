//! WebSocket opening handshake.
//!
//! The server reads a single request header, `Sec-WebSocket-Key`, and answers
//! with a `101 Switching Protocols` response carrying the derived accept token.

use crate::error::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use sha1::{Digest, Sha1};
use std::collections::HashMap;

/// The WebSocket GUID used in the Sec-WebSocket-Accept calculation.
pub const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Terminator of an HTTP request head.
const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Parse HTTP header lines into a map keyed by lowercase header name.
///
/// Stops at the first empty line. Lines without a colon are ignored.
fn parse_headers<'a, I>(lines: I) -> HashMap<String, String>
where
    I: Iterator<Item = &'a str>,
{
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_lowercase(), value.trim().to_string());
        }
    }

    headers
}

/// Computes the Sec-WebSocket-Accept value from the client's Sec-WebSocket-Key.
///
/// The accept token is `Base64(SHA-1(key + GUID))`.
///
/// # Example
///
/// ```
/// use wsraw::protocol::handshake::derive_accept;
///
/// assert_eq!(
///     derive_accept("dGhlIHNhbXBsZSBub25jZQ=="),
///     "s3pPLMBiTxaQ9kYGzzhZRbK+xOo="
/// );
/// ```
#[must_use]
pub fn derive_accept(client_key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(client_key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// Format the `101 Switching Protocols` response for `client_key`.
///
/// The caller guarantees the key was present in the request.
#[must_use]
pub fn build_response(client_key: &str) -> String {
    [
        "HTTP/1.1 101 Switching Protocols".to_string(),
        "Upgrade: websocket".to_string(),
        "Connection: Upgrade".to_string(),
        format!("Sec-WebSocket-Accept: {}", derive_accept(client_key)),
        String::new(),
    ]
    .iter()
    .map(|line| format!("{}\r\n", line))
    .collect()
}

/// Locate the end of an HTTP request head.
///
/// Returns the number of bytes up to and including the blank line, or `None`
/// if the head is not complete yet.
#[must_use]
pub fn find_head_end(data: &[u8]) -> Option<usize> {
    data.windows(HEAD_TERMINATOR.len())
        .position(|window| window == HEAD_TERMINATOR)
        .map(|pos| pos + HEAD_TERMINATOR.len())
}

/// An HTTP request head, as received before any upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeRequest {
    /// The request method (e.g., "GET").
    pub method: String,
    /// The request path (e.g., "/chat").
    pub path: String,
    headers: HashMap<String, String>,
}

impl HandshakeRequest {
    /// Parse a request head from raw HTTP data.
    ///
    /// Any request is accepted here; whether it can be upgraded is decided by
    /// [`HandshakeRequest::is_upgrade`] and [`HandshakeResponse::from_request`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandshake`] if:
    /// - The data is not valid UTF-8.
    /// - The request line is missing or does not have three parts.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|_| Error::InvalidHandshake("Invalid UTF-8".into()))?;

        let mut lines = text.lines();

        // "GET /path HTTP/1.1"
        let request_line = lines
            .next()
            .ok_or_else(|| Error::InvalidHandshake("Empty request".into()))?;

        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(Error::InvalidHandshake(format!(
                "Invalid request line: {}",
                request_line
            )));
        }

        Ok(Self {
            method: parts[0].to_string(),
            path: parts[1].to_string(),
            headers: parse_headers(lines),
        })
    }

    /// Look up a header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// The Sec-WebSocket-Key header value, if present.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.header("sec-websocket-key")
    }

    /// Whether the client asked to upgrade to WebSocket.
    #[must_use]
    pub fn is_upgrade(&self) -> bool {
        self.header("upgrade")
            .is_some_and(|value| value.eq_ignore_ascii_case("websocket"))
    }
}

/// WebSocket handshake response from server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeResponse {
    /// The Sec-WebSocket-Accept value.
    pub accept: String,
}

impl HandshakeResponse {
    /// Create a handshake response from a parsed request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandshake`] if the request has no
    /// `Sec-WebSocket-Key` header.
    pub fn from_request(req: &HandshakeRequest) -> Result<Self> {
        let key = req
            .key()
            .ok_or_else(|| Error::InvalidHandshake("Missing Sec-WebSocket-Key header".into()))?;
        Ok(Self {
            accept: derive_accept(key),
        })
    }

    /// Write the HTTP response to a buffer.
    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(b"HTTP/1.1 101 Switching Protocols\r\n");
        buf.extend_from_slice(b"Upgrade: websocket\r\n");
        buf.extend_from_slice(b"Connection: Upgrade\r\n");
        buf.extend_from_slice(format!("Sec-WebSocket-Accept: {}\r\n", self.accept).as_bytes());
        buf.extend_from_slice(b"\r\n");
    }
}
