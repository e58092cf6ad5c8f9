use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::codec::WebSocketCodec;
use crate::config::Config;
use crate::connection::{ConnectionState, MessageHandler, Role};
use crate::error::{Error, Result};
use crate::protocol::{HandshakeRequest, HandshakeResponse, find_head_end};

/// A WebSocket connection wrapping an async I/O stream.
///
/// Messages are single final text frames. Frames are processed strictly in
/// arrival order; each connection owns its stream and shares nothing.
///
/// ## Example
///
/// ```rust,ignore
/// use wsraw::{Config, Connection};
///
/// let (stream, _) = listener.accept().await?;
/// let mut conn = Connection::accept(stream, Config::server()).await?;
///
/// while let Some(text) = conn.recv().await? {
///     conn.send(&text).await?;
/// }
/// ```
pub struct Connection<T> {
    codec: WebSocketCodec<T>,
    state: ConnectionState,
}

impl<T> Connection<T> {
    /// Wrap a stream whose upgrade handshake has already completed.
    pub fn new(io: T, role: Role, config: Config) -> Self {
        Self {
            codec: WebSocketCodec::new(io, role, config),
            state: ConnectionState::Open,
        }
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check if the connection is in an open state.
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Give back the underlying stream.
    pub fn into_inner(self) -> T {
        self.codec.into_inner()
    }
}

impl<T: AsyncRead + AsyncWrite + Unpin> Connection<T> {
    /// Perform the server side of the opening handshake on a raw stream.
    ///
    /// Reads the request head, answers it with `101 Switching Protocols` and
    /// returns an open connection. Bytes that arrived after the head are kept
    /// for the frame decoder.
    ///
    /// ## Errors
    ///
    /// - `Error::HandshakeTooLarge` if the head is longer than
    ///   `limits.max_handshake_size` bytes
    /// - `Error::InvalidHandshake` if the head is malformed or lacks
    ///   `Sec-WebSocket-Key`
    /// - `Error::ConnectionClosed` if the stream ends first
    pub async fn accept(mut io: T, config: Config) -> Result<Self> {
        let (head, rest) = read_request_head(&mut io, &config).await?;
        let request = HandshakeRequest::parse(&head)?;
        Self::upgrade(io, &request, &rest, config).await
    }

    /// Answer an already parsed upgrade request.
    ///
    /// `buffered` holds any bytes read past the request head.
    ///
    /// ## Errors
    ///
    /// - `Error::InvalidHandshake` if the request lacks `Sec-WebSocket-Key`
    /// - I/O errors from the underlying stream
    pub async fn upgrade(
        io: T,
        request: &HandshakeRequest,
        buffered: &[u8],
        config: Config,
    ) -> Result<Self> {
        let response = HandshakeResponse::from_request(request)?;
        let mut response_bytes = Vec::new();
        response.write(&mut response_bytes);

        let mut conn = Self {
            codec: WebSocketCodec::new(io, Role::Server, config),
            state: ConnectionState::Connecting,
        };
        conn.codec.get_mut().write_all(&response_bytes).await?;
        conn.codec.get_mut().flush().await?;
        conn.state = ConnectionState::Open;
        log::debug!("upgraded {} {}", request.method, request.path);

        conn.codec.read_buffer_mut().extend_from_slice(buffered);
        Ok(conn)
    }

    /// Receive the next text message.
    ///
    /// Returns `Ok(None)` when the peer ends the stream between frames.
    ///
    /// ## Errors
    ///
    /// - `Error::ConnectionClosed` if the connection is not open or the stream
    ///   ends inside a frame
    /// - `Error::UnsupportedFrameSize` if the peer uses a 64-bit length
    /// - `Error::InvalidUtf8` if the payload is not text
    /// - I/O errors from the underlying stream
    ///
    /// Any error closes the connection.
    pub async fn recv(&mut self) -> Result<Option<String>> {
        if !self.state.can_receive() {
            return Err(Error::ConnectionClosed);
        }

        let frame = match self.codec.read_frame().await {
            Ok(frame) => frame,
            Err(Error::ConnectionClosed) if self.codec.at_frame_boundary() => {
                self.state = ConnectionState::Closed;
                return Ok(None);
            }
            Err(e) => {
                self.state = ConnectionState::Closed;
                return Err(e);
            }
        };

        frame.into_text().map(Some).inspect_err(|_| {
            self.state = ConnectionState::Closed;
        })
    }

    /// Send a text message as one unmasked frame.
    ///
    /// ## Errors
    ///
    /// - `Error::ConnectionClosed` if the connection is not open
    /// - `Error::OversizedPayload` if `text` is longer than the payload limit;
    ///   the connection stays open
    /// - I/O errors from the underlying stream
    pub async fn send(&mut self, text: &str) -> Result<()> {
        if !self.state.can_send() {
            return Err(Error::ConnectionClosed);
        }
        self.codec.write_text(text).await?;
        self.codec.flush().await
    }

    /// Dispatch every incoming message to `handler` and send back its replies.
    ///
    /// Returns `Ok(())` when the peer ends the stream cleanly.
    ///
    /// ## Errors
    ///
    /// Returns the first error from receiving, the handler, or sending.
    /// Any error closes the connection.
    pub async fn serve<H: MessageHandler>(&mut self, handler: &mut H) -> Result<()> {
        while let Some(text) = self.recv().await? {
            log::debug!("received {} bytes", text.len());
            if let Err(e) = self.dispatch(handler, text).await {
                self.state = ConnectionState::Closed;
                return Err(e);
            }
        }
        log::info!("peer closed the connection");
        Ok(())
    }

    async fn dispatch<H: MessageHandler>(&mut self, handler: &mut H, text: String) -> Result<()> {
        match handler.on_message(text)? {
            Some(reply) => self.send(&reply).await,
            None => Ok(()),
        }
    }
}

/// Read an HTTP request head from `io`.
///
/// Returns the head, terminator included, and whatever followed it in the
/// last read.
///
/// # Errors
///
/// - `Error::HandshakeTooLarge` if the head is longer than
///   `limits.max_handshake_size` bytes
/// - `Error::ConnectionClosed` if the stream ends first
/// - I/O errors from the underlying stream
pub async fn read_request_head<T: AsyncRead + Unpin>(
    io: &mut T,
    config: &Config,
) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = io.read(&mut chunk).await?;
        if n == 0 {
            return Err(Error::ConnectionClosed);
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = find_head_end(&buf) {
            config.limits.check_handshake_size(end)?;
            let rest = buf.split_off(end);
            return Ok((buf, rest));
        }
        config.limits.check_handshake_size(buf.len())?;
    }
}
