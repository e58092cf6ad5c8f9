use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::Config;
use crate::connection::Role;
use crate::error::{Error, Result};
use crate::protocol::mask::random_mask_key;
use crate::protocol::{Frame, FrameDecoder};

/// Frame-level reader/writer over an async byte stream.
///
/// Every chunk the transport delivers is appended to the read buffer and
/// offered to the [`FrameDecoder`]; a frame is returned once all of its bytes
/// have arrived, however they were split.
pub struct WebSocketCodec<T> {
    io: T,
    read_buf: BytesMut,
    write_buf: BytesMut,
    role: Role,
    config: Config,
    decoder: FrameDecoder,
}

impl<T> WebSocketCodec<T> {
    #[must_use]
    pub fn new(io: T, role: Role, config: Config) -> Self {
        Self {
            io,
            read_buf: BytesMut::with_capacity(config.read_buffer_size),
            write_buf: BytesMut::with_capacity(config.write_buffer_size),
            decoder: FrameDecoder::new(role, &config),
            role,
            config,
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bytes received but not yet decoded.
    ///
    /// The acceptor pushes anything that arrived behind the handshake head here.
    pub fn read_buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.read_buf
    }

    /// Mutable access to the stream, for bytes written outside of frames.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.io
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        self.io
    }
}

impl<T: AsyncRead + AsyncWrite + Unpin> WebSocketCodec<T> {
    /// Read the next complete frame.
    ///
    /// # Errors
    ///
    /// - `Error::ConnectionClosed` if the stream ends, mid-frame or not
    /// - decoder errors (`UnsupportedFrameSize`, mask violations)
    /// - I/O errors from the underlying stream
    pub async fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.decoder.decode(&mut self.read_buf)? {
                return Ok(frame);
            }

            self.read_buf.reserve(self.config.read_buffer_size.max(1));
            let n = self.io.read_buf(&mut self.read_buf).await?;
            if n == 0 {
                if !self.decoder.is_idle() || !self.read_buf.is_empty() {
                    log::debug!("stream ended inside a frame");
                }
                return Err(Error::ConnectionClosed);
            }
        }
    }

    /// Whether the decoder sits on a frame boundary with nothing buffered.
    #[must_use]
    pub fn at_frame_boundary(&self) -> bool {
        self.decoder.is_idle() && self.read_buf.is_empty()
    }

    /// Write a frame, masking it if this role must mask.
    pub async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let mask = self.role.must_mask().then(random_mask_key);

        self.write_buf.clear();
        frame.write(&mut self.write_buf, mask)?;
        self.io.write_all(&self.write_buf).await?;
        Ok(())
    }

    /// Write `text` as a single final text frame.
    pub async fn write_text(&mut self, text: &str) -> Result<()> {
        self.config.limits.check_payload_size(text.len())?;
        let frame = Frame::text(bytes::Bytes::copy_from_slice(text.as_bytes()));
        self.write_frame(&frame).await
    }

    pub async fn flush(&mut self) -> Result<()> {
        self.io.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode_masked, OpCode};
    use std::io::Cursor;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Delivers its input at most `chunk` bytes per read.
    struct MockStream {
        read_data: Cursor<Vec<u8>>,
        write_data: Vec<u8>,
        chunk: usize,
    }

    impl MockStream {
        fn new(data: Vec<u8>) -> Self {
            Self::chunked(data, usize::MAX)
        }

        fn chunked(data: Vec<u8>, chunk: usize) -> Self {
            Self {
                read_data: Cursor::new(data),
                write_data: Vec::new(),
                chunk,
            }
        }

        fn written(&self) -> &[u8] {
            &self.write_data
        }
    }

    impl AsyncRead for MockStream {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            let pos = self.read_data.position() as usize;
            let data = self.read_data.get_ref();
            if pos >= data.len() {
                return Poll::Ready(Ok(()));
            }
            let remaining = &data[pos..];
            let to_copy = remaining.len().min(buf.remaining()).min(self.chunk);
            buf.put_slice(&remaining[..to_copy]);
            self.read_data.set_position((pos + to_copy) as u64);
            Poll::Ready(Ok(()))
        }
    }

    impl AsyncWrite for MockStream {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            self.write_data.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_write_text_unmasked() {
        let mut codec = WebSocketCodec::new(MockStream::new(vec![]), Role::Server, Config::server());

        codec.write_text("Hi").await.unwrap();

        assert_eq!(codec.io.written(), &[0x81, 0x02, b'H', b'i']);
    }

    #[tokio::test]
    async fn test_write_frame_masked_as_client() {
        let mut codec = WebSocketCodec::new(MockStream::new(vec![]), Role::Client, Config::client());

        codec.write_text("Hi").await.unwrap();

        let written = codec.io.written();
        assert_eq!(written[0], 0x81);
        assert_eq!(written[1], 0x82);
        assert_eq!(written.len(), 8);
    }

    #[tokio::test]
    async fn test_write_text_oversized() {
        let mut codec = WebSocketCodec::new(MockStream::new(vec![]), Role::Server, Config::server());

        let text = "x".repeat(65_536);
        let result = codec.write_text(&text).await;

        assert!(matches!(result, Err(Error::OversizedPayload { size: 65_536, .. })));
        assert!(codec.io.written().is_empty());
    }

    #[tokio::test]
    async fn test_read_frame() {
        let data = vec![
            0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f, 0x4d, 0x51, 0x58,
        ];
        let mut codec = WebSocketCodec::new(MockStream::new(data), Role::Server, Config::server());

        let frame = codec.read_frame().await.unwrap();
        assert!(frame.fin);
        assert_eq!(frame.opcode, OpCode::Text);
        assert_eq!(frame.payload(), b"Hello");
        assert!(codec.at_frame_boundary());
    }

    #[tokio::test]
    async fn test_read_frame_one_byte_per_read() {
        let payload = vec![b'z'; 300];
        let data = encode_masked(&payload, [0xaa, 0xbb, 0xcc, 0xdd]).unwrap().to_vec();
        let stream = MockStream::chunked(data, 1);
        let mut codec = WebSocketCodec::new(stream, Role::Server, Config::server());

        let frame = codec.read_frame().await.unwrap();
        assert_eq!(frame.payload(), &payload[..]);
    }

    #[tokio::test]
    async fn test_read_multiple_frames() {
        // "Hi" masked with [0x12, 0x34, 0x56, 0x78] = [0x5a, 0x5d]
        let data = vec![
            0x81, 0x82, 0x12, 0x34, 0x56, 0x78, 0x5a, 0x5d,
            0x81, 0x82, 0xaa, 0xbb, 0xcc, 0xdd, 0xab, 0xb9,
        ];
        let mut codec = WebSocketCodec::new(MockStream::chunked(data, 3), Role::Server, Config::server());

        let frame1 = codec.read_frame().await.unwrap();
        assert_eq!(frame1.payload(), b"Hi");

        let frame2 = codec.read_frame().await.unwrap();
        assert_eq!(frame2.payload(), &[0x01, 0x02]);
    }

    #[tokio::test]
    async fn test_read_64_bit_length_fails() {
        let data = vec![0x81, 0xFF, 0, 0, 0, 0, 0, 1, 0, 0];
        let mut codec = WebSocketCodec::new(MockStream::new(data), Role::Server, Config::server());

        assert_eq!(codec.read_frame().await, Err(Error::UnsupportedFrameSize));
        assert_eq!(codec.read_frame().await, Err(Error::UnsupportedFrameSize));
    }

    #[tokio::test]
    async fn test_read_connection_closed() {
        let mut codec = WebSocketCodec::new(MockStream::new(vec![]), Role::Server, Config::server());

        assert_eq!(codec.read_frame().await, Err(Error::ConnectionClosed));
        assert!(codec.at_frame_boundary());
    }

    #[tokio::test]
    async fn test_read_truncated_frame() {
        let mut codec = WebSocketCodec::new(
            MockStream::new(vec![0x81, 0x85, 0x37, 0xfa]),
            Role::Server,
            Config::server(),
        );

        assert_eq!(codec.read_frame().await, Err(Error::ConnectionClosed));
        assert!(!codec.at_frame_boundary());
    }

    #[tokio::test]
    async fn test_buffered_bytes_are_decoded_first() {
        let mut codec = WebSocketCodec::new(MockStream::new(vec![]), Role::Server, Config::server());
        codec
            .read_buffer_mut()
            .extend_from_slice(&encode_masked(b"early", [1, 2, 3, 4]).unwrap());

        let frame = codec.read_frame().await.unwrap();
        assert_eq!(frame.payload(), b"early");
    }
}
