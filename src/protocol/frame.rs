//! WebSocket frame representation and encoding.
//!
//! Only the 7-bit inline and 16-bit extended payload lengths are supported;
//! the 64-bit form is rejected in both directions.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::protocol::OpCode;
use crate::protocol::mask::{MASK_KEY_LEN, apply_mask_fast};

/// FIN bit of the first header byte.
pub const FIN_BIT: u8 = 0x80;

/// MASK bit of the second header byte.
pub const MASK_BIT: u8 = 0x80;

/// Largest payload length carried inline in the second header byte.
pub const SEVEN_BIT_MAX: usize = 125;

/// Length indicator announcing a 16-bit extended length.
pub const SIXTEEN_BIT_MARKER: u8 = 126;

/// Length indicator announcing a 64-bit extended length (unsupported).
pub const SIXTY_FOUR_BIT_MARKER: u8 = 127;

/// Largest payload this engine will encode or decode.
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// A single, unfragmented WebSocket frame.
///
/// The payload is always stored unmasked. Whether the frame arrived (or will
/// leave) masked is recorded in `mask`.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-------+-+-------------+-------------------------------+
/// |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
/// |I|S|S|S|  (4)  |A|     (7)     |       (16, if len == 126)     |
/// |N|V|V|V|       |S|             |                               |
/// +-+-+-+-+-------+-+-------------+-------------------------------+
/// |                  Masking key (if MASK set)                    |
/// +---------------------------------------------------------------+
/// |                         Payload data                          |
/// +---------------------------------------------------------------+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Final fragment flag.
    pub fin: bool,
    /// Frame opcode.
    pub opcode: OpCode,
    /// Mask key the payload arrived under, if any.
    pub mask: Option<[u8; MASK_KEY_LEN]>,
    payload: Bytes,
}

impl Frame {
    /// Create a frame with the given parameters and no mask.
    #[must_use]
    pub fn new(fin: bool, opcode: OpCode, payload: impl Into<Bytes>) -> Self {
        Self {
            fin,
            opcode,
            mask: None,
            payload: payload.into(),
        }
    }

    /// Create a final text frame.
    #[must_use]
    pub fn text(data: impl Into<Bytes>) -> Self {
        Self::new(true, OpCode::Text, data)
    }

    /// Attach the mask key a frame was received under.
    #[must_use]
    pub fn with_mask(mut self, mask: Option<[u8; MASK_KEY_LEN]>) -> Self {
        self.mask = mask;
        self
    }

    /// Whether the frame was received masked.
    #[inline]
    #[must_use]
    pub fn is_masked(&self) -> bool {
        self.mask.is_some()
    }

    /// Get the (unmasked) payload bytes.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Take ownership of the payload.
    #[must_use]
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Interpret the payload as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUtf8` if the payload is not valid UTF-8.
    pub fn into_text(self) -> Result<String> {
        Ok(String::from_utf8(self.payload.to_vec())?)
    }

    /// Calculate the size needed to write this frame.
    ///
    /// # Errors
    ///
    /// Returns `Error::OversizedPayload` if the payload needs the 64-bit form.
    pub fn wire_size(&self, masked: bool) -> Result<usize> {
        let payload_len = self.payload.len();
        let mask_size = if masked { MASK_KEY_LEN } else { 0 };
        Ok(header_len(payload_len)? + mask_size + payload_len)
    }

    /// Append the frame to `buf`, masking the payload if `mask` is given.
    ///
    /// Returns the number of bytes written. Nothing is written on error.
    ///
    /// # Errors
    ///
    /// Returns `Error::OversizedPayload` if the payload exceeds 65535 bytes.
    pub fn write(&self, buf: &mut BytesMut, mask: Option<[u8; MASK_KEY_LEN]>) -> Result<usize> {
        let payload_len = self.payload.len();
        let total_size = self.wire_size(mask.is_some())?;
        buf.reserve(total_size);

        let mut byte0 = self.opcode.as_u8();
        if self.fin {
            byte0 |= FIN_BIT;
        }
        buf.put_u8(byte0);

        let mask_flag = if mask.is_some() { MASK_BIT } else { 0 };
        if payload_len <= SEVEN_BIT_MAX {
            buf.put_u8(payload_len as u8 | mask_flag);
        } else {
            buf.put_u8(SIXTEEN_BIT_MARKER | mask_flag);
            buf.put_u16(payload_len as u16);
        }

        match mask {
            Some(key) => {
                buf.put_slice(&key);
                let start = buf.len();
                buf.put_slice(&self.payload);
                apply_mask_fast(&mut buf[start..], key);
            }
            None => buf.put_slice(&self.payload),
        }

        Ok(total_size)
    }
}

/// Header length (without mask key) for a payload of `payload_len` bytes.
fn header_len(payload_len: usize) -> Result<usize> {
    if payload_len <= SEVEN_BIT_MAX {
        Ok(2)
    } else if payload_len <= MAX_PAYLOAD_LEN {
        Ok(4)
    } else {
        Err(Error::OversizedPayload {
            size: payload_len,
            max: MAX_PAYLOAD_LEN,
        })
    }
}

/// Encode `payload` as a single unmasked server-to-client text frame.
///
/// # Errors
///
/// Returns `Error::OversizedPayload` if `payload` is longer than 65535 bytes.
///
/// # Example
///
/// ```
/// use wsraw::protocol::frame::encode;
///
/// let frame = encode(b"Hi").unwrap();
/// assert_eq!(&frame[..], &[0x81, 0x02, b'H', b'i']);
/// ```
pub fn encode(payload: &[u8]) -> Result<Bytes> {
    let frame = Frame::text(Bytes::copy_from_slice(payload));
    let mut buf = BytesMut::new();
    frame.write(&mut buf, None)?;
    Ok(buf.freeze())
}

/// Encode `payload` as a masked client-to-server text frame.
///
/// Used by clients and test peers; the server itself never masks.
///
/// # Errors
///
/// Returns `Error::OversizedPayload` if `payload` is longer than 65535 bytes.
pub fn encode_masked(payload: &[u8], mask: [u8; MASK_KEY_LEN]) -> Result<Bytes> {
    let frame = Frame::text(Bytes::copy_from_slice(payload));
    let mut buf = BytesMut::new();
    frame.write(&mut buf, Some(mask))?;
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_short_text() {
        let frame = encode(b"Hello").unwrap();
        assert_eq!(&frame[..], &[0x81, 0x05, 0x48, 0x65, 0x6c, 0x6c, 0x6f]);
    }

    #[test]
    fn test_encode_empty_payload() {
        let frame = encode(b"").unwrap();
        assert_eq!(&frame[..], &[0x81, 0x00]);
    }

    #[test]
    fn test_encode_125_uses_inline_length() {
        let payload = vec![b'a'; 125];
        let frame = encode(&payload).unwrap();
        assert_eq!(frame.len(), 2 + 125);
        assert_eq!(frame[0], 0x81);
        assert_eq!(frame[1], 125);
        assert_eq!(&frame[2..], &payload[..]);
    }

    #[test]
    fn test_encode_126_uses_extended_length() {
        let payload = vec![b'a'; 126];
        let frame = encode(&payload).unwrap();
        assert_eq!(frame.len(), 4 + 126);
        assert_eq!(&frame[..4], &[0x81, 126, 0x00, 0x7E]);
        assert_eq!(&frame[4..], &payload[..]);
    }

    #[test]
    fn test_encode_max_payload() {
        let payload = vec![0u8; 65535];
        let frame = encode(&payload).unwrap();
        assert_eq!(frame.len(), 4 + 65535);
        assert_eq!(&frame[..4], &[0x81, 126, 0xFF, 0xFF]);
    }

    #[test]
    fn test_encode_oversized_payload() {
        let payload = vec![0u8; 65536];
        assert_eq!(
            encode(&payload),
            Err(Error::OversizedPayload {
                size: 65536,
                max: 65535
            })
        );
    }

    #[test]
    fn test_write_leaves_buffer_untouched_on_error() {
        let frame = Frame::text(vec![0u8; 70_000]);
        let mut buf = BytesMut::from(&b"prefix"[..]);
        assert!(frame.write(&mut buf, None).is_err());
        assert_eq!(&buf[..], b"prefix");
    }

    #[test]
    fn test_encode_masked_rfc_example() {
        let frame = encode_masked(b"Hello", [0x37, 0xfa, 0x21, 0x3d]).unwrap();
        assert_eq!(
            &frame[..],
            &[0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f, 0x4d, 0x51, 0x58]
        );
    }

    #[test]
    fn test_encode_masked_extended_length() {
        let frame = encode_masked(&[0u8; 300], [0, 0, 0, 0]).unwrap();
        assert_eq!(&frame[..8], &[0x81, 0xFE, 0x01, 0x2C, 0, 0, 0, 0]);
        assert_eq!(frame.len(), 8 + 300);
    }

    #[test]
    fn test_wire_size() {
        assert_eq!(Frame::text(vec![0u8; 10]).wire_size(false), Ok(12));
        assert_eq!(Frame::text(vec![0u8; 10]).wire_size(true), Ok(16));
        assert_eq!(Frame::text(vec![0u8; 200]).wire_size(false), Ok(204));
        assert!(Frame::text(vec![0u8; 65536]).wire_size(false).is_err());
    }

    #[test]
    fn test_non_final_frame_clears_fin() {
        let frame = Frame::new(false, OpCode::Binary, vec![1, 2]);
        let mut buf = BytesMut::new();
        frame.write(&mut buf, None).unwrap();
        assert_eq!(&buf[..], &[0x02, 0x02, 1, 2]);
    }

    #[test]
    fn test_into_text() {
        assert_eq!(Frame::text(&b"{\"a\":1}"[..]).into_text().unwrap(), "{\"a\":1}");
        assert_eq!(
            Frame::text(vec![0xff, 0xfe]).into_text(),
            Err(Error::InvalidUtf8)
        );
    }
}
