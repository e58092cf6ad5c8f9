//! Incremental frame decoder.
//!
//! Bytes may arrive in arbitrary chunks. The decoder consumes each header
//! field only once it is complete and remembers how far it got, so a frame
//! split across any number of reads decodes the same as one delivered whole.

use bytes::{Buf, BytesMut};

use crate::config::Config;
use crate::connection::Role;
use crate::error::{Error, Result};
use crate::protocol::frame::{
    FIN_BIT, Frame, MASK_BIT, SEVEN_BIT_MAX, SIXTEEN_BIT_MARKER, SIXTY_FOUR_BIT_MARKER,
};
use crate::protocol::mask::{MASK_KEY_LEN, apply_mask_fast};
use crate::protocol::OpCode;

/// Fields known once the two fixed header bytes are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Head {
    fin: bool,
    opcode: OpCode,
    masked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    /// Waiting for the fin/opcode byte and the mask/length byte.
    Head,
    /// Waiting for the 16-bit extended length.
    ExtendedLength(Head),
    /// Waiting for the 4-byte mask key.
    MaskKey { head: Head, len: usize },
    /// Waiting for `len` payload bytes.
    Payload {
        head: Head,
        len: usize,
        mask: Option<[u8; MASK_KEY_LEN]>,
    },
    /// A protocol violation was seen; the stream cannot be resynchronised.
    Failed(Error),
}

/// Decoder for a stream of frames on one connection.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: State,
    role: Role,
    accept_unmasked: bool,
    max_payload_size: usize,
}

impl FrameDecoder {
    /// Create a decoder for the given role.
    ///
    /// A server-role decoder expects masked frames, a client-role decoder
    /// expects unmasked ones.
    #[must_use]
    pub fn new(role: Role, config: &Config) -> Self {
        Self {
            state: State::Head,
            role,
            accept_unmasked: config.accept_unmasked_frames,
            max_payload_size: config.limits.max_payload_size,
        }
    }

    /// Whether the decoder is between frames.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == State::Head
    }

    /// Whether a previous call failed. A failed decoder stays failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed(_))
    }

    /// Decode the next frame from `buf`.
    ///
    /// Returns `Ok(None)` when more bytes are needed. Completed fields are
    /// removed from `buf`; partial fields are left in place.
    ///
    /// # Errors
    ///
    /// - `Error::UnsupportedFrameSize` if the frame uses the 64-bit length
    ///   form. Only the two head bytes are consumed.
    /// - `Error::UnmaskedClientFrame` / `Error::MaskedServerFrame` if the
    ///   mask bit does not match the role.
    /// - `Error::OversizedPayload` if the announced length exceeds the
    ///   configured payload limit.
    ///
    /// After any error the decoder is failed: every later call returns the
    /// same error without touching `buf`.
    pub fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>> {
        if let State::Failed(ref err) = self.state {
            return Err(err.clone());
        }
        self.advance(buf).inspect_err(|err| {
            log::warn!("{} frame decoder failed: {}", self.role, err);
            self.state = State::Failed(err.clone());
        })
    }

    fn advance(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>> {
        loop {
            match self.state {
                State::Failed(ref err) => return Err(err.clone()),
                State::Head => {
                    if buf.len() < 2 {
                        return Ok(None);
                    }
                    let byte0 = buf.get_u8();
                    let byte1 = buf.get_u8();
                    let head = Head {
                        fin: byte0 & FIN_BIT != 0,
                        opcode: OpCode::from_u8(byte0),
                        masked: byte1 & MASK_BIT != 0,
                    };
                    self.check_mask(head.masked)?;

                    let indicator = byte1 & !MASK_BIT;
                    let next = match indicator {
                        len if len as usize <= SEVEN_BIT_MAX => {
                            self.after_length(head, len as usize)?
                        }
                        SIXTEEN_BIT_MARKER => State::ExtendedLength(head),
                        SIXTY_FOUR_BIT_MARKER => return Err(Error::UnsupportedFrameSize),
                        _ => unreachable!("length indicator is 7 bits"),
                    };
                    self.state = next;
                }
                State::ExtendedLength(head) => {
                    if buf.len() < 2 {
                        return Ok(None);
                    }
                    let len = buf.get_u16() as usize;
                    self.state = self.after_length(head, len)?;
                }
                State::MaskKey { head, len } => {
                    if buf.len() < MASK_KEY_LEN {
                        return Ok(None);
                    }
                    let mut key = [0u8; MASK_KEY_LEN];
                    buf.copy_to_slice(&mut key);
                    self.state = State::Payload {
                        head,
                        len,
                        mask: Some(key),
                    };
                }
                State::Payload { head, len, mask } => {
                    if buf.len() < len {
                        return Ok(None);
                    }
                    let mut payload = buf.split_to(len);
                    if let Some(key) = mask {
                        apply_mask_fast(&mut payload, key);
                    }
                    self.state = State::Head;

                    let frame = Frame::new(head.fin, head.opcode, payload.freeze()).with_mask(mask);
                    log::trace!(
                        "decoded {} frame: {} bytes, masked={}",
                        frame.opcode,
                        len,
                        frame.is_masked()
                    );
                    return Ok(Some(frame));
                }
            }
        }
    }

    fn check_mask(&self, masked: bool) -> Result<()> {
        match (self.role.expects_masked(), masked) {
            (true, false) if !self.accept_unmasked => Err(Error::UnmaskedClientFrame),
            (false, true) => Err(Error::MaskedServerFrame),
            _ => Ok(()),
        }
    }

    fn after_length(&self, head: Head, len: usize) -> Result<State> {
        if len > self.max_payload_size {
            return Err(Error::OversizedPayload {
                size: len,
                max: self.max_payload_size,
            });
        }
        Ok(if head.masked {
            State::MaskKey { head, len }
        } else {
            State::Payload {
                head,
                len,
                mask: None,
            }
        })
    }
}
