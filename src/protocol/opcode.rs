//! WebSocket frame opcodes.
//!
//! The engine only produces text frames and never branches on the opcode of
//! an incoming frame. Decoding is therefore total: unknown values are kept as
//! [`OpCode::Reserved`] instead of being rejected.

/// WebSocket frame opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum OpCode {
    /// Continuation frame (0x0).
    Continuation,
    /// Text frame (0x1).
    Text,
    /// Binary frame (0x2).
    Binary,
    /// Close frame (0x8).
    Close,
    /// Ping frame (0x9).
    Ping,
    /// Pong frame (0xA).
    Pong,
    /// Any other 4-bit value.
    Reserved(u8),
}

impl OpCode {
    /// Decode the low nibble of a frame's first byte.
    #[must_use]
    pub const fn from_u8(byte: u8) -> Self {
        match byte & 0x0F {
            0x0 => OpCode::Continuation,
            0x1 => OpCode::Text,
            0x2 => OpCode::Binary,
            0x8 => OpCode::Close,
            0x9 => OpCode::Ping,
            0xA => OpCode::Pong,
            other => OpCode::Reserved(other),
        }
    }

    /// Convert OpCode to raw byte value.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            OpCode::Continuation => 0x0,
            OpCode::Text => 0x1,
            OpCode::Binary => 0x2,
            OpCode::Close => 0x8,
            OpCode::Ping => 0x9,
            OpCode::Pong => 0xA,
            OpCode::Reserved(value) => value & 0x0F,
        }
    }

    /// Check if this is a control frame opcode (Close, Ping, Pong).
    #[inline]
    #[must_use]
    pub const fn is_control(self) -> bool {
        matches!(self, OpCode::Close | OpCode::Ping | OpCode::Pong)
    }

    /// Get human-readable name for this opcode.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            OpCode::Continuation => "Continuation",
            OpCode::Text => "Text",
            OpCode::Binary => "Binary",
            OpCode::Close => "Close",
            OpCode::Ping => "Ping",
            OpCode::Pong => "Pong",
            OpCode::Reserved(_) => "Reserved",
        }
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpCode::Reserved(value) => write!(f, "Reserved({:#x})", value),
            other => write!(f, "{}", other.name()),
        }
    }
}
