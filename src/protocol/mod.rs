//! WebSocket protocol engine: masking, handshake, frame encoding and decoding.

pub mod decoder;
pub mod frame;
pub mod handshake;
pub mod mask;
pub mod opcode;

pub use decoder::FrameDecoder;
pub use frame::{Frame, MAX_PAYLOAD_LEN, encode, encode_masked};
pub use handshake::{
    HandshakeRequest, HandshakeResponse, WS_GUID, build_response, derive_accept, find_head_end,
};
pub use mask::{apply_mask, apply_mask_fast, random_mask_key, unmask};
pub use opcode::OpCode;
