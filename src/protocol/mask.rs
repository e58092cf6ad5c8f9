//! XOR masking of frame payloads.
//!
//! Masking and unmasking are the same operation: byte `i` is XORed with
//! `key[i % 4]`.

/// Length of a frame mask key in bytes.
pub const MASK_KEY_LEN: usize = 4;

/// Byte-by-byte XOR masking, in place.
#[inline]
pub fn apply_mask(data: &mut [u8], mask: [u8; MASK_KEY_LEN]) {
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= mask[i % MASK_KEY_LEN];
    }
}

/// Word-at-a-time XOR masking, in place.
///
/// Produces exactly the same output as [`apply_mask`].
#[inline]
pub fn apply_mask_fast(data: &mut [u8], mask: [u8; MASK_KEY_LEN]) {
    let mask_u32 = u32::from_ne_bytes(mask);
    let mut chunks = data.chunks_exact_mut(MASK_KEY_LEN);

    for chunk in &mut chunks {
        let val = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        chunk.copy_from_slice(&(val ^ mask_u32).to_ne_bytes());
    }

    // Every full chunk started on a key boundary, so the tail restarts at key[0].
    for (byte, key) in chunks.into_remainder().iter_mut().zip(mask) {
        *byte ^= key;
    }
}

/// Return an unmasked copy of `encoded`.
///
/// Total for any length, including zero.
///
/// # Example
///
/// ```
/// use wsraw::protocol::mask::unmask;
///
/// let masked = [0x7f, 0x9f, 0x4d, 0x51, 0x58];
/// assert_eq!(unmask(&masked, [0x37, 0xfa, 0x21, 0x3d]), b"Hello");
/// ```
#[must_use]
pub fn unmask(encoded: &[u8], mask: [u8; MASK_KEY_LEN]) -> Vec<u8> {
    let mut data = encoded.to_vec();
    apply_mask_fast(&mut data, mask);
    data
}

/// Generate a random mask key for client-side frames.
///
/// Falls back to a time-derived key if the OS source fails.
#[must_use]
pub fn random_mask_key() -> [u8; MASK_KEY_LEN] {
    let mut key = [0u8; MASK_KEY_LEN];
    if getrandom::getrandom(&mut key).is_err() {
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u32)
            .unwrap_or(0x1234_5678);
        key = nanos.wrapping_mul(0x9E37_79B9).to_le_bytes();
    }
    key
}
