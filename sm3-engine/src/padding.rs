//! Merkle–Damgård padding computed from a length alone
//!
//! The padding appended to an `L`-byte message is
//! `0x80 ‖ 0x00 × k ‖ be64(8·L)`, with the smallest `k ≥ 0` making the padded
//! length a multiple of 64. It depends only on `L`, so it can be replayed for
//! a secret whose contents are unknown.

use crate::sm3::BLOCK_SIZE;

/// Size of the trailing big-endian bit-length field
pub const LENGTH_FIELD_SIZE: usize = 8;

/// Marker byte that starts every padding
pub const PADDING_MARKER: u8 = 0x80;

/// Number of zero bytes between the marker and the length field
fn zero_fill_len(original_len: u64) -> usize {
    let block = BLOCK_SIZE as u64;
    let used = original_len % block;
    // (block - 8 - 1 - used) mod block, kept non-negative
    ((2 * block - LENGTH_FIELD_SIZE as u64 - 1 - used) % block) as usize
}

/// Padding bytes the hash appends after a message of `original_len` bytes
///
/// # Example
///
/// ```rust
/// use sm3_engine::padding_for_length;
///
/// let padding = padding_for_length(3);
/// assert_eq!(padding.len(), 61);
/// assert_eq!(padding[0], 0x80);
/// assert_eq!(&padding[53..], &24u64.to_be_bytes());
/// ```
pub fn padding_for_length(original_len: u64) -> Vec<u8> {
    let zeros = zero_fill_len(original_len);
    let mut padding = Vec::with_capacity(1 + zeros + LENGTH_FIELD_SIZE);
    padding.push(PADDING_MARKER);
    padding.resize(1 + zeros, 0);
    padding.extend_from_slice(&original_len.wrapping_mul(8).to_be_bytes());
    padding
}

/// Length of a message of `original_len` bytes once padded
pub fn padded_length(original_len: u64) -> u64 {
    original_len.wrapping_add((1 + zero_fill_len(original_len) + LENGTH_FIELD_SIZE) as u64)
}
