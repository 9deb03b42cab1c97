//! SM3 compression function and Merkle–Damgård chaining
//!
//! # About SM3
//!
//! SM3 is the Chinese national hash standard (GB/T 32905-2016). It shares the
//! Merkle–Damgård shape of SHA-256:
//!
//! - **State**: 8 × 32-bit words, seeded from a fixed IV
//! - **Block**: 64 bytes, expanded into 68 + 64 schedule words
//! - **Rounds**: 64, with boolean functions that switch at round 16
//! - **Feed-forward**: the round output is XOR-ed (not added) into the state
//!
//! The running state is exposed through [`HashState`] so a chain can be resumed
//! from any 32-byte value. That is exactly what makes length extension possible
//! (see [`crate::extension`]).
//!
//! # Example
//!
//! ```rust
//! use sm3_engine::{hash, to_hex};
//!
//! let digest = hash(b"abc");
//! assert_eq!(
//!     to_hex(&digest),
//!     "66c7f0f462eeedd9d1f2d46bdc10e4e24167c4875cf2f7a2297da02b8f4ba8e0"
//! );
//! ```

use crate::error::{HashError, Result};
use crate::padding::padding_for_length;

/// Digest size in bytes
pub const DIGEST_SIZE: usize = 32;

/// Compression block size in bytes
pub const BLOCK_SIZE: usize = 64;

/// 32-byte SM3 digest (big-endian state words)
pub type Digest = [u8; DIGEST_SIZE];

/// Standard initialization vector
const IV: [u32; 8] = [
    0x7380166F, 0x4914B2B9, 0x172442D7, 0xDA8A0600,
    0xA96F30BC, 0x163138AA, 0xE38DEE4D, 0xB0FB0E4E,
];

/// Round constant for rounds 0..16
const T_EARLY: u32 = 0x79CC4519;

/// Round constant for rounds 16..64
const T_LATE: u32 = 0x7A879D8A;

/// Rounds below this index use the XOR variants of FF/GG
const BOOLEAN_SWITCH_ROUND: usize = 16;

#[inline]
fn t(j: usize) -> u32 {
    if j < BOOLEAN_SWITCH_ROUND {
        T_EARLY
    } else {
        T_LATE
    }
}

#[inline]
fn p0(x: u32) -> u32 {
    x ^ x.rotate_left(9) ^ x.rotate_left(17)
}

#[inline]
fn p1(x: u32) -> u32 {
    x ^ x.rotate_left(15) ^ x.rotate_left(23)
}

#[inline]
fn ff(a: u32, b: u32, c: u32, j: usize) -> u32 {
    if j < BOOLEAN_SWITCH_ROUND {
        a ^ b ^ c
    } else {
        (a & b) | (a & c) | (b & c)
    }
}

#[inline]
fn gg(e: u32, f: u32, g: u32, j: usize) -> u32 {
    if j < BOOLEAN_SWITCH_ROUND {
        e ^ f ^ g
    } else {
        (e & f) | (!e & g)
    }
}

/// Running SM3 chaining value
///
/// Eight 32-bit words. Serialized big-endian word by word it is the digest,
/// and any digest parses back into a state the chain accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashState([u32; 8]);

impl HashState {
    /// The standard IV
    pub const fn initial() -> Self {
        Self(IV)
    }

    /// Parse a digest (or any 32-byte value) as a chaining state
    pub fn from_digest(digest: &Digest) -> Self {
        let mut words = [0u32; 8];
        for (word, chunk) in words.iter_mut().zip(digest.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self(words)
    }

    /// Parse a state from an arbitrary byte slice
    ///
    /// # Errors
    /// - `InvalidStateLength` unless the slice is exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let digest: &Digest = bytes.try_into().map_err(|_| HashError::InvalidStateLength {
            expected: DIGEST_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self::from_digest(digest))
    }

    /// Parse a state from its hex form
    pub fn from_hex(encoded: &str) -> Result<Self> {
        let bytes = hex::decode(encoded.trim())?;
        Self::from_slice(&bytes)
    }

    pub fn words(&self) -> [u32; 8] {
        self.0
    }

    /// Serialize as a digest (big-endian words)
    pub fn to_bytes(&self) -> Digest {
        let mut digest = [0u8; DIGEST_SIZE];
        for (chunk, word) in digest.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        digest
    }

    /// Fold one 64-byte block into the state
    ///
    /// Expands the block into 68 words `W` and 64 words `W'`, runs the 64
    /// rounds, then XORs the working registers back into the state.
    pub fn compress(&mut self, block: &[u8; BLOCK_SIZE]) {
        let mut w = [0u32; 68];
        for (word, chunk) in w.iter_mut().zip(block.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        for j in 16..68 {
            w[j] = p1(w[j - 16] ^ w[j - 9] ^ w[j - 3].rotate_left(15))
                ^ w[j - 13].rotate_left(7)
                ^ w[j - 6];
        }

        let mut w_prime = [0u32; 64];
        for (j, word) in w_prime.iter_mut().enumerate() {
            *word = w[j] ^ w[j + 4];
        }

        let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = self.0;

        for j in 0..64 {
            let a12 = a.rotate_left(12);
            // rotation amount is taken mod 32 for rounds 32..64
            let tj = t(j).rotate_left((j % 32) as u32);
            let ss1 = a12.wrapping_add(e).wrapping_add(tj).rotate_left(7);
            let ss2 = ss1 ^ a12;
            let tt1 = ff(a, b, c, j)
                .wrapping_add(d)
                .wrapping_add(ss2)
                .wrapping_add(w_prime[j]);
            let tt2 = gg(e, f, g, j)
                .wrapping_add(h)
                .wrapping_add(ss1)
                .wrapping_add(w[j]);

            d = c;
            c = b.rotate_left(9);
            b = a;
            a = tt1;
            h = g;
            g = f.rotate_left(19);
            f = e;
            e = p0(tt2);
        }

        for (word, register) in self.0.iter_mut().zip([a, b, c, d, e, f, g, h]) {
            *word ^= register;
        }
    }
}

impl Default for HashState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Incremental SM3 hasher
///
/// Blocks are compressed strictly in input order as soon as 64 bytes are
/// buffered; `finalize` appends the Merkle–Damgård padding for the total
/// number of bytes this chain has absorbed.
///
/// # Example
///
/// ```rust
/// use sm3_engine::{hash, Sm3};
///
/// let mut hasher = Sm3::new();
/// hasher.update(b"a");
/// hasher.update(b"bc");
/// assert_eq!(hasher.finalize(), hash(b"abc"));
/// ```
#[derive(Debug, Clone)]
pub struct Sm3 {
    state: HashState,
    buffer: [u8; BLOCK_SIZE],
    buffer_len: usize,
    /// Bytes absorbed by the chain, including any resumed prefix
    length: u64,
}

impl Sm3 {
    /// Start a fresh chain from the standard IV
    pub fn new() -> Self {
        Self::with_state(HashState::initial())
    }

    /// Start a chain from an arbitrary state
    ///
    /// Padding only counts bytes fed to this hasher, as if `state` were the IV.
    pub fn with_state(state: HashState) -> Self {
        Self::from_parts(state, 0)
    }

    /// Continue a chain that has already absorbed `processed_len` bytes
    ///
    /// The final length field then covers the prefix as well, which is what a
    /// continuation of a real hash computation needs.
    ///
    /// # Errors
    /// - `UnalignedResume` if `processed_len` is not a multiple of 64
    pub fn resume(state: HashState, processed_len: u64) -> Result<Self> {
        if processed_len % BLOCK_SIZE as u64 != 0 {
            return Err(HashError::UnalignedResume(processed_len));
        }
        Ok(Self::from_parts(state, processed_len))
    }

    pub(crate) fn from_parts(state: HashState, processed_len: u64) -> Self {
        Self {
            state,
            buffer: [0u8; BLOCK_SIZE],
            buffer_len: 0,
            length: processed_len,
        }
    }

    /// Absorb more message bytes
    pub fn update(&mut self, mut data: &[u8]) {
        self.length = self.length.wrapping_add(data.len() as u64);

        if self.buffer_len > 0 {
            let take = (BLOCK_SIZE - self.buffer_len).min(data.len());
            self.buffer[self.buffer_len..self.buffer_len + take].copy_from_slice(&data[..take]);
            self.buffer_len += take;
            data = &data[take..];

            if self.buffer_len < BLOCK_SIZE {
                return;
            }
            let block = self.buffer;
            self.state.compress(&block);
            self.buffer_len = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for chunk in &mut blocks {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(chunk);
            self.state.compress(&block);
        }

        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffer_len = rest.len();
    }

    /// Current chaining state (ignores buffered, not yet compressed bytes)
    pub fn state(&self) -> HashState {
        self.state
    }

    /// Bytes absorbed so far
    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Pad and return the digest
    pub fn finalize(mut self) -> Digest {
        let padding = padding_for_length(self.length);
        self.update(&padding);
        debug_assert_eq!(self.buffer_len, 0, "padding must end on a block boundary");
        self.state.to_bytes()
    }
}

impl Default for Sm3 {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a complete message from the standard IV
pub fn hash(message: &[u8]) -> Digest {
    let mut hasher = Sm3::new();
    hasher.update(message);
    hasher.finalize()
}

/// Hash `message` starting from `initial_state` instead of the IV
///
/// The padding encodes `message.len()` only. Any 32-byte value, including a
/// previously published digest, is a valid starting state.
pub fn hash_from_state(initial_state: &Digest, message: &[u8]) -> Digest {
    let mut hasher = Sm3::with_state(HashState::from_digest(initial_state));
    hasher.update(message);
    hasher.finalize()
}

/// Hex form of a digest, for display only
pub fn to_hex(digest: &Digest) -> String {
    hex::encode(digest)
}

/// Parse a hex digest
pub fn digest_from_hex(encoded: &str) -> Result<Digest> {
    let bytes = hex::decode(encoded.trim())?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| HashError::InvalidStateLength {
            expected: DIGEST_SIZE,
            actual: bytes.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iv_round_trips_through_bytes() {
        let state = HashState::initial();
        let bytes = state.to_bytes();
        assert_eq!(&bytes[..4], &[0x73, 0x80, 0x16, 0x6F]);
        assert_eq!(HashState::from_digest(&bytes), state);
    }

    #[test]
    fn test_boolean_functions_switch_at_round_16() {
        let (x, y, z) = (0xF0F0_F0F0, 0xFF00_FF00, 0x0F0F_0F0F);
        assert_eq!(ff(x, y, z, 15), x ^ y ^ z);
        assert_eq!(ff(x, y, z, 16), (x & y) | (x & z) | (y & z));
        assert_eq!(gg(x, y, z, 15), x ^ y ^ z);
        assert_eq!(gg(x, y, z, 16), (x & y) | (!x & z));
        assert_eq!(t(15), T_EARLY);
        assert_eq!(t(16), T_LATE);
    }

    #[test]
    fn test_permutations() {
        assert_eq!(p0(0), 0);
        assert_eq!(p1(0), 0);
        assert_eq!(p0(1), 1 | (1 << 9) | (1 << 17));
        assert_eq!(p1(1), 1 | (1 << 15) | (1 << 23));
    }

    #[test]
    fn test_compress_changes_state() {
        let mut state = HashState::initial();
        state.compress(&[0u8; BLOCK_SIZE]);
        assert_ne!(state, HashState::initial());
    }

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        match HashState::from_slice(&[0u8; 31]) {
            Err(HashError::InvalidStateLength { expected, actual }) => {
                assert_eq!(expected, 32);
                assert_eq!(actual, 31);
            }
            other => panic!("Expected InvalidStateLength, got {:?}", other),
        }
    }

    #[test]
    fn test_from_hex() {
        let state = HashState::from_hex(
            "7380166f4914b2b9172442d7da8a0600a96f30bc163138aae38dee4db0fb0e4e",
        )
        .unwrap();
        assert_eq!(state, HashState::initial());
        assert!(matches!(HashState::from_hex("zz"), Err(HashError::InvalidHex(_))));
    }

    #[test]
    fn test_streaming_split_points() {
        let message: Vec<u8> = (0..=255u8).cycle().take(300).collect();
        let expected = hash(&message);

        for split in [0, 1, 63, 64, 65, 128, 200, 300] {
            let mut hasher = Sm3::new();
            hasher.update(&message[..split]);
            hasher.update(&message[split..]);
            assert_eq!(hasher.finalize(), expected, "split at {}", split);
        }
    }

    #[test]
    fn test_byte_at_a_time() {
        let message = b"The quick brown fox jumps over the lazy dog, repeatedly and at length";
        let mut hasher = Sm3::new();
        for byte in message.iter() {
            hasher.update(std::slice::from_ref(byte));
        }
        assert_eq!(hasher.len(), message.len() as u64);
        assert_eq!(hasher.finalize(), hash(message));
    }

    #[test]
    fn test_resume_requires_alignment() {
        assert!(Sm3::resume(HashState::initial(), 64).is_ok());
        assert!(matches!(
            Sm3::resume(HashState::initial(), 65),
            Err(HashError::UnalignedResume(65))
        ));
    }

    #[test]
    fn test_hash_from_iv_equals_hash() {
        let iv = HashState::initial().to_bytes();
        assert_eq!(hash_from_state(&iv, b"abc"), hash(b"abc"));
    }

    #[test]
    fn test_digest_hex_round_trip() {
        let digest = hash(b"hex");
        assert_eq!(digest_from_hex(&to_hex(&digest)).unwrap(), digest);
        assert!(digest_from_hex("abcd").is_err());
    }
}
