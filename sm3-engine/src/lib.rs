//! SM3 hash engine with an exposed chaining state
//!
//! Provides the SM3 compression function, Merkle–Damgård padding, and a
//! length-extension forgery built on the resumable state.
//!
//! # Quick Start
//!
//! ```rust
//! use sm3_engine::{extend, hash, padding_for_length};
//!
//! // Hash a message
//! let secret = b"server-side secret";
//! let digest = hash(secret);
//! assert_eq!(digest.len(), 32);
//!
//! // Extend it without knowing the secret, only its length
//! let forged = extend(&digest, secret.len() as u64, b"&admin=true");
//!
//! let mut message = secret.to_vec();
//! message.extend_from_slice(&padding_for_length(secret.len() as u64));
//! message.extend_from_slice(b"&admin=true");
//! assert_eq!(forged, hash(&message));
//! ```

pub mod error;
pub mod extension;
pub mod padding;
pub mod sm3;

// Re-export commonly used types
pub use error::{HashError, Result};
pub use extension::{extend, forge, ExtensionForgery};
pub use padding::{padded_length, padding_for_length};
pub use sm3::{
    digest_from_hex, hash, hash_from_state, to_hex, Digest, HashState, Sm3, BLOCK_SIZE,
    DIGEST_SIZE,
};
