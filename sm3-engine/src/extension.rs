//! Length-extension forgery against SM3
//!
//! Given `hash(secret)` and `secret.len()`, anyone can compute
//! `hash(secret ‖ padding_for_length(secret.len()) ‖ suffix)` without knowing
//! `secret`: the digest *is* the chaining state after the padded secret, so the
//! chain can simply be continued. Keyed constructions of the form
//! `H(key ‖ message)` are therefore not MACs.

use crate::padding::{padded_length, padding_for_length};
use crate::sm3::{Digest, HashState, Sm3};

/// Result of a forgery: the new digest and the bytes to send after the secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionForgery {
    /// Digest of `secret ‖ forged_tail`
    pub digest: Digest,

    /// `padding_for_length(secret_len) ‖ suffix`
    pub forged_tail: Vec<u8>,
}

/// Digest of `secret ‖ padding(secret) ‖ suffix`, knowing only `hash(secret)`
///
/// The chain is resumed with the glue padding already counted, so only
/// `suffix` is compressed and the final length field covers the whole forged
/// message.
///
/// # Example
///
/// ```rust
/// use sm3_engine::{extend, hash, padding_for_length};
///
/// let secret = b"key=0123456789";
/// let forged = extend(&hash(secret), secret.len() as u64, b"&admin=true");
///
/// let mut message = secret.to_vec();
/// message.extend_from_slice(&padding_for_length(secret.len() as u64));
/// message.extend_from_slice(b"&admin=true");
/// assert_eq!(forged, hash(&message));
/// ```
pub fn extend(original_digest: &Digest, secret_len: u64, suffix: &[u8]) -> Digest {
    let processed = padded_length(secret_len);
    tracing::debug!(
        "Extending digest: secret_len={}, resumed_at={}, suffix_len={}",
        secret_len,
        processed,
        suffix.len()
    );

    // padded_length is always block aligned
    let mut hasher = Sm3::from_parts(HashState::from_digest(original_digest), processed);
    hasher.update(suffix);
    hasher.finalize()
}

/// Like [`extend`], also returning the message tail an attacker would submit
pub fn forge(original_digest: &Digest, secret_len: u64, suffix: &[u8]) -> ExtensionForgery {
    let mut forged_tail = padding_for_length(secret_len);
    forged_tail.extend_from_slice(suffix);

    ExtensionForgery {
        digest: extend(original_digest, secret_len, suffix),
        forged_tail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sm3::hash;

    fn concat(parts: &[&[u8]]) -> Vec<u8> {
        parts.iter().flat_map(|p| p.iter().copied()).collect()
    }

    #[test]
    fn test_extend_matches_direct_hash() {
        let secret = [0x5Au8; 16];
        let suffix = b"admin=true";

        let forged = extend(&hash(&secret), secret.len() as u64, suffix);
        let glue = padding_for_length(secret.len() as u64);
        let direct = hash(&concat(&[&secret, &glue, suffix]));

        assert_eq!(forged, direct);
    }

    #[test]
    fn test_padding_is_load_bearing() {
        let secret = [0x5Au8; 16];
        let suffix = b"admin=true";

        let forged = extend(&hash(&secret), secret.len() as u64, suffix);
        assert_ne!(forged, hash(&concat(&[&secret, suffix])));
    }

    #[test]
    fn test_wrong_secret_length_fails() {
        let secret = b"twelve bytes";
        let suffix = b"&role=root";
        let digest = hash(secret);

        let glue = padding_for_length(secret.len() as u64);
        let direct = hash(&concat(&[secret, &glue, suffix]));

        assert_eq!(extend(&digest, 12, suffix), direct);
        assert_ne!(extend(&digest, 11, suffix), direct);
        assert_ne!(extend(&digest, 13, suffix), direct);
    }

    #[test]
    fn test_forge_tail() {
        let secret = b"s3cr3t";
        let forgery = forge(&hash(secret), secret.len() as u64, b"!");

        assert_eq!(forgery.forged_tail.last(), Some(&b'!'));
        assert_eq!((secret.len() + forgery.forged_tail.len() - 1) % 64, 0);
        assert_eq!(forgery.digest, hash(&concat(&[secret, &forgery.forged_tail])));
    }

    #[test]
    fn test_empty_suffix() {
        let secret = b"";
        let forged = extend(&hash(secret), 0, b"");
        assert_eq!(forged, hash(&padding_for_length(0)));
    }
}
