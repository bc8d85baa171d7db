//! Lease content digest.

use sha1::{Digest, Sha1};

/// Digest length in bytes.
pub const DIGEST_LEN: usize = 20;

/// Compute the 20-byte content digest of `data`.
///
/// SHA-1: deterministic tamper evidence for the lease file, not adversarial
/// collision resistance. No error cases.
pub fn digest(data: &[u8]) -> [u8; DIGEST_LEN] {
    let hash = Sha1::digest(data);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&hash);
    out
}

/// Lowercase hex encoding of [`digest`], used for the machine fingerprint.
pub fn hex_digest(data: &[u8]) -> String {
    hex::encode(digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_known_vector() {
        // SHA-1("abc")
        assert_eq!(
            hex::encode(digest(b"abc")),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_digest_empty_input() {
        assert_eq!(
            hex::encode(digest(b"")),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn test_digest_is_deterministic() {
        assert_eq!(digest(b"lease payload"), digest(b"lease payload"));
        assert_ne!(digest(b"lease payload"), digest(b"lease payloae"));
    }

    #[test]
    fn test_digest_length() {
        assert_eq!(digest(b"anything").len(), DIGEST_LEN);
    }

    #[test]
    fn test_hex_digest_format() {
        let hexed = hex_digest(b"anything");
        assert_eq!(hexed.len(), DIGEST_LEN * 2);
        assert!(hexed.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hexed, hexed.to_lowercase());
    }
}
