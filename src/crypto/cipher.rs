//! Passphrase-based symmetric encryption for the lease file.
//!
//! Key and nonce are both derived from the passphrase with
//! PBKDF2-HMAC-SHA256 over a fixed salt, so the same plaintext under the
//! same passphrase always encrypts to the same bytes. The lease format
//! depends on that determinism; it trades away semantic security, which is
//! acceptable here because the goal is tamper evidence for a file at rest,
//! not secrecy against pattern analysis.
//!
//! The two lease passphrases and the salt live in this module only. They
//! are compiled into the binary and provide obfuscation, not real secrecy.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::errors::SkygateError;

/// AES-256 key size in bytes.
pub const KEY_SIZE: usize = 32;

/// GCM nonce size in bytes (96-bit).
pub const NONCE_SIZE: usize = 12;

/// GCM authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// PBKDF2 iteration count. Changing it invalidates every lease ever written.
const KDF_ROUNDS: u32 = 4096;

/// Fixed application-wide KDF salt (18 bytes). Not secret, not per-call.
pub(crate) const KDF_SALT: [u8; 18] = [
    0x9c, 0x41, 0xd2, 0x07, 0x6e, 0xba, 0x33, 0x58, 0xaf, 0x12, 0xe0, 0x7b, 0x94, 0x26, 0xcd,
    0x65, 0x1f, 0x88,
];

/// Passphrase for the inner payload layer.
pub(crate) const INNER_PASSPHRASE: &str = "vK2#tower-lease-payload!9qR";

/// Passphrase for the outer envelope layer. Must stay distinct from
/// [`INNER_PASSPHRASE`] so the header is not decryptable with the payload key.
pub(crate) const OUTER_PASSPHRASE: &str = "mX7$tower-lease-envelope&3wZ";

/// Derive the AES key and nonce for a passphrase.
fn derive_material(passphrase: &str) -> ([u8; KEY_SIZE], [u8; NONCE_SIZE]) {
    let mut okm = [0u8; KEY_SIZE + NONCE_SIZE];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), &KDF_SALT, KDF_ROUNDS, &mut okm);

    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&okm[..KEY_SIZE]);
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&okm[KEY_SIZE..]);
    (key, nonce)
}

/// Encrypt `plaintext` under a passphrase-derived key and nonce.
///
/// Deterministic: the same passphrase and plaintext yield identical output.
pub fn encrypt(plaintext: &[u8], passphrase: &str) -> Result<Vec<u8>, SkygateError> {
    let (key, nonce) = derive_material(passphrase);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

    cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| SkygateError::CipherFailure(format!("encryption failed: {e}")))
}

/// Decrypt bytes produced by [`encrypt`] with the same passphrase.
///
/// Truncated, modified, or otherwise malformed ciphertext is a
/// [`SkygateError::CipherFailure`]. The lease codec treats that as an
/// invalid lease, never as a fatal error.
pub fn decrypt(ciphertext: &[u8], passphrase: &str) -> Result<Vec<u8>, SkygateError> {
    if ciphertext.len() < TAG_SIZE {
        return Err(SkygateError::CipherFailure(
            "ciphertext too short".to_string(),
        ));
    }

    let (key, nonce) = derive_material(passphrase);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

    cipher
        .decrypt(Nonce::from_slice(&nonce), ciphertext)
        .map_err(|e| SkygateError::CipherFailure(format!("decryption failed: {e}")))
}
