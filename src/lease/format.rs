//! Sealing and opening the offline lease.
//!
//! Layout of the buffer under the outer cipher layer, all integers
//! little-endian:
//!
//! ```text
//! u32 len(timestamp) | u32 len(digest) | u32 len(inner)
//! i64 timestamp      | digest (20)     | inner (variable)
//! ```
//!
//! `inner` is the payload string under the inner cipher layer. The digest
//! covers `inner`, so a patched payload fails the comparison on open, and
//! the outer layer keeps the header itself from being located and patched
//! in place without first breaking the outer decryption. Belt and
//! suspenders, not bulletproof.

use crate::clock::Clock;
use crate::crypto::{cipher, digest};
use crate::errors::SkygateError;

const HEADER_LEN: usize = 12;
const TIMESTAMP_LEN: usize = 8;

/// A decoded lease: issue time plus the entitlement payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    /// Unix timestamp (seconds) captured at seal time.
    pub issued_at: i64,
    /// The entitlement record, exactly as passed to [`seal`].
    pub payload: String,
}

/// Seal `payload` into the on-disk lease representation.
pub fn seal(payload: &str, clock: &dyn Clock) -> Result<Vec<u8>, SkygateError> {
    let timestamp = clock.now_unix();
    let inner = cipher::encrypt(payload.as_bytes(), cipher::INNER_PASSPHRASE)?;
    let inner_digest = digest::digest(&inner);

    let mut merged =
        Vec::with_capacity(HEADER_LEN + TIMESTAMP_LEN + inner_digest.len() + inner.len());
    merged.extend_from_slice(&(TIMESTAMP_LEN as u32).to_le_bytes());
    merged.extend_from_slice(&(inner_digest.len() as u32).to_le_bytes());
    merged.extend_from_slice(&(inner.len() as u32).to_le_bytes());
    merged.extend_from_slice(&timestamp.to_le_bytes());
    merged.extend_from_slice(&inner_digest);
    merged.extend_from_slice(&inner);

    cipher::encrypt(&merged, cipher::OUTER_PASSPHRASE)
}

/// Open a sealed lease.
///
/// Every structural failure — outer decryption, bad lengths, truncation,
/// digest mismatch, inner decryption — is [`SkygateError::TamperDetected`];
/// nothing inside the lease is trusted past the first inconsistency. A
/// payload that survives all of that but is not UTF-8 is
/// [`SkygateError::CorruptRecord`].
pub fn open(bytes: &[u8]) -> Result<Lease, SkygateError> {
    let merged =
        cipher::decrypt(bytes, cipher::OUTER_PASSPHRASE).map_err(|_| SkygateError::TamperDetected)?;

    if merged.len() < HEADER_LEN {
        return Err(SkygateError::TamperDetected);
    }
    let ts_len = read_len(&merged, 0);
    let digest_len = read_len(&merged, 4);
    let inner_len = read_len(&merged, 8);

    if ts_len != TIMESTAMP_LEN || digest_len != digest::DIGEST_LEN {
        return Err(SkygateError::TamperDetected);
    }
    let expected_total = HEADER_LEN
        .checked_add(ts_len)
        .and_then(|n| n.checked_add(digest_len))
        .and_then(|n| n.checked_add(inner_len))
        .ok_or(SkygateError::TamperDetected)?;
    if merged.len() != expected_total {
        return Err(SkygateError::TamperDetected);
    }

    let ts_end = HEADER_LEN + ts_len;
    let digest_end = ts_end + digest_len;

    let ts_bytes: [u8; TIMESTAMP_LEN] = merged[HEADER_LEN..ts_end]
        .try_into()
        .map_err(|_| SkygateError::TamperDetected)?;
    let stored_digest = &merged[ts_end..digest_end];
    let inner = &merged[digest_end..];

    if digest::digest(inner).as_slice() != stored_digest {
        return Err(SkygateError::TamperDetected);
    }

    let payload_bytes = cipher::decrypt(inner, cipher::INNER_PASSPHRASE)
        .map_err(|_| SkygateError::TamperDetected)?;
    let payload = String::from_utf8(payload_bytes)
        .map_err(|e| SkygateError::CorruptRecord(format!("lease payload is not UTF-8: {e}")))?;

    Ok(Lease {
        issued_at: i64::from_le_bytes(ts_bytes),
        payload,
    })
}

fn read_len(merged: &[u8], at: usize) -> usize {
    u32::from_le_bytes([merged[at], merged[at + 1], merged[at + 2], merged[at + 3]]) as usize
}
