//! Skygate error types.

use thiserror::Error;

/// Errors that can occur during entitlement authentication.
#[derive(Debug, Error)]
pub enum SkygateError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Settings file or the `Networking.APIKey` entry is absent.
    ///
    /// Terminal for the online path of the current attempt; never a crash.
    #[error("Configuration missing: {0}")]
    ConfigMissing(String),

    /// The remote entitlement service is not reachable.
    #[error("Entitlement service unavailable")]
    NetworkUnavailable,

    /// HTTP transport error communicating with the entitlement service.
    #[error("Entitlement transport error: {0}")]
    Transport(String),

    /// Lease digest mismatch, or a structurally malformed lease.
    ///
    /// The lease is left on disk for inspection but is never trusted.
    #[error("Lease tampering detected")]
    TamperDetected,

    /// Structured record missing its identity field or unparseable.
    #[error("Corrupt entitlement record: {0}")]
    CorruptRecord(String),

    /// Offline authentication attempted with no lease file present.
    #[error("No offline lease found")]
    NoLeaseFound,

    /// Lease file I/O error.
    #[error("Lease I/O error: {0}")]
    LeaseIo(String),

    /// Symmetric cipher failure (malformed or modified ciphertext).
    ///
    /// Folded into [`SkygateError::TamperDetected`] at the lease codec
    /// boundary; callers outside `crypto` never see it on the load path.
    #[error("Cipher failure: {0}")]
    CipherFailure(String),

    /// A platform identifier needed for the machine fingerprint could not
    /// be read. Fatal for lease binding; no placeholder is substituted.
    #[error("Machine fingerprint unavailable: {0}")]
    FingerprintUnavailable(String),

    /// The background authentication task could not be spawned.
    #[error("Failed to spawn authentication task: {0}")]
    TaskSpawn(String),
}
