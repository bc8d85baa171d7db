//! Lease persistence with atomic writes.
//!
//! One lease file under `dirs::data_dir()/<namespace>/`, written with a
//! temp file + rename so a crash mid-write cannot leave a half-written,
//! falsely tamper-flagged lease behind.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::SkygateError;

/// Name of the lease file inside the namespace directory.
const LEASE_FILE: &str = "entitlement.lease";

/// File-backed store for the single offline lease.
pub struct LeaseStore {
    lease_path: PathBuf,
}

impl LeaseStore {
    /// Create a store under `dirs::data_dir()/<namespace>/`.
    ///
    /// Each product should use a unique namespace to avoid collisions.
    pub fn new(namespace: &str) -> Result<Self, SkygateError> {
        let base_dir = dirs::data_dir()
            .ok_or_else(|| SkygateError::LeaseIo("could not find data directory".to_string()))?;
        Self::with_path(base_dir.join(namespace).join(LEASE_FILE))
    }

    /// Create a store at an explicit lease file path.
    pub fn with_path(lease_path: PathBuf) -> Result<Self, SkygateError> {
        if let Some(parent) = lease_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SkygateError::LeaseIo(format!("failed to create lease dir: {e}")))?;
        }
        Ok(Self { lease_path })
    }

    /// Path of the lease file.
    pub fn path(&self) -> &Path {
        &self.lease_path
    }

    /// Whether a lease exists on disk.
    pub fn exists(&self) -> bool {
        self.lease_path.exists()
    }

    /// Write the sealed lease atomically (fully or not at all).
    pub fn save(&self, sealed: &[u8]) -> Result<(), SkygateError> {
        let temp_path = self.lease_path.with_extension("tmp");

        fs::write(&temp_path, sealed)
            .map_err(|e| SkygateError::LeaseIo(format!("failed to write temp file: {e}")))?;

        fs::rename(&temp_path, &self.lease_path)
            .map_err(|e| SkygateError::LeaseIo(format!("failed to rename lease file: {e}")))?;

        Ok(())
    }

    /// Read the sealed lease, or `None` if none has ever been written.
    pub fn load(&self) -> Result<Option<Vec<u8>>, SkygateError> {
        if !self.lease_path.exists() {
            return Ok(None);
        }

        fs::read(&self.lease_path)
            .map(Some)
            .map_err(|e| SkygateError::LeaseIo(format!("failed to read lease file: {e}")))
    }

    /// Remove the lease file if present.
    ///
    /// Never called automatically by the authentication flow; a rejected
    /// lease stays on disk for inspection.
    pub fn delete(&self) -> Result<(), SkygateError> {
        if self.lease_path.exists() {
            fs::remove_file(&self.lease_path)
                .map_err(|e| SkygateError::LeaseIo(format!("failed to delete lease: {e}")))?;
        }
        Ok(())
    }
}
