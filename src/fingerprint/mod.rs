//! Stable per-machine fingerprint.
//!
//! Three locally queryable identifiers — processor ID string, volume serial
//! of the drive hosting the system, system/product UUID — concatenated in
//! that fixed order and fed through the content hasher. The hex digest is
//! the fingerprint.
//!
//! The value is computed at most once per process, even under concurrent
//! first calls; only a successful computation is cached. A failed platform
//! query is an error: without a fingerprint the offline lease cannot be
//! trusted to belong to this machine, so no placeholder is substituted.

use std::process::Command;

use once_cell::sync::OnceCell;

use crate::crypto::digest;
use crate::errors::SkygateError;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
use linux as platform;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
use macos as platform;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
use windows as platform;

static FINGERPRINT: OnceCell<String> = OnceCell::new();

/// Return the machine fingerprint, computing it on first call.
pub fn machine_fingerprint() -> Result<&'static str, SkygateError> {
    FINGERPRINT
        .get_or_try_init(|| {
            let cpu = platform::processor_id()?;
            let disk = platform::volume_serial()?;
            let uuid = platform::system_uuid()?;
            Ok(compose(&cpu, &disk, &uuid))
        })
        .map(String::as_str)
}

/// Hash the three identifiers in fixed order (CPU, disk, UUID).
fn compose(cpu: &str, disk: &str, uuid: &str) -> String {
    digest::hex_digest(format!("{cpu}{disk}{uuid}").as_bytes())
}

/// Run a platform query command and capture stdout.
fn run(cmd: &str, args: &[&str]) -> Result<String, SkygateError> {
    let output = Command::new(cmd)
        .args(args)
        .output()
        .map_err(|e| SkygateError::FingerprintUnavailable(format!("{cmd}: {e}")))?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Reject blank query results so a silent failure never becomes part of a
/// fingerprint.
fn require_nonempty(what: &'static str, value: String) -> Result<String, SkygateError> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        return Err(SkygateError::FingerprintUnavailable(format!(
            "{what} query returned nothing"
        )));
    }
    Ok(trimmed)
}
