use std::fs;

use super::{require_nonempty, run};
use crate::errors::SkygateError;

/// First enumerated processor's model string from /proc/cpuinfo.
pub fn processor_id() -> Result<String, SkygateError> {
    let cpuinfo = fs::read_to_string("/proc/cpuinfo")
        .map_err(|e| SkygateError::FingerprintUnavailable(format!("/proc/cpuinfo: {e}")))?;
    let model = cpuinfo
        .lines()
        .find(|line| line.starts_with("model name"))
        .and_then(|line| line.split(':').nth(1))
        .map(str::trim)
        .unwrap_or_default();
    require_nonempty("processor id", model.to_string())
}

/// Volume identifier of the filesystem mounted at the root.
pub fn volume_serial() -> Result<String, SkygateError> {
    let uuid = run("findmnt", &["-no", "UUID", "/"])?;
    require_nonempty("volume serial", uuid)
}

/// DMI product UUID, with the machine id as a fallback where DMI is
/// unreadable without privileges.
pub fn system_uuid() -> Result<String, SkygateError> {
    for path in ["/sys/class/dmi/id/product_uuid", "/etc/machine-id"] {
        if let Ok(contents) = fs::read_to_string(path) {
            let trimmed = contents.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_string());
            }
        }
    }
    Err(SkygateError::FingerprintUnavailable(
        "no readable product UUID or machine id".to_string(),
    ))
}
