use super::{require_nonempty, run};
use crate::errors::SkygateError;

/// Processor brand string.
pub fn processor_id() -> Result<String, SkygateError> {
    let brand = run("sysctl", &["-n", "machdep.cpu.brand_string"])?;
    require_nonempty("processor id", brand)
}

/// Volume UUID of the root volume.
pub fn volume_serial() -> Result<String, SkygateError> {
    let info = run("diskutil", &["info", "/"])?;
    let uuid = info
        .lines()
        .find(|line| line.trim_start().starts_with("Volume UUID"))
        .and_then(|line| line.split(':').nth(1))
        .map(str::trim)
        .unwrap_or_default();
    require_nonempty("volume serial", uuid.to_string())
}

/// IOPlatformUUID from the platform expert device.
pub fn system_uuid() -> Result<String, SkygateError> {
    let ioreg = run("ioreg", &["-rd1", "-c", "IOPlatformExpertDevice"])?;
    let uuid = ioreg
        .lines()
        .find(|line| line.contains("IOPlatformUUID"))
        .and_then(|line| line.split('"').nth(3))
        .unwrap_or_default();
    require_nonempty("system UUID", uuid.to_string())
}
