use super::{require_nonempty, run};
use crate::errors::SkygateError;

/// ProcessorId of the first enumerated CPU.
pub fn processor_id() -> Result<String, SkygateError> {
    let output = run("wmic", &["cpu", "get", "ProcessorId"])?;
    require_nonempty("processor id", second_line(&output))
}

/// Volume serial number of the system drive.
pub fn volume_serial() -> Result<String, SkygateError> {
    let output = run("cmd", &["/C", "vol", "C:"])?;
    let serial = output
        .lines()
        .find_map(|line| line.split("Serial Number is").nth(1))
        .map(str::trim)
        .unwrap_or_default();
    require_nonempty("volume serial", serial.to_string())
}

/// System product UUID.
pub fn system_uuid() -> Result<String, SkygateError> {
    let output = run("wmic", &["csproduct", "get", "UUID"])?;
    require_nonempty("system UUID", second_line(&output))
}

/// wmic prints a header line followed by the value.
fn second_line(output: &str) -> String {
    output.lines().nth(1).unwrap_or_default().trim().to_string()
}
