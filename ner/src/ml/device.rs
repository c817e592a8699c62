//! Device selection.

use candle_core::Device;
use candle_core::utils::{cuda_is_available, metal_is_available};

use super::error::{MLError, Result};
use crate::config::DeviceKind;

/// Resolve the configured device.
///
/// `Auto` prefers CUDA, then Metal, and falls back to the CPU. Asking for an
/// accelerator explicitly fails when it cannot be opened.
pub fn select_device(kind: DeviceKind) -> Result<Device> {
    match kind {
        DeviceKind::Cpu => Ok(Device::Cpu),
        DeviceKind::Cuda => Device::new_cuda(0)
            .map_err(|e| MLError::configuration(format!("CUDA device unavailable: {}", e))),
        DeviceKind::Metal => Device::new_metal(0)
            .map_err(|e| MLError::configuration(format!("Metal device unavailable: {}", e))),
        DeviceKind::Auto => {
            if cuda_is_available() {
                match Device::new_cuda(0) {
                    Ok(device) => return Ok(device),
                    Err(e) => tracing::warn!("CUDA reported available but failed to open: {}", e),
                }
            }
            if metal_is_available() {
                match Device::new_metal(0) {
                    Ok(device) => return Ok(device),
                    Err(e) => tracing::warn!("Metal reported available but failed to open: {}", e),
                }
            }
            Ok(Device::Cpu)
        }
    }
}

/// Short name of a device for logs.
pub fn device_name(device: &Device) -> &'static str {
    if device.is_cuda() {
        "cuda"
    } else if device.is_metal() {
        "metal"
    } else {
        "cpu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_is_always_available() {
        let device = select_device(DeviceKind::Cpu).unwrap();
        assert!(device.is_cpu());
        assert_eq!(device_name(&device), "cpu");
    }

    #[test]
    fn test_auto_never_fails() {
        assert!(select_device(DeviceKind::Auto).is_ok());
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn test_explicit_cuda_without_support_is_a_configuration_error() {
        let result = select_device(DeviceKind::Cuda);
        assert!(matches!(result, Err(MLError::Configuration(_))));
    }
}
