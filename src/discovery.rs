//! Device discovery: count Quantis cards by probing their device nodes.

use std::path::{Path, PathBuf};

use crate::chardev::CharDevice;
use crate::device::DEV_PREFIX;
use crate::handle::{DeviceHandle, Driver};
use crate::types::DeviceType;

/// Path of device `number` under `prefix`, e.g. `/dev/qrandom0`.
pub fn device_path(prefix: &Path, number: u32) -> PathBuf {
    let mut path = prefix.as_os_str().to_owned();
    path.push(number.to_string());
    PathBuf::from(path)
}

/// Count Quantis devices of `device_type` under `/dev/qrandom*`.
///
/// Returns 0 for device classes without driver support.
pub fn count_devices(device_type: DeviceType) -> usize {
    count_devices_with(&CharDevice, Path::new(DEV_PREFIX), device_type)
}

/// Count devices by opening `prefix0`, `prefix1`, ... until one fails.
///
/// Every probe closes its descriptor before the next one is opened.
pub fn count_devices_with(driver: &dyn Driver, prefix: &Path, device_type: DeviceType) -> usize {
    device_paths(driver, prefix, device_type).len()
}

/// Paths of the devices that answered a probe, in index order.
pub fn device_paths(driver: &dyn Driver, prefix: &Path, device_type: DeviceType) -> Vec<PathBuf> {
    if device_type.control_table().is_none() {
        return Vec::new();
    }

    let mut found = Vec::new();
    for number in 0.. {
        let path = device_path(prefix, number);
        match DeviceHandle::open(driver, &path) {
            Ok(mut handle) => {
                handle.close();
                found.push(path);
            }
            Err(e) => {
                log::debug!("device enumeration stopped at {}: {e}", path.display());
                break;
            }
        }
    }
    found
}
