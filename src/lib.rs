//! # quantix
//!
//! Rust SDK for ID Quantique Quantis PCI/PCIe quantum RNG cards.
//!
//! Talks straight to the kernel driver through `/dev/qrandom{N}`: `read()` for
//! entropy, `ioctl()` for board and module management. No vendor C library.
//!
//! ## Quick Start
//!
//! ```no_run
//! use quantix::{Quantix, QuantixConfig};
//!
//! let mut qrng = Quantix::new(QuantixConfig::default())?;
//! {
//!     let mut dev = qrng.scope()?;
//!     println!("Driver {}, board {:#x}", dev.driver_version()?, dev.board_version()?);
//!
//!     let bytes = dev.read(16)?;
//!     println!("{:02x?}", &bytes);
//!     println!("u32: {}, float: {}", dev.read_u32()?, dev.read_float()?);
//!     println!("die: {}", dev.read_int_range(1, 6)?);
//! } // device closed here
//! # Ok::<(), quantix::QuantixError>(())
//! ```

pub mod chardev;
pub mod codec;
pub mod control;
pub mod device;
pub mod discovery;
pub mod handle;
pub mod protocol;
pub mod reader;
pub mod types;

use std::io;
use std::path::PathBuf;

use nix::errno::Errno;

pub use chardev::CharDevice;
pub use device::{Quantix, QuantixConfig, Scope, DEV_PREFIX};
pub use discovery::{count_devices, count_devices_with, device_paths};
pub use handle::{Channel, DeviceHandle, Driver};
pub use types::*;

/// Errors returned by the quantix SDK.
#[derive(Debug, thiserror::Error)]
pub enum QuantixError {
    /// The device node does not exist, or no driver is bound to it.
    #[error("Device {} not found. Is the driver loaded?", .path.display())]
    DeviceNotFound { path: PathBuf },

    /// The OS refused access to the device node.
    #[error("Permission denied for {}", .path.display())]
    PermissionDenied { path: PathBuf },

    /// The driver reports the device as claimed by someone else.
    #[error("Device {} is busy", .path.display())]
    DeviceBusy { path: PathBuf },

    /// Operation issued on a closed handle.
    #[error("Device {} is not open", .path.display())]
    DeviceNotOpen { path: PathBuf },

    /// The driver rejected a control request.
    #[error("ioctl {request} failed: {errno}")]
    ControlRequestFailed { request: &'static str, errno: Errno },

    /// Module index not present in the board's modules mask.
    #[error("Module {index} not available (modules mask {mask:#06b})")]
    InvalidModule { index: u32, mask: u32 },

    /// Empty integer range (`high < low`).
    #[error("Invalid range: low {low} > high {high}")]
    InvalidRange { low: i64, high: i64 },

    /// A fixed-size payload or codec input had the wrong length.
    #[error("Invalid payload length: expected {expected} bytes, got {actual}")]
    InvalidPayloadLength { expected: usize, actual: usize },

    /// A read of zero bytes was requested.
    #[error("Read size must be positive")]
    EmptyRead,

    /// The device returned fewer bytes than requested.
    #[error("Read {actual} bytes, expected {expected}")]
    IncompleteRead { expected: usize, actual: usize },

    /// The device returned no data at all.
    #[error("Device stopped producing data")]
    EndOfStream,

    /// No control protocol exists for this device class.
    #[error("{0} devices not supported")]
    UnsupportedDevice(DeviceType),

    /// Any other OS-level failure.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl QuantixError {
    /// Whether this error signals API misuse rather than a device condition.
    ///
    /// Misuse errors are not worth retrying.
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            QuantixError::InvalidPayloadLength { .. }
                | QuantixError::InvalidRange { .. }
                | QuantixError::EmptyRead
        )
    }

    /// OS error number carried by the error, if any.
    pub fn os_error(&self) -> Option<i32> {
        match self {
            QuantixError::ControlRequestFailed { errno, .. } => Some(*errno as i32),
            QuantixError::Io { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}
