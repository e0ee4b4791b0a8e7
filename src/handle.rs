//! Device handle: exclusive owner of one open descriptor.
//!
//! The kernel driver is reached through two small traits so the rest of the
//! crate never touches a raw descriptor: a [`Driver`] opens device paths, a
//! [`Channel`] is one open descriptor. [`CharDevice`](crate::CharDevice) is
//! the real implementation.

use std::io;
use std::path::{Path, PathBuf};

use nix::errno::Errno;

use crate::protocol::ControlRequest;
use crate::QuantixError;

/// One open descriptor on a device node.
pub trait Channel: Send {
    /// Issue a single `read(2)` into `buf`.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Issue a single `ioctl(2)`. `payload` is exactly `request.size()` bytes:
    /// filled by the driver for read requests, consumed for write requests,
    /// empty for requests without data.
    fn control(&mut self, request: &ControlRequest, payload: &mut [u8]) -> nix::Result<()>;

    /// Release the descriptor.
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// Opens device paths.
pub trait Driver: Send + Sync {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Channel>>;
}

/// An open (or closed) device node.
///
/// The descriptor is held iff [`is_open`](Self::is_open) is true. Closing is
/// idempotent and also happens on drop.
pub struct DeviceHandle {
    path: PathBuf,
    channel: Option<Box<dyn Channel>>,
}

impl DeviceHandle {
    /// Open `path` through `driver`.
    pub fn open(driver: &dyn Driver, path: impl Into<PathBuf>) -> Result<Self, QuantixError> {
        let path = path.into();
        let channel = driver.open(&path).map_err(|e| open_error(&path, e))?;
        log::debug!("opened {}", path.display());
        Ok(Self {
            path,
            channel: Some(channel),
        })
    }

    /// A handle for `path` that holds no descriptor.
    pub fn closed(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            channel: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    /// Release the descriptor. No-op if already closed.
    ///
    /// An error reported by the OS on close is logged, not returned: the
    /// descriptor is released either way.
    pub fn close(&mut self) {
        if let Some(channel) = self.channel.take() {
            match channel.close() {
                Ok(()) => log::debug!("closed {}", self.path.display()),
                Err(e) => log::warn!("error closing {}: {e}", self.path.display()),
            }
        }
    }

    /// Borrow the open descriptor, or fail with `DeviceNotOpen`.
    pub fn channel(&mut self) -> Result<&mut dyn Channel, QuantixError> {
        match self.channel.as_deref_mut() {
            Some(channel) => Ok(channel),
            None => Err(QuantixError::DeviceNotOpen {
                path: self.path.clone(),
            }),
        }
    }

    /// Same as [`channel`](Self::channel) but also hands out the path, for
    /// callers that need both while the channel is borrowed.
    pub(crate) fn parts(&mut self) -> Result<(&Path, &mut dyn Channel), QuantixError> {
        match self.channel.as_deref_mut() {
            Some(channel) => Ok((&self.path, channel)),
            None => Err(QuantixError::DeviceNotOpen {
                path: self.path.clone(),
            }),
        }
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Map an `open(2)` failure onto the SDK's error kinds.
pub(crate) fn open_error(path: &Path, e: io::Error) -> QuantixError {
    let path = path.to_path_buf();
    match e.raw_os_error().map(Errno::from_raw) {
        Some(Errno::ENOENT | Errno::ENODEV | Errno::ENXIO) => QuantixError::DeviceNotFound { path },
        Some(Errno::EACCES | Errno::EPERM) => QuantixError::PermissionDenied { path },
        Some(Errno::EBUSY) => QuantixError::DeviceBusy { path },
        _ if e.kind() == io::ErrorKind::NotFound => QuantixError::DeviceNotFound { path },
        _ if e.kind() == io::ErrorKind::PermissionDenied => {
            QuantixError::PermissionDenied { path }
        }
        _ => QuantixError::Io { path, source: e },
    }
}
