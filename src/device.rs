//! High-level Quantis QRNG device interface.

use std::fmt;
use std::io;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use crate::chardev::CharDevice;
use crate::codec;
use crate::control::ControlProtocol;
use crate::discovery::device_path;
use crate::handle::{DeviceHandle, Driver};
use crate::protocol::ControlTable;
use crate::reader::RawReader;
use crate::types::*;
use crate::QuantixError;

/// Device node prefix of the Quantis PCI driver.
pub const DEV_PREFIX: &str = "/dev/qrandom";

/// Which device to talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantixConfig {
    pub device_type: DeviceType,
    /// 0-based device index.
    pub device_number: u32,
    /// Device node prefix; the index is appended to it.
    pub dev_prefix: PathBuf,
}

impl Default for QuantixConfig {
    fn default() -> Self {
        Self {
            device_type: DeviceType::Pci,
            device_number: 0,
            dev_prefix: PathBuf::from(DEV_PREFIX),
        }
    }
}

impl QuantixConfig {
    /// PCI device `number` under the default prefix.
    pub fn pci(number: u32) -> Self {
        Self {
            device_number: number,
            ..Self::default()
        }
    }

    /// Full device node path, e.g. `/dev/qrandom0`.
    pub fn path(&self) -> PathBuf {
        device_path(&self.dev_prefix, self.device_number)
    }
}

/// High-level interface to a Quantis QRNG card.
///
/// A `Quantix` owns at most one open descriptor. Every operation needs
/// `&mut self`; share one across threads behind a `Mutex`, or open one per
/// thread.
///
/// ```no_run
/// use quantix::{Quantix, QuantixConfig};
///
/// let mut qrng = Quantix::open(QuantixConfig::pci(0))?;
/// let bytes = qrng.read(32)?;
/// println!("{:02x?}", &bytes);
/// qrng.close();
/// # Ok::<(), quantix::QuantixError>(())
/// ```
pub struct Quantix {
    config: QuantixConfig,
    table: &'static ControlTable,
    driver: Box<dyn Driver>,
    handle: DeviceHandle,
}

impl Quantix {
    /// A closed device for `config`, using the `/dev` character-device driver.
    ///
    /// Nothing is opened yet; see [`open_device`](Self::open_device) and
    /// [`scope`](Self::scope).
    pub fn new(config: QuantixConfig) -> Result<Self, QuantixError> {
        Self::with_driver(config, CharDevice)
    }

    /// A closed device for `config`, reached through `driver`.
    pub fn with_driver(
        config: QuantixConfig,
        driver: impl Driver + 'static,
    ) -> Result<Self, QuantixError> {
        let table = config
            .device_type
            .control_table()
            .ok_or(QuantixError::UnsupportedDevice(config.device_type))?;
        let handle = DeviceHandle::closed(config.path());
        Ok(Self {
            config,
            table,
            driver: Box::new(driver),
            handle,
        })
    }

    /// Create and open in one step.
    pub fn open(config: QuantixConfig) -> Result<Self, QuantixError> {
        let mut qrng = Self::new(config)?;
        qrng.open_device()?;
        Ok(qrng)
    }

    /// Open the device node. No-op if already open.
    pub fn open_device(&mut self) -> Result<(), QuantixError> {
        if self.handle.is_open() {
            return Ok(());
        }
        self.handle = DeviceHandle::open(&*self.driver, self.config.path())?;
        Ok(())
    }

    /// Close the device node. Safe to call any number of times.
    pub fn close(&mut self) {
        self.handle.close();
    }

    /// Whether the device node is currently open.
    pub fn is_open(&self) -> bool {
        self.handle.is_open()
    }

    /// Open the device for the lifetime of the returned guard.
    ///
    /// Reuses the descriptor if the device is already open. When the guard
    /// is dropped, on any path, the device is closed.
    pub fn scope(&mut self) -> Result<Scope<'_>, QuantixError> {
        self.open_device()?;
        Ok(Scope { quantix: self })
    }

    /// Configuration this device was created with.
    pub fn config(&self) -> &QuantixConfig {
        &self.config
    }

    /// Device node path, e.g. `/dev/qrandom0`.
    pub fn path(&self) -> &Path {
        self.handle.path()
    }

    pub fn device_type(&self) -> DeviceType {
        self.config.device_type
    }

    pub fn device_number(&self) -> u32 {
        self.config.device_number
    }

    // --- Device information and control ---

    fn control(&mut self) -> ControlProtocol<'_> {
        ControlProtocol::new(&mut self.handle, self.table)
    }

    /// Kernel driver version, e.g. 2.1.
    pub fn driver_version(&mut self) -> Result<DriverVersion, QuantixError> {
        self.control().driver_version()
    }

    /// Board (firmware) version register.
    pub fn board_version(&mut self) -> Result<u32, QuantixError> {
        self.control().board_version()
    }

    /// Number of cards the driver manages.
    pub fn card_count(&mut self) -> Result<u32, QuantixError> {
        self.control().card_count()
    }

    /// Modules present on the board.
    pub fn modules_mask(&mut self) -> Result<ModuleMask, QuantixError> {
        self.control().modules_mask()
    }

    /// Modules currently working.
    pub fn modules_status(&mut self) -> Result<ModuleMask, QuantixError> {
        self.control().modules_status()
    }

    /// Number of working modules.
    pub fn modules_count(&mut self) -> Result<u32, QuantixError> {
        self.control().modules_count()
    }

    /// PCI bus and device id of the card.
    pub fn pci_location(&mut self) -> Result<PciLocation, QuantixError> {
        self.control().pci_location()
    }

    /// Reset the board.
    pub fn reset_board(&mut self) -> Result<(), QuantixError> {
        self.control().reset_board()
    }

    /// Enable module `index`, which must be present in [`modules_mask`](Self::modules_mask).
    pub fn enable_module(&mut self, index: u32) -> Result<(), QuantixError> {
        self.check_module(index)?;
        self.control().enable_module(index)
    }

    /// Disable module `index`, which must be present in [`modules_mask`](Self::modules_mask).
    pub fn disable_module(&mut self, index: u32) -> Result<(), QuantixError> {
        self.check_module(index)?;
        self.control().disable_module(index)
    }

    fn check_module(&mut self, index: u32) -> Result<(), QuantixError> {
        let mask = self.modules_mask()?;
        if !mask.contains(index) {
            return Err(QuantixError::InvalidModule {
                index,
                mask: mask.bits(),
            });
        }
        Ok(())
    }

    // --- Random data ---

    /// Read exactly `n` random bytes with one device read.
    pub fn read(&mut self, n: usize) -> Result<Vec<u8>, QuantixError> {
        RawReader::new(&mut self.handle).read_bytes(n)
    }

    /// Fill `buf` with random bytes with one device read.
    ///
    /// An empty buffer is not read into, but a closed device still fails
    /// with `DeviceNotOpen`. Unlike [`read`](Self::read), where a zero count
    /// is `EmptyRead`.
    pub fn fill_bytes(&mut self, buf: &mut [u8]) -> Result<(), QuantixError> {
        if buf.is_empty() {
            self.handle.channel()?;
            return Ok(());
        }
        RawReader::new(&mut self.handle).read_into(buf)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], QuantixError> {
        let mut buf = [0u8; N];
        RawReader::new(&mut self.handle).read_into(&mut buf)?;
        Ok(buf)
    }

    /// Random `u16` from 2 bytes.
    pub fn read_u16(&mut self) -> Result<u16, QuantixError> {
        codec::to_u16(&self.read_array::<2>()?)
    }

    /// Random `u32` from 4 bytes.
    pub fn read_u32(&mut self) -> Result<u32, QuantixError> {
        codec::to_u32(&self.read_array::<4>()?)
    }

    /// Random `u64` from 8 bytes.
    pub fn read_u64(&mut self) -> Result<u64, QuantixError> {
        codec::to_u64(&self.read_array::<8>()?)
    }

    /// Random float in `[0, 1)` from 32 bits of entropy.
    pub fn read_float(&mut self) -> Result<f64, QuantixError> {
        codec::to_unit_float(&self.read_array::<4>()?)
    }

    /// Random double in `[0, 1)` from 64 bits of entropy.
    pub fn read_double(&mut self) -> Result<f64, QuantixError> {
        codec::to_unit_double(&self.read_array::<8>()?)
    }

    /// Random integer in `[low, high]`. The range is checked before any
    /// entropy is consumed.
    pub fn read_int_range(&mut self, low: i64, high: i64) -> Result<i64, QuantixError> {
        codec::check_range(low, high)?;
        codec::to_ranged_int(&self.read_array::<4>()?, low, high)
    }
}

impl fmt::Display for Quantix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quantix(device_type={}, device_number={})",
            self.config.device_type, self.config.device_number
        )
    }
}

impl fmt::Debug for Quantix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Quantix")
            .field("config", &self.config)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Reads fill the whole buffer or fail; a short device read is an error,
/// not a partial count.
impl io::Read for Quantix {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.fill_bytes(buf).map_err(|e| match e {
            QuantixError::Io { source, .. } => source,
            other => io::Error::other(other),
        })?;
        Ok(buf.len())
    }
}

/// An open [`Quantix`] that closes when dropped. See [`Quantix::scope`].
pub struct Scope<'q> {
    quantix: &'q mut Quantix,
}

impl Deref for Scope<'_> {
    type Target = Quantix;

    fn deref(&self) -> &Quantix {
        self.quantix
    }
}

impl DerefMut for Scope<'_> {
    fn deref_mut(&mut self) -> &mut Quantix {
        self.quantix
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.quantix.close();
    }
}
