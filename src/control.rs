//! Control calls against an open handle.

use nix::errno::Errno;

use crate::handle::DeviceHandle;
use crate::protocol::{decode_uint, encode_uint, ControlRequest, ControlTable, PAYLOAD_UINT};
use crate::types::{DriverVersion, ModuleMask, PciLocation};
use crate::QuantixError;

/// Issues control requests from one device class's table on a borrowed handle.
///
/// Holds no state of its own; build one per call site.
pub struct ControlProtocol<'h> {
    handle: &'h mut DeviceHandle,
    table: &'static ControlTable,
}

impl<'h> ControlProtocol<'h> {
    pub fn new(handle: &'h mut DeviceHandle, table: &'static ControlTable) -> Self {
        Self { handle, table }
    }

    /// Issue `request` with `payload`, which must be exactly `request.size()` bytes.
    ///
    /// Fails with `DeviceNotOpen` before touching the OS if the handle is
    /// closed. An interrupted call is reissued; any other driver error is
    /// returned as `ControlRequestFailed`.
    pub fn send(&mut self, request: &ControlRequest, payload: &mut [u8]) -> Result<(), QuantixError> {
        let channel = self.handle.channel()?;
        request.check_payload(payload)?;
        loop {
            match channel.control(request, payload) {
                Ok(()) => break,
                Err(Errno::EINTR) => continue,
                Err(errno) => {
                    log::debug!("ioctl {} ({:#010x}) failed: {errno}", request.name(), request.code());
                    return Err(QuantixError::ControlRequestFailed {
                        request: request.name(),
                        errno,
                    });
                }
            }
        }
        log::debug!("ioctl {} ({:#010x})", request.name(), request.code());
        Ok(())
    }

    fn read_uint(&mut self, request: ControlRequest) -> Result<u32, QuantixError> {
        let mut payload = [0u8; PAYLOAD_UINT];
        self.send(&request, &mut payload)?;
        decode_uint(&payload)
    }

    fn write_uint(&mut self, request: ControlRequest, value: u32) -> Result<(), QuantixError> {
        let mut payload = encode_uint(value);
        self.send(&request, &mut payload)
    }

    pub fn driver_version(&mut self) -> Result<DriverVersion, QuantixError> {
        self.read_uint(self.table.get_driver_version)
            .map(DriverVersion::from_raw)
    }

    /// Number of cards managed by the driver.
    pub fn card_count(&mut self) -> Result<u32, QuantixError> {
        self.read_uint(self.table.get_card_count)
    }

    pub fn board_version(&mut self) -> Result<u32, QuantixError> {
        self.read_uint(self.table.get_board_version)
    }

    /// Modules present on the board.
    pub fn modules_mask(&mut self) -> Result<ModuleMask, QuantixError> {
        self.read_uint(self.table.get_modules_mask)
            .map(ModuleMask::new)
    }

    /// Modules currently working.
    pub fn modules_status(&mut self) -> Result<ModuleMask, QuantixError> {
        self.read_uint(self.table.get_modules_status)
            .map(ModuleMask::new)
    }

    /// Number of working modules. The driver has no request for this; it is
    /// the population count of the status bitset.
    pub fn modules_count(&mut self) -> Result<u32, QuantixError> {
        Ok(self.modules_status()?.count())
    }

    /// Enable module `index`. The index is passed through unchecked.
    pub fn enable_module(&mut self, index: u32) -> Result<(), QuantixError> {
        self.write_uint(self.table.enable_module, index)
    }

    /// Disable module `index`. The index is passed through unchecked.
    pub fn disable_module(&mut self, index: u32) -> Result<(), QuantixError> {
        self.write_uint(self.table.disable_module, index)
    }

    pub fn reset_board(&mut self) -> Result<(), QuantixError> {
        let request = self.table.reset_board;
        self.send(&request, &mut [])
    }

    pub fn pci_location(&mut self) -> Result<PciLocation, QuantixError> {
        self.read_uint(self.table.get_pci_bus_device_id)
            .map(PciLocation::from_raw)
    }
}
