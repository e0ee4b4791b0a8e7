//! Quantis PCI driver control protocol: request codes, payload layout.
//!
//! Pure definitions with no I/O. The codes reproduce the `_IOR`/`_IOW`/`_IO`
//! encoding of the driver header (`quantis_pci.h`, ioctl magic `'q'`); every
//! request carries either nothing or one native-endian `unsigned int`.

use crate::types::DeviceType;
use crate::QuantixError;

// --- Linux generic _IOC layout ---
const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

const IOC_SIZEMASK: u32 = (1 << IOC_SIZEBITS) - 1;
const IOC_DIRMASK: u32 = 0b11;

/// ioctl magic ("type") byte of the Quantis driver.
pub const QUANTIS_IOC_MAGIC: u8 = b'q';

/// Size of every payload-carrying request: one C `unsigned int`.
pub const PAYLOAD_UINT: usize = 4;

/// Data direction of a control request, from user space's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// No payload.
    None,
    /// The driver writes the payload (`_IOR`).
    Read,
    /// The driver reads the payload (`_IOW`).
    Write,
    /// Both (`_IOWR`).
    ReadWrite,
}

impl Direction {
    const fn bits(self) -> u32 {
        match self {
            Direction::None => 0,
            Direction::Write => 1,
            Direction::Read => 2,
            Direction::ReadWrite => 3,
        }
    }

    const fn from_bits(bits: u32) -> Self {
        match bits & IOC_DIRMASK {
            0 => Direction::None,
            1 => Direction::Write,
            2 => Direction::Read,
            _ => Direction::ReadWrite,
        }
    }
}

/// Build a request code from its parts.
pub(crate) const fn ioc(dir: Direction, ty: u8, nr: u8, size: usize) -> u32 {
    (dir.bits() << IOC_DIRSHIFT)
        | ((ty as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
        | ((size as u32) << IOC_SIZESHIFT)
}

/// One entry of a device's control table.
///
/// Only the static tables in this module create requests, so `code`,
/// `direction` and `size` always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRequest {
    name: &'static str,
    code: u32,
    direction: Direction,
    size: usize,
}

impl ControlRequest {
    /// Driver name of the request, e.g. `GET_BOARD_VERSION`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Encoded ioctl request number.
    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Payload size in bytes, 0 for requests without a payload.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Payload size carried in the size bits of `code`.
    pub fn encoded_size(&self) -> usize {
        ((self.code >> IOC_SIZESHIFT) & IOC_SIZEMASK) as usize
    }

    /// Direction carried in the direction bits of `code`.
    pub fn encoded_direction(&self) -> Direction {
        Direction::from_bits(self.code >> IOC_DIRSHIFT)
    }

    const fn none(name: &'static str, nr: u8) -> Self {
        Self {
            name,
            code: ioc(Direction::None, QUANTIS_IOC_MAGIC, nr, 0),
            direction: Direction::None,
            size: 0,
        }
    }

    const fn read_uint(name: &'static str, nr: u8) -> Self {
        Self {
            name,
            code: ioc(Direction::Read, QUANTIS_IOC_MAGIC, nr, PAYLOAD_UINT),
            direction: Direction::Read,
            size: PAYLOAD_UINT,
        }
    }

    const fn write_uint(name: &'static str, nr: u8) -> Self {
        Self {
            name,
            code: ioc(Direction::Write, QUANTIS_IOC_MAGIC, nr, PAYLOAD_UINT),
            direction: Direction::Write,
            size: PAYLOAD_UINT,
        }
    }

    /// Check a payload buffer against the request's fixed size and the
    /// size encoded in its code.
    pub fn check_payload(&self, payload: &[u8]) -> Result<(), QuantixError> {
        if payload.len() != self.size || payload.len() != self.encoded_size() {
            return Err(QuantixError::InvalidPayloadLength {
                expected: self.size,
                actual: payload.len(),
            });
        }
        Ok(())
    }
}

/// The fixed set of control requests a device class understands.
#[derive(Debug)]
pub struct ControlTable {
    pub get_driver_version: ControlRequest,
    pub get_card_count: ControlRequest,
    pub get_modules_mask: ControlRequest,
    pub get_board_version: ControlRequest,
    pub reset_board: ControlRequest,
    pub enable_module: ControlRequest,
    pub disable_module: ControlRequest,
    pub get_modules_status: ControlRequest,
    pub get_pci_bus_device_id: ControlRequest,
}

/// Control table of the Quantis PCI/PCIe driver. Request number 7 is unused.
pub static PCI_CONTROL_TABLE: ControlTable = ControlTable {
    get_driver_version: ControlRequest::read_uint("GET_DRIVER_VERSION", 0),
    get_card_count: ControlRequest::read_uint("GET_CARD_COUNT", 1),
    get_modules_mask: ControlRequest::read_uint("GET_MODULES_MASK", 2),
    get_board_version: ControlRequest::read_uint("GET_BOARD_VERSION", 3),
    reset_board: ControlRequest::none("RESET_BOARD", 4),
    enable_module: ControlRequest::write_uint("ENABLE_MODULE", 5),
    disable_module: ControlRequest::write_uint("DISABLE_MODULE", 6),
    get_modules_status: ControlRequest::read_uint("GET_MODULES_STATUS", 8),
    get_pci_bus_device_id: ControlRequest::read_uint("GET_PCI_BUS_DEVICE_ID", 9),
};

impl DeviceType {
    /// Control table for this device class, `None` for unsupported classes.
    pub fn control_table(self) -> Option<&'static ControlTable> {
        match self {
            DeviceType::Pci => Some(&PCI_CONTROL_TABLE),
            DeviceType::Usb => None,
        }
    }
}

/// Encode an `unsigned int` argument in the driver's (native) byte order.
pub fn encode_uint(value: u32) -> [u8; PAYLOAD_UINT] {
    value.to_ne_bytes()
}

/// Decode an `unsigned int` response in the driver's (native) byte order.
pub fn decode_uint(payload: &[u8]) -> Result<u32, QuantixError> {
    let bytes: [u8; PAYLOAD_UINT] =
        payload
            .try_into()
            .map_err(|_| QuantixError::InvalidPayloadLength {
                expected: PAYLOAD_UINT,
                actual: payload.len(),
            })?;
    Ok(u32::from_ne_bytes(bytes))
}
