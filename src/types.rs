use std::fmt;

/// Class of Quantis device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    /// PCI / PCIe cards exposed as `/dev/qrandom{N}`.
    Pci,
    /// USB devices. Placeholder only: no control table, never enumerated.
    Usb,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::Pci => f.write_str("PCI"),
            DeviceType::Usb => f.write_str("USB"),
        }
    }
}

/// Kernel driver version as reported by the driver, in tenths.
///
/// A raw value of `21` is driver version 2.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverVersion {
    pub major: u32,
    pub minor: u32,
    pub raw: u32,
}

impl DriverVersion {
    /// Decode the driver's raw value, in tenths.
    pub fn from_raw(raw: u32) -> Self {
        Self {
            major: raw / 10,
            minor: raw % 10,
            raw,
        }
    }

    /// Version as a decimal number, e.g. `2.1`.
    pub fn as_f64(&self) -> f64 {
        f64::from(self.raw) / 10.0
    }
}

impl fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Bitset of on-board entropy modules, one bit per module index.
///
/// Used for both the modules mask (modules present) and the modules
/// status (modules working).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModuleMask(u32);

impl ModuleMask {
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Whether module `index` has its bit set. Indices past bit 31 never do.
    pub fn contains(&self, index: u32) -> bool {
        index < u32::BITS && self.0 & (1u32 << index) != 0
    }

    /// Number of modules set.
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Whether every module set in `self` is also set in `other`.
    pub fn is_subset_of(&self, other: ModuleMask) -> bool {
        self.0 & other.0 == self.0
    }

    /// Indices of the modules set, lowest first.
    pub fn iter(&self) -> impl Iterator<Item = u32> {
        let bits = self.0;
        (0..u32::BITS).filter(move |i| bits & (1u32 << i) != 0)
    }
}

impl fmt::Display for ModuleMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06b}", self.0)
    }
}

/// PCI location of a card: bus number and device id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciLocation {
    pub bus: u16,
    pub device: u16,
}

impl PciLocation {
    /// Split the driver's packed value: bus in the high 16 bits, device in the low.
    pub fn from_raw(value: u32) -> Self {
        Self {
            bus: (value >> 16) as u16,
            device: (value & 0xFFFF) as u16,
        }
    }
}
