//! Integration tests: require a Quantis PCI card and its kernel driver.
//!
//! Run with: cargo test --test device -- --test-threads=1
//!
//! Tests share one card, so run them single-threaded. Every test is skipped
//! when no `/dev/qrandom*` node can be opened.
//!
//! Set QUANTIX_DEVICE to pick a card other than 0:
//!   QUANTIX_DEVICE=1 cargo test --test device -- --test-threads=1

use quantix::*;

fn open_device() -> Option<Quantix> {
    let number = std::env::var("QUANTIX_DEVICE")
        .ok()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);
    match Quantix::open(QuantixConfig::pci(number)) {
        Ok(dev) => Some(dev),
        Err(e) => {
            eprintln!("No Quantis device available ({e}), skipping integration tests");
            None
        }
    }
}

macro_rules! require_device {
    () => {
        match open_device() {
            Some(dev) => dev,
            None => return,
        }
    };
}

#[test]
fn count_devices_is_consistent() {
    let count = count_devices(DeviceType::Pci);
    assert_eq!(count_devices(DeviceType::Usb), 0);
    if count == 0 {
        eprintln!("No device found, skipping");
        return;
    }
    let mut qrng = require_device!();
    let cards = qrng.card_count().expect("card_count failed");
    println!("Probed {count} device nodes, driver reports {cards} cards");
}

#[test]
fn driver_version() {
    let mut qrng = require_device!();
    let version = qrng.driver_version().expect("driver_version failed");
    assert!(version.raw > 0, "driver version should be nonzero");
    assert!(version.as_f64() < 100.0, "driver version should be sane");
    println!("Driver: {version}");
}

#[test]
fn board_version() {
    let mut qrng = require_device!();
    let version = qrng.board_version().expect("board_version failed");
    assert!(version > 0, "board version should be nonzero");
    println!("Board: {version:#x}");
}

#[test]
fn modules() {
    let mut qrng = require_device!();
    let mask = qrng.modules_mask().expect("modules_mask failed");
    let status = qrng.modules_status().expect("modules_status failed");
    let count = qrng.modules_count().expect("modules_count failed");
    assert!(mask.bits() <= 0b1111, "at most 4 modules");
    assert!(status.is_subset_of(mask), "working modules must be present");
    assert_eq!(count, status.count());
    println!("Mask: {mask}, status: {status}, working: {count}");
}

#[test]
fn pci_location() {
    let mut qrng = require_device!();
    let loc = qrng.pci_location().expect("pci_location failed");
    println!("PCI bus {}, device {:#x}", loc.bus, loc.device);
}

#[test]
fn read_various_sizes() {
    let mut qrng = require_device!();
    for size in [1, 4, 16, 64, 256, 1024, 4096] {
        let data = qrng.read(size).unwrap_or_else(|e| panic!("read({size}) failed: {e}"));
        assert_eq!(data.len(), size, "wrong length for size {size}");
    }
}

#[test]
fn read_different_each_time() {
    let mut qrng = require_device!();
    let a = qrng.read(32).expect("read 1 failed");
    let b = qrng.read(32).expect("read 2 failed");
    assert_ne!(a, b, "two reads should produce different data");
}

#[test]
fn typed_reads() {
    let mut qrng = require_device!();
    qrng.read_u16().expect("read_u16 failed");
    qrng.read_u32().expect("read_u32 failed");
    let f = qrng.read_float().expect("read_float failed");
    assert!((0.0..1.0).contains(&f));
    let d = qrng.read_double().expect("read_double failed");
    assert!((0.0..1.0).contains(&d));
    for _ in 0..100 {
        let v = qrng.read_int_range(1, 6).expect("read_int_range failed");
        assert!((1..=6).contains(&v));
    }
}

#[test]
fn invalid_module_rejected() {
    let mut qrng = require_device!();
    let err = qrng.enable_module(31).unwrap_err();
    assert!(matches!(err, QuantixError::InvalidModule { index: 31, .. }));
}

#[test]
fn module_enable_keeps_device_working() {
    let mut qrng = require_device!();
    let mask = qrng.modules_mask().expect("modules_mask failed");
    let Some(first) = mask.iter().next() else {
        eprintln!("No modules present, skipping");
        return;
    };
    qrng.enable_module(first).expect("enable_module failed");
    assert_eq!(qrng.read(4).expect("read after enable failed").len(), 4);
}

#[test]
fn reset_board() {
    let mut qrng = require_device!();
    qrng.reset_board().expect("reset_board failed");
    assert_eq!(qrng.read(4).expect("read after reset failed").len(), 4);
}

#[test]
fn scope_closes_device() {
    let mut qrng = require_device!();
    qrng.close();
    {
        let mut dev = qrng.scope().expect("scope failed");
        dev.read(8).expect("read in scope failed");
    }
    assert!(!qrng.is_open());
    assert!(matches!(qrng.read(8), Err(QuantixError::DeviceNotOpen { .. })));
}
