use quantix::{count_devices, DeviceType, Quantix, QuantixConfig};

fn main() -> Result<(), quantix::QuantixError> {
    env_logger::init();

    // Count devices
    let pci = count_devices(DeviceType::Pci);
    let usb = count_devices(DeviceType::Usb);
    println!("PCI devices: {pci}");
    println!("USB devices: {usb}");
    if pci == 0 {
        eprintln!("No Quantis devices found.");
        std::process::exit(1);
    }

    let mut qrng = Quantix::new(QuantixConfig::pci(0))?;
    println!("\nDevice: {qrng}");
    println!("Path:   {}", qrng.path().display());

    let mut dev = qrng.scope()?;

    // Device info
    println!("\nDriver:  {}", dev.driver_version()?);
    println!("Board:   {:#010x}", dev.board_version()?);
    println!("Cards:   {}", dev.card_count()?);
    let loc = dev.pci_location()?;
    println!("PCI:     bus {} device {:#06x}", loc.bus, loc.device);

    // Modules
    let mask = dev.modules_mask()?;
    let status = dev.modules_status()?;
    println!("\nModules present: {mask}");
    println!("Modules working: {status} ({} of {})", status.count(), mask.count());

    // Random bytes
    let bytes = dev.read(16)?;
    println!("\nBytes:   {}", hex::encode(&bytes));

    // Ranged integers
    print!("Ints [0, 100]:");
    for _ in 0..5 {
        print!(" {}", dev.read_int_range(0, 100)?);
    }
    println!();

    // Floats
    for _ in 0..3 {
        println!("Float:   {:.10}", dev.read_float()?);
    }
    for _ in 0..3 {
        println!("Double:  {:.15}", dev.read_double()?);
    }

    println!("\nu16:     {}", dev.read_u16()?);
    println!("u32:     {}", dev.read_u32()?);

    Ok(())
}
