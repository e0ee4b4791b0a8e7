//! Measure read throughput of a Quantis card for a few block sizes and
//! typed reads.

use std::time::Instant;

use quantix::{Quantix, QuantixConfig, QuantixError};

const ITERATIONS: u32 = 1000;

fn bench<T>(
    name: &str,
    qrng: &mut Quantix,
    mut op: impl FnMut(&mut Quantix) -> Result<T, QuantixError>,
) -> Result<(), QuantixError> {
    let start = Instant::now();
    for _ in 0..ITERATIONS {
        op(qrng)?;
    }
    let elapsed = start.elapsed().as_secs_f64();
    println!("  {name:<24} {:>10.2} ops/s", f64::from(ITERATIONS) / elapsed);
    Ok(())
}

fn main() -> Result<(), QuantixError> {
    env_logger::init();

    let mut qrng = Quantix::open(QuantixConfig::pci(0))?;
    println!("Device: {qrng}\n");

    println!("read() by block size:");
    for block in [16, 64, 256, 1024, 4096] {
        let start = Instant::now();
        let mut total = 0usize;
        for _ in 0..ITERATIONS {
            total += qrng.read(block)?.len();
        }
        let kib_s = total as f64 / start.elapsed().as_secs_f64() / 1024.0;
        println!("  block {block:5} bytes: {kib_s:10.2} KiB/s");
    }

    println!("\nTyped reads:");
    bench("read_u16()", &mut qrng, Quantix::read_u16)?;
    bench("read_u32()", &mut qrng, Quantix::read_u32)?;
    bench("read_float()", &mut qrng, Quantix::read_float)?;
    bench("read_double()", &mut qrng, Quantix::read_double)?;
    bench("read_int_range(0, 100)", &mut qrng, |q| q.read_int_range(0, 100))?;

    Ok(())
}
