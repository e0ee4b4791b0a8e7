//! Typed values from raw entropy bytes.
//!
//! Pure functions with no I/O. Integers are decoded in native byte order;
//! raw entropy has no inherent order, so this only fixes which byte lands
//! where, not the distribution.

use crate::QuantixError;

/// 2^32 as an `f64` (exact).
const TWO_POW_32: f64 = 4_294_967_296.0;
/// 2^64 as an `f64` (exact).
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;
/// Largest `f64` below 1.0, `1 - 2^-53`.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

fn exact<const N: usize>(bytes: &[u8]) -> Result<[u8; N], QuantixError> {
    bytes
        .try_into()
        .map_err(|_| QuantixError::InvalidPayloadLength {
            expected: N,
            actual: bytes.len(),
        })
}

/// Decode 2 bytes as a `u16`.
pub fn to_u16(bytes: &[u8]) -> Result<u16, QuantixError> {
    exact::<2>(bytes).map(u16::from_ne_bytes)
}

/// Decode 4 bytes as a `u32`.
pub fn to_u32(bytes: &[u8]) -> Result<u32, QuantixError> {
    exact::<4>(bytes).map(u32::from_ne_bytes)
}

/// Decode 8 bytes as a `u64`.
pub fn to_u64(bytes: &[u8]) -> Result<u64, QuantixError> {
    exact::<8>(bytes).map(u64::from_ne_bytes)
}

/// 4 bytes to a float in `[0, 1)`: the `u32` divided by 2^32.
///
/// Dividing by 2^32 rather than `u32::MAX` keeps 1.0 out of the range. The
/// result is an `f64` because the quotient is exact there; rounded to `f32`
/// the largest inputs would become 1.0.
pub fn to_unit_float(bytes: &[u8]) -> Result<f64, QuantixError> {
    to_u32(bytes).map(|v| f64::from(v) / TWO_POW_32)
}

/// 8 bytes to a double in `[0, 1)`: the `u64` divided by 2^64.
///
/// Small inputs keep full precision. Inputs within 2^10 of 2^64 round to
/// 1.0 in `f64`; those map to the largest double below 1.0 instead.
pub fn to_unit_double(bytes: &[u8]) -> Result<f64, QuantixError> {
    to_u64(bytes).map(|v| (v as f64 / TWO_POW_64).min(BELOW_ONE))
}

/// 4 bytes to an integer in `[low, high]`: `low + (u32 mod (high - low + 1))`.
///
/// Modulo reduction is slightly biased towards the low end when the range
/// does not divide 2^32.
pub fn to_ranged_int(bytes: &[u8], low: i64, high: i64) -> Result<i64, QuantixError> {
    check_range(low, high)?;
    let value = to_u32(bytes)?;
    let span = i128::from(high) - i128::from(low) + 1;
    let offset = i128::from(value) % span;
    // low + offset <= high, so this always fits
    Ok((i128::from(low) + offset) as i64)
}

/// Fail with `InvalidRange` unless `low <= high`.
pub fn check_range(low: i64, high: i64) -> Result<(), QuantixError> {
    if high < low {
        return Err(QuantixError::InvalidRange { low, high });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDGE_WORDS: [u32; 6] = [0, 1, 0x7FFF_FFFF, 0x8000_0000, 0xFFFF_FFFE, 0xFFFF_FFFF];

    #[test]
    fn integers_native_order() {
        assert_eq!(to_u16(&0xBEEFu16.to_ne_bytes()).unwrap(), 0xBEEF);
        assert_eq!(to_u32(&0xDEAD_BEEFu32.to_ne_bytes()).unwrap(), 0xDEAD_BEEF);
        assert_eq!(to_u64(&u64::MAX.to_ne_bytes()).unwrap(), u64::MAX);
    }

    #[test]
    fn all_ones_u32() {
        let bytes = [0xFF; 4];
        assert_eq!(to_u32(&bytes).unwrap(), 4_294_967_295);
        let f = to_unit_float(&bytes).unwrap();
        assert!(f < 1.0);
        assert!(f > 0.999999);
    }

    #[test]
    fn unit_float_bounds() {
        for w in EDGE_WORDS {
            let f = to_unit_float(&w.to_ne_bytes()).unwrap();
            assert!((0.0..1.0).contains(&f), "{w:#x} -> {f}");
        }
        assert_eq!(to_unit_float(&[0; 4]).unwrap(), 0.0);
        assert_eq!(to_unit_float(&0x8000_0000u32.to_ne_bytes()).unwrap(), 0.5);
    }

    #[test]
    fn unit_double_bounds() {
        for w in [0, 1, 1 << 11, u64::MAX / 2, u64::MAX - 1, u64::MAX] {
            let d = to_unit_double(&u64::to_ne_bytes(w)).unwrap();
            assert!((0.0..1.0).contains(&d), "{w:#x} -> {d}");
        }
        assert_eq!(to_unit_double(&[0; 8]).unwrap(), 0.0);
        assert_eq!(to_unit_double(&(1u64 << 63).to_ne_bytes()).unwrap(), 0.5);
        assert_eq!(to_unit_double(&[0xFF; 8]).unwrap(), BELOW_ONE);
    }

    #[test]
    fn unit_double_keeps_small_values() {
        let one = to_unit_double(&1u64.to_ne_bytes()).unwrap();
        let two = to_unit_double(&2u64.to_ne_bytes()).unwrap();
        let top = to_unit_double(&2047u64.to_ne_bytes()).unwrap();
        assert_eq!(one, 1.0 / TWO_POW_64);
        assert!(0.0 < one && one < two && two < top);
    }

    #[test]
    fn ranged_int_within_bounds() {
        let ranges = [(0, 0), (1, 6), (-10, 10), (0, 100), (i64::MIN, i64::MAX), (5, 5 + u32::MAX as i64)];
        for (low, high) in ranges {
            for w in EDGE_WORDS {
                let v = to_ranged_int(&w.to_ne_bytes(), low, high).unwrap();
                assert!(low <= v && v <= high, "{w:#x} in [{low}, {high}] -> {v}");
            }
        }
    }

    #[test]
    fn ranged_int_modulo_reduction() {
        // 4294967295 % 6 == 3
        assert_eq!(to_ranged_int(&[0xFF; 4], 1, 6).unwrap(), 4);
        assert_eq!(to_ranged_int(&7u32.to_ne_bytes(), 10, 14).unwrap(), 12);
        assert_eq!(to_ranged_int(&[0; 4], -3, 3).unwrap(), -3);
    }

    #[test]
    fn inverted_range_rejected() {
        let err = to_ranged_int(&[0; 4], 5, 4).unwrap_err();
        assert!(matches!(err, QuantixError::InvalidRange { low: 5, high: 4 }));
        assert!(err.is_programmer_error());
    }

    #[test]
    fn wrong_lengths_rejected() {
        assert!(matches!(
            to_u16(&[0; 3]),
            Err(QuantixError::InvalidPayloadLength { expected: 2, actual: 3 })
        ));
        assert!(matches!(
            to_unit_float(&[0; 8]),
            Err(QuantixError::InvalidPayloadLength { expected: 4, actual: 8 })
        ));
        assert!(matches!(
            to_unit_double(&[0; 4]),
            Err(QuantixError::InvalidPayloadLength { expected: 8, actual: 4 })
        ));
        assert!(matches!(
            to_ranged_int(&[], 0, 1),
            Err(QuantixError::InvalidPayloadLength { expected: 4, actual: 0 })
        ));
    }
}
