//! Fixed-point quantization and big-endian field packing.

// A scaled reading closer than this many ULPs to an integer is taken to be
// that integer. Decimal readings such as 1.001 have no exact f64 form and
// would otherwise floor one step low.
const SNAP_ULPS: f64 = 4.0;

// 2^127
const I128_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

/// Maps a reading onto the integer grid of `scale`, rounding toward
/// negative infinity.
///
/// The result is wide enough that packing can take the exact low-order
/// bytes of any finite reading. Returns `None` when the scaled value is NaN
/// or infinite.
pub fn quantize(value: f64, scale: u32) -> Option<i128> {
    let scaled = value * f64::from(scale);
    if !scaled.is_finite() {
        return None;
    }

    let nearest = scaled.round();
    // Relative only: tiny negative products must still floor to -1.
    let tolerance = SNAP_ULPS * f64::EPSILON * scaled.abs();
    let grid = if (scaled - nearest).abs() <= tolerance {
        nearest
    } else {
        scaled.floor()
    };

    // From 2^127 up every f64 is a multiple of 2^75. i128::MIN shares those
    // zero low bytes and stays outside every field's range.
    if grid.abs() >= I128_LIMIT {
        return Some(i128::MIN);
    }

    Some(grid as i128)
}

/// Quantization used when a non-finite reading has to be written anyway:
/// NaN becomes 0 and infinities saturate.
pub fn saturate(value: f64, scale: u32) -> i128 {
    (value * f64::from(scale)) as i128
}

/// Appends the low `width` bytes of `value`'s two's complement form, most
/// significant first. No range check is made.
pub fn pack(buf: &mut Vec<u8>, value: i128, width: usize) {
    debug_assert!((1..=16).contains(&width));

    let bytes = value.to_be_bytes();
    buf.extend_from_slice(&bytes[bytes.len() - width..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_toward_negative_infinity() {
        assert_eq!(quantize(-0.05, 10), Some(-1));
        assert_eq!(quantize(-0.01, 1), Some(-1));
        assert_eq!(quantize(0.05, 10), Some(0));
        assert_eq!(quantize(1013.25, 10), Some(10132));
        assert_eq!(quantize(-12.345, 100), Some(-1235));
    }

    #[test]
    fn tiny_negative_readings_floor_to_minus_one() {
        assert_eq!(quantize(-1e-17, 10), Some(-1));
        assert_eq!(quantize(-f64::MIN_POSITIVE, 1), Some(-1));
        assert_eq!(quantize(0.0, 10), Some(0));
        assert_eq!(quantize(-0.0, 10), Some(0));
        assert_eq!(quantize(1e-17, 10), Some(0));
    }

    #[test]
    fn products_beyond_i64_keep_their_exact_value() {
        // 2^63 + 10240, the nearest f64 to 9223372036854785808
        assert_eq!(
            quantize(9_223_372_036_854_785_808.0, 1),
            Some((1_i128 << 63) + 10240)
        );
        assert_eq!(quantize(-1.0e20, 1), Some(-100_000_000_000_000_000_000));
        assert_eq!(quantize(1.0e39, 1), Some(i128::MIN));
        assert_eq!(quantize(-1.0e39, 1), Some(i128::MIN));

        let mut buf = Vec::new();
        pack(&mut buf, i128::MIN, 3);
        assert_eq!(buf, [0x00, 0x00, 0x00]);
    }

    #[test]
    fn decimal_readings_land_on_their_grid_point() {
        assert_eq!(quantize(27.2, 10), Some(272));
        assert_eq!(quantize(1.001, 1000), Some(1001));
        assert_eq!(quantize(0.245, 1000), Some(245));
        assert_eq!(quantize(-0.032, 1000), Some(-32));
        assert_eq!(quantize(52.3676, 10000), Some(523676));
    }

    #[test]
    fn non_finite_readings() {
        assert_eq!(quantize(f64::NAN, 10), None);
        assert_eq!(quantize(f64::INFINITY, 1), None);
        assert_eq!(quantize(f64::MAX, 10), None);

        assert_eq!(saturate(f64::NAN, 10), 0);
        assert_eq!(saturate(f64::NEG_INFINITY, 10), i128::MIN);
    }

    #[test]
    fn packs_big_endian() {
        let mut buf = Vec::new();
        pack(&mut buf, 272, 2);
        pack(&mut buf, 100, 1);
        pack(&mut buf, 523676, 3);
        assert_eq!(buf, [0x01, 0x10, 0x64, 0x07, 0xFD, 0x9C]);
    }

    #[test]
    fn truncates_to_low_bytes() {
        let mut buf = Vec::new();
        pack(&mut buf, -32, 2);
        pack(&mut buf, -1, 3);
        pack(&mut buf, 0x1_2345, 2);
        pack(&mut buf, 256, 1);
        pack(&mut buf, (1_i128 << 63) + 10240, 2);
        assert_eq!(
            buf,
            [0xFF, 0xE0, 0xFF, 0xFF, 0xFF, 0x23, 0x45, 0x00, 0x28, 0x00]
        );
    }
}
