//! Numeric helpers shared by the compositing and policy code.

/// Rounds to the nearest integer and clamps into the byte range.
pub(crate) fn round_to_u8(value: f64) -> u8 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    if value >= 255.0 {
        return 255;
    }
    value.round() as u8
}

/// Rounded mean of `sum / count`, clamped into the byte range.
pub(crate) fn mean_u8(sum: u64, count: u64) -> u8 {
    if count == 0 {
        return 0;
    }
    round_to_u8(sum as f64 / count as f64)
}

/// Scales a channel by `factor / 255` with integer truncation.
pub(crate) fn scale_channel(value: u8, factor: u8) -> u8 {
    (u16::from(value) * u16::from(factor) / 255) as u8
}

/// Squared Euclidean distance between two RGB triples.
pub(crate) fn sq_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = i32::from(x) - i32::from(y);
            (d * d) as u32
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::{mean_u8, round_to_u8, scale_channel, sq_distance};

    #[test]
    fn round_to_u8_clamps_and_rounds() {
        assert_eq!(round_to_u8(-3.0), 0);
        assert_eq!(round_to_u8(f64::NAN), 0);
        assert_eq!(round_to_u8(12.5), 13);
        assert_eq!(round_to_u8(12.49), 12);
        assert_eq!(round_to_u8(300.0), 255);
    }

    #[test]
    fn mean_u8_handles_empty_and_rounding() {
        assert_eq!(mean_u8(0, 0), 0);
        assert_eq!(mean_u8(3, 2), 2);
        assert_eq!(mean_u8(10, 4), 3);
    }

    #[test]
    fn scale_channel_is_identity_at_full_factor() {
        for v in [0u8, 1, 127, 254, 255] {
            assert_eq!(scale_channel(v, 255), v);
            assert_eq!(scale_channel(v, 0), 0);
        }
        assert_eq!(scale_channel(200, 128), 100);
    }

    #[test]
    fn sq_distance_sums_channels() {
        assert_eq!(sq_distance([0, 0, 0], [0, 0, 0]), 0);
        assert_eq!(sq_distance([10, 0, 0], [0, 0, 0]), 100);
        assert_eq!(sq_distance([0, 255, 0], [0, 0, 3]), 255 * 255 + 9);
    }
}
