//! Luminance normalization for leaf templates.
//!
//! Leaf sprites are multiplied by each region's color, so a dim template would
//! darken every cell. Stretching the template's luminance to `[lo, hi]` makes
//! the brightest template pixel reproduce the region color at full strength.

use crate::image::PixelSurface;
use crate::util::math::round_to_u8;

const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;
const MIN_SPREAD: f32 = 0.01;
const BLACK_CUTOFF: f32 = 0.01;

fn luminance(px: &[u8]) -> f32 {
    (f32::from(px[0]) * LUMA_R + f32::from(px[1]) * LUMA_G + f32::from(px[2]) * LUMA_B) / 255.0
}

impl PixelSurface {
    /// Linearly rescales luminance so its range maps onto `[lo, hi]`.
    ///
    /// Chroma is preserved by scaling all three color channels by the same
    /// factor; near-black pixels are clamped to black. Surfaces whose
    /// luminance spread is below 1% are returned unchanged. Alpha is untouched.
    pub fn rescale_luminance(&mut self, lo: f32, hi: f32) {
        let channels = self.channels();
        let (min, max) = self
            .data()
            .chunks_exact(channels)
            .map(luminance)
            .fold((f32::MAX, f32::MIN), |(lo, hi), l| (lo.min(l), hi.max(l)));
        if max - min <= MIN_SPREAD {
            return;
        }

        let ratio = (hi - lo) / (max - min);
        let offset = round_to_u8(f64::from(lo) * 255.0);
        for px in self.data_mut().chunks_exact_mut(channels) {
            let l = luminance(px);
            let factor = if l < BLACK_CUTOFF {
                0.0
            } else {
                (l - min) * ratio / l
            };
            for value in px[..3].iter_mut() {
                // `as` saturates, which is the clamp we want here.
                let scaled = (f32::from(*value) * factor) as u8;
                *value = scaled.saturating_add(offset);
            }
        }
    }
}
