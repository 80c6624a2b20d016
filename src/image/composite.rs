//! Fill, tint and alpha compositing on `PixelSurface`.
//!
//! Blending follows the straight-alpha "over" operator:
//! `out_a = sa + da * (1 - sa)` and
//! `out_c = (sc * sa + dc * da * (1 - sa)) / out_a`, with every channel
//! normalized to `[0, 1]` and rounded back to the nearest byte. When both
//! pixels are fully opaque the source is copied directly.

use crate::image::{PixelSurface, Rect, RgbColor};
use crate::util::math::{round_to_u8, scale_channel};

const OPAQUE: u8 = 255;
const MIN_OUT_ALPHA: f64 = 0.01;

impl PixelSurface {
    /// Paints an opaque solid color over `rect` clipped to the surface.
    pub fn fill_rect(&mut self, rect: Rect, color: RgbColor) {
        let Some(clip) = rect.intersect(&self.bounds()) else {
            return;
        };
        let channels = self.channels();
        let rgb = color.to_array();
        for y in clip.y..clip.bottom() {
            let span = self.span(clip.x, clip.right(), y);
            for px in self.data_mut()[span].chunks_exact_mut(channels) {
                px[..3].copy_from_slice(&rgb);
                if channels == 4 {
                    px[3] = OPAQUE;
                }
            }
        }
    }

    /// Returns a copy with every color channel scaled by `color / 255`.
    ///
    /// Alpha is left untouched, so a tinted sprite keeps its silhouette.
    pub fn tint(&self, color: RgbColor) -> PixelSurface {
        let mut out = self.clone();
        let factors = color.to_array();
        let channels = out.channels();
        for px in out.data_mut().chunks_exact_mut(channels) {
            for (value, &factor) in px.iter_mut().zip(factors.iter()) {
                *value = scale_channel(*value, factor);
            }
        }
        out
    }

    /// Alpha-blends `src` onto `self` with its top-left corner at `(x, y)`.
    ///
    /// Offsets may be negative; the source is clipped against both surfaces.
    pub fn composite_over(&mut self, src: &PixelSurface, x: isize, y: isize) {
        let src_x0 = x.min(0).unsigned_abs();
        let src_y0 = y.min(0).unsigned_abs();
        let dst_x0 = x.max(0) as usize;
        let dst_y0 = y.max(0) as usize;
        if src_x0 >= src.width()
            || src_y0 >= src.height()
            || dst_x0 >= self.width()
            || dst_y0 >= self.height()
        {
            return;
        }
        let cols = (src.width() - src_x0).min(self.width() - dst_x0);
        let rows = (src.height() - src_y0).min(self.height() - dst_y0);

        let src_channels = src.channels();
        let dst_channels = self.channels();
        for row in 0..rows {
            let src_span = src.span(src_x0, src_x0 + cols, src_y0 + row);
            let dst_span = self.span(dst_x0, dst_x0 + cols, dst_y0 + row);
            let src_row = &src.data()[src_span];
            let dst_row = &mut self.data_mut()[dst_span];
            for (s, d) in src_row
                .chunks_exact(src_channels)
                .zip(dst_row.chunks_exact_mut(dst_channels))
            {
                blend_pixel(s, d);
            }
        }
    }
}

fn blend_pixel(src: &[u8], dst: &mut [u8]) {
    let src_a = src.get(3).copied().unwrap_or(OPAQUE);
    let dst_a = dst.get(3).copied().unwrap_or(OPAQUE);

    if src_a == OPAQUE && dst_a == OPAQUE {
        dst[..3].copy_from_slice(&src[..3]);
        return;
    }

    let sa = f64::from(src_a) / 255.0;
    let da = f64::from(dst_a) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a < MIN_OUT_ALPHA {
        dst.fill(0);
        return;
    }

    for c in 0..3 {
        let s = f64::from(src[c]) / 255.0;
        let d = f64::from(dst[c]) / 255.0;
        let blended = (s * sa + d * da * (1.0 - sa)) / out_a;
        dst[c] = round_to_u8(blended * 255.0);
    }
    if let Some(alpha) = dst.get_mut(3) {
        *alpha = round_to_u8(out_a * 255.0);
    }
}

#[cfg(test)]
mod tests {
    use super::blend_pixel;

    #[test]
    fn opaque_over_opaque_copies_source() {
        let mut dst = [10u8, 20, 30, 255];
        blend_pixel(&[200, 100, 50, 255], &mut dst);
        assert_eq!(dst, [200, 100, 50, 255]);
    }

    #[test]
    fn half_alpha_over_opaque_averages() {
        let mut dst = [0u8, 0, 0];
        blend_pixel(&[255, 255, 255, 128], &mut dst);
        // 255 * 128/255 = 128
        assert_eq!(dst, [128, 128, 128]);
    }

    #[test]
    fn transparent_over_transparent_zeroes() {
        let mut dst = [9u8, 9, 9, 0];
        blend_pixel(&[50, 50, 50, 0], &mut dst);
        assert_eq!(dst, [0, 0, 0, 0]);
    }

    #[test]
    fn partial_over_transparent_keeps_source_color() {
        let mut dst = [0u8, 0, 0, 0];
        blend_pixel(&[100, 150, 200, 64], &mut dst);
        assert_eq!(dst, [100, 150, 200, 64]);
    }
}
