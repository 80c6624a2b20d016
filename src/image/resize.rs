//! Nearest-neighbor resampling and cropping.
//!
//! Resampling maps each destination pixel to `rx = x * src_w / dst_w` and
//! `ry = y * src_h / dst_h` with integer floor division. There is no
//! interpolation, so resizing to a given size is fully deterministic.

use crate::image::{PixelSurface, Rect};
use crate::util::{MosaicError, MosaicResult};

impl PixelSurface {
    /// Resamples to `width x height` using nearest-neighbor lookup.
    pub fn resize_nearest(&self, width: usize, height: usize) -> MosaicResult<PixelSurface> {
        let mut out = PixelSurface::blank(width, height, self.channels())?;
        let channels = self.channels();
        let src_cols: Vec<usize> = (0..width).map(|x| x * self.width() / width).collect();
        for y in 0..height {
            let ry = y * self.height() / height;
            let src_row = self.span(0, self.width(), ry);
            let dst_row = out.span(0, width, y);
            let (src, dst) = (&self.data()[src_row], &mut out.data_mut()[dst_row]);
            for (dst_px, &rx) in dst.chunks_exact_mut(channels).zip(src_cols.iter()) {
                dst_px.copy_from_slice(&src[rx * channels..(rx + 1) * channels]);
            }
        }
        Ok(out)
    }

    /// Copies `rect` into a new surface of the same size.
    ///
    /// Parts of `rect` that fall outside the surface are left zeroed.
    pub fn crop(&self, rect: Rect) -> MosaicResult<PixelSurface> {
        let mut out = PixelSurface::blank(rect.width, rect.height, self.channels())?;
        let Some(clip) = rect.intersect(&self.bounds()) else {
            return Ok(out);
        };
        let dx = clip.x - rect.x;
        let dy = clip.y - rect.y;
        for row in 0..clip.height {
            let src = self.span(clip.x, clip.right(), clip.y + row);
            let dst = out.span(dx, dx + clip.width, dy + row);
            let (src, dst) = (&self.data()[src], &mut out.data_mut()[dst]);
            dst.copy_from_slice(src);
        }
        Ok(out)
    }

    /// Resizes to `target_height`, keeping the aspect ratio.
    ///
    /// Both output dimensions are rounded up to even values, which video
    /// encoders consuming the frame sequence generally require.
    pub fn fit_to_height(&self, target_height: usize) -> MosaicResult<PixelSurface> {
        if target_height == 0 {
            return Err(MosaicError::InvalidDimensions {
                width: self.width(),
                height: target_height,
            });
        }
        let height = round_up_even(target_height);
        let width = round_up_even((self.width() * height / self.height()).max(1));
        self.resize_nearest(width, height)
    }
}

fn round_up_even(value: usize) -> usize {
    value + value % 2
}

#[cfg(test)]
mod tests {
    use super::round_up_even;

    #[test]
    fn round_up_even_only_bumps_odd_values() {
        assert_eq!(round_up_even(480), 480);
        assert_eq!(round_up_even(481), 482);
        assert_eq!(round_up_even(1), 2);
    }
}
