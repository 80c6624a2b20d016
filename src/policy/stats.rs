//! Region statistics shared by both policy variants.

use crate::image::{PixelSurface, Rect, RgbColor};
use crate::util::math::mean_u8;

/// Per-channel sums over a region.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct RegionSums {
    pub(crate) sums: [u64; 3],
    pub(crate) count: u64,
}

impl RegionSums {
    pub(crate) fn mean_color(&self) -> RgbColor {
        RgbColor::new(
            mean_u8(self.sums[0], self.count),
            mean_u8(self.sums[1], self.count),
            mean_u8(self.sums[2], self.count),
        )
    }

    pub(crate) fn mean_gray(&self) -> u8 {
        mean_u8(self.sums.iter().sum(), self.count * 3)
    }
}

/// Gray value of one pixel: the rounded mean of its color channels.
pub(crate) fn pixel_gray(px: &[u8]) -> u8 {
    let sum = u16::from(px[0]) + u16::from(px[1]) + u16::from(px[2]);
    ((sum + 1) / 3) as u8
}

/// Calls `f` with every pixel of `rect` clipped to the frame.
pub(crate) fn for_each_pixel(frame: &PixelSurface, rect: Rect, mut f: impl FnMut(&[u8])) {
    let Some(clip) = rect.intersect(&frame.bounds()) else {
        return;
    };
    let channels = frame.channels();
    for y in clip.y..clip.bottom() {
        let span = frame.span(clip.x, clip.right(), y);
        for px in frame.data()[span].chunks_exact(channels) {
            f(px);
        }
    }
}

pub(crate) fn region_sums(frame: &PixelSurface, rect: Rect) -> RegionSums {
    let mut out = RegionSums::default();
    for_each_pixel(frame, rect, |px| {
        out.sums[0] += u64::from(px[0]);
        out.sums[1] += u64::from(px[1]);
        out.sums[2] += u64::from(px[2]);
        out.count += 1;
    });
    out
}
