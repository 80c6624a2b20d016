//! Owned pixel surfaces and the geometry types used to address them.
//!
//! `PixelSurface` is a contiguous, row-major buffer of interleaved RGB or RGBA
//! bytes. The buffer length always equals `width * height * channels`; every
//! constructor enforces that, so indexed access inside `[0, w) x [0, h)` never
//! goes out of range. Surfaces without an alpha channel are treated as fully
//! opaque by the compositing operations.

use crate::util::{MosaicError, MosaicResult};

pub mod codec;
pub mod composite;
#[cfg(feature = "image-io")]
pub mod io;
pub mod resize;

/// An opaque RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// A gray color with all channels set to `value`.
    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value)
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Parses `#rgb`, `#rrggbb`, `rgb` or `rrggbb`.
    ///
    /// Short forms scale each digit by 16 (`#f80` becomes `(240, 128, 0)`).
    pub fn from_hex(value: &str) -> MosaicResult<Self> {
        let invalid = || MosaicError::InvalidColor {
            value: value.to_string(),
        };
        let digits = value.strip_prefix('#').unwrap_or(value);
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let nibble = |c: u8| (c as char).to_digit(16).map(|d| d as u8).ok_or_else(invalid);
        let bytes = digits.as_bytes();
        match bytes.len() {
            3 => Ok(Self::new(
                nibble(bytes[0])? * 16,
                nibble(bytes[1])? * 16,
                nibble(bytes[2])? * 16,
            )),
            6 => {
                let byte = |i: usize| -> MosaicResult<u8> {
                    Ok(nibble(bytes[i])? * 16 + nibble(bytes[i + 1])?)
                };
                Ok(Self::new(byte(0)?, byte(2)?, byte(4)?))
            }
            _ => Err(invalid()),
        }
    }
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Length of the shorter side.
    pub fn min_side(&self) -> usize {
        self.width.min(self.height)
    }

    /// Returns the overlap with `other`, or `None` when it is empty.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Splits at the midpoints into top-left, top-right, bottom-left and
    /// bottom-right quadrants. Odd remainders go to the right and bottom.
    pub fn quadrants(&self) -> [Rect; 4] {
        let left = self.width / 2;
        let top = self.height / 2;
        let right = self.width - left;
        let bottom = self.height - top;
        let mid_x = self.x + left;
        let mid_y = self.y + top;
        [
            Rect::new(self.x, self.y, left, top),
            Rect::new(mid_x, self.y, right, top),
            Rect::new(self.x, mid_y, left, bottom),
            Rect::new(mid_x, mid_y, right, bottom),
        ]
    }
}

/// Owned, contiguous RGB/RGBA surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelSurface {
    data: Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
}

impl PixelSurface {
    /// Wraps an interleaved buffer of `width * height * channels` bytes.
    pub fn new(data: Vec<u8>, width: usize, height: usize, channels: usize) -> MosaicResult<Self> {
        let needed = required_len(width, height, channels)?;
        if data.len() != needed {
            return Err(MosaicError::BufferSizeMismatch {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Creates a zeroed surface (transparent black when it has alpha).
    pub fn blank(width: usize, height: usize, channels: usize) -> MosaicResult<Self> {
        let needed = required_len(width, height, channels)?;
        Ok(Self {
            data: vec![0u8; needed],
            width,
            height,
            channels,
        })
    }

    /// Creates an opaque surface filled with `color`.
    pub fn solid(
        width: usize,
        height: usize,
        channels: usize,
        color: RgbColor,
    ) -> MosaicResult<Self> {
        let mut surface = Self::blank(width, height, channels)?;
        let bounds = surface.bounds();
        surface.fill_rect(bounds, color);
        Ok(surface)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of interleaved channels (3 or 4).
    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// Rectangle covering the whole surface.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Returns the raw interleaved bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Returns the channels of pixel `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = self.offset(x, y);
        self.data.get(start..start + self.channels)
    }

    /// Mutable variant of [`PixelSurface::pixel`].
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut [u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = self.offset(x, y);
        let channels = self.channels;
        self.data.get_mut(start..start + channels)
    }

    /// Returns the interleaved bytes of row `y`.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = self.offset(0, y);
        self.data.get(start..start + self.width * self.channels)
    }

    /// Byte range of pixels `x0..x1` on row `y`. Callers keep the range in bounds.
    pub(crate) fn span(&self, x0: usize, x1: usize, y: usize) -> std::ops::Range<usize> {
        self.offset(x0, y)..self.offset(x1, y)
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * self.channels
    }
}

fn required_len(width: usize, height: usize, channels: usize) -> MosaicResult<usize> {
    if channels != 3 && channels != 4 {
        return Err(MosaicError::UnsupportedChannels { channels });
    }
    if width == 0 || height == 0 {
        return Err(MosaicError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(channels))
        .ok_or(MosaicError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::{Rect, RgbColor};

    #[test]
    fn quadrants_give_remainder_to_right_and_bottom() {
        let [tl, tr, bl, br] = Rect::new(10, 20, 5, 7).quadrants();
        assert_eq!(tl, Rect::new(10, 20, 2, 3));
        assert_eq!(tr, Rect::new(12, 20, 3, 3));
        assert_eq!(bl, Rect::new(10, 23, 2, 4));
        assert_eq!(br, Rect::new(12, 23, 3, 4));
        let total: usize = [tl, tr, bl, br].iter().map(Rect::area).sum();
        assert_eq!(total, 35);
    }

    #[test]
    fn intersect_clips_and_rejects_disjoint() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(a.intersect(&Rect::new(8, 8, 5, 5)), Some(Rect::new(8, 8, 2, 2)));
        assert_eq!(a.intersect(&Rect::new(10, 0, 5, 5)), None);
    }

    #[test]
    fn from_hex_accepts_long_and_short_forms() {
        assert_eq!(RgbColor::from_hex("#000000").unwrap(), RgbColor::BLACK);
        assert_eq!(
            RgbColor::from_hex("ff8001").unwrap(),
            RgbColor::new(255, 128, 1)
        );
        assert_eq!(RgbColor::from_hex("#f80").unwrap(), RgbColor::new(240, 128, 0));
        assert!(RgbColor::from_hex("#12").is_err());
        assert!(RgbColor::from_hex("#gg0000").is_err());
    }
}
