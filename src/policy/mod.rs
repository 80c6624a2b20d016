//! Subdivision policies: how a region is colored and when regions merge.
//!
//! Two variants exist. `Monochrome` reduces every region to a gray level and
//! merges four siblings when their gray spread is below the threshold.
//! `Color` keeps full RGB means and merges when the largest pairwise squared
//! distance between the four colors is below `3 * threshold^2`. The two
//! metrics are intentionally not in the same units: the gray spread is a raw
//! channel difference, the color test a squared distance over three channels.

use crate::image::{PixelSurface, Rect, RgbColor};
use crate::util::math::{mean_u8, sq_distance};
use crate::util::{MosaicError, MosaicResult};

pub(crate) mod stats;

use stats::{for_each_pixel, pixel_gray, region_sums};

/// Region coloring and merge rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubdivisionPolicy {
    /// Gray levels, merged on raw spread.
    Monochrome { threshold: u32 },
    /// RGB means, merged on squared distance.
    Color { threshold: u32 },
}

impl SubdivisionPolicy {
    /// Parses a mode name (`bw` or `color`, case-insensitive).
    pub fn from_mode(mode: &str, threshold: u32) -> MosaicResult<Self> {
        match mode.to_ascii_lowercase().as_str() {
            "bw" => Ok(Self::Monochrome { threshold }),
            "color" => Ok(Self::Color { threshold }),
            _ => Err(MosaicError::UnknownPolicyMode {
                mode: mode.to_string(),
            }),
        }
    }

    pub fn threshold(&self) -> u32 {
        match *self {
            Self::Monochrome { threshold } | Self::Color { threshold } => threshold,
        }
    }

    /// Mean color of `rect` (clipped to the frame), rounded to bytes.
    ///
    /// The monochrome variant averages every color channel and returns the
    /// result replicated as gray. Empty regions yield black.
    pub fn representative_color(&self, frame: &PixelSurface, rect: Rect) -> RgbColor {
        let sums = region_sums(frame, rect);
        match self {
            Self::Monochrome { .. } => RgbColor::gray(sums.mean_gray()),
            Self::Color { .. } => sums.mean_color(),
        }
    }

    /// Decides whether four sibling leaves (top-left, top-right, bottom-left,
    /// bottom-right) are similar enough to become one leaf, and its color.
    pub fn should_merge(&self, quad: &[RgbColor; 4]) -> (bool, RgbColor) {
        match *self {
            Self::Monochrome { threshold } => {
                let grays = quad.map(|c| c.r);
                let min = grays.iter().copied().min().unwrap_or(0);
                let max = grays.iter().copied().max().unwrap_or(0);
                let sum: u64 = grays.iter().map(|&g| u64::from(g)).sum();
                let merge = u32::from(max - min) < threshold;
                (merge, RgbColor::gray(mean_u8(sum, 4)))
            }
            Self::Color { threshold } => {
                let mut max_dist = 0u32;
                for (i, a) in quad.iter().enumerate() {
                    for b in &quad[i + 1..] {
                        max_dist = max_dist.max(sq_distance(a.to_array(), b.to_array()));
                    }
                }
                let merge = u64::from(max_dist) < color_limit(threshold);
                let mut sums = [0u64; 3];
                for color in quad {
                    for (sum, &v) in sums.iter_mut().zip(color.to_array().iter()) {
                        *sum += u64::from(v);
                    }
                }
                let merged = RgbColor::new(
                    mean_u8(sums[0], 4),
                    mean_u8(sums[1], 4),
                    mean_u8(sums[2], 4),
                );
                (merge, merged)
            }
        }
    }

    /// Top-down check: should `rect` be split, judged from its own pixels?
    ///
    /// Monochrome splits when the gray spread exceeds the threshold. Color
    /// splits when any pixel's squared distance from the region's center pixel
    /// exceeds `3 * threshold^2`. Also returns the region's representative color.
    pub fn needs_split(&self, frame: &PixelSurface, rect: Rect) -> (bool, RgbColor) {
        let color = self.representative_color(frame, rect);
        let split = match *self {
            Self::Monochrome { threshold } => {
                let mut min = u8::MAX;
                let mut max = u8::MIN;
                for_each_pixel(frame, rect, |px| {
                    let g = pixel_gray(px);
                    min = min.min(g);
                    max = max.max(g);
                });
                max > min && u32::from(max - min) > threshold
            }
            Self::Color { threshold } => {
                let limit = color_limit(threshold);
                let center = frame
                    .pixel(rect.x + rect.width / 2, rect.y + rect.height / 2)
                    .map(|px| [px[0], px[1], px[2]]);
                match center {
                    Some(center) => {
                        let mut split = false;
                        for_each_pixel(frame, rect, |px| {
                            if u64::from(sq_distance([px[0], px[1], px[2]], center)) > limit {
                                split = true;
                            }
                        });
                        split
                    }
                    None => false,
                }
            }
        };
        (split, color)
    }
}

fn color_limit(threshold: u32) -> u64 {
    3 * u64::from(threshold) * u64::from(threshold)
}

#[cfg(test)]
mod tests {
    use super::SubdivisionPolicy;
    use crate::image::RgbColor;
    use crate::util::MosaicError;

    #[test]
    fn from_mode_is_case_insensitive() {
        assert_eq!(
            SubdivisionPolicy::from_mode("BW", 4).unwrap(),
            SubdivisionPolicy::Monochrome { threshold: 4 }
        );
        assert_eq!(
            SubdivisionPolicy::from_mode("Color", 9).unwrap(),
            SubdivisionPolicy::Color { threshold: 9 }
        );
        assert_eq!(
            SubdivisionPolicy::from_mode("sepia", 1).unwrap_err(),
            MosaicError::UnknownPolicyMode {
                mode: "sepia".to_string()
            }
        );
    }

    #[test]
    fn monochrome_merge_uses_strict_spread() {
        let policy = SubdivisionPolicy::Monochrome { threshold: 10 };
        let quad = [10, 15, 19, 12].map(RgbColor::gray);
        assert_eq!(policy.should_merge(&quad), (true, RgbColor::gray(14)));
        let quad = [10, 15, 20, 12].map(RgbColor::gray);
        assert!(!policy.should_merge(&quad).0);
    }

    #[test]
    fn color_merge_uses_squared_distance() {
        // threshold 10 -> limit 300
        let policy = SubdivisionPolicy::Color { threshold: 10 };
        let base = RgbColor::new(100, 100, 100);
        let near = RgbColor::new(110, 110, 109); // 100 + 100 + 81 = 281
        let far = RgbColor::new(110, 110, 110); // 300
        assert!(policy.should_merge(&[base, base, base, near]).0);
        assert!(!policy.should_merge(&[base, far, base, base]).0);
        let (_, merged) = policy.should_merge(&[base, base, near, near]);
        assert_eq!(merged, RgbColor::new(105, 105, 105));
    }

    #[test]
    fn zero_threshold_never_merges() {
        let gray = SubdivisionPolicy::Monochrome { threshold: 0 };
        let color = SubdivisionPolicy::Color { threshold: 0 };
        let quad = [RgbColor::gray(7); 4];
        assert!(!gray.should_merge(&quad).0);
        assert!(!color.should_merge(&quad).0);
    }
}
