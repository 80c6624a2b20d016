//! Splitting a frame into strips that match the leaf's aspect ratio.
//!
//! The quadtree halves regions, so a tile keeps its aspect ratio all the way
//! down. Before recursing, the frame's longer axis is cut into `S` strips such
//! that each strip is as close as possible (in ratio terms) to the leaf's own
//! aspect. Strip lengths are spread with an accumulating remainder so they
//! differ by at most one pixel and add up to the axis length exactly.

use crate::image::Rect;

/// Number of strips along the longer axis of `bounds`.
///
/// `leaf_aspect` is the leaf's width over its height. The raw ratio
/// `long / (short * leaf_long_over_short)` is rounded to the integer whose
/// strip shape deviates least multiplicatively: `n = floor(r)` is bumped to
/// `n + 1` when `r^2 > n * (n + 1)`. The result is clamped to `[1, long]`.
pub fn split_count(bounds: Rect, leaf_aspect: f64) -> usize {
    let horizontal = bounds.width >= bounds.height;
    let (long, short) = if horizontal {
        (bounds.width, bounds.height)
    } else {
        (bounds.height, bounds.width)
    };
    if long == 0 || short == 0 {
        return 1;
    }
    let leaf_aspect = if leaf_aspect.is_finite() && leaf_aspect > 0.0 {
        leaf_aspect
    } else {
        1.0
    };
    let leaf_long_over_short = if horizontal {
        leaf_aspect
    } else {
        1.0 / leaf_aspect
    };

    let ratio = long as f64 / (short as f64 * leaf_long_over_short);
    let mut count = ratio.floor().max(0.0) as usize;
    let (c, c1) = (count as f64, (count + 1) as f64);
    if ratio * ratio > c * c1 {
        count += 1;
    }
    count.clamp(1, long)
}

/// Splits `total` into `count` lengths that differ by at most one.
///
/// Lengths are assigned left to right with a running error term: every strip
/// adds the division remainder to the error, and once it reaches `count` the
/// next strip takes one extra pixel.
pub fn strip_lengths(total: usize, count: usize) -> Vec<usize> {
    if count == 0 {
        return Vec::new();
    }
    let step = total / count;
    let remainder = total - step * count;
    let mut lengths = Vec::with_capacity(count);
    let mut err = remainder;
    let mut length = step;
    for _ in 0..count {
        lengths.push(length);
        err += remainder;
        if err >= count {
            length = step + 1;
            err -= count;
        } else {
            length = step;
        }
    }
    lengths
}

/// Cuts `bounds` into aspect-matched tiles along its longer axis.
pub fn tile_rects(bounds: Rect, leaf_aspect: f64) -> Vec<Rect> {
    let count = split_count(bounds, leaf_aspect);
    let horizontal = bounds.width >= bounds.height;
    let total = if horizontal {
        bounds.width
    } else {
        bounds.height
    };

    let mut pos = if horizontal { bounds.x } else { bounds.y };
    strip_lengths(total, count)
        .into_iter()
        .map(|len| {
            let tile = if horizontal {
                Rect::new(pos, bounds.y, len, bounds.height)
            } else {
                Rect::new(bounds.x, pos, bounds.width, len)
            };
            pos += len;
            tile
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{split_count, strip_lengths, tile_rects};
    use crate::image::Rect;

    #[test]
    fn square_frame_and_leaf_use_one_tile() {
        assert_eq!(split_count(Rect::new(0, 0, 64, 64), 1.0), 1);
    }

    #[test]
    fn widescreen_frame_with_square_leaf_uses_two_tiles() {
        // 16:9 -> ratio 1.78, 1.78^2 = 3.16 > 1 * 2
        assert_eq!(split_count(Rect::new(0, 0, 1920, 1080), 1.0), 2);
    }

    #[test]
    fn leaf_aspect_is_taken_along_the_long_axis() {
        // A 2:1 leaf fits a 2:1 frame in one strip.
        assert_eq!(split_count(Rect::new(0, 0, 200, 100), 2.0), 1);
        // A 1:2 leaf over a 1:4 portrait frame needs two strips.
        assert_eq!(split_count(Rect::new(0, 0, 100, 400), 0.5), 2);
    }

    #[test]
    fn count_is_clamped_to_axis_length() {
        assert_eq!(split_count(Rect::new(0, 0, 3, 1), 0.01), 3);
    }

    #[test]
    fn strip_lengths_spread_remainder() {
        assert_eq!(strip_lengths(10, 3), vec![3, 3, 4]);
        assert_eq!(strip_lengths(7, 4), vec![1, 2, 2, 2]);
        assert_eq!(strip_lengths(8, 4), vec![2, 2, 2, 2]);
    }

    #[test]
    fn tile_rects_cover_portrait_frames_vertically() {
        let tiles = tile_rects(Rect::new(0, 0, 10, 31), 1.0);
        assert_eq!(tiles.len(), 3);
        assert_eq!(tiles[0], Rect::new(0, 0, 10, 10));
        assert_eq!(tiles[2].bottom(), 31);
    }
}
