//! Top-down decomposition.
//!
//! Each region decides from its own pixels whether to split. This is cheaper
//! than merge-on-unwind but coarser: a region is kept whole without ever
//! comparing the colors its children would have had.

use crate::engine::{render_leaf, PendingLeaf, QuadtreeEngine};
use crate::image::{PixelSurface, Rect};
use crate::util::MosaicResult;

pub(crate) fn subdivide_tile(
    engine: &QuadtreeEngine,
    frame: &mut PixelSurface,
    rect: Rect,
) -> MosaicResult<()> {
    if rect.is_empty() {
        return Ok(());
    }
    if rect.min_side() <= engine.params().min_size {
        let color = engine.policy().representative_color(frame, rect);
        return render_leaf(engine, frame, PendingLeaf { color, rect });
    }

    let (split, color) = engine.policy().needs_split(frame, rect);
    if !split {
        return render_leaf(engine, frame, PendingLeaf { color, rect });
    }
    for quad in rect.quadrants() {
        subdivide_tile(engine, frame, quad)?;
    }
    Ok(())
}
