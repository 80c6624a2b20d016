//! Merge-on-unwind quadtree decomposition.
//!
//! Every tile is first visited all the way down to `min_size`. On the way back
//! up, four pending sibling leaves are offered to the policy; if it accepts,
//! they collapse into one pending leaf for the parent and nothing is drawn
//! yet. If it refuses, or if any sibling already had to render its own
//! children, the pending siblings are rendered immediately. The merge decision
//! therefore always compares true leaf-level colors instead of coarse
//! whole-region statistics.

use crate::engine::{render_leaf, PendingLeaf, QuadtreeEngine};
use crate::image::{PixelSurface, Rect};
use crate::util::MosaicResult;

/// Decomposes and renders one tile in place.
pub(crate) fn decompose_tile(
    engine: &QuadtreeEngine,
    frame: &mut PixelSurface,
    tile: Rect,
) -> MosaicResult<()> {
    if tile.is_empty() {
        return Ok(());
    }
    if let Some(leaf) = decompose(engine, frame, tile)? {
        render_leaf(engine, frame, leaf)?;
    }
    Ok(())
}

/// Returns `Some` for a region that is still one unrendered leaf, `None` once
/// the region has been drawn.
fn decompose(
    engine: &QuadtreeEngine,
    frame: &mut PixelSurface,
    rect: Rect,
) -> MosaicResult<Option<PendingLeaf>> {
    if rect.min_side() <= engine.params().min_size {
        let color = engine.policy().representative_color(frame, rect);
        return Ok(Some(PendingLeaf { color, rect }));
    }

    let mut children = [None; 4];
    for (child, quad) in children.iter_mut().zip(rect.quadrants()) {
        *child = decompose(engine, frame, quad)?;
    }

    if let [Some(tl), Some(tr), Some(bl), Some(br)] = children {
        let (merge, color) = engine
            .policy()
            .should_merge(&[tl.color, tr.color, bl.color, br.color]);
        if merge {
            return Ok(Some(PendingLeaf { color, rect }));
        }
    }

    for leaf in children.into_iter().flatten() {
        render_leaf(engine, frame, leaf)?;
    }
    Ok(None)
}
