//! Quadtree decomposition engine.
//!
//! A `QuadtreeEngine` turns one input frame into a mosaic: the frame is cut
//! into aspect-matched tiles (see [`tiles`]), each tile is decomposed into
//! a quadtree whose leaves are at least `min_size` pixels on their shorter
//! side, and every leaf is painted as the background color overlaid with the
//! leaf sprite resized to the leaf and tinted with its representative color.
//!
//! The frame is consumed and drawn over in place. A region is only ever read
//! before it is rendered and regions never overlap, so the statistics used for
//! decisions always come from original pixels.

mod merge;
pub mod tiles;
mod topdown;

use crate::bank::SpriteCache;
use crate::image::{PixelSurface, Rect, RgbColor};
use crate::policy::SubdivisionPolicy;
use crate::template::LeafTemplate;
use crate::trace::{trace_event, trace_span};
use crate::util::{MosaicError, MosaicResult};

/// Per-engine decomposition settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecompositionParams {
    /// Regions whose shorter side is at most this many pixels become leaves.
    pub min_size: usize,
    /// Painted under every leaf sprite.
    pub background: RgbColor,
}

impl Default for DecompositionParams {
    fn default() -> Self {
        Self {
            min_size: 8,
            background: RgbColor::BLACK,
        }
    }
}

impl DecompositionParams {
    /// Rejects parameters that cannot produce a valid decomposition.
    pub fn validate(&self) -> MosaicResult<()> {
        if self.min_size == 0 {
            return Err(MosaicError::InvalidParameters {
                reason: "min_size must be at least 1",
            });
        }
        Ok(())
    }
}

/// How the quadtree decides where to stop subdividing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Recurse to `min_size`, then merge uniform siblings bottom-up.
    #[default]
    MergeOnUnwind,
    /// Split a region only when its own pixel spread exceeds the threshold.
    TopDown,
}

/// A leaf whose color is known but which has not been drawn yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PendingLeaf {
    pub(crate) color: RgbColor,
    pub(crate) rect: Rect,
}

/// Decomposition context for one animation frame.
#[derive(Debug)]
pub struct QuadtreeEngine {
    sprites: SpriteCache,
    params: DecompositionParams,
    policy: SubdivisionPolicy,
    strategy: Strategy,
}

impl QuadtreeEngine {
    /// Creates an engine using the default merge-on-unwind strategy.
    pub fn new(
        template: LeafTemplate,
        params: DecompositionParams,
        policy: SubdivisionPolicy,
    ) -> MosaicResult<Self> {
        params.validate()?;
        Ok(Self {
            sprites: SpriteCache::new(template),
            params,
            policy,
            strategy: Strategy::default(),
        })
    }

    /// Replaces the decomposition strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn params(&self) -> &DecompositionParams {
        &self.params
    }

    pub fn policy(&self) -> &SubdivisionPolicy {
        &self.policy
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Sprite cache holding every leaf size rendered so far.
    pub fn sprites(&self) -> &SpriteCache {
        &self.sprites
    }

    /// Decomposes `frame` and returns it with the mosaic drawn over it.
    pub fn process_frame(&self, frame: PixelSurface) -> MosaicResult<PixelSurface> {
        let _span = trace_span!(
            "process_frame",
            width = frame.width(),
            height = frame.height()
        )
        .entered();

        let tiles = tiles::tile_rects(frame.bounds(), self.sprites.template().aspect_ratio());
        trace_event!("tiles", count = tiles.len());

        let mut frame = frame;
        for tile in tiles {
            match self.strategy {
                Strategy::MergeOnUnwind => merge::decompose_tile(self, &mut frame, tile)?,
                Strategy::TopDown => topdown::subdivide_tile(self, &mut frame, tile)?,
            }
        }
        trace_event!("sprite_sizes", count = self.sprites.len());
        Ok(frame)
    }
}

/// Paints the background over the leaf, then the tinted sprite on top.
pub(crate) fn render_leaf(
    engine: &QuadtreeEngine,
    frame: &mut PixelSurface,
    leaf: PendingLeaf,
) -> MosaicResult<()> {
    let sprite = engine.sprites.get(leaf.rect.width, leaf.rect.height)?;
    frame.fill_rect(leaf.rect, engine.params.background);
    frame.composite_over(
        &sprite.tint(leaf.color),
        leaf.rect.x as isize,
        leaf.rect.y as isize,
    );
    Ok(())
}
