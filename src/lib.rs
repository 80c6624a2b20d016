//! QuadMosaic renders video frames as quadtree mosaics of an animated sprite.
//!
//! Every input frame is cut into aspect-matched tiles and each tile is
//! decomposed into a quadtree. Each leaf is painted with a frame of a leaf
//! animation, resized to the leaf and tinted with the region's color. Engines
//! (one per animation frame) are built lazily, shared by every output frame
//! that uses them, and released once their last job finishes. Jobs run on a
//! rayon pool.
//!
//! Disk I/O is available behind the `image-io` feature; structured logging
//! through `tracing` behind the `tracing` feature.

pub mod bank;
pub mod engine;
pub mod image;
pub mod policy;
pub mod schedule;
pub mod template;
mod trace;
pub mod util;

pub use bank::{SpriteCache, SpriteKey};
pub use engine::{DecompositionParams, QuadtreeEngine, Strategy};
pub use image::codec::FrameCodec;
#[cfg(feature = "image-io")]
pub use image::io;
pub use image::{PixelSurface, Rect, RgbColor};
pub use policy::SubdivisionPolicy;
pub use schedule::{
    EngineSlot, FrameFailure, FrameJob, FrameScheduler, RenderConfig, RunReport, SlotState,
    SlotStats, UseTicket,
};
pub use template::LeafTemplate;
pub use util::{MosaicError, MosaicResult};
