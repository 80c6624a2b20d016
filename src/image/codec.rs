//! Codec seam between the renderer and whatever stores frames.

use crate::image::PixelSurface;
use crate::util::MosaicResult;
use std::path::Path;

/// Loads and stores frames by path.
///
/// Implementations are shared by every worker thread of a render batch, so
/// they must be `Sync`. `encode` must not leave a partial file behind when it
/// fails.
pub trait FrameCodec: Sync {
    /// Decodes the frame stored at `path`.
    fn decode(&self, path: &Path) -> MosaicResult<PixelSurface>;

    /// Encodes `surface` to `path`.
    fn encode(&self, surface: &PixelSurface, path: &Path) -> MosaicResult<()>;
}

impl<C: FrameCodec + ?Sized> FrameCodec for &C {
    fn decode(&self, path: &Path) -> MosaicResult<PixelSurface> {
        (**self).decode(path)
    }

    fn encode(&self, surface: &PixelSurface, path: &Path) -> MosaicResult<()> {
        (**self).encode(surface, path)
    }
}
