//! Leaf template storage.

use crate::image::PixelSurface;

mod luminance;

/// The sprite stamped onto every quadtree leaf, before resizing and tinting.
#[derive(Clone, Debug)]
pub struct LeafTemplate {
    surface: PixelSurface,
}

impl LeafTemplate {
    /// Uses `surface` as-is.
    pub fn new(surface: PixelSurface) -> Self {
        Self { surface }
    }

    /// Stretches the surface's luminance to the full range before storing it.
    pub fn normalized(mut surface: PixelSurface) -> Self {
        surface.rescale_luminance(0.0, 1.0);
        Self { surface }
    }

    /// Returns the template pixels.
    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    pub fn into_surface(self) -> PixelSurface {
        self.surface
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.surface.width() as f64 / self.surface.height() as f64
    }
}
