//! Convenience helpers for loading and saving surfaces via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::codec::FrameCodec;
use crate::image::PixelSurface;
use crate::util::{MosaicError, MosaicResult};
use image::{DynamicImage, ExtendedColorType, ImageFormat};
use std::fs;
use std::path::{Path, PathBuf};

/// Creates an RGB or RGBA surface from a dynamic image, keeping alpha if present.
pub fn surface_from_dynamic_image(img: &DynamicImage) -> MosaicResult<PixelSurface> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    if img.color().has_alpha() {
        PixelSurface::new(img.to_rgba8().into_raw(), width, height, 4)
    } else {
        PixelSurface::new(img.to_rgb8().into_raw(), width, height, 3)
    }
}

/// Loads an image from disk as an RGB or RGBA surface.
pub fn load_surface<P: AsRef<Path>>(path: P) -> MosaicResult<PixelSurface> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|err| io_error(path, err))?;
    surface_from_dynamic_image(&img)
}

/// Saves a surface, inferring the format from the file extension.
///
/// Parent directories are created as needed. The image is written to a
/// sibling temporary file and renamed into place, so a failed encode never
/// leaves a truncated output behind.
pub fn save_surface<P: AsRef<Path>>(surface: &PixelSurface, path: P) -> MosaicResult<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path).map_err(|err| io_error(path, err))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| io_error(parent, err))?;
    }

    let width = u32::try_from(surface.width()).map_err(|_| dims_error(surface))?;
    let height = u32::try_from(surface.height()).map_err(|_| dims_error(surface))?;
    // JPEG has no alpha channel.
    let rgb_only;
    let (data, color) = if !surface.has_alpha() {
        (surface.data(), ExtendedColorType::Rgb8)
    } else if format == ImageFormat::Jpeg {
        rgb_only = strip_alpha(surface);
        (rgb_only.as_slice(), ExtendedColorType::Rgb8)
    } else {
        (surface.data(), ExtendedColorType::Rgba8)
    };

    let partial = partial_path(path);
    let written = image::save_buffer_with_format(&partial, data, width, height, color, format)
        .map_err(|err| io_error(path, err))
        .and_then(|()| fs::rename(&partial, path).map_err(|err| io_error(path, err)));
    if written.is_err() {
        let _ = fs::remove_file(&partial);
    }
    written
}

/// `FrameCodec` backed by image files on disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageFileCodec;

impl FrameCodec for ImageFileCodec {
    fn decode(&self, path: &Path) -> MosaicResult<PixelSurface> {
        load_surface(path)
    }

    fn encode(&self, surface: &PixelSurface, path: &Path) -> MosaicResult<()> {
        save_surface(surface, path)
    }
}

fn strip_alpha(surface: &PixelSurface) -> Vec<u8> {
    surface
        .data()
        .chunks_exact(4)
        .flat_map(|px| px[..3].iter().copied())
        .collect()
}

fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.partial"))
}

fn io_error(path: &Path, err: impl std::fmt::Display) -> MosaicError {
    MosaicError::ImageIo {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

fn dims_error(surface: &PixelSurface) -> MosaicError {
    MosaicError::InvalidDimensions {
        width: surface.width(),
        height: surface.height(),
    }
}
