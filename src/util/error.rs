//! Error types for quadmosaic.

use thiserror::Error;

/// Result alias for quadmosaic operations.
pub type MosaicResult<T> = std::result::Result<T, MosaicError>;

/// Errors that can occur when decomposing or rendering frames.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MosaicError {
    /// Width or height is zero, or the pixel count overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The pixel buffer does not match `width * height * channels`.
    #[error("buffer size mismatch: needed {needed} bytes, got {got}")]
    BufferSizeMismatch { needed: usize, got: usize },
    /// Only RGB and RGBA surfaces are supported.
    #[error("unsupported channel count: {channels}")]
    UnsupportedChannels { channels: usize },
    /// A decomposition or run parameter is out of range.
    #[error("invalid parameters: {reason}")]
    InvalidParameters { reason: &'static str },
    /// The subdivision mode string is not recognized.
    #[error("unknown policy mode '{mode}' (expected 'bw' or 'color')")]
    UnknownPolicyMode { mode: String },
    /// The background color string is not a valid hex color.
    #[error("invalid color '{value}'")]
    InvalidColor { value: String },
    /// Reading or writing an image file failed.
    #[error("image I/O failed for {path}: {reason}")]
    ImageIo { path: String, reason: String },
    /// The worker pool could not be created.
    #[error("thread pool error: {reason}")]
    ThreadPool { reason: String },
    /// An engine was requested after its slot had been torn down.
    #[error("engine for {source_path} was already retired")]
    EngineRetired { source_path: String },
}
