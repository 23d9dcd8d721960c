//! Error types for sheetmatch.

use thiserror::Error;

/// Result alias for sheetmatch operations.
pub type SheetMatchResult<T> = std::result::Result<T, SheetMatchError>;

/// Errors that can occur when validating inputs or running the matcher.
///
/// An empty detection list is never an error; it is the normal outcome of a
/// search that found nothing above threshold.
#[derive(Debug, Error, PartialEq)]
pub enum SheetMatchError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Image dimensions are zero or overflow the addressable range.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The row stride is smaller than the image width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The backing buffer cannot hold the described image.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A scan was asked to place a template larger than the image.
    #[error("template {width}x{height} does not fit image {img_width}x{img_height}")]
    ScanOutOfBounds {
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// The template carries no usable signal for normalized correlation.
    #[error("degenerate template: {reason}")]
    DegenerateTemplate { reason: &'static str },
    /// Failure while decoding or loading an image from disk.
    #[cfg(feature = "image-io")]
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
