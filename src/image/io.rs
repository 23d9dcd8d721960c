//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Matching always runs on
//! grayscale; the color loader exists for overlay rendering.

use crate::image::{ImageView, OwnedImage};
use crate::util::{SheetMatchError, SheetMatchResult};
use std::path::Path;

/// Creates a borrowed view over a grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> SheetMatchResult<ImageView<'_>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Copies a grayscale image buffer into an owned image.
pub fn owned_from_gray_image(img: &image::GrayImage) -> SheetMatchResult<OwnedImage> {
    OwnedImage::new(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
    )
}

/// Converts any decoded image to an owned grayscale image.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> SheetMatchResult<OwnedImage> {
    owned_from_gray_image(&img.to_luma8())
}

/// Loads an image from disk and converts it to grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> SheetMatchResult<OwnedImage> {
    let img = image::open(path).map_err(|err| SheetMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}

/// Loads an image from disk in color for overlay rendering.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> SheetMatchResult<image::RgbImage> {
    let img = image::open(path).map_err(|err| SheetMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    Ok(img.to_rgb8())
}
