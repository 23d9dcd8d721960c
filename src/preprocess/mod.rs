//! Preprocessing variants applied before correlation.
//!
//! A pass always correlates the template and the target through the same
//! variant; the engine applies the transform once per image per call.

use crate::image::{ImageView, OwnedImage};
use crate::util::{SheetMatchError, SheetMatchResult};

pub mod clahe;
pub mod edge;

/// Default CLAHE tile size in pixels.
pub const DEFAULT_CLAHE_TILE: usize = 8;
/// Default CLAHE clip limit as a multiple of the uniform bin count.
pub const DEFAULT_CLAHE_CLIP: f32 = 2.0;
/// Default lower hysteresis threshold for edge extraction.
pub const DEFAULT_EDGE_LOW: f32 = 60.0;
/// Default upper hysteresis threshold for edge extraction.
pub const DEFAULT_EDGE_HIGH: f32 = 180.0;

/// Transform applied to both template and target before scanning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Preprocess {
    /// Plain grayscale intensities.
    Raw,
    /// Contrast-limited adaptive histogram equalization; robust to uneven
    /// lighting across the scanned sheet.
    Clahe { tile_size: usize, clip_limit: f32 },
    /// Binary gradient-magnitude edge map with hysteresis thresholds; trades
    /// illumination robustness for sensitivity to fine texture. Contrast is
    /// equalized before gradient extraction so the thresholds behave
    /// consistently across capture conditions.
    EdgeMap { low: f32, high: f32 },
}

impl Default for Preprocess {
    fn default() -> Self {
        Preprocess::Clahe {
            tile_size: DEFAULT_CLAHE_TILE,
            clip_limit: DEFAULT_CLAHE_CLIP,
        }
    }
}

impl Preprocess {
    /// Applies the transform, producing an owned grayscale image of the same
    /// dimensions.
    pub fn apply(&self, image: ImageView<'_>) -> SheetMatchResult<OwnedImage> {
        match *self {
            Preprocess::Raw => OwnedImage::from_view(image),
            Preprocess::Clahe {
                tile_size,
                clip_limit,
            } => clahe::equalize_clahe(image, tile_size, clip_limit),
            Preprocess::EdgeMap { low, high } => {
                let equalized =
                    clahe::equalize_clahe(image, DEFAULT_CLAHE_TILE, DEFAULT_CLAHE_CLIP)?;
                edge::edge_map(equalized.view(), low, high)
            }
        }
    }

    /// Range-checks the variant parameters.
    pub(crate) fn validate(&self) -> SheetMatchResult<()> {
        match *self {
            Preprocess::Raw => Ok(()),
            Preprocess::Clahe {
                tile_size,
                clip_limit,
            } => {
                if tile_size == 0 {
                    return Err(SheetMatchError::InvalidInput(
                        "clahe tile size must be at least 1",
                    ));
                }
                if !clip_limit.is_finite() || clip_limit <= 0.0 {
                    return Err(SheetMatchError::InvalidInput(
                        "clahe clip limit must be positive",
                    ));
                }
                Ok(())
            }
            Preprocess::EdgeMap { low, high } => {
                if !low.is_finite() || !high.is_finite() || low < 0.0 || high < low {
                    return Err(SheetMatchError::InvalidInput(
                        "edge thresholds must satisfy 0 <= low <= high",
                    ));
                }
                Ok(())
            }
        }
    }
}
