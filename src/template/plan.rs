//! Precomputed statistics for one resized template variant.

use crate::image::ImageView;
use crate::util::{SheetMatchError, SheetMatchResult};

/// Zero-mean template buffer plus the statistics a ZNCC scan needs.
///
/// One plan corresponds to one (template, scale) pass of the sweep; the
/// pixels it is built from are already preprocessed and resized.
pub struct TemplatePlan {
    width: usize,
    height: usize,
    scale: f32,
    zero_mean: Vec<f32>,
    var_t: f32,
}

impl TemplatePlan {
    /// Builds a plan from a resized template view.
    ///
    /// Fails with [`SheetMatchError::DegenerateTemplate`] when the pixels have
    /// no variance; a flat patch cannot be normalized and would match
    /// everything equally.
    pub fn from_view(tpl: ImageView<'_>, scale: f32) -> SheetMatchResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width * height;

        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        for y in 0..height {
            let row = tpl.row(y).expect("row within template bounds");
            for &value in row {
                let v = value as f64;
                sum += v;
                sum_sq += v * v;
            }
        }

        let count_f = count as f64;
        let mean = sum / count_f;
        let variance = sum_sq - sum * sum / count_f;
        if variance <= 1e-8 {
            return Err(SheetMatchError::DegenerateTemplate {
                reason: "zero variance",
            });
        }

        let mut zero_mean = Vec::with_capacity(count);
        for y in 0..height {
            let row = tpl.row(y).expect("row within template bounds");
            for &value in row {
                zero_mean.push((value as f64 - mean) as f32);
            }
        }

        Ok(Self {
            width,
            height,
            scale,
            zero_mean,
            var_t: variance as f32,
        })
    }

    /// Returns the resized template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the resized template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the scale factor this plan was resized with.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn zero_mean(&self) -> &[f32] {
        &self.zero_mean
    }

    /// Returns the summed squared deviation of the template pixels.
    pub fn var_t(&self) -> f32 {
        self.var_t
    }
}
