//! Dense ZNCC scan over the full placement range.

use crate::candidate::topk::{peak_cmp_desc, Peak, TopK};
use crate::template::TemplatePlan;
use crate::util::{SheetMatchError, SheetMatchResult};
use crate::ImageView;
use std::cmp::Ordering;

/// Variance floor below which an image window is treated as flat and skipped.
pub(crate) const MIN_WINDOW_VAR: f32 = 1e-6;

/// Scan configuration for one pass.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Maximum number of peaks to retain (0 disables peak collection).
    pub cap: usize,
    /// Minimum score for a peak to be retained.
    pub min_score: f32,
    /// Minimum window variance for a placement to be scored.
    pub min_var: f32,
}

/// Result of one scan pass.
pub struct ScanOutcome {
    /// Peaks at or above `min_score`, sorted by descending score, at most
    /// `cap` of them.
    pub peaks: Vec<Peak>,
    /// Best-scoring placement regardless of `min_score`; `None` only when no
    /// placement had usable variance.
    pub best: Option<Peak>,
}

/// Scans every valid placement of `plan` inside `image`.
///
/// Scores are zero-mean normalized cross-correlation in approximately
/// `[-1, 1]`. The plan must fit inside the image in both axes.
pub fn scan_zncc(
    image: ImageView<'_>,
    plan: &TemplatePlan,
    params: ScanParams,
) -> SheetMatchResult<ScanOutcome> {
    let img_width = image.width();
    let img_height = image.height();
    let tpl_width = plan.width();
    let tpl_height = plan.height();
    if img_width < tpl_width || img_height < tpl_height {
        return Err(SheetMatchError::ScanOutOfBounds {
            width: tpl_width,
            height: tpl_height,
            img_width,
            img_height,
        });
    }

    let max_x = img_width - tpl_width;
    let max_y = img_height - tpl_height;
    let count = (tpl_width * tpl_height) as f32;
    let var_t = plan.var_t();
    let zero_mean = plan.zero_mean();

    let mut topk = TopK::new(params.cap);
    let mut best: Option<Peak> = None;
    for y in 0..=max_y {
        for x in 0..=max_x {
            let mut dot = 0.0f32;
            let mut sum_i = 0.0f32;
            let mut sum_i2 = 0.0f32;

            for ty in 0..tpl_height {
                let img_row = image.row(y + ty).expect("row within bounds for scan");
                let window = &img_row[x..x + tpl_width];
                let tpl_row = &zero_mean[ty * tpl_width..(ty + 1) * tpl_width];
                for (&t_prime, &pixel) in tpl_row.iter().zip(window) {
                    let value = pixel as f32;
                    dot += t_prime * value;
                    sum_i += value;
                    sum_i2 += value * value;
                }
            }

            let var_i = sum_i2 - sum_i * sum_i / count;
            if var_i <= params.min_var {
                continue;
            }

            let score = dot / (var_t * var_i).sqrt();
            if !score.is_finite() {
                continue;
            }

            let peak = Peak { x, y, score };
            if best
                .as_ref()
                .is_none_or(|b| peak_cmp_desc(&peak, b) == Ordering::Less)
            {
                best = Some(peak);
            }
            if score >= params.min_score {
                topk.push(peak);
            }
        }
    }

    Ok(ScanOutcome {
        peaks: topk.into_sorted_desc(),
        best,
    })
}
