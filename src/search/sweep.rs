//! Scale sweep over (template, scale) passes.
//!
//! Each pass resizes one preprocessed template by one scale factor and scans
//! it across the preprocessed target. Passes are independent; the pooled
//! outcome is identical whether they run serially or in parallel.

use crate::candidate::topk::Peak;
use crate::image::resize::resize_area;
use crate::image::{ImageView, OwnedImage};
use crate::search::scan::{scan_zncc, ScanParams, MIN_WINDOW_VAR};
use crate::template::TemplatePlan;
use crate::trace::{trace_event, trace_span};
use crate::util::{SheetMatchError, SheetMatchResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// One planned (template, scale) correlation pass.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PassSpec {
    pub(crate) template_idx: usize,
    pub(crate) scale: f32,
    pub(crate) threshold: f32,
}

/// Result of one executed pass.
pub(crate) struct PassOutcome {
    pub(crate) template_idx: usize,
    pub(crate) scale: f32,
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) peaks: Vec<Peak>,
    pub(crate) best: Option<Peak>,
}

/// Resized template dimensions for a scale factor, floored at `min_dim`.
pub(crate) fn scaled_dims(
    width: usize,
    height: usize,
    scale: f32,
    min_dim: usize,
) -> (usize, usize) {
    let w = (width as f32 * scale).round() as usize;
    let h = (height as f32 * scale).round() as usize;
    (w.max(min_dim), h.max(min_dim))
}

/// Executes one pass, or returns `None` when the scale cannot produce a
/// candidate (template outgrows the target, or the resized pixels are flat).
fn run_pass(
    target: ImageView<'_>,
    template: ImageView<'_>,
    pass: &PassSpec,
    cap: usize,
    min_dim: usize,
) -> SheetMatchResult<Option<PassOutcome>> {
    let _span = trace_span!(
        "sweep_pass",
        template = pass.template_idx,
        scale = (pass.scale as f64)
    )
    .entered();

    let (width, height) = scaled_dims(template.width(), template.height(), pass.scale, min_dim);
    if width > target.width() || height > target.height() {
        trace_event!(
            "scale_skipped",
            template = pass.template_idx,
            width = width,
            height = height
        );
        return Ok(None);
    }

    let resized = resize_area(template, width, height)?;
    let plan = match TemplatePlan::from_view(resized.view(), pass.scale) {
        Ok(plan) => plan,
        Err(SheetMatchError::DegenerateTemplate { .. }) => {
            trace_event!("degenerate_scale", template = pass.template_idx);
            return Ok(None);
        }
        Err(err) => return Err(err),
    };

    let outcome = scan_zncc(
        target,
        &plan,
        ScanParams {
            cap,
            min_score: pass.threshold,
            min_var: MIN_WINDOW_VAR,
        },
    )?;

    Ok(Some(PassOutcome {
        template_idx: pass.template_idx,
        scale: pass.scale,
        width,
        height,
        peaks: outcome.peaks,
        best: outcome.best,
    }))
}

/// Runs every pass, optionally across threads, preserving pass order.
pub(crate) fn run_passes(
    target: ImageView<'_>,
    templates: &[OwnedImage],
    specs: &[PassSpec],
    cap: usize,
    min_dim: usize,
    parallel: bool,
) -> SheetMatchResult<Vec<Option<PassOutcome>>> {
    #[cfg(feature = "rayon")]
    if parallel {
        return specs
            .par_iter()
            .map(|pass| run_pass(target, templates[pass.template_idx].view(), pass, cap, min_dim))
            .collect();
    }
    let _ = parallel;

    specs
        .iter()
        .map(|pass| run_pass(target, templates[pass.template_idx].view(), pass, cap, min_dim))
        .collect()
}
