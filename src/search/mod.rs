//! Multi-scale template match engine.
//!
//! [`MatchEngine`] sweeps one or more named templates over a target image at
//! a ladder of scale factors, pools the correlation peaks, and resolves
//! overlapping detections with IoU-based non-maximum suppression. A
//! diagnostic mode reports the closest candidate per template even when
//! nothing clears the threshold.

use crate::candidate::nms::{suppress_overlaps, Suppression};
use crate::candidate::Detection;
use crate::image::{ImageView, OwnedImage};
use crate::preprocess::Preprocess;
use crate::search::sweep::{run_passes, PassOutcome, PassSpec};
use crate::template::Template;
use crate::trace::{trace_event, trace_span};
use crate::util::{SheetMatchError, SheetMatchResult};

pub mod scan;
pub(crate) mod sweep;

/// Default minimum score to accept a raw detection.
pub const DEFAULT_THRESHOLD: f32 = 0.75;
/// Default IoU above which two detections are duplicates.
pub const DEFAULT_NMS_IOU: f32 = 0.4;
/// Default cap on peaks retained per (template, scale) pass.
pub const DEFAULT_MAX_PER_SCALE: usize = 50;
/// Default floor on resized template dimensions.
pub const DEFAULT_MIN_TEMPLATE_DIM: usize = 10;

/// Default scale ladder, covering the zoom spread of handheld captures.
pub fn default_scales() -> Vec<f32> {
    vec![1.4, 1.3, 1.2, 1.1, 1.0, 0.95, 0.9, 0.85, 0.8, 0.75]
}

/// Validated engine configuration.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Minimum ZNCC score to accept a raw detection, in `[0, 1]`.
    pub threshold: f32,
    /// Scale factors to try per template, in sweep order.
    pub scales: Vec<f32>,
    /// IoU above which two candidates are considered duplicates.
    pub nms_iou: f32,
    /// Transform correlated on both template and target.
    pub preprocess: Preprocess,
    /// Whether suppression crosses template boundaries.
    pub suppression: Suppression,
    /// Peaks retained per (template, scale) pass; keeps noisy passes from
    /// flooding the pool.
    pub max_per_scale: usize,
    /// Floor on resized template dimensions.
    pub min_template_dim: usize,
    /// Run sweep passes across threads (effective with the `rayon` feature).
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            scales: default_scales(),
            nms_iou: DEFAULT_NMS_IOU,
            preprocess: Preprocess::default(),
            suppression: Suppression::default(),
            max_per_scale: DEFAULT_MAX_PER_SCALE,
            min_template_dim: DEFAULT_MIN_TEMPLATE_DIM,
            parallel: false,
        }
    }
}

impl EngineConfig {
    /// Range-checks every field.
    pub fn validate(&self) -> SheetMatchResult<()> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(SheetMatchError::InvalidInput(
                "threshold must be within [0, 1]",
            ));
        }
        if self.scales.is_empty() {
            return Err(SheetMatchError::InvalidInput("scale list is empty"));
        }
        if self.scales.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(SheetMatchError::InvalidInput(
                "scale factors must be positive",
            ));
        }
        if !self.nms_iou.is_finite() || !(0.0..=1.0).contains(&self.nms_iou) {
            return Err(SheetMatchError::InvalidInput(
                "nms_iou must be within [0, 1]",
            ));
        }
        if self.max_per_scale == 0 {
            return Err(SheetMatchError::InvalidInput(
                "max_per_scale must be at least 1",
            ));
        }
        if self.min_template_dim == 0 {
            return Err(SheetMatchError::InvalidInput(
                "min_template_dim must be at least 1",
            ));
        }
        self.preprocess.validate()
    }
}

/// Detections surviving thresholding and suppression, best first.
pub struct MatchReport {
    /// Surviving detections ordered by descending score.
    pub detections: Vec<Detection>,
    /// Highest-scoring raw candidate observed, even below threshold. Useful
    /// to see what came closest when `detections` is empty.
    pub best_seen: Option<Detection>,
}

/// Best candidate for one template across every scale that fit.
pub struct TemplateBest {
    /// Template identifier.
    pub template: String,
    /// Best candidate, or `None` when no scale of this template fit inside
    /// the target.
    pub best: Option<Detection>,
}

/// Outcome of the diagnostic best-of search.
pub struct BestReport {
    /// Highest-scoring candidate across all templates and scales.
    pub best: Option<Detection>,
    /// Best candidate per template, in input order.
    pub per_template: Vec<TemplateBest>,
}

/// Multi-scale, preprocessing-aware template matcher.
pub struct MatchEngine {
    config: EngineConfig,
}

impl MatchEngine {
    /// Creates an engine, validating the configuration up front.
    pub fn new(config: EngineConfig) -> SheetMatchResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Locates every instance of the given templates inside `target`.
    ///
    /// Scales whose resized template outgrows the target are skipped, never
    /// an error; a target smaller than every scaled template yields an empty
    /// report. An empty `templates` slice fails fast.
    pub fn find_matches(
        &self,
        target: ImageView<'_>,
        templates: &[Template],
    ) -> SheetMatchResult<MatchReport> {
        let _span = trace_span!("find_matches", templates = templates.len()).entered();
        validate_templates(templates)?;

        let (prepared_target, prepared_templates) = self.prepare(target, templates)?;
        let specs = self.build_specs(templates);
        let outcomes = run_passes(
            prepared_target.view(),
            &prepared_templates,
            &specs,
            self.config.max_per_scale,
            self.config.min_template_dim,
            self.config.parallel,
        )?;

        let mut pool = Vec::new();
        let mut best_seen: Option<Detection> = None;
        for outcome in outcomes.into_iter().flatten() {
            let name = templates[outcome.template_idx].name();
            if let Some(peak) = outcome.best {
                let candidate = make_detection(name, &outcome, peak);
                if best_seen.as_ref().is_none_or(|b| candidate.score > b.score) {
                    best_seen = Some(candidate);
                }
            }
            for peak in &outcome.peaks {
                pool.push(make_detection(name, &outcome, *peak));
            }
        }

        trace_event!("pool", candidates = pool.len());
        let detections = suppress_overlaps(pool, self.config.nms_iou, self.config.suppression);
        trace_event!("kept", detections = detections.len());

        Ok(MatchReport {
            detections,
            best_seen,
        })
    }

    /// Reports the single closest candidate across all templates and scales,
    /// with no threshold gate and no suppression.
    ///
    /// Answers "if nothing matched, what came closest, and which template and
    /// scale" — `best` is `None` only when every scale of every template
    /// outgrows the target.
    pub fn find_best(
        &self,
        target: ImageView<'_>,
        templates: &[Template],
    ) -> SheetMatchResult<BestReport> {
        let _span = trace_span!("find_best", templates = templates.len()).entered();
        validate_templates(templates)?;

        let (prepared_target, prepared_templates) = self.prepare(target, templates)?;
        let specs = self.build_specs(templates);
        // cap 0: only the per-pass best is wanted.
        let outcomes = run_passes(
            prepared_target.view(),
            &prepared_templates,
            &specs,
            0,
            self.config.min_template_dim,
            self.config.parallel,
        )?;

        let mut per_template: Vec<Option<Detection>> = (0..templates.len()).map(|_| None).collect();
        for outcome in outcomes.into_iter().flatten() {
            let idx = outcome.template_idx;
            if let Some(peak) = outcome.best {
                let candidate = make_detection(templates[idx].name(), &outcome, peak);
                if per_template[idx]
                    .as_ref()
                    .is_none_or(|b| candidate.score > b.score)
                {
                    per_template[idx] = Some(candidate);
                }
            }
        }

        let mut best: Option<Detection> = None;
        for candidate in per_template.iter().flatten() {
            if best.as_ref().is_none_or(|b| candidate.score > b.score) {
                best = Some(candidate.clone());
            }
        }

        let per_template = templates
            .iter()
            .zip(per_template)
            .map(|(tpl, best)| TemplateBest {
                template: tpl.name().to_string(),
                best,
            })
            .collect();

        Ok(BestReport { best, per_template })
    }

    /// Applies the configured preprocessing once to the target and once per
    /// template; nothing is retained between calls.
    fn prepare(
        &self,
        target: ImageView<'_>,
        templates: &[Template],
    ) -> SheetMatchResult<(OwnedImage, Vec<OwnedImage>)> {
        let prepared_target = self.config.preprocess.apply(target)?;
        let prepared_templates = templates
            .iter()
            .map(|tpl| self.config.preprocess.apply(tpl.view()))
            .collect::<SheetMatchResult<Vec<_>>>()?;
        Ok((prepared_target, prepared_templates))
    }

    fn build_specs(&self, templates: &[Template]) -> Vec<PassSpec> {
        let mut specs = Vec::new();
        for (template_idx, template) in templates.iter().enumerate() {
            let threshold = template.threshold().unwrap_or(self.config.threshold);
            let scales = template.scales().unwrap_or(self.config.scales.as_slice());
            for &scale in scales {
                specs.push(PassSpec {
                    template_idx,
                    scale,
                    threshold,
                });
            }
        }
        specs
    }
}

fn make_detection(name: &str, outcome: &PassOutcome, peak: crate::candidate::Peak) -> Detection {
    Detection {
        template: name.to_string(),
        x: peak.x,
        y: peak.y,
        width: outcome.width,
        height: outcome.height,
        score: peak.score,
        scale: outcome.scale,
    }
}

fn validate_templates(templates: &[Template]) -> SheetMatchResult<()> {
    if templates.is_empty() {
        return Err(SheetMatchError::InvalidInput("template set is empty"));
    }
    for template in templates {
        if let Some(threshold) = template.threshold() {
            if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
                return Err(SheetMatchError::InvalidInput(
                    "template threshold override must be within [0, 1]",
                ));
            }
        }
        if let Some(scales) = template.scales() {
            if scales.is_empty() {
                return Err(SheetMatchError::InvalidInput(
                    "template scale override is empty",
                ));
            }
            if scales.iter().any(|s| !s.is_finite() || *s <= 0.0) {
                return Err(SheetMatchError::InvalidInput(
                    "template scale factors must be positive",
                ));
            }
        }
    }
    Ok(())
}
