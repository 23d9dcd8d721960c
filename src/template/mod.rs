//! Named reference templates and per-scale correlation plans.

use crate::image::{ImageView, OwnedImage};
use crate::util::SheetMatchResult;

mod plan;

pub use plan::TemplatePlan;

/// Named grayscale pattern to search for in a target image.
///
/// A template may override the engine-wide detection threshold and scale
/// ladder; templates cut from reference sheets at a known zoom typically pin
/// `scales` to a narrow band.
pub struct Template {
    name: String,
    image: OwnedImage,
    threshold: Option<f32>,
    scales: Option<Vec<f32>>,
}

impl Template {
    /// Creates a template from a contiguous grayscale buffer.
    pub fn new(
        name: impl Into<String>,
        data: Vec<u8>,
        width: usize,
        height: usize,
    ) -> SheetMatchResult<Self> {
        let image = OwnedImage::new(data, width, height)?;
        Ok(Self {
            name: name.into(),
            image,
            threshold: None,
            scales: None,
        })
    }

    /// Overrides the engine detection threshold for this template.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Overrides the engine scale ladder for this template.
    pub fn with_scales(mut self, scales: Vec<f32>) -> Self {
        self.scales = Some(scales);
        self
    }

    /// Returns the template identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a borrowed view of the template pixels.
    pub fn view(&self) -> ImageView<'_> {
        self.image.view()
    }

    /// Returns the per-template threshold override, if any.
    pub fn threshold(&self) -> Option<f32> {
        self.threshold
    }

    /// Returns the per-template scale override, if any.
    pub fn scales(&self) -> Option<&[f32]> {
        self.scales.as_deref()
    }
}
