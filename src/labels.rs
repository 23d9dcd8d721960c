//! Generic-object-labeling collaborator interface.
//!
//! A sibling visual-analysis path: given an image, an external service
//! returns labeled boxes in normalized coordinates. The match engine does not
//! consume these; the validation layer renders them next to template
//! detections.

use crate::image::ImageView;

/// Axis-aligned box in normalized `[0, 1]` image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedBox {
    /// Left edge as a fraction of the image width.
    pub x: f32,
    /// Top edge as a fraction of the image height.
    pub y: f32,
    /// Width as a fraction of the image width.
    pub width: f32,
    /// Height as a fraction of the image height.
    pub height: f32,
}

impl NormalizedBox {
    /// Converts to pixel coordinates `(x, y, width, height)` for an image of
    /// the given size, clamping to the image bounds.
    pub fn to_pixels(&self, img_width: usize, img_height: usize) -> (usize, usize, usize, usize) {
        let clamp01 = |v: f32| v.clamp(0.0, 1.0);
        let x0 = (clamp01(self.x) * img_width as f32) as usize;
        let y0 = (clamp01(self.y) * img_height as f32) as usize;
        let x1 = (clamp01(self.x + self.width) * img_width as f32) as usize;
        let y1 = (clamp01(self.y + self.height) * img_height as f32) as usize;
        (x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}

/// One labeled region reported by the service.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledBox {
    /// Label text, e.g. `"Ticket"`.
    pub label: String,
    /// Confidence in percent, `0.0..=100.0`.
    pub confidence: f32,
    /// Region the label applies to.
    pub region: NormalizedBox,
}

/// Source of labeled boxes for an image.
pub trait LabelSource {
    /// Backend-specific failure type.
    type Error;

    /// Detects labeled regions in the image.
    fn labeled_boxes(&self, image: ImageView<'_>) -> Result<Vec<LabeledBox>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::NormalizedBox;

    #[test]
    fn converts_to_pixel_rect() {
        let region = NormalizedBox {
            x: 0.25,
            y: 0.5,
            width: 0.5,
            height: 0.25,
        };
        assert_eq!(region.to_pixels(200, 100), (50, 50, 100, 25));
    }

    #[test]
    fn out_of_range_coordinates_clamp_to_bounds() {
        let region = NormalizedBox {
            x: 0.9,
            y: -0.1,
            width: 0.5,
            height: 0.3,
        };
        let (x, y, width, height) = region.to_pixels(100, 100);
        assert_eq!((x, y), (90, 0));
        assert!(x + width <= 100);
        assert!(y + height <= 100);
    }
}
