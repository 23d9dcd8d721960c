//! Overlay annotations derived from detections.
//!
//! Annotation building is a pure function of the detection list so rendering
//! and matching stay independently testable. Rasterization draws boxes and a
//! label strip; glyph rendering belongs to the UI layer, which gets the label
//! text through [`Annotation`].

use crate::candidate::Detection;

/// Drawable box with a human-readable caption.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    /// X coordinate (column) of the top-left corner.
    pub x: usize,
    /// Y coordinate (row) of the top-left corner.
    pub y: usize,
    /// Box width in pixels.
    pub width: usize,
    /// Box height in pixels.
    pub height: usize,
    /// Caption, e.g. `"serie 93.1%"`.
    pub label: String,
    /// Detection score backing the caption.
    pub score: f32,
}

/// Builds one annotation per detection, preserving order.
pub fn annotations(detections: &[Detection]) -> Vec<Annotation> {
    detections
        .iter()
        .map(|det| Annotation {
            x: det.x,
            y: det.y,
            width: det.width,
            height: det.height,
            label: format!("{} {:.1}%", det.template, det.score * 100.0),
            score: det.score,
        })
        .collect()
}

/// Height of the filled strip drawn above each box for the caption.
#[cfg(feature = "image-io")]
const LABEL_STRIP_HEIGHT: u32 = 18;

/// Draws box outlines and caption strips onto a color canvas.
///
/// Boxes partially outside the canvas are clipped, not an error.
#[cfg(feature = "image-io")]
pub fn draw_annotations(
    canvas: &mut image::RgbImage,
    annotations: &[Annotation],
    color: image::Rgb<u8>,
    thickness: u32,
) {
    for annotation in annotations {
        let x0 = annotation.x as u32;
        let y0 = annotation.y as u32;
        let x1 = x0.saturating_add(annotation.width as u32);
        let y1 = y0.saturating_add(annotation.height as u32);

        for t in 0..thickness {
            draw_rect_outline(canvas, x0.saturating_sub(t), y0.saturating_sub(t), x1 + t, y1 + t, color);
        }

        let strip_y0 = y0.saturating_sub(LABEL_STRIP_HEIGHT);
        let strip_x1 = x0.saturating_add(6 * annotation.label.len() as u32 + 6);
        fill_rect(canvas, x0, strip_y0, strip_x1, y0, color);
    }
}

#[cfg(feature = "image-io")]
fn draw_rect_outline(
    canvas: &mut image::RgbImage,
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
    color: image::Rgb<u8>,
) {
    let width = canvas.width();
    let height = canvas.height();
    for x in x0..=x1.min(width.saturating_sub(1)) {
        if y0 < height {
            canvas.put_pixel(x, y0, color);
        }
        if y1 < height {
            canvas.put_pixel(x, y1, color);
        }
    }
    for y in y0..=y1.min(height.saturating_sub(1)) {
        if x0 < width {
            canvas.put_pixel(x0, y, color);
        }
        if x1 < width {
            canvas.put_pixel(x1, y, color);
        }
    }
}

#[cfg(feature = "image-io")]
fn fill_rect(
    canvas: &mut image::RgbImage,
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
    color: image::Rgb<u8>,
) {
    let width = canvas.width();
    let height = canvas.height();
    for y in y0..y1.min(height) {
        for x in x0..x1.min(width) {
            canvas.put_pixel(x, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::annotations;
    use crate::candidate::Detection;

    #[test]
    fn captions_carry_template_and_percent_score() {
        let dets = vec![Detection {
            template: "serie".to_string(),
            x: 12,
            y: 7,
            width: 40,
            height: 30,
            score: 0.931,
            scale: 1.0,
        }];
        let out = annotations(&dets);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label, "serie 93.1%");
        assert_eq!((out[0].x, out[0].y, out[0].width, out[0].height), (12, 7, 40, 30));
    }

    #[test]
    fn order_is_preserved() {
        let det = |name: &str, score: f32| Detection {
            template: name.to_string(),
            x: 0,
            y: 0,
            width: 5,
            height: 5,
            score,
            scale: 1.0,
        };
        let out = annotations(&[det("a", 0.9), det("b", 0.8)]);
        assert!(out[0].label.starts_with("a "));
        assert!(out[1].label.starts_with("b "));
    }
}
