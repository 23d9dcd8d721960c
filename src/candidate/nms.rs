//! IoU-based non-maximum suppression for pooled detections.

use crate::candidate::{sort_detections_desc, Detection};

/// Which detections an accepted box is allowed to suppress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Suppression {
    /// Overlapping boxes suppress each other regardless of template. The
    /// right default when several templates can fire on the same region.
    #[default]
    Global,
    /// Boxes only suppress detections of the same template; legitimate
    /// overlaps between different reference marks survive.
    PerTemplate,
}

/// Intersection-over-union of two detection boxes.
pub fn iou(a: &Detection, b: &Detection) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);
    if x2 <= x1 || y2 <= y1 {
        return 0.0;
    }
    let inter = ((x2 - x1) * (y2 - y1)) as f32;
    inter / (a.area() as f32 + b.area() as f32 - inter)
}

/// Greedy non-maximum suppression.
///
/// Detections are sorted by descending score; each accepted box discards the
/// remaining candidates whose IoU with it exceeds `nms_iou` (subject to the
/// suppression scope). The output stays ordered by descending score and
/// contains no pair with IoU above the threshold.
pub fn suppress_overlaps(
    mut detections: Vec<Detection>,
    nms_iou: f32,
    scope: Suppression,
) -> Vec<Detection> {
    sort_detections_desc(&mut detections);
    let mut kept: Vec<Detection> = Vec::new();

    'outer: for det in detections {
        for winner in &kept {
            if scope == Suppression::PerTemplate && winner.template != det.template {
                continue;
            }
            if iou(winner, &det) > nms_iou {
                continue 'outer;
            }
        }
        kept.push(det);
    }

    kept
}
