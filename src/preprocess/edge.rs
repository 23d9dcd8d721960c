//! Binary edge extraction from Sobel gradient magnitude.
//!
//! Magnitude uses the L1 norm `|gx| + |gy|`; hysteresis keeps pixels at or
//! above `high` plus any pixel at or above `low` that is 8-connected to one.
//! The one-pixel border has no defined gradient and stays empty.

use crate::image::{ImageView, OwnedImage};
use crate::util::{SheetMatchError, SheetMatchResult};

const EDGE_ON: u8 = 255;

/// Extracts a 0/255 edge map with hysteresis thresholds.
pub fn edge_map(src: ImageView<'_>, low: f32, high: f32) -> SheetMatchResult<OwnedImage> {
    if !low.is_finite() || !high.is_finite() || low < 0.0 || high < low {
        return Err(SheetMatchError::InvalidInput(
            "edge thresholds must satisfy 0 <= low <= high",
        ));
    }

    let width = src.width();
    let height = src.height();
    if width < 3 || height < 3 {
        // No interior pixels to differentiate.
        return OwnedImage::new(vec![0u8; width * height], width, height);
    }

    // 0 = none, 1 = weak (>= low), 2 = strong (>= high)
    let mut state = vec![0u8; width * height];
    let mut strong = Vec::new();
    for y in 1..height - 1 {
        let above = src.row(y - 1).expect("row within image bounds");
        let center = src.row(y).expect("row within image bounds");
        let below = src.row(y + 1).expect("row within image bounds");
        for x in 1..width - 1 {
            let gx = (above[x + 1] as i32 + 2 * center[x + 1] as i32 + below[x + 1] as i32)
                - (above[x - 1] as i32 + 2 * center[x - 1] as i32 + below[x - 1] as i32);
            let gy = (below[x - 1] as i32 + 2 * below[x] as i32 + below[x + 1] as i32)
                - (above[x - 1] as i32 + 2 * above[x] as i32 + above[x + 1] as i32);
            let magnitude = (gx.abs() + gy.abs()) as f32;
            let idx = y * width + x;
            if magnitude >= high {
                state[idx] = 2;
                strong.push(idx);
            } else if magnitude >= low {
                state[idx] = 1;
            }
        }
    }

    // Promote weak pixels connected to strong ones.
    while let Some(idx) = strong.pop() {
        let x = idx % width;
        let y = idx / width;
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let nidx = ny as usize * width + nx as usize;
                if state[nidx] == 1 {
                    state[nidx] = 2;
                    strong.push(nidx);
                }
            }
        }
    }

    let data = state
        .into_iter()
        .map(|s| if s == 2 { EDGE_ON } else { 0 })
        .collect();
    OwnedImage::new(data, width, height)
}
