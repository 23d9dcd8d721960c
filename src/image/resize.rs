//! Area-averaging resize used by the scale sweep.
//!
//! Every destination pixel integrates the source rectangle it covers, with
//! fractional weights at the rectangle edges. For downscales this is the
//! moiré-free box filter; for mild upscales it degrades gracefully toward
//! pixel replication, which is adequate for the zoom ranges the sweep uses.

use crate::image::{ImageView, OwnedImage};
use crate::util::SheetMatchResult;

/// Resizes a grayscale view to `dst_width` x `dst_height`.
pub fn resize_area(
    src: ImageView<'_>,
    dst_width: usize,
    dst_height: usize,
) -> SheetMatchResult<OwnedImage> {
    let src_width = src.width();
    let src_height = src.height();
    if dst_width == src_width && dst_height == src_height {
        return OwnedImage::from_view(src);
    }

    let x_ratio = src_width as f64 / dst_width as f64;
    let y_ratio = src_height as f64 / dst_height as f64;
    let mut data = Vec::with_capacity(dst_width.saturating_mul(dst_height));

    for dy in 0..dst_height {
        let sy0 = dy as f64 * y_ratio;
        let sy1 = (sy0 + y_ratio).min(src_height as f64);
        let iy0 = sy0.floor() as usize;
        let iy1 = (sy1.ceil() as usize).min(src_height);

        for dx in 0..dst_width {
            let sx0 = dx as f64 * x_ratio;
            let sx1 = (sx0 + x_ratio).min(src_width as f64);
            let ix0 = sx0.floor() as usize;
            let ix1 = (sx1.ceil() as usize).min(src_width);

            let mut sum = 0.0f64;
            let mut area = 0.0f64;
            for iy in iy0..iy1 {
                let wy = overlap(iy, sy0, sy1);
                if wy <= 0.0 {
                    continue;
                }
                let row = src.row(iy).expect("row within source bounds");
                for (ix, &value) in row.iter().enumerate().take(ix1).skip(ix0) {
                    let wx = overlap(ix, sx0, sx1);
                    if wx <= 0.0 {
                        continue;
                    }
                    let weight = wx * wy;
                    sum += weight * value as f64;
                    area += weight;
                }
            }

            let value = if area > 0.0 { sum / area } else { 0.0 };
            data.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }

    OwnedImage::new(data, dst_width, dst_height)
}

/// Overlap length of unit cell `[i, i + 1)` with the interval `[a, b)`.
fn overlap(i: usize, a: f64, b: f64) -> f64 {
    let lo = (i as f64).max(a);
    let hi = ((i + 1) as f64).min(b);
    (hi - lo).max(0.0)
}
