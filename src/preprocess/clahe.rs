//! Contrast-limited adaptive histogram equalization.
//!
//! The image is divided into square tiles; each tile gets its own clipped
//! histogram and remap table, and every pixel interpolates bilinearly between
//! the tables of the four nearest tile centers (Zuiderveld, Graphics Gems IV).

use crate::image::{ImageView, OwnedImage};
use crate::util::{SheetMatchError, SheetMatchResult};

/// Equalizes local contrast with the given tile size and clip limit.
///
/// `clip_limit` is a multiplier on the uniform bin count `pixels / 256`; bins
/// above the limit are clipped and the excess is redistributed evenly.
pub fn equalize_clahe(
    image: ImageView<'_>,
    tile_size: usize,
    clip_limit: f32,
) -> SheetMatchResult<OwnedImage> {
    if tile_size == 0 {
        return Err(SheetMatchError::InvalidInput(
            "clahe tile size must be at least 1",
        ));
    }
    let width = image.width();
    let height = image.height();
    let cols = width.div_ceil(tile_size);
    let rows = height.div_ceil(tile_size);

    let mut tile_luts = vec![[0u8; 256]; cols * rows];
    for ty in 0..rows {
        for tx in 0..cols {
            let x0 = tx * tile_size;
            let y0 = ty * tile_size;
            let x1 = (x0 + tile_size).min(width);
            let y1 = (y0 + tile_size).min(height);

            let mut hist = [0u32; 256];
            for y in y0..y1 {
                let row = image.row(y).expect("row within image bounds");
                for &value in &row[x0..x1] {
                    hist[value as usize] += 1;
                }
            }

            let tile_pixels = (x1 - x0) * (y1 - y0);
            if clip_limit > 0.0 {
                clip_histogram(&mut hist, tile_pixels, clip_limit);
            }
            tile_luts[ty * cols + tx] = build_lut(&hist, tile_pixels);
        }
    }

    let tile_center = |t: usize| (t as f32 + 0.5) * tile_size as f32;
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        let fy = (y as f32 / tile_size as f32) - 0.5;
        let ty0 = (fy.floor() as isize).max(0) as usize;
        let ty1 = (ty0 + 1).min(rows - 1);
        let ay = if ty0 == ty1 {
            0.0
        } else {
            ((y as f32 - tile_center(ty0)) / (tile_center(ty1) - tile_center(ty0))).clamp(0.0, 1.0)
        };

        let row = image.row(y).expect("row within image bounds");
        for (x, &value) in row.iter().enumerate() {
            let fx = (x as f32 / tile_size as f32) - 0.5;
            let tx0 = (fx.floor() as isize).max(0) as usize;
            let tx1 = (tx0 + 1).min(cols - 1);
            let ax = if tx0 == tx1 {
                0.0
            } else {
                ((x as f32 - tile_center(tx0)) / (tile_center(tx1) - tile_center(tx0)))
                    .clamp(0.0, 1.0)
            };

            let v = value as usize;
            let v00 = tile_luts[ty0 * cols + tx0][v] as f32;
            let v10 = tile_luts[ty0 * cols + tx1][v] as f32;
            let v01 = tile_luts[ty1 * cols + tx0][v] as f32;
            let v11 = tile_luts[ty1 * cols + tx1][v] as f32;

            let value = v00 * (1.0 - ax) * (1.0 - ay)
                + v10 * ax * (1.0 - ay)
                + v01 * (1.0 - ax) * ay
                + v11 * ax * ay;
            data.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }

    OwnedImage::new(data, width, height)
}

/// Builds a remap table from a histogram over `total` pixels.
fn build_lut(hist: &[u32; 256], total: usize) -> [u8; 256] {
    let mut cdf = [0u32; 256];
    cdf[0] = hist[0];
    for i in 1..256 {
        cdf[i] = cdf[i - 1] + hist[i];
    }
    let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);

    let mut lut = [0u8; 256];
    let denom = total as f32 - cdf_min as f32;
    if denom <= 0.0 {
        // Flat tile: every pixel shares one bin.
        return lut;
    }
    for i in 0..256 {
        let value = (cdf[i] as f32 - cdf_min as f32) / denom * 255.0;
        lut[i] = value.round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Clips histogram bins at `clip_limit * total / 256` and redistributes the
/// excess evenly.
fn clip_histogram(hist: &mut [u32; 256], total_pixels: usize, clip_limit: f32) {
    let clip_value = ((total_pixels as f32 / 256.0) * clip_limit).ceil() as u32;

    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > clip_value {
            excess += *bin - clip_value;
            *bin = clip_value;
        }
    }

    let per_bin = excess / 256;
    let remainder = (excess % 256) as usize;
    for (i, bin) in hist.iter_mut().enumerate() {
        *bin += per_bin;
        if i < remainder {
            *bin += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::equalize_clahe;
    use crate::image::ImageView;

    #[test]
    fn preserves_dimensions() {
        let data = vec![128u8; 100 * 75];
        let view = ImageView::from_slice(&data, 100, 75).unwrap();
        let out = equalize_clahe(view, 16, 3.0).unwrap();
        assert_eq!(out.width(), 100);
        assert_eq!(out.height(), 75);
    }

    #[test]
    fn expands_low_contrast_range() {
        let width = 64;
        let height = 64;
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push((100 + (x + y) % 12) as u8);
            }
        }
        let view = ImageView::from_slice(&data, width, height).unwrap();
        let out = equalize_clahe(view, 16, 4.0).unwrap();
        let lo = out.data().iter().copied().min().unwrap();
        let hi = out.data().iter().copied().max().unwrap();
        assert!(hi - lo > 80, "range {lo}..{hi} not expanded");
    }

    #[test]
    fn constant_image_stays_uniform() {
        let data = vec![42u8; 32 * 32];
        let view = ImageView::from_slice(&data, 32, 32).unwrap();
        let out = equalize_clahe(view, 8, 2.0).unwrap();
        let first = out.data()[0];
        assert!(out.data().iter().all(|&v| v == first));
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        let data = vec![0u8; 16];
        let view = ImageView::from_slice(&data, 4, 4).unwrap();
        assert!(equalize_clahe(view, 0, 2.0).is_err());
    }
}
