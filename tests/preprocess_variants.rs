use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sheetmatch::preprocess::{clahe::equalize_clahe, edge::edge_map};
use sheetmatch::{EngineConfig, ImageView, MatchEngine, Preprocess, Template};

fn noise(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height).map(|_| rng.random::<u8>()).collect()
}

fn cut(image: &[u8], img_width: usize, x0: usize, y0: usize, width: usize, height: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = (y0 + y) * img_width;
        out.extend_from_slice(&image[row + x0..row + x0 + width]);
    }
    out
}

/// White sheet with two black rectangles, a thick frame line, and mild
/// vignetting so the equalization paths have something to chew on.
fn synthetic_sheet(width: usize, height: usize) -> Vec<u8> {
    let mut data = vec![230u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut value = 230u8;
            // Vignette: darker toward the right edge.
            value = value.saturating_sub((x * 40 / width) as u8);
            if (40..70).contains(&x) && (40..70).contains(&y) {
                value = 25;
            }
            if (100..150).contains(&x) && (60..80).contains(&y) {
                value = 25;
            }
            if y == 20 || y == height - 20 {
                value = 60;
            }
            data[y * width + x] = value;
        }
    }
    data
}

#[test]
fn clahe_mode_finds_the_cut_patch() {
    let width = 200;
    let height = 160;
    let sheet = synthetic_sheet(width, height);
    let tpl_data = cut(&sheet, width, 30, 30, 50, 50);

    let config = EngineConfig {
        threshold: 0.5,
        scales: vec![1.0],
        preprocess: Preprocess::Clahe {
            tile_size: 8,
            clip_limit: 2.0,
        },
        ..EngineConfig::default()
    };
    let engine = MatchEngine::new(config).unwrap();
    let template = Template::new("patch", tpl_data, 50, 50).unwrap();
    let target = ImageView::from_slice(&sheet, width, height).unwrap();

    let report = engine.find_best(target, &[template]).unwrap();
    let best = report.best.unwrap();
    assert!(
        best.x.abs_diff(30) <= 2 && best.y.abs_diff(30) <= 2,
        "best at ({}, {})",
        best.x,
        best.y
    );
}

#[test]
fn edge_mode_finds_the_cut_patch() {
    let width = 200;
    let height = 160;
    let sheet = synthetic_sheet(width, height);
    let tpl_data = cut(&sheet, width, 85, 45, 80, 50);

    let config = EngineConfig {
        threshold: 0.3,
        scales: vec![1.0],
        preprocess: Preprocess::EdgeMap {
            low: 60.0,
            high: 180.0,
        },
        ..EngineConfig::default()
    };
    let engine = MatchEngine::new(config).unwrap();
    let template = Template::new("patch", tpl_data, 80, 50).unwrap();
    let target = ImageView::from_slice(&sheet, width, height).unwrap();

    let report = engine.find_best(target, &[template]).unwrap();
    let best = report.best.unwrap();
    assert!(
        best.x.abs_diff(85) <= 3 && best.y.abs_diff(45) <= 3,
        "best at ({}, {})",
        best.x,
        best.y
    );
}

#[test]
fn each_mode_preserves_target_dimensions() {
    let data = noise(90, 70, 31);
    let view = ImageView::from_slice(&data, 90, 70).unwrap();
    for mode in [
        Preprocess::Raw,
        Preprocess::Clahe {
            tile_size: 8,
            clip_limit: 2.0,
        },
        Preprocess::EdgeMap {
            low: 60.0,
            high: 180.0,
        },
    ] {
        let out = mode.apply(view).unwrap();
        assert_eq!((out.width(), out.height()), (90, 70));
    }
}

#[test]
fn raw_mode_is_the_identity() {
    let data = noise(40, 30, 8);
    let view = ImageView::from_slice(&data, 40, 30).unwrap();
    let out = Preprocess::Raw.apply(view).unwrap();
    assert_eq!(out.data(), data.as_slice());
}

#[test]
fn clahe_spreads_a_compressed_histogram() {
    let width = 96;
    let height = 96;
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            data.push((110 + (x * 3 + y * 5) % 16) as u8);
        }
    }
    let view = ImageView::from_slice(&data, width, height).unwrap();
    let out = equalize_clahe(view, 16, 3.0).unwrap();

    let before = data.iter().copied().max().unwrap() - data.iter().copied().min().unwrap();
    let after = out.data().iter().copied().max().unwrap() - out.data().iter().copied().min().unwrap();
    assert!(after > before * 3, "range only grew from {before} to {after}");
}

#[test]
fn edge_map_is_binary_and_quiet_on_flat_input() {
    let flat = vec![140u8; 60 * 60];
    let view = ImageView::from_slice(&flat, 60, 60).unwrap();
    let out = edge_map(view, 60.0, 180.0).unwrap();
    assert!(out.data().iter().all(|&v| v == 0));

    let sheet = synthetic_sheet(120, 100);
    let view = ImageView::from_slice(&sheet, 120, 100).unwrap();
    let out = edge_map(view, 60.0, 180.0).unwrap();
    assert!(out.data().iter().all(|&v| v == 0 || v == 255));
    assert!(out.data().iter().any(|&v| v == 255));
}
