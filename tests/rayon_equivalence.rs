//! The parallel sweep must produce byte-identical reports.

#![cfg(feature = "rayon")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sheetmatch::{EngineConfig, ImageView, MatchEngine, Preprocess, Template};

fn noise(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height).map(|_| rng.random::<u8>()).collect()
}

#[test]
fn parallel_sweep_matches_serial_sweep() {
    let width = 180;
    let height = 140;
    let image = noise(width, height, 53);
    let mut tpl_data = Vec::new();
    for y in 30..58 {
        tpl_data.extend_from_slice(&image[y * width + 50..y * width + 86]);
    }

    let config = EngineConfig {
        threshold: 0.25,
        scales: vec![1.2, 1.0, 0.9, 0.8],
        preprocess: Preprocess::Raw,
        ..EngineConfig::default()
    };
    let serial = MatchEngine::new(EngineConfig {
        parallel: false,
        ..config.clone()
    })
    .unwrap();
    let parallel = MatchEngine::new(EngineConfig {
        parallel: true,
        ..config
    })
    .unwrap();

    let templates = [
        Template::new("a", tpl_data.clone(), 36, 28).unwrap(),
        Template::new("b", tpl_data.into_iter().rev().collect(), 36, 28).unwrap(),
    ];
    let target = ImageView::from_slice(&image, width, height).unwrap();

    let serial_report = serial.find_matches(target, &templates).unwrap();
    let parallel_report = parallel.find_matches(target, &templates).unwrap();
    assert_eq!(serial_report.detections, parallel_report.detections);
    assert_eq!(serial_report.best_seen, parallel_report.best_seen);

    let serial_best = serial.find_best(target, &templates).unwrap();
    let parallel_best = parallel.find_best(target, &templates).unwrap();
    assert_eq!(serial_best.best, parallel_best.best);
    for (a, b) in serial_best
        .per_template
        .iter()
        .zip(&parallel_best.per_template)
    {
        assert_eq!(a.template, b.template);
        assert_eq!(a.best, b.best);
    }
}
