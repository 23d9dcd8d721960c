use criterion::{criterion_group, criterion_main, Criterion};
use sheetmatch::preprocess::clahe::equalize_clahe;
use sheetmatch::{EngineConfig, ImageView, MatchEngine, Preprocess, Template};
use std::hint::black_box;

fn make_image(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            data.push((((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF) as u8);
        }
    }
    data
}

fn extract_patch(
    image: &[u8],
    img_width: usize,
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = (y0 + y) * img_width;
        out.extend_from_slice(&image[row + x0..row + x0 + width]);
    }
    out
}

fn bench_sweep(c: &mut Criterion) {
    let img_width = 512;
    let img_height = 384;
    let image = make_image(img_width, img_height);
    let image_view = ImageView::from_slice(&image, img_width, img_height).unwrap();

    let tpl_data = extract_patch(&image, img_width, 120, 100, 64, 64);
    let template = Template::new("mark", tpl_data, 64, 64).unwrap();

    let single_scale = MatchEngine::new(EngineConfig {
        threshold: 0.75,
        scales: vec![1.0],
        preprocess: Preprocess::Raw,
        ..EngineConfig::default()
    })
    .unwrap();
    c.bench_function("sweep_raw_single_scale", |b| {
        b.iter(|| {
            black_box(
                single_scale
                    .find_matches(image_view, std::slice::from_ref(&template))
                    .unwrap(),
            )
        });
    });

    let ladder = MatchEngine::new(EngineConfig {
        threshold: 0.75,
        scales: vec![1.2, 1.1, 1.0, 0.9, 0.8],
        preprocess: Preprocess::Raw,
        ..EngineConfig::default()
    })
    .unwrap();
    c.bench_function("sweep_raw_scale_ladder", |b| {
        b.iter(|| {
            black_box(
                ladder
                    .find_matches(image_view, std::slice::from_ref(&template))
                    .unwrap(),
            )
        });
    });

    let diagnostic = MatchEngine::new(EngineConfig {
        scales: vec![1.1, 1.0, 0.9],
        preprocess: Preprocess::Raw,
        ..EngineConfig::default()
    })
    .unwrap();
    c.bench_function("find_best_three_scales", |b| {
        b.iter(|| {
            black_box(
                diagnostic
                    .find_best(image_view, std::slice::from_ref(&template))
                    .unwrap(),
            )
        });
    });
}

fn bench_preprocess(c: &mut Criterion) {
    let image = make_image(512, 384);
    let view = ImageView::from_slice(&image, 512, 384).unwrap();

    c.bench_function("clahe_512x384", |b| {
        b.iter(|| black_box(equalize_clahe(view, 8, 2.0).unwrap()));
    });

    let edge = Preprocess::EdgeMap {
        low: 60.0,
        high: 180.0,
    };
    c.bench_function("edge_map_512x384", |b| {
        b.iter(|| black_box(edge.apply(view).unwrap()));
    });
}

criterion_group!(benches, bench_sweep, bench_preprocess);
criterion_main!(benches);
