use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sheetmatch::{iou, suppress_overlaps, Detection, Suppression};

fn det(template: &str, x: usize, y: usize, width: usize, height: usize, score: f32) -> Detection {
    Detection {
        template: template.to_string(),
        x,
        y,
        width,
        height,
        score,
        scale: 1.0,
    }
}

#[test]
fn near_duplicates_at_iou_point_six_collapse_to_one() {
    // 40x40 boxes shifted by 10 rows: intersection 1200, union 2000.
    let a = det("mark", 50, 50, 40, 40, 0.96);
    let b = det("mark", 50, 60, 40, 40, 0.91);
    assert!((iou(&a, &b) - 0.6).abs() < 1e-6);

    let survivors = suppress_overlaps(vec![b, a.clone()], 0.3, Suppression::Global);
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0], a);
}

#[test]
fn chains_suppress_against_accepted_boxes_only() {
    // b overlaps a heavily; c overlaps b but not a. Greedy keeps a and c.
    let a = det("mark", 0, 0, 40, 40, 0.9);
    let b = det("mark", 0, 10, 40, 40, 0.8);
    let c = det("mark", 0, 44, 40, 40, 0.7);
    assert!(iou(&a, &b) > 0.5);
    assert!(iou(&b, &c) > 0.0);
    assert_eq!(iou(&a, &c), 0.0);

    let survivors = suppress_overlaps(vec![a, b, c], 0.5, Suppression::Global);
    assert_eq!(survivors.len(), 2);
    assert_eq!(survivors[0].y, 0);
    assert_eq!(survivors[1].y, 44);
}

#[test]
fn postcondition_holds_for_random_pools() {
    let mut rng = StdRng::seed_from_u64(77);
    for round in 0..20 {
        let pool: Vec<Detection> = (0..60)
            .map(|i| {
                det(
                    if i % 2 == 0 { "a" } else { "b" },
                    rng.random_range(0..200),
                    rng.random_range(0..200),
                    rng.random_range(10..50),
                    rng.random_range(10..50),
                    rng.random_range(0.0..1.0),
                )
            })
            .collect();
        let nms_iou = 0.4;
        let survivors = suppress_overlaps(pool, nms_iou, Suppression::Global);

        for (i, a) in survivors.iter().enumerate() {
            for b in &survivors[i + 1..] {
                assert!(
                    iou(a, b) <= nms_iou,
                    "round {round}: overlap {} above {nms_iou}",
                    iou(a, b)
                );
            }
        }
        for pair in survivors.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}

#[test]
fn per_template_scope_never_crosses_templates() {
    let mut rng = StdRng::seed_from_u64(99);
    let pool: Vec<Detection> = (0..40)
        .map(|i| {
            det(
                if i % 2 == 0 { "serie" } else { "escudo" },
                rng.random_range(0..100),
                rng.random_range(0..100),
                30,
                30,
                rng.random_range(0.0..1.0),
            )
        })
        .collect();
    let survivors = suppress_overlaps(pool, 0.4, Suppression::PerTemplate);

    for (i, a) in survivors.iter().enumerate() {
        for b in &survivors[i + 1..] {
            if a.template == b.template {
                assert!(iou(a, b) <= 0.4);
            }
        }
    }
}

#[test]
fn empty_pool_survives_untouched() {
    assert!(suppress_overlaps(Vec::new(), 0.4, Suppression::Global).is_empty());
}
