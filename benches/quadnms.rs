use criterion::{criterion_group, criterion_main, Criterion};
use quadnms::{aspect_fit32, nms_poly, nms_poly_with, order_quad, Detection, NmsConfig, Point2};
use std::hint::black_box;

/// Deterministic field of slightly rotated text-line boxes with local clusters.
fn make_detections(count: usize, extent: f32) -> Vec<Detection> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let h = ((i as u64 * 2_654_435_761) % 1_000_003) as f32 / 1_000_003.0;
        let cluster = (i / 4) as f32;
        let cx = (cluster * 97.0) % extent;
        let cy = ((cluster * 97.0) / extent).floor() * 41.0 % extent;
        let (w, hgt) = (60.0 + 40.0 * h, 18.0 + 8.0 * h);
        let (s, c) = ((h - 0.5) * 0.4).sin_cos();
        let dx = 3.0 * (i % 4) as f32;
        let pts = [(-w, -hgt), (w, -hgt), (w, hgt), (-w, hgt)].map(|(px, py)| {
            let (px, py) = (px * 0.5, py * 0.5);
            Point2::new(cx + dx + c * px - s * py, cy + s * px + c * py)
        });
        out.push(Detection::new(pts, h));
    }
    out
}

fn bench_nms(c: &mut Criterion) {
    let dense = make_detections(4_000, 2_000.0);
    c.bench_function("nms_poly_exact_grid_4k", |b| {
        b.iter(|| black_box(nms_poly(black_box(&dense), 0.3)));
    });

    let fast = NmsConfig {
        iou_threshold: 0.3,
        use_fast_iou: true,
    };
    c.bench_function("nms_poly_fast_grid_4k", |b| {
        b.iter(|| black_box(nms_poly_with(black_box(&dense), &fast)));
    });

    // Spread far enough that the grid budget is exceeded.
    let sparse: Vec<Detection> = make_detections(1_000, 2_000.0)
        .iter()
        .enumerate()
        .map(|(i, d)| d.translated(i as f32 * 3.0e4, i as f32 * 3.0e4))
        .collect();
    c.bench_function("nms_poly_exact_bruteforce_1k", |b| {
        b.iter(|| black_box(nms_poly(black_box(&sparse), 0.3)));
    });
}

fn bench_geometry(c: &mut Criterion) {
    let dets = make_detections(1_024, 2_000.0);
    c.bench_function("order_quad_1k", |b| {
        b.iter(|| {
            for d in &dets {
                let mut q = d.pts;
                q.swap(0, 2);
                order_quad(&mut q);
                black_box(q);
            }
        });
    });
    c.bench_function("aspect_fit32", |b| {
        b.iter(|| black_box(aspect_fit32(black_box(1920), black_box(1080), 640)));
    });
}

criterion_group!(benches, bench_nms, bench_geometry);
criterion_main!(benches);
