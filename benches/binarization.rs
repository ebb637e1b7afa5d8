use barscan::{Binarizer, GlobalHistogramBinarizer, HybridBinarizer, LuminanceMap};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

/// Diagonal gradient with a checkerboard on top, so both binarizers find a threshold
fn textured(width: usize, height: usize) -> LuminanceMap {
    let data = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                let base = ((x + y) * 128 / (width + height)) as u8;
                if (x / 8 + y / 8) % 2 == 0 { base } else { base.saturating_add(120) }
            })
        })
        .collect();
    LuminanceMap::new(width, height, data).unwrap()
}

fn bench_hybrid_medium(c: &mut Criterion) {
    let luminance = textured(640, 480);
    c.bench_function("hybrid_binarize_640x480", |b| {
        b.iter(|| HybridBinarizer.binarize(black_box(&luminance)))
    });
}

fn bench_hybrid_large(c: &mut Criterion) {
    let luminance = textured(1920, 1080);
    c.bench_function("hybrid_binarize_1920x1080", |b| {
        b.iter(|| HybridBinarizer.binarize(black_box(&luminance)))
    });
}

fn bench_global_histogram_medium(c: &mut Criterion) {
    let luminance = textured(640, 480);
    c.bench_function("global_histogram_binarize_640x480", |b| {
        b.iter(|| GlobalHistogramBinarizer.binarize(black_box(&luminance)))
    });
}

fn bench_global_histogram_large(c: &mut Criterion) {
    let luminance = textured(1920, 1080);
    c.bench_function("global_histogram_binarize_1920x1080", |b| {
        b.iter(|| GlobalHistogramBinarizer.binarize(black_box(&luminance)))
    });
}

criterion_group!(
    benches,
    bench_hybrid_medium,
    bench_hybrid_large,
    bench_global_histogram_medium,
    bench_global_histogram_large
);
criterion_main!(benches);
