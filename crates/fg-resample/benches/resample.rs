use criterion::{Criterion, black_box, criterion_group, criterion_main};
use fg_core::{BandField, RectilinearGrid};
use fg_resample::{Compositor, GridResampler, ResamplingMode};

fn band(width: usize, height: usize, first: f64, step: f64) -> BandField {
    let mut data = Vec::with_capacity(width * height);
    for i in 0..(width * height) {
        data.push((i % 251) as f32);
    }
    let grid = RectilinearGrid::new(
        first,
        first + step * (width - 1) as f64,
        width,
        first,
        first + step * (height - 1) as f64,
        height,
    )
    .expect("valid grid");
    BandField::single(grid, "bench", data).expect("valid field")
}

fn bench_integer_upsample(c: &mut Criterion) {
    let src = band(2048, 2048, 0.0, 1.0);
    let target = RectilinearGrid::new(0.5, 2046.5, 1024, 0.5, 2046.5, 1024).expect("valid grid");
    let resampler = GridResampler::new(ResamplingMode::WeightedAverage);

    c.bench_function("integer_upsample_2x_weighted_2048", |b| {
        b.iter(|| {
            let out = resampler
                .resample(black_box(&src), black_box(&target))
                .expect("resample");
            black_box(out);
        });
    });
}

fn bench_general(c: &mut Criterion) {
    let src = band(1024, 1024, 0.0, 1.0);
    let target = RectilinearGrid::new(0.0, 1000.0, 700, 0.0, 1000.0, 700).expect("valid grid");

    for mode in [ResamplingMode::NearestNeighbor, ResamplingMode::WeightedAverage] {
        let resampler = GridResampler::new(mode);
        c.bench_function(&format!("general_{mode}_1024_to_700"), |b| {
            b.iter(|| {
                let out = resampler
                    .resample(black_box(&src), black_box(&target))
                    .expect("resample");
                black_box(out);
            });
        });
    }
}

fn bench_composite(c: &mut Criterion) {
    let red = band(1024, 1024, 0.0, 1.0);
    let fine = band(2048, 2048, -0.25, 0.5);
    let compositor = Compositor::default();

    c.bench_function("composite_mixed_resolution_1024", |b| {
        b.iter(|| {
            let out = compositor
                .composite(black_box(&red), black_box(&fine), black_box(&fine), None)
                .expect("composite");
            black_box(out);
        });
    });
}

criterion_group!(
    benches,
    bench_integer_upsample,
    bench_general,
    bench_composite
);
criterion_main!(benches);
