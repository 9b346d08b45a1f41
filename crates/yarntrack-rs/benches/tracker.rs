use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{GrayImage, Luma};
use yarntrack_rs::{Tracker, TrackerConfig};

/// A 512x256 frame with rows of thin strands, offset by `shift` pixels.
fn strands(shift: u32) -> GrayImage {
    GrayImage::from_fn(512, 256, |x, y| {
        let strand = (x + shift) % 32 < 20 && y % 24 < 6;
        if strand && x > 0 && y > 0 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

fn tracker_benchmark(c: &mut Criterion) {
    let mut config = TrackerConfig::default();
    config.with_gray_value(0).with_labeling(false).with_roi(96, 48);

    let seed = strands(0);
    let frames = [strands(1), strands(0)];

    let mut group = c.benchmark_group("tracker");
    group.sample_size(20);
    group.bench_function("seed", |b| {
        b.iter(|| Tracker::new(config.clone(), 0, black_box(&seed)).unwrap())
    });

    let mut index = 0;
    let mut tracker = Tracker::new(config.clone(), 0, &seed).unwrap();
    group.bench_function("track", |b| {
        b.iter(|| {
            index += 1;
            tracker.track(index, black_box(&frames[index % 2])).unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, tracker_benchmark);
criterion_main!(benches);
