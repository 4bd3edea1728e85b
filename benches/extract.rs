use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use imrank::feature::ImageFeatures;
use imrank::texture::{CoOccurrence, grayscale};
use imrank::{Extractor, RasterImage, histogram};
use rand::prelude::*;

fn random_image(id: &str, width: u32, height: u32) -> RasterImage {
    let mut rng = rand::rng();
    RasterImage::from_fn(id, width, height, |_, _| rng.random::<[u8; 3]>())
}

fn benchmark_features(c: &mut Criterion) {
    let img = random_image("bench.png", 256, 256);
    let gray = grayscale(&img);

    let mut group = c.benchmark_group("特征提取");
    group.throughput(Throughput::Elements(img.area()));
    group.bench_function("颜色码与亮度直方图", |b| b.iter(|| histogram::encode(black_box(&img))));
    group.bench_function("灰度共生矩阵", |b| b.iter(|| CoOccurrence::from_gray(black_box(&gray))));
    group.bench_function("单张图片", |b| b.iter(|| ImageFeatures::extract(black_box(&img))));
    group.finish();
}

fn benchmark_corpus(c: &mut Criterion) {
    let images = (0..64).map(|i| random_image(&format!("{i}.png"), 128, 96)).collect::<Vec<_>>();

    let mut group = c.benchmark_group("图库");
    group.throughput(Throughput::Elements(images.len() as u64));
    group.sample_size(20);
    group.bench_function("并行提取", |b| b.iter(|| Extractor::new().extract(black_box(&images))));
    group.finish();
}

criterion_group!(benches, benchmark_features, benchmark_corpus);
criterion_main!(benches);
