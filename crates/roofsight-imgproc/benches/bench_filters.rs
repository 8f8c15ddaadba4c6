use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use roofsight_image::{Image, PixelBuffer};
use roofsight_imgproc::{
    edges::{canny, CannyParams},
    filter::{box_blur, unsharp_mask},
    quality::assess_quality,
    segmentation::{kmeans_segment, KMeansParams},
};

fn random_buffer(width: usize, height: usize) -> PixelBuffer {
    let mut rng = StdRng::seed_from_u64(0);
    let data = (0..width * height * 4).map(|_| rng.random_range(0..=255)).collect();
    PixelBuffer::new([width, height].into(), data).unwrap()
}

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("Filters");

    for (width, height) in [(256, 224), (512, 448), (800, 600)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);
        let image = random_buffer(*width, *height);

        for radius in [1, 2] {
            group.bench_with_input(
                BenchmarkId::new(format!("box_blur_r{radius}"), &parameter_string),
                &image,
                |b, i| {
                    let mut img = i.clone();
                    b.iter(|| black_box(box_blur(&mut img, radius)))
                },
            );
        }

        group.bench_with_input(
            BenchmarkId::new("unsharp_mask", &parameter_string),
            &image,
            |b, i| {
                let mut img = i.clone();
                b.iter(|| black_box(unsharp_mask(&mut img, 2, 0.8)))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("canny", &parameter_string),
            &image,
            |b, i| {
                let mut edges = Image::<u8, 1>::from_size_val(i.size(), 0).unwrap();
                let params = CannyParams {
                    low: 25.0,
                    high: 90.0,
                };
                b.iter(|| black_box(canny(i, &mut edges, &params)))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("assess_quality", &parameter_string),
            &image,
            |b, i| b.iter(|| black_box(assess_quality(i))),
        );
    }

    group.finish();

    let mut group = c.benchmark_group("Segmentation");
    group.sample_size(10);
    let image = random_buffer(256, 224);
    let params = KMeansParams {
        seed: Some(0),
        ..Default::default()
    };
    group.bench_function("kmeans_256x224", |b| {
        b.iter(|| black_box(kmeans_segment(&image, &params)))
    });
    group.finish();
}

criterion_group!(benches, bench_filters);
criterion_main!(benches);
