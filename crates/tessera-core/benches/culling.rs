//! Benchmarks for per-quad viewport culling.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tessera_core::geometry::{CullingVolume, Size};
use tessera_core::math::Vec3;

fn bench_contains_any(c: &mut Criterion) {
    let mut group = c.benchmark_group("culling_contains_any");
    let volume = CullingVolume::from_viewport(Size::new(1920, 1080));

    for count in [100usize, 1000, 10000] {
        let quads: Vec<[Vec3; 4]> = (0..count)
            .map(|i| {
                // Every other quad sits fully off screen to the left.
                let x = if i % 2 == 0 { (i % 1900) as f32 } else { -500.0 };
                let y = (i % 1000) as f32;
                [
                    Vec3::new(x, y, 0.0),
                    Vec3::new(x + 44.0, y, 0.0),
                    Vec3::new(x, y + 44.0, 0.0),
                    Vec3::new(x + 44.0, y + 44.0, 0.0),
                ]
            })
            .collect();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &quads, |b, quads| {
            b.iter(|| {
                quads
                    .iter()
                    .filter(|quad| volume.contains_any(black_box(**quad)))
                    .count()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_contains_any);
criterion_main!(benches);
