//! Benchmarks for sprite accumulation and draw-call merging.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tessera_core::geometry::Size;
use tessera_render::{
    BatchConfig, DrawCall, DrawCallMerger, SpriteBatch, SpriteTexture, SpriteVertex, TextureId,
};
use tessera_test_utils::MockSpriteDevice;

fn textures(count: u64) -> Vec<SpriteTexture> {
    (0..count)
        .map(|id| SpriteTexture::new(TextureId::new(id), Size::new(44, 44)))
        .collect()
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("sprite_frame");
    let device = Arc::new(MockSpriteDevice::new(Size::new(1920, 1080)));
    let mut batch = SpriteBatch::new(device.clone(), BatchConfig::default());

    // Texture runs of length `run` model tile maps where neighbours share
    // an atlas page.
    for run in [1usize, 8, 64] {
        let atlas = textures(16);
        let sprites = 8000usize;
        group.throughput(Throughput::Elements(sprites as u64));
        group.bench_with_input(BenchmarkId::new("run_length", run), &run, |b, &run| {
            b.iter(|| {
                device.clear_calls();
                batch.begin_draw().unwrap();
                for i in 0..sprites {
                    let x = (i % 43) as f32 * 44.0;
                    let y = (i / 43 % 24) as f32 * 44.0;
                    let texture = &atlas[(i / run) % atlas.len()];
                    let quad = SpriteVertex::quad(x, y, 44.0, 44.0, [0.0, 0.0, 1.0, 1.0], SpriteVertex::WHITE);
                    black_box(batch.draw_sprite(Some(texture), quad).unwrap());
                }
                batch.end_draw(false).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_merger(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw_call_merger");

    for distinct in [1u64, 4, 64] {
        let calls: Vec<DrawCall> = (0..10_000u32)
            .map(|i| DrawCall::new(TextureId::new(u64::from(i) % distinct), i * 6, 2))
            .collect();
        group.throughput(Throughput::Elements(calls.len() as u64));
        group.bench_with_input(BenchmarkId::new("textures", distinct), &calls, |b, calls| {
            let mut merger = DrawCallMerger::with_capacity(calls.len());
            b.iter(|| {
                merger.clear();
                for call in calls {
                    merger.enqueue(*call);
                }
                black_box(merger.total_calls())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_frame, bench_merger);
criterion_main!(benches);
