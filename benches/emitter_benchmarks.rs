//! 粒子发射器性能基准测试
//!
//! 测试不同容量下的更新、顶点生成与绘制提交

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use particle_demo::particles::{Emitter, EmitterConfig, EmitterResources, ParticleRing};
use particle_demo::render::{Camera, NullBackend};
use std::hint::black_box;

const FRAME: f32 = 1.0 / 60.0;

/// 预热到稳定状态：发射速率使容量恰好被填满
fn warmed_emitter(capacity: usize, backend: &mut NullBackend) -> Emitter {
    let lifetime = 2.0;
    let config = EmitterConfig {
        max_particles: capacity,
        particles_per_second: capacity as f32 / lifetime,
        lifetime,
        velocity_random_range: Vec3::splat(0.5),
        position_random_range: Vec3::splat(0.2),
        emitter_acceleration: Vec3::new(0.0, -9.81, 0.0),
        seed: Some(42),
        ..Default::default()
    };
    let mut emitter = Emitter::new(config, EmitterResources::default(), backend)
        .expect("benchmark config is valid");
    for _ in 0..180 {
        emitter.update(FRAME);
    }
    emitter
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("emitter_update");

    for capacity in [1_000, 10_000, 100_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            capacity,
            |b, &capacity| {
                let mut backend = NullBackend::new();
                let mut emitter = warmed_emitter(capacity, &mut backend);
                b.iter(|| {
                    emitter.update(black_box(FRAME));
                    black_box(emitter.living_particle_count())
                });
            },
        );
    }

    group.finish();
}

fn bench_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("emitter_draw");
    let camera = Camera::new(16.0 / 9.0);

    for capacity in [1_000, 10_000, 100_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            capacity,
            |b, &capacity| {
                let mut backend = NullBackend::new();
                let mut emitter = warmed_emitter(capacity, &mut backend);
                b.iter(|| {
                    emitter.draw(&mut backend, black_box(&camera));
                });
            },
        );
    }

    group.finish();
}

fn bench_ring_churn(c: &mut Criterion) {
    c.bench_function("ring_push_pop_1024", |b| {
        let mut ring = ParticleRing::new(1024);
        b.iter(|| {
            for _ in 0..512 {
                black_box(ring.push());
            }
            for _ in 0..512 {
                black_box(ring.pop_front());
            }
        });
    });
}

criterion_group!(benches, bench_update, bench_draw, bench_ring_churn);
criterion_main!(benches);
