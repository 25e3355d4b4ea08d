//! 发射器属性测试
//!
//! 使用proptest在随机帧时间序列下检查环形缓冲区与发射计数的不变量

use glam::Vec3;
use particle_demo::particles::{Emitter, EmitterConfig, EmitterResources};
use particle_demo::render::{Camera, RecordingBackend};
use proptest::prelude::*;

fn frame_times() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(0.0001f32..2.0, 1..120)
}

fn emitter(capacity: usize, rate: f32, lifetime: f32) -> (Emitter, RecordingBackend) {
    let mut backend = RecordingBackend::new();
    let config = EmitterConfig {
        max_particles: capacity,
        particles_per_second: rate,
        lifetime,
        start_velocity: Vec3::new(0.0, 1.0, 0.0),
        emitter_acceleration: Vec3::new(0.0, -9.81, 0.0),
        seed: Some(0),
        ..Default::default()
    };
    let emitter = Emitter::new(config, EmitterResources::default(), &mut backend)
        .expect("valid emitter config");
    (emitter, backend)
}

proptest! {
    #[test]
    fn living_count_never_exceeds_capacity(
        capacity in 1usize..64,
        rate in 0.5f32..200.0,
        lifetime in 0.05f32..5.0,
        dts in frame_times(),
    ) {
        let (mut emitter, _) = emitter(capacity, rate, lifetime);
        for dt in dts {
            emitter.update(dt);
            prop_assert!(emitter.living_particle_count() <= capacity);
            prop_assert!(emitter.first_alive_index() < capacity);
            prop_assert!(emitter.first_dead_index() < capacity);
            prop_assert!(emitter.time_since_emit() < emitter.seconds_per_particle());
        }
    }

    #[test]
    fn every_spawn_is_retired_at_most_once(
        capacity in 1usize..64,
        rate in 0.5f32..200.0,
        lifetime in 0.05f32..5.0,
        dts in frame_times(),
    ) {
        let (mut emitter, _) = emitter(capacity, rate, lifetime);
        for dt in dts {
            emitter.update(dt);
            let stats = emitter.stats();
            prop_assert_eq!(
                stats.spawned_total,
                stats.retired_total + emitter.living_particle_count() as u64
            );

            // 存活槽位中没有已经过期的粒子
            for slot in emitter.live_ranges().iter() {
                prop_assert!(emitter.particles()[slot].age < lifetime);
            }
        }
    }

    #[test]
    fn draws_cover_exactly_the_living_slots(
        capacity in 1usize..32,
        rate in 0.5f32..50.0,
        lifetime in 0.05f32..3.0,
        dts in frame_times(),
    ) {
        let (mut emitter, mut backend) = emitter(capacity, rate, lifetime);
        let camera = Camera::new(1.0);
        for dt in dts {
            emitter.update(dt);
            backend.clear_commands();
            emitter.draw(&mut backend, &camera);

            let draws = backend.draw_calls();
            prop_assert!(draws.len() <= 2);

            let mut covered = vec![false; capacity];
            for draw in &draws {
                prop_assert!(draw.index_count > 0);
                prop_assert_eq!(draw.index_count % 6, 0);
                prop_assert_eq!(draw.first_index % 6, 0);
                let first = draw.first_index as usize / 6;
                let count = draw.index_count as usize / 6;
                prop_assert!(first + count <= capacity);
                for slot in first..first + count {
                    prop_assert!(!covered[slot], "slot {} drawn twice", slot);
                    covered[slot] = true;
                }
            }

            let mut live = vec![false; capacity];
            for slot in emitter.live_ranges().iter() {
                live[slot] = true;
            }
            prop_assert_eq!(covered, live);
        }
    }

    #[test]
    fn spawn_count_tracks_rate(
        rate in 1.0f32..100.0,
        dt in 0.001f32..0.1,
        steps in 1usize..200,
    ) {
        let total = dt * steps as f32;
        let expected = (total * rate).floor() as i64;
        // 容量足够、寿命足够长，不会有粒子死亡或被丢弃
        let capacity = expected as usize + 4;
        let (mut emitter, _) = emitter(capacity, rate, 1.0e6);
        for _ in 0..steps {
            emitter.update(dt);
        }
        let spawned = emitter.stats().spawned_total as i64;
        prop_assert!((spawned - expected).abs() <= 1, "spawned {} expected {}", spawned, expected);
        prop_assert_eq!(emitter.stats().dropped_total, 0);
    }
}
