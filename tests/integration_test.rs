use glam::{Vec3, Vec4};
use particle_demo::config::{DemoConfig, EmitterSettings};
use particle_demo::demo::Demo;
use particle_demo::particles::{Emitter, EmitterConfig, EmitterResources, ParticleVertex};
use particle_demo::render::{
    Camera, CameraInput, DrawIndexed, NullBackend, RecordingBackend, RenderCommand,
};

#[test]
fn test_emitter_lifecycle_against_recording_backend() {
    let mut backend = RecordingBackend::new();
    let config = EmitterConfig {
        max_particles: 5,
        particles_per_second: 1.0,
        lifetime: 3.5,
        seed: Some(11),
        ..Default::default()
    };
    let mut emitter = Emitter::new(config, EmitterResources::default(), &mut backend).unwrap();
    let camera = Camera::new(16.0 / 9.0);

    // 两个静态资源：顶点缓冲区和索引缓冲区
    assert_eq!(backend.buffer_count(), 2);

    for _ in 0..6 {
        emitter.update(1.0);
    }
    emitter.draw(&mut backend, &camera);

    assert_eq!(
        backend.draw_calls(),
        vec![
            DrawIndexed {
                index_count: 6,
                first_index: 0,
                base_vertex: 0
            },
            DrawIndexed {
                index_count: 18,
                first_index: 12,
                base_vertex: 0
            },
        ]
    );

    let uploaded = &backend.buffer(emitter.vertex_buffer()).unwrap().data;
    assert_eq!(uploaded.len(), 5 * 4 * ParticleVertex::STRIDE as usize);
}

#[test]
fn test_particles_die_out_after_deactivation() {
    let mut backend = RecordingBackend::new();
    let config = EmitterConfig {
        max_particles: 64,
        particles_per_second: 30.0,
        lifetime: 0.5,
        seed: Some(2),
        ..Default::default()
    };
    let mut emitter = Emitter::new(config, EmitterResources::default(), &mut backend).unwrap();
    let camera = Camera::new(1.0);

    for _ in 0..30 {
        emitter.update(1.0 / 60.0);
    }
    assert!(emitter.living_particle_count() > 0);

    emitter.set_active(false);
    for _ in 0..60 {
        emitter.update(1.0 / 60.0);
    }
    assert_eq!(emitter.living_particle_count(), 0);

    backend.clear_commands();
    emitter.draw(&mut backend, &camera);
    assert!(backend.draw_calls().is_empty());
}

#[test]
fn test_billboards_follow_camera_yaw() {
    let mut backend = RecordingBackend::new();
    let config = EmitterConfig {
        max_particles: 4,
        particles_per_second: 1.0,
        start_velocity: Vec3::ZERO,
        start_size: 1.0,
        end_size: 1.0,
        seed: Some(5),
        ..Default::default()
    };
    let mut emitter = Emitter::new(config, EmitterResources::default(), &mut backend).unwrap();
    let mut camera = Camera::new(1.0);
    camera.transform_mut().set_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
    camera.update_view_matrix();

    emitter.update(1.0);
    emitter.draw(&mut backend, &camera);

    // 四个角都落在垂直于视线的平面上
    let forward = camera.transform().forward();
    for vertex in &emitter.vertices()[0..4] {
        assert!(vertex.position().dot(forward).abs() < 1e-5);
    }

    let commands = backend.commands();
    assert_eq!(commands[1], RenderCommand::camera_uniforms(&camera));
}

#[test]
fn test_color_fades_to_end_color() {
    let mut backend = NullBackend::new();
    let config = EmitterConfig {
        max_particles: 2,
        particles_per_second: 1.0,
        lifetime: 4.0,
        start_color: Vec4::new(1.0, 1.0, 1.0, 1.0),
        end_color: Vec4::new(1.0, 1.0, 1.0, 0.0),
        seed: Some(9),
        ..Default::default()
    };
    let mut emitter = Emitter::new(config, EmitterResources::default(), &mut backend).unwrap();

    emitter.update(1.0);
    emitter.update(3.0);
    let alpha = emitter.particles()[0].color.w;
    assert!((alpha - 0.25).abs() < 1e-6);
}

#[test]
fn test_demo_from_toml() {
    let config = DemoConfig::from_toml_str(
        r#"
        [simulation]
        frames = 90
        seed = 4

        [[emitters]]
        max_particles = 50
        particles_per_second = 40.0
        lifetime = 1.0

        [[emitters]]
        max_particles = 10
        particles_per_second = 5.0
        lifetime = 0.5
        one_shot = true

        [scene]
        targets = []
        fire_interval = 0.0
        "#,
    )
    .unwrap();

    let mut demo = Demo::new(config, RecordingBackend::new()).unwrap();
    demo.set_camera_input(CameraInput {
        right: true,
        ..Default::default()
    });
    let summary = demo.run();

    assert_eq!(summary.frames, 90);
    assert!(summary.peak_living <= 60);
    assert_eq!(demo.emitters()[1].stats().spawned_total, 7);
    assert!(demo.camera().position().x > 0.0);
    assert_eq!(demo.backend().write_count(), 2 * 90);
}

#[test]
fn test_demo_rejects_invalid_config() {
    let mut config = DemoConfig::default();
    config.emitters = vec![EmitterSettings {
        lifetime: -1.0,
        ..Default::default()
    }];
    assert!(Demo::new(config, NullBackend::new()).is_err());

    let mut config = DemoConfig::default();
    config.simulation.frame_time = f32::NAN;
    assert!(Demo::new(config, NullBackend::new()).is_err());
}
