//! 无头演示循环
//!
//! 固定帧时间驱动相机、发射器和靶场碰撞，绘制命令交给任意 [`RenderBackend`]。

use crate::config::DemoConfig;
use crate::core::error::EngineResult;
use crate::particles::{Emitter, EmitterResources};
use crate::render::backend::RenderBackend;
use crate::render::camera::{Camera, CameraInput};
use crate::scene::{CollisionManager, Entity};
use glam::Vec3;

/// 子弹碰撞盒半径
const PROJECTILE_RADIUS: f32 = 0.1;

/// 单帧结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub living_particles: usize,
    pub hits: usize,
}

/// 整次运行的汇总
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DemoSummary {
    pub frames: u32,
    pub peak_living: usize,
    pub spawned: u64,
    pub retired: u64,
    pub dropped: u64,
    pub hits: usize,
    pub score: u32,
}

pub struct Demo<B: RenderBackend> {
    config: DemoConfig,
    backend: B,
    camera: Camera,
    camera_input: CameraInput,
    emitters: Vec<Emitter>,
    collisions: CollisionManager,
    fire_timer: f32,
    summary: DemoSummary,
}

impl<B: RenderBackend> Demo<B> {
    pub fn new(config: DemoConfig, mut backend: B) -> EngineResult<Self> {
        config.validate()?;

        let camera = Camera::from_config(&config.camera);
        let seed = config.simulation.seed;
        let emitters = config
            .emitters
            .iter()
            .enumerate()
            .map(|(i, settings)| {
                let emitter_seed = seed.map(|s| s.wrapping_add(i as u64));
                Emitter::new(
                    settings.to_config(emitter_seed),
                    EmitterResources::default(),
                    &mut backend,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut collisions = CollisionManager::new();
        for target in &config.scene.targets {
            collisions.add_target(Entity::target(target));
        }

        tracing::info!(
            target: "demo",
            emitters = emitters.len(),
            targets = collisions.targets().len(),
            backend = backend.name(),
            "Demo initialised"
        );

        Ok(Self {
            config,
            backend,
            camera,
            camera_input: CameraInput::default(),
            emitters,
            collisions,
            fire_timer: 0.0,
            summary: DemoSummary::default(),
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    pub fn emitters_mut(&mut self) -> &mut [Emitter] {
        &mut self.emitters
    }

    pub fn collisions(&self) -> &CollisionManager {
        &self.collisions
    }

    /// 替换下一帧的相机输入
    pub fn set_camera_input(&mut self, input: CameraInput) {
        self.camera_input = input;
    }

    pub fn summary(&self) -> DemoSummary {
        self.summary
    }

    /// 推进一帧并提交绘制
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        self.camera.update(dt, &self.camera_input);

        self.fire(dt);
        self.collisions.step(dt);
        let hits = self.resolve_hits();
        self.cull_bullets();

        let mut living = 0;
        for emitter in &mut self.emitters {
            emitter.update(dt);
            emitter.draw(&mut self.backend, &self.camera);
            living += emitter.living_particle_count();
        }

        self.summary.frames += 1;
        self.summary.peak_living = self.summary.peak_living.max(living);
        self.summary.hits += hits;
        self.refresh_emitter_totals();

        FrameReport {
            living_particles: living,
            hits,
        }
    }

    /// 按配置运行全部帧
    pub fn run(&mut self) -> DemoSummary {
        let frames = self.config.simulation.frames;
        let dt = self.config.simulation.frame_time;
        for _ in 0..frames {
            self.frame(dt);
        }

        tracing::info!(
            target: "demo",
            frames = self.summary.frames,
            peak_living = self.summary.peak_living,
            spawned = self.summary.spawned,
            hits = self.summary.hits,
            score = self.summary.score,
            "Demo finished"
        );
        self.summary
    }

    /// 释放所有发射器的缓冲区并交还后端
    pub fn shutdown(mut self) -> B {
        for emitter in self.emitters.drain(..) {
            emitter.release(&mut self.backend);
        }
        tracing::info!(target: "demo", "Demo shut down");
        self.backend
    }

    /// 发射器统计是累计值，直接求和覆盖
    fn refresh_emitter_totals(&mut self) {
        let (spawned, retired, dropped) =
            self.emitters
                .iter()
                .map(|e| e.stats())
                .fold((0, 0, 0), |(s, r, d), stats| {
                    (
                        s + stats.spawned_total,
                        r + stats.retired_total,
                        d + stats.dropped_total,
                    )
                });
        self.summary.spawned = spawned;
        self.summary.retired = retired;
        self.summary.dropped = dropped;
    }

    fn fire(&mut self, dt: f32) {
        let scene = &self.config.scene;
        if scene.fire_interval <= 0.0 {
            return;
        }
        self.fire_timer += dt;
        while self.fire_timer >= scene.fire_interval {
            self.fire_timer -= scene.fire_interval;
            let velocity = self.camera.transform().forward() * scene.projectile_speed;
            self.collisions.add_bullet(Entity::projectile(
                Vec3::from_array(scene.muzzle),
                velocity,
                PROJECTILE_RADIUS,
            ));
        }
    }

    /// 记分并移除命中的子弹
    fn resolve_hits(&mut self) -> usize {
        let hits = self.collisions.update();
        let mut spent: Vec<usize> = hits.iter().map(|hit| hit.bullet).collect();
        for hit in &hits {
            self.summary.score += self.collisions.targets()[hit.target].points();
        }

        spent.sort_unstable();
        spent.dedup();
        for index in spent.into_iter().rev() {
            self.collisions.remove_bullet(index);
        }
        hits.len()
    }

    /// 移除飞出远裁剪面的子弹
    fn cull_bullets(&mut self) {
        let limit = self.config.camera.far_clip;
        let origin = self.camera.position();
        let far: Vec<usize> = self
            .collisions
            .bullets()
            .iter()
            .enumerate()
            .filter(|(_, bullet)| bullet.position().distance(origin) > limit)
            .map(|(i, _)| i)
            .collect();
        for index in far.into_iter().rev() {
            self.collisions.remove_bullet(index);
        }
    }
}
