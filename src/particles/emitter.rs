//! CPU 粒子发射器
//!
//! 固定容量的粒子槽位 + 环形存活区间。每帧 `update` 推进粒子并按发射速率生成新粒子，
//! `draw` 在 CPU 上生成面向相机的四边形顶点，整体上传后只绘制存活区间。

use super::particle::{Particle, ParticleVertex};
use super::ring::{LiveRanges, ParticleRing};
use super::sprite_sheet::{SpriteSheet, DEFAULT_UVS};
use crate::core::error::{EmitterError, EmitterResult};
use crate::render::backend::{
    BufferDescriptor, BufferHandle, BufferUsage, DrawIndexed, IndexFormat, RenderBackend,
    RenderCommand, ShaderHandle, TextureHandle,
};
use crate::render::camera::Camera;
use bytemuck::Zeroable;
use glam::{Vec2, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 每个粒子的顶点数和索引数
pub const VERTICES_PER_PARTICLE: usize = 4;
pub const INDICES_PER_PARTICLE: usize = 6;

// ============================================================================
// 配置
// ============================================================================

/// 发射器配置（构造后不可修改）
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    /// 最大粒子数
    pub max_particles: usize,
    /// 每秒发射数量
    pub particles_per_second: f32,
    /// 粒子寿命（秒）
    pub lifetime: f32,
    pub start_size: f32,
    pub end_size: f32,
    pub start_color: Vec4,
    pub end_color: Vec4,
    pub start_velocity: Vec3,
    /// 每个轴上速度的随机扰动幅度
    pub velocity_random_range: Vec3,
    pub emitter_position: Vec3,
    /// 每个轴上生成位置的随机扰动幅度
    pub position_random_range: Vec3,
    /// (起始最小, 起始最大, 结束最小, 结束最大)，弧度
    pub rotation_random_range: Vec4,
    /// 所有粒子共享的恒定加速度
    pub emitter_acceleration: Vec3,
    /// 精灵表网格（列, 行），`None` 表示整张纹理
    pub sprite_sheet: Option<(u32, u32)>,
    /// 单次模式：每轮最多发射 `max_particles` 个，之后需 `reset`
    pub one_shot: bool,
    /// 创建时是否激活
    pub active: bool,
    /// 随机种子，`None` 使用系统熵
    pub seed: Option<u64>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_particles: 1000,
            particles_per_second: 100.0,
            lifetime: 2.0,
            start_size: 0.5,
            end_size: 0.1,
            start_color: Vec4::ONE,
            end_color: Vec4::new(1.0, 1.0, 1.0, 0.0),
            start_velocity: Vec3::new(0.0, 1.0, 0.0),
            velocity_random_range: Vec3::ZERO,
            emitter_position: Vec3::ZERO,
            position_random_range: Vec3::ZERO,
            rotation_random_range: Vec4::ZERO,
            emitter_acceleration: Vec3::ZERO,
            sprite_sheet: None,
            one_shot: false,
            active: true,
            seed: None,
        }
    }
}

impl EmitterConfig {
    /// 检查会导致除零或死循环的参数
    pub fn validate(&self) -> EmitterResult<()> {
        if self.max_particles == 0 {
            return Err(EmitterError::Configuration(
                "max_particles must be at least 1".to_string(),
            ));
        }
        if self.max_particles > u32::MAX as usize / INDICES_PER_PARTICLE {
            return Err(EmitterError::Configuration(format!(
                "max_particles {} exceeds 32-bit index range",
                self.max_particles
            )));
        }
        if !self.particles_per_second.is_finite() || self.particles_per_second <= 0.0 {
            return Err(EmitterError::Configuration(format!(
                "particles_per_second must be positive, got {}",
                self.particles_per_second
            )));
        }
        if !self.lifetime.is_finite() || self.lifetime <= 0.0 {
            return Err(EmitterError::Configuration(format!(
                "lifetime must be positive, got {}",
                self.lifetime
            )));
        }
        if !self.start_size.is_finite() || !self.end_size.is_finite() {
            return Err(EmitterError::Configuration(
                "particle sizes must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// 绘制所需的外部资源（纹理和着色器由宿主加载/编译）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitterResources {
    pub texture: TextureHandle,
    pub vertex_shader: ShaderHandle,
    pub pixel_shader: ShaderHandle,
}

/// 发射器统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmitterStats {
    /// 当前存活粒子数
    pub living: usize,
    /// 总发射数
    pub spawned_total: u64,
    /// 总死亡数
    pub retired_total: u64,
    /// 因缓冲区已满被丢弃的发射请求
    pub dropped_total: u64,
}

// ============================================================================
// 发射器
// ============================================================================

pub struct Emitter {
    config: EmitterConfig,
    resources: EmitterResources,
    seconds_per_particle: f32,
    time_since_emit: f32,
    sprite_sheet: Option<SpriteSheet>,

    particles: Box<[Particle]>,
    ring: ParticleRing,

    vertices: Box<[ParticleVertex]>,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,

    rng: StdRng,
    active: bool,
    spawned_this_cycle: usize,
    saturated: bool,
    stats: EmitterStats,
}

impl Emitter {
    /// 创建发射器并在后端上分配顶点/索引缓冲区
    pub fn new<B: RenderBackend + ?Sized>(
        config: EmitterConfig,
        resources: EmitterResources,
        backend: &mut B,
    ) -> EmitterResult<Self> {
        config.validate()?;

        let max = config.max_particles;
        let vertex_count = max * VERTICES_PER_PARTICLE;

        let mut vertices = vec![ParticleVertex::zeroed(); vertex_count].into_boxed_slice();
        for quad in vertices.chunks_exact_mut(VERTICES_PER_PARTICLE) {
            for (vertex, uv) in quad.iter_mut().zip(DEFAULT_UVS) {
                vertex.uv = uv.to_array();
            }
        }

        let vertex_buffer = backend.create_buffer(
            &BufferDescriptor {
                label: Some("Particle Vertex Buffer".to_string()),
                size: (vertex_count * std::mem::size_of::<ParticleVertex>()) as u64,
                usage: BufferUsage::VERTEX | BufferUsage::DYNAMIC,
            },
            None,
        )?;

        let indices = build_quad_indices(max);
        let index_buffer = match backend.create_buffer(
            &BufferDescriptor {
                label: Some("Particle Index Buffer".to_string()),
                size: (indices.len() * std::mem::size_of::<u32>()) as u64,
                usage: BufferUsage::INDEX,
            },
            Some(bytemuck::cast_slice(&indices[..])),
        ) {
            Ok(handle) => handle,
            Err(err) => {
                backend.destroy_buffer(vertex_buffer);
                return Err(err.into());
            }
        };

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        tracing::info!(
            target: "particles",
            max_particles = max,
            particles_per_second = config.particles_per_second,
            lifetime = config.lifetime,
            backend = backend.name(),
            "Emitter created"
        );

        Ok(Self {
            seconds_per_particle: 1.0 / config.particles_per_second,
            time_since_emit: 0.0,
            sprite_sheet: config
                .sprite_sheet
                .map(|(columns, rows)| SpriteSheet::new(columns, rows)),
            particles: vec![Particle::default(); max].into_boxed_slice(),
            ring: ParticleRing::new(max),
            vertices,
            vertex_buffer,
            index_buffer,
            rng,
            active: config.active,
            spawned_this_cycle: 0,
            saturated: false,
            stats: EmitterStats::default(),
            resources,
            config,
        })
    }

    // ------------------------------------------------------------------------
    // 访问器
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn max_particles(&self) -> usize {
        self.ring.capacity()
    }

    pub fn living_particle_count(&self) -> usize {
        self.ring.len()
    }

    pub fn first_alive_index(&self) -> usize {
        self.ring.first_alive()
    }

    pub fn first_dead_index(&self) -> usize {
        self.ring.first_dead()
    }

    pub fn live_ranges(&self) -> LiveRanges {
        self.ring.live_ranges()
    }

    /// 全部槽位（包括已死亡的）
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// CPU 端顶点暂存区，最近一次 `draw` 的结果
    pub fn vertices(&self) -> &[ParticleVertex] {
        &self.vertices
    }

    pub fn time_since_emit(&self) -> f32 {
        self.time_since_emit
    }

    pub fn seconds_per_particle(&self) -> f32 {
        self.seconds_per_particle
    }

    pub fn stats(&self) -> EmitterStats {
        EmitterStats {
            living: self.ring.len(),
            ..self.stats
        }
    }

    pub fn vertex_buffer(&self) -> BufferHandle {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> BufferHandle {
        self.index_buffer
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 停用后已有粒子照常老化和绘制，只是不再发射
    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            tracing::debug!(target: "particles", active, "Emitter activity changed");
        }
        self.active = active;
    }

    /// 重置发射计数，让单次发射器可以再来一轮
    pub fn reset(&mut self) {
        self.spawned_this_cycle = 0;
        self.time_since_emit = 0.0;
    }

    /// 销毁后端上的顶点和索引缓冲区
    ///
    /// 后端持有缓冲区的所有权，发射器不再使用时必须调用，否则缓冲区会一直留在后端。
    pub fn release<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        backend.destroy_buffer(self.vertex_buffer);
        backend.destroy_buffer(self.index_buffer);
        tracing::debug!(
            target: "particles",
            spawned = self.stats.spawned_total,
            retired = self.stats.retired_total,
            "Emitter released"
        );
    }

    // ------------------------------------------------------------------------
    // 更新
    // ------------------------------------------------------------------------

    /// 推进所有存活粒子，然后按发射速率生成新粒子
    pub fn update(&mut self, dt: f32) {
        for slot in self.ring.live_ranges().iter() {
            self.update_single_particle(dt, slot);
        }

        if !self.active {
            return;
        }

        self.time_since_emit += dt;

        let mut attempts = 0;
        // 用 >= 而不是 >：恰好累积满一个周期时立即发射，保证循环结束后累加器严格小于周期
        while self.time_since_emit >= self.seconds_per_particle {
            if attempts == self.ring.capacity() {
                // 本帧不会再有粒子死亡，剩余请求必然被丢弃
                self.stats.dropped_total += 1;
                self.time_since_emit %= self.seconds_per_particle;
                break;
            }
            self.spawn_particle();
            attempts += 1;
            self.time_since_emit -= self.seconds_per_particle;
        }

        tracing::trace!(
            target: "particles",
            living = self.ring.len(),
            first_alive = self.ring.first_alive(),
            first_dead = self.ring.first_dead(),
            "Emitter updated"
        );
    }

    fn update_single_particle(&mut self, dt: f32, index: usize) {
        let lifetime = self.config.lifetime;
        let particle = &mut self.particles[index];

        if particle.age >= lifetime {
            return;
        }

        particle.age += dt;

        if particle.age >= lifetime {
            self.ring.pop_front();
            self.stats.retired_total += 1;
            return;
        }

        let t = particle.age / lifetime;
        particle.color = self.config.start_color.lerp(self.config.end_color, t);
        particle.rotation =
            particle.rotation_start + t * (particle.rotation_end - particle.rotation_start);
        particle.size = self.config.start_size + t * (self.config.end_size - self.config.start_size);

        // 每帧由年龄直接求值，避免逐帧积分的误差累积
        let age = particle.age;
        particle.position = particle.start_position
            + particle.start_velocity * age
            + 0.5 * self.config.emitter_acceleration * age * age;
    }

    fn spawn_particle(&mut self) {
        if self.config.one_shot && self.spawned_this_cycle >= self.ring.capacity() {
            return;
        }

        let Some(slot) = self.ring.push() else {
            self.stats.dropped_total += 1;
            if !self.saturated {
                self.saturated = true;
                tracing::debug!(target: "particles", max_particles = self.ring.capacity(), "Emitter saturated, dropping spawns");
            }
            return;
        };
        self.saturated = false;
        self.spawned_this_cycle += 1;
        self.stats.spawned_total += 1;

        let start_position =
            self.config.emitter_position + self.random_signed_vec3() * self.config.position_random_range;
        let start_velocity =
            self.config.start_velocity + self.random_signed_vec3() * self.config.velocity_random_range;

        let range = self.config.rotation_random_range;
        let rotation_start = self.random_between(range.x, range.y);
        let rotation_end = self.random_between(range.z, range.w);

        self.particles[slot] = Particle {
            color: self.config.start_color,
            start_position,
            position: start_position,
            start_velocity,
            size: self.config.start_size,
            age: 0.0,
            rotation_start,
            rotation_end,
            rotation: rotation_start,
        };
    }

    /// 每个分量独立取 [-1, 1) 的均匀随机数
    fn random_signed_vec3(&mut self) -> Vec3 {
        Vec3::new(
            self.rng.gen::<f32>() * 2.0 - 1.0,
            self.rng.gen::<f32>() * 2.0 - 1.0,
            self.rng.gen::<f32>() * 2.0 - 1.0,
        )
    }

    fn random_between(&mut self, min: f32, max: f32) -> f32 {
        min + self.rng.gen::<f32>() * (max - min)
    }

    // ------------------------------------------------------------------------
    // 绘制
    // ------------------------------------------------------------------------

    /// 重新生成顶点、上传并提交绘制命令
    pub fn draw<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, camera: &Camera) {
        self.copy_particles_to_staging(camera);
        if let Err(err) =
            backend.write_buffer(self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices[..]))
        {
            // 本帧不绘制，下一帧照常重试
            tracing::warn!(target: "particles", error = %err, "Vertex upload failed, skipping draw");
            return;
        }

        let draws = self.draw_ranges();
        let mut commands = Vec::with_capacity(5 + draws.len());
        commands.push(RenderCommand::SetPipeline {
            vertex_shader: self.resources.vertex_shader,
            pixel_shader: self.resources.pixel_shader,
        });
        commands.push(RenderCommand::camera_uniforms(camera));
        commands.push(RenderCommand::BindTexture {
            texture: self.resources.texture,
        });
        commands.push(RenderCommand::SetVertexBuffer {
            slot: 0,
            buffer: self.vertex_buffer,
            stride: ParticleVertex::STRIDE,
        });
        commands.push(RenderCommand::SetIndexBuffer {
            buffer: self.index_buffer,
            format: IndexFormat::Uint32,
        });
        commands.extend(draws.into_iter().map(RenderCommand::DrawIndexed));

        backend.submit(&commands);
    }

    /// 覆盖存活槽位的索引绘制区间
    ///
    /// 连续时一次绘制；回绕时先画 `[0, first_dead)` 再画 `[first_alive, max)`。
    /// 长度为 0 的区间不会出现。
    pub fn draw_ranges(&self) -> Vec<DrawIndexed> {
        let to_draw = |range: std::ops::Range<usize>| DrawIndexed {
            index_count: (range.len() * INDICES_PER_PARTICLE) as u32,
            first_index: (range.start * INDICES_PER_PARTICLE) as u32,
            base_vertex: 0,
        };

        match self.ring.live_ranges() {
            LiveRanges::Empty => Vec::new(),
            LiveRanges::Contiguous(range) => vec![to_draw(range)],
            LiveRanges::Wrapped { tail, head } => [head, tail]
                .into_iter()
                .filter(|range| !range.is_empty())
                .map(to_draw)
                .collect(),
        }
    }

    fn copy_particles_to_staging(&mut self, camera: &Camera) {
        let right = camera.right();
        let up = camera.up();
        for slot in self.ring.live_ranges().iter() {
            self.copy_one_particle(slot, right, up);
        }
    }

    fn copy_one_particle(&mut self, index: usize, right: Vec3, up: Vec3) {
        let particle = self.particles[index];
        let first = index * VERTICES_PER_PARTICLE;
        let quad = &mut self.vertices[first..first + VERTICES_PER_PARTICLE];

        for (corner, vertex) in quad.iter_mut().enumerate() {
            vertex.position = billboard_corner(&particle, corner, right, up).to_array();
            vertex.color = particle.color.to_array();
        }

        if let Some(sheet) = &self.sprite_sheet {
            let t = particle.age / self.config.lifetime;
            for (vertex, uv) in quad.iter_mut().zip(sheet.corner_uvs(t)) {
                vertex.uv = uv.to_array();
            }
        }
    }
}

/// 四边形某个角的世界坐标
///
/// 角的默认 UV 转为 [-1, 1] 偏移（Y 翻转），绕视线轴旋转后沿相机右/上轴展开。
pub fn billboard_corner(particle: &Particle, corner: usize, right: Vec3, up: Vec3) -> Vec3 {
    let uv = DEFAULT_UVS[corner];
    let offset = Vec2::new(uv.x * 2.0 - 1.0, uv.y * -2.0 + 1.0);
    let offset = Vec2::from_angle(particle.rotation).rotate(offset);

    particle.position + right * offset.x * particle.size + up * offset.y * particle.size
}

/// 为每个槽位生成两个三角形 `(4i, 4i+1, 4i+2)` 和 `(4i, 4i+2, 4i+3)`
pub fn build_quad_indices(max_particles: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(max_particles * INDICES_PER_PARTICLE);
    for i in 0..max_particles as u32 {
        let v = i * VERTICES_PER_PARTICLE as u32;
        indices.extend_from_slice(&[v, v + 1, v + 2, v, v + 2, v + 3]);
    }
    indices
}


// ============================================================================
// 测试
// ============================================================================
