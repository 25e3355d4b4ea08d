//! 粒子与粒子顶点数据结构

use glam::{Vec2, Vec3, Vec4};

/// 一个粒子槽位中的生命周期记录
///
/// 槽位不会单独分配或释放，生成时原地覆盖，死亡时由环形缓冲区逻辑回收。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// 当前插值颜色
    pub color: Vec4,
    /// 生成时的位置
    pub start_position: Vec3,
    /// 当前位置
    pub position: Vec3,
    /// 生成时的速度（含随机扰动）
    pub start_velocity: Vec3,
    pub size: f32,
    /// 生成后经过的秒数
    pub age: f32,
    pub rotation_start: f32,
    pub rotation_end: f32,
    /// 当前旋转（弧度）
    pub rotation: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            color: Vec4::ZERO,
            start_position: Vec3::ZERO,
            position: Vec3::ZERO,
            start_velocity: Vec3::ZERO,
            size: 0.0,
            age: 0.0,
            rotation_start: 0.0,
            rotation_end: 0.0,
            rotation: 0.0,
        }
    }
}

/// 粒子顶点（每个粒子 4 个，组成一个面向相机的四边形）
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl ParticleVertex {
    pub const STRIDE: u32 = std::mem::size_of::<ParticleVertex>() as u32;

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }

    pub fn color(&self) -> Vec4 {
        Vec4::from_array(self.color)
    }
}
