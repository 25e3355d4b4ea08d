//! 场景实体
//!
//! 每个实体持有自己的变换、行为和碰撞盒，不共享所有权。

use super::collision::Aabb;
use crate::config::TargetSettings;
use crate::math::Transform;
use glam::{Vec3, Vec4};

/// 距离轨道端点多近时开始掉头
const PATROL_TURN_MARGIN: f32 = 0.5;

/// 实体的运动方式
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Static,
    /// 沿 X 轴在出发点两侧往返
    Patrolling {
        origin: Vec3,
        /// 带符号，符号即当前方向
        speed: f32,
        range: f32,
        points: u32,
    },
    /// 匀速直线运动
    Projectile { velocity: Vec3 },
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub transform: Transform,
    pub kind: EntityKind,
    /// 局部空间碰撞盒，随位置平移
    pub collider: Aabb,
    pub tint: Vec4,
    pub alive: bool,
}

impl Entity {
    pub fn new(position: Vec3, kind: EntityKind, collider: Aabb) -> Self {
        Self {
            transform: Transform::new(position, Vec3::ZERO),
            kind,
            collider,
            tint: Vec4::ONE,
            alive: true,
        }
    }

    pub fn new_static(position: Vec3, half_extents: Vec3) -> Self {
        Self::new(position, EntityKind::Static, Aabb::from_half_extents(half_extents))
    }

    /// 巡逻靶子，出发点取当前位置
    pub fn target(settings: &TargetSettings) -> Self {
        let position = Vec3::from_array(settings.position);
        Self::new(
            position,
            EntityKind::Patrolling {
                origin: position,
                speed: settings.speed,
                range: settings.range,
                points: settings.points,
            },
            Aabb::from_half_extents(Vec3::from_array(settings.half_extents)),
        )
    }

    pub fn projectile(position: Vec3, velocity: Vec3, radius: f32) -> Self {
        Self::new(
            position,
            EntityKind::Projectile { velocity },
            Aabb::from_half_extents(Vec3::splat(radius)),
        )
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    /// 击中得分，非靶子为 0
    pub fn points(&self) -> u32 {
        match self.kind {
            EntityKind::Patrolling { points, .. } => points,
            _ => 0,
        }
    }

    /// 世界空间碰撞盒
    pub fn world_bounds(&self) -> Aabb {
        self.collider.translated(self.position())
    }

    pub fn is_colliding_with(&self, other: &Entity) -> bool {
        self.world_bounds().overlaps(&other.world_bounds())
    }

    pub fn update(&mut self, dt: f32) {
        if !self.alive {
            return;
        }

        match &mut self.kind {
            EntityKind::Static => {}
            EntityKind::Patrolling {
                origin,
                speed,
                range,
                ..
            } => {
                let position = self.transform.position();
                let distance = origin.distance(position);
                let heading_out = (position.x - origin.x) * *speed > 0.0;
                // 只在远离出发点时掉头，避免越界后每帧来回翻转
                if distance + PATROL_TURN_MARGIN > *range && heading_out {
                    *speed = -*speed;
                }
                self.transform.move_absolute(Vec3::new(*speed * dt, 0.0, 0.0));
            }
            EntityKind::Projectile { velocity } => {
                self.transform.move_absolute(*velocity * dt);
            }
        }
    }
}
