//! 轴对齐包围盒与子弹/靶子碰撞检测

use super::entity::Entity;
use glam::{Vec3, Vec4};

/// 命中后的着色
pub const HIT_TINT: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_half_extents(half_extents: Vec3) -> Self {
        Self::new(-half_extents, half_extents)
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self::new(self.min + offset, self.max + offset)
    }

    /// 三个轴上都重叠才算相交，边界接触也算
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.max.cmpge(other.min).all() && other.max.cmpge(self.min).all()
    }
}

/// 一次命中
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub bullet: usize,
    pub target: usize,
}

#[derive(Debug, Default)]
pub struct CollisionManager {
    targets: Vec<Entity>,
    bullets: Vec<Entity>,
}

impl CollisionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 返回新靶子的下标
    pub fn add_target(&mut self, entity: Entity) -> usize {
        self.targets.push(entity);
        self.targets.len() - 1
    }

    pub fn add_bullet(&mut self, entity: Entity) -> usize {
        self.bullets.push(entity);
        self.bullets.len() - 1
    }

    /// 越界下标被忽略
    pub fn remove_target(&mut self, index: usize) -> Option<Entity> {
        (index < self.targets.len()).then(|| self.targets.remove(index))
    }

    pub fn remove_bullet(&mut self, index: usize) -> Option<Entity> {
        (index < self.bullets.len()).then(|| self.bullets.remove(index))
    }

    pub fn targets(&self) -> &[Entity] {
        &self.targets
    }

    pub fn bullets(&self) -> &[Entity] {
        &self.bullets
    }

    /// 推进所有实体
    pub fn step(&mut self, dt: f32) {
        for entity in self.targets.iter_mut().chain(self.bullets.iter_mut()) {
            entity.update(dt);
        }
    }

    /// 检测所有子弹与靶子的碰撞，命中的双方都被染成红色
    pub fn update(&mut self) -> Vec<Hit> {
        let mut hits = Vec::new();
        for (b, bullet) in self.bullets.iter().enumerate() {
            for (t, target) in self.targets.iter().enumerate() {
                if bullet.alive && target.alive && bullet.is_colliding_with(target) {
                    hits.push(Hit {
                        bullet: b,
                        target: t,
                    });
                }
            }
        }

        for hit in &hits {
            self.bullets[hit.bullet].tint = HIT_TINT;
            self.targets[hit.target].tint = HIT_TINT;
            tracing::debug!(target: "demo", bullet = hit.bullet, target_index = hit.target, "Hit");
        }
        hits
    }
}
