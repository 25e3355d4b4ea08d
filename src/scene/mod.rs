//! 演示场景：巡逻靶子、子弹和碰撞

pub mod collision;
pub mod entity;

pub use collision::{Aabb, CollisionManager, Hit, HIT_TINT};
pub use entity::{Entity, EntityKind};
