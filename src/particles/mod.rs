//! 粒子系统
//!
//! - [`ring`]: 存活槽位的环形缓冲区
//! - [`particle`]: 粒子记录与顶点格式
//! - [`sprite_sheet`]: 序列帧 UV
//! - [`emitter`]: 发射、更新与绘制

pub mod emitter;
pub mod particle;
pub mod ring;
pub mod sprite_sheet;

pub use emitter::{
    billboard_corner, build_quad_indices, Emitter, EmitterConfig, EmitterResources, EmitterStats,
    INDICES_PER_PARTICLE, VERTICES_PER_PARTICLE,
};
pub use particle::{Particle, ParticleVertex};
pub use ring::{LiveRanges, ParticleRing};
pub use sprite_sheet::{SpriteSheet, DEFAULT_UVS};
