//! 变换组件
//!
//! 位置、欧拉角旋转（pitch/yaw/roll）与缩放，世界矩阵按需重算。

use glam::{EulerRot, Mat4, Quat, Vec3};

#[derive(Clone, Copy, Debug)]
pub struct Transform {
    position: Vec3,
    /// (pitch, yaw, roll)，弧度
    rotation: Vec3,
    scale: Vec3,
    world: Mat4,
    world_dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            world: Mat4::IDENTITY,
            world_dirty: false,
        }
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        let mut transform = Self::default();
        transform.set_position(position);
        transform.set_rotation(rotation);
        transform
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.world_dirty = true;
    }

    /// 设置旋转，分量依次为 pitch、yaw、roll
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.world_dirty = true;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.world_dirty = true;
    }

    /// 朝向四元数：先绕 Z 滚转，再绕 X 俯仰，最后绕 Y 偏航
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.rotation.y, self.rotation.x, self.rotation.z)
    }

    /// 沿世界坐标轴移动
    pub fn move_absolute(&mut self, offset: Vec3) {
        self.position += offset;
        self.world_dirty = true;
    }

    /// 沿自身朝向移动（偏移量先经过朝向旋转）
    pub fn move_relative(&mut self, offset: Vec3) {
        self.position += self.orientation() * offset;
        self.world_dirty = true;
    }

    pub fn rotate(&mut self, delta: Vec3) {
        self.rotation += delta;
        self.world_dirty = true;
    }

    /// 按分量乘以缩放
    pub fn scale_by(&mut self, factor: Vec3) {
        self.scale *= factor;
        self.world_dirty = true;
    }

    /// 世界矩阵（缩放 → 旋转 → 平移）
    pub fn world_matrix(&mut self) -> Mat4 {
        if self.world_dirty {
            self.world = Mat4::from_scale_rotation_translation(
                self.scale,
                self.orientation(),
                self.position,
            );
            self.world_dirty = false;
        }
        self.world
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation() * Vec3::X
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_default_is_identity() {
        let mut t = Transform::default();
        assert_eq!(t.world_matrix(), Mat4::IDENTITY);
        assert_eq!(t.scale(), Vec3::ONE);
    }

    #[test]
    fn test_move_relative_follows_yaw() {
        let mut t = Transform::default();
        t.set_rotation(Vec3::new(0.0, FRAC_PI_2, 0.0));
        t.move_relative(Vec3::new(0.0, 0.0, 1.0));
        // 偏航 90° 后，前方 (0,0,1) 转到 +X
        assert!((t.position() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_move_absolute_ignores_rotation() {
        let mut t = Transform::default();
        t.set_rotation(Vec3::new(0.3, 1.2, 0.0));
        t.move_absolute(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(t.position(), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_world_matrix_recomputed_after_change() {
        let mut t = Transform::default();
        let _ = t.world_matrix();
        t.set_position(Vec3::new(1.0, 2.0, 3.0));
        t.scale_by(Vec3::splat(2.0));
        let world = t.world_matrix();
        let p = world.transform_point3(Vec3::ONE);
        assert!((p - Vec3::new(3.0, 4.0, 5.0)).length() < 1e-5);
    }
}
