//! 自由飞行相机
//!
//! 左手坐标系：视线方向为朝向旋转后的 +Z，向上为 +Y。
//! 粒子发射器从视图矩阵中取出相机的右/上轴来生成公告板。

use crate::config::CameraConfig;
use crate::math::Transform;
use glam::{Mat4, Vec2, Vec3};

/// 一帧的相机输入
///
/// 与具体的窗口/输入库解耦，由宿主程序在每帧填写。
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// 加速移动（通常是 Shift）
    pub fast: bool,
    /// 按住时鼠标移动会旋转视角
    pub look_held: bool,
    /// 窗口客户区内的鼠标位置（像素）
    pub mouse_position: Vec2,
}

#[derive(Debug, Clone)]
pub struct Camera {
    transform: Transform,
    view: Mat4,
    projection: Mat4,
    prev_mouse_position: Vec2,
    fov: f32,
    near_clip: f32,
    far_clip: f32,
    move_speed: f32,
    fast_move_speed: f32,
    mouse_look_speed: f32,
}

impl Camera {
    /// 使用默认参数创建相机，位于 (0, 0, -10) 看向 +Z
    pub fn new(aspect_ratio: f32) -> Self {
        let config = CameraConfig {
            aspect_ratio,
            ..CameraConfig::default()
        };
        Self::from_config(&config)
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self {
            transform: Transform::new(
                Vec3::from_array(config.position),
                Vec3::from_array(config.orientation),
            ),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            prev_mouse_position: Vec2::ZERO,
            fov: config.fov,
            near_clip: config.near_clip,
            far_clip: config.far_clip,
            move_speed: config.move_speed,
            fast_move_speed: config.fast_move_speed,
            mouse_look_speed: config.mouse_look_speed,
        };
        camera.update_projection_matrix(config.aspect_ratio);
        camera.update_view_matrix();
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// 修改变换后需要调用 [`Camera::update_view_matrix`]
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    /// 相机 X 轴在世界空间中的方向（视图矩阵第一行）
    pub fn right(&self) -> Vec3 {
        self.view.row(0).truncate()
    }

    /// 相机 Y 轴在世界空间中的方向（视图矩阵第二行）
    pub fn up(&self) -> Vec3 {
        self.view.row(1).truncate()
    }

    pub fn update_projection_matrix(&mut self, aspect_ratio: f32) {
        self.projection =
            Mat4::perspective_lh(self.fov, aspect_ratio, self.near_clip, self.far_clip);
    }

    pub fn update_view_matrix(&mut self) {
        let position = self.transform.position();
        let forward = self.transform.forward();
        self.view = Mat4::look_to_lh(position, forward, Vec3::Y);
    }

    /// 根据输入移动和旋转相机，然后刷新视图矩阵
    pub fn update(&mut self, dt: f32, input: &CameraInput) {
        let speed = if input.fast {
            self.fast_move_speed
        } else {
            self.move_speed
        };
        let step = speed * dt;

        if input.forward {
            self.transform.move_relative(Vec3::new(0.0, 0.0, step));
        }
        if input.backward {
            self.transform.move_relative(Vec3::new(0.0, 0.0, -step));
        }
        if input.left {
            self.transform.move_relative(Vec3::new(-step, 0.0, 0.0));
        }
        if input.right {
            self.transform.move_relative(Vec3::new(step, 0.0, 0.0));
        }
        if input.up {
            self.transform.move_absolute(Vec3::new(0.0, step, 0.0));
        }
        if input.down {
            self.transform.move_absolute(Vec3::new(0.0, -step, 0.0));
        }

        if input.look_held {
            let delta = input.mouse_position - self.prev_mouse_position;
            // 水平移动改变偏航，垂直移动改变俯仰
            self.transform.rotate(Vec3::new(
                delta.y * self.mouse_look_speed,
                delta.x * self.mouse_look_speed,
                0.0,
            ));
        }
        self.prev_mouse_position = input.mouse_position;

        self.update_view_matrix();
        tracing::trace!(target: "camera", position = ?self.transform.position(), "Camera updated");
    }
}
