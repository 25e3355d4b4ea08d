//! 渲染后端抽象
//!
//! 发射器只依赖这里的 trait：创建缓冲区、写入缓冲区、提交渲染命令。
//! 具体的 API（wgpu 等）在各自的模块中实现。
//!
//! ## 设计目标
//!
//! - 发射器与图形 API 解耦
//! - 测试中可以用 [`RecordingBackend`] 检查每一次上传和绘制

use super::camera::Camera;
use crate::core::error::{RenderError, RenderResult};
use glam::Mat4;
use std::collections::HashMap;

/// 缓冲区描述符
#[derive(Debug, Clone)]
pub struct BufferDescriptor {
    /// 标签
    pub label: Option<String>,
    /// 大小（字节）
    pub size: u64,
    /// 用途
    pub usage: BufferUsage,
}

/// 缓冲区用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferUsage(pub u32);

impl BufferUsage {
    pub const VERTEX: Self = Self(1);
    pub const INDEX: Self = Self(2);
    pub const UNIFORM: Self = Self(4);
    /// CPU 每帧改写（动态缓冲区）
    pub const DYNAMIC: Self = Self(8);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for BufferUsage {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// 索引格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

/// 抽象缓冲区句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// 抽象纹理句柄（纹理加载由宿主负责）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureHandle(pub u64);

/// 抽象着色器句柄（着色器编译由宿主负责）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShaderHandle(pub u64);

/// 一次索引绘制
///
/// 与 D3D 的 `DrawIndexed(indexCount, startIndexLocation, baseVertexLocation)` 对应。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawIndexed {
    pub index_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
}

/// 渲染命令
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// 设置着色器组合
    SetPipeline {
        vertex_shader: ShaderHandle,
        pixel_shader: ShaderHandle,
    },
    /// 设置相机矩阵
    SetCameraUniforms { view: Mat4, projection: Mat4 },
    /// 绑定纹理
    BindTexture { texture: TextureHandle },
    /// 设置顶点缓冲区
    SetVertexBuffer {
        slot: u32,
        buffer: BufferHandle,
        stride: u32,
    },
    /// 设置索引缓冲区
    SetIndexBuffer {
        buffer: BufferHandle,
        format: IndexFormat,
    },
    /// 索引绘制
    DrawIndexed(DrawIndexed),
}

impl RenderCommand {
    /// 从相机生成矩阵命令
    pub fn camera_uniforms(camera: &Camera) -> Self {
        Self::SetCameraUniforms {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
        }
    }
}

/// 渲染后端 Trait
///
/// # 示例
///
/// ```ignore
/// struct MyBackend { ... }
///
/// impl RenderBackend for MyBackend {
///     fn create_buffer(&mut self, desc: &BufferDescriptor, contents: Option<&[u8]>) -> RenderResult<BufferHandle> { ... }
///     fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> RenderResult<()> { ... }
///     fn submit(&mut self, commands: &[RenderCommand]) { ... }
/// }
/// ```
pub trait RenderBackend {
    /// 创建缓冲区，可选地带初始内容（静态索引缓冲区使用）
    fn create_buffer(
        &mut self,
        desc: &BufferDescriptor,
        contents: Option<&[u8]>,
    ) -> RenderResult<BufferHandle>;

    /// 销毁缓冲区
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// 写入缓冲区数据
    ///
    /// 一次完整的“映射-拷贝-解除映射”，调用返回后数据已交给后端。
    /// 未知句柄返回 `InvalidHandle`，越界写入返回 `InvalidState`。
    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8])
        -> RenderResult<()>;

    /// 提交渲染命令
    fn submit(&mut self, commands: &[RenderCommand]);

    /// 获取后端名称
    fn name(&self) -> &str;
}

/// 空后端实现
///
/// 分配句柄但不做任何事。无需 GPU 的无头运行使用它。
#[derive(Debug)]
pub struct NullBackend {
    next_buffer_id: u64,
}

impl Default for NullBackend {
    fn default() -> Self {
        Self { next_buffer_id: 1 }
    }
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderBackend for NullBackend {
    fn create_buffer(
        &mut self,
        _desc: &BufferDescriptor,
        _contents: Option<&[u8]>,
    ) -> RenderResult<BufferHandle> {
        let handle = BufferHandle(self.next_buffer_id);
        self.next_buffer_id += 1;
        Ok(handle)
    }

    fn destroy_buffer(&mut self, _buffer: BufferHandle) {}

    fn write_buffer(&mut self, _buffer: BufferHandle, _offset: u64, _data: &[u8]) -> RenderResult<()> {
        Ok(())
    }

    fn submit(&mut self, _commands: &[RenderCommand]) {}

    fn name(&self) -> &str {
        "null"
    }
}

/// 记录后端
///
/// 在内存中保存缓冲区内容和全部提交的命令，测试与无头演示使用。
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_buffer_id: u64,
    buffers: HashMap<BufferHandle, RecordedBuffer>,
    commands: Vec<RenderCommand>,
    write_count: usize,
    /// 设置后，第 N 次（从 0 计）创建缓冲区会失败
    fail_buffer_creation_at: Option<usize>,
    created: usize,
}

/// 后端中保存的一个缓冲区
#[derive(Debug, Clone)]
pub struct RecordedBuffer {
    pub desc: BufferDescriptor,
    pub data: Vec<u8>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            next_buffer_id: 1,
            ..Default::default()
        }
    }

    /// 让第 `index` 次缓冲区创建失败
    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_buffer_creation_at: Some(index),
            ..Self::new()
        }
    }

    pub fn buffer(&self, handle: BufferHandle) -> Option<&RecordedBuffer> {
        self.buffers.get(&handle)
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// 已提交的全部索引绘制
    pub fn draw_calls(&self) -> Vec<DrawIndexed> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::DrawIndexed(draw) => Some(*draw),
                _ => None,
            })
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.write_count
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn create_buffer(
        &mut self,
        desc: &BufferDescriptor,
        contents: Option<&[u8]>,
    ) -> RenderResult<BufferHandle> {
        let attempt = self.created;
        self.created += 1;
        if self.fail_buffer_creation_at == Some(attempt) {
            return Err(RenderError::BufferCreation(format!(
                "{} ({} bytes)",
                desc.label.as_deref().unwrap_or("unnamed"),
                desc.size
            )));
        }

        let mut data = vec![0u8; desc.size as usize];
        if let Some(contents) = contents {
            let len = contents.len().min(data.len());
            data[..len].copy_from_slice(&contents[..len]);
        }

        let handle = BufferHandle(self.next_buffer_id);
        self.next_buffer_id += 1;
        self.buffers.insert(
            handle,
            RecordedBuffer {
                desc: desc.clone(),
                data,
            },
        );
        Ok(handle)
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer);
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> RenderResult<()> {
        let target = self
            .buffers
            .get_mut(&buffer)
            .ok_or(RenderError::InvalidHandle(buffer.0))?;
        let start = offset as usize;
        let end = start + data.len();
        if end > target.data.len() {
            return Err(RenderError::InvalidState(format!(
                "write of {} bytes at offset {} overflows buffer {} ({} bytes)",
                data.len(),
                offset,
                buffer.0,
                target.data.len()
            )));
        }
        target.data[start..end].copy_from_slice(data);
        self.write_count += 1;
        Ok(())
    }

    fn submit(&mut self, commands: &[RenderCommand]) {
        self.commands.extend_from_slice(commands);
    }

    fn name(&self) -> &str {
        "recording"
    }
}
