//! 渲染相关：相机、后端抽象与 wgpu 实现

pub mod backend;
pub mod camera;
pub mod wgpu_backend;

pub use backend::{
    BufferDescriptor, BufferHandle, BufferUsage, DrawIndexed, IndexFormat, NullBackend,
    RecordingBackend, RenderBackend, RenderCommand, ShaderHandle, TextureHandle,
};
pub use camera::{Camera, CameraInput};
pub use wgpu_backend::WgpuBackend;
