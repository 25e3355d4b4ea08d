//! wgpu 渲染后端
//!
//! 把 [`RenderBackend`] 的命令映射到 wgpu。着色器管线和纹理绑定组由宿主创建后
//! 注册进来；后端只负责缓冲区生命周期、上传和在渲染通道中重放命令。

use super::backend::{
    BufferDescriptor, BufferHandle, BufferUsage, IndexFormat, RenderBackend, RenderCommand,
    ShaderHandle, TextureHandle,
};
use crate::core::error::{RenderError, RenderResult};
use std::collections::HashMap;

/// 相机 Uniform（对应 WGSL struct）
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

/// 相机 Uniform 固定绑定在第 0 组，纹理在第 1 组
pub const CAMERA_BIND_GROUP: u32 = 0;
pub const TEXTURE_BIND_GROUP: u32 = 1;

pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    next_buffer_id: u64,
    buffers: HashMap<BufferHandle, wgpu::Buffer>,
    pipelines: HashMap<(ShaderHandle, ShaderHandle), wgpu::RenderPipeline>,
    texture_bind_groups: HashMap<TextureHandle, wgpu::BindGroup>,
    camera: Option<(wgpu::Buffer, wgpu::BindGroup)>,
    pending: Vec<RenderCommand>,
}

fn to_wgpu_usage(usage: BufferUsage) -> wgpu::BufferUsages {
    let mut out = wgpu::BufferUsages::COPY_DST;
    if usage.contains(BufferUsage::VERTEX) {
        out |= wgpu::BufferUsages::VERTEX;
    }
    if usage.contains(BufferUsage::INDEX) {
        out |= wgpu::BufferUsages::INDEX;
    }
    if usage.contains(BufferUsage::UNIFORM) {
        out |= wgpu::BufferUsages::UNIFORM;
    }
    out
}

fn to_wgpu_index_format(format: IndexFormat) -> wgpu::IndexFormat {
    match format {
        IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
        IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
    }
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            next_buffer_id: 1,
            buffers: HashMap::new(),
            pipelines: HashMap::new(),
            texture_bind_groups: HashMap::new(),
            camera: None,
            pending: Vec::new(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// 注册一个着色器组合对应的渲染管线
    pub fn register_pipeline(
        &mut self,
        vertex_shader: ShaderHandle,
        pixel_shader: ShaderHandle,
        pipeline: wgpu::RenderPipeline,
    ) {
        self.pipelines.insert((vertex_shader, pixel_shader), pipeline);
    }

    /// 注册纹理绑定组（纹理 + 采样器）
    pub fn register_texture(&mut self, texture: TextureHandle, bind_group: wgpu::BindGroup) {
        self.texture_bind_groups.insert(texture, bind_group);
    }

    /// 创建相机 Uniform 缓冲区及其绑定组
    pub fn create_camera_uniforms(&mut self, layout: &wgpu::BindGroupLayout) {
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Camera Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        self.camera = Some((buffer, bind_group));
    }

    /// 丢弃上一帧记录的命令
    pub fn begin_frame(&mut self) {
        self.pending.clear();
    }

    /// 在渲染通道中重放本帧记录的命令
    pub fn encode<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        for command in &self.pending {
            match command {
                RenderCommand::SetPipeline {
                    vertex_shader,
                    pixel_shader,
                } => match self.pipelines.get(&(*vertex_shader, *pixel_shader)) {
                    Some(pipeline) => pass.set_pipeline(pipeline),
                    None => {
                        tracing::warn!(target: "render", vs = vertex_shader.0, ps = pixel_shader.0, "No pipeline registered")
                    }
                },
                RenderCommand::SetCameraUniforms { .. } => {
                    if let Some((_, bind_group)) = &self.camera {
                        pass.set_bind_group(CAMERA_BIND_GROUP, bind_group, &[]);
                    }
                }
                RenderCommand::BindTexture { texture } => {
                    match self.texture_bind_groups.get(texture) {
                        Some(bind_group) => pass.set_bind_group(TEXTURE_BIND_GROUP, bind_group, &[]),
                        None => {
                            tracing::warn!(target: "render", texture = texture.0, "No texture registered")
                        }
                    }
                }
                RenderCommand::SetVertexBuffer { slot, buffer, .. } => {
                    if let Some(buffer) = self.buffers.get(buffer) {
                        pass.set_vertex_buffer(*slot, buffer.slice(..));
                    }
                }
                RenderCommand::SetIndexBuffer { buffer, format } => {
                    if let Some(buffer) = self.buffers.get(buffer) {
                        pass.set_index_buffer(buffer.slice(..), to_wgpu_index_format(*format));
                    }
                }
                RenderCommand::DrawIndexed(draw) => {
                    pass.draw_indexed(
                        draw.first_index..draw.first_index + draw.index_count,
                        draw.base_vertex,
                        0..1,
                    );
                }
            }
        }
    }
}

impl RenderBackend for WgpuBackend {
    fn create_buffer(
        &mut self,
        desc: &BufferDescriptor,
        contents: Option<&[u8]>,
    ) -> RenderResult<BufferHandle> {
        let max = self.device.limits().max_buffer_size;
        if desc.size == 0 || desc.size > max {
            return Err(RenderError::BufferCreation(format!(
                "{}: size {} outside 1..={}",
                desc.label.as_deref().unwrap_or("unnamed"),
                desc.size,
                max
            )));
        }

        // 写入粒度要求 4 字节对齐
        let size = (desc.size + wgpu::COPY_BUFFER_ALIGNMENT - 1) & !(wgpu::COPY_BUFFER_ALIGNMENT - 1);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: desc.label.as_deref(),
            size,
            usage: to_wgpu_usage(desc.usage),
            mapped_at_creation: false,
        });
        if let Some(contents) = contents {
            self.queue.write_buffer(&buffer, 0, contents);
        }

        let handle = BufferHandle(self.next_buffer_id);
        self.next_buffer_id += 1;
        self.buffers.insert(handle, buffer);
        Ok(handle)
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if let Some(buffer) = self.buffers.remove(&buffer) {
            buffer.destroy();
        }
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> RenderResult<()> {
        let target = self
            .buffers
            .get(&buffer)
            .ok_or(RenderError::InvalidHandle(buffer.0))?;
        if offset + data.len() as u64 > target.size() {
            return Err(RenderError::InvalidState(format!(
                "write of {} bytes at offset {} overflows buffer {} ({} bytes)",
                data.len(),
                offset,
                buffer.0,
                target.size()
            )));
        }
        self.queue.write_buffer(target, offset, data);
        Ok(())
    }

    fn submit(&mut self, commands: &[RenderCommand]) {
        for command in commands {
            if let RenderCommand::SetCameraUniforms { view, projection } = command {
                if let Some((buffer, _)) = &self.camera {
                    let uniforms = CameraUniforms {
                        view: view.to_cols_array_2d(),
                        projection: projection.to_cols_array_2d(),
                    };
                    self.queue.write_buffer(buffer, 0, bytemuck::bytes_of(&uniforms));
                }
            }
        }
        self.pending.extend_from_slice(commands);
    }

    fn name(&self) -> &str {
        "wgpu"
    }
}
