use wgpu::util::DeviceExt;

use crate::{
    animation::TimeUniform,
    data_structures::texture::Texture,
    particles::{FireflyField, FireflyRaw},
    pipelines::{
        basic::{self, DepthConfig},
        uniform_bind_group, uniform_layout,
    },
};

/// Vertices per sprite: two triangles expanded in the vertex shader.
const SPRITE_VERTICES: u32 = 6;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FirefliesUniform {
    pub time: f32,
    pub pixel_ratio: f32,
    pub size: f32,
    _padding: f32,
    pub resolution: [f32; 2],
    _padding2: [f32; 2],
}

impl FirefliesUniform {
    pub fn new(pixel_ratio: f32, size: f32, resolution: (u32, u32)) -> Self {
        let mut uniform = Self {
            time: 0.0,
            pixel_ratio,
            size,
            _padding: 0.0,
            resolution: [1.0, 1.0],
            _padding2: [0.0; 2],
        };
        uniform.set_resolution(resolution.0, resolution.1);
        uniform
    }

    /// Physical size of the render target, used to turn pixel sizes into clip space.
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = [width.max(1) as f32, height.max(1) as f32];
    }
}

impl TimeUniform for FirefliesUniform {
    fn set_time(&mut self, elapsed: f32) {
        self.time = elapsed;
    }

    fn time(&self) -> f32 {
        self.time
    }
}

/// The particle field on the GPU.
#[derive(Debug)]
pub struct FirefliesEffect {
    pub field: FireflyField,
    pub uniform: FirefliesUniform,
    pub instance_buffer: wgpu::Buffer,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl FirefliesEffect {
    pub fn new(device: &wgpu::Device, field: FireflyField, uniform: FirefliesUniform) -> Self {
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fireflies Instance Buffer"),
            contents: bytemuck::cast_slice(&field.to_raw()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fireflies Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let layout = uniform_layout(device, "fireflies_bind_group_layout");
        let bind_group =
            uniform_bind_group(device, &layout, &uniform_buffer, "fireflies_bind_group");
        log::debug!("uploaded {} fireflies", field.len());
        Self {
            field,
            uniform,
            instance_buffer,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, camera_bind_group: &wgpu::BindGroup) {
        if self.field.is_empty() {
            return;
        }
        render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_bind_group(1, &self.bind_group, &[]);
        render_pass.draw(0..SPRITE_VERTICES, 0..self.field.len() as u32);
    }
}

/// Additive blending: sprites brighten what is behind them.
pub const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

pub fn mk_fireflies_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let material_layout = uniform_layout(device, "fireflies_bind_group_layout");
    let layout = basic::mk_material_layout(
        device,
        camera_bind_group_layout,
        &material_layout,
        "Fireflies Pipeline Layout",
    );
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Fireflies Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("fireflies.wgsl").into()),
    };
    basic::mk_render_pipeline(
        device,
        &layout,
        config.format,
        Some(ADDITIVE),
        Some(DepthConfig {
            format: Texture::DEPTH_FORMAT,
            write_enabled: false,
        }),
        None,
        &[FireflyRaw::desc()],
        shader,
    )
}
