use wgpu::util::DeviceExt;

use crate::{
    animation::TimeUniform,
    data_structures::{model::mesh_buffer_layouts, texture::Texture},
    pipelines::{
        basic::{self, DepthConfig},
        uniform_bind_group, uniform_layout,
    },
};

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PortalUniform {
    pub time: f32,
    // Uniforms require 16 byte spacing
    _padding: [f32; 3],
}

impl PortalUniform {
    pub fn new(time: f32) -> Self {
        Self {
            time,
            _padding: [0.0; 3],
        }
    }
}

/// GPU state of the portal glow: the time uniform and its bind group.
#[derive(Debug)]
pub struct PortalEffect {
    pub uniform: PortalUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl PortalEffect {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = PortalUniform::default();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Portal Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let layout = uniform_layout(device, "portal_bind_group_layout");
        let bind_group = uniform_bind_group(device, &layout, &buffer, "portal_bind_group");
        Self {
            uniform,
            buffer,
            bind_group,
        }
    }

    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

impl TimeUniform for PortalUniform {
    fn set_time(&mut self, elapsed: f32) {
        self.time = elapsed;
    }

    fn time(&self) -> f32 {
        self.time
    }
}

/// The portal plane is drawn from its front side only, like the rest of the model.
pub const CULL_MODE: Option<wgpu::Face> = basic::FRONT_SIDE;

pub fn mk_portal_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let material_layout = uniform_layout(device, "portal_bind_group_layout");
    let layout = basic::mk_material_layout(
        device,
        camera_bind_group_layout,
        &material_layout,
        "Portal Pipeline Layout",
    );
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Portal Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("portal.wgsl").into()),
    };
    basic::mk_render_pipeline(
        device,
        &layout,
        config.format,
        Some(basic::REPLACE),
        Some(DepthConfig {
            format: Texture::DEPTH_FORMAT,
            write_enabled: true,
        }),
        CULL_MODE,
        &mesh_buffer_layouts(),
        shader,
    )
}
