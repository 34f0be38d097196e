use wgpu::util::DeviceExt;

use crate::{
    data_structures::{model::mesh_buffer_layouts, texture::Texture},
    pipelines::{
        basic::{self, DepthConfig},
        uniform_bind_group, uniform_layout,
    },
};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EmissionUniform {
    pub colour: [f32; 4],
}

impl EmissionUniform {
    pub const WHITE: Self = Self {
        colour: [1.0, 1.0, 1.0, 1.0],
    };
}

/// Flat colour material of the pole lights.
#[derive(Debug)]
pub struct EmissionMaterial {
    pub uniform: EmissionUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl EmissionMaterial {
    pub fn new(device: &wgpu::Device, uniform: EmissionUniform) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Emission Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let layout = uniform_layout(device, "emission_bind_group_layout");
        let bind_group = uniform_bind_group(device, &layout, &buffer, "emission_bind_group");
        Self {
            uniform,
            buffer,
            bind_group,
        }
    }
}

pub fn mk_emission_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let material_layout = uniform_layout(device, "emission_bind_group_layout");
    let layout = basic::mk_material_layout(
        device,
        camera_bind_group_layout,
        &material_layout,
        "Emission Pipeline Layout",
    );
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Emission Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("emission.wgsl").into()),
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
        basic::FRONT_SIDE,
        &mesh_buffer_layouts(),
        shader,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emission_uniform_is_opaque_white_and_aligned() {
        assert_eq!(EmissionUniform::WHITE.colour, [1.0; 4]);
        assert_eq!(std::mem::size_of::<EmissionUniform>() % 16, 0);
    }
}
