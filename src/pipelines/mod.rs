//! Render pipelines of the scene.
//!
//! - `basic`: the shared pipeline builder
//! - `baked`: unlit textured meshes (baked lighting)
//! - `emission`: flat colour meshes (pole lights)
//! - `portal`: the animated portal glow
//! - `fireflies`: additive screen-space sprites for the particle field
//!
//! Every pipeline binds the camera at group 0 and its material at group 1.

pub mod baked;
pub mod basic;
pub mod emission;
pub mod fireflies;
pub mod portal;

#[derive(Debug)]
pub struct Pipelines {
    pub baked: wgpu::RenderPipeline,
    pub emission: wgpu::RenderPipeline,
    pub portal: wgpu::RenderPipeline,
    pub fireflies: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            baked: baked::mk_baked_pipeline(device, config, camera_bind_group_layout),
            emission: emission::mk_emission_pipeline(device, config, camera_bind_group_layout),
            portal: portal::mk_portal_pipeline(device, config, camera_bind_group_layout),
            fireflies: fireflies::mk_fireflies_pipeline(device, config, camera_bind_group_layout),
        }
    }
}

/// Layout of a single uniform buffer visible to both shader stages.
pub fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some(label),
    })
}

pub fn uniform_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some(label),
    })
}
