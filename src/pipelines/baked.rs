use anyhow::Context as _;

use crate::{
    data_structures::{model::mesh_buffer_layouts, texture::Texture},
    pipelines::basic::{self, DepthConfig},
    resources::texture::texture_layout,
};

/// The baked lighting texture bound for drawing.
#[derive(Debug)]
pub struct BakedMaterial {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

impl BakedMaterial {
    pub fn new(device: &wgpu::Device, texture: Texture) -> anyhow::Result<Self> {
        let sampler = texture
            .sampler
            .as_ref()
            .context("baked texture was created without a sampler")?;
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &texture_layout(device),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some("baked_bind_group"),
        });
        Ok(Self { texture, bind_group })
    }
}

pub fn mk_baked_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let material_layout = texture_layout(device);
    let layout = basic::mk_material_layout(
        device,
        camera_bind_group_layout,
        &material_layout,
        "Baked Pipeline Layout",
    );
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Baked Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("baked.wgsl").into()),
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
