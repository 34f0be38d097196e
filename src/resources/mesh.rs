use anyhow::Context as _;
use wgpu::util::DeviceExt;

use crate::data_structures::model::{Mesh, ModelVertex};

use super::PrimitiveRef;

/**
 * Uploads the primitives picked by [`super::build_scene`], in order, so that the
 * n-th entry becomes `MeshId(n)`.
 *
 * The node's world transform is baked into a one-element instance buffer per
 * primitive; the scene is static so it is never rewritten.
 */
pub fn upload_primitives(
    document: &gltf::Document,
    buffers: &[Vec<u8>],
    primitives: &[PrimitiveRef],
    device: &wgpu::Device,
) -> anyhow::Result<Vec<Mesh>> {
    primitives
        .iter()
        .map(|picked| {
            let primitive = document
                .meshes()
                .nth(picked.mesh)
                .and_then(|mesh| mesh.primitives().nth(picked.primitive))
                .with_context(|| {
                    format!("{}: primitive {} not in document", picked.label, picked.primitive)
                })?;
            upload_primitive(&primitive, picked, buffers, device)
        })
        .collect()
}

fn upload_primitive(
    primitive: &gltf::Primitive,
    picked: &PrimitiveRef,
    buffers: &[Vec<u8>],
    device: &wgpu::Device,
) -> anyhow::Result<Mesh> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let mut vertices: Vec<ModelVertex> = reader
        .read_positions()
        .with_context(|| format!("{}: cannot read positions", picked.label))?
        .map(|position| ModelVertex {
            position,
            tex_coords: [0.0; 2],
        })
        .collect();
    if let Some(tex_coords) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
        vertices
            .iter_mut()
            .zip(tex_coords)
            .for_each(|(vertex, uv)| vertex.tex_coords = uv);
    }
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    let label = &picked.label;
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} Vertex Buffer", label)),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} Index Buffer", label)),
        contents: bytemuck::cast_slice(&indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} Transform Buffer", label)),
        contents: bytemuck::cast_slice(&[picked.world.to_raw()]),
        usage: wgpu::BufferUsages::VERTEX,
    });

    Ok(Mesh {
        name: label.clone(),
        vertex_buffer,
        index_buffer,
        transform_buffer,
        num_elements: indices.len() as u32,
    })
}
