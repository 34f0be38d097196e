//! Mesh data and material slots.

use crate::data_structures::{instance::TransformRaw, scene_graph::SceneNode};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// Vertex of the baked model. The scene is unlit, so only position and UV are kept.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Which material a scene node is drawn with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Material {
    /// Not assigned yet; nodes in this state are not drawn.
    #[default]
    Unassigned,
    /// Unlit, textured with the baked lighting map.
    Baked,
    /// Flat white, used by the pole lights.
    Emission,
    /// The animated portal glow shader.
    PortalLight,
}

/// Index of a [`Mesh`] inside the model it was loaded with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// One glTF primitive uploaded to the GPU, with the world matrix of its node.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub transform_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

/// A loaded model: the node tree and the GPU meshes its nodes refer to.
#[derive(Debug)]
pub struct Model {
    pub root: SceneNode,
    pub meshes: Vec<Mesh>,
}

impl Model {
    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }
}

pub trait DrawMesh {
    fn draw_mesh(
        &mut self,
        mesh: &Mesh,
        camera_bind_group: &wgpu::BindGroup,
        material_bind_group: &wgpu::BindGroup,
    );
}

impl DrawMesh for wgpu::RenderPass<'_> {
    fn draw_mesh(
        &mut self,
        mesh: &Mesh,
        camera_bind_group: &wgpu::BindGroup,
        material_bind_group: &wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, mesh.transform_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, camera_bind_group, &[]);
        self.set_bind_group(1, material_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, 0..1);
    }
}

/// Vertex buffer layouts shared by every pipeline drawing model meshes.
pub fn mesh_buffer_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    [ModelVertex::desc(), TransformRaw::desc()]
}
