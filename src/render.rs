//! Render composition and pipeline batching.
//!
//! The scene describes what to draw as a [`Render`] tree. Before drawing, the
//! tree is flattened into [`Batches`], one per pipeline, so every pipeline is
//! bound once per frame: opaque baked meshes first, then the emissive and
//! portal meshes, and the additive fireflies last.

use crate::{
    data_structures::model::{DrawMesh, Material, MeshId, Model},
    pipelines::{Pipelines, fireflies::FirefliesEffect},
};

/// Meshes of one model that share a material.
#[derive(Debug, Clone)]
pub struct Instanced<'a> {
    pub model: &'a Model,
    pub meshes: Vec<MeshId>,
}

/// Specifies how parts of the scene are rendered.
///
/// - `None` renders nothing
/// - `Baked`, `Emission` and `PortalLight` render model meshes with that material
/// - `Fireflies` renders the particle sprites
/// - `Composed` recursively renders a composition of renders
#[derive(Debug)]
pub enum Render<'a> {
    None,
    Baked(Instanced<'a>),
    Emission(Instanced<'a>),
    PortalLight(Instanced<'a>),
    Fireflies(&'a FirefliesEffect),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub fn set_pipelines(self, batches: &mut Batches<'a>) {
        match self {
            Render::Baked(instanced) => batches.baked.push(instanced),
            Render::Emission(instanced) => batches.emission.push(instanced),
            Render::PortalLight(instanced) => batches.portal.push(instanced),
            Render::Fireflies(effect) => batches.fireflies.push(effect),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(batches)),
            Render::None => (),
        }
    }
}

/// Groups the meshes of every node by material. Nodes still `Unassigned` are not drawn.
impl<'a> From<&'a Model> for Render<'a> {
    fn from(model: &'a Model) -> Self {
        let mut baked = Vec::new();
        let mut emission = Vec::new();
        let mut portal = Vec::new();
        model.root.traverse(&mut |node| match node.material {
            Material::Baked => baked.extend_from_slice(&node.meshes),
            Material::Emission => emission.extend_from_slice(&node.meshes),
            Material::PortalLight => portal.extend_from_slice(&node.meshes),
            Material::Unassigned => (),
        });
        Render::Composed(vec![
            Render::Baked(Instanced { model, meshes: baked }),
            Render::Emission(Instanced { model, meshes: emission }),
            Render::PortalLight(Instanced { model, meshes: portal }),
        ])
    }
}

/// Bind groups used at group 0 (camera) and group 1 (materials).
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    pub camera: &'a wgpu::BindGroup,
    pub baked: Option<&'a wgpu::BindGroup>,
    pub emission: &'a wgpu::BindGroup,
    pub portal: &'a wgpu::BindGroup,
}

/// Draw calls sorted by pipeline.
#[derive(Debug, Default)]
pub struct Batches<'a> {
    pub baked: Vec<Instanced<'a>>,
    pub emission: Vec<Instanced<'a>>,
    pub portal: Vec<Instanced<'a>>,
    pub fireflies: Vec<&'a FirefliesEffect>,
}

impl<'a> Batches<'a> {
    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        pipelines: &Pipelines,
        bindings: &Bindings<'_>,
    ) {
        match bindings.baked {
            Some(baked) => {
                render_pass.set_pipeline(&pipelines.baked);
                draw_meshes(render_pass, &self.baked, bindings.camera, baked);
            }
            None if self.baked.iter().any(|instanced| !instanced.meshes.is_empty()) => {
                log::warn!("baked meshes skipped: the baked texture is not bound");
            }
            None => (),
        }

        render_pass.set_pipeline(&pipelines.emission);
        draw_meshes(render_pass, &self.emission, bindings.camera, bindings.emission);

        render_pass.set_pipeline(&pipelines.portal);
        draw_meshes(render_pass, &self.portal, bindings.camera, bindings.portal);

        render_pass.set_pipeline(&pipelines.fireflies);
        for fireflies in &self.fireflies {
            fireflies.draw(render_pass, bindings.camera);
        }
    }
}

fn draw_meshes(
    render_pass: &mut wgpu::RenderPass<'_>,
    batch: &[Instanced<'_>],
    camera_bind_group: &wgpu::BindGroup,
    material_bind_group: &wgpu::BindGroup,
) {
    for instanced in batch {
        for id in &instanced.meshes {
            match instanced.model.mesh(*id) {
                Some(mesh) => render_pass.draw_mesh(mesh, camera_bind_group, material_bind_group),
                None => log::warn!("mesh {:?} is not part of the model", id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::scene_graph::SceneNode;

    fn model() -> Model {
        let mut root = SceneNode::new("Scene");
        let mut baked = SceneNode::new("Baked").with_meshes(vec![MeshId(0), MeshId(1)]);
        baked.material = Material::Baked;
        let mut portal = SceneNode::new("PortalLight").with_meshes(vec![MeshId(2)]);
        portal.material = Material::PortalLight;
        let mut pole = SceneNode::new("PoleLight").with_meshes(vec![MeshId(3)]);
        pole.material = Material::Emission;
        root.add_child(baked);
        root.add_child(portal);
        root.add_child(pole);
        root.add_child(SceneNode::new("Unassigned").with_meshes(vec![MeshId(4)]));
        Model {
            root,
            meshes: Vec::new(),
        }
    }

    #[test]
    fn model_meshes_are_batched_by_material() {
        let model = model();
        let mut batches = Batches::default();
        Render::from(&model).set_pipelines(&mut batches);

        assert_eq!(batches.baked[0].meshes, vec![MeshId(0), MeshId(1)]);
        assert_eq!(batches.portal[0].meshes, vec![MeshId(2)]);
        assert_eq!(batches.emission[0].meshes, vec![MeshId(3)]);
        assert!(batches.fireflies.is_empty());
    }

    #[test]
    fn unassigned_nodes_are_not_drawn() {
        let model = model();
        let mut batches = Batches::default();
        Render::Composed(vec![Render::None, Render::from(&model)]).set_pipelines(&mut batches);

        let drawn: usize = [&batches.baked, &batches.emission, &batches.portal]
            .iter()
            .flat_map(|batch| batch.iter())
            .map(|instanced| instanced.meshes.len())
            .sum();
        assert_eq!(drawn, 4);
    }
}
