//! Assembly of the portal scene from its two assets.
//!
//! The model and the baked texture are loaded together. Once both are available
//! every node is given the baked material and three named nodes are overridden:
//! the portal plane gets the glow shader, the two pole lights the flat emission.

use thiserror::Error;

use crate::{
    data_structures::{
        model::{Material, Model},
        scene_graph::SceneNode,
        texture::Texture,
    },
    resources::{load_model_glb, texture::load_baked_texture},
};

pub const PORTAL_LIGHT: &str = "PortalLight";
pub const POLE_LIGHT: &str = "PoleLight";
pub const POLE_LIGHT_2: &str = "PoleLight2";

/// Nodes the scene expects as direct children of the model root, with their materials.
pub const EXPECTED_NODES: [(&str, Material); 3] = [
    (PORTAL_LIGHT, Material::PortalLight),
    (POLE_LIGHT, Material::Emission),
    (POLE_LIGHT_2, Material::Emission),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("model has no node named `{0}`")]
    MissingNode(String),
    #[error("model requires unsupported extension `{0}`; export it without mesh compression")]
    UnsupportedExtension(String),
    #[error("`{0}` contains no scene")]
    MissingScene(String),
}

/// Fails with the first expected node absent from the root's direct children.
pub fn check_expected_nodes(root: &SceneNode) -> Result<(), AssetError> {
    match EXPECTED_NODES
        .iter()
        .find(|(name, _)| root.find_child(name).is_none())
    {
        Some((name, _)) => Err(AssetError::MissingNode(name.to_string())),
        None => Ok(()),
    }
}

/// Gives every node the baked material, then applies the named overrides.
///
/// The tree is left untouched when an expected node is missing.
pub fn apply_portal_materials(root: &mut SceneNode) -> Result<(), AssetError> {
    check_expected_nodes(root)?;

    root.traverse_mut(&mut |node| node.material = Material::Baked);
    for (name, material) in EXPECTED_NODES {
        if let Some(node) = root.find_child_mut(name) {
            node.material = material;
        }
    }
    Ok(())
}

/// The model with its materials assigned, and the texture the baked material samples.
#[derive(Debug)]
pub struct LoadedAssets {
    pub model: Model,
    pub baked: Texture,
}

pub async fn load_portal_assets(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    model_path: &str,
    texture_path: &str,
) -> anyhow::Result<LoadedAssets> {
    let (model, baked) = futures::join!(
        load_model_glb(model_path, device),
        load_baked_texture(texture_path, device, queue)
    );
    let mut model = model?;
    let baked = baked?;
    apply_portal_materials(&mut model.root)?;
    log::info!("portal materials assigned to {} nodes", model.root.node_count());
    Ok(LoadedAssets { model, baked })
}
