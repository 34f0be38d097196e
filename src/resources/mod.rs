use anyhow::Context as _;

use crate::{
    assets::AssetError,
    data_structures::{
        instance::Transform,
        model::{MeshId, Model},
        scene_graph::SceneNode,
    },
};

/**
 * This module contains all logic for loading meshes and textures from external files.
 *
 * Natively files are read from `./assets/`, on the web they are fetched from
 * `<origin>/assets/`.
 *
 * glTF loading runs in two steps: [`build_scene`] turns the document into a
 * [`SceneNode`] tree and a list of primitives to upload without touching the
 * GPU, then [`mesh::upload_primitives`] creates the buffers.
 */
pub mod mesh;
pub mod texture;

/// Mesh compression the loader cannot decode.
pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no browser window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("cannot read page origin: {:?}", e))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))?
    };

    Ok(data)
}

/// A primitive picked for upload: where it lives in the document and the world
/// transform of the node that owns it. Its position in the list is its [`MeshId`].
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveRef {
    pub mesh: usize,
    pub primitive: usize,
    pub label: String,
    pub world: Transform,
}

/// The node tree of a glTF scene and the primitives its nodes refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    pub root: SceneNode,
    pub primitives: Vec<PrimitiveRef>,
}

/// Parses binary (or JSON) glTF and rejects documents the loader cannot draw.
pub fn parse_gltf(bytes: &[u8], file_name: &str) -> anyhow::Result<gltf::Gltf> {
    let gltf = gltf::Gltf::from_slice_without_validation(bytes)
        .with_context(|| format!("{} is not a glTF file", file_name))?;

    if let Some(ext) = gltf
        .document
        .extensions_required()
        .find(|ext| *ext == DRACO_EXTENSION)
    {
        return Err(AssetError::UnsupportedExtension(ext.to_string()).into());
    }
    Ok(gltf)
}

/// Walks the default scene (or the first one) into a [`SceneNode`] tree.
///
/// The root node is named after the scene; its top-level nodes become the root's
/// direct children. Every node keeps its glTF name and local transform. Only
/// triangle primitives with positions are kept; materials in the file are
/// ignored, they are assigned by name afterwards.
pub fn build_scene(
    document: &gltf::Document,
    file_name: &str,
) -> Result<SceneLayout, AssetError> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::MissingScene(file_name.to_string()))?;

    let mut primitives = Vec::new();
    let mut root = SceneNode::new(scene.name().unwrap_or("Scene"));
    let identity = Transform::default();
    for node in scene.nodes() {
        root.add_child(to_scene_node(node, &identity, &mut primitives));
    }
    Ok(SceneLayout { root, primitives })
}

fn to_scene_node(
    node: gltf::Node,
    parent_world: &Transform,
    primitives: &mut Vec<PrimitiveRef>,
) -> SceneNode {
    let (translation, [x, y, z, w], scale) = node.transform().decomposed();
    let local = Transform {
        position: translation.into(),
        rotation: cgmath::Quaternion::new(w, x, y, z),
        scale: scale.into(),
    };
    let world = parent_world * &local;

    let name = node.name().unwrap_or_default();
    let mut mesh_ids = Vec::new();
    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "skipping primitive {} of {}: mode {:?} is not supported",
                    primitive.index(),
                    name,
                    primitive.mode()
                );
                continue;
            }
            if primitive.get(&gltf::Semantic::Positions).is_none() {
                log::warn!("primitive {} of {} has no positions", primitive.index(), name);
                continue;
            }
            mesh_ids.push(MeshId(primitives.len()));
            primitives.push(PrimitiveRef {
                mesh: mesh.index(),
                primitive: primitive.index(),
                label: mesh.name().unwrap_or(name).to_string(),
                world: world.clone(),
            });
        }
    }

    let mut scene_node = SceneNode::new(name).with_meshes(mesh_ids);
    scene_node.transform = local;
    for child in node.children() {
        scene_node.add_child(to_scene_node(child, &world, primitives));
    }
    scene_node
}

async fn load_buffers(
    document: &gltf::Document,
    blob: Option<Vec<u8>>,
    file_name: &str,
) -> anyhow::Result<Vec<Vec<u8>>> {
    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in document.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = blob
                    .clone()
                    .with_context(|| format!("{} references a missing binary chunk", file_name))?;
                buffer_data.push(blob);
            }
            gltf::buffer::Source::Uri(uri) => {
                buffer_data.push(load_binary(uri).await?);
            }
        }
    }
    Ok(buffer_data)
}

/// Loads a binary glTF file into a [`Model`].
pub async fn load_model_glb(file_name: &str, device: &wgpu::Device) -> anyhow::Result<Model> {
    let bytes = load_binary(file_name).await?;
    let gltf::Gltf { document, blob } = parse_gltf(&bytes, file_name)?;
    let SceneLayout { root, primitives } = build_scene(&document, file_name)?;
    let buffers = load_buffers(&document, blob, file_name).await?;
    let meshes = mesh::upload_primitives(&document, &buffers, &primitives, device)?;
    log::info!(
        "loaded {}: {} nodes, {} meshes",
        file_name,
        root.node_count(),
        meshes.len()
    );

    Ok(Model { root, meshes })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wraps a JSON document into a GLB container without a binary chunk.
    fn glb(json: &str) -> Vec<u8> {
        let mut chunk = json.as_bytes().to_vec();
        while chunk.len() % 4 != 0 {
            chunk.push(b' ');
        }
        let total = 12 + 8 + chunk.len() as u32;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"glTF");
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&total.to_le_bytes());
        bytes.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
        bytes.extend_from_slice(b"JSON");
        bytes.extend_from_slice(&chunk);
        bytes
    }

    const MESH_PARTS: &str = r#"
        "buffers": [{ "byteLength": 36 }],
        "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
        "accessors": [{
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0, 0, 0], "max": [1, 1, 0]
        }],
        "meshes": [{ "name": "PortalPlane", "primitives": [
            { "attributes": { "POSITION": 0 } },
            { "attributes": { "POSITION": 0 }, "mode": 1 }
        ] }]
    "#;

    fn portal_document() -> String {
        format!(
            r#"{{
                "asset": {{ "version": "2.0" }},
                "scene": 0,
                "scenes": [{{ "name": "Scene", "nodes": [0, 1, 2, 3] }}],
                "nodes": [
                    {{ "name": "Baked", "children": [4] }},
                    {{ "name": "PortalLight", "mesh": 0, "translation": [0, 1, 0] }},
                    {{ "name": "PoleLight" }},
                    {{ "name": "PoleLight2" }},
                    {{ "name": "Lamp", "translation": [2, 0, 0], "children": [5] }},
                    {{ "name": "Bulb", "mesh": 0, "translation": [0, 3, 0] }}
                ],
                {}
            }}"#,
            MESH_PARTS
        )
    }

    #[test]
    fn draco_models_are_rejected() {
        let bytes = glb(r#"{
            "asset": { "version": "2.0" },
            "extensionsUsed": ["KHR_draco_mesh_compression"],
            "extensionsRequired": ["KHR_draco_mesh_compression"],
            "scenes": [{ "nodes": [] }]
        }"#);
        let Err(err) = parse_gltf(&bytes, "Portal.glb") else {
            panic!("compressed model was accepted");
        };
        assert_eq!(
            err.downcast_ref::<AssetError>(),
            Some(&AssetError::UnsupportedExtension(DRACO_EXTENSION.to_string()))
        );
    }

    #[test]
    fn optional_draco_is_accepted() {
        let bytes = glb(r#"{
            "asset": { "version": "2.0" },
            "extensionsUsed": ["KHR_draco_mesh_compression"],
            "scenes": [{ "nodes": [] }]
        }"#);
        assert!(parse_gltf(&bytes, "Portal.glb").is_ok());
    }

    #[test]
    fn garbage_is_not_gltf() {
        assert!(parse_gltf(b"not a model", "Portal.glb").is_err());
    }

    #[test]
    fn document_without_scene_is_reported() {
        let bytes = glb(r#"{ "asset": { "version": "2.0" }, "nodes": [{ "name": "Orphan" }] }"#);
        let gltf = parse_gltf(&bytes, "Portal.glb").unwrap();
        assert_eq!(
            build_scene(&gltf.document, "Portal.glb"),
            Err(AssetError::MissingScene("Portal.glb".to_string()))
        );
    }

    #[test]
    fn top_level_nodes_become_direct_children() {
        let gltf = parse_gltf(&glb(&portal_document()), "Portal.glb").unwrap();
        let layout = build_scene(&gltf.document, "Portal.glb").unwrap();

        assert_eq!(layout.root.name, "Scene");
        let names: Vec<&str> = layout
            .root
            .get_children()
            .iter()
            .map(|node| node.name.as_str())
            .collect();
        assert_eq!(names, ["Baked", "PortalLight", "PoleLight", "PoleLight2"]);
        assert!(layout.root.find_child("Lamp").is_none());
        assert_eq!(layout.root.node_count(), 7);
        assert!(crate::assets::check_expected_nodes(&layout.root).is_ok());
    }

    #[test]
    fn only_triangle_primitives_are_recorded() {
        let gltf = parse_gltf(&glb(&portal_document()), "Portal.glb").unwrap();
        let layout = build_scene(&gltf.document, "Portal.glb").unwrap();

        // one triangle primitive per mesh instance, the line primitive is skipped
        assert_eq!(layout.primitives.len(), 2);
        let portal = layout.root.find_child("PortalLight").unwrap();
        assert_eq!(portal.meshes, vec![MeshId(0)]);
        assert_eq!(layout.primitives[0].mesh, 0);
        assert_eq!(layout.primitives[0].primitive, 0);
        assert_eq!(layout.primitives[0].label, "PortalPlane");
    }

    #[test]
    fn world_transforms_compose_down_the_tree() {
        let gltf = parse_gltf(&glb(&portal_document()), "Portal.glb").unwrap();
        let layout = build_scene(&gltf.document, "Portal.glb").unwrap();

        let bulb = &layout.primitives[1];
        assert_eq!(bulb.world.position, cgmath::Vector3::new(2.0, 3.0, 0.0));
        let lamp = &layout.root.find_child("Baked").unwrap().get_children()[0];
        assert_eq!(lamp.name, "Lamp");
        assert_eq!(lamp.get_children()[0].meshes, vec![MeshId(1)]);
    }

    #[test]
    fn nested_expected_nodes_do_not_count() {
        let json = r#"{
            "asset": { "version": "2.0" },
            "scenes": [{ "nodes": [0, 2, 3] }],
            "nodes": [
                { "name": "Group", "children": [1] },
                { "name": "PortalLight" },
                { "name": "PoleLight" },
                { "name": "PoleLight2" }
            ]
        }"#;
        let gltf = parse_gltf(&glb(json), "Portal.glb").unwrap();
        let layout = build_scene(&gltf.document, "Portal.glb").unwrap();
        assert_eq!(
            crate::assets::check_expected_nodes(&layout.root),
            Err(AssetError::MissingNode("PortalLight".to_string()))
        );
    }
}
