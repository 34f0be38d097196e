use portal_scene::{
    assets::{AssetError, EXPECTED_NODES, POLE_LIGHT_2, apply_portal_materials},
    data_structures::{model::Material, scene_graph::SceneNode},
};

use crate::common::test_utils::portal_tree;

mod common;

#[test]
fn exactly_three_nodes_are_overridden() {
    let mut root = portal_tree();
    apply_portal_materials(&mut root).unwrap();

    let mut overridden = Vec::new();
    let mut baked = 0;
    root.traverse(&mut |node| match node.material {
        Material::Baked => baked += 1,
        Material::Unassigned => panic!("{} has no material", node.name),
        _ => overridden.push((node.name.clone(), node.material)),
    });

    assert_eq!(overridden.len(), 3);
    for (name, material) in EXPECTED_NODES {
        assert!(overridden.contains(&(name.to_string(), material)));
    }
    assert_eq!(baked, root.node_count() - 3);
}

#[test]
fn assignment_is_stable_when_applied_twice() {
    let mut once = portal_tree();
    apply_portal_materials(&mut once).unwrap();
    let mut twice = once.clone();
    apply_portal_materials(&mut twice).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn missing_pole_light_is_reported_by_name() {
    let mut root = portal_tree();
    root.get_children_mut().retain(|node| node.name != POLE_LIGHT_2);

    assert_eq!(
        apply_portal_materials(&mut root),
        Err(AssetError::MissingNode(POLE_LIGHT_2.to_string()))
    );
}

#[test]
fn empty_scene_misses_the_portal_first() {
    let mut root = SceneNode::new("Scene");
    let err = apply_portal_materials(&mut root).unwrap_err();
    assert_eq!(err.to_string(), "model has no node named `PortalLight`");
}
