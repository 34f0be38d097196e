//! Scene graph of the loaded model.
//!
//! A [`SceneNode`] carries a name, a local transform, the meshes loaded for it
//! and the material it is drawn with. The tree is built once by the asset loader;
//! afterwards only material slots change.

use crate::data_structures::{
    instance::Transform,
    model::{Material, MeshId},
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub meshes: Vec<MeshId>,
    pub material: Material,
    children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_meshes(mut self, meshes: Vec<MeshId>) -> Self {
        self.meshes = meshes;
        self
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    pub fn get_children(&self) -> &Vec<SceneNode> {
        &self.children
    }

    pub fn get_children_mut(&mut self) -> &mut Vec<SceneNode> {
        &mut self.children
    }

    /// First direct child with the given name.
    pub fn find_child(&self, name: &str) -> Option<&SceneNode> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        self.children.iter_mut().find(|child| child.name == name)
    }

    /// Visits this node and all descendants, depth first, parents before children.
    pub fn traverse<'a>(&'a self, visit: &mut dyn FnMut(&'a SceneNode)) {
        visit(self);
        for child in &self.children {
            child.traverse(visit);
        }
    }

    pub fn traverse_mut(&mut self, visit: &mut dyn FnMut(&mut SceneNode)) {
        visit(self);
        for child in &mut self.children {
            child.traverse_mut(visit);
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> SceneNode {
        let mut root = SceneNode::new("Scene");
        let mut baked = SceneNode::new("Baked");
        baked.add_child(SceneNode::new("PortalLight"));
        root.add_child(baked);
        root.add_child(SceneNode::new("PoleLight"));
        root
    }

    #[test]
    fn find_child_only_looks_at_direct_children() {
        let root = tree();
        assert!(root.find_child("PoleLight").is_some());
        assert!(root.find_child("PortalLight").is_none());
    }

    #[test]
    fn traverse_visits_every_node() {
        let root = tree();
        let mut names = Vec::new();
        root.traverse(&mut |node| names.push(node.name.clone()));
        assert_eq!(names, ["Scene", "Baked", "PortalLight", "PoleLight"]);
        assert_eq!(root.node_count(), 4);
        assert_eq!(root.get_children()[0].node_count(), 2);
    }

    #[test]
    fn traverse_mut_updates_materials() {
        let mut root = tree();
        root.traverse_mut(&mut |node| node.material = Material::Baked);
        let mut all_baked = true;
        root.traverse(&mut |node| all_baked &= node.material == Material::Baked);
        assert!(all_baked);
    }
}
