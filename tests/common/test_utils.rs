use std::cell::Cell;

use portal_scene::{
    animation::{FrameTarget, TimeUniform},
    assets::{POLE_LIGHT, POLE_LIGHT_2, PORTAL_LIGHT},
    data_structures::{model::MeshId, scene_graph::SceneNode},
};

/// A scene root shaped like the exported portal model.
pub fn portal_tree() -> SceneNode {
    let mut root = SceneNode::new("Scene");
    let mut baked = SceneNode::new("Baked").with_meshes(vec![MeshId(0)]);
    baked.add_child(SceneNode::new("Lamp").with_meshes(vec![MeshId(1)]));
    baked.add_child(SceneNode::new("Fence").with_meshes(vec![MeshId(2)]));
    root.add_child(baked);
    root.add_child(SceneNode::new(PORTAL_LIGHT).with_meshes(vec![MeshId(3)]));
    root.add_child(SceneNode::new(POLE_LIGHT).with_meshes(vec![MeshId(4)]));
    root.add_child(SceneNode::new(POLE_LIGHT_2).with_meshes(vec![MeshId(5)]));
    root
}

#[derive(Default)]
pub struct Time(pub f32);

impl TimeUniform for Time {
    fn set_time(&mut self, elapsed: f32) {
        self.0 = elapsed;
    }

    fn time(&self) -> f32 {
        self.0
    }
}

/// Counts what a tick does to the frame.
#[derive(Default)]
pub struct FrameCounter {
    pub portal: Time,
    pub fireflies: Time,
    renders: usize,
    control_updates: usize,
    requests: Cell<usize>,
}

impl FrameCounter {
    pub fn renders(&self) -> usize {
        self.renders
    }

    pub fn control_updates(&self) -> usize {
        self.control_updates
    }

    pub fn requests(&self) -> usize {
        self.requests.get()
    }
}

impl FrameTarget for FrameCounter {
    fn time_uniforms(&mut self) -> Vec<&mut dyn TimeUniform> {
        vec![&mut self.portal, &mut self.fireflies]
    }

    fn update_controls(&mut self) {
        self.control_updates += 1;
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // the previous frame requested this one
        assert_eq!(self.renders, self.requests.get());
        self.renders += 1;
        Ok(())
    }

    fn request_next_frame(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}
