//! Scene data structures: meshes, materials, textures, transforms and the scene graph.
//!
//! - `model` contains vertex layouts, GPU meshes and the material slot enum
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds node transforms and their instance-buffer layout
//! - `scene_graph` is the named node tree of the loaded model

pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
