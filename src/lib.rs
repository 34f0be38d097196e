//! portal-scene
//!
//! Renders a baked "portal" scene with wgpu on native and WASM targets: a glTF
//! model lit by a baked texture, two emissive pole lights, an animated portal
//! glow and a field of fireflies, viewed through a damped orbit camera.
//!
//! High-level modules
//! - `animation`: the per-frame tick and the clock driving the time uniforms
//! - `assets`: loading the portal model and texture, material assignment by node name
//! - `camera`: camera, projection, orbit controls and the camera uniform
//! - `config`: scene constants ([`config::SceneConfig`])
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: meshes, transforms, textures and the scene graph
//! - `debug`: debug panel visibility state
//! - `flow`: the winit event loop
//! - `particles`: procedural firefly positions and scales
//! - `pipelines`: the baked, emission, portal and fireflies pipelines
//! - `render`: render composition and batching by pipeline
//! - `resources`: file access and glTF/image decoding
//! - `viewport`: window size, pixel ratio and the resize handler
//!

pub mod animation;
pub mod assets;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod debug;
pub mod flow;
pub mod particles;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod viewport;

pub use config::{FireflyPixelRatio, SceneConfig};
pub use flow::run;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Web entry point; renders into the canvas with id `canvas`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    run(SceneConfig::default()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
