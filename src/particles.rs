//! Procedural point cloud for the fireflies effect.
//!
//! Points are scattered uniformly in a box that is 4 units wide and deep and 2
//! units tall, resting on the ground plane and centred on the origin. Each point
//! also gets an independent scale in [0, 1) that the shader uses for sprite size
//! and bobbing amplitude.

use rand::Rng;

pub const DEFAULT_FIREFLY_COUNT: usize = 40;

/// Horizontal extent of the scatter box (x and z).
const SPREAD_XZ: f32 = 4.0;
/// Vertical extent of the scatter box (y).
const SPREAD_Y: f32 = 2.0;

/// Per-instance data of one firefly as laid out on the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FireflyRaw {
    pub position: [f32; 3],
    pub scale: f32,
}

impl FireflyRaw {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<FireflyRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}

/// The fireflies point cloud: flattened xyz positions and one scale per point.
///
/// Generated once at startup and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FireflyField {
    positions: Vec<f32>,
    scales: Vec<f32>,
}

impl FireflyField {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Self {
        let mut positions = Vec::with_capacity(count * 3);
        let mut scales = Vec::with_capacity(count);
        for _ in 0..count {
            positions.push((rng.r#gen::<f32>() - 0.5) * SPREAD_XZ);
            positions.push(rng.r#gen::<f32>() * SPREAD_Y);
            positions.push((rng.r#gen::<f32>() - 0.5) * SPREAD_XZ);
            scales.push(rng.r#gen::<f32>());
        }
        Self { positions, scales }
    }

    /// Generates a field from the thread-local RNG; different on every run.
    pub fn random(count: usize) -> Self {
        Self::generate(&mut rand::thread_rng(), count)
    }

    pub fn len(&self) -> usize {
        self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    pub fn position(&self, idx: usize) -> Option<[f32; 3]> {
        self.positions
            .get(idx * 3..idx * 3 + 3)
            .map(|p| [p[0], p[1], p[2]])
    }

    /// Interleaves positions and scales into the GPU instance layout.
    pub fn to_raw(&self) -> Vec<FireflyRaw> {
        self.positions
            .chunks_exact(3)
            .zip(self.scales.iter())
            .map(|(p, &scale)| FireflyRaw {
                position: [p[0], p[1], p[2]],
                scale,
            })
            .collect()
    }
}
