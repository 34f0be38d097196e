//! Viewport state and the resize handler.
//!
//! The viewport stores the window size in logical pixels together with the
//! device pixel ratio. Everything that depends on the window size (camera
//! aspect, render target size, fireflies sprite scaling) is derived from it in
//! [`resize_viewport`], which the event loop calls on every host resize.

use winit::dpi::{LogicalSize, PhysicalSize};

use crate::{
    camera::Projection, config::FireflyPixelRatio, pipelines::fireflies::FirefliesUniform,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
    device_pixel_ratio: f64,
    max_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64, max_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
            max_pixel_ratio,
        }
    }

    /// Builds a viewport from the physical window size winit reports.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64, max_pixel_ratio: f64) -> Self {
        let logical: LogicalSize<f64> = size.to_logical(scale_factor);
        Self::new(logical.width, logical.height, scale_factor, max_pixel_ratio)
    }

    /// Stores a new logical size and device pixel ratio.
    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) {
        self.width = width;
        self.height = height;
        self.device_pixel_ratio = device_pixel_ratio;
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }

    /// Device pixel ratio capped at the configured maximum.
    pub fn pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.min(self.max_pixel_ratio)
    }

    /// Size of the render target in physical pixels, never smaller than 1x1.
    pub fn target_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        let width = (self.width * ratio).round().max(1.0) as u32;
        let height = (self.height * ratio).round().max(1.0) as u32;
        (width, height)
    }

    /// Perspective projection matching this viewport. A zero-sized viewport, as
    /// reported by a window that starts minimised, gets a square aspect until
    /// the first real resize.
    pub fn projection<F: Into<cgmath::Rad<f32>>>(
        &self,
        fovy: F,
        znear: f32,
        zfar: f32,
    ) -> Projection {
        let (width, height) = self.target_size();
        let mut projection = Projection::new(width, height, fovy, znear, zfar);
        if !self.is_empty() {
            projection.set_aspect(self.aspect());
        }
        projection
    }

    /// The value the fireflies pixel-ratio uniform receives on resize.
    pub fn fireflies_pixel_ratio(&self, policy: FireflyPixelRatio) -> f64 {
        match policy {
            FireflyPixelRatio::Unclamped => self.device_pixel_ratio,
            FireflyPixelRatio::Clamped => self.pixel_ratio(),
        }
    }
}

/// Applies a host resize to every viewport-dependent value.
///
/// Returns the new render target size in physical pixels, or `None` when the
/// window was minimised to a zero-sized area and nothing was touched.
pub fn resize_viewport(
    viewport: &mut Viewport,
    projection: &mut Projection,
    fireflies: &mut FirefliesUniform,
    policy: FireflyPixelRatio,
    size: PhysicalSize<u32>,
    scale_factor: f64,
) -> Option<(u32, u32)> {
    if size.width == 0 || size.height == 0 {
        return None;
    }
    let logical: LogicalSize<f64> = size.to_logical(scale_factor);
    viewport.resize(logical.width, logical.height, scale_factor);

    projection.set_aspect(viewport.aspect());

    let target = viewport.target_size();
    fireflies.set_resolution(target.0, target.1);

    let uniform_ratio = viewport.fireflies_pixel_ratio(policy);
    if uniform_ratio != viewport.pixel_ratio() {
        log::warn!(
            "fireflies pixel ratio {} differs from the renderer pixel ratio {}",
            uniform_ratio,
            viewport.pixel_ratio()
        );
    }
    fireflies.pixel_ratio = uniform_ratio as f32;

    Some(target)
}
