//! Scene configuration.
//!
//! [`SceneConfig`] collects every constant the scene is assembled from: asset
//! paths, camera placement, renderer settings and the fireflies parameters. The
//! defaults reproduce the authored scene; callers may tweak fields before handing
//! the config to [`crate::run`].

/// How the fireflies pixel-ratio uniform is refreshed on resize.
///
/// The renderer always clamps the device pixel ratio to
/// [`SceneConfig::max_pixel_ratio`]. The authored resize step writes the device
/// ratio into the fireflies uniform *without* that clamp, so on displays denser
/// than 2x the sprites grow after the first resize. `Unclamped` keeps that
/// behaviour, `Clamped` applies the renderer clamp to the uniform as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FireflyPixelRatio {
    #[default]
    Unclamped,
    Clamped,
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    /// Binary glTF holding the portal scene, relative to the assets directory.
    pub model_path: String,
    /// Baked lighting image applied to every mesh of the model.
    pub baked_texture_path: String,
    pub clear_colour: wgpu::Color,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub max_pixel_ratio: f64,
    pub firefly_count: usize,
    pub firefly_size: f32,
    pub firefly_pixel_ratio: FireflyPixelRatio,
    pub debug_panel_width: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model_path: "Portal.glb".to_string(),
            baked_texture_path: "Final-Baking.png".to_string(),
            // #201919
            clear_colour: wgpu::Color {
                r: 0x20 as f64 / 255.0,
                g: 0x19 as f64 / 255.0,
                b: 0x19 as f64 / 255.0,
                a: 1.0,
            },
            fov_y: 45.0,
            z_near: 0.1,
            z_far: 100.0,
            camera_position: [4.0, 2.0, 4.0],
            camera_target: [0.0, 0.0, 0.0],
            enable_damping: true,
            damping_factor: 0.05,
            max_pixel_ratio: 2.0,
            firefly_count: 40,
            firefly_size: 100.0,
            firefly_pixel_ratio: FireflyPixelRatio::default(),
            debug_panel_width: 400,
        }
    }
}

impl SceneConfig {
    /// Clear colour as the linear value an sRGB surface expects.
    pub fn linear_clear_colour(&self) -> wgpu::Color {
        let c = self.clear_colour;
        wgpu::Color {
            r: srgb_to_linear(c.r),
            g: srgb_to_linear(c.g),
            b: srgb_to_linear(c.b),
            a: c.a,
        }
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_authored_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.firefly_count, 40);
        assert_eq!(config.firefly_size, 100.0);
        assert_eq!(config.max_pixel_ratio, 2.0);
        assert_eq!(config.camera_position, [4.0, 2.0, 4.0]);
        assert_eq!(config.firefly_pixel_ratio, FireflyPixelRatio::Unclamped);
        assert!((config.clear_colour.r - 32.0 / 255.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clear_colour_is_linearised_for_srgb_surfaces() {
        let linear = SceneConfig::default().linear_clear_colour();
        assert!(linear.r < 32.0 / 255.0);
        assert!(linear.r > linear.g);
        assert_eq!(linear.a, 1.0);
    }
}
