//! Perspective camera, projection and orbit controls.
//!
//! The camera looks at a target point. [`OrbitControls`] moves the camera on a
//! sphere around that target: left drag rotates, right drag pans and the mouse
//! wheel dollies. With damping enabled, input accumulates as velocity that
//! decays a little on every [`OrbitControls::update`], so the camera keeps
//! drifting after the pointer is released.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const MIN_POLAR: f32 = 0.000_001;

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, T: Into<Point3<f32>>>(position: P, target: T) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
            up: Vector3::unit_y(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Keeps the previous aspect when `aspect` is zero, negative or not finite,
    /// since `cgmath::perspective` asserts a positive ratio.
    pub fn set_aspect(&mut self, aspect: f32) -> bool {
        if !(aspect.is_finite() && aspect > 0.0) {
            log::warn!("ignoring aspect ratio {}", aspect);
            return false;
        }
        self.aspect = aspect;
        true
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fovy(&self) -> Rad<f32> {
        self.fovy
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view: Matrix4::identity().into(),
            proj: Matrix4::identity().into(),
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        let view = camera.calc_matrix();
        let proj = projection.calc_matrix();
        self.view_position = camera.position.to_homogeneous().into();
        self.view = view.into();
        self.proj = proj.into();
        self.view_proj = (proj * view).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    None,
    Rotate,
    Pan,
}

/// Spherical coordinates around the orbit target, y up.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Pointer-driven orbit camera controls with optional inertial damping.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
    drag: DragState,
    cursor: Option<PhysicalPosition<f64>>,
}

impl OrbitControls {
    pub fn new(enable_damping: bool, damping_factor: f32) -> Self {
        Self {
            enable_damping,
            damping_factor,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
            drag: DragState::None,
            cursor: None,
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Moves the camera towards the target by `factor` (< 1 zooms in).
    pub fn dolly(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// Pans by a screen-space delta in logical pixels.
    pub fn pan(&mut self, camera: &Camera, projection: &Projection, dx: f32, dy: f32, viewport_height: f32) {
        let offset = camera.position - camera.target;
        let target_distance = offset.magnitude() * (projection.fovy().0 / 2.0).tan();
        let forward = (-offset).normalize();
        let right = forward.cross(camera.up).normalize();
        let up = right.cross(forward);
        let left_distance = 2.0 * dx * target_distance / viewport_height;
        let up_distance = 2.0 * dy * target_distance / viewport_height;
        self.pan_offset += right * -left_distance + up * up_distance;
    }

    /// Rotates by a screen-space delta in logical pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        self.rotate_left(2.0 * PI * dx / viewport_height * self.rotate_speed);
        self.rotate_up(2.0 * PI * dy / viewport_height * self.rotate_speed);
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    /// Feeds pointer input into the controls.
    ///
    /// `scale_factor` converts winit's physical cursor positions into the
    /// logical pixels the rotate/pan speeds are defined in.
    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        camera: &Camera,
        projection: &Projection,
        viewport_height: f32,
        scale_factor: f64,
    ) {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (button, state) {
                    (MouseButton::Left, ElementState::Pressed) => DragState::Rotate,
                    (MouseButton::Right, ElementState::Pressed) => DragState::Pan,
                    (_, ElementState::Released) => DragState::None,
                    _ => self.drag,
                };
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(last) = self.cursor {
                    let dx = ((position.x - last.x) / scale_factor) as f32;
                    let dy = ((position.y - last.y) / scale_factor) as f32;
                    match self.drag {
                        DragState::Rotate => self.rotate(dx, dy, viewport_height),
                        DragState::Pan => self.pan(camera, projection, dx, dy, viewport_height),
                        DragState::None => (),
                    }
                }
                self.cursor = Some(*position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = DragState::None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                if scroll > 0.0 {
                    self.dolly(self.zoom_scale());
                } else if scroll < 0.0 {
                    self.dolly(1.0 / self.zoom_scale());
                }
            }
            _ => (),
        }
    }

    /// Advances the controls by one step and moves the camera.
    ///
    /// Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let offset = camera.position - camera.target;
        let mut spherical = Spherical::from_offset(offset);

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.delta_theta * factor;
        spherical.phi += self.delta_phi * factor;
        spherical.phi = spherical.phi.clamp(MIN_POLAR, PI - MIN_POLAR);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        camera.target += self.pan_offset * factor;
        let new_position = camera.target + spherical.to_offset();
        let moved = (new_position - camera.position).magnitude2() > f32::EPSILON;
        camera.position = new_position;

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vector3::new(0.0, 0.0, 0.0);
        }
        self.scale = 1.0;

        moved
    }
}

/// GPU-side camera state shared by every pipeline at bind group 0.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controls: OrbitControls,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn update_without_input_keeps_camera_still() {
        let mut camera = Camera::new((4.0, 2.0, 4.0), (0.0, 0.0, 0.0));
        let mut controls = OrbitControls::new(true, 0.05);
        assert!(!controls.update(&mut camera));
        assert!(approx(camera.position.x, 4.0));
        assert!(approx(camera.position.y, 2.0));
        assert!(approx(camera.position.z, 4.0));
    }

    #[test]
    fn rotation_preserves_distance_to_target() {
        let mut camera = Camera::new((4.0, 2.0, 4.0), (0.0, 0.0, 0.0));
        let distance = (camera.position - camera.target).magnitude();
        let mut controls = OrbitControls::new(false, 0.05);
        controls.rotate_left(0.5);
        assert!(controls.update(&mut camera));
        assert!(approx((camera.position - camera.target).magnitude(), distance));
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let mut camera = Camera::new((0.0, 0.0, 5.0), (0.0, 0.0, 0.0));
        let mut controls = OrbitControls::new(true, 0.05);
        controls.rotate_left(1.0);
        controls.update(&mut camera);
        let first = camera.position;
        assert!(controls.update(&mut camera));
        // still drifting after the input stopped
        assert!((camera.position - first).magnitude() > 0.0);
        for _ in 0..1000 {
            controls.update(&mut camera);
        }
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut camera = Camera::new((0.0, 0.0, 5.0), (0.0, 0.0, 0.0));
        let mut controls = OrbitControls::new(false, 0.05);
        controls.rotate_up(10.0);
        controls.update(&mut camera);
        assert!(camera.position.y < 5.0 + 1e-3);
        assert!(camera.position.y > 4.9);
    }

    #[test]
    fn dolly_scales_distance() {
        let mut camera = Camera::new((0.0, 0.0, 10.0), (0.0, 0.0, 0.0));
        let mut controls = OrbitControls::new(false, 0.05);
        controls.dolly(0.5);
        controls.update(&mut camera);
        assert!(approx(camera.position.z, 5.0));
    }

    #[test]
    fn projection_tracks_aspect() {
        let mut projection = Projection::new(800, 600, cgmath::Deg(45.0), 0.1, 100.0);
        assert!(projection.set_aspect(1920.0 / 1080.0));
        assert!(approx(projection.aspect(), 1920.0 / 1080.0));
    }

    #[test]
    fn degenerate_aspect_keeps_previous_projection() {
        let mut projection = Projection::new(800, 600, cgmath::Deg(45.0), 0.1, 100.0);
        assert!(!projection.set_aspect(0.0));
        assert!(!projection.set_aspect(f32::INFINITY));
        assert!(!projection.set_aspect(f32::NAN));
        assert!(approx(projection.aspect(), 800.0 / 600.0));
        // would panic inside cgmath::perspective with a zero aspect
        let _ = projection.calc_matrix();
    }

    #[test]
    fn zero_sized_projection_is_drawable() {
        let projection = Projection::new(0, 0, cgmath::Deg(45.0), 0.1, 100.0);
        assert!(approx(projection.aspect(), 1.0));
        let _ = projection.calc_matrix();
    }
}
