use portal_scene::{
    FireflyPixelRatio,
    camera::Projection,
    pipelines::fireflies::FirefliesUniform,
    viewport::{Viewport, resize_viewport},
};
use winit::dpi::PhysicalSize;

fn setup(dpr: f64) -> (Viewport, Projection, FirefliesUniform) {
    let viewport = Viewport::new(800.0, 600.0, dpr, 2.0);
    let (w, h) = viewport.target_size();
    let projection = Projection::new(w, h, cgmath::Deg(45.0), 0.1, 100.0);
    let fireflies = FirefliesUniform::new(viewport.pixel_ratio() as f32, 100.0, (w, h));
    (viewport, projection, fireflies)
}

#[test]
fn resize_updates_aspect_and_target() {
    let (mut viewport, mut projection, mut fireflies) = setup(1.0);

    let target = resize_viewport(
        &mut viewport,
        &mut projection,
        &mut fireflies,
        FireflyPixelRatio::Unclamped,
        PhysicalSize::new(1920, 1080),
        1.0,
    );

    assert_eq!(target, Some((1920, 1080)));
    assert!((projection.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
    assert_eq!(fireflies.resolution, [1920.0, 1080.0]);
}

#[test]
fn dense_displays_render_at_twice_the_logical_size() {
    let (mut viewport, mut projection, mut fireflies) = setup(3.0);

    // 1000x500 logical at 3x
    let target = resize_viewport(
        &mut viewport,
        &mut projection,
        &mut fireflies,
        FireflyPixelRatio::Clamped,
        PhysicalSize::new(3000, 1500),
        3.0,
    );

    assert_eq!(target, Some((2000, 1000)));
    assert!((projection.aspect() - 2.0).abs() < 1e-6);
    assert_eq!(fireflies.pixel_ratio, 2.0);
}

#[test]
fn unclamped_policy_keeps_device_ratio() {
    let (mut viewport, mut projection, mut fireflies) = setup(3.0);
    assert_eq!(fireflies.pixel_ratio, 2.0);

    resize_viewport(
        &mut viewport,
        &mut projection,
        &mut fireflies,
        FireflyPixelRatio::Unclamped,
        PhysicalSize::new(3000, 1500),
        3.0,
    );

    assert_eq!(fireflies.pixel_ratio, 3.0);
    assert_eq!(viewport.pixel_ratio(), 2.0);
}

#[test]
fn resizing_twice_changes_nothing() {
    let (mut viewport, mut projection, mut fireflies) = setup(2.0);
    let size = PhysicalSize::new(1280, 720);

    let first = resize_viewport(
        &mut viewport,
        &mut projection,
        &mut fireflies,
        FireflyPixelRatio::Unclamped,
        size,
        2.0,
    );
    let after_first = (viewport, projection.clone(), fireflies);
    let second = resize_viewport(
        &mut viewport,
        &mut projection,
        &mut fireflies,
        FireflyPixelRatio::Unclamped,
        size,
        2.0,
    );

    assert_eq!(first, second);
    assert_eq!(after_first, (viewport, projection, fireflies));
}

#[test]
fn minimised_window_is_ignored() {
    let (mut viewport, mut projection, mut fireflies) = setup(1.0);
    let before = (viewport, projection.clone(), fireflies);

    let target = resize_viewport(
        &mut viewport,
        &mut projection,
        &mut fireflies,
        FireflyPixelRatio::Unclamped,
        PhysicalSize::new(0, 600),
        1.0,
    );

    assert_eq!(target, None);
    assert_eq!(before, (viewport, projection, fireflies));
}

#[test]
fn window_created_minimised_still_has_a_drawable_projection() {
    let viewport = Viewport::new(0.0, 600.0, 1.0, 2.0);
    assert!(viewport.is_empty());

    let projection = viewport.projection(cgmath::Deg(45.0), 0.1, 100.0);
    assert!(projection.aspect().is_finite());
    assert!(projection.aspect() > 0.0);
    let _ = projection.calc_matrix();
}

#[test]
fn first_resize_after_minimised_start_sets_the_aspect() {
    let mut viewport = Viewport::new(0.0, 0.0, 1.0, 2.0);
    let mut projection = viewport.projection(cgmath::Deg(45.0), 0.1, 100.0);
    let mut fireflies = FirefliesUniform::new(1.0, 100.0, viewport.target_size());

    let target = resize_viewport(
        &mut viewport,
        &mut projection,
        &mut fireflies,
        FireflyPixelRatio::Unclamped,
        PhysicalSize::new(1600, 800),
        1.0,
    );

    assert_eq!(target, Some((1600, 800)));
    assert!((projection.aspect() - 2.0).abs() < 1e-6);
}
