//! The per-frame update cycle.
//!
//! [`tick`] is run once for every redraw the window delivers: it advances the
//! time uniforms, steps the orbit controls, renders and asks for the next
//! redraw. The pieces it drives sit behind [`FrameTarget`] so the cycle can be
//! exercised without a window or GPU.

use instant::Instant;

/// Monotonic elapsed time since the scene started.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since [`Clock::start`].
    pub fn elapsed_time(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::start()
    }
}

/// A shader uniform block carrying the animation time.
pub trait TimeUniform {
    fn set_time(&mut self, elapsed: f32);
    fn time(&self) -> f32;
}

/// What a frame acts upon.
pub trait FrameTarget {
    /// Every time-driven uniform of the scene.
    fn time_uniforms(&mut self) -> Vec<&mut dyn TimeUniform>;
    /// Advances control damping by one step.
    fn update_controls(&mut self);
    fn render(&mut self) -> Result<(), wgpu::SurfaceError>;
    fn request_next_frame(&self);
}

/// Runs one frame and returns the time written to the uniforms.
pub fn tick<T: FrameTarget + ?Sized>(
    clock: &Clock,
    target: &mut T,
) -> Result<f32, wgpu::SurfaceError> {
    let elapsed = clock.elapsed_time();
    for uniform in target.time_uniforms() {
        uniform.set_time(elapsed);
    }
    target.update_controls();
    let rendered = target.render();
    target.request_next_frame();
    rendered.map(|_| elapsed)
}
