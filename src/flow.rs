//! Application event loop.
//!
//! [`App`] drives the scene with winit: it creates the window and the GPU
//! [`Context`] when the loop resumes, starts the asset load in the background and
//! then runs one [`animation::tick`] per redraw. The loaded assets arrive as a
//! [`FlowEvent`] through the event loop proxy, so frames keep being rendered
//! while they load.
//!
//! # Lifecycle
//!
//! 1. `resumed`: create window, context and scene; spawn the asset load
//! 2. `window_event`: pointer input goes to the orbit controls, resizes go to
//!    [`resize_viewport`], every redraw runs one tick
//! 3. `user_event`: the loaded model is inserted into the scene exactly once

use std::{iter, sync::Arc};

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::Key,
    window::Window,
};

use crate::{
    animation::{self, Clock, FrameTarget, TimeUniform},
    assets::{LoadedAssets, load_portal_assets},
    config::SceneConfig,
    context::Context,
    data_structures::model::Model,
    debug::DebugPanel,
    particles::FireflyField,
    pipelines::{
        baked::BakedMaterial,
        emission::{EmissionMaterial, EmissionUniform},
        fireflies::{FirefliesEffect, FirefliesUniform},
        portal::PortalEffect,
    },
    render::{Batches, Bindings, Render},
    viewport::resize_viewport,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// The portal model once loaded, with the texture its baked material samples.
#[derive(Debug)]
pub struct PortalModel {
    pub model: Model,
    pub baked: BakedMaterial,
}

/// Everything drawn each frame.
#[derive(Debug)]
pub struct Scene {
    pub portal_model: Option<PortalModel>,
    pub portal: PortalEffect,
    pub fireflies: FirefliesEffect,
    pub emission: EmissionMaterial,
    pub debug: DebugPanel,
}

impl Scene {
    fn new(ctx: &Context, config: &SceneConfig) -> Self {
        let field = FireflyField::random(config.firefly_count);
        let uniform = FirefliesUniform::new(
            ctx.viewport.pixel_ratio() as f32,
            config.firefly_size,
            ctx.viewport.target_size(),
        );
        Self {
            portal_model: None,
            portal: PortalEffect::new(&ctx.device),
            fireflies: FirefliesEffect::new(&ctx.device, field, uniform),
            emission: EmissionMaterial::new(&ctx.device, EmissionUniform::WHITE),
            debug: DebugPanel::new("Debug", config.debug_panel_width),
        }
    }

    pub fn on_render(&self) -> Render<'_> {
        let model = match &self.portal_model {
            Some(portal_model) => Render::from(&portal_model.model),
            None => Render::None,
        };
        Render::Composed(vec![model, Render::Fireflies(&self.fireflies)])
    }
}

/// Application state bundle: GPU context, scene, and surface status.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    scene: Scene,
    config: SceneConfig,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, config: SceneConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window, &config).await?;
        let scene = Scene::new(&ctx, &config);
        let is_surface_configured = !ctx.viewport.is_empty();
        Ok(Self {
            ctx,
            scene,
            config,
            is_surface_configured,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        let target = resize_viewport(
            &mut self.ctx.viewport,
            &mut self.ctx.projection,
            &mut self.scene.fireflies.uniform,
            self.config.firefly_pixel_ratio,
            size,
            scale_factor,
        );
        if let Some((width, height)) = target {
            self.ctx.configure_surface(width, height);
            self.is_surface_configured = true;
        }
    }

    /// Reconfigures the surface after it was lost, keeping the current viewport.
    fn reconfigure(&mut self) {
        if self.ctx.viewport.is_empty() {
            return;
        }
        let (width, height) = self.ctx.viewport.target_size();
        self.ctx.configure_surface(width, height);
    }

    fn insert_assets(&mut self, assets: LoadedAssets) -> anyhow::Result<()> {
        let device = &self.ctx.device;
        let inserted = insert_once(&mut self.scene.portal_model, || {
            Ok(PortalModel {
                baked: BakedMaterial::new(device, assets.baked)?,
                model: assets.model,
            })
        })?;
        if !inserted {
            log::warn!("portal model already in the scene, ignoring second load");
        }
        Ok(())
    }

    fn spawn_asset_load(
        &self,
        #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
        proxy: EventLoopProxy<FlowEvent>,
    ) {
        let device = self.ctx.device.clone();
        let queue = self.ctx.queue.clone();
        let model_path = self.config.model_path.clone();
        let texture_path = self.config.baked_texture_path.clone();
        let load = async move {
            let loaded = load_portal_assets(&device, &queue, &model_path, &texture_path).await;
            if proxy.send_event(FlowEvent::AssetsLoaded(loaded)).is_err() {
                log::warn!("event loop closed before the assets finished loading");
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        async_runtime.spawn(load);

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(load);
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        if let Key::Character(c) = &event.logical_key {
            if c.as_str().eq_ignore_ascii_case("h") {
                let visible = self.scene.debug.toggle();
                log::info!(
                    "{} panel {}",
                    self.scene.debug.title,
                    if visible { "shown" } else { "hidden" }
                );
            }
        }
    }
}

/// Fills `slot` with `make()` unless it already holds a value. `make` only runs
/// for an empty slot; returns whether it ran.
fn insert_once<T>(
    slot: &mut Option<T>,
    make: impl FnOnce() -> anyhow::Result<T>,
) -> anyhow::Result<bool> {
    if slot.is_some() {
        return Ok(false);
    }
    *slot = Some(make()?);
    Ok(true)
}

impl FrameTarget for AppState {
    fn time_uniforms(&mut self) -> Vec<&mut dyn TimeUniform> {
        vec![&mut self.scene.fireflies.uniform, &mut self.scene.portal.uniform]
    }

    fn update_controls(&mut self) {
        self.ctx
            .camera
            .controls
            .update(&mut self.ctx.camera.camera);
        self.ctx.write_camera();
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        self.scene.portal.write_to_buffer(&self.ctx.queue);
        self.scene.fireflies.write_to_buffer(&self.ctx.queue);

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut batches = Batches::default();
            self.scene.on_render().set_pipelines(&mut batches);
            let bindings = Bindings {
                camera: &self.ctx.camera.bind_group,
                baked: self
                    .scene
                    .portal_model
                    .as_ref()
                    .map(|portal_model| &portal_model.baked.bind_group),
                emission: &self.scene.emission.bind_group,
                portal: &self.scene.portal.bind_group,
            };
            batches.draw(&mut render_pass, &self.ctx.pipelines, &bindings);
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn request_next_frame(&self) {
        self.ctx.window.request_redraw();
    }
}

#[derive(Debug)]
pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized(Box<AppState>),
    AssetsLoaded(anyhow::Result<LoadedAssets>),
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent>,
    state: Option<AppState>,
    // Taken when the window is created.
    config: Option<SceneConfig>,
    clock: Clock,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
            config: Some(config),
            clock: Clock::start(),
        })
    }

    fn start(&mut self, state: AppState) {
        state.spawn_asset_load(
            #[cfg(not(target_arch = "wasm32"))]
            &self.async_runtime,
            self.proxy.clone(),
        );
        state.request_next_frame();
        self.state = Some(state);
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let config = match self.config.take() {
            Some(config) => config,
            // Already running
            None => return,
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("Portal");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("cannot create the window: {}", e);
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(AppState::new(window, config)) {
                Ok(state) => self.start(state),
                Err(e) => {
                    log::error!("cannot create the render context: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match AppState::new(window, config).await {
                    Ok(state) => {
                        if proxy
                            .send_event(FlowEvent::Initialized(Box::new(state)))
                            .is_err()
                        {
                            log::error!("event loop closed during initialisation");
                        }
                    }
                    Err(e) => log::error!("cannot create the render context: {:#}", e),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Initialized(state) => {
                let mut state = *state;
                // The canvas may have been resized while the context was created
                let size = state.ctx.window.inner_size();
                let scale_factor = state.ctx.window.scale_factor();
                state.resize(size, scale_factor);
                self.start(state);
            }
            FlowEvent::AssetsLoaded(loaded) => {
                let state = match &mut self.state {
                    Some(state) => state,
                    None => return,
                };
                match loaded.and_then(|assets| state.insert_assets(assets)) {
                    Ok(()) => log::info!("portal scene loaded"),
                    Err(e) => log::error!("cannot load the portal scene: {:#}", e),
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        let ctx = &mut state.ctx;
        ctx.camera.controls.handle_window_event(
            &event,
            &ctx.camera.camera,
            &ctx.projection,
            ctx.viewport.height() as f32,
            ctx.window.scale_factor(),
        );

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                let scale_factor = state.ctx.window.scale_factor();
                state.resize(size, scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = state.ctx.window.inner_size();
                state.resize(size, scale_factor);
            }
            WindowEvent::KeyboardInput { event, .. } => state.handle_key(&event),
            WindowEvent::RedrawRequested => match animation::tick(&self.clock, state) {
                Ok(_) => (),
                // Reconfigure the surface if it's lost or outdated
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    state.reconfigure();
                }
                Err(e) => log::error!("Unable to render {}", e),
            },
            _ => {}
        }
    }
}

pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
