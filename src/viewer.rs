//! The viewer window and its per-frame logic.
//!
//! [`ViewerState`] holds everything that decides what a frame shows: toggles,
//! the orbit controller, lights, the gradient background updater and the model
//! status. It has no GPU handles so it is tested directly. The winit
//! [`ApplicationHandler`] below owns the window and GPU resources and feeds
//! the state one frame at a time.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::assets::{Assets, FontId};
use crate::background::{BackgroundUpdate, GradientBackground, SceneBackground};
use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::draw2d::Draw2d;
use crate::error::ViewerError;
use crate::geometry::ModelData;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::lighting::Lighting;
use crate::loader::{LoadEvent, ModelLoader};
use crate::mesh::{Mesh, Transform};
use crate::mesh_pass::{DrawCall, MeshPass};
use crate::orbit_camera::OrbitCamera;
use crate::texture::Texture;
use crate::toggles::{Toggle, ToggleChange, ViewerToggles};
use crate::ui::{Color, Toolbar, draw_status};

/// Side length of the light helper square.
const HELPER_SIZE: f32 = 1.0;

const SHORTCUTS: [(KeyCode, Toggle); 4] = [
    (KeyCode::KeyR, Toggle::AutoRotate),
    (KeyCode::KeyO, Toggle::OrbitControls),
    (KeyCode::KeyL, Toggle::LightHelpers),
    (KeyCode::KeyG, Toggle::GradientBackground),
];

/// Where the model load stands.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelStatus {
    Loading { progress: f32 },
    Loaded { triangles: usize },
    Failed(String),
}

impl ModelStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelStatus::Loaded { .. })
    }
}

/// What a frame should render.
#[derive(Debug)]
pub struct FrameOutput {
    pub camera: Camera,
    /// A new background to install, replacing the previous one.
    pub background: Option<BackgroundUpdate>,
}

/// GPU-free viewer state.
#[derive(Debug)]
pub struct ViewerState {
    toggles: ViewerToggles,
    pub orbit: OrbitCamera,
    pub lighting: Lighting,
    pub background: GradientBackground,
    pub toolbar: Toolbar,
    status: ModelStatus,
    logged_percent: Option<u32>,
}

impl ViewerState {
    pub fn new(config: &ViewerConfig) -> Self {
        let orbit = OrbitCamera::looking_from(config.camera_position, config.camera_target)
            .fov(config.fov)
            .clip(config.near, config.far)
            .auto_rotate_speed(config.auto_rotate_speed);

        let mut state = Self {
            toggles: config.toggles.normalized(),
            orbit,
            lighting: config.lighting.clone(),
            background: GradientBackground::new(config.background_size),
            toolbar: Toolbar::new(),
            status: ModelStatus::Loading { progress: 0.0 },
            logged_percent: None,
        };
        state.sync();
        state
    }

    pub fn toggles(&self) -> &ViewerToggles {
        &self.toggles
    }

    pub fn status(&self) -> &ModelStatus {
        &self.status
    }

    /// Flip a toggle as if its button was clicked.
    pub fn flip(&mut self, toggle: Toggle) -> Vec<ToggleChange> {
        let changes = self.toggles.flip(toggle);
        self.after_change(&changes);
        changes
    }

    pub fn set(&mut self, toggle: Toggle, enabled: bool) -> Vec<ToggleChange> {
        let changes = self.toggles.set(toggle, enabled);
        self.after_change(&changes);
        changes
    }

    fn after_change(&mut self, changes: &[ToggleChange]) {
        for change in changes {
            log::debug!(
                "{} {}",
                change.toggle.label(),
                if change.enabled { "on" } else { "off" }
            );
        }
        self.sync();
    }

    /// Push toggle values into the components they control.
    fn sync(&mut self) {
        self.orbit.auto_rotate = self.toggles.auto_rotate;
        self.orbit.enabled = self.toggles.orbit_enabled;
        self.background.set_enabled(self.toggles.gradient_background);
    }

    /// Mark the load as failed without a loader event, e.g. when the loader
    /// thread could not be started.
    pub fn fail_load(&mut self, message: impl Into<String>) {
        self.status = ModelStatus::Failed(message.into());
    }

    /// Fold a loader event into the status. Returns the model when it is
    /// ready to upload.
    pub fn on_load_event(&mut self, event: LoadEvent, path: &Path) -> Option<ModelData> {
        match event {
            LoadEvent::Progress(ratio) => {
                let percent = (ratio.clamp(0.0, 1.0) * 100.0).round() as u32;
                if self.logged_percent != Some(percent) {
                    log::info!("{percent}% loaded");
                    self.logged_percent = Some(percent);
                }
                self.status = ModelStatus::Loading { progress: ratio };
                None
            }
            LoadEvent::Loaded(model) => {
                log::info!(
                    "loaded {} ({} vertices, {} triangles)",
                    path.display(),
                    model.vertex_count(),
                    model.triangle_count()
                );
                self.status = ModelStatus::Loaded {
                    triangles: model.triangle_count(),
                };
                Some(model)
            }
            LoadEvent::Failed(e) => {
                log::error!("failed to load {}: {e}", path.display());
                self.status = ModelStatus::Failed(e.to_string());
                None
            }
        }
    }

    /// Button under the cursor, if any.
    pub fn hovered(&self, input: &Input) -> Option<Toggle> {
        self.toolbar.hit(input.mouse_position())
    }

    /// Apply toolbar clicks and keyboard shortcuts. The pointer is captured
    /// while it is over the toolbar so the orbit controller ignores it.
    pub fn route_input(&mut self, input: &mut Input) -> Vec<ToggleChange> {
        let mut changes = Vec::new();

        if let Some(toggle) = self.hovered(input) {
            input.capture_pointer();
            if input.mouse_pressed(MouseButton::Left) {
                changes.extend(self.flip(toggle));
            }
        }

        for (key, toggle) in SHORTCUTS {
            if input.key_pressed(key) {
                changes.extend(self.flip(toggle));
            }
        }

        changes
    }

    /// Advance the camera and run the background update.
    pub fn update(&mut self, input: &Input, dt: f32) -> FrameOutput {
        self.orbit.update(input, dt);
        let camera = self.orbit.camera();
        let background = self
            .background
            .update(self.status.is_loaded(), camera.view_direction());
        FrameOutput { camera, background }
    }

    /// One line describing the load or the active background face.
    pub fn status_line(&self) -> String {
        match &self.status {
            ModelStatus::Loading { progress } => {
                format!("Loading model... {:.0}%", progress * 100.0)
            }
            ModelStatus::Failed(message) => format!("Model failed to load: {message}"),
            ModelStatus::Loaded { triangles } => match self.background.last_face() {
                Some(face) if self.background.is_enabled() => {
                    format!("{triangles} triangles | background: {face}")
                }
                _ => format!("{triangles} triangles"),
            },
        }
    }
}

/// Open the viewer window and run until it is closed.
pub fn run(config: ViewerConfig) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        ViewerApp::Failed(e) => Err(e),
        _ => Ok(()),
    }
}

enum ViewerApp {
    Pending { config: ViewerConfig },
    Running(Box<Running>),
    Failed(ViewerError),
    Exited,
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    assets: Assets,
    font: Option<FontId>,
    draw_2d: Draw2d,
    mesh_pass: MeshPass,
    helper_mesh: Mesh,
    model: Vec<(Mesh, Color)>,
    scene_background: SceneBackground,
    input: Input,
    state: ViewerState,
    loader: Option<ModelLoader>,
    last_frame: Instant,
}

impl Running {
    fn new(event_loop: &ActiveEventLoop, config: &ViewerConfig) -> Result<Self, ViewerError> {
        let attributes = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let gpu = GpuContext::new(window.clone())?;
        let mut assets = Assets::new();
        let font = assets.load_overlay_font(&gpu, config.font_path.as_deref(), config.font_size);
        let draw_2d = Draw2d::new(&gpu);
        let mesh_pass = MeshPass::new(&gpu);
        let helper_mesh = Mesh::cube(&gpu);

        let mut state = ViewerState::new(config);
        state
            .background
            .limit_texture_size(gpu.device.limits().max_texture_dimension_2d);
        log::info!("loading {}", config.model_path.display());
        let loader = match ModelLoader::spawn(&config.model_path, config.load_options) {
            Ok(loader) => Some(loader),
            Err(e) => {
                log::error!("could not start model loader: {e}");
                state.fail_load(e.to_string());
                None
            }
        };

        Ok(Self {
            window,
            gpu,
            assets,
            font,
            draw_2d,
            mesh_pass,
            helper_mesh,
            model: Vec::new(),
            scene_background: SceneBackground::Color(config.clear_color),
            input: Input::new(),
            state,
            loader,
            last_frame: Instant::now(),
        })
    }

    fn poll_loader(&mut self) {
        let Some(loader) = self.loader.as_mut() else {
            return;
        };

        for event in loader.poll() {
            if let Some(model) = self.state.on_load_event(event, loader.path()) {
                self.model = model
                    .parts
                    .iter()
                    .map(|part| (Mesh::from_geometry(&self.gpu, &part.geometry), part.color))
                    .collect();
            }
        }

        if loader.is_finished() {
            self.loader = None;
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        self.poll_loader();
        self.state.route_input(&mut self.input);

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let output = self.state.update(&self.input, dt);
        if let Some(update) = output.background {
            let texture = Texture::from_image(&self.gpu, &update.image, "Gradient Background");
            self.scene_background = SceneBackground::Gradient {
                face: update.face,
                texture,
            };
        }

        self.draw_2d.clear();
        self.draw_2d.update_font_bind_groups(&self.gpu, &self.assets);
        let hovered = self.state.hovered(&self.input);
        self.state.toolbar.draw(
            &mut self.draw_2d,
            &self.assets,
            self.font,
            self.state.toggles(),
            hovered,
        );
        draw_status(
            &mut self.draw_2d,
            &self.assets,
            self.font,
            self.gpu.height() as f32,
            &self.state.status_line(),
        );

        match self.render(&output.camera) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("skipping frame: {e}"),
        }

        self.input.begin_frame();
        self.window.request_redraw();
    }

    fn render(&mut self, camera: &Camera) -> Result<(), wgpu::SurfaceError> {
        let frame = self.gpu.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.mesh_pass.ensure_depth_size(&self.gpu);
        let lights = self.state.lighting.uniforms();
        let calls = draw_calls(&self.model, &self.helper_mesh, &self.state);
        self.mesh_pass.prepare(&self.gpu, camera, &lights, &calls);

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Background Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.scene_background.clear_color().to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let SceneBackground::Gradient { texture, .. } = &self.scene_background {
                self.mesh_pass.blit(&self.gpu, &mut pass, texture);
            }
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mesh Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.mesh_pass.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.mesh_pass.render(&mut pass, &calls);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.draw_2d.render(&self.gpu, &mut pass);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        frame.present();
        Ok(())
    }
}

/// Model parts first, then the unlit light helpers when they are visible.
fn draw_calls<'a>(
    model: &'a [(Mesh, Color)],
    helper_mesh: &'a Mesh,
    state: &ViewerState,
) -> Vec<DrawCall<'a>> {
    let mut calls: Vec<DrawCall> = model
        .iter()
        .map(|(mesh, color)| DrawCall {
            mesh,
            transform: Transform::new(),
            color: *color,
            unlit: false,
        })
        .collect();

    if state.toggles().light_helpers_visible {
        for light in &state.lighting.directional {
            for transform in light.helper_transforms(HELPER_SIZE) {
                calls.push(DrawCall {
                    mesh: helper_mesh,
                    transform,
                    color: light.color,
                    unlit: true,
                });
            }
        }
    }

    calls
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let ViewerApp::Pending { config } = self else {
            return;
        };

        *self = match Running::new(event_loop, config) {
            Ok(running) => {
                running.window.request_redraw();
                ViewerApp::Running(Box::new(running))
            }
            Err(e) => {
                log::error!("{e}");
                event_loop.exit();
                ViewerApp::Failed(e)
            }
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let ViewerApp::Running(running) = self else {
            return;
        };

        running.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                running.gpu.resize(size.width, size.height);
                running.window.request_redraw();
            }
            WindowEvent::RedrawRequested => running.frame(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let ViewerApp::Running(_) = self {
            // Dropping the running state releases the surface, GPU resources
            // and the window.
            *self = ViewerApp::Exited;
            log::info!("viewer closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GeometryError, ModelData};
    use crate::gradient::{gradient_for, synthesize};
    use crate::orientation::Face;
    use glam::Vec2;
    use std::f32::consts::PI;

    fn state() -> ViewerState {
        ViewerState::new(&ViewerConfig::new().background_size(32))
    }

    fn loaded_state() -> ViewerState {
        let mut state = state();
        state.on_load_event(LoadEvent::Loaded(ModelData::default()), Path::new("m.glb"));
        state
    }

    #[test]
    fn initial_toggles_are_pushed_into_components() {
        let state = ViewerState::new(&ViewerConfig::new().auto_rotate(true).orbit_controls(false));
        assert!(state.orbit.auto_rotate);
        assert!(!state.orbit.enabled);
        assert!(!state.background.is_enabled());
    }

    #[test]
    fn conflicting_initial_toggles_prefer_gradient() {
        let state = ViewerState::new(&ViewerConfig::new().auto_rotate(true).gradient_background(true));
        assert!(!state.orbit.auto_rotate);
        assert!(state.background.is_enabled());
    }

    #[test]
    fn enabling_gradient_stops_auto_rotate() {
        let mut state = state();
        state.flip(Toggle::AutoRotate);
        assert!(state.orbit.auto_rotate);

        let changes = state.flip(Toggle::GradientBackground);
        assert_eq!(changes.len(), 2);
        assert!(state.background.is_enabled());
        assert!(!state.toggles().auto_rotate);
        assert!(!state.orbit.auto_rotate);
    }

    #[test]
    fn enabling_auto_rotate_stops_gradient() {
        let mut state = state();
        state.set(Toggle::GradientBackground, true);
        state.set(Toggle::AutoRotate, true);
        assert!(!state.background.is_enabled());
        assert!(!state.toggles().gradient_background);
        assert!(state.orbit.auto_rotate);
    }

    #[test]
    fn nothing_is_synthesized_before_the_model_loads() {
        let mut state = state();
        state.set(Toggle::GradientBackground, true);
        let output = state.update(&Input::new(), 0.016);
        assert!(output.background.is_none());
    }

    #[test]
    fn camera_on_positive_z_gets_the_back_gradient() {
        let mut state = loaded_state();
        state.set(Toggle::GradientBackground, true);
        // camera at (0, 0, -5) looking toward +z
        state.orbit.azimuth = PI;
        state.orbit.elevation = 0.0;
        state.orbit.distance = 5.0;

        let output = state.update(&Input::new(), 0.0);
        let update = output.background.unwrap();
        assert_eq!(update.face, Face::Back);
        assert_eq!(update.image, synthesize(gradient_for(Face::Back), 32));
        assert!(state.status_line().ends_with("background: back"));
    }

    #[test]
    fn zero_background_size_still_yields_a_drawable_texture() {
        let config = ViewerConfig::new()
            .background_size(0)
            .gradient_background(true);
        let mut state = ViewerState::new(&config);
        state.on_load_event(LoadEvent::Loaded(ModelData::default()), Path::new("m.glb"));

        let update = state.update(&Input::new(), 0.0).background.unwrap();
        let (width, height) = update.image.dimensions();
        assert!(width > 0 && height > 0);
    }

    #[test]
    fn disabled_gradient_leaves_background_alone() {
        let mut state = loaded_state();
        assert!(state.update(&Input::new(), 0.016).background.is_none());
    }

    #[test]
    fn load_events_drive_status() {
        let mut state = state();
        assert!(state.on_load_event(LoadEvent::Progress(0.5), Path::new("m.glb")).is_none());
        assert_eq!(state.status(), &ModelStatus::Loading { progress: 0.5 });
        assert_eq!(state.status_line(), "Loading model... 50%");

        let failed = state.on_load_event(LoadEvent::Failed(GeometryError::NoGeometry), Path::new("m.glb"));
        assert!(failed.is_none());
        assert!(matches!(state.status(), ModelStatus::Failed(_)));
        assert!(!state.status().is_loaded());
    }

    #[test]
    fn toolbar_click_flips_and_captures() {
        let mut state = state();
        let rect = state.toolbar.button_rect(Toggle::LightHelpers);
        let mut input = Input::new();
        input.move_mouse(Vec2::new(rect.x + 2.0, rect.y + 2.0));
        input.press_mouse(MouseButton::Left);

        let changes = state.route_input(&mut input);
        assert_eq!(
            changes,
            vec![ToggleChange {
                toggle: Toggle::LightHelpers,
                enabled: false
            }]
        );
        assert!(input.pointer_captured());

        // the click must not also rotate the camera
        let before = state.orbit.azimuth;
        input.move_mouse(Vec2::new(rect.x + 80.0, rect.y + 2.0));
        state.update(&input, 0.0);
        assert_eq!(state.orbit.azimuth, before);
    }

    #[test]
    fn shortcuts_flip_toggles() {
        let mut state = state();
        let mut input = Input::new();
        input.move_mouse(Vec2::new(600.0, 400.0));
        input.press_key(KeyCode::KeyG);
        input.press_key(KeyCode::KeyO);
        state.route_input(&mut input);

        assert!(state.toggles().gradient_background);
        assert!(!state.toggles().orbit_enabled);
        assert!(!state.orbit.enabled);
        assert!(!input.pointer_captured());
    }

    #[test]
    fn auto_rotate_moves_camera_even_with_orbit_disabled() {
        let mut state = state();
        state.set(Toggle::OrbitControls, false);
        state.set(Toggle::AutoRotate, true);
        let before = state.update(&Input::new(), 0.0).camera.position;
        let after = state.update(&Input::new(), 1.0).camera.position;
        assert!((after - before).length() > 1e-3);
        assert!((after.length() - before.length()).abs() < 1e-3);
    }
}
