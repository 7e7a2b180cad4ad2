use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::ViewerConfig,
    error::LoadError,
    gfx::{camera::camera_utils::CameraManager, RenderEngine},
    loader::load_model_async,
    ui::{viewer_panel, UiManager},
    viewer::{
        lifecycle::LoadEvent,
        ui_shell::{UiAction, UiShell},
        Viewer,
    },
};

/// Windowed showroom: owns the event loop and everything driven by it
pub struct ShowroomApp {
    event_loop: Option<EventLoop<LoadEvent>>,
    app_state: AppState,
}

struct AppState {
    config: ViewerConfig,
    proxy: EventLoopProxy<LoadEvent>,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    camera_manager: CameraManager,
    viewer: Viewer,
    last_update: Instant,
    loader: Option<JoinHandle<()>>,
}

impl ShowroomApp {
    pub fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let event_loop = EventLoop::<LoadEvent>::with_user_event()
            .build()
            .context("Failed to create event loop")?;
        let proxy = event_loop.create_proxy();

        let viewer = Viewer::from_config(&config, UiShell::standard())
            .context("Invalid material catalog")?;

        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let camera_manager = CameraManager::from_config(&config.camera, aspect);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                proxy,
                window: None,
                render_engine: None,
                ui_manager: None,
                camera_manager,
                viewer,
                last_update: Instant::now(),
                loader: None,
            },
        })
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("Event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .context("Event loop terminated with an error")
    }
}

impl AppState {
    /// Starts loading the configured model on a worker thread
    fn start_loading(&mut self) {
        self.viewer.begin_load();

        let proxy = self.proxy.clone();
        let path = self.config.model.path.clone();
        match load_model_async(path, move |event| {
            if proxy.send_event(event).is_err() {
                log::debug!("Event loop closed before the model finished loading");
            }
        }) {
            Ok(handle) => self.loader = Some(handle),
            Err(e) => self.viewer.on_failed(LoadError::Io(e)),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key_code: KeyCode) {
        match key_code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::ArrowLeft => self.viewer.previous(),
            KeyCode::ArrowRight => self.viewer.next(),
            KeyCode::KeyR => self.viewer.randomize(),
            KeyCode::KeyT => self.viewer.toggle_rotation(),
            KeyCode::KeyC => self.camera_manager.reset(),
            _ => (),
        }
    }

    fn dispatch(&mut self, action: UiAction) {
        if !self.viewer.dispatch(action) && action == UiAction::ResetCamera {
            self.camera_manager.reset();
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(render_engine), Some(window)) = (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return;
        };

        let now = Instant::now();
        let dt = (now - self.last_update).as_secs_f32();
        self.last_update = now;

        self.camera_manager.update(dt, self.viewer.auto_rotate());
        render_engine.update(self.camera_manager.camera.uniform);
        if let Some(model) = self.viewer.model() {
            render_engine.sync_model(model);
        }

        let mut action = None;
        let result = match self.ui_manager.as_mut() {
            Some(ui_manager) => {
                let viewer = &self.viewer;
                render_engine.render_frame(Some(
                    |device: &wgpu::Device,
                     queue: &wgpu::Queue,
                     encoder: &mut wgpu::CommandEncoder,
                     color_attachment: &wgpu::TextureView| {
                        action = ui_manager.draw(device, queue, encoder, window, color_attachment, |ui| {
                            viewer_panel(ui, viewer)
                        });
                    },
                ))
            }
            None => render_engine.render_frame(
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            ),
        };

        match result {
            Ok(()) => (),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                render_engine.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Skipped frame: {e}"),
        }

        if let Some(action) = action {
            self.dispatch(action);
        }
    }
}

impl ApplicationHandler<LoadEvent> for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_config = &self.config.window;
        let attributes = WindowAttributes::default()
            .with_title(window_config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                window_config.width,
                window_config.height,
            ));

        let window_handle = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window_handle.clone());

        let (width, height) = window_handle.inner_size().into();
        self.camera_manager
            .camera
            .resize_projection(width, height);

        let light = self.config.light.clone();
        let ground = self.config.ground.clone();
        let window_clone = window_handle.clone();
        let renderer = match pollster::block_on(async move {
            RenderEngine::new(window_clone, width, height, light, &ground).await
        }) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("Failed to initialize renderer: {e:#}");
                event_loop.exit();
                return;
            }
        };

        let mut ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window_handle,
        );
        ui_manager.update_display_size(width, height);

        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        self.last_update = Instant::now();

        self.start_loading();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            if ui_manager.handle_input(&window, window_id, &event) {
                self.camera_manager.controller.release();
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key_code),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        // Don't move the camera while the overlay owns the mouse
        if let Some(ui_manager) = self.ui_manager.as_ref() {
            if ui_manager.wants_mouse() {
                return;
            }
        }

        self.camera_manager.process_event(&event);
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: LoadEvent) {
        match self.render_engine.as_mut() {
            Some(render_engine) => self.viewer.handle_load_event(event, render_engine),
            None => log::warn!("Dropping load event received without a renderer: {event:?}"),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(loader) = self.loader.take() {
            if !loader.is_finished() {
                log::info!("Exiting while the model is still loading");
            }
        }
    }
}
