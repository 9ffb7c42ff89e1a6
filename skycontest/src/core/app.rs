//! Application entry point: owns the window, the renderer, the imgui overlay
//! and the user layers, and drives them from the winit event loop.
use std::time::Instant;

use imgui_glow_renderer::AutoRenderer;
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use thiserror::Error;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::core::config::AppConfig;
use crate::core::platform::opengl::opengl_render_backend::OpenGLRenderBackend;
use crate::core::platform::winit_window::{WindowError, WinitWindow};
use crate::core::time::Time;
use crate::core::windowing::window::WindowBuilder;

/// imgui refuses zero frame times
const MIN_DELTA_SECONDS: f32 = 1.0e-6;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error("could not initialize imgui renderer: {0}")]
    Imgui(String),
}

/// Layers implement user behavior. They provide an API
/// that is called by the application each frame.
pub trait Layer {
    /// Called once the GL context exists, before the first frame
    fn on_attach(&mut self, renderer: &mut OpenGLRenderBackend);

    /// Called when the event loop exits, while the GL context is still alive
    fn on_detach(&mut self, renderer: &mut OpenGLRenderBackend);

    /// Called every frame after the framebuffer was cleared
    fn update(&mut self, time: &Time, renderer: &mut OpenGLRenderBackend);

    // Allow unused variables because this is just an empty default implementation.
    // Don't add _ to the start of their names so that the user has a good
    // autocompletion when implementing this function
    #[allow(unused)]
    fn imgui_update(&mut self, time: &Time, ui: &mut imgui::Ui) {}
}

pub type LayerPtr = Box<dyn Layer>;

pub struct App {
    config: AppConfig,
    layers: Vec<LayerPtr>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        App {
            config,
            layers: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn add_layer(&mut self, layer: LayerPtr) {
        self.layers.push(layer);
    }

    /// Open the window and run until it is closed or Escape is pressed
    pub fn run(self) -> Result<(), AppError> {
        let App { config, mut layers } = self;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut window = WinitWindow::create(&WindowBuilder::from(&config.window), &event_loop)?;

        let mut renderer = OpenGLRenderBackend::new(window.glow_context());
        renderer.set_clear_color(config.clear_color);
        renderer.set_viewport(0, 0, window.get_width(), window.get_height());

        let mut imgui = imgui::Context::create();
        imgui.set_ini_filename(None);
        let mut platform = WinitPlatform::init(&mut imgui);
        platform.attach_window(imgui.io_mut(), window.winit_window(), HiDpiMode::Rounded);

        let imgui_gl = unsafe {
            imgui_glow_renderer::glow::Context::from_loader_function(|s| window.proc_address(s))
        };
        let mut imgui_renderer = AutoRenderer::initialize(imgui_gl, &mut imgui)
            .map_err(|e| AppError::Imgui(e.to_string()))?;

        for layer in layers.iter_mut() {
            layer.on_attach(&mut renderer);
        }

        let mut time = Time::new(Instant::now());

        event_loop.run(move |event, elwt| {
            platform.handle_event(imgui.io_mut(), window.winit_window(), &event);

            match event {
                Event::AboutToWait => window.request_redraw(),
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key: PhysicalKey::Code(KeyCode::Escape),
                                state: ElementState::Pressed,
                                ..
                            },
                        ..
                    } => elwt.exit(),
                    WindowEvent::Resized(size) => {
                        window.resize(size.width, size.height);
                        renderer.set_viewport(0, 0, window.get_width(), window.get_height());
                    }
                    WindowEvent::RedrawRequested => {
                        time.step(Instant::now());
                        imgui.io_mut().delta_time = time.delta_seconds().max(MIN_DELTA_SECONDS);
                        if let Err(e) = platform.prepare_frame(imgui.io_mut(), window.winit_window())
                        {
                            log::warn!("imgui could not prepare frame: {e}");
                        }

                        renderer.clear();
                        for layer in layers.iter_mut() {
                            layer.update(&time, &mut renderer);
                        }

                        let ui = imgui.new_frame();
                        for layer in layers.iter_mut() {
                            layer.imgui_update(&time, ui);
                        }
                        platform.prepare_render(ui, window.winit_window());
                        let draw_data = imgui.render();
                        if let Err(e) = imgui_renderer.render(draw_data) {
                            log::error!("imgui render failed: {e}");
                        }

                        if let Err(e) = window.swap_buffers() {
                            log::error!("{e}");
                            elwt.exit();
                        }
                    }
                    _ => {}
                },
                Event::LoopExiting => {
                    for layer in layers.iter_mut() {
                        layer.on_detach(&mut renderer);
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}
