use std::ffi::{c_void, CString};
use std::num::NonZeroU32;

use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use raw_window_handle::HasRawWindowHandle;
use thiserror::Error;
use winit::dpi::LogicalSize;
use winit::event_loop::EventLoop;
use winit::window::{Window as winit_Window, WindowBuilder as winit_WindowBuilder};

use crate::core::windowing::window::WindowBuilder;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("could not create window: {0}")]
    Creation(String),
    #[error("OpenGL context error: {0}")]
    Context(#[from] glutin::error::Error),
}

/// Winit window with a current OpenGL 4.6 core context.
///
/// The context is current on the thread that created the window, every GL
/// call has to happen there.
pub struct WinitWindow {
    width: u32,
    height: u32,
    title: String,
    window: winit_Window,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    use_vsync: bool,
}

impl WinitWindow {
    pub fn create(props: &WindowBuilder, event_loop: &EventLoop<()>) -> Result<Self, WindowError> {
        let window_builder = winit_WindowBuilder::new()
            .with_title(props.title.clone())
            .with_inner_size(LogicalSize::new(props.width, props.height))
            .with_decorations(true);

        // Window creation
        let (window, cfg) = glutin_winit::DisplayBuilder::new()
            .with_window_builder(Some(window_builder))
            .build(event_loop, ConfigTemplateBuilder::new(), |configs| {
                configs
                    .reduce(|a, b| if a.num_samples() > b.num_samples() { a } else { b })
                    .expect("glutin always offers at least one config")
            })
            .map_err(|e| WindowError::Creation(e.to_string()))?;

        let window =
            window.ok_or_else(|| WindowError::Creation("no window was created".to_owned()))?;

        // Context creation
        let context_attrs = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(4, 6))))
            .with_profile(GlProfile::Core)
            .build(Some(window.raw_window_handle()));

        let context = unsafe { cfg.display().create_context(&cfg, &context_attrs)? };

        let size = window.inner_size();
        let surface_attrs = SurfaceAttributesBuilder::<WindowSurface>::new()
            .with_srgb(Some(true))
            .build(
                window.raw_window_handle(),
                NonZeroU32::new(size.width).unwrap_or(NonZeroU32::MIN),
                NonZeroU32::new(size.height).unwrap_or(NonZeroU32::MIN),
            );
        let surface = unsafe { cfg.display().create_window_surface(&cfg, &surface_attrs)? };

        let context = context.make_current(&surface)?;

        let mut result = WinitWindow {
            width: size.width,
            height: size.height,
            title: props.title.clone(),
            window,
            surface,
            context,
            use_vsync: !props.vsync,
        };
        result.set_vsync(props.vsync);
        result.load_gl();

        log::info!(
            "Created window '{}' ({}x{})",
            result.title,
            result.width,
            result.height
        );
        Ok(result)
    }

    /// Load the `gl` function pointers for this context
    fn load_gl(&self) {
        gl::load_with(|symbol| self.proc_address(symbol));
    }

    /// Address of a GL function of this context, null when unknown
    pub fn proc_address(&self, symbol: &str) -> *const c_void {
        match CString::new(symbol) {
            Ok(symbol) => self.context.display().get_proc_address(&symbol),
            Err(_) => std::ptr::null(),
        }
    }

    /// A glow context over this window's GL context
    pub fn glow_context(&self) -> glow::Context {
        glow_context(&self.context)
    }

    #[inline(always)]
    pub fn get_width(&self) -> u32 {
        self.width
    }

    #[inline(always)]
    pub fn get_height(&self) -> u32 {
        self.height
    }

    #[inline(always)]
    pub fn get_title(&self) -> &str {
        &self.title
    }

    #[inline(always)]
    pub fn get_vsync(&self) -> bool {
        self.use_vsync
    }

    pub fn set_vsync(&mut self, is_vsync_active: bool) {
        if self.use_vsync == is_vsync_active {
            return;
        }

        let interval = if is_vsync_active {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        match self.surface.set_swap_interval(&self.context, interval) {
            Ok(()) => self.use_vsync = is_vsync_active,
            Err(e) => log::warn!("Could not change vsync: {e}"),
        }
    }

    #[inline(always)]
    pub fn winit_window(&self) -> &winit_Window {
        &self.window
    }

    /// Keep the surface in sync with the window size. Zero sizes (minimized
    /// windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return;
        };
        self.surface.resize(&self.context, w, h);
        self.width = width;
        self.height = height;
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    pub fn swap_buffers(&self) -> Result<(), WindowError> {
        self.surface.swap_buffers(&self.context)?;
        Ok(())
    }
}

fn glow_context(context: &PossiblyCurrentContext) -> glow::Context {
    unsafe {
        glow::Context::from_loader_function_cstr(|s| context.display().get_proc_address(s).cast())
    }
}
