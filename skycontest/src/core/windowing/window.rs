//! Window description used to open the main window.
//!
//! For the actual platform window see [winit_window](crate::core::platform::winit_window)
use crate::core::config::WindowConfig;

#[derive(Debug, Clone)]
pub struct WindowBuilder {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

impl WindowBuilder {
    pub fn new() -> Self {
        WindowBuilder {
            title: "SkyContest".to_owned(),
            height: 800,
            width: 1200,
            vsync: false,
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn with_title(mut self, title: String) -> Self {
        self.title = title;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }
}

impl Default for WindowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&WindowConfig> for WindowBuilder {
    fn from(config: &WindowConfig) -> Self {
        WindowBuilder::new()
            .with_width(config.width)
            .with_height(config.height)
            .with_title(config.title.clone())
            .with_vsync(config.vsync)
    }
}
