pub mod core;

pub mod prelude {
    pub use crate::core::app::{App, AppError, Layer, LayerPtr};
    pub use crate::core::config::AppConfig;
    pub use crate::core::platform::opengl::opengl_buffer::{
        Mesh, QUAD_COMPONENTS, QUAD_INDICES, QUAD_VERTICES,
    };
    pub use crate::core::platform::opengl::opengl_render_backend::OpenGLRenderBackend;
    pub use crate::core::platform::opengl::opengl_shader_backend::OpenGLShaderBackend;
    pub use crate::core::rendering::hot_program::{FrameContext, HotProgram, RebuildOutcome};
    pub use crate::core::rendering::reload::ReloadController;
    pub use crate::core::rendering::shader::{ShaderError, ShaderStage};
    pub use crate::core::rendering::shader_program::ShaderProgram;
    pub use crate::core::rendering::source::{FileShaderSource, ShaderSource};
    pub use crate::core::rendering::uniform::{UniformUpload, UniformValue};
    pub use crate::core::rendering::watcher::ShaderWatcher;
    pub use crate::core::time::Time;
}

#[cfg(test)]
mod tests;
