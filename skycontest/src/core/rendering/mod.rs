pub mod compilation_unit;
pub mod hot_program;
pub mod reload;
pub mod shader;
pub mod shader_backend;
pub mod shader_program;
pub mod source;
pub mod uniform;
pub mod watcher;
