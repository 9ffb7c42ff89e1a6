use std::rc::Rc;

use super::shader::{ShaderError, ShaderStage};
use super::shader_backend::{ShaderBackend, ShaderId, NULL_HANDLE};

/// A single shader stage: source text in, compiled shader object and log out.
pub struct CompilationUnit<B: ShaderBackend> {
    backend: Rc<B>,
    stage: ShaderStage,
    handle: ShaderId,
    compiled: bool,
    log: String,
}

impl<B: ShaderBackend> CompilationUnit<B> {
    /// Allocate a shader object for `stage`. Only fails when the graphics
    /// context is unusable.
    pub fn new(backend: Rc<B>, stage: ShaderStage) -> Result<Self, ShaderError> {
        let handle = backend.create_shader(stage).map_err(ShaderError::Backend)?;
        if handle == NULL_HANDLE {
            return Err(ShaderError::Backend(format!(
                "driver returned a null {} shader",
                stage
            )));
        }

        Ok(CompilationUnit {
            backend,
            stage,
            handle,
            compiled: false,
            log: String::new(),
        })
    }

    /// Compile `source`, replacing whatever this unit held before.
    pub fn compile(&mut self, source: &str) -> bool {
        self.compiled = self.backend.compile_shader(self.handle, source);
        if self.compiled {
            self.log.clear();
        } else {
            self.log = trim_info_log(self.backend.shader_info_log(self.handle));
            log::debug!("{} shader {} failed to compile", self.stage, self.handle);
        }
        self.compiled
    }

    /// Same as [CompilationUnit::compile] but turns a failure into a [ShaderError::Compile]
    pub fn compile_checked(&mut self, source: &str) -> Result<(), ShaderError> {
        if self.compile(source) {
            Ok(())
        } else {
            Err(ShaderError::Compile {
                stage: self.stage,
                log: self.log.clone(),
            })
        }
    }

    #[inline(always)]
    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    #[inline(always)]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    #[inline(always)]
    pub fn handle(&self) -> ShaderId {
        self.handle
    }

    /// Compiler output of the last failed compile, empty otherwise
    #[inline(always)]
    pub fn log(&self) -> &str {
        &self.log
    }
}

impl<B: ShaderBackend> Drop for CompilationUnit<B> {
    fn drop(&mut self) {
        if self.handle != NULL_HANDLE {
            self.backend.delete_shader(self.handle);
            self.handle = NULL_HANDLE;
        }
    }
}

/// Drivers terminate their logs with newlines and NULs
pub(crate) fn trim_info_log(log: String) -> String {
    let trimmed = log.trim_end_matches(|c: char| c == '\0' || c.is_whitespace());
    if trimmed.len() == log.len() {
        log
    } else {
        trimmed.to_owned()
    }
}
