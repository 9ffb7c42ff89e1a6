use std::rc::Rc;

use super::compilation_unit::CompilationUnit;
use super::reload::ReloadController;
use super::shader::ShaderError;
use super::shader_backend::ShaderBackend;
use super::shader_program::ShaderProgram;
use super::source::ShaderSource;
use crate::core::time::Time;

/// Everything the render loop hands to per-frame updates
pub struct FrameContext<'a> {
    pub reload: &'a ReloadController,
    pub source: &'a dyn ShaderSource,
    pub time: &'a Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// No change was signalled
    Unchanged,
    /// A fresh program replaced the active one
    Rebuilt,
    /// The rebuild failed, the active program was kept
    Failed,
}

/// Owns the program the render loop draws with and rebuilds it from scratch
/// whenever the reload flag is raised.
///
/// A failed rebuild never replaces the active program. Its error text is kept
/// for display until the next successful rebuild.
pub struct HotProgram<B: ShaderBackend> {
    backend: Rc<B>,
    active: Option<ShaderProgram<B>>,
    last_error: String,
    rebuild_count: u32,
    debug_dump: bool,
    time_uniform: Option<String>,
}

impl<B: ShaderBackend> HotProgram<B> {
    pub fn new(backend: Rc<B>) -> Self {
        HotProgram {
            backend,
            active: None,
            last_error: String::new(),
            rebuild_count: 0,
            debug_dump: false,
            time_uniform: None,
        }
    }

    /// Dump introspection of every rebuilt program at debug level
    pub fn with_debug_dump(mut self, enabled: bool) -> Self {
        self.debug_dump = enabled;
        self
    }

    /// Upload the elapsed seconds of every frame to the float uniform `name`
    pub fn with_time_uniform(mut self, name: impl Into<String>) -> Self {
        self.time_uniform = Some(name.into());
        self
    }

    /// Call once per frame, before drawing with [HotProgram::program]
    pub fn update(&mut self, frame: &FrameContext) -> RebuildOutcome {
        let outcome = self.reload_if_dirty(frame);

        if let (Some(name), Some(program)) = (&self.time_uniform, &self.active) {
            program.set_uniform(name, frame.time.elapsed_seconds());
        }
        outcome
    }

    fn reload_if_dirty(&mut self, frame: &FrameContext) -> RebuildOutcome {
        if !frame.reload.take_dirty_and_clear() {
            return RebuildOutcome::Unchanged;
        }

        match self.rebuild(frame.source) {
            Ok(program) => {
                // The previous program is released only now
                self.active = Some(program);
                self.last_error.clear();
                self.rebuild_count += 1;
                log::info!("Shader program rebuilt ({} so far)", self.rebuild_count);
                RebuildOutcome::Rebuilt
            }
            Err(e) => {
                log::error!("Shader rebuild failed: {e}");
                self.last_error = e.to_string();
                RebuildOutcome::Failed
            }
        }
    }

    /// Build a program from the current sources without touching the active one
    pub fn rebuild(&self, source: &dyn ShaderSource) -> Result<ShaderProgram<B>, ShaderError> {
        let mut program = ShaderProgram::new(self.backend.clone())?;
        program.set_debug_dump(self.debug_dump);

        let mut units = Vec::with_capacity(source.stages().len());
        for &stage in source.stages() {
            let text = source.load(stage)?;
            let mut unit = CompilationUnit::new(self.backend.clone(), stage)?;
            unit.compile_checked(&text)?;
            program.attach(&unit);
            units.push(unit);
        }

        program.link_checked()?;

        // Linking ok: detach so the shader objects go away with the units
        for unit in units.iter() {
            program.detach(unit);
        }

        Ok(program)
    }

    /// Program to draw with, `None` until the first successful build
    #[inline(always)]
    pub fn program(&self) -> Option<&ShaderProgram<B>> {
        self.active.as_ref()
    }

    #[inline(always)]
    pub fn program_mut(&mut self) -> Option<&mut ShaderProgram<B>> {
        self.active.as_mut()
    }

    /// Error of the last failed rebuild, empty after a successful one
    #[inline(always)]
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    #[inline(always)]
    pub fn rebuild_count(&self) -> u32 {
        self.rebuild_count
    }
}
