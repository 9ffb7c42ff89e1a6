use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::compilation_unit::{trim_info_log, CompilationUnit};
use super::shader::{ProgramState, ShaderError, ShaderStage, TransformFeedbackMode};
use super::shader_backend::{ProgramId, ShaderBackend, INVALID_LOCATION, NULL_HANDLE};
use super::uniform::{UniformArray, UniformMatrix, UniformUpload, UniformValue};

/// Suffix the driver appends to the name of an array uniform
const ARRAY_SUFFIX: &str = "[0]";

pub type LocationMap = HashMap<String, i32>;

/// A subroutine uniform and the subroutines it can select
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineUniform {
    /// Ordinal of the uniform within its stage
    pub index: u32,
    /// Slot of the uniform in the stage selection vector
    pub location: i32,
    /// Compatible subroutine name to subroutine index
    pub subroutines: HashMap<String, u32>,
}

pub type SubroutineMap = HashMap<String, SubroutineUniform>;
pub type StageSubroutineMap = HashMap<ShaderStage, SubroutineMap>;

/// A linked GPU program and what its last successful link exposed.
///
/// Compilation units are borrowed, not owned: a unit passed to
/// [ShaderProgram::attach] has to outlive the following [ShaderProgram::link].
///
/// Location and subroutine maps always describe the last *successful* link.
/// A failed link only touches the log, so a program that fails to relink keeps
/// answering lookups with its previous bindings.
pub struct ShaderProgram<B: ShaderBackend> {
    backend: Rc<B>,
    handle: ProgramId,
    state: ProgramState,
    log: String,
    attributes: LocationMap,
    uniforms: LocationMap,
    subroutines: StageSubroutineMap,
    selections: HashMap<ShaderStage, Vec<u32>>,
    reported_misses: RefCell<HashSet<String>>,
    reported_unlinked_use: Cell<bool>,
    debug_dump: bool,
}

impl<B: ShaderBackend> ShaderProgram<B> {
    pub fn new(backend: Rc<B>) -> Result<Self, ShaderError> {
        let handle = backend.create_program().map_err(ShaderError::Backend)?;
        if handle == NULL_HANDLE {
            return Err(ShaderError::Backend("driver returned a null program".into()));
        }

        Ok(ShaderProgram {
            backend,
            handle,
            state: ProgramState::Unlinked,
            log: String::new(),
            attributes: LocationMap::new(),
            uniforms: LocationMap::new(),
            subroutines: StageSubroutineMap::new(),
            selections: HashMap::new(),
            reported_misses: RefCell::new(HashSet::new()),
            reported_unlinked_use: Cell::new(false),
            debug_dump: false,
        })
    }

    /// Log every location after each successful link
    pub fn set_debug_dump(&mut self, enabled: bool) {
        self.debug_dump = enabled;
    }

    pub fn attach(&mut self, unit: &CompilationUnit<B>) {
        self.backend.attach_shader(self.handle, unit.handle());
    }

    pub fn detach(&mut self, unit: &CompilationUnit<B>) {
        self.backend.detach_shader(self.handle, unit.handle());
    }

    /// Only takes effect on the next [ShaderProgram::link]
    pub fn bind_attrib_location(&mut self, location: u32, name: &str) {
        self.backend.bind_attrib_location(self.handle, location, name);
    }

    /// Vertex or geometry outputs captured by transform feedback. Only takes
    /// effect on the next [ShaderProgram::link].
    pub fn set_transform_feedback_varyings(
        &mut self,
        varyings: &[&str],
        mode: TransformFeedbackMode,
    ) {
        self.backend
            .transform_feedback_varyings(self.handle, varyings, mode);
    }

    /// Link every attached unit. On success the introspection maps are rebuilt
    /// and the log cleared; on failure only the log changes.
    pub fn link(&mut self) -> bool {
        if !self.backend.link_program(self.handle) {
            self.log = trim_info_log(self.backend.program_info_log(self.handle));
            self.state = ProgramState::LinkFailed;
            log::debug!("Program {} failed to link", self.handle);
            return false;
        }

        self.log.clear();
        self.retrieve_locations();
        self.retrieve_subroutines();
        self.state = ProgramState::Linked;
        self.reported_misses.borrow_mut().clear();
        self.reported_unlinked_use.set(false);

        if self.debug_dump {
            self.dump();
        }
        true
    }

    /// Same as [ShaderProgram::link] but turns a failure into a [ShaderError::Link]
    pub fn link_checked(&mut self) -> Result<(), ShaderError> {
        if self.link() {
            Ok(())
        } else {
            Err(ShaderError::Link(self.log.clone()))
        }
    }

    /// Make this the program used by the following draw calls.
    ///
    /// Does nothing and returns `false` unless the last link succeeded.
    pub fn use_program(&self) -> bool {
        if self.state != ProgramState::Linked {
            if !self.reported_unlinked_use.replace(true) {
                log::warn!(
                    "Program {} is not linked ({:?}), not binding it",
                    self.handle,
                    self.state
                );
            }
            return false;
        }

        self.backend.use_program(self.handle);
        // Subroutine selections are reset by every program bind
        for stage in ShaderStage::ALL {
            if let Some(selection) = self.selections.get(&stage) {
                if !selection.is_empty() {
                    self.backend.uniform_subroutines(stage, selection);
                }
            }
        }
        true
    }

    /// Location of an active attribute, or [INVALID_LOCATION]
    pub fn attrib_location(&self, name: &str) -> i32 {
        match self.attributes.get(name) {
            Some(location) => *location,
            None => {
                self.report_miss("attribute", name);
                INVALID_LOCATION
            }
        }
    }

    /// Attribute location as a vertex attribute index, `None` on a miss
    pub fn attribute_slot(&self, name: &str) -> Option<u32> {
        u32::try_from(self.attrib_location(name)).ok()
    }

    /// Location of an active uniform, or [INVALID_LOCATION]
    pub fn uniform_location(&self, name: &str) -> i32 {
        match self.uniforms.get(name) {
            Some(location) => *location,
            None => {
                self.report_miss("uniform", name);
                INVALID_LOCATION
            }
        }
    }

    /// Upload a 1 to 4 component value. The program does not need to be bound.
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) -> UniformUpload {
        let location = self.uniform_location(name);
        if location == INVALID_LOCATION {
            return UniformUpload::Skipped;
        }

        self.backend.program_uniform(self.handle, location, value.into());
        UniformUpload::Uploaded
    }

    /// Upload `values.count()` consecutive elements starting at `name`
    pub fn set_uniform_array<'a>(
        &self,
        name: &str,
        values: impl Into<UniformArray<'a>>,
    ) -> UniformUpload {
        let location = self.uniform_location(name);
        if location == INVALID_LOCATION {
            return UniformUpload::Skipped;
        }

        self.backend
            .program_uniform_array(self.handle, location, values.into());
        UniformUpload::Uploaded
    }

    pub fn set_uniform_matrix<'a>(
        &self,
        name: &str,
        values: impl Into<UniformMatrix<'a>>,
        transpose: bool,
    ) -> UniformUpload {
        let location = self.uniform_location(name);
        if location == INVALID_LOCATION {
            return UniformUpload::Skipped;
        }

        self.backend
            .program_uniform_matrix(self.handle, location, values.into(), transpose);
        UniformUpload::Uploaded
    }

    /// Select `subroutine` for the subroutine uniform `uniform` of `stage`.
    ///
    /// The selection is kept per stage. It is submitted right away when this
    /// program is the current one, otherwise by the next
    /// [ShaderProgram::use_program].
    pub fn set_subroutine(
        &mut self,
        stage: ShaderStage,
        uniform: &str,
        subroutine: &str,
    ) -> Result<(), ShaderError> {
        let not_found = || ShaderError::SubroutineNotFound {
            stage,
            uniform: uniform.to_owned(),
            subroutine: subroutine.to_owned(),
        };

        let subroutine_uniform = self
            .subroutines
            .get(&stage)
            .and_then(|uniforms| uniforms.get(uniform))
            .ok_or_else(not_found)?;
        let subroutine_index = *subroutine_uniform
            .subroutines
            .get(subroutine)
            .ok_or_else(not_found)?;
        let slot = usize::try_from(subroutine_uniform.location).map_err(|_| not_found())?;

        let selection = self.selections.get_mut(&stage).ok_or_else(not_found)?;
        let entry = selection.get_mut(slot).ok_or_else(not_found)?;
        *entry = subroutine_index;

        // Subroutine state belongs to whatever program is bound
        if self.backend.current_program() == self.handle {
            self.backend.uniform_subroutines(stage, selection);
        }
        Ok(())
    }

    /// Subroutine index currently selected for `uniform` of `stage`
    pub fn selected_subroutine(&self, stage: ShaderStage, uniform: &str) -> Option<u32> {
        let subroutine_uniform = self.subroutines.get(&stage)?.get(uniform)?;
        let slot = usize::try_from(subroutine_uniform.location).ok()?;
        self.selections.get(&stage)?.get(slot).copied()
    }

    /// Direct query of a program parameter
    pub fn parameter(&self, parameter: u32) -> i32 {
        self.backend.program_parameter(self.handle, parameter)
    }

    pub fn set_parameter(&mut self, parameter: u32, value: i32) {
        self.backend
            .set_program_parameter(self.handle, parameter, value);
    }

    /// Driver output of the last failed link, empty otherwise
    #[inline(always)]
    pub fn log(&self) -> &str {
        &self.log
    }

    /// Whether the driver still knows this program
    pub fn is_valid(&self) -> bool {
        self.handle != NULL_HANDLE && self.backend.is_program(self.handle)
    }

    #[inline(always)]
    pub fn state(&self) -> ProgramState {
        self.state
    }

    #[inline(always)]
    pub fn handle(&self) -> ProgramId {
        self.handle
    }

    #[inline(always)]
    pub fn attributes(&self) -> &LocationMap {
        &self.attributes
    }

    #[inline(always)]
    pub fn uniforms(&self) -> &LocationMap {
        &self.uniforms
    }

    #[inline(always)]
    pub fn subroutines(&self) -> &StageSubroutineMap {
        &self.subroutines
    }

    /// Log every attribute, uniform and subroutine at debug level
    pub fn dump(&self) {
        log::debug!("Program {} attributes:", self.handle);
        for (name, location) in sorted_by_location(&self.attributes) {
            log::debug!("{:>6}: {}", location, name);
        }
        log::debug!("Program {} uniforms:", self.handle);
        for (name, location) in sorted_by_location(&self.uniforms) {
            log::debug!("{:>6}: {}", location, name);
        }
        for stage in ShaderStage::ALL {
            let Some(uniforms) = self.subroutines.get(&stage) else {
                continue;
            };
            log::debug!("Subroutines for the {} stage:", stage);
            for (name, uniform) in uniforms {
                log::debug!("Subroutine uniform id={}: {}", uniform.index, name);
                for (subroutine, index) in &uniform.subroutines {
                    log::debug!("Subroutine id={}: {}", index, subroutine);
                }
            }
        }
    }

    fn retrieve_locations(&mut self) {
        let mut attributes = LocationMap::new();
        for name in self.backend.active_attributes(self.handle) {
            let location = self.backend.attrib_location(self.handle, &name);
            attributes.insert(name, location);
        }

        let mut uniforms = LocationMap::new();
        for name in self.backend.active_uniforms(self.handle) {
            let location = self.backend.uniform_location(self.handle, &name);
            // Arrays are also reachable by their bare name
            if let Some(base) = name.strip_suffix(ARRAY_SUFFIX) {
                uniforms.insert(base.to_owned(), location);
            }
            uniforms.insert(name, location);
        }

        self.attributes = attributes;
        self.uniforms = uniforms;
    }

    fn retrieve_subroutines(&mut self) {
        let mut subroutines = StageSubroutineMap::new();
        let mut selections = HashMap::new();

        for stage in ShaderStage::ALL {
            let count = self.backend.active_subroutine_uniforms(self.handle, stage);
            if count == 0 {
                continue;
            }

            let slots = self
                .backend
                .active_subroutine_uniform_locations(self.handle, stage);
            let mut selection = vec![0u32; slots as usize];
            let mut stage_map = SubroutineMap::new();

            for index in 0..count {
                let name = self
                    .backend
                    .subroutine_uniform_name(self.handle, stage, index);
                let location = self
                    .backend
                    .subroutine_uniform_location(self.handle, stage, &name);
                let compatible = self
                    .backend
                    .compatible_subroutines(self.handle, stage, index);

                // Every slot needs a valid index before the first submission
                if let (Ok(slot), Some(first)) = (usize::try_from(location), compatible.first()) {
                    if let Some(entry) = selection.get_mut(slot) {
                        *entry = *first;
                    }
                }

                let subroutines = compatible
                    .into_iter()
                    .map(|subroutine| {
                        (
                            self.backend.subroutine_name(self.handle, stage, subroutine),
                            subroutine,
                        )
                    })
                    .collect();

                stage_map.insert(
                    name,
                    SubroutineUniform {
                        index,
                        location,
                        subroutines,
                    },
                );
            }

            subroutines.insert(stage, stage_map);
            selections.insert(stage, selection);
        }

        self.subroutines = subroutines;
        self.selections = selections;
    }

    #[cfg(test)]
    pub(crate) fn reported_miss_count(&self) -> usize {
        self.reported_misses.borrow().len()
    }

    /// Warn once per distinct missing name
    fn report_miss(&self, kind: &str, name: &str) {
        let key = format!("{kind}:{name}");
        if self.reported_misses.borrow_mut().insert(key) {
            log::warn!("Shader {} '{}' does not exist", kind, name);
        }
    }
}

impl<B: ShaderBackend> Drop for ShaderProgram<B> {
    fn drop(&mut self) {
        if self.handle != NULL_HANDLE {
            self.backend.delete_program(self.handle);
            self.handle = NULL_HANDLE;
        }
    }
}

fn sorted_by_location(map: &LocationMap) -> Vec<(&String, &i32)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
    entries
}
