use super::shader::{ShaderStage, TransformFeedbackMode};
use super::uniform::{UniformArray, UniformMatrix, UniformValue};

/// Driver-side name of a shader object. Zero is never a live shader.
pub type ShaderId = u32;
/// Driver-side name of a program object. Zero is never a live program.
pub type ProgramId = u32;

pub const NULL_HANDLE: u32 = 0;

/// Location returned for names the program does not know about
pub const INVALID_LOCATION: i32 = -1;

/// This is the behaviour a graphics API should implement for shader programs,
/// translating the platform-specific details of the API to this trait.
///
/// Every method is a thin wrapper around one driver entry point (or a fixed
/// sequence of them). No caching or validation happens here; that is
/// the job of [CompilationUnit](super::compilation_unit::CompilationUnit) and
/// [ShaderProgram](super::shader_program::ShaderProgram).
pub trait ShaderBackend {
    // Shader objects
    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String>;
    fn delete_shader(&self, shader: ShaderId);
    /// Upload `source` and compile it, returning the compile status
    fn compile_shader(&self, shader: ShaderId, source: &str) -> bool;
    fn shader_info_log(&self, shader: ShaderId) -> String;

    // Program objects
    fn create_program(&self) -> Result<ProgramId, String>;
    fn delete_program(&self, program: ProgramId);
    fn is_program(&self, program: ProgramId) -> bool;
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    fn detach_shader(&self, program: ProgramId, shader: ShaderId);
    fn bind_attrib_location(&self, program: ProgramId, location: u32, name: &str);
    /// Link the program, returning the link status
    fn link_program(&self, program: ProgramId) -> bool;
    fn program_info_log(&self, program: ProgramId) -> String;
    fn use_program(&self, program: ProgramId);
    /// Program bound by the last [ShaderBackend::use_program], [NULL_HANDLE] if none
    fn current_program(&self) -> ProgramId;
    fn program_parameter(&self, program: ProgramId, parameter: u32) -> i32;
    fn set_program_parameter(&self, program: ProgramId, parameter: u32, value: i32);
    /// Outputs to capture, used by the next link of `program`
    fn transform_feedback_varyings(
        &self,
        program: ProgramId,
        varyings: &[&str],
        mode: TransformFeedbackMode,
    );

    // Introspection
    fn active_attributes(&self, program: ProgramId) -> Vec<String>;
    fn attrib_location(&self, program: ProgramId, name: &str) -> i32;
    fn active_uniforms(&self, program: ProgramId) -> Vec<String>;
    fn uniform_location(&self, program: ProgramId, name: &str) -> i32;

    // Subroutines
    fn active_subroutine_uniforms(&self, program: ProgramId, stage: ShaderStage) -> u32;
    /// Length of the selection vector expected by [ShaderBackend::uniform_subroutines]
    fn active_subroutine_uniform_locations(&self, program: ProgramId, stage: ShaderStage) -> u32;
    fn subroutine_uniform_name(&self, program: ProgramId, stage: ShaderStage, index: u32) -> String;
    fn subroutine_uniform_location(
        &self,
        program: ProgramId,
        stage: ShaderStage,
        name: &str,
    ) -> i32;
    fn compatible_subroutines(&self, program: ProgramId, stage: ShaderStage, index: u32)
        -> Vec<u32>;
    fn subroutine_name(&self, program: ProgramId, stage: ShaderStage, index: u32) -> String;
    /// Replace the whole subroutine selection of `stage` for the current program
    fn uniform_subroutines(&self, stage: ShaderStage, indices: &[u32]);

    // Uniform upload, targeted at `program` whether or not it is bound
    fn program_uniform(&self, program: ProgramId, location: i32, value: UniformValue);
    fn program_uniform_array(&self, program: ProgramId, location: i32, values: UniformArray<'_>);
    fn program_uniform_matrix(
        &self,
        program: ProgramId,
        location: i32,
        values: UniformMatrix<'_>,
        transpose: bool,
    );
}
