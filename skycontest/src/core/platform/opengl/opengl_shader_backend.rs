use std::ffi::CString;

use gl::types::{GLboolean, GLchar, GLenum, GLint, GLsizei, GLuint};

use crate::core::rendering::shader::{ShaderError, ShaderStage, TransformFeedbackMode};
use crate::core::rendering::shader_backend::{
    ProgramId, ShaderBackend, ShaderId, INVALID_LOCATION, NULL_HANDLE,
};
use crate::core::rendering::uniform::{UniformArray, UniformMatrix, UniformValue};

/// [ShaderBackend] on top of the `gl` bindings.
///
/// The functions must have been loaded with `gl::load_with` for the context
/// current on this thread (see [WinitWindow](crate::core::platform::winit_window::WinitWindow)),
/// and every call has to happen on that thread.
pub struct OpenGLShaderBackend {
    has_subroutines: bool,
}

impl OpenGLShaderBackend {
    pub fn new() -> Result<Self, ShaderError> {
        if !gl::CreateProgram::is_loaded() || !gl::ProgramUniform1f::is_loaded() {
            return Err(ShaderError::Backend(
                "OpenGL 4.1 program functions are not loaded".into(),
            ));
        }

        let has_subroutines =
            gl::GetProgramStageiv::is_loaded() && gl::UniformSubroutinesuiv::is_loaded();
        if !has_subroutines {
            log::warn!("Shader subroutines are not supported by this context");
        }

        Ok(OpenGLShaderBackend { has_subroutines })
    }
}

fn stage_to_gl(stage: ShaderStage) -> GLenum {
    match stage {
        ShaderStage::Vertex => gl::VERTEX_SHADER,
        ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        ShaderStage::Geometry => gl::GEOMETRY_SHADER,
        ShaderStage::TessControl => gl::TESS_CONTROL_SHADER,
        ShaderStage::TessEvaluation => gl::TESS_EVALUATION_SHADER,
        ShaderStage::Compute => gl::COMPUTE_SHADER,
    }
}

fn gl_bool(value: bool) -> GLboolean {
    if value {
        gl::TRUE
    } else {
        gl::FALSE
    }
}

/// Bytes written by the driver into `buffer`, as text
fn buffer_to_string(mut buffer: Vec<u8>, written: GLsizei) -> String {
    buffer.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Calls `fill(capacity, &mut written, buffer)` with a buffer of `capacity` bytes
fn read_name(capacity: GLint, fill: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
    if capacity <= 0 {
        return String::new();
    }
    let mut buffer = vec![0u8; capacity as usize];
    let mut written: GLsizei = 0;
    fill(
        capacity,
        &mut written as *mut GLsizei,
        buffer.as_mut_ptr() as *mut GLchar,
    );
    buffer_to_string(buffer, written)
}

impl ShaderBackend for OpenGLShaderBackend {
    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String> {
        let shader = unsafe { gl::CreateShader(stage_to_gl(stage)) };
        if shader == NULL_HANDLE {
            return Err(format!("Could not create OpenGL {} shader", stage));
        }
        Ok(shader)
    }

    fn delete_shader(&self, shader: ShaderId) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn compile_shader(&self, shader: ShaderId, source: &str) -> bool {
        let text = source.as_ptr() as *const GLchar;
        let length = source.len() as GLint;
        let mut status: GLint = 0;

        unsafe {
            gl::ShaderSource(shader, 1, &text, &length);
            gl::CompileShader(shader);
            gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
        }
        status == gl::TRUE as GLint
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        let mut length: GLint = 0;
        unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut length) };
        if length <= 1 {
            return String::new();
        }

        read_name(length, |capacity, written, buffer| unsafe {
            gl::GetShaderInfoLog(shader, capacity, written, buffer)
        })
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        let program = unsafe { gl::CreateProgram() };
        if program == NULL_HANDLE {
            return Err("Could not create OpenGL program".into());
        }
        Ok(program)
    }

    fn delete_program(&self, program: ProgramId) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn is_program(&self, program: ProgramId) -> bool {
        unsafe { gl::IsProgram(program) == gl::TRUE }
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe { gl::DetachShader(program, shader) }
    }

    fn bind_attrib_location(&self, program: ProgramId, location: u32, name: &str) {
        let Ok(name) = CString::new(name) else {
            log::warn!("Attribute name {:?} contains a NUL byte", name);
            return;
        };
        unsafe { gl::BindAttribLocation(program, location, name.as_ptr()) }
    }

    fn link_program(&self, program: ProgramId) -> bool {
        unsafe { gl::LinkProgram(program) };
        self.program_parameter(program, gl::LINK_STATUS) == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        let length = self.program_parameter(program, gl::INFO_LOG_LENGTH);
        if length <= 1 {
            return String::new();
        }

        read_name(length, |capacity, written, buffer| unsafe {
            gl::GetProgramInfoLog(program, capacity, written, buffer)
        })
    }

    fn use_program(&self, program: ProgramId) {
        unsafe { gl::UseProgram(program) }
    }

    fn current_program(&self) -> ProgramId {
        let mut program: GLint = 0;
        unsafe { gl::GetIntegerv(gl::CURRENT_PROGRAM, &mut program) };
        program.max(0) as ProgramId
    }

    fn program_parameter(&self, program: ProgramId, parameter: u32) -> i32 {
        let mut value: GLint = 0;
        unsafe { gl::GetProgramiv(program, parameter, &mut value) };
        value
    }

    fn set_program_parameter(&self, program: ProgramId, parameter: u32, value: i32) {
        unsafe { gl::ProgramParameteri(program, parameter, value) }
    }

    fn transform_feedback_varyings(
        &self,
        program: ProgramId,
        varyings: &[&str],
        mode: TransformFeedbackMode,
    ) {
        let names: Result<Vec<CString>, _> =
            varyings.iter().map(|name| CString::new(*name)).collect();
        let Ok(names) = names else {
            log::warn!("Transform feedback varyings {:?} contain a NUL byte", varyings);
            return;
        };
        let pointers: Vec<*const GLchar> = names.iter().map(|name| name.as_ptr()).collect();
        let buffer_mode = match mode {
            TransformFeedbackMode::Interleaved => gl::INTERLEAVED_ATTRIBS,
            TransformFeedbackMode::Separate => gl::SEPARATE_ATTRIBS,
        };

        unsafe {
            gl::TransformFeedbackVaryings(
                program,
                pointers.len() as GLsizei,
                pointers.as_ptr(),
                buffer_mode,
            )
        }
    }

    fn active_attributes(&self, program: ProgramId) -> Vec<String> {
        let count = self.program_parameter(program, gl::ACTIVE_ATTRIBUTES);
        let max_length = self.program_parameter(program, gl::ACTIVE_ATTRIBUTE_MAX_LENGTH);

        (0..count.max(0) as GLuint)
            .map(|index| {
                read_name(max_length, |capacity, written, buffer| {
                    let mut size: GLint = 0;
                    let mut data_type: GLenum = 0;
                    unsafe {
                        gl::GetActiveAttrib(
                            program,
                            index,
                            capacity,
                            written,
                            &mut size,
                            &mut data_type,
                            buffer,
                        )
                    }
                })
            })
            .collect()
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> i32 {
        match CString::new(name) {
            Ok(name) => unsafe { gl::GetAttribLocation(program, name.as_ptr()) },
            Err(_) => INVALID_LOCATION,
        }
    }

    fn active_uniforms(&self, program: ProgramId) -> Vec<String> {
        let count = self.program_parameter(program, gl::ACTIVE_UNIFORMS);
        let max_length = self.program_parameter(program, gl::ACTIVE_UNIFORM_MAX_LENGTH);

        (0..count.max(0) as GLuint)
            .map(|index| {
                read_name(max_length, |capacity, written, buffer| {
                    let mut size: GLint = 0;
                    let mut data_type: GLenum = 0;
                    unsafe {
                        gl::GetActiveUniform(
                            program,
                            index,
                            capacity,
                            written,
                            &mut size,
                            &mut data_type,
                            buffer,
                        )
                    }
                })
            })
            .collect()
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> i32 {
        match CString::new(name) {
            Ok(name) => unsafe { gl::GetUniformLocation(program, name.as_ptr()) },
            Err(_) => INVALID_LOCATION,
        }
    }

    fn active_subroutine_uniforms(&self, program: ProgramId, stage: ShaderStage) -> u32 {
        if !self.has_subroutines {
            return 0;
        }
        let mut count: GLint = 0;
        unsafe {
            gl::GetProgramStageiv(
                program,
                stage_to_gl(stage),
                gl::ACTIVE_SUBROUTINE_UNIFORMS,
                &mut count,
            )
        };
        count.max(0) as u32
    }

    fn active_subroutine_uniform_locations(&self, program: ProgramId, stage: ShaderStage) -> u32 {
        if !self.has_subroutines {
            return 0;
        }
        let mut count: GLint = 0;
        unsafe {
            gl::GetProgramStageiv(
                program,
                stage_to_gl(stage),
                gl::ACTIVE_SUBROUTINE_UNIFORM_LOCATIONS,
                &mut count,
            )
        };
        count.max(0) as u32
    }

    fn subroutine_uniform_name(&self, program: ProgramId, stage: ShaderStage, index: u32) -> String {
        let mut max_length: GLint = 0;
        unsafe {
            gl::GetProgramStageiv(
                program,
                stage_to_gl(stage),
                gl::ACTIVE_SUBROUTINE_UNIFORM_MAX_LENGTH,
                &mut max_length,
            )
        };

        read_name(max_length, |capacity, written, buffer| unsafe {
            gl::GetActiveSubroutineUniformName(
                program,
                stage_to_gl(stage),
                index,
                capacity,
                written,
                buffer,
            )
        })
    }

    fn subroutine_uniform_location(
        &self,
        program: ProgramId,
        stage: ShaderStage,
        name: &str,
    ) -> i32 {
        match CString::new(name) {
            Ok(name) => unsafe {
                gl::GetSubroutineUniformLocation(program, stage_to_gl(stage), name.as_ptr())
            },
            Err(_) => INVALID_LOCATION,
        }
    }

    fn compatible_subroutines(&self, program: ProgramId, stage: ShaderStage, index: u32) -> Vec<u32> {
        let mut count: GLint = 0;
        unsafe {
            gl::GetActiveSubroutineUniformiv(
                program,
                stage_to_gl(stage),
                index,
                gl::NUM_COMPATIBLE_SUBROUTINES,
                &mut count,
            )
        };
        if count <= 0 {
            return Vec::new();
        }

        let mut subroutines: Vec<GLint> = vec![0; count as usize];
        unsafe {
            gl::GetActiveSubroutineUniformiv(
                program,
                stage_to_gl(stage),
                index,
                gl::COMPATIBLE_SUBROUTINES,
                subroutines.as_mut_ptr(),
            )
        };
        subroutines.into_iter().map(|s| s as u32).collect()
    }

    fn subroutine_name(&self, program: ProgramId, stage: ShaderStage, index: u32) -> String {
        let mut max_length: GLint = 0;
        unsafe {
            gl::GetProgramStageiv(
                program,
                stage_to_gl(stage),
                gl::ACTIVE_SUBROUTINE_MAX_LENGTH,
                &mut max_length,
            )
        };

        read_name(max_length, |capacity, written, buffer| unsafe {
            gl::GetActiveSubroutineName(
                program,
                stage_to_gl(stage),
                index,
                capacity,
                written,
                buffer,
            )
        })
    }

    fn uniform_subroutines(&self, stage: ShaderStage, indices: &[u32]) {
        if !self.has_subroutines || indices.is_empty() {
            return;
        }
        unsafe {
            gl::UniformSubroutinesuiv(
                stage_to_gl(stage),
                indices.len() as GLsizei,
                indices.as_ptr(),
            )
        }
    }

    fn program_uniform(&self, program: ProgramId, location: i32, value: UniformValue) {
        unsafe {
            match value {
                UniformValue::Float(x) => gl::ProgramUniform1f(program, location, x),
                UniformValue::Float2(x, y) => gl::ProgramUniform2f(program, location, x, y),
                UniformValue::Float3(x, y, z) => gl::ProgramUniform3f(program, location, x, y, z),
                UniformValue::Float4(x, y, z, w) => {
                    gl::ProgramUniform4f(program, location, x, y, z, w)
                }
                UniformValue::Int(x) => gl::ProgramUniform1i(program, location, x),
                UniformValue::Int2(x, y) => gl::ProgramUniform2i(program, location, x, y),
                UniformValue::Int3(x, y, z) => gl::ProgramUniform3i(program, location, x, y, z),
                UniformValue::Int4(x, y, z, w) => {
                    gl::ProgramUniform4i(program, location, x, y, z, w)
                }
                UniformValue::Uint(x) => gl::ProgramUniform1ui(program, location, x),
                UniformValue::Uint2(x, y) => gl::ProgramUniform2ui(program, location, x, y),
                UniformValue::Uint3(x, y, z) => gl::ProgramUniform3ui(program, location, x, y, z),
                UniformValue::Uint4(x, y, z, w) => {
                    gl::ProgramUniform4ui(program, location, x, y, z, w)
                }
            }
        }
    }

    fn program_uniform_array(&self, program: ProgramId, location: i32, values: UniformArray<'_>) {
        let count = values.count() as GLsizei;
        if count == 0 {
            return;
        }

        unsafe {
            match values {
                UniformArray::Float(v) => gl::ProgramUniform1fv(program, location, count, v.as_ptr()),
                UniformArray::Float2(v) => gl::ProgramUniform2fv(program, location, count, v.as_ptr()),
                UniformArray::Float3(v) => gl::ProgramUniform3fv(program, location, count, v.as_ptr()),
                UniformArray::Float4(v) => gl::ProgramUniform4fv(program, location, count, v.as_ptr()),
                UniformArray::Int(v) => gl::ProgramUniform1iv(program, location, count, v.as_ptr()),
                UniformArray::Int2(v) => gl::ProgramUniform2iv(program, location, count, v.as_ptr()),
                UniformArray::Int3(v) => gl::ProgramUniform3iv(program, location, count, v.as_ptr()),
                UniformArray::Int4(v) => gl::ProgramUniform4iv(program, location, count, v.as_ptr()),
                UniformArray::Uint(v) => gl::ProgramUniform1uiv(program, location, count, v.as_ptr()),
                UniformArray::Uint2(v) => gl::ProgramUniform2uiv(program, location, count, v.as_ptr()),
                UniformArray::Uint3(v) => gl::ProgramUniform3uiv(program, location, count, v.as_ptr()),
                UniformArray::Uint4(v) => gl::ProgramUniform4uiv(program, location, count, v.as_ptr()),
            }
        }
    }

    fn program_uniform_matrix(
        &self,
        program: ProgramId,
        location: i32,
        values: UniformMatrix<'_>,
        transpose: bool,
    ) {
        let count = values.count() as GLsizei;
        if count == 0 {
            return;
        }

        let transpose = gl_bool(transpose);
        let data = values.as_slice().as_ptr();
        unsafe {
            match values {
                UniformMatrix::Mat2(_) => {
                    gl::ProgramUniformMatrix2fv(program, location, count, transpose, data)
                }
                UniformMatrix::Mat3(_) => {
                    gl::ProgramUniformMatrix3fv(program, location, count, transpose, data)
                }
                UniformMatrix::Mat4(_) => {
                    gl::ProgramUniformMatrix4fv(program, location, count, transpose, data)
                }
                UniformMatrix::Mat2x3(_) => {
                    gl::ProgramUniformMatrix2x3fv(program, location, count, transpose, data)
                }
                UniformMatrix::Mat3x2(_) => {
                    gl::ProgramUniformMatrix3x2fv(program, location, count, transpose, data)
                }
                UniformMatrix::Mat2x4(_) => {
                    gl::ProgramUniformMatrix2x4fv(program, location, count, transpose, data)
                }
                UniformMatrix::Mat4x2(_) => {
                    gl::ProgramUniformMatrix4x2fv(program, location, count, transpose, data)
                }
                UniformMatrix::Mat3x4(_) => {
                    gl::ProgramUniformMatrix3x4fv(program, location, count, transpose, data)
                }
                UniformMatrix::Mat4x3(_) => {
                    gl::ProgramUniformMatrix4x3fv(program, location, count, transpose, data)
                }
            }
        }
    }
}
