use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline stages a compilation unit can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
    Compute,
}

impl ShaderStage {
    /// Stages in the order they are walked during link-time introspection
    pub const ALL: [ShaderStage; 6] = [
        ShaderStage::Vertex,
        ShaderStage::Geometry,
        ShaderStage::TessControl,
        ShaderStage::TessEvaluation,
        ShaderStage::Compute,
        ShaderStage::Fragment,
    ];

    /// File name used for this stage inside a shader directory
    pub fn file_name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex.glsl",
            ShaderStage::Fragment => "fragment.glsl",
            ShaderStage::Geometry => "geometry.glsl",
            ShaderStage::TessControl => "tess_control.glsl",
            ShaderStage::TessEvaluation => "tess_evaluation.glsl",
            ShaderStage::Compute => "compute.glsl",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Geometry => "geometry",
            ShaderStage::TessControl => "tessellation control",
            ShaderStage::TessEvaluation => "tessellation evaluation",
            ShaderStage::Compute => "compute",
        };
        f.write_str(name)
    }
}

/// Lifecycle of a [ShaderProgram](super::shader_program::ShaderProgram)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramState {
    /// Never linked successfully nor unsuccessfully
    Unlinked,
    /// Last link succeeded, introspection is current
    Linked,
    /// Last link failed, introspection holds whatever the previous good link produced
    LinkFailed,
}

/// How captured varyings are laid out in the transform feedback buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformFeedbackMode {
    /// All varyings in a single buffer
    Interleaved,
    /// One buffer per varying
    Separate,
}

#[derive(Debug, Error)]
pub enum ShaderError {
    /// A single stage did not compile
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    /// Compiled units could not be linked together
    #[error("program failed to link:\n{0}")]
    Link(String),
    /// The source for a stage could not be read
    #[error("could not read {stage} shader '{}': {reason}", path.display())]
    SourceUnavailable {
        stage: ShaderStage,
        path: PathBuf,
        reason: String,
    },
    /// No source is configured for this stage
    #[error("no source configured for the {0} stage")]
    UnsupportedStage(ShaderStage),
    /// Unknown subroutine uniform or subroutine for a stage
    #[error("subroutine '{subroutine}' for uniform '{uniform}' is not active in the {stage} stage")]
    SubroutineNotFound {
        stage: ShaderStage,
        uniform: String,
        subroutine: String,
    },
    /// The graphics context refused to hand out an object
    #[error("graphics backend error: {0}")]
    Backend(String),
}
