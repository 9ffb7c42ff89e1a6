use std::fs;
use std::path::{Path, PathBuf};

use super::shader::{ShaderError, ShaderStage};

/// Provides the source text of each stage of the program being rebuilt
pub trait ShaderSource {
    /// Stages that make up the program, in attach order
    fn stages(&self) -> &[ShaderStage];

    fn load(&self, stage: ShaderStage) -> Result<String, ShaderError>;
}

/// Reads `<directory>/<stage>.glsl` files, see [ShaderStage::file_name]
#[derive(Debug, Clone)]
pub struct FileShaderSource {
    directory: PathBuf,
    stages: Vec<ShaderStage>,
}

impl FileShaderSource {
    pub fn new(directory: impl Into<PathBuf>, stages: Vec<ShaderStage>) -> Self {
        FileShaderSource {
            directory: directory.into(),
            stages,
        }
    }

    /// Vertex and fragment stages only
    pub fn vertex_fragment(directory: impl Into<PathBuf>) -> Self {
        Self::new(
            directory,
            vec![ShaderStage::Vertex, ShaderStage::Fragment],
        )
    }

    #[inline(always)]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, stage: ShaderStage) -> PathBuf {
        self.directory.join(stage.file_name())
    }
}

impl ShaderSource for FileShaderSource {
    fn stages(&self) -> &[ShaderStage] {
        &self.stages
    }

    fn load(&self, stage: ShaderStage) -> Result<String, ShaderError> {
        if !self.stages.contains(&stage) {
            return Err(ShaderError::UnsupportedStage(stage));
        }

        let path = self.path_for(stage);
        fs::read_to_string(&path).map_err(|e| ShaderError::SourceUnavailable {
            stage,
            path,
            reason: e.to_string(),
        })
    }
}
