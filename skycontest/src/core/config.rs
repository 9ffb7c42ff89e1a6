//! Application configuration, read from a TOML file

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::rendering::shader::ShaderStage;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub shaders: ShaderConfig,
    /// RGBA clear color
    pub clear_color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Directory holding one `<stage>.glsl` file per stage
    pub directory: PathBuf,
    pub stages: Vec<ShaderStage>,
    /// Log introspection results after every successful link
    pub debug_dump: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            window: WindowConfig::default(),
            shaders: ShaderConfig::default(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 1200,
            height: 800,
            title: "SkyContest".to_owned(),
            vsync: false,
        }
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        ShaderConfig {
            directory: PathBuf::from("assets"),
            stages: vec![ShaderStage::Vertex, ShaderStage::Fragment],
            debug_dump: false,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Defaults when the file does not exist, defaults and a warning when it
    /// exists but cannot be used
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}, using defaults");
                Self::default()
            }
        }
    }
}
