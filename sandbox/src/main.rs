use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use skycontest::prelude::*;

mod sky_layer;

use sky_layer::SkyLayer;

const CONFIG_FILE: &str = "skycontest.toml";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let exe_dir = env::current_exe()
        .context("could not locate the running executable")?
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    // Config path from the first argument, next to the executable otherwise
    let config_path = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| exe_dir.join(CONFIG_FILE));
    let config = AppConfig::load_or_default(&config_path);

    let shader_dir = resolve_shader_dir(&config.shaders.directory, &exe_dir);
    info!("Loading shaders from {}", shader_dir.display());

    let source = FileShaderSource::new(shader_dir, config.shaders.stages.clone());
    let layer = SkyLayer::new(source, config.shaders.debug_dump);

    let mut app = App::new(config);
    app.add_layer(Box::new(layer));
    app.run().context("render loop failed")?;

    info!("Bye");
    Ok(())
}

/// Relative shader directories are looked up next to the executable, then in
/// the working directory, then in this crate
fn resolve_shader_dir(directory: &Path, exe_dir: &Path) -> PathBuf {
    if directory.is_absolute() {
        return directory.to_path_buf();
    }

    let mut candidates = vec![exe_dir.join(directory)];
    if let Ok(cwd) = env::current_dir() {
        candidates.push(cwd.join(directory));
    }
    candidates.push(Path::new(env!("CARGO_MANIFEST_DIR")).join(directory));

    candidates
        .iter()
        .find(|candidate| candidate.is_dir())
        .cloned()
        .unwrap_or_else(|| exe_dir.join(directory))
}
