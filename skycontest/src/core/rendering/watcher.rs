use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::reload::ReloadController;

/// Marks a [ReloadController] dirty whenever something below a directory
/// changes. Runs on the notify backend thread; the controller is the only
/// thing it shares with the render loop.
pub struct ShaderWatcher {
    directory: PathBuf,
    _watcher: RecommendedWatcher,
}

impl ShaderWatcher {
    pub fn watch(
        directory: impl AsRef<Path>,
        reload: Arc<ReloadController>,
    ) -> Result<Self, notify::Error> {
        let directory = directory.as_ref().to_path_buf();

        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if is_source_change(&event.kind) {
                        log::debug!("Shader change detected: {:?}", event.paths);
                        reload.mark_dirty();
                    }
                }
                Err(e) => log::warn!("Shader watcher error: {e}"),
            })?;
        watcher.watch(&directory, RecursiveMode::Recursive)?;
        log::info!("Watching {} for shader changes", directory.display());

        Ok(ShaderWatcher {
            directory,
            _watcher: watcher,
        })
    }

    #[inline(always)]
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Access events are excluded, reading the sources during a rebuild must not
/// trigger another one
pub(crate) fn is_source_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}
