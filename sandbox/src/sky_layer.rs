use std::rc::Rc;
use std::sync::Arc;

use skycontest::prelude::*;

const ERROR_COLOR: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
const TIME_UNIFORM: &str = "Time";
const POSITION_ATTRIBUTE: &str = "position";

/// Draws a full-screen quad with the hot-reloaded sky shader and shows the
/// frame rate and the last shader error.
pub struct SkyLayer {
    source: FileShaderSource,
    debug_dump: bool,
    reload: Arc<ReloadController>,
    watcher: Option<ShaderWatcher>,
    program: Option<HotProgram<OpenGLShaderBackend>>,
    quad: Option<Mesh>,
}

impl SkyLayer {
    pub fn new(source: FileShaderSource, debug_dump: bool) -> Self {
        SkyLayer {
            source,
            debug_dump,
            reload: Arc::new(ReloadController::new()),
            watcher: None,
            program: None,
            quad: None,
        }
    }
}

impl Layer for SkyLayer {
    fn on_attach(&mut self, renderer: &mut OpenGLRenderBackend) {
        match OpenGLShaderBackend::new() {
            Ok(backend) => {
                let hot = HotProgram::new(Rc::new(backend))
                    .with_debug_dump(self.debug_dump)
                    .with_time_uniform(TIME_UNIFORM);
                self.program = Some(hot);
            }
            Err(e) => log::error!("Shaders are disabled: {e}"),
        }

        match ShaderWatcher::watch(self.source.directory(), self.reload.clone()) {
            Ok(watcher) => self.watcher = Some(watcher),
            Err(e) => log::warn!(
                "Could not watch {}, hot reload disabled: {e}",
                self.source.directory().display()
            ),
        }

        match renderer.create_mesh(&QUAD_VERTICES, QUAD_COMPONENTS, &QUAD_INDICES) {
            Ok(quad) => self.quad = Some(quad),
            Err(e) => log::error!("Could not create the sky quad: {e}"),
        }
    }

    fn on_detach(&mut self, renderer: &mut OpenGLRenderBackend) {
        self.watcher = None;
        self.program = None;
        if let Some(quad) = self.quad.take() {
            renderer.destroy_mesh(quad);
        }
    }

    fn update(&mut self, time: &Time, renderer: &mut OpenGLRenderBackend) {
        let Some(hot) = self.program.as_mut() else {
            return;
        };

        let frame = FrameContext {
            reload: &self.reload,
            source: &self.source,
            time,
        };
        let outcome = hot.update(&frame);

        let Some(program) = hot.program() else {
            return;
        };
        let Some(quad) = self.quad.as_mut() else {
            return;
        };
        if outcome == RebuildOutcome::Rebuilt {
            match program.attribute_slot(POSITION_ATTRIBUTE) {
                Some(slot) => renderer.bind_mesh_attribute(quad, slot),
                None => log::warn!("The sky shader has no '{POSITION_ATTRIBUTE}' input"),
            }
        }

        if quad.attribute().is_some() && program.use_program() {
            renderer.draw_indexed(quad);
        }
    }

    fn imgui_update(&mut self, _time: &Time, ui: &mut imgui::Ui) {
        let (rebuilds, error) = match &self.program {
            Some(hot) => (hot.rebuild_count(), hot.last_error()),
            None => (0, "shaders are disabled"),
        };

        ui.window("SkyContest")
            .size([420.0, 160.0], imgui::Condition::FirstUseEver)
            .build(|| {
                let framerate = ui.io().framerate;
                ui.text(format!(
                    "Application average {:.3} ms/frame ({:.1} FPS)",
                    1000.0 / framerate,
                    framerate
                ));
                ui.text(format!("Shader rebuilds: {}", rebuilds));
                if !error.is_empty() {
                    ui.text_colored(ERROR_COLOR, error);
                }
            });
    }
}
