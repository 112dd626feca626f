use crate::error::ChartResult;
use crate::render::{RenderSettings, Renderer, SceneFrame};

/// No-op renderer used by tests and headless hosts.
///
/// It still validates frame content so tests can catch invalid geometry before
/// a real backend is introduced.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub prepared: Option<RenderSettings>,
    pub frames_rendered: usize,
    pub last_mesh_count: usize,
    pub last_label_count: usize,
    pub last_frame: Option<SceneFrame>,
}

impl Renderer for NullRenderer {
    fn prepare(&mut self, settings: &RenderSettings) -> ChartResult<()> {
        settings.validate()?;
        self.prepared = Some(*settings);
        Ok(())
    }

    fn render(&mut self, frame: &SceneFrame) -> ChartResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_mesh_count = frame.meshes.len();
        self.last_label_count = frame.labels.len();
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}
