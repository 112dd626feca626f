use serde::{Deserialize, Serialize};

use crate::core::geometry::DEFAULT_RADIAL_SEGMENTS;
use crate::core::{CameraView, Transform3, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    CenterOverlay, GridConfig, LabelPrimitive, LegendEntry, LightDef, MeshPrimitive, OverlayKind,
    OverlayPanel, RenderSettings, TooltipPrimitive,
};

/// Camera, lights and ground grid surrounding the chart content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneChrome {
    pub camera: CameraView,
    pub lights: Vec<LightDef>,
    pub grid: GridConfig,
    pub settings: RenderSettings,
}

/// Backend-agnostic scene for one draw pass.
///
/// Content primitives are expressed in content space; `content_transform`
/// places the whole content group in the world (idle rotation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFrame {
    pub viewport: Viewport,
    pub chrome: Option<SceneChrome>,
    pub content_transform: Transform3,
    /// Segment count used when tessellating a full ring.
    #[serde(default = "default_radial_segments")]
    pub radial_segments: u32,
    pub meshes: Vec<MeshPrimitive>,
    pub labels: Vec<LabelPrimitive>,
    pub tooltips: Vec<TooltipPrimitive>,
    pub legend: Vec<LegendEntry>,
    pub center_overlay: Option<CenterOverlay>,
    pub overlay: Option<OverlayPanel>,
}

fn default_radial_segments() -> u32 {
    DEFAULT_RADIAL_SEGMENTS
}

impl SceneFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            chrome: None,
            content_transform: Transform3::IDENTITY,
            radial_segments: DEFAULT_RADIAL_SEGMENTS,
            meshes: Vec::new(),
            labels: Vec::new(),
            tooltips: Vec::new(),
            legend: Vec::new(),
            center_overlay: None,
            overlay: None,
        }
    }

    #[must_use]
    pub fn with_chrome(mut self, chrome: SceneChrome) -> Self {
        self.chrome = Some(chrome);
        self
    }

    #[must_use]
    pub fn with_overlay(mut self, overlay: OverlayPanel) -> Self {
        self.overlay = Some(overlay);
        self
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh: MeshPrimitive) -> Self {
        self.meshes.push(mesh);
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: LabelPrimitive) -> Self {
        self.labels.push(label);
        self
    }

    /// Drops every content primitive while keeping chrome and overlay.
    pub fn clear_content(&mut self) {
        self.content_transform = Transform3::IDENTITY;
        self.radial_segments = DEFAULT_RADIAL_SEGMENTS;
        self.meshes.clear();
        self.labels.clear();
        self.tooltips.clear();
        self.legend.clear();
        self.center_overlay = None;
    }

    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.meshes.is_empty()
            || !self.labels.is_empty()
            || !self.tooltips.is_empty()
            || !self.legend.is_empty()
            || self.center_overlay.is_some()
    }

    #[must_use]
    pub fn overlay_kind(&self) -> Option<OverlayKind> {
        self.overlay.as_ref().map(|overlay| overlay.kind)
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        if let Some(chrome) = &self.chrome {
            chrome.camera.validate()?;
            chrome.grid.validate()?;
            chrome.settings.validate()?;
            for light in &chrome.lights {
                light.validate()?;
            }
        }
        self.validate_content()
    }

    /// Checks only the primitives a chart scene contributes.
    pub fn validate_content(&self) -> ChartResult<()> {
        self.content_transform.validate()?;
        if self.radial_segments < 3 {
            return Err(ChartError::InvalidData(
                "radial segment count must be >= 3".to_owned(),
            ));
        }
        for mesh in &self.meshes {
            mesh.validate()?;
        }
        for label in &self.labels {
            label.validate()?;
        }
        for tooltip in &self.tooltips {
            tooltip.validate()?;
        }
        for entry in &self.legend {
            entry.color.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chrome.is_none() && self.overlay.is_none() && !self.has_content()
    }
}
