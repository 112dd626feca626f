use glam::DVec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Color, ElementId, MeshShape, Transform3};
use crate::error::{ChartError, ChartResult};

/// Surface appearance of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
    /// Added light; `alpha` carries the emissive intensity.
    pub emissive: Color,
    pub opacity: f64,
}

impl Material {
    #[must_use]
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            emissive: Color::rgba(0.0, 0.0, 0.0, 0.0),
            opacity: 1.0,
        }
    }

    #[must_use]
    pub fn with_emissive(mut self, color: Color, intensity: f64) -> Self {
        self.emissive = color.with_alpha(intensity.clamp(0.0, 1.0));
        self
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(ChartError::InvalidData(
                "material opacity must be finite and in [0, 1]".to_owned(),
            ));
        }
        self.color.validate()?;
        self.emissive.validate()
    }
}

/// Draw command for one mesh in content space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshPrimitive {
    /// Interactive element this mesh represents, if any.
    pub element: Option<ElementId>,
    pub shape: MeshShape,
    pub transform: Transform3,
    pub material: Material,
    #[serde(default)]
    pub casts_shadow: bool,
}

impl MeshPrimitive {
    #[must_use]
    pub fn new(shape: MeshShape, transform: Transform3, material: Material) -> Self {
        Self {
            element: None,
            shape,
            transform,
            material,
            casts_shadow: true,
        }
    }

    #[must_use]
    pub fn for_element(mut self, element: ElementId) -> Self {
        self.element = Some(element);
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.shape.validate()?;
        self.transform.validate()?;
        self.material.validate()
    }
}

/// Horizontal text alignment relative to the projected anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// What a world-anchored label annotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelKind {
    BucketAxis,
    Percentage,
    Placeholder,
}

/// Text anchored at a world position and drawn facing the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPrimitive {
    pub kind: LabelKind,
    pub text: String,
    pub position: DVec3,
    pub font_size_px: f64,
    pub color: Color,
    pub h_align: TextHAlign,
}

impl LabelPrimitive {
    #[must_use]
    pub fn new(
        kind: LabelKind,
        text: impl Into<String>,
        position: DVec3,
        font_size_px: f64,
        color: Color,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
            font_size_px,
            color,
            h_align: TextHAlign::Center,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.text.is_empty() {
            return Err(ChartError::InvalidData(
                "label primitive must not be empty".to_owned(),
            ));
        }
        if !self.position.is_finite() {
            return Err(ChartError::InvalidData(
                "label position must be finite".to_owned(),
            ));
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Floating tooltip anchored above a hovered element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipPrimitive {
    pub element: ElementId,
    pub anchor: DVec3,
    pub title: String,
    pub lines: SmallVec<[String; 4]>,
    pub accent: Color,
}

impl TooltipPrimitive {
    pub fn validate(&self) -> ChartResult<()> {
        if self.title.is_empty() {
            return Err(ChartError::InvalidData(
                "tooltip title must not be empty".to_owned(),
            ));
        }
        if !self.anchor.is_finite() {
            return Err(ChartError::InvalidData(
                "tooltip anchor must be finite".to_owned(),
            ));
        }
        self.accent.validate()
    }
}

/// One legend row: color swatch plus name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
}

/// Screen-centered summary drawn over the content origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterOverlay {
    pub total_label: String,
    pub total_text: String,
    #[serde(default)]
    pub secondary_text: Option<String>,
}

/// Host-level panel replacing part or all of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayKind {
    /// Engine not ready or caller still loading.
    Loading,
    /// Host-level error: nothing else is drawn.
    Error,
    /// Content failed to build; chrome stays visible.
    ContentError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayPanel {
    pub kind: OverlayKind,
    pub message: String,
}

impl OverlayPanel {
    #[must_use]
    pub fn new(kind: OverlayKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Ground grid on the `y = 0` plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub visible: bool,
    pub size: f64,
    pub divisions: u32,
    pub center_line_color: Color,
    pub line_color: Color,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            visible: true,
            size: 20.0,
            divisions: 20,
            center_line_color: Color::from_hex(0x88_88_88),
            line_color: Color::from_hex(0xcc_cc_cc),
        }
    }
}

impl GridConfig {
    pub fn validate(self) -> ChartResult<()> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "grid size must be finite and > 0".to_owned(),
            ));
        }
        if self.divisions == 0 {
            return Err(ChartError::InvalidConfig(
                "grid divisions must be > 0".to_owned(),
            ));
        }
        self.center_line_color.validate()?;
        self.line_color.validate()
    }

    /// Grid line endpoints, X-parallel lines first then Z-parallel lines.
    #[must_use]
    pub fn line_segments(self) -> Vec<(DVec3, DVec3, bool)> {
        let half = self.size * 0.5;
        let step = self.size / f64::from(self.divisions);
        let mut segments = Vec::with_capacity((self.divisions as usize + 1) * 2);
        for i in 0..=self.divisions {
            let offset = -half + step * f64::from(i);
            let is_center = 2 * i == self.divisions;
            segments.push((
                DVec3::new(-half, 0.0, offset),
                DVec3::new(half, 0.0, offset),
                is_center,
            ));
        }
        for i in 0..=self.divisions {
            let offset = -half + step * f64::from(i);
            let is_center = 2 * i == self.divisions;
            segments.push((
                DVec3::new(offset, 0.0, -half),
                DVec3::new(offset, 0.0, half),
                is_center,
            ));
        }
        segments
    }
}
