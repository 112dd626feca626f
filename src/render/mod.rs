mod frame;
mod lighting;
mod null_renderer;
mod primitives;

pub use frame::{SceneChrome, SceneFrame};
pub use lighting::{LightDef, RenderSettings, ToneMapping, default_lights, shade};
pub use null_renderer::NullRenderer;
pub use primitives::{
    CenterOverlay, GridConfig, LabelKind, LabelPrimitive, LegendEntry, Material, MeshPrimitive,
    OverlayKind, OverlayPanel, TextHAlign, TooltipPrimitive,
};

pub use crate::core::Color;

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized `SceneFrame`, so drawing code stays
/// isolated from chart data, animation and interaction state.
pub trait Renderer {
    /// Sets up the rendering context (clear color, pixel ratio, shadows,
    /// tone mapping) before the first frame.
    fn prepare(&mut self, settings: &RenderSettings) -> ChartResult<()> {
        settings.validate()
    }

    fn render(&mut self, frame: &SceneFrame) -> ChartResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};
