use glam::DVec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f64::consts::TAU;
use tracing::trace;

use crate::core::geometry::{DEFAULT_RADIAL_SEGMENTS, ground_direction};
use crate::core::{
    Color, DonutChartData, EasedValue, ElementId, MeshShape, SliceSpan, Transform3,
    compute_slice_spans, format_percentage, format_value, is_label_visible,
};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    CenterOverlay, LabelKind, LabelPrimitive, LegendEntry, Material, MeshPrimitive, SceneFrame,
    TooltipPrimitive,
};

use super::{ChartPhase, ChartScene, SceneState};

/// Ring geometry, label and animation tuning of a donut chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonutChartConfig {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub height: f64,
    /// Radial offset of a fully hovered slice.
    pub explode_distance: f64,
    /// Percentages below this get no label on top of their slice.
    pub label_threshold_percent: f64,
    pub radial_segments: u32,
    pub hover_sharpness: f64,
    pub hover_emissive_intensity: f64,
    pub growth_per_second: f64,
    /// Content rotation speed in radians per second while nothing is hovered.
    pub idle_rotation_per_second: f64,
    pub label_font_size_px: f64,
    pub label_color: Color,
    pub tooltip_offset: f64,
    pub total_label: String,
    pub placeholder_text: String,
    pub show_legend: bool,
}

impl Default for DonutChartConfig {
    fn default() -> Self {
        Self {
            inner_radius: 1.2,
            outer_radius: 2.0,
            height: 0.5,
            explode_distance: 0.3,
            label_threshold_percent: 5.0,
            radial_segments: DEFAULT_RADIAL_SEGMENTS,
            hover_sharpness: 10.0,
            hover_emissive_intensity: 0.25,
            growth_per_second: 1.2,
            idle_rotation_per_second: 0.0,
            label_font_size_px: 13.0,
            label_color: Color::from_hex(0x22_22_22),
            tooltip_offset: 0.6,
            total_label: "Total".to_owned(),
            placeholder_text: "No data".to_owned(),
            show_legend: true,
        }
    }
}

impl DonutChartConfig {
    #[must_use]
    pub fn with_radii(mut self, inner_radius: f64, outer_radius: f64) -> Self {
        self.inner_radius = inner_radius;
        self.outer_radius = outer_radius;
        self
    }

    #[must_use]
    pub fn with_label_threshold_percent(mut self, threshold: f64) -> Self {
        self.label_threshold_percent = threshold;
        self
    }

    #[must_use]
    pub fn with_explode_distance(mut self, explode_distance: f64) -> Self {
        self.explode_distance = explode_distance;
        self
    }

    #[must_use]
    pub fn with_idle_rotation_per_second(mut self, radians_per_second: f64) -> Self {
        self.idle_rotation_per_second = radians_per_second;
        self
    }

    #[must_use]
    pub fn with_growth_per_second(mut self, growth_per_second: f64) -> Self {
        self.growth_per_second = growth_per_second;
        self
    }

    #[must_use]
    pub fn with_total_label(mut self, total_label: impl Into<String>) -> Self {
        self.total_label = total_label.into();
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.inner_radius.is_finite()
            || !self.outer_radius.is_finite()
            || self.inner_radius < 0.0
            || self.outer_radius <= self.inner_radius
        {
            return Err(ChartError::InvalidConfig(
                "donut radii must satisfy 0 <= inner < outer".to_owned(),
            ));
        }
        for (name, value) in [
            ("height", self.height),
            ("explode_distance", self.explode_distance),
            ("label_threshold_percent", self.label_threshold_percent),
            ("hover_sharpness", self.hover_sharpness),
            ("growth_per_second", self.growth_per_second),
            ("tooltip_offset", self.tooltip_offset),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "donut `{name}` must be finite and >= 0"
                )));
            }
        }
        if !self.idle_rotation_per_second.is_finite() {
            return Err(ChartError::InvalidConfig(
                "donut `idle_rotation_per_second` must be finite".to_owned(),
            ));
        }
        if self.radial_segments < 3 {
            return Err(ChartError::InvalidConfig(
                "donut `radial_segments` must be >= 3".to_owned(),
            ));
        }
        if !self.label_font_size_px.is_finite() || self.label_font_size_px <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "donut `label_font_size_px` must be finite and > 0".to_owned(),
            ));
        }
        if !(0.0..=1.0).contains(&self.hover_emissive_intensity) {
            return Err(ChartError::InvalidConfig(
                "donut `hover_emissive_intensity` must be in [0, 1]".to_owned(),
            ));
        }
        self.label_color.validate()
    }
}

/// Ring segments swept proportionally to each slice's count.
#[derive(Debug, Clone)]
pub struct DonutChartScene {
    data: DonutChartData,
    config: DonutChartConfig,
    spans: Vec<SliceSpan>,
    state: SceneState,
    explode_weights: Vec<EasedValue>,
    idle_angle: f64,
}

impl DonutChartScene {
    pub fn new(data: DonutChartData, config: DonutChartConfig) -> ChartResult<Self> {
        data.validate()?;
        config.validate()?;
        let spans = compute_slice_spans(&data.slices);
        Ok(Self {
            explode_weights: vec![EasedValue::default(); data.slices.len()],
            state: SceneState::new("donut_chart", config.growth_per_second),
            spans,
            data,
            config,
            idle_angle: 0.0,
        })
    }

    #[must_use]
    pub fn data(&self) -> &DonutChartData {
        &self.data
    }

    #[must_use]
    pub fn config(&self) -> &DonutChartConfig {
        &self.config
    }

    /// Angular spans in slice order; empty when the total is zero.
    #[must_use]
    pub fn spans(&self) -> &[SliceSpan] {
        &self.spans
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.state.progress()
    }

    /// Eased explode weight in `[0, 1]` of one slice.
    #[must_use]
    pub fn explode_weight(&self, slice: usize) -> Option<f64> {
        self.explode_weights.get(slice).map(|weight| weight.value())
    }

    /// Current idle rotation of the whole ring, in `[0, 2π)`.
    #[must_use]
    pub fn idle_angle(&self) -> f64 {
        self.idle_angle
    }

    /// Current radial offset of one slice along its mid-angle.
    #[must_use]
    pub fn explode_offset(&self, slice: usize) -> DVec3 {
        let Some(span) = self.spans.iter().find(|span| span.index == slice) else {
            return DVec3::ZERO;
        };
        let weight = self.explode_weight(slice).unwrap_or(0.0);
        ground_direction(span.mid_angle()) * self.config.explode_distance * weight
    }

    fn sync_explode_targets(&mut self) {
        let hovered = self.state.hovered();
        for (index, weight) in self.explode_weights.iter_mut().enumerate() {
            let target = if hovered == Some(ElementId::Slice(index)) {
                1.0
            } else {
                0.0
            };
            weight.set_target(target);
        }
    }

    fn is_idle_rotating(&self) -> bool {
        self.config.idle_rotation_per_second != 0.0
            && self.state.phase().is_visible()
            && self.state.hovered().is_none()
            && !self.spans.is_empty()
    }

    fn build_tooltip(&self, span: SliceSpan, top: f64) -> TooltipPrimitive {
        let slice = &self.data.slices[span.index];
        let title = match (&slice.icon, slice.label.is_empty()) {
            (Some(icon), false) => format!("{icon} {}", slice.label),
            (None, false) => slice.label.clone(),
            (Some(icon), true) if !icon.is_empty() => icon.clone(),
            _ => format!("Slice {}", span.index + 1),
        };
        let mut lines: SmallVec<[String; 4]> = SmallVec::new();
        lines.push(format!("Count: {}", slice.count));
        lines.push(format!("Share: {}", format_percentage(slice.percentage)));
        for metric in &slice.metrics {
            lines.push(format!("{}: {}", metric.label, format_value(metric.value)));
        }
        let radius = (self.config.inner_radius + self.config.outer_radius) * 0.5;
        TooltipPrimitive {
            element: ElementId::Slice(span.index),
            anchor: ground_direction(span.mid_angle()) * radius
                + self.explode_offset(span.index)
                + DVec3::Y * (top + self.config.tooltip_offset),
            title,
            lines,
            accent: slice.color,
        }
    }
}

impl ChartScene for DonutChartScene {
    fn name(&self) -> &'static str {
        "donut_chart"
    }

    fn phase(&self) -> ChartPhase {
        self.state.phase()
    }

    fn on_mount(&mut self) {
        self.state.mount();
    }

    fn on_reveal(&mut self) {
        self.state.reveal();
    }

    fn on_unmount(&mut self) {
        self.state.unmount();
        self.sync_explode_targets();
    }

    fn tick(&mut self, delta_seconds: f64) -> bool {
        if !self.state.phase().is_visible() {
            return false;
        }
        let growing = self.state.advance(delta_seconds);
        let mut easing = false;
        for weight in &mut self.explode_weights {
            easing |= weight.step(self.config.hover_sharpness, delta_seconds);
        }
        let rotating = self.is_idle_rotating() && delta_seconds > 0.0;
        if rotating {
            self.idle_angle = (self.idle_angle
                + self.config.idle_rotation_per_second * delta_seconds)
                .rem_euclid(TAU);
            trace!(angle = self.idle_angle, "donut idle rotation");
        }
        growing || easing || rotating
    }

    fn is_animating(&self) -> bool {
        self.state.phase() == ChartPhase::Growing
            || self.explode_weights.iter().any(|weight| !weight.is_settled())
            || self.is_idle_rotating()
    }

    fn hovered(&self) -> Option<ElementId> {
        self.state.hovered()
    }

    fn pointer_enter(&mut self, element: ElementId) -> bool {
        let ElementId::Slice(index) = element else {
            return false;
        };
        if !self
            .spans
            .iter()
            .any(|span| span.index == index && span.span > 0.0)
        {
            return false;
        }
        let changed = self.state.pointer_enter(element);
        if changed {
            self.sync_explode_targets();
        }
        changed
    }

    fn pointer_leave(&mut self, element: ElementId) -> bool {
        let changed = self.state.pointer_leave(element);
        if changed {
            self.sync_explode_targets();
        }
        changed
    }

    fn build(&self, frame: &mut SceneFrame) -> ChartResult<()> {
        let config = &self.config;
        if self.spans.is_empty() {
            frame.labels.push(LabelPrimitive::new(
                LabelKind::Placeholder,
                config.placeholder_text.clone(),
                DVec3::new(0.0, config.height * 0.5, 0.0),
                config.label_font_size_px,
                config.label_color,
            ));
            return Ok(());
        }

        frame.content_transform = Transform3::IDENTITY.with_rotation_y(self.idle_angle);
        frame.radial_segments = config.radial_segments;
        let progress = self.state.progress();
        let top = config.height * progress;
        let label_radius = (config.inner_radius + config.outer_radius) * 0.5;

        for span in self.spans.iter().copied() {
            // Zero-count slices own no angle and get no geometry.
            if span.span <= 0.0 {
                continue;
            }
            let slice = &self.data.slices[span.index];
            let element = ElementId::Slice(span.index);
            let weight = self.explode_weight(span.index).unwrap_or(0.0);
            let offset = self.explode_offset(span.index);

            let mesh = MeshPrimitive::new(
                MeshShape::ArcShell {
                    inner_radius: config.inner_radius,
                    outer_radius: config.outer_radius,
                    height: config.height,
                    start_angle: span.start_angle,
                    span: span.span.min(TAU),
                },
                Transform3::from_translation(offset).with_scale(DVec3::new(1.0, progress, 1.0)),
                Material::solid(slice.color)
                    .with_emissive(slice.color, config.hover_emissive_intensity * weight),
            )
            .for_element(element);
            mesh.validate()?;
            frame.meshes.push(mesh);

            if is_label_visible(slice.percentage, config.label_threshold_percent) {
                frame.labels.push(LabelPrimitive::new(
                    LabelKind::Percentage,
                    format_percentage(slice.percentage),
                    ground_direction(span.mid_angle()) * label_radius
                        + offset
                        + DVec3::Y * (top + 0.05),
                    config.label_font_size_px,
                    config.label_color,
                ));
            }

            if self.state.is_hovered(element) {
                frame.tooltips.push(self.build_tooltip(span, top));
            }
        }

        frame.center_overlay = Some(CenterOverlay {
            total_label: config.total_label.clone(),
            total_text: self.data.total_count().to_string(),
            secondary_text: self
                .data
                .secondary_total
                .as_ref()
                .map(|secondary| format!("{}: {}", secondary.label, format_value(secondary.value))),
        });

        if config.show_legend {
            frame
                .legend
                .extend(self.data.slices.iter().map(|slice| LegendEntry {
                    label: slice.label.clone(),
                    color: slice.color,
                }));
        }

        Ok(())
    }
}
