use glam::DVec3;
use serde::{Deserialize, Serialize};
use smallvec::smallvec;

use crate::core::{
    BarGridSpacing, CategorySeries, Color, EasedValue, ElementId, MeshShape, Transform3,
    bar_height, bucket_center_x, category_maxima, format_value, layout_bar_slots,
};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    LabelKind, LabelPrimitive, LegendEntry, Material, MeshPrimitive, SceneFrame, TooltipPrimitive,
};

use super::{ChartPhase, ChartScene, SceneState};

/// Layout, animation and hover tuning of a bar chart.
///
/// Missing JSON fields fall back to `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarChartConfig {
    pub bucket_spacing: f64,
    pub category_spacing: f64,
    pub bar_width: f64,
    pub bar_depth: f64,
    pub max_visual_height: f64,
    /// Lateral scale of a fully hovered bar.
    pub hover_scale: f64,
    /// Exponential smoothing rate of hover easing, per second.
    pub hover_sharpness: f64,
    pub hover_emissive_intensity: f64,
    /// Entrance animation speed; `1.0` grows in one second.
    pub growth_per_second: f64,
    pub label_font_size_px: f64,
    pub label_color: Color,
    /// Distance between the front row of bars and the bucket labels.
    pub label_offset: f64,
    pub tooltip_offset: f64,
    pub show_legend: bool,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self {
            bucket_spacing: 2.0,
            category_spacing: 0.6,
            bar_width: 0.4,
            bar_depth: 0.4,
            max_visual_height: 5.0,
            hover_scale: 1.1,
            hover_sharpness: 12.0,
            hover_emissive_intensity: 0.3,
            growth_per_second: 1.2,
            label_font_size_px: 12.0,
            label_color: Color::from_hex(0x33_33_33),
            label_offset: 0.6,
            tooltip_offset: 0.5,
            show_legend: true,
        }
    }
}

impl BarChartConfig {
    #[must_use]
    pub fn with_max_visual_height(mut self, max_visual_height: f64) -> Self {
        self.max_visual_height = max_visual_height;
        self
    }

    #[must_use]
    pub fn with_growth_per_second(mut self, growth_per_second: f64) -> Self {
        self.growth_per_second = growth_per_second;
        self
    }

    #[must_use]
    pub fn with_hover(mut self, hover_scale: f64, hover_sharpness: f64) -> Self {
        self.hover_scale = hover_scale;
        self.hover_sharpness = hover_sharpness;
        self
    }

    pub fn validate(self) -> ChartResult<()> {
        for (name, value) in [
            ("bucket_spacing", self.bucket_spacing),
            ("category_spacing", self.category_spacing),
            ("bar_width", self.bar_width),
            ("bar_depth", self.bar_depth),
            ("hover_scale", self.hover_scale),
            ("label_font_size_px", self.label_font_size_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "bar chart `{name}` must be finite and > 0"
                )));
            }
        }
        for (name, value) in [
            ("max_visual_height", self.max_visual_height),
            ("hover_sharpness", self.hover_sharpness),
            ("growth_per_second", self.growth_per_second),
            ("label_offset", self.label_offset),
            ("tooltip_offset", self.tooltip_offset),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "bar chart `{name}` must be finite and >= 0"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.hover_emissive_intensity) {
            return Err(ChartError::InvalidConfig(
                "bar chart `hover_emissive_intensity` must be in [0, 1]".to_owned(),
            ));
        }
        if self.bar_width * self.hover_scale.max(1.0) >= self.category_spacing {
            return Err(ChartError::InvalidConfig(
                "hovered bar width must stay below category spacing".to_owned(),
            ));
        }
        self.label_color.validate()
    }

    /// Bucket pitch widened so a bucket's category row never reaches the next bucket.
    #[must_use]
    pub fn spacing_for(self, category_count: usize) -> BarGridSpacing {
        let row_span = category_count as f64 * self.category_spacing;
        BarGridSpacing {
            bucket_spacing: self.bucket_spacing.max(row_span),
            category_spacing: self.category_spacing,
        }
    }
}

/// One extruded bar per (bucket, category) with per-category height ceilings.
#[derive(Debug, Clone)]
pub struct BarChartScene {
    series: CategorySeries,
    config: BarChartConfig,
    maxima: Vec<f64>,
    state: SceneState,
    hover_weights: Vec<EasedValue>,
}

impl BarChartScene {
    pub fn new(series: CategorySeries, config: BarChartConfig) -> ChartResult<Self> {
        series.validate()?;
        config.validate()?;
        let maxima = category_maxima(&series);
        let bar_count = series.buckets.len() * series.categories.len();
        Ok(Self {
            maxima,
            state: SceneState::new("bar_chart", config.growth_per_second),
            hover_weights: vec![EasedValue::default(); bar_count],
            series,
            config,
        })
    }

    #[must_use]
    pub fn series(&self) -> &CategorySeries {
        &self.series
    }

    #[must_use]
    pub fn config(&self) -> BarChartConfig {
        self.config
    }

    #[must_use]
    pub fn category_maxima(&self) -> &[f64] {
        &self.maxima
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.state.progress()
    }

    /// Eased hover weight in `[0, 1]` of one bar.
    #[must_use]
    pub fn hover_weight(&self, element: ElementId) -> Option<f64> {
        self.weight_index(element)
            .map(|index| self.hover_weights[index].value())
    }

    /// Rendered height of one bar at the current progress.
    #[must_use]
    pub fn bar_height(&self, bucket: usize, category: usize) -> f64 {
        let Some(max) = self.maxima.get(category) else {
            return 0.0;
        };
        bar_height(
            self.series.value(bucket, category),
            *max,
            self.config.max_visual_height,
            self.state.progress(),
        )
    }

    fn weight_index(&self, element: ElementId) -> Option<usize> {
        let ElementId::Bar { bucket, category } = element else {
            return None;
        };
        let categories = self.series.categories.len();
        (bucket < self.series.buckets.len() && category < categories)
            .then_some(bucket * categories + category)
    }

    fn sync_hover_targets(&mut self) {
        let categories = self.series.categories.len().max(1);
        let hovered = self.state.hovered();
        for (index, weight) in self.hover_weights.iter_mut().enumerate() {
            let element = ElementId::Bar {
                bucket: index / categories,
                category: index % categories,
            };
            weight.set_target(if hovered == Some(element) { 1.0 } else { 0.0 });
        }
    }
}

/// Bucket label, falling back to the category label and then the bucket position.
fn tooltip_title(bucket_label: &str, category_label: &str, bucket: usize) -> String {
    if !bucket_label.is_empty() {
        bucket_label.to_owned()
    } else if !category_label.is_empty() {
        category_label.to_owned()
    } else {
        format!("Bucket {}", bucket + 1)
    }
}

impl ChartScene for BarChartScene {
    fn name(&self) -> &'static str {
        "bar_chart"
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
        self.sync_hover_targets();
    }

    fn tick(&mut self, delta_seconds: f64) -> bool {
        if !self.state.phase().is_visible() {
            return false;
        }
        let growing = self.state.advance(delta_seconds);
        let mut easing = false;
        for weight in &mut self.hover_weights {
            easing |= weight.step(self.config.hover_sharpness, delta_seconds);
        }
        growing || easing
    }

    fn is_animating(&self) -> bool {
        self.state.phase() == ChartPhase::Growing
            || self.hover_weights.iter().any(|weight| !weight.is_settled())
    }

    fn hovered(&self) -> Option<ElementId> {
        self.state.hovered()
    }

    fn pointer_enter(&mut self, element: ElementId) -> bool {
        if self.weight_index(element).is_none() {
            return false;
        }
        let changed = self.state.pointer_enter(element);
        if changed {
            self.sync_hover_targets();
        }
        changed
    }

    fn pointer_leave(&mut self, element: ElementId) -> bool {
        let changed = self.state.pointer_leave(element);
        if changed {
            self.sync_hover_targets();
        }
        changed
    }

    fn build(&self, frame: &mut SceneFrame) -> ChartResult<()> {
        let config = self.config;
        if self.series.is_empty() {
            frame.labels.push(LabelPrimitive::new(
                LabelKind::Placeholder,
                "No data",
                DVec3::new(0.0, 0.5, 0.0),
                config.label_font_size_px,
                config.label_color,
            ));
            return Ok(());
        }

        let category_count = self.series.categories.len();
        let bucket_count = self.series.buckets.len();
        let spacing = config.spacing_for(category_count);

        for slot in layout_bar_slots(bucket_count, category_count, spacing) {
            let element = ElementId::Bar {
                bucket: slot.bucket,
                category: slot.category,
            };
            let category = &self.series.categories[slot.category];
            let weight = self
                .weight_index(element)
                .map_or(0.0, |index| self.hover_weights[index].value());
            let lateral = 1.0 + (config.hover_scale - 1.0) * weight;
            let height = self.bar_height(slot.bucket, slot.category);

            let mesh = MeshPrimitive::new(
                MeshShape::Box {
                    width: config.bar_width,
                    height,
                    depth: config.bar_depth,
                },
                Transform3::from_translation(DVec3::new(slot.x, 0.0, slot.z))
                    .with_scale(DVec3::new(lateral, 1.0, lateral)),
                Material::solid(category.color).with_emissive(
                    category.color,
                    config.hover_emissive_intensity * weight,
                ),
            )
            .for_element(element);
            mesh.validate()?;
            frame.meshes.push(mesh);

            if self.state.is_hovered(element) {
                let bucket = &self.series.buckets[slot.bucket];
                frame.tooltips.push(TooltipPrimitive {
                    element,
                    anchor: DVec3::new(slot.x, height + config.tooltip_offset, slot.z),
                    title: tooltip_title(&bucket.label, &category.label, slot.bucket),
                    lines: smallvec![
                        category.label.clone(),
                        format_value(self.series.value(slot.bucket, slot.category)),
                    ],
                    accent: category.color,
                });
            }
        }

        let front_z = (category_count.saturating_sub(1)) as f64 * spacing.category_spacing * 0.5
            + config.bar_depth * 0.5;
        for (index, bucket) in self.series.buckets.iter().enumerate() {
            if bucket.label.is_empty() {
                continue;
            }
            frame.labels.push(LabelPrimitive::new(
                LabelKind::BucketAxis,
                bucket.label.clone(),
                DVec3::new(
                    bucket_center_x(index, bucket_count, spacing),
                    0.0,
                    front_z + config.label_offset,
                ),
                config.label_font_size_px,
                config.label_color,
            ));
        }

        if config.show_legend {
            frame
                .legend
                .extend(self.series.categories.iter().map(|category| LegendEntry {
                    label: category.label.clone(),
                    color: category.color,
                }));
        }

        Ok(())
    }
}
