use cairo::{Context, Format, ImageSurface, Operator};
use glam::{DMat4, DVec3};
use ordered_float::OrderedFloat;
use pango::FontDescription;
use std::f64::consts::{FRAC_PI_2, PI};
use std::io::Write;

use crate::core::{MeshShape, Viewport, project_with, tessellate_all};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    CenterOverlay, Color, LabelPrimitive, LegendEntry, OverlayKind, OverlayPanel, RenderSettings,
    Renderer, SceneChrome, SceneFrame, TextHAlign, TooltipPrimitive, shade,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub triangles_drawn: usize,
    pub grid_lines_drawn: usize,
    pub texts_drawn: usize,
    pub panels_drawn: usize,
}

/// Optional extension trait for renderers that can draw into an external Cairo
/// context (for example a GTK `DrawingArea` callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(&mut self, context: &Context, frame: &SceneFrame)
    -> ChartResult<()>;
}

/// Cairo + Pango + PangoCairo software renderer.
///
/// Meshes are tessellated, projected with the frame camera, flat shaded and
/// painted back to front. Supports offscreen image-surface rendering through
/// `Renderer::render` and in-place rendering through `CairoContextRenderer`.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    settings: RenderSettings,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            surface,
            settings: RenderSettings::default(),
            last_stats: CairoRenderStats::default(),
        })
    }

    /// Surface sized for `viewport` at `pixel_ratio` device pixels per unit.
    pub fn for_viewport(viewport: Viewport, pixel_ratio: f64) -> ChartResult<Self> {
        let scale = |value: u32| (f64::from(value) * pixel_ratio).round() as i32;
        Self::new(scale(viewport.width), scale(viewport.height))
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    #[must_use]
    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    pub fn write_png(&self, writer: &mut impl Write) -> ChartResult<()> {
        self.surface.flush();
        self.surface
            .write_to_png(writer)
            .map_err(|err| ChartError::Backend(format!("failed to encode png: {err}")))
    }

    fn render_with_context(
        &mut self,
        context: &Context,
        frame: &SceneFrame,
        pixel_ratio: f64,
    ) -> ChartResult<()> {
        frame.validate()?;
        let settings = frame
            .chrome
            .as_ref()
            .map_or(self.settings, |chrome| chrome.settings);

        context.save().map_err(|err| map_backend_error("failed to save context", err))?;
        context.scale(pixel_ratio, pixel_ratio);
        context.set_operator(Operator::Source);
        apply_color(context, settings.clear_color);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;
        context.set_operator(Operator::Over);

        let mut stats = CairoRenderStats::default();
        if let Some(chrome) = &frame.chrome {
            let view_projection = chrome.camera.view_projection(frame.viewport);
            draw_grid(context, chrome, view_projection, frame.viewport, &mut stats)?;
            draw_meshes(context, chrome, view_projection, frame, &mut stats)?;
            for label in &frame.labels {
                draw_label(context, label, view_projection, frame.viewport, &mut stats);
            }
            for tooltip in &frame.tooltips {
                draw_tooltip(context, tooltip, view_projection, frame.viewport, &mut stats)?;
            }
        }
        if !frame.legend.is_empty() {
            draw_legend(context, &frame.legend, &mut stats)?;
        }
        if let Some(center) = &frame.center_overlay {
            draw_center_overlay(context, center, frame.viewport, &mut stats);
        }
        if let Some(overlay) = &frame.overlay {
            draw_overlay_panel(context, overlay, frame.viewport, &mut stats)?;
        }

        context
            .restore()
            .map_err(|err| map_backend_error("failed to restore context", err))?;
        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn prepare(&mut self, settings: &RenderSettings) -> ChartResult<()> {
        settings.validate()?;
        self.settings = *settings;
        Ok(())
    }

    fn render(&mut self, frame: &SceneFrame) -> ChartResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        let pixel_ratio = f64::from(self.surface.width()) / f64::from(frame.viewport.width.max(1));
        self.render_with_context(&context, frame, pixel_ratio)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &SceneFrame,
    ) -> ChartResult<()> {
        // GTK contexts already carry the widget scale factor.
        self.render_with_context(context, frame, 1.0)
    }
}

struct ProjectedTriangle {
    points: [(f64, f64); 3],
    depth: f64,
    color: Color,
}

fn draw_grid(
    context: &Context,
    chrome: &SceneChrome,
    view_projection: DMat4,
    viewport: Viewport,
    stats: &mut CairoRenderStats,
) -> ChartResult<()> {
    if !chrome.grid.visible {
        return Ok(());
    }
    context.set_line_width(1.0);
    for (start, end, is_center) in chrome.grid.line_segments() {
        let (Some(a), Some(b)) = (
            project_with(view_projection, start, viewport),
            project_with(view_projection, end, viewport),
        ) else {
            continue;
        };
        apply_color(
            context,
            if is_center {
                chrome.grid.center_line_color
            } else {
                chrome.grid.line_color
            },
        );
        context.move_to(a.x, a.y);
        context.line_to(b.x, b.y);
        context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke grid line", err))?;
        stats.grid_lines_drawn += 1;
    }
    Ok(())
}

fn draw_meshes(
    context: &Context,
    chrome: &SceneChrome,
    view_projection: DMat4,
    frame: &SceneFrame,
    stats: &mut CairoRenderStats,
) -> ChartResult<()> {
    let shapes: Vec<MeshShape> = frame.meshes.iter().map(|mesh| mesh.shape).collect();
    let tessellated = tessellate_all(&shapes, frame.radial_segments)?;
    let eye = chrome.camera.eye;

    let mut triangles = Vec::new();
    for (mesh, data) in frame.meshes.iter().zip(&tessellated) {
        let world = mesh.transform.then(frame.content_transform);
        for tri in data.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let corners = [
                world.apply_point(data.positions[i0]),
                world.apply_point(data.positions[i1]),
                world.apply_point(data.positions[i2]),
            ];
            let normal = world.apply_normal(data.normals[i0]);
            if normal == DVec3::ZERO {
                continue;
            }
            let centroid = (corners[0] + corners[1] + corners[2]) / 3.0;
            if normal.dot(eye - centroid) <= 0.0 {
                continue;
            }
            let projected = corners.map(|point| project_with(view_projection, point, frame.viewport));
            let [Some(a), Some(b), Some(c)] = projected else {
                continue;
            };
            let color = shade(
                mesh.material.color,
                mesh.material.emissive,
                normal,
                &chrome.lights,
                chrome.settings,
            )
            .with_alpha(mesh.material.opacity);
            triangles.push(ProjectedTriangle {
                points: [(a.x, a.y), (b.x, b.y), (c.x, c.y)],
                depth: (a.depth + b.depth + c.depth) / 3.0,
                color,
            });
        }
    }

    // Painter's algorithm: farthest first.
    triangles.sort_by_key(|triangle| std::cmp::Reverse(OrderedFloat(triangle.depth)));
    for triangle in &triangles {
        let [a, b, c] = triangle.points;
        apply_color(context, triangle.color);
        context.move_to(a.0, a.1);
        context.line_to(b.0, b.1);
        context.line_to(c.0, c.1);
        context.close_path();
        // Hairline stroke in the fill color hides seams between neighbours.
        context
            .fill_preserve()
            .map_err(|err| map_backend_error("failed to fill triangle", err))?;
        context.set_line_width(0.5);
        context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke triangle", err))?;
    }
    stats.triangles_drawn = triangles.len();
    Ok(())
}

fn draw_label(
    context: &Context,
    label: &LabelPrimitive,
    view_projection: DMat4,
    viewport: Viewport,
    stats: &mut CairoRenderStats,
) {
    let Some(anchor) = project_with(view_projection, label.position, viewport) else {
        return;
    };
    let layout = text_layout(context, &label.text, label.font_size_px, false);
    let (width, height) = layout.pixel_size();
    let x = match label.h_align {
        TextHAlign::Left => anchor.x,
        TextHAlign::Center => anchor.x - f64::from(width) / 2.0,
        TextHAlign::Right => anchor.x - f64::from(width),
    };
    apply_color(context, label.color);
    context.move_to(x, anchor.y - f64::from(height) / 2.0);
    pangocairo::functions::show_layout(context, &layout);
    stats.texts_drawn += 1;
}

fn draw_tooltip(
    context: &Context,
    tooltip: &TooltipPrimitive,
    view_projection: DMat4,
    viewport: Viewport,
    stats: &mut CairoRenderStats,
) -> ChartResult<()> {
    const PADDING: f64 = 8.0;
    const ACCENT_WIDTH: f64 = 4.0;

    let Some(anchor) = project_with(view_projection, tooltip.anchor, viewport) else {
        return Ok(());
    };
    let mut layouts = vec![text_layout(context, &tooltip.title, 13.0, true)];
    layouts.extend(
        tooltip
            .lines
            .iter()
            .map(|line| text_layout(context, line, 12.0, false)),
    );
    let (width, height) = layouts.iter().fold((0.0_f64, 0.0_f64), |(w, h), layout| {
        let (lw, lh) = layout.pixel_size();
        (w.max(f64::from(lw)), h + f64::from(lh))
    });
    let box_width = width + PADDING * 2.0 + ACCENT_WIDTH;
    let box_height = height + PADDING * 2.0;
    let left = (anchor.x - box_width / 2.0).clamp(0.0, (f64::from(viewport.width) - box_width).max(0.0));
    let top = (anchor.y - box_height).max(0.0);

    rounded_rect(context, left, top, box_width, box_height, 6.0);
    apply_color(context, Color::rgba(1.0, 1.0, 1.0, 0.95));
    context
        .fill_preserve()
        .map_err(|err| map_backend_error("failed to fill tooltip", err))?;
    apply_color(context, Color::rgba(0.0, 0.0, 0.0, 0.15));
    context.set_line_width(1.0);
    context
        .stroke()
        .map_err(|err| map_backend_error("failed to stroke tooltip", err))?;

    apply_color(context, tooltip.accent);
    context.rectangle(left, top, ACCENT_WIDTH, box_height);
    context
        .fill()
        .map_err(|err| map_backend_error("failed to fill tooltip accent", err))?;

    let mut y = top + PADDING;
    apply_color(context, Color::from_hex(0x22_22_22));
    for layout in &layouts {
        context.move_to(left + ACCENT_WIDTH + PADDING, y);
        pangocairo::functions::show_layout(context, layout);
        y += f64::from(layout.pixel_size().1);
        stats.texts_drawn += 1;
    }
    stats.panels_drawn += 1;
    Ok(())
}

fn draw_legend(
    context: &Context,
    legend: &[LegendEntry],
    stats: &mut CairoRenderStats,
) -> ChartResult<()> {
    const SWATCH: f64 = 10.0;
    let mut y = 12.0;
    for entry in legend {
        apply_color(context, entry.color);
        context.rectangle(12.0, y, SWATCH, SWATCH);
        context
            .fill()
            .map_err(|err| map_backend_error("failed to fill legend swatch", err))?;
        let layout = text_layout(context, &entry.label, 12.0, false);
        let (_, height) = layout.pixel_size();
        apply_color(context, Color::from_hex(0x33_33_33));
        context.move_to(12.0 + SWATCH + 6.0, y + SWATCH / 2.0 - f64::from(height) / 2.0);
        pangocairo::functions::show_layout(context, &layout);
        stats.texts_drawn += 1;
        y += SWATCH + 8.0;
    }
    Ok(())
}

fn draw_center_overlay(
    context: &Context,
    center: &CenterOverlay,
    viewport: Viewport,
    stats: &mut CairoRenderStats,
) {
    let center_x = f64::from(viewport.width) / 2.0;
    let mut y = f64::from(viewport.height) / 2.0 - 24.0;
    let rows = [
        Some((center.total_text.as_str(), 22.0, true)),
        Some((center.total_label.as_str(), 12.0, false)),
        center
            .secondary_text
            .as_deref()
            .map(|text| (text, 11.0, false)),
    ];
    apply_color(context, Color::from_hex(0x22_22_22));
    for (text, size, bold) in rows.into_iter().flatten() {
        let layout = text_layout(context, text, size, bold);
        let (width, height) = layout.pixel_size();
        context.move_to(center_x - f64::from(width) / 2.0, y);
        pangocairo::functions::show_layout(context, &layout);
        y += f64::from(height);
        stats.texts_drawn += 1;
    }
}

fn draw_overlay_panel(
    context: &Context,
    overlay: &OverlayPanel,
    viewport: Viewport,
    stats: &mut CairoRenderStats,
) -> ChartResult<()> {
    let (width, height) = (f64::from(viewport.width), f64::from(viewport.height));
    let (background, foreground) = match overlay.kind {
        OverlayKind::Loading => (Color::rgba(1.0, 1.0, 1.0, 0.7), Color::from_hex(0x55_55_55)),
        OverlayKind::Error => (Color::from_hex(0xfd_ec_ec), Color::from_hex(0xb0_00_20)),
        OverlayKind::ContentError => (
            Color::rgba(0.99, 0.93, 0.93, 0.85),
            Color::from_hex(0xb0_00_20),
        ),
    };
    apply_color(context, background);
    context.rectangle(0.0, 0.0, width, height);
    context
        .fill()
        .map_err(|err| map_backend_error("failed to fill overlay panel", err))?;

    let layout = text_layout(context, &overlay.message, 14.0, overlay.kind != OverlayKind::Loading);
    layout.set_width((width * 0.8 * f64::from(pango::SCALE)) as i32);
    layout.set_alignment(pango::Alignment::Center);
    let (text_width, text_height) = layout.pixel_size();
    apply_color(context, foreground);
    context.move_to(
        (width - f64::from(text_width)) / 2.0,
        (height - f64::from(text_height)) / 2.0,
    );
    pangocairo::functions::show_layout(context, &layout);
    stats.texts_drawn += 1;
    stats.panels_drawn += 1;
    Ok(())
}

fn text_layout(context: &Context, text: &str, font_size_px: f64, bold: bool) -> pango::Layout {
    let layout = pangocairo::functions::create_layout(context);
    let weight = if bold { " Bold" } else { "" };
    let font_description = FontDescription::from_string(&format!("Sans{weight} {font_size_px}"));
    layout.set_font_description(Some(&font_description));
    layout.set_text(text);
    layout
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn rounded_rect(context: &Context, x: f64, y: f64, width: f64, height: f64, radius: f64) {
    let radius = radius.min(width * 0.5).min(height * 0.5);
    let (left, top, right, bottom) = (x, y, x + width, y + height);
    context.new_sub_path();
    context.arc(right - radius, top + radius, radius, -FRAC_PI_2, 0.0);
    context.arc(right - radius, bottom - radius, radius, 0.0, FRAC_PI_2);
    context.arc(left + radius, bottom - radius, radius, FRAC_PI_2, PI);
    context.arc(left + radius, top + radius, radius, PI, PI + FRAC_PI_2);
    context.close_path();
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::Backend(format!("{prefix}: {err}"))
}
