use tracing::{debug, trace, warn};

use crate::core::{ElementId, FrameClock, MonotonicClock, OrbitCamera, Ray, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{CameraChangeKind, CameraEvent, PointerButton, PointerEvent};
use crate::render::{OverlayKind, OverlayPanel, Renderer, SceneChrome, SceneFrame};

#[cfg(feature = "cairo-backend")]
use crate::render::CairoContextRenderer;

use super::{ChartPhase, ChartScene, HostCallbacks, HostConfig, InvalidationMask};

/// Owns the rendering surface, camera, lights and overlays around one chart.
///
/// The host decides what is visible (error panel, loading overlay, content)
/// and when a frame is needed; mounted scenes only describe their content.
pub struct SceneHost<R: Renderer> {
    renderer: R,
    config: HostConfig,
    camera: OrbitCamera,
    engine_ready: bool,
    loading: bool,
    error: Option<String>,
    content: Option<Box<dyn ChartScene>>,
    /// Build failure captured for the current mount.
    boundary: Option<String>,
    callbacks: HostCallbacks,
    pub(super) pending: InvalidationMask,
    clock: Box<dyn FrameClock>,
    last_tick_seconds: Option<f64>,
    last_frame: Option<SceneFrame>,
}

impl<R: Renderer> SceneHost<R> {
    /// Creates a host in the not-ready state; call `initialize` before content shows.
    pub fn new(renderer: R, config: HostConfig) -> ChartResult<Self> {
        config.validate()?;
        let camera = OrbitCamera::from_config(config.camera)?.with_bounds(config.controls.bounds);
        Ok(Self {
            renderer,
            config,
            camera,
            engine_ready: false,
            loading: false,
            error: None,
            content: None,
            boundary: None,
            callbacks: HostCallbacks::default(),
            pending: InvalidationMask::full(),
            clock: Box::new(MonotonicClock::default()),
            last_tick_seconds: None,
            last_frame: None,
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl FrameClock + 'static) -> Self {
        self.clock = Box::new(clock);
        self.last_tick_seconds = None;
        self
    }

    /// Prepares the renderer; content can be revealed from now on.
    pub fn initialize(&mut self) -> ChartResult<()> {
        self.renderer.prepare(&self.config.render)?;
        self.engine_ready = true;
        debug!(
            width = self.config.viewport.width,
            height = self.config.viewport.height,
            pixel_ratio = self.config.render.pixel_ratio,
            "scene host initialized"
        );
        self.reveal_if_ready();
        self.invalidate(InvalidationMask::full());
        Ok(())
    }

    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    #[must_use]
    pub fn is_engine_ready(&self) -> bool {
        self.engine_ready
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Captured content build failure, cleared by remounting.
    #[must_use]
    pub fn content_error(&self) -> Option<&str> {
        self.boundary.as_deref()
    }

    /// Whether mounted content is currently built and advanced.
    #[must_use]
    pub fn is_content_visible(&self) -> bool {
        self.engine_ready && !self.loading && self.error.is_none()
    }

    pub fn set_loading(&mut self, loading: bool) {
        if self.loading == loading {
            return;
        }
        self.loading = loading;
        self.reveal_if_ready();
        self.invalidate(InvalidationMask::overlay());
    }

    pub fn set_error(&mut self, error: Option<String>) {
        if self.error == error {
            return;
        }
        if let Some(message) = &error {
            warn!(error = %message, "scene host entered error state");
        }
        self.error = error;
        if self.error.is_some() {
            self.suspend_content();
        }
        self.mount_if_allowed();
        self.reveal_if_ready();
        self.invalidate(InvalidationMask::full());
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> ChartResult<()> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        if self.config.viewport != viewport {
            self.config.viewport = viewport;
            self.invalidate(InvalidationMask::full());
        }
        Ok(())
    }

    /// Replaces the mounted content; any captured build failure is discarded.
    ///
    /// While the error flag is set the scene is held but not mounted; it
    /// mounts, and replays its entrance, once the error clears.
    pub fn mount(&mut self, scene: Box<dyn ChartScene>) {
        self.unmount();
        self.content = Some(scene);
        self.boundary = None;
        self.mount_if_allowed();
        self.reveal_if_ready();
        self.invalidate(InvalidationMask::content());
    }

    /// Removes and returns the mounted content.
    pub fn unmount(&mut self) -> Option<Box<dyn ChartScene>> {
        let mut scene = self.content.take()?;
        if scene.phase() != ChartPhase::Unmounted {
            scene.on_unmount();
            debug!(scene = scene.name(), "scene unmounted");
        }
        self.boundary = None;
        self.invalidate(InvalidationMask::content());
        Some(scene)
    }

    #[must_use]
    pub fn content(&self) -> Option<&dyn ChartScene> {
        self.content.as_deref()
    }

    #[must_use]
    pub fn content_phase(&self) -> ChartPhase {
        self.content
            .as_ref()
            .map_or(ChartPhase::Unmounted, |scene| scene.phase())
    }

    pub fn set_on_hover(&mut self, callback: impl FnMut(&PointerEvent) + 'static) {
        self.callbacks.set_on_hover(Some(Box::new(callback)));
    }

    pub fn set_on_click(&mut self, callback: impl FnMut(&PointerEvent) + 'static) {
        self.callbacks.set_on_click(Some(Box::new(callback)));
    }

    pub fn set_on_camera_change(&mut self, callback: impl FnMut(&CameraEvent) + 'static) {
        self.callbacks.set_on_camera_change(Some(Box::new(callback)));
    }

    pub fn clear_callbacks(&mut self) {
        self.callbacks = HostCallbacks::default();
    }

    /// Forwards a pointer move to `on_hover` as-is.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.callbacks.emit_hover(&PointerEvent::moved(x, y));
    }

    /// Forwards a click to `on_click` as-is.
    pub fn pointer_click(&mut self, x: f64, y: f64, button: PointerButton) {
        self.callbacks
            .emit_click(&PointerEvent::clicked(x, y, button));
    }

    /// Forwards the pointer leaving the surface to `on_hover`.
    pub fn pointer_leave(&mut self, x: f64, y: f64) {
        self.callbacks.emit_hover(&PointerEvent::left(x, y));
    }

    /// Routes hover into the mounted scene; returns whether the hover changed.
    ///
    /// Ignored while content is hidden.
    pub fn hover_element(&mut self, element: Option<ElementId>) -> bool {
        if !self.is_content_visible() || self.boundary.is_some() {
            return false;
        }
        let Some(scene) = self.content.as_mut() else {
            return false;
        };
        let current = scene.hovered();
        if current == element {
            return false;
        }
        let mut changed = false;
        if let Some(previous) = current {
            changed |= scene.pointer_leave(previous);
        }
        if let Some(next) = element {
            changed |= scene.pointer_enter(next);
        }
        if changed {
            trace!(element = ?element, "hover routed into scene");
            self.invalidate(InvalidationMask::hover());
        }
        changed
    }

    #[must_use]
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// World-space ray through a viewport pixel, for caller-side picking.
    #[must_use]
    pub fn screen_ray(&self, x: f64, y: f64) -> Ray {
        self.camera.screen_ray(x, y, self.config.viewport)
    }

    /// Orbits by a pointer drag in pixels; returns `false` when rotation is disabled.
    pub fn orbit_rotate(&mut self, delta_x_px: f64, delta_y_px: f64) -> bool {
        let controls = self.config.controls;
        if !controls.enable_rotate {
            return false;
        }
        self.camera.rotate(
            -delta_x_px * controls.rotate_speed,
            delta_y_px * controls.rotate_speed,
        );
        self.camera_changed(CameraChangeKind::Rotate);
        true
    }

    /// Zooms by scroll steps; positive steps move closer.
    pub fn orbit_zoom(&mut self, steps: f64) -> bool {
        let controls = self.config.controls;
        if !controls.enable_zoom || !steps.is_finite() || steps == 0.0 {
            return false;
        }
        self.camera.zoom(controls.zoom_speed.powf(steps));
        self.camera_changed(CameraChangeKind::Zoom);
        true
    }

    /// Pans the orbit target by a pointer drag in pixels.
    pub fn orbit_pan(&mut self, delta_x_px: f64, delta_y_px: f64) -> bool {
        let controls = self.config.controls;
        if !controls.enable_pan {
            return false;
        }
        self.camera
            .pan(-delta_x_px * controls.pan_speed, delta_y_px * controls.pan_speed);
        self.camera_changed(CameraChangeKind::Pan);
        true
    }

    /// Advances content with the injected clock; returns whether a frame is needed.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now_seconds();
        self.tick_at(now)
    }

    /// Advances content to `now_seconds`; the step is clamped to
    /// `max_frame_delta_seconds` and never negative.
    pub fn tick_at(&mut self, now_seconds: f64) -> bool {
        let delta = self.last_tick_seconds.map_or(0.0, |last| {
            (now_seconds - last).clamp(0.0, self.config.max_frame_delta_seconds)
        });
        self.last_tick_seconds = Some(now_seconds);

        if self.is_content_visible() && self.boundary.is_none() {
            if let Some(scene) = self.content.as_mut() {
                let was_animating = scene.is_animating();
                let still_animating = scene.tick(delta);
                if was_animating || still_animating {
                    self.invalidate(InvalidationMask::animation());
                }
            }
        }
        self.has_pending_invalidation()
    }

    /// Ticks with the injected clock and renders when something changed.
    pub fn advance_frame(&mut self) -> ChartResult<bool> {
        let now = self.clock.now_seconds();
        self.advance_frame_at(now)
    }

    pub fn advance_frame_at(&mut self, now_seconds: f64) -> ChartResult<bool> {
        self.tick_at(now_seconds);
        self.render_if_invalidated()
    }

    /// Whether the host would draw on the next frame; idle hosts return `false`.
    #[must_use]
    pub fn needs_frame(&self) -> bool {
        if self.has_pending_invalidation() {
            return true;
        }
        self.is_content_visible()
            && self.boundary.is_none()
            && self
                .content
                .as_ref()
                .is_some_and(|scene| scene.is_animating())
    }

    /// Materializes the current frame, capturing content build failures.
    pub fn build_frame(&mut self) -> SceneFrame {
        let viewport = self.config.viewport;
        if let Some(message) = &self.error {
            return SceneFrame::new(viewport)
                .with_overlay(OverlayPanel::new(OverlayKind::Error, message.clone()));
        }

        let mut frame = SceneFrame::new(viewport).with_chrome(SceneChrome {
            camera: self.camera.view(),
            lights: self.config.lights.clone(),
            grid: self.config.grid,
            settings: self.config.render,
        });

        if !self.is_content_visible() {
            frame.overlay = Some(OverlayPanel::new(
                OverlayKind::Loading,
                self.config.loading_message.clone(),
            ));
            return frame;
        }

        if let Some(message) = &self.boundary {
            frame.overlay = Some(OverlayPanel::new(OverlayKind::ContentError, message.clone()));
            return frame;
        }

        let Some(scene) = self.content.as_ref() else {
            return frame;
        };
        if let Err(err) = scene
            .build(&mut frame)
            .and_then(|()| frame.validate_content())
        {
            frame.clear_content();
            let message = err.to_string();
            warn!(scene = scene.name(), error = %message, "scene build failed; content boundary engaged");
            frame.overlay = Some(OverlayPanel::new(OverlayKind::ContentError, message.clone()));
            self.boundary = Some(message);
        }
        frame
    }

    /// Frame for the pending invalidation; a view-only change reuses the last
    /// built content under the current camera.
    fn next_frame(&mut self) -> SceneFrame {
        if self.pending.is_view_only() {
            if let Some(frame) = self.reproject_last_frame() {
                return frame;
            }
        }
        self.build_frame()
    }

    fn reproject_last_frame(&self) -> Option<SceneFrame> {
        let mut frame = self.last_frame.clone()?;
        let chrome = frame.chrome.as_mut()?;
        chrome.camera = self.camera.view();
        trace!("view-only invalidation; reusing built content");
        Some(frame)
    }

    pub fn render(&mut self) -> ChartResult<()> {
        let frame = self.next_frame();
        self.renderer.render(&frame).inspect_err(|err| {
            warn!(error = %err, "renderer failed to draw scene frame");
        })?;
        self.finish_frame(frame);
        Ok(())
    }

    /// Renders the frame into an external cairo context.
    ///
    /// This path is used by GTK draw callbacks while keeping the renderer
    /// implementation decoupled from GTK-specific APIs.
    #[cfg(feature = "cairo-backend")]
    pub fn render_on_cairo_context(&mut self, context: &cairo::Context) -> ChartResult<()>
    where
        R: CairoContextRenderer,
    {
        let frame = self.next_frame();
        self.renderer.render_on_cairo_context(context, &frame)?;
        self.finish_frame(frame);
        Ok(())
    }

    /// Frame handed to the renderer by the last successful render.
    #[must_use]
    pub fn last_frame(&self) -> Option<&SceneFrame> {
        self.last_frame.as_ref()
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn finish_frame(&mut self, frame: SceneFrame) {
        trace!(
            level = ?self.pending.level(),
            meshes = frame.meshes.len(),
            labels = frame.labels.len(),
            overlay = ?frame.overlay_kind(),
            "scene frame rendered"
        );
        self.last_frame = Some(frame);
        self.clear_pending_invalidation();
    }

    fn suspend_content(&mut self) {
        if let Some(scene) = self.content.as_mut() {
            if scene.phase() != ChartPhase::Unmounted {
                scene.on_unmount();
                debug!(scene = scene.name(), "scene unmounted by error state");
            }
        }
        self.boundary = None;
    }

    fn mount_if_allowed(&mut self) {
        if self.error.is_some() {
            return;
        }
        if let Some(scene) = self.content.as_mut() {
            if scene.phase() == ChartPhase::Unmounted {
                scene.on_mount();
                debug!(scene = scene.name(), "scene mounted");
            }
        }
    }

    fn reveal_if_ready(&mut self) {
        if !self.is_content_visible() {
            return;
        }
        if let Some(scene) = self.content.as_mut() {
            if scene.phase() == ChartPhase::Initializing {
                scene.on_reveal();
            }
        }
    }

    fn camera_changed(&mut self, kind: CameraChangeKind) {
        let event = CameraEvent {
            kind,
            state: self.camera.state(),
        };
        self.callbacks.emit_camera_change(&event);
        self.invalidate(InvalidationMask::camera());
    }
}
