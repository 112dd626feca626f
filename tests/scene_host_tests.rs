use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chart3d_rs::api::{
    BarChartConfig, BarChartScene, ChartPhase, ChartScene, HostConfig, InvalidationTopic,
    OrbitControls, SceneHost, SceneState,
};
use chart3d_rs::core::{
    BarCategory, CategorySeries, Color, ElementId, ManualClock, SeriesBucket, Viewport,
};
use chart3d_rs::error::{ChartError, ChartResult};
use chart3d_rs::interaction::{CameraChangeKind, CameraEvent, PointerButton, PointerEventKind};
use chart3d_rs::render::{LabelKind, LabelPrimitive, NullRenderer, OverlayKind, SceneFrame};
use glam::DVec3;

/// Scene that records tick deltas and build calls, and optionally fails to build.
struct RecordingScene {
    state: SceneState,
    deltas: Rc<RefCell<Vec<f64>>>,
    fail_build: bool,
    emit_blank_label: bool,
    builds: Rc<Cell<usize>>,
}

impl RecordingScene {
    fn new(deltas: Rc<RefCell<Vec<f64>>>) -> Self {
        Self {
            state: SceneState::new("recording", 1.0),
            deltas,
            fail_build: false,
            emit_blank_label: false,
            builds: Rc::default(),
        }
    }

    fn counting_builds(builds: Rc<Cell<usize>>) -> Self {
        Self {
            builds,
            ..Self::new(Rc::default())
        }
    }

    fn failing() -> Self {
        Self {
            fail_build: true,
            ..Self::new(Rc::default())
        }
    }

    fn blank_label() -> Self {
        Self {
            emit_blank_label: true,
            ..Self::new(Rc::default())
        }
    }
}

impl ChartScene for RecordingScene {
    fn name(&self) -> &'static str {
        "recording"
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
    }

    fn tick(&mut self, delta_seconds: f64) -> bool {
        self.deltas.borrow_mut().push(delta_seconds);
        self.state.advance(delta_seconds)
    }

    fn is_animating(&self) -> bool {
        self.state.phase() == ChartPhase::Growing
    }

    fn hovered(&self) -> Option<ElementId> {
        self.state.hovered()
    }

    fn pointer_enter(&mut self, element: ElementId) -> bool {
        self.state.pointer_enter(element)
    }

    fn pointer_leave(&mut self, element: ElementId) -> bool {
        self.state.pointer_leave(element)
    }

    fn build(&self, frame: &mut SceneFrame) -> ChartResult<()> {
        self.builds.set(self.builds.get() + 1);
        if self.fail_build {
            frame.legend.push(chart3d_rs::render::LegendEntry {
                label: "partial".to_owned(),
                color: Color::BLACK,
            });
            return Err(ChartError::InvalidData("recording scene refused to build".to_owned()));
        }
        if self.emit_blank_label {
            frame.labels.push(LabelPrimitive::new(
                LabelKind::Placeholder,
                "",
                DVec3::ZERO,
                12.0,
                Color::BLACK,
            ));
        }
        Ok(())
    }
}

fn bar_scene() -> Box<BarChartScene> {
    let series = CategorySeries::new(
        vec![
            BarCategory::new("a", "A", Color::from_hex(0x4e_79_a7)),
            BarCategory::new("b", "B", Color::from_hex(0xf2_8e_2b)),
        ],
        vec![
            SeriesBucket::new("Jan").with_value("a", 4.0).with_value("b", 1.0),
            SeriesBucket::new("Feb").with_value("a", 2.0).with_value("b", 3.0),
        ],
    )
    .expect("valid series");
    Box::new(BarChartScene::new(series, BarChartConfig::default()).expect("scene init"))
}

fn host_with_clock(config: HostConfig) -> (SceneHost<NullRenderer>, ManualClock) {
    let clock = ManualClock::new(0.0);
    let host = SceneHost::new(NullRenderer::default(), config)
        .expect("host init")
        .with_clock(clock.clone());
    (host, clock)
}

fn ready_host() -> (SceneHost<NullRenderer>, ManualClock) {
    let (mut host, clock) = host_with_clock(HostConfig::new(Viewport::new(800, 600)));
    host.initialize().expect("initialize");
    (host, clock)
}

fn settle(host: &mut SceneHost<NullRenderer>, clock: &ManualClock) {
    for _ in 0..120 {
        clock.advance(0.05);
        host.advance_frame().expect("advance frame");
    }
}

#[test]
fn content_waits_for_engine_readiness() {
    let (mut host, _clock) = host_with_clock(HostConfig::new(Viewport::new(800, 600)));
    host.mount(bar_scene());
    assert_eq!(host.content_phase(), ChartPhase::Initializing);
    assert!(!host.is_content_visible());

    let frame = host.build_frame();
    assert!(frame.chrome.is_some());
    assert_eq!(frame.overlay_kind(), Some(OverlayKind::Loading));
    assert!(frame.meshes.is_empty());

    host.initialize().expect("initialize");
    assert!(host.is_engine_ready());
    assert!(host.renderer().prepared.is_some());
    assert_eq!(host.content_phase(), ChartPhase::Growing);

    let frame = host.build_frame();
    assert_eq!(frame.overlay_kind(), None);
    assert_eq!(frame.meshes.len(), 4);
}

#[test]
fn loading_flag_hides_and_pauses_content() {
    let (mut host, clock) = ready_host();
    let deltas = Rc::new(RefCell::new(Vec::new()));
    host.mount(Box::new(RecordingScene::new(Rc::clone(&deltas))));
    host.tick();

    host.set_loading(true);
    assert!(host.is_loading());
    clock.advance(0.05);
    host.tick();
    assert_eq!(deltas.borrow().len(), 1);
    assert_eq!(host.build_frame().overlay_kind(), Some(OverlayKind::Loading));
    assert!(!host.hover_element(Some(ElementId::Slice(0))));

    host.set_loading(false);
    clock.advance(0.05);
    host.tick();
    assert_eq!(deltas.borrow().len(), 2);
    assert_eq!(host.build_frame().overlay_kind(), None);
}

#[test]
fn error_state_draws_only_the_error_panel() {
    let (mut host, _clock) = ready_host();
    host.mount(bar_scene());
    host.set_error(Some("engine lost".to_owned()));

    host.render().expect("render");
    let frame = host.renderer().last_frame.as_ref().expect("rendered frame");
    assert!(frame.chrome.is_none());
    assert!(!frame.has_content());
    let overlay = frame.overlay.as_ref().expect("error overlay");
    assert_eq!(overlay.kind, OverlayKind::Error);
    assert_eq!(overlay.message, "engine lost");
    assert_eq!(host.error(), Some("engine lost"));

    host.set_error(None);
    let frame = host.build_frame();
    assert!(frame.chrome.is_some());
    assert_eq!(frame.meshes.len(), 4);
}

#[test]
fn error_state_keeps_content_unmounted() {
    let (mut host, clock) = ready_host();
    host.set_error(Some("engine lost".to_owned()));
    host.mount(bar_scene());
    assert_eq!(host.content_phase(), ChartPhase::Unmounted);

    host.set_error(None);
    assert_eq!(host.content_phase(), ChartPhase::Growing);
    settle(&mut host, &clock);
    assert_eq!(host.content_phase(), ChartPhase::Settled);

    // Entering the error state unmounts; clearing it replays the entrance.
    host.set_error(Some("engine lost again".to_owned()));
    assert_eq!(host.content_phase(), ChartPhase::Unmounted);
    assert!(!host.hover_element(Some(ElementId::Bar { bucket: 0, category: 0 })));

    host.set_error(None);
    assert_eq!(host.content_phase(), ChartPhase::Growing);
}

#[test]
fn content_build_failure_keeps_chrome_visible() {
    let (mut host, _clock) = ready_host();
    host.mount(Box::new(RecordingScene::failing()));

    host.render().expect("a failing scene never fails the host render");
    let frame = host.last_frame().expect("rendered frame");
    assert!(frame.chrome.is_some());
    assert!(!frame.has_content());
    assert_eq!(frame.overlay_kind(), Some(OverlayKind::ContentError));
    assert!(
        host.content_error()
            .expect("boundary engaged")
            .contains("recording scene refused to build")
    );

    // The boundary holds until new content is mounted.
    assert!(!host.hover_element(Some(ElementId::Slice(0))));
    assert_eq!(host.build_frame().overlay_kind(), Some(OverlayKind::ContentError));

    host.mount(bar_scene());
    assert_eq!(host.content_error(), None);
    assert_eq!(host.build_frame().overlay_kind(), None);
}

#[test]
fn invalid_content_primitives_engage_the_boundary() {
    let (mut host, clock) = ready_host();
    host.mount(Box::new(RecordingScene::blank_label()));

    clock.advance(0.05);
    assert!(host.advance_frame().expect("invalid content never fails the host render"));
    let frame = host.last_frame().expect("rendered frame");
    assert!(frame.chrome.is_some());
    assert!(frame.labels.is_empty());
    assert_eq!(frame.overlay_kind(), Some(OverlayKind::ContentError));
    assert!(host.content_error().is_some());
    assert!(!host.needs_frame());
}

#[test]
fn pointer_events_are_forwarded_unchanged() {
    let (mut host, _clock) = host_with_clock(HostConfig::new(Viewport::new(320, 240)));
    let hovers = Rc::new(RefCell::new(Vec::new()));
    let clicks = Rc::new(RefCell::new(Vec::new()));
    {
        let hovers = Rc::clone(&hovers);
        host.set_on_hover(move |event| hovers.borrow_mut().push(*event));
    }
    {
        let clicks = Rc::clone(&clicks);
        host.set_on_click(move |event| clicks.borrow_mut().push(*event));
    }

    host.pointer_move(10.5, 20.0);
    host.pointer_click(11.0, 21.0, PointerButton::Secondary);
    host.pointer_leave(0.0, 0.0);

    let hovers = hovers.borrow();
    assert_eq!(hovers.len(), 2);
    assert_eq!(hovers[0].kind, PointerEventKind::Move);
    assert_eq!((hovers[0].x, hovers[0].y), (10.5, 20.0));
    assert_eq!(hovers[1].kind, PointerEventKind::Leave);

    let clicks = clicks.borrow();
    assert_eq!(clicks.len(), 1);
    assert_eq!(
        clicks[0].kind,
        PointerEventKind::Click(PointerButton::Secondary)
    );

    host.clear_callbacks();
    host.pointer_move(1.0, 1.0);
    assert_eq!(hovers.len(), 2);
}

#[test]
fn idle_host_does_not_render() {
    let (mut host, clock) = ready_host();
    host.mount(bar_scene());
    assert!(host.advance_frame().expect("first frame"));

    settle(&mut host, &clock);
    assert_eq!(host.content_phase(), ChartPhase::Settled);
    assert!(!host.needs_frame());

    let rendered = host.renderer().frames_rendered;
    clock.advance(0.05);
    assert!(!host.advance_frame().expect("idle frame"));
    assert_eq!(host.renderer().frames_rendered, rendered);

    assert!(host.hover_element(Some(ElementId::Bar { bucket: 0, category: 0 })));
    assert!(host.has_pending_invalidation_topic(InvalidationTopic::Hover));
    assert!(host.needs_frame());
    assert!(host.advance_frame().expect("hover frame"));
    assert_eq!(host.renderer().frames_rendered, rendered + 1);
}

#[test]
fn final_growth_frame_is_drawn() {
    let config = HostConfig::new(Viewport::new(800, 600)).with_max_frame_delta_seconds(0.25);
    let (mut host, clock) = host_with_clock(config);
    host.initialize().expect("initialize");
    host.mount(Box::new(RecordingScene::new(Rc::default())));
    host.advance_frame().expect("first frame");

    let mut frames = 0;
    for _ in 0..4 {
        clock.advance(0.25);
        if host.advance_frame().expect("frame") {
            frames += 1;
        }
    }
    assert_eq!(host.content_phase(), ChartPhase::Settled);
    assert_eq!(frames, 4);

    clock.advance(0.25);
    assert!(!host.advance_frame().expect("settled frame"));
}

#[test]
fn frame_delta_is_clamped() {
    let config = HostConfig::new(Viewport::new(400, 300)).with_max_frame_delta_seconds(0.1);
    let (mut host, clock) = host_with_clock(config);
    host.initialize().expect("initialize");
    let deltas = Rc::new(RefCell::new(Vec::new()));
    host.mount(Box::new(RecordingScene::new(Rc::clone(&deltas))));

    host.tick();
    clock.advance(5.0);
    host.tick();
    clock.set(1.0);
    host.tick();

    assert_eq!(*deltas.borrow(), vec![0.0, 0.1, 0.0]);
}

#[test]
fn hover_routing_moves_between_elements() {
    let (mut host, clock) = ready_host();
    host.mount(bar_scene());
    settle(&mut host, &clock);

    let first = ElementId::Bar { bucket: 0, category: 0 };
    let second = ElementId::Bar { bucket: 1, category: 1 };
    assert!(host.hover_element(Some(first)));
    assert!(!host.hover_element(Some(first)));
    assert!(host.hover_element(Some(second)));
    assert_eq!(host.content().and_then(|scene| scene.hovered()), Some(second));
    assert!(host.hover_element(None));
    assert_eq!(host.content().and_then(|scene| scene.hovered()), None);
}

#[test]
fn orbit_controls_respect_toggles_and_notify() {
    let (mut host, _clock) = ready_host();
    let events: Rc<RefCell<Vec<CameraEvent>>> = Rc::default();
    {
        let events = Rc::clone(&events);
        host.set_on_camera_change(move |event| events.borrow_mut().push(*event));
    }
    host.clear_pending_invalidation();

    let before = host.camera().state();
    assert!(host.orbit_rotate(40.0, 0.0));
    assert!(host.has_pending_invalidation_topic(InvalidationTopic::Camera));
    assert!(host.orbit_zoom(3.0));
    assert!(host.orbit_pan(5.0, 5.0));
    assert!(!host.orbit_zoom(0.0));

    let events = events.borrow();
    let kinds: Vec<CameraChangeKind> = events.iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        vec![
            CameraChangeKind::Rotate,
            CameraChangeKind::Zoom,
            CameraChangeKind::Pan,
        ]
    );
    assert!((events[0].state.yaw - (before.yaw - 0.2)).abs() < 1e-12);
    assert!(events[1].state.distance < before.distance);
    assert_ne!(events[2].state.target, before.target);
}

#[test]
fn locked_controls_ignore_input() {
    let config = HostConfig::new(Viewport::new(800, 600)).with_controls(OrbitControls::locked());
    let (mut host, _clock) = host_with_clock(config);
    let notified = Rc::new(RefCell::new(0_usize));
    {
        let notified = Rc::clone(&notified);
        host.set_on_camera_change(move |_| *notified.borrow_mut() += 1);
    }
    let before = host.camera().state();

    assert!(!host.orbit_rotate(10.0, 10.0));
    assert!(!host.orbit_zoom(1.0));
    assert!(!host.orbit_pan(10.0, 10.0));
    assert_eq!(host.camera().state(), before);
    assert_eq!(*notified.borrow(), 0);
}

#[test]
fn zoom_is_clamped_to_orbit_bounds() {
    let (mut host, _clock) = ready_host();
    for _ in 0..200 {
        host.orbit_zoom(5.0);
    }
    let min = host.config().controls.bounds.min_distance;
    assert!((host.camera().distance() - min).abs() < 1e-9);
}

#[test]
fn unmount_returns_scene_and_clears_content() {
    let (mut host, _clock) = ready_host();
    host.mount(bar_scene());
    let scene = host.unmount().expect("mounted scene");
    assert_eq!(scene.phase(), ChartPhase::Unmounted);
    assert_eq!(host.content_phase(), ChartPhase::Unmounted);
    assert!(host.unmount().is_none());
    assert!(!host.build_frame().has_content());
}

#[test]
fn viewport_changes_are_validated() {
    let (mut host, _clock) = ready_host();
    host.clear_pending_invalidation();

    let err = host
        .set_viewport(Viewport::new(0, 600))
        .expect_err("zero width");
    assert!(matches!(err, ChartError::InvalidViewport { width: 0, .. }));
    assert!(!host.has_pending_invalidation());

    host.set_viewport(Viewport::new(1024, 768)).expect("resize");
    assert!(host.has_pending_invalidation());
    assert_eq!(host.build_frame().viewport, Viewport::new(1024, 768));
}

#[test]
fn invalid_host_config_is_rejected() {
    let config = HostConfig::new(Viewport::new(800, 600)).with_max_frame_delta_seconds(0.0);
    assert!(SceneHost::new(NullRenderer::default(), config).is_err());
}

#[test]
fn camera_only_frames_reuse_built_content() {
    let (mut host, clock) = ready_host();
    let builds = Rc::new(Cell::new(0));
    host.mount(Box::new(RecordingScene::counting_builds(Rc::clone(&builds))));
    settle(&mut host, &clock);
    let settled_builds = builds.get();
    assert!(settled_builds > 0);
    let before = host.last_frame().expect("rendered frame").clone();

    assert!(host.orbit_rotate(40.0, 0.0));
    assert!(host.pending_invalidation().is_view_only());
    assert!(host.render_if_invalidated().expect("render"));
    assert_eq!(builds.get(), settled_builds);

    let after = host.last_frame().expect("rendered frame");
    assert_ne!(
        after.chrome.as_ref().map(|chrome| chrome.camera),
        before.chrome.as_ref().map(|chrome| chrome.camera)
    );
    assert_eq!(after.meshes, before.meshes);

    // Any content-affecting change goes back through the scene.
    host.set_loading(true);
    host.set_loading(false);
    assert!(!host.pending_invalidation().is_view_only());
    host.render().expect("render");
    assert_eq!(builds.get(), settled_builds + 1);
}
