use chart3d_rs::api::{
    BarChartConfig, BarChartScene, HostConfig, OrbitControls, SCENE_FRAME_JSON_SCHEMA_V1,
    SceneHost,
};
use chart3d_rs::core::{BarCategory, CameraConfig, CategorySeries, Color, SeriesBucket, Viewport};
use chart3d_rs::render::{
    GridConfig, LightDef, NullRenderer, OverlayKind, RenderSettings, SceneFrame, ToneMapping,
    default_lights, shade,
};
use glam::DVec3;

#[test]
fn host_config_defaults_are_valid() {
    let config = HostConfig::new(Viewport::new(1280, 720));
    config.validate().expect("defaults validate");
    assert_eq!(config.lights, default_lights());
    assert_eq!(config.lights.len(), 3);
    assert!(config.controls.enable_rotate);
    assert!(config.controls.enable_zoom);
    assert!(config.controls.enable_pan);
    assert_eq!(config.max_frame_delta_seconds, 0.1);
    assert!(config.render.shadows);
}

#[test]
fn host_config_json_roundtrip() {
    let config = HostConfig::new(Viewport::new(900, 500))
        .with_camera(CameraConfig {
            position: DVec3::new(0.0, 6.0, 12.0),
            ..CameraConfig::default()
        })
        .with_controls(OrbitControls::locked())
        .with_loading_message("Fetching statistics");

    let json = config.to_json_pretty().expect("serialize");
    let restored = HostConfig::from_json_str(&json).expect("parse");
    assert_eq!(restored, config);
}

#[test]
fn host_config_json_fills_defaults() {
    let config = HostConfig::from_json_str(r#"{ "viewport": { "width": 640, "height": 480 } }"#)
        .expect("minimal config");
    assert_eq!(config, HostConfig::new(Viewport::new(640, 480)));

    let config = HostConfig::from_json_str(
        r#"{
            "viewport": { "width": 640, "height": 480 },
            "controls": { "enable_pan": false }
        }"#,
    )
    .expect("partial controls");
    assert!(!config.controls.enable_pan);
    assert!(config.controls.enable_rotate);
    assert_eq!(config.controls.zoom_speed, OrbitControls::default().zoom_speed);
}

#[test]
fn host_config_json_errors_are_reported() {
    let err = HostConfig::from_json_str("{ not json").expect_err("invalid json");
    assert!(err.to_string().contains("failed to parse config"));
}

#[test]
fn host_config_validation_rejects_bad_values() {
    let base = HostConfig::new(Viewport::new(800, 600));

    assert!(HostConfig::new(Viewport::new(0, 600)).validate().is_err());
    assert!(
        base.clone()
            .with_camera(CameraConfig {
                position: DVec3::ZERO,
                ..CameraConfig::default()
            })
            .validate()
            .is_err()
    );
    assert!(
        base.clone()
            .with_grid(GridConfig {
                divisions: 0,
                ..GridConfig::default()
            })
            .validate()
            .is_err()
    );
    assert!(
        base.clone()
            .with_lights(vec![LightDef::directional(DVec3::ZERO, 1.0)])
            .validate()
            .is_err()
    );
    assert!(
        base.clone()
            .with_render_settings(RenderSettings {
                pixel_ratio: 8.0,
                ..RenderSettings::default()
            })
            .validate()
            .is_err()
    );

    let mut controls = OrbitControls::default();
    controls.bounds.min_distance = 10.0;
    controls.bounds.max_distance = 5.0;
    assert!(base.with_controls(controls).validate().is_err());
}

#[test]
fn frame_contract_v1_roundtrip() {
    let series = CategorySeries::new(
        vec![BarCategory::new("a", "A", Color::from_hex(0x4e_79_a7))],
        vec![SeriesBucket::new("Jan").with_value("a", 3.0)],
    )
    .expect("series");
    let mut host =
        SceneHost::new(NullRenderer::default(), HostConfig::new(Viewport::new(320, 200)))
            .expect("host");
    host.initialize().expect("initialize");
    host.mount(Box::new(
        BarChartScene::new(series, BarChartConfig::default()).expect("scene"),
    ));

    let json = host.frame_json_contract_v1_pretty().expect("contract");
    assert!(json.contains("\"schema_version\": 1"));

    let frame = SceneFrame::from_json_compat_str(&json).expect("parse contract");
    assert_eq!(frame, host.build_frame());
    assert_eq!(frame.meshes.len(), 1);

    let bare = serde_json::to_string(&frame).expect("bare frame");
    assert_eq!(
        SceneFrame::from_json_compat_str(&bare).expect("parse bare"),
        frame
    );
}

#[test]
fn frame_contract_rejects_unknown_schema() {
    let frame = SceneFrame::new(Viewport::new(10, 10));
    let json = frame
        .to_json_contract_v1_pretty()
        .expect("contract")
        .replace(
            &format!("\"schema_version\": {SCENE_FRAME_JSON_SCHEMA_V1}"),
            "\"schema_version\": 9",
        );
    let err = SceneFrame::from_json_compat_str(&json).expect_err("unknown schema");
    assert!(err.to_string().contains("unsupported scene frame schema version: 9"));
}

#[test]
fn frame_json_without_radial_segments_uses_default() {
    let mut frame = SceneFrame::new(Viewport::new(10, 10));
    frame.radial_segments = 12;
    let mut value = serde_json::to_value(&frame).expect("to value");
    value
        .as_object_mut()
        .expect("object")
        .remove("radial_segments");
    let restored: SceneFrame = serde_json::from_value(value).expect("from value");
    assert_eq!(restored.radial_segments, 64);
}

#[test]
fn error_frame_contract_has_no_chrome() {
    let mut host =
        SceneHost::new(NullRenderer::default(), HostConfig::new(Viewport::new(320, 200)))
            .expect("host");
    host.set_error(Some("offline".to_owned()));
    let json = host.frame_json_contract_v1_pretty().expect("contract");
    let frame = SceneFrame::from_json_compat_str(&json).expect("parse");
    assert!(frame.chrome.is_none());
    assert_eq!(frame.overlay_kind(), Some(OverlayKind::Error));
}

#[test]
fn shading_faces_toward_key_light_are_brighter() {
    let lights = default_lights();
    let settings = RenderSettings {
        tone_mapping: ToneMapping::Linear,
        ..RenderSettings::default()
    };
    let base = Color::rgb(0.5, 0.5, 0.5);
    let none = Color::rgba(0.0, 0.0, 0.0, 0.0);

    let lit = shade(base, none, DVec3::new(10.0, 10.0, 5.0).normalize(), &lights, settings);
    let away = shade(base, none, DVec3::new(1.0, 0.0, -2.0).normalize(), &lights, settings);
    assert!(lit.red > away.red);
    assert_eq!(lit.alpha, 1.0);

    let glowing = shade(base, Color::rgb(1.0, 0.0, 0.0).with_alpha(0.3), DVec3::X, &lights, settings);
    let plain = shade(base, none, DVec3::X, &lights, settings);
    assert!(glowing.red > plain.red);
    assert_eq!(glowing.green, plain.green);
}

#[test]
fn tone_mapping_stays_in_unit_range() {
    for mapping in [ToneMapping::None, ToneMapping::Linear, ToneMapping::AcesFilmic] {
        for value in [-1.0, 0.0, 0.25, 1.0, 10.0] {
            let mapped = mapping.map_channel(value, 1.0);
            assert!((0.0..=1.0).contains(&mapped));
        }
    }
    assert_eq!(ToneMapping::AcesFilmic.map_channel(0.0, 1.0), 0.0);
}
