use serde::{Deserialize, Serialize};

use crate::core::{CameraConfig, OrbitBounds, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::{GridConfig, LightDef, RenderSettings, default_lights};

/// Orbit-control toggles and input sensitivities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitControls {
    #[serde(default = "default_true")]
    pub enable_rotate: bool,
    #[serde(default = "default_true")]
    pub enable_zoom: bool,
    #[serde(default = "default_true")]
    pub enable_pan: bool,
    /// Radians per pixel of pointer drag.
    #[serde(default = "default_rotate_speed")]
    pub rotate_speed: f64,
    /// Zoom factor per scroll step.
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f64,
    /// World units per pixel at unit distance.
    #[serde(default = "default_pan_speed")]
    pub pan_speed: f64,
    #[serde(default)]
    pub bounds: OrbitBounds,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: true,
            rotate_speed: default_rotate_speed(),
            zoom_speed: default_zoom_speed(),
            pan_speed: default_pan_speed(),
            bounds: OrbitBounds::default(),
        }
    }
}

impl OrbitControls {
    #[must_use]
    pub fn locked() -> Self {
        Self {
            enable_rotate: false,
            enable_zoom: false,
            enable_pan: false,
            ..Self::default()
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        for (name, value) in [
            ("rotate_speed", self.rotate_speed),
            ("zoom_speed", self.zoom_speed),
            ("pan_speed", self.pan_speed),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "orbit control `{name}` must be finite and > 0"
                )));
            }
        }
        let bounds = self.bounds;
        if !bounds.min_distance.is_finite()
            || !bounds.max_distance.is_finite()
            || bounds.min_distance <= 0.0
            || bounds.max_distance < bounds.min_distance
        {
            return Err(ChartError::InvalidConfig(
                "orbit distance bounds must satisfy 0 < min <= max".to_owned(),
            ));
        }
        if !(bounds.min_pitch.is_finite() && bounds.max_pitch.is_finite())
            || bounds.max_pitch < bounds.min_pitch
        {
            return Err(ChartError::InvalidConfig(
                "orbit pitch bounds must satisfy min <= max".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Public scene host bootstrap configuration.
///
/// Serializable so dashboards can persist camera and lighting setup next to
/// their chart definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    pub viewport: Viewport,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default = "default_lights")]
    pub lights: Vec<LightDef>,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub controls: OrbitControls,
    #[serde(default)]
    pub render: RenderSettings,
    /// Upper bound on the animation step of one frame.
    #[serde(default = "default_max_frame_delta_seconds")]
    pub max_frame_delta_seconds: f64,
    #[serde(default = "default_loading_message")]
    pub loading_message: String,
}

impl HostConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            camera: CameraConfig::default(),
            lights: default_lights(),
            grid: GridConfig::default(),
            controls: OrbitControls::default(),
            render: RenderSettings::default(),
            max_frame_delta_seconds: default_max_frame_delta_seconds(),
            loading_message: default_loading_message(),
        }
    }

    #[must_use]
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    #[must_use]
    pub fn with_lights(mut self, lights: Vec<LightDef>) -> Self {
        self.lights = lights;
        self
    }

    #[must_use]
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    #[must_use]
    pub fn with_controls(mut self, controls: OrbitControls) -> Self {
        self.controls = controls;
        self
    }

    #[must_use]
    pub fn with_render_settings(mut self, render: RenderSettings) -> Self {
        self.render = render;
        self
    }

    #[must_use]
    pub fn with_max_frame_delta_seconds(mut self, seconds: f64) -> Self {
        self.max_frame_delta_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_loading_message(mut self, message: impl Into<String>) -> Self {
        self.loading_message = message.into();
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        self.camera.validate()?;
        for light in &self.lights {
            light.validate()?;
        }
        self.grid.validate()?;
        self.controls.validate()?;
        self.render.validate()?;
        if !self.max_frame_delta_seconds.is_finite() || self.max_frame_delta_seconds <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "max frame delta must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Serializes config to pretty JSON.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))
    }
}

fn default_true() -> bool {
    true
}

fn default_rotate_speed() -> f64 {
    0.005
}

fn default_zoom_speed() -> f64 {
    0.95
}

fn default_pan_speed() -> f64 {
    0.002
}

fn default_max_frame_delta_seconds() -> f64 {
    0.1
}

fn default_loading_message() -> String {
    "Loading…".to_owned()
}
