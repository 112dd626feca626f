use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::core::Color;
use crate::error::{ChartError, ChartResult};

/// Light source of the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LightDef {
    Ambient {
        color: Color,
        intensity: f64,
    },
    Directional {
        color: Color,
        intensity: f64,
        /// Light position; the light shines from here toward the origin.
        position: DVec3,
        #[serde(default)]
        cast_shadow: bool,
    },
}

impl LightDef {
    #[must_use]
    pub fn ambient(intensity: f64) -> Self {
        Self::Ambient {
            color: Color::WHITE,
            intensity,
        }
    }

    #[must_use]
    pub fn directional(position: DVec3, intensity: f64) -> Self {
        Self::Directional {
            color: Color::WHITE,
            intensity,
            position,
            cast_shadow: false,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        let (color, intensity) = match self {
            Self::Ambient { color, intensity } => (color, intensity),
            Self::Directional {
                color,
                intensity,
                position,
                ..
            } => {
                if !position.is_finite() || position.length_squared() <= f64::EPSILON {
                    return Err(ChartError::InvalidConfig(
                        "directional light position must be finite and away from the origin"
                            .to_owned(),
                    ));
                }
                (color, intensity)
            }
        };
        if !intensity.is_finite() || intensity < 0.0 {
            return Err(ChartError::InvalidConfig(
                "light intensity must be finite and >= 0".to_owned(),
            ));
        }
        color.validate()
    }
}

/// Default three-light rig: ambient fill plus key and rim lights.
#[must_use]
pub fn default_lights() -> Vec<LightDef> {
    vec![
        LightDef::ambient(0.45),
        LightDef::Directional {
            color: Color::WHITE,
            intensity: 0.8,
            position: DVec3::new(10.0, 10.0, 5.0),
            cast_shadow: true,
        },
        LightDef::directional(DVec3::new(-10.0, -10.0, -5.0), 0.3),
    ]
}

/// Tone mapping applied after lighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    None,
    Linear,
    #[default]
    AcesFilmic,
}

impl ToneMapping {
    #[must_use]
    pub fn map_channel(self, value: f64, exposure: f64) -> f64 {
        let value = value.max(0.0) * exposure;
        let mapped = match self {
            Self::None | Self::Linear => value,
            Self::AcesFilmic => {
                let (a, b, c, d, e) = (2.51, 0.03, 2.43, 0.59, 0.14);
                (value * (a * value + b)) / (value * (c * value + d) + e)
            }
        };
        mapped.clamp(0.0, 1.0)
    }
}

/// Rendering-context settings applied when a backend is prepared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub clear_color: Color,
    pub pixel_ratio: f64,
    #[serde(default)]
    pub shadows: bool,
    #[serde(default)]
    pub tone_mapping: ToneMapping,
    #[serde(default = "default_exposure")]
    pub exposure: f64,
}

fn default_exposure() -> f64 {
    1.0
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: Color::rgba(0.0, 0.0, 0.0, 0.0),
            pixel_ratio: 1.0,
            shadows: true,
            tone_mapping: ToneMapping::default(),
            exposure: default_exposure(),
        }
    }
}

impl RenderSettings {
    pub fn validate(self) -> ChartResult<()> {
        if !self.pixel_ratio.is_finite() || !(0.25..=4.0).contains(&self.pixel_ratio) {
            return Err(ChartError::InvalidConfig(
                "pixel ratio must be in [0.25, 4]".to_owned(),
            ));
        }
        if !self.exposure.is_finite() || self.exposure <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "exposure must be finite and > 0".to_owned(),
            ));
        }
        self.clear_color.validate()
    }
}

/// Flat Lambert shading of a surface color.
///
/// Emissive light is added on top of the lit color before tone mapping.
#[must_use]
pub fn shade(
    base: Color,
    emissive: Color,
    normal: DVec3,
    lights: &[LightDef],
    settings: RenderSettings,
) -> Color {
    let mut light = DVec3::ZERO;
    for def in lights {
        match *def {
            LightDef::Ambient { color, intensity } => {
                light += DVec3::new(color.red, color.green, color.blue) * intensity;
            }
            LightDef::Directional {
                color,
                intensity,
                position,
                ..
            } => {
                let to_light = position.normalize_or_zero();
                let lambert = normal.dot(to_light).max(0.0);
                light += DVec3::new(color.red, color.green, color.blue) * intensity * lambert;
            }
        }
    }

    let lit = DVec3::new(base.red, base.green, base.blue) * light
        + DVec3::new(emissive.red, emissive.green, emissive.blue) * emissive.alpha;
    let map = |channel: f64| {
        settings
            .tone_mapping
            .map_channel(channel, settings.exposure)
    };
    Color::rgba(map(lit.x), map(lit.y), map(lit.z), base.alpha)
}
