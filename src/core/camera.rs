use glam::{DMat4, DVec3, DVec4};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};

/// Perspective camera placement as configured by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: DVec3,
    #[serde(default)]
    pub target: DVec3,
    pub fov_y_degrees: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: DVec3::new(8.0, 8.0, 8.0),
            target: DVec3::ZERO,
            fov_y_degrees: 50.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraConfig {
    pub fn validate(self) -> ChartResult<()> {
        if !self.position.is_finite() || !self.target.is_finite() {
            return Err(ChartError::InvalidConfig(
                "camera position and target must be finite".to_owned(),
            ));
        }
        if self.position.distance(self.target) <= f64::EPSILON {
            return Err(ChartError::InvalidConfig(
                "camera position must differ from its target".to_owned(),
            ));
        }
        if !self.fov_y_degrees.is_finite() || !(1.0..179.0).contains(&self.fov_y_degrees) {
            return Err(ChartError::InvalidConfig(
                "camera field of view must be in [1, 179) degrees".to_owned(),
            ));
        }
        if !self.near.is_finite() || !self.far.is_finite() || self.near <= 0.0 || self.far <= self.near
        {
            return Err(ChartError::InvalidConfig(
                "camera clip planes must satisfy 0 < near < far".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Limits applied by orbit controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitBounds {
    pub min_distance: f64,
    pub max_distance: f64,
    pub min_pitch: f64,
    pub max_pitch: f64,
}

impl Default for OrbitBounds {
    fn default() -> Self {
        Self {
            min_distance: 2.0,
            max_distance: 50.0,
            min_pitch: -FRAC_PI_2 + 1e-3,
            max_pitch: FRAC_PI_2 - 1e-3,
        }
    }
}

/// Half-line used for picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    #[must_use]
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    #[must_use]
    pub fn point_at(self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// Screen-space projection of a world point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    /// Normalized device depth in `[-1, 1]`; smaller is closer.
    pub depth: f64,
}

/// Snapshot of the camera pose reported to camera-change listeners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub eye: DVec3,
    pub target: DVec3,
    pub distance: f64,
    pub yaw: f64,
    pub pitch: f64,
}

/// Y-up camera orbiting a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    distance: f64,
    pitch: f64,
    yaw: f64,
    target: DVec3,
    fov_y_degrees: f64,
    near: f64,
    far: f64,
    bounds: OrbitBounds,
}

impl OrbitCamera {
    pub fn from_config(config: CameraConfig) -> ChartResult<Self> {
        config.validate()?;
        let offset = config.position - config.target;
        let distance = offset.length();
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        Ok(Self {
            distance,
            pitch,
            yaw,
            target: config.target,
            fov_y_degrees: config.fov_y_degrees,
            near: config.near,
            far: config.far,
            bounds: OrbitBounds {
                min_distance: OrbitBounds::default().min_distance.min(distance),
                max_distance: OrbitBounds::default().max_distance.max(distance),
                ..OrbitBounds::default()
            },
        })
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: OrbitBounds) -> Self {
        self.bounds = bounds;
        self.distance = self
            .distance
            .clamp(bounds.min_distance, bounds.max_distance);
        self.pitch = self.pitch.clamp(bounds.min_pitch, bounds.max_pitch);
        self
    }

    #[must_use]
    pub fn eye(&self) -> DVec3 {
        self.target
            + DVec3::new(
                self.distance * self.yaw.sin() * self.pitch.cos(),
                self.distance * self.pitch.sin(),
                self.distance * self.yaw.cos() * self.pitch.cos(),
            )
    }

    #[must_use]
    pub fn target(&self) -> DVec3 {
        self.target
    }

    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[must_use]
    pub fn state(&self) -> CameraState {
        CameraState {
            eye: self.eye(),
            target: self.target,
            distance: self.distance,
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }

    pub fn rotate(&mut self, delta_yaw: f64, delta_pitch: f64) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(self.bounds.min_pitch, self.bounds.max_pitch);
    }

    /// Multiplies the orbit distance; factors below 1 move closer.
    pub fn zoom(&mut self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.distance =
            (self.distance * factor).clamp(self.bounds.min_distance, self.bounds.max_distance);
    }

    /// Moves the target in the view plane, scaled by the orbit distance.
    pub fn pan(&mut self, delta_right: f64, delta_up: f64) {
        let forward = (self.target - self.eye()).normalize_or_zero();
        let right = forward.cross(DVec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        let scale = self.distance * 0.1;
        self.target += right * delta_right * scale + up * delta_up * scale;
    }

    #[must_use]
    pub fn view(&self) -> CameraView {
        CameraView {
            eye: self.eye(),
            target: self.target,
            fov_y_degrees: self.fov_y_degrees,
            near: self.near,
            far: self.far,
        }
    }

    #[must_use]
    pub fn view_projection(&self, viewport: Viewport) -> DMat4 {
        self.view().view_projection(viewport)
    }

    /// Projects a world point to pixels; `None` when behind the camera.
    #[must_use]
    pub fn project(&self, point: DVec3, viewport: Viewport) -> Option<ScreenPoint> {
        project_with(self.view_projection(viewport), point, viewport)
    }

    /// World-space ray through a pixel.
    #[must_use]
    pub fn screen_ray(&self, x: f64, y: f64, viewport: Viewport) -> Ray {
        let ndc_x = 2.0 * x / f64::from(viewport.width.max(1)) - 1.0;
        let ndc_y = 1.0 - 2.0 * y / f64::from(viewport.height.max(1));
        let inverse = self.view_projection(viewport).inverse();
        let near = inverse * DVec4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far = inverse * DVec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;
        Ray::new(near, far - near)
    }
}

/// Projects with a precomputed view-projection matrix.
#[must_use]
pub fn project_with(view_projection: DMat4, point: DVec3, viewport: Viewport) -> Option<ScreenPoint> {
    let clip = view_projection * point.extend(1.0);
    if clip.w <= f64::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(ScreenPoint {
        x: (ndc.x + 1.0) * 0.5 * f64::from(viewport.width),
        y: (1.0 - ndc.y) * 0.5 * f64::from(viewport.height),
        depth: ndc.z,
    })
}

/// Resolved camera parameters carried by a scene frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub eye: DVec3,
    pub target: DVec3,
    pub fov_y_degrees: f64,
    pub near: f64,
    pub far: f64,
}

impl CameraView {
    #[must_use]
    pub fn view_projection(self, viewport: Viewport) -> DMat4 {
        let projection = DMat4::perspective_rh_gl(
            self.fov_y_degrees.to_radians(),
            viewport.aspect(),
            self.near,
            self.far,
        );
        projection * DMat4::look_at_rh(self.eye, self.target, DVec3::Y)
    }

    pub fn validate(self) -> ChartResult<()> {
        CameraConfig {
            position: self.eye,
            target: self.target,
            fov_y_degrees: self.fov_y_degrees,
            near: self.near,
            far: self.far,
        }
        .validate()
    }
}
