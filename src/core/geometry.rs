//! Procedural meshes for chart primitives.
//!
//! Shapes are described by value (`MeshShape`) inside scene frames and only
//! tessellated by backends that need triangles. Coordinates are Y-up; an
//! angle `θ` on the ground plane maps to `(cos θ, 0, sin θ)`.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::{ChartError, ChartResult};

/// Default number of segments used for a full ring.
pub const DEFAULT_RADIAL_SEGMENTS: u32 = 64;

/// Direction on the ground plane for angle `θ`.
#[must_use]
pub fn ground_direction(angle: f64) -> DVec3 {
    DVec3::new(angle.cos(), 0.0, angle.sin())
}

/// Shape of one drawable mesh, in local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MeshShape {
    /// Axis-aligned box standing on the ground plane, centred on the Y axis.
    Box { width: f64, height: f64, depth: f64 },
    /// Partial cylindrical shell between two radii, standing on the ground plane.
    ArcShell {
        inner_radius: f64,
        outer_radius: f64,
        height: f64,
        start_angle: f64,
        span: f64,
    },
}

impl MeshShape {
    pub fn validate(self) -> ChartResult<()> {
        match self {
            Self::Box {
                width,
                height,
                depth,
            } => {
                if !(width.is_finite() && height.is_finite() && depth.is_finite()) {
                    return Err(ChartError::Geometry(
                        "box dimensions must be finite".to_owned(),
                    ));
                }
                if width <= 0.0 || depth <= 0.0 || height < 0.0 {
                    return Err(ChartError::Geometry(
                        "box width/depth must be > 0 and height >= 0".to_owned(),
                    ));
                }
                Ok(())
            }
            Self::ArcShell {
                inner_radius,
                outer_radius,
                height,
                start_angle,
                span,
            } => {
                if ![inner_radius, outer_radius, height, start_angle, span]
                    .iter()
                    .all(|value| value.is_finite())
                {
                    return Err(ChartError::Geometry(
                        "arc shell parameters must be finite".to_owned(),
                    ));
                }
                if inner_radius < 0.0 || outer_radius <= inner_radius {
                    return Err(ChartError::Geometry(
                        "arc shell radii must satisfy 0 <= inner < outer".to_owned(),
                    ));
                }
                if height < 0.0 {
                    return Err(ChartError::Geometry(
                        "arc shell height must be >= 0".to_owned(),
                    ));
                }
                if span <= 0.0 || span > TAU + 1e-9 {
                    return Err(ChartError::Geometry(
                        "arc shell span must be in (0, 2π]".to_owned(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Local-space bounding box.
    #[must_use]
    pub fn local_bounds(self) -> (DVec3, DVec3) {
        match self {
            Self::Box {
                width,
                height,
                depth,
            } => (
                DVec3::new(-width * 0.5, 0.0, -depth * 0.5),
                DVec3::new(width * 0.5, height, depth * 0.5),
            ),
            Self::ArcShell {
                outer_radius,
                height,
                ..
            } => (
                DVec3::new(-outer_radius, 0.0, -outer_radius),
                DVec3::new(outer_radius, height, outer_radius),
            ),
        }
    }
}

/// Scale, then rotate about Y, then translate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3 {
    pub translation: DVec3,
    pub rotation_y: f64,
    pub scale: DVec3,
}

impl Default for Transform3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform3 {
    pub const IDENTITY: Self = Self {
        translation: DVec3::ZERO,
        rotation_y: 0.0,
        scale: DVec3::ONE,
    };

    #[must_use]
    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_rotation_y(mut self, rotation_y: f64) -> Self {
        self.rotation_y = rotation_y;
        self
    }

    #[must_use]
    pub fn apply_point(self, point: DVec3) -> DVec3 {
        rotate_y(point * self.scale, self.rotation_y) + self.translation
    }

    /// Transforms a direction; non-uniform scale uses the inverse-transpose.
    #[must_use]
    pub fn apply_normal(self, normal: DVec3) -> DVec3 {
        let inverse_scale = DVec3::new(
            safe_recip(self.scale.x),
            safe_recip(self.scale.y),
            safe_recip(self.scale.z),
        );
        rotate_y(normal * inverse_scale, self.rotation_y).normalize_or_zero()
    }

    /// Applies `self` first and `outer` second; `outer` must scale uniformly.
    #[must_use]
    pub fn then(self, outer: Self) -> Self {
        Self {
            translation: outer.apply_point(self.translation),
            rotation_y: self.rotation_y + outer.rotation_y,
            scale: self.scale * outer.scale,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.translation.is_finite() || !self.scale.is_finite() || !self.rotation_y.is_finite()
        {
            return Err(ChartError::Geometry(
                "transform components must be finite".to_owned(),
            ));
        }
        if self.scale.min_element() < 0.0 {
            return Err(ChartError::Geometry(
                "transform scale must be >= 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Rotation about +Y that advances ground-plane angles: `θ` maps to `θ + angle`.
#[must_use]
pub fn rotate_y(point: DVec3, angle: f64) -> DVec3 {
    if angle == 0.0 {
        return point;
    }
    let (sin, cos) = angle.sin_cos();
    DVec3::new(
        point.x * cos - point.z * sin,
        point.y,
        point.x * sin + point.z * cos,
    )
}

fn safe_recip(value: f64) -> f64 {
    if value.abs() <= f64::EPSILON {
        0.0
    } else {
        value.recip()
    }
}

/// Indexed triangle mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub positions: Vec<DVec3>,
    pub normals: Vec<DVec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates triangles as position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [DVec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            ]
        })
    }

    fn push_vertex(&mut self, position: DVec3, normal: DVec3) -> u32 {
        self.positions.push(position);
        self.normals.push(normal);
        (self.positions.len() - 1) as u32
    }

    fn push_quad(&mut self, corners: [DVec3; 4], normal: DVec3) {
        let a = self.push_vertex(corners[0], normal);
        let b = self.push_vertex(corners[1], normal);
        let c = self.push_vertex(corners[2], normal);
        let d = self.push_vertex(corners[3], normal);
        self.indices.extend_from_slice(&[a, b, c, c, d, a]);
    }
}

/// Builds triangles for a shape.
///
/// `radial_segments` is the segment count of a full ring; partial arcs use a
/// proportional share of it (at least one).
pub fn tessellate(shape: MeshShape, radial_segments: u32) -> ChartResult<MeshData> {
    shape.validate()?;
    match shape {
        MeshShape::Box {
            width,
            height,
            depth,
        } => Ok(tessellate_box(width, height, depth)),
        MeshShape::ArcShell {
            inner_radius,
            outer_radius,
            height,
            start_angle,
            span,
        } => Ok(tessellate_arc_shell(
            inner_radius,
            outer_radius,
            height,
            start_angle,
            span.min(TAU),
            radial_segments,
        )),
    }
}

/// Tessellates independent shapes, in parallel when `parallel-tessellation` is on.
pub fn tessellate_all(shapes: &[MeshShape], radial_segments: u32) -> ChartResult<Vec<MeshData>> {
    #[cfg(feature = "parallel-tessellation")]
    {
        use rayon::prelude::*;
        shapes
            .par_iter()
            .map(|shape| tessellate(*shape, radial_segments))
            .collect()
    }

    #[cfg(not(feature = "parallel-tessellation"))]
    {
        shapes
            .iter()
            .map(|shape| tessellate(*shape, radial_segments))
            .collect()
    }
}

fn tessellate_box(width: f64, height: f64, depth: f64) -> MeshData {
    let (x0, x1) = (-width * 0.5, width * 0.5);
    let (z0, z1) = (-depth * 0.5, depth * 0.5);
    let (y0, y1) = (0.0, height);
    let corner = |x: f64, y: f64, z: f64| DVec3::new(x, y, z);

    let mut mesh = MeshData::default();
    mesh.push_quad(
        [
            corner(x0, y0, z1),
            corner(x1, y0, z1),
            corner(x1, y1, z1),
            corner(x0, y1, z1),
        ],
        DVec3::Z,
    );
    mesh.push_quad(
        [
            corner(x1, y0, z0),
            corner(x0, y0, z0),
            corner(x0, y1, z0),
            corner(x1, y1, z0),
        ],
        DVec3::NEG_Z,
    );
    mesh.push_quad(
        [
            corner(x0, y0, z0),
            corner(x0, y0, z1),
            corner(x0, y1, z1),
            corner(x0, y1, z0),
        ],
        DVec3::NEG_X,
    );
    mesh.push_quad(
        [
            corner(x1, y0, z1),
            corner(x1, y0, z0),
            corner(x1, y1, z0),
            corner(x1, y1, z1),
        ],
        DVec3::X,
    );
    mesh.push_quad(
        [
            corner(x0, y1, z1),
            corner(x1, y1, z1),
            corner(x1, y1, z0),
            corner(x0, y1, z0),
        ],
        DVec3::Y,
    );
    mesh.push_quad(
        [
            corner(x0, y0, z0),
            corner(x1, y0, z0),
            corner(x1, y0, z1),
            corner(x0, y0, z1),
        ],
        DVec3::NEG_Y,
    );
    mesh
}

/// Cylinder sector whose inner vertices are pushed out to `inner_radius`.
///
/// Caps start as fans around the axis; every cap vertex closer to the axis
/// than `inner_radius` is reprojected onto the inner radius along its own
/// angle, which opens the donut hole without changing the angular extent.
fn tessellate_arc_shell(
    inner_radius: f64,
    outer_radius: f64,
    height: f64,
    start_angle: f64,
    span: f64,
    radial_segments: u32,
) -> MeshData {
    let full_circle = (span - TAU).abs() <= 1e-9;
    let segments = ((span / TAU) * f64::from(radial_segments.max(3))).ceil().max(1.0) as u32;
    let step = span / f64::from(segments);

    let reproject = |radius: f64, angle: f64, y: f64| {
        let radius = radius.max(inner_radius);
        ground_direction(angle) * radius + DVec3::Y * y
    };

    let mut mesh = MeshData::default();
    for (y, normal) in [(height, DVec3::Y), (0.0, DVec3::NEG_Y)] {
        let mut axis_ring = Vec::with_capacity(segments as usize + 1);
        let mut rim_ring = Vec::with_capacity(segments as usize + 1);
        for column in 0..=segments {
            let angle = start_angle + step * f64::from(column);
            axis_ring.push(mesh.push_vertex(reproject(0.0, angle, y), normal));
            rim_ring.push(mesh.push_vertex(reproject(outer_radius, angle, y), normal));
        }
        for column in 0..segments as usize {
            let (a, b) = (axis_ring[column], axis_ring[column + 1]);
            let (c, d) = (rim_ring[column + 1], rim_ring[column]);
            match (normal.y > 0.0, inner_radius > 0.0) {
                (true, true) => mesh.indices.extend_from_slice(&[a, d, c, c, b, a]),
                (false, true) => mesh.indices.extend_from_slice(&[a, b, c, c, d, a]),
                (true, false) => mesh.indices.extend_from_slice(&[a, d, c]),
                (false, false) => mesh.indices.extend_from_slice(&[a, c, d]),
            }
        }
    }

    for (radius, facing) in [(outer_radius, 1.0), (inner_radius, -1.0)] {
        if radius <= 0.0 {
            continue;
        }
        for column in 0..segments {
            let a0 = start_angle + step * f64::from(column);
            let a1 = a0 + step;
            let n0 = ground_direction(a0) * facing;
            let n1 = ground_direction(a1) * facing;
            let p = |angle: f64, y: f64| ground_direction(angle) * radius + DVec3::Y * y;
            let i0 = mesh.push_vertex(p(a0, 0.0), n0);
            let i1 = mesh.push_vertex(p(a1, 0.0), n1);
            let i2 = mesh.push_vertex(p(a1, height), n1);
            let i3 = mesh.push_vertex(p(a0, height), n0);
            if facing > 0.0 {
                mesh.indices.extend_from_slice(&[i0, i3, i2, i2, i1, i0]);
            } else {
                mesh.indices.extend_from_slice(&[i0, i1, i2, i2, i3, i0]);
            }
        }
    }

    if !full_circle && height > 0.0 {
        let end_angle = start_angle + span;
        for (angle, sign) in [(start_angle, -1.0), (end_angle, 1.0)] {
            let tangent = DVec3::new(-angle.sin(), 0.0, angle.cos()) * sign;
            let dir = ground_direction(angle);
            mesh.push_quad(
                [
                    dir * inner_radius,
                    dir * outer_radius,
                    dir * outer_radius + DVec3::Y * height,
                    dir * inner_radius + DVec3::Y * height,
                ],
                tangent,
            );
        }
    }

    mesh
}
