use glam::DVec3;
use ordered_float::OrderedFloat;
use std::f64::consts::TAU;

use crate::core::geometry::rotate_y;
use crate::core::{ElementId, MeshShape, Ray, Transform3};
use crate::render::{MeshPrimitive, SceneFrame};

const EDGE_TOLERANCE: f64 = 1e-9;

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    /// Slab test; returns the entry distance along the ray.
    #[must_use]
    pub fn intersect(self, ray: Ray) -> Option<f64> {
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            if direction.abs() <= f64::EPSILON {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = direction.recip();
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        if t_max < 0.0 {
            return None;
        }
        Some(t_min.max(0.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub element: ElementId,
    pub distance: f64,
}

/// Closest interactive mesh hit by `ray`.
///
/// This is a caller-side helper; scene hosts never pick on their own.
#[must_use]
pub fn pick_element(frame: &SceneFrame, ray: Ray) -> Option<PickHit> {
    frame
        .meshes
        .iter()
        .filter_map(|mesh| {
            let element = mesh.element?;
            let world = mesh.transform.then(frame.content_transform);
            let distance = intersect_mesh(mesh, world, ray)?;
            Some(PickHit { element, distance })
        })
        .min_by_key(|hit| OrderedFloat(hit.distance))
}

fn intersect_mesh(mesh: &MeshPrimitive, world: Transform3, ray: Ray) -> Option<f64> {
    match mesh.shape {
        MeshShape::Box { .. } => {
            let (min, max) = mesh.shape.local_bounds();
            let corners = (0..8).map(|i| {
                world.apply_point(DVec3::new(
                    if i & 1 == 0 { min.x } else { max.x },
                    if i & 2 == 0 { min.y } else { max.y },
                    if i & 4 == 0 { min.z } else { max.z },
                ))
            });
            Aabb::from_points(corners)?.intersect(ray)
        }
        MeshShape::ArcShell {
            inner_radius,
            outer_radius,
            height,
            start_angle,
            span,
        } => {
            // Work in the shell's frame with radial scale applied.
            let shell = LocalShell {
                inner: inner_radius * world.scale.x,
                outer: outer_radius * world.scale.x,
                top: height * world.scale.y,
                start_angle,
                span,
            };
            let local = Ray {
                origin: rotate_y(ray.origin - world.translation, -world.rotation_y),
                direction: rotate_y(ray.direction, -world.rotation_y),
            };
            shell.intersect(local)
        }
    }
}

/// Arc shell expressed in its own frame: base on `y = 0`, axis along `y`.
struct LocalShell {
    inner: f64,
    outer: f64,
    top: f64,
    start_angle: f64,
    span: f64,
}

impl LocalShell {
    fn intersect(&self, ray: Ray) -> Option<f64> {
        let caps = self.cap_hits(ray);
        let walls = [self.outer, self.inner]
            .into_iter()
            .flat_map(|radius| self.wall_hits(ray, radius));
        let ends = self.end_hits(ray);
        caps.into_iter()
            .chain(walls)
            .chain(ends)
            .flatten()
            .min_by_key(|t| OrderedFloat(*t))
    }

    fn contains_angle(&self, angle: f64) -> bool {
        self.span >= TAU || (angle - self.start_angle).rem_euclid(TAU) <= self.span
    }

    fn contains_height(&self, y: f64) -> bool {
        (-EDGE_TOLERANCE..=self.top + EDGE_TOLERANCE).contains(&y)
    }

    fn contains_radius(&self, radius: f64) -> bool {
        (self.inner - EDGE_TOLERANCE..=self.outer + EDGE_TOLERANCE).contains(&radius)
    }

    /// Top and bottom annulus faces.
    fn cap_hits(&self, ray: Ray) -> [Option<f64>; 2] {
        [self.top, 0.0].map(|plane_y| {
            if ray.direction.y.abs() <= f64::EPSILON {
                return None;
            }
            let t = (plane_y - ray.origin.y) / ray.direction.y;
            if t < 0.0 {
                return None;
            }
            let p = ray.origin + ray.direction * t;
            let radius = (p.x * p.x + p.z * p.z).sqrt();
            (self.contains_radius(radius) && self.contains_angle(p.z.atan2(p.x))).then_some(t)
        })
    }

    /// Vertical cylinder wall of `radius`, clipped to height and angular extent.
    fn wall_hits(&self, ray: Ray, radius: f64) -> [Option<f64>; 2] {
        let (o, d) = (ray.origin, ray.direction);
        let a = d.x * d.x + d.z * d.z;
        if a <= f64::EPSILON || radius <= 0.0 {
            return [None, None];
        }
        let b = 2.0 * (o.x * d.x + o.z * d.z);
        let c = o.x * o.x + o.z * o.z - radius * radius;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return [None, None];
        }
        let root = discriminant.sqrt();
        [(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)].map(|t| {
            if t < 0.0 {
                return None;
            }
            let p = o + d * t;
            (self.contains_height(p.y) && self.contains_angle(p.z.atan2(p.x))).then_some(t)
        })
    }

    /// Radial end faces of a partial arc.
    fn end_hits(&self, ray: Ray) -> [Option<f64>; 2] {
        if self.span >= TAU {
            return [None, None];
        }
        [self.start_angle, self.start_angle + self.span].map(|angle| {
            let (sin, cos) = angle.sin_cos();
            let normal = DVec3::new(-sin, 0.0, cos);
            let denominator = ray.direction.dot(normal);
            if denominator.abs() <= f64::EPSILON {
                return None;
            }
            let t = -ray.origin.dot(normal) / denominator;
            if t < 0.0 {
                return None;
            }
            let p = ray.origin + ray.direction * t;
            let along = p.x * cos + p.z * sin;
            (along >= 0.0 && self.contains_radius(along) && self.contains_height(p.y))
                .then_some(t)
        })
    }
}
