use approx::assert_relative_eq;
use chart3d_rs::core::geometry::{ground_direction, rotate_y};
use chart3d_rs::core::{MeshData, MeshShape, Transform3, tessellate, tessellate_all};
use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

fn ring(span: f64) -> MeshShape {
    MeshShape::ArcShell {
        inner_radius: 1.2,
        outer_radius: 2.0,
        height: 0.5,
        start_angle: 0.0,
        span,
    }
}

fn triangle_area(tri: [DVec3; 3]) -> f64 {
    (tri[1] - tri[0]).cross(tri[2] - tri[0]).length() * 0.5
}

fn ground_radius(point: DVec3) -> f64 {
    (point.x * point.x + point.z * point.z).sqrt()
}

#[test]
fn box_has_six_faces() {
    let mesh = tessellate(
        MeshShape::Box {
            width: 0.4,
            height: 3.0,
            depth: 0.4,
        },
        64,
    )
    .expect("box");
    assert_eq!(mesh.triangle_count(), 12);
    assert_eq!(mesh.positions.len(), mesh.normals.len());

    let max_y = mesh.positions.iter().map(|p| p.y).fold(f64::MIN, f64::max);
    let min_y = mesh.positions.iter().map(|p| p.y).fold(f64::MAX, f64::min);
    assert_eq!((min_y, max_y), (0.0, 3.0));
}

#[test]
fn full_ring_is_closed_without_end_caps() {
    let mesh = tessellate(ring(TAU), 64).expect("full ring");
    // Top, bottom, outer wall and inner wall; two triangles per segment each.
    assert_eq!(mesh.triangle_count(), 64 * 8);
    for tri in mesh.triangles() {
        assert!(triangle_area(tri) > 1e-9, "degenerate triangle {tri:?}");
    }
    // No vertex carries a tangential normal, which only end caps would have.
    for (position, normal) in mesh.positions.iter().zip(&mesh.normals) {
        let radial = DVec3::new(position.x, 0.0, position.z).normalize_or_zero();
        let tangential = DVec3::new(-radial.z, 0.0, radial.x);
        assert!(normal.dot(tangential).abs() < 1e-9);
    }
}

#[test]
fn partial_arc_gets_two_end_caps() {
    let mesh = tessellate(ring(PI), 64).expect("half ring");
    assert_eq!(mesh.triangle_count(), 32 * 8 + 4);
}

#[test]
fn inner_vertices_are_reprojected_onto_inner_radius() {
    let mesh = tessellate(ring(1.3), 48).expect("arc");
    for position in &mesh.positions {
        let radius = ground_radius(*position);
        assert!(radius >= 1.2 - 1e-9, "vertex inside the hole: {position:?}");
        assert!(radius <= 2.0 + 1e-9);
    }
}

#[test]
fn partial_arc_stays_within_its_angular_extent() {
    let start = 0.75;
    let span = 1.1;
    let mesh = tessellate(
        MeshShape::ArcShell {
            inner_radius: 1.0,
            outer_radius: 2.5,
            height: 0.4,
            start_angle: start,
            span,
        },
        64,
    )
    .expect("arc");
    for position in &mesh.positions {
        let angle = position.z.atan2(position.x).rem_euclid(TAU);
        assert!(angle >= start - 1e-9 && angle <= start + span + 1e-9);
    }
}

#[test]
fn segment_count_is_proportional_to_span() {
    let quarter = tessellate(ring(FRAC_PI_2), 64).expect("quarter");
    assert_eq!(quarter.triangle_count(), 16 * 8 + 4);

    let sliver = tessellate(ring(1e-4), 64).expect("sliver");
    assert_eq!(sliver.triangle_count(), 8 + 4);
}

#[test]
fn invalid_shapes_are_rejected() {
    assert!(tessellate(ring(0.0), 64).is_err());
    assert!(tessellate(ring(7.0), 64).is_err());
    assert!(
        tessellate(
            MeshShape::ArcShell {
                inner_radius: 2.0,
                outer_radius: 2.0,
                height: 1.0,
                start_angle: 0.0,
                span: 1.0,
            },
            64
        )
        .is_err()
    );
    assert!(
        tessellate(
            MeshShape::Box {
                width: 0.0,
                height: 1.0,
                depth: 1.0,
            },
            64
        )
        .is_err()
    );
}

#[test]
fn tessellate_all_preserves_order() {
    let shapes = [
        ring(TAU),
        MeshShape::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        },
    ];
    let meshes: Vec<MeshData> = tessellate_all(&shapes, 32).expect("batch");
    assert_eq!(meshes.len(), 2);
    assert_eq!(meshes[0].triangle_count(), 32 * 8);
    assert_eq!(meshes[1].triangle_count(), 12);
}

#[test]
fn rotate_y_advances_ground_angles() {
    let rotated = rotate_y(ground_direction(0.3), 0.5);
    let expected = ground_direction(0.8);
    assert_relative_eq!(rotated.x, expected.x, epsilon = 1e-12);
    assert_relative_eq!(rotated.z, expected.z, epsilon = 1e-12);
}

#[test]
fn transforms_compose_inner_first() {
    let inner = Transform3::from_translation(DVec3::new(1.0, 0.0, 0.0))
        .with_scale(DVec3::new(2.0, 1.0, 2.0));
    let outer = Transform3::IDENTITY.with_rotation_y(FRAC_PI_2);
    let composed = inner.then(outer);

    let point = DVec3::new(1.0, 1.0, 0.0);
    let expected = outer.apply_point(inner.apply_point(point));
    let actual = composed.apply_point(point);
    assert_relative_eq!(actual.x, expected.x, epsilon = 1e-12);
    assert_relative_eq!(actual.y, expected.y, epsilon = 1e-12);
    assert_relative_eq!(actual.z, expected.z, epsilon = 1e-12);
}

#[test]
fn normals_stay_unit_under_nonuniform_scale() {
    let transform = Transform3::IDENTITY.with_scale(DVec3::new(1.0, 0.25, 1.0));
    let normal = transform.apply_normal(DVec3::new(1.0, 1.0, 0.0).normalize());
    assert_relative_eq!(normal.length(), 1.0, epsilon = 1e-12);
    assert!(normal.y > normal.x);
}
