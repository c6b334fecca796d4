use glam::{Mat4, Vec3};
use crate::camera::AABB;
use super::*;

/// Camera at the origin looking down -Z, 90° FOV, near 0.1, far 500.
fn looking_down_negative_z() -> Frustum {
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 500.0);
    let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
    Frustum::from_view_projection(&(projection * view))
}

fn cube(center: Vec3, size: f32) -> AABB {
    AABB::from_center_size(center, Vec3::splat(size))
}

// ============================================================================
// Frustum::from_view_projection
// ============================================================================

#[test]
fn test_planes_are_normalized() {
    let frustum = looking_down_negative_z();
    for plane in &frustum.planes {
        let normal_len = plane.truncate().length();
        assert!((normal_len - 1.0).abs() < 1e-4, "plane normal should be unit length");
    }
}

#[test]
fn test_orthographic_planes_are_normalized() {
    let vp = Mat4::orthographic_rh(-10.0, 10.0, -10.0, 10.0, 0.1, 100.0);
    let frustum = Frustum::from_view_projection(&vp);
    for plane in &frustum.planes {
        assert!((plane.truncate().length() - 1.0).abs() < 1e-4);
    }
}

#[test]
fn test_near_plane_faces_view_direction() {
    let frustum = looking_down_negative_z();
    let near = frustum.planes[PLANE_NEAR];
    assert!(near.truncate().dot(Vec3::new(0.0, 0.0, -1.0)) > 0.99);
}

// ============================================================================
// Frustum::intersects_aabb
// ============================================================================

#[test]
fn test_aabb_in_front_is_visible() {
    let frustum = looking_down_negative_z();
    assert!(frustum.intersects_aabb(&cube(Vec3::new(0.0, 0.0, -50.0), 25.0)));
}

#[test]
fn test_aabb_behind_camera_is_culled() {
    let frustum = looking_down_negative_z();
    assert!(!frustum.intersects_aabb(&cube(Vec3::new(0.0, 0.0, 1000.0), 25.0)));
}

#[test]
fn test_aabb_straddling_camera_is_visible() {
    // Cell centered just behind the eye still reaches into the view volume
    let frustum = looking_down_negative_z();
    assert!(frustum.intersects_aabb(&cube(Vec3::new(0.0, 0.0, 5.0), 25.0)));
}

#[test]
fn test_aabb_beyond_far_plane_is_culled() {
    let frustum = looking_down_negative_z();
    assert!(!frustum.intersects_aabb(&cube(Vec3::new(0.0, 0.0, -600.0), 25.0)));
}

#[test]
fn test_aabb_far_to_the_side_is_culled() {
    let frustum = looking_down_negative_z();
    assert!(!frustum.intersects_aabb(&cube(Vec3::new(200.0, 0.0, -50.0), 25.0)));
}

// ============================================================================
// Frustum::classify_aabb
// ============================================================================

#[test]
fn test_classify_inside_partial_outside() {
    let frustum = looking_down_negative_z();
    assert_eq!(frustum.classify_aabb(&cube(Vec3::new(0.0, 0.0, -50.0), 2.0)), FrustumTest::Inside);
    assert_eq!(frustum.classify_aabb(&cube(Vec3::new(0.0, 0.0, 0.0), 25.0)), FrustumTest::Partial);
    assert_eq!(frustum.classify_aabb(&cube(Vec3::new(0.0, 0.0, 1000.0), 25.0)), FrustumTest::Outside);
}

// ============================================================================
// Spheres and packing
// ============================================================================

#[test]
fn test_sphere_test_uses_radius() {
    let frustum = looking_down_negative_z();
    // Center behind the eye, but radius reaches past the near plane
    assert!(frustum.intersects_sphere(Vec3::new(0.0, 0.0, 1.0), 2.0));
    assert!(!frustum.intersects_sphere(Vec3::new(0.0, 0.0, 1.0), 0.5));
    assert!(frustum.intersects_sphere(Vec3::new(0.0, 0.0, -10.0), 0.0));
}

#[test]
fn test_packed_planes_round_trip() {
    let frustum = looking_down_negative_z();
    let packed = frustum.packed_planes();
    assert_eq!(packed.len(), PACKED_PLANE_FLOATS);
    assert_eq!(packed[PLANE_FAR * 4 + 3], frustum.planes[PLANE_FAR].w);
    assert_eq!(Frustum::from_packed_planes(&packed), frustum);
}
