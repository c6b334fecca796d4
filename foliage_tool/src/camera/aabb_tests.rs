use glam::{Mat4, Quat, Vec3};
use super::AABB;

#[test]
fn test_from_center_size() {
    let aabb = AABB::from_center_size(Vec3::new(25.0, 0.0, -25.0), Vec3::splat(25.0));
    assert_eq!(aabb.min, Vec3::new(12.5, -12.5, -37.5));
    assert_eq!(aabb.max, Vec3::new(37.5, 12.5, -12.5));
    assert_eq!(aabb.center(), Vec3::new(25.0, 0.0, -25.0));
    assert_eq!(aabb.size(), Vec3::splat(25.0));
}

#[test]
fn test_contains_point_includes_boundary() {
    let aabb = AABB::from_center_size(Vec3::ZERO, Vec3::splat(2.0));
    assert!(aabb.contains_point(Vec3::new(1.0, 0.0, 0.0)));
    assert!(aabb.contains_point(Vec3::ZERO));
    assert!(!aabb.contains_point(Vec3::new(1.01, 0.0, 0.0)));
}

#[test]
fn test_contains_and_intersects() {
    let outer = AABB::from_center_size(Vec3::ZERO, Vec3::splat(10.0));
    let inner = AABB::from_center_size(Vec3::ONE, Vec3::splat(2.0));
    let touching = AABB::from_center_size(Vec3::new(6.0, 0.0, 0.0), Vec3::splat(2.0));
    let apart = AABB::from_center_size(Vec3::new(20.0, 0.0, 0.0), Vec3::splat(2.0));

    assert!(outer.contains(&inner));
    assert!(!inner.contains(&outer));
    assert!(outer.intersects(&touching));
    assert!(!outer.intersects(&apart));
}

#[test]
fn test_bounding_radius_of_unit_cube() {
    let aabb = AABB::from_center_size(Vec3::ZERO, Vec3::ONE);
    assert!((aabb.bounding_radius() - 3.0f32.sqrt() * 0.5).abs() < 1e-6);
}

#[test]
fn test_transformed_translation_and_scale() {
    let aabb = AABB::from_center_size(Vec3::ZERO, Vec3::ONE);
    let matrix = Mat4::from_scale_rotation_translation(Vec3::splat(2.0), Quat::IDENTITY, Vec3::new(5.0, 0.0, 0.0));
    let moved = aabb.transformed(&matrix);
    assert_eq!(moved.min, Vec3::new(4.0, -1.0, -1.0));
    assert_eq!(moved.max, Vec3::new(6.0, 1.0, 1.0));
}

#[test]
fn test_transformed_rotation_grows_box() {
    let aabb = AABB::from_center_size(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
    let rotated = aabb.transformed(&Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4));
    let half = 2.0f32.sqrt() * 0.5;
    assert!((rotated.max.x - half).abs() < 1e-5);
    assert!((rotated.max.z - half).abs() < 1e-5);
}
