use glam::{Mat4, Quat, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::grid::SceneData;
use crate::resource::{FoliageType, Material, Mesh, PlacementRules, SubMesh};
use crate::camera::AABB;
use std::sync::Arc;
use super::*;

// ============================================================================
// Helper Functions
// ============================================================================

fn aligned_rules() -> PlacementRules {
    PlacementRules {
        align_to_normal: true,
        random_rotation: false,
        ..Default::default()
    }
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn rotation_of(matrix: &Mat4) -> Quat {
    let (_, rotation, _) = matrix.to_scale_rotation_translation();
    rotation
}

// ============================================================================
// Transforms
// ============================================================================

#[test]
fn test_up_normal_gives_identity_rotation() {
    let rotation = placement_rotation(&aligned_rules(), Vec3::Y, &mut rng());
    assert!(rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));
}

#[test]
fn test_right_normal_maps_up_to_right() {
    let rotation = placement_rotation(&aligned_rules(), Vec3::X, &mut rng());
    assert!((rotation * Vec3::Y).abs_diff_eq(Vec3::X, 1e-6));
}

#[test]
fn test_no_alignment_ignores_normal() {
    let rules = PlacementRules { align_to_normal: false, random_rotation: false, ..Default::default() };
    let rotation = placement_rotation(&rules, Vec3::X, &mut rng());
    assert_eq!(rotation, Quat::IDENTITY);
}

#[test]
fn test_random_rotation_keeps_up_axis() {
    let rules = PlacementRules { align_to_normal: false, random_rotation: true, ..Default::default() };
    let mut rng = rng();
    for _ in 0..16 {
        let rotation = placement_rotation(&rules, Vec3::Y, &mut rng);
        assert!((rotation * Vec3::Y).abs_diff_eq(Vec3::Y, 1e-5));
    }
}

#[test]
fn test_compose_transform_scales_within_range() {
    let rules = PlacementRules { min_scale: 0.5, max_scale: 2.0, ..Default::default() };
    let hit = SurfaceHit::new(Vec3::new(3.0, 1.0, -2.0), Vec3::Y);
    let mut rng = rng();
    for _ in 0..32 {
        let (scale, _, translation) = compose_transform(&rules, &hit, &mut rng).to_scale_rotation_translation();
        assert!(scale.x >= 0.5 - 1e-5 && scale.x <= 2.0 + 1e-5);
        assert!((scale.x - scale.y).abs() < 1e-4 && (scale.x - scale.z).abs() < 1e-4);
        assert!(translation.abs_diff_eq(hit.point, 1e-5));
    }
}

#[test]
fn test_offset_follows_aligned_up() {
    let rules = PlacementRules { offset: 0.5, ..aligned_rules() };
    let hit = SurfaceHit::new(Vec3::new(10.0, 0.0, 0.0), Vec3::X);
    let matrix = compose_transform(&rules, &hit, &mut rng());

    assert!(matrix.w_axis.truncate().abs_diff_eq(Vec3::new(10.5, 0.0, 0.0), 1e-5));
    assert!((rotation_of(&matrix) * Vec3::Y).abs_diff_eq(Vec3::X, 1e-5));
}

#[test]
fn test_degenerate_scale_range() {
    assert_eq!(random_uniform_scale(&mut rng(), 1.5, 1.5), Vec3::splat(1.5));
}

#[test]
fn test_remap() {
    assert_eq!(remap(5.0, 0.0, 10.0, 0.0, 1.0), 0.5);
    assert_eq!(remap(0.25, 0.0, 1.0, 10.0, 20.0), 12.5);
    assert_eq!(remap(3.0, 2.0, 2.0, 7.0, 9.0), 7.0);
}

// ============================================================================
// Brush points
// ============================================================================

#[test]
fn test_grid_points_cover_disc() {
    let stroke = BrushStroke::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y, 5.0);
    let points = stroke.grid_points();

    assert_eq!(points.len(), 80);
    assert!(points.iter().all(|p| p.distance(stroke.center) <= 5.0 + 1e-4));
    assert!(points.iter().all(|p| (p.y - 2.0).abs() < 1e-5));
}

#[test]
fn test_grid_points_follow_normal() {
    let mut stroke = BrushStroke::new(Vec3::ZERO, Vec3::Z, 3.0);
    stroke.disorder = 0.4;
    stroke.seed = 7;

    let points = stroke.grid_points();
    assert!(!points.is_empty());
    assert!(points.iter().all(|p| p.z.abs() < 1e-4));
    assert_eq!(points, stroke.grid_points());
}

#[test]
fn test_grid_points_fall_back_to_center() {
    let mut stroke = BrushStroke::new(Vec3::new(4.0, 0.0, 4.0), Vec3::Y, 2.0);
    stroke.density = 0.0;
    assert_eq!(stroke.grid_points(), vec![Vec3::new(4.0, 0.0, 4.0)]);
}

#[test]
fn test_sunflower_points_fill_area() {
    let stroke = BrushStroke::new(Vec3::ZERO, Vec3::Y, 5.0);
    let points = stroke.sunflower_points();

    assert_eq!(points.len(), 78);
    assert!(points.iter().all(|p| p.length() <= 5.0 + 1e-3));
    let on_rim = points.iter().filter(|p| (p.length() - 5.0).abs() < 1e-3).count();
    assert!(on_rim >= 18);
}

#[test]
fn test_sunflower_small_brush_is_center() {
    let stroke = BrushStroke::new(Vec3::ONE, Vec3::Y, 0.5);
    assert_eq!(stroke.sunflower_points(), vec![Vec3::ONE]);
}

// ============================================================================
// Painting
// ============================================================================

#[test]
fn test_paint_adds_one_instance_per_hit() {
    let mesh = Mesh::new(
        "fern",
        vec![SubMesh { index_count: 3, index_start: 0, base_vertex: 0 }],
        AABB::from_center_size(Vec3::ZERO, Vec3::ONE),
    )
    .unwrap();
    let fern = FoliageType::new("fern", Arc::new(mesh), vec![Arc::new(Material::new("fern", "lit"))]);
    let mut scene = SceneData::new(25.0).unwrap();

    let mut stroke = BrushStroke::for_type(Vec3::new(12.0, 0.0, 0.0), Vec3::Y, 2.0, &fern);
    stroke.disorder = 0.0;
    let hits: Vec<SurfaceHit> = stroke
        .grid_points()
        .into_iter()
        .map(|p| SurfaceHit::new(p, Vec3::Y))
        .collect();

    let touched = paint(&mut scene, &fern, &hits, &mut rng());
    assert_eq!(hits.len(), 12);
    assert_eq!(scene.instance_count(), 12);
    // The brush straddles the x = 12.5 boundary
    assert_eq!(touched.len(), 2);
    assert_eq!(scene.cell_count(), 2);
}
