/// Instance transform composition from placement rules.

use std::f32::consts::TAU;
use glam::{Mat4, Quat, Vec3};
use rand::Rng;
use crate::resource::PlacementRules;

/// A point on a paintable surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub point: Vec3,
    /// Unit surface normal at `point`
    pub normal: Vec3,
}

impl SurfaceHit {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal: normal.normalize_or(Vec3::Y) }
    }
}

/// Linearly map `value` from `[from_min, from_max]` to `[to_min, to_max]`.
///
/// Values outside the source range extrapolate. A degenerate source range
/// maps everything to `to_min`.
pub fn remap(value: f32, from_min: f32, from_max: f32, to_min: f32, to_max: f32) -> f32 {
    let span = from_max - from_min;
    if span == 0.0 {
        return to_min;
    }
    (value - from_min) / span * (to_max - to_min) + to_min
}

/// Same random factor on all three axes, in `[minimum, maximum]`.
pub fn random_uniform_scale<R: Rng + ?Sized>(rng: &mut R, minimum: f32, maximum: f32) -> Vec3 {
    let factor = if minimum < maximum {
        rng.gen_range(minimum..=maximum)
    } else {
        minimum
    };
    Vec3::splat(factor)
}

/// Rotation applied to an instance placed on a surface with `normal`.
///
/// Identity, then aligned so local up follows the normal, then turned by a
/// random yaw about local up.
pub fn placement_rotation<R: Rng + ?Sized>(rules: &PlacementRules, normal: Vec3, rng: &mut R) -> Quat {
    let mut rotation = Quat::IDENTITY;
    if rules.align_to_normal {
        rotation = Quat::from_rotation_arc(Vec3::Y, normal.normalize_or(Vec3::Y));
    }
    if rules.random_rotation {
        rotation *= Quat::from_rotation_y(rng.gen_range(0.0..TAU));
    }
    rotation
}

/// Full instance transform for one surface hit.
///
/// The instance sits at the hit point, lifted by `rules.offset` along its own
/// up axis.
pub fn compose_transform<R: Rng + ?Sized>(rules: &PlacementRules, hit: &SurfaceHit, rng: &mut R) -> Mat4 {
    let scale = random_uniform_scale(rng, rules.min_scale, rules.max_scale);
    let rotation = placement_rotation(rules, hit.normal, rng);
    let position = hit.point + rotation * Vec3::Y * rules.offset;
    Mat4::from_scale_rotation_translation(scale, rotation, position)
}
