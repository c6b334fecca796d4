/// Brush point generation and painting.
///
/// A stroke covers a disc of `radius` around `center`, oriented by the
/// surface `normal`. The generated points are candidate positions; the host
/// projects them onto its surfaces and hands the hits to `paint`.

use std::f32::consts::PI;
use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::grid::{ComponentId, SceneData};
use crate::placement::{compose_transform, SurfaceHit};
use crate::resource::FoliageType;

/// One brush stamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushStroke {
    pub center: Vec3,
    pub normal: Vec3,
    pub radius: f32,
    /// Points per square unit for `sunflower_points`, per unit length for
    /// `grid_points`
    pub density: f32,
    pub disorder: f32,
    /// Seed of the jitter, so a stroke replays identically
    pub seed: u64,
}

impl BrushStroke {
    pub fn new(center: Vec3, normal: Vec3, radius: f32) -> Self {
        Self {
            center,
            normal,
            radius,
            density: 1.0,
            disorder: 0.0,
            seed: 0,
        }
    }

    /// Stroke with the density and disorder of a foliage type.
    pub fn for_type(center: Vec3, normal: Vec3, radius: f32, foliage_type: &FoliageType) -> Self {
        Self {
            density: foliage_type.density,
            disorder: foliage_type.disorder,
            ..Self::new(center, normal, radius)
        }
    }

    pub fn area(&self) -> f32 {
        PI * self.radius * self.radius
    }

    fn orientation(&self) -> Quat {
        Quat::from_rotation_arc(Vec3::Y, self.normal.normalize_or(Vec3::Y))
    }

    fn jitter(rng: &mut StdRng, amplitude: f32) -> f32 {
        if amplitude > 0.0 {
            rng.gen_range(-amplitude..=amplitude)
        } else {
            0.0
        }
    }

    /// Jittered grid clipped to the brush disc.
    ///
    /// The disc's bounding square gets `ceil(2r * density)` points per side;
    /// each point moves by up to `disorder` spacings on both axes and points
    /// that leave the disc are dropped. Never empty: falls back to the
    /// center.
    pub fn grid_points(&self) -> Vec<Vec3> {
        let width = 2.0 * self.radius;
        let per_side = (width * self.density).ceil();
        if !(per_side >= 1.0) || !per_side.is_finite() {
            return vec![self.center];
        }
        let per_side = per_side as u32;
        let spacing = width / per_side as f32;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let rotation = self.orientation();
        let mut points = Vec::new();
        for i in 0..per_side {
            for j in 0..per_side {
                let x = (i as f32 + 0.5) * spacing - self.radius + Self::jitter(&mut rng, self.disorder * spacing);
                let z = (j as f32 + 0.5) * spacing - self.radius + Self::jitter(&mut rng, self.disorder * spacing);
                if x * x + z * z > self.radius * self.radius {
                    continue;
                }
                points.push(self.center + rotation * Vec3::new(x, 0.0, z));
            }
        }

        if points.is_empty() {
            points.push(self.center);
        }
        points
    }

    /// Golden-angle spiral over the disc with `floor(area * density)` points.
    ///
    /// The outer `round(2 * sqrt(n))` points sit on the rim. Jitter is
    /// `disorder` times the radius. One point or fewer collapses to the
    /// center.
    pub fn sunflower_points(&self) -> Vec<Vec3> {
        let count = (self.area() * self.density).floor();
        if !(count > 1.0) || !count.is_finite() {
            return vec![self.center];
        }
        let count = count as u32;

        let boundary = (2.0 * (count as f32).sqrt()).round() as u32;
        let phi = (5.0_f32.sqrt() + 1.0) / 2.0;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let rotation = self.orientation();

        (1..=count)
            .map(|k| {
                let r = if k > count.saturating_sub(boundary) {
                    1.0
                } else {
                    (k as f32 - 0.5).sqrt() / (count as f32 - (boundary as f32 + 0.5)).sqrt()
                };
                let theta = 2.0 * PI * k as f32 / (phi * phi);
                let jx = Self::jitter(&mut rng, self.disorder);
                let jz = Self::jitter(&mut rng, self.disorder);
                let local = Vec3::new(r * theta.cos() + jx, 0.0, r * theta.sin() + jz) * self.radius;
                self.center + rotation * local
            })
            .collect()
    }
}

/// Compose one transform per hit and add them to the grid as one batch.
///
/// Returns the ids of the touched cells, each notified once.
pub fn paint<R: Rng + ?Sized>(
    grid: &mut SceneData,
    foliage_type: &FoliageType,
    hits: &[SurfaceHit],
    rng: &mut R,
) -> Vec<ComponentId> {
    let transforms: Vec<_> = hits
        .iter()
        .map(|hit| compose_transform(&foliage_type.placement, hit, rng))
        .collect();
    grid.add_instances(&foliage_type.id, &transforms)
}
