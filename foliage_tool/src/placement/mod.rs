//! Placement module
//!
//! Brush-side helpers: candidate point generation over a brush disc and the
//! composition of instance transforms from a foliage type's placement rules.
//! The grid accepts any transform; nothing here is required to use it.

mod transform;
mod brush;

pub use transform::{compose_transform, placement_rotation, random_uniform_scale, remap, SurfaceHit};
pub use brush::{paint, BrushStroke};

#[cfg(test)]
#[path = "placement_tests.rs"]
mod tests;
