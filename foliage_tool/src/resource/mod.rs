//! Resource module
//!
//! Meshes, materials and foliage types. Pure data: GPU objects are created by
//! the render layer from these descriptions.

pub mod mesh;
pub mod foliage_type;

pub use mesh::{Mesh, SubMesh, Material};
pub use foliage_type::{
    FoliageType, FoliageTypeId, PlacementRules, RenderFlags,
    DEFAULT_CULLING_DISTANCE,
};
pub(crate) use foliage_type::generate_guid;

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
