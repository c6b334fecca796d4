//! Foliage types: what can be painted and how it is placed and drawn.

use std::fmt;
use std::sync::Arc;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::resource::{Material, Mesh};

/// Default distance beyond which a type is not drawn
pub const DEFAULT_CULLING_DISTANCE: f32 = 150.0;

/// 32 lowercase hex characters from 128 random bits.
pub(crate) fn generate_guid() -> String {
    format!("{:032x}", rand::random::<u128>())
}

fn is_guid(value: &str) -> bool {
    value.len() == 32 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

// ===== IDENTITY =====

/// Stable identity of a foliage type, carried in persisted scene data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoliageTypeId(String);

impl FoliageTypeId {
    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(generate_guid())
    }

    /// Parse an identifier loaded from persisted data.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` unless `value` is 32 hex characters.
    pub fn parse(value: &str) -> Result<Self> {
        if !is_guid(value) {
            return Err(Error::InvalidArgument(format!(
                "'{}' is not a 32-character hex identifier", value
            )));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FoliageTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ===== RENDERING =====

bitflags! {
    /// Shadow participation of a foliage type
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u32 {
        const CAST_SHADOWS = 1 << 0;
        const RECEIVE_SHADOWS = 1 << 1;
    }
}

impl Default for RenderFlags {
    fn default() -> Self {
        RenderFlags::CAST_SHADOWS | RenderFlags::RECEIVE_SHADOWS
    }
}

// ===== PLACEMENT =====

/// How a painted instance is oriented, scaled and offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementRules {
    /// Rotate local up onto the surface normal
    pub align_to_normal: bool,
    /// Random yaw around local up
    pub random_rotation: bool,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Displacement along local up, after rotation
    pub offset: f32,
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self {
            align_to_normal: false,
            random_rotation: true,
            min_scale: 0.75,
            max_scale: 1.0,
            offset: 0.0,
        }
    }
}

// ===== FOLIAGE TYPE =====

/// A paintable kind of object.
///
/// Referenced by the grid through its id only; the manager resolves ids to
/// types when it builds renderers.
#[derive(Debug, Clone)]
pub struct FoliageType {
    pub id: FoliageTypeId,
    pub name: String,
    pub mesh: Arc<Mesh>,
    /// One material per submesh, in submesh order
    pub materials: Vec<Arc<Material>>,
    pub flags: RenderFlags,
    /// Layers the brush may paint on
    pub layer_mask: u32,
    pub placement: PlacementRules,
    /// Instances per square unit of brush area
    pub density: f32,
    /// Positional jitter, as a fraction of the point spacing
    pub disorder: f32,
    pub culling_distance: f32,
}

impl FoliageType {
    /// New type with a fresh id and default placement and rendering rules.
    pub fn new(name: impl Into<String>, mesh: Arc<Mesh>, materials: Vec<Arc<Material>>) -> Self {
        Self {
            id: FoliageTypeId::generate(),
            name: name.into(),
            mesh,
            materials,
            flags: RenderFlags::default(),
            layer_mask: u32::MAX,
            placement: PlacementRules::default(),
            density: 1.0,
            disorder: 1.0,
            culling_distance: DEFAULT_CULLING_DISTANCE,
        }
    }

    pub fn with_id(mut self, id: FoliageTypeId) -> Self {
        self.id = id;
        self
    }

    /// Check that the type can be placed and rendered.
    ///
    /// # Errors
    ///
    /// `Error::InvalidResource` when materials do not match submeshes,
    /// `Error::InvalidArgument` for inconsistent numeric settings.
    pub fn validate(&self) -> Result<()> {
        if self.materials.len() != self.mesh.submesh_count() {
            return Err(Error::InvalidResource(format!(
                "foliage type '{}' has {} materials for {} submeshes",
                self.name, self.materials.len(), self.mesh.submesh_count()
            )));
        }
        let rules = &self.placement;
        if !(rules.min_scale >= 0.0 && rules.min_scale <= rules.max_scale) {
            return Err(Error::InvalidArgument(format!(
                "foliage type '{}' scale range [{}, {}] is invalid",
                self.name, rules.min_scale, rules.max_scale
            )));
        }
        if !(self.density >= 0.0) || !(self.disorder >= 0.0) {
            return Err(Error::InvalidArgument(format!(
                "foliage type '{}' density and disorder must be non-negative", self.name
            )));
        }
        if !(self.culling_distance > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "foliage type '{}' culling distance must be positive", self.name
            )));
        }
        Ok(())
    }

    pub fn casts_shadows(&self) -> bool {
        self.flags.contains(RenderFlags::CAST_SHADOWS)
    }

    pub fn receives_shadows(&self) -> bool {
        self.flags.contains(RenderFlags::RECEIVE_SHADOWS)
    }
}
