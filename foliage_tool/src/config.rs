/// Foliage tool configuration
///
/// A single `FoliageConfig` is shared by the grid and the manager. The cell
/// size lives here and is propagated to every cell, never repeated as a
/// literal elsewhere.

use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

/// Default edge length of a grid cell, in world units
pub const DEFAULT_CELL_SIZE: f32 = 25.0;

/// How the manager culls foliage each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CullingMode {
    /// Cell AABB against the camera frustum only
    #[default]
    CellBounds,
    /// Cell AABB first, then a per-instance compute pass on surviving cells
    GpuInstances,
}

/// Foliage tool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoliageConfig {
    /// Edge length of every grid cell
    pub cell_size: f32,
    /// Culling strategy used by the manager
    pub culling_mode: CullingMode,
    /// Skip a foliage type in cells farther than its culling distance
    pub distance_culling: bool,
    /// Draw visible cells nearest-first
    pub sort_front_to_back: bool,
    /// Log per-frame statistics at DEBUG
    pub debug: bool,
}

impl Default for FoliageConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            culling_mode: CullingMode::CellBounds,
            distance_culling: true,
            sort_front_to_back: true,
            debug: false,
        }
    }
}

impl FoliageConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` on malformed JSON and
    /// `Error::InvalidArgument` if the parsed values fail validation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FoliageConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can drive a grid.
    pub fn validate(&self) -> Result<()> {
        validate_cell_size(self.cell_size)
    }
}

/// Reject non-finite or non-positive cell sizes.
pub(crate) fn validate_cell_size(cell_size: f32) -> Result<()> {
    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "cell size must be a positive finite number, got {}",
            cell_size
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
