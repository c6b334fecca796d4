/// ComponentData - one cubic cell of the foliage grid.
///
/// A cell owns one transform list per foliage type painted inside it. Cells
/// are only mutated through `SceneData`, which keeps the coordinate index and
/// the listeners in sync.

use std::fmt;
use glam::{IVec3, Mat4, Vec3};
use serde::{Deserialize, Serialize};
use crate::camera::AABB;
use crate::error::{Error, Result};
use crate::resource::{generate_guid, FoliageTypeId};

/// Stable identity of a cell, generated once and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    pub fn generate() -> Self {
        Self(generate_guid())
    }

    /// Wrap an identifier read from persisted data.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` for an empty identifier.
    pub fn parse(value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(Error::InvalidArgument("empty cell identifier".to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every placed transform of one foliage type inside one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoliageData {
    pub foliage_type: FoliageTypeId,
    pub matrices: Vec<Mat4>,
}

impl FoliageData {
    pub fn new(foliage_type: FoliageTypeId) -> Self {
        Self { foliage_type, matrices: Vec::new() }
    }

    /// World position of instance `index`
    pub fn instance_position(&self, index: usize) -> Option<Vec3> {
        self.matrices.get(index).map(|m| m.w_axis.truncate())
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }
}

/// A fixed-size cubic region of the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentData {
    pub(crate) id: ComponentId,
    pub(crate) grid_coordinate: IVec3,
    pub(crate) size: f32,
    pub(crate) foliage: Vec<FoliageData>,
}

impl ComponentData {
    pub(crate) fn new(grid_coordinate: IVec3, size: f32) -> Self {
        Self {
            id: ComponentId::generate(),
            grid_coordinate,
            size,
            foliage: Vec::new(),
        }
    }

    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    pub fn grid_coordinate(&self) -> IVec3 {
        self.grid_coordinate
    }

    /// Edge length of the cell
    pub fn size(&self) -> f32 {
        self.size
    }

    /// World-space center: grid coordinate times cell size
    pub fn world_center(&self) -> Vec3 {
        self.grid_coordinate.as_vec3() * self.size
    }

    /// World-space cubic bounds centered on `world_center()`
    pub fn bounds(&self) -> AABB {
        AABB::from_center_size(self.world_center(), Vec3::splat(self.size))
    }

    /// Per-type transform lists, in the order types were first painted
    pub fn foliage(&self) -> &[FoliageData] {
        &self.foliage
    }

    /// Transform list for `foliage_type`, if any was painted here
    pub fn foliage_for(&self, foliage_type: &FoliageTypeId) -> Option<&FoliageData> {
        self.foliage.iter().find(|f| &f.foliage_type == foliage_type)
    }

    pub(crate) fn foliage_for_mut(&mut self, foliage_type: &FoliageTypeId) -> Option<&mut FoliageData> {
        self.foliage.iter_mut().find(|f| &f.foliage_type == foliage_type)
    }

    /// Resolve or create the transform list for `foliage_type`.
    pub(crate) fn foliage_entry(&mut self, foliage_type: &FoliageTypeId) -> &mut FoliageData {
        let index = match self.foliage.iter().position(|f| &f.foliage_type == foliage_type) {
            Some(index) => index,
            None => {
                self.foliage.push(FoliageData::new(foliage_type.clone()));
                self.foliage.len() - 1
            }
        };
        &mut self.foliage[index]
    }

    /// Drop the transform list for `foliage_type`. Returns whether one existed.
    pub(crate) fn remove_foliage(&mut self, foliage_type: &FoliageTypeId) -> bool {
        let before = self.foliage.len();
        self.foliage.retain(|f| &f.foliage_type != foliage_type);
        self.foliage.len() != before
    }

    /// Drop empty transform lists. Returns whether the cell is now empty.
    pub(crate) fn prune(&mut self) -> bool {
        self.foliage.retain(|f| !f.is_empty());
        self.foliage.is_empty()
    }

    /// Total transforms across all types
    pub fn instance_count(&self) -> usize {
        self.foliage.iter().map(FoliageData::len).sum()
    }

    /// True when no transform is stored
    pub fn is_empty(&self) -> bool {
        self.instance_count() == 0
    }
}
