/// SceneData - the spatial grid of foliage cells.
///
/// Source of truth for every painted instance. The world is partitioned into
/// cubic cells of `cell_size`; a cell exists only while it stores at least
/// one transform. Every mutation notifies the registered listeners
/// synchronously, in registration order, after the mutation completes.

use std::fmt;
use std::sync::{Arc, Mutex};
use glam::{IVec3, Mat4, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::config::{validate_cell_size, FoliageConfig};
use crate::error::{Error, Result};
use crate::resource::FoliageTypeId;
use crate::{foliage_debug, foliage_trace, foliage_warn};
use super::component_data::{ComponentData, ComponentId};

const SOURCE: &str = "foliage::SceneData";

// ===== LISTENERS =====

/// Receives cell lifecycle notifications from a `SceneData`.
///
/// Called synchronously from inside the mutating call. A listener must not
/// mutate the grid that is notifying it.
pub trait CellListener: Send {
    fn on_cell_created(&mut self, cell: &ComponentData);
    fn on_cell_updated(&mut self, cell: &ComponentData);
    fn on_cell_deleted(&mut self, id: &ComponentId);
}

/// Shared handle to a registered listener
pub type SharedCellListener = Arc<Mutex<dyn CellListener>>;

/// Registration handle returned by `SceneData::add_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone, Copy)]
enum CellEvent<'a> {
    Created(&'a ComponentData),
    Updated(&'a ComponentData),
    Deleted(&'a ComponentId),
}

// ===== PERSISTENCE =====

/// Serializable shape of a grid: cell size and cells, nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub cell_size: f32,
    pub cells: Vec<ComponentData>,
}

// ===== SCENE DATA =====

pub struct SceneData {
    cell_size: f32,
    /// Cells in creation order (removal swaps the last cell into the hole)
    cells: Vec<ComponentData>,
    /// Grid coordinate -> index into `cells`
    index: FxHashMap<IVec3, usize>,
    /// Cell id -> index into `cells`
    ids: FxHashMap<ComponentId, usize>,
    listeners: Vec<(ListenerId, SharedCellListener)>,
    next_listener_id: u64,
}

impl fmt::Debug for SceneData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneData")
            .field("cell_size", &self.cell_size)
            .field("cells", &self.cells.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SceneData {
    /// Create an empty grid.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if `cell_size` is not a positive finite number.
    pub fn new(cell_size: f32) -> Result<Self> {
        validate_cell_size(cell_size)?;
        Ok(Self {
            cell_size,
            cells: Vec::new(),
            index: FxHashMap::default(),
            ids: FxHashMap::default(),
            listeners: Vec::new(),
            next_listener_id: 0,
        })
    }

    /// Create an empty grid sized by `config.cell_size`.
    pub fn from_config(config: &FoliageConfig) -> Result<Self> {
        Self::new(config.cell_size)
    }

    // ===== GETTERS =====

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cells(&self) -> &[ComponentData] {
        &self.cells
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total transforms stored across all cells
    pub fn instance_count(&self) -> usize {
        self.cells.iter().map(ComponentData::instance_count).sum()
    }

    /// Cell by id
    pub fn cell(&self, id: &ComponentId) -> Option<&ComponentData> {
        self.position_of(id).map(|i| &self.cells[i])
    }

    // ===== COORDINATES =====

    /// Grid coordinate of the cell containing `position`: round(position / cell_size).
    pub fn world_to_grid(&self, position: Vec3) -> IVec3 {
        (position / self.cell_size).round().as_ivec3()
    }

    /// World-space center of the cell at `coordinate`
    pub fn grid_to_world_center(&self, coordinate: IVec3) -> Vec3 {
        coordinate.as_vec3() * self.cell_size
    }

    // ===== LOOKUP =====

    /// Cell containing `position`, if one exists.
    pub fn find_cell_at(&self, position: Vec3) -> Option<&ComponentData> {
        let coordinate = self.world_to_grid(position);
        self.index.get(&coordinate).map(|&i| &self.cells[i])
    }

    /// Every cell whose grid coordinate is within `range` of the cell
    /// containing `position` along each axis.
    pub fn find_cells_near(&self, position: Vec3, range: u32) -> Vec<&ComponentData> {
        self.coordinates_near(position, range)
            .into_iter()
            .filter_map(|c| self.index.get(&c).map(|&i| &self.cells[i]))
            .collect()
    }

    fn coordinates_near(&self, position: Vec3, range: u32) -> Vec<IVec3> {
        let center = self.world_to_grid(position);
        let range = i32::try_from(range).unwrap_or(i32::MAX);
        let span = 2 * range as u64 + 1;
        let volume = span.checked_mul(span).and_then(|area| area.checked_mul(span));

        // Probe the index when the neighborhood is smaller than the grid
        if volume.is_some_and(|volume| volume <= self.cells.len() as u64) {
            let mut found = Vec::new();
            for x in -range..=range {
                for y in -range..=range {
                    for z in -range..=range {
                        let coordinate = center.saturating_add(IVec3::new(x, y, z));
                        if self.index.contains_key(&coordinate) {
                            found.push(coordinate);
                        }
                    }
                }
            }
            found
        } else {
            self.cells
                .iter()
                .map(|c| c.grid_coordinate)
                .filter(|c| grid_distance(*c, center) <= i64::from(range))
                .collect()
        }
    }

    fn position_of(&self, id: &ComponentId) -> Option<usize> {
        self.ids.get(id).copied()
    }

    // ===== CELL LIFECYCLE =====

    /// Create the cell containing `position`, or return the existing one.
    ///
    /// Emits `on_cell_created` only when a cell is actually created.
    pub fn create_cell_at(&mut self, position: Vec3) -> &ComponentData {
        let index = self.resolve_or_create(position);
        &self.cells[index]
    }

    fn resolve_or_create(&mut self, position: Vec3) -> usize {
        let coordinate = self.world_to_grid(position);
        if let Some(&index) = self.index.get(&coordinate) {
            return index;
        }

        let cell = ComponentData::new(coordinate, self.cell_size);
        foliage_debug!(SOURCE, "Created cell {} at {}", cell.id, coordinate);
        let index = self.cells.len();
        self.cells.push(cell);
        self.index.insert(coordinate, index);
        self.ids.insert(self.cells[index].id.clone(), index);
        self.emit(CellEvent::Created(&self.cells[index]));
        index
    }

    fn remove_cell_at(&mut self, index: usize) -> ComponentData {
        let cell = self.cells.swap_remove(index);
        self.index.remove(&cell.grid_coordinate);
        self.ids.remove(&cell.id);
        if let Some(moved) = self.cells.get(index) {
            self.index.insert(moved.grid_coordinate, index);
            self.ids.insert(moved.id.clone(), index);
        }
        cell
    }

    /// Prune empty type lists of the cell at `index`; delete the cell if
    /// nothing is left, otherwise report it updated.
    fn clean_at(&mut self, index: usize) {
        if self.cells[index].prune() {
            let cell = self.remove_cell_at(index);
            foliage_debug!(SOURCE, "Deleted cell {} at {}", cell.id, cell.grid_coordinate);
            self.emit(CellEvent::Deleted(&cell.id));
        } else {
            self.emit(CellEvent::Updated(&self.cells[index]));
        }
    }

    /// Clean one cell. Returns false if no cell has this id.
    pub fn clean(&mut self, id: &ComponentId) -> bool {
        match self.position_of(id) {
            Some(index) => {
                self.clean_at(index);
                true
            }
            None => false,
        }
    }

    /// Clean every cell.
    pub fn clean_all(&mut self) {
        let ids: Vec<ComponentId> = self.cells.iter().map(|c| c.id.clone()).collect();
        for id in &ids {
            self.clean(id);
        }
    }

    /// Remove every cell, emitting `on_cell_deleted` for each.
    pub fn clear(&mut self) {
        let cells = std::mem::take(&mut self.cells);
        self.index.clear();
        self.ids.clear();
        for cell in &cells {
            self.emit(CellEvent::Deleted(&cell.id));
        }
        foliage_debug!(SOURCE, "Cleared {} cells", cells.len());
    }

    // ===== MUTATION =====

    /// Append `transform` to the cell containing its translation, creating
    /// the cell and the type list as needed.
    ///
    /// With `notify == false` no `on_cell_updated` is sent; follow a batch
    /// with `notify_updated`. Returns the id of the owning cell.
    pub fn add_instance(&mut self, foliage_type: &FoliageTypeId, transform: Mat4, notify: bool) -> ComponentId {
        let index = self.resolve_or_create(transform.w_axis.truncate());
        let cell = &mut self.cells[index];
        cell.foliage_entry(foliage_type).matrices.push(transform);
        let id = cell.id.clone();

        if notify {
            self.emit(CellEvent::Updated(&self.cells[index]));
        }
        id
    }

    /// Add many transforms, then send one `on_cell_updated` per touched cell.
    ///
    /// Returns the touched cells in the order they were first touched.
    pub fn add_instances(&mut self, foliage_type: &FoliageTypeId, transforms: &[Mat4]) -> Vec<ComponentId> {
        let mut seen = FxHashSet::default();
        let mut touched = Vec::new();
        for transform in transforms {
            let id = self.add_instance(foliage_type, *transform, false);
            if seen.insert(id.clone()) {
                touched.push(id);
            }
        }
        for id in &touched {
            self.notify_updated(id);
        }
        foliage_trace!(SOURCE, "Added {} instances across {} cells", transforms.len(), touched.len());
        touched
    }

    /// Send `on_cell_updated` for a cell. Returns false if no cell has this id.
    pub fn notify_updated(&mut self, id: &ComponentId) -> bool {
        match self.position_of(id) {
            Some(index) => {
                self.emit(CellEvent::Updated(&self.cells[index]));
                true
            }
            None => false,
        }
    }

    /// Remove every `foliage_type` instance strictly closer than `radius`
    /// to `center`.
    ///
    /// Searches `max(1, ceil(radius / cell_size))` cells around `center`.
    /// Only cells that lost instances are cleaned and notified. Returns the
    /// number of removed instances.
    pub fn remove_in_radius(&mut self, center: Vec3, radius: f32, foliage_type: &FoliageTypeId) -> usize {
        if !(radius > 0.0) {
            return 0;
        }

        let range = ((radius / self.cell_size).ceil() as u32).max(1);
        let mut removed_total = 0;

        for coordinate in self.coordinates_near(center, range) {
            let Some(&index) = self.index.get(&coordinate) else { continue };
            let Some(foliage) = self.cells[index].foliage_for_mut(foliage_type) else { continue };

            let before = foliage.matrices.len();
            foliage
                .matrices
                .retain(|m| m.w_axis.truncate().distance(center) >= radius);
            let removed = before - foliage.matrices.len();

            if removed > 0 {
                removed_total += removed;
                self.clean_at(index);
            }
        }

        removed_total
    }

    /// Drop the whole `foliage_type` list of one cell, then clean it.
    /// Returns false if the cell or the type list does not exist.
    pub fn remove_all_of_type(&mut self, id: &ComponentId, foliage_type: &FoliageTypeId) -> bool {
        let Some(index) = self.position_of(id) else { return false };
        if !self.cells[index].remove_foliage(foliage_type) {
            return false;
        }
        self.clean_at(index);
        true
    }

    /// Drop `foliage_type` from every cell. Returns the number of cells changed.
    pub fn remove_type_everywhere(&mut self, foliage_type: &FoliageTypeId) -> usize {
        let ids: Vec<ComponentId> = self
            .cells
            .iter()
            .filter(|c| c.foliage_for(foliage_type).is_some())
            .map(|c| c.id.clone())
            .collect();

        for id in &ids {
            self.remove_all_of_type(id, foliage_type);
        }
        ids.len()
    }

    // ===== LISTENERS =====

    /// Register a listener. Notifications are delivered in registration order.
    pub fn add_listener(&mut self, listener: SharedCellListener) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn emit(&self, event: CellEvent<'_>) {
        for (id, listener) in &self.listeners {
            let Ok(mut listener) = listener.lock() else {
                foliage_warn!(SOURCE, "Listener {:?} is poisoned, skipping notification", id);
                continue;
            };
            match event {
                CellEvent::Created(cell) => listener.on_cell_created(cell),
                CellEvent::Updated(cell) => listener.on_cell_updated(cell),
                CellEvent::Deleted(cell_id) => listener.on_cell_deleted(cell_id),
            }
        }
    }

    // ===== PERSISTENCE =====

    /// Snapshot of the persisted state
    pub fn to_document(&self) -> SceneDocument {
        SceneDocument {
            cell_size: self.cell_size,
            cells: self.cells.clone(),
        }
    }

    /// Rebuild a grid (without listeners) from a persisted document.
    ///
    /// Empty type lists and empty cells are dropped on load.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` for a bad cell size, a cell whose size differs
    /// from the grid's, or two cells sharing a coordinate or an id.
    pub fn from_document(document: SceneDocument) -> Result<Self> {
        let mut scene = Self::new(document.cell_size)?;

        for mut cell in document.cells {
            if cell.size != scene.cell_size {
                return Err(Error::InvalidArgument(format!(
                    "cell {} has size {} but the grid cell size is {}",
                    cell.id, cell.size, scene.cell_size
                )));
            }
            if cell.prune() {
                foliage_debug!(SOURCE, "Dropped empty cell {} on load", cell.id);
                continue;
            }
            if scene.index.contains_key(&cell.grid_coordinate) {
                return Err(Error::InvalidArgument(format!(
                    "two cells share grid coordinate {}", cell.grid_coordinate
                )));
            }
            if scene.ids.contains_key(&cell.id) {
                return Err(Error::InvalidArgument(format!("duplicate cell id {}", cell.id)));
            }
            scene.index.insert(cell.grid_coordinate, scene.cells.len());
            scene.ids.insert(cell.id.clone(), scene.cells.len());
            scene.cells.push(cell);
        }

        Ok(scene)
    }

    /// Serialize the grid as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Load a grid from JSON produced by `to_json`.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: SceneDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }
}

/// Largest per-axis distance between two grid coordinates, without overflow
fn grid_distance(a: IVec3, b: IVec3) -> i64 {
    let dx = (i64::from(a.x) - i64::from(b.x)).abs();
    let dy = (i64::from(a.y) - i64::from(b.y)).abs();
    let dz = (i64::from(a.z) - i64::from(b.z)).abs();
    dx.max(dy).max(dz)
}

#[cfg(test)]
#[path = "scene_data_tests.rs"]
mod tests;
