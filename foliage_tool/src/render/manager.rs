/// FoliageManager - mirrors a `SceneData` grid into GPU renderers and draws
/// the visible cells each frame.
///
/// The manager is derived state: the grid is the source of truth and every
/// cell renderer can be rebuilt from it at any time. It listens to grid
/// events once attached:
///
/// - created: build the cell's renderers
/// - updated: dispose and rebuild the cell's renderers
/// - deleted: dispose and drop the cell's renderers (no-op if absent)
///
/// Per frame, cells are culled by AABB against the camera frustum, then
/// optionally refined by the per-instance compute kernel, then drawn.

use std::sync::{Arc, Mutex};
use rdst::{RadixKey, RadixSort};
use rustc_hash::FxHashMap;
use crate::camera::Camera;
use crate::config::{CullingMode, FoliageConfig};
use crate::error::{Error, Result};
use crate::graphics_device::{CommandList, ComputeKernel, GraphicsDevice};
use crate::grid::{CellListener, ComponentData, ComponentId, ListenerId, SceneData, SharedCellListener};
use crate::render::{gpu_cull, ComponentRenderer};
use crate::resource::{FoliageType, FoliageTypeId};
use crate::{foliage_debug, foliage_err, foliage_info, foliage_trace, foliage_warn};

const SOURCE: &str = "foliage::Manager";

/// Per-frame input of `FoliageManager::tick`
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub camera: &'a Camera,
    pub frame_index: u64,
}

/// What one frame drew
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Cells whose AABB intersected the frustum
    pub visible_cells: usize,
    /// Cells skipped by the AABB test
    pub culled_cells: usize,
    pub draw_calls: usize,
    /// Per-instance cull dispatches
    pub dispatches: usize,
}

/// Sort key for front-to-back ordering
#[derive(Debug, Clone, Copy)]
struct DepthKey {
    /// Bit pattern of a non-negative distance, ordered like the float
    depth: u32,
    slot: u32,
}

impl RadixKey for DepthKey {
    const LEVELS: usize = 4;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        (self.depth >> (level * 8)) as u8
    }
}

pub struct FoliageManager {
    device: Box<dyn GraphicsDevice>,
    config: FoliageConfig,
    types: FxHashMap<FoliageTypeId, Arc<FoliageType>>,
    components: FxHashMap<ComponentId, ComponentRenderer>,
    cull_kernel: Option<Arc<dyn ComputeKernel>>,
    listener: Option<ListenerId>,
}

impl FoliageManager {
    /// Create a manager drawing through `device`.
    ///
    /// In `CullingMode::GpuInstances` the cull kernel is compiled here.
    ///
    /// # Errors
    ///
    /// Invalid configuration, or kernel creation failure.
    pub fn new(mut device: Box<dyn GraphicsDevice>, config: FoliageConfig) -> Result<Self> {
        config.validate()?;
        let cull_kernel = match config.culling_mode {
            CullingMode::CellBounds => None,
            CullingMode::GpuInstances => Some(
                device
                    .create_compute_kernel(gpu_cull::kernel_desc())
                    .map_err(|e| Error::InitializationFailed(format!("frustum cull kernel: {}", e)))?,
            ),
        };

        Ok(Self {
            device,
            config,
            types: FxHashMap::default(),
            components: FxHashMap::default(),
            cull_kernel,
            listener: None,
        })
    }

    // ===== GETTERS =====

    pub fn config(&self) -> &FoliageConfig {
        &self.config
    }

    pub fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    /// Number of cells with live renderers
    pub fn cell_count(&self) -> usize {
        self.components.len()
    }

    pub fn renderer(&self, id: &ComponentId) -> Option<&ComponentRenderer> {
        self.components.get(id)
    }

    pub fn renderers(&self) -> impl Iterator<Item = &ComponentRenderer> {
        self.components.values()
    }

    // ===== FOLIAGE TYPES =====

    /// Make a foliage type drawable. Cells referencing it are only drawn
    /// once they are (re)built after registration.
    ///
    /// # Errors
    ///
    /// Whatever `FoliageType::validate` rejects.
    pub fn register_type(&mut self, foliage_type: FoliageType) -> Result<Arc<FoliageType>> {
        foliage_type.validate()?;
        let foliage_type = Arc::new(foliage_type);
        if let Some(previous) = self.types.insert(foliage_type.id.clone(), Arc::clone(&foliage_type)) {
            foliage_debug!(SOURCE, "Replaced foliage type '{}' ({})", previous.name, previous.id);
        }
        Ok(foliage_type)
    }

    /// Forget a foliage type and dispose its renderers in every cell.
    pub fn unregister_type(&mut self, id: &FoliageTypeId) -> Option<Arc<FoliageType>> {
        let removed = self.types.remove(id)?;
        for component in self.components.values_mut() {
            component.remove_type(id);
        }
        Some(removed)
    }

    pub fn foliage_type(&self, id: &FoliageTypeId) -> Option<&Arc<FoliageType>> {
        self.types.get(id)
    }

    // ===== LIFECYCLE =====

    /// Build renderers for every existing cell and start listening to `scene`.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if the manager is already attached.
    pub fn attach(this: &Arc<Mutex<Self>>, scene: &mut SceneData) -> Result<ListenerId> {
        let mut manager = this
            .lock()
            .map_err(|_| foliage_err!(SOURCE, "manager lock poisoned"))?;
        if manager.listener.is_some() {
            return Err(Error::InvalidArgument("manager is already attached to a scene".to_string()));
        }

        manager.initialize(scene);
        let listener: SharedCellListener = this.clone();
        let id = scene.add_listener(listener);
        manager.listener = Some(id);

        foliage_info!(SOURCE, "Attached to scene with {} cells", scene.cell_count());
        Ok(id)
    }

    /// Stop listening to `scene` and dispose every renderer.
    /// Returns whether the manager was attached.
    pub fn detach(&mut self, scene: &mut SceneData) -> bool {
        let Some(id) = self.listener.take() else {
            return false;
        };
        scene.remove_listener(id);
        self.dispose_all();
        foliage_info!(SOURCE, "Detached from scene");
        true
    }

    /// Drop all renderers and rebuild one per cell of `scene`.
    pub fn initialize(&mut self, scene: &SceneData) {
        if scene.cell_size() != self.config.cell_size {
            foliage_warn!(
                SOURCE,
                "Scene cell size {} differs from configured {}",
                scene.cell_size(), self.config.cell_size
            );
        }

        self.dispose_all();
        for cell in scene.cells() {
            self.build(cell);
        }
        foliage_debug!(SOURCE, "Initialized {} cells", self.components.len());
    }

    /// Rebuild the renderers of one cell from the grid, or drop them if the
    /// grid no longer has that cell. Returns whether the cell is present.
    pub fn update_for(&mut self, scene: &SceneData, id: &ComponentId) -> bool {
        match scene.cell(id) {
            Some(cell) => {
                self.build(cell);
                true
            }
            None => {
                self.destroy(id);
                false
            }
        }
    }

    /// Dispose and drop the renderers of one cell. Absent ids are a no-op.
    pub fn destroy(&mut self, id: &ComponentId) -> bool {
        match self.components.remove(id) {
            Some(mut component) => {
                component.dispose();
                true
            }
            None => false,
        }
    }

    /// Dispose every cell's renderers.
    pub fn dispose_all(&mut self) {
        for component in self.components.values_mut() {
            component.dispose();
        }
        self.components.clear();
    }

    fn build(&mut self, cell: &ComponentData) {
        if let Some(mut previous) = self.components.remove(cell.id()) {
            previous.dispose();
        }

        let gpu_cull = self.cull_kernel.is_some();
        let component = ComponentRenderer::build(self.device.as_mut(), cell, &self.types, gpu_cull);
        self.components.insert(cell.id().clone(), component);
    }

    // ===== FRAME =====

    /// Per-frame entry point.
    pub fn tick(&mut self, frame: &FrameContext<'_>, cmd: &mut dyn CommandList) -> Result<FrameStats> {
        let stats = self.render_visible(frame.camera, cmd)?;
        if self.config.debug {
            foliage_debug!(SOURCE, "Frame {}: {:?}", frame.frame_index, stats);
        } else {
            foliage_trace!(SOURCE, "Frame {}: {:?}", frame.frame_index, stats);
        }
        Ok(stats)
    }

    /// Draw every cell whose AABB intersects the camera frustum.
    ///
    /// Cells outside the frustum issue no command at all. In
    /// `CullingMode::GpuInstances` the surviving cells are refined per
    /// instance before drawing.
    pub fn render_visible(&mut self, camera: &Camera, cmd: &mut dyn CommandList) -> Result<FrameStats> {
        let frustum = camera.frustum();
        let eye = camera.position();
        let distance_culling = self.config.distance_culling;
        let mut stats = FrameStats::default();

        let mut visible: Vec<(f32, &mut ComponentRenderer)> = Vec::new();
        for component in self.components.values_mut() {
            if frustum.intersects_aabb(&component.bounds()) {
                let distance = eye.distance(component.bounds().center());
                visible.push((distance, component));
            } else {
                stats.culled_cells += 1;
            }
        }
        stats.visible_cells = visible.len();

        let mut order: Vec<DepthKey> = visible
            .iter()
            .enumerate()
            .map(|(slot, (distance, _))| DepthKey { depth: distance.to_bits(), slot: slot as u32 })
            .collect();
        if self.config.sort_front_to_back {
            order.radix_sort_unstable();
        }

        for key in order {
            let (distance, component) = &mut visible[key.slot as usize];
            if let Some(kernel) = &self.cull_kernel {
                stats.dispatches += component.cull(cmd, kernel, frustum, *distance, distance_culling)?;
            }
            stats.draw_calls += component.draw(cmd, *distance, distance_culling)?;
        }

        Ok(stats)
    }
}

impl CellListener for FoliageManager {
    fn on_cell_created(&mut self, cell: &ComponentData) {
        self.build(cell);
    }

    fn on_cell_updated(&mut self, cell: &ComponentData) {
        // A cell the manager never saw is built as well; the grid wins.
        self.build(cell);
    }

    fn on_cell_deleted(&mut self, id: &ComponentId) {
        self.destroy(id);
    }
}

impl Drop for FoliageManager {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
