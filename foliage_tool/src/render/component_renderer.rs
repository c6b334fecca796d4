/// ComponentRenderer - the renderers of one grid cell, one per foliage type.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::camera::{Frustum, AABB};
use crate::error::Result;
use crate::graphics_device::{CommandList, ComputeKernel, GraphicsDevice};
use crate::grid::{ComponentData, ComponentId};
use crate::render::InstanceRenderer;
use crate::resource::{FoliageType, FoliageTypeId};
use crate::{foliage_error, foliage_trace, foliage_warn};

const SOURCE: &str = "foliage::ComponentRenderer";

pub struct ComponentRenderer {
    id: ComponentId,
    bounds: AABB,
    renderers: Vec<InstanceRenderer>,
}

impl ComponentRenderer {
    /// Build one `InstanceRenderer` per foliage type stored in `cell`.
    ///
    /// Types missing from `types` and types whose renderer fails to build are
    /// logged and skipped so one bad type never hides the rest of the cell.
    pub fn build(
        device: &mut dyn GraphicsDevice,
        cell: &ComponentData,
        types: &FxHashMap<FoliageTypeId, Arc<FoliageType>>,
        gpu_cull: bool,
    ) -> Self {
        let bounds = cell.bounds();
        let mut renderers = Vec::with_capacity(cell.foliage().len());

        for data in cell.foliage() {
            if data.is_empty() {
                continue;
            }
            let Some(foliage_type) = types.get(&data.foliage_type) else {
                foliage_warn!(SOURCE, "Cell {} references unknown foliage type {}", cell.id(), data.foliage_type);
                continue;
            };
            match InstanceRenderer::new(device, Arc::clone(foliage_type), &data.matrices, bounds, gpu_cull) {
                Ok(renderer) => {
                    foliage_trace!(SOURCE, "Built '{}' x{} for cell {}", foliage_type.name, data.len(), cell.id());
                    renderers.push(renderer);
                }
                Err(error) => {
                    foliage_error!(SOURCE, "Failed to build '{}' for cell {}: {}", foliage_type.name, cell.id(), error);
                }
            }
        }

        Self {
            id: cell.id().clone(),
            bounds,
            renderers,
        }
    }

    // ===== GETTERS =====

    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    pub fn renderers(&self) -> &[InstanceRenderer] {
        &self.renderers
    }

    pub fn renderer_for(&self, foliage_type: &FoliageTypeId) -> Option<&InstanceRenderer> {
        self.renderers.iter().find(|r| &r.foliage_type().id == foliage_type)
    }

    pub fn instance_count(&self) -> u64 {
        self.renderers.iter().map(|r| r.instance_count() as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    // ===== COMMANDS =====

    /// Draw every type whose culling distance exceeds `distance`.
    ///
    /// With `distance_culling` off every type is drawn. Returns the number of
    /// indirect draws issued.
    pub fn draw(&self, cmd: &mut dyn CommandList, distance: f32, distance_culling: bool) -> Result<usize> {
        let mut draws = 0;
        for renderer in self.visible_renderers(distance, distance_culling) {
            draws += renderer.render(cmd)?;
        }
        Ok(draws)
    }

    /// Run the per-instance cull for every type that `draw` would draw.
    /// Returns the number of dispatches.
    pub fn cull(
        &mut self,
        cmd: &mut dyn CommandList,
        kernel: &Arc<dyn ComputeKernel>,
        frustum: &Frustum,
        distance: f32,
        distance_culling: bool,
    ) -> Result<usize> {
        let mut dispatches = 0;
        for renderer in &mut self.renderers {
            if !Self::in_range(renderer, distance, distance_culling) || !renderer.is_gpu_culled() {
                continue;
            }
            renderer.cull(cmd, kernel, frustum)?;
            dispatches += 1;
        }
        Ok(dispatches)
    }

    fn in_range(renderer: &InstanceRenderer, distance: f32, distance_culling: bool) -> bool {
        !distance_culling || distance < renderer.foliage_type().culling_distance
    }

    fn visible_renderers(&self, distance: f32, distance_culling: bool) -> impl Iterator<Item = &InstanceRenderer> {
        self.renderers
            .iter()
            .filter(move |r| Self::in_range(r, distance, distance_culling))
    }

    // ===== LIFECYCLE =====

    /// Dispose and drop the renderer of one foliage type. Returns whether
    /// the cell had one.
    pub fn remove_type(&mut self, foliage_type: &FoliageTypeId) -> bool {
        let before = self.renderers.len();
        self.renderers.retain_mut(|renderer| {
            if &renderer.foliage_type().id == foliage_type {
                renderer.dispose();
                false
            } else {
                true
            }
        });
        self.renderers.len() != before
    }

    /// Dispose every renderer of the cell.
    pub fn dispose(&mut self) {
        for renderer in &mut self.renderers {
            renderer.dispose();
        }
        self.renderers.clear();
    }
}

impl Drop for ComponentRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}
