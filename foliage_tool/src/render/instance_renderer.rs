/// InstanceRenderer - GPU projection of one (cell, foliage type) transform list.
///
/// Owns one instance buffer shared by every submesh and one indirect args
/// buffer per submesh. The renderer is an immutable snapshot: when the source
/// transforms change it is disposed and rebuilt, never patched.
///
/// GPU memory is released by `dispose()` (also run on drop). Release
/// failures are logged and never abort teardown.

use std::sync::Arc;
use glam::Mat4;
use crate::camera::{Frustum, AABB};
use crate::error::{Error, Result};
use crate::foliage_warn;
use crate::graphics_device::{
    Buffer, BufferDesc, BufferUsage, CommandList, ComputeKernel, DrawIndexedIndirectArgs,
    GraphicsDevice, IndirectDraw, PropertyBlock, thread_groups_for,
};
use crate::render::gpu_cull;
use crate::resource::FoliageType;

const SOURCE: &str = "foliage::InstanceRenderer";

/// Property name under which the instance transforms are bound for drawing
pub const INSTANCE_DATA_BINDING: &str = "instanceData";

/// Bytes per instance: one column-major 4x4 float matrix
pub const MATRIX_STRIDE: u32 = std::mem::size_of::<Mat4>() as u32;

struct SubmeshDraw {
    args_buffer: Arc<dyn Buffer>,
    properties: PropertyBlock,
}

struct GpuCullState {
    /// Append buffer receiving the transforms that pass the cull
    visible_buffer: Arc<dyn Buffer>,
    properties: PropertyBlock,
}

pub struct InstanceRenderer {
    foliage_type: Arc<FoliageType>,
    bounds: AABB,
    instance_count: u32,
    instance_buffer: Arc<dyn Buffer>,
    gpu_cull: Option<GpuCullState>,
    submeshes: Vec<SubmeshDraw>,
    disposed: bool,
}

impl InstanceRenderer {
    /// Upload `matrices` and build one indirect draw per submesh.
    ///
    /// With `gpu_cull` set, an append buffer is also allocated so `cull()` can
    /// narrow the drawn instances to those inside the camera frustum.
    ///
    /// # Arguments
    ///
    /// * `device` - Device allocating the buffers
    /// * `foliage_type` - Mesh, materials and shadow flags to draw with
    /// * `matrices` - Instance transforms, at least one
    /// * `bounds` - Conservative world bounds of every instance (the cell AABB)
    /// * `gpu_cull` - Allocate the per-instance culling resources
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` for an empty transform list,
    /// `Error::InvalidResource` for a foliage type whose materials do not
    /// match its submeshes, and any allocation error from the device. Buffers
    /// allocated before a failure are released.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        foliage_type: Arc<FoliageType>,
        matrices: &[Mat4],
        bounds: AABB,
        gpu_cull: bool,
    ) -> Result<Self> {
        if matrices.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "no instances to render for foliage type '{}'", foliage_type.name
            )));
        }
        foliage_type.validate()?;
        let instance_count = u32::try_from(matrices.len()).map_err(|_| {
            Error::InvalidArgument(format!("{} instances exceed the draw limit", matrices.len()))
        })?;

        let instance_buffer = device.create_buffer(BufferDesc::structured(
            format!("{}/instances", foliage_type.name),
            matrices.len(),
            MATRIX_STRIDE,
            BufferUsage::STORAGE,
        ))?;

        let mut renderer = Self {
            foliage_type,
            bounds,
            instance_count,
            instance_buffer,
            gpu_cull: None,
            submeshes: Vec::new(),
            disposed: false,
        };

        if let Err(error) = renderer.allocate(device, matrices, gpu_cull) {
            renderer.dispose();
            return Err(error);
        }
        Ok(renderer)
    }

    fn allocate(&mut self, device: &mut dyn GraphicsDevice, matrices: &[Mat4], gpu_cull: bool) -> Result<()> {
        let bytes: &[u8] = bytemuck::cast_slice(matrices);
        self.instance_buffer.update(0, bytes)?;

        if gpu_cull {
            let visible_buffer = device.create_buffer(BufferDesc::structured(
                format!("{}/visible", self.foliage_type.name),
                matrices.len(),
                MATRIX_STRIDE,
                BufferUsage::STORAGE | BufferUsage::APPEND,
            ))?;
            // Until the first cull every instance counts as visible
            visible_buffer.update(0, bytes)?;

            let mut properties = PropertyBlock::new();
            properties.set_buffer(gpu_cull::INSTANCES_BINDING, Arc::clone(&self.instance_buffer));
            properties.set_buffer(gpu_cull::VISIBLE_BINDING, Arc::clone(&visible_buffer));
            properties.set_uint(gpu_cull::INSTANCE_COUNT_BINDING, self.instance_count);
            properties.set_float(gpu_cull::BOUNDING_RADIUS_BINDING, self.foliage_type.mesh.bounding_radius());
            self.gpu_cull = Some(GpuCullState { visible_buffer, properties });
        }

        let drawn_buffer = match &self.gpu_cull {
            Some(cull) => Arc::clone(&cull.visible_buffer),
            None => Arc::clone(&self.instance_buffer),
        };

        let mesh = Arc::clone(&self.foliage_type.mesh);
        for (index, submesh) in mesh.submeshes.iter().enumerate() {
            let args_buffer = device.create_buffer(BufferDesc::structured(
                format!("{}/args{}", self.foliage_type.name, index),
                1,
                DrawIndexedIndirectArgs::SIZE as u32,
                BufferUsage::INDIRECT_ARGS,
            ))?;
            // Track before uploading so a failed upload is still released
            self.submeshes.push(SubmeshDraw {
                args_buffer: Arc::clone(&args_buffer),
                properties: PropertyBlock::new(),
            });

            let args = DrawIndexedIndirectArgs {
                index_count: submesh.index_count,
                instance_count: self.instance_count,
                start_index: submesh.index_start,
                base_vertex: submesh.base_vertex,
                base_instance: 0,
            };
            args_buffer.update(0, bytemuck::bytes_of(&args))?;

            if let Some(draw) = self.submeshes.last_mut() {
                draw.properties.set_buffer(INSTANCE_DATA_BINDING, Arc::clone(&drawn_buffer));
            }
        }
        Ok(())
    }

    // ===== GETTERS =====

    pub fn foliage_type(&self) -> &Arc<FoliageType> {
        &self.foliage_type
    }

    /// Instances uploaded at construction
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    pub fn instance_buffer(&self) -> &Arc<dyn Buffer> {
        &self.instance_buffer
    }

    /// Append buffer of culled transforms, when built with GPU culling
    pub fn visible_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.gpu_cull.as_ref().map(|c| &c.visible_buffer)
    }

    pub fn args_buffer(&self, submesh_index: usize) -> Option<&Arc<dyn Buffer>> {
        self.submeshes.get(submesh_index).map(|s| &s.args_buffer)
    }

    pub fn is_gpu_culled(&self) -> bool {
        self.gpu_cull.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ===== COMMANDS =====

    /// Issue one indirect draw per submesh. Returns the number of draws.
    pub fn render(&self, cmd: &mut dyn CommandList) -> Result<usize> {
        if self.disposed {
            return Err(Error::InvalidResource(format!(
                "renderer for '{}' used after dispose", self.foliage_type.name
            )));
        }

        let foliage_type = &self.foliage_type;
        for (index, draw) in self.submeshes.iter().enumerate() {
            cmd.draw_mesh_instanced_indirect(&IndirectDraw {
                mesh: &foliage_type.mesh,
                submesh_index: index,
                material: &foliage_type.materials[index],
                bounds: self.bounds,
                args_buffer: &draw.args_buffer,
                args_offset: 0,
                properties: &draw.properties,
                cast_shadows: foliage_type.casts_shadows(),
                receive_shadows: foliage_type.receives_shadows(),
            })?;
        }
        Ok(self.submeshes.len())
    }

    /// Per-instance frustum cull on the device.
    ///
    /// Resets the append counter, dispatches `kernel` over every instance and
    /// copies the surviving count into each submesh's args buffer, so the
    /// following `render()` draws only visible instances without a readback.
    pub fn cull(
        &mut self,
        cmd: &mut dyn CommandList,
        kernel: &Arc<dyn ComputeKernel>,
        frustum: &Frustum,
    ) -> Result<()> {
        if self.disposed {
            return Err(Error::InvalidResource(format!(
                "renderer for '{}' used after dispose", self.foliage_type.name
            )));
        }
        let Some(cull) = self.gpu_cull.as_mut() else {
            return Err(Error::InvalidArgument(format!(
                "renderer for '{}' was built without GPU culling", self.foliage_type.name
            )));
        };

        cull.properties.set_floats(gpu_cull::FRUSTUM_PLANES_BINDING, &frustum.packed_planes());
        cmd.set_counter(&cull.visible_buffer, 0)?;
        cmd.dispatch(
            kernel,
            &cull.properties,
            thread_groups_for(self.instance_count, kernel.thread_group_size()),
        )?;
        for draw in &self.submeshes {
            cmd.copy_counter(
                &cull.visible_buffer,
                &draw.args_buffer,
                DrawIndexedIndirectArgs::INSTANCE_COUNT_OFFSET,
            )?;
        }
        Ok(())
    }

    // ===== LIFECYCLE =====

    /// Release every GPU buffer. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        let buffers = std::iter::once(&self.instance_buffer)
            .chain(self.gpu_cull.as_ref().map(|c| &c.visible_buffer))
            .chain(self.submeshes.iter().map(|s| &s.args_buffer));
        for buffer in buffers {
            if let Err(error) = buffer.release() {
                foliage_warn!(SOURCE, "Failed to release buffer '{}': {}", buffer.desc().name, error);
            }
        }
    }
}

impl Drop for InstanceRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "instance_renderer_tests.rs"]
mod tests;
