/// CommandList trait - for recording draw and compute commands

use std::fmt;
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use crate::camera::AABB;
use crate::error::Result;
use crate::graphics_device::{Buffer, ComputeKernel};
use crate::resource::{Material, Mesh};

/// Arguments of one indexed-instanced indirect draw.
///
/// Layout matches `VkDrawIndexedIndirectCommand` /
/// `D3D12_DRAW_INDEXED_ARGUMENTS`: five 32-bit words.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedIndirectArgs {
    pub index_count: u32,
    pub instance_count: u32,
    pub start_index: u32,
    pub base_vertex: i32,
    pub base_instance: u32,
}

impl DrawIndexedIndirectArgs {
    /// Size in bytes of one argument record
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Byte offset of `instance_count`, the word a counter copy overwrites
    pub const INSTANCE_COUNT_OFFSET: u64 = 4;
}

/// A value bound by name in a `PropertyBlock`
#[derive(Clone)]
pub enum BindingValue {
    Buffer(Arc<dyn Buffer>),
    Float(f32),
    Floats(Vec<f32>),
    UInt(u32),
}

impl fmt::Debug for BindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingValue::Buffer(buffer) => write!(f, "Buffer({})", buffer.desc().name),
            BindingValue::Float(value) => write!(f, "Float({})", value),
            BindingValue::Floats(values) => write!(f, "Floats({:?})", values),
            BindingValue::UInt(value) => write!(f, "UInt({})", value),
        }
    }
}

/// Named shader bindings attached to a single draw or dispatch.
///
/// Lets one instance buffer be bound to every submesh draw of a renderer
/// without duplicating the buffer.
#[derive(Debug, Clone, Default)]
pub struct PropertyBlock {
    values: Vec<(String, BindingValue)>,
}

impl PropertyBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under `name`, replacing any previous binding.
    pub fn set(&mut self, name: &str, value: BindingValue) {
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    pub fn set_buffer(&mut self, name: &str, buffer: Arc<dyn Buffer>) {
        self.set(name, BindingValue::Buffer(buffer));
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.set(name, BindingValue::Float(value));
    }

    pub fn set_floats(&mut self, name: &str, values: &[f32]) {
        self.set(name, BindingValue::Floats(values.to_vec()));
    }

    pub fn set_uint(&mut self, name: &str, value: u32) {
        self.set(name, BindingValue::UInt(value));
    }

    pub fn get(&self, name: &str) -> Option<&BindingValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn buffer(&self, name: &str) -> Option<&Arc<dyn Buffer>> {
        match self.get(name) {
            Some(BindingValue::Buffer(buffer)) => Some(buffer),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name) {
            Some(BindingValue::Float(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn floats(&self, name: &str) -> Option<&[f32]> {
        match self.get(name) {
            Some(BindingValue::Floats(values)) => Some(values),
            _ => None,
        }
    }

    pub fn uint(&self, name: &str) -> Option<u32> {
        match self.get(name) {
            Some(BindingValue::UInt(value)) => Some(*value),
            _ => None,
        }
    }

    /// Iterate bindings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BindingValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One indexed-instanced indirect draw of a single submesh.
pub struct IndirectDraw<'a> {
    pub mesh: &'a Mesh,
    pub submesh_index: usize,
    pub material: &'a Arc<Material>,
    /// Conservative world-space bounds of every instance drawn
    pub bounds: AABB,
    pub args_buffer: &'a Arc<dyn Buffer>,
    /// Byte offset of the `DrawIndexedIndirectArgs` record
    pub args_offset: u64,
    pub properties: &'a PropertyBlock,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
}

/// Command list for recording draw and compute commands
pub trait CommandList: Send + Sync {
    /// Begin recording commands
    fn begin(&mut self) -> Result<()>;

    /// End recording commands
    fn end(&mut self) -> Result<()>;

    /// Draw one submesh with the instance count read from `draw.args_buffer`
    fn draw_mesh_instanced_indirect(&mut self, draw: &IndirectDraw<'_>) -> Result<()>;

    /// Dispatch a compute kernel
    ///
    /// # Arguments
    ///
    /// * `kernel` - Kernel to run
    /// * `properties` - Buffers and constants bound by name
    /// * `groups` - Thread group counts (x, y, z)
    fn dispatch(
        &mut self,
        kernel: &Arc<dyn ComputeKernel>,
        properties: &PropertyBlock,
        groups: [u32; 3],
    ) -> Result<()>;

    /// Reset the hidden element counter of an append buffer
    fn set_counter(&mut self, buffer: &Arc<dyn Buffer>, value: u32) -> Result<()>;

    /// GPU-side copy of an append buffer's counter into `dst` at `dst_offset`
    fn copy_counter(
        &mut self,
        src: &Arc<dyn Buffer>,
        dst: &Arc<dyn Buffer>,
        dst_offset: u64,
    ) -> Result<()>;
}
