/// Mock graphics device (no GPU required)
///
/// A software device that keeps buffer contents in host memory, executes
/// counter resets/copies and kernels that ship a software implementation, and
/// records every command. Used by unit and integration tests, and by hosts
/// that want to run the foliage pipeline headless.

use std::sync::{Arc, Mutex, MutexGuard};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::camera::AABB;
use crate::error::{Error, Result};
use crate::foliage_bail;
use crate::foliage_err;
use crate::graphics_device::{
    Buffer, BufferDesc, BufferHandle, BufferUsage, CommandList, ComputeKernel,
    ComputeKernelDesc, DeviceStats, DrawIndexedIndirectArgs, GraphicsDevice,
    IndirectDraw, KernelInvocation, PropertyBlock, SoftwareKernel, BindingValue,
};

const SOURCE: &str = "foliage::MockDevice";

// ============================================================================
// Shared device state
// ============================================================================

struct MockStorage {
    desc: BufferDesc,
    bytes: Vec<u8>,
    counter: u32,
}

#[derive(Default)]
struct MockDeviceState {
    buffers: SlotMap<BufferHandle, MockStorage>,
    kernels: FxHashMap<String, SoftwareKernel>,
    total_allocations: u64,
    total_releases: u64,
    fail_releases: bool,
    memory_budget: Option<u64>,
}

impl MockDeviceState {
    fn allocated_bytes(&self) -> u64 {
        self.buffers.values().map(|s| s.desc.size).sum()
    }

    fn storage(&self, buffer: &Arc<dyn Buffer>) -> Result<&MockStorage> {
        self.buffers.get(buffer.handle()).ok_or_else(|| {
            Error::InvalidResource(format!("buffer '{}' used after release", buffer.desc().name))
        })
    }

    fn storage_mut(&mut self, buffer: &Arc<dyn Buffer>) -> Result<&mut MockStorage> {
        self.buffers.get_mut(buffer.handle()).ok_or_else(|| {
            Error::InvalidResource(format!("buffer '{}' used after release", buffer.desc().name))
        })
    }

    fn write(&mut self, handle: BufferHandle, name: &str, offset: u64, data: &[u8]) -> Result<()> {
        let storage = self.buffers.get_mut(handle).ok_or_else(|| {
            Error::InvalidResource(format!("buffer '{}' used after release", name))
        })?;
        let start = offset as usize;
        let end = start + data.len();
        if end > storage.bytes.len() {
            return Err(Error::InvalidArgument(format!(
                "write of {} bytes at offset {} overflows buffer '{}' ({} bytes)",
                data.len(), offset, name, storage.bytes.len()
            )));
        }
        storage.bytes[start..end].copy_from_slice(data);
        Ok(())
    }
}

fn lock(state: &Mutex<MockDeviceState>) -> Result<MutexGuard<'_, MockDeviceState>> {
    state
        .lock()
        .map_err(|_| foliage_err!(SOURCE, "device state lock poisoned"))
}

// ============================================================================
// Mock Buffer
// ============================================================================

pub struct MockBuffer {
    handle: BufferHandle,
    desc: BufferDesc,
    state: Arc<Mutex<MockDeviceState>>,
}

impl Buffer for MockBuffer {
    fn handle(&self) -> BufferHandle {
        self.handle
    }

    fn desc(&self) -> &BufferDesc {
        &self.desc
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        lock(&self.state)?.write(self.handle, &self.desc.name, offset, data)
    }

    fn release(&self) -> Result<()> {
        let mut state = lock(&self.state)?;
        if !state.buffers.contains_key(self.handle) {
            return Ok(());
        }
        if state.fail_releases {
            foliage_bail!(SOURCE, "failed to release buffer '{}'", self.desc.name);
        }
        state.buffers.remove(self.handle);
        state.total_releases += 1;
        Ok(())
    }

    fn is_released(&self) -> bool {
        self.state
            .lock()
            .map(|state| !state.buffers.contains_key(self.handle))
            .unwrap_or(true)
    }
}

// ============================================================================
// Mock ComputeKernel
// ============================================================================

#[derive(Debug)]
pub struct MockComputeKernel {
    pub name: String,
    pub thread_group_size: u32,
}

impl ComputeKernel for MockComputeKernel {
    fn name(&self) -> &str {
        &self.name
    }

    fn thread_group_size(&self) -> u32 {
        self.thread_group_size
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

/// A command recorded by `MockCommandList`
#[derive(Debug, Clone, PartialEq)]
pub enum MockCommand {
    Begin,
    End,
    DrawIndirect {
        mesh: String,
        submesh_index: usize,
        material: String,
        index_count: u32,
        /// Instance count read back from the args buffer at draw time
        instance_count: u32,
        bounds: AABB,
        cast_shadows: bool,
        receive_shadows: bool,
        /// Buffers bound through the draw's property block
        bound_buffers: Vec<(String, BufferHandle)>,
    },
    Dispatch {
        kernel: String,
        groups: [u32; 3],
    },
    SetCounter {
        buffer: BufferHandle,
        value: u32,
    },
    CopyCounter {
        src: BufferHandle,
        dst: BufferHandle,
        dst_offset: u64,
    },
}

/// Command list that executes immediately against the mock device state
pub struct MockCommandList {
    state: Arc<Mutex<MockDeviceState>>,
    pub commands: Vec<MockCommand>,
}

impl MockCommandList {
    /// Number of recorded indirect draws
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, MockCommand::DrawIndirect { .. }))
            .count()
    }

    /// Number of recorded compute dispatches
    pub fn dispatch_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, MockCommand::Dispatch { .. }))
            .count()
    }

    /// Sum of instance counts over every recorded draw
    pub fn drawn_instances(&self) -> u64 {
        self.commands
            .iter()
            .map(|c| match c {
                MockCommand::DrawIndirect { instance_count, .. } => *instance_count as u64,
                _ => 0,
            })
            .sum()
    }

    /// Drop all recorded commands
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        self.commands.push(MockCommand::Begin);
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.commands.push(MockCommand::End);
        Ok(())
    }

    fn draw_mesh_instanced_indirect(&mut self, draw: &IndirectDraw<'_>) -> Result<()> {
        let state = lock(&self.state)?;

        let args_storage = state.storage(draw.args_buffer)?;
        if !args_storage.desc.usage.contains(BufferUsage::INDIRECT_ARGS) {
            return Err(Error::InvalidArgument(format!(
                "buffer '{}' is not an indirect args buffer", args_storage.desc.name
            )));
        }
        let start = draw.args_offset as usize;
        let end = start + DrawIndexedIndirectArgs::SIZE as usize;
        if end > args_storage.bytes.len() {
            return Err(Error::InvalidArgument(format!(
                "args offset {} out of range for buffer '{}'", draw.args_offset, args_storage.desc.name
            )));
        }
        let args: DrawIndexedIndirectArgs = bytemuck::pod_read_unaligned(&args_storage.bytes[start..end]);

        let mut bound_buffers = Vec::new();
        for (name, value) in draw.properties.iter() {
            if let BindingValue::Buffer(buffer) = value {
                state.storage(buffer)?;
                bound_buffers.push((name.to_string(), buffer.handle()));
            }
        }

        self.commands.push(MockCommand::DrawIndirect {
            mesh: draw.mesh.name.clone(),
            submesh_index: draw.submesh_index,
            material: draw.material.name.clone(),
            index_count: args.index_count,
            instance_count: args.instance_count,
            bounds: draw.bounds,
            cast_shadows: draw.cast_shadows,
            receive_shadows: draw.receive_shadows,
            bound_buffers,
        });
        Ok(())
    }

    fn dispatch(
        &mut self,
        kernel: &Arc<dyn ComputeKernel>,
        properties: &PropertyBlock,
        groups: [u32; 3],
    ) -> Result<()> {
        let mut state = lock(&self.state)?;
        self.commands.push(MockCommand::Dispatch {
            kernel: kernel.name().to_string(),
            groups,
        });

        if let Some(software) = state.kernels.get(kernel.name()).cloned() {
            let mut invocation = MockInvocation {
                state: &mut *state,
                properties,
                groups,
            };
            software(&mut invocation)?;
        }
        Ok(())
    }

    fn set_counter(&mut self, buffer: &Arc<dyn Buffer>, value: u32) -> Result<()> {
        let mut state = lock(&self.state)?;
        let storage = state.storage_mut(buffer)?;
        if !storage.desc.usage.contains(BufferUsage::APPEND) {
            return Err(Error::InvalidArgument(format!(
                "buffer '{}' has no append counter", storage.desc.name
            )));
        }
        storage.counter = value;
        self.commands.push(MockCommand::SetCounter { buffer: buffer.handle(), value });
        Ok(())
    }

    fn copy_counter(
        &mut self,
        src: &Arc<dyn Buffer>,
        dst: &Arc<dyn Buffer>,
        dst_offset: u64,
    ) -> Result<()> {
        let mut state = lock(&self.state)?;
        let counter = state.storage(src)?.counter;
        state.write(dst.handle(), &dst.desc().name, dst_offset, bytemuck::bytes_of(&counter))?;
        self.commands.push(MockCommand::CopyCounter {
            src: src.handle(),
            dst: dst.handle(),
            dst_offset,
        });
        Ok(())
    }
}

// ============================================================================
// Kernel invocation
// ============================================================================

struct MockInvocation<'a> {
    state: &'a mut MockDeviceState,
    properties: &'a PropertyBlock,
    groups: [u32; 3],
}

impl KernelInvocation for MockInvocation<'_> {
    fn properties(&self) -> &PropertyBlock {
        self.properties
    }

    fn groups(&self) -> [u32; 3] {
        self.groups
    }

    fn read(&self, buffer: &Arc<dyn Buffer>) -> Result<Vec<u8>> {
        Ok(self.state.storage(buffer)?.bytes.clone())
    }

    fn append(&mut self, buffer: &Arc<dyn Buffer>, element: &[u8]) -> Result<()> {
        let storage = self.state.storage_mut(buffer)?;
        if !storage.desc.usage.contains(BufferUsage::APPEND) {
            return Err(Error::InvalidArgument(format!(
                "buffer '{}' is not an append buffer", storage.desc.name
            )));
        }
        let stride = storage.desc.stride as usize;
        if element.len() != stride {
            return Err(Error::InvalidArgument(format!(
                "element of {} bytes appended to buffer '{}' with stride {}",
                element.len(), storage.desc.name, stride
            )));
        }
        let start = storage.counter as usize * stride;
        let end = start + stride;
        if end > storage.bytes.len() {
            foliage_bail!(SOURCE, "append buffer '{}' overflow", storage.desc.name);
        }
        storage.bytes[start..end].copy_from_slice(element);
        storage.counter += 1;
        Ok(())
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Software graphics device. Clones share the same state.
#[derive(Clone, Default)]
pub struct MockGraphicsDevice {
    state: Arc<Mutex<MockDeviceState>>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Command list with direct access to the recorded commands
    pub fn create_mock_command_list(&self) -> MockCommandList {
        MockCommandList {
            state: Arc::clone(&self.state),
            commands: Vec::new(),
        }
    }

    /// Current contents of a buffer
    pub fn read_buffer(&self, buffer: &Arc<dyn Buffer>) -> Result<Vec<u8>> {
        Ok(lock(&self.state)?.storage(buffer)?.bytes.clone())
    }

    /// Current hidden counter of an append buffer
    pub fn counter(&self, buffer: &Arc<dyn Buffer>) -> Result<u32> {
        Ok(lock(&self.state)?.storage(buffer)?.counter)
    }

    /// Make every subsequent `Buffer::release` fail
    pub fn set_fail_releases(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_releases = fail;
        }
    }

    /// Cap the bytes held by live buffers; `None` removes the cap
    pub fn set_memory_budget(&self, budget: Option<u64>) {
        if let Ok(mut state) = self.state.lock() {
            state.memory_budget = budget;
        }
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        desc.validate()?;
        let mut state = lock(&self.state)?;
        if let Some(budget) = state.memory_budget {
            if state.allocated_bytes() + desc.size > budget {
                return Err(Error::OutOfMemory);
            }
        }

        let handle = state.buffers.insert(MockStorage {
            bytes: vec![0; desc.size as usize],
            desc: desc.clone(),
            counter: 0,
        });
        state.total_allocations += 1;

        Ok(Arc::new(MockBuffer {
            handle,
            desc,
            state: Arc::clone(&self.state),
        }))
    }

    fn create_compute_kernel(&mut self, desc: ComputeKernelDesc) -> Result<Arc<dyn ComputeKernel>> {
        if desc.thread_group_size == 0 {
            return Err(Error::InvalidArgument(format!(
                "kernel '{}' has a zero thread group size", desc.name
            )));
        }
        let mut state = lock(&self.state)?;
        if let Some(software) = desc.software {
            state.kernels.insert(desc.name.clone(), software);
        }
        Ok(Arc::new(MockComputeKernel {
            name: desc.name,
            thread_group_size: desc.thread_group_size,
        }))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(self.create_mock_command_list()))
    }

    fn stats(&self) -> DeviceStats {
        self.state
            .lock()
            .map(|state| DeviceStats {
                live_buffers: state.buffers.len(),
                allocated_bytes: state.allocated_bytes(),
                total_allocations: state.total_allocations,
                total_releases: state.total_releases,
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
