/// GraphicsDevice trait - resource factory interface

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Buffer, BufferDesc, CommandList, ComputeKernel, ComputeKernelDesc};

/// Allocation counters, used to detect leaked buffers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// Buffers created and not yet released
    pub live_buffers: usize,
    /// Bytes held by live buffers
    pub allocated_bytes: u64,
    /// Buffers created since the device was opened
    pub total_allocations: u64,
    /// Buffers released since the device was opened
    pub total_releases: u64,
}

/// Main graphics device trait
///
/// This is the central factory interface for creating GPU resources.
/// Implemented by backend-specific devices and by `MockGraphicsDevice`.
pub trait GraphicsDevice: Send + Sync {
    /// Create a buffer
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if the descriptor fails
    /// `BufferDesc::validate`, `Error::OutOfMemory` if the allocation fails.
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Compile a compute kernel
    fn create_compute_kernel(&mut self, desc: ComputeKernelDesc) -> Result<Arc<dyn ComputeKernel>>;

    /// Create a command list for recording one frame's commands
    fn create_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Get allocation statistics
    fn stats(&self) -> DeviceStats;
}
