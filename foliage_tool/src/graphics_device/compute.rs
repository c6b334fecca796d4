/// Compute kernels

use std::fmt;
use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Buffer, PropertyBlock};

/// CPU implementation of a kernel, run by devices without a GPU.
pub type SoftwareKernel = Arc<dyn Fn(&mut dyn KernelInvocation) -> Result<()> + Send + Sync>;

/// Descriptor for creating a compute kernel
#[derive(Clone)]
pub struct ComputeKernelDesc {
    /// Kernel name, also used for lookup by software devices
    pub name: String,
    /// Shader source (WGSL)
    pub source: String,
    pub entry_point: String,
    /// Threads per group along X
    pub thread_group_size: u32,
    pub software: Option<SoftwareKernel>,
}

impl fmt::Debug for ComputeKernelDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputeKernelDesc")
            .field("name", &self.name)
            .field("entry_point", &self.entry_point)
            .field("thread_group_size", &self.thread_group_size)
            .field("software", &self.software.is_some())
            .finish()
    }
}

/// Compiled compute kernel
pub trait ComputeKernel: Send + Sync {
    fn name(&self) -> &str;
    fn thread_group_size(&self) -> u32;
}

/// Execution context handed to a `SoftwareKernel` for one dispatch.
pub trait KernelInvocation {
    /// Bindings passed to `CommandList::dispatch`
    fn properties(&self) -> &PropertyBlock;

    /// Thread group counts of the dispatch
    fn groups(&self) -> [u32; 3];

    /// Current contents of a buffer
    fn read(&self, buffer: &Arc<dyn Buffer>) -> Result<Vec<u8>>;

    /// Append one element to an append buffer and bump its counter
    fn append(&mut self, buffer: &Arc<dyn Buffer>, element: &[u8]) -> Result<()>;
}

/// Thread groups needed to cover `count` items with groups of `group_size`.
pub fn thread_groups_for(count: u32, group_size: u32) -> [u32; 3] {
    let group_size = group_size.max(1);
    [count.div_ceil(group_size), 1, 1]
}
