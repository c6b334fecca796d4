/// Buffer trait and buffer descriptor

use bitflags::bitflags;
use slotmap::new_key_type;
use crate::error::{Error, Result};

new_key_type! {
    /// Device-unique identifier of a GPU buffer
    pub struct BufferHandle;
}

bitflags! {
    /// Buffer usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Structured storage read by shaders (instance transforms)
        const STORAGE = 1 << 0;
        /// Indirect draw arguments
        const INDIRECT_ARGS = 1 << 1;
        /// Append-structured buffer with a hidden element counter
        const APPEND = 1 << 2;
        /// Uniform/constant buffer
        const UNIFORM = 1 << 3;
    }
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone, PartialEq)]
pub struct BufferDesc {
    /// Debug name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Size of one element in bytes (0 for raw buffers)
    pub stride: u32,
    /// Buffer usage
    pub usage: BufferUsage,
}

impl BufferDesc {
    /// Structured buffer of `count` elements of `stride` bytes each.
    pub fn structured(name: impl Into<String>, count: usize, stride: u32, usage: BufferUsage) -> Self {
        Self {
            name: name.into(),
            size: count as u64 * stride as u64,
            stride,
            usage,
        }
    }

    /// Number of whole elements the buffer holds.
    pub fn element_count(&self) -> u64 {
        if self.stride == 0 { 0 } else { self.size / self.stride as u64 }
    }

    /// Reject descriptors no backend can allocate.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` for zero-size buffers, empty usage, or a size
    /// that is not a multiple of the stride.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Error::InvalidArgument(format!(
                "buffer '{}' has zero size", self.name
            )));
        }
        if self.usage.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "buffer '{}' has no usage flags", self.name
            )));
        }
        if self.stride != 0 && self.size % self.stride as u64 != 0 {
            return Err(Error::InvalidArgument(format!(
                "buffer '{}' size {} is not a multiple of stride {}",
                self.name, self.size, self.stride
            )));
        }
        Ok(())
    }
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types. GPU memory is NOT reclaimed
/// when the last reference is dropped: owners must call `release()`.
pub trait Buffer: Send + Sync {
    /// Device-unique handle
    fn handle(&self) -> BufferHandle;

    /// Descriptor the buffer was created with
    fn desc(&self) -> &BufferDesc;

    /// Update buffer data
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset into the buffer in bytes
    /// * `data` - Data to write
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Free the GPU memory. Calling it again is a no-op.
    fn release(&self) -> Result<()>;

    /// Whether `release()` has completed
    fn is_released(&self) -> bool;
}
