//! Render module
//!
//! GPU side of the foliage tool: per-(cell, type) instance renderers, the
//! per-cell renderer set, the manager that keeps them in sync with the grid,
//! and the per-instance frustum cull kernel.

mod instance_renderer;
mod component_renderer;
mod manager;
pub mod gpu_cull;

pub use instance_renderer::{InstanceRenderer, INSTANCE_DATA_BINDING, MATRIX_STRIDE};
pub use component_renderer::ComponentRenderer;
pub use manager::{FoliageManager, FrameContext, FrameStats};
