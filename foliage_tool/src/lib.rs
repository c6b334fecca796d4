/*!
# Foliage Tool

Spatially chunked storage for painted vegetation (grass, rocks, props) and
the GPU-instanced rendering pipeline that draws it.

The world is partitioned into fixed-size cubic cells ("components"). Each cell
owns one transform list per foliage type. Painting and erasing mutate the
[`SceneData`](grid::SceneData) grid, which notifies its listeners; the
[`FoliageManager`](render::FoliageManager) keeps one set of GPU instance
buffers per cell in sync and, each frame, draws the cells that survive
frustum culling with indirect instanced draw calls.

## Architecture

- **SceneData**: the grid of cells, source of truth, serializable
- **ComponentData**: one cell and its per-type transform lists
- **InstanceRenderer**: GPU buffers + indirect draws for one (cell, type) pair
- **FoliageManager**: listener that mirrors the grid into renderers and culls
- **GraphicsDevice**: backend-agnostic buffer/draw/compute abstraction, with a
  software implementation for tests

Backends implement the `graphics_device` traits; nothing in this crate talks
to a concrete graphics API.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod camera;
pub mod graphics_device;
pub mod resource;
pub mod grid;
pub mod render;
pub mod placement;

// Main foliage namespace module
pub mod foliage {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::{FoliageConfig, CullingMode};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Graphics device abstraction
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Camera, frustum and bounds
    pub mod camera {
        pub use crate::camera::*;
    }

    // Meshes, materials and foliage types
    pub mod resource {
        pub use crate::resource::*;
    }

    // Spatial grid
    pub mod grid {
        pub use crate::grid::*;
    }

    // Renderers and manager
    pub mod render {
        pub use crate::render::*;
    }

    // Brush / transform helpers
    pub mod placement {
        pub use crate::placement::*;
    }
}

// Re-export math library at crate root
pub use glam;
