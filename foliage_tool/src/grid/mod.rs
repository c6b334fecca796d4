//! Grid module
//!
//! The spatial partition of painted foliage: `SceneData` owns the cells,
//! `ComponentData` is one cell, and `CellListener`s mirror changes.

mod component_data;
mod scene_data;

pub use component_data::{ComponentData, ComponentId, FoliageData};
pub use scene_data::{
    CellListener, ListenerId, SceneData, SceneDocument, SharedCellListener,
};
