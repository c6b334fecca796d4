//! Resource-level mesh and material types.
//!
//! The foliage core never touches vertex data: a mesh is only the list of
//! index ranges that the host's backend has already uploaded, plus the
//! local-space bounds used to size per-instance culling spheres.

use crate::camera::AABB;
use crate::error::{Error, Result};

// ============================================================================
// SUBMESH
// ============================================================================

/// A drawable index range of a mesh.
///
/// One indirect draw is issued per submesh, each with its own material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMesh {
    pub index_count: u32,
    pub index_start: u32,
    pub base_vertex: i32,
}

// ============================================================================
// MESH
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub submeshes: Vec<SubMesh>,
    /// Local-space bounds
    pub bounds: AABB,
}

impl Mesh {
    /// Create a mesh.
    ///
    /// # Errors
    ///
    /// `Error::InvalidResource` if there are no submeshes or a submesh has
    /// no indices.
    pub fn new(name: impl Into<String>, submeshes: Vec<SubMesh>, bounds: AABB) -> Result<Self> {
        let name = name.into();
        if submeshes.is_empty() {
            return Err(Error::InvalidResource(format!("mesh '{}' has no submeshes", name)));
        }
        if let Some(index) = submeshes.iter().position(|s| s.index_count == 0) {
            return Err(Error::InvalidResource(format!(
                "mesh '{}' submesh {} has no indices", name, index
            )));
        }
        Ok(Self { name, submeshes, bounds })
    }

    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    /// Radius of the sphere enclosing the mesh around its local origin.
    pub fn bounding_radius(&self) -> f32 {
        self.bounds.min.abs().max(self.bounds.max.abs()).length()
    }
}

// ============================================================================
// MATERIAL
// ============================================================================

/// Material reference. Opaque to the core: the backend resolves `shader`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    pub name: String,
    pub shader: String,
}

impl Material {
    pub fn new(name: impl Into<String>, shader: impl Into<String>) -> Self {
        Self { name: name.into(), shader: shader.into() }
    }
}
