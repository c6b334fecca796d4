/// Camera - low-level passive data container.
///
/// The host computes view and projection matrices; the camera derives the
/// frustum and eye position from them once at construction so per-frame
/// culling only reads plain data.

use glam::{Mat4, Vec3};
use super::frustum::Frustum;

#[derive(Debug, Clone)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    position: Vec3,
    frustum: Frustum,
}

impl Camera {
    /// Create a camera from a view and a projection matrix.
    ///
    /// The eye position is recovered from the inverse view matrix.
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        let position = view.inverse().col(3).truncate();
        let frustum = Frustum::from_view_projection(&(projection * view));
        Self {
            view_matrix: view,
            projection_matrix: projection,
            position,
            frustum,
        }
    }

    /// Right-handed look-at camera with the given projection.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, projection: Mat4) -> Self {
        Self::new(Mat4::look_at_rh(eye, target, up), projection)
    }

    // ===== GETTERS =====

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Projection matrix (perspective or orthographic).
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Eye position in world space.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Frustum planes for culling.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
