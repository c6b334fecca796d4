/// Frustum - six clipping planes for visibility culling.
///
/// Each plane is a Vec4 (A, B, C, D):
/// - (A, B, C) is the inward-pointing unit normal
/// - D is the signed distance
/// - A point P is inside if dot(plane, P_homogeneous) >= 0 for all planes
///
/// Used twice per frame: cell AABBs against the planes on the CPU, and the
/// packed planes handed to the per-instance compute kernel.

use glam::{Mat4, Vec3, Vec4};
use super::aabb::AABB;

/// Result of a 3-way frustum/AABB classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// AABB is entirely outside the frustum
    Outside,
    /// AABB is entirely inside the frustum
    Inside,
    /// AABB partially overlaps the frustum
    Partial,
}

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Number of floats in `Frustum::packed_planes()`
pub const PACKED_PLANE_FLOATS: usize = 24;

/// Six frustum planes: left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Gribb & Hartmann, for a [0, 1] depth range (glam's `perspective_rh`
    /// and `orthographic_rh`). Works for both perspective and orthographic
    /// projections.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);

        let mut planes = [
            row3 + row0, // left
            row3 - row0, // right
            row3 + row1, // bottom
            row3 - row1, // top
            row2,        // near (z >= 0)
            row3 - row2, // far
        ];

        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        Self { planes }
    }

    /// Signed distance from `point` to a plane (positive = inside).
    fn signed_distance(plane: &Vec4, point: Vec3) -> f32 {
        plane.truncate().dot(point) + plane.w
    }

    /// Test if an AABB intersects this frustum.
    ///
    /// Positive-vertex test: conservative, may report false positives near
    /// frustum corners but never false negatives.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            let p_vertex = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            Self::signed_distance(plane, p_vertex) >= 0.0
        })
    }

    /// Classify an AABB against the frustum (3-way test).
    pub fn classify_aabb(&self, aabb: &AABB) -> FrustumTest {
        let mut all_inside = true;

        for plane in &self.planes {
            let positive = plane.truncate().cmpge(Vec3::ZERO);
            let p_vertex = Vec3::select(positive, aabb.max, aabb.min);
            if Self::signed_distance(plane, p_vertex) < 0.0 {
                return FrustumTest::Outside;
            }

            let n_vertex = Vec3::select(positive, aabb.min, aabb.max);
            if Self::signed_distance(plane, n_vertex) < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }

    /// Test a bounding sphere against the frustum.
    ///
    /// This is the per-instance test run by the compute cull kernel.
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| Self::signed_distance(plane, center) >= -radius)
    }

    /// Planes packed as 24 floats (normal.xyz, distance) for GPU upload.
    pub fn packed_planes(&self) -> [f32; PACKED_PLANE_FLOATS] {
        let mut packed = [0.0; PACKED_PLANE_FLOATS];
        for (i, plane) in self.planes.iter().enumerate() {
            packed[i * 4..i * 4 + 4].copy_from_slice(&plane.to_array());
        }
        packed
    }

    /// Rebuild a frustum from `packed_planes()` output.
    pub fn from_packed_planes(packed: &[f32; PACKED_PLANE_FLOATS]) -> Self {
        let mut planes = [Vec4::ZERO; 6];
        for (i, plane) in planes.iter_mut().enumerate() {
            *plane = Vec4::from_slice(&packed[i * 4..i * 4 + 4]);
        }
        Self { planes }
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
