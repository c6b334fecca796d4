//! Camera module - bounds, frustum and camera.
//!
//! Passive data containers for the culling pipeline. Cameras are owned and
//! driven by the host; the manager only reads them.

mod aabb;
mod camera;
mod frustum;

pub use aabb::AABB;
pub use camera::Camera;
pub use frustum::{
    Frustum, FrustumTest, PACKED_PLANE_FLOATS,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod aabb_tests;
