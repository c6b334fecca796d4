/// Per-instance frustum culling kernel.
///
/// The WGSL source is what a GPU backend compiles. `cull_instances` is the
/// same test on the CPU; it backs the software kernel so headless devices
/// produce the exact counts a GPU would.

use std::sync::Arc;
use glam::Mat4;
use crate::camera::{Frustum, PACKED_PLANE_FLOATS};
use crate::error::{Error, Result};
use crate::graphics_device::{ComputeKernelDesc, KernelInvocation, SoftwareKernel};

/// Kernel name, also the key software devices look the kernel up by
pub const FRUSTUM_CULL_KERNEL_NAME: &str = "foliage_frustum_cull";

/// Shader entry point
pub const FRUSTUM_CULL_ENTRY_POINT: &str = "cull_instances";

/// Threads per group, matches `@workgroup_size` in the shader
pub const FRUSTUM_CULL_GROUP_SIZE: u32 = 64;

pub const FRUSTUM_CULL_SOURCE: &str = include_str!("shaders/frustum_cull.wgsl");

// Binding names shared by the renderer and the kernel
pub const INSTANCES_BINDING: &str = "instances";
pub const VISIBLE_BINDING: &str = "visible";
pub const FRUSTUM_PLANES_BINDING: &str = "frustumPlanes";
pub const INSTANCE_COUNT_BINDING: &str = "instanceCount";
pub const BOUNDING_RADIUS_BINDING: &str = "boundingRadius";

/// Largest axis scale of an instance transform.
fn max_axis_scale(matrix: &Mat4) -> f32 {
    matrix.x_axis.truncate().length()
        .max(matrix.y_axis.truncate().length())
        .max(matrix.z_axis.truncate().length())
}

/// Whether one instance survives the cull.
///
/// The instance is bounded by a sphere at its translation whose radius is the
/// mesh radius times the transform's largest axis scale.
pub fn is_instance_visible(frustum: &Frustum, matrix: &Mat4, bounding_radius: f32) -> bool {
    let center = matrix.w_axis.truncate();
    frustum.intersects_sphere(center, bounding_radius * max_axis_scale(matrix))
}

/// Instances of `matrices` visible from `frustum`, in input order.
pub fn cull_instances(frustum: &Frustum, matrices: &[Mat4], bounding_radius: f32) -> Vec<Mat4> {
    matrices
        .iter()
        .filter(|m| is_instance_visible(frustum, m, bounding_radius))
        .copied()
        .collect()
}

fn missing(name: &str) -> Error {
    Error::InvalidArgument(format!("cull dispatch is missing binding '{}'", name))
}

fn run_software(invocation: &mut dyn KernelInvocation) -> Result<()> {
    let properties = invocation.properties();
    let instances = properties.buffer(INSTANCES_BINDING).cloned().ok_or_else(|| missing(INSTANCES_BINDING))?;
    let visible = properties.buffer(VISIBLE_BINDING).cloned().ok_or_else(|| missing(VISIBLE_BINDING))?;
    let count = properties.uint(INSTANCE_COUNT_BINDING).ok_or_else(|| missing(INSTANCE_COUNT_BINDING))?;
    let radius = properties.float(BOUNDING_RADIUS_BINDING).ok_or_else(|| missing(BOUNDING_RADIUS_BINDING))?;
    let packed: &[f32; PACKED_PLANE_FLOATS] = properties
        .floats(FRUSTUM_PLANES_BINDING)
        .ok_or_else(|| missing(FRUSTUM_PLANES_BINDING))?
        .try_into()
        .map_err(|_| {
            Error::InvalidArgument(format!("'{}' must hold {} floats", FRUSTUM_PLANES_BINDING, PACKED_PLANE_FLOATS))
        })?;
    let frustum = Frustum::from_packed_planes(packed);

    // Threads past the dispatched groups never run
    let [groups, _, _] = invocation.groups();
    let covered = groups.saturating_mul(FRUSTUM_CULL_GROUP_SIZE);
    let count = count.min(covered) as usize;

    let bytes = invocation.read(&instances)?;
    let matrices: Vec<Mat4> = bytemuck::pod_collect_to_vec(&bytes);
    for matrix in cull_instances(&frustum, &matrices[..count.min(matrices.len())], radius) {
        invocation.append(&visible, bytemuck::bytes_of(&matrix))?;
    }
    Ok(())
}

/// Descriptor for the cull kernel, carrying both the shader and the
/// software implementation.
pub fn kernel_desc() -> ComputeKernelDesc {
    let software: SoftwareKernel = Arc::new(run_software);
    ComputeKernelDesc {
        name: FRUSTUM_CULL_KERNEL_NAME.to_string(),
        source: FRUSTUM_CULL_SOURCE.to_string(),
        entry_point: FRUSTUM_CULL_ENTRY_POINT.to_string(),
        thread_group_size: FRUSTUM_CULL_GROUP_SIZE,
        software: Some(software),
    }
}

#[cfg(test)]
#[path = "gpu_cull_tests.rs"]
mod tests;
