/// Unit tests for MockGraphicsDevice and associated mock types.

use std::sync::Arc;
use glam::Vec3;
use crate::camera::AABB;
use crate::error::{Error, Result};
use crate::graphics_device::mock_graphics_device::*;
use crate::graphics_device::{
    GraphicsDevice, Buffer, BufferDesc, BufferUsage, CommandList,
    ComputeKernelDesc, DrawIndexedIndirectArgs, IndirectDraw, PropertyBlock,
    SoftwareKernel, KernelInvocation,
};
use crate::resource::{Material, Mesh, SubMesh};

// ============================================================================
// Helper Functions
// ============================================================================

fn args_buffer(device: &mut MockGraphicsDevice, instance_count: u32) -> Arc<dyn Buffer> {
    let buffer = device
        .create_buffer(BufferDesc::structured("args", 1, DrawIndexedIndirectArgs::SIZE as u32, BufferUsage::INDIRECT_ARGS))
        .unwrap();
    let args = DrawIndexedIndirectArgs { index_count: 6, instance_count, ..Default::default() };
    buffer.update(0, bytemuck::bytes_of(&args)).unwrap();
    buffer
}

fn quad_mesh() -> Mesh {
    Mesh::new(
        "quad",
        vec![SubMesh { index_count: 6, index_start: 0, base_vertex: 0 }],
        AABB::from_center_size(Vec3::ZERO, Vec3::ONE),
    )
    .unwrap()
}

// ============================================================================
// Buffers
// ============================================================================

#[test]
fn test_create_buffer_tracks_stats() {
    let mut device = MockGraphicsDevice::new();
    let buffer = device
        .create_buffer(BufferDesc::structured("instances", 4, 64, BufferUsage::STORAGE))
        .unwrap();

    let stats = device.stats();
    assert_eq!(stats.live_buffers, 1);
    assert_eq!(stats.allocated_bytes, 256);
    assert_eq!(stats.total_allocations, 1);
    assert_eq!(buffer.desc().name, "instances");
    assert!(!buffer.is_released());
}

#[test]
fn test_zero_size_buffer_rejected() {
    let mut device = MockGraphicsDevice::new();
    let result = device.create_buffer(BufferDesc::structured("empty", 0, 64, BufferUsage::STORAGE));
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(device.stats().total_allocations, 0);
}

#[test]
fn test_update_and_read_back() {
    let mut device = MockGraphicsDevice::new();
    let buffer = device
        .create_buffer(BufferDesc::structured("data", 2, 4, BufferUsage::STORAGE))
        .unwrap();

    buffer.update(4, &[1, 2, 3, 4]).unwrap();
    assert_eq!(device.read_buffer(&buffer).unwrap(), vec![0, 0, 0, 0, 1, 2, 3, 4]);
}

#[test]
fn test_update_out_of_range_fails() {
    let mut device = MockGraphicsDevice::new();
    let buffer = device
        .create_buffer(BufferDesc::structured("data", 1, 4, BufferUsage::STORAGE))
        .unwrap();
    assert!(matches!(buffer.update(2, &[0; 4]), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_release_is_idempotent() {
    let mut device = MockGraphicsDevice::new();
    let buffer = device
        .create_buffer(BufferDesc::structured("data", 1, 64, BufferUsage::STORAGE))
        .unwrap();

    buffer.release().unwrap();
    buffer.release().unwrap();

    let stats = device.stats();
    assert!(buffer.is_released());
    assert_eq!(stats.live_buffers, 0);
    assert_eq!(stats.total_releases, 1);
}

#[test]
fn test_update_after_release_fails() {
    let mut device = MockGraphicsDevice::new();
    let buffer = device
        .create_buffer(BufferDesc::structured("data", 1, 64, BufferUsage::STORAGE))
        .unwrap();
    buffer.release().unwrap();
    assert!(matches!(buffer.update(0, &[0; 4]), Err(Error::InvalidResource(_))));
}

#[test]
fn test_failing_release_keeps_buffer_alive() {
    let mut device = MockGraphicsDevice::new();
    let buffer = device
        .create_buffer(BufferDesc::structured("data", 1, 64, BufferUsage::STORAGE))
        .unwrap();

    device.set_fail_releases(true);
    assert!(matches!(buffer.release(), Err(Error::BackendError(_))));
    assert!(!buffer.is_released());

    device.set_fail_releases(false);
    buffer.release().unwrap();
    assert!(buffer.is_released());
}

#[test]
fn test_memory_budget_reports_out_of_memory() {
    let mut device = MockGraphicsDevice::new();
    device.set_memory_budget(Some(128));
    device
        .create_buffer(BufferDesc::structured("a", 1, 64, BufferUsage::STORAGE))
        .unwrap();
    let result = device.create_buffer(BufferDesc::structured("b", 2, 64, BufferUsage::STORAGE));
    assert_eq!(result.err(), Some(Error::OutOfMemory));
}

// ============================================================================
// Command list
// ============================================================================

#[test]
fn test_draw_reads_instance_count_from_args() {
    let mut device = MockGraphicsDevice::new();
    let args = args_buffer(&mut device, 42);
    let instances = device
        .create_buffer(BufferDesc::structured("instances", 42, 64, BufferUsage::STORAGE))
        .unwrap();
    let mesh = quad_mesh();
    let material = Arc::new(Material::new("grass", "foliage/lit"));
    let mut properties = PropertyBlock::new();
    properties.set_buffer("instanceData", Arc::clone(&instances));
    let bounds = AABB::from_center_size(Vec3::ZERO, Vec3::splat(25.0));

    let mut cmd = device.create_mock_command_list();
    cmd.begin().unwrap();
    cmd.draw_mesh_instanced_indirect(&IndirectDraw {
        mesh: &mesh,
        submesh_index: 0,
        material: &material,
        bounds,
        args_buffer: &args,
        args_offset: 0,
        properties: &properties,
        cast_shadows: true,
        receive_shadows: false,
    })
    .unwrap();
    cmd.end().unwrap();

    assert_eq!(cmd.draw_count(), 1);
    assert_eq!(cmd.drawn_instances(), 42);
    match &cmd.commands[1] {
        MockCommand::DrawIndirect { mesh, material, index_count, cast_shadows, receive_shadows, bound_buffers, .. } => {
            assert_eq!(mesh, "quad");
            assert_eq!(material, "grass");
            assert_eq!(*index_count, 6);
            assert!(*cast_shadows);
            assert!(!*receive_shadows);
            assert_eq!(bound_buffers, &vec![("instanceData".to_string(), instances.handle())]);
        }
        other => panic!("expected a draw, got {:?}", other),
    }
}

#[test]
fn test_draw_with_released_args_fails() {
    let mut device = MockGraphicsDevice::new();
    let args = args_buffer(&mut device, 1);
    args.release().unwrap();
    let mesh = quad_mesh();
    let material = Arc::new(Material::new("grass", "foliage/lit"));
    let properties = PropertyBlock::new();

    let mut cmd = device.create_mock_command_list();
    let result = cmd.draw_mesh_instanced_indirect(&IndirectDraw {
        mesh: &mesh,
        submesh_index: 0,
        material: &material,
        bounds: AABB::from_center_size(Vec3::ZERO, Vec3::ONE),
        args_buffer: &args,
        args_offset: 0,
        properties: &properties,
        cast_shadows: false,
        receive_shadows: false,
    });
    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(cmd.draw_count(), 0);
}

#[test]
fn test_counter_reset_and_copy() {
    let mut device = MockGraphicsDevice::new();
    let args = args_buffer(&mut device, 100);
    let visible = device
        .create_buffer(BufferDesc::structured("visible", 8, 64, BufferUsage::STORAGE | BufferUsage::APPEND))
        .unwrap();

    let mut cmd = device.create_mock_command_list();
    cmd.set_counter(&visible, 3).unwrap();
    cmd.copy_counter(&visible, &args, DrawIndexedIndirectArgs::INSTANCE_COUNT_OFFSET).unwrap();

    let bytes = device.read_buffer(&args).unwrap();
    let read: DrawIndexedIndirectArgs = bytemuck::pod_read_unaligned(&bytes[..20]);
    assert_eq!(read.instance_count, 3);
    assert_eq!(read.index_count, 6);
}

#[test]
fn test_set_counter_requires_append_buffer() {
    let mut device = MockGraphicsDevice::new();
    let plain = device
        .create_buffer(BufferDesc::structured("plain", 1, 64, BufferUsage::STORAGE))
        .unwrap();
    let mut cmd = device.create_mock_command_list();
    assert!(cmd.set_counter(&plain, 0).is_err());
}

// ============================================================================
// Compute
// ============================================================================

#[test]
fn test_dispatch_runs_software_kernel() {
    let mut device = MockGraphicsDevice::new();
    let source = device
        .create_buffer(BufferDesc::structured("source", 4, 4, BufferUsage::STORAGE))
        .unwrap();
    let even = device
        .create_buffer(BufferDesc::structured("even", 4, 4, BufferUsage::STORAGE | BufferUsage::APPEND))
        .unwrap();
    source.update(0, bytemuck::cast_slice(&[1u32, 2, 3, 4])).unwrap();

    let software: SoftwareKernel = Arc::new(|invocation: &mut dyn KernelInvocation| -> Result<()> {
        let input = invocation.properties().buffer("input").cloned().unwrap();
        let output = invocation.properties().buffer("output").cloned().unwrap();
        let bytes = invocation.read(&input)?;
        for value in bytemuck::pod_collect_to_vec::<u8, u32>(&bytes) {
            if value % 2 == 0 {
                invocation.append(&output, bytemuck::bytes_of(&value))?;
            }
        }
        Ok(())
    });
    let kernel = device
        .create_compute_kernel(ComputeKernelDesc {
            name: "keep_even".to_string(),
            source: String::new(),
            entry_point: "main".to_string(),
            thread_group_size: 64,
            software: Some(software),
        })
        .unwrap();

    let mut properties = PropertyBlock::new();
    properties.set_buffer("input", Arc::clone(&source));
    properties.set_buffer("output", Arc::clone(&even));

    let mut cmd = device.create_mock_command_list();
    cmd.set_counter(&even, 0).unwrap();
    cmd.dispatch(&kernel, &properties, [1, 1, 1]).unwrap();

    assert_eq!(cmd.dispatch_count(), 1);
    assert_eq!(device.counter(&even).unwrap(), 2);
    let out = device.read_buffer(&even).unwrap();
    assert_eq!(bytemuck::pod_collect_to_vec::<u8, u32>(&out[..8]), vec![2, 4]);
}

#[test]
fn test_append_overflow_fails() {
    let mut device = MockGraphicsDevice::new();
    let target = device
        .create_buffer(BufferDesc::structured("tiny", 1, 4, BufferUsage::APPEND))
        .unwrap();

    let software: SoftwareKernel = Arc::new(|invocation: &mut dyn KernelInvocation| -> Result<()> {
        let output = invocation.properties().buffer("output").cloned().unwrap();
        invocation.append(&output, &[0; 4])?;
        invocation.append(&output, &[0; 4])
    });
    let kernel = device
        .create_compute_kernel(ComputeKernelDesc {
            name: "overflow".to_string(),
            source: String::new(),
            entry_point: "main".to_string(),
            thread_group_size: 1,
            software: Some(software),
        })
        .unwrap();

    let mut properties = PropertyBlock::new();
    properties.set_buffer("output", Arc::clone(&target));
    let mut cmd = device.create_mock_command_list();
    assert!(cmd.dispatch(&kernel, &properties, [1, 1, 1]).is_err());
}

#[test]
fn test_zero_thread_group_rejected() {
    let mut device = MockGraphicsDevice::new();
    let result = device.create_compute_kernel(ComputeKernelDesc {
        name: "bad".to_string(),
        source: String::new(),
        entry_point: "main".to_string(),
        thread_group_size: 0,
        software: None,
    });
    assert!(result.is_err());
}

#[test]
fn test_clones_share_state() {
    let mut device = MockGraphicsDevice::new();
    let observer = device.clone();
    device
        .create_buffer(BufferDesc::structured("shared", 1, 64, BufferUsage::STORAGE))
        .unwrap();
    assert_eq!(observer.stats().live_buffers, 1);
}
