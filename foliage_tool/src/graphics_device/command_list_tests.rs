use super::{DrawIndexedIndirectArgs, PropertyBlock, thread_groups_for};

#[test]
fn test_indirect_args_layout() {
    assert_eq!(DrawIndexedIndirectArgs::SIZE, 20);

    let args = DrawIndexedIndirectArgs {
        index_count: 36,
        instance_count: 7,
        start_index: 0,
        base_vertex: 0,
        base_instance: 0,
    };
    let bytes = bytemuck::bytes_of(&args);
    let offset = DrawIndexedIndirectArgs::INSTANCE_COUNT_OFFSET as usize;
    assert_eq!(&bytes[offset..offset + 4], &7u32.to_ne_bytes());
}

#[test]
fn test_property_block_set_replaces() {
    let mut block = PropertyBlock::new();
    assert!(block.is_empty());

    block.set_uint("instanceCount", 3);
    block.set_uint("instanceCount", 5);
    block.set_float("boundingRadius", 0.5);

    assert_eq!(block.len(), 2);
    assert_eq!(block.uint("instanceCount"), Some(5));
    assert_eq!(block.float("boundingRadius"), Some(0.5));
}

#[test]
fn test_property_block_typed_lookup_mismatch() {
    let mut block = PropertyBlock::new();
    block.set_floats("frustumPlanes", &[1.0, 2.0]);

    assert_eq!(block.floats("frustumPlanes"), Some(&[1.0, 2.0][..]));
    assert_eq!(block.float("frustumPlanes"), None);
    assert!(block.buffer("frustumPlanes").is_none());
    assert!(block.get("missing").is_none());
}

#[test]
fn test_thread_groups_round_up() {
    assert_eq!(thread_groups_for(0, 64), [0, 1, 1]);
    assert_eq!(thread_groups_for(1, 64), [1, 1, 1]);
    assert_eq!(thread_groups_for(64, 64), [1, 1, 1]);
    assert_eq!(thread_groups_for(65, 64), [2, 1, 1]);
}
