//! GAL primitive tests: buffer contracts, mappings, texture views, shader
//! compilation, query readbacks.

mod common;

use common::ctx;
use ignis_render::*;
use ignis_render_gl::{Buffer, QueryPool, ShaderModule, Texture};

#[test]
fn buffer_write_read_round_trip() {
    let mut c = ctx();
    let buffer = Buffer::new(
        &c.gl,
        &mut c.device,
        BufferDesc::mutable(64, MutableAccess::WriteOnly, MutableUsage::Dynamic),
        None,
    )
    .unwrap();

    let src: Vec<u8> = (0..32).collect();
    buffer.write(&c.gl, 16, &src).unwrap();
    let mut dst = [0u8; 32];
    buffer.read(&c.gl, 16, &mut dst).unwrap();
    assert_eq!(&dst[..], &src[..]);

    // out-of-range access is rejected
    assert!(buffer.write(&c.gl, 48, &src).is_err());
    assert!(buffer.read(&c.gl, 64, &mut dst).is_err());
}

#[test]
fn immutable_buffer_rejects_respecification() {
    let mut c = ctx();
    let mut buffer = Buffer::new(
        &c.gl,
        &mut c.device,
        BufferDesc::immutable(128, BufferStorageFlags::DYNAMIC_STORAGE),
        None,
    )
    .unwrap();

    assert!(matches!(
        buffer.orphan(&c.gl),
        Err(Error::InvalidArgument(_))
    ));
    assert!(buffer.realloc(&c.gl, &mut c.device, 256, None).is_err());
}

#[test]
fn mapping_contracts() {
    let mut c = ctx();
    let mut buffer = Buffer::new(
        &c.gl,
        &mut c.device,
        BufferDesc::immutable(
            256,
            BufferStorageFlags::MAP_READ | BufferStorageFlags::MAP_WRITE,
        ),
        None,
    )
    .unwrap();

    // invalidation combined with reads is rejected
    assert!(buffer
        .map(
            &c.gl,
            0,
            256,
            MapTransfer::ReadWrite,
            MapInvalidate::Range,
            MapPersistence::None,
            false,
            false,
        )
        .is_err());

    // persistence needs persistent storage
    assert!(buffer
        .map(
            &c.gl,
            0,
            256,
            MapTransfer::Write,
            MapInvalidate::None,
            MapPersistence::Coherent,
            false,
            false,
        )
        .is_err());

    let ptr = buffer
        .map(
            &c.gl,
            0,
            256,
            MapTransfer::Write,
            MapInvalidate::EntireBuffer,
            MapPersistence::None,
            false,
            false,
        )
        .unwrap();
    assert!(!ptr.is_null());

    // a buffer has at most one active mapping
    assert!(buffer
        .map(
            &c.gl,
            0,
            16,
            MapTransfer::Write,
            MapInvalidate::None,
            MapPersistence::None,
            false,
            false,
        )
        .is_err());

    // writes through the mapping are visible to a readback after unmap
    unsafe {
        std::ptr::write_bytes(ptr, 0xa5, 16);
    }
    buffer.unmap(&c.gl).unwrap();
    let mut dst = [0u8; 16];
    buffer.read(&c.gl, 0, &mut dst).unwrap();
    assert_eq!(dst, [0xa5; 16]);
}

#[test]
fn persistent_mapping_flush() {
    let mut c = ctx();
    let mut buffer = Buffer::new(
        &c.gl,
        &mut c.device,
        BufferDesc::immutable(
            1024,
            BufferStorageFlags::MAP_WRITE | BufferStorageFlags::MAP_PERSISTENT,
        ),
        None,
    )
    .unwrap();

    buffer
        .map(
            &c.gl,
            0,
            1024,
            MapTransfer::Write,
            MapInvalidate::None,
            MapPersistence::Incoherent,
            true,
            false,
        )
        .unwrap();
    buffer.flush_mapped_range(&c.gl, 0, 512).unwrap();
    assert_eq!(c.gl.count_calls("flush_mapped_named_buffer_range("), 1);
    buffer.unmap(&c.gl).unwrap();

    // flushing without a mapping is an error
    assert!(buffer.flush_mapped_range(&c.gl, 0, 512).is_err());
}

#[test]
fn texture_view_shares_storage() {
    let mut c = ctx();
    let mut desc = TextureDesc::tex_2d(Format::Rgba8, 128, 128);
    desc.num_lods = 8;
    let parent = Texture::storage(&c.gl, &mut c.device, desc).unwrap();

    let view = Texture::view(
        &c.gl,
        &mut c.device,
        &parent,
        TextureType::Tex2D,
        Format::R32UI,
        2,
        1,
        0,
        1,
    )
    .unwrap();
    assert!(view.is_view());

    let parent_storage = c.gl.texture_storage(parent.gl_handle()).unwrap();
    let view_storage = c.gl.texture_storage(view.gl_handle()).unwrap();
    assert_eq!(parent_storage, view_storage);

    // destroying the view must not free the parent's storage
    view.destroy(&c.gl, &mut c.device);
    assert!(c.gl.storage_alive(parent_storage));

    parent.destroy(&c.gl, &mut c.device);
    assert!(!c.gl.storage_alive(parent_storage));
}

#[test]
fn texture_view_validation() {
    let mut c = ctx();
    let immutable = Texture::storage(
        &c.gl,
        &mut c.device,
        TextureDesc::tex_2d(Format::Rgba8, 64, 64),
    )
    .unwrap();
    let mutable = Texture::mutable(
        &c.gl,
        &mut c.device,
        TextureDesc::tex_2d(Format::Rgba8, 64, 64),
        None,
    )
    .unwrap();

    // mutable parents are rejected
    assert!(matches!(
        Texture::view(
            &c.gl,
            &mut c.device,
            &mutable,
            TextureType::Tex2D,
            Format::Rgba8,
            0,
            1,
            0,
            1
        ),
        Err(Error::IncompatibleView(_))
    ));

    // format classes must match (Rgba8 is 32-bit, Rg8 is 16-bit)
    assert!(matches!(
        Texture::view(
            &c.gl,
            &mut c.device,
            &immutable,
            TextureType::Tex2D,
            Format::Rg8,
            0,
            1,
            0,
            1
        ),
        Err(Error::IncompatibleView(_))
    ));

    // 3D views over 2D storage are not a thing
    assert!(matches!(
        Texture::view(
            &c.gl,
            &mut c.device,
            &immutable,
            TextureType::Tex3D,
            Format::Rgba8,
            0,
            1,
            0,
            1
        ),
        Err(Error::IncompatibleView(_))
    ));

    // lod window outside the parent
    assert!(Texture::view(
        &c.gl,
        &mut c.device,
        &immutable,
        TextureType::Tex2D,
        Format::Rgba8,
        1,
        1,
        0,
        1
    )
    .is_err());
}

#[test]
fn buffer_backed_texture_needs_texel_format() {
    let mut c = ctx();
    let buffer = Buffer::new(
        &c.gl,
        &mut c.device,
        BufferDesc::immutable(4096, BufferStorageFlags::empty()),
        None,
    )
    .unwrap();

    let tex = Texture::buffer_backed(&c.gl, &mut c.device, BufferDataType::Float4, &buffer, None)
        .unwrap();
    assert!(tex.is_buffer_backed());
    assert_eq!(tex.desc().format, Format::Rgba32F);

    // doubles have no texel equivalent
    assert!(
        Texture::buffer_backed(&c.gl, &mut c.device, BufferDataType::Double2, &buffer, None)
            .is_err()
    );

    // misaligned range offsets are rejected
    assert!(Texture::buffer_backed(
        &c.gl,
        &mut c.device,
        BufferDataType::Float4,
        &buffer,
        Some((3, 64))
    )
    .is_err());
}

#[test]
fn shader_compile_failure_carries_log() {
    let mut c = ctx();
    let bad = "#version 450 core\n#error broken\n";
    match ShaderModule::from_source(&c.gl, &mut c.device, ShaderStage::Fragment, &[bad]) {
        Err(Error::CompileFailed { log }) => assert!(log.contains("error")),
        other => panic!("expected CompileFailed, got {:?}", other.map(|_| ())),
    }

    let good = ShaderModule::from_source(&c.gl, &mut c.device, ShaderStage::Vertex, &[common::VS])
        .unwrap();
    assert!(!good.binary(&c.gl).is_empty());
}

#[test]
fn query_result_strides_are_checked() {
    let mut c = ctx();
    let pool = QueryPool::new(&c.gl, &mut c.state, QueryTarget::SamplesPassed, 4).unwrap();

    let mut out = [0u8; 64];
    // stride smaller than a 64-bit result
    assert!(pool
        .get_results(&c.gl, 0, 4, &mut out, 4, QueryResultFlags::RESULT_64)
        .is_err());
    // misaligned stride
    assert!(pool
        .get_results(&c.gl, 0, 4, &mut out, 6, QueryResultFlags::empty())
        .is_err());
    // valid 32-bit readback with availability
    pool.get_results(
        &c.gl,
        0,
        4,
        &mut out,
        8,
        QueryResultFlags::WITH_AVAILABILITY,
    )
    .unwrap();
    // the trace backend reports every query available
    assert_eq!(&out[4..8], &1u32.to_le_bytes());

    pool.destroy(&c.gl, &mut c.state);
    assert_eq!(c.state.total_query_pools(), 0);
}

/// Creation reads the allocation back: one size query per buffer, a
/// level-0 extent query per texture.
#[test]
fn creation_reads_back_allocated_sizes() {
    let mut c = ctx();
    let _buffer = Buffer::new(
        &c.gl,
        &mut c.device,
        BufferDesc::immutable(256, BufferStorageFlags::empty()),
        None,
    )
    .unwrap();
    assert_eq!(c.gl.count_calls("get_named_buffer_parameter_i64("), 1);

    let _texture = Texture::storage(
        &c.gl,
        &mut c.device,
        TextureDesc::tex_2d(Format::Rgba8, 64, 64),
    )
    .unwrap();
    assert_eq!(c.gl.count_calls("get_texture_level_parameter_i("), 3);

    let _mutable = Texture::mutable(
        &c.gl,
        &mut c.device,
        TextureDesc::tex_2d(Format::Rgba8, 32, 32),
        None,
    )
    .unwrap();
    assert_eq!(c.gl.count_calls("get_texture_level_parameter_i("), 6);
}

/// A driver that silently under-allocates is caught by the size readback;
/// the tentative object is destroyed and nothing is counted as live.
#[test]
fn short_allocation_is_reported_and_rolled_back() {
    let mut c = ctx();
    c.gl.limit_buffer_allocations(64);

    let result = Buffer::new(
        &c.gl,
        &mut c.device,
        BufferDesc::mutable(4096, MutableAccess::WriteOnly, MutableUsage::Static),
        None,
    );
    assert!(matches!(result, Err(Error::AllocationFailed)));
    assert_eq!(c.gl.count_calls("delete_buffer("), 1);
    assert_eq!(c.device.total_buffers(), 0);

    // allocations within the budget still succeed
    let small = Buffer::new(
        &c.gl,
        &mut c.device,
        BufferDesc::mutable(64, MutableAccess::WriteOnly, MutableUsage::Static),
        None,
    );
    assert!(small.is_ok());
}

#[test]
fn device_counters_track_live_objects() {
    let mut c = ctx();
    assert_eq!(c.device.total_buffers(), 0);
    let buffer = Buffer::new(
        &c.gl,
        &mut c.device,
        BufferDesc::mutable(64, MutableAccess::WriteOnly, MutableUsage::Stream),
        None,
    )
    .unwrap();
    let texture = Texture::storage(
        &c.gl,
        &mut c.device,
        TextureDesc::tex_2d(Format::Depth24Stencil8, 32, 32),
    )
    .unwrap();
    assert_eq!(c.device.total_buffers(), 1);
    assert_eq!(c.device.total_textures(), 1);

    texture.destroy(&c.gl, &mut c.device);
    buffer.destroy(&c.gl, &mut c.device);
    assert_eq!(c.device.total_buffers(), 0);
    assert_eq!(c.device.total_textures(), 0);
}
