//! Command recorder tests: binding caches, state diffing, render pass
//! scoping and the viewport origin convention.

mod common;

use common::{ctx, ctx_top_left, make_pipeline, PipelineStates};
use ignis_render::*;
use ignis_render_gl::{
    Buffer, CommandBuffer, Framebuffer, FramebufferAttachment, FramebufferCreateInfo,
    RenderPass, RenderPassBegin, ShaderResources, Texture, TextureBinding,
};
use ignis_render_gl::framebuffer::AttachKind;

fn vertex_buffer(c: &mut common::TestContext, size: usize) -> Buffer {
    Buffer::new(
        &c.gl,
        &mut c.device,
        BufferDesc::immutable(size, BufferStorageFlags::DYNAMIC_STORAGE),
        None,
    )
    .unwrap()
}

/// With a top-left origin, viewport Y is flipped against the current
/// target height.
#[test]
fn viewport_origin_flip() {
    let mut c = ctx_top_left();
    let pipeline = make_pipeline(&mut c, &PipelineStates::default());
    let mut cmd = CommandBuffer::new(&c.gl, &c.device, &mut c.state);
    cmd.bind_pipeline(&pipeline);
    c.gl.clear_calls();

    cmd.set_viewport(&Viewport::with_rect(0.0, 40.0, 800.0, 480.0));
    assert_eq!(
        c.gl.calls_with_prefix("viewport("),
        vec!["viewport(0, 80, 800, 480)".to_string()]
    );
}

/// Scissor state set before a pass survives the pass's load-op clears.
#[test]
fn scissor_restored_around_render_pass() {
    let mut c = ctx();
    let states = PipelineStates {
        rasterizer: RasterizerStateInfo {
            scissor_enable: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let pipeline = make_pipeline(&mut c, &states);

    let target = Texture::storage(
        &c.gl,
        &mut c.device,
        TextureDesc::tex_2d(Format::Rgba8, 256, 256),
    )
    .unwrap();
    let fb = Framebuffer::new(
        &c.gl,
        &mut c.state,
        &FramebufferCreateInfo {
            color_attachments: smallvec::smallvec![FramebufferAttachment {
                texture: target.as_ref(),
                lod: 0,
                kind: AttachKind::Texture,
            }],
            depth_stencil_attachment: None,
            width: 256,
            height: 256,
        },
    )
    .unwrap();
    let pass = RenderPass::new(
        &mut c.device,
        &mut c.state,
        RenderPassDesc {
            color_attachments: smallvec::smallvec![AttachmentInfo {
                load_op: LoadOp::Clear
            }],
            depth_stencil_attachment: None,
            subpasses: smallvec::smallvec![SubpassDesc::with_colors(&[0])],
        },
    )
    .unwrap();

    let mut cmd = CommandBuffer::new(&c.gl, &c.device, &mut c.state);
    cmd.bind_pipeline(&pipeline);
    cmd.set_scissor(&Rect2D::new(10, 20, 100, 80));
    c.gl.clear_calls();

    cmd.begin_render_pass(&RenderPassBegin {
        render_pass: &pass,
        framebuffer: Some(&fb),
        render_area: Rect2D::new(0, 0, 64, 64),
        clear_colors: &[ClearColorValue::Float32([0.0; 4])],
        clear_depth_stencil: Default::default(),
    });
    cmd.end_render_pass();

    // the clear itself was scoped to the render area...
    assert_eq!(c.gl.count_calls("clear_named_framebuffer_color("), 1);
    assert_eq!(c.gl.count_calls("scissor(0, 0, 64, 64)"), 1);
    // ...and the pre-pass scissor state is what remains afterwards
    let scissors = c.gl.calls_with_prefix("scissor(");
    assert_eq!(scissors.last().unwrap(), "scissor(10, 20, 100, 80)");
    // scissor was already enabled, so no toggling happened
    assert_eq!(c.gl.count_calls("enable(ScissorTest)"), 0);
    assert_eq!(c.gl.count_calls("disable(ScissorTest)"), 0);
    // depth writes and rasterizer discard were untouched
    assert_eq!(c.gl.count_calls("depth_mask("), 0);
    assert_eq!(c.gl.count_calls("disable(RasterizerDiscard)"), 0);
}

/// Rebinding the current pipeline emits no state traffic outside a pass.
#[test]
fn bind_pipeline_is_idempotent() {
    let mut c = ctx();
    let pipeline = make_pipeline(&mut c, &PipelineStates::default());
    let mut cmd = CommandBuffer::new(&c.gl, &c.device, &mut c.state);

    cmd.bind_pipeline(&pipeline);
    c.gl.clear_calls();
    cmd.bind_pipeline(&pipeline);
    assert!(c.gl.calls().is_empty());
}

/// One backend bind per distinct (slot, UID, offset) triple in submission
/// order.
#[test]
fn vertex_buffer_binds_are_cached() {
    let mut c = ctx();
    let pipeline = make_pipeline(&mut c, &PipelineStates::default());
    let b1 = vertex_buffer(&mut c, 1024);
    let b2 = vertex_buffer(&mut c, 1024);

    let mut cmd = CommandBuffer::new(&c.gl, &c.device, &mut c.state);
    cmd.bind_pipeline(&pipeline);
    c.gl.clear_calls();

    cmd.bind_vertex_buffer(0, &b1, 0);
    cmd.bind_vertex_buffer(0, &b1, 0); // repeat: no call
    cmd.bind_vertex_buffer(0, &b1, 16); // new offset
    cmd.bind_vertex_buffer(0, &b2, 16); // new buffer
    cmd.bind_vertex_buffer(0, &b1, 16); // back again: the cache holds one entry
    assert_eq!(c.gl.count_calls("vertex_array_vertex_buffer("), 4);

    // multi-bind skips entirely when nothing changed
    cmd.bind_vertex_buffers(0, &[(&b1, 16)]);
    assert_eq!(c.gl.count_calls("vertex_array_vertex_buffer("), 4);
}

/// Index buffer binds are cached per VAO by buffer UID.
#[test]
fn index_buffer_bind_is_cached() {
    let mut c = ctx();
    let pipeline = make_pipeline(&mut c, &PipelineStates::default());
    let ib = vertex_buffer(&mut c, 1024);

    let mut cmd = CommandBuffer::new(&c.gl, &c.device, &mut c.state);
    cmd.bind_pipeline(&pipeline);
    c.gl.clear_calls();

    cmd.bind_index_buffer(&ib, IndexType::U16, 0);
    cmd.bind_index_buffer(&ib, IndexType::U16, 64);
    assert_eq!(c.gl.count_calls("vertex_array_element_buffer("), 1);

    // the offset still reaches the draw
    cmd.draw_indexed(6, 1, 2, 0, 0);
    assert_eq!(
        c.gl.calls_with_prefix("draw_elements("),
        vec!["draw_elements(TriangleList, 6, U16, 68)".to_string()]
    );
}

/// The Alpha preset reaches the backend as the collapsed (non-separate)
/// blend calls.
#[test]
fn alpha_preset_blend_state() {
    let mut c = ctx();
    let states = PipelineStates {
        blending: BlendingStateInfo::from_preset(BlendingPreset::Alpha),
        ..Default::default()
    };
    let pipeline = make_pipeline(&mut c, &states);
    let mut cmd = CommandBuffer::new(&c.gl, &c.device, &mut c.state);
    c.gl.clear_calls();
    cmd.bind_pipeline(&pipeline);

    assert_eq!(c.gl.count_calls("enable(Blend)"), 1);
    assert_eq!(
        c.gl.calls_with_prefix("blend_func("),
        vec!["blend_func(SrcAlpha, OneMinusSrcAlpha)".to_string()]
    );
    assert_eq!(
        c.gl.calls_with_prefix("blend_equation("),
        vec!["blend_equation(Add)".to_string()]
    );
    // rgb == alpha, so no separate variants
    assert_eq!(c.gl.count_calls("blend_func_separate("), 0);
}

/// Pipelines sharing a hash-consed state triple emit no fixed-function
/// traffic when swapped.
#[test]
fn shared_state_triple_is_not_reapplied() {
    let mut c = ctx();
    let states = PipelineStates::default();
    let p1 = make_pipeline(&mut c, &states);
    let p2 = make_pipeline(&mut c, &states);

    let mut cmd = CommandBuffer::new(&c.gl, &c.device, &mut c.state);
    cmd.bind_pipeline(&p1);
    c.gl.clear_calls();
    cmd.bind_pipeline(&p2);

    // program pipeline changes; blend/raster/depth-stencil do not
    assert_eq!(c.gl.count_calls("bind_program_pipeline("), 1);
    assert_eq!(c.gl.count_calls("blend_"), 0);
    assert_eq!(c.gl.count_calls("depth_func("), 0);
    assert_eq!(c.gl.count_calls("cull_face("), 0);
}

/// Matching front/back stencil configurations collapse into single
/// front-and-back calls.
#[test]
fn stencil_state_collapses_faces() {
    let mut c = ctx();
    let face = StencilFaceInfo {
        fail_op: StencilOp::Keep,
        depth_fail_op: StencilOp::IncrementAndClamp,
        pass_op: StencilOp::Replace,
        func: CompareFunc::GreaterEqual,
    };
    let states = PipelineStates {
        depth_stencil: DepthStencilStateInfo {
            stencil_test: true,
            front: face,
            back: face,
            ..Default::default()
        },
        ..Default::default()
    };
    let pipeline = make_pipeline(&mut c, &states);
    let mut cmd = CommandBuffer::new(&c.gl, &c.device, &mut c.state);
    c.gl.clear_calls();
    cmd.bind_pipeline(&pipeline);

    assert_eq!(c.gl.count_calls("enable(StencilTest)"), 1);
    assert_eq!(
        c.gl.calls_with_prefix("stencil_func_separate("),
        vec!["stencil_func_separate(FrontAndBack, GreaterEqual, 0, 0xffffffff)".to_string()]
    );
    assert_eq!(
        c.gl.calls_with_prefix("stencil_op_separate("),
        vec!["stencil_op_separate(FrontAndBack, Keep, IncrementAndClamp, Replace)".to_string()]
    );
}

/// Texture bindings are cached per slot; ranged buffer bindings bypass the
/// cache.
#[test]
fn shader_resource_binding_cache() {
    let mut c = ctx();
    let pipeline = make_pipeline(&mut c, &PipelineStates::default());
    let tex = Texture::storage(
        &c.gl,
        &mut c.device,
        TextureDesc::tex_2d(Format::Rgba8, 32, 32),
    )
    .unwrap();
    let ubo = vertex_buffer(&mut c, 4096);

    let mut cmd = CommandBuffer::new(&c.gl, &c.device, &mut c.state);
    cmd.bind_pipeline(&pipeline);
    c.gl.clear_calls();

    let resources = ShaderResources {
        textures: &[TextureBinding {
            slot: 0,
            texture: &tex,
        }],
        buffers: &[ignis_render_gl::BufferBinding {
            slot: 0,
            target: ignis_render_gl::api::IndexedBufferTarget::Uniform,
            buffer: &ubo,
            range: Some((0, 256)),
        }],
        ..Default::default()
    };
    cmd.bind_shader_resources(&resources);
    cmd.bind_shader_resources(&resources);

    assert_eq!(c.gl.count_calls("bind_texture_unit("), 1);
    // the size of a ranged bind may change even when the handle matches
    assert_eq!(c.gl.count_calls("bind_buffer_range("), 2);
}

/// Draws dispatch to the entry point matching their parameters.
#[test]
fn draw_dispatch_variants() {
    let mut c = ctx();
    let pipeline = make_pipeline(&mut c, &PipelineStates::default());
    let indirect = vertex_buffer(&mut c, 4096);

    let mut cmd = CommandBuffer::new(&c.gl, &c.device, &mut c.state);
    cmd.bind_pipeline(&pipeline);
    c.gl.clear_calls();

    cmd.draw(3, 1, 0, 0);
    cmd.draw(3, 4, 0, 0);
    cmd.draw(3, 4, 0, 2);
    assert_eq!(c.gl.count_calls("draw_arrays(TriangleList, 0, 3)"), 1);
    assert_eq!(c.gl.count_calls("draw_arrays_instanced(TriangleList, 0, 3, 4)"), 1);
    assert_eq!(
        c.gl.count_calls("draw_arrays_instanced_base_instance(TriangleList, 0, 3, 4, 2)"),
        1
    );

    cmd.draw_indirect(&indirect, 0, 1, 0);
    cmd.draw_indirect(&indirect, 64, 8, 16);
    // one cached bind of the indirect buffer for both draws
    assert_eq!(c.gl.count_calls("bind_buffer(DrawIndirect"), 1);
    assert_eq!(c.gl.count_calls("draw_arrays_indirect("), 1);
    assert_eq!(
        c.gl.count_calls("multi_draw_arrays_indirect(TriangleList, 64, 8, 16)"),
        1
    );
}

/// A draw without a pipeline is dropped, not a panic.
#[test]
fn draw_without_pipeline_is_skipped() {
    let mut c = ctx();
    let mut cmd = CommandBuffer::new(&c.gl, &c.device, &mut c.state);
    cmd.draw(3, 1, 0, 0);
    assert_eq!(c.gl.count_calls("draw_arrays"), 0);
}
