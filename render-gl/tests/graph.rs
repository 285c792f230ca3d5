//! Frame graph scheduling tests: culling, capture, aliasing, the
//! framebuffer cache and conditional execution.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::ctx;
use ignis_render::{Format, LoadOp, TextureDesc};
use ignis_render_gl::graph::TextureAttachment;
use ignis_render_gl::{FrameGraph, ResourceAccess, Texture};

fn small_target() -> TextureDesc {
    TextureDesc::tex_2d(Format::Rgba8, 64, 64)
}

/// A → B → C where nothing reads the final product: the whole chain is
/// dead and the timeline comes out empty.
#[test]
fn cull_chain_without_consumers() {
    let mut c = ctx();
    let mut fg = FrameGraph::new();
    let runs = Rc::new(Cell::new(0u32));

    let r1;
    let a = {
        let mut t = fg.add_custom_task("A");
        r1 = t.add_new_resource("R1", small_target());
        let runs = runs.clone();
        t.set_record(move |_, _| runs.set(runs.get() + 1));
        t.finish()
    };
    let r2;
    let b = {
        let mut t = fg.add_custom_task("B");
        r2 = t.add_new_resource("R2", small_target());
        t.add_resource(r1, ResourceAccess::Read);
        let runs = runs.clone();
        t.set_record(move |_, _| runs.set(runs.get() + 1));
        t.finish()
    };
    let c_task = {
        let mut t = fg.add_custom_task("C");
        let _r3 = t.add_new_resource("R3", small_target());
        t.add_resource(r2, ResourceAccess::Read);
        let runs = runs.clone();
        t.set_record(move |_, _| runs.set(runs.get() + 1));
        t.finish()
    };

    fg.build(&c.gl, &mut c.device, &mut c.state).unwrap();

    assert_eq!(fg.task_ref_count(a), 0);
    assert_eq!(fg.task_ref_count(b), 0);
    assert_eq!(fg.task_ref_count(c_task), 0);
    assert!(fg.is_task_culled(a));
    assert!(fg.is_task_culled(b));
    assert!(fg.is_task_culled(c_task));
    assert!(fg.timeline_names().is_empty());
    // nothing was realized for dead work
    assert_eq!(fg.pool_stats(), (0, 0));

    fg.execute(&c.gl, &c.device, &mut c.state);
    assert_eq!(runs.get(), 0);
}

/// The same chain with the final product captured: everything executes,
/// intermediates are derealized at their last consumer, and the captured
/// resource survives until `clear`.
#[test]
fn capture_keeps_the_chain_alive() {
    let mut c = ctx();
    let mut fg = FrameGraph::new();
    let runs = Rc::new(Cell::new(0u32));

    let r1;
    let a = {
        let mut t = fg.add_custom_task("A");
        r1 = t.add_new_resource("R1", small_target());
        let runs = runs.clone();
        t.set_record(move |_, _| runs.set(runs.get() + 1));
        t.finish()
    };
    let r2;
    let b = {
        let mut t = fg.add_custom_task("B");
        r2 = t.add_new_resource("R2", small_target());
        t.add_resource(r1, ResourceAccess::Read);
        let runs = runs.clone();
        t.set_record(move |_, _| runs.set(runs.get() + 1));
        t.finish()
    };
    let r3;
    let c_task = {
        let mut t = fg.add_custom_task("C");
        r3 = t.add_new_resource("R3", small_target());
        t.add_resource(r2, ResourceAccess::Read);
        let runs = runs.clone();
        t.set_record(move |_, _| runs.set(runs.get() + 1));
        t.finish()
    };
    fg.set_captured(r3, true);

    fg.build(&c.gl, &mut c.device, &mut c.state).unwrap();

    assert_eq!(fg.task_ref_count(a), 1);
    assert_eq!(fg.task_ref_count(b), 1);
    assert_eq!(fg.task_ref_count(c_task), 1);
    assert_eq!(fg.timeline_names(), vec!["A", "B", "C"]);

    // R1 was freed at B, so C's product aliased its storage: two physical
    // textures back three logical resources
    let (total, free) = fg.pool_stats();
    assert_eq!(total, 2);
    assert_eq!(free, 1);

    fg.execute(&c.gl, &c.device, &mut c.state);
    assert_eq!(runs.get(), 3);

    // the captured resource is still resolvable after the frame
    assert!(fg.resources().texture(r3).is_some());

    fg.clear(&mut c.state);
    let (total, free) = fg.pool_stats();
    assert_eq!(total, free);
}

/// Two passes writing the same attachment identity resolve to one cached
/// framebuffer.
#[test]
fn framebuffer_cache_shares_by_attachment_identity() {
    let mut c = ctx();
    let target = Texture::storage(
        &c.gl,
        &mut c.device,
        TextureDesc::tex_2d(Format::Rgba8, 128, 128),
    )
    .unwrap();

    let mut fg = FrameGraph::new();
    let ext = fg.add_external_texture("target", &target);

    let a = {
        let mut t = fg.add_render_pass("A");
        t.set_color_attachments(&[TextureAttachment::new(ext, LoadOp::Clear)])
            .add_subpass(&[0], |_, _, _| {});
        t.finish()
    };
    let b = {
        let mut t = fg.add_render_pass("B");
        t.set_color_attachments(&[TextureAttachment::new(ext, LoadOp::Load)])
            .add_subpass(&[0], |_, _, _| {});
        t.finish()
    };

    fg.build(&c.gl, &mut c.device, &mut c.state).unwrap();

    let fb_a = fg.pass_framebuffer(a).expect("pass A has a framebuffer");
    let fb_b = fg.pass_framebuffer(b).expect("pass B has a framebuffer");
    assert!(std::ptr::eq(fb_a, fb_b));
    assert_eq!(c.gl.count_calls("create_framebuffer()"), 1);

    // external resources are never pooled
    assert_eq!(fg.pool_stats(), (0, 0));
}

/// A false condition skips execution without retracting realizations.
#[test]
fn condition_skips_at_execute_time() {
    let mut c = ctx();
    let mut fg = FrameGraph::new();
    let runs = Rc::new(Cell::new(0u32));

    let out;
    {
        let mut t = fg.add_render_pass("conditional");
        out = t.add_new_color_attachment("out", small_target(), LoadOp::Clear);
        let runs_in_pass = runs.clone();
        t.add_subpass(&[0], move |_, _, _| {
            runs_in_pass.set(runs_in_pass.get() + 1)
        });
        t.set_condition(|| false);
        t.finish();
    }
    fg.set_captured(out, true);

    fg.build(&c.gl, &mut c.device, &mut c.state).unwrap();
    assert_eq!(fg.timeline_names(), vec!["conditional"]);
    assert_eq!(fg.pool_stats().0, 1);

    fg.execute(&c.gl, &c.device, &mut c.state);
    assert_eq!(runs.get(), 0);
}

/// Pass execution begins the pass, scopes the viewport to the render area
/// and runs each subpass.
#[test]
fn pass_execution_drives_the_recorder() {
    let mut c = ctx();
    let mut fg = FrameGraph::new();
    let subpasses = Rc::new(Cell::new(0u32));

    let out;
    {
        let mut t = fg.add_render_pass("draw");
        out = t.add_new_color_attachment("out", small_target(), LoadOp::Clear);
        t.set_render_area(ignis_render::Rect2D::new(0, 0, 64, 64));
        let counter = subpasses.clone();
        t.add_subpass(&[0], move |_, ctx, index| {
            assert_eq!(index, 0);
            assert!(ctx.framebuffer.is_some());
            counter.set(counter.get() + 1);
        });
        let counter = subpasses.clone();
        t.add_subpass(&[0], move |_, _, index| {
            assert_eq!(index, 1);
            counter.set(counter.get() + 1);
        });
        t.finish();
    }
    fg.set_captured(out, true);

    fg.build(&c.gl, &mut c.device, &mut c.state).unwrap();
    c.gl.clear_calls();
    fg.execute(&c.gl, &c.device, &mut c.state);

    assert_eq!(subpasses.get(), 2);
    assert_eq!(c.gl.count_calls("viewport(0, 0, 64, 64)"), 1);
    // one clear for the load-op, none for the second subpass
    assert_eq!(c.gl.count_calls("clear_named_framebuffer_color("), 1);
    // draw buffers rebound at begin and at the subpass switch
    assert_eq!(c.gl.count_calls("named_framebuffer_draw_buffers("), 2);
}

#[test]
fn graphviz_export_lists_nodes_and_edges() {
    let mut c = ctx();
    let mut fg = FrameGraph::new();

    let r1;
    {
        let mut t = fg.add_custom_task("producer");
        r1 = t.add_new_resource("intermediate", small_target());
        t.finish();
    }
    {
        let mut t = fg.add_custom_task("consumer");
        t.add_resource(r1, ResourceAccess::Read);
        t.finish();
    }
    fg.set_captured(r1, true);
    fg.build(&c.gl, &mut c.device, &mut c.state).unwrap();

    let mut out = Vec::new();
    fg.export_graphviz(&mut out).unwrap();
    let dot = String::from_utf8(out).unwrap();
    assert!(dot.starts_with("digraph framegraph"));
    assert!(dot.contains("\"producer\""));
    assert!(dot.contains("\"intermediate\""));
    assert!(dot.contains("fillcolor=yellow"));
    assert!(dot.contains("[color=seagreen]"));
    assert!(dot.contains("[color=skyblue]"));
}

/// Dead intermediates feeding a live chain are still culled when only the
/// captured branch survives.
#[test]
fn side_branch_is_culled_independently() {
    let mut c = ctx();
    let mut fg = FrameGraph::new();

    let main_out;
    {
        let mut t = fg.add_custom_task("main");
        main_out = t.add_new_resource("main_out", small_target());
        t.finish();
    }
    let dead;
    let side = {
        let mut t = fg.add_custom_task("side");
        dead = t.add_new_resource("side_out", small_target());
        t.finish()
    };
    fg.set_captured(main_out, true);

    fg.build(&c.gl, &mut c.device, &mut c.state).unwrap();

    assert!(fg.is_task_culled(side));
    assert_eq!(fg.resource_ref_count(dead), 0);
    assert_eq!(fg.timeline_names(), vec!["main"]);
}
