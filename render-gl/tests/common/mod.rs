//! Shared scaffolding for the integration tests: a trace backend with a
//! device and state, plus a minimal graphics pipeline.
#![allow(dead_code)]

use ignis_render::*;
use ignis_render_gl::state::{State, StateCreateInfo, ViewportOrigin};
use ignis_render_gl::trace::TraceGl;
use ignis_render_gl::{Device, Pipeline, PipelineCreateInfo, ShaderModule};

pub struct TestContext {
    pub gl: TraceGl,
    pub device: Device,
    pub state: State,
}

pub fn ctx() -> TestContext {
    ctx_with_origin(ViewportOrigin::BottomLeft)
}

pub fn ctx_top_left() -> TestContext {
    ctx_with_origin(ViewportOrigin::TopLeft)
}

fn ctx_with_origin(viewport_origin: ViewportOrigin) -> TestContext {
    let gl = TraceGl::new();
    let mut device = Device::new(&gl);
    let mut state = State::new(
        &gl,
        &mut device,
        StateCreateInfo {
            viewport_origin,
            ..Default::default()
        },
    );
    state.set_swapchain_resolution(800, 600);
    gl.clear_calls();
    TestContext { gl, device, state }
}

pub const VS: &str = "#version 450 core\nvoid main() { gl_Position = vec4(0.0); }\n";
pub const FS: &str = "#version 450 core\nout vec4 color;\nvoid main() { color = vec4(1.0); }\n";

pub struct PipelineStates {
    pub blending: BlendingStateInfo,
    pub rasterizer: RasterizerStateInfo,
    pub depth_stencil: DepthStencilStateInfo,
}

impl Default for PipelineStates {
    fn default() -> Self {
        PipelineStates {
            blending: BlendingStateInfo::default(),
            rasterizer: RasterizerStateInfo::default(),
            depth_stencil: DepthStencilStateInfo::default(),
        }
    }
}

pub fn make_pipeline(c: &mut TestContext, states: &PipelineStates) -> Pipeline {
    let vs = ShaderModule::from_source(&c.gl, &mut c.device, ShaderStage::Vertex, &[VS]).unwrap();
    let fs = ShaderModule::from_source(&c.gl, &mut c.device, ShaderStage::Fragment, &[FS]).unwrap();
    let bindings = [VertexBindingInfo {
        binding: 0,
        stride: 16,
        input_rate: InputRate::PerVertex,
    }];
    let attribs = [VertexAttribInfo {
        location: 0,
        binding: 0,
        data_type: BufferDataType::Float4,
        offset: 0,
    }];
    Pipeline::new(
        &c.gl,
        &mut c.device,
        &mut c.state,
        &PipelineCreateInfo {
            shaders: &[&vs, &fs],
            blending: &states.blending,
            rasterizer: &states.rasterizer,
            depth_stencil: &states.depth_stencil,
            vertex_bindings: &bindings,
            vertex_attribs: &attribs,
            topology: PrimitiveTopology::TriangleList,
            num_patch_vertices: 0,
            primitive_restart: false,
            render_pass: None,
        },
    )
    .unwrap()
}
