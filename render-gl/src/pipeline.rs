//! Graphics and compute pipelines.

use log::error;
use smallvec::SmallVec;

use ignis_render::{
    BlendingStateInfo, ComponentType, DepthStencilStateInfo, Error, PrimitiveTopology,
    RasterizerStateInfo, Result, ShaderStage, VertexAttribInfo, VertexBindingInfo,
};

use crate::api::{GlApi, ProgramPipelineObj};
use crate::device::{BlendingStateId, DepthStencilStateId, Device, RasterizerStateId};
use crate::renderpass::RenderPass;
use crate::shader::ShaderModule;
use crate::state::{State, VaoIndex};

pub struct PipelineCreateInfo<'a> {
    pub shaders: &'a [&'a ShaderModule],
    pub blending: &'a BlendingStateInfo,
    pub rasterizer: &'a RasterizerStateInfo,
    pub depth_stencil: &'a DepthStencilStateInfo,
    pub vertex_bindings: &'a [VertexBindingInfo],
    pub vertex_attribs: &'a [VertexAttribInfo],
    pub topology: PrimitiveTopology,
    /// Patch size; only meaningful with [`PrimitiveTopology::Patches`].
    pub num_patch_vertices: u32,
    pub primitive_restart: bool,
    /// The pass and subpass this pipeline will draw in; kept by UID for
    /// validation, never dereferenced.
    pub render_pass: Option<(&'a RenderPass, u32)>,
}

/// A bound-together program pipeline, vertex layout and fixed-function
/// state triple. The triple is interned at the device, the vertex layout at
/// the state's VAO cache, so binding one pipeline after another usually
/// reduces to a handful of backend calls.
pub struct Pipeline {
    pub(crate) uid: u32,
    pub(crate) obj: ProgramPipelineObj,
    pub(crate) blending: BlendingStateId,
    pub(crate) rasterizer: RasterizerStateId,
    pub(crate) depth_stencil: DepthStencilStateId,
    pub(crate) vao: VaoIndex,
    pub(crate) topology: PrimitiveTopology,
    pub(crate) num_patch_vertices: u32,
    pub(crate) primitive_restart: bool,
    pub(crate) render_pass_uid: Option<u32>,
    pub(crate) subpass: u32,
}

impl Pipeline {
    pub fn new(
        gl: &dyn GlApi,
        device: &mut Device,
        state: &mut State,
        info: &PipelineCreateInfo,
    ) -> Result<Pipeline> {
        if info.topology == PrimitiveTopology::Patches && info.num_patch_vertices == 0 {
            error!("patch topology without a patch size");
            return Err(Error::InvalidArgument(
                "patch topology needs num_patch_vertices",
            ));
        }
        if !device.caps().half_float_vertex {
            let uses_half = info
                .vertex_attribs
                .iter()
                .any(|a| a.data_type.info().component == ComponentType::F16);
            if uses_half {
                return Err(Error::NotAvailable("half-float vertex attributes"));
            }
        }
        let mut stages: SmallVec<[ShaderStage; 6]> = SmallVec::new();
        for shader in info.shaders {
            if stages.contains(&shader.stage()) {
                return Err(Error::InvalidArgument("duplicate shader stage"));
            }
            stages.push(shader.stage());
        }

        let vao = state.cached_vao(gl, info.vertex_bindings, info.vertex_attribs)?;

        let obj = gl.create_program_pipeline();
        for shader in info.shaders {
            gl.use_program_stages(obj, shader.stage(), shader.obj);
        }

        let pipeline = Pipeline {
            uid: device.gen_uid(),
            obj,
            blending: device.cache_blending_state(info.blending),
            rasterizer: device.cache_rasterizer_state(info.rasterizer),
            depth_stencil: device.cache_depth_stencil_state(info.depth_stencil),
            vao,
            topology: info.topology,
            num_patch_vertices: info.num_patch_vertices,
            primitive_restart: info.primitive_restart,
            render_pass_uid: info.render_pass.map(|(rp, _)| rp.uid()),
            subpass: info.render_pass.map_or(0, |(_, subpass)| subpass),
        };
        state.total_pipelines += 1;
        Ok(pipeline)
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn destroy(self, gl: &dyn GlApi, state: &mut State) {
        gl.delete_program_pipeline(self.obj);
        state.total_pipelines -= 1;
    }
}
