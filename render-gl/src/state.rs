//! Per-context GPU state.
//!
//! A [`State`] mirrors what the driver currently has bound and applied, so
//! the command recorder can translate every request into the minimum set of
//! backend calls. Creating a `State` applies the documented context
//! defaults; afterwards the struct is only mutated through the cached
//! setters below, which keeps the mirror honest.
//!
//! Exactly one state is current per thread. Public entry points all take
//! the state explicitly; the thread-local here only remembers *which* state
//! was made current, for cross-checking.

use std::cell::Cell;

use fxhash::FxHashMap;
use log::error;
use ordered_float::NotNan;
use smallvec::SmallVec;

use ignis_render::{
    BlendFunc, BlendOp, BlendingStateInfo, CompareFunc, CullMode, DepthStencilStateInfo, Error,
    FrontFace, IndexType, InputRate, LogicOp, RasterizerStateInfo, Rect2D, Result,
    VertexAttribInfo, VertexBindingInfo, MAX_BUFFER_SLOTS, MAX_COLOR_ATTACHMENTS, MAX_IMAGE_SLOTS,
    MAX_SAMPLER_SLOTS, MAX_VERTEX_ATTRIBS, MAX_VERTEX_BINDINGS,
};

use crate::api::{
    Capability, ClipDepth, ClipOrigin, ColorClamp, CullFace, DeviceCaps, FramebufferObj, GlApi,
    HintMode, HintTarget, IndexedBufferTarget, ProgramPipelineObj, SamplerObj, StencilFace,
    VertexArrayObj,
};
use crate::device::{BlendingStateId, DepthStencilStateId, Device, RasterizerStateId};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ClipControl {
    /// Lower-left origin, -1..1 clip-space Z.
    OpenGl,
    /// Upper-left origin, 0..1 clip-space Z.
    DirectX,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ViewportOrigin {
    TopLeft,
    BottomLeft,
}

#[derive(Copy, Clone, Debug)]
pub struct StateCreateInfo {
    pub clip_control: ClipControl,
    pub viewport_origin: ViewportOrigin,
}

impl Default for StateCreateInfo {
    fn default() -> Self {
        StateCreateInfo {
            clip_control: ClipControl::OpenGl,
            viewport_origin: ViewportOrigin::BottomLeft,
        }
    }
}

/// Index of a cached vertex array object in a `State`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct VaoIndex(pub(crate) u32);

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct VaoKey {
    bindings: SmallVec<[VertexBindingInfo; MAX_VERTEX_BINDINGS]>,
    attribs: SmallVec<[VertexAttribInfo; MAX_VERTEX_ATTRIBS]>,
}

/// A programmed VAO plus the per-slot vertex buffer bindings last seen by
/// the driver, keyed by buffer UID and offset.
pub(crate) struct VertexArrayObject {
    pub(crate) obj: VertexArrayObj,
    pub(crate) strides: [u32; MAX_VERTEX_BINDINGS],
    pub(crate) vertex_buffers: [Option<(u32, usize)>; MAX_VERTEX_BINDINGS],
    pub(crate) index_buffer_uid: Option<u32>,
}

/// The render pass currently being recorded.
pub(crate) struct CurrentRenderPass {
    pub(crate) pass_uid: u32,
    pub(crate) framebuffer: FramebufferObj,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) subpass: u32,
    /// Color attachment indices per subpass.
    pub(crate) subpass_refs: SmallVec<[SmallVec<[u32; MAX_COLOR_ATTACHMENTS]>; 4]>,
    pub(crate) render_area: Rect2D,
}

thread_local! {
    static CURRENT_STATE: Cell<Option<u32>> = Cell::new(None);
}

/// Registers `state` as the thread's current context state.
pub fn make_current(state: &State) {
    CURRENT_STATE.with(|c| c.set(Some(state.uid)));
}

/// UID of the state registered on this thread, if any.
pub fn current_state_uid() -> Option<u32> {
    CURRENT_STATE.with(|c| c.get())
}

pub struct State {
    uid: u32,
    clip_control: ClipControl,
    viewport_origin: ViewportOrigin,
    pub(crate) caps: DeviceCaps,

    // current objects
    pub(crate) current_pipeline_uid: Option<u32>,
    pub(crate) current_vao: Option<VaoIndex>,
    bound_vao_obj: Option<VertexArrayObj>,
    bound_program_pipeline: Option<ProgramPipelineObj>,
    pub(crate) draw_framebuffer: Option<FramebufferObj>,
    pub(crate) read_framebuffer: Option<FramebufferObj>,
    pub(crate) render_pass: Option<CurrentRenderPass>,

    // last-applied fixed-function block
    pub(crate) blend_id: Option<BlendingStateId>,
    pub(crate) blend: BlendingStateInfo,
    pub(crate) raster_id: Option<RasterizerStateId>,
    pub(crate) raster: RasterizerStateInfo,
    polygon_offset_enabled: bool,
    pub(crate) depth_stencil_id: Option<DepthStencilStateId>,
    pub(crate) depth_stencil: DepthStencilStateInfo,
    pub(crate) stencil_ref: i32,
    pub(crate) primitive_restart: bool,
    pub(crate) num_patch_vertices: u32,
    pub(crate) current_topology: Option<ignis_render::PrimitiveTopology>,

    // binding tables
    buffer_bindings: [Option<(IndexedBufferTarget, u32)>; MAX_BUFFER_SLOTS],
    texture_bindings: [Option<u32>; MAX_SAMPLER_SLOTS],
    sampler_bindings: [Option<SamplerObj>; MAX_SAMPLER_SLOTS],
    image_bindings: [Option<u32>; MAX_IMAGE_SLOTS],
    pub(crate) draw_indirect_buffer_uid: Option<u32>,
    pub(crate) dispatch_indirect_buffer_uid: Option<u32>,

    // index source of the current VAO
    pub(crate) index_type: Option<IndexType>,
    pub(crate) index_offset: usize,

    // pixel transfer
    pack_alignment: u32,
    unpack_alignment: u32,
    color_clamp: ColorClamp,

    // viewport & scissor
    pub(crate) current_viewport: Option<(i32, i32, i32, i32)>,
    /// Last indexed viewport range written, `(first, entries)`.
    pub(crate) viewport_array: Option<(u32, Vec<[NotNan<f32>; 4]>)>,
    pub(crate) current_scissor: Rect2D,

    swapchain_width: u32,
    swapchain_height: u32,

    // VAO cache
    vaos: Vec<VertexArrayObject>,
    vao_lookup: FxHashMap<VaoKey, VaoIndex>,

    // live-object counters
    pub(crate) total_pipelines: u32,
    pub(crate) total_render_passes: u32,
    pub(crate) total_framebuffers: u32,
    pub(crate) total_transform_feedbacks: u32,
    pub(crate) total_query_pools: u32,
}

impl State {
    /// Creates the state mirror and applies the context defaults.
    pub fn new(gl: &dyn GlApi, device: &mut Device, info: StateCreateInfo) -> State {
        let caps = *device.caps();

        // hints and pixel store
        gl.hint(HintTarget::LineSmooth, HintMode::Nicest);
        gl.hint(HintTarget::PolygonSmooth, HintMode::Nicest);
        gl.hint(HintTarget::TextureCompression, HintMode::Nicest);
        gl.hint(HintTarget::FragmentShaderDerivative, HintMode::Nicest);
        gl.enable(Capability::TextureCubeMapSeamless);
        gl.pixel_store_pack_alignment(4);
        gl.pixel_store_unpack_alignment(4);

        // blending defaults
        gl.disable(Capability::Blend);
        gl.color_mask(true, true, true, true);
        gl.blend_func(BlendFunc::One, BlendFunc::Zero);
        gl.blend_equation(BlendOp::Add);
        gl.blend_color([0.0; 4]);
        gl.disable(Capability::ColorLogicOp);
        gl.logic_op(LogicOp::Copy);
        gl.disable(Capability::SampleAlphaToCoverage);
        gl.sample_mask(0, !0);
        gl.disable(Capability::SampleMask);

        // rasterizer defaults
        gl.enable(Capability::CullFace);
        gl.cull_face(CullFace::Back);
        gl.front_face(FrontFace::CounterClockwise);
        gl.polygon_mode(ignis_render::FillMode::Solid);
        gl.disable(Capability::ScissorTest);
        gl.disable(Capability::Multisample);
        gl.disable(Capability::RasterizerDiscard);
        gl.disable(Capability::LineSmooth);
        gl.disable(Capability::DepthClamp);
        gl.disable(Capability::PolygonOffset);
        gl.disable(Capability::PrimitiveRestartFixedIndex);

        // depth-stencil defaults
        gl.enable(Capability::DepthTest);
        gl.depth_mask(true);
        gl.depth_func(CompareFunc::Less);
        gl.disable(Capability::StencilTest);
        gl.stencil_mask_separate(StencilFace::FrontAndBack, !0);
        gl.stencil_op_separate(
            StencilFace::FrontAndBack,
            ignis_render::StencilOp::Keep,
            ignis_render::StencilOp::Keep,
            ignis_render::StencilOp::Keep,
        );
        gl.stencil_func_separate(StencilFace::FrontAndBack, CompareFunc::Always, 0, !0);

        gl.clamp_read_color(ColorClamp::Off);

        match info.clip_control {
            ClipControl::OpenGl => {
                gl.clip_control(ClipOrigin::LowerLeft, ClipDepth::NegativeOneToOne)
            }
            ClipControl::DirectX => gl.clip_control(ClipOrigin::UpperLeft, ClipDepth::ZeroToOne),
        }

        State {
            uid: device.gen_uid(),
            clip_control: info.clip_control,
            viewport_origin: info.viewport_origin,
            caps,
            current_pipeline_uid: None,
            current_vao: None,
            bound_vao_obj: None,
            bound_program_pipeline: None,
            draw_framebuffer: None,
            read_framebuffer: None,
            render_pass: None,
            blend_id: None,
            blend: BlendingStateInfo::default(),
            raster_id: None,
            raster: RasterizerStateInfo::default(),
            polygon_offset_enabled: false,
            depth_stencil_id: None,
            depth_stencil: DepthStencilStateInfo::default(),
            stencil_ref: 0,
            primitive_restart: false,
            num_patch_vertices: 0,
            current_topology: None,
            buffer_bindings: [None; MAX_BUFFER_SLOTS],
            texture_bindings: [None; MAX_SAMPLER_SLOTS],
            sampler_bindings: [None; MAX_SAMPLER_SLOTS],
            image_bindings: [None; MAX_IMAGE_SLOTS],
            draw_indirect_buffer_uid: None,
            dispatch_indirect_buffer_uid: None,
            index_type: None,
            index_offset: 0,
            pack_alignment: 4,
            unpack_alignment: 4,
            color_clamp: ColorClamp::Off,
            current_viewport: None,
            viewport_array: None,
            current_scissor: Rect2D::default(),
            swapchain_width: 0,
            swapchain_height: 0,
            vaos: Vec::new(),
            vao_lookup: FxHashMap::default(),
            total_pipelines: 0,
            total_render_passes: 0,
            total_framebuffers: 0,
            total_transform_feedbacks: 0,
            total_query_pools: 0,
        }
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn clip_control(&self) -> ClipControl {
        self.clip_control
    }

    pub fn viewport_origin(&self) -> ViewportOrigin {
        self.viewport_origin
    }

    pub fn set_swapchain_resolution(&mut self, width: u32, height: u32) {
        self.swapchain_width = width;
        self.swapchain_height = height;
    }

    pub fn swapchain_resolution(&self) -> (u32, u32) {
        (self.swapchain_width, self.swapchain_height)
    }

    /// Height of the surface draws currently target, for Y flips.
    pub(crate) fn target_height(&self) -> u32 {
        match &self.render_pass {
            Some(rp) => rp.height,
            None => self.swapchain_height,
        }
    }

    pub fn total_pipelines(&self) -> u32 {
        self.total_pipelines
    }

    pub fn total_render_passes(&self) -> u32 {
        self.total_render_passes
    }

    pub fn total_framebuffers(&self) -> u32 {
        self.total_framebuffers
    }

    pub fn total_transform_feedbacks(&self) -> u32 {
        self.total_transform_feedbacks
    }

    pub fn total_query_pools(&self) -> u32 {
        self.total_query_pools
    }

    pub fn total_vaos(&self) -> usize {
        self.vaos.len()
    }

    // ---- cached object binds ------------------------------------------

    pub(crate) fn bind_program_pipeline(&mut self, gl: &dyn GlApi, obj: ProgramPipelineObj) {
        if self.bound_program_pipeline != Some(obj) {
            gl.bind_program_pipeline(obj);
            self.bound_program_pipeline = Some(obj);
        }
    }

    pub(crate) fn bind_vao(&mut self, gl: &dyn GlApi, index: VaoIndex) {
        let obj = self.vaos[index.0 as usize].obj;
        if self.bound_vao_obj != Some(obj) {
            gl.bind_vertex_array(obj);
            self.bound_vao_obj = Some(obj);
        }
        self.current_vao = Some(index);
    }

    pub(crate) fn bind_draw_framebuffer(&mut self, gl: &dyn GlApi, fb: FramebufferObj) {
        if self.draw_framebuffer != Some(fb) {
            gl.bind_framebuffer(crate::api::FramebufferTarget::Draw, fb);
            self.draw_framebuffer = Some(fb);
        }
    }

    pub(crate) fn bind_read_framebuffer(&mut self, gl: &dyn GlApi, fb: FramebufferObj) {
        if self.read_framebuffer != Some(fb) {
            gl.bind_framebuffer(crate::api::FramebufferTarget::Read, fb);
            self.read_framebuffer = Some(fb);
        }
    }

    pub fn set_pack_alignment(&mut self, gl: &dyn GlApi, alignment: u32) {
        if self.pack_alignment != alignment {
            gl.pixel_store_pack_alignment(alignment);
            self.pack_alignment = alignment;
        }
    }

    pub fn set_unpack_alignment(&mut self, gl: &dyn GlApi, alignment: u32) {
        if self.unpack_alignment != alignment {
            gl.pixel_store_unpack_alignment(alignment);
            self.unpack_alignment = alignment;
        }
    }

    pub fn set_clamp_read_color(&mut self, gl: &dyn GlApi, clamp: ColorClamp) {
        if self.color_clamp != clamp {
            gl.clamp_read_color(clamp);
            self.color_clamp = clamp;
        }
    }

    // ---- shader resource binding tables -------------------------------

    pub(crate) fn bind_buffer_slot(
        &mut self,
        gl: &dyn GlApi,
        target: IndexedBufferTarget,
        slot: u32,
        obj: crate::api::BufferObj,
        uid: u32,
        range: Option<(usize, usize)>,
    ) -> Result<()> {
        let index = slot as usize;
        if index >= MAX_BUFFER_SLOTS {
            error!("buffer binding slot {} out of range", slot);
            return Err(Error::InvalidArgument("buffer binding slot out of range"));
        }
        match range {
            // ranged binds bypass the cache: the size may differ even when
            // the handle matches
            Some((offset, size)) => {
                gl.bind_buffer_range(target, slot, obj, offset, size);
                self.buffer_bindings[index] = Some((target, uid));
            }
            None => {
                if self.buffer_bindings[index] != Some((target, uid)) {
                    gl.bind_buffer_base(target, slot, obj);
                    self.buffer_bindings[index] = Some((target, uid));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn bind_texture_slot(
        &mut self,
        gl: &dyn GlApi,
        slot: u32,
        obj: crate::api::TextureObj,
        uid: u32,
    ) -> Result<()> {
        let index = slot as usize;
        if index >= MAX_SAMPLER_SLOTS {
            error!("texture binding slot {} out of range", slot);
            return Err(Error::InvalidArgument("texture binding slot out of range"));
        }
        if self.texture_bindings[index] != Some(uid) {
            gl.bind_texture_unit(slot, obj);
            self.texture_bindings[index] = Some(uid);
        }
        Ok(())
    }

    pub(crate) fn bind_sampler_slot(
        &mut self,
        gl: &dyn GlApi,
        slot: u32,
        sampler: SamplerObj,
    ) -> Result<()> {
        let index = slot as usize;
        if index >= MAX_SAMPLER_SLOTS {
            error!("sampler binding slot {} out of range", slot);
            return Err(Error::InvalidArgument("sampler binding slot out of range"));
        }
        if self.sampler_bindings[index] != Some(sampler) {
            gl.bind_sampler(slot, sampler);
            self.sampler_bindings[index] = Some(sampler);
        }
        Ok(())
    }

    pub(crate) fn image_binding_changed(&mut self, slot: u32, uid: u32) -> Result<bool> {
        let index = slot as usize;
        if index >= MAX_IMAGE_SLOTS {
            error!("image binding slot {} out of range", slot);
            return Err(Error::InvalidArgument("image binding slot out of range"));
        }
        if self.image_bindings[index] == Some(uid) {
            return Ok(false);
        }
        self.image_bindings[index] = Some(uid);
        Ok(true)
    }

    // ---- fixed-function diffs -----------------------------------------

    /// Applies a blending state, emitting only what differs from the
    /// last-applied block.
    pub(crate) fn apply_blending_state(
        &mut self,
        gl: &dyn GlApi,
        id: BlendingStateId,
        info: &BlendingStateInfo,
    ) {
        if self.blend_id == Some(id) {
            return;
        }

        if info.independent {
            let slots = (self.caps.max_draw_buffers as usize).min(MAX_COLOR_ATTACHMENTS);
            for i in 0..slots {
                let new = &info.render_targets[i];
                let old = &self.blend.render_targets[i];
                diff_blend_slot(gl, Some(i as u32), old, new, false);
            }
        } else {
            let new = &info.render_targets[0];
            let old = &self.blend.render_targets[0];
            // when the cached state was independent, per-slot values may
            // diverge from slot 0, so force a full re-apply
            diff_blend_slot(gl, None, old, new, self.blend.independent);
        }

        if info.alpha_to_coverage != self.blend.alpha_to_coverage {
            if info.alpha_to_coverage {
                gl.enable(Capability::SampleAlphaToCoverage);
            } else {
                gl.disable(Capability::SampleAlphaToCoverage);
            }
        }

        let logic_enabled = info.logic_op != LogicOp::Copy;
        let was_enabled = self.blend.logic_op != LogicOp::Copy;
        if logic_enabled != was_enabled {
            if logic_enabled {
                gl.enable(Capability::ColorLogicOp);
            } else {
                gl.disable(Capability::ColorLogicOp);
            }
        }
        if logic_enabled && info.logic_op != self.blend.logic_op {
            gl.logic_op(info.logic_op);
        }

        if info.constant_color != self.blend.constant_color {
            let c = info.constant_color;
            gl.blend_color([
                c[0].into_inner(),
                c[1].into_inner(),
                c[2].into_inner(),
                c[3].into_inner(),
            ]);
        }

        if info.sample_mask != self.blend.sample_mask {
            match info.sample_mask {
                Some(words) => {
                    if self.blend.sample_mask.is_none() {
                        gl.enable(Capability::SampleMask);
                    }
                    let old = self.blend.sample_mask.unwrap_or([!0; 4]);
                    for (i, (&new, &prev)) in words.iter().zip(old.iter()).enumerate() {
                        if new != prev || self.blend.sample_mask.is_none() {
                            gl.sample_mask(i as u32, new);
                        }
                    }
                }
                None => gl.disable(Capability::SampleMask),
            }
        }

        let mut applied = *info;
        if !info.independent {
            // the non-indexed calls set every slot
            applied.render_targets = [info.render_targets[0]; MAX_COLOR_ATTACHMENTS];
        }
        self.blend = applied;
        self.blend_id = Some(id);
    }

    /// Applies a rasterizer state, emitting only what differs.
    pub(crate) fn apply_rasterizer_state(
        &mut self,
        gl: &dyn GlApi,
        id: RasterizerStateId,
        info: &RasterizerStateInfo,
    ) {
        if self.raster_id == Some(id) {
            return;
        }

        if info.fill_mode != self.raster.fill_mode {
            gl.polygon_mode(info.fill_mode);
        }

        if info.cull_mode != self.raster.cull_mode {
            match info.cull_mode {
                CullMode::None => gl.disable(Capability::CullFace),
                CullMode::Front => {
                    if self.raster.cull_mode == CullMode::None {
                        gl.enable(Capability::CullFace);
                    }
                    gl.cull_face(CullFace::Front);
                }
                CullMode::Back => {
                    if self.raster.cull_mode == CullMode::None {
                        gl.enable(Capability::CullFace);
                    }
                    gl.cull_face(CullFace::Back);
                }
            }
        }

        let toggles = [
            (
                Capability::ScissorTest,
                info.scissor_enable,
                self.raster.scissor_enable,
            ),
            (
                Capability::Multisample,
                info.multisample,
                self.raster.multisample,
            ),
            (
                Capability::RasterizerDiscard,
                info.rasterizer_discard,
                self.raster.rasterizer_discard,
            ),
            (
                Capability::LineSmooth,
                info.line_smooth,
                self.raster.line_smooth,
            ),
            (
                Capability::DepthClamp,
                info.depth_clamp,
                self.raster.depth_clamp,
            ),
        ];
        for &(cap, new, old) in &toggles {
            if new != old {
                if new {
                    gl.enable(cap);
                } else {
                    gl.disable(cap);
                }
            }
        }

        let offset_enabled = info.offset.is_enabled();
        if offset_enabled {
            if info.offset != self.raster.offset {
                if self.caps.polygon_offset_clamp {
                    gl.polygon_offset_clamp(
                        info.offset.slope.into_inner(),
                        info.offset.bias as f32,
                        info.offset.clamp.into_inner(),
                    );
                } else {
                    gl.polygon_offset(info.offset.slope.into_inner(), info.offset.bias as f32);
                }
            }
            if !self.polygon_offset_enabled {
                gl.enable(Capability::PolygonOffset);
                self.polygon_offset_enabled = true;
            }
        } else if self.polygon_offset_enabled {
            gl.disable(Capability::PolygonOffset);
            self.polygon_offset_enabled = false;
        }

        if info.front_face != self.raster.front_face {
            gl.front_face(info.front_face);
        }

        self.raster = *info;
        self.raster_id = Some(id);
    }

    /// Applies a depth-stencil state; the stencil reference comes from the
    /// state itself.
    pub(crate) fn apply_depth_stencil_state(
        &mut self,
        gl: &dyn GlApi,
        id: DepthStencilStateId,
        info: &DepthStencilStateInfo,
    ) {
        if self.depth_stencil_id == Some(id) {
            return;
        }

        if info.depth_test != self.depth_stencil.depth_test {
            if info.depth_test {
                gl.enable(Capability::DepthTest);
            } else {
                gl.disable(Capability::DepthTest);
            }
        }
        if info.depth_write != self.depth_stencil.depth_write {
            gl.depth_mask(info.depth_write);
        }
        if info.depth_func != self.depth_stencil.depth_func {
            gl.depth_func(info.depth_func);
        }

        if info.stencil_test != self.depth_stencil.stencil_test {
            if info.stencil_test {
                gl.enable(Capability::StencilTest);
            } else {
                gl.disable(Capability::StencilTest);
            }
        }

        if info.stencil_write_mask != self.depth_stencil.stencil_write_mask {
            gl.stencil_mask_separate(StencilFace::FrontAndBack, info.stencil_write_mask);
        }

        let funcs_changed = info.front.func != self.depth_stencil.front.func
            || info.back.func != self.depth_stencil.back.func
            || info.stencil_read_mask != self.depth_stencil.stencil_read_mask;
        if funcs_changed {
            if info.front.func == info.back.func {
                gl.stencil_func_separate(
                    StencilFace::FrontAndBack,
                    info.front.func,
                    self.stencil_ref,
                    info.stencil_read_mask,
                );
            } else {
                gl.stencil_func_separate(
                    StencilFace::Front,
                    info.front.func,
                    self.stencil_ref,
                    info.stencil_read_mask,
                );
                gl.stencil_func_separate(
                    StencilFace::Back,
                    info.back.func,
                    self.stencil_ref,
                    info.stencil_read_mask,
                );
            }
        }

        let front_ops = (info.front.fail_op, info.front.depth_fail_op, info.front.pass_op);
        let back_ops = (info.back.fail_op, info.back.depth_fail_op, info.back.pass_op);
        let old_front = &self.depth_stencil.front;
        let old_back = &self.depth_stencil.back;
        let ops_changed = front_ops
            != (old_front.fail_op, old_front.depth_fail_op, old_front.pass_op)
            || back_ops != (old_back.fail_op, old_back.depth_fail_op, old_back.pass_op);
        if ops_changed {
            if front_ops == back_ops {
                gl.stencil_op_separate(StencilFace::FrontAndBack, front_ops.0, front_ops.1, front_ops.2);
            } else {
                gl.stencil_op_separate(StencilFace::Front, front_ops.0, front_ops.1, front_ops.2);
                gl.stencil_op_separate(StencilFace::Back, back_ops.0, back_ops.1, back_ops.2);
            }
        }

        self.depth_stencil = *info;
        self.depth_stencil_id = Some(id);
    }

    /// Changes the stencil reference, re-emitting the stencil functions of
    /// the current depth-stencil block.
    pub fn set_stencil_ref(&mut self, gl: &dyn GlApi, reference: i32) {
        if self.stencil_ref == reference {
            return;
        }
        self.stencil_ref = reference;
        let ds = self.depth_stencil;
        if ds.front.func == ds.back.func {
            gl.stencil_func_separate(
                StencilFace::FrontAndBack,
                ds.front.func,
                reference,
                ds.stencil_read_mask,
            );
        } else {
            gl.stencil_func_separate(
                StencilFace::Front,
                ds.front.func,
                reference,
                ds.stencil_read_mask,
            );
            gl.stencil_func_separate(
                StencilFace::Back,
                ds.back.func,
                reference,
                ds.stencil_read_mask,
            );
        }
    }

    // ---- VAO cache ----------------------------------------------------

    /// Returns the cached VAO for a vertex layout, programming a new one on
    /// first sight.
    pub(crate) fn cached_vao(
        &mut self,
        gl: &dyn GlApi,
        bindings: &[VertexBindingInfo],
        attribs: &[VertexAttribInfo],
    ) -> Result<VaoIndex> {
        if bindings.len() > MAX_VERTEX_BINDINGS {
            return Err(Error::InvalidArgument("too many vertex bindings"));
        }
        if attribs.len() > MAX_VERTEX_ATTRIBS {
            return Err(Error::InvalidArgument("too many vertex attributes"));
        }
        for a in attribs {
            if !bindings.iter().any(|b| b.binding == a.binding) {
                return Err(Error::InvalidArgument(
                    "vertex attribute references an undeclared binding",
                ));
            }
        }

        let key = VaoKey {
            bindings: bindings.iter().copied().collect(),
            attribs: attribs.iter().copied().collect(),
        };
        if let Some(&index) = self.vao_lookup.get(&key) {
            return Ok(index);
        }

        let obj = gl.create_vertex_array();
        for a in attribs {
            gl.enable_vertex_array_attrib(obj, a.location);
            let info = a.data_type.info();
            if info.component == ignis_render::ComponentType::F64 {
                gl.vertex_array_attrib_l_format(
                    obj,
                    a.location,
                    info.components,
                    info.component,
                    a.offset,
                );
            } else if info.component.is_integer() && !info.normalized {
                gl.vertex_array_attrib_i_format(
                    obj,
                    a.location,
                    info.components,
                    info.component,
                    a.offset,
                );
            } else {
                gl.vertex_array_attrib_format(
                    obj,
                    a.location,
                    info.components,
                    info.component,
                    info.normalized,
                    a.offset,
                );
            }
            gl.vertex_array_attrib_binding(obj, a.location, a.binding);
        }

        let mut strides = [0u32; MAX_VERTEX_BINDINGS];
        for b in bindings {
            strides[b.binding as usize] = b.stride;
            if let InputRate::PerInstance { divisor } = b.input_rate {
                gl.vertex_array_binding_divisor(obj, b.binding, divisor);
            }
        }

        let index = VaoIndex(self.vaos.len() as u32);
        self.vaos.push(VertexArrayObject {
            obj,
            strides,
            vertex_buffers: [None; MAX_VERTEX_BINDINGS],
            index_buffer_uid: None,
        });
        self.vao_lookup.insert(key, index);
        Ok(index)
    }

    pub(crate) fn vao(&self, index: VaoIndex) -> &VertexArrayObject {
        &self.vaos[index.0 as usize]
    }

    pub(crate) fn vao_mut(&mut self, index: VaoIndex) -> &mut VertexArrayObject {
        &mut self.vaos[index.0 as usize]
    }

    /// Frees every cached VAO. The state must not be current on the GPU
    /// while objects it references are still in flight.
    pub fn destroy(mut self, gl: &dyn GlApi) {
        for vao in self.vaos.drain(..) {
            gl.delete_vertex_array(vao.obj);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TraceGl;
    use ignis_render::BufferDataType;

    fn layout() -> ([VertexBindingInfo; 1], [VertexAttribInfo; 2]) {
        (
            [VertexBindingInfo {
                binding: 0,
                stride: 24,
                input_rate: InputRate::PerVertex,
            }],
            [
                VertexAttribInfo {
                    location: 0,
                    binding: 0,
                    data_type: BufferDataType::Float3,
                    offset: 0,
                },
                VertexAttribInfo {
                    location: 1,
                    binding: 0,
                    data_type: BufferDataType::UByte4N,
                    offset: 12,
                },
            ],
        )
    }

    #[test]
    fn vao_cache_reuses_equal_layouts() {
        let gl = TraceGl::new();
        let mut device = Device::new(&gl);
        let mut state = State::new(&gl, &mut device, StateCreateInfo::default());

        let (bindings, attribs) = layout();
        let a = state.cached_vao(&gl, &bindings, &attribs).unwrap();
        let b = state.cached_vao(&gl, &bindings, &attribs).unwrap();
        assert_eq!(a, b);
        assert_eq!(state.total_vaos(), 1);
        assert_eq!(gl.count_calls("create_vertex_array()"), 1);

        // a different stride is a different VAO
        let mut other = bindings;
        other[0].stride = 32;
        let c = state.cached_vao(&gl, &other, &attribs).unwrap();
        assert_ne!(a, c);
        assert_eq!(state.total_vaos(), 2);
    }

    #[test]
    fn vao_attribs_must_reference_declared_bindings() {
        let gl = TraceGl::new();
        let mut device = Device::new(&gl);
        let mut state = State::new(&gl, &mut device, StateCreateInfo::default());

        let (bindings, mut attribs) = layout();
        attribs[1].binding = 3;
        assert!(state.cached_vao(&gl, &bindings, &attribs).is_err());
    }

    #[test]
    fn thread_current_registration() {
        let gl = TraceGl::new();
        let mut device = Device::new(&gl);
        let state = State::new(&gl, &mut device, StateCreateInfo::default());
        make_current(&state);
        assert_eq!(current_state_uid(), Some(state.uid()));
    }
}

/// Emits the blend enable/equation/function/mask calls for one slot (or
/// globally when `index` is `None`), diffing against the cached values.
fn diff_blend_slot(
    gl: &dyn GlApi,
    index: Option<u32>,
    old: &ignis_render::RenderTargetBlendingInfo,
    new: &ignis_render::RenderTargetBlendingInfo,
    force: bool,
) {
    if force || new.enable != old.enable {
        match (new.enable, index) {
            (true, Some(i)) => gl.enable_indexed(Capability::Blend, i),
            (true, None) => gl.enable(Capability::Blend),
            (false, Some(i)) => gl.disable_indexed(Capability::Blend, i),
            (false, None) => gl.disable(Capability::Blend),
        }
    }

    if force || new.color_write_mask != old.color_write_mask {
        let m = new.color_write_mask;
        let (r, g, b, a) = (
            m.contains(ignis_render::ColorWriteMask::R),
            m.contains(ignis_render::ColorWriteMask::G),
            m.contains(ignis_render::ColorWriteMask::B),
            m.contains(ignis_render::ColorWriteMask::A),
        );
        match index {
            Some(i) => gl.color_mask_indexed(i, r, g, b, a),
            None => gl.color_mask(r, g, b, a),
        }
    }

    if new.enable {
        // a freshly enabled slot re-emits its equation and function: the
        // driver values may be stale from before the disable
        let force = force || !old.enable;
        if force || new.op_rgb != old.op_rgb || new.op_alpha != old.op_alpha {
            if new.op_rgb == new.op_alpha {
                match index {
                    Some(i) => gl.blend_equation_indexed(i, new.op_rgb),
                    None => gl.blend_equation(new.op_rgb),
                }
            } else {
                match index {
                    Some(i) => gl.blend_equation_separate_indexed(i, new.op_rgb, new.op_alpha),
                    None => gl.blend_equation_separate(new.op_rgb, new.op_alpha),
                }
            }
        }

        let funcs_changed = new.src_rgb != old.src_rgb
            || new.dst_rgb != old.dst_rgb
            || new.src_alpha != old.src_alpha
            || new.dst_alpha != old.dst_alpha;
        if force || funcs_changed {
            if new.src_rgb == new.src_alpha && new.dst_rgb == new.dst_alpha {
                match index {
                    Some(i) => gl.blend_func_indexed(i, new.src_rgb, new.dst_rgb),
                    None => gl.blend_func(new.src_rgb, new.dst_rgb),
                }
            } else {
                match index {
                    Some(i) => gl.blend_func_separate_indexed(
                        i,
                        new.src_rgb,
                        new.dst_rgb,
                        new.src_alpha,
                        new.dst_alpha,
                    ),
                    None => {
                        gl.blend_func_separate(new.src_rgb, new.dst_rgb, new.src_alpha, new.dst_alpha)
                    }
                }
            }
        }
    }
}
