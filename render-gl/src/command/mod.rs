//! The command recorder.
//!
//! [`CommandBuffer`] translates draw/dispatch/copy/clear requests into the
//! minimum backend calls by diffing against the current [`State`]. Slot
//! range violations and requests made without the required objects bound
//! log an error and are dropped; there is no unwinding on the recording
//! path.

mod clear;
mod copy;

use std::time::Duration;

use log::{error, warn};
use smallvec::SmallVec;

use ignis_render::{
    ClearColorValue, ClearDepthStencilValue, ClearKind, ConditionalRenderMode, Format, IndexType,
    PrimitiveTopology, QueryResultFlags, Rect2D, Viewport, MAX_COLOR_ATTACHMENTS,
    MAX_VERTEX_BINDINGS,
};

use crate::api::{
    BufferTarget, Capability, ClientWaitStatus, GlApi, ImageAccess, IndexedBufferTarget,
    MemoryBarrierFlags, QueryResultMode,
};
use crate::buffer::Buffer;
use crate::device::{Device, Sampler};
use crate::framebuffer::Framebuffer;
use crate::pipeline::Pipeline;
use crate::query::QueryPool;
use crate::renderpass::RenderPass;
use crate::state::{CurrentRenderPass, State, ViewportOrigin};
use crate::sync::FenceSync;
use crate::texture::Texture;
use crate::xfb::TransformFeedback;

/// One uniform/storage/atomic/feedback buffer binding request.
pub struct BufferBinding<'a> {
    pub slot: u32,
    pub target: IndexedBufferTarget,
    pub buffer: &'a Buffer,
    /// Ranged bindings bypass the binding cache.
    pub range: Option<(usize, usize)>,
}

pub struct TextureBinding<'a> {
    pub slot: u32,
    pub texture: &'a Texture,
}

pub struct SamplerBinding {
    pub slot: u32,
    pub sampler: Sampler,
}

pub struct ImageBinding<'a> {
    pub slot: u32,
    pub texture: &'a Texture,
    pub lod: u16,
    /// `None` binds the whole (layered) image.
    pub layer: Option<u32>,
    pub access: ImageAccess,
}

/// The complete resource table of a draw or dispatch.
#[derive(Default)]
pub struct ShaderResources<'a> {
    pub buffers: &'a [BufferBinding<'a>],
    pub samplers: &'a [SamplerBinding],
    pub textures: &'a [TextureBinding<'a>],
    pub images: &'a [ImageBinding<'a>],
}

/// Arguments of [`CommandBuffer::begin_render_pass`].
pub struct RenderPassBegin<'a> {
    pub render_pass: &'a RenderPass,
    /// `None` targets the default framebuffer.
    pub framebuffer: Option<&'a Framebuffer>,
    pub render_area: Rect2D,
    pub clear_colors: &'a [ClearColorValue],
    pub clear_depth_stencil: ClearDepthStencilValue,
}

pub struct CommandBuffer<'a> {
    pub(crate) gl: &'a dyn GlApi,
    pub(crate) device: &'a Device,
    pub(crate) state: &'a mut State,
}

impl<'a> CommandBuffer<'a> {
    pub fn new(gl: &'a dyn GlApi, device: &'a Device, state: &'a mut State) -> CommandBuffer<'a> {
        CommandBuffer { gl, device, state }
    }

    pub fn state(&self) -> &State {
        &*self.state
    }

    // ---- pipeline -----------------------------------------------------

    /// Makes `pipeline` current.
    ///
    /// Rebinding the current pipeline only refreshes the subpass
    /// draw-buffer set; everything else is diffed against the last-applied
    /// state block.
    pub fn bind_pipeline(&mut self, pipeline: &Pipeline) {
        if self.state.current_pipeline_uid == Some(pipeline.uid) {
            self.rebind_subpass_draw_buffers();
            return;
        }

        if let (Some(expected), Some(rp)) = (pipeline.render_pass_uid, &self.state.render_pass) {
            if expected != rp.pass_uid || pipeline.subpass != rp.subpass {
                warn!(
                    "pipeline was created for pass {} subpass {}, bound in pass {} subpass {}",
                    expected, pipeline.subpass, rp.pass_uid, rp.subpass
                );
            }
        }

        self.state.bind_program_pipeline(self.gl, pipeline.obj);
        self.state.bind_vao(self.gl, pipeline.vao);
        self.rebind_subpass_draw_buffers();

        if pipeline.topology == PrimitiveTopology::Patches
            && self.state.num_patch_vertices != pipeline.num_patch_vertices
        {
            self.gl.patch_vertices(pipeline.num_patch_vertices);
            self.state.num_patch_vertices = pipeline.num_patch_vertices;
        }
        if pipeline.primitive_restart != self.state.primitive_restart {
            if pipeline.primitive_restart {
                self.gl.enable(Capability::PrimitiveRestartFixedIndex);
            } else {
                self.gl.disable(Capability::PrimitiveRestartFixedIndex);
            }
            self.state.primitive_restart = pipeline.primitive_restart;
        }

        let blend = *self.device.blending_state(pipeline.blending);
        self.state
            .apply_blending_state(self.gl, pipeline.blending, &blend);
        let raster = *self.device.rasterizer_state(pipeline.rasterizer);
        self.state
            .apply_rasterizer_state(self.gl, pipeline.rasterizer, &raster);
        let depth_stencil = *self.device.depth_stencil_state(pipeline.depth_stencil);
        self.state
            .apply_depth_stencil_state(self.gl, pipeline.depth_stencil, &depth_stencil);

        self.state.current_pipeline_uid = Some(pipeline.uid);
        self.state.current_topology = Some(pipeline.topology);
    }

    fn rebind_subpass_draw_buffers(&mut self) {
        if let Some(rp) = &self.state.render_pass {
            if rp.framebuffer != 0 {
                let refs = &rp.subpass_refs[rp.subpass as usize];
                self.gl.named_framebuffer_draw_buffers(rp.framebuffer, refs);
            }
        }
    }

    pub fn set_stencil_ref(&mut self, reference: i32) {
        self.state.set_stencil_ref(self.gl, reference);
    }

    // ---- vertex and index buffers -------------------------------------

    /// Binds a vertex buffer to a slot of the current pipeline's VAO. A
    /// repeat of the slot's `(buffer UID, offset)` pair is a no-op.
    pub fn bind_vertex_buffer(&mut self, slot: u32, buffer: &Buffer, offset: usize) {
        let vao_index = match self.state.current_vao {
            Some(index) => index,
            None => {
                error!("bind_vertex_buffer without a bound pipeline");
                return;
            }
        };
        if slot as usize >= MAX_VERTEX_BINDINGS {
            error!("vertex buffer slot {} out of range", slot);
            return;
        }
        let gl = self.gl;
        let vao = self.state.vao_mut(vao_index);
        if vao.vertex_buffers[slot as usize] == Some((buffer.uid, offset)) {
            return;
        }
        let stride = vao.strides[slot as usize];
        gl.vertex_array_vertex_buffer(vao.obj, slot, buffer.obj, offset, stride);
        vao.vertex_buffers[slot as usize] = Some((buffer.uid, offset));
    }

    /// Multi-bind form; slots whose `(UID, offset)` pair is unchanged are
    /// skipped, and the call is dropped entirely when nothing changed.
    pub fn bind_vertex_buffers(&mut self, first_slot: u32, buffers: &[(&Buffer, usize)]) {
        let vao_index = match self.state.current_vao {
            Some(index) => index,
            None => {
                error!("bind_vertex_buffers without a bound pipeline");
                return;
            }
        };
        if first_slot as usize + buffers.len() > MAX_VERTEX_BINDINGS {
            error!("vertex buffer slot range out of bounds");
            return;
        }
        let gl = self.gl;
        let vao = self.state.vao_mut(vao_index);
        for (i, &(buffer, offset)) in buffers.iter().enumerate() {
            let slot = first_slot + i as u32;
            if vao.vertex_buffers[slot as usize] == Some((buffer.uid, offset)) {
                continue;
            }
            let stride = vao.strides[slot as usize];
            gl.vertex_array_vertex_buffer(vao.obj, slot, buffer.obj, offset, stride);
            vao.vertex_buffers[slot as usize] = Some((buffer.uid, offset));
        }
    }

    /// Binds the index source of the current VAO; cached per VAO by buffer
    /// UID.
    pub fn bind_index_buffer(&mut self, buffer: &Buffer, ty: IndexType, offset: usize) {
        let vao_index = match self.state.current_vao {
            Some(index) => index,
            None => {
                error!("bind_index_buffer without a bound pipeline");
                return;
            }
        };
        let gl = self.gl;
        let vao = self.state.vao_mut(vao_index);
        if vao.index_buffer_uid != Some(buffer.uid) {
            gl.vertex_array_element_buffer(vao.obj, buffer.obj);
            vao.index_buffer_uid = Some(buffer.uid);
        }
        self.state.index_type = Some(ty);
        self.state.index_offset = offset;
    }

    // ---- shader resources ---------------------------------------------

    /// Applies a resource table, emitting binds only for slots whose cached
    /// handle differs.
    pub fn bind_shader_resources(&mut self, resources: &ShaderResources) {
        for b in resources.buffers {
            let _ = self.state.bind_buffer_slot(
                self.gl,
                b.target,
                b.slot,
                b.buffer.obj,
                b.buffer.uid,
                b.range,
            );
        }
        for s in resources.samplers {
            let _ = self.state.bind_sampler_slot(self.gl, s.slot, s.sampler.obj);
        }
        for t in resources.textures {
            let _ = self
                .state
                .bind_texture_slot(self.gl, t.slot, t.texture.obj, t.texture.uid);
        }
        for i in resources.images {
            match self.state.image_binding_changed(i.slot, i.texture.uid) {
                Ok(true) => self.gl.bind_image_texture(
                    i.slot,
                    i.texture.obj,
                    i.lod,
                    i.layer.is_none(),
                    i.layer.unwrap_or(0),
                    i.access,
                    i.texture.desc().format,
                ),
                Ok(false) => {}
                Err(_) => {}
            }
        }
    }

    // ---- viewport and scissor -----------------------------------------

    fn flip_viewport_y(&self, y: f32, height: f32) -> f32 {
        match self.state.viewport_origin() {
            ViewportOrigin::TopLeft => self.state.target_height() as f32 - y - height,
            ViewportOrigin::BottomLeft => y,
        }
    }

    fn flip_rect_y(&self, rect: &Rect2D) -> i32 {
        match self.state.viewport_origin() {
            ViewportOrigin::TopLeft => {
                self.state.target_height() as i32 - rect.y - rect.height as i32
            }
            ViewportOrigin::BottomLeft => rect.y,
        }
    }

    pub fn set_viewport(&mut self, viewport: &Viewport) {
        let y = self.flip_viewport_y(viewport.y, viewport.height);
        let entry = (
            viewport.x as i32,
            y as i32,
            viewport.width as i32,
            viewport.height as i32,
        );
        if self.state.current_viewport == Some(entry) {
            return;
        }
        self.gl.viewport(entry.0, entry.1, entry.2, entry.3);
        self.state.current_viewport = Some(entry);
        self.state.viewport_array = None;
    }

    /// Writes an indexed viewport range; the origin convention applies to
    /// every entry. An identical repeat of the last range is dropped.
    pub fn set_viewports(&mut self, first: u32, viewports: &[Viewport]) {
        if first as usize + viewports.len() > self.state.caps.max_viewports as usize {
            error!("viewport range out of bounds");
            return;
        }
        let entries: Vec<[f32; 4]> = viewports
            .iter()
            .map(|vp| {
                [
                    vp.x,
                    self.flip_viewport_y(vp.y, vp.height),
                    vp.width,
                    vp.height,
                ]
            })
            .collect();
        let cache: Option<Vec<[ordered_float::NotNan<f32>; 4]>> = entries
            .iter()
            .map(|e| {
                let mut out = [ordered_float::NotNan::new(0.0).unwrap(); 4];
                for (slot, &v) in out.iter_mut().zip(e.iter()) {
                    *slot = ordered_float::NotNan::new(v).ok()?;
                }
                Some(out)
            })
            .collect();
        if let Some(cache) = cache {
            if self.state.viewport_array.as_ref() == Some(&(first, cache.clone())) {
                return;
            }
            self.state.viewport_array = Some((first, cache));
        } else {
            self.state.viewport_array = None;
        }
        self.gl.viewport_array(first, &entries);
        self.state.current_viewport = None;
    }

    pub fn set_scissor(&mut self, rect: &Rect2D) {
        let y = self.flip_rect_y(rect);
        self.gl
            .scissor(rect.x, y, rect.width as i32, rect.height as i32);
        self.state.current_scissor = *rect;
    }

    pub fn set_scissors(&mut self, first: u32, rects: &[Rect2D]) {
        if first as usize + rects.len() > self.state.caps.max_viewports as usize {
            error!("scissor range out of bounds");
            return;
        }
        let entries: Vec<[i32; 4]> = rects
            .iter()
            .map(|r| [r.x, self.flip_rect_y(r), r.width as i32, r.height as i32])
            .collect();
        self.gl.scissor_array(first, &entries);
        if let Some(first_rect) = rects.first() {
            if first == 0 {
                self.state.current_scissor = *first_rect;
            }
        }
    }

    // ---- draws --------------------------------------------------------

    fn current_topology(&self) -> Option<PrimitiveTopology> {
        let topo = self.state.current_topology;
        if topo.is_none() {
            error!("draw without a bound pipeline");
        }
        topo
    }

    pub fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) {
        let topo = match self.current_topology() {
            Some(t) => t,
            None => return,
        };
        if first_instance > 0 {
            self.gl.draw_arrays_instanced_base_instance(
                topo,
                first_vertex as i32,
                vertex_count as i32,
                instance_count as i32,
                first_instance,
            );
        } else if instance_count != 1 {
            self.gl.draw_arrays_instanced(
                topo,
                first_vertex as i32,
                vertex_count as i32,
                instance_count as i32,
            );
        } else {
            self.gl
                .draw_arrays(topo, first_vertex as i32, vertex_count as i32);
        }
    }

    pub fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    ) {
        let topo = match self.current_topology() {
            Some(t) => t,
            None => return,
        };
        let ty = match self.state.index_type {
            Some(ty) => ty,
            None => {
                error!("indexed draw without a bound index buffer");
                return;
            }
        };
        let offset = self.state.index_offset + first_index as usize * ty.size();
        if instance_count == 1 && first_instance == 0 {
            if base_vertex == 0 {
                self.gl.draw_elements(topo, index_count as i32, ty, offset);
            } else {
                self.gl
                    .draw_elements_base_vertex(topo, index_count as i32, ty, offset, base_vertex);
            }
        } else if base_vertex == 0 && first_instance == 0 {
            self.gl
                .draw_elements_instanced(topo, index_count as i32, ty, offset, instance_count as i32);
        } else {
            self.gl.draw_elements_instanced_base_vertex_base_instance(
                topo,
                index_count as i32,
                ty,
                offset,
                instance_count as i32,
                base_vertex,
                first_instance,
            );
        }
    }

    fn bind_draw_indirect_buffer(&mut self, buffer: &Buffer) {
        if self.state.draw_indirect_buffer_uid != Some(buffer.uid) {
            self.gl.bind_buffer(BufferTarget::DrawIndirect, buffer.obj);
            self.state.draw_indirect_buffer_uid = Some(buffer.uid);
        }
    }

    pub fn draw_indirect(&mut self, buffer: &Buffer, offset: usize, draw_count: u32, stride: u32) {
        let topo = match self.current_topology() {
            Some(t) => t,
            None => return,
        };
        self.bind_draw_indirect_buffer(buffer);
        if draw_count == 1 {
            self.gl.draw_arrays_indirect(topo, offset);
        } else {
            self.gl
                .multi_draw_arrays_indirect(topo, offset, draw_count as i32, stride);
        }
    }

    pub fn draw_indexed_indirect(
        &mut self,
        buffer: &Buffer,
        offset: usize,
        draw_count: u32,
        stride: u32,
    ) {
        let topo = match self.current_topology() {
            Some(t) => t,
            None => return,
        };
        let ty = match self.state.index_type {
            Some(ty) => ty,
            None => {
                error!("indexed indirect draw without a bound index buffer");
                return;
            }
        };
        self.bind_draw_indirect_buffer(buffer);
        if draw_count == 1 {
            self.gl.draw_elements_indirect(topo, ty, offset);
        } else {
            self.gl
                .multi_draw_elements_indirect(topo, ty, offset, draw_count as i32, stride);
        }
    }

    /// Draws the vertices captured by a transform feedback object; streams
    /// above 0 use the stream-indexed entry points.
    pub fn draw_transform_feedback(
        &mut self,
        xfb: &TransformFeedback,
        stream: u32,
        instance_count: u32,
    ) {
        let topo = match self.current_topology() {
            Some(t) => t,
            None => return,
        };
        match (stream, instance_count) {
            (0, 1) => self.gl.draw_transform_feedback(topo, xfb.obj),
            (0, n) => self.gl.draw_transform_feedback_instanced(topo, xfb.obj, n as i32),
            (s, 1) => self.gl.draw_transform_feedback_stream(topo, xfb.obj, s),
            (s, n) => self
                .gl
                .draw_transform_feedback_stream_instanced(topo, xfb.obj, s, n as i32),
        }
    }

    pub fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        if self.state.current_pipeline_uid.is_none() {
            error!("dispatch without a bound pipeline");
            return;
        }
        self.gl.dispatch_compute(x, y, z);
    }

    pub fn dispatch_indirect(&mut self, buffer: &Buffer, offset: usize) {
        if self.state.current_pipeline_uid.is_none() {
            error!("dispatch without a bound pipeline");
            return;
        }
        if self.state.dispatch_indirect_buffer_uid != Some(buffer.uid) {
            self.gl
                .bind_buffer(BufferTarget::DispatchIndirect, buffer.obj);
            self.state.dispatch_indirect_buffer_uid = Some(buffer.uid);
        }
        self.gl.dispatch_compute_indirect(offset);
    }

    // ---- transform feedback scopes ------------------------------------

    pub fn begin_transform_feedback(&mut self, xfb: &TransformFeedback, topology: PrimitiveTopology) {
        self.gl.bind_transform_feedback(xfb.obj);
        self.gl.begin_transform_feedback(topology);
    }

    pub fn end_transform_feedback(&mut self) {
        self.gl.end_transform_feedback();
    }

    pub fn pause_transform_feedback(&mut self) {
        self.gl.pause_transform_feedback();
    }

    pub fn resume_transform_feedback(&mut self) {
        self.gl.resume_transform_feedback();
    }

    // ---- queries and conditional render -------------------------------

    pub fn begin_query(&mut self, pool: &QueryPool, index: u32, stream: u32) {
        if let Ok(obj) = pool.obj(index) {
            self.gl.begin_query_indexed(pool.target(), stream, obj);
        }
    }

    pub fn end_query(&mut self, pool: &QueryPool, stream: u32) {
        self.gl.end_query_indexed(pool.target(), stream);
    }

    /// Writes a timestamp into the query once all prior commands complete.
    pub fn write_timestamp(&mut self, pool: &QueryPool, index: u32) {
        if let Ok(obj) = pool.obj(index) {
            self.gl.query_counter(obj);
        }
    }

    /// Copies query results into `buffer`; 32- and 64-bit paths with stride
    /// alignment checks.
    pub fn copy_query_pool_results(
        &mut self,
        pool: &QueryPool,
        first: u32,
        count: u32,
        buffer: &Buffer,
        offset: usize,
        stride: usize,
        flags: QueryResultFlags,
    ) {
        let bits64 = flags.contains(QueryResultFlags::RESULT_64);
        let word = if bits64 { 8 } else { 4 };
        let per_query = if flags.contains(QueryResultFlags::WITH_AVAILABILITY) {
            word * 2
        } else {
            word
        };
        if stride < per_query || stride % word != 0 {
            error!("query result copy stride {} misaligned", stride);
            return;
        }
        if offset + stride * count as usize > buffer.size() {
            error!("query result copy out of buffer bounds");
            return;
        }
        let mode = if flags.contains(QueryResultFlags::WAIT) {
            QueryResultMode::Result
        } else {
            QueryResultMode::ResultNoWait
        };
        for i in 0..count {
            let obj = match pool.obj(first + i) {
                Ok(obj) => obj,
                Err(_) => return,
            };
            let base = offset + i as usize * stride;
            self.gl
                .get_query_buffer_object(obj, buffer.obj, base, mode, bits64);
            if flags.contains(QueryResultFlags::WITH_AVAILABILITY) {
                self.gl.get_query_buffer_object(
                    obj,
                    buffer.obj,
                    base + word,
                    QueryResultMode::Available,
                    bits64,
                );
            }
        }
    }

    pub fn begin_conditional_render(
        &mut self,
        pool: &QueryPool,
        index: u32,
        mode: ConditionalRenderMode,
    ) {
        if let Ok(obj) = pool.obj(index) {
            self.gl.begin_conditional_render(obj, mode);
        }
    }

    pub fn end_conditional_render(&mut self) {
        self.gl.end_conditional_render();
    }

    // ---- sync ---------------------------------------------------------

    /// Inserts a fence after all previously recorded commands.
    pub fn fence(&mut self) -> FenceSync {
        FenceSync::new(self.gl)
    }

    pub fn client_wait(
        &mut self,
        fence: &FenceSync,
        timeout: Duration,
        flush: bool,
    ) -> ClientWaitStatus {
        fence.client_wait(self.gl, timeout, flush)
    }

    pub fn server_wait(&mut self, fence: &FenceSync) {
        fence.server_wait(self.gl);
    }

    pub fn is_signaled(&mut self, fence: &FenceSync) -> bool {
        fence.is_signaled(self.gl)
    }

    pub fn flush(&mut self) {
        self.gl.flush();
    }

    pub fn memory_barrier(&mut self, flags: MemoryBarrierFlags) {
        self.gl.memory_barrier(flags);
    }

    pub fn memory_barrier_by_region(&mut self, flags: MemoryBarrierFlags) {
        self.gl.memory_barrier_by_region(flags);
    }

    pub fn texture_barrier(&mut self) {
        self.gl.texture_barrier();
    }

    // ---- render pass binding ------------------------------------------

    /// Binds the pass's framebuffer (or the default one), scopes the
    /// render area, and performs the load-op clears. The scissor, color
    /// masks, rasterizer discard and depth write mask observable after this
    /// call are exactly what they were before it.
    pub fn begin_render_pass(&mut self, begin: &RenderPassBegin) {
        let pass = begin.render_pass;
        let (fb_obj, width, height) = match begin.framebuffer {
            Some(fb) => (fb.obj, fb.width(), fb.height()),
            None => {
                let (w, h) = self.state.swapchain_resolution();
                (0, w, h)
            }
        };

        self.state.bind_draw_framebuffer(self.gl, fb_obj);

        let subpass_refs: SmallVec<[SmallVec<[u32; MAX_COLOR_ATTACHMENTS]>; 4]> = (0..pass
            .num_subpasses())
            .map(|i| pass.subpass_color_refs(i))
            .collect();

        self.state.render_pass = Some(CurrentRenderPass {
            pass_uid: pass.uid,
            framebuffer: fb_obj,
            width,
            height,
            subpass: 0,
            subpass_refs,
            render_area: begin.render_area,
        });
        self.rebind_subpass_draw_buffers();

        let color_clears = (0..pass.num_color_attachments())
            .any(|i| pass.color_attachment(i).load_op == ignis_render::LoadOp::Clear);
        let depth_clear = pass
            .depth_stencil_attachment()
            .map_or(false, |a| a.load_op == ignis_render::LoadOp::Clear);
        if !color_clears && !depth_clear {
            return;
        }

        // clears are scoped to the render area and must not be affected by
        // the current pipeline's scissor, discard or write masks
        if !self.state.raster.scissor_enable {
            self.gl.enable(Capability::ScissorTest);
        }
        let area = begin.render_area;
        let area_y = self.flip_rect_y_for_height(&area, height);
        self.gl
            .scissor(area.x, area_y, area.width as i32, area.height as i32);
        if self.state.raster.rasterizer_discard {
            self.gl.disable(Capability::RasterizerDiscard);
        }

        if color_clears {
            for i in 0..pass.num_color_attachments() {
                if pass.color_attachment(i).load_op != ignis_render::LoadOp::Clear {
                    continue;
                }
                let format = begin
                    .framebuffer
                    .map(|fb| fb.color_attachment(i).texture.format);
                let value = coerce_clear_color(format, begin.clear_colors.get(i));
                let mask = self.state.blend.render_targets[i.min(MAX_COLOR_ATTACHMENTS - 1)]
                    .color_write_mask;
                let full = mask == ignis_render::ColorWriteMask::RGBA;
                if !full {
                    self.gl.color_mask_indexed(i as u32, true, true, true, true);
                }
                self.gl
                    .clear_named_framebuffer_color(fb_obj, i as u32, &value);
                if !full {
                    self.gl.color_mask_indexed(
                        i as u32,
                        mask.contains(ignis_render::ColorWriteMask::R),
                        mask.contains(ignis_render::ColorWriteMask::G),
                        mask.contains(ignis_render::ColorWriteMask::B),
                        mask.contains(ignis_render::ColorWriteMask::A),
                    );
                }
            }
        }

        if depth_clear {
            let depth_write = self.state.depth_stencil.depth_write;
            if !depth_write {
                self.gl.depth_mask(true);
            }
            let kind = begin
                .framebuffer
                .and_then(|fb| fb.depth_stencil_attachment().map(|a| a.texture.format))
                .map_or(ClearKind::DepthStencil, |f| f.info().clear_kind);
            let ds = begin.clear_depth_stencil;
            match kind {
                ClearKind::DepthOnly => self.gl.clear_named_framebuffer_depth(fb_obj, ds.depth),
                ClearKind::StencilOnly => {
                    self.gl.clear_named_framebuffer_stencil(fb_obj, ds.stencil)
                }
                _ => self
                    .gl
                    .clear_named_framebuffer_depth_stencil(fb_obj, ds.depth, ds.stencil),
            }
            if !depth_write {
                self.gl.depth_mask(false);
            }
        }

        // restore the scoped state
        let saved_scissor = self.state.current_scissor;
        let y = self.flip_rect_y_for_height(&saved_scissor, height);
        self.gl.scissor(
            saved_scissor.x,
            y,
            saved_scissor.width as i32,
            saved_scissor.height as i32,
        );
        if !self.state.raster.scissor_enable {
            self.gl.disable(Capability::ScissorTest);
        }
        if self.state.raster.rasterizer_discard {
            self.gl.enable(Capability::RasterizerDiscard);
        }
    }

    fn flip_rect_y_for_height(&self, rect: &Rect2D, height: u32) -> i32 {
        match self.state.viewport_origin() {
            ViewportOrigin::TopLeft => height as i32 - rect.y - rect.height as i32,
            ViewportOrigin::BottomLeft => rect.y,
        }
    }

    /// Advances to the next subpass and rebinds its draw-buffer set.
    pub fn next_subpass(&mut self) {
        let advanced = match self.state.render_pass.as_mut() {
            Some(rp) => {
                if (rp.subpass as usize) + 1 >= rp.subpass_refs.len() {
                    error!("next_subpass past the last subpass");
                    false
                } else {
                    rp.subpass += 1;
                    true
                }
            }
            None => {
                error!("next_subpass outside a render pass");
                false
            }
        };
        if advanced {
            self.rebind_subpass_draw_buffers();
        }
    }

    pub fn end_render_pass(&mut self) {
        if self.state.render_pass.take().is_none() {
            error!("end_render_pass outside a render pass");
        }
    }
}

/// Picks the clear value matching the attachment's clear kind, recovering
/// with a zero value when the caller supplied the wrong variant.
fn coerce_clear_color(format: Option<Format>, value: Option<&ClearColorValue>) -> ClearColorValue {
    let kind = format.map_or(ClearKind::Float32, |f| f.info().clear_kind);
    let fallback = match kind {
        ClearKind::Int32 => ClearColorValue::Int32([0; 4]),
        ClearKind::UInt32 => ClearColorValue::UInt32([0; 4]),
        _ => ClearColorValue::Float32([0.0; 4]),
    };
    match value {
        None => fallback,
        Some(v) => {
            let matches = matches!(
                (kind, v),
                (ClearKind::Float32, ClearColorValue::Float32(_))
                    | (ClearKind::Int32, ClearColorValue::Int32(_))
                    | (ClearKind::UInt32, ClearColorValue::UInt32(_))
            );
            if matches {
                *v
            } else {
                error!("clear value variant does not match attachment format");
                fallback
            }
        }
    }
}
