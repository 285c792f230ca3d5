//! Recording backend.
//!
//! [`TraceGl`] implements [`GlApi`](crate::api::GlApi) without a GPU: every
//! call is appended to a log as a stable formatted line, and a small memory
//! model (buffer bytes, texture storage identity, sync points) backs the
//! operations whose results the layer observes. Useful for driver-less
//! testing and for diffing the exact command stream a frame produces.

use std::cell::RefCell;

use fxhash::FxHashMap;

use ignis_render::{
    BufferStorageFlags, ClearColorValue, CompareFunc, ComponentType, ConditionalRenderMode,
    FillMode, Format, FrontFace, IndexType, MutableAccess, MutableUsage, PrimitiveTopology,
    QueryTarget, Rect2D, SamplerInfo, ShaderStage, StencilOp, TextureRect, TextureResolution,
    TextureSwizzle, TextureType,
};

use crate::api::*;

#[derive(Default)]
struct TraceBuffer {
    bytes: Vec<u8>,
    mapped: bool,
}

struct TraceTexture {
    storage: u32,
    /// Extent of level 0, as the driver would report it.
    extent: (u32, u32, u32),
}

#[derive(Default)]
struct Inner {
    calls: Vec<String>,
    next_name: u32,
    next_sync: u64,
    buffers: FxHashMap<u32, TraceBuffer>,
    textures: FxHashMap<u32, TraceTexture>,
    /// storage id -> number of texture names sharing it
    storages: FxHashMap<u32, u32>,
    /// When set, buffer allocations are silently clamped to this many
    /// bytes, like a driver running out of memory.
    buffer_alloc_limit: Option<usize>,
}

impl Inner {
    fn name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }
}

/// A `GlApi` implementation that records the call stream.
pub struct TraceGl {
    inner: RefCell<Inner>,
    caps: DeviceCaps,
}

impl Default for TraceGl {
    fn default() -> Self {
        TraceGl::new()
    }
}

impl TraceGl {
    pub fn new() -> TraceGl {
        TraceGl {
            inner: RefCell::new(Inner::default()),
            caps: DeviceCaps::default(),
        }
    }

    pub fn with_caps(caps: DeviceCaps) -> TraceGl {
        TraceGl {
            inner: RefCell::new(Inner::default()),
            caps,
        }
    }

    fn rec(&self, call: String) {
        self.inner.borrow_mut().calls.push(call);
    }

    /// The recorded call stream so far.
    pub fn calls(&self) -> Vec<String> {
        self.inner.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    /// Number of recorded calls whose text starts with `prefix`.
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn calls_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Storage identity behind a texture name, if the name is alive.
    pub fn texture_storage(&self, texture: TextureObj) -> Option<u32> {
        self.inner
            .borrow()
            .textures
            .get(&texture)
            .map(|t| t.storage)
    }

    /// Whether the given storage identity still has live texture names.
    pub fn storage_alive(&self, storage: u32) -> bool {
        self.inner
            .borrow()
            .storages
            .get(&storage)
            .map_or(false, |&rc| rc > 0)
    }

    /// Makes subsequent buffer allocations come out short, for exercising
    /// the creation size-readback path.
    pub fn limit_buffer_allocations(&self, max_bytes: usize) {
        self.inner.borrow_mut().buffer_alloc_limit = Some(max_bytes);
    }

    fn new_texture_storage(&self, texture: TextureObj, extent: (u32, u32, u32)) {
        let mut inner = self.inner.borrow_mut();
        let storage = inner.name();
        inner
            .textures
            .insert(texture, TraceTexture { storage, extent });
        inner.storages.insert(storage, 1);
    }
}

/// Level-0 extent a driver would report for an image allocation.
fn image_extent(ty: TextureType, resolution: &TextureResolution) -> (u32, u32, u32) {
    match ty {
        TextureType::Tex1D => (resolution.width(), 1, 1),
        TextureType::Tex1DArray => (resolution.width(), resolution.layers(), 1),
        TextureType::Tex2D | TextureType::Rect | TextureType::Tex2DMultisample => {
            (resolution.width(), resolution.height(), 1)
        }
        TextureType::Tex2DArray
        | TextureType::Tex2DArrayMultisample
        | TextureType::Cubemap
        | TextureType::CubemapArray => {
            (resolution.width(), resolution.height(), resolution.layers())
        }
        TextureType::Tex3D => (
            resolution.width(),
            resolution.height(),
            resolution.depth(),
        ),
    }
}

impl GlApi for TraceGl {
    fn caps(&self) -> DeviceCaps {
        self.caps
    }

    fn enable(&self, cap: Capability) {
        self.rec(format!("enable({:?})", cap));
    }

    fn disable(&self, cap: Capability) {
        self.rec(format!("disable({:?})", cap));
    }

    fn enable_indexed(&self, cap: Capability, index: u32) {
        self.rec(format!("enable_indexed({:?}, {})", cap, index));
    }

    fn disable_indexed(&self, cap: Capability, index: u32) {
        self.rec(format!("disable_indexed({:?}, {})", cap, index));
    }

    fn hint(&self, target: HintTarget, mode: HintMode) {
        self.rec(format!("hint({:?}, {:?})", target, mode));
    }

    fn clip_control(&self, origin: ClipOrigin, depth: ClipDepth) {
        self.rec(format!("clip_control({:?}, {:?})", origin, depth));
    }

    fn clamp_read_color(&self, clamp: ColorClamp) {
        self.rec(format!("clamp_read_color({:?})", clamp));
    }

    fn pixel_store_pack_alignment(&self, alignment: u32) {
        self.rec(format!("pixel_store_pack_alignment({})", alignment));
    }

    fn pixel_store_unpack_alignment(&self, alignment: u32) {
        self.rec(format!("pixel_store_unpack_alignment({})", alignment));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.rec(format!("viewport({}, {}, {}, {})", x, y, width, height));
    }

    fn viewport_array(&self, first: u32, viewports: &[[f32; 4]]) {
        self.rec(format!("viewport_array({}, {:?})", first, viewports));
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.rec(format!("scissor({}, {}, {}, {})", x, y, width, height));
    }

    fn scissor_array(&self, first: u32, rects: &[[i32; 4]]) {
        self.rec(format!("scissor_array({}, {:?})", first, rects));
    }

    fn blend_func(&self, src: ignis_render::BlendFunc, dst: ignis_render::BlendFunc) {
        self.rec(format!("blend_func({:?}, {:?})", src, dst));
    }

    fn blend_func_indexed(
        &self,
        index: u32,
        src: ignis_render::BlendFunc,
        dst: ignis_render::BlendFunc,
    ) {
        self.rec(format!("blend_func_indexed({}, {:?}, {:?})", index, src, dst));
    }

    fn blend_func_separate(
        &self,
        src_rgb: ignis_render::BlendFunc,
        dst_rgb: ignis_render::BlendFunc,
        src_alpha: ignis_render::BlendFunc,
        dst_alpha: ignis_render::BlendFunc,
    ) {
        self.rec(format!(
            "blend_func_separate({:?}, {:?}, {:?}, {:?})",
            src_rgb, dst_rgb, src_alpha, dst_alpha
        ));
    }

    fn blend_func_separate_indexed(
        &self,
        index: u32,
        src_rgb: ignis_render::BlendFunc,
        dst_rgb: ignis_render::BlendFunc,
        src_alpha: ignis_render::BlendFunc,
        dst_alpha: ignis_render::BlendFunc,
    ) {
        self.rec(format!(
            "blend_func_separate_indexed({}, {:?}, {:?}, {:?}, {:?})",
            index, src_rgb, dst_rgb, src_alpha, dst_alpha
        ));
    }

    fn blend_equation(&self, op: ignis_render::BlendOp) {
        self.rec(format!("blend_equation({:?})", op));
    }

    fn blend_equation_indexed(&self, index: u32, op: ignis_render::BlendOp) {
        self.rec(format!("blend_equation_indexed({}, {:?})", index, op));
    }

    fn blend_equation_separate(&self, rgb: ignis_render::BlendOp, alpha: ignis_render::BlendOp) {
        self.rec(format!("blend_equation_separate({:?}, {:?})", rgb, alpha));
    }

    fn blend_equation_separate_indexed(
        &self,
        index: u32,
        rgb: ignis_render::BlendOp,
        alpha: ignis_render::BlendOp,
    ) {
        self.rec(format!(
            "blend_equation_separate_indexed({}, {:?}, {:?})",
            index, rgb, alpha
        ));
    }

    fn blend_color(&self, color: [f32; 4]) {
        self.rec(format!("blend_color({:?})", color));
    }

    fn logic_op(&self, op: ignis_render::LogicOp) {
        self.rec(format!("logic_op({:?})", op));
    }

    fn color_mask(&self, r: bool, g: bool, b: bool, a: bool) {
        self.rec(format!("color_mask({}, {}, {}, {})", r, g, b, a));
    }

    fn color_mask_indexed(&self, index: u32, r: bool, g: bool, b: bool, a: bool) {
        self.rec(format!(
            "color_mask_indexed({}, {}, {}, {}, {})",
            index, r, g, b, a
        ));
    }

    fn sample_mask(&self, word: u32, mask: u32) {
        self.rec(format!("sample_mask({}, {:#x})", word, mask));
    }

    fn cull_face(&self, face: CullFace) {
        self.rec(format!("cull_face({:?})", face));
    }

    fn front_face(&self, front: FrontFace) {
        self.rec(format!("front_face({:?})", front));
    }

    fn polygon_mode(&self, mode: FillMode) {
        self.rec(format!("polygon_mode({:?})", mode));
    }

    fn polygon_offset(&self, slope: f32, bias: f32) {
        self.rec(format!("polygon_offset({}, {})", slope, bias));
    }

    fn polygon_offset_clamp(&self, slope: f32, bias: f32, clamp: f32) {
        self.rec(format!("polygon_offset_clamp({}, {}, {})", slope, bias, clamp));
    }

    fn patch_vertices(&self, count: u32) {
        self.rec(format!("patch_vertices({})", count));
    }

    fn depth_func(&self, func: CompareFunc) {
        self.rec(format!("depth_func({:?})", func));
    }

    fn depth_mask(&self, write: bool) {
        self.rec(format!("depth_mask({})", write));
    }

    fn stencil_func_separate(
        &self,
        face: StencilFace,
        func: CompareFunc,
        reference: i32,
        mask: u32,
    ) {
        self.rec(format!(
            "stencil_func_separate({:?}, {:?}, {}, {:#x})",
            face, func, reference, mask
        ));
    }

    fn stencil_op_separate(
        &self,
        face: StencilFace,
        fail: StencilOp,
        depth_fail: StencilOp,
        pass: StencilOp,
    ) {
        self.rec(format!(
            "stencil_op_separate({:?}, {:?}, {:?}, {:?})",
            face, fail, depth_fail, pass
        ));
    }

    fn stencil_mask_separate(&self, face: StencilFace, mask: u32) {
        self.rec(format!("stencil_mask_separate({:?}, {:#x})", face, mask));
    }

    fn create_buffer(&self) -> BufferObj {
        let mut inner = self.inner.borrow_mut();
        let name = inner.name();
        inner.buffers.insert(name, TraceBuffer::default());
        inner.calls.push(format!("create_buffer() -> {}", name));
        name
    }

    fn delete_buffer(&self, buffer: BufferObj) {
        let mut inner = self.inner.borrow_mut();
        inner.buffers.remove(&buffer);
        inner.calls.push(format!("delete_buffer({})", buffer));
    }

    fn named_buffer_storage(
        &self,
        buffer: BufferObj,
        size: usize,
        data: Option<&[u8]>,
        flags: BufferStorageFlags,
    ) {
        let mut inner = self.inner.borrow_mut();
        let granted = inner.buffer_alloc_limit.map_or(size, |limit| size.min(limit));
        if let Some(b) = inner.buffers.get_mut(&buffer) {
            b.bytes = match data {
                Some(src) => src[..granted.min(src.len())].to_vec(),
                None => vec![0; granted],
            };
        }
        inner.calls.push(format!(
            "named_buffer_storage({}, {}, {}, {:?})",
            buffer,
            size,
            data.is_some(),
            flags
        ));
    }

    fn named_buffer_data(
        &self,
        buffer: BufferObj,
        size: usize,
        data: Option<&[u8]>,
        access: MutableAccess,
        usage: MutableUsage,
    ) {
        let mut inner = self.inner.borrow_mut();
        let granted = inner.buffer_alloc_limit.map_or(size, |limit| size.min(limit));
        if let Some(b) = inner.buffers.get_mut(&buffer) {
            b.bytes = match data {
                Some(src) => src[..granted.min(src.len())].to_vec(),
                None => vec![0; granted],
            };
        }
        inner.calls.push(format!(
            "named_buffer_data({}, {}, {}, {:?}, {:?})",
            buffer,
            size,
            data.is_some(),
            access,
            usage
        ));
    }

    fn named_buffer_sub_data(&self, buffer: BufferObj, offset: usize, data: &[u8]) {
        let mut inner = self.inner.borrow_mut();
        if let Some(b) = inner.buffers.get_mut(&buffer) {
            if offset + data.len() <= b.bytes.len() {
                b.bytes[offset..offset + data.len()].copy_from_slice(data);
            }
        }
        inner.calls.push(format!(
            "named_buffer_sub_data({}, {}, len={})",
            buffer,
            offset,
            data.len()
        ));
    }

    fn get_named_buffer_sub_data(&self, buffer: BufferObj, offset: usize, out: &mut [u8]) {
        let mut inner = self.inner.borrow_mut();
        if let Some(b) = inner.buffers.get(&buffer) {
            if offset + out.len() <= b.bytes.len() {
                out.copy_from_slice(&b.bytes[offset..offset + out.len()]);
            }
        }
        inner.calls.push(format!(
            "get_named_buffer_sub_data({}, {}, len={})",
            buffer,
            offset,
            out.len()
        ));
    }

    fn copy_named_buffer_sub_data(
        &self,
        src: BufferObj,
        dst: BufferObj,
        src_offset: usize,
        dst_offset: usize,
        size: usize,
    ) {
        let mut inner = self.inner.borrow_mut();
        if let Some(data) = inner.buffers.get(&src).map(|b| {
            b.bytes
                .get(src_offset..src_offset + size)
                .map(<[u8]>::to_vec)
        }) {
            if let (Some(data), Some(b)) = (data, inner.buffers.get_mut(&dst)) {
                if dst_offset + size <= b.bytes.len() {
                    b.bytes[dst_offset..dst_offset + size].copy_from_slice(&data);
                }
            }
        }
        inner.calls.push(format!(
            "copy_named_buffer_sub_data({}, {}, {}, {}, {})",
            src, dst, src_offset, dst_offset, size
        ));
    }

    fn clear_named_buffer_sub_data(
        &self,
        buffer: BufferObj,
        offset: usize,
        size: usize,
        internal_format: Format,
        value: &ClearColorValue,
    ) {
        self.rec(format!(
            "clear_named_buffer_sub_data({}, {}, {}, {:?}, {:?})",
            buffer, offset, size, internal_format, value
        ));
    }

    fn map_named_buffer_range(
        &self,
        buffer: BufferObj,
        offset: usize,
        length: usize,
        access: MapAccessFlags,
    ) -> *mut u8 {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(format!(
            "map_named_buffer_range({}, {}, {}, {:?})",
            buffer, offset, length, access
        ));
        match inner.buffers.get_mut(&buffer) {
            Some(b) if offset + length <= b.bytes.len() => {
                b.mapped = true;
                // the model's storage is stable until the next (re)allocation
                unsafe { b.bytes.as_mut_ptr().add(offset) }
            }
            _ => std::ptr::null_mut(),
        }
    }

    fn unmap_named_buffer(&self, buffer: BufferObj) -> bool {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(format!("unmap_named_buffer({})", buffer));
        match inner.buffers.get_mut(&buffer) {
            Some(b) => {
                b.mapped = false;
                true
            }
            None => false,
        }
    }

    fn flush_mapped_named_buffer_range(&self, buffer: BufferObj, offset: usize, length: usize) {
        self.rec(format!(
            "flush_mapped_named_buffer_range({}, {}, {})",
            buffer, offset, length
        ));
    }

    fn invalidate_buffer_data(&self, buffer: BufferObj) {
        self.rec(format!("invalidate_buffer_data({})", buffer));
    }

    fn invalidate_buffer_sub_data(&self, buffer: BufferObj, offset: usize, length: usize) {
        self.rec(format!(
            "invalidate_buffer_sub_data({}, {}, {})",
            buffer, offset, length
        ));
    }

    fn get_named_buffer_parameter_i64(&self, buffer: BufferObj, param: BufferParameter) -> i64 {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(format!(
            "get_named_buffer_parameter_i64({}, {:?})",
            buffer, param
        ));
        match inner.buffers.get(&buffer) {
            Some(b) => match param {
                BufferParameter::Size => b.bytes.len() as i64,
                BufferParameter::Mapped => b.mapped as i64,
            },
            None => 0,
        }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: BufferObj) {
        self.rec(format!("bind_buffer({:?}, {})", target, buffer));
    }

    fn bind_buffer_base(&self, target: IndexedBufferTarget, slot: u32, buffer: BufferObj) {
        self.rec(format!("bind_buffer_base({:?}, {}, {})", target, slot, buffer));
    }

    fn bind_buffer_range(
        &self,
        target: IndexedBufferTarget,
        slot: u32,
        buffer: BufferObj,
        offset: usize,
        size: usize,
    ) {
        self.rec(format!(
            "bind_buffer_range({:?}, {}, {}, {}, {})",
            target, slot, buffer, offset, size
        ));
    }

    fn create_texture(&self, ty: TextureType) -> TextureObj {
        let mut inner = self.inner.borrow_mut();
        let name = inner.name();
        inner
            .calls
            .push(format!("create_texture({:?}) -> {}", ty, name));
        name
    }

    fn delete_texture(&self, texture: TextureObj) {
        let mut inner = self.inner.borrow_mut();
        if let Some(t) = inner.textures.remove(&texture) {
            if let Some(rc) = inner.storages.get_mut(&t.storage) {
                *rc -= 1;
                if *rc == 0 {
                    inner.storages.remove(&t.storage);
                }
            }
        }
        inner.calls.push(format!("delete_texture({})", texture));
    }

    fn texture_storage_1d(&self, texture: TextureObj, levels: u16, format: Format, width: u32) {
        self.new_texture_storage(texture, (width, 1, 1));
        self.rec(format!(
            "texture_storage_1d({}, {}, {:?}, {})",
            texture, levels, format, width
        ));
    }

    fn texture_storage_2d(
        &self,
        texture: TextureObj,
        levels: u16,
        format: Format,
        width: u32,
        height: u32,
    ) {
        self.new_texture_storage(texture, (width, height, 1));
        self.rec(format!(
            "texture_storage_2d({}, {}, {:?}, {}, {})",
            texture, levels, format, width, height
        ));
    }

    fn texture_storage_3d(
        &self,
        texture: TextureObj,
        levels: u16,
        format: Format,
        width: u32,
        height: u32,
        depth: u32,
    ) {
        self.new_texture_storage(texture, (width, height, depth));
        self.rec(format!(
            "texture_storage_3d({}, {}, {:?}, {}, {}, {})",
            texture, levels, format, width, height, depth
        ));
    }

    fn texture_storage_2d_multisample(
        &self,
        texture: TextureObj,
        samples: u8,
        fixed_sample_locations: bool,
        format: Format,
        width: u32,
        height: u32,
    ) {
        self.new_texture_storage(texture, (width, height, 1));
        self.rec(format!(
            "texture_storage_2d_multisample({}, {}, {}, {:?}, {}, {})",
            texture, samples, fixed_sample_locations, format, width, height
        ));
    }

    fn texture_storage_3d_multisample(
        &self,
        texture: TextureObj,
        samples: u8,
        fixed_sample_locations: bool,
        format: Format,
        width: u32,
        height: u32,
        depth: u32,
    ) {
        self.new_texture_storage(texture, (width, height, depth));
        self.rec(format!(
            "texture_storage_3d_multisample({}, {}, {}, {:?}, {}, {}, {})",
            texture, samples, fixed_sample_locations, format, width, height, depth
        ));
    }

    fn texture_image(
        &self,
        texture: TextureObj,
        ty: TextureType,
        lod: u16,
        format: Format,
        resolution: TextureResolution,
        data: Option<&[u8]>,
    ) {
        if self.texture_storage(texture).is_none() {
            self.new_texture_storage(texture, image_extent(ty, &resolution));
        } else if lod == 0 {
            let mut inner = self.inner.borrow_mut();
            if let Some(t) = inner.textures.get_mut(&texture) {
                t.extent = image_extent(ty, &resolution);
            }
        }
        self.rec(format!(
            "texture_image({}, {:?}, {}, {:?}, {:?}, {})",
            texture,
            ty,
            lod,
            format,
            resolution,
            data.is_some()
        ));
    }

    fn texture_view(
        &self,
        parent: TextureObj,
        ty: TextureType,
        format: Format,
        min_lod: u16,
        num_lods: u16,
        min_layer: u32,
        num_layers: u32,
    ) -> TextureObj {
        let mut inner = self.inner.borrow_mut();
        let name = inner.name();
        if let Some((storage, parent_extent)) =
            inner.textures.get(&parent).map(|t| (t.storage, t.extent))
        {
            let scale = |v: u32| if v == 0 { 0 } else { (v >> min_lod).max(1) };
            inner.textures.insert(
                name,
                TraceTexture {
                    storage,
                    extent: (
                        scale(parent_extent.0),
                        scale(parent_extent.1),
                        scale(parent_extent.2),
                    ),
                },
            );
            *inner.storages.entry(storage).or_insert(0) += 1;
        }
        inner.calls.push(format!(
            "texture_view({}, {:?}, {:?}, {}, {}, {}, {}) -> {}",
            parent, ty, format, min_lod, num_lods, min_layer, num_layers, name
        ));
        name
    }

    fn texture_buffer(&self, texture: TextureObj, format: Format, buffer: BufferObj) {
        self.new_texture_storage(texture, (0, 0, 0));
        self.rec(format!("texture_buffer({}, {:?}, {})", texture, format, buffer));
    }

    fn texture_buffer_range(
        &self,
        texture: TextureObj,
        format: Format,
        buffer: BufferObj,
        offset: usize,
        size: usize,
    ) {
        self.new_texture_storage(texture, (0, 0, 0));
        self.rec(format!(
            "texture_buffer_range({}, {:?}, {}, {}, {})",
            texture, format, buffer, offset, size
        ));
    }

    fn texture_swizzle(&self, texture: TextureObj, swizzle: TextureSwizzle) {
        self.rec(format!("texture_swizzle({}, {:?})", texture, swizzle));
    }

    fn generate_texture_mipmap(&self, texture: TextureObj) {
        self.rec(format!("generate_texture_mipmap({})", texture));
    }

    fn texture_sub_image(&self, texture: TextureObj, lod: u16, rect: TextureRect, data: &[u8]) {
        self.rec(format!(
            "texture_sub_image({}, {}, {:?}, len={})",
            texture,
            lod,
            rect,
            data.len()
        ));
    }

    fn get_texture_sub_image(
        &self,
        texture: TextureObj,
        lod: u16,
        rect: TextureRect,
        out: &mut [u8],
    ) {
        for b in out.iter_mut() {
            *b = 0;
        }
        self.rec(format!(
            "get_texture_sub_image({}, {}, {:?}, len={})",
            texture,
            lod,
            rect,
            out.len()
        ));
    }

    fn clear_tex_image(&self, texture: TextureObj, lod: u16, value: &ClearColorValue) {
        self.rec(format!("clear_tex_image({}, {}, {:?})", texture, lod, value));
    }

    fn clear_tex_sub_image(
        &self,
        texture: TextureObj,
        lod: u16,
        rect: TextureRect,
        value: &ClearColorValue,
    ) {
        self.rec(format!(
            "clear_tex_sub_image({}, {}, {:?}, {:?})",
            texture, lod, rect, value
        ));
    }

    fn invalidate_tex_image(&self, texture: TextureObj, lod: u16) {
        self.rec(format!("invalidate_tex_image({}, {})", texture, lod));
    }

    fn invalidate_tex_sub_image(&self, texture: TextureObj, lod: u16, rect: TextureRect) {
        self.rec(format!(
            "invalidate_tex_sub_image({}, {}, {:?})",
            texture, lod, rect
        ));
    }

    fn get_texture_level_parameter_i(
        &self,
        texture: TextureObj,
        lod: u16,
        param: TextureLevelParameter,
    ) -> i32 {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(format!(
            "get_texture_level_parameter_i({}, {}, {:?})",
            texture, lod, param
        ));
        let extent = inner
            .textures
            .get(&texture)
            .map_or((0, 0, 0), |t| t.extent);
        let scale = |v: u32| if v == 0 { 0 } else { (v >> lod).max(1) };
        (match param {
            TextureLevelParameter::Width => scale(extent.0),
            TextureLevelParameter::Height => scale(extent.1),
            TextureLevelParameter::Depth => scale(extent.2),
        }) as i32
    }

    fn bind_texture_unit(&self, unit: u32, texture: TextureObj) {
        self.rec(format!("bind_texture_unit({}, {})", unit, texture));
    }

    fn bind_sampler(&self, unit: u32, sampler: SamplerObj) {
        self.rec(format!("bind_sampler({}, {})", unit, sampler));
    }

    fn bind_image_texture(
        &self,
        unit: u32,
        texture: TextureObj,
        lod: u16,
        layered: bool,
        layer: u32,
        access: ImageAccess,
        format: Format,
    ) {
        self.rec(format!(
            "bind_image_texture({}, {}, {}, {}, {}, {:?}, {:?})",
            unit, texture, lod, layered, layer, access, format
        ));
    }

    fn create_sampler(&self, info: &SamplerInfo) -> SamplerObj {
        let name = self.inner.borrow_mut().name();
        self.rec(format!("create_sampler({:?}) -> {}", info, name));
        name
    }

    fn delete_sampler(&self, sampler: SamplerObj) {
        self.rec(format!("delete_sampler({})", sampler));
    }

    fn create_shader_program(
        &self,
        stage: ShaderStage,
        sources: &[&str],
    ) -> Result<ProgramObj, String> {
        if sources.iter().any(|s| s.contains("#error")) {
            self.rec(format!("create_shader_program({:?}) -> error", stage));
            return Err("0(1) : error: #error directive".to_string());
        }
        let name = self.inner.borrow_mut().name();
        self.rec(format!("create_shader_program({:?}) -> {}", stage, name));
        Ok(name)
    }

    fn program_binary(&self, binary: &[u8]) -> Result<ProgramObj, String> {
        if binary.is_empty() {
            return Err("empty program binary".to_string());
        }
        let name = self.inner.borrow_mut().name();
        self.rec(format!("program_binary(len={}) -> {}", binary.len(), name));
        Ok(name)
    }

    fn get_program_binary(&self, program: ProgramObj) -> Vec<u8> {
        self.rec(format!("get_program_binary({})", program));
        program.to_le_bytes().to_vec()
    }

    fn delete_program(&self, program: ProgramObj) {
        self.rec(format!("delete_program({})", program));
    }

    fn create_program_pipeline(&self) -> ProgramPipelineObj {
        let name = self.inner.borrow_mut().name();
        self.rec(format!("create_program_pipeline() -> {}", name));
        name
    }

    fn delete_program_pipeline(&self, pipeline: ProgramPipelineObj) {
        self.rec(format!("delete_program_pipeline({})", pipeline));
    }

    fn use_program_stages(
        &self,
        pipeline: ProgramPipelineObj,
        stage: ShaderStage,
        program: ProgramObj,
    ) {
        self.rec(format!(
            "use_program_stages({}, {:?}, {})",
            pipeline, stage, program
        ));
    }

    fn bind_program_pipeline(&self, pipeline: ProgramPipelineObj) {
        self.rec(format!("bind_program_pipeline({})", pipeline));
    }

    fn create_vertex_array(&self) -> VertexArrayObj {
        let name = self.inner.borrow_mut().name();
        self.rec(format!("create_vertex_array() -> {}", name));
        name
    }

    fn delete_vertex_array(&self, vao: VertexArrayObj) {
        self.rec(format!("delete_vertex_array({})", vao));
    }

    fn enable_vertex_array_attrib(&self, vao: VertexArrayObj, location: u32) {
        self.rec(format!("enable_vertex_array_attrib({}, {})", vao, location));
    }

    fn vertex_array_attrib_format(
        &self,
        vao: VertexArrayObj,
        location: u32,
        components: u8,
        ty: ComponentType,
        normalized: bool,
        relative_offset: u32,
    ) {
        self.rec(format!(
            "vertex_array_attrib_format({}, {}, {}, {:?}, {}, {})",
            vao, location, components, ty, normalized, relative_offset
        ));
    }

    fn vertex_array_attrib_i_format(
        &self,
        vao: VertexArrayObj,
        location: u32,
        components: u8,
        ty: ComponentType,
        relative_offset: u32,
    ) {
        self.rec(format!(
            "vertex_array_attrib_i_format({}, {}, {}, {:?}, {})",
            vao, location, components, ty, relative_offset
        ));
    }

    fn vertex_array_attrib_l_format(
        &self,
        vao: VertexArrayObj,
        location: u32,
        components: u8,
        ty: ComponentType,
        relative_offset: u32,
    ) {
        self.rec(format!(
            "vertex_array_attrib_l_format({}, {}, {}, {:?}, {})",
            vao, location, components, ty, relative_offset
        ));
    }

    fn vertex_array_attrib_binding(&self, vao: VertexArrayObj, location: u32, binding: u32) {
        self.rec(format!(
            "vertex_array_attrib_binding({}, {}, {})",
            vao, location, binding
        ));
    }

    fn vertex_array_binding_divisor(&self, vao: VertexArrayObj, binding: u32, divisor: u32) {
        self.rec(format!(
            "vertex_array_binding_divisor({}, {}, {})",
            vao, binding, divisor
        ));
    }

    fn vertex_array_vertex_buffer(
        &self,
        vao: VertexArrayObj,
        slot: u32,
        buffer: BufferObj,
        offset: usize,
        stride: u32,
    ) {
        self.rec(format!(
            "vertex_array_vertex_buffer({}, {}, {}, {}, {})",
            vao, slot, buffer, offset, stride
        ));
    }

    fn vertex_array_element_buffer(&self, vao: VertexArrayObj, buffer: BufferObj) {
        self.rec(format!("vertex_array_element_buffer({}, {})", vao, buffer));
    }

    fn bind_vertex_array(&self, vao: VertexArrayObj) {
        self.rec(format!("bind_vertex_array({})", vao));
    }

    fn create_framebuffer(&self) -> FramebufferObj {
        let name = self.inner.borrow_mut().name();
        self.rec(format!("create_framebuffer() -> {}", name));
        name
    }

    fn delete_framebuffer(&self, fb: FramebufferObj) {
        self.rec(format!("delete_framebuffer({})", fb));
    }

    fn named_framebuffer_texture(
        &self,
        fb: FramebufferObj,
        attachment: AttachmentPoint,
        texture: TextureObj,
        lod: u16,
    ) {
        self.rec(format!(
            "named_framebuffer_texture({}, {:?}, {}, {})",
            fb, attachment, texture, lod
        ));
    }

    fn named_framebuffer_texture_layer(
        &self,
        fb: FramebufferObj,
        attachment: AttachmentPoint,
        texture: TextureObj,
        lod: u16,
        layer: u32,
    ) {
        self.rec(format!(
            "named_framebuffer_texture_layer({}, {:?}, {}, {}, {})",
            fb, attachment, texture, lod, layer
        ));
    }

    fn named_framebuffer_draw_buffers(&self, fb: FramebufferObj, attachments: &[u32]) {
        self.rec(format!(
            "named_framebuffer_draw_buffers({}, {:?})",
            fb, attachments
        ));
    }

    fn check_named_framebuffer_complete(&self, fb: FramebufferObj) -> bool {
        self.rec(format!("check_named_framebuffer_complete({})", fb));
        true
    }

    fn bind_framebuffer(&self, target: FramebufferTarget, fb: FramebufferObj) {
        self.rec(format!("bind_framebuffer({:?}, {})", target, fb));
    }

    fn clear_named_framebuffer_color(
        &self,
        fb: FramebufferObj,
        draw_buffer: u32,
        value: &ClearColorValue,
    ) {
        self.rec(format!(
            "clear_named_framebuffer_color({}, {}, {:?})",
            fb, draw_buffer, value
        ));
    }

    fn clear_named_framebuffer_depth(&self, fb: FramebufferObj, depth: f32) {
        self.rec(format!("clear_named_framebuffer_depth({}, {})", fb, depth));
    }

    fn clear_named_framebuffer_stencil(&self, fb: FramebufferObj, stencil: u32) {
        self.rec(format!("clear_named_framebuffer_stencil({}, {})", fb, stencil));
    }

    fn clear_named_framebuffer_depth_stencil(&self, fb: FramebufferObj, depth: f32, stencil: u32) {
        self.rec(format!(
            "clear_named_framebuffer_depth_stencil({}, {}, {})",
            fb, depth, stencil
        ));
    }

    fn blit_named_framebuffer(
        &self,
        src: FramebufferObj,
        dst: FramebufferObj,
        src_rect: Rect2D,
        dst_rect: Rect2D,
        mask: BlitMask,
        filter: BlitFilter,
    ) {
        self.rec(format!(
            "blit_named_framebuffer({}, {}, {:?}, {:?}, {:?}, {:?})",
            src, dst, src_rect, dst_rect, mask, filter
        ));
    }

    fn copy_image_sub_data(
        &self,
        src: TextureObj,
        src_lod: u16,
        src_origin: (u32, u32, u32),
        dst: TextureObj,
        dst_lod: u16,
        dst_origin: (u32, u32, u32),
        extent: (u32, u32, u32),
    ) {
        self.rec(format!(
            "copy_image_sub_data({}, {}, {:?}, {}, {}, {:?}, {:?})",
            src, src_lod, src_origin, dst, dst_lod, dst_origin, extent
        ));
    }

    fn copy_read_framebuffer_to_texture(
        &self,
        texture: TextureObj,
        lod: u16,
        dst_origin: (u32, u32, u32),
        src_x: i32,
        src_y: i32,
        width: u32,
        height: u32,
    ) {
        self.rec(format!(
            "copy_read_framebuffer_to_texture({}, {}, {:?}, {}, {}, {}, {})",
            texture, lod, dst_origin, src_x, src_y, width, height
        ));
    }

    fn read_pixels(&self, x: i32, y: i32, width: u32, height: u32, offset: usize, size: usize) {
        self.rec(format!(
            "read_pixels({}, {}, {}, {}, {}, {})",
            x, y, width, height, offset, size
        ));
    }

    fn texture_sub_image_from_unpack(
        &self,
        texture: TextureObj,
        lod: u16,
        rect: TextureRect,
        offset: usize,
        size: usize,
    ) {
        self.rec(format!(
            "texture_sub_image_from_unpack({}, {}, {:?}, {}, {})",
            texture, lod, rect, offset, size
        ));
    }

    fn get_texture_sub_image_to_pack(
        &self,
        texture: TextureObj,
        lod: u16,
        rect: TextureRect,
        offset: usize,
        size: usize,
    ) {
        self.rec(format!(
            "get_texture_sub_image_to_pack({}, {}, {:?}, {}, {})",
            texture, lod, rect, offset, size
        ));
    }

    fn create_query(&self, target: QueryTarget) -> QueryObj {
        let name = self.inner.borrow_mut().name();
        self.rec(format!("create_query({:?}) -> {}", target, name));
        name
    }

    fn delete_query(&self, query: QueryObj) {
        self.rec(format!("delete_query({})", query));
    }

    fn begin_query_indexed(&self, target: QueryTarget, index: u32, query: QueryObj) {
        self.rec(format!(
            "begin_query_indexed({:?}, {}, {})",
            target, index, query
        ));
    }

    fn end_query_indexed(&self, target: QueryTarget, index: u32) {
        self.rec(format!("end_query_indexed({:?}, {})", target, index));
    }

    fn query_counter(&self, query: QueryObj) {
        self.rec(format!("query_counter({})", query));
    }

    fn get_query_result_u64(&self, query: QueryObj, wait: bool) -> u64 {
        self.rec(format!("get_query_result_u64({}, {})", query, wait));
        0
    }

    fn get_query_available(&self, query: QueryObj) -> bool {
        self.rec(format!("get_query_available({})", query));
        true
    }

    fn get_query_buffer_object(
        &self,
        query: QueryObj,
        buffer: BufferObj,
        offset: usize,
        mode: QueryResultMode,
        bits64: bool,
    ) {
        self.rec(format!(
            "get_query_buffer_object({}, {}, {}, {:?}, {})",
            query, buffer, offset, mode, bits64
        ));
    }

    fn begin_conditional_render(&self, query: QueryObj, mode: ConditionalRenderMode) {
        self.rec(format!("begin_conditional_render({}, {:?})", query, mode));
    }

    fn end_conditional_render(&self) {
        self.rec("end_conditional_render()".to_string());
    }

    fn create_transform_feedback(&self) -> TransformFeedbackObj {
        let name = self.inner.borrow_mut().name();
        self.rec(format!("create_transform_feedback() -> {}", name));
        name
    }

    fn delete_transform_feedback(&self, xfb: TransformFeedbackObj) {
        self.rec(format!("delete_transform_feedback({})", xfb));
    }

    fn transform_feedback_buffer_base(
        &self,
        xfb: TransformFeedbackObj,
        index: u32,
        buffer: BufferObj,
    ) {
        self.rec(format!(
            "transform_feedback_buffer_base({}, {}, {})",
            xfb, index, buffer
        ));
    }

    fn transform_feedback_buffer_range(
        &self,
        xfb: TransformFeedbackObj,
        index: u32,
        buffer: BufferObj,
        offset: usize,
        size: usize,
    ) {
        self.rec(format!(
            "transform_feedback_buffer_range({}, {}, {}, {}, {})",
            xfb, index, buffer, offset, size
        ));
    }

    fn bind_transform_feedback(&self, xfb: TransformFeedbackObj) {
        self.rec(format!("bind_transform_feedback({})", xfb));
    }

    fn begin_transform_feedback(&self, topology: PrimitiveTopology) {
        self.rec(format!("begin_transform_feedback({:?})", topology));
    }

    fn end_transform_feedback(&self) {
        self.rec("end_transform_feedback()".to_string());
    }

    fn pause_transform_feedback(&self) {
        self.rec("pause_transform_feedback()".to_string());
    }

    fn resume_transform_feedback(&self) {
        self.rec("resume_transform_feedback()".to_string());
    }

    fn draw_arrays(&self, topology: PrimitiveTopology, first: i32, count: i32) {
        self.rec(format!("draw_arrays({:?}, {}, {})", topology, first, count));
    }

    fn draw_arrays_instanced(
        &self,
        topology: PrimitiveTopology,
        first: i32,
        count: i32,
        instances: i32,
    ) {
        self.rec(format!(
            "draw_arrays_instanced({:?}, {}, {}, {})",
            topology, first, count, instances
        ));
    }

    fn draw_arrays_instanced_base_instance(
        &self,
        topology: PrimitiveTopology,
        first: i32,
        count: i32,
        instances: i32,
        base_instance: u32,
    ) {
        self.rec(format!(
            "draw_arrays_instanced_base_instance({:?}, {}, {}, {}, {})",
            topology, first, count, instances, base_instance
        ));
    }

    fn draw_elements(&self, topology: PrimitiveTopology, count: i32, ty: IndexType, offset: usize) {
        self.rec(format!(
            "draw_elements({:?}, {}, {:?}, {})",
            topology, count, ty, offset
        ));
    }

    fn draw_elements_base_vertex(
        &self,
        topology: PrimitiveTopology,
        count: i32,
        ty: IndexType,
        offset: usize,
        base_vertex: i32,
    ) {
        self.rec(format!(
            "draw_elements_base_vertex({:?}, {}, {:?}, {}, {})",
            topology, count, ty, offset, base_vertex
        ));
    }

    fn draw_elements_instanced(
        &self,
        topology: PrimitiveTopology,
        count: i32,
        ty: IndexType,
        offset: usize,
        instances: i32,
    ) {
        self.rec(format!(
            "draw_elements_instanced({:?}, {}, {:?}, {}, {})",
            topology, count, ty, offset, instances
        ));
    }

    fn draw_elements_instanced_base_vertex_base_instance(
        &self,
        topology: PrimitiveTopology,
        count: i32,
        ty: IndexType,
        offset: usize,
        instances: i32,
        base_vertex: i32,
        base_instance: u32,
    ) {
        self.rec(format!(
            "draw_elements_instanced_base_vertex_base_instance({:?}, {}, {:?}, {}, {}, {}, {})",
            topology, count, ty, offset, instances, base_vertex, base_instance
        ));
    }

    fn draw_arrays_indirect(&self, topology: PrimitiveTopology, offset: usize) {
        self.rec(format!("draw_arrays_indirect({:?}, {})", topology, offset));
    }

    fn draw_elements_indirect(&self, topology: PrimitiveTopology, ty: IndexType, offset: usize) {
        self.rec(format!(
            "draw_elements_indirect({:?}, {:?}, {})",
            topology, ty, offset
        ));
    }

    fn multi_draw_arrays_indirect(
        &self,
        topology: PrimitiveTopology,
        offset: usize,
        draw_count: i32,
        stride: u32,
    ) {
        self.rec(format!(
            "multi_draw_arrays_indirect({:?}, {}, {}, {})",
            topology, offset, draw_count, stride
        ));
    }

    fn multi_draw_elements_indirect(
        &self,
        topology: PrimitiveTopology,
        ty: IndexType,
        offset: usize,
        draw_count: i32,
        stride: u32,
    ) {
        self.rec(format!(
            "multi_draw_elements_indirect({:?}, {:?}, {}, {}, {})",
            topology, ty, offset, draw_count, stride
        ));
    }

    fn draw_transform_feedback(&self, topology: PrimitiveTopology, xfb: TransformFeedbackObj) {
        self.rec(format!("draw_transform_feedback({:?}, {})", topology, xfb));
    }

    fn draw_transform_feedback_stream(
        &self,
        topology: PrimitiveTopology,
        xfb: TransformFeedbackObj,
        stream: u32,
    ) {
        self.rec(format!(
            "draw_transform_feedback_stream({:?}, {}, {})",
            topology, xfb, stream
        ));
    }

    fn draw_transform_feedback_instanced(
        &self,
        topology: PrimitiveTopology,
        xfb: TransformFeedbackObj,
        instances: i32,
    ) {
        self.rec(format!(
            "draw_transform_feedback_instanced({:?}, {}, {})",
            topology, xfb, instances
        ));
    }

    fn draw_transform_feedback_stream_instanced(
        &self,
        topology: PrimitiveTopology,
        xfb: TransformFeedbackObj,
        stream: u32,
        instances: i32,
    ) {
        self.rec(format!(
            "draw_transform_feedback_stream_instanced({:?}, {}, {}, {})",
            topology, xfb, stream, instances
        ));
    }

    fn dispatch_compute(&self, x: u32, y: u32, z: u32) {
        self.rec(format!("dispatch_compute({}, {}, {})", x, y, z));
    }

    fn dispatch_compute_indirect(&self, offset: usize) {
        self.rec(format!("dispatch_compute_indirect({})", offset));
    }

    fn fence_sync(&self) -> SyncObj {
        let mut inner = self.inner.borrow_mut();
        inner.next_sync += 1;
        let sync = inner.next_sync;
        inner.calls.push(format!("fence_sync() -> {}", sync));
        sync
    }

    fn delete_sync(&self, sync: SyncObj) {
        self.rec(format!("delete_sync({})", sync));
    }

    fn client_wait_sync(&self, sync: SyncObj, flush: bool, timeout_ns: u64) -> ClientWaitStatus {
        self.rec(format!(
            "client_wait_sync({}, {}, {})",
            sync, flush, timeout_ns
        ));
        ClientWaitStatus::AlreadySignaled
    }

    fn wait_sync(&self, sync: SyncObj) {
        self.rec(format!("wait_sync({})", sync));
    }

    fn sync_is_signaled(&self, sync: SyncObj) -> bool {
        self.rec(format!("sync_is_signaled({})", sync));
        true
    }

    fn flush(&self) {
        self.rec("flush()".to_string());
    }

    fn memory_barrier(&self, flags: MemoryBarrierFlags) {
        self.rec(format!("memory_barrier({:?})", flags));
    }

    fn memory_barrier_by_region(&self, flags: MemoryBarrierFlags) {
        self.rec(format!("memory_barrier_by_region({:?})", flags));
    }

    fn texture_barrier(&self) {
        self.rec("texture_barrier()".to_string());
    }
}
