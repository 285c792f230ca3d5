//! The backend command sink.
//!
//! [`GlApi`] is the boundary between the abstraction layer and the driver:
//! one method per OpenGL 4.5 call the layer emits, typed with the crate's
//! enums instead of raw `GLenum`s. A production implementation forwards to
//! loaded function pointers; the [`trace`](crate::trace) implementation
//! records the call stream and models just enough memory for tests.
//!
//! Object handles are plain GL names. The layer never shares handles across
//! contexts, so no generation tagging is needed here; identity tracking for
//! caches uses device UIDs, not names.

use ignis_render::{
    BufferStorageFlags, ClearColorValue, CompareFunc, ComponentType, ConditionalRenderMode,
    FillMode, Format, FrontFace, IndexType, MutableAccess, MutableUsage, PrimitiveTopology,
    QueryTarget, Rect2D, SamplerInfo, ShaderStage, StencilOp, TextureRect, TextureResolution,
    TextureSwizzle, TextureType,
};

use bitflags::bitflags;

pub type BufferObj = u32;
pub type TextureObj = u32;
pub type SamplerObj = u32;
pub type ProgramObj = u32;
pub type ProgramPipelineObj = u32;
pub type VertexArrayObj = u32;
pub type FramebufferObj = u32;
pub type QueryObj = u32;
pub type TransformFeedbackObj = u32;
pub type SyncObj = u64;

/// The default framebuffer.
pub const DEFAULT_FRAMEBUFFER: FramebufferObj = 0;

/// Server-side capabilities toggled with enable/disable.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Capability {
    Blend,
    CullFace,
    DepthTest,
    StencilTest,
    ScissorTest,
    Multisample,
    RasterizerDiscard,
    LineSmooth,
    DepthClamp,
    PolygonOffset,
    PrimitiveRestartFixedIndex,
    TextureCubeMapSeamless,
    SampleAlphaToCoverage,
    SampleMask,
    ColorLogicOp,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    DrawIndirect,
    DispatchIndirect,
    PixelPack,
    PixelUnpack,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum IndexedBufferTarget {
    Uniform,
    ShaderStorage,
    TransformFeedback,
    AtomicCounter,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FramebufferTarget {
    Draw,
    Read,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AttachmentPoint {
    Color(u32),
    Depth,
    Stencil,
    DepthStencil,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StencilFace {
    Front,
    Back,
    FrontAndBack,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CullFace {
    Front,
    Back,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HintTarget {
    LineSmooth,
    PolygonSmooth,
    TextureCompression,
    FragmentShaderDerivative,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HintMode {
    Fastest,
    Nicest,
    DontCare,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ClipOrigin {
    LowerLeft,
    UpperLeft,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ClipDepth {
    NegativeOneToOne,
    ZeroToOne,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ColorClamp {
    Off,
    On,
    FixedOnly,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ImageAccess {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BlitFilter {
    Nearest,
    Linear,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ClientWaitStatus {
    AlreadySignaled,
    ConditionSatisfied,
    TimeoutExpired,
    Failed,
}

/// Which word of a query object a buffered readback copies.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum QueryResultMode {
    Result,
    ResultNoWait,
    Available,
}

/// Queryable per-buffer parameters.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BufferParameter {
    /// Allocated size in bytes.
    Size,
    Mapped,
}

/// Queryable per-level texture parameters.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TextureLevelParameter {
    Width,
    Height,
    Depth,
}

bitflags! {
    pub struct BlitMask: u8 {
        const COLOR = 0b001;
        const DEPTH = 0b010;
        const STENCIL = 0b100;
    }
}

bitflags! {
    pub struct MemoryBarrierFlags: u16 {
        const VERTEX_ATTRIB_ARRAY = 1 << 0;
        const ELEMENT_ARRAY = 1 << 1;
        const UNIFORM = 1 << 2;
        const TEXTURE_FETCH = 1 << 3;
        const SHADER_IMAGE_ACCESS = 1 << 4;
        const COMMAND = 1 << 5;
        const PIXEL_BUFFER = 1 << 6;
        const TEXTURE_UPDATE = 1 << 7;
        const BUFFER_UPDATE = 1 << 8;
        const FRAMEBUFFER = 1 << 9;
        const TRANSFORM_FEEDBACK = 1 << 10;
        const ATOMIC_COUNTER = 1 << 11;
        const SHADER_STORAGE = 1 << 12;
        const CLIENT_MAPPED_BUFFER = 1 << 13;
        const QUERY_BUFFER = 1 << 14;
    }
}

bitflags! {
    /// Access flags of a buffer mapping, as handed to the driver.
    pub struct MapAccessFlags: u16 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const INVALIDATE_RANGE = 1 << 2;
        const INVALIDATE_BUFFER = 1 << 3;
        const FLUSH_EXPLICIT = 1 << 4;
        const UNSYNCHRONIZED = 1 << 5;
        const PERSISTENT = 1 << 6;
        const COHERENT = 1 << 7;
    }
}

/// Implementation limits and capability flags, queried once per device.
#[derive(Copy, Clone, Debug)]
pub struct DeviceCaps {
    pub half_float_vertex: bool,
    pub half_float_pixel: bool,
    pub texture_compression_s3tc: bool,
    pub texture_anisotropy: bool,
    pub polygon_offset_clamp: bool,
    pub max_texture_anisotropy: u32,
    pub max_vertex_buffer_slots: u32,
    pub max_vertex_attrib_stride: u32,
    pub max_vertex_attrib_relative_offset: u32,
    pub max_combined_texture_image_units: u32,
    pub max_image_units: u32,
    pub max_texture_buffer_size: u32,
    pub texture_buffer_offset_alignment: u32,
    pub uniform_buffer_offset_alignment: u32,
    pub shader_storage_buffer_offset_alignment: u32,
    pub max_uniform_buffer_bindings: u32,
    pub max_shader_storage_buffer_bindings: u32,
    pub max_transform_feedback_buffers: u32,
    pub max_atomic_counter_buffer_bindings: u32,
    pub max_draw_buffers: u32,
    pub max_color_attachments: u32,
    pub max_viewports: u32,
}

impl Default for DeviceCaps {
    /// The minimum guarantees of the targeted feature level.
    fn default() -> Self {
        DeviceCaps {
            half_float_vertex: true,
            half_float_pixel: true,
            texture_compression_s3tc: true,
            texture_anisotropy: true,
            polygon_offset_clamp: true,
            max_texture_anisotropy: 16,
            max_vertex_buffer_slots: 32,
            max_vertex_attrib_stride: 2048,
            max_vertex_attrib_relative_offset: 2047,
            max_combined_texture_image_units: 96,
            max_image_units: 8,
            max_texture_buffer_size: 1 << 27,
            texture_buffer_offset_alignment: 16,
            uniform_buffer_offset_alignment: 256,
            shader_storage_buffer_offset_alignment: 32,
            max_uniform_buffer_bindings: 84,
            max_shader_storage_buffer_bindings: 16,
            max_transform_feedback_buffers: 4,
            max_atomic_counter_buffer_bindings: 8,
            max_draw_buffers: 8,
            max_color_attachments: 8,
            max_viewports: 16,
        }
    }
}

/// Typed OpenGL 4.5 command sink.
///
/// Methods map 1:1 onto GL entry points (direct-state-access forms). The
/// layer above is responsible for redundancy elimination; implementations
/// must perform every call they receive.
#[allow(clippy::too_many_arguments)]
pub trait GlApi {
    fn caps(&self) -> DeviceCaps;

    // ---- global state -------------------------------------------------
    fn enable(&self, cap: Capability);
    fn disable(&self, cap: Capability);
    fn enable_indexed(&self, cap: Capability, index: u32);
    fn disable_indexed(&self, cap: Capability, index: u32);
    fn hint(&self, target: HintTarget, mode: HintMode);
    fn clip_control(&self, origin: ClipOrigin, depth: ClipDepth);
    fn clamp_read_color(&self, clamp: ColorClamp);
    fn pixel_store_pack_alignment(&self, alignment: u32);
    fn pixel_store_unpack_alignment(&self, alignment: u32);

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn viewport_array(&self, first: u32, viewports: &[[f32; 4]]);
    fn scissor(&self, x: i32, y: i32, width: i32, height: i32);
    fn scissor_array(&self, first: u32, rects: &[[i32; 4]]);

    fn blend_func(&self, src: ignis_render::BlendFunc, dst: ignis_render::BlendFunc);
    fn blend_func_indexed(
        &self,
        index: u32,
        src: ignis_render::BlendFunc,
        dst: ignis_render::BlendFunc,
    );
    fn blend_func_separate(
        &self,
        src_rgb: ignis_render::BlendFunc,
        dst_rgb: ignis_render::BlendFunc,
        src_alpha: ignis_render::BlendFunc,
        dst_alpha: ignis_render::BlendFunc,
    );
    fn blend_func_separate_indexed(
        &self,
        index: u32,
        src_rgb: ignis_render::BlendFunc,
        dst_rgb: ignis_render::BlendFunc,
        src_alpha: ignis_render::BlendFunc,
        dst_alpha: ignis_render::BlendFunc,
    );
    fn blend_equation(&self, op: ignis_render::BlendOp);
    fn blend_equation_indexed(&self, index: u32, op: ignis_render::BlendOp);
    fn blend_equation_separate(&self, rgb: ignis_render::BlendOp, alpha: ignis_render::BlendOp);
    fn blend_equation_separate_indexed(
        &self,
        index: u32,
        rgb: ignis_render::BlendOp,
        alpha: ignis_render::BlendOp,
    );
    fn blend_color(&self, color: [f32; 4]);
    fn logic_op(&self, op: ignis_render::LogicOp);
    fn color_mask(&self, r: bool, g: bool, b: bool, a: bool);
    fn color_mask_indexed(&self, index: u32, r: bool, g: bool, b: bool, a: bool);
    fn sample_mask(&self, word: u32, mask: u32);

    fn cull_face(&self, face: CullFace);
    fn front_face(&self, front: FrontFace);
    fn polygon_mode(&self, mode: FillMode);
    fn polygon_offset(&self, slope: f32, bias: f32);
    fn polygon_offset_clamp(&self, slope: f32, bias: f32, clamp: f32);
    fn patch_vertices(&self, count: u32);

    fn depth_func(&self, func: CompareFunc);
    fn depth_mask(&self, write: bool);
    fn stencil_func_separate(&self, face: StencilFace, func: CompareFunc, reference: i32, mask: u32);
    fn stencil_op_separate(
        &self,
        face: StencilFace,
        fail: StencilOp,
        depth_fail: StencilOp,
        pass: StencilOp,
    );
    fn stencil_mask_separate(&self, face: StencilFace, mask: u32);

    // ---- buffers ------------------------------------------------------
    fn create_buffer(&self) -> BufferObj;
    fn delete_buffer(&self, buffer: BufferObj);
    fn named_buffer_storage(
        &self,
        buffer: BufferObj,
        size: usize,
        data: Option<&[u8]>,
        flags: BufferStorageFlags,
    );
    fn named_buffer_data(
        &self,
        buffer: BufferObj,
        size: usize,
        data: Option<&[u8]>,
        access: MutableAccess,
        usage: MutableUsage,
    );
    fn named_buffer_sub_data(&self, buffer: BufferObj, offset: usize, data: &[u8]);
    fn get_named_buffer_sub_data(&self, buffer: BufferObj, offset: usize, out: &mut [u8]);
    fn copy_named_buffer_sub_data(
        &self,
        src: BufferObj,
        dst: BufferObj,
        src_offset: usize,
        dst_offset: usize,
        size: usize,
    );
    fn clear_named_buffer_sub_data(
        &self,
        buffer: BufferObj,
        offset: usize,
        size: usize,
        internal_format: Format,
        value: &ClearColorValue,
    );
    fn map_named_buffer_range(
        &self,
        buffer: BufferObj,
        offset: usize,
        length: usize,
        access: MapAccessFlags,
    ) -> *mut u8;
    fn unmap_named_buffer(&self, buffer: BufferObj) -> bool;
    fn flush_mapped_named_buffer_range(&self, buffer: BufferObj, offset: usize, length: usize);
    fn invalidate_buffer_data(&self, buffer: BufferObj);
    fn invalidate_buffer_sub_data(&self, buffer: BufferObj, offset: usize, length: usize);
    /// Reads a buffer parameter back from the driver, e.g. the size the
    /// allocation actually got.
    fn get_named_buffer_parameter_i64(&self, buffer: BufferObj, param: BufferParameter) -> i64;

    fn bind_buffer(&self, target: BufferTarget, buffer: BufferObj);
    fn bind_buffer_base(&self, target: IndexedBufferTarget, slot: u32, buffer: BufferObj);
    fn bind_buffer_range(
        &self,
        target: IndexedBufferTarget,
        slot: u32,
        buffer: BufferObj,
        offset: usize,
        size: usize,
    );

    // ---- textures -----------------------------------------------------
    fn create_texture(&self, ty: TextureType) -> TextureObj;
    fn delete_texture(&self, texture: TextureObj);
    fn texture_storage_1d(&self, texture: TextureObj, levels: u16, format: Format, width: u32);
    fn texture_storage_2d(
        &self,
        texture: TextureObj,
        levels: u16,
        format: Format,
        width: u32,
        height: u32,
    );
    fn texture_storage_3d(
        &self,
        texture: TextureObj,
        levels: u16,
        format: Format,
        width: u32,
        height: u32,
        depth: u32,
    );
    fn texture_storage_2d_multisample(
        &self,
        texture: TextureObj,
        samples: u8,
        fixed_sample_locations: bool,
        format: Format,
        width: u32,
        height: u32,
    );
    fn texture_storage_3d_multisample(
        &self,
        texture: TextureObj,
        samples: u8,
        fixed_sample_locations: bool,
        format: Format,
        width: u32,
        height: u32,
        depth: u32,
    );
    /// Mutable (non-immutable-storage) allocation of a single lod.
    fn texture_image(
        &self,
        texture: TextureObj,
        ty: TextureType,
        lod: u16,
        format: Format,
        resolution: TextureResolution,
        data: Option<&[u8]>,
    );
    fn texture_view(
        &self,
        parent: TextureObj,
        ty: TextureType,
        format: Format,
        min_lod: u16,
        num_lods: u16,
        min_layer: u32,
        num_layers: u32,
    ) -> TextureObj;
    fn texture_buffer(&self, texture: TextureObj, format: Format, buffer: BufferObj);
    fn texture_buffer_range(
        &self,
        texture: TextureObj,
        format: Format,
        buffer: BufferObj,
        offset: usize,
        size: usize,
    );
    fn texture_swizzle(&self, texture: TextureObj, swizzle: TextureSwizzle);
    fn generate_texture_mipmap(&self, texture: TextureObj);
    fn texture_sub_image(&self, texture: TextureObj, lod: u16, rect: TextureRect, data: &[u8]);
    fn get_texture_sub_image(
        &self,
        texture: TextureObj,
        lod: u16,
        rect: TextureRect,
        out: &mut [u8],
    );
    fn clear_tex_image(&self, texture: TextureObj, lod: u16, value: &ClearColorValue);
    fn clear_tex_sub_image(
        &self,
        texture: TextureObj,
        lod: u16,
        rect: TextureRect,
        value: &ClearColorValue,
    );
    fn invalidate_tex_image(&self, texture: TextureObj, lod: u16);
    fn invalidate_tex_sub_image(&self, texture: TextureObj, lod: u16, rect: TextureRect);
    /// Reads a level parameter back from the driver, e.g. the extent the
    /// allocation actually got.
    fn get_texture_level_parameter_i(
        &self,
        texture: TextureObj,
        lod: u16,
        param: TextureLevelParameter,
    ) -> i32;

    fn bind_texture_unit(&self, unit: u32, texture: TextureObj);
    fn bind_sampler(&self, unit: u32, sampler: SamplerObj);
    fn bind_image_texture(
        &self,
        unit: u32,
        texture: TextureObj,
        lod: u16,
        layered: bool,
        layer: u32,
        access: ImageAccess,
        format: Format,
    );

    // ---- samplers -----------------------------------------------------
    fn create_sampler(&self, info: &SamplerInfo) -> SamplerObj;
    fn delete_sampler(&self, sampler: SamplerObj);

    // ---- programs and pipelines --------------------------------------
    fn create_shader_program(
        &self,
        stage: ShaderStage,
        sources: &[&str],
    ) -> Result<ProgramObj, String>;
    fn program_binary(&self, binary: &[u8]) -> Result<ProgramObj, String>;
    fn get_program_binary(&self, program: ProgramObj) -> Vec<u8>;
    fn delete_program(&self, program: ProgramObj);
    fn create_program_pipeline(&self) -> ProgramPipelineObj;
    fn delete_program_pipeline(&self, pipeline: ProgramPipelineObj);
    fn use_program_stages(
        &self,
        pipeline: ProgramPipelineObj,
        stage: ShaderStage,
        program: ProgramObj,
    );
    fn bind_program_pipeline(&self, pipeline: ProgramPipelineObj);

    // ---- vertex arrays ------------------------------------------------
    fn create_vertex_array(&self) -> VertexArrayObj;
    fn delete_vertex_array(&self, vao: VertexArrayObj);
    fn enable_vertex_array_attrib(&self, vao: VertexArrayObj, location: u32);
    fn vertex_array_attrib_format(
        &self,
        vao: VertexArrayObj,
        location: u32,
        components: u8,
        ty: ComponentType,
        normalized: bool,
        relative_offset: u32,
    );
    fn vertex_array_attrib_i_format(
        &self,
        vao: VertexArrayObj,
        location: u32,
        components: u8,
        ty: ComponentType,
        relative_offset: u32,
    );
    fn vertex_array_attrib_l_format(
        &self,
        vao: VertexArrayObj,
        location: u32,
        components: u8,
        ty: ComponentType,
        relative_offset: u32,
    );
    fn vertex_array_attrib_binding(&self, vao: VertexArrayObj, location: u32, binding: u32);
    fn vertex_array_binding_divisor(&self, vao: VertexArrayObj, binding: u32, divisor: u32);
    fn vertex_array_vertex_buffer(
        &self,
        vao: VertexArrayObj,
        slot: u32,
        buffer: BufferObj,
        offset: usize,
        stride: u32,
    );
    fn vertex_array_element_buffer(&self, vao: VertexArrayObj, buffer: BufferObj);
    fn bind_vertex_array(&self, vao: VertexArrayObj);

    // ---- framebuffers -------------------------------------------------
    fn create_framebuffer(&self) -> FramebufferObj;
    fn delete_framebuffer(&self, fb: FramebufferObj);
    fn named_framebuffer_texture(
        &self,
        fb: FramebufferObj,
        attachment: AttachmentPoint,
        texture: TextureObj,
        lod: u16,
    );
    fn named_framebuffer_texture_layer(
        &self,
        fb: FramebufferObj,
        attachment: AttachmentPoint,
        texture: TextureObj,
        lod: u16,
        layer: u32,
    );
    fn named_framebuffer_draw_buffers(&self, fb: FramebufferObj, attachments: &[u32]);
    fn check_named_framebuffer_complete(&self, fb: FramebufferObj) -> bool;
    fn bind_framebuffer(&self, target: FramebufferTarget, fb: FramebufferObj);
    fn clear_named_framebuffer_color(
        &self,
        fb: FramebufferObj,
        draw_buffer: u32,
        value: &ClearColorValue,
    );
    fn clear_named_framebuffer_depth(&self, fb: FramebufferObj, depth: f32);
    fn clear_named_framebuffer_stencil(&self, fb: FramebufferObj, stencil: u32);
    fn clear_named_framebuffer_depth_stencil(&self, fb: FramebufferObj, depth: f32, stencil: u32);
    fn blit_named_framebuffer(
        &self,
        src: FramebufferObj,
        dst: FramebufferObj,
        src_rect: Rect2D,
        dst_rect: Rect2D,
        mask: BlitMask,
        filter: BlitFilter,
    );

    // ---- copies -------------------------------------------------------
    fn copy_image_sub_data(
        &self,
        src: TextureObj,
        src_lod: u16,
        src_origin: (u32, u32, u32),
        dst: TextureObj,
        dst_lod: u16,
        dst_origin: (u32, u32, u32),
        extent: (u32, u32, u32),
    );
    /// Reads from the currently bound read framebuffer.
    fn copy_read_framebuffer_to_texture(
        &self,
        texture: TextureObj,
        lod: u16,
        dst_origin: (u32, u32, u32),
        src_x: i32,
        src_y: i32,
        width: u32,
        height: u32,
    );
    /// Packs into the currently bound pixel-pack buffer at `offset`.
    fn read_pixels(&self, x: i32, y: i32, width: u32, height: u32, offset: usize, size: usize);
    /// Unpacks from the currently bound pixel-unpack buffer.
    fn texture_sub_image_from_unpack(
        &self,
        texture: TextureObj,
        lod: u16,
        rect: TextureRect,
        offset: usize,
        size: usize,
    );
    /// Packs a texture region into the bound pixel-pack buffer.
    fn get_texture_sub_image_to_pack(
        &self,
        texture: TextureObj,
        lod: u16,
        rect: TextureRect,
        offset: usize,
        size: usize,
    );

    // ---- queries ------------------------------------------------------
    fn create_query(&self, target: QueryTarget) -> QueryObj;
    fn delete_query(&self, query: QueryObj);
    fn begin_query_indexed(&self, target: QueryTarget, index: u32, query: QueryObj);
    fn end_query_indexed(&self, target: QueryTarget, index: u32);
    fn query_counter(&self, query: QueryObj);
    fn get_query_result_u64(&self, query: QueryObj, wait: bool) -> u64;
    fn get_query_available(&self, query: QueryObj) -> bool;
    /// Copies one query word into a bound buffer at `offset`.
    fn get_query_buffer_object(
        &self,
        query: QueryObj,
        buffer: BufferObj,
        offset: usize,
        mode: QueryResultMode,
        bits64: bool,
    );
    fn begin_conditional_render(&self, query: QueryObj, mode: ConditionalRenderMode);
    fn end_conditional_render(&self);

    // ---- transform feedback -------------------------------------------
    fn create_transform_feedback(&self) -> TransformFeedbackObj;
    fn delete_transform_feedback(&self, xfb: TransformFeedbackObj);
    fn transform_feedback_buffer_base(&self, xfb: TransformFeedbackObj, index: u32, buffer: BufferObj);
    fn transform_feedback_buffer_range(
        &self,
        xfb: TransformFeedbackObj,
        index: u32,
        buffer: BufferObj,
        offset: usize,
        size: usize,
    );
    fn bind_transform_feedback(&self, xfb: TransformFeedbackObj);
    fn begin_transform_feedback(&self, topology: PrimitiveTopology);
    fn end_transform_feedback(&self);
    fn pause_transform_feedback(&self);
    fn resume_transform_feedback(&self);

    // ---- draws --------------------------------------------------------
    fn draw_arrays(&self, topology: PrimitiveTopology, first: i32, count: i32);
    fn draw_arrays_instanced(
        &self,
        topology: PrimitiveTopology,
        first: i32,
        count: i32,
        instances: i32,
    );
    fn draw_arrays_instanced_base_instance(
        &self,
        topology: PrimitiveTopology,
        first: i32,
        count: i32,
        instances: i32,
        base_instance: u32,
    );
    fn draw_elements(&self, topology: PrimitiveTopology, count: i32, ty: IndexType, offset: usize);
    fn draw_elements_base_vertex(
        &self,
        topology: PrimitiveTopology,
        count: i32,
        ty: IndexType,
        offset: usize,
        base_vertex: i32,
    );
    fn draw_elements_instanced(
        &self,
        topology: PrimitiveTopology,
        count: i32,
        ty: IndexType,
        offset: usize,
        instances: i32,
    );
    fn draw_elements_instanced_base_vertex_base_instance(
        &self,
        topology: PrimitiveTopology,
        count: i32,
        ty: IndexType,
        offset: usize,
        instances: i32,
        base_vertex: i32,
        base_instance: u32,
    );
    fn draw_arrays_indirect(&self, topology: PrimitiveTopology, offset: usize);
    fn draw_elements_indirect(&self, topology: PrimitiveTopology, ty: IndexType, offset: usize);
    fn multi_draw_arrays_indirect(
        &self,
        topology: PrimitiveTopology,
        offset: usize,
        draw_count: i32,
        stride: u32,
    );
    fn multi_draw_elements_indirect(
        &self,
        topology: PrimitiveTopology,
        ty: IndexType,
        offset: usize,
        draw_count: i32,
        stride: u32,
    );
    fn draw_transform_feedback(&self, topology: PrimitiveTopology, xfb: TransformFeedbackObj);
    fn draw_transform_feedback_stream(
        &self,
        topology: PrimitiveTopology,
        xfb: TransformFeedbackObj,
        stream: u32,
    );
    fn draw_transform_feedback_instanced(
        &self,
        topology: PrimitiveTopology,
        xfb: TransformFeedbackObj,
        instances: i32,
    );
    fn draw_transform_feedback_stream_instanced(
        &self,
        topology: PrimitiveTopology,
        xfb: TransformFeedbackObj,
        stream: u32,
        instances: i32,
    );
    fn dispatch_compute(&self, x: u32, y: u32, z: u32);
    fn dispatch_compute_indirect(&self, offset: usize);

    // ---- sync ---------------------------------------------------------
    fn fence_sync(&self) -> SyncObj;
    fn delete_sync(&self, sync: SyncObj);
    fn client_wait_sync(&self, sync: SyncObj, flush: bool, timeout_ns: u64) -> ClientWaitStatus;
    fn wait_sync(&self, sync: SyncObj);
    fn sync_is_signaled(&self, sync: SyncObj) -> bool;
    fn flush(&self);
    fn memory_barrier(&self, flags: MemoryBarrierFlags);
    fn memory_barrier_by_region(&self, flags: MemoryBarrierFlags);
    fn texture_barrier(&self);
}
