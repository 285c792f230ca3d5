//! Fixed-function pipeline state descriptors.
//!
//! These are pure values: the device hash-conses them, so two pipelines
//! built from equal descriptors share one cached entry. Floats that take
//! part in equality are stored as `NotNan`.

use bitflags::bitflags;
use ordered_float::NotNan;

use crate::MAX_COLOR_ATTACHMENTS;

//--------------------------------------------------------------------------------------------------
// Blending

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BlendFunc {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
    SrcAlphaSaturate,
    Src1Color,
    OneMinusSrc1Color,
    Src1Alpha,
    OneMinusSrc1Alpha,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LogicOp {
    Clear,
    Set,
    Copy,
    CopyInverted,
    Noop,
    Invert,
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Equiv,
    AndReverse,
    AndInverted,
    OrReverse,
    OrInverted,
}

bitflags! {
    pub struct ColorWriteMask: u8 {
        const R = 0b0001;
        const G = 0b0010;
        const B = 0b0100;
        const A = 0b1000;
        const RGBA = 0b1111;
    }
}

/// Ready-made blending configurations.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BlendingPreset {
    NoBlend,
    Alpha,
    PremultipliedAlpha,
    ColorAdd,
    Multiply,
    SourceToDest,
    AddMul,
    AddAlpha,
}

/// Blending state of one color target.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RenderTargetBlendingInfo {
    pub enable: bool,
    pub color_write_mask: ColorWriteMask,
    pub src_rgb: BlendFunc,
    pub dst_rgb: BlendFunc,
    pub src_alpha: BlendFunc,
    pub dst_alpha: BlendFunc,
    pub op_rgb: BlendOp,
    pub op_alpha: BlendOp,
}

impl Default for RenderTargetBlendingInfo {
    fn default() -> Self {
        RenderTargetBlendingInfo::from_preset(BlendingPreset::NoBlend)
    }
}

impl RenderTargetBlendingInfo {
    pub fn from_preset(preset: BlendingPreset) -> RenderTargetBlendingInfo {
        let (enable, src, dst) = match preset {
            BlendingPreset::NoBlend => (false, BlendFunc::One, BlendFunc::Zero),
            BlendingPreset::Alpha => (true, BlendFunc::SrcAlpha, BlendFunc::OneMinusSrcAlpha),
            BlendingPreset::PremultipliedAlpha => {
                (true, BlendFunc::One, BlendFunc::OneMinusSrcAlpha)
            }
            BlendingPreset::ColorAdd => (true, BlendFunc::One, BlendFunc::One),
            BlendingPreset::Multiply => (true, BlendFunc::DstColor, BlendFunc::Zero),
            BlendingPreset::SourceToDest => (true, BlendFunc::SrcColor, BlendFunc::One),
            BlendingPreset::AddMul => (true, BlendFunc::OneMinusDstColor, BlendFunc::One),
            BlendingPreset::AddAlpha => (true, BlendFunc::SrcAlpha, BlendFunc::One),
        };
        RenderTargetBlendingInfo {
            enable,
            color_write_mask: ColorWriteMask::RGBA,
            src_rgb: src,
            dst_rgb: dst,
            src_alpha: src,
            dst_alpha: dst,
            op_rgb: BlendOp::Add,
            op_alpha: BlendOp::Add,
        }
    }
}

/// Complete blending state of a pipeline.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BlendingStateInfo {
    /// When false, slot 0 applies to every target.
    pub independent: bool,
    pub alpha_to_coverage: bool,
    /// `LogicOp::Copy` means the color logic op stays disabled.
    pub logic_op: LogicOp,
    pub constant_color: [NotNan<f32>; 4],
    /// `None` disables the sample mask test.
    pub sample_mask: Option<[u32; 4]>,
    pub render_targets: [RenderTargetBlendingInfo; MAX_COLOR_ATTACHMENTS],
}

impl Default for BlendingStateInfo {
    fn default() -> Self {
        let zero = NotNan::new(0.0).unwrap();
        BlendingStateInfo {
            independent: false,
            alpha_to_coverage: false,
            logic_op: LogicOp::Copy,
            constant_color: [zero; 4],
            sample_mask: None,
            render_targets: [RenderTargetBlendingInfo::default(); MAX_COLOR_ATTACHMENTS],
        }
    }
}

impl BlendingStateInfo {
    pub fn from_preset(preset: BlendingPreset) -> BlendingStateInfo {
        BlendingStateInfo {
            render_targets: [RenderTargetBlendingInfo::from_preset(preset);
                MAX_COLOR_ATTACHMENTS],
            ..Default::default()
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Rasterizer

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FillMode {
    Solid,
    Wireframe,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CullMode {
    None,
    Front,
    Back,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FrontFace {
    CounterClockwise,
    Clockwise,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PolygonOffset {
    pub slope: NotNan<f32>,
    pub bias: i32,
    pub clamp: NotNan<f32>,
}

impl Default for PolygonOffset {
    fn default() -> Self {
        let zero = NotNan::new(0.0).unwrap();
        PolygonOffset {
            slope: zero,
            bias: 0,
            clamp: zero,
        }
    }
}

impl PolygonOffset {
    /// Offset is applied only when any component is non-zero.
    pub fn is_enabled(&self) -> bool {
        self.slope.into_inner() != 0.0 || self.bias != 0 || self.clamp.into_inner() != 0.0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RasterizerStateInfo {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub scissor_enable: bool,
    pub multisample: bool,
    pub rasterizer_discard: bool,
    pub line_smooth: bool,
    pub depth_clamp: bool,
    pub offset: PolygonOffset,
}

impl Default for RasterizerStateInfo {
    fn default() -> Self {
        RasterizerStateInfo {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
            scissor_enable: false,
            multisample: false,
            rasterizer_discard: false,
            line_smooth: false,
            depth_clamp: false,
            offset: PolygonOffset::default(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Depth / stencil

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    IncrementAndClamp,
    DecrementAndClamp,
    Invert,
    IncrementAndWrap,
    DecrementAndWrap,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct StencilFaceInfo {
    pub fail_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub pass_op: StencilOp,
    pub func: CompareFunc,
}

impl Default for StencilFaceInfo {
    fn default() -> Self {
        StencilFaceInfo {
            fail_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
            func: CompareFunc::Always,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DepthStencilStateInfo {
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_func: CompareFunc,
    pub stencil_test: bool,
    pub stencil_read_mask: u32,
    pub stencil_write_mask: u32,
    pub front: StencilFaceInfo,
    pub back: StencilFaceInfo,
}

impl Default for DepthStencilStateInfo {
    fn default() -> Self {
        DepthStencilStateInfo {
            depth_test: true,
            depth_write: true,
            depth_func: CompareFunc::Less,
            stencil_test: false,
            stencil_read_mask: !0,
            stencil_write_mask: !0,
            front: StencilFaceInfo::default(),
            back: StencilFaceInfo::default(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Shader stages, input assembly, viewport

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    TessControl,
    TessEval,
    Geometry,
    Fragment,
    Compute,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PrimitiveTopology {
    Points,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
    TriangleFan,
    /// Tessellation patches; the patch size is a pipeline property.
    Patches,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    pub fn with_rect(x: f32, y: f32, width: f32, height: f32) -> Viewport {
        Viewport {
            x,
            y,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_preset() {
        let b = RenderTargetBlendingInfo::from_preset(BlendingPreset::Alpha);
        assert!(b.enable);
        assert_eq!(b.color_write_mask, ColorWriteMask::RGBA);
        assert_eq!(b.src_rgb, BlendFunc::SrcAlpha);
        assert_eq!(b.dst_rgb, BlendFunc::OneMinusSrcAlpha);
        assert_eq!(b.src_alpha, BlendFunc::SrcAlpha);
        assert_eq!(b.dst_alpha, BlendFunc::OneMinusSrcAlpha);
        assert_eq!(b.op_rgb, BlendOp::Add);
        assert_eq!(b.op_alpha, BlendOp::Add);
    }

    #[test]
    fn no_blend_preset_is_default() {
        assert_eq!(
            RenderTargetBlendingInfo::default(),
            RenderTargetBlendingInfo::from_preset(BlendingPreset::NoBlend)
        );
    }

    #[test]
    fn add_mul_preset() {
        let b = RenderTargetBlendingInfo::from_preset(BlendingPreset::AddMul);
        assert_eq!(b.src_rgb, BlendFunc::OneMinusDstColor);
        assert_eq!(b.dst_rgb, BlendFunc::One);
    }

    #[test]
    fn polygon_offset_enable() {
        let mut off = PolygonOffset::default();
        assert!(!off.is_enabled());
        off.bias = 2;
        assert!(off.is_enabled());
    }
}
