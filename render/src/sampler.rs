//! Sampler descriptors.

use ordered_float::NotNan;

use crate::pipeline::CompareFunc;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MipmapMode {
    Nearest,
    Linear,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AddressMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
    MirrorClampToEdge,
}

/// Sampler description. A pure value: the device returns one cached sampler
/// object per distinct descriptor.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SamplerInfo {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub mipmap_mode: MipmapMode,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub address_w: AddressMode,
    pub lod_bias: NotNan<f32>,
    pub min_lod: NotNan<f32>,
    pub max_lod: NotNan<f32>,
    /// 0 disables anisotropic filtering.
    pub max_anisotropy: u8,
    /// `Some` switches the sampler to compare-to-texture mode.
    pub compare: Option<CompareFunc>,
    pub border_color: [NotNan<f32>; 4],
    pub seamless_cubemap: bool,
}

impl Default for SamplerInfo {
    fn default() -> Self {
        let zero = NotNan::new(0.0).unwrap();
        SamplerInfo {
            min_filter: Filter::Nearest,
            mag_filter: Filter::Nearest,
            mipmap_mode: MipmapMode::Linear,
            address_u: AddressMode::Repeat,
            address_v: AddressMode::Repeat,
            address_w: AddressMode::Repeat,
            lod_bias: zero,
            min_lod: NotNan::new(-1000.0).unwrap(),
            max_lod: NotNan::new(1000.0).unwrap(),
            max_anisotropy: 0,
            compare: None,
            border_color: [zero; 4],
            seamless_cubemap: false,
        }
    }
}

impl SamplerInfo {
    /// Trilinear filtering with repeat addressing.
    pub fn linear() -> SamplerInfo {
        SamplerInfo {
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
            mipmap_mode: MipmapMode::Linear,
            ..Default::default()
        }
    }
}
