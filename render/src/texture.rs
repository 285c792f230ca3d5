//! Texture descriptors: types, resolutions, multisampling, swizzle.

use crate::format::Format;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TextureType {
    Tex1D,
    Tex1DArray,
    Tex2D,
    Tex2DMultisample,
    Tex2DArray,
    Tex2DArrayMultisample,
    Tex3D,
    Cubemap,
    CubemapArray,
    Rect,
}

impl TextureType {
    pub fn is_multisample(self) -> bool {
        matches!(
            self,
            TextureType::Tex2DMultisample | TextureType::Tex2DArrayMultisample
        )
    }

    pub fn is_array(self) -> bool {
        matches!(
            self,
            TextureType::Tex1DArray
                | TextureType::Tex2DArray
                | TextureType::Tex2DArrayMultisample
                | TextureType::CubemapArray
        )
    }

    /// Targets a view of type `view` may be created over storage of type
    /// `self`, per the core view compatibility table.
    pub fn view_compatible_with(self, view: TextureType) -> bool {
        use self::TextureType::*;
        match self {
            Tex1D | Tex1DArray => matches!(view, Tex1D | Tex1DArray),
            Tex2D | Tex2DArray => matches!(view, Tex2D | Tex2DArray),
            Tex2DMultisample | Tex2DArrayMultisample => {
                matches!(view, Tex2DMultisample | Tex2DArrayMultisample)
            }
            Tex3D => matches!(view, Tex3D),
            Cubemap | CubemapArray => matches!(view, Tex2D | Tex2DArray | Cubemap | CubemapArray),
            Rect => matches!(view, Rect),
        }
    }
}

/// Resolution variant keyed by texture type.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TextureResolution {
    Tex1D { width: u32 },
    Tex1DArray { width: u32, layers: u32 },
    Tex2D { width: u32, height: u32 },
    Tex2DArray { width: u32, height: u32, layers: u32 },
    Tex3D { width: u32, height: u32, depth: u32 },
    Cubemap { width: u32 },
    CubemapArray { width: u32, layers: u32 },
    Rect { width: u32, height: u32 },
}

impl TextureResolution {
    pub fn width(&self) -> u32 {
        match *self {
            TextureResolution::Tex1D { width } => width,
            TextureResolution::Tex1DArray { width, .. } => width,
            TextureResolution::Tex2D { width, .. } => width,
            TextureResolution::Tex2DArray { width, .. } => width,
            TextureResolution::Tex3D { width, .. } => width,
            TextureResolution::Cubemap { width } => width,
            TextureResolution::CubemapArray { width, .. } => width,
            TextureResolution::Rect { width, .. } => width,
        }
    }

    /// Returns 1 for 1D textures.
    pub fn height(&self) -> u32 {
        match *self {
            TextureResolution::Tex1D { .. } => 1,
            TextureResolution::Tex1DArray { .. } => 1,
            TextureResolution::Tex2D { height, .. } => height,
            TextureResolution::Tex2DArray { height, .. } => height,
            TextureResolution::Tex3D { height, .. } => height,
            TextureResolution::Cubemap { width } => width,
            TextureResolution::CubemapArray { width, .. } => width,
            TextureResolution::Rect { height, .. } => height,
        }
    }

    /// Returns 1 for everything but 3D textures.
    pub fn depth(&self) -> u32 {
        match *self {
            TextureResolution::Tex3D { depth, .. } => depth,
            _ => 1,
        }
    }

    pub fn layers(&self) -> u32 {
        match *self {
            TextureResolution::Tex1DArray { layers, .. } => layers,
            TextureResolution::Tex2DArray { layers, .. } => layers,
            TextureResolution::Cubemap { .. } => 6,
            TextureResolution::CubemapArray { layers, .. } => 6 * layers,
            _ => 1,
        }
    }

    /// Matching texture type families for validation. Multisample types
    /// share the plain 2D resolution variants.
    pub fn matches_type(&self, ty: TextureType) -> bool {
        match *self {
            TextureResolution::Tex1D { .. } => ty == TextureType::Tex1D,
            TextureResolution::Tex1DArray { .. } => ty == TextureType::Tex1DArray,
            TextureResolution::Tex2D { .. } => {
                matches!(ty, TextureType::Tex2D | TextureType::Tex2DMultisample)
            }
            TextureResolution::Tex2DArray { .. } => {
                matches!(ty, TextureType::Tex2DArray | TextureType::Tex2DArrayMultisample)
            }
            TextureResolution::Tex3D { .. } => ty == TextureType::Tex3D,
            TextureResolution::Cubemap { .. } => ty == TextureType::Cubemap,
            TextureResolution::CubemapArray { .. } => ty == TextureType::CubemapArray,
            TextureResolution::Rect { .. } => ty == TextureType::Rect,
        }
    }

    /// Resolution of mip level `lod`. Width, height and depth are halved
    /// per level and clamped to 1; layer counts do not change.
    pub fn at_lod(&self, lod: u16) -> TextureResolution {
        let scale = |v: u32| (v >> lod).max(1);
        match *self {
            TextureResolution::Tex1D { width } => TextureResolution::Tex1D {
                width: scale(width),
            },
            TextureResolution::Tex1DArray { width, layers } => TextureResolution::Tex1DArray {
                width: scale(width),
                layers,
            },
            TextureResolution::Tex2D { width, height } => TextureResolution::Tex2D {
                width: scale(width),
                height: scale(height),
            },
            TextureResolution::Tex2DArray {
                width,
                height,
                layers,
            } => TextureResolution::Tex2DArray {
                width: scale(width),
                height: scale(height),
                layers,
            },
            TextureResolution::Tex3D {
                width,
                height,
                depth,
            } => TextureResolution::Tex3D {
                width: scale(width),
                height: scale(height),
                depth: scale(depth),
            },
            TextureResolution::Cubemap { width } => TextureResolution::Cubemap {
                width: scale(width),
            },
            TextureResolution::CubemapArray { width, layers } => TextureResolution::CubemapArray {
                width: scale(width),
                layers,
            },
            TextureResolution::Rect { width, height } => TextureResolution::Rect {
                width: scale(width),
                height: scale(height),
            },
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TextureMultisample {
    pub samples: u8,
    pub fixed_sample_locations: bool,
}

impl Default for TextureMultisample {
    fn default() -> Self {
        TextureMultisample {
            samples: 1,
            fixed_sample_locations: false,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Swizzle {
    Identity,
    Zero,
    One,
    R,
    G,
    B,
    A,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TextureSwizzle {
    pub r: Swizzle,
    pub g: Swizzle,
    pub b: Swizzle,
    pub a: Swizzle,
}

impl Default for TextureSwizzle {
    fn default() -> Self {
        TextureSwizzle {
            r: Swizzle::Identity,
            g: Swizzle::Identity,
            b: Swizzle::Identity,
            a: Swizzle::Identity,
        }
    }
}

impl TextureSwizzle {
    pub fn is_identity(&self) -> bool {
        *self == TextureSwizzle::default()
    }
}

/// Complete description of a texture storage allocation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TextureDesc {
    pub ty: TextureType,
    pub format: Format,
    pub resolution: TextureResolution,
    pub multisample: TextureMultisample,
    pub swizzle: TextureSwizzle,
    pub num_lods: u16,
}

impl TextureDesc {
    pub fn tex_2d(format: Format, width: u32, height: u32) -> TextureDesc {
        TextureDesc {
            ty: TextureType::Tex2D,
            format,
            resolution: TextureResolution::Tex2D { width, height },
            multisample: TextureMultisample::default(),
            swizzle: TextureSwizzle::default(),
            num_lods: 1,
        }
    }
}

/// A sub-rectangle of one texture lod, in texels.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TextureRect {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lod_resolution_clamps() {
        let r = TextureResolution::Tex2D {
            width: 256,
            height: 64,
        };
        assert_eq!(
            r.at_lod(3),
            TextureResolution::Tex2D {
                width: 32,
                height: 8
            }
        );
        assert_eq!(
            r.at_lod(8),
            TextureResolution::Tex2D {
                width: 1,
                height: 1
            }
        );
    }

    #[test]
    fn view_type_table() {
        assert!(TextureType::Cubemap.view_compatible_with(TextureType::Tex2DArray));
        assert!(TextureType::Tex2D.view_compatible_with(TextureType::Tex2DArray));
        assert!(!TextureType::Tex3D.view_compatible_with(TextureType::Tex2D));
        assert!(!TextureType::Tex2D.view_compatible_with(TextureType::Tex2DMultisample));
    }

    #[test]
    fn cubemap_layers() {
        assert_eq!(TextureResolution::Cubemap { width: 16 }.layers(), 6);
        assert_eq!(
            TextureResolution::CubemapArray {
                width: 16,
                layers: 3
            }
            .layers(),
            18
        );
    }
}
