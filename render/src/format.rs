//! Internal pixel formats and their derived properties.

/// How a framebuffer attachment of a given format must be cleared.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ClearKind {
    Float32,
    Int32,
    UInt32,
    StencilOnly,
    DepthOnly,
    DepthStencil,
}

/// Internal pixel format of a texture, matching the OpenGL 4.5 core set.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Format {
    // one component
    R8,
    R8Snorm,
    R16,
    R16Snorm,
    R16F,
    R32F,
    R8I,
    R8UI,
    R16I,
    R16UI,
    R32I,
    R32UI,
    // two components
    Rg8,
    Rg8Snorm,
    Rg16,
    Rg16Snorm,
    Rg16F,
    Rg32F,
    Rg8I,
    Rg8UI,
    Rg16I,
    Rg16UI,
    Rg32I,
    Rg32UI,
    // three components
    Rgb8,
    Rgb8Snorm,
    Rgb16,
    Rgb16Snorm,
    Rgb16F,
    Rgb32F,
    Rgb8I,
    Rgb8UI,
    Rgb16I,
    Rgb16UI,
    Rgb32I,
    Rgb32UI,
    // four components
    Rgba8,
    Rgba8Snorm,
    Rgba16,
    Rgba16Snorm,
    Rgba16F,
    Rgba32F,
    Rgba8I,
    Rgba8UI,
    Rgba16I,
    Rgba16UI,
    Rgba32I,
    Rgba32UI,
    // packed
    R3G3B2,
    Rgb5A1,
    Rgb10A2,
    Rgb10A2UI,
    R11G11B10F,
    Rgb9E5,
    // sRGB
    Srgb8,
    Srgb8Alpha8,
    // compressed, RGTC
    CompressedRedRgtc1,
    CompressedSignedRedRgtc1,
    CompressedRgRgtc2,
    CompressedSignedRgRgtc2,
    // compressed, BPTC
    CompressedRgbaBptcUnorm,
    CompressedSrgbAlphaBptcUnorm,
    CompressedRgbBptcSignedFloat,
    CompressedRgbBptcUnsignedFloat,
    // compressed, S3TC (extension, gated on a device capability)
    CompressedRgbS3tcDxt1,
    CompressedSrgbS3tcDxt1,
    CompressedRgbaS3tcDxt1,
    CompressedSrgbAlphaS3tcDxt1,
    CompressedRgbaS3tcDxt3,
    CompressedSrgbAlphaS3tcDxt3,
    CompressedRgbaS3tcDxt5,
    CompressedSrgbAlphaS3tcDxt5,
    // stencil
    Stencil1,
    Stencil4,
    Stencil8,
    Stencil16,
    // depth
    Depth16,
    Depth24,
    Depth32,
    Depth32F,
    // combined
    Depth24Stencil8,
    Depth32FStencil8,
}

/// Derived properties of a [`Format`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FormatInfo {
    pub clear_kind: ClearKind,
    /// GLSL image format qualifier, empty when the format cannot back a
    /// shader image.
    pub image_qualifier: &'static str,
}

impl Format {
    pub fn info(self) -> FormatInfo {
        use self::ClearKind::*;
        use self::Format::*;
        let (clear_kind, image_qualifier) = match self {
            R8 => (Float32, "r8"),
            R8Snorm => (Float32, "r8_snorm"),
            R16 => (Float32, "r16"),
            R16Snorm => (Float32, "r16_snorm"),
            R16F => (Float32, "r16f"),
            R32F => (Float32, "r32f"),
            R8I => (Int32, "r8i"),
            R8UI => (UInt32, "r8ui"),
            R16I => (Int32, "r16i"),
            R16UI => (UInt32, "r16ui"),
            R32I => (Int32, "r32i"),
            R32UI => (UInt32, "r32ui"),
            Rg8 => (Float32, "rg8"),
            Rg8Snorm => (Float32, "rg8_snorm"),
            Rg16 => (Float32, "rg16"),
            Rg16Snorm => (Float32, "rg16_snorm"),
            Rg16F => (Float32, "rg16f"),
            Rg32F => (Float32, "rg32f"),
            Rg8I => (Int32, "rg8i"),
            Rg8UI => (UInt32, "rg8ui"),
            Rg16I => (Int32, "rg16i"),
            Rg16UI => (UInt32, "rg16ui"),
            Rg32I => (Int32, "rg32i"),
            Rg32UI => (UInt32, "rg32ui"),
            Rgb8 => (Float32, ""),
            Rgb8Snorm => (Float32, ""),
            Rgb16 => (Float32, ""),
            Rgb16Snorm => (Float32, ""),
            Rgb16F => (Float32, ""),
            Rgb32F => (Float32, ""),
            Rgb8I => (Int32, ""),
            Rgb8UI => (UInt32, ""),
            Rgb16I => (Int32, ""),
            Rgb16UI => (UInt32, ""),
            Rgb32I => (Int32, ""),
            Rgb32UI => (UInt32, ""),
            Rgba8 => (Float32, "rgba8"),
            Rgba8Snorm => (Float32, "rgba8_snorm"),
            Rgba16 => (Float32, "rgba16"),
            Rgba16Snorm => (Float32, "rgba16_snorm"),
            Rgba16F => (Float32, "rgba16f"),
            Rgba32F => (Float32, "rgba32f"),
            Rgba8I => (Int32, "rgba8i"),
            Rgba8UI => (UInt32, "rgba8ui"),
            Rgba16I => (Int32, "rgba16i"),
            Rgba16UI => (UInt32, "rgba16ui"),
            Rgba32I => (Int32, "rgba32i"),
            Rgba32UI => (UInt32, "rgba32ui"),
            R3G3B2 => (Float32, ""),
            Rgb5A1 => (Float32, ""),
            Rgb10A2 => (Float32, "rgb10_a2"),
            Rgb10A2UI => (UInt32, "rgb10_a2ui"),
            R11G11B10F => (Float32, "r11f_g11f_b10f"),
            Rgb9E5 => (Float32, ""),
            Srgb8 => (Float32, ""),
            Srgb8Alpha8 => (Float32, ""),
            CompressedRedRgtc1 => (Float32, ""),
            CompressedSignedRedRgtc1 => (Float32, ""),
            CompressedRgRgtc2 => (Float32, ""),
            CompressedSignedRgRgtc2 => (Float32, ""),
            CompressedRgbaBptcUnorm => (Float32, ""),
            CompressedSrgbAlphaBptcUnorm => (Float32, ""),
            CompressedRgbBptcSignedFloat => (Float32, ""),
            CompressedRgbBptcUnsignedFloat => (Float32, ""),
            CompressedRgbS3tcDxt1 => (Float32, ""),
            CompressedSrgbS3tcDxt1 => (Float32, ""),
            CompressedRgbaS3tcDxt1 => (Float32, ""),
            CompressedSrgbAlphaS3tcDxt1 => (Float32, ""),
            CompressedRgbaS3tcDxt3 => (Float32, ""),
            CompressedSrgbAlphaS3tcDxt3 => (Float32, ""),
            CompressedRgbaS3tcDxt5 => (Float32, ""),
            CompressedSrgbAlphaS3tcDxt5 => (Float32, ""),
            Stencil1 => (StencilOnly, ""),
            Stencil4 => (StencilOnly, ""),
            Stencil8 => (StencilOnly, ""),
            Stencil16 => (StencilOnly, ""),
            Depth16 => (DepthOnly, ""),
            Depth24 => (DepthOnly, ""),
            Depth32 => (DepthOnly, ""),
            Depth32F => (DepthOnly, ""),
            Depth24Stencil8 => (DepthStencil, ""),
            Depth32FStencil8 => (DepthStencil, ""),
        };
        FormatInfo {
            clear_kind,
            image_qualifier,
        }
    }

    pub fn has_depth(self) -> bool {
        matches!(
            self.info().clear_kind,
            ClearKind::DepthOnly | ClearKind::DepthStencil
        )
    }

    pub fn has_stencil(self) -> bool {
        matches!(
            self.info().clear_kind,
            ClearKind::StencilOnly | ClearKind::DepthStencil
        )
    }

    pub fn is_depth_stencil(self) -> bool {
        self.has_depth() || self.has_stencil()
    }

    pub fn is_compressed(self) -> bool {
        use self::Format::*;
        matches!(
            self,
            CompressedRedRgtc1
                | CompressedSignedRedRgtc1
                | CompressedRgRgtc2
                | CompressedSignedRgRgtc2
                | CompressedRgbaBptcUnorm
                | CompressedSrgbAlphaBptcUnorm
                | CompressedRgbBptcSignedFloat
                | CompressedRgbBptcUnsignedFloat
                | CompressedRgbS3tcDxt1
                | CompressedSrgbS3tcDxt1
                | CompressedRgbaS3tcDxt1
                | CompressedSrgbAlphaS3tcDxt1
                | CompressedRgbaS3tcDxt3
                | CompressedSrgbAlphaS3tcDxt3
                | CompressedRgbaS3tcDxt5
                | CompressedSrgbAlphaS3tcDxt5
        )
    }

    pub fn is_s3tc(self) -> bool {
        use self::Format::*;
        matches!(
            self,
            CompressedRgbS3tcDxt1
                | CompressedSrgbS3tcDxt1
                | CompressedRgbaS3tcDxt1
                | CompressedSrgbAlphaS3tcDxt1
                | CompressedRgbaS3tcDxt3
                | CompressedSrgbAlphaS3tcDxt3
                | CompressedRgbaS3tcDxt5
                | CompressedSrgbAlphaS3tcDxt5
        )
    }

    pub fn is_srgb(self) -> bool {
        use self::Format::*;
        matches!(
            self,
            Srgb8
                | Srgb8Alpha8
                | CompressedSrgbAlphaBptcUnorm
                | CompressedSrgbS3tcDxt1
                | CompressedSrgbAlphaS3tcDxt1
                | CompressedSrgbAlphaS3tcDxt3
                | CompressedSrgbAlphaS3tcDxt5
        )
    }
}

/// View class of a format, as defined by the core texture-view
/// compatibility table. Two uncompressed formats can alias through a view
/// iff they share a class; compressed formats only alias within their own
/// block class; depth, stencil and odd packed formats have no class and
/// require an exact match.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ViewClass {
    Bits128,
    Bits96,
    Bits64,
    Bits48,
    Bits32,
    Bits24,
    Bits16,
    Bits8,
    RgtcRed,
    RgtcRg,
    BptcUnorm,
    BptcFloat,
    S3tcDxt1Rgb,
    S3tcDxt1Rgba,
    S3tcDxt3,
    S3tcDxt5,
}

impl Format {
    pub fn view_class(self) -> Option<ViewClass> {
        use self::Format::*;
        use self::ViewClass::*;
        Some(match self {
            Rgba32F | Rgba32I | Rgba32UI => Bits128,
            Rgb32F | Rgb32I | Rgb32UI => Bits96,
            Rgba16 | Rgba16Snorm | Rgba16F | Rgba16I | Rgba16UI | Rg32F | Rg32I | Rg32UI => Bits64,
            Rgb16 | Rgb16Snorm | Rgb16F | Rgb16I | Rgb16UI => Bits48,
            Rgba8 | Rgba8Snorm | Rgba8I | Rgba8UI | Srgb8Alpha8 | Rg16 | Rg16Snorm | Rg16F
            | Rg16I | Rg16UI | R32F | R32I | R32UI | Rgb10A2 | Rgb10A2UI | R11G11B10F | Rgb9E5 => {
                Bits32
            }
            Rgb8 | Rgb8Snorm | Rgb8I | Rgb8UI | Srgb8 => Bits24,
            Rg8 | Rg8Snorm | Rg8I | Rg8UI | R16 | R16Snorm | R16F | R16I | R16UI => Bits16,
            R8 | R8Snorm | R8I | R8UI => Bits8,
            CompressedRedRgtc1 | CompressedSignedRedRgtc1 => RgtcRed,
            CompressedRgRgtc2 | CompressedSignedRgRgtc2 => RgtcRg,
            CompressedRgbaBptcUnorm | CompressedSrgbAlphaBptcUnorm => BptcUnorm,
            CompressedRgbBptcSignedFloat | CompressedRgbBptcUnsignedFloat => BptcFloat,
            CompressedRgbS3tcDxt1 | CompressedSrgbS3tcDxt1 => S3tcDxt1Rgb,
            CompressedRgbaS3tcDxt1 | CompressedSrgbAlphaS3tcDxt1 => S3tcDxt1Rgba,
            CompressedRgbaS3tcDxt3 | CompressedSrgbAlphaS3tcDxt3 => S3tcDxt3,
            CompressedRgbaS3tcDxt5 | CompressedSrgbAlphaS3tcDxt5 => S3tcDxt5,
            _ => return None,
        })
    }

    /// Whether a view of format `self` may be created over storage of
    /// format `parent`.
    pub fn view_compatible_with(self, parent: Format) -> bool {
        if self == parent {
            return true;
        }
        match (self.view_class(), parent.view_class()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_kinds() {
        assert_eq!(Format::Rgba16F.info().clear_kind, ClearKind::Float32);
        assert_eq!(Format::Rgb10A2UI.info().clear_kind, ClearKind::UInt32);
        assert_eq!(Format::Rgba32I.info().clear_kind, ClearKind::Int32);
        assert_eq!(Format::Depth32F.info().clear_kind, ClearKind::DepthOnly);
        assert_eq!(Format::Stencil8.info().clear_kind, ClearKind::StencilOnly);
        assert_eq!(
            Format::Depth24Stencil8.info().clear_kind,
            ClearKind::DepthStencil
        );
    }

    #[test]
    fn image_qualifiers() {
        assert_eq!(Format::Rgba8.info().image_qualifier, "rgba8");
        assert_eq!(Format::R11G11B10F.info().image_qualifier, "r11f_g11f_b10f");
        assert_eq!(Format::Depth24.info().image_qualifier, "");
    }

    #[test]
    fn view_classes() {
        // same 32-bit class
        assert!(Format::Rgba8.view_compatible_with(Format::R32F));
        assert!(Format::Rgb10A2.view_compatible_with(Format::Rgba8UI));
        // different classes
        assert!(!Format::Rgba8.view_compatible_with(Format::Rg8));
        // depth requires exact match
        assert!(Format::Depth32F.view_compatible_with(Format::Depth32F));
        assert!(!Format::Depth32F.view_compatible_with(Format::Depth24));
        // compressed classes do not mix
        assert!(Format::CompressedRedRgtc1.view_compatible_with(Format::CompressedSignedRedRgtc1));
        assert!(!Format::CompressedRedRgtc1.view_compatible_with(Format::CompressedRgRgtc2));
    }
}
