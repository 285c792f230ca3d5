//! Texture objects and views.

use log::{debug, error};

use ignis_render::{
    BufferDataType, Error, Format, Result, TextureDesc, TextureRect, TextureResolution,
    TextureType,
};

use crate::api::{GlApi, TextureLevelParameter, TextureObj};
use crate::buffer::Buffer;
use crate::device::Device;

/// Borrowed identity of a texture: enough for framebuffer attachment and
/// binding-cache comparisons without holding the texture itself.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TextureRef {
    pub obj: TextureObj,
    pub uid: u32,
    pub ty: TextureType,
    pub format: Format,
    pub width: u32,
    pub height: u32,
    pub layers: u32,
    pub samples: u8,
}

pub struct Texture {
    pub(crate) obj: TextureObj,
    pub(crate) uid: u32,
    desc: TextureDesc,
    immutable: bool,
    buffer_backed: bool,
    view: bool,
}

fn validate_desc(device: &Device, desc: &TextureDesc) -> Result<()> {
    if !desc.resolution.matches_type(desc.ty) {
        error!("texture resolution variant does not match texture type");
        return Err(Error::InvalidArgument(
            "resolution variant does not match texture type",
        ));
    }
    if desc.ty.is_multisample() {
        if desc.multisample.samples < 2 {
            return Err(Error::InvalidArgument(
                "multisample texture needs a sample count of at least 2",
            ));
        }
        if desc.num_lods != 1 {
            return Err(Error::InvalidArgument(
                "multisample textures have exactly one lod",
            ));
        }
    } else if desc.multisample.samples > 1 {
        return Err(Error::InvalidArgument(
            "sample count on a non-multisample texture type",
        ));
    }
    if desc.num_lods == 0 {
        return Err(Error::InvalidArgument("texture needs at least one lod"));
    }
    if desc.format.is_s3tc() && !device.caps().texture_compression_s3tc {
        return Err(Error::NotAvailable("S3TC texture compression"));
    }
    Ok(())
}

fn alloc_storage(gl: &dyn GlApi, obj: TextureObj, desc: &TextureDesc) {
    let res = desc.resolution;
    match desc.ty {
        TextureType::Tex1D => gl.texture_storage_1d(obj, desc.num_lods, desc.format, res.width()),
        TextureType::Tex1DArray => {
            gl.texture_storage_2d(obj, desc.num_lods, desc.format, res.width(), res.layers())
        }
        TextureType::Tex2D | TextureType::Rect => {
            gl.texture_storage_2d(obj, desc.num_lods, desc.format, res.width(), res.height())
        }
        TextureType::Tex2DMultisample => gl.texture_storage_2d_multisample(
            obj,
            desc.multisample.samples,
            desc.multisample.fixed_sample_locations,
            desc.format,
            res.width(),
            res.height(),
        ),
        TextureType::Tex2DArray | TextureType::Cubemap | TextureType::CubemapArray => gl
            .texture_storage_3d(
                obj,
                desc.num_lods,
                desc.format,
                res.width(),
                res.height(),
                res.layers(),
            ),
        TextureType::Tex2DArrayMultisample => gl.texture_storage_3d_multisample(
            obj,
            desc.multisample.samples,
            desc.multisample.fixed_sample_locations,
            desc.format,
            res.width(),
            res.height(),
            res.layers(),
        ),
        TextureType::Tex3D => gl.texture_storage_3d(
            obj,
            desc.num_lods,
            desc.format,
            res.width(),
            res.height(),
            res.depth(),
        ),
    }
}

/// Level-0 extent the allocation calls request, per texture type: array
/// layers travel as the height of 1D arrays and the depth of the rest.
fn storage_extent(desc: &TextureDesc) -> (u32, u32, u32) {
    let res = desc.resolution;
    match desc.ty {
        TextureType::Tex1D => (res.width(), 1, 1),
        TextureType::Tex1DArray => (res.width(), res.layers(), 1),
        TextureType::Tex2D | TextureType::Rect | TextureType::Tex2DMultisample => {
            (res.width(), res.height(), 1)
        }
        TextureType::Tex2DArray
        | TextureType::Tex2DArrayMultisample
        | TextureType::Cubemap
        | TextureType::CubemapArray => (res.width(), res.height(), res.layers()),
        TextureType::Tex3D => (res.width(), res.height(), res.depth()),
    }
}

/// Reads the level-0 extent back after an allocation; a mismatch means the
/// driver silently under-allocated. The tentative name is destroyed before
/// reporting.
fn check_allocated_extent(gl: &dyn GlApi, obj: TextureObj, desc: &TextureDesc) -> Result<()> {
    let expected = storage_extent(desc);
    let got = (
        gl.get_texture_level_parameter_i(obj, 0, TextureLevelParameter::Width) as u32,
        gl.get_texture_level_parameter_i(obj, 0, TextureLevelParameter::Height) as u32,
        gl.get_texture_level_parameter_i(obj, 0, TextureLevelParameter::Depth) as u32,
    );
    if got != expected {
        gl.delete_texture(obj);
        error!(
            "texture allocation came back as {:?}, requested {:?}",
            got, expected
        );
        return Err(Error::AllocationFailed);
    }
    Ok(())
}

impl Texture {
    /// Allocates immutable storage.
    pub fn storage(gl: &dyn GlApi, device: &mut Device, desc: TextureDesc) -> Result<Texture> {
        validate_desc(device, &desc)?;
        let obj = gl.create_texture(desc.ty);
        alloc_storage(gl, obj, &desc);
        check_allocated_extent(gl, obj, &desc)?;
        if !desc.swizzle.is_identity() {
            gl.texture_swizzle(obj, desc.swizzle);
        }
        device.total_textures += 1;
        Ok(Texture {
            obj,
            uid: device.gen_uid(),
            desc,
            immutable: true,
            buffer_backed: false,
            view: false,
        })
    }

    /// Allocates a mutable texture; only the base lod is specified, further
    /// lods are added with [`Texture::create_lod`].
    pub fn mutable(
        gl: &dyn GlApi,
        device: &mut Device,
        desc: TextureDesc,
        initial_data: Option<&[u8]>,
    ) -> Result<Texture> {
        validate_desc(device, &desc)?;
        if desc.ty.is_multisample() {
            return Err(Error::InvalidArgument(
                "multisample textures require immutable storage",
            ));
        }
        let obj = gl.create_texture(desc.ty);
        gl.texture_image(obj, desc.ty, 0, desc.format, desc.resolution, initial_data);
        check_allocated_extent(gl, obj, &desc)?;
        if !desc.swizzle.is_identity() {
            gl.texture_swizzle(obj, desc.swizzle);
        }
        device.total_textures += 1;
        Ok(Texture {
            obj,
            uid: device.gen_uid(),
            desc,
            immutable: false,
            buffer_backed: false,
            view: false,
        })
    }

    /// Creates a buffer texture over `buffer`, typed by a buffer data type
    /// with a texel equivalent.
    pub fn buffer_backed(
        gl: &dyn GlApi,
        device: &mut Device,
        data_type: BufferDataType,
        buffer: &Buffer,
        range: Option<(usize, usize)>,
    ) -> Result<Texture> {
        let format = data_type.info().pixel_format.ok_or_else(|| {
            error!("buffer data type {:?} has no texel format", data_type);
            Error::InvalidArgument("buffer data type has no texel equivalent")
        })?;

        let obj = gl.create_texture(TextureType::Tex1D);
        match range {
            Some((offset, size)) => {
                let alignment = device.caps().texture_buffer_offset_alignment as usize;
                if alignment > 0 && offset % alignment != 0 {
                    gl.delete_texture(obj);
                    error!("buffer texture offset {} misaligned", offset);
                    return Err(Error::InvalidArgument("buffer texture offset misaligned"));
                }
                if offset + size > buffer.size() {
                    gl.delete_texture(obj);
                    return Err(Error::InvalidArgument("buffer texture range out of bounds"));
                }
                gl.texture_buffer_range(obj, format, buffer.obj, offset, size);
            }
            None => gl.texture_buffer(obj, format, buffer.obj),
        }

        let texels = range.map_or(buffer.size(), |(_, size)| size) / data_type.size();
        device.total_textures += 1;
        Ok(Texture {
            obj,
            uid: device.gen_uid(),
            desc: TextureDesc {
                ty: TextureType::Tex1D,
                format,
                resolution: TextureResolution::Tex1D {
                    width: texels as u32,
                },
                multisample: Default::default(),
                swizzle: Default::default(),
                num_lods: 1,
            },
            immutable: true,
            buffer_backed: true,
            view: false,
        })
    }

    /// Creates a view sharing the parent's storage.
    ///
    /// The parent must be immutable and not buffer-backed; types and
    /// formats must be compatible per the core view tables; the lod and
    /// layer windows must be inside the parent.
    pub fn view(
        gl: &dyn GlApi,
        device: &mut Device,
        parent: &Texture,
        ty: TextureType,
        format: Format,
        min_lod: u16,
        num_lods: u16,
        min_layer: u32,
        num_layers: u32,
    ) -> Result<Texture> {
        if parent.buffer_backed {
            error!("texture view over a buffer-backed parent");
            return Err(Error::IncompatibleView("parent is buffer-backed"));
        }
        if !parent.immutable {
            error!("texture view over a mutable parent");
            return Err(Error::IncompatibleView("parent storage is not immutable"));
        }
        if !parent.desc.ty.view_compatible_with(ty) {
            return Err(Error::IncompatibleView("incompatible texture types"));
        }
        if !format.view_compatible_with(parent.desc.format) {
            return Err(Error::IncompatibleView("incompatible internal formats"));
        }
        if num_lods == 0 || min_lod + num_lods > parent.desc.num_lods {
            return Err(Error::InvalidArgument("view lod range out of bounds"));
        }
        let parent_layers = parent.desc.resolution.layers();
        if num_layers == 0 || min_layer + num_layers > parent_layers {
            return Err(Error::InvalidArgument("view layer range out of bounds"));
        }

        let obj = gl.texture_view(
            parent.obj, ty, format, min_lod, num_lods, min_layer, num_layers,
        );
        device.total_textures += 1;

        let base = parent.desc.resolution.at_lod(min_lod);
        let resolution = match ty {
            TextureType::Tex1D => TextureResolution::Tex1D { width: base.width() },
            TextureType::Tex1DArray => TextureResolution::Tex1DArray {
                width: base.width(),
                layers: num_layers,
            },
            TextureType::Tex2D | TextureType::Tex2DMultisample => TextureResolution::Tex2D {
                width: base.width(),
                height: base.height(),
            },
            TextureType::Tex2DArray | TextureType::Tex2DArrayMultisample => {
                TextureResolution::Tex2DArray {
                    width: base.width(),
                    height: base.height(),
                    layers: num_layers,
                }
            }
            TextureType::Tex3D => TextureResolution::Tex3D {
                width: base.width(),
                height: base.height(),
                depth: base.depth(),
            },
            TextureType::Cubemap => TextureResolution::Cubemap { width: base.width() },
            TextureType::CubemapArray => TextureResolution::CubemapArray {
                width: base.width(),
                layers: num_layers / 6,
            },
            TextureType::Rect => TextureResolution::Rect {
                width: base.width(),
                height: base.height(),
            },
        };

        Ok(Texture {
            obj,
            uid: device.gen_uid(),
            desc: TextureDesc {
                ty,
                format,
                resolution,
                multisample: parent.desc.multisample,
                swizzle: parent.desc.swizzle,
                num_lods,
            },
            immutable: true,
            buffer_backed: false,
            view: true,
        })
    }

    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    /// The backend object name, for interop and inspection.
    pub fn gl_handle(&self) -> TextureObj {
        self.obj
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    pub fn is_view(&self) -> bool {
        self.view
    }

    pub fn is_buffer_backed(&self) -> bool {
        self.buffer_backed
    }

    pub fn as_ref(&self) -> TextureRef {
        TextureRef {
            obj: self.obj,
            uid: self.uid,
            ty: self.desc.ty,
            format: self.desc.format,
            width: self.desc.resolution.width(),
            height: self.desc.resolution.height(),
            layers: self.desc.resolution.layers(),
            samples: self.desc.multisample.samples,
        }
    }

    fn check_lod(&self, lod: u16) -> Result<TextureResolution> {
        if lod >= self.desc.num_lods {
            error!("lod {} out of range ({} lods)", lod, self.desc.num_lods);
            return Err(Error::InvalidArgument("lod out of range"));
        }
        Ok(self.desc.resolution.at_lod(lod))
    }

    fn check_rect(&self, lod: u16, rect: &TextureRect) -> Result<()> {
        let res = self.check_lod(lod)?;
        let in_bounds = rect.x + rect.width <= res.width()
            && rect.y + rect.height <= res.height().max(res.layers())
            && rect.z + rect.depth <= res.depth().max(res.layers());
        if !in_bounds {
            error!("texture rect out of bounds at lod {}", lod);
            return Err(Error::InvalidArgument("texture rect out of bounds"));
        }
        Ok(())
    }

    /// Allocates storage for one further lod of a mutable texture.
    pub fn create_lod(&mut self, gl: &dyn GlApi, lod: u16, data: Option<&[u8]>) -> Result<()> {
        if self.immutable {
            error!("create_lod on immutable texture");
            return Err(Error::InvalidArgument(
                "immutable textures allocate all lods at creation",
            ));
        }
        let resolution = self.desc.resolution.at_lod(lod);
        gl.texture_image(self.obj, self.desc.ty, lod, self.desc.format, resolution, data);
        if lod >= self.desc.num_lods {
            self.desc.num_lods = lod + 1;
        }
        Ok(())
    }

    pub fn generate_mips(&self, gl: &dyn GlApi) -> Result<()> {
        if self.buffer_backed || self.desc.ty.is_multisample() {
            return Err(Error::InvalidArgument(
                "mipmap generation needs a plain texture",
            ));
        }
        gl.generate_texture_mipmap(self.obj);
        Ok(())
    }

    pub fn write_rect(
        &self,
        gl: &dyn GlApi,
        lod: u16,
        rect: TextureRect,
        data: &[u8],
    ) -> Result<()> {
        self.check_rect(lod, &rect)?;
        gl.texture_sub_image(self.obj, lod, rect, data);
        Ok(())
    }

    /// Blocking readback of a texel rectangle.
    pub fn read_rect(
        &self,
        gl: &dyn GlApi,
        lod: u16,
        rect: TextureRect,
        out: &mut [u8],
    ) -> Result<()> {
        self.check_rect(lod, &rect)?;
        gl.get_texture_sub_image(self.obj, lod, rect, out);
        Ok(())
    }

    pub fn invalidate(&self, gl: &dyn GlApi, lod: u16) -> Result<()> {
        self.check_lod(lod)?;
        gl.invalidate_tex_image(self.obj, lod);
        Ok(())
    }

    pub fn invalidate_rect(&self, gl: &dyn GlApi, lod: u16, rect: TextureRect) -> Result<()> {
        self.check_rect(lod, &rect)?;
        gl.invalidate_tex_sub_image(self.obj, lod, rect);
        Ok(())
    }

    /// Deletes the texture name. A view's parent storage stays alive until
    /// every name over it is gone.
    pub fn destroy(self, gl: &dyn GlApi, device: &mut Device) {
        debug!("destroying texture uid {}", self.uid);
        gl.delete_texture(self.obj);
        device.total_textures -= 1;
    }
}
