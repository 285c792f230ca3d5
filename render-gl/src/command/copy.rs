//! Copy operations.

use log::error;

use ignis_render::{Rect2D, TextureRect};

use crate::api::{BlitFilter, BlitMask, BufferTarget, DEFAULT_FRAMEBUFFER};
use crate::buffer::Buffer;
use crate::command::CommandBuffer;
use crate::framebuffer::Framebuffer;
use crate::texture::Texture;

impl<'a> CommandBuffer<'a> {
    pub fn copy_buffer(
        &mut self,
        src: &Buffer,
        dst: &Buffer,
        src_offset: usize,
        dst_offset: usize,
        size: usize,
    ) {
        if src_offset + size > src.size() || dst_offset + size > dst.size() {
            error!("buffer copy range out of bounds");
            return;
        }
        self.gl
            .copy_named_buffer_sub_data(src.obj, dst.obj, src_offset, dst_offset, size);
    }

    /// Unpacks buffer contents into a texture region.
    pub fn copy_buffer_to_texture(
        &mut self,
        src: &Buffer,
        dst: &Texture,
        lod: u16,
        rect: TextureRect,
        buffer_offset: usize,
        size: usize,
    ) {
        if buffer_offset + size > src.size() {
            error!("buffer-to-texture copy out of buffer bounds");
            return;
        }
        self.gl.bind_buffer(BufferTarget::PixelUnpack, src.obj);
        self.gl
            .texture_sub_image_from_unpack(dst.obj, lod, rect, buffer_offset, size);
        self.gl.bind_buffer(BufferTarget::PixelUnpack, 0);
    }

    /// Packs a texture region into a buffer.
    pub fn copy_texture_to_buffer(
        &mut self,
        src: &Texture,
        lod: u16,
        rect: TextureRect,
        dst: &Buffer,
        buffer_offset: usize,
        size: usize,
    ) {
        if buffer_offset + size > dst.size() {
            error!("texture-to-buffer copy out of buffer bounds");
            return;
        }
        self.gl.bind_buffer(BufferTarget::PixelPack, dst.obj);
        self.gl
            .get_texture_sub_image_to_pack(src.obj, lod, rect, buffer_offset, size);
        self.gl.bind_buffer(BufferTarget::PixelPack, 0);
    }

    pub fn copy_texture(
        &mut self,
        src: &Texture,
        src_lod: u16,
        src_origin: (u32, u32, u32),
        dst: &Texture,
        dst_lod: u16,
        dst_origin: (u32, u32, u32),
        extent: (u32, u32, u32),
    ) {
        self.gl.copy_image_sub_data(
            src.obj, src_lod, src_origin, dst.obj, dst_lod, dst_origin, extent,
        );
    }

    /// Copies a region of a framebuffer's read surface into a texture.
    pub fn copy_framebuffer_to_texture(
        &mut self,
        src: Option<&Framebuffer>,
        dst: &Texture,
        lod: u16,
        dst_origin: (u32, u32, u32),
        src_rect: Rect2D,
    ) {
        let fb = src.map_or(DEFAULT_FRAMEBUFFER, |fb| fb.obj);
        self.state.bind_read_framebuffer(self.gl, fb);
        self.gl.copy_read_framebuffer_to_texture(
            dst.obj,
            lod,
            dst_origin,
            src_rect.x,
            src_rect.y,
            src_rect.width,
            src_rect.height,
        );
    }

    /// Packs a region of a framebuffer into a buffer. Reading the buffer
    /// afterwards blocks until the GPU has produced the pixels.
    pub fn copy_framebuffer_to_buffer(
        &mut self,
        src: Option<&Framebuffer>,
        dst: &Buffer,
        buffer_offset: usize,
        src_rect: Rect2D,
        size: usize,
    ) {
        if buffer_offset + size > dst.size() {
            error!("framebuffer readback out of buffer bounds");
            return;
        }
        let fb = src.map_or(DEFAULT_FRAMEBUFFER, |fb| fb.obj);
        self.state.bind_read_framebuffer(self.gl, fb);
        self.gl.bind_buffer(BufferTarget::PixelPack, dst.obj);
        self.gl.read_pixels(
            src_rect.x,
            src_rect.y,
            src_rect.width,
            src_rect.height,
            buffer_offset,
            size,
        );
        self.gl.bind_buffer(BufferTarget::PixelPack, 0);
    }

    pub fn blit_framebuffer(
        &mut self,
        src: Option<&Framebuffer>,
        dst: Option<&Framebuffer>,
        src_rect: Rect2D,
        dst_rect: Rect2D,
        mask: BlitMask,
        filter: BlitFilter,
    ) {
        let src = src.map_or(DEFAULT_FRAMEBUFFER, |fb| fb.obj);
        let dst = dst.map_or(DEFAULT_FRAMEBUFFER, |fb| fb.obj);
        self.gl
            .blit_named_framebuffer(src, dst, src_rect, dst_rect, mask, filter);
    }
}
