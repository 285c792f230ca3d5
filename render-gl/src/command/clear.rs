//! Clear operations.

use log::error;

use ignis_render::{
    ClearColorValue, ClearDepthStencilValue, ClearKind, Format, TextureRect,
    MAX_COLOR_ATTACHMENTS,
};

use crate::api::Capability;
use crate::buffer::Buffer;
use crate::command::CommandBuffer;
use crate::framebuffer::Framebuffer;
use crate::texture::Texture;

impl<'a> CommandBuffer<'a> {
    /// Fills a whole buffer with a repeated texel value.
    pub fn clear_buffer(&mut self, buffer: &Buffer, format: Format, value: &ClearColorValue) {
        self.gl
            .clear_named_buffer_sub_data(buffer.obj, 0, buffer.size(), format, value);
    }

    pub fn clear_buffer_range(
        &mut self,
        buffer: &Buffer,
        offset: usize,
        size: usize,
        format: Format,
        value: &ClearColorValue,
    ) {
        if offset + size > buffer.size() {
            error!("clear range out of buffer bounds");
            return;
        }
        self.gl
            .clear_named_buffer_sub_data(buffer.obj, offset, size, format, value);
    }

    pub fn clear_texture(&mut self, texture: &Texture, lod: u16, value: &ClearColorValue) {
        if lod >= texture.desc().num_lods {
            error!("clear of lod {} out of range", lod);
            return;
        }
        self.gl.clear_tex_image(texture.obj, lod, value);
    }

    pub fn clear_texture_rect(
        &mut self,
        texture: &Texture,
        lod: u16,
        rect: TextureRect,
        value: &ClearColorValue,
    ) {
        if lod >= texture.desc().num_lods {
            error!("clear of lod {} out of range", lod);
            return;
        }
        self.gl.clear_tex_sub_image(texture.obj, lod, rect, value);
    }

    /// Clears selected attachments of a framebuffer.
    ///
    /// Rasterizer discard is suspended for the duration; color write masks
    /// of the affected slots are forced to RGBA and restored; the depth
    /// write mask is temporarily enabled when clearing depth.
    pub fn clear_framebuffer_attachments(
        &mut self,
        framebuffer: &Framebuffer,
        color_indices: &[u32],
        color_value: &ClearColorValue,
        depth_stencil: Option<ClearDepthStencilValue>,
    ) {
        if self.state.raster.rasterizer_discard {
            self.gl.disable(Capability::RasterizerDiscard);
        }

        for &index in color_indices {
            if index as usize >= framebuffer.num_color_attachments() {
                error!("clear of color attachment {} out of range", index);
                continue;
            }
            let mask =
                self.state.blend.render_targets[(index as usize).min(MAX_COLOR_ATTACHMENTS - 1)]
                    .color_write_mask;
            let full = mask == ignis_render::ColorWriteMask::RGBA;
            if !full {
                self.gl.color_mask_indexed(index, true, true, true, true);
            }
            self.gl
                .clear_named_framebuffer_color(framebuffer.obj, index, color_value);
            if !full {
                self.gl.color_mask_indexed(
                    index,
                    mask.contains(ignis_render::ColorWriteMask::R),
                    mask.contains(ignis_render::ColorWriteMask::G),
                    mask.contains(ignis_render::ColorWriteMask::B),
                    mask.contains(ignis_render::ColorWriteMask::A),
                );
            }
        }

        if let Some(ds) = depth_stencil {
            match framebuffer.depth_stencil_attachment() {
                None => error!("depth-stencil clear on a framebuffer without one"),
                Some(att) => {
                    let depth_write = self.state.depth_stencil.depth_write;
                    if !depth_write {
                        self.gl.depth_mask(true);
                    }
                    match att.texture.format.info().clear_kind {
                        ClearKind::DepthOnly => {
                            self.gl.clear_named_framebuffer_depth(framebuffer.obj, ds.depth)
                        }
                        ClearKind::StencilOnly => self
                            .gl
                            .clear_named_framebuffer_stencil(framebuffer.obj, ds.stencil),
                        _ => self.gl.clear_named_framebuffer_depth_stencil(
                            framebuffer.obj,
                            ds.depth,
                            ds.stencil,
                        ),
                    }
                    if !depth_write {
                        self.gl.depth_mask(false);
                    }
                }
            }
        }

        if self.state.raster.rasterizer_discard {
            self.gl.enable(Capability::RasterizerDiscard);
        }
    }
}
