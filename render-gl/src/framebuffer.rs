//! Framebuffer objects.

use log::error;
use smallvec::SmallVec;

use ignis_render::{Error, Format, Result, MAX_COLOR_ATTACHMENTS};

use crate::api::{AttachmentPoint, FramebufferObj, GlApi};
use crate::state::State;
use crate::texture::TextureRef;

/// How a texture is attached: as a whole (layered for array textures) or as
/// one selected layer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AttachKind {
    Texture,
    Layer(u32),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FramebufferAttachment {
    pub texture: TextureRef,
    pub lod: u16,
    pub kind: AttachKind,
}

#[derive(Clone, Debug, Default)]
pub struct FramebufferCreateInfo {
    pub color_attachments: SmallVec<[FramebufferAttachment; MAX_COLOR_ATTACHMENTS]>,
    pub depth_stencil_attachment: Option<FramebufferAttachment>,
    pub width: u32,
    pub height: u32,
}

fn depth_stencil_point(format: Format) -> AttachmentPoint {
    match (format.has_depth(), format.has_stencil()) {
        (true, true) => AttachmentPoint::DepthStencil,
        (true, false) => AttachmentPoint::Depth,
        _ => AttachmentPoint::Stencil,
    }
}

/// Concrete aggregation of texture attachments. Equality for the frame
/// graph's cache is by attachment identity, checked with
/// [`Framebuffer::matches`].
pub struct Framebuffer {
    pub(crate) obj: FramebufferObj,
    width: u32,
    height: u32,
    color_attachments: SmallVec<[FramebufferAttachment; MAX_COLOR_ATTACHMENTS]>,
    depth_stencil_attachment: Option<FramebufferAttachment>,
}

impl Framebuffer {
    pub fn new(
        gl: &dyn GlApi,
        state: &mut State,
        info: &FramebufferCreateInfo,
    ) -> Result<Framebuffer> {
        if info.color_attachments.len() > MAX_COLOR_ATTACHMENTS {
            return Err(Error::InvalidArgument("too many color attachments"));
        }

        let obj = gl.create_framebuffer();

        for (index, att) in info.color_attachments.iter().enumerate() {
            let point = AttachmentPoint::Color(index as u32);
            match att.kind {
                AttachKind::Texture => {
                    gl.named_framebuffer_texture(obj, point, att.texture.obj, att.lod)
                }
                AttachKind::Layer(layer) => {
                    gl.named_framebuffer_texture_layer(obj, point, att.texture.obj, att.lod, layer)
                }
            }
        }

        if let Some(att) = &info.depth_stencil_attachment {
            let point = depth_stencil_point(att.texture.format);
            match att.kind {
                AttachKind::Texture => {
                    gl.named_framebuffer_texture(obj, point, att.texture.obj, att.lod)
                }
                AttachKind::Layer(layer) => {
                    gl.named_framebuffer_texture_layer(obj, point, att.texture.obj, att.lod, layer)
                }
            }
        }

        if !gl.check_named_framebuffer_complete(obj) {
            // roll the tentative object back before reporting
            gl.delete_framebuffer(obj);
            error!("framebuffer incomplete");
            return Err(Error::InvalidArgument("framebuffer is not complete"));
        }

        state.total_framebuffers += 1;

        Ok(Framebuffer {
            obj,
            width: info.width,
            height: info.height,
            color_attachments: info.color_attachments.clone(),
            depth_stencil_attachment: info.depth_stencil_attachment,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn num_color_attachments(&self) -> usize {
        self.color_attachments.len()
    }

    pub fn color_attachment(&self, index: usize) -> &FramebufferAttachment {
        &self.color_attachments[index]
    }

    pub fn depth_stencil_attachment(&self) -> Option<&FramebufferAttachment> {
        self.depth_stencil_attachment.as_ref()
    }

    /// Attachment-identity comparison used by the cache on hash hits.
    pub fn matches(&self, info: &FramebufferCreateInfo) -> bool {
        self.width == info.width
            && self.height == info.height
            && self.color_attachments[..] == info.color_attachments[..]
            && self.depth_stencil_attachment == info.depth_stencil_attachment
    }

    pub fn destroy(self, gl: &dyn GlApi, state: &mut State) {
        gl.delete_framebuffer(self.obj);
        state.total_framebuffers -= 1;
    }
}
