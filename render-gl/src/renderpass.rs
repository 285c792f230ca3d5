//! Render pass objects.
//!
//! A render pass is purely declarative: attachments with load ops plus an
//! ordered list of subpasses referencing them. The concrete framebuffer is
//! supplied at begin time.

use smallvec::SmallVec;

use ignis_render::{AttachmentInfo, RenderPassDesc, Result, MAX_COLOR_ATTACHMENTS};

use crate::device::Device;
use crate::state::State;

pub struct RenderPass {
    pub(crate) uid: u32,
    desc: RenderPassDesc,
}

impl RenderPass {
    pub fn new(device: &mut Device, state: &mut State, desc: RenderPassDesc) -> Result<RenderPass> {
        desc.validate()?;
        state.total_render_passes += 1;
        Ok(RenderPass {
            uid: device.gen_uid(),
            desc,
        })
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn num_color_attachments(&self) -> usize {
        self.desc.color_attachments.len()
    }

    pub fn color_attachment(&self, index: usize) -> &AttachmentInfo {
        &self.desc.color_attachments[index]
    }

    pub fn depth_stencil_attachment(&self) -> Option<&AttachmentInfo> {
        self.desc.depth_stencil_attachment.as_ref()
    }

    pub fn num_subpasses(&self) -> usize {
        self.desc.subpasses.len()
    }

    /// Color attachment indices referenced by subpass `index`.
    pub fn subpass_color_refs(&self, index: usize) -> SmallVec<[u32; MAX_COLOR_ATTACHMENTS]> {
        self.desc.subpasses[index]
            .color_refs
            .iter()
            .map(|r| r.attachment)
            .collect()
    }

    pub fn destroy(self, state: &mut State) {
        state.total_render_passes -= 1;
    }
}
