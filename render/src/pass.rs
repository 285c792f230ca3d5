//! Declarative render pass descriptions and clear values.

use smallvec::SmallVec;

use crate::{MAX_COLOR_ATTACHMENTS, MAX_SUBPASSES};

/// What happens to an attachment's previous contents when a pass begins.
/// Stores are implicit: contents are kept until the backing resource is
/// released.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LoadOp {
    Load,
    Clear,
    DontCare,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AttachmentInfo {
    pub load_op: LoadOp,
}

/// Reference to an attachment of the enclosing pass, by index.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AttachmentRef {
    pub attachment: u32,
}

/// One subpass: the set of color attachments it draws into.
///
/// Depth-stencil and resolve references are declared for completeness but
/// are not supported yet; render pass creation fails when they are set.
#[derive(Clone, Debug, Default)]
pub struct SubpassDesc {
    pub color_refs: SmallVec<[AttachmentRef; MAX_COLOR_ATTACHMENTS]>,
    pub depth_stencil_ref: Option<AttachmentRef>,
    pub resolve_refs: SmallVec<[AttachmentRef; MAX_COLOR_ATTACHMENTS]>,
}

impl SubpassDesc {
    pub fn with_colors(refs: &[u32]) -> SubpassDesc {
        SubpassDesc {
            color_refs: refs
                .iter()
                .map(|&attachment| AttachmentRef { attachment })
                .collect(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RenderPassDesc {
    pub color_attachments: SmallVec<[AttachmentInfo; MAX_COLOR_ATTACHMENTS]>,
    pub depth_stencil_attachment: Option<AttachmentInfo>,
    pub subpasses: SmallVec<[SubpassDesc; 2]>,
}

impl RenderPassDesc {
    /// Checks attachment and subpass counts, reference ranges, and
    /// unsupported per-subpass features.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::Error;
        if self.color_attachments.len() > MAX_COLOR_ATTACHMENTS {
            return Err(Error::InvalidArgument("too many color attachments"));
        }
        if self.subpasses.len() > MAX_SUBPASSES {
            return Err(Error::InvalidArgument("too many subpasses"));
        }
        for subpass in &self.subpasses {
            if subpass.depth_stencil_ref.is_some() {
                return Err(Error::InvalidArgument(
                    "per-subpass depth-stencil references are not supported",
                ));
            }
            if !subpass.resolve_refs.is_empty() {
                return Err(Error::InvalidArgument(
                    "per-attachment resolve targets are not supported",
                ));
            }
            for r in &subpass.color_refs {
                if r.attachment as usize >= self.color_attachments.len() {
                    return Err(Error::InvalidArgument(
                        "subpass references an attachment outside its pass",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Clear value of a color attachment; the variant must match the
/// attachment format's clear kind.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClearColorValue {
    Float32([f32; 4]),
    Int32([i32; 4]),
    UInt32([u32; 4]),
}

impl ClearColorValue {
    pub const TRANSPARENT_BLACK: ClearColorValue = ClearColorValue::Float32([0.0; 4]);
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClearDepthStencilValue {
    pub depth: f32,
    pub stencil: u32,
}

impl Default for ClearDepthStencilValue {
    fn default() -> Self {
        ClearDepthStencilValue {
            depth: 0.0,
            stencil: 0,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Rect2D {
        Rect2D {
            x,
            y,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_out_of_range_ref() {
        let desc = RenderPassDesc {
            color_attachments: smallvec::smallvec![AttachmentInfo {
                load_op: LoadOp::Clear
            }],
            depth_stencil_attachment: None,
            subpasses: smallvec::smallvec![SubpassDesc::with_colors(&[1])],
        };
        assert!(desc.validate().is_err());
    }

    #[test]
    fn validate_rejects_subpass_depth_ref() {
        let mut subpass = SubpassDesc::with_colors(&[0]);
        subpass.depth_stencil_ref = Some(AttachmentRef { attachment: 0 });
        let desc = RenderPassDesc {
            color_attachments: smallvec::smallvec![AttachmentInfo {
                load_op: LoadOp::Load
            }],
            depth_stencil_attachment: None,
            subpasses: smallvec::smallvec![subpass],
        };
        assert!(desc.validate().is_err());
    }
}
