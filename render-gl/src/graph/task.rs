//! Frame graph tasks and their builders.

use std::cell::Cell;
use std::rc::Rc;

use smallvec::SmallVec;

use ignis_render::{
    AttachmentInfo, ClearColorValue, ClearDepthStencilValue, LoadOp, Rect2D, TextureDesc,
    MAX_COLOR_ATTACHMENTS,
};

use crate::command::CommandBuffer;
use crate::framebuffer::AttachKind;
use crate::graph::{FrameGraph, GraphResources, ResourceAccess, ResourceHandle, TaskHandle};
use crate::renderpass::RenderPass;

/// Recorded per subpass: receives the recorder, the executing pass's
/// context, and the subpass index.
pub type RecordFn = Box<dyn Fn(&mut CommandBuffer<'_>, &PassContext<'_>, u32)>;
/// Recorded once for a custom task.
pub type CustomFn = Box<dyn Fn(&mut CommandBuffer<'_>, &GraphResources<'_>)>;
/// Evaluated at execute time; a false return skips the task without
/// rebuilding the graph.
pub type ConditionFn = Box<dyn Fn() -> bool>;

/// A render area slot shared with the caller, so the area can change
/// between frames without rebuilding the graph.
pub type SharedRenderArea = Rc<Cell<Rect2D>>;

pub fn shared_render_area(rect: Rect2D) -> SharedRenderArea {
    Rc::new(Cell::new(rect))
}

#[derive(Clone)]
pub(crate) enum RenderAreaMode {
    /// Use the full framebuffer size.
    Auto,
    Fixed(Rect2D),
    Dynamic(SharedRenderArea),
}

/// A color or depth-stencil attachment declaration of a pass task.
#[derive(Copy, Clone)]
pub struct TextureAttachment {
    pub resource: ResourceHandle,
    pub info: AttachmentInfo,
    pub lod: u16,
    pub kind: AttachKind,
}

impl TextureAttachment {
    pub fn new(resource: ResourceHandle, load_op: LoadOp) -> TextureAttachment {
        TextureAttachment {
            resource,
            info: AttachmentInfo { load_op },
            lod: 0,
            kind: AttachKind::Texture,
        }
    }

    pub fn with_lod(mut self, lod: u16) -> TextureAttachment {
        self.lod = lod;
        self
    }

    pub fn with_layer(mut self, layer: u32) -> TextureAttachment {
        self.kind = AttachKind::Layer(layer);
        self
    }
}

/// Context handed to subpass record callbacks.
pub struct PassContext<'a> {
    pub render_pass: &'a RenderPass,
    pub framebuffer: Option<&'a crate::framebuffer::Framebuffer>,
    pub render_area: Rect2D,
    pub resources: GraphResources<'a>,
}

pub(crate) struct Subpass {
    pub(crate) color_refs: SmallVec<[u32; MAX_COLOR_ATTACHMENTS]>,
    pub(crate) record: RecordFn,
}

pub(crate) struct PassTask {
    pub(crate) color_attachments: SmallVec<[TextureAttachment; MAX_COLOR_ATTACHMENTS]>,
    pub(crate) depth_stencil: Option<TextureAttachment>,
    pub(crate) subpasses: Vec<Subpass>,
    pub(crate) render_area: RenderAreaMode,
    pub(crate) clear_colors: Vec<ClearColorValue>,
    pub(crate) clear_depth_stencil: ClearDepthStencilValue,
    pub(crate) condition: Option<ConditionFn>,
    /// Built during `FrameGraph::build`.
    pub(crate) handle: Option<RenderPass>,
    /// Index into the graph's framebuffer cache; `None` targets the
    /// default framebuffer.
    pub(crate) framebuffer: Option<usize>,
}

pub(crate) struct CustomTask {
    pub(crate) record: Option<CustomFn>,
    pub(crate) condition: Option<ConditionFn>,
}

pub(crate) enum TaskKind {
    Pass(PassTask),
    Custom(CustomTask),
}

pub(crate) struct Task {
    pub(crate) name: String,
    pub(crate) kind: TaskKind,
    pub(crate) produced: Vec<ResourceHandle>,
    pub(crate) reads: Vec<ResourceHandle>,
    pub(crate) writes: Vec<ResourceHandle>,
    pub(crate) read_writes: Vec<ResourceHandle>,
    pub(crate) ref_count: u32,
    pub(crate) culled: bool,
}

impl Task {
    pub(crate) fn new(name: String, kind: TaskKind) -> Task {
        Task {
            name,
            kind,
            produced: Vec::new(),
            reads: Vec::new(),
            writes: Vec::new(),
            read_writes: Vec::new(),
            ref_count: 0,
            culled: false,
        }
    }
}

/// Builder for a render pass task.
pub struct PassBuilder<'a> {
    pub(crate) graph: &'a mut FrameGraph,
    pub(crate) task: usize,
}

impl<'a> PassBuilder<'a> {
    fn pass(&mut self) -> &mut PassTask {
        match &mut self.graph.tasks[self.task].kind {
            TaskKind::Pass(pass) => pass,
            TaskKind::Custom(_) => unreachable!("pass builder over a custom task"),
        }
    }

    /// Declares a transient resource produced by this task.
    pub fn add_new_resource(&mut self, name: &str, desc: TextureDesc) -> ResourceHandle {
        self.graph.add_transient_resource(self.task, name, desc)
    }

    /// Declares a dependency on an existing resource.
    pub fn add_resource(&mut self, resource: ResourceHandle, access: ResourceAccess) -> &mut Self {
        self.graph.add_task_dependency(self.task, resource, access);
        self
    }

    /// Sets the pass's color attachments. Each attachment resource is
    /// registered as written by this task.
    pub fn set_color_attachments(&mut self, attachments: &[TextureAttachment]) -> &mut Self {
        for att in attachments {
            self.graph
                .add_task_dependency(self.task, att.resource, ResourceAccess::Write);
        }
        self.pass().color_attachments = attachments.iter().copied().collect();
        self
    }

    /// Declares a new transient texture and attaches it as the next color
    /// attachment.
    pub fn add_new_color_attachment(
        &mut self,
        name: &str,
        desc: TextureDesc,
        load_op: LoadOp,
    ) -> ResourceHandle {
        let resource = self.graph.add_transient_resource(self.task, name, desc);
        self.pass().color_attachments.push(TextureAttachment::new(resource, load_op));
        resource
    }

    /// Sets the depth-stencil attachment; its resource is read-written.
    pub fn set_depth_stencil_attachment(&mut self, attachment: TextureAttachment) -> &mut Self {
        self.graph
            .add_task_dependency(self.task, attachment.resource, ResourceAccess::ReadWrite);
        self.pass().depth_stencil = Some(attachment);
        self
    }

    /// Declares a new transient texture as the depth-stencil attachment.
    pub fn set_new_depth_stencil_attachment(
        &mut self,
        name: &str,
        desc: TextureDesc,
        load_op: LoadOp,
    ) -> ResourceHandle {
        let resource = self.graph.add_transient_resource(self.task, name, desc);
        self.pass().depth_stencil = Some(TextureAttachment::new(resource, load_op));
        resource
    }

    pub fn set_render_area(&mut self, rect: Rect2D) -> &mut Self {
        self.pass().render_area = RenderAreaMode::Fixed(rect);
        self
    }

    /// Defers the render area to a shared slot updated by the caller.
    pub fn set_dynamic_render_area(&mut self, area: &SharedRenderArea) -> &mut Self {
        self.pass().render_area = RenderAreaMode::Dynamic(area.clone());
        self
    }

    pub fn set_clear_colors(&mut self, values: &[ClearColorValue]) -> &mut Self {
        self.pass().clear_colors = values.to_vec();
        self
    }

    pub fn set_depth_stencil_clear(&mut self, value: ClearDepthStencilValue) -> &mut Self {
        self.pass().clear_depth_stencil = value;
        self
    }

    pub fn set_condition(&mut self, condition: impl Fn() -> bool + 'static) -> &mut Self {
        self.pass().condition = Some(Box::new(condition));
        self
    }

    /// Appends a subpass drawing into the given color attachment indices.
    pub fn add_subpass(
        &mut self,
        color_refs: &[u32],
        record: impl Fn(&mut CommandBuffer<'_>, &PassContext<'_>, u32) + 'static,
    ) -> &mut Self {
        self.pass().subpasses.push(Subpass {
            color_refs: color_refs.iter().copied().collect(),
            record: Box::new(record),
        });
        self
    }

    pub fn finish(self) -> TaskHandle {
        TaskHandle(self.task)
    }
}

/// Builder for a custom (non-render-pass) task.
pub struct CustomTaskBuilder<'a> {
    pub(crate) graph: &'a mut FrameGraph,
    pub(crate) task: usize,
}

impl<'a> CustomTaskBuilder<'a> {
    fn custom(&mut self) -> &mut CustomTask {
        match &mut self.graph.tasks[self.task].kind {
            TaskKind::Custom(custom) => custom,
            TaskKind::Pass(_) => unreachable!("custom builder over a pass task"),
        }
    }

    pub fn add_new_resource(&mut self, name: &str, desc: TextureDesc) -> ResourceHandle {
        self.graph.add_transient_resource(self.task, name, desc)
    }

    pub fn add_resource(&mut self, resource: ResourceHandle, access: ResourceAccess) -> &mut Self {
        self.graph.add_task_dependency(self.task, resource, access);
        self
    }

    pub fn set_record(
        &mut self,
        record: impl Fn(&mut CommandBuffer<'_>, &GraphResources<'_>) + 'static,
    ) -> &mut Self {
        self.custom().record = Some(Box::new(record));
        self
    }

    pub fn set_condition(&mut self, condition: impl Fn() -> bool + 'static) -> &mut Self {
        self.custom().condition = Some(Box::new(condition));
        self
    }

    pub fn finish(self) -> TaskHandle {
        TaskHandle(self.task)
    }
}
