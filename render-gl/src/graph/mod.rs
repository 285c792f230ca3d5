//! The frame graph.
//!
//! Callers declare tasks and the resources they produce, read and write;
//! [`FrameGraph::build`] culls work with no live consumers, schedules the
//! surviving tasks, realizes transient textures out of an aliasing pool and
//! resolves framebuffers; [`FrameGraph::execute`] then drives the command
//! recorder task by task. Tasks and resources live in flat vectors and are
//! addressed by index handles, so the graph borrows nothing from the
//! caller: external textures are registered as plain [`TextureRef`] copies.

mod graphviz;
mod pool;
mod task;

pub use self::pool::PooledTextureId;
pub use self::task::{
    shared_render_area, CustomTaskBuilder, PassBuilder, PassContext, SharedRenderArea,
    TextureAttachment,
};

use fxhash::FxHashMap;
use log::{debug, error, warn};
use smallvec::SmallVec;

use ignis_render::{
    AttachmentRef, ClearColorValue, RenderPassDesc, Result, SubpassDesc, TextureDesc, Viewport,
};

use crate::api::GlApi;
use crate::command::{CommandBuffer, RenderPassBegin};
use crate::device::Device;
use crate::framebuffer::{Framebuffer, FramebufferAttachment, FramebufferCreateInfo};
use crate::graph::pool::TexturePool;
use crate::graph::task::{CustomTask, PassTask, RenderAreaMode, Task, TaskKind};
use crate::renderpass::RenderPass;
use crate::state::State;
use crate::texture::{Texture, TextureRef};

/// How a task accesses a resource it did not produce.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ResourceAccess {
    Read,
    Write,
    ReadWrite,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ResourceHandle(pub(crate) usize);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskHandle(pub(crate) usize);

pub(crate) enum ResourceData {
    Transient {
        desc: TextureDesc,
        realized: Option<PooledTextureId>,
    },
    External {
        /// `None` stands for the backbuffer: passes targeting it render to
        /// the default framebuffer.
        texture: Option<TextureRef>,
    },
}

pub(crate) struct ResourceNode {
    pub(crate) id: usize,
    pub(crate) name: String,
    pub(crate) creator: Option<usize>,
    pub(crate) readers: Vec<usize>,
    pub(crate) writers: Vec<usize>,
    pub(crate) ref_count: u32,
    pub(crate) captured: bool,
    pub(crate) data: ResourceData,
}

impl ResourceNode {
    pub(crate) fn is_transient(&self) -> bool {
        self.creator.is_some()
    }
}

/// Read access to the realized resources of a graph, handed to record
/// callbacks.
pub struct GraphResources<'a> {
    pub(crate) nodes: &'a [ResourceNode],
    pub(crate) pool: &'a TexturePool,
}

impl<'a> GraphResources<'a> {
    /// The concrete texture behind a resource, if it has one right now.
    pub fn texture(&self, handle: ResourceHandle) -> Option<TextureRef> {
        match &self.nodes[handle.0].data {
            ResourceData::Transient { realized, .. } => {
                realized.map(|id| self.pool.texture(id).as_ref())
            }
            ResourceData::External { texture } => *texture,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct FramebufferKey {
    attachments: SmallVec<[usize; 9]>,
    has_depth_stencil: bool,
}

pub(crate) struct TimelineStep {
    pub(crate) task: usize,
    pub(crate) realized: Vec<ResourceHandle>,
    pub(crate) derealized: Vec<ResourceHandle>,
}

pub struct FrameGraph {
    pub(crate) tasks: Vec<Task>,
    pub(crate) resources: Vec<ResourceNode>,
    captured: Vec<usize>,
    timeline: Vec<TimelineStep>,
    pool: TexturePool,
    framebuffers: Vec<Framebuffer>,
    framebuffer_lookup: FxHashMap<FramebufferKey, SmallVec<[usize; 2]>>,
    id_gen: usize,
    debug: bool,
}

impl Default for FrameGraph {
    fn default() -> Self {
        FrameGraph::new()
    }
}

impl FrameGraph {
    pub fn new() -> FrameGraph {
        FrameGraph {
            tasks: Vec::new(),
            resources: Vec::new(),
            captured: Vec::new(),
            timeline: Vec::new(),
            pool: TexturePool::new(),
            framebuffers: Vec::new(),
            framebuffer_lookup: FxHashMap::default(),
            id_gen: 0,
            debug: false,
        }
    }

    /// Toggles the per-execute timeline dump.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    // ---- declaration ---------------------------------------------------

    pub fn add_render_pass(&mut self, name: &str) -> PassBuilder<'_> {
        let task = self.tasks.len();
        self.tasks.push(Task::new(
            name.to_string(),
            TaskKind::Pass(PassTask {
                color_attachments: SmallVec::new(),
                depth_stencil: None,
                subpasses: Vec::new(),
                render_area: RenderAreaMode::Auto,
                clear_colors: Vec::new(),
                clear_depth_stencil: Default::default(),
                condition: None,
                handle: None,
                framebuffer: None,
            }),
        ));
        PassBuilder { graph: self, task }
    }

    pub fn add_custom_task(&mut self, name: &str) -> CustomTaskBuilder<'_> {
        let task = self.tasks.len();
        self.tasks.push(Task::new(
            name.to_string(),
            TaskKind::Custom(CustomTask {
                record: None,
                condition: None,
            }),
        ));
        CustomTaskBuilder { graph: self, task }
    }

    /// Registers a texture owned outside the graph. The graph never frees
    /// external resources.
    pub fn add_external_texture(&mut self, name: &str, texture: &Texture) -> ResourceHandle {
        self.push_resource(name, None, ResourceData::External {
            texture: Some(texture.as_ref()),
        })
    }

    /// Registers the default framebuffer as an external resource.
    pub fn add_backbuffer(&mut self, name: &str) -> ResourceHandle {
        self.push_resource(name, None, ResourceData::External { texture: None })
    }

    /// Marks a resource as captured: its contents survive the frame, and
    /// its backing storage is released only at [`FrameGraph::clear`].
    pub fn set_captured(&mut self, resource: ResourceHandle, captured: bool) {
        self.resources[resource.0].captured = captured;
    }

    pub(crate) fn add_transient_resource(
        &mut self,
        task: usize,
        name: &str,
        desc: TextureDesc,
    ) -> ResourceHandle {
        let handle = self.push_resource(name, Some(task), ResourceData::Transient {
            desc,
            realized: None,
        });
        self.tasks[task].produced.push(handle);
        handle
    }

    fn push_resource(
        &mut self,
        name: &str,
        creator: Option<usize>,
        data: ResourceData,
    ) -> ResourceHandle {
        let id = self.id_gen;
        self.id_gen += 1;
        self.resources.push(ResourceNode {
            id,
            name: name.to_string(),
            creator,
            readers: Vec::new(),
            writers: Vec::new(),
            ref_count: 0,
            captured: false,
            data,
        });
        ResourceHandle(self.resources.len() - 1)
    }

    pub(crate) fn add_task_dependency(
        &mut self,
        task: usize,
        resource: ResourceHandle,
        access: ResourceAccess,
    ) {
        let node = &mut self.resources[resource.0];
        match access {
            ResourceAccess::Read => {
                node.readers.push(task);
                self.tasks[task].reads.push(resource);
            }
            ResourceAccess::Write => {
                node.writers.push(task);
                self.tasks[task].writes.push(resource);
            }
            ResourceAccess::ReadWrite => {
                node.readers.push(task);
                node.writers.push(task);
                self.tasks[task].read_writes.push(resource);
            }
        }
    }

    // ---- introspection -------------------------------------------------

    pub fn resource_name(&self, handle: ResourceHandle) -> &str {
        &self.resources[handle.0].name
    }

    pub fn resource_ref_count(&self, handle: ResourceHandle) -> u32 {
        self.resources[handle.0].ref_count
    }

    pub fn task_ref_count(&self, handle: TaskHandle) -> u32 {
        self.tasks[handle.0].ref_count
    }

    pub fn is_task_culled(&self, handle: TaskHandle) -> bool {
        self.tasks[handle.0].culled
    }

    /// Names of the tasks in the scheduled timeline, in execution order.
    pub fn timeline_names(&self) -> Vec<&str> {
        self.timeline
            .iter()
            .map(|step| self.tasks[step.task].name.as_str())
            .collect()
    }

    /// The concrete framebuffer a pass task resolved to, if any.
    pub fn pass_framebuffer(&self, handle: TaskHandle) -> Option<&Framebuffer> {
        match &self.tasks[handle.0].kind {
            TaskKind::Pass(pass) => pass.framebuffer.map(|i| &self.framebuffers[i]),
            TaskKind::Custom(_) => None,
        }
    }

    /// Total and free pooled texture counts.
    pub fn pool_stats(&self) -> (usize, usize) {
        (self.pool.len(), self.pool.free_len())
    }

    pub fn resources(&self) -> GraphResources<'_> {
        GraphResources {
            nodes: &self.resources,
            pool: &self.pool,
        }
    }

    // ---- build ---------------------------------------------------------

    /// Culls dead work, produces the timeline, realizes transient textures
    /// and resolves render passes and framebuffers.
    pub fn build(&mut self, gl: &dyn GlApi, device: &mut Device, state: &mut State) -> Result<()> {
        // initial reference counts
        for t in &mut self.tasks {
            t.ref_count = (t.produced.len() + t.writes.len() + t.read_writes.len()) as u32;
            t.culled = false;
        }
        self.captured.clear();
        for (i, r) in self.resources.iter_mut().enumerate() {
            r.ref_count = r.readers.len() as u32;
            if r.captured {
                self.captured.push(i);
            }
        }

        // iterative culling over unreferenced transient resources
        let mut unreferenced: Vec<usize> = self
            .resources
            .iter()
            .enumerate()
            .filter(|(_, r)| r.ref_count == 0 && r.is_transient() && !r.captured)
            .map(|(i, _)| i)
            .collect();

        while let Some(r) = unreferenced.pop() {
            if let Some(creator) = self.resources[r].creator {
                self.release_task_ref(creator, &mut unreferenced);
            }
            let writers = self.resources[r].writers.clone();
            for writer in writers {
                self.release_task_ref(writer, &mut unreferenced);
            }
        }

        // timeline with realize/derealize placement
        self.timeline.clear();
        for t in 0..self.tasks.len() {
            if self.tasks[t].ref_count == 0 && self.tasks[t].culled {
                continue;
            }

            let realized = self.tasks[t].produced.clone();
            let mut derealized: Vec<ResourceHandle> = Vec::new();

            for &r in &self.tasks[t].produced {
                let node = &self.resources[r.0];
                if node.readers.is_empty() && node.writers.is_empty() && !node.captured {
                    derealized.push(r);
                }
            }

            let consumed: Vec<ResourceHandle> = self.tasks[t]
                .reads
                .iter()
                .chain(self.tasks[t].writes.iter())
                .chain(self.tasks[t].read_writes.iter())
                .copied()
                .collect();
            for r in consumed {
                let node = &self.resources[r.0];
                if !node.is_transient() || node.captured {
                    continue;
                }
                let last_use = node.readers.iter().chain(node.writers.iter()).max();
                if last_use == Some(&t) && !derealized.contains(&r) {
                    derealized.push(r);
                }
            }

            for &r in &realized {
                self.realize_resource(gl, device, r)?;
            }
            self.create_task(gl, device, state, t)?;
            for &r in &derealized {
                self.derealize_resource(r);
            }

            self.timeline.push(TimelineStep {
                task: t,
                realized,
                derealized,
            });
        }

        Ok(())
    }

    fn release_task_ref(&mut self, task: usize, unreferenced: &mut Vec<usize>) {
        let t = &mut self.tasks[task];
        if t.ref_count > 0 {
            t.ref_count -= 1;
        }
        if t.ref_count == 0 && !t.culled {
            t.culled = true;
            let reads = t.reads.clone();
            for r in reads {
                let node = &mut self.resources[r.0];
                if node.ref_count > 0 {
                    node.ref_count -= 1;
                }
                if node.ref_count == 0 && node.is_transient() {
                    unreferenced.push(r.0);
                }
            }
        }
    }

    fn realize_resource(
        &mut self,
        gl: &dyn GlApi,
        device: &mut Device,
        handle: ResourceHandle,
    ) -> Result<()> {
        let node = &mut self.resources[handle.0];
        if let ResourceData::Transient { desc, realized } = &mut node.data {
            if realized.is_none() {
                debug!("realize {}", node.name);
                *realized = Some(self.pool.realize(gl, device, desc)?);
            }
        }
        Ok(())
    }

    /// Returns the backing texture to the pool. The resource keeps its
    /// reference for the rest of the frame; the storage merely becomes
    /// available for aliasing.
    fn derealize_resource(&mut self, handle: ResourceHandle) {
        let node = &self.resources[handle.0];
        if let ResourceData::Transient {
            realized: Some(id), ..
        } = node.data
        {
            debug!("derealize {}", node.name);
            self.pool.derealize(id);
        }
    }

    fn create_task(
        &mut self,
        gl: &dyn GlApi,
        device: &mut Device,
        state: &mut State,
        task: usize,
    ) -> Result<()> {
        let FrameGraph {
            tasks,
            resources,
            pool,
            framebuffers,
            framebuffer_lookup,
            ..
        } = self;

        let task_name = tasks[task].name.clone();
        let pass = match &mut tasks[task].kind {
            TaskKind::Pass(pass) => pass,
            TaskKind::Custom(_) => return Ok(()),
        };

        // declarative render pass object
        let desc = RenderPassDesc {
            color_attachments: pass
                .color_attachments
                .iter()
                .map(|a| a.info)
                .collect(),
            depth_stencil_attachment: pass.depth_stencil.as_ref().map(|a| a.info),
            subpasses: pass
                .subpasses
                .iter()
                .map(|s| SubpassDesc {
                    color_refs: s
                        .color_refs
                        .iter()
                        .map(|&attachment| AttachmentRef { attachment })
                        .collect(),
                    ..Default::default()
                })
                .collect(),
        };
        pass.handle = Some(RenderPass::new(device, state, desc)?);

        while pass.clear_colors.len() < pass.color_attachments.len() {
            pass.clear_colors.push(ClearColorValue::TRANSPARENT_BLACK);
        }

        // resolve attachments to concrete textures
        let resolve = |handle: ResourceHandle| -> Option<TextureRef> {
            match &resources[handle.0].data {
                ResourceData::Transient { realized, .. } => {
                    realized.map(|id| pool.texture(id).as_ref())
                }
                ResourceData::External { texture } => *texture,
            }
        };

        let mut info = FramebufferCreateInfo::default();
        let mut key = FramebufferKey {
            attachments: SmallVec::new(),
            has_depth_stencil: pass.depth_stencil.is_some(),
        };
        let mut backbuffer = false;

        for att in &pass.color_attachments {
            match resolve(att.resource) {
                Some(texture) => {
                    info.width = texture.width;
                    info.height = texture.height;
                    info.color_attachments.push(FramebufferAttachment {
                        texture,
                        lod: att.lod,
                        kind: att.kind,
                    });
                    key.attachments.push(resources[att.resource.0].id);
                }
                None => backbuffer = true,
            }
        }
        if let Some(att) = &pass.depth_stencil {
            match resolve(att.resource) {
                Some(texture) => {
                    info.width = texture.width;
                    info.height = texture.height;
                    info.depth_stencil_attachment = Some(FramebufferAttachment {
                        texture,
                        lod: att.lod,
                        kind: att.kind,
                    });
                    key.attachments.push(resources[att.resource.0].id);
                }
                None => backbuffer = true,
            }
        }

        if backbuffer {
            if !info.color_attachments.is_empty() || info.depth_stencil_attachment.is_some() {
                warn!(
                    "task '{}' mixes backbuffer and texture attachments; rendering to the default framebuffer",
                    task_name
                );
            }
            pass.framebuffer = None;
            return Ok(());
        }
        if info.color_attachments.is_empty() && info.depth_stencil_attachment.is_none() {
            pass.framebuffer = None;
            return Ok(());
        }

        // framebuffer cache: hash by attachment identity, verify candidates
        let candidates = framebuffer_lookup.entry(key).or_default();
        for &index in candidates.iter() {
            if framebuffers[index].matches(&info) {
                pass.framebuffer = Some(index);
                return Ok(());
            }
        }
        let framebuffer = Framebuffer::new(gl, state, &info)?;
        let index = framebuffers.len();
        framebuffers.push(framebuffer);
        candidates.push(index);
        pass.framebuffer = Some(index);
        Ok(())
    }

    // ---- execute -------------------------------------------------------

    /// Runs the timeline. Tasks whose condition returns false are skipped;
    /// their realizations happened at build time and are not retracted.
    pub fn execute(&self, gl: &dyn GlApi, device: &Device, state: &mut State) {
        for step in &self.timeline {
            let task = &self.tasks[step.task];
            match &task.kind {
                TaskKind::Custom(custom) => {
                    if let Some(condition) = &custom.condition {
                        if !condition() {
                            continue;
                        }
                    }
                    if let Some(record) = &custom.record {
                        let mut cmd = CommandBuffer::new(gl, device, state);
                        let resources = GraphResources {
                            nodes: &self.resources,
                            pool: &self.pool,
                        };
                        record(&mut cmd, &resources);
                    }
                }
                TaskKind::Pass(pass) => {
                    if let Some(condition) = &pass.condition {
                        if !condition() {
                            continue;
                        }
                    }
                    let render_pass = match &pass.handle {
                        Some(handle) => handle,
                        None => {
                            error!("pass task '{}' executed before build", task.name);
                            continue;
                        }
                    };
                    let framebuffer = pass.framebuffer.map(|i| &self.framebuffers[i]);

                    let mut render_area = match &pass.render_area {
                        RenderAreaMode::Fixed(rect) => *rect,
                        RenderAreaMode::Dynamic(shared) => shared.get(),
                        RenderAreaMode::Auto => Default::default(),
                    };
                    if render_area.width == 0 || render_area.height == 0 {
                        let (w, h) = match framebuffer {
                            Some(fb) => (fb.width(), fb.height()),
                            None => state.swapchain_resolution(),
                        };
                        render_area = ignis_render::Rect2D::new(0, 0, w, h);
                    }

                    let mut cmd = CommandBuffer::new(gl, device, state);
                    cmd.begin_render_pass(&RenderPassBegin {
                        render_pass,
                        framebuffer,
                        render_area,
                        clear_colors: &pass.clear_colors,
                        clear_depth_stencil: pass.clear_depth_stencil,
                    });
                    cmd.set_viewport(&Viewport::with_rect(
                        render_area.x as f32,
                        render_area.y as f32,
                        render_area.width as f32,
                        render_area.height as f32,
                    ));

                    for (i, subpass) in pass.subpasses.iter().enumerate() {
                        if i > 0 {
                            cmd.next_subpass();
                        }
                        let context = PassContext {
                            render_pass,
                            framebuffer,
                            render_area,
                            resources: GraphResources {
                                nodes: &self.resources,
                                pool: &self.pool,
                            },
                        };
                        (subpass.record)(&mut cmd, &context, i as u32);
                    }

                    cmd.end_render_pass();
                }
            }
        }

        if self.debug {
            self.debug_dump();
        }
    }

    /// Logs the timeline: realizations, executions, derealizations.
    pub fn debug_dump(&self) {
        debug!("---------- frame graph ----------");
        for step in &self.timeline {
            for &r in &step.realized {
                debug!("realize {}", self.resources[r.0].name);
            }
            debug!("execute {}", self.tasks[step.task].name);
            for &r in &step.derealized {
                debug!("derealize {}", self.resources[r.0].name);
            }
        }
        debug!("---------------------------------");
    }

    // ---- lifecycle -----------------------------------------------------

    /// Drops every task and resource, releasing captured storage back to
    /// the pool. The texture pool and framebuffer cache survive for the
    /// next frame.
    pub fn clear(&mut self, state: &mut State) {
        let captured = std::mem::take(&mut self.captured);
        for index in captured {
            self.derealize_resource(ResourceHandle(index));
        }
        for task in &mut self.tasks {
            if let TaskKind::Pass(pass) = &mut task.kind {
                if let Some(handle) = pass.handle.take() {
                    handle.destroy(state);
                }
            }
        }
        self.tasks.clear();
        self.resources.clear();
        self.timeline.clear();
        self.id_gen = 0;
    }

    /// Additionally drops the pooled textures and cached framebuffers.
    pub fn reset_resources(&mut self, gl: &dyn GlApi, device: &mut Device, state: &mut State) {
        self.pool.reset(gl, device);
        for framebuffer in self.framebuffers.drain(..) {
            framebuffer.destroy(gl, state);
        }
        self.framebuffer_lookup.clear();
    }
}
