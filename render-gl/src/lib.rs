//! OpenGL 4.5 backend for the ignis renderer.
//!
//! Layers, leaves first:
//!
//! * [`api`]: the typed GL command sink ([`api::GlApi`]) plus the
//!   [`trace`] implementation used for driver-less testing.
//! * GAL primitives: [`buffer`], [`texture`], [`shader`], [`pipeline`],
//!   [`renderpass`], [`framebuffer`], [`query`], [`xfb`], [`sync`].
//! * [`device`] and [`state`]: process-wide caches and the per-context
//!   state mirror.
//! * [`command`]: the recorder that turns requests into minimal backend
//!   calls by diffing against the state.
//! * [`graph`]: the frame graph scheduling per-frame work over all of the
//!   above.
//!
//! All entry points take their context explicitly: the `GlApi` reference
//! and, where needed, the `Device` and `State`. Nothing here touches
//! globals except the thread-current state registration in [`state`].

pub mod api;
pub mod buffer;
pub mod command;
pub mod device;
pub mod framebuffer;
pub mod graph;
pub mod pipeline;
pub mod query;
pub mod renderpass;
pub mod shader;
pub mod state;
pub mod sync;
pub mod texture;
pub mod trace;
pub mod xfb;

pub use self::api::{DeviceCaps, GlApi};
pub use self::buffer::Buffer;
pub use self::command::{
    BufferBinding, CommandBuffer, ImageBinding, RenderPassBegin, SamplerBinding, ShaderResources,
    TextureBinding,
};
pub use self::device::{Device, Sampler};
pub use self::framebuffer::{AttachKind, Framebuffer, FramebufferAttachment, FramebufferCreateInfo};
pub use self::graph::{
    FrameGraph, GraphResources, PassContext, ResourceAccess, ResourceHandle, TaskHandle,
};
pub use self::pipeline::{Pipeline, PipelineCreateInfo};
pub use self::query::QueryPool;
pub use self::renderpass::RenderPass;
pub use self::shader::ShaderModule;
pub use self::state::{
    current_state_uid, make_current, ClipControl, State, StateCreateInfo, ViewportOrigin,
};
pub use self::sync::FenceSync;
pub use self::texture::{Texture, TextureRef};
pub use self::trace::TraceGl;
pub use self::xfb::TransformFeedback;
