//! Data model shared by every ignis backend.
//!
//! This crate carries no GPU state: it is the vocabulary of the renderer.
//! Pixel formats, buffer data types, fixed-function state descriptors,
//! sampler descriptors, render pass declarations and the shared error type
//! all live here so that the backend crate and the layers above it agree on
//! one set of value types. Everything that participates in a hash-consed
//! cache is `Eq + Hash` by construction.

pub mod buffer;
pub mod data;
pub mod error;
pub mod format;
pub mod pass;
pub mod pipeline;
pub mod query;
pub mod sampler;
pub mod texture;
pub mod vertex;

pub use self::buffer::*;
pub use self::data::*;
pub use self::error::{Error, Result};
pub use self::format::*;
pub use self::pass::*;
pub use self::pipeline::*;
pub use self::query::*;
pub use self::sampler::*;
pub use self::texture::*;
pub use self::vertex::*;

/// Hardware-independent limits assumed by the state tables.
///
/// These mirror the minimum guarantees of the targeted feature level; the
/// per-device values reported by the backend may be larger, but the binding
/// tables are sized with these.
pub const MAX_VERTEX_BUFFER_SLOTS: usize = 32;
pub const MAX_BUFFER_SLOTS: usize = 32;
pub const MAX_SAMPLER_SLOTS: usize = 16;
pub const MAX_IMAGE_SLOTS: usize = 8;
pub const MAX_COLOR_ATTACHMENTS: usize = 8;
pub const MAX_SUBPASSES: usize = 16;
pub const MAX_VERTEX_BINDINGS: usize = 16;
pub const MAX_VERTEX_ATTRIBS: usize = 16;
