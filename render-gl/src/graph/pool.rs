//! Transient texture aliasing pool.
//!
//! Realizing a transient resource hands out a free pooled texture whose
//! storage parameters match the request exactly; derealizing returns it to
//! the free list so a later task in the same frame (or a later frame) can
//! alias the same physical memory.

use log::debug;
use slotmap::{new_key_type, SlotMap};

use ignis_render::{Result, TextureDesc};

use crate::api::GlApi;
use crate::device::Device;
use crate::texture::Texture;

new_key_type! {
    pub struct PooledTextureId;
}

fn compatible(a: &TextureDesc, b: &TextureDesc) -> bool {
    a.ty == b.ty
        && a.format == b.format
        && a.resolution == b.resolution
        && a.multisample == b.multisample
        && a.swizzle == b.swizzle
        && a.num_lods == b.num_lods
}

pub(crate) struct TexturePool {
    entries: SlotMap<PooledTextureId, Texture>,
    free: Vec<PooledTextureId>,
}

impl TexturePool {
    pub fn new() -> TexturePool {
        TexturePool {
            entries: SlotMap::with_key(),
            free: Vec::new(),
        }
    }

    /// Finds a free compatible texture, or allocates a new one owned by the
    /// pool. First match wins.
    pub fn realize(
        &mut self,
        gl: &dyn GlApi,
        device: &mut Device,
        desc: &TextureDesc,
    ) -> Result<PooledTextureId> {
        if let Some(pos) = self
            .free
            .iter()
            .position(|&id| compatible(self.entries[id].desc(), desc))
        {
            let id = self.free.remove(pos);
            debug!("reusing pooled texture for {:?}", desc.format);
            return Ok(id);
        }

        debug!(
            "allocating pooled texture {:?} {:?} ({} lods, {} samples)",
            desc.format, desc.resolution, desc.num_lods, desc.multisample.samples
        );
        let texture = Texture::storage(gl, device, *desc)?;
        Ok(self.entries.insert(texture))
    }

    pub fn derealize(&mut self, id: PooledTextureId) {
        debug_assert!(!self.free.contains(&id));
        self.free.push(id);
    }

    pub fn texture(&self, id: PooledTextureId) -> &Texture {
        &self.entries[id]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Destroys every pooled texture, including ones still handed out.
    pub fn reset(&mut self, gl: &dyn GlApi, device: &mut Device) {
        self.free.clear();
        let ids: Vec<PooledTextureId> = self.entries.keys().collect();
        for id in ids {
            if let Some(texture) = self.entries.remove(id) {
                texture.destroy(gl, device);
            }
        }
    }
}
