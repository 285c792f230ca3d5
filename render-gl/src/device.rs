//! Logical device: capabilities, UIDs, and hash-consed descriptor caches.

use fxhash::FxHashMap;
use log::error;

use ignis_render::{
    BlendingStateInfo, DepthStencilStateInfo, Error, RasterizerStateInfo, Result, SamplerInfo,
};

use crate::api::{DeviceCaps, GlApi, SamplerObj};

/// Cached sampler handle, valid for the device's lifetime.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Sampler {
    pub(crate) obj: SamplerObj,
}

macro_rules! state_id {
    ($name:ident) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

state_id!(BlendingStateId);
state_id!(RasterizerStateId);
state_id!(DepthStencilStateId);

/// Process-wide GPU device.
///
/// Owns the capability flags and the append-only caches for samplers and
/// the three fixed-function descriptor structs. Cache entries live until
/// [`Device::destroy`]; handles are plain indices, so back-references from
/// resources are lookups rather than pointers.
pub struct Device {
    caps: DeviceCaps,
    uid_gen: u32,

    sampler_cache: FxHashMap<SamplerInfo, Sampler>,
    sampler_objs: Vec<SamplerObj>,

    blending_cache: FxHashMap<BlendingStateInfo, BlendingStateId>,
    blending_states: Vec<BlendingStateInfo>,
    rasterizer_cache: FxHashMap<RasterizerStateInfo, RasterizerStateId>,
    rasterizer_states: Vec<RasterizerStateInfo>,
    depth_stencil_cache: FxHashMap<DepthStencilStateInfo, DepthStencilStateId>,
    depth_stencil_states: Vec<DepthStencilStateInfo>,

    // live-object counters, updated by resource creation
    pub(crate) total_buffers: u32,
    pub(crate) total_textures: u32,
    pub(crate) total_shader_modules: u32,
    pub(crate) buffer_memory: usize,
}

impl Device {
    pub fn new(gl: &dyn GlApi) -> Device {
        Device {
            caps: gl.caps(),
            uid_gen: 0,
            sampler_cache: FxHashMap::default(),
            sampler_objs: Vec::new(),
            blending_cache: FxHashMap::default(),
            blending_states: Vec::new(),
            rasterizer_cache: FxHashMap::default(),
            rasterizer_states: Vec::new(),
            depth_stencil_cache: FxHashMap::default(),
            depth_stencil_states: Vec::new(),
            total_buffers: 0,
            total_textures: 0,
            total_shader_modules: 0,
            buffer_memory: 0,
        }
    }

    pub fn caps(&self) -> &DeviceCaps {
        &self.caps
    }

    /// Monotonic identity used by the command recorder's binding caches.
    pub(crate) fn gen_uid(&mut self) -> u32 {
        self.uid_gen += 1;
        self.uid_gen
    }

    /// Returns the cached sampler for `info`, creating it on first use.
    pub fn get_or_create_sampler(&mut self, gl: &dyn GlApi, info: &SamplerInfo) -> Result<Sampler> {
        if info.max_anisotropy > 1 && !self.caps.texture_anisotropy {
            error!("sampler requests anisotropy on a device without support");
            return Err(Error::NotAvailable("anisotropic filtering"));
        }
        if let Some(&sampler) = self.sampler_cache.get(info) {
            return Ok(sampler);
        }
        let obj = gl.create_sampler(info);
        let sampler = Sampler { obj };
        self.sampler_cache.insert(*info, sampler);
        self.sampler_objs.push(obj);
        Ok(sampler)
    }

    pub fn cache_blending_state(&mut self, info: &BlendingStateInfo) -> BlendingStateId {
        if let Some(&id) = self.blending_cache.get(info) {
            return id;
        }
        let id = BlendingStateId(self.blending_states.len() as u32);
        self.blending_states.push(*info);
        self.blending_cache.insert(*info, id);
        id
    }

    pub fn cache_rasterizer_state(&mut self, info: &RasterizerStateInfo) -> RasterizerStateId {
        if let Some(&id) = self.rasterizer_cache.get(info) {
            return id;
        }
        let id = RasterizerStateId(self.rasterizer_states.len() as u32);
        self.rasterizer_states.push(*info);
        self.rasterizer_cache.insert(*info, id);
        id
    }

    pub fn cache_depth_stencil_state(&mut self, info: &DepthStencilStateInfo) -> DepthStencilStateId {
        if let Some(&id) = self.depth_stencil_cache.get(info) {
            return id;
        }
        let id = DepthStencilStateId(self.depth_stencil_states.len() as u32);
        self.depth_stencil_states.push(*info);
        self.depth_stencil_cache.insert(*info, id);
        id
    }

    pub fn blending_state(&self, id: BlendingStateId) -> &BlendingStateInfo {
        &self.blending_states[id.index()]
    }

    pub fn rasterizer_state(&self, id: RasterizerStateId) -> &RasterizerStateInfo {
        &self.rasterizer_states[id.index()]
    }

    pub fn depth_stencil_state(&self, id: DepthStencilStateId) -> &DepthStencilStateInfo {
        &self.depth_stencil_states[id.index()]
    }

    pub fn total_samplers(&self) -> usize {
        self.sampler_objs.len()
    }

    pub fn total_blending_states(&self) -> usize {
        self.blending_states.len()
    }

    pub fn total_rasterizer_states(&self) -> usize {
        self.rasterizer_states.len()
    }

    pub fn total_depth_stencil_states(&self) -> usize {
        self.depth_stencil_states.len()
    }

    pub fn total_buffers(&self) -> u32 {
        self.total_buffers
    }

    pub fn total_textures(&self) -> u32 {
        self.total_textures
    }

    pub fn total_shader_modules(&self) -> u32 {
        self.total_shader_modules
    }

    /// Frees every cached backend object. Cached handles become invalid.
    pub fn destroy(mut self, gl: &dyn GlApi) {
        for obj in self.sampler_objs.drain(..) {
            gl.delete_sampler(obj);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TraceGl;
    use ignis_render::{BlendingPreset, CullMode};

    #[test]
    fn sampler_cache_returns_same_handle() {
        let gl = TraceGl::new();
        let mut device = Device::new(&gl);
        let info = SamplerInfo::linear();
        let a = device.get_or_create_sampler(&gl, &info).unwrap();
        let b = device.get_or_create_sampler(&gl, &info).unwrap();
        assert_eq!(a, b);
        assert_eq!(device.total_samplers(), 1);
        assert_eq!(gl.count_calls("create_sampler("), 1);

        let other = SamplerInfo::default();
        let c = device.get_or_create_sampler(&gl, &other).unwrap();
        assert_ne!(a, c);
        assert_eq!(device.total_samplers(), 2);
    }

    #[test]
    fn fixed_function_caches_are_hash_consed() {
        let gl = TraceGl::new();
        let mut device = Device::new(&gl);

        let blend = BlendingStateInfo::from_preset(BlendingPreset::Alpha);
        assert_eq!(
            device.cache_blending_state(&blend),
            device.cache_blending_state(&blend)
        );
        assert_eq!(device.total_blending_states(), 1);

        let mut raster = RasterizerStateInfo::default();
        let a = device.cache_rasterizer_state(&raster);
        raster.cull_mode = CullMode::None;
        let b = device.cache_rasterizer_state(&raster);
        assert_ne!(a, b);
        assert_eq!(device.total_rasterizer_states(), 2);

        let ds = DepthStencilStateInfo::default();
        assert_eq!(
            device.cache_depth_stencil_state(&ds),
            device.cache_depth_stencil_state(&ds)
        );
    }

    #[test]
    fn uids_are_monotonic() {
        let gl = TraceGl::new();
        let mut device = Device::new(&gl);
        let a = device.gen_uid();
        let b = device.gen_uid();
        assert!(b > a);
    }
}
