//! Shader modules.
//!
//! A shader module is a separable program for a single stage, compiled from
//! complete GLSL sources or restored from a driver binary. Preprocessing
//! (includes, define permutations) happens in the material layer above;
//! this layer sees final source strings only.

use log::error;

use ignis_render::{Error, Result, ShaderStage};

use crate::api::{GlApi, ProgramObj};
use crate::device::Device;

pub struct ShaderModule {
    pub(crate) obj: ProgramObj,
    stage: ShaderStage,
    uid: u32,
}

impl ShaderModule {
    pub fn from_source(
        gl: &dyn GlApi,
        device: &mut Device,
        stage: ShaderStage,
        sources: &[&str],
    ) -> Result<ShaderModule> {
        let obj = match gl.create_shader_program(stage, sources) {
            Ok(obj) => obj,
            Err(log) => {
                error!("shader compilation failed ({:?}): {}", stage, log);
                return Err(Error::CompileFailed { log });
            }
        };
        device.total_shader_modules += 1;
        Ok(ShaderModule {
            obj,
            stage,
            uid: device.gen_uid(),
        })
    }

    /// Restores a module from a binary previously returned by
    /// [`ShaderModule::binary`].
    pub fn from_binary(
        gl: &dyn GlApi,
        device: &mut Device,
        stage: ShaderStage,
        binary: &[u8],
    ) -> Result<ShaderModule> {
        let obj = match gl.program_binary(binary) {
            Ok(obj) => obj,
            Err(log) => {
                error!("program binary rejected: {}", log);
                return Err(Error::LinkFailed { log });
            }
        };
        device.total_shader_modules += 1;
        Ok(ShaderModule {
            obj,
            stage,
            uid: device.gen_uid(),
        })
    }

    /// Retrieves the compiled binary for caching.
    pub fn binary(&self, gl: &dyn GlApi) -> Vec<u8> {
        gl.get_program_binary(self.obj)
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn destroy(self, gl: &dyn GlApi, device: &mut Device) {
        gl.delete_program(self.obj);
        device.total_shader_modules -= 1;
    }
}
