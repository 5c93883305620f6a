// Copyright 2025 ember contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shader program wrapper.

use crate::shaders::ShaderKind;
use ember_core::gfx::{ProgramHandle, RenderDevice};
use ember_core::ResourceError;

/// A linked shader program owned by the resource registry.
#[derive(Debug)]
pub struct Shader {
    program: ProgramHandle,
    kind: ShaderKind,
}

impl Shader {
    /// Compiles and links the built-in source for `kind`.
    pub fn construct(device: &mut dyn RenderDevice, kind: ShaderKind) -> Result<Self, ResourceError> {
        let program = device.create_shader_program(&kind.source())?;
        Ok(Self { program, kind })
    }

    /// Associates a named uniform block with a buffer binding point.
    pub fn bind_uniform_block(
        &self,
        device: &mut dyn RenderDevice,
        binding_point: u32,
        block_name: &str,
    ) {
        device.bind_uniform_block(self.program, binding_point, block_name);
    }

    /// Device program handle.
    #[inline]
    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Which built-in shader this is.
    #[inline]
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    /// Releases the program.
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        if !self.program.is_null() {
            device.release_shader_program(self.program);
            self.program = ProgramHandle::NULL;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::gfx::HeadlessDevice;

    #[test]
    fn construct_yields_a_live_program() {
        let mut dev = HeadlessDevice::new();
        let shader = Shader::construct(&mut dev, ShaderKind::Unlit).unwrap();
        assert!(!shader.program().is_null());
        assert_eq!(shader.kind(), ShaderKind::Unlit);
    }
}
