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

//! A headless [`RenderDevice`] that allocates handles without a graphics
//! context and records every call it receives.
//!
//! Used by the test suites to assert frame-composition behavior (which
//! framebuffers were drawn into, what was cleared, what got released) and
//! usable as a no-op backend for off-screen or CI runs.

use crate::color::Color;
use crate::gfx::device::{RenderDevice, TextureAlloc};
use crate::gfx::error::ResourceError;
use crate::gfx::handle::*;
use crate::gfx::params::*;
use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};
use std::collections::HashMap;

/// One recorded draw submission.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Framebuffer bound when the draw was issued.
    pub fbo: FramebufferHandle,
    /// Vertex array drawn.
    pub vao: VertexArrayHandle,
    /// Program bound when the draw was issued.
    pub program: ProgramHandle,
    /// Index count submitted.
    pub index_count: u32,
}

/// One recorded clear.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearCall {
    /// Framebuffer bound when the clear was issued.
    pub fbo: FramebufferHandle,
    /// Whether the color buffer was cleared.
    pub color: bool,
    /// Whether the depth buffer was cleared.
    pub depth: bool,
    /// Whether the stencil buffer was cleared.
    pub stencil: bool,
}

/// One recorded texture bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureBind {
    /// Texture bound.
    pub texture: TextureHandle,
    /// Unit it was bound to.
    pub unit: u32,
    /// Bind target.
    pub bind_mode: TextureBindMode,
}

/// Recording device. Handles are sequential and never zero; all state
/// queries succeed (framebuffers are always complete, programs always
/// validate).
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    next_handle: u32,

    /// Currently bound framebuffer.
    pub bound_fbo: FramebufferHandle,
    /// Currently bound program.
    pub bound_program: ProgramHandle,
    /// Last viewport set: (position, size).
    pub viewport: (UVec2, UVec2),

    /// Every draw in submission order.
    pub draw_calls: Vec<DrawCall>,
    /// Every clear in submission order.
    pub clears: Vec<ClearCall>,
    /// Every texture bind in submission order.
    pub texture_binds: Vec<TextureBind>,
    /// Uniform writes as `(program, name)` in submission order.
    pub uniform_writes: Vec<(ProgramHandle, String)>,
    /// Uniform-buffer writes as `(buffer, offset, len)`.
    pub buffer_writes: Vec<(BufferHandle, usize, usize)>,

    /// Current size of every live texture.
    pub texture_sizes: HashMap<TextureHandle, UVec2>,
    /// Current size of every live render buffer.
    pub render_buffer_sizes: HashMap<RenderBufferHandle, UVec2>,
    /// Draw-buffer counts registered per framebuffer.
    pub draw_buffer_counts: HashMap<FramebufferHandle, u32>,

    /// Textures released so far.
    pub released_textures: Vec<TextureHandle>,
    /// Vertex arrays released so far.
    pub released_vertex_arrays: Vec<VertexArrayHandle>,
    /// Programs released so far.
    pub released_programs: Vec<ProgramHandle>,
}

impl HeadlessDevice {
    /// Creates a fresh device with an empty call log.
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    /// Number of draws issued while `fbo` was bound.
    pub fn draws_to(&self, fbo: FramebufferHandle) -> usize {
        self.draw_calls.iter().filter(|d| d.fbo == fbo).count()
    }

    /// Last texture bound to `unit`, if any.
    pub fn last_bind_on_unit(&self, unit: u32) -> Option<TextureBind> {
        self.texture_binds.iter().rev().find(|b| b.unit == unit).copied()
    }

    /// Clears the recorded logs, keeping live-resource bookkeeping.
    pub fn reset_log(&mut self) {
        self.draw_calls.clear();
        self.clears.clear();
        self.texture_binds.clear();
        self.uniform_writes.clear();
        self.buffer_writes.clear();
    }
}

impl RenderDevice for HeadlessDevice {
    fn create_texture_2d(
        &mut self,
        desc: &TextureDescriptor,
        _pixels: Option<&[u8]>,
    ) -> Result<TextureAlloc, ResourceError> {
        let alloc = TextureAlloc {
            texture: TextureHandle(self.next()),
            sampler: SamplerHandle(self.next()),
        };
        self.texture_sizes.insert(alloc.texture, desc.size);
        Ok(alloc)
    }

    fn create_texture_cubemap(
        &mut self,
        desc: &TextureDescriptor,
        _faces: Option<&[Vec<u8>; 6]>,
    ) -> Result<TextureAlloc, ResourceError> {
        let alloc = TextureAlloc {
            texture: TextureHandle(self.next()),
            sampler: SamplerHandle(self.next()),
        };
        self.texture_sizes.insert(alloc.texture, desc.size);
        Ok(alloc)
    }

    fn create_texture_hdr(
        &mut self,
        desc: &TextureDescriptor,
        _pixels: Option<&[f32]>,
    ) -> Result<TextureAlloc, ResourceError> {
        let alloc = TextureAlloc {
            texture: TextureHandle(self.next()),
            sampler: SamplerHandle(self.next()),
        };
        self.texture_sizes.insert(alloc.texture, desc.size);
        Ok(alloc)
    }

    fn resize_rt_texture(
        &mut self,
        texture: TextureHandle,
        size: UVec2,
        _internal_format: PixelFormat,
        _format: PixelFormat,
    ) {
        if let Some(s) = self.texture_sizes.get_mut(&texture) {
            *s = size;
        } else {
            log::warn!("HeadlessDevice: resize of unknown texture {texture:?}");
        }
    }

    fn generate_mipmaps(&mut self, _texture: TextureHandle, _bind_mode: TextureBindMode) {}

    fn release_texture(&mut self, texture: TextureHandle, _sampler: SamplerHandle) {
        if texture.is_null() {
            return;
        }
        self.texture_sizes.remove(&texture);
        self.released_textures.push(texture);
    }

    fn create_vertex_array(
        &mut self,
        data: &MeshData,
        _usage: BufferUsage,
    ) -> Result<VertexArrayHandle, ResourceError> {
        if data.is_empty() {
            return Err(ResourceError::EmptyGeometry);
        }
        Ok(VertexArrayHandle(self.next()))
    }

    fn release_vertex_array(&mut self, vao: VertexArrayHandle) {
        if !vao.is_null() {
            self.released_vertex_arrays.push(vao);
        }
    }

    fn create_shader_program(
        &mut self,
        _source: &ShaderSource,
    ) -> Result<ProgramHandle, ResourceError> {
        Ok(ProgramHandle(self.next()))
    }

    fn validate_shader_program(&mut self, _program: ProgramHandle) -> bool {
        true
    }

    fn bind_uniform_block(
        &mut self,
        _program: ProgramHandle,
        _binding_point: u32,
        _block_name: &str,
    ) {
    }

    fn release_shader_program(&mut self, program: ProgramHandle) {
        if !program.is_null() {
            self.released_programs.push(program);
        }
    }

    fn create_uniform_buffer(
        &mut self,
        _size: usize,
        _usage: BufferUsage,
    ) -> Result<BufferHandle, ResourceError> {
        Ok(BufferHandle(self.next()))
    }

    fn update_uniform_buffer(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]) {
        self.buffer_writes.push((buffer, offset, data.len()));
    }

    fn bind_uniform_buffer(&mut self, _buffer: BufferHandle, _binding_point: u32) {}

    fn release_uniform_buffer(&mut self, _buffer: BufferHandle) {}

    fn create_framebuffer(&mut self) -> Result<FramebufferHandle, ResourceError> {
        Ok(FramebufferHandle(self.next()))
    }

    fn attach_texture(
        &mut self,
        _fbo: FramebufferHandle,
        _texture: TextureHandle,
        _attachment: Attachment,
        _bind_mode: TextureBindMode,
        _mip: u32,
        _cubemap_face: Option<u32>,
    ) {
    }

    fn set_draw_buffers(&mut self, fbo: FramebufferHandle, count: u32) {
        self.draw_buffer_counts.insert(fbo, count);
    }

    fn attach_render_buffer(
        &mut self,
        _fbo: FramebufferHandle,
        _render_buffer: RenderBufferHandle,
        _attachment: Attachment,
    ) {
    }

    fn is_framebuffer_complete(&mut self, _fbo: FramebufferHandle) -> bool {
        true
    }

    fn release_framebuffer(&mut self, _fbo: FramebufferHandle) {}

    fn create_render_buffer(
        &mut self,
        _storage: RenderBufferStorage,
        size: UVec2,
    ) -> Result<RenderBufferHandle, ResourceError> {
        let rb = RenderBufferHandle(self.next());
        self.render_buffer_sizes.insert(rb, size);
        Ok(rb)
    }

    fn resize_render_buffer(
        &mut self,
        render_buffer: RenderBufferHandle,
        _storage: RenderBufferStorage,
        size: UVec2,
    ) {
        self.render_buffer_sizes.insert(render_buffer, size);
    }

    fn release_render_buffer(&mut self, render_buffer: RenderBufferHandle) {
        self.render_buffer_sizes.remove(&render_buffer);
    }

    fn set_fbo(&mut self, fbo: FramebufferHandle) {
        self.bound_fbo = fbo;
    }

    fn set_viewport(&mut self, pos: UVec2, size: UVec2) {
        self.viewport = (pos, size);
    }

    fn clear(&mut self, color: bool, depth: bool, stencil: bool, _clear_color: Color, _stencil_mask: u32) {
        self.clears.push(ClearCall {
            fbo: self.bound_fbo,
            color,
            depth,
            stencil,
        });
    }

    fn set_shader(&mut self, program: ProgramHandle) {
        if program.is_null() {
            log::warn!("HeadlessDevice: set_shader with null program, keeping previous binding");
            return;
        }
        self.bound_program = program;
    }

    fn set_texture(
        &mut self,
        texture: TextureHandle,
        _sampler: SamplerHandle,
        unit: u32,
        bind_mode: TextureBindMode,
    ) {
        self.texture_binds.push(TextureBind {
            texture,
            unit,
            bind_mode,
        });
    }

    fn draw(&mut self, vao: VertexArrayHandle, _params: &DrawParams, index_count: u32) {
        self.draw_calls.push(DrawCall {
            fbo: self.bound_fbo,
            vao,
            program: self.bound_program,
            index_count,
        });
    }

    fn update_uniform_float(&mut self, program: ProgramHandle, name: &str, _value: f32) {
        self.uniform_writes.push((program, name.to_string()));
    }

    fn update_uniform_int(&mut self, program: ProgramHandle, name: &str, _value: i32) {
        self.uniform_writes.push((program, name.to_string()));
    }

    fn update_uniform_vec2(&mut self, program: ProgramHandle, name: &str, _value: Vec2) {
        self.uniform_writes.push((program, name.to_string()));
    }

    fn update_uniform_vec3(&mut self, program: ProgramHandle, name: &str, _value: Vec3) {
        self.uniform_writes.push((program, name.to_string()));
    }

    fn update_uniform_vec4(&mut self, program: ProgramHandle, name: &str, _value: Vec4) {
        self.uniform_writes.push((program, name.to_string()));
    }

    fn update_uniform_color(&mut self, program: ProgramHandle, name: &str, _value: Color) {
        self.uniform_writes.push((program, name.to_string()));
    }

    fn update_uniform_mat4(&mut self, program: ProgramHandle, name: &str, _value: &Mat4) {
        self.uniform_writes.push((program, name.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_sequential_and_non_null() {
        let mut dev = HeadlessDevice::new();
        let desc = TextureDescriptor::rgba8(UVec2::new(4, 4));
        let a = dev.create_texture_2d(&desc, None).unwrap();
        let b = dev.create_texture_2d(&desc, None).unwrap();
        assert!(!a.texture.is_null());
        assert_ne!(a.texture, b.texture);
        assert_ne!(a.sampler, b.sampler);
    }

    #[test]
    fn empty_geometry_is_rejected() {
        let mut dev = HeadlessDevice::new();
        let err = dev
            .create_vertex_array(&MeshData::default(), BufferUsage::StaticDraw)
            .unwrap_err();
        assert!(matches!(err, ResourceError::EmptyGeometry));
    }

    #[test]
    fn draws_are_attributed_to_the_bound_fbo() {
        let mut dev = HeadlessDevice::new();
        let fbo = dev.create_framebuffer().unwrap();
        let vao = VertexArrayHandle(99);
        let params = DrawParams::default();

        dev.draw(vao, &params, 6);
        dev.set_fbo(fbo);
        dev.draw(vao, &params, 6);
        dev.draw(vao, &params, 6);

        assert_eq!(dev.draws_to(FramebufferHandle::NULL), 1);
        assert_eq!(dev.draws_to(fbo), 2);
    }

    #[test]
    fn resize_updates_tracked_texture_size() {
        let mut dev = HeadlessDevice::new();
        let desc = TextureDescriptor::rgba8(UVec2::new(8, 8));
        let alloc = dev.create_texture_2d(&desc, None).unwrap();
        dev.resize_rt_texture(
            alloc.texture,
            UVec2::new(32, 16),
            PixelFormat::Rgba,
            PixelFormat::Rgba,
        );
        assert_eq!(dev.texture_sizes[&alloc.texture], UVec2::new(32, 16));
    }

    #[test]
    fn null_shader_bind_keeps_previous_program() {
        let mut dev = HeadlessDevice::new();
        let p = ProgramHandle(3);
        dev.set_shader(p);
        dev.set_shader(ProgramHandle::NULL);
        assert_eq!(dev.bound_program, p);
    }
}
