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

//! The graphics-device capability trait.

use crate::color::Color;
use crate::gfx::error::ResourceError;
use crate::gfx::handle::*;
use crate::gfx::params::*;
use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};
use std::fmt::Debug;

/// A texture allocation: the image handle plus its companion sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureAlloc {
    /// The GPU image.
    pub texture: TextureHandle,
    /// The sampler object configured from the descriptor's
    /// [`SamplerOptions`](crate::gfx::params::SamplerOptions).
    pub sampler: SamplerHandle,
}

/// The capability set the rendering core calls into. The core never issues
/// raw platform graphics calls; a backend implements this trait over one
/// graphics context.
///
/// Access is strictly sequential: every method takes `&mut self`, and all
/// resource construction, uniform updates, and draw submission happen on one
/// logical render thread. Backends therefore need no internal
/// synchronization.
///
/// Error policy: only *construction* can fail. State-setting calls
/// (`set_shader`, `set_texture`, `set_fbo`, uniform updates, `draw`) must
/// degrade to a safe default and log a warning when handed a null or stale
/// handle — they never panic and never return errors.
pub trait RenderDevice: Debug {
    // --- textures ---

    /// Creates a 2D texture, optionally uploading `pixels` (tightly packed
    /// rows in the descriptor's transfer format).
    fn create_texture_2d(
        &mut self,
        desc: &TextureDescriptor,
        pixels: Option<&[u8]>,
    ) -> Result<TextureAlloc, ResourceError>;

    /// Creates a cubemap texture. `faces` supplies the six face images in
    /// +X, -X, +Y, -Y, +Z, -Z order; `None` allocates storage only (render
    /// targets, environment captures).
    fn create_texture_cubemap(
        &mut self,
        desc: &TextureDescriptor,
        faces: Option<&[Vec<u8>; 6]>,
    ) -> Result<TextureAlloc, ResourceError>;

    /// Creates a floating-point 2D texture from HDR pixel data (or storage
    /// only when `pixels` is `None`).
    fn create_texture_hdr(
        &mut self,
        desc: &TextureDescriptor,
        pixels: Option<&[f32]>,
    ) -> Result<TextureAlloc, ResourceError>;

    /// Reallocates storage of a render-target texture to `size`. Contents
    /// become undefined.
    fn resize_rt_texture(
        &mut self,
        texture: TextureHandle,
        size: UVec2,
        internal_format: PixelFormat,
        format: PixelFormat,
    );

    /// Builds the mip chain of an existing texture.
    fn generate_mipmaps(&mut self, texture: TextureHandle, bind_mode: TextureBindMode);

    /// Releases a texture and its sampler. Releasing a null handle is a
    /// no-op.
    fn release_texture(&mut self, texture: TextureHandle, sampler: SamplerHandle);

    // --- vertex arrays ---

    /// Uploads indexed geometry and returns the vertex-array handle.
    ///
    /// ## Errors
    /// [`ResourceError::EmptyGeometry`] when `data` carries no positions or
    /// indices.
    fn create_vertex_array(
        &mut self,
        data: &MeshData,
        usage: BufferUsage,
    ) -> Result<VertexArrayHandle, ResourceError>;

    /// Releases a vertex array and its backing buffers.
    fn release_vertex_array(&mut self, vao: VertexArrayHandle);

    // --- shader programs ---

    /// Compiles and links a shader program from source.
    fn create_shader_program(
        &mut self,
        source: &ShaderSource,
    ) -> Result<ProgramHandle, ResourceError>;

    /// Runs the backend's program validation. Returns `true` when the
    /// program is usable against the current pipeline state.
    fn validate_shader_program(&mut self, program: ProgramHandle) -> bool;

    /// Associates a named uniform block in `program` with a buffer binding
    /// point.
    fn bind_uniform_block(&mut self, program: ProgramHandle, binding_point: u32, block_name: &str);

    /// Releases a shader program.
    fn release_shader_program(&mut self, program: ProgramHandle);

    // --- uniform buffers ---

    /// Allocates a uniform buffer of `size` bytes.
    fn create_uniform_buffer(
        &mut self,
        size: usize,
        usage: BufferUsage,
    ) -> Result<BufferHandle, ResourceError>;

    /// Writes `data` into the buffer at byte `offset`. Partial writes are
    /// the norm; the caller owns layout/offset bookkeeping.
    fn update_uniform_buffer(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]);

    /// Binds the whole buffer to a shader binding point.
    fn bind_uniform_buffer(&mut self, buffer: BufferHandle, binding_point: u32);

    /// Releases a uniform buffer.
    fn release_uniform_buffer(&mut self, buffer: BufferHandle);

    // --- framebuffers and render buffers ---

    /// Creates an empty framebuffer object.
    fn create_framebuffer(&mut self) -> Result<FramebufferHandle, ResourceError>;

    /// Attaches a texture (or one cubemap face, when `cubemap_face` is
    /// `Some`) at mip level `mip` to the given attachment point.
    fn attach_texture(
        &mut self,
        fbo: FramebufferHandle,
        texture: TextureHandle,
        attachment: Attachment,
        bind_mode: TextureBindMode,
        mip: u32,
        cubemap_face: Option<u32>,
    );

    /// Registers `count` color outputs for multi-render-target drawing.
    /// Must be called whenever more than one color attachment is in use.
    fn set_draw_buffers(&mut self, fbo: FramebufferHandle, count: u32);

    /// Attaches a render buffer to the framebuffer.
    fn attach_render_buffer(
        &mut self,
        fbo: FramebufferHandle,
        render_buffer: RenderBufferHandle,
        attachment: Attachment,
    );

    /// Queries framebuffer completeness. Callers treat `false` during setup
    /// as fatal.
    fn is_framebuffer_complete(&mut self, fbo: FramebufferHandle) -> bool;

    /// Releases a framebuffer object.
    fn release_framebuffer(&mut self, fbo: FramebufferHandle);

    /// Allocates a render buffer with the given storage and size.
    fn create_render_buffer(
        &mut self,
        storage: RenderBufferStorage,
        size: UVec2,
    ) -> Result<RenderBufferHandle, ResourceError>;

    /// Reallocates a render buffer's storage to `size`.
    fn resize_render_buffer(
        &mut self,
        render_buffer: RenderBufferHandle,
        storage: RenderBufferStorage,
        size: UVec2,
    );

    /// Releases a render buffer.
    fn release_render_buffer(&mut self, render_buffer: RenderBufferHandle);

    // --- per-frame state ---

    /// Selects the draw target. [`FramebufferHandle::NULL`] selects the
    /// default back buffer.
    fn set_fbo(&mut self, fbo: FramebufferHandle);

    /// Sets the viewport rectangle.
    fn set_viewport(&mut self, pos: UVec2, size: UVec2);

    /// Clears the selected buffers of the bound target.
    fn clear(&mut self, color: bool, depth: bool, stencil: bool, clear_color: Color, stencil_mask: u32);

    /// Binds a shader program for subsequent uniform updates and draws.
    /// A null handle degrades to "no program" with a warning.
    fn set_shader(&mut self, program: ProgramHandle);

    /// Binds `texture` with `sampler` to the given texture unit.
    fn set_texture(
        &mut self,
        texture: TextureHandle,
        sampler: SamplerHandle,
        unit: u32,
        bind_mode: TextureBindMode,
    );

    /// Draws `index_count` indices from the vertex array with the given
    /// fixed-function state.
    fn draw(&mut self, vao: VertexArrayHandle, params: &DrawParams, index_count: u32);

    // --- shader uniforms ---

    /// Writes a float uniform on `program`.
    fn update_uniform_float(&mut self, program: ProgramHandle, name: &str, value: f32);
    /// Writes an int uniform on `program`.
    fn update_uniform_int(&mut self, program: ProgramHandle, name: &str, value: i32);
    /// Writes a vec2 uniform on `program`.
    fn update_uniform_vec2(&mut self, program: ProgramHandle, name: &str, value: Vec2);
    /// Writes a vec3 uniform on `program`.
    fn update_uniform_vec3(&mut self, program: ProgramHandle, name: &str, value: Vec3);
    /// Writes a vec4 uniform on `program`.
    fn update_uniform_vec4(&mut self, program: ProgramHandle, name: &str, value: Vec4);
    /// Writes a color uniform (vec4) on `program`.
    fn update_uniform_color(&mut self, program: ProgramHandle, name: &str, value: Color);
    /// Writes a mat4 uniform on `program`.
    fn update_uniform_mat4(&mut self, program: ProgramHandle, name: &str, value: &Mat4);
}
