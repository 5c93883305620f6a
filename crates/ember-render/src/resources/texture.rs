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

//! CPU-side texture wrapper owning a GPU image + sampler pair.

use ember_core::gfx::{
    PixelFormat, RenderDevice, SamplerHandle, SamplerOptions, TextureBindMode, TextureDescriptor,
    TextureHandle,
};
use ember_core::ResourceError;
use glam::UVec2;

/// A non-owning view of a texture's GPU identity.
///
/// Material texture slots and render-target attachment records hold these;
/// the owning [`Texture`] (and ultimately the resource registry or the
/// frame-target set) controls the lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRef {
    /// GPU image handle.
    pub texture: TextureHandle,
    /// Companion sampler handle.
    pub sampler: SamplerHandle,
    /// Bind target of the underlying image.
    pub bind_mode: TextureBindMode,
    /// Whether this is the shared empty/default texture.
    pub is_empty: bool,
}

/// An owned texture: GPU image + sampler plus the CPU-side attributes
/// needed for resizing and slot binding.
///
/// Destruction releases the device handles exactly once, via
/// [`Texture::release`]; the wrapper holds no device reference, so dropping
/// it without releasing leaks the GPU object (the registry and frame-target
/// set are the only owners and both release on unload/shutdown).
#[derive(Debug)]
pub struct Texture {
    handle: TextureHandle,
    sampler: SamplerHandle,
    size: UVec2,
    internal_format: PixelFormat,
    format: PixelFormat,
    bind_mode: TextureBindMode,
    is_render_target: bool,
    is_empty: bool,
    path: Option<String>,
}

impl Texture {
    /// Constructs the shared 1x1 empty texture. Every declared sampler slot
    /// falls back to this (or its cubemap sibling) so samplers are never
    /// left unbound.
    pub fn construct_empty(device: &mut dyn RenderDevice) -> Result<Self, ResourceError> {
        let desc = TextureDescriptor::rgba8(UVec2::ONE);
        let alloc = device.create_texture_2d(&desc, Some(&[255, 255, 255, 255]))?;
        Ok(Self {
            handle: alloc.texture,
            sampler: alloc.sampler,
            size: UVec2::ONE,
            internal_format: desc.internal_format,
            format: desc.format,
            bind_mode: TextureBindMode::Texture2D,
            is_render_target: false,
            is_empty: true,
            path: None,
        })
    }

    /// Constructs the shared 1x1 empty cubemap.
    pub fn construct_empty_cubemap(device: &mut dyn RenderDevice) -> Result<Self, ResourceError> {
        let desc = TextureDescriptor::rgba8(UVec2::ONE);
        let alloc = device.create_texture_cubemap(&desc, None)?;
        Ok(Self {
            handle: alloc.texture,
            sampler: alloc.sampler,
            size: UVec2::ONE,
            internal_format: desc.internal_format,
            format: desc.format,
            bind_mode: TextureBindMode::Cubemap,
            is_render_target: false,
            is_empty: true,
            path: None,
        })
    }

    /// Constructs a 2D texture from decoded RGBA8 pixels.
    pub fn from_rgba8(
        device: &mut dyn RenderDevice,
        path: &str,
        size: UVec2,
        pixels: &[u8],
        sampler: SamplerOptions,
    ) -> Result<Self, ResourceError> {
        let desc = TextureDescriptor {
            size,
            internal_format: PixelFormat::Rgba,
            format: PixelFormat::Rgba,
            sampler,
            is_render_target: false,
        };
        let alloc = device.create_texture_2d(&desc, Some(pixels))?;
        Ok(Self {
            handle: alloc.texture,
            sampler: alloc.sampler,
            size,
            internal_format: desc.internal_format,
            format: desc.format,
            bind_mode: TextureBindMode::Texture2D,
            is_render_target: false,
            is_empty: false,
            path: Some(path.to_string()),
        })
    }

    /// Constructs a floating-point texture from decoded HDR pixels
    /// (RGB f32 triplets), or storage only when `pixels` is `None`.
    pub fn from_hdr(
        device: &mut dyn RenderDevice,
        path: Option<&str>,
        size: UVec2,
        pixels: Option<&[f32]>,
    ) -> Result<Self, ResourceError> {
        let sampler = SamplerOptions {
            wrap_s: ember_core::gfx::WrapMode::ClampToEdge,
            wrap_t: ember_core::gfx::WrapMode::ClampToEdge,
            wrap_r: ember_core::gfx::WrapMode::ClampToEdge,
            ..SamplerOptions::default()
        };
        let desc = TextureDescriptor {
            size,
            internal_format: PixelFormat::Rgb16F,
            format: PixelFormat::Rgb,
            sampler,
            is_render_target: pixels.is_none(),
        };
        let alloc = device.create_texture_hdr(&desc, pixels)?;
        Ok(Self {
            handle: alloc.texture,
            sampler: alloc.sampler,
            size,
            internal_format: desc.internal_format,
            format: desc.format,
            bind_mode: TextureBindMode::Texture2D,
            is_render_target: pixels.is_none(),
            is_empty: false,
            path: path.map(str::to_string),
        })
    }

    /// Constructs a cubemap from six decoded RGBA8 faces.
    pub fn from_cubemap_faces(
        device: &mut dyn RenderDevice,
        name: &str,
        size: UVec2,
        faces: &[Vec<u8>; 6],
        sampler: SamplerOptions,
    ) -> Result<Self, ResourceError> {
        let desc = TextureDescriptor {
            size,
            internal_format: PixelFormat::Rgba,
            format: PixelFormat::Rgba,
            sampler,
            is_render_target: false,
        };
        let alloc = device.create_texture_cubemap(&desc, Some(faces))?;
        Ok(Self {
            handle: alloc.texture,
            sampler: alloc.sampler,
            size,
            internal_format: desc.internal_format,
            format: desc.format,
            bind_mode: TextureBindMode::Cubemap,
            is_render_target: false,
            is_empty: false,
            path: Some(name.to_string()),
        })
    }

    /// Constructs an uninitialized 2D render-target texture.
    pub fn construct_rt(
        device: &mut dyn RenderDevice,
        size: UVec2,
        internal_format: PixelFormat,
        format: PixelFormat,
        sampler: SamplerOptions,
    ) -> Result<Self, ResourceError> {
        let desc = TextureDescriptor {
            size,
            internal_format,
            format,
            sampler,
            is_render_target: true,
        };
        let alloc = device.create_texture_2d(&desc, None)?;
        Ok(Self {
            handle: alloc.texture,
            sampler: alloc.sampler,
            size,
            internal_format,
            format,
            bind_mode: TextureBindMode::Texture2D,
            is_render_target: true,
            is_empty: false,
            path: None,
        })
    }

    /// Constructs an uninitialized cubemap render target (environment
    /// captures).
    pub fn construct_rt_cubemap(
        device: &mut dyn RenderDevice,
        size: UVec2,
        sampler: SamplerOptions,
    ) -> Result<Self, ResourceError> {
        let desc = TextureDescriptor {
            size,
            internal_format: PixelFormat::Rgb16F,
            format: PixelFormat::Rgb,
            sampler,
            is_render_target: true,
        };
        let alloc = device.create_texture_cubemap(&desc, None)?;
        Ok(Self {
            handle: alloc.texture,
            sampler: alloc.sampler,
            size,
            internal_format: PixelFormat::Rgb16F,
            format: PixelFormat::Rgb,
            bind_mode: TextureBindMode::Cubemap,
            is_render_target: true,
            is_empty: false,
            path: None,
        })
    }

    /// Resizes the GPU storage in place and updates the tracked size.
    /// Valid only for render-target textures.
    pub fn resize(&mut self, device: &mut dyn RenderDevice, size: UVec2) {
        if !self.is_render_target {
            log::warn!("Texture: resize on a non render-target texture, ignoring");
            return;
        }
        device.resize_rt_texture(self.handle, size, self.internal_format, self.format);
        self.size = size;
    }

    /// Releases the device handles. Safe to call once; the wrapper keeps a
    /// null handle afterwards.
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        if self.handle.is_null() {
            return;
        }
        device.release_texture(self.handle, self.sampler);
        self.handle = TextureHandle::NULL;
        self.sampler = SamplerHandle::NULL;
    }

    /// A non-owning view of the GPU identity.
    pub fn view(&self) -> TextureRef {
        TextureRef {
            texture: self.handle,
            sampler: self.sampler,
            bind_mode: self.bind_mode,
            is_empty: self.is_empty,
        }
    }

    /// GPU image handle.
    #[inline]
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Companion sampler handle.
    #[inline]
    pub fn sampler(&self) -> SamplerHandle {
        self.sampler
    }

    /// Pixel dimensions.
    #[inline]
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Bind target.
    #[inline]
    pub fn bind_mode(&self) -> TextureBindMode {
        self.bind_mode
    }

    /// Whether this is the shared empty/default texture.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// Whether the texture is framebuffer-attachable.
    #[inline]
    pub fn is_render_target(&self) -> bool {
        self.is_render_target
    }

    /// Source path, when file-loaded.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub(crate) fn internal_format(&self) -> PixelFormat {
        self.internal_format
    }

    pub(crate) fn format(&self) -> PixelFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::gfx::HeadlessDevice;

    #[test]
    fn empty_texture_is_flagged_and_one_by_one() {
        let mut dev = HeadlessDevice::new();
        let tex = Texture::construct_empty(&mut dev).unwrap();
        assert!(tex.is_empty());
        assert_eq!(tex.size(), UVec2::ONE);
        assert!(tex.view().is_empty);
    }

    #[test]
    fn release_is_idempotent() {
        let mut dev = HeadlessDevice::new();
        let mut tex = Texture::construct_empty(&mut dev).unwrap();
        let handle = tex.handle();
        tex.release(&mut dev);
        tex.release(&mut dev);
        assert_eq!(dev.released_textures, vec![handle]);
        assert!(tex.handle().is_null());
    }

    #[test]
    fn rt_resize_updates_cpu_and_gpu_size() {
        let mut dev = HeadlessDevice::new();
        let mut tex = Texture::construct_rt(
            &mut dev,
            UVec2::new(64, 64),
            PixelFormat::Rgb16F,
            PixelFormat::Rgb,
            SamplerOptions::default(),
        )
        .unwrap();
        tex.resize(&mut dev, UVec2::new(128, 32));
        assert_eq!(tex.size(), UVec2::new(128, 32));
        assert_eq!(dev.texture_sizes[&tex.handle()], UVec2::new(128, 32));
    }

    #[test]
    fn non_rt_resize_is_rejected() {
        let mut dev = HeadlessDevice::new();
        let mut tex = Texture::construct_empty(&mut dev).unwrap();
        tex.resize(&mut dev, UVec2::new(8, 8));
        assert_eq!(tex.size(), UVec2::ONE);
    }
}
