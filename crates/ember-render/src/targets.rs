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

//! Off-screen render targets and the fixed per-frame framebuffer set.
//!
//! A [`RenderTarget`] owns its framebuffer, its attached textures, and its
//! optional depth/stencil render buffer; materials only ever see non-owning
//! [`TextureRef`](crate::resources::TextureRef) views of the attachments.
//! Completeness is validated once at construction and treated as fatal —
//! an incomplete framebuffer discovered per-frame would silently corrupt
//! every pass behind it.

use crate::resources::texture::Texture;
use crate::settings::RenderSettings;
use ember_core::gfx::{
    Attachment, FramebufferHandle, PixelFormat, RenderBufferHandle, RenderBufferStorage,
    RenderDevice, SamplerFilter, SamplerOptions, SetupError, TextureBindMode, WrapMode,
};
use glam::UVec2;

/// Side length of the HDRI capture target and the BRDF LUT.
pub const CAPTURE_RESOLUTION: u32 = 512;

fn rt_sampler() -> SamplerOptions {
    SamplerOptions {
        min_filter: SamplerFilter::Linear,
        mag_filter: SamplerFilter::Linear,
        wrap_s: WrapMode::ClampToEdge,
        wrap_t: WrapMode::ClampToEdge,
        wrap_r: WrapMode::ClampToEdge,
        generate_mipmaps: false,
    }
}

/// The companion depth/stencil render buffer of a target.
#[derive(Debug)]
struct RenderBuffer {
    handle: RenderBufferHandle,
    storage: RenderBufferStorage,
    size: UVec2,
}

/// A framebuffer bundling one or more color outputs (or a depth texture)
/// that draw calls write into instead of the screen.
#[derive(Debug)]
pub struct RenderTarget {
    name: String,
    fbo: FramebufferHandle,
    colors: Vec<Texture>,
    depth: Option<Texture>,
    render_buffer: Option<RenderBuffer>,
    size: UVec2,
}

impl RenderTarget {
    /// Constructs a target with one color attachment and, when
    /// `render_buffer` is given, a companion depth/stencil render buffer.
    pub fn new(
        device: &mut dyn RenderDevice,
        name: &str,
        size: UVec2,
        internal_format: PixelFormat,
        format: PixelFormat,
        render_buffer: Option<RenderBufferStorage>,
    ) -> Result<Self, SetupError> {
        let fbo = device.create_framebuffer()?;
        let color = Texture::construct_rt(device, size, internal_format, format, rt_sampler())?;
        device.attach_texture(
            fbo,
            color.handle(),
            Attachment::Color(0),
            TextureBindMode::Texture2D,
            0,
            None,
        );

        let render_buffer = match render_buffer {
            Some(storage) => {
                let handle = device.create_render_buffer(storage, size)?;
                let attachment = match storage {
                    RenderBufferStorage::DepthStencil => Attachment::DepthStencil,
                    _ => Attachment::Depth,
                };
                device.attach_render_buffer(fbo, handle, attachment);
                Some(RenderBuffer {
                    handle,
                    storage,
                    size,
                })
            }
            None => None,
        };

        let target = Self {
            name: name.to_string(),
            fbo,
            colors: vec![color],
            depth: None,
            render_buffer,
            size,
        };
        target.ensure_complete(device)?;
        Ok(target)
    }

    /// Constructs a depth-only target (the shadow map). No color output is
    /// registered with the device.
    pub fn new_depth(
        device: &mut dyn RenderDevice,
        name: &str,
        size: UVec2,
    ) -> Result<Self, SetupError> {
        let fbo = device.create_framebuffer()?;
        let sampler = SamplerOptions {
            min_filter: SamplerFilter::Nearest,
            mag_filter: SamplerFilter::Nearest,
            wrap_s: WrapMode::ClampToBorder,
            wrap_t: WrapMode::ClampToBorder,
            wrap_r: WrapMode::ClampToBorder,
            generate_mipmaps: false,
        };
        let depth =
            Texture::construct_rt(device, size, PixelFormat::Depth, PixelFormat::Depth, sampler)?;
        device.attach_texture(
            fbo,
            depth.handle(),
            Attachment::Depth,
            TextureBindMode::Texture2D,
            0,
            None,
        );
        device.set_draw_buffers(fbo, 0);

        let target = Self {
            name: name.to_string(),
            fbo,
            colors: Vec::new(),
            depth: Some(depth),
            render_buffer: None,
            size,
        };
        target.ensure_complete(device)?;
        Ok(target)
    }

    /// Adds another color attachment after construction and re-registers
    /// the full draw-buffer list with the device (multi-render-target).
    pub fn add_color_attachment(
        &mut self,
        device: &mut dyn RenderDevice,
        internal_format: PixelFormat,
        format: PixelFormat,
    ) -> Result<(), SetupError> {
        let index = self.colors.len() as u32;
        let color =
            Texture::construct_rt(device, self.size, internal_format, format, rt_sampler())?;
        device.attach_texture(
            self.fbo,
            color.handle(),
            Attachment::Color(index),
            TextureBindMode::Texture2D,
            0,
            None,
        );
        self.colors.push(color);
        device.set_draw_buffers(self.fbo, self.colors.len() as u32);
        self.ensure_complete(device)
    }

    fn ensure_complete(&self, device: &mut dyn RenderDevice) -> Result<(), SetupError> {
        if device.is_framebuffer_complete(self.fbo) {
            Ok(())
        } else {
            Err(SetupError::IncompleteFramebuffer {
                target: self.name.clone(),
            })
        }
    }

    /// Selects this target for subsequent draws.
    pub fn bind(&self, device: &mut dyn RenderDevice) {
        device.set_fbo(self.fbo);
    }

    /// Resizes every attachment and the companion render buffer together.
    /// No attachment may lag behind, or color/depth resolution mismatch
    /// leaves the framebuffer in an undefined completeness state.
    pub fn resize(&mut self, device: &mut dyn RenderDevice, size: UVec2) {
        if size == self.size {
            return;
        }
        for color in &mut self.colors {
            color.resize(device, size);
        }
        if let Some(depth) = &mut self.depth {
            depth.resize(device, size);
        }
        if let Some(rb) = &mut self.render_buffer {
            device.resize_render_buffer(rb.handle, rb.storage, size);
            rb.size = size;
        }
        self.size = size;
    }

    /// Resizes only the companion render buffer. The HDRI prefilter stage
    /// renders each mip level at its own resolution while the attached
    /// cubemap faces are swapped per draw.
    pub fn resize_render_buffer(&mut self, device: &mut dyn RenderDevice, size: UVec2) {
        match &mut self.render_buffer {
            Some(rb) => {
                device.resize_render_buffer(rb.handle, rb.storage, size);
                rb.size = size;
            }
            None => log::warn!("Render target '{}' has no render buffer to resize", self.name),
        }
    }

    /// Points color attachment 0 at one face (and mip) of a cubemap owned
    /// elsewhere. Used by the HDRI capture stages.
    pub fn attach_cubemap_face(
        &self,
        device: &mut dyn RenderDevice,
        texture: &Texture,
        face: u32,
        mip: u32,
    ) {
        device.attach_texture(
            self.fbo,
            texture.handle(),
            Attachment::Color(0),
            TextureBindMode::Cubemap,
            mip,
            Some(face),
        );
    }

    /// Points color attachment 0 at a plain 2D texture owned elsewhere.
    /// Used by the BRDF LUT stage.
    pub fn attach_color_texture(&self, device: &mut dyn RenderDevice, texture: &Texture) {
        device.attach_texture(
            self.fbo,
            texture.handle(),
            Attachment::Color(0),
            TextureBindMode::Texture2D,
            0,
            None,
        );
    }

    /// Framebuffer handle.
    #[inline]
    pub fn fbo(&self) -> FramebufferHandle {
        self.fbo
    }

    /// Current size of the attachments.
    #[inline]
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Color attachment `index`.
    pub fn color(&self, index: usize) -> &Texture {
        &self.colors[index]
    }

    /// Number of color attachments.
    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    /// The depth texture, when this is a depth-only target.
    pub fn depth(&self) -> Option<&Texture> {
        self.depth.as_ref()
    }

    /// Debug name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current size of the companion render buffer, if any.
    pub fn render_buffer_size(&self) -> Option<UVec2> {
        self.render_buffer.as_ref().map(|rb| rb.size)
    }

    /// Releases the framebuffer, every owned texture, and the render
    /// buffer.
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        for color in &mut self.colors {
            color.release(device);
        }
        if let Some(depth) = &mut self.depth {
            depth.release(device);
        }
        if let Some(rb) = self.render_buffer.take() {
            device.release_render_buffer(rb.handle);
        }
        if !self.fbo.is_null() {
            device.release_framebuffer(self.fbo);
            self.fbo = FramebufferHandle::NULL;
        }
    }
}

/// The fixed set of off-screen targets the frame composer draws into.
#[derive(Debug)]
pub struct FrameTargets {
    /// Primary HDR scene target: two color attachments (lit scene +
    /// brightness extraction) and a depth/stencil render buffer.
    pub primary: RenderTarget,
    /// Ping-pong pair alternated across the gaussian blur iterations.
    pub pingpong: [RenderTarget; 2],
    /// Depth-only target rendered from the sun's point of view.
    pub shadow: RenderTarget,
    /// Scratch target the HDRI precompute stages re-attach per face/mip.
    pub capture: RenderTarget,
}

impl FrameTargets {
    /// Builds the full target set for a `viewport`-sized frame.
    pub fn initialize(
        device: &mut dyn RenderDevice,
        viewport: UVec2,
        settings: &RenderSettings,
    ) -> Result<Self, SetupError> {
        let mut primary = RenderTarget::new(
            device,
            "primary",
            viewport,
            PixelFormat::Rgba16F,
            PixelFormat::Rgba,
            Some(RenderBufferStorage::DepthStencil),
        )?;
        primary.add_color_attachment(device, PixelFormat::Rgba16F, PixelFormat::Rgba)?;

        let pingpong = [
            RenderTarget::new(
                device,
                "pingpong_0",
                viewport,
                PixelFormat::Rgba16F,
                PixelFormat::Rgba,
                None,
            )?,
            RenderTarget::new(
                device,
                "pingpong_1",
                viewport,
                PixelFormat::Rgba16F,
                PixelFormat::Rgba,
                None,
            )?,
        ];

        let shadow_size = UVec2::splat(settings.shadow_map_resolution);
        let shadow = RenderTarget::new_depth(device, "shadow", shadow_size)?;

        let capture = RenderTarget::new(
            device,
            "hdri_capture",
            UVec2::splat(CAPTURE_RESOLUTION),
            PixelFormat::Rgb16F,
            PixelFormat::Rgb,
            Some(RenderBufferStorage::DepthComponent24),
        )?;

        Ok(Self {
            primary,
            pingpong,
            shadow,
            capture,
        })
    }

    /// Propagates a viewport resize to the window-sized targets. The
    /// shadow and capture targets have fixed resolutions and stay put.
    pub fn resize(&mut self, device: &mut dyn RenderDevice, viewport: UVec2) {
        self.primary.resize(device, viewport);
        for target in &mut self.pingpong {
            target.resize(device, viewport);
        }
    }

    /// The composited scene color attachment.
    pub fn scene_color(&self) -> &Texture {
        self.primary.color(0)
    }

    /// The brightness-extraction attachment the bloom pass sources from.
    pub fn bright_color(&self) -> &Texture {
        self.primary.color(1)
    }

    /// The shadow depth map.
    pub fn shadow_map(&self) -> &Texture {
        self.shadow
            .depth()
            .unwrap_or_else(|| self.primary.color(0))
    }

    /// Releases every target.
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        self.primary.release(device);
        for target in &mut self.pingpong {
            target.release(device);
        }
        self.shadow.release(device);
        self.capture.release(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::gfx::HeadlessDevice;

    fn targets() -> (HeadlessDevice, FrameTargets) {
        let mut dev = HeadlessDevice::new();
        let targets =
            FrameTargets::initialize(&mut dev, UVec2::new(1280, 720), &RenderSettings::default())
                .unwrap();
        (dev, targets)
    }

    #[test]
    fn primary_target_registers_two_draw_buffers() {
        let (dev, targets) = targets();
        assert_eq!(targets.primary.color_count(), 2);
        assert_eq!(dev.draw_buffer_counts[&targets.primary.fbo()], 2);
    }

    #[test]
    fn shadow_target_is_depth_only() {
        let (dev, targets) = targets();
        assert!(targets.shadow.depth().is_some());
        assert_eq!(targets.shadow.color_count(), 0);
        assert_eq!(dev.draw_buffer_counts[&targets.shadow.fbo()], 0);
    }

    #[test]
    fn resize_moves_every_attachment_and_the_render_buffer() {
        let (mut dev, mut targets) = targets();
        let new_size = UVec2::new(640, 360);
        targets.resize(&mut dev, new_size);

        for i in 0..targets.primary.color_count() {
            let tex = targets.primary.color(i);
            assert_eq!(tex.size(), new_size);
            assert_eq!(dev.texture_sizes[&tex.handle()], new_size);
        }
        assert_eq!(targets.primary.render_buffer_size(), Some(new_size));
        for target in &targets.pingpong {
            assert_eq!(target.color(0).size(), new_size);
        }
        // Fixed-resolution targets are untouched.
        assert_eq!(targets.shadow.size(), UVec2::splat(2048));
        assert_eq!(targets.capture.size(), UVec2::splat(CAPTURE_RESOLUTION));
    }

    #[test]
    fn resize_to_the_same_size_is_a_no_op() {
        let (mut dev, mut targets) = targets();
        let writes_before = dev.texture_sizes.clone();
        targets.primary.resize(&mut dev, UVec2::new(1280, 720));
        assert_eq!(dev.texture_sizes, writes_before);
    }

    #[test]
    fn release_frees_owned_textures() {
        let (mut dev, mut targets) = targets();
        targets.release(&mut dev);
        // Two primary colors, two pingpong colors, shadow depth, capture color.
        assert_eq!(dev.released_textures.len(), 6);
    }
}
