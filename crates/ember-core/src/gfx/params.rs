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

//! Descriptor and fixed-function state types shared between the device
//! boundary and the resource layer.

use glam::{UVec2, Vec2, Vec3};
use std::borrow::Cow;

/// Pixel storage format of a texture, split into the transfer format (the
/// layout of the bytes handed to the device) and the internal format (how
/// the device stores them).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Single red channel, 8 bits.
    R,
    /// Red + green, 8 bits each.
    Rg,
    /// Red + green, 16-bit float per channel. BRDF integration LUTs.
    Rg16F,
    /// RGB, 8 bits each.
    Rgb,
    /// RGBA, 8 bits each.
    Rgba,
    /// RGB, 16-bit float per channel. HDR render targets and environment maps.
    Rgb16F,
    /// RGBA, 16-bit float per channel.
    Rgba16F,
    /// Depth component (device-chosen precision).
    Depth,
    /// 16-bit depth component.
    Depth16,
    /// Combined depth + stencil.
    DepthStencil,
}

/// Texture minification/magnification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerFilter {
    /// Point sampling.
    Nearest,
    /// Linear interpolation between texels.
    Linear,
    /// Nearest texel, nearest mip level.
    NearestMipmapNearest,
    /// Linear filtering, nearest mip level.
    LinearMipmapNearest,
    /// Nearest texel, linear between mip levels.
    NearestMipmapLinear,
    /// Trilinear filtering.
    LinearMipmapLinear,
}

/// How texture coordinates outside `[0, 1]` are resolved, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Coordinates wrap around.
    Repeat,
    /// Coordinates clamp to the edge texel.
    ClampToEdge,
    /// Coordinates wrap, mirroring at integer boundaries.
    MirrorRepeat,
    /// Coordinates outside the range sample a fixed border color.
    ClampToBorder,
}

/// Which texture target a texture binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureBindMode {
    /// A plain 2D texture.
    Texture2D,
    /// A six-face cubemap.
    Cubemap,
}

/// Buffer allocation/update frequency hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Written once, drawn many times.
    StaticDraw,
    /// Re-written frequently (per-frame uniform data).
    DynamicDraw,
    /// Written once per use.
    StreamDraw,
}

/// Framebuffer attachment point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    /// Color attachment at the given index (multi-render-target capable).
    Color(u32),
    /// Depth attachment.
    Depth,
    /// Stencil attachment.
    Stencil,
    /// Combined depth + stencil attachment.
    DepthStencil,
}

/// Storage format of a render buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderBufferStorage {
    /// Depth storage at device-chosen precision.
    Depth,
    /// 24-bit depth component storage.
    DepthComponent24,
    /// Combined depth + stencil storage.
    DepthStencil,
}

/// Primitive assembly topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Independent triangles.
    #[default]
    Triangles,
    /// Triangle strip.
    TriangleStrip,
    /// Independent lines.
    Lines,
    /// Line strip.
    LineStrip,
    /// Points.
    Points,
}

/// Which faces are culled before rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FaceCulling {
    /// No culling.
    #[default]
    None,
    /// Cull back faces.
    Back,
    /// Cull front faces.
    Front,
    /// Cull everything (depth/stencil side effects only).
    FrontAndBack,
}

/// Comparison function for depth and stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunc {
    /// Never passes.
    Never,
    /// Always passes.
    #[default]
    Always,
    /// Passes if incoming < stored.
    Less,
    /// Passes if incoming <= stored.
    LessEqual,
    /// Passes if incoming > stored.
    Greater,
    /// Passes if incoming >= stored.
    GreaterEqual,
    /// Passes if equal.
    Equal,
    /// Passes if not equal.
    NotEqual,
}

/// Stencil buffer update operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOp {
    /// Keep the stored value.
    #[default]
    Keep,
    /// Zero the stored value.
    Zero,
    /// Replace with the comparison value.
    Replace,
    /// Increment, clamping.
    Incr,
    /// Increment, wrapping.
    IncrWrap,
    /// Decrement, clamping.
    Decr,
    /// Decrement, wrapping.
    DecrWrap,
    /// Bitwise invert.
    Invert,
}

/// Blend factor. `None` on both source and destination disables blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendFactor {
    /// Blending disabled for this side.
    #[default]
    None,
    /// Factor of one.
    One,
    /// Source alpha.
    SrcAlpha,
    /// One minus source alpha.
    OneMinusSrcAlpha,
    /// Destination alpha.
    DstAlpha,
    /// One minus destination alpha.
    OneMinusDstAlpha,
}

/// Fixed-function pipeline state for a single draw call.
///
/// Passed by reference into every [`draw`](crate::gfx::device::RenderDevice::draw)
/// call and never mutated implicitly; the composer keeps a small set of
/// preset values (scene, skybox, shadow depth, fullscreen quad) and hands
/// them out per pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawParams {
    /// Primitive assembly topology.
    pub topology: PrimitiveTopology,
    /// Face culling mode.
    pub face_culling: FaceCulling,
    /// Whether the depth test is enabled.
    pub use_depth_test: bool,
    /// Depth comparison function.
    pub depth_func: CompareFunc,
    /// Whether depth writes are enabled.
    pub write_depth: bool,
    /// Whether the stencil test is enabled.
    pub use_stencil_test: bool,
    /// Stencil comparison function.
    pub stencil_func: CompareFunc,
    /// Reference value for the stencil comparison.
    pub stencil_comparison_val: i32,
    /// Mask applied to the stencil test.
    pub stencil_test_mask: u32,
    /// Mask applied to stencil writes.
    pub stencil_write_mask: u32,
    /// Operation when the stencil test fails.
    pub stencil_fail: StencilOp,
    /// Operation when the stencil test passes but the depth test fails.
    pub stencil_pass_depth_fail: StencilOp,
    /// Operation when both tests pass.
    pub stencil_pass: StencilOp,
    /// Source blend factor.
    pub source_blend: BlendFactor,
    /// Destination blend factor.
    pub dest_blend: BlendFactor,
    /// Whether the scissor test is enabled.
    pub use_scissor_test: bool,
    /// Scissor rectangle origin x.
    pub scissor_start_x: u32,
    /// Scissor rectangle origin y.
    pub scissor_start_y: u32,
    /// Scissor rectangle width.
    pub scissor_width: u32,
    /// Scissor rectangle height.
    pub scissor_height: u32,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            topology: PrimitiveTopology::Triangles,
            face_culling: FaceCulling::None,
            use_depth_test: false,
            depth_func: CompareFunc::Always,
            write_depth: true,
            use_stencil_test: false,
            stencil_func: CompareFunc::Always,
            stencil_comparison_val: 0,
            stencil_test_mask: 0,
            stencil_write_mask: 0,
            stencil_fail: StencilOp::Keep,
            stencil_pass_depth_fail: StencilOp::Keep,
            stencil_pass: StencilOp::Keep,
            source_blend: BlendFactor::None,
            dest_blend: BlendFactor::None,
            use_scissor_test: false,
            scissor_start_x: 0,
            scissor_start_y: 0,
            scissor_width: 0,
            scissor_height: 0,
        }
    }
}

/// Sampler state for a texture: filtering, wrapping, and whether a mip
/// chain is generated after upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerOptions {
    /// Minification filter.
    pub min_filter: SamplerFilter,
    /// Magnification filter.
    pub mag_filter: SamplerFilter,
    /// Wrap mode along S.
    pub wrap_s: WrapMode,
    /// Wrap mode along T.
    pub wrap_t: WrapMode,
    /// Wrap mode along R (cubemaps / 3D).
    pub wrap_r: WrapMode,
    /// Generate mipmaps after the initial upload.
    pub generate_mipmaps: bool,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            min_filter: SamplerFilter::Linear,
            mag_filter: SamplerFilter::Linear,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            wrap_r: WrapMode::Repeat,
            generate_mipmaps: false,
        }
    }
}

/// Everything the device needs to construct a texture image.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor {
    /// Width and height in pixels.
    pub size: UVec2,
    /// Device-internal storage format.
    pub internal_format: PixelFormat,
    /// Transfer format of the uploaded pixel data.
    pub format: PixelFormat,
    /// Sampler state.
    pub sampler: SamplerOptions,
    /// Whether the texture will be attached to a framebuffer.
    pub is_render_target: bool,
}

impl TextureDescriptor {
    /// Descriptor for a plain 8-bit RGBA image of the given size.
    pub fn rgba8(size: UVec2) -> Self {
        Self {
            size,
            internal_format: PixelFormat::Rgba,
            format: PixelFormat::Rgba,
            sampler: SamplerOptions::default(),
            is_render_target: false,
        }
    }
}

/// CPU-side indexed geometry handed to the device for vertex-array
/// construction. Positions and indices are mandatory; the other channels
/// may be empty and are then omitted from the vertex layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex normals (empty if absent).
    pub normals: Vec<Vec3>,
    /// Per-vertex texture coordinates (empty if absent).
    pub uvs: Vec<Vec2>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of indices to draw.
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// `true` when the geometry has no triangles to draw.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }
}

/// Source text for a shader program. Engine shaders are embedded string
/// constants; the device compiles and links them.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    /// Debug label used in compile/link diagnostics.
    pub label: Cow<'static, str>,
    /// Vertex stage source.
    pub vertex: Cow<'static, str>,
    /// Fragment stage source.
    pub fragment: Cow<'static, str>,
    /// Optional geometry stage source.
    pub geometry: Option<Cow<'static, str>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_params_default_matches_device_reset_state() {
        let p = DrawParams::default();
        assert_eq!(p.topology, PrimitiveTopology::Triangles);
        assert_eq!(p.face_culling, FaceCulling::None);
        assert_eq!(p.depth_func, CompareFunc::Always);
        assert_eq!(p.source_blend, BlendFactor::None);
        assert!(!p.use_scissor_test);
    }

    #[test]
    fn mesh_data_emptiness() {
        let mut m = MeshData::default();
        assert!(m.is_empty());
        m.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        assert!(m.is_empty());
        m.indices = vec![0, 1, 2];
        assert!(!m.is_empty());
        assert_eq!(m.vertex_count(), 3);
        assert_eq!(m.index_count(), 3);
    }
}
