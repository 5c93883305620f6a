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

//! One-shot HDRI environment precompute.
//!
//! Four ordered GPU convolution stages share the engine's capture target,
//! re-attaching its color output and resizing its render buffer per stage:
//! equirectangular → cubemap, diffuse irradiance, specular prefilter across
//! a mip chain, and the BRDF integration LUT. The products are cached until
//! released; `captured` gates whether materials may request them.

use crate::resources::material::keys;
use crate::resources::texture::{Texture, TextureRef};
use crate::targets::RenderTarget;
use ember_core::gfx::{
    DrawParams, PixelFormat, ProgramHandle, RenderDevice, ResourceError, SamplerFilter,
    SamplerOptions, TextureBindMode, VertexArrayHandle, WrapMode,
};
use ember_core::Color;
use glam::{Mat4, UVec2, Vec3};

/// Side length of the environment cubemap faces.
pub const ENVIRONMENT_RESOLUTION: u32 = 512;
/// Side length of the diffuse-irradiance cubemap faces.
pub const IRRADIANCE_RESOLUTION: u32 = 32;
/// Side length of mip 0 of the specular-prefiltered cubemap.
pub const PREFILTER_RESOLUTION: u32 = 128;
/// Mip levels convolved by the prefilter stage.
pub const PREFILTER_MIP_LEVELS: u32 = 5;
/// Side length of the BRDF integration LUT.
pub const BRDF_LUT_RESOLUTION: u32 = 512;

/// Geometry and programs the capture stages draw with, collected from the
/// resource registry by the engine.
#[derive(Debug, Clone, Copy)]
pub struct CaptureResources {
    /// Unit cube vertex array.
    pub cube_vao: VertexArrayHandle,
    /// Index count of the cube.
    pub cube_index_count: u32,
    /// Fullscreen quad vertex array.
    pub quad_vao: VertexArrayHandle,
    /// Index count of the quad.
    pub quad_index_count: u32,
    /// Equirectangular-to-cubemap program.
    pub equirect_program: ProgramHandle,
    /// Irradiance convolution program.
    pub irradiance_program: ProgramHandle,
    /// Specular prefilter program.
    pub prefilter_program: ProgramHandle,
    /// BRDF integration program.
    pub brdf_program: ProgramHandle,
}

/// The six capture view matrices, one per cubemap face in +X, -X, +Y, -Y,
/// +Z, -Z order.
fn face_views() -> [Mat4; 6] {
    [
        Mat4::look_at_rh(Vec3::ZERO, Vec3::X, Vec3::NEG_Y),
        Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_X, Vec3::NEG_Y),
        Mat4::look_at_rh(Vec3::ZERO, Vec3::Y, Vec3::Z),
        Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Y, Vec3::NEG_Z),
        Mat4::look_at_rh(Vec3::ZERO, Vec3::Z, Vec3::NEG_Y),
        Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::NEG_Y),
    ]
}

fn capture_projection() -> Mat4 {
    Mat4::perspective_rh_gl(90.0_f32.to_radians(), 1.0, 0.1, 10.0)
}

fn capture_sampler(min_filter: SamplerFilter) -> SamplerOptions {
    SamplerOptions {
        min_filter,
        mag_filter: SamplerFilter::Linear,
        wrap_s: WrapMode::ClampToEdge,
        wrap_t: WrapMode::ClampToEdge,
        wrap_r: WrapMode::ClampToEdge,
        generate_mipmaps: false,
    }
}

/// Cubemap draw state: no culling so the inside of the unit cube is
/// rasterized, depth test off (each face is a full clear + overwrite).
fn capture_params() -> DrawParams {
    DrawParams::default()
}

/// The cached environment products of one capture run.
#[derive(Debug, Default)]
pub struct HdriPipeline {
    environment: Option<Texture>,
    irradiance: Option<Texture>,
    prefilter: Option<Texture>,
    brdf_lut: Option<Texture>,
    captured: bool,
}

impl HdriPipeline {
    /// Creates the pipeline in its un-captured state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a capture has completed and the environment maps may be
    /// handed to materials.
    #[inline]
    pub fn captured(&self) -> bool {
        self.captured
    }

    /// The raw environment cubemap, after capture.
    pub fn environment(&self) -> Option<&Texture> {
        self.environment.as_ref()
    }

    /// The diffuse-irradiance cubemap, after capture.
    pub fn irradiance(&self) -> Option<&Texture> {
        self.irradiance.as_ref()
    }

    /// The specular-prefiltered cubemap, after capture.
    pub fn prefilter(&self) -> Option<&Texture> {
        self.prefilter.as_ref()
    }

    /// The BRDF integration LUT, after capture.
    pub fn brdf_lut(&self) -> Option<&Texture> {
        self.brdf_lut.as_ref()
    }

    /// Runs all four convolution stages against `equirect`. A previous
    /// capture's products are released first, so re-capturing with a new
    /// environment never leaks the old one.
    pub fn capture(
        &mut self,
        device: &mut dyn RenderDevice,
        capture: &mut RenderTarget,
        equirect: TextureRef,
        res: &CaptureResources,
    ) -> Result<(), ResourceError> {
        self.release(device);

        let views = face_views();
        let projection = capture_projection();
        let params = capture_params();

        // Stage a: equirectangular image onto six cubemap faces, then a
        // full mip chain for the prefilter stage to sample from.
        let environment = Texture::construct_rt_cubemap(
            device,
            UVec2::splat(ENVIRONMENT_RESOLUTION),
            capture_sampler(SamplerFilter::LinearMipmapLinear),
        )?;
        capture.resize_render_buffer(device, UVec2::splat(ENVIRONMENT_RESOLUTION));
        capture.bind(device);
        device.set_viewport(UVec2::ZERO, UVec2::splat(ENVIRONMENT_RESOLUTION));
        device.set_shader(res.equirect_program);
        device.update_uniform_mat4(res.equirect_program, keys::PROJECTION_MATRIX, &projection);
        device.update_uniform_int(res.equirect_program, keys::EQUIRECT_MAP, 0);
        device.update_uniform_int(res.equirect_program, "equirect_map_is_active", 1);
        device.set_texture(equirect.texture, equirect.sampler, 0, TextureBindMode::Texture2D);
        for (face, view) in views.iter().enumerate() {
            device.update_uniform_mat4(res.equirect_program, keys::VIEW_MATRIX, view);
            capture.attach_cubemap_face(device, &environment, face as u32, 0);
            device.clear(true, true, false, Color::BLACK, 0);
            device.draw(res.cube_vao, &params, res.cube_index_count);
        }
        device.generate_mipmaps(environment.handle(), TextureBindMode::Cubemap);

        // Stage b: cosine-weighted diffuse irradiance.
        let irradiance = Texture::construct_rt_cubemap(
            device,
            UVec2::splat(IRRADIANCE_RESOLUTION),
            capture_sampler(SamplerFilter::Linear),
        )?;
        capture.resize_render_buffer(device, UVec2::splat(IRRADIANCE_RESOLUTION));
        device.set_viewport(UVec2::ZERO, UVec2::splat(IRRADIANCE_RESOLUTION));
        device.set_shader(res.irradiance_program);
        device.update_uniform_mat4(res.irradiance_program, keys::PROJECTION_MATRIX, &projection);
        device.update_uniform_int(res.irradiance_program, keys::ENVIRONMENT_MAP, 0);
        device.update_uniform_int(res.irradiance_program, "environment_map_is_active", 1);
        device.set_texture(
            environment.handle(),
            environment.sampler(),
            0,
            TextureBindMode::Cubemap,
        );
        for (face, view) in views.iter().enumerate() {
            device.update_uniform_mat4(res.irradiance_program, keys::VIEW_MATRIX, view);
            capture.attach_cubemap_face(device, &irradiance, face as u32, 0);
            device.clear(true, true, false, Color::BLACK, 0);
            device.draw(res.cube_vao, &params, res.cube_index_count);
        }

        // Stage c: GGX specular prefilter, one convolution per mip level
        // with roughness spread linearly across the chain.
        let prefilter = Texture::construct_rt_cubemap(
            device,
            UVec2::splat(PREFILTER_RESOLUTION),
            SamplerOptions {
                generate_mipmaps: true,
                ..capture_sampler(SamplerFilter::LinearMipmapLinear)
            },
        )?;
        device.generate_mipmaps(prefilter.handle(), TextureBindMode::Cubemap);
        device.set_shader(res.prefilter_program);
        device.update_uniform_mat4(res.prefilter_program, keys::PROJECTION_MATRIX, &projection);
        device.update_uniform_int(res.prefilter_program, keys::ENVIRONMENT_MAP, 0);
        device.update_uniform_int(res.prefilter_program, "environment_map_is_active", 1);
        device.update_uniform_float(
            res.prefilter_program,
            keys::ENVIRONMENT_RESOLUTION,
            ENVIRONMENT_RESOLUTION as f32,
        );
        device.set_texture(
            environment.handle(),
            environment.sampler(),
            0,
            TextureBindMode::Cubemap,
        );
        for mip in 0..PREFILTER_MIP_LEVELS {
            let mip_size = UVec2::splat(PREFILTER_RESOLUTION >> mip);
            capture.resize_render_buffer(device, mip_size);
            device.set_viewport(UVec2::ZERO, mip_size);
            let roughness = mip as f32 / (PREFILTER_MIP_LEVELS - 1) as f32;
            device.update_uniform_float(
                res.prefilter_program,
                keys::ROUGHNESS_MULTIPLIER,
                roughness,
            );
            for (face, view) in views.iter().enumerate() {
                device.update_uniform_mat4(res.prefilter_program, keys::VIEW_MATRIX, view);
                capture.attach_cubemap_face(device, &prefilter, face as u32, mip);
                device.clear(true, true, false, Color::BLACK, 0);
                device.draw(res.cube_vao, &params, res.cube_index_count);
            }
        }

        // Stage d: the BRDF integration LUT, a single fullscreen draw.
        let brdf_lut = Texture::construct_rt(
            device,
            UVec2::splat(BRDF_LUT_RESOLUTION),
            PixelFormat::Rg16F,
            PixelFormat::Rg,
            capture_sampler(SamplerFilter::Linear),
        )?;
        capture.resize_render_buffer(device, UVec2::splat(BRDF_LUT_RESOLUTION));
        capture.attach_color_texture(device, &brdf_lut);
        device.set_viewport(UVec2::ZERO, UVec2::splat(BRDF_LUT_RESOLUTION));
        device.set_shader(res.brdf_program);
        device.clear(true, true, false, Color::BLACK, 0);
        device.draw(res.quad_vao, &params, res.quad_index_count);

        self.environment = Some(environment);
        self.irradiance = Some(irradiance);
        self.prefilter = Some(prefilter);
        self.brdf_lut = Some(brdf_lut);
        self.captured = true;
        Ok(())
    }

    /// Releases any captured products and clears the gate.
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        for texture in [
            self.environment.take(),
            self.irradiance.take(),
            self.prefilter.take(),
            self.brdf_lut.take(),
        ]
        .iter_mut()
        .flatten()
        {
            texture.release(device);
        }
        self.captured = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{PrimitiveKind, ResourceRegistry};
    use crate::settings::RenderSettings;
    use crate::shaders::ShaderKind;
    use crate::targets::FrameTargets;
    use ember_core::gfx::HeadlessDevice;

    fn fixture() -> (HeadlessDevice, ResourceRegistry, FrameTargets) {
        let mut dev = HeadlessDevice::new();
        let registry = ResourceRegistry::initialize(&mut dev).unwrap();
        let targets =
            FrameTargets::initialize(&mut dev, UVec2::new(800, 600), &RenderSettings::default())
                .unwrap();
        (dev, registry, targets)
    }

    fn capture_resources(registry: &ResourceRegistry) -> CaptureResources {
        let cube = registry.primitive(PrimitiveKind::Cube).submeshes()[0];
        let quad = registry.primitive(PrimitiveKind::Quad).submeshes()[0];
        CaptureResources {
            cube_vao: cube.vao,
            cube_index_count: cube.index_count,
            quad_vao: quad.vao,
            quad_index_count: quad.index_count,
            equirect_program: registry.shader(ShaderKind::HdriEquirect).program(),
            irradiance_program: registry.shader(ShaderKind::HdriIrradiance).program(),
            prefilter_program: registry.shader(ShaderKind::HdriPrefilter).program(),
            brdf_program: registry.shader(ShaderKind::HdriBrdf).program(),
        }
    }

    #[test]
    fn capture_produces_all_four_products() {
        let (mut dev, registry, mut targets) = fixture();
        let res = capture_resources(&registry);
        let equirect = registry.default_texture().view();

        let mut pipeline = HdriPipeline::new();
        assert!(!pipeline.captured());
        pipeline
            .capture(&mut dev, &mut targets.capture, equirect, &res)
            .unwrap();

        assert!(pipeline.captured());
        assert_eq!(
            pipeline.environment().unwrap().size(),
            UVec2::splat(ENVIRONMENT_RESOLUTION)
        );
        assert_eq!(
            pipeline.irradiance().unwrap().size(),
            UVec2::splat(IRRADIANCE_RESOLUTION)
        );
        assert_eq!(
            pipeline.prefilter().unwrap().size(),
            UVec2::splat(PREFILTER_RESOLUTION)
        );
        assert_eq!(
            pipeline.brdf_lut().unwrap().size(),
            UVec2::splat(BRDF_LUT_RESOLUTION)
        );
    }

    #[test]
    fn capture_issues_six_draws_per_cubemap_stage() {
        let (mut dev, registry, mut targets) = fixture();
        let res = capture_resources(&registry);
        let equirect = registry.default_texture().view();

        let mut pipeline = HdriPipeline::new();
        pipeline
            .capture(&mut dev, &mut targets.capture, equirect, &res)
            .unwrap();

        // 6 equirect faces + 6 irradiance faces + 5 mips * 6 prefilter
        // faces + 1 BRDF quad.
        assert_eq!(dev.draws_to(targets.capture.fbo()), 6 + 6 + 30 + 1);
        let brdf_draw = dev.draw_calls.last().unwrap();
        assert_eq!(brdf_draw.index_count, 6);
        assert_eq!(brdf_draw.program, res.brdf_program);
    }

    #[test]
    fn recapture_releases_the_previous_products() {
        let (mut dev, registry, mut targets) = fixture();
        let res = capture_resources(&registry);
        let equirect = registry.default_texture().view();

        let mut pipeline = HdriPipeline::new();
        pipeline
            .capture(&mut dev, &mut targets.capture, equirect, &res)
            .unwrap();
        let first_env = pipeline.environment().unwrap().handle();

        pipeline
            .capture(&mut dev, &mut targets.capture, equirect, &res)
            .unwrap();
        assert!(dev.released_textures.contains(&first_env));
        assert_ne!(pipeline.environment().unwrap().handle(), first_env);
    }

    #[test]
    fn release_clears_the_captured_gate() {
        let (mut dev, registry, mut targets) = fixture();
        let res = capture_resources(&registry);
        let mut pipeline = HdriPipeline::new();
        pipeline
            .capture(&mut dev, &mut targets.capture, registry.default_texture().view(), &res)
            .unwrap();

        pipeline.release(&mut dev);
        assert!(!pipeline.captured());
        assert!(pipeline.irradiance().is_none());
    }
}
