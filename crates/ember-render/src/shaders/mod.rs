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

//! The built-in shader set.
//!
//! Identified by the small [`ShaderKind`] enum rather than arbitrary
//! strings; sources are embedded so startup needs no asset directory.

mod glsl;

use ember_core::gfx::ShaderSource;
use std::borrow::Cow;

/// Identity of an engine-built-in shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Flat shading with an optional diffuse texture.
    Unlit,
    /// Physically-based metallic/roughness shading with IBL and shadows.
    PbrLit,
    /// Uniform-color sky.
    SkyboxSingleColor,
    /// Vertical two-color gradient sky.
    SkyboxGradient,
    /// Procedural gradient sky with a sun highlight.
    SkyboxProcedural,
    /// Sky sampled from a cubemap.
    SkyboxCubemap,
    /// Sky sampled from a captured HDRI environment.
    SkyboxHdri,
    /// Tone-mapped final composite onto the back buffer.
    ScreenQuadFinal,
    /// Separable gaussian blur for the bloom ping-pong pass.
    ScreenQuadBlur,
    /// Depth-only pass from the light's point of view.
    ShadowDepth,
    /// Equirectangular image to cubemap face.
    HdriEquirect,
    /// Cosine-weighted diffuse irradiance convolution.
    HdriIrradiance,
    /// GGX specular prefilter across the mip chain.
    HdriPrefilter,
    /// BRDF integration lookup table.
    HdriBrdf,
    /// Textured 2D sprite quad.
    Sprite,
}

impl ShaderKind {
    /// Every built-in shader, in construction order.
    pub const ALL: [ShaderKind; 15] = [
        ShaderKind::Unlit,
        ShaderKind::PbrLit,
        ShaderKind::SkyboxSingleColor,
        ShaderKind::SkyboxGradient,
        ShaderKind::SkyboxProcedural,
        ShaderKind::SkyboxCubemap,
        ShaderKind::SkyboxHdri,
        ShaderKind::ScreenQuadFinal,
        ShaderKind::ScreenQuadBlur,
        ShaderKind::ShadowDepth,
        ShaderKind::HdriEquirect,
        ShaderKind::HdriIrradiance,
        ShaderKind::HdriPrefilter,
        ShaderKind::HdriBrdf,
        ShaderKind::Sprite,
    ];

    /// Canonical asset path of this shader; used as its diagnostic label.
    pub fn path(self) -> &'static str {
        match self {
            ShaderKind::Unlit => "shaders/unlit/unlit.glsl",
            ShaderKind::PbrLit => "shaders/pbr/pbr_lit.glsl",
            ShaderKind::SkyboxSingleColor => "shaders/skybox/skybox_color.glsl",
            ShaderKind::SkyboxGradient => "shaders/skybox/skybox_gradient.glsl",
            ShaderKind::SkyboxProcedural => "shaders/skybox/skybox_procedural.glsl",
            ShaderKind::SkyboxCubemap => "shaders/skybox/skybox_cubemap.glsl",
            ShaderKind::SkyboxHdri => "shaders/skybox/skybox_hdri.glsl",
            ShaderKind::ScreenQuadFinal => "shaders/screen_quads/sq_final.glsl",
            ShaderKind::ScreenQuadBlur => "shaders/screen_quads/sq_blur.glsl",
            ShaderKind::ShadowDepth => "shaders/screen_quads/sq_shadow_map.glsl",
            ShaderKind::HdriEquirect => "shaders/hdri/hdri_equirectangular.glsl",
            ShaderKind::HdriIrradiance => "shaders/hdri/hdri_irradiance.glsl",
            ShaderKind::HdriPrefilter => "shaders/hdri/hdri_prefilter.glsl",
            ShaderKind::HdriBrdf => "shaders/hdri/hdri_brdf.glsl",
            ShaderKind::Sprite => "shaders/2d/sprite.glsl",
        }
    }

    /// Source text for the device to compile.
    pub fn source(self) -> ShaderSource {
        let (vertex, fragment) = match self {
            ShaderKind::Unlit => (glsl::MESH_VS, glsl::UNLIT_FS),
            ShaderKind::PbrLit => (glsl::MESH_VS, glsl::PBR_LIT_FS),
            ShaderKind::SkyboxSingleColor => (glsl::SKYBOX_VS, glsl::SKYBOX_SINGLE_COLOR_FS),
            ShaderKind::SkyboxGradient => (glsl::SKYBOX_VS, glsl::SKYBOX_GRADIENT_FS),
            ShaderKind::SkyboxProcedural => (glsl::SKYBOX_VS, glsl::SKYBOX_PROCEDURAL_FS),
            ShaderKind::SkyboxCubemap => (glsl::SKYBOX_VS, glsl::SKYBOX_CUBEMAP_FS),
            ShaderKind::SkyboxHdri => (glsl::SKYBOX_VS, glsl::SKYBOX_HDRI_FS),
            ShaderKind::ScreenQuadFinal => (glsl::SCREEN_QUAD_VS, glsl::SCREEN_QUAD_FINAL_FS),
            ShaderKind::ScreenQuadBlur => (glsl::SCREEN_QUAD_VS, glsl::SCREEN_QUAD_BLUR_FS),
            ShaderKind::ShadowDepth => (glsl::SHADOW_DEPTH_VS, glsl::SHADOW_DEPTH_FS),
            ShaderKind::HdriEquirect => (glsl::HDRI_CUBE_VS, glsl::HDRI_EQUIRECT_FS),
            ShaderKind::HdriIrradiance => (glsl::HDRI_CUBE_VS, glsl::HDRI_IRRADIANCE_FS),
            ShaderKind::HdriPrefilter => (glsl::HDRI_CUBE_VS, glsl::HDRI_PREFILTER_FS),
            ShaderKind::HdriBrdf => (glsl::SCREEN_QUAD_VS, glsl::HDRI_BRDF_FS),
            ShaderKind::Sprite => (glsl::MESH_VS, glsl::SPRITE_FS),
        };
        ShaderSource {
            label: Cow::Borrowed(self.path()),
            vertex: Cow::Borrowed(vertex),
            fragment: Cow::Borrowed(fragment),
            geometry: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_kinds_have_distinct_paths() {
        let mut paths: Vec<_> = ShaderKind::ALL.iter().map(|k| k.path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), ShaderKind::ALL.len());
    }

    #[test]
    fn sources_carry_both_stages() {
        for kind in ShaderKind::ALL {
            let src = kind.source();
            assert!(src.vertex.contains("void main"), "{:?} vertex stage", kind);
            assert!(src.fragment.contains("void main"), "{:?} fragment stage", kind);
        }
    }
}
