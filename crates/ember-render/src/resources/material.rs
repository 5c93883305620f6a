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

//! Material model: typed property bags bound to a shader identity.
//!
//! Switching a material's shader resets every property map to the new
//! shader's schema — no key from a previous shader survives. Texture slots
//! reference textures non-owningly; the registry or frame-target set keeps
//! the referenced textures alive.

use crate::resources::texture::TextureRef;
use crate::shaders::ShaderKind;
use ember_core::gfx::{ProgramHandle, TextureBindMode};
use ember_core::Color;
use glam::{Mat4, Vec2, Vec3, Vec4};
use std::collections::HashMap;

/// Uniform names shared between material schemas and the GLSL sources.
pub mod keys {
    /// Flat object tint (unlit, sprite).
    pub const OBJECT_COLOR: &str = "object_color";
    /// Opaque/transparent switch, see [`Material::is_transparent`](super::Material::is_transparent).
    pub const SURFACE_TYPE: &str = "surface_type";
    /// Diffuse texture slot (unlit, sprite).
    pub const DIFFUSE_MAP: &str = "diffuse_map";
    /// Albedo texture slot (PBR).
    pub const ALBEDO_MAP: &str = "albedo_map";
    /// Normal map slot (PBR).
    pub const NORMAL_MAP: &str = "normal_map";
    /// Roughness map slot (PBR).
    pub const ROUGHNESS_MAP: &str = "roughness_map";
    /// Metallic map slot (PBR).
    pub const METALLIC_MAP: &str = "metallic_map";
    /// Ambient-occlusion map slot (PBR).
    pub const AO_MAP: &str = "ao_map";
    /// BRDF integration LUT slot (PBR).
    pub const BRDF_LUT_MAP: &str = "brdf_lut_map";
    /// Shadow map slot (unlit, PBR).
    pub const SHADOW_MAP: &str = "shadow_map";
    /// Irradiance cubemap slot (PBR).
    pub const IRRADIANCE_MAP: &str = "irradiance_map";
    /// Prefiltered specular cubemap slot (PBR).
    pub const PREFILTER_MAP: &str = "prefilter_map";
    /// Environment cubemap slot (skyboxes, HDRI convolutions).
    pub const ENVIRONMENT_MAP: &str = "environment_map";
    /// Equirectangular source image slot (HDRI capture).
    pub const EQUIRECT_MAP: &str = "equirect_map";
    /// Scene color input slot (post-process passes).
    pub const SCREEN_MAP: &str = "screen_map";
    /// Blurred bloom input slot (composite pass).
    pub const BLOOM_MAP: &str = "bloom_map";
    /// Metallic multiplier (PBR).
    pub const METALLIC_MULTIPLIER: &str = "metallic_multiplier";
    /// Roughness multiplier (PBR; reused as per-mip roughness by the
    /// prefilter stage).
    pub const ROUGHNESS_MULTIPLIER: &str = "roughness_multiplier";
    /// PBR workflow selector.
    pub const WORKFLOW: &str = "workflow";
    /// UV tiling factor (PBR).
    pub const TILING: &str = "tiling";
    /// Gradient sky start color.
    pub const START_COLOR: &str = "start_color";
    /// Gradient sky end color.
    pub const END_COLOR: &str = "end_color";
    /// Procedural sky sun direction.
    pub const SUN_DIRECTION: &str = "sun_direction";
    /// Single-color sky color.
    pub const COLOR: &str = "color";
    /// Composite exposure.
    pub const EXPOSURE: &str = "exposure";
    /// Composite bloom toggle.
    pub const BLOOM_ENABLED: &str = "bloom_enabled";
    /// Composite FXAA toggle.
    pub const FXAA_ENABLED: &str = "fxaa_enabled";
    /// FXAA reduce-min constant.
    pub const FXAA_REDUCE_MIN: &str = "fxaa_reduce_min";
    /// FXAA reduce-mul constant.
    pub const FXAA_REDUCE_MUL: &str = "fxaa_reduce_mul";
    /// FXAA span-max constant.
    pub const FXAA_SPAN_MAX: &str = "fxaa_span_max";
    /// Inverse resolution of the composite input.
    pub const INVERSE_SCREEN_SIZE: &str = "inverse_screen_size";
    /// Blur direction toggle.
    pub const IS_HORIZONTAL: &str = "is_horizontal";
    /// Capture view matrix (HDRI stages).
    pub const VIEW_MATRIX: &str = "view";
    /// Capture projection matrix (HDRI stages).
    pub const PROJECTION_MATRIX: &str = "projection";
    /// Source environment resolution (prefilter stage).
    pub const ENVIRONMENT_RESOLUTION: &str = "environment_resolution";
    /// Model matrix pushed per draw by the renderer systems.
    pub const MODEL_MATRIX: &str = "model";
}

/// Suffix of the companion int uniform written next to every sampler slot.
pub const IS_ACTIVE_SUFFIX: &str = "_is_active";

/// A bound-texture slot: unit index, non-owning texture reference, bind
/// mode, and an active flag. An inactive (or empty-texture) slot still gets
/// a type-appropriate default bound so the sampler is never dangling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureSlot {
    /// Texture unit the slot binds to.
    pub unit: u32,
    /// The referenced texture, if one was assigned.
    pub texture: Option<TextureRef>,
    /// Bind target the shader expects for this slot.
    pub bind_mode: TextureBindMode,
    /// Whether the slot is logically set.
    pub active: bool,
}

impl TextureSlot {
    fn at(unit: u32) -> Self {
        Self {
            unit,
            texture: None,
            bind_mode: TextureBindMode::Texture2D,
            active: false,
        }
    }

    fn cube_at(unit: u32) -> Self {
        Self {
            unit,
            texture: None,
            bind_mode: TextureBindMode::Cubemap,
            active: false,
        }
    }
}

/// A property bag associated with a shader identity.
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    shader_kind: ShaderKind,
    program: ProgramHandle,

    pub(crate) floats: HashMap<String, f32>,
    pub(crate) ints: HashMap<String, i32>,
    pub(crate) bools: HashMap<String, bool>,
    pub(crate) colors: HashMap<String, Color>,
    pub(crate) vec2s: HashMap<String, Vec2>,
    pub(crate) vec3s: HashMap<String, Vec3>,
    pub(crate) vec4s: HashMap<String, Vec4>,
    pub(crate) matrices: HashMap<String, Mat4>,
    pub(crate) samplers: HashMap<String, TextureSlot>,

    /// Whether the lighting system pushes per-light uniforms for this
    /// material.
    pub receives_lighting: bool,
    /// Whether the shadow pass distributes its depth map to this material.
    pub is_shadow_mapped: bool,
    /// Whether this material consumes captured HDRI environment maps.
    pub uses_hdri: bool,
}

impl Material {
    /// Creates a material with empty maps. The registry assigns the real
    /// schema through `set_material_shader`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            shader_kind: ShaderKind::Unlit,
            program: ProgramHandle::NULL,
            floats: HashMap::new(),
            ints: HashMap::new(),
            bools: HashMap::new(),
            colors: HashMap::new(),
            vec2s: HashMap::new(),
            vec3s: HashMap::new(),
            vec4s: HashMap::new(),
            matrices: HashMap::new(),
            samplers: HashMap::new(),
            receives_lighting: false,
            is_shadow_mapped: false,
            uses_hdri: false,
        }
    }

    /// Registry key / debug name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shader identity this material is bound to.
    #[inline]
    pub fn shader_kind(&self) -> ShaderKind {
        self.shader_kind
    }

    /// Resolved program of the bound shader.
    #[inline]
    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Whether the mesh renderer buckets this material as transparent.
    pub fn is_transparent(&self) -> bool {
        self.ints.get(keys::SURFACE_TYPE).copied().unwrap_or(0) != 0
    }

    /// Clears every property map and repopulates it from the fixed schema
    /// of `kind`. No stale keys from a previously assigned shader persist.
    pub(crate) fn apply_schema(&mut self, kind: ShaderKind, program: ProgramHandle) {
        self.floats.clear();
        self.ints.clear();
        self.bools.clear();
        self.colors.clear();
        self.vec2s.clear();
        self.vec3s.clear();
        self.vec4s.clear();
        self.matrices.clear();
        self.samplers.clear();
        self.receives_lighting = false;
        self.is_shadow_mapped = false;
        self.uses_hdri = false;
        self.shader_kind = kind;
        self.program = program;

        match kind {
            ShaderKind::Unlit => {
                self.colors.insert(keys::OBJECT_COLOR.into(), Color::WHITE);
                self.ints.insert(keys::SURFACE_TYPE.into(), 0);
                self.samplers.insert(keys::DIFFUSE_MAP.into(), TextureSlot::at(0));
                self.samplers.insert(keys::SHADOW_MAP.into(), TextureSlot::at(1));
                self.is_shadow_mapped = true;
            }
            ShaderKind::PbrLit => {
                self.samplers.insert(keys::ALBEDO_MAP.into(), TextureSlot::at(0));
                self.samplers.insert(keys::NORMAL_MAP.into(), TextureSlot::at(1));
                self.samplers.insert(keys::ROUGHNESS_MAP.into(), TextureSlot::at(2));
                self.samplers.insert(keys::METALLIC_MAP.into(), TextureSlot::at(3));
                self.samplers.insert(keys::AO_MAP.into(), TextureSlot::at(4));
                self.samplers.insert(keys::BRDF_LUT_MAP.into(), TextureSlot::at(5));
                self.samplers.insert(keys::SHADOW_MAP.into(), TextureSlot::at(6));
                self.samplers
                    .insert(keys::IRRADIANCE_MAP.into(), TextureSlot::cube_at(7));
                self.samplers
                    .insert(keys::PREFILTER_MAP.into(), TextureSlot::cube_at(8));
                self.floats.insert(keys::METALLIC_MULTIPLIER.into(), 1.0);
                self.floats.insert(keys::ROUGHNESS_MULTIPLIER.into(), 1.0);
                self.ints.insert(keys::WORKFLOW.into(), 0);
                self.ints.insert(keys::SURFACE_TYPE.into(), 0);
                self.vec2s.insert(keys::TILING.into(), Vec2::ONE);
                self.receives_lighting = true;
                self.is_shadow_mapped = true;
                self.uses_hdri = true;
            }
            ShaderKind::SkyboxSingleColor => {
                self.colors.insert(keys::COLOR.into(), Color::GRAY);
            }
            ShaderKind::SkyboxGradient => {
                self.colors.insert(keys::START_COLOR.into(), Color::BLACK);
                self.colors.insert(keys::END_COLOR.into(), Color::WHITE);
            }
            ShaderKind::SkyboxProcedural => {
                self.colors.insert(keys::START_COLOR.into(), Color::BLACK);
                self.colors.insert(keys::END_COLOR.into(), Color::WHITE);
                self.vec3s
                    .insert(keys::SUN_DIRECTION.into(), Vec3::new(0.0, -1.0, 0.0));
            }
            ShaderKind::SkyboxCubemap | ShaderKind::SkyboxHdri => {
                self.samplers
                    .insert(keys::ENVIRONMENT_MAP.into(), TextureSlot::cube_at(0));
            }
            ShaderKind::ScreenQuadFinal => {
                self.samplers.insert(keys::SCREEN_MAP.into(), TextureSlot::at(0));
                self.samplers.insert(keys::BLOOM_MAP.into(), TextureSlot::at(1));
                self.floats.insert(keys::EXPOSURE.into(), 1.0);
                self.floats.insert(keys::FXAA_REDUCE_MIN.into(), 1.0 / 128.0);
                self.floats.insert(keys::FXAA_REDUCE_MUL.into(), 1.0 / 8.0);
                self.floats.insert(keys::FXAA_SPAN_MAX.into(), 8.0);
                self.bools.insert(keys::BLOOM_ENABLED.into(), false);
                self.bools.insert(keys::FXAA_ENABLED.into(), false);
                self.vec3s.insert(keys::INVERSE_SCREEN_SIZE.into(), Vec3::ZERO);
            }
            ShaderKind::ScreenQuadBlur => {
                self.samplers.insert(keys::SCREEN_MAP.into(), TextureSlot::at(0));
                self.bools.insert(keys::IS_HORIZONTAL.into(), false);
            }
            ShaderKind::ShadowDepth => {}
            ShaderKind::HdriEquirect => {
                self.samplers.insert(keys::EQUIRECT_MAP.into(), TextureSlot::at(0));
                self.matrices.insert(keys::VIEW_MATRIX.into(), Mat4::IDENTITY);
                self.matrices
                    .insert(keys::PROJECTION_MATRIX.into(), Mat4::IDENTITY);
            }
            ShaderKind::HdriIrradiance | ShaderKind::HdriPrefilter | ShaderKind::HdriBrdf => {}
            ShaderKind::Sprite => {
                self.colors.insert(keys::OBJECT_COLOR.into(), Color::WHITE);
                self.samplers.insert(keys::DIFFUSE_MAP.into(), TextureSlot::at(0));
            }
        }
    }

    /// Sets a float property.
    pub fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_string(), value);
    }

    /// Sets an int property.
    pub fn set_int(&mut self, name: &str, value: i32) {
        self.ints.insert(name.to_string(), value);
    }

    /// Sets a bool property.
    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.bools.insert(name.to_string(), value);
    }

    /// Sets a color property.
    pub fn set_color(&mut self, name: &str, value: Color) {
        self.colors.insert(name.to_string(), value);
    }

    /// Sets a vec2 property.
    pub fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.vec2s.insert(name.to_string(), value);
    }

    /// Sets a vec3 property.
    pub fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.vec3s.insert(name.to_string(), value);
    }

    /// Sets a vec4 property.
    pub fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.vec4s.insert(name.to_string(), value);
    }

    /// Sets a matrix property.
    pub fn set_matrix(&mut self, name: &str, value: Mat4) {
        self.matrices.insert(name.to_string(), value);
    }

    /// Binds `texture` into the named slot and marks it active. Slots are
    /// fixed by the shader schema; assigning to an undeclared slot warns
    /// and is ignored.
    pub fn set_texture(&mut self, name: &str, texture: TextureRef, bind_mode: TextureBindMode) {
        match self.samplers.get_mut(name) {
            Some(slot) => {
                slot.texture = Some(texture);
                slot.bind_mode = bind_mode;
                slot.active = true;
            }
            None => {
                log::warn!(
                    "Material '{}': shader '{:?}' declares no texture slot '{}'",
                    self.name,
                    self.shader_kind,
                    name
                );
            }
        }
    }

    /// Clears the named slot back to inactive.
    pub fn remove_texture(&mut self, name: &str) {
        match self.samplers.get_mut(name) {
            Some(slot) => {
                slot.texture = None;
                slot.active = false;
            }
            None => {
                log::warn!(
                    "Material '{}': no texture slot '{}' to remove",
                    self.name,
                    name
                );
            }
        }
    }

    /// The named texture slot, if the schema declares it.
    pub fn texture_slot(&self, name: &str) -> Option<&TextureSlot> {
        self.samplers.get(name)
    }

    /// A float property, if present.
    pub fn float(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }

    /// A bool property, if present.
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.bools.get(name).copied()
    }

    /// A color property, if present.
    pub fn color(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    /// Iterates the declared sampler slot names.
    pub fn sampler_names(&self) -> impl Iterator<Item = &str> {
        self.samplers.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pbr_schema_seeds_fixed_slots_and_multipliers() {
        let mut mat = Material::new("test");
        mat.apply_schema(ShaderKind::PbrLit, ProgramHandle(1));

        assert_eq!(mat.texture_slot(keys::ALBEDO_MAP).unwrap().unit, 0);
        assert_eq!(mat.texture_slot(keys::SHADOW_MAP).unwrap().unit, 6);
        let irradiance = mat.texture_slot(keys::IRRADIANCE_MAP).unwrap();
        assert_eq!(irradiance.unit, 7);
        assert_eq!(irradiance.bind_mode, TextureBindMode::Cubemap);
        assert_eq!(mat.float(keys::METALLIC_MULTIPLIER), Some(1.0));
        assert_eq!(mat.float(keys::ROUGHNESS_MULTIPLIER), Some(1.0));
        assert!(mat.receives_lighting);
        assert!(mat.is_shadow_mapped);
        assert!(mat.uses_hdri);
    }

    #[test]
    fn shader_switch_drops_all_previous_keys() {
        let mut mat = Material::new("test");
        mat.apply_schema(ShaderKind::PbrLit, ProgramHandle(1));
        mat.set_float("custom_value", 3.0);

        mat.apply_schema(ShaderKind::SkyboxGradient, ProgramHandle(2));
        assert!(mat.float(keys::METALLIC_MULTIPLIER).is_none());
        assert!(mat.float("custom_value").is_none());
        assert!(mat.texture_slot(keys::ALBEDO_MAP).is_none());
        assert_eq!(mat.color(keys::START_COLOR), Some(Color::BLACK));
        assert_eq!(mat.color(keys::END_COLOR), Some(Color::WHITE));
        assert!(!mat.is_shadow_mapped);
        assert!(!mat.uses_hdri);
    }

    #[test]
    fn set_texture_on_undeclared_slot_is_ignored() {
        let mut mat = Material::new("test");
        mat.apply_schema(ShaderKind::SkyboxSingleColor, ProgramHandle(1));
        let fake = TextureRef {
            texture: ember_core::gfx::TextureHandle(5),
            sampler: ember_core::gfx::SamplerHandle(6),
            bind_mode: TextureBindMode::Texture2D,
            is_empty: false,
        };
        mat.set_texture(keys::ALBEDO_MAP, fake, TextureBindMode::Texture2D);
        assert!(mat.texture_slot(keys::ALBEDO_MAP).is_none());
    }

    #[test]
    fn transparency_follows_the_surface_type_int() {
        let mut mat = Material::new("test");
        mat.apply_schema(ShaderKind::PbrLit, ProgramHandle(1));
        assert!(!mat.is_transparent());
        mat.set_int(keys::SURFACE_TYPE, 1);
        assert!(mat.is_transparent());
    }
}
