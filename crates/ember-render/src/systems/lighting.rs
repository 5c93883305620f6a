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

//! Lighting system: aggregates scene lights up to the engine maxima and
//! derives the sun's light-space matrix for the shadow pass.

use crate::components::{DirectionalLight, PointLight, SpotLight, Transform};
use crate::systems::{RenderSystem, SystemContext};
use ember_core::gfx::{ProgramHandle, RenderDevice};
use ember_core::Color;
use glam::{Mat4, Vec3};

/// Half extent of the sun's orthographic shadow volume.
const SHADOW_ORTHO_EXTENT: f32 = 20.0;
/// Distance the shadow camera sits back along the inverted sun direction.
const SHADOW_EYE_DISTANCE: f32 = 20.0;
const SHADOW_Z_NEAR: f32 = 1.0;
const SHADOW_Z_FAR: f32 = 60.0;

/// A point light resolved into world-space draw data.
#[derive(Debug, Clone, Copy)]
pub struct GpuPointLight {
    /// World position.
    pub position: Vec3,
    /// Light color.
    pub color: Color,
    /// Intensity multiplier.
    pub intensity: f32,
    /// Influence distance.
    pub range: f32,
}

/// A spot light resolved into world-space draw data. Cutoffs are stored as
/// cosines, the form the fragment shader compares against.
#[derive(Debug, Clone, Copy)]
pub struct GpuSpotLight {
    /// World position.
    pub position: Vec3,
    /// World-space cone direction.
    pub direction: Vec3,
    /// Light color.
    pub color: Color,
    /// Intensity multiplier.
    pub intensity: f32,
    /// Influence distance.
    pub range: f32,
    /// Cosine of the inner cone half-angle.
    pub cutoff_cos: f32,
    /// Cosine of the outer cone half-angle.
    pub outer_cutoff_cos: f32,
}

/// The sun light resolved into world-space draw data.
#[derive(Debug, Clone, Copy)]
pub struct GpuDirectionalLight {
    /// World-space direction the light travels in.
    pub direction: Vec3,
    /// Light color.
    pub color: Color,
    /// Intensity multiplier.
    pub intensity: f32,
}

/// Gathers active lights each frame. Point and spot lights beyond the
/// configured maxima are dropped with a warning; only the first
/// directional light is honored.
#[derive(Debug)]
pub struct LightingSystem {
    max_points: usize,
    max_spots: usize,
    points: Vec<GpuPointLight>,
    spots: Vec<GpuSpotLight>,
    directional: Option<GpuDirectionalLight>,
    ambient: Color,
    light_space: Mat4,
}

impl LightingSystem {
    /// Creates the system with the configured light maxima.
    pub fn new(max_points: usize, max_spots: usize) -> Self {
        Self {
            max_points,
            max_spots,
            points: Vec::with_capacity(max_points),
            spots: Vec::with_capacity(max_spots),
            directional: None,
            ambient: Color::new(0.03, 0.03, 0.03, 1.0),
            light_space: Mat4::IDENTITY,
        }
    }

    /// The aggregated point lights.
    #[inline]
    pub fn points(&self) -> &[GpuPointLight] {
        &self.points
    }

    /// The aggregated spot lights.
    #[inline]
    pub fn spots(&self) -> &[GpuSpotLight] {
        &self.spots
    }

    /// The sun light, when one exists.
    #[inline]
    pub fn directional(&self) -> Option<&GpuDirectionalLight> {
        self.directional.as_ref()
    }

    /// Scene ambient color.
    #[inline]
    pub fn ambient(&self) -> Color {
        self.ambient
    }

    /// Overrides the scene ambient color.
    pub fn set_ambient(&mut self, color: Color) {
        self.ambient = color;
    }

    /// Light-space matrix of the sun (identity while no sun exists).
    #[inline]
    pub fn light_space(&self) -> &Mat4 {
        &self.light_space
    }

    /// Pushes the per-light uniform arrays onto `program`. The counts and
    /// ambient color travel in the `LightData` block; the array contents
    /// are plain struct-array uniforms.
    pub fn push_uniforms(&self, device: &mut dyn RenderDevice, program: ProgramHandle) {
        for (i, light) in self.points.iter().enumerate() {
            device.update_uniform_vec3(
                program,
                &format!("point_lights[{i}].position"),
                light.position,
            );
            device.update_uniform_vec3(
                program,
                &format!("point_lights[{i}].color"),
                Vec3::new(light.color.r, light.color.g, light.color.b),
            );
            device.update_uniform_float(
                program,
                &format!("point_lights[{i}].intensity"),
                light.intensity,
            );
            device.update_uniform_float(
                program,
                &format!("point_lights[{i}].distance"),
                light.range,
            );
        }

        for (i, light) in self.spots.iter().enumerate() {
            device.update_uniform_vec3(
                program,
                &format!("spot_lights[{i}].position"),
                light.position,
            );
            device.update_uniform_vec3(
                program,
                &format!("spot_lights[{i}].direction"),
                light.direction,
            );
            device.update_uniform_vec3(
                program,
                &format!("spot_lights[{i}].color"),
                Vec3::new(light.color.r, light.color.g, light.color.b),
            );
            device.update_uniform_float(
                program,
                &format!("spot_lights[{i}].intensity"),
                light.intensity,
            );
            device.update_uniform_float(
                program,
                &format!("spot_lights[{i}].cutoff"),
                light.cutoff_cos,
            );
            device.update_uniform_float(
                program,
                &format!("spot_lights[{i}].outer_cutoff"),
                light.outer_cutoff_cos,
            );
            device.update_uniform_float(
                program,
                &format!("spot_lights[{i}].distance"),
                light.range,
            );
        }

        if let Some(sun) = &self.directional {
            device.update_uniform_vec3(program, "directional_light.direction", sun.direction);
            device.update_uniform_vec3(
                program,
                "directional_light.color",
                Vec3::new(sun.color.r, sun.color.g, sun.color.b),
            );
            device.update_uniform_float(program, "directional_light.intensity", sun.intensity);
        } else {
            device.update_uniform_float(program, "directional_light.intensity", 0.0);
        }
    }
}

impl RenderSystem for LightingSystem {
    fn update(&mut self, ctx: &SystemContext<'_>) {
        self.points.clear();
        self.spots.clear();
        self.directional = None;

        for (_, (transform, light)) in ctx.world.query::<(&Transform, &PointLight)>().iter() {
            if self.points.len() == self.max_points {
                log::warn!(
                    "Lighting: more than {} point lights active, dropping the rest",
                    self.max_points
                );
                break;
            }
            self.points.push(GpuPointLight {
                position: transform.position,
                color: light.color,
                intensity: light.intensity,
                range: light.range,
            });
        }

        for (_, (transform, light)) in ctx.world.query::<(&Transform, &SpotLight)>().iter() {
            if self.spots.len() == self.max_spots {
                log::warn!(
                    "Lighting: more than {} spot lights active, dropping the rest",
                    self.max_spots
                );
                break;
            }
            self.spots.push(GpuSpotLight {
                position: transform.position,
                direction: transform.forward(),
                color: light.color,
                intensity: light.intensity,
                range: light.range,
                cutoff_cos: light.cutoff.cos(),
                outer_cutoff_cos: light.outer_cutoff.cos(),
            });
        }

        for (_, (transform, light)) in ctx.world.query::<(&Transform, &DirectionalLight)>().iter()
        {
            if self.directional.is_some() {
                log::warn!("Lighting: multiple directional lights, keeping the first");
                break;
            }
            let direction = transform.forward();
            self.directional = Some(GpuDirectionalLight {
                direction,
                color: light.color,
                intensity: light.intensity,
            });

            let eye = -direction * SHADOW_EYE_DISTANCE;
            let up = if direction.abs().dot(Vec3::Y) > 0.99 {
                Vec3::X
            } else {
                Vec3::Y
            };
            let projection = Mat4::orthographic_rh_gl(
                -SHADOW_ORTHO_EXTENT,
                SHADOW_ORTHO_EXTENT,
                -SHADOW_ORTHO_EXTENT,
                SHADOW_ORTHO_EXTENT,
                SHADOW_Z_NEAR,
                SHADOW_Z_FAR,
            );
            self.light_space = projection * Mat4::look_at_rh(eye, Vec3::ZERO, up);
        }

        if self.directional.is_none() {
            self.light_space = Mat4::IDENTITY;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceRegistry;
    use ember_core::gfx::HeadlessDevice;
    use glam::Quat;

    fn fixture() -> (HeadlessDevice, ResourceRegistry, hecs::World) {
        let mut dev = HeadlessDevice::new();
        let registry = ResourceRegistry::initialize(&mut dev).unwrap();
        (dev, registry, hecs::World::new())
    }

    #[test]
    fn light_counts_cap_at_the_maxima() {
        let (_, registry, mut world) = fixture();
        for _ in 0..5 {
            world.spawn((Transform::default(), PointLight::default()));
        }
        let mut system = LightingSystem::new(3, 3);
        system.update(&SystemContext {
            world: &world,
            registry: &registry,
            delta: 0.016,
        });
        assert_eq!(system.points().len(), 3);
    }

    #[test]
    fn only_the_first_directional_light_is_kept() {
        let (_, registry, mut world) = fixture();
        world.spawn((Transform::default(), DirectionalLight::default()));
        world.spawn((
            Transform::default(),
            DirectionalLight {
                intensity: 99.0,
                ..DirectionalLight::default()
            },
        ));
        let mut system = LightingSystem::new(8, 8);
        system.update(&SystemContext {
            world: &world,
            registry: &registry,
            delta: 0.016,
        });
        assert!(system.directional().is_some());
    }

    #[test]
    fn sun_presence_produces_a_non_identity_light_space() {
        let (_, registry, mut world) = fixture();
        let mut system = LightingSystem::new(8, 8);
        system.update(&SystemContext {
            world: &world,
            registry: &registry,
            delta: 0.016,
        });
        assert_eq!(*system.light_space(), Mat4::IDENTITY);

        let tilt = Transform {
            rotation: Quat::from_rotation_x(-1.0),
            ..Transform::default()
        };
        world.spawn((tilt, DirectionalLight::default()));
        system.update(&SystemContext {
            world: &world,
            registry: &registry,
            delta: 0.016,
        });
        assert_ne!(*system.light_space(), Mat4::IDENTITY);
    }

    #[test]
    fn spot_cutoffs_are_uploaded_as_cosines() {
        let (mut dev, registry, mut world) = fixture();
        world.spawn((Transform::default(), SpotLight::default()));
        let mut system = LightingSystem::new(8, 8);
        system.update(&SystemContext {
            world: &world,
            registry: &registry,
            delta: 0.016,
        });
        assert!((system.spots()[0].cutoff_cos - 12.5_f32.to_radians().cos()).abs() < 1e-6);

        system.push_uniforms(&mut dev, ProgramHandle(7));
        assert!(dev
            .uniform_writes
            .iter()
            .any(|(_, name)| name == "spot_lights[0].cutoff"));
    }
}
