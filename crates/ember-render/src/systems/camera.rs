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

//! Camera system: projection/view matrices and the active clear color.

use crate::components::{Camera, Transform};
use crate::systems::{RenderSystem, SystemContext};
use ember_core::Color;
use glam::{Mat4, UVec2, Vec3};

/// Clear color used while no camera entity exists.
const NO_CAMERA_CLEAR: Color = Color::new(0.02, 0.02, 0.02, 1.0);

/// Computes the current camera's matrices from the first entity carrying
/// both [`Camera`] and [`Transform`]. The aspect ratio is derived from the
/// viewport pushed in by the engine; a stale aspect after a resize would
/// visibly distort the projection.
#[derive(Debug)]
pub struct CameraSystem {
    viewport: UVec2,
    projection: Mat4,
    view: Mat4,
    position: Vec3,
    clear_color: Color,
    z_near: f32,
    z_far: f32,
    has_camera: bool,
}

impl CameraSystem {
    /// Creates the system for an initial viewport.
    pub fn new(viewport: UVec2) -> Self {
        Self {
            viewport,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            position: Vec3::ZERO,
            clear_color: NO_CAMERA_CLEAR,
            z_near: 0.1,
            z_far: 500.0,
            has_camera: false,
        }
    }

    /// Propagates a viewport resize; the projection is rebuilt on the next
    /// update.
    pub fn set_viewport(&mut self, viewport: UVec2) {
        self.viewport = viewport;
    }

    /// Width over height of the current viewport.
    pub fn aspect(&self) -> f32 {
        if self.viewport.y == 0 {
            1.0
        } else {
            self.viewport.x as f32 / self.viewport.y as f32
        }
    }

    /// Latest projection matrix.
    #[inline]
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Latest view matrix.
    #[inline]
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// World-space camera position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Clear color of the current camera (or the no-camera fallback).
    #[inline]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Near clip plane of the current camera.
    #[inline]
    pub fn z_near(&self) -> f32 {
        self.z_near
    }

    /// Far clip plane of the current camera.
    #[inline]
    pub fn z_far(&self) -> f32 {
        self.z_far
    }

    /// Whether a camera entity was found on the last update.
    #[inline]
    pub fn has_camera(&self) -> bool {
        self.has_camera
    }
}

impl RenderSystem for CameraSystem {
    fn update(&mut self, ctx: &SystemContext<'_>) {
        let found = ctx
            .world
            .query::<(&Transform, &Camera)>()
            .iter()
            .next()
            .map(|(_, (transform, camera))| (*transform, *camera));

        match found {
            Some((transform, camera)) => {
                self.projection =
                    Mat4::perspective_rh_gl(camera.fov_y, self.aspect(), camera.z_near, camera.z_far);
                self.view = transform.matrix().inverse();
                self.position = transform.position;
                self.clear_color = camera.clear_color;
                self.z_near = camera.z_near;
                self.z_far = camera.z_far;
                self.has_camera = true;
            }
            None => {
                self.projection = Mat4::IDENTITY;
                self.view = Mat4::IDENTITY;
                self.position = Vec3::ZERO;
                self.clear_color = NO_CAMERA_CLEAR;
                self.has_camera = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceRegistry;
    use approx::assert_relative_eq;
    use ember_core::gfx::HeadlessDevice;

    fn ctx_fixture() -> (hecs::World, ResourceRegistry) {
        let mut dev = HeadlessDevice::new();
        (hecs::World::new(), ResourceRegistry::initialize(&mut dev).unwrap())
    }

    #[test]
    fn no_camera_falls_back_to_identity_matrices() {
        let (world, registry) = ctx_fixture();
        let mut system = CameraSystem::new(UVec2::new(800, 600));
        system.update(&SystemContext {
            world: &world,
            registry: &registry,
            delta: 0.016,
        });
        assert!(!system.has_camera());
        assert_eq!(*system.projection(), Mat4::IDENTITY);
    }

    #[test]
    fn viewport_resize_changes_the_projection_aspect() {
        let (mut world, registry) = ctx_fixture();
        world.spawn((Transform::default(), Camera::default()));
        let mut system = CameraSystem::new(UVec2::new(800, 600));

        system.update(&SystemContext {
            world: &world,
            registry: &registry,
            delta: 0.016,
        });
        let wide_x = system.projection().col(0).x;

        system.set_viewport(UVec2::new(1600, 600));
        system.update(&SystemContext {
            world: &world,
            registry: &registry,
            delta: 0.016,
        });
        // Doubling the width halves the x focal scale.
        assert_relative_eq!(system.projection().col(0).x, wide_x / 2.0, epsilon = 1e-5);
        assert_relative_eq!(system.aspect(), 1600.0 / 600.0, epsilon = 1e-6);
    }

    #[test]
    fn view_matrix_inverts_the_camera_transform() {
        let (mut world, registry) = ctx_fixture();
        let position = Vec3::new(0.0, 2.0, 10.0);
        world.spawn((Transform::at(position), Camera::default()));
        let mut system = CameraSystem::new(UVec2::new(800, 600));
        system.update(&SystemContext {
            world: &world,
            registry: &registry,
            delta: 0.016,
        });

        let origin_in_view = system.view().transform_point3(position);
        assert_relative_eq!(origin_in_view.length(), 0.0, epsilon = 1e-5);
        assert_eq!(system.position(), position);
    }
}
