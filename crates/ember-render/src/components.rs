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

//! Components the render systems read from the entity registry.
//!
//! The systems only read these; entity lifetime and all mutation belong to
//! the game code driving the world.

use crate::resources::mesh::MeshKey;
use ember_core::Color;
use glam::{Mat4, Quat, Vec3};

/// Position, orientation, and scale of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World-space position.
    pub position: Vec3,
    /// World-space orientation.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Transform {
    /// A transform at `position` with no rotation and unit scale.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// The model matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// The local forward axis (-Z) rotated into world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// A perspective camera. The aspect ratio is not stored here: the camera
/// system derives it from the current viewport so resizes cannot leave a
/// stale value behind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Near clip plane.
    pub z_near: f32,
    /// Far clip plane.
    pub z_far: f32,
    /// Color the scene target is cleared to.
    pub clear_color: Color,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_y: 60.0_f32.to_radians(),
            z_near: 0.1,
            z_far: 500.0,
            clear_color: Color::new(0.1, 0.1, 0.1, 1.0),
        }
    }
}

/// Renders a mesh from the resource registry with a named material.
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    /// Mesh to draw.
    pub mesh: MeshKey,
    /// Material the mesh is drawn with.
    pub material: String,
}

impl MeshRenderer {
    /// Creates a renderer for `mesh` using `material`.
    pub fn new(mesh: impl Into<MeshKey>, material: &str) -> Self {
        Self {
            mesh: mesh.into(),
            material: material.to_string(),
        }
    }
}

/// Renders a textured quad billboarded by the entity transform.
#[derive(Debug, Clone)]
pub struct SpriteRenderer {
    /// Material the quad is drawn with (usually sprite-shaded).
    pub material: String,
}

impl SpriteRenderer {
    /// Creates a sprite renderer using `material`.
    pub fn new(material: &str) -> Self {
        Self {
            material: material.to_string(),
        }
    }
}

/// An omnidirectional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// Light color.
    pub color: Color,
    /// Radiant intensity multiplier.
    pub intensity: f32,
    /// Influence distance.
    pub range: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
            range: 25.0,
        }
    }
}

/// A cone light pointing along the entity transform's forward axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    /// Light color.
    pub color: Color,
    /// Radiant intensity multiplier.
    pub intensity: f32,
    /// Influence distance.
    pub range: f32,
    /// Inner cone half-angle in radians (full intensity inside).
    pub cutoff: f32,
    /// Outer cone half-angle in radians (falls to zero at the edge).
    pub outer_cutoff: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
            range: 25.0,
            cutoff: 12.5_f32.to_radians(),
            outer_cutoff: 17.5_f32.to_radians(),
        }
    }
}

/// The single sun light, pointing along the entity transform's forward
/// axis. Drives the shadow pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Light color.
    pub color: Color,
    /// Radiant intensity multiplier.
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn transform_matrix_composes_srt() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            scale: Vec3::splat(2.0),
        };
        let m = t.matrix();
        let p = m.transform_point3(Vec3::X);
        // +X scaled by 2, rotated 90 degrees about Y onto -Z, then offset.
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn default_forward_is_negative_z() {
        let t = Transform::default();
        assert_relative_eq!(t.forward().z, -1.0, epsilon = 1e-6);
    }
}
