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

//! Sprite renderer system: gathers textured quads drawn after the scene
//! geometry.

use crate::components::{SpriteRenderer, Transform};
use crate::systems::{RenderSystem, SystemContext};
use glam::Mat4;

/// One sprite quad for the current frame.
#[derive(Debug, Clone)]
pub struct SpriteItem {
    /// Material the quad is drawn with.
    pub material: String,
    /// Model matrix.
    pub model: Mat4,
}

/// Gathers every `(Transform, SpriteRenderer)` entity. Sprites always draw
/// on the engine quad primitive, after the transparent bucket.
#[derive(Debug, Default)]
pub struct SpriteRendererSystem {
    sprites: Vec<SpriteItem>,
}

impl SpriteRendererSystem {
    /// The gathered sprite list, in visitation order.
    #[inline]
    pub fn sprites(&self) -> &[SpriteItem] {
        &self.sprites
    }
}

impl RenderSystem for SpriteRendererSystem {
    fn update(&mut self, ctx: &SystemContext<'_>) {
        self.sprites.clear();
        for (_, (transform, sprite)) in ctx.world.query::<(&Transform, &SpriteRenderer)>().iter() {
            self.sprites.push(SpriteItem {
                material: sprite.material.clone(),
                model: transform.matrix(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceRegistry;
    use crate::shaders::ShaderKind;
    use ember_core::gfx::HeadlessDevice;
    use glam::Vec3;

    #[test]
    fn sprites_are_rebuilt_each_update() {
        let mut dev = HeadlessDevice::new();
        let mut registry = ResourceRegistry::initialize(&mut dev).unwrap();
        registry.create_material("icon", ShaderKind::Sprite);

        let mut world = hecs::World::new();
        let entity = world.spawn((
            Transform::at(Vec3::X),
            SpriteRenderer::new("icon"),
        ));

        let mut system = SpriteRendererSystem::default();
        system.update(&SystemContext {
            world: &world,
            registry: &registry,
            delta: 0.016,
        });
        assert_eq!(system.sprites().len(), 1);
        assert_eq!(system.sprites()[0].material, "icon");

        world.despawn(entity).unwrap();
        system.update(&SystemContext {
            world: &world,
            registry: &registry,
            delta: 0.016,
        });
        assert!(system.sprites().is_empty());
    }
}
