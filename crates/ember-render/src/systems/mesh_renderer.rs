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

//! Mesh renderer system: buckets renderable entities into opaque and
//! transparent draw lists.

use crate::components::{MeshRenderer, Transform};
use crate::resources::mesh::MeshKey;
use crate::systems::{RenderSystem, SystemContext};
use glam::Mat4;

/// One entity's draw submission for the current frame.
#[derive(Debug, Clone)]
pub struct DrawItem {
    /// Mesh to draw.
    pub mesh: MeshKey,
    /// Material name resolved at draw time.
    pub material: String,
    /// Model matrix.
    pub model: Mat4,
}

/// Gathers every `(Transform, MeshRenderer)` entity and splits the result
/// by the material's transparency flag. Lists are rebuilt from scratch each
/// update; a stale entry can therefore never outlive its entity.
#[derive(Debug, Default)]
pub struct MeshRendererSystem {
    opaque: Vec<DrawItem>,
    transparent: Vec<DrawItem>,
}

impl MeshRendererSystem {
    /// Opaque draw list, in visitation order.
    #[inline]
    pub fn opaque(&self) -> &[DrawItem] {
        &self.opaque
    }

    /// Transparent draw list, drawn after every opaque item.
    #[inline]
    pub fn transparent(&self) -> &[DrawItem] {
        &self.transparent
    }

    /// Both buckets, opaque first.
    pub fn all(&self) -> impl Iterator<Item = &DrawItem> {
        self.opaque.iter().chain(self.transparent.iter())
    }
}

impl RenderSystem for MeshRendererSystem {
    fn update(&mut self, ctx: &SystemContext<'_>) {
        self.opaque.clear();
        self.transparent.clear();

        for (_, (transform, renderer)) in ctx.world.query::<(&Transform, &MeshRenderer)>().iter() {
            let item = DrawItem {
                mesh: renderer.mesh.clone(),
                material: renderer.material.clone(),
                model: transform.matrix(),
            };
            if ctx.registry.material(&renderer.material).is_transparent() {
                self.transparent.push(item);
            } else {
                self.opaque.push(item);
            }
        }
    }
}
