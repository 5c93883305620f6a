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

//! Per-frame visitors over the entity registry.
//!
//! The systems form a closed set behind the uniform [`RenderSystem`]
//! capability; [`RenderPipeline::update`] spells their execution order out
//! explicitly instead of deriving it from registration order. The pipeline
//! runs once per composition stage that needs fresh scene state (shadow
//! pass and scene pass both trigger it).

pub mod camera;
pub mod lighting;
pub mod mesh_renderer;
pub mod sprite_renderer;

pub use camera::CameraSystem;
pub use lighting::LightingSystem;
pub use mesh_renderer::{DrawItem, MeshRendererSystem};
pub use sprite_renderer::{SpriteItem, SpriteRendererSystem};

use crate::resources::ResourceRegistry;
use crate::settings::RenderSettings;
use glam::UVec2;

/// Read-only state handed to every system each update.
pub struct SystemContext<'a> {
    /// The entity registry being visited.
    pub world: &'a hecs::World,
    /// Resource tables, for material lookups during bucketing.
    pub registry: &'a ResourceRegistry,
    /// Seconds since the previous update.
    pub delta: f32,
}

/// Uniform update capability shared by all render systems.
pub trait RenderSystem {
    /// Recomputes this system's per-frame state from the world.
    fn update(&mut self, ctx: &SystemContext<'_>);
}

/// The ordered system pipeline executed before draw submission.
#[derive(Debug)]
pub struct RenderPipeline {
    camera: CameraSystem,
    renderer: MeshRendererSystem,
    sprites: SpriteRendererSystem,
    lighting: LightingSystem,
}

impl RenderPipeline {
    /// Builds the pipeline against the initial viewport and light maxima.
    pub fn new(settings: &RenderSettings, viewport: UVec2) -> Self {
        Self {
            camera: CameraSystem::new(viewport),
            renderer: MeshRendererSystem::default(),
            sprites: SpriteRendererSystem::default(),
            lighting: LightingSystem::new(settings.max_point_lights, settings.max_spot_lights),
        }
    }

    /// Runs every system in its fixed order: camera matrices first, then
    /// draw-list bucketing, sprites, and light aggregation.
    pub fn update(&mut self, world: &hecs::World, registry: &ResourceRegistry, delta: f32) {
        let ctx = SystemContext {
            world,
            registry,
            delta,
        };
        self.camera.update(&ctx);
        self.renderer.update(&ctx);
        self.sprites.update(&ctx);
        self.lighting.update(&ctx);
    }

    /// The camera system's latest output.
    pub fn camera(&self) -> &CameraSystem {
        &self.camera
    }

    /// Mutable camera access (viewport propagation).
    pub fn camera_mut(&mut self) -> &mut CameraSystem {
        &mut self.camera
    }

    /// The bucketed draw lists.
    pub fn renderer(&self) -> &MeshRendererSystem {
        &self.renderer
    }

    /// The gathered sprite list.
    pub fn sprites(&self) -> &SpriteRendererSystem {
        &self.sprites
    }

    /// The aggregated light state.
    pub fn lighting(&self) -> &LightingSystem {
        &self.lighting
    }

    /// Mutable light-state access (ambient color).
    pub fn lighting_mut(&mut self) -> &mut LightingSystem {
        &mut self.lighting
    }
}
