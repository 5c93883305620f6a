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

//! Global settings for the rendering engine.

use serde::{Deserialize, Serialize};

/// A collection of global settings affecting the frame-composition
/// pipeline. Loaded once before
/// [`RenderEngine::initialize`](crate::engine::RenderEngine::initialize);
/// values that size GPU resources (shadow map resolution) are fixed for
/// the engine's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Side length in pixels of the square shadow-depth target.
    pub shadow_map_resolution: u32,
    /// Number of ping-pong gaussian blur iterations in the bloom pass.
    pub bloom_iterations: u32,
    /// Maximum number of point lights aggregated per frame.
    pub max_point_lights: usize,
    /// Maximum number of spot lights aggregated per frame.
    pub max_spot_lights: usize,
    /// Whether the presenter should synchronize swaps to the display.
    pub vsync: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            shadow_map_resolution: 2048,
            bloom_iterations: 4,
            max_point_lights: 8,
            max_spot_lights: 8,
            vsync: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let s = RenderSettings::default();
        assert_eq!(s.bloom_iterations, 4);
        assert!(s.shadow_map_resolution.is_power_of_two());
    }
}
