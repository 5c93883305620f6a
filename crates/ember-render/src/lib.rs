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

//! # Ember Render
//!
//! Render-resource lifecycle and frame composition over the
//! [`ember_core`] device boundary: resource tables, the material model,
//! the fixed render-target set, ECS render systems, the multi-pass frame
//! composer, and the HDRI environment precompute.
//!
//! The entry point is [`RenderEngine`]: construct it with a device backend
//! via [`RenderEngine::initialize`], drive it once per frame with
//! [`RenderEngine::render`] and [`RenderEngine::tick`], and feed window
//! resizes through [`RenderEngine::on_window_resized`].

#![warn(missing_docs)]

pub mod components;
pub mod engine;
pub mod events;
pub mod hdri;
pub mod layer;
pub mod resources;
pub mod settings;
pub mod shaders;
pub mod stats;
pub mod systems;
pub mod targets;
pub mod uniforms;

// The entity registry the render systems iterate.
pub use hecs;

pub use engine::RenderEngine;
pub use layer::{FramePresenter, Layer};
pub use settings::RenderSettings;
pub use shaders::ShaderKind;
pub use stats::RenderStats;
