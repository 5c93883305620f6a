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

//! # Ember Core
//!
//! Contract crate for the ember rendering engine: the graphics-device
//! capability trait, opaque resource handles, fixed-function draw
//! parameters, and the error hierarchy. Backend implementations and the
//! frame-composition layer live in other crates; everything here is
//! backend-agnostic.

#![warn(missing_docs)]

pub mod color;
pub mod gfx;

pub use color::Color;
pub use gfx::device::RenderDevice;
pub use gfx::error::{RenderError, ResourceError, SetupError};
