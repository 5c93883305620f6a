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

//! Owned GPU-resource wrappers and the tables that key them.

pub mod material;
pub mod mesh;
pub mod primitives;
pub mod registry;
pub mod shader;
pub mod texture;

pub use material::{Material, TextureSlot};
pub use mesh::{Mesh, MeshKey, SubMesh};
pub use primitives::PrimitiveKind;
pub use registry::ResourceRegistry;
pub use shader::Shader;
pub use texture::{Texture, TextureRef};
