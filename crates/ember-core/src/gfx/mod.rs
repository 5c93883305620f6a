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

//! Graphics-device boundary: opaque handles, descriptor types, the
//! [`RenderDevice`](device::RenderDevice) capability trait, and a headless
//! implementation for tests and off-screen runs.

pub mod device;
pub mod error;
pub mod handle;
pub mod headless;
pub mod params;

pub use device::RenderDevice;
pub use error::{RenderError, ResourceError, SetupError};
pub use handle::{
    BufferHandle, FramebufferHandle, ProgramHandle, RenderBufferHandle, SamplerHandle,
    TextureHandle, VertexArrayHandle,
};
pub use headless::HeadlessDevice;
pub use params::*;
