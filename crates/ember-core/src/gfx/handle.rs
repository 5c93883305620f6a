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

//! Opaque, device-assigned resource handles.
//!
//! Every handle wraps the raw `u32` identifier returned by the graphics
//! device. The value `0` is the null sentinel: it means "not constructed"
//! and is never a valid live resource. Handles are plain identifiers; they
//! do not own the underlying GPU object, and releasing is always an explicit
//! device call made by the owning wrapper.

macro_rules! device_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub u32);

        impl $name {
            /// The null sentinel: no resource has been constructed.
            pub const NULL: Self = Self(0);

            /// Returns `true` if this handle is the null sentinel.
            #[inline]
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }

            /// Raw device identifier.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

device_handle!(
    /// Handle to a GPU texture image.
    TextureHandle
);
device_handle!(
    /// Handle to a GPU sampler object.
    SamplerHandle
);
device_handle!(
    /// Handle to an indexed vertex array (vertex + index buffers + layout).
    VertexArrayHandle
);
device_handle!(
    /// Handle to a linked shader program.
    ProgramHandle
);
device_handle!(
    /// Handle to a GPU buffer (uniform buffers).
    BufferHandle
);
device_handle!(
    /// Handle to a framebuffer object. `NULL` addresses the default
    /// back buffer when used as a draw target.
    FramebufferHandle
);
device_handle!(
    /// Handle to a render buffer (depth/stencil storage).
    RenderBufferHandle
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_handle_is_null() {
        assert!(TextureHandle::default().is_null());
        assert!(FramebufferHandle::NULL.is_null());
        assert_eq!(ProgramHandle::default(), ProgramHandle::NULL);
    }

    #[test]
    fn live_handle_is_not_null() {
        let h = VertexArrayHandle(7);
        assert!(!h.is_null());
        assert_eq!(h.raw(), 7);
    }
}
