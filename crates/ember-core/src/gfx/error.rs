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

//! Error hierarchy for the rendering subsystem.
//!
//! Routine lookup misses and duplicate creates are *not* errors — they are
//! recovered locally with a fallback resource and a warning. Only resource
//! construction failures and fatal setup conditions (framebuffer
//! incompleteness, shader validation failure) travel through these types.

use std::fmt;

/// An error raised while constructing or uploading a GPU resource.
#[derive(Debug)]
pub enum ResourceError {
    /// The shader source failed to compile or link.
    ShaderCompilation {
        /// Label of the shader that failed.
        label: String,
        /// Compiler/linker diagnostics.
        details: String,
    },
    /// The device rejected a texture allocation.
    TextureAllocation(String),
    /// The device rejected a buffer allocation.
    BufferAllocation(String),
    /// Geometry handed to the device had no vertices or indices.
    EmptyGeometry,
    /// An error originating from the specific backend implementation.
    Backend(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::ShaderCompilation { label, details } => {
                write!(f, "Shader compilation failed for '{label}': {details}")
            }
            ResourceError::TextureAllocation(msg) => {
                write!(f, "Texture allocation failed: {msg}")
            }
            ResourceError::BufferAllocation(msg) => {
                write!(f, "Buffer allocation failed: {msg}")
            }
            ResourceError::EmptyGeometry => {
                write!(f, "Vertex array construction rejected: geometry is empty")
            }
            ResourceError::Backend(msg) => write!(f, "Backend resource error: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {}

/// A fatal condition detected during engine setup. Continuing past one of
/// these would silently corrupt rendering, so initialization must abort.
#[derive(Debug)]
pub enum SetupError {
    /// A framebuffer reported incomplete after construction.
    IncompleteFramebuffer {
        /// Name of the render target that failed.
        target: String,
    },
    /// One or more engine shader programs failed validation.
    ShaderValidation {
        /// Number of programs that failed.
        failed: u32,
    },
    /// A required resource could not be constructed.
    Resource(ResourceError),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::IncompleteFramebuffer { target } => {
                write!(f, "Render target '{target}' is incomplete")
            }
            SetupError::ShaderValidation { failed } => {
                write!(f, "{failed} engine shader program(s) failed validation")
            }
            SetupError::Resource(err) => write!(f, "Setup resource failure: {err}"),
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::Resource(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for SetupError {
    fn from(err: ResourceError) -> Self {
        SetupError::Resource(err)
    }
}

/// A high-level rendering error: either a setup failure or a resource
/// failure surfaced through the frame path.
#[derive(Debug)]
pub enum RenderError {
    /// Setup-time failure.
    Setup(SetupError),
    /// Resource construction failure.
    Resource(ResourceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Setup(err) => write!(f, "Render setup failed: {err}"),
            RenderError::Resource(err) => write!(f, "Render resource failure: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Setup(err) => Some(err),
            RenderError::Resource(err) => Some(err),
        }
    }
}

impl From<SetupError> for RenderError {
    fn from(err: SetupError) -> Self {
        RenderError::Setup(err)
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::Resource(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn resource_error_display() {
        let err = ResourceError::ShaderCompilation {
            label: "PBRLit".to_string(),
            details: "syntax error at line 12".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Shader compilation failed for 'PBRLit': syntax error at line 12"
        );
    }

    #[test]
    fn setup_error_wraps_resource_error() {
        let err: SetupError = ResourceError::EmptyGeometry.into();
        assert!(err.source().is_some());
        assert_eq!(
            format!("{err}"),
            "Setup resource failure: Vertex array construction rejected: geometry is empty"
        );
    }

    #[test]
    fn render_error_chains_sources() {
        let setup = SetupError::IncompleteFramebuffer {
            target: "primary".to_string(),
        };
        let err: RenderError = setup.into();
        assert_eq!(format!("{err}"), "Render setup failed: Render target 'primary' is incomplete");
        assert!(err.source().is_some());
    }
}
