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

//! Mesh wrapper: one vertex array per sub-mesh plus the material-index
//! mapping, and the OBJ loading path.

use ember_core::gfx::{BufferUsage, MeshData, RenderDevice, VertexArrayHandle};
use ember_core::ResourceError;
use glam::{Vec2, Vec3};

use super::primitives::PrimitiveKind;

/// Key under which a mesh lives in the resource registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MeshKey {
    /// An engine built-in primitive.
    Primitive(PrimitiveKind),
    /// A user mesh loaded from a file path.
    Path(String),
}

impl From<PrimitiveKind> for MeshKey {
    fn from(kind: PrimitiveKind) -> Self {
        MeshKey::Primitive(kind)
    }
}

impl From<&str> for MeshKey {
    fn from(path: &str) -> Self {
        MeshKey::Path(path.to_string())
    }
}

/// One indexed vertex-buffer set within a mesh.
#[derive(Debug, Clone, Copy)]
pub struct SubMesh {
    /// Device vertex array.
    pub vao: VertexArrayHandle,
    /// Indices to draw.
    pub index_count: u32,
    /// Index into the source model's material list.
    pub material_index: usize,
}

/// A mesh: one or more sub-meshes, lifecycle tied to load-from-file or
/// primitive generation. Destruction releases every owned vertex array.
#[derive(Debug, Default)]
pub struct Mesh {
    submeshes: Vec<SubMesh>,
    path: Option<String>,
}

impl Mesh {
    /// Uploads each part as one sub-mesh.
    pub fn construct(
        device: &mut dyn RenderDevice,
        path: Option<&str>,
        parts: &[(MeshData, usize)],
        usage: BufferUsage,
    ) -> Result<Self, ResourceError> {
        let mut submeshes = Vec::with_capacity(parts.len());
        for (data, material_index) in parts {
            let vao = device.create_vertex_array(data, usage)?;
            submeshes.push(SubMesh {
                vao,
                index_count: data.index_count(),
                material_index: *material_index,
            });
        }
        Ok(Self {
            submeshes,
            path: path.map(str::to_string),
        })
    }

    /// Releases all owned vertex arrays.
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        for submesh in self.submeshes.drain(..) {
            device.release_vertex_array(submesh.vao);
        }
    }

    /// The sub-meshes in draw order.
    #[inline]
    pub fn submeshes(&self) -> &[SubMesh] {
        &self.submeshes
    }

    /// `true` when the mesh has nothing to draw.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.submeshes.is_empty()
    }

    /// Source path, when file-loaded.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

/// Loads an OBJ file into per-model geometry parts with their material
/// indices. Models without normals or texture coordinates get zeroed
/// channels of matching length.
pub fn load_obj(path: &str) -> Result<Vec<(MeshData, usize)>, tobj::LoadError> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    let mut parts = Vec::with_capacity(models.len());
    for model in models {
        let mesh = model.mesh;
        let vertex_count = mesh.positions.len() / 3;

        let positions = mesh
            .positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
            .collect();
        let normals = if mesh.normals.is_empty() {
            vec![Vec3::ZERO; vertex_count]
        } else {
            mesh.normals
                .chunks_exact(3)
                .map(|n| Vec3::new(n[0], n[1], n[2]))
                .collect()
        };
        let uvs = if mesh.texcoords.is_empty() {
            vec![Vec2::ZERO; vertex_count]
        } else {
            mesh.texcoords
                .chunks_exact(2)
                .map(|t| Vec2::new(t[0], t[1]))
                .collect()
        };

        let data = MeshData {
            positions,
            normals,
            uvs,
            indices: mesh.indices,
        };
        if data.is_empty() {
            log::warn!("Mesh '{}': sub-model '{}' has no geometry, skipping", path, model.name);
            continue;
        }
        parts.push((data, mesh.material_id.unwrap_or(0)));
    }
    Ok(parts)
}
