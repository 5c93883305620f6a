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

//! Procedurally generated built-in primitives.
//!
//! Generated rather than loaded so engine startup never depends on an
//! asset directory. The plane primitive doubles as the fallback mesh for
//! malformed model files.

use ember_core::gfx::MeshData;
use glam::{Vec2, Vec3};

/// Identity of an engine built-in primitive mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Unit quad in the XY plane, facing +Z. Sprites and fullscreen passes.
    Quad,
    /// Unit plane in the XZ plane, facing +Y.
    Plane,
    /// Unit cube centered on the origin.
    Cube,
    /// UV sphere of radius 0.5.
    Sphere,
}

impl PrimitiveKind {
    /// Every built-in primitive, in construction order.
    pub const ALL: [PrimitiveKind; 4] = [
        PrimitiveKind::Quad,
        PrimitiveKind::Plane,
        PrimitiveKind::Cube,
        PrimitiveKind::Sphere,
    ];
}

/// Generates the geometry for a primitive.
pub fn mesh_data(kind: PrimitiveKind) -> MeshData {
    match kind {
        PrimitiveKind::Quad => quad(),
        PrimitiveKind::Plane => plane(),
        PrimitiveKind::Cube => cube(),
        PrimitiveKind::Sphere => sphere(16, 24),
    }
}

fn quad() -> MeshData {
    MeshData {
        positions: vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ],
        normals: vec![Vec3::Z; 4],
        uvs: vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ],
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

fn plane() -> MeshData {
    MeshData {
        positions: vec![
            Vec3::new(-0.5, 0.0, -0.5),
            Vec3::new(0.5, 0.0, -0.5),
            Vec3::new(0.5, 0.0, 0.5),
            Vec3::new(-0.5, 0.0, 0.5),
        ],
        normals: vec![Vec3::Y; 4],
        uvs: vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ],
        indices: vec![0, 2, 1, 0, 3, 2],
    }
}

fn cube() -> MeshData {
    // 24 vertices: four per face so normals and uvs stay per-face.
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];

    let mut data = MeshData::default();
    for (i, (normal, tangent, bitangent)) in faces.iter().enumerate() {
        let base = (i * 4) as u32;
        let center = *normal * 0.5;
        for (t, b) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            data.positions.push(center + *tangent * t + *bitangent * b);
            data.normals.push(*normal);
            data.uvs.push(Vec2::new(t + 0.5, b + 0.5));
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    data
}

fn sphere(rings: u32, sectors: u32) -> MeshData {
    use std::f32::consts::PI;

    let mut data = MeshData::default();
    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let theta = v * PI;
        for sector in 0..=sectors {
            let u = sector as f32 / sectors as f32;
            let phi = u * 2.0 * PI;
            let dir = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            data.positions.push(dir * 0.5);
            data.normals.push(dir);
            data.uvs.push(Vec2::new(u, v));
        }
    }

    let stride = sectors + 1;
    for ring in 0..rings {
        for sector in 0..sectors {
            let a = ring * stride + sector;
            let b = a + stride;
            data.indices
                .extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn every_primitive_generates_valid_geometry() {
        for kind in PrimitiveKind::ALL {
            let data = mesh_data(kind);
            assert!(!data.is_empty(), "{kind:?}");
            assert_eq!(data.positions.len(), data.normals.len(), "{kind:?}");
            assert_eq!(data.positions.len(), data.uvs.len(), "{kind:?}");
            assert_eq!(data.indices.len() % 3, 0, "{kind:?}");
            let max = *data.indices.iter().max().unwrap() as usize;
            assert!(max < data.vertex_count(), "{kind:?} index out of range");
        }
    }

    #[test]
    fn quad_is_two_triangles() {
        let data = mesh_data(PrimitiveKind::Quad);
        assert_eq!(data.vertex_count(), 4);
        assert_eq!(data.index_count(), 6);
    }

    #[test]
    fn sphere_vertices_sit_on_the_half_unit_radius() {
        let data = mesh_data(PrimitiveKind::Sphere);
        for p in &data.positions {
            assert_relative_eq!(p.length(), 0.5, epsilon = 1e-5);
        }
    }
}
