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

//! Resource tables: stable keys to owned GPU-resource wrappers.
//!
//! Contract for every table: `create_*` returns the existing resource
//! unchanged when the key is taken (warning), `*()` lookups return a safe
//! fallback on a miss (warning, never a hard failure), and `unload_*` is a
//! warn-and-ignore no-op for absent keys. Every construction call touches
//! the device context, so none of this is safe to interleave with draw
//! submission from another thread — the engine owns both and serializes.

use crate::resources::material::Material;
use crate::resources::mesh::{self, Mesh, MeshKey};
use crate::resources::primitives::{self, PrimitiveKind};
use crate::resources::shader::Shader;
use crate::resources::texture::Texture;
use crate::shaders::ShaderKind;
use ember_core::gfx::{BufferUsage, RenderDevice, SamplerOptions, SetupError, WrapMode};
use ember_core::ResourceError;
use glam::UVec2;
use std::collections::{HashMap, HashSet};

/// Uniform block binding for camera/view data.
pub const VIEW_DATA_BINDING: u32 = 0;
/// Uniform block binding for aggregated light data.
pub const LIGHT_DATA_BINDING: u32 = 1;
/// Uniform block binding for debug switches.
pub const DEBUG_DATA_BINDING: u32 = 2;
/// Block name for camera/view data.
pub const VIEW_DATA_BLOCK: &str = "ViewData";
/// Block name for aggregated light data.
pub const LIGHT_DATA_BLOCK: &str = "LightData";
/// Block name for debug switches.
pub const DEBUG_DATA_BLOCK: &str = "DebugData";

/// Owned tables for textures, meshes, materials, and shaders, plus the
/// shared fallback resources and the shadow-mapped material set.
#[derive(Debug)]
pub struct ResourceRegistry {
    textures: HashMap<String, Texture>,
    meshes: HashMap<MeshKey, Mesh>,
    materials: HashMap<String, Material>,
    shaders: HashMap<ShaderKind, Shader>,

    shadow_mapped: HashSet<String>,

    default_texture: Texture,
    default_cubemap: Texture,
    default_unlit: Material,
}

impl ResourceRegistry {
    /// Builds the registry with the full built-in shader set, the built-in
    /// primitives, and the shared default resources.
    pub fn initialize(device: &mut dyn RenderDevice) -> Result<Self, SetupError> {
        let mut registry = Self {
            textures: HashMap::new(),
            meshes: HashMap::new(),
            materials: HashMap::new(),
            shaders: HashMap::new(),
            shadow_mapped: HashSet::new(),
            default_texture: Texture::construct_empty(device)?,
            default_cubemap: Texture::construct_empty_cubemap(device)?,
            default_unlit: Material::new("#default_unlit"),
        };

        for kind in ShaderKind::ALL {
            let shader = Shader::construct(device, kind)?;
            shader.bind_uniform_block(device, VIEW_DATA_BINDING, VIEW_DATA_BLOCK);
            match kind {
                ShaderKind::PbrLit => {
                    shader.bind_uniform_block(device, LIGHT_DATA_BINDING, LIGHT_DATA_BLOCK);
                    shader.bind_uniform_block(device, DEBUG_DATA_BINDING, DEBUG_DATA_BLOCK);
                }
                ShaderKind::Unlit => {
                    shader.bind_uniform_block(device, DEBUG_DATA_BINDING, DEBUG_DATA_BLOCK);
                }
                _ => {}
            }
            registry.shaders.insert(kind, shader);
        }

        for kind in PrimitiveKind::ALL {
            let data = primitives::mesh_data(kind);
            let mesh = Mesh::construct(device, None, &[(data, 0)], BufferUsage::StaticDraw)
                .map_err(SetupError::from)?;
            registry.meshes.insert(MeshKey::Primitive(kind), mesh);
        }

        let mut default_unlit = Material::new("#default_unlit");
        registry.assign_shader(&mut default_unlit, ShaderKind::Unlit);
        registry.default_unlit = default_unlit;

        Ok(registry)
    }

    // --- shaders ---

    /// Idempotently (re)creates the shader for `kind`.
    pub fn create_shader(
        &mut self,
        device: &mut dyn RenderDevice,
        kind: ShaderKind,
    ) -> Result<&Shader, ResourceError> {
        if self.shaders.contains_key(&kind) {
            log::warn!("Shader {kind:?} already exists, returning that");
        } else {
            let shader = Shader::construct(device, kind)?;
            self.shaders.insert(kind, shader);
        }
        Ok(&self.shaders[&kind])
    }

    /// Looks up a shader, falling back to [`ShaderKind::Unlit`] with a
    /// warning when absent.
    pub fn shader(&self, kind: ShaderKind) -> &Shader {
        if let Some(shader) = self.shaders.get(&kind) {
            return shader;
        }
        log::warn!("Shader {kind:?} was not found, returning the unlit shader");
        &self.shaders[&ShaderKind::Unlit]
    }

    /// Whether the shader for `kind` has been created.
    pub fn shader_exists(&self, kind: ShaderKind) -> bool {
        self.shaders.contains_key(&kind)
    }

    // --- textures ---

    /// Creates a 2D texture from an image file, or returns the existing one
    /// for `path`. A missing or undecodable file warns and yields the
    /// shared empty texture without inserting a table entry.
    pub fn create_texture_2d(
        &mut self,
        device: &mut dyn RenderDevice,
        path: &str,
        sampler: SamplerOptions,
    ) -> &Texture {
        if self.textures.contains_key(path) {
            log::warn!("Texture '{path}' already exists, returning that");
        } else {
            match load_rgba8(path) {
                Ok((size, pixels)) => {
                    match Texture::from_rgba8(device, path, size, &pixels, sampler) {
                        Ok(texture) => {
                            self.textures.insert(path.to_string(), texture);
                        }
                        Err(err) => log::warn!(
                            "Texture '{path}': device construction failed ({err}), returning empty texture"
                        ),
                    }
                }
                Err(err) => log::warn!(
                    "Texture '{path}' could not be loaded ({err}), returning empty texture"
                ),
            }
        }
        self.textures.get(path).unwrap_or(&self.default_texture)
    }

    /// Creates a floating-point texture from a Radiance HDR file.
    pub fn create_texture_hdri(&mut self, device: &mut dyn RenderDevice, path: &str) -> &Texture {
        if self.textures.contains_key(path) {
            log::warn!("Texture '{path}' already exists, returning that");
        } else {
            match load_rgb32f(path) {
                Ok((size, pixels)) => {
                    match Texture::from_hdr(device, Some(path), size, Some(&pixels)) {
                        Ok(texture) => {
                            self.textures.insert(path.to_string(), texture);
                        }
                        Err(err) => log::warn!(
                            "HDRI '{path}': device construction failed ({err}), returning empty texture"
                        ),
                    }
                }
                Err(err) => {
                    log::warn!("HDRI '{path}' could not be loaded ({err}), returning empty texture")
                }
            }
        }
        self.textures.get(path).unwrap_or(&self.default_texture)
    }

    /// Creates a cubemap texture from six face image files, keyed by
    /// `name`. All faces must decode to the same dimensions.
    pub fn create_texture_cubemap(
        &mut self,
        device: &mut dyn RenderDevice,
        name: &str,
        face_paths: [&str; 6],
    ) -> &Texture {
        if self.textures.contains_key(name) {
            log::warn!("Texture '{name}' already exists, returning that");
        } else {
            match load_cubemap_faces(&face_paths) {
                Ok((size, faces)) => {
                    let sampler = SamplerOptions {
                        wrap_s: WrapMode::ClampToEdge,
                        wrap_t: WrapMode::ClampToEdge,
                        wrap_r: WrapMode::ClampToEdge,
                        ..SamplerOptions::default()
                    };
                    match Texture::from_cubemap_faces(device, name, size, &faces, sampler) {
                        Ok(texture) => {
                            self.textures.insert(name.to_string(), texture);
                        }
                        Err(err) => log::warn!(
                            "Cubemap '{name}': device construction failed ({err}), returning empty texture"
                        ),
                    }
                }
                Err(err) => {
                    log::warn!("Cubemap '{name}' could not be loaded ({err}), returning empty texture")
                }
            }
        }
        self.textures.get(name).unwrap_or(&self.default_texture)
    }

    /// Looks up a texture, falling back to the shared empty texture with a
    /// warning.
    pub fn texture(&self, path: &str) -> &Texture {
        match self.textures.get(path) {
            Some(texture) => texture,
            None => {
                log::warn!("Texture '{path}' was not found, returning empty texture");
                &self.default_texture
            }
        }
    }

    /// Whether a texture is loaded under `path`.
    pub fn texture_exists(&self, path: &str) -> bool {
        self.textures.contains_key(path)
    }

    /// Releases and removes a texture; warns when absent.
    pub fn unload_texture(&mut self, device: &mut dyn RenderDevice, path: &str) {
        match self.textures.remove(path) {
            Some(mut texture) => texture.release(device),
            None => log::warn!("Texture '{path}' not found, nothing to unload"),
        }
    }

    /// The shared 2D empty texture every unset sampler slot binds to.
    pub fn default_texture(&self) -> &Texture {
        &self.default_texture
    }

    /// The shared cubemap empty texture.
    pub fn default_cubemap(&self) -> &Texture {
        &self.default_cubemap
    }

    // --- meshes ---

    /// Loads an OBJ model, or returns the existing mesh for `path`. A
    /// missing file or a model with zero geometry warns and yields the
    /// plane primitive without inserting a table entry.
    pub fn create_mesh(&mut self, device: &mut dyn RenderDevice, path: &str) -> &Mesh {
        let key = MeshKey::Path(path.to_string());
        if self.meshes.contains_key(&key) {
            log::warn!("Mesh '{path}' already exists, returning that");
        } else {
            match mesh::load_obj(path) {
                Ok(parts) if parts.is_empty() => {
                    log::warn!("Mesh '{path}' contains no geometry, returning the plane primitive");
                }
                Ok(parts) => {
                    match Mesh::construct(device, Some(path), &parts, BufferUsage::StaticDraw) {
                        Ok(loaded) => {
                            self.meshes.insert(key.clone(), loaded);
                        }
                        Err(err) => log::warn!(
                            "Mesh '{path}': device construction failed ({err}), returning the plane primitive"
                        ),
                    }
                }
                Err(err) => {
                    log::warn!("Mesh '{path}' could not be loaded ({err}), returning the plane primitive")
                }
            }
        }
        self.meshes
            .get(&key)
            .unwrap_or_else(|| &self.meshes[&MeshKey::Primitive(PrimitiveKind::Plane)])
    }

    /// Looks up a mesh, falling back to the plane primitive with a warning.
    pub fn mesh(&self, key: &MeshKey) -> &Mesh {
        match self.meshes.get(key) {
            Some(mesh) => mesh,
            None => {
                log::warn!("Mesh {key:?} was not found, returning the plane primitive");
                &self.meshes[&MeshKey::Primitive(PrimitiveKind::Plane)]
            }
        }
    }

    /// Looks up a built-in primitive.
    pub fn primitive(&self, kind: PrimitiveKind) -> &Mesh {
        self.mesh(&MeshKey::Primitive(kind))
    }

    /// Whether a mesh is loaded under `key`.
    pub fn mesh_exists(&self, key: &MeshKey) -> bool {
        self.meshes.contains_key(key)
    }

    /// Releases and removes a mesh; warns when absent.
    pub fn unload_mesh(&mut self, device: &mut dyn RenderDevice, key: &MeshKey) {
        match self.meshes.remove(key) {
            Some(mut mesh) => mesh.release(device),
            None => log::warn!("Mesh {key:?} not found, nothing to unload"),
        }
    }

    // --- materials ---

    /// Creates a material bound to `kind`'s schema, or returns the existing
    /// one for `name` unchanged.
    pub fn create_material(&mut self, name: &str, kind: ShaderKind) -> &mut Material {
        if self.materials.contains_key(name) {
            log::warn!("Material '{name}' already exists, returning that");
        } else {
            self.materials.insert(name.to_string(), Material::new(name));
            self.set_material_shader(name, kind);
        }
        self.materials.get_mut(name).unwrap_or(&mut self.default_unlit)
    }

    /// Looks up a material, falling back to the default unlit material with
    /// a warning.
    pub fn material(&self, name: &str) -> &Material {
        match self.materials.get(name) {
            Some(material) => material,
            None => {
                log::warn!("Material '{name}' was not found, returning the default material");
                &self.default_unlit
            }
        }
    }

    /// Mutable lookup; `None` (with a warning) when absent.
    pub fn material_mut(&mut self, name: &str) -> Option<&mut Material> {
        let found = self.materials.get_mut(name);
        if found.is_none() {
            log::warn!("Material '{name}' was not found");
        }
        found
    }

    /// Whether a material exists under `name`.
    pub fn material_exists(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    /// Removes a material and drops its shadow-set membership; warns when
    /// absent.
    pub fn unload_material(&mut self, name: &str) {
        if self.materials.remove(name).is_none() {
            log::warn!("Material '{name}' not found, nothing to unload");
            return;
        }
        self.shadow_mapped.remove(name);
    }

    /// Re-binds the shader of the table material `name`, resetting its
    /// property maps to the new schema and updating shadow-set membership.
    /// An unknown shader kind falls back to unlit with a warning.
    pub fn set_material_shader(&mut self, name: &str, kind: ShaderKind) {
        let (resolved, program) = self.resolve_shader(kind);
        match self.materials.get_mut(name) {
            Some(material) => {
                material.apply_schema(resolved, program);
                if material.is_shadow_mapped {
                    self.shadow_mapped.insert(name.to_string());
                } else {
                    self.shadow_mapped.remove(name);
                }
            }
            None => log::warn!("Material '{name}' was not found, cannot set its shader"),
        }
    }

    /// Re-binds the shader of a detached material (one owned by the frame
    /// composer rather than the table). No shadow-set bookkeeping.
    pub fn assign_shader(&self, material: &mut Material, kind: ShaderKind) {
        let (resolved, program) = self.resolve_shader(kind);
        material.apply_schema(resolved, program);
    }

    fn resolve_shader(&self, kind: ShaderKind) -> (ShaderKind, ember_core::gfx::ProgramHandle) {
        match self.shaders.get(&kind) {
            Some(shader) => (kind, shader.program()),
            None => {
                log::warn!("Shader {kind:?} was not found, binding material to the unlit shader");
                match self.shaders.get(&ShaderKind::Unlit) {
                    Some(unlit) => (ShaderKind::Unlit, unlit.program()),
                    None => (ShaderKind::Unlit, ember_core::gfx::ProgramHandle::NULL),
                }
            }
        }
    }

    /// Names of the materials that receive the shadow map after each shadow
    /// pass.
    pub fn shadow_mapped(&self) -> &HashSet<String> {
        &self.shadow_mapped
    }

    /// The fallback material used for lookup misses.
    pub fn default_material(&self) -> &Material {
        &self.default_unlit
    }

    /// Mutable access to the fallback material (shadow-map distribution
    /// covers it too).
    pub(crate) fn default_material_mut(&mut self) -> &mut Material {
        &mut self.default_unlit
    }

    /// Validates every engine shader program, returning the failure count.
    pub fn validate_shaders(&self, device: &mut dyn RenderDevice) -> u32 {
        let mut failed = 0;
        for shader in self.shaders.values() {
            if !device.validate_shader_program(shader.program()) {
                log::error!("Shader {:?} failed validation", shader.kind());
                failed += 1;
            }
        }
        failed
    }

    /// Releases every owned GPU resource. The registry is unusable
    /// afterwards.
    pub fn release_all(&mut self, device: &mut dyn RenderDevice) {
        for (_, mut texture) in self.textures.drain() {
            texture.release(device);
        }
        for (_, mut mesh) in self.meshes.drain() {
            mesh.release(device);
        }
        for (_, mut shader) in self.shaders.drain() {
            shader.release(device);
        }
        self.materials.clear();
        self.shadow_mapped.clear();
        self.default_texture.release(device);
        self.default_cubemap.release(device);
    }
}

fn load_rgba8(path: &str) -> Result<(UVec2, Vec<u8>), image::ImageError> {
    let img = image::open(path)?.flipv().to_rgba8();
    let size = UVec2::new(img.width(), img.height());
    Ok((size, img.into_raw()))
}

fn load_rgb32f(path: &str) -> Result<(UVec2, Vec<f32>), image::ImageError> {
    let img = image::open(path)?.flipv().to_rgb32f();
    let size = UVec2::new(img.width(), img.height());
    Ok((size, img.into_raw()))
}

fn load_cubemap_faces(paths: &[&str; 6]) -> Result<(UVec2, [Vec<u8>; 6]), image::ImageError> {
    let mut faces: [Vec<u8>; 6] = Default::default();
    let mut size = UVec2::ZERO;
    for (i, path) in paths.iter().enumerate() {
        let (face_size, pixels) = load_rgba8(path)?;
        if i == 0 {
            size = face_size;
        } else if face_size != size {
            log::warn!(
                "Cubemap face '{path}' is {face_size:?}, expected {size:?}; face will be distorted"
            );
        }
        faces[i] = pixels;
    }
    Ok((size, faces))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::gfx::HeadlessDevice;

    fn registry() -> (HeadlessDevice, ResourceRegistry) {
        let mut dev = HeadlessDevice::new();
        let registry = ResourceRegistry::initialize(&mut dev).unwrap();
        (dev, registry)
    }

    #[test]
    fn initialize_builds_all_shaders_and_primitives() {
        let (_, registry) = registry();
        for kind in ShaderKind::ALL {
            assert!(registry.shader_exists(kind), "{kind:?}");
        }
        for kind in PrimitiveKind::ALL {
            assert!(registry.mesh_exists(&MeshKey::Primitive(kind)), "{kind:?}");
        }
    }

    #[test]
    fn duplicate_shader_create_returns_same_program() {
        let (mut dev, mut registry) = registry();
        let first = registry.shader(ShaderKind::PbrLit).program();
        let again = registry.create_shader(&mut dev, ShaderKind::PbrLit).unwrap();
        assert_eq!(again.program(), first);
    }

    #[test]
    fn missing_texture_path_falls_back_without_inserting() {
        let (mut dev, mut registry) = registry();
        let tex = registry.create_texture_2d(&mut dev, "no/such/file.png", SamplerOptions::default());
        assert!(tex.is_empty());
        assert!(!registry.texture_exists("no/such/file.png"));

        let lookup = registry.texture("no/such/file.png");
        assert!(lookup.is_empty());
    }

    #[test]
    fn missing_mesh_path_falls_back_to_plane() {
        let (mut dev, mut registry) = registry();
        let mesh = registry.create_mesh(&mut dev, "no/such/model.obj");
        assert!(!mesh.is_empty());
        let mesh_vao = mesh.submeshes()[0].vao;
        assert!(!registry.mesh_exists(&MeshKey::Path("no/such/model.obj".into())));

        let plane_vao = registry.primitive(PrimitiveKind::Plane).submeshes()[0].vao;
        assert_eq!(mesh_vao, plane_vao);
    }

    #[test]
    fn create_material_is_idempotent_and_registers_shadow_membership() {
        let (_, mut registry) = registry();
        registry.create_material("ball", ShaderKind::PbrLit);
        assert!(registry.material_exists("ball"));
        assert!(registry.shadow_mapped().contains("ball"));

        // A second create with a different shader leaves the first binding.
        registry.create_material("ball", ShaderKind::SkyboxGradient);
        assert_eq!(registry.material("ball").shader_kind(), ShaderKind::PbrLit);
    }

    #[test]
    fn shader_switch_updates_shadow_membership_without_duplicates() {
        let (_, mut registry) = registry();
        registry.create_material("ball", ShaderKind::PbrLit);
        registry.set_material_shader("ball", ShaderKind::Unlit);
        assert!(registry.shadow_mapped().contains("ball"));
        assert_eq!(registry.shadow_mapped().len(), 1);

        registry.set_material_shader("ball", ShaderKind::SkyboxGradient);
        assert!(!registry.shadow_mapped().contains("ball"));
    }

    #[test]
    fn unload_material_removes_shadow_membership() {
        let (_, mut registry) = registry();
        registry.create_material("ball", ShaderKind::PbrLit);
        registry.unload_material("ball");
        assert!(!registry.material_exists("ball"));
        assert!(!registry.shadow_mapped().contains("ball"));

        // Unloading again is a warn-and-ignore no-op.
        registry.unload_material("ball");
    }

    #[test]
    fn material_lookup_miss_returns_default_unlit() {
        let (_, registry) = registry();
        let fallback = registry.material("nobody");
        assert_eq!(fallback.name(), "#default_unlit");
        assert_eq!(fallback.shader_kind(), ShaderKind::Unlit);
    }

    #[test]
    fn unknown_shader_kind_falls_back_to_unlit_schema() {
        let (mut dev, mut registry) = registry();
        // Drop the PBR shader to simulate a failed/missing engine shader.
        let mut removed = registry.shaders.remove(&ShaderKind::PbrLit).unwrap();
        removed.release(&mut dev);

        registry.create_material("ball", ShaderKind::PbrLit);
        assert_eq!(registry.material("ball").shader_kind(), ShaderKind::Unlit);
    }

    #[test]
    fn unload_texture_releases_device_handles() {
        let (mut dev, mut registry) = registry();
        // Unloading something never loaded warns and does nothing.
        registry.unload_texture(&mut dev, "ghost.png");
        assert!(dev.released_textures.is_empty());
    }
}
