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

//! File-backed resource loading through the engine: real decodes land in
//! the tables, misses fall back without inserting.

use ember_core::gfx::{HeadlessDevice, SamplerOptions};
use ember_render::resources::mesh::MeshKey;
use ember_render::{RenderEngine, RenderSettings};
use glam::UVec2;
use std::path::PathBuf;

fn engine() -> RenderEngine<HeadlessDevice> {
    RenderEngine::initialize(
        HeadlessDevice::new(),
        RenderSettings::default(),
        UVec2::new(800, 600),
    )
    .unwrap()
}

fn test_png(name: &str, width: u32, height: u32) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let pixels = vec![200u8; (width * height * 4) as usize];
    image::save_buffer(&path, &pixels, width, height, image::ExtendedColorType::Rgba8).unwrap();
    path
}

fn test_obj(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    std::fs::write(
        &path,
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvt 0 0\nf 1/1/1 2/1/1 3/1/1\n",
    )
    .unwrap();
    path
}

#[test]
fn known_good_texture_path_loads_with_source_dimensions() {
    let path = test_png("ember_load_ok.png", 6, 3);
    let path = path.to_str().unwrap().to_string();
    let mut engine = engine();

    let texture = engine.create_texture(&path, SamplerOptions::default());
    assert!(!texture.is_empty());
    assert_eq!(texture.size(), UVec2::new(6, 3));
    assert!(engine.registry().texture_exists(&path));

    // A second create returns the existing entry unchanged.
    let first_handle = engine.registry().texture(&path).handle();
    let again = engine.create_texture(&path, SamplerOptions::default());
    assert_eq!(again.handle(), first_handle);
}

#[test]
fn missing_texture_path_yields_the_shared_default_without_inserting() {
    let mut engine = engine();
    let texture = engine.create_texture("no/such/texture.png", SamplerOptions::default());
    assert!(texture.is_empty());
    assert!(!engine.registry().texture_exists("no/such/texture.png"));
}

#[test]
fn unload_texture_releases_the_device_handle() {
    let path = test_png("ember_load_unload.png", 2, 2);
    let path = path.to_str().unwrap().to_string();
    let mut engine = engine();

    let handle = engine.create_texture(&path, SamplerOptions::default()).handle();
    engine.unload_texture(&path);
    assert!(!engine.registry().texture_exists(&path));
    assert!(engine.device().released_textures.contains(&handle));
}

#[test]
fn obj_mesh_loads_and_unloads_through_the_table() {
    let path = test_obj("ember_load_tri.obj");
    let path = path.to_str().unwrap().to_string();
    let mut engine = engine();

    let mesh = engine.create_mesh(&path);
    assert!(!mesh.is_empty());
    assert_eq!(mesh.submeshes()[0].index_count, 3);
    let key = MeshKey::Path(path.clone());
    assert!(engine.registry().mesh_exists(&key));

    engine.unload_mesh(&key);
    assert!(!engine.registry().mesh_exists(&key));
    assert!(!engine.device().released_vertex_arrays.is_empty());
}

#[test]
fn malformed_mesh_path_falls_back_to_the_plane_primitive() {
    let mut engine = engine();
    let mesh = engine.create_mesh("no/such/model.obj");
    assert!(!mesh.is_empty());
    assert!(!engine
        .registry()
        .mesh_exists(&MeshKey::Path("no/such/model.obj".into())));
}
