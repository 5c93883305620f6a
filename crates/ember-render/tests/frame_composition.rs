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

//! End-to-end frame composition against the headless device: pass order,
//! bloom gating, shadow-map distribution, resizes, and presentation.

use ember_core::gfx::{FramebufferHandle, HeadlessDevice};
use ember_render::components::{
    Camera, DirectionalLight, MeshRenderer, PointLight, SpriteRenderer, Transform,
};
use ember_render::events::{EngineEvent, EventKind};
use ember_render::layer::FramePresenter;
use ember_render::resources::material::keys;
use ember_render::resources::PrimitiveKind;
use ember_render::{RenderEngine, RenderSettings, ShaderKind};
use glam::{Quat, UVec2, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

const DELTA: f32 = 1.0 / 60.0;

fn engine() -> RenderEngine<HeadlessDevice> {
    RenderEngine::initialize(
        HeadlessDevice::new(),
        RenderSettings::default(),
        UVec2::new(1280, 720),
    )
    .unwrap()
}

/// A camera, a sun, one opaque cube, and one transparent sphere.
fn scene(engine: &mut RenderEngine<HeadlessDevice>) -> hecs::World {
    engine.create_material("metal", ShaderKind::PbrLit);
    let glass = engine.create_material("glass", ShaderKind::PbrLit);
    glass.set_int(keys::SURFACE_TYPE, 1);

    let mut world = hecs::World::new();
    world.spawn((Transform::at(Vec3::new(0.0, 2.0, 8.0)), Camera::default()));
    world.spawn((
        Transform {
            rotation: Quat::from_rotation_x(-1.0),
            ..Transform::default()
        },
        DirectionalLight::default(),
    ));
    world.spawn((
        Transform::at(Vec3::new(2.0, 0.0, 0.0)),
        PointLight::default(),
    ));
    world.spawn((
        Transform::default(),
        MeshRenderer::new(PrimitiveKind::Cube, "metal"),
    ));
    world.spawn((
        Transform::at(Vec3::X),
        MeshRenderer::new(PrimitiveKind::Sphere, "glass"),
    ));
    world
}

#[test]
fn frame_visits_shadow_scene_and_composite_in_order() {
    let mut engine = engine();
    let world = scene(&mut engine);
    engine.render(&world, DELTA);

    let shadow_fbo = engine.targets().shadow.fbo();
    let primary_fbo = engine.targets().primary.fbo();
    let dev = engine.device();

    // Two mesh entities, one submesh each, drawn into the shadow map.
    assert_eq!(dev.draws_to(shadow_fbo), 2);
    // Same two meshes plus the skybox cube in the scene pass.
    assert_eq!(dev.draws_to(primary_fbo), 3);
    // One fullscreen quad on the back buffer.
    assert_eq!(dev.draws_to(FramebufferHandle::NULL), 1);

    // The shadow clear is depth-only; the scene clear takes color, depth,
    // and stencil; the composite clears the back buffer.
    assert_eq!(dev.clears.len(), 3);
    assert_eq!(dev.clears[0].fbo, shadow_fbo);
    assert!(!dev.clears[0].color && dev.clears[0].depth && !dev.clears[0].stencil);
    assert_eq!(dev.clears[1].fbo, primary_fbo);
    assert!(dev.clears[1].color && dev.clears[1].depth && dev.clears[1].stencil);
    assert_eq!(dev.clears[2].fbo, FramebufferHandle::NULL);

    // Passes never interleave: every shadow draw precedes every primary
    // draw, which precede the composite draw.
    let order: Vec<FramebufferHandle> = dev.draw_calls.iter().map(|d| d.fbo).collect();
    let first_primary = order.iter().position(|f| *f == primary_fbo).unwrap();
    let last_shadow = order.iter().rposition(|f| *f == shadow_fbo).unwrap();
    assert!(last_shadow < first_primary);
    assert_eq!(*order.last().unwrap(), FramebufferHandle::NULL);
}

#[test]
fn composite_draws_six_indices_with_the_final_program() {
    let mut engine = engine();
    let world = scene(&mut engine);
    engine.render(&world, DELTA);

    let final_program = engine.registry().shader(ShaderKind::ScreenQuadFinal).program();
    let last = engine.device().draw_calls.last().unwrap().clone();
    assert_eq!(last.fbo, FramebufferHandle::NULL);
    assert_eq!(last.index_count, 6);
    assert_eq!(last.program, final_program);
}

#[test]
fn no_directional_light_skips_the_shadow_pass() {
    let mut engine = engine();
    engine.create_material("metal", ShaderKind::PbrLit);

    let mut world = hecs::World::new();
    world.spawn((Transform::default(), Camera::default()));
    world.spawn((
        Transform::default(),
        MeshRenderer::new(PrimitiveKind::Cube, "metal"),
    ));
    engine.render(&world, DELTA);

    let shadow_fbo = engine.targets().shadow.fbo();
    let dev = engine.device();
    assert_eq!(dev.draws_to(shadow_fbo), 0);
    assert!(dev.clears.iter().all(|c| c.fbo != shadow_fbo));
}

#[test]
fn bloom_off_leaves_pingpong_targets_untouched() {
    let mut engine = engine();
    let world = scene(&mut engine);
    engine.render(&world, DELTA);

    let dev = engine.device();
    for target in &engine.targets().pingpong {
        assert_eq!(dev.draws_to(target.fbo()), 0);
    }
    // The composite's bloom slot stays inactive: unit 1's final binding for
    // the frame is the shared default texture, not a bloom buffer.
    let bound = dev.last_bind_on_unit(1).unwrap();
    assert_eq!(bound.texture, engine.registry().default_texture().handle());
}

#[test]
fn bloom_on_ping_pongs_and_feeds_the_composite() {
    let mut engine = engine();
    let world = scene(&mut engine);
    engine.set_bloom_enabled(true);
    engine.render(&world, DELTA);

    let [ping, pong] = &engine.targets().pingpong;
    let dev = engine.device();
    // Four iterations alternate horizontal/vertical across the two
    // buffers.
    assert_eq!(dev.draws_to(ping.fbo()), 2);
    assert_eq!(dev.draws_to(pong.fbo()), 2);

    // Iteration 0 sources the primary target's brightness attachment.
    let bright = engine.targets().bright_color().handle();
    assert!(dev.texture_binds.iter().any(|b| b.texture == bright));

    // The composite samples the buffer written last (the second one).
    let bound = dev.last_bind_on_unit(1).unwrap();
    assert_eq!(bound.texture, pong.color(0).handle());
}

#[test]
fn sprites_draw_on_the_quad_after_scene_geometry() {
    let mut engine = engine();
    engine.create_material("icon", ShaderKind::Sprite);
    let mut world = hecs::World::new();
    world.spawn((Transform::default(), Camera::default()));
    world.spawn((Transform::at(Vec3::Y), SpriteRenderer::new("icon")));
    engine.render(&world, DELTA);

    let primary_fbo = engine.targets().primary.fbo();
    let sprite_program = engine.registry().shader(ShaderKind::Sprite).program();
    let dev = engine.device();
    // One sprite quad plus the skybox cube.
    assert_eq!(dev.draws_to(primary_fbo), 2);
    assert!(dev
        .draw_calls
        .iter()
        .any(|d| d.fbo == primary_fbo && d.program == sprite_program && d.index_count == 6));
}

#[test]
fn skybox_uses_the_engine_default_and_can_be_suppressed() {
    let mut engine = engine();
    let mut world = hecs::World::new();
    world.spawn((Transform::default(), Camera::default()));

    engine.render(&world, DELTA);
    let gradient_program = engine.registry().shader(ShaderKind::SkyboxGradient).program();
    assert!(engine
        .device()
        .draw_calls
        .iter()
        .any(|d| d.program == gradient_program));

    engine.device_mut().reset_log();
    engine.set_draw_skybox(false);
    engine.render(&world, DELTA);
    assert!(engine
        .device()
        .draw_calls
        .iter()
        .all(|d| d.program != gradient_program));
}

#[test]
fn user_skybox_material_overrides_the_default() {
    let mut engine = engine();
    engine.create_material("night", ShaderKind::SkyboxProcedural);
    engine.set_skybox_material(Some("night"));

    let mut world = hecs::World::new();
    world.spawn((Transform::default(), Camera::default()));
    engine.render(&world, DELTA);

    let procedural = engine.registry().shader(ShaderKind::SkyboxProcedural).program();
    let gradient = engine.registry().shader(ShaderKind::SkyboxGradient).program();
    let dev = engine.device();
    assert!(dev.draw_calls.iter().any(|d| d.program == procedural));
    assert!(dev.draw_calls.iter().all(|d| d.program != gradient));
}

#[test]
fn shadow_pass_distributes_the_map_to_shadow_mapped_materials() {
    let mut engine = engine();
    let world = scene(&mut engine);
    engine.render(&world, DELTA);

    let shadow_handle = engine.shadow_map_image().texture;
    for name in ["metal", "glass"] {
        let slot = engine
            .registry()
            .material(name)
            .texture_slot(keys::SHADOW_MAP)
            .unwrap();
        assert!(slot.active, "{name}");
        assert_eq!(slot.texture.unwrap().texture, shadow_handle, "{name}");
    }
}

#[test]
fn unloading_a_material_drops_it_from_the_shadow_set() {
    let mut engine = engine();
    let world = scene(&mut engine);
    engine.render(&world, DELTA);
    assert!(engine.registry().shadow_mapped().contains("glass"));

    engine.unload_material("glass");
    assert!(!engine.registry().shadow_mapped().contains("glass"));
    assert!(!engine.registry().material_exists("glass"));

    // The entity still referencing it falls back to the default material;
    // the next frame completes without touching the unloaded name.
    engine.render(&world, DELTA);
    assert_eq!(engine.registry().shadow_mapped().len(), 1);
}

#[test]
fn resize_propagates_to_targets_camera_and_subscribers() {
    let mut engine = engine();
    let world = scene(&mut engine);
    engine.render(&world, DELTA);

    let resized = Rc::new(RefCell::new(None));
    let seen = resized.clone();
    engine
        .events_mut()
        .subscribe(EventKind::WindowResized, move |event| {
            if let EngineEvent::WindowResized { width, height } = event {
                *seen.borrow_mut() = Some((*width, *height));
            }
        });

    engine.on_window_resized(640, 360);
    assert_eq!(*resized.borrow(), Some((640, 360)));

    let size = UVec2::new(640, 360);
    let targets = engine.targets();
    assert_eq!(targets.primary.size(), size);
    assert_eq!(targets.scene_color().size(), size);
    assert_eq!(targets.bright_color().size(), size);
    assert_eq!(targets.primary.render_buffer_size(), Some(size));
    for target in &targets.pingpong {
        assert_eq!(target.color(0).size(), size);
    }
    // The shadow map resolution is a setting, not a window size.
    assert_eq!(
        targets.shadow.size(),
        UVec2::splat(engine.settings().shadow_map_resolution)
    );

    engine.render(&world, DELTA);
    let aspect = engine.pipeline().camera().aspect();
    assert!((aspect - 640.0 / 360.0).abs() < 1e-6, "aspect = {aspect}");
}

#[test]
fn zero_sized_resize_is_ignored() {
    let mut engine = engine();
    engine.on_window_resized(0, 720);
    assert_eq!(engine.viewport(), UVec2::new(1280, 720));
}

#[test]
fn tick_advances_layers_publishes_stats_and_signals_the_presenter() {
    struct CountingPresenter(Rc<RefCell<Vec<bool>>>);
    impl FramePresenter for CountingPresenter {
        fn present(&mut self, vsync: bool) {
            self.0.borrow_mut().push(vsync);
        }
    }

    let mut engine = engine();
    let swaps = Rc::new(RefCell::new(Vec::new()));
    engine.set_presenter(Box::new(CountingPresenter(swaps.clone())));

    let completed = Rc::new(RefCell::new(0u64));
    let seen = completed.clone();
    engine
        .events_mut()
        .subscribe(EventKind::FrameCompleted, move |event| {
            if let EngineEvent::FrameCompleted { frames, .. } = event {
                *seen.borrow_mut() = *frames;
            }
        });

    engine.tick(DELTA);
    engine.tick(DELTA);

    assert_eq!(*swaps.borrow(), vec![true, true]);
    assert_eq!(*completed.borrow(), 2);
    assert_eq!(engine.stats().frames(), 2);
}

#[test]
fn post_draw_callback_runs_after_the_composite() {
    let mut engine = engine();
    let world = scene(&mut engine);

    let observed = Rc::new(RefCell::new(0usize));
    let seen = observed.clone();
    engine.set_post_draw(move |device: &mut HeadlessDevice| {
        *seen.borrow_mut() = device.draw_calls.len();
    });
    engine.render(&world, DELTA);

    // The callback saw every draw of the frame already submitted.
    assert_eq!(*observed.borrow(), engine.device().draw_calls.len());
    assert!(*observed.borrow() > 0);
}

#[test]
fn update_shader_data_binds_every_declared_sampler_slot() {
    let mut engine = engine();
    engine.create_material("metal", ShaderKind::PbrLit);
    engine.device_mut().reset_log();
    engine.update_shader_data("metal");

    let dev = engine.device();
    // The physically-based schema declares nine sampler slots; each one
    // received a binding even though none was logically set.
    assert_eq!(dev.texture_binds.len(), 9);
    let units: std::collections::HashSet<u32> =
        dev.texture_binds.iter().map(|b| b.unit).collect();
    assert_eq!(units, (0..9).collect::<std::collections::HashSet<u32>>());
    assert!(dev
        .uniform_writes
        .iter()
        .any(|(_, name)| name == "albedo_map_is_active"));
}

#[test]
fn shutdown_releases_gpu_resources() {
    let mut engine = engine();
    let world = scene(&mut engine);
    engine.render(&world, DELTA);
    engine.shutdown();

    let dev = engine.device();
    assert!(!dev.released_textures.is_empty());
    assert!(!dev.released_programs.is_empty());
    assert!(!dev.released_vertex_arrays.is_empty());
}
