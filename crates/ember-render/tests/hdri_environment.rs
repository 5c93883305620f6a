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

//! HDRI environment capture through the engine: the captured gate, the
//! four convolution stages, and material slot wiring.

use ember_core::gfx::{HeadlessDevice, TextureBindMode};
use ember_render::hdri::{
    BRDF_LUT_RESOLUTION, ENVIRONMENT_RESOLUTION, IRRADIANCE_RESOLUTION, PREFILTER_MIP_LEVELS,
    PREFILTER_RESOLUTION,
};
use ember_render::resources::material::keys;
use ember_render::{RenderEngine, RenderSettings, ShaderKind};
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

/// Writes a tiny Radiance HDR file the registry can actually decode.
fn test_hdr(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let file = std::fs::File::create(&path).unwrap();
    let pixels = vec![image::Rgb([1.0f32, 0.5, 0.25]); 4 * 2];
    image::codecs::hdr::HdrEncoder::new(std::io::BufWriter::new(file))
        .encode(&pixels, 4, 2)
        .unwrap();
    path
}

#[test]
fn hdri_data_before_capture_warns_and_leaves_the_material_untouched() {
    let mut engine = engine();
    engine.create_material("metal", ShaderKind::PbrLit);

    engine.set_hdri_data("metal");
    assert!(!engine.hdri().captured());
    let material = engine.registry().material("metal");
    for slot in [keys::IRRADIANCE_MAP, keys::PREFILTER_MAP, keys::BRDF_LUT_MAP] {
        assert!(!material.texture_slot(slot).unwrap().active, "{slot}");
    }
}

#[test]
fn capture_from_a_missing_file_keeps_the_gate_closed() {
    let mut engine = engine();
    engine.capture_hdri("no/such/environment.hdr");
    assert!(!engine.hdri().captured());
    assert_eq!(engine.device().draws_to(engine.targets().capture.fbo()), 0);
}

#[test]
fn capture_runs_all_four_stages_at_their_resolutions() {
    let path = test_hdr("ember_capture_stages.hdr");
    let mut engine = engine();
    engine.capture_hdri(path.to_str().unwrap());

    assert!(engine.hdri().captured());
    let hdri = engine.hdri();
    assert_eq!(
        hdri.environment().unwrap().size(),
        UVec2::splat(ENVIRONMENT_RESOLUTION)
    );
    assert_eq!(
        hdri.irradiance().unwrap().size(),
        UVec2::splat(IRRADIANCE_RESOLUTION)
    );
    assert_eq!(
        hdri.prefilter().unwrap().size(),
        UVec2::splat(PREFILTER_RESOLUTION)
    );
    assert_eq!(
        hdri.brdf_lut().unwrap().size(),
        UVec2::splat(BRDF_LUT_RESOLUTION)
    );

    // Six faces for the equirect and irradiance stages, six per prefilter
    // mip, one BRDF quad.
    let expected = 6 + 6 + 6 * PREFILTER_MIP_LEVELS as usize + 1;
    assert_eq!(
        engine.device().draws_to(engine.targets().capture.fbo()),
        expected
    );

    // The capture stages leave the main viewport restored.
    assert_eq!(engine.device().viewport.1, UVec2::new(800, 600));
}

#[test]
fn captured_maps_reach_the_material_slots_and_can_be_removed() {
    let path = test_hdr("ember_capture_slots.hdr");
    let mut engine = engine();
    engine.create_material("metal", ShaderKind::PbrLit);
    engine.capture_hdri(path.to_str().unwrap());

    engine.set_hdri_data("metal");
    {
        let material = engine.registry().material("metal");
        let irradiance = material.texture_slot(keys::IRRADIANCE_MAP).unwrap();
        assert!(irradiance.active);
        assert_eq!(irradiance.bind_mode, TextureBindMode::Cubemap);
        assert_eq!(
            irradiance.texture.unwrap().texture,
            engine.hdri().irradiance().unwrap().handle()
        );

        let prefilter = material.texture_slot(keys::PREFILTER_MAP).unwrap();
        assert!(prefilter.active);
        assert_eq!(
            prefilter.texture.unwrap().texture,
            engine.hdri().prefilter().unwrap().handle()
        );

        let brdf = material.texture_slot(keys::BRDF_LUT_MAP).unwrap();
        assert!(brdf.active);
        assert_eq!(brdf.bind_mode, TextureBindMode::Texture2D);
        assert_eq!(
            brdf.texture.unwrap().texture,
            engine.hdri().brdf_lut().unwrap().handle()
        );
    }

    engine.remove_hdri_data("metal");
    let material = engine.registry().material("metal");
    for slot in [keys::IRRADIANCE_MAP, keys::PREFILTER_MAP, keys::BRDF_LUT_MAP] {
        assert!(!material.texture_slot(slot).unwrap().active, "{slot}");
    }
}

#[test]
fn capture_publishes_the_hdri_captured_event() {
    use ember_render::events::{EngineEvent, EventKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    let path = test_hdr("ember_capture_event.hdr");
    let mut engine = engine();
    let fired = Rc::new(RefCell::new(false));
    let seen = fired.clone();
    engine
        .events_mut()
        .subscribe(EventKind::HdriCaptured, move |event| {
            assert_eq!(*event, EngineEvent::HdriCaptured);
            *seen.borrow_mut() = true;
        });

    engine.capture_hdri(path.to_str().unwrap());
    assert!(*fired.borrow());
}
