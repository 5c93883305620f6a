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

//! The frame composer: owns the device, the resource tables, the target
//! set, and the system pipeline, and sequences the fixed multi-pass frame.
//!
//! Per frame, in order and without re-entrancy: shadow pass, scene pass
//! (opaque, transparent, sprites, skybox), conditional ping-pong bloom,
//! tone-mapped composite onto the back buffer, then the user post-draw
//! callback. [`RenderEngine::tick`] advances the GUI layers and signals the
//! presenter. Draw-time misses (unbound textures, unknown materials) fall
//! back to defaults with a warning; only setup failures abort.

use crate::events::{EngineEvent, EventRegistry};
use crate::hdri::{CaptureResources, HdriPipeline};
use crate::layer::{FramePresenter, Layer, LayerStack};
use crate::resources::material::{keys, Material, IS_ACTIVE_SUFFIX};
use crate::resources::mesh::MeshKey;
use crate::resources::texture::{Texture, TextureRef};
use crate::resources::{PrimitiveKind, ResourceRegistry};
use crate::settings::RenderSettings;
use crate::shaders::ShaderKind;
use crate::stats::RenderStats;
use crate::systems::{DrawItem, RenderPipeline};
use crate::targets::FrameTargets;
use crate::uniforms::FrameUniforms;
use ember_core::gfx::{
    BlendFactor, CompareFunc, DrawParams, FaceCulling, FramebufferHandle, RenderDevice,
    SamplerOptions, SetupError, TextureBindMode,
};
use ember_core::Color;
use glam::{UVec2, Vec3};

fn scene_params() -> DrawParams {
    DrawParams {
        face_culling: FaceCulling::Back,
        use_depth_test: true,
        depth_func: CompareFunc::Less,
        write_depth: true,
        ..DrawParams::default()
    }
}

fn transparent_params() -> DrawParams {
    DrawParams {
        source_blend: BlendFactor::SrcAlpha,
        dest_blend: BlendFactor::OneMinusSrcAlpha,
        write_depth: false,
        ..scene_params()
    }
}

fn skybox_params() -> DrawParams {
    // The cube is seen from inside, and the sky must lose every depth
    // contest it can.
    DrawParams {
        face_culling: FaceCulling::Front,
        use_depth_test: true,
        depth_func: CompareFunc::LessEqual,
        write_depth: false,
        ..DrawParams::default()
    }
}

fn shadow_params() -> DrawParams {
    DrawParams {
        face_culling: FaceCulling::Front,
        use_depth_test: true,
        depth_func: CompareFunc::Less,
        write_depth: true,
        ..DrawParams::default()
    }
}

fn fullscreen_params() -> DrawParams {
    DrawParams::default()
}

/// The rendering engine: resource lifecycle plus the per-frame draw
/// orchestration described at the module level.
///
/// Generic over the device so tests and headless runs can reach through to
/// a concrete backend; everything inside runs strictly sequentially on the
/// single device context.
pub struct RenderEngine<D: RenderDevice> {
    device: D,
    settings: RenderSettings,
    registry: ResourceRegistry,
    targets: FrameTargets,
    pipeline: RenderPipeline,
    uniforms: FrameUniforms,
    hdri: HdriPipeline,
    events: EventRegistry,
    stats: RenderStats,
    layers: LayerStack,
    viewport: UVec2,

    skybox_material: Option<String>,
    draw_skybox: bool,
    default_skybox: Material,
    blur_material: Material,
    final_material: Material,

    presenter: Option<Box<dyn FramePresenter>>,
    post_draw: Option<Box<dyn FnMut(&mut D)>>,
}

impl<D: RenderDevice> RenderEngine<D> {
    /// Builds the engine: compiles and validates every built-in shader,
    /// constructs the frame targets and uniform buffers, and assembles the
    /// system pipeline.
    ///
    /// ## Errors
    /// [`SetupError`] on framebuffer incompleteness, shader validation
    /// failure, or any resource-construction failure. Continuing past one
    /// of these would silently corrupt rendering, so callers should abort.
    pub fn initialize(
        mut device: D,
        settings: RenderSettings,
        viewport: UVec2,
    ) -> Result<Self, SetupError> {
        let registry = ResourceRegistry::initialize(&mut device)?;
        let failed = registry.validate_shaders(&mut device);
        if failed > 0 {
            return Err(SetupError::ShaderValidation { failed });
        }

        let targets = FrameTargets::initialize(&mut device, viewport, &settings)?;
        let uniforms = FrameUniforms::initialize(&mut device)?;
        let pipeline = RenderPipeline::new(&settings, viewport);

        let mut default_skybox = Material::new("#default_skybox");
        registry.assign_shader(&mut default_skybox, ShaderKind::SkyboxGradient);
        let mut blur_material = Material::new("#bloom_blur");
        registry.assign_shader(&mut blur_material, ShaderKind::ScreenQuadBlur);
        let mut final_material = Material::new("#final_composite");
        registry.assign_shader(&mut final_material, ShaderKind::ScreenQuadFinal);

        device.set_viewport(UVec2::ZERO, viewport);

        Ok(Self {
            device,
            settings,
            registry,
            targets,
            pipeline,
            uniforms,
            hdri: HdriPipeline::new(),
            events: EventRegistry::new(),
            stats: RenderStats::new(),
            layers: LayerStack::new(),
            viewport,
            skybox_material: None,
            draw_skybox: true,
            default_skybox,
            blur_material,
            final_material,
            presenter: None,
            post_draw: None,
        })
    }

    // --- frame orchestration ---

    /// Runs one complete frame against `world`: shadow, scene, bloom, and
    /// composite passes, then the post-draw callback. Must be called at
    /// most once per logical frame; it completes fully before returning.
    pub fn render(&mut self, world: &hecs::World, delta: f32) {
        self.shadow_pass(world, delta);
        self.scene_pass(world, delta);
        let bloom = self.bloom_pass();
        self.composite_pass(bloom);
        if let Some(callback) = &mut self.post_draw {
            callback(&mut self.device);
        }
    }

    /// Advances the GUI layers, records frame statistics, and signals the
    /// presenter that the frame is ready to swap.
    pub fn tick(&mut self, delta: f32) {
        self.layers.update_all(delta);
        self.stats.frame(delta);

        let event = EngineEvent::FrameCompleted {
            frames: self.stats.frames(),
            frame_time_ms: self.stats.last_frame_ms(),
        };
        self.layers.event_all(&event);
        self.events.publish(&event);

        if let Some(presenter) = &mut self.presenter {
            presenter.present(self.settings.vsync);
        }
    }

    fn shadow_pass(&mut self, world: &hecs::World, delta: f32) {
        self.pipeline.update(world, &self.registry, delta);
        if self.pipeline.lighting().directional().is_none() {
            return;
        }

        let shadow_size = self.targets.shadow.size();
        self.targets.shadow.bind(&mut self.device);
        self.device.set_viewport(UVec2::ZERO, shadow_size);
        self.device.clear(false, true, false, Color::BLACK, 0);
        self.push_frame_uniforms();

        let program = self.registry.shader(ShaderKind::ShadowDepth).program();
        self.device.set_shader(program);
        let params = shadow_params();
        for item in self.pipeline.renderer().all() {
            self.device
                .update_uniform_mat4(program, keys::MODEL_MATRIX, &item.model);
            for submesh in self.registry.mesh(&item.mesh).submeshes() {
                self.device.draw(submesh.vao, &params, submesh.index_count);
            }
        }

        self.distribute_shadow_map();
    }

    fn scene_pass(&mut self, world: &hecs::World, delta: f32) {
        self.pipeline.update(world, &self.registry, delta);

        self.targets.primary.bind(&mut self.device);
        self.device.set_viewport(UVec2::ZERO, self.viewport);
        self.device.clear(
            true,
            true,
            true,
            self.pipeline.camera().clear_color(),
            0xFF,
        );
        self.push_frame_uniforms();

        let defaults = self.texture_defaults();
        let opaque = scene_params();
        for item in self.pipeline.renderer().opaque() {
            Self::draw_mesh_item(
                &mut self.device,
                &self.registry,
                self.pipeline.lighting(),
                defaults,
                item,
                &opaque,
            );
        }

        let transparent = transparent_params();
        for item in self.pipeline.renderer().transparent() {
            Self::draw_mesh_item(
                &mut self.device,
                &self.registry,
                self.pipeline.lighting(),
                defaults,
                item,
                &transparent,
            );
        }

        for sprite in self.pipeline.sprites().sprites() {
            let material = self.registry.material(&sprite.material);
            self.device.set_shader(material.program());
            Self::push_material(&mut self.device, material, defaults);
            self.device
                .update_uniform_mat4(material.program(), keys::MODEL_MATRIX, &sprite.model);
            let quad = self.registry.primitive(PrimitiveKind::Quad).submeshes()[0];
            self.device.draw(quad.vao, &transparent, quad.index_count);
        }

        self.skybox_pass(defaults);
    }

    fn skybox_pass(&mut self, defaults: (TextureRef, TextureRef)) {
        if !self.draw_skybox {
            return;
        }
        let material = match &self.skybox_material {
            Some(name) if self.registry.material_exists(name) => self.registry.material(name),
            Some(name) => {
                log::warn!("Skybox material '{name}' was not found, using the engine default");
                &self.default_skybox
            }
            None => &self.default_skybox,
        };
        self.device.set_shader(material.program());
        Self::push_material(&mut self.device, material, defaults);
        let params = skybox_params();
        for submesh in self.registry.primitive(PrimitiveKind::Cube).submeshes() {
            self.device.draw(submesh.vao, &params, submesh.index_count);
        }
    }

    /// Ping-pong gaussian blur over the brightness attachment. Returns the
    /// index of the buffer holding the final blurred image, or `None` when
    /// bloom is disabled and the ping-pong targets were never touched.
    fn bloom_pass(&mut self) -> Option<usize> {
        if !self.final_material.bool(keys::BLOOM_ENABLED).unwrap_or(false) {
            return None;
        }

        let defaults = self.texture_defaults();
        let quad = self.registry.primitive(PrimitiveKind::Quad).submeshes()[0];
        let params = fullscreen_params();

        let mut horizontal = true;
        let mut first = true;
        let mut last = 0;
        for _ in 0..self.settings.bloom_iterations {
            let dst = if horizontal { 0 } else { 1 };
            let source = if first {
                self.targets.bright_color().view()
            } else {
                self.targets.pingpong[1 - dst].color(0).view()
            };
            self.blur_material.set_bool(keys::IS_HORIZONTAL, horizontal);
            self.blur_material
                .set_texture(keys::SCREEN_MAP, source, TextureBindMode::Texture2D);

            self.targets.pingpong[dst].bind(&mut self.device);
            self.device.set_viewport(UVec2::ZERO, self.viewport);
            self.device.set_shader(self.blur_material.program());
            Self::push_material(&mut self.device, &self.blur_material, defaults);
            self.device.draw(quad.vao, &params, quad.index_count);

            last = dst;
            horizontal = !horizontal;
            first = false;
        }
        Some(last)
    }

    fn composite_pass(&mut self, bloom: Option<usize>) {
        self.device.set_fbo(FramebufferHandle::NULL);
        self.device.set_viewport(UVec2::ZERO, self.viewport);
        self.device.clear(true, true, false, Color::BLACK, 0);

        self.final_material.set_texture(
            keys::SCREEN_MAP,
            self.targets.scene_color().view(),
            TextureBindMode::Texture2D,
        );
        match bloom {
            Some(index) => self.final_material.set_texture(
                keys::BLOOM_MAP,
                self.targets.pingpong[index].color(0).view(),
                TextureBindMode::Texture2D,
            ),
            None => self.final_material.remove_texture(keys::BLOOM_MAP),
        }
        self.final_material.set_vec3(
            keys::INVERSE_SCREEN_SIZE,
            Vec3::new(
                1.0 / self.viewport.x.max(1) as f32,
                1.0 / self.viewport.y.max(1) as f32,
                0.0,
            ),
        );

        let defaults = self.texture_defaults();
        self.device.set_shader(self.final_material.program());
        Self::push_material(&mut self.device, &self.final_material, defaults);
        let quad = self.registry.primitive(PrimitiveKind::Quad).submeshes()[0];
        self.device
            .draw(quad.vao, &fullscreen_params(), quad.index_count);
    }

    fn push_frame_uniforms(&mut self) {
        let camera = self.pipeline.camera();
        let position = camera.position().extend(1.0);
        self.uniforms
            .view
            .set_projection(&mut self.device, camera.projection());
        self.uniforms.view.set_view(&mut self.device, camera.view());
        self.uniforms
            .view
            .set_light_space(&mut self.device, self.pipeline.lighting().light_space());
        self.uniforms
            .view
            .set_camera_position(&mut self.device, position);
        let (z_near, z_far) = (camera.z_near(), camera.z_far());
        self.uniforms
            .view
            .set_depth_range(&mut self.device, z_near, z_far);

        let lighting = self.pipeline.lighting();
        self.uniforms.light.set_counts(
            &mut self.device,
            lighting.points().len() as i32,
            lighting.spots().len() as i32,
        );
        self.uniforms
            .light
            .set_ambient_color(&mut self.device, lighting.ambient());
        self.uniforms
            .light
            .set_view_position(&mut self.device, position);
    }

    fn distribute_shadow_map(&mut self) {
        let shadow = self.targets.shadow_map().view();
        let names: Vec<String> = self.registry.shadow_mapped().iter().cloned().collect();
        for name in names {
            if let Some(material) = self.registry.material_mut(&name) {
                material.set_texture(keys::SHADOW_MAP, shadow, TextureBindMode::Texture2D);
            }
        }
        // Entities whose material lookup missed draw with the fallback, so
        // it receives the map as well.
        self.registry
            .default_material_mut()
            .set_texture(keys::SHADOW_MAP, shadow, TextureBindMode::Texture2D);
    }

    fn draw_mesh_item(
        device: &mut D,
        registry: &ResourceRegistry,
        lighting: &crate::systems::LightingSystem,
        defaults: (TextureRef, TextureRef),
        item: &DrawItem,
        params: &DrawParams,
    ) {
        let material = registry.material(&item.material);
        device.set_shader(material.program());
        Self::push_material(device, material, defaults);
        if material.receives_lighting {
            lighting.push_uniforms(device, material.program());
        }
        device.update_uniform_mat4(material.program(), keys::MODEL_MATRIX, &item.model);
        for submesh in registry.mesh(&item.mesh).submeshes() {
            device.draw(submesh.vao, params, submesh.index_count);
        }
    }

    /// Pushes every property of `material` to its bound program. Each
    /// sampler slot resolves `active` as "logically set and not the empty
    /// texture", writes the companion is-active uniform and the unit index,
    /// and binds either the real texture or the type-appropriate default —
    /// every declared slot ends up bound to something valid.
    fn push_material(device: &mut D, material: &Material, defaults: (TextureRef, TextureRef)) {
        let program = material.program();
        for (name, value) in &material.floats {
            device.update_uniform_float(program, name, *value);
        }
        for (name, value) in &material.ints {
            device.update_uniform_int(program, name, *value);
        }
        for (name, value) in &material.bools {
            device.update_uniform_int(program, name, *value as i32);
        }
        for (name, value) in &material.colors {
            device.update_uniform_color(program, name, *value);
        }
        for (name, value) in &material.vec2s {
            device.update_uniform_vec2(program, name, *value);
        }
        for (name, value) in &material.vec3s {
            device.update_uniform_vec3(program, name, *value);
        }
        for (name, value) in &material.vec4s {
            device.update_uniform_vec4(program, name, *value);
        }
        for (name, value) in &material.matrices {
            device.update_uniform_mat4(program, name, value);
        }

        let (default_2d, default_cube) = defaults;
        for (name, slot) in &material.samplers {
            let resolved = slot.texture.filter(|t| !t.is_empty);
            let active = slot.active && resolved.is_some();
            let binding = match resolved {
                Some(texture) if active => texture,
                _ => match slot.bind_mode {
                    TextureBindMode::Texture2D => default_2d,
                    TextureBindMode::Cubemap => default_cube,
                },
            };
            device.update_uniform_int(
                program,
                &format!("{name}{IS_ACTIVE_SUFFIX}"),
                active as i32,
            );
            device.update_uniform_int(program, name, slot.unit as i32);
            device.set_texture(binding.texture, binding.sampler, slot.unit, slot.bind_mode);
        }
    }

    fn texture_defaults(&self) -> (TextureRef, TextureRef) {
        (
            self.registry.default_texture().view(),
            self.registry.default_cubemap().view(),
        )
    }

    // --- window and viewport ---

    /// Propagates a window resize to the device viewport, every
    /// window-sized render target, and the camera aspect ratio. Zero-sized
    /// viewports (minimized windows) are ignored.
    pub fn on_window_resized(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let size = UVec2::new(width, height);
        if size == self.viewport {
            return;
        }
        self.viewport = size;
        self.device.set_viewport(UVec2::ZERO, size);
        self.targets.resize(&mut self.device, size);
        self.pipeline.camera_mut().set_viewport(size);

        let event = EngineEvent::WindowResized { width, height };
        self.layers.event_all(&event);
        self.events.publish(&event);
    }

    /// Current viewport size.
    pub fn viewport(&self) -> UVec2 {
        self.viewport
    }

    // --- HDRI environment ---

    /// Loads an equirectangular HDR image and runs the four-stage
    /// environment precompute. A missing or undecodable file aborts the
    /// capture with a warning; the captured gate stays closed.
    pub fn capture_hdri(&mut self, path: &str) {
        let equirect = self
            .registry
            .create_texture_hdri(&mut self.device, path)
            .view();
        if equirect.is_empty {
            log::warn!("HDRI capture aborted: '{path}' did not yield an image");
            return;
        }

        let res = self.capture_resources();
        if let Err(err) =
            self.hdri
                .capture(&mut self.device, &mut self.targets.capture, equirect, &res)
        {
            log::error!("HDRI capture failed: {err}");
            return;
        }
        self.device.set_viewport(UVec2::ZERO, self.viewport);

        let event = EngineEvent::HdriCaptured;
        self.layers.event_all(&event);
        self.events.publish(&event);
    }

    fn capture_resources(&self) -> CaptureResources {
        let cube = self.registry.primitive(PrimitiveKind::Cube).submeshes()[0];
        let quad = self.registry.primitive(PrimitiveKind::Quad).submeshes()[0];
        CaptureResources {
            cube_vao: cube.vao,
            cube_index_count: cube.index_count,
            quad_vao: quad.vao,
            quad_index_count: quad.index_count,
            equirect_program: self.registry.shader(ShaderKind::HdriEquirect).program(),
            irradiance_program: self.registry.shader(ShaderKind::HdriIrradiance).program(),
            prefilter_program: self.registry.shader(ShaderKind::HdriPrefilter).program(),
            brdf_program: self.registry.shader(ShaderKind::HdriBrdf).program(),
        }
    }

    /// Binds the captured irradiance, prefilter, and BRDF-LUT maps into a
    /// material's environment slots. Requesting them before any capture is
    /// a reported user error that leaves the material untouched.
    pub fn set_hdri_data(&mut self, material_name: &str) {
        if !self.hdri.captured() {
            log::warn!(
                "HDRI data requested for '{material_name}' before any environment capture"
            );
            return;
        }
        let maps = (
            self.hdri.irradiance().map(Texture::view),
            self.hdri.prefilter().map(Texture::view),
            self.hdri.brdf_lut().map(Texture::view),
        );
        if let (Some(irradiance), Some(prefilter), Some(brdf)) = maps {
            if let Some(material) = self.registry.material_mut(material_name) {
                material.set_texture(keys::IRRADIANCE_MAP, irradiance, TextureBindMode::Cubemap);
                material.set_texture(keys::PREFILTER_MAP, prefilter, TextureBindMode::Cubemap);
                material.set_texture(keys::BRDF_LUT_MAP, brdf, TextureBindMode::Texture2D);
            }
        }
    }

    /// Clears a material's environment slots back to inactive.
    pub fn remove_hdri_data(&mut self, material_name: &str) {
        if let Some(material) = self.registry.material_mut(material_name) {
            material.remove_texture(keys::IRRADIANCE_MAP);
            material.remove_texture(keys::PREFILTER_MAP);
            material.remove_texture(keys::BRDF_LUT_MAP);
        }
    }

    /// The HDRI pipeline state (captured gate and cached products).
    pub fn hdri(&self) -> &HdriPipeline {
        &self.hdri
    }

    // --- resources (delegation over the shared device) ---

    /// Creates (or returns) a 2D texture from an image file.
    pub fn create_texture(&mut self, path: &str, sampler: SamplerOptions) -> &Texture {
        self.registry
            .create_texture_2d(&mut self.device, path, sampler)
    }

    /// Creates (or returns) a cubemap texture from six face image files.
    pub fn create_texture_cubemap(&mut self, name: &str, face_paths: [&str; 6]) -> &Texture {
        self.registry
            .create_texture_cubemap(&mut self.device, name, face_paths)
    }

    /// Creates (or returns) a mesh from an OBJ file.
    pub fn create_mesh(&mut self, path: &str) -> &crate::resources::Mesh {
        self.registry.create_mesh(&mut self.device, path)
    }

    /// Creates (or returns) a material bound to a shader-kind schema.
    pub fn create_material(&mut self, name: &str, kind: ShaderKind) -> &mut Material {
        self.registry.create_material(name, kind)
    }

    /// Re-binds a table material's shader, resetting its property maps.
    pub fn set_material_shader(&mut self, name: &str, kind: ShaderKind) {
        self.registry.set_material_shader(name, kind);
    }

    /// Releases a texture; warns when absent.
    pub fn unload_texture(&mut self, path: &str) {
        self.registry.unload_texture(&mut self.device, path);
    }

    /// Releases a mesh; warns when absent.
    pub fn unload_mesh(&mut self, key: &MeshKey) {
        self.registry.unload_mesh(&mut self.device, key);
    }

    /// Removes a material (and its shadow-set membership); warns when
    /// absent.
    pub fn unload_material(&mut self, name: &str) {
        self.registry.unload_material(name);
    }

    /// Pushes a table material's current property maps to its program.
    pub fn update_shader_data(&mut self, material_name: &str) {
        let defaults = (
            self.registry.default_texture().view(),
            self.registry.default_cubemap().view(),
        );
        let material = self.registry.material(material_name);
        self.device.set_shader(material.program());
        Self::push_material(&mut self.device, material, defaults);
    }

    /// Read access to the resource tables.
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Mutable access to a table material.
    pub fn material_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.registry.material_mut(name)
    }

    // --- composition switches ---

    /// Selects a user skybox material, or `None` to fall back to the
    /// engine default sky.
    pub fn set_skybox_material(&mut self, name: Option<&str>) {
        self.skybox_material = name.map(str::to_string);
    }

    /// Suppresses or re-enables the skybox draw at the end of the scene
    /// pass.
    pub fn set_draw_skybox(&mut self, enabled: bool) {
        self.draw_skybox = enabled;
    }

    /// Toggles the bloom pass (the composite material's bloom flag).
    pub fn set_bloom_enabled(&mut self, enabled: bool) {
        self.final_material.set_bool(keys::BLOOM_ENABLED, enabled);
    }

    /// Sets the composite exposure.
    pub fn set_exposure(&mut self, exposure: f32) {
        self.final_material.set_float(keys::EXPOSURE, exposure);
    }

    /// Overrides the scene ambient color.
    pub fn set_ambient_color(&mut self, color: Color) {
        self.pipeline.lighting_mut().set_ambient(color);
    }

    /// Flips the depth-visualization debug switch.
    pub fn set_visualize_depth(&mut self, enabled: bool) {
        self.uniforms
            .debug
            .set_visualize_depth(&mut self.device, enabled);
    }

    /// Mutable access to the final composite material (exposure, FXAA
    /// constants).
    pub fn final_material_mut(&mut self) -> &mut Material {
        &mut self.final_material
    }

    // --- collaborators ---

    /// Pushes a GUI layer below every overlay.
    pub fn push_layer(&mut self, layer: Box<dyn Layer>) {
        self.layers.push_layer(layer);
    }

    /// Pushes a GUI overlay above everything.
    pub fn push_overlay(&mut self, overlay: Box<dyn Layer>) {
        self.layers.push_overlay(overlay);
    }

    /// Installs the presenter signaled at the end of each ticked frame.
    pub fn set_presenter(&mut self, presenter: Box<dyn FramePresenter>) {
        self.presenter = Some(presenter);
    }

    /// Installs a callback run after the composite pass, before the swap
    /// signal (editor viewports, debug overlays).
    pub fn set_post_draw(&mut self, callback: impl FnMut(&mut D) + 'static) {
        self.post_draw = Some(Box::new(callback));
    }

    /// The event registry, for subscribing to engine events.
    pub fn events_mut(&mut self) -> &mut EventRegistry {
        &mut self.events
    }

    // --- observability and exposure ---

    /// The composited HDR scene texture, for external presenters such as
    /// an editor viewport.
    pub fn final_image(&self) -> TextureRef {
        self.targets.scene_color().view()
    }

    /// The current shadow depth map.
    pub fn shadow_map_image(&self) -> TextureRef {
        self.targets.shadow_map().view()
    }

    /// Frame statistics. Observability only; nothing in the frame path
    /// reads these back.
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// The engine settings.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// The frame target set.
    pub fn targets(&self) -> &FrameTargets {
        &self.targets
    }

    /// The system pipeline's latest per-frame state.
    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    /// Read access to the device backend.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable access to the device backend.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Releases every GPU resource the engine owns. The engine is
    /// unusable afterwards; call at shutdown.
    pub fn shutdown(&mut self) {
        self.hdri.release(&mut self.device);
        self.targets.release(&mut self.device);
        self.uniforms.release(&mut self.device);
        self.registry.release_all(&mut self.device);
    }
}

impl<D: RenderDevice> std::fmt::Debug for RenderEngine<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderEngine")
            .field("viewport", &self.viewport)
            .field("draw_skybox", &self.draw_skybox)
            .field("skybox_material", &self.skybox_material)
            .field("hdri_captured", &self.hdri.captured())
            .field("frames", &self.stats.frames())
            .finish_non_exhaustive()
    }
}
