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

//! GPU uniform buffers shared by the built-in shaders.
//!
//! Each buffer mirrors one std140 block; the byte offsets below must stay
//! consistent with the block declarations in the GLSL sources. Updates are
//! partial byte-range writes, so per-frame traffic is limited to the fields
//! that actually changed.

use crate::resources::registry::{
    DEBUG_DATA_BINDING, LIGHT_DATA_BINDING, VIEW_DATA_BINDING,
};
use ember_core::gfx::{BufferHandle, BufferUsage, RenderDevice, ResourceError};
use ember_core::Color;
use glam::{Mat4, Vec4};

/// std140 offsets of the `ViewData` block.
mod view_layout {
    pub const PROJECTION: usize = 0;
    pub const VIEW: usize = 64;
    pub const LIGHT_SPACE: usize = 128;
    pub const CAMERA_POSITION: usize = 192;
    pub const Z_NEAR: usize = 208;
    pub const Z_FAR: usize = 212;
    pub const SIZE: usize = 224;
}

/// std140 offsets of the `LightData` block.
mod light_layout {
    pub const POINT_COUNT: usize = 0;
    pub const SPOT_COUNT: usize = 4;
    pub const AMBIENT_COLOR: usize = 16;
    pub const VIEW_POSITION: usize = 32;
    pub const SIZE: usize = 48;
}

/// std140 offsets of the `DebugData` block.
mod debug_layout {
    pub const VISUALIZE_DEPTH: usize = 0;
    pub const SIZE: usize = 16;
}

/// A fixed-size GPU buffer bound to a shader binding point.
#[derive(Debug)]
struct UniformBuffer {
    handle: BufferHandle,
}

impl UniformBuffer {
    fn new(
        device: &mut dyn RenderDevice,
        size: usize,
        binding_point: u32,
    ) -> Result<Self, ResourceError> {
        let handle = device.create_uniform_buffer(size, BufferUsage::DynamicDraw)?;
        device.bind_uniform_buffer(handle, binding_point);
        Ok(Self { handle })
    }

    fn write(&self, device: &mut dyn RenderDevice, offset: usize, data: &[u8]) {
        device.update_uniform_buffer(self.handle, offset, data);
    }

    fn write_mat4(&self, device: &mut dyn RenderDevice, offset: usize, value: &Mat4) {
        self.write(device, offset, bytemuck::cast_slice(&value.to_cols_array()));
    }

    fn write_vec4(&self, device: &mut dyn RenderDevice, offset: usize, value: Vec4) {
        self.write(device, offset, bytemuck::cast_slice(&value.to_array()));
    }

    fn release(&mut self, device: &mut dyn RenderDevice) {
        if !self.handle.is_null() {
            device.release_uniform_buffer(self.handle);
            self.handle = BufferHandle::NULL;
        }
    }
}

/// The camera/view block. The depth range changes rarely, so the last
/// written values are recorded and re-writes are skipped until they differ.
#[derive(Debug)]
pub struct ViewDataBuffer {
    buffer: UniformBuffer,
    written_z_near: Option<f32>,
    written_z_far: Option<f32>,
}

impl ViewDataBuffer {
    fn new(device: &mut dyn RenderDevice) -> Result<Self, ResourceError> {
        Ok(Self {
            buffer: UniformBuffer::new(device, view_layout::SIZE, VIEW_DATA_BINDING)?,
            written_z_near: None,
            written_z_far: None,
        })
    }

    /// Writes the projection matrix.
    pub fn set_projection(&self, device: &mut dyn RenderDevice, value: &Mat4) {
        self.buffer.write_mat4(device, view_layout::PROJECTION, value);
    }

    /// Writes the view matrix.
    pub fn set_view(&self, device: &mut dyn RenderDevice, value: &Mat4) {
        self.buffer.write_mat4(device, view_layout::VIEW, value);
    }

    /// Writes the light-space matrix used by the shadow pass and the
    /// shadow-factor lookup.
    pub fn set_light_space(&self, device: &mut dyn RenderDevice, value: &Mat4) {
        self.buffer.write_mat4(device, view_layout::LIGHT_SPACE, value);
    }

    /// Writes the world-space camera position.
    pub fn set_camera_position(&self, device: &mut dyn RenderDevice, value: Vec4) {
        self.buffer
            .write_vec4(device, view_layout::CAMERA_POSITION, value);
    }

    /// Writes the near/far planes, skipping fields that already hold the
    /// given values.
    pub fn set_depth_range(&mut self, device: &mut dyn RenderDevice, z_near: f32, z_far: f32) {
        if self.written_z_near != Some(z_near) {
            self.buffer
                .write(device, view_layout::Z_NEAR, &z_near.to_le_bytes());
            self.written_z_near = Some(z_near);
        }
        if self.written_z_far != Some(z_far) {
            self.buffer
                .write(device, view_layout::Z_FAR, &z_far.to_le_bytes());
            self.written_z_far = Some(z_far);
        }
    }
}

/// The aggregated light block.
#[derive(Debug)]
pub struct LightDataBuffer {
    buffer: UniformBuffer,
}

impl LightDataBuffer {
    fn new(device: &mut dyn RenderDevice) -> Result<Self, ResourceError> {
        Ok(Self {
            buffer: UniformBuffer::new(device, light_layout::SIZE, LIGHT_DATA_BINDING)?,
        })
    }

    /// Writes the active light counts.
    pub fn set_counts(&self, device: &mut dyn RenderDevice, points: i32, spots: i32) {
        self.buffer
            .write(device, light_layout::POINT_COUNT, &points.to_le_bytes());
        self.buffer
            .write(device, light_layout::SPOT_COUNT, &spots.to_le_bytes());
    }

    /// Writes the scene ambient color.
    pub fn set_ambient_color(&self, device: &mut dyn RenderDevice, value: Color) {
        self.buffer.write(
            device,
            light_layout::AMBIENT_COLOR,
            bytemuck::bytes_of(&value),
        );
    }

    /// Writes the world-space viewer position.
    pub fn set_view_position(&self, device: &mut dyn RenderDevice, value: Vec4) {
        self.buffer
            .write_vec4(device, light_layout::VIEW_POSITION, value);
    }
}

/// The debug-switch block, written only when a switch flips.
#[derive(Debug)]
pub struct DebugDataBuffer {
    buffer: UniformBuffer,
    visualize_depth: bool,
}

impl DebugDataBuffer {
    fn new(device: &mut dyn RenderDevice) -> Result<Self, ResourceError> {
        let buffer = UniformBuffer::new(device, debug_layout::SIZE, DEBUG_DATA_BINDING)?;
        buffer.write(device, debug_layout::VISUALIZE_DEPTH, &0i32.to_le_bytes());
        Ok(Self {
            buffer,
            visualize_depth: false,
        })
    }

    /// Flips the depth-visualization switch.
    pub fn set_visualize_depth(&mut self, device: &mut dyn RenderDevice, enabled: bool) {
        if self.visualize_depth == enabled {
            return;
        }
        self.visualize_depth = enabled;
        self.buffer.write(
            device,
            debug_layout::VISUALIZE_DEPTH,
            &(enabled as i32).to_le_bytes(),
        );
    }

    /// Current state of the depth-visualization switch.
    pub fn visualize_depth(&self) -> bool {
        self.visualize_depth
    }
}

/// The three engine uniform buffers, bound once at setup.
#[derive(Debug)]
pub struct FrameUniforms {
    /// Camera/view block at binding 0.
    pub view: ViewDataBuffer,
    /// Aggregated light block at binding 1.
    pub light: LightDataBuffer,
    /// Debug switches at binding 2.
    pub debug: DebugDataBuffer,
}

impl FrameUniforms {
    /// Allocates and binds all three blocks.
    pub fn initialize(device: &mut dyn RenderDevice) -> Result<Self, ResourceError> {
        Ok(Self {
            view: ViewDataBuffer::new(device)?,
            light: LightDataBuffer::new(device)?,
            debug: DebugDataBuffer::new(device)?,
        })
    }

    /// Releases all three buffers.
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        self.view.buffer.release(device);
        self.light.buffer.release(device);
        self.debug.buffer.release(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::gfx::HeadlessDevice;

    #[test]
    fn view_writes_land_at_block_offsets() {
        let mut dev = HeadlessDevice::new();
        let mut uniforms = FrameUniforms::initialize(&mut dev).unwrap();
        dev.buffer_writes.clear();

        uniforms.view.set_projection(&mut dev, &Mat4::IDENTITY);
        uniforms.view.set_view(&mut dev, &Mat4::IDENTITY);
        uniforms.view.set_light_space(&mut dev, &Mat4::IDENTITY);
        uniforms.view.set_camera_position(&mut dev, Vec4::ONE);
        uniforms.view.set_depth_range(&mut dev, 0.1, 100.0);

        let offsets: Vec<(usize, usize)> =
            dev.buffer_writes.iter().map(|(_, off, len)| (*off, *len)).collect();
        assert_eq!(
            offsets,
            vec![(0, 64), (64, 64), (128, 64), (192, 16), (208, 4), (212, 4)]
        );
    }

    #[test]
    fn depth_range_rewrites_only_on_change() {
        let mut dev = HeadlessDevice::new();
        let mut uniforms = FrameUniforms::initialize(&mut dev).unwrap();
        uniforms.view.set_depth_range(&mut dev, 0.1, 100.0);
        dev.buffer_writes.clear();

        uniforms.view.set_depth_range(&mut dev, 0.1, 100.0);
        assert!(dev.buffer_writes.is_empty());

        uniforms.view.set_depth_range(&mut dev, 0.1, 250.0);
        assert_eq!(dev.buffer_writes.len(), 1);
        assert_eq!(dev.buffer_writes[0].1, 212);
    }

    #[test]
    fn debug_switch_writes_once_per_flip() {
        let mut dev = HeadlessDevice::new();
        let mut uniforms = FrameUniforms::initialize(&mut dev).unwrap();
        dev.buffer_writes.clear();

        uniforms.debug.set_visualize_depth(&mut dev, false);
        assert!(dev.buffer_writes.is_empty());

        uniforms.debug.set_visualize_depth(&mut dev, true);
        uniforms.debug.set_visualize_depth(&mut dev, true);
        assert_eq!(dev.buffer_writes.len(), 1);
        assert!(uniforms.debug.visualize_depth());
    }
}
