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

//! Frame timing statistics.
//!
//! Purely an observability hook for editors and debug overlays; nothing in
//! the frame-composition pipeline reads these values back as a control
//! input.

/// Rolling frame statistics, advanced once per ticked frame.
#[derive(Debug, Clone, Default)]
pub struct RenderStats {
    frames: u64,
    fps: u32,
    last_frame_secs: f32,
    window_accum_secs: f32,
    window_frames: u32,
}

impl RenderStats {
    /// Creates zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed frame that took `delta_secs` of wall time.
    /// The FPS value refreshes once per elapsed second.
    pub fn frame(&mut self, delta_secs: f32) {
        self.frames += 1;
        self.last_frame_secs = delta_secs;
        self.window_accum_secs += delta_secs;
        self.window_frames += 1;

        if self.window_accum_secs >= 1.0 {
            self.fps = (self.window_frames as f32 / self.window_accum_secs).round() as u32;
            self.window_accum_secs = 0.0;
            self.window_frames = 0;
        }
    }

    /// Total frames recorded.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames per second over the last full one-second window.
    #[inline]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Duration of the most recent frame in milliseconds.
    #[inline]
    pub fn last_frame_ms(&self) -> f32 {
        self.last_frame_secs * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_updates_after_one_second_window() {
        let mut stats = RenderStats::new();
        for _ in 0..60 {
            stats.frame(1.0 / 60.0);
        }
        // 60 frames at 16.6ms crosses the 1s window boundary.
        assert_eq!(stats.frames(), 60);
        assert!(stats.fps() >= 59 && stats.fps() <= 61, "fps = {}", stats.fps());
    }

    #[test]
    fn last_frame_ms_tracks_most_recent_delta() {
        let mut stats = RenderStats::new();
        stats.frame(0.02);
        assert!((stats.last_frame_ms() - 20.0).abs() < 1e-4);
    }
}
