//! Synthetic camera for tests and dry runs.
//!
//! Generates deterministic-shape RGB frames with a slowly mutating pattern so
//! downstream code sees frame-to-frame variation without any hardware.

use crate::camera::{CameraConfig, FrameSource};
use crate::error::CaptureError;
use crate::frame::{Frame, PixelFormat};

pub struct SyntheticCamera {
    config: CameraConfig,
    frame_count: u64,
    scene_state: u8,
}

impl SyntheticCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            frame_count: 0,
            scene_state: 0,
        }
    }

    fn generate_pixels(&mut self) -> Vec<u8> {
        let pixel_bytes =
            (self.config.width as usize) * (self.config.height as usize) * PixelFormat::Rgb8.bytes_per_pixel();

        // Mutate the simulated scene occasionally so consecutive frames differ
        // the way a live feed would.
        if self.frame_count % 50 == 0 {
            self.scene_state = self.scene_state.wrapping_add(1);
        }

        let mut pixels = vec![0u8; pixel_bytes];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = ((i as u64 + self.frame_count + self.scene_state as u64) % 256) as u8;
        }
        pixels
    }
}

impl FrameSource for SyntheticCamera {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        self.frame_count += 1;
        let pixels = self.generate_pixels();
        Frame::new(pixels, self.config.width, self.config.height, PixelFormat::Rgb8)
    }

    fn describe(&self) -> String {
        format!("{} (synthetic)", self.config.url)
    }

    fn frames_captured(&self) -> u64 {
        self.frame_count
    }
}
