//! HTTP snapshot camera.
//!
//! Captures by fetching a JPEG from a snapshot endpoint, as exposed by
//! ESP32-class boards and most IP cameras (`/capture`, `/snapshot.jpg`, ...).
//! Each capture is a fresh request; frames are decoded to RGB8 in memory and
//! never written to disk by this layer.

use std::io::Read;
use std::time::Duration;

use image::ImageFormat;
use url::Url;

use crate::camera::{CameraConfig, FrameSource};
use crate::error::{CaptureError, ConfigError};
use crate::frame::{Frame, PixelFormat};

/// Upper bound on a single snapshot body. Anything larger is treated as a
/// malfunctioning endpoint rather than a frame.
const MAX_JPEG_BYTES: u64 = 5 * 1024 * 1024;

const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpCamera {
    config: CameraConfig,
    agent: ureq::Agent,
    frame_count: u64,
}

impl HttpCamera {
    pub fn new(config: CameraConfig) -> Result<Self, ConfigError> {
        Url::parse(&config.url).map_err(|e| ConfigError::InvalidCameraUrl {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;
        let agent = ureq::AgentBuilder::new()
            .timeout(SNAPSHOT_TIMEOUT)
            .build();
        Ok(Self {
            config,
            agent,
            frame_count: 0,
        })
    }

    fn fetch_snapshot(&self) -> Result<Vec<u8>, CaptureError> {
        let response = self
            .agent
            .get(&self.config.url)
            .call()
            .map_err(|e| CaptureError::Unavailable(e.to_string()))?;

        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_JPEG_BYTES + 1)
            .read_to_end(&mut body)
            .map_err(CaptureError::Io)?;
        if body.len() as u64 > MAX_JPEG_BYTES {
            return Err(CaptureError::Decode(format!(
                "snapshot exceeds {} byte limit",
                MAX_JPEG_BYTES
            )));
        }
        Ok(body)
    }
}

impl FrameSource for HttpCamera {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        let jpeg = self.fetch_snapshot()?;
        let decoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)
            .map_err(|e| CaptureError::Decode(e.to_string()))?
            .to_rgb8();

        let (width, height) = decoded.dimensions();
        self.frame_count += 1;
        Frame::new(decoded.into_raw(), width, height, PixelFormat::Rgb8)
    }

    fn describe(&self) -> String {
        format!("{} (http snapshot)", self.config.url)
    }

    fn frames_captured(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_url() {
        let config = CameraConfig {
            url: "http://".to_string(),
            width: 640,
            height: 480,
            warmup: Duration::ZERO,
        };
        assert!(HttpCamera::new(config).is_err());
    }
}
